use std::sync::Arc;

use tracing::info;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{CategoryResponseDto, CreateCategoryDto};
use crate::features::categories::repositories::CategoryRepository;
use crate::shared::constants::MAX_CATEGORY_SLUG_BASE;
use crate::shared::slug;

/// Service for category operations
pub struct CategoryService {
    repository: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repository: Arc<dyn CategoryRepository>) -> Self {
        Self { repository }
    }

    /// List all categories
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.repository.list().await?;
        Ok(categories.into_iter().map(Into::into).collect())
    }

    /// Create a category with a slug derived from its name
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let name = dto.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Category name is required".to_string()));
        }

        let base = slug::truncate(&slug::normalize(name), MAX_CATEGORY_SLUG_BASE);
        let taken = self.repository.taken_slugs(&base).await?;
        let slug = slug::resolve_unique(&base, |s| taken.contains(s));

        let category = self.repository.insert(name, &slug).await?;
        info!("Category created: id={}, slug={}", category.id, category.slug);

        Ok(category.into())
    }

    /// Delete a category. Articles in it are kept with no category.
    pub async fn delete(&self, id: i32) -> Result<()> {
        if !self.repository.delete(id).await? {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        info!("Category deleted: id={}", id);
        Ok(())
    }
}
