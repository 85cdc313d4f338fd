use std::collections::HashSet;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::categories::models::Category;

mod pg_category_repository;

pub use pg_category_repository::PgCategoryRepository;

/// Persistence collaborator for categories
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by name
    async fn list(&self) -> Result<Vec<Category>>;

    /// Existing slugs equal to `base` or of the form `base-N`
    async fn taken_slugs(&self, base: &str) -> Result<HashSet<String>>;

    /// Insert a category; a duplicate name or slug is a `Conflict`
    async fn insert(&self, name: &str, slug: &str) -> Result<Category>;

    /// Delete a category, nulling the reference on its articles.
    /// Returns `false` when no such category exists.
    async fn delete(&self, id: i32) -> Result<bool>;
}
