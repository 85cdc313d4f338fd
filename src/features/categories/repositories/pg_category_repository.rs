use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::database::slug_variants_pattern;
use crate::core::error::{handle_db_error, Result};
use crate::features::categories::models::Category;
use crate::features::categories::repositories::CategoryRepository;

/// PostgreSQL-backed category repository
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, slug
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "category list"))
    }

    async fn taken_slugs(&self, base: &str) -> Result<HashSet<String>> {
        let slugs = sqlx::query_scalar::<_, String>(
            r#"
            SELECT slug FROM categories
            WHERE slug = $1 OR slug LIKE $2
            "#,
        )
        .bind(base)
        .bind(slug_variants_pattern(base))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "category slugs"))?;

        Ok(slugs.into_iter().collect())
    }

    async fn insert(&self, name: &str, slug: &str) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug)
            VALUES ($1, $2)
            RETURNING id, name, slug
            "#,
        )
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "category"))
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        // articles.category_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "category"))?;

        Ok(result.rows_affected() > 0)
    }
}
