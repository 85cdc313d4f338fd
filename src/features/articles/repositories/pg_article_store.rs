use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::core::database::{contains_pattern, slug_variants_pattern};
use crate::core::error::{handle_db_error, Result};
use crate::features::articles::models::{Article, ArticleFields, ArticleFilter, ArticleRecord};
use crate::features::articles::repositories::{ArticleStore, ArticleUnitOfWork};
use crate::features::categories::models::Category;
use crate::features::files::models::UploadedFile;
use crate::features::tags::{Tag, TagSource};

const ARTICLE_COLUMNS: &str = r#"
    a.id, a.title, a.slug, a.excerpt, a.content, a.is_published, a.published_on,
    a.category_id, a.created_at, a.updated_at
"#;

/// `$1` published only, `$2` search pattern, `$3` category id, `$4` tag name
const LIST_FILTER: &str = r#"
    WHERE ($1 = FALSE OR a.is_published)
      AND ($2::text IS NULL OR a.title ILIKE $2 OR a.excerpt ILIKE $2 OR a.content ILIKE $2)
      AND ($3::int4 IS NULL OR a.category_id = $3)
      AND ($4::text IS NULL OR EXISTS (
            SELECT 1 FROM article_tags at
            JOIN tags t ON t.id = at.tag_id
            WHERE at.article_id = a.id AND lower(t.name) = lower($4)
      ))
"#;

#[derive(Debug, FromRow)]
struct ArticleRow {
    #[sqlx(flatten)]
    article: Article,
    category_name: Option<String>,
    category_slug: Option<String>,
}

#[derive(Debug, FromRow)]
struct ArticleTagRow {
    article_id: i32,
    id: i32,
    name: String,
}

/// PostgreSQL-backed article store
pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn select_with_category() -> String {
        format!(
            r#"
            SELECT {ARTICLE_COLUMNS}, c.name AS category_name, c.slug AS category_slug
            FROM articles a
            LEFT JOIN categories c ON c.id = a.category_id
            "#
        )
    }

    /// Attach tags and files to fetched rows, preserving row order
    async fn load_records(&self, rows: Vec<ArticleRow>) -> Result<Vec<ArticleRecord>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.article.id).collect();

        let tag_rows = sqlx::query_as::<_, ArticleTagRow>(
            r#"
            SELECT at.article_id, t.id, t.name
            FROM article_tags at
            JOIN tags t ON t.id = at.tag_id
            WHERE at.article_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "article tags"))?;

        let files = sqlx::query_as::<_, UploadedFile>(
            r#"
            SELECT id, file_name, file_key, url, content_type, size, article_id, uploaded_by, created_at
            FROM uploaded_files
            WHERE article_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "article files"))?;

        let mut tags_by_article: HashMap<i32, Vec<Tag>> = HashMap::new();
        for row in tag_rows {
            tags_by_article.entry(row.article_id).or_default().push(Tag {
                id: row.id,
                name: row.name,
            });
        }

        let mut files_by_article: HashMap<i32, Vec<UploadedFile>> = HashMap::new();
        for file in files {
            if let Some(article_id) = file.article_id {
                files_by_article.entry(article_id).or_default().push(file);
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.article.id;
                let category = match (row.article.category_id, row.category_name, row.category_slug)
                {
                    (Some(category_id), Some(name), Some(slug)) => Some(Category {
                        id: category_id,
                        name,
                        slug,
                    }),
                    _ => None,
                };
                ArticleRecord {
                    article: row.article,
                    category,
                    tags: tags_by_article.remove(&id).unwrap_or_default(),
                    files: files_by_article.remove(&id).unwrap_or_default(),
                }
            })
            .collect())
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn begin(&self) -> Result<Box<dyn ArticleUnitOfWork>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| handle_db_error(e, "article transaction"))?;
        Ok(Box::new(PgArticleUnitOfWork { tx }))
    }

    async fn list(&self, filter: &ArticleFilter) -> Result<(Vec<ArticleRecord>, i64)> {
        let search = filter.search.as_deref().map(contains_pattern);

        let count_query = format!("SELECT COUNT(*) FROM articles a {LIST_FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(filter.published_only)
            .bind(&search)
            .bind(filter.category_id)
            .bind(&filter.tag)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "article count"))?;

        let page_query = format!(
            r#"
            {}
            {LIST_FILTER}
            ORDER BY a.published_on DESC NULLS LAST, a.id DESC
            LIMIT $5 OFFSET $6
            "#,
            Self::select_with_category()
        );
        let rows = sqlx::query_as::<_, ArticleRow>(&page_query)
            .bind(filter.published_only)
            .bind(&search)
            .bind(filter.category_id)
            .bind(&filter.tag)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "article list"))?;

        Ok((self.load_records(rows).await?, total))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ArticleRecord>> {
        let query = format!("{} WHERE a.id = $1", Self::select_with_category());
        let row = sqlx::query_as::<_, ArticleRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "article"))?;

        Ok(self.load_records(row.into_iter().collect()).await?.pop())
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<ArticleRecord>> {
        let query = format!(
            "{} WHERE a.slug = $1 AND a.is_published",
            Self::select_with_category()
        );
        let row = sqlx::query_as::<_, ArticleRow>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "article"))?;

        Ok(self.load_records(row.into_iter().collect()).await?.pop())
    }
}

/// One database transaction; rolled back when dropped without `commit`
pub struct PgArticleUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl TagSource for PgArticleUnitOfWork {
    async fn find_or_create_tag(&mut self, name: &str) -> Result<Tag> {
        // The no-op update makes RETURNING yield the existing row on conflict
        sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name)
            VALUES ($1)
            ON CONFLICT ((lower(name))) DO UPDATE SET name = tags.name
            RETURNING id, name
            "#,
        )
        .bind(name)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| handle_db_error(e, "tag"))
    }
}

#[async_trait]
impl ArticleUnitOfWork for PgArticleUnitOfWork {
    async fn lock_article(&mut self, id: i32) -> Result<Option<Article>> {
        let query = format!("SELECT {ARTICLE_COLUMNS} FROM articles a WHERE a.id = $1 FOR UPDATE");
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| handle_db_error(e, "article"))
    }

    async fn taken_slugs(&mut self, base: &str) -> Result<HashSet<String>> {
        let slugs = sqlx::query_scalar::<_, String>(
            r#"
            SELECT slug FROM articles
            WHERE slug = $1 OR slug LIKE $2
            "#,
        )
        .bind(base)
        .bind(slug_variants_pattern(base))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| handle_db_error(e, "article slugs"))?;

        Ok(slugs.into_iter().collect())
    }

    async fn category_exists(&mut self, id: i32) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| handle_db_error(e, "category"))
    }

    async fn existing_file_urls(&mut self, urls: &[String]) -> Result<HashSet<String>> {
        if urls.is_empty() {
            return Ok(HashSet::new());
        }

        let found = sqlx::query_scalar::<_, String>(
            "SELECT url FROM uploaded_files WHERE url = ANY($1)",
        )
        .bind(urls)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| handle_db_error(e, "uploaded files"))?;

        Ok(found.into_iter().collect())
    }

    async fn insert_article(&mut self, slug: &str, fields: &ArticleFields) -> Result<Article> {
        sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (title, slug, excerpt, content, is_published, published_on, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, slug, excerpt, content, is_published, published_on,
                      category_id, created_at, updated_at
            "#,
        )
        .bind(&fields.title)
        .bind(slug)
        .bind(&fields.excerpt)
        .bind(&fields.content)
        .bind(fields.is_published)
        .bind(fields.published_on)
        .bind(fields.category_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| handle_db_error(e, "article"))
    }

    async fn update_article(
        &mut self,
        id: i32,
        fields: &ArticleFields,
    ) -> Result<Option<Article>> {
        sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles
            SET title = $2,
                excerpt = $3,
                content = $4,
                is_published = $5,
                published_on = $6,
                category_id = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, slug, excerpt, content, is_published, published_on,
                      category_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.excerpt)
        .bind(&fields.content)
        .bind(fields.is_published)
        .bind(fields.published_on)
        .bind(fields.category_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| handle_db_error(e, "article"))
    }

    async fn replace_tags(&mut self, article_id: i32, tags: &[Tag]) -> Result<()> {
        sqlx::query("DELETE FROM article_tags WHERE article_id = $1")
            .bind(article_id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| handle_db_error(e, "article tags"))?;

        if tags.is_empty() {
            return Ok(());
        }

        let tag_ids: Vec<i32> = tags.iter().map(|t| t.id).collect();
        sqlx::query(
            r#"
            INSERT INTO article_tags (article_id, tag_id)
            SELECT $1, UNNEST($2::int4[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(&tag_ids)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| handle_db_error(e, "article tags"))?;

        Ok(())
    }

    async fn set_article_files(&mut self, article_id: i32, urls: &[String]) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE uploaded_files
            SET article_id = NULL
            WHERE article_id = $1 AND NOT (url = ANY($2))
            "#,
        )
        .bind(article_id)
        .bind(urls)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| handle_db_error(e, "article files"))?;

        if urls.is_empty() {
            return Ok(());
        }

        sqlx::query("UPDATE uploaded_files SET article_id = $1 WHERE url = ANY($2)")
            .bind(article_id)
            .bind(urls)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| handle_db_error(e, "article files"))?;

        Ok(())
    }

    async fn delete_article(&mut self, id: i32) -> Result<bool> {
        // article_tags and uploaded_files rows cascade
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| handle_db_error(e, "article"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.tx
            .commit()
            .await
            .map_err(|e| handle_db_error(e, "article transaction"))
    }
}
