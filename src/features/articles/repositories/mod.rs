use std::collections::HashSet;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::articles::models::{Article, ArticleFields, ArticleFilter, ArticleRecord};
use crate::features::tags::{Tag, TagSource};

mod pg_article_store;

pub use pg_article_store::PgArticleStore;

/// Read access to articles plus the entry point for writes
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Open a unit of work. Nothing it writes is visible until `commit`;
    /// dropping it discards everything.
    async fn begin(&self) -> Result<Box<dyn ArticleUnitOfWork>>;

    /// One page of articles matching `filter`, plus the total match count
    async fn list(&self, filter: &ArticleFilter) -> Result<(Vec<ArticleRecord>, i64)>;

    async fn find_by_id(&self, id: i32) -> Result<Option<ArticleRecord>>;

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<ArticleRecord>>;
}

/// Writes for a single article operation, applied atomically on `commit`
#[async_trait]
pub trait ArticleUnitOfWork: TagSource {
    /// Fetch an article and hold it against concurrent writers
    async fn lock_article(&mut self, id: i32) -> Result<Option<Article>>;

    /// Slugs currently equal to `base` or of the form `base-N`
    async fn taken_slugs(&mut self, base: &str) -> Result<HashSet<String>>;

    async fn category_exists(&mut self, id: i32) -> Result<bool>;

    /// The subset of `urls` that belong to uploaded files
    async fn existing_file_urls(&mut self, urls: &[String]) -> Result<HashSet<String>>;

    /// Insert an article. A slug that is already taken is a `Conflict`.
    async fn insert_article(&mut self, slug: &str, fields: &ArticleFields) -> Result<Article>;

    async fn update_article(&mut self, id: i32, fields: &ArticleFields)
        -> Result<Option<Article>>;

    /// Make `tags` the article's complete tag set
    async fn replace_tags(&mut self, article_id: i32, tags: &[Tag]) -> Result<()>;

    /// Make the files at `urls` the article's complete attachment set
    async fn set_article_files(&mut self, article_id: i32, urls: &[String]) -> Result<()>;

    /// Returns `false` when no such article exists
    async fn delete_article(&mut self, id: i32) -> Result<bool>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
