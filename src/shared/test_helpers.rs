//! In-memory collaborators and auth injection for service and HTTP tests

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::Utc;
use tokio::sync::Mutex;

use crate::core::error::{AppError, Result};
use crate::features::articles::models::{Article, ArticleFields, ArticleFilter, ArticleRecord};
use crate::features::articles::repositories::{ArticleStore, ArticleUnitOfWork};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::models::Category;
use crate::features::categories::repositories::CategoryRepository;
use crate::features::files::models::{NewUploadedFile, UploadedFile};
use crate::features::files::repositories::FileRepository;
use crate::features::tags::{Tag, TagSource};
use crate::modules::storage::{ObjectStorage, StoredObject};
use crate::shared::slug;

// =============================================================================
// AUTH
// =============================================================================

pub fn create_editor_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "test-editor".to_string(),
        name: Some("Test Editor".to_string()),
        roles: vec!["editor".to_string()],
    }
}

async fn inject_editor_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_editor_user());
    next.run(request).await
}

/// Wrap a router so every request arrives authenticated
pub fn with_editor_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_editor_middleware))
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Committed contents of a [`MemoryStore`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryState {
    pub articles: BTreeMap<i32, Article>,
    pub categories: BTreeMap<i32, Category>,
    pub tags: BTreeMap<i32, Tag>,
    /// (article_id, tag_id)
    pub article_tags: BTreeSet<(i32, i32)>,
    pub files: Vec<UploadedFile>,
    last_id: i32,
}

impl MemoryState {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn record(&self, article: &Article) -> ArticleRecord {
        let category = article
            .category_id
            .and_then(|id| self.categories.get(&id).cloned());

        let mut tags: Vec<Tag> = self
            .article_tags
            .iter()
            .filter(|(article_id, _)| *article_id == article.id)
            .filter_map(|(_, tag_id)| self.tags.get(tag_id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        let files = self
            .files
            .iter()
            .filter(|f| f.article_id == Some(article.id))
            .cloned()
            .collect();

        ArticleRecord {
            article: article.clone(),
            category,
            tags,
            files,
        }
    }

    fn matches(&self, article: &Article, filter: &ArticleFilter) -> bool {
        if filter.published_only && !article.is_published {
            return false;
        }
        if filter.category_id.is_some() && article.category_id != filter.category_id {
            return false;
        }
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let found = [&article.title, &article.excerpt, &article.content]
                .iter()
                .any(|text| text.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }
        if let Some(tag) = &filter.tag {
            let wanted = tag.to_lowercase();
            let tagged = self.article_tags.iter().any(|(article_id, tag_id)| {
                *article_id == article.id
                    && self
                        .tags
                        .get(tag_id)
                        .is_some_and(|t| t.name.to_lowercase() == wanted)
            });
            if !tagged {
                return false;
            }
        }
        true
    }

    fn insert_article(&mut self, slug: &str, fields: &ArticleFields) -> Article {
        let now = Utc::now();
        let article = Article {
            id: self.next_id(),
            title: fields.title.clone(),
            slug: slug.to_string(),
            excerpt: fields.excerpt.clone(),
            content: fields.content.clone(),
            is_published: fields.is_published,
            published_on: fields.published_on,
            category_id: fields.category_id,
            created_at: now,
            updated_at: now,
        };
        self.articles.insert(article.id, article.clone());
        article
    }
}

struct MemoryInner {
    state: Mutex<MemoryState>,
    /// Slugs a competing writer will claim the next time they are inserted
    races: Mutex<HashSet<String>>,
}

/// Transactional in-memory store backing every persistence trait.
///
/// A unit of work edits a private copy of the state and swaps it in on
/// commit, so dropped units of work leave no trace.
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Arc::new(MemoryInner {
                state: Mutex::new(MemoryState::default()),
                races: Mutex::new(HashSet::new()),
            }),
        })
    }

    pub async fn snapshot(&self) -> MemoryState {
        self.inner.state.lock().await.clone()
    }

    /// The next insert of `slug` loses to a concurrent writer that commits
    /// an article with the same slug first
    pub async fn simulate_slug_race(&self, slug: &str) {
        self.inner.races.lock().await.insert(slug.to_string());
    }

    pub async fn seed_category(&self, name: &str) -> Category {
        let mut state = self.inner.state.lock().await;
        let category = Category {
            id: state.next_id(),
            name: name.to_string(),
            slug: slug::normalize(name),
        };
        state.categories.insert(category.id, category.clone());
        category
    }

    /// Article titled after its slug
    pub async fn seed_article(
        &self,
        slug: &str,
        is_published: bool,
        category_id: Option<i32>,
    ) -> Article {
        let fields = ArticleFields {
            title: slug.to_string(),
            excerpt: String::new(),
            content: String::new(),
            is_published,
            published_on: is_published.then(Utc::now),
            category_id,
        };
        self.inner.state.lock().await.insert_article(slug, &fields)
    }

    pub async fn seed_file(&self, url: &str, article_id: Option<i32>) -> UploadedFile {
        let mut state = self.inner.state.lock().await;
        let file = UploadedFile {
            id: state.next_id(),
            file_name: url.rsplit('/').next().unwrap_or(url).to_string(),
            file_key: format!("public/{}", url.rsplit('/').next().unwrap_or(url)),
            url: url.to_string(),
            content_type: "image/png".to_string(),
            size: 1,
            article_id,
            uploaded_by: "seed".to_string(),
            created_at: Utc::now(),
        };
        state.files.push(file.clone());
        file
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn ArticleUnitOfWork>> {
        let working = self.inner.state.lock().await.clone();
        Ok(Box::new(MemoryUnitOfWork {
            inner: Arc::clone(&self.inner),
            working,
        }))
    }

    async fn list(&self, filter: &ArticleFilter) -> Result<(Vec<ArticleRecord>, i64)> {
        let state = self.inner.state.lock().await;

        let mut matching: Vec<&Article> = state
            .articles
            .values()
            .filter(|a| state.matches(a, filter))
            .collect();
        // published_on DESC NULLS LAST, id DESC
        matching.sort_by(|a, b| {
            match (a.published_on, b.published_on) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then(b.id.cmp(&a.id))
        });

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .map(|a| state.record(a))
            .collect();

        Ok((page, total))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ArticleRecord>> {
        let state = self.inner.state.lock().await;
        Ok(state.articles.get(&id).map(|a| state.record(a)))
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<ArticleRecord>> {
        let state = self.inner.state.lock().await;
        Ok(state
            .articles
            .values()
            .find(|a| a.slug == slug && a.is_published)
            .map(|a| state.record(a)))
    }
}

struct MemoryUnitOfWork {
    inner: Arc<MemoryInner>,
    working: MemoryState,
}

#[async_trait]
impl TagSource for MemoryUnitOfWork {
    async fn find_or_create_tag(&mut self, name: &str) -> Result<Tag> {
        let lowered = name.to_lowercase();
        if let Some(tag) = self
            .working
            .tags
            .values()
            .find(|t| t.name.to_lowercase() == lowered)
        {
            return Ok(tag.clone());
        }

        let tag = Tag {
            id: self.working.next_id(),
            name: name.to_string(),
        };
        self.working.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }
}

#[async_trait]
impl ArticleUnitOfWork for MemoryUnitOfWork {
    async fn lock_article(&mut self, id: i32) -> Result<Option<Article>> {
        Ok(self.working.articles.get(&id).cloned())
    }

    async fn taken_slugs(&mut self, base: &str) -> Result<HashSet<String>> {
        let variant_prefix = format!("{}-", base);
        Ok(self
            .working
            .articles
            .values()
            .filter(|a| a.slug == base || a.slug.starts_with(&variant_prefix))
            .map(|a| a.slug.clone())
            .collect())
    }

    async fn category_exists(&mut self, id: i32) -> Result<bool> {
        Ok(self.working.categories.contains_key(&id))
    }

    async fn existing_file_urls(&mut self, urls: &[String]) -> Result<HashSet<String>> {
        Ok(self
            .working
            .files
            .iter()
            .filter(|f| urls.contains(&f.url))
            .map(|f| f.url.clone())
            .collect())
    }

    async fn insert_article(&mut self, slug: &str, fields: &ArticleFields) -> Result<Article> {
        if self.inner.races.lock().await.remove(slug) {
            let competitor = ArticleFields {
                title: format!("Concurrent {}", slug),
                ..fields.clone()
            };
            self.inner
                .state
                .lock()
                .await
                .insert_article(slug, &competitor);
            return Err(AppError::Conflict(
                "article violates constraint 'articles_slug_key'".to_string(),
            ));
        }

        if self.working.articles.values().any(|a| a.slug == slug) {
            return Err(AppError::Conflict(
                "article violates constraint 'articles_slug_key'".to_string(),
            ));
        }

        Ok(self.working.insert_article(slug, fields))
    }

    async fn update_article(
        &mut self,
        id: i32,
        fields: &ArticleFields,
    ) -> Result<Option<Article>> {
        let Some(article) = self.working.articles.get_mut(&id) else {
            return Ok(None);
        };

        article.title = fields.title.clone();
        article.excerpt = fields.excerpt.clone();
        article.content = fields.content.clone();
        article.is_published = fields.is_published;
        article.published_on = fields.published_on;
        article.category_id = fields.category_id;
        article.updated_at = Utc::now();

        Ok(Some(article.clone()))
    }

    async fn replace_tags(&mut self, article_id: i32, tags: &[Tag]) -> Result<()> {
        self.working
            .article_tags
            .retain(|(owner, _)| *owner != article_id);
        for tag in tags {
            self.working.article_tags.insert((article_id, tag.id));
        }
        Ok(())
    }

    async fn set_article_files(&mut self, article_id: i32, urls: &[String]) -> Result<()> {
        for file in self.working.files.iter_mut() {
            if urls.contains(&file.url) {
                file.article_id = Some(article_id);
            } else if file.article_id == Some(article_id) {
                file.article_id = None;
            }
        }
        Ok(())
    }

    async fn delete_article(&mut self, id: i32) -> Result<bool> {
        if self.working.articles.remove(&id).is_none() {
            return Ok(false);
        }
        self.working.article_tags.retain(|(owner, _)| *owner != id);
        self.working.files.retain(|f| f.article_id != Some(id));
        Ok(true)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        *this.inner.state.lock().await = this.working;
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Category>> {
        let state = self.inner.state.lock().await;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn taken_slugs(&self, base: &str) -> Result<HashSet<String>> {
        let state = self.inner.state.lock().await;
        let variant_prefix = format!("{}-", base);
        Ok(state
            .categories
            .values()
            .filter(|c| c.slug == base || c.slug.starts_with(&variant_prefix))
            .map(|c| c.slug.clone())
            .collect())
    }

    async fn insert(&self, name: &str, slug: &str) -> Result<Category> {
        let mut state = self.inner.state.lock().await;
        if state
            .categories
            .values()
            .any(|c| c.name == name || c.slug == slug)
        {
            return Err(AppError::Conflict(
                "category violates constraint 'categories_name_key'".to_string(),
            ));
        }

        let category = Category {
            id: state.next_id(),
            name: name.to_string(),
            slug: slug.to_string(),
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let mut state = self.inner.state.lock().await;
        if state.categories.remove(&id).is_none() {
            return Ok(false);
        }
        for article in state.articles.values_mut() {
            if article.category_id == Some(id) {
                article.category_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl FileRepository for MemoryStore {
    async fn insert(&self, file: &NewUploadedFile) -> Result<UploadedFile> {
        let mut state = self.inner.state.lock().await;
        if let Some(article_id) = file.article_id {
            if !state.articles.contains_key(&article_id) {
                return Err(AppError::NotFound(
                    "uploaded file references a record that does not exist".to_string(),
                ));
            }
        }

        let stored = UploadedFile {
            id: state.next_id(),
            file_name: file.file_name.clone(),
            file_key: file.file_key.clone(),
            url: file.url.clone(),
            content_type: file.content_type.clone(),
            size: file.size,
            article_id: file.article_id,
            uploaded_by: file.uploaded_by.clone(),
            created_at: Utc::now(),
        };
        state.files.push(stored.clone());
        Ok(stored)
    }
}

// =============================================================================
// OBJECT STORAGE
// =============================================================================

/// Object storage kept in a map keyed by object key
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn keys(&self) -> Vec<String> {
        self.objects.lock().await.keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(
        &self,
        path: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> std::result::Result<StoredObject, AppError> {
        let key = format!("public/{}", path);
        self.objects.lock().await.insert(key.clone(), data);
        Ok(StoredObject {
            url: format!("http://storage.test/blog-uploads/{}", key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> std::result::Result<(), AppError> {
        self.objects.lock().await.remove(key);
        Ok(())
    }
}
