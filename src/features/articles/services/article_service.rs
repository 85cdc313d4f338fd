use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::articles::dtos::{
    ArticleDetailDto, ArticleDto, ArticleListQuery, ArticleSummaryDto,
};
use crate::features::articles::models::ArticleFields;
use crate::features::articles::repositories::{ArticleStore, ArticleUnitOfWork};
use crate::features::tags::reconcile_tags;
use crate::shared::constants::MAX_ARTICLE_SLUG_BASE;
use crate::shared::slug;

/// Outcome of one create attempt
enum CreateAttempt {
    Created(i32),
    /// The resolved slug was inserted by someone else first
    SlugTaken(String),
}

/// Service for article reads and writes
pub struct ArticleService {
    store: Arc<dyn ArticleStore>,
}

impl ArticleService {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    /// Published articles, newest first
    pub async fn list_published(
        &self,
        query: &ArticleListQuery,
    ) -> Result<(Vec<ArticleSummaryDto>, i64)> {
        let (records, total) = self.store.list(&query.to_filter(true)).await?;
        Ok((records.into_iter().map(Into::into).collect(), total))
    }

    /// All articles including drafts
    pub async fn list_all(
        &self,
        query: &ArticleListQuery,
    ) -> Result<(Vec<ArticleSummaryDto>, i64)> {
        let (records, total) = self.store.list(&query.to_filter(false)).await?;
        Ok((records.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get_published_by_slug(&self, slug: &str) -> Result<ArticleDetailDto> {
        self.store
            .find_published_by_slug(slug)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Article '{}' not found", slug)))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<ArticleDetailDto> {
        self.store
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Article {} not found", id)))
    }

    /// Create an article with a unique slug
    ///
    /// The slug comes from `dto.slug` when given, otherwise from the title.
    /// If another writer claims the resolved slug between the check and the
    /// insert, the whole unit of work is retried once with that slug counted
    /// as taken; a second loss is a `Conflict`.
    pub async fn create(&self, dto: ArticleDto) -> Result<ArticleDetailDto> {
        if dto.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        let source = match dto.slug.as_deref() {
            Some(requested) if !requested.trim().is_empty() => requested,
            _ => dto.title.as_str(),
        };
        let base = slug::truncate(&slug::normalize(source), MAX_ARTICLE_SLUG_BASE);
        let fields = article_fields(&dto);

        let id = match self.try_create(&base, &fields, &dto, None).await? {
            CreateAttempt::Created(id) => id,
            CreateAttempt::SlugTaken(collided) => {
                warn!(
                    "Slug '{}' was claimed concurrently, retrying article create",
                    collided
                );
                match self
                    .try_create(&base, &fields, &dto, Some(collided.as_str()))
                    .await?
                {
                    CreateAttempt::Created(id) => id,
                    CreateAttempt::SlugTaken(slug) => {
                        return Err(AppError::Conflict(format!(
                            "Slug '{}' was claimed by a concurrent write",
                            slug
                        )));
                    }
                }
            }
        };

        self.get_by_id(id).await
    }

    async fn try_create(
        &self,
        base: &str,
        fields: &ArticleFields,
        dto: &ArticleDto,
        collided: Option<&str>,
    ) -> Result<CreateAttempt> {
        let mut uow = self.store.begin().await?;

        check_references(uow.as_mut(), fields, &dto.file_urls).await?;

        let taken = uow.taken_slugs(base).await?;
        let slug = slug::resolve_unique(base, |s| taken.contains(s) || collided == Some(s));
        debug!("Resolved slug '{}' from base '{}'", slug, base);

        let tags = reconcile_tags(&dto.tag_names, uow.as_mut()).await?;

        let article = match uow.insert_article(&slug, fields).await {
            Ok(article) => article,
            // The slug is the only unique column on articles
            Err(AppError::Conflict(_)) => return Ok(CreateAttempt::SlugTaken(slug)),
            Err(e) => return Err(e),
        };

        uow.replace_tags(article.id, &tags).await?;
        uow.set_article_files(article.id, &dto.file_urls).await?;
        uow.commit().await?;

        info!(
            "Article created: id={}, slug={}, tags={}",
            article.id,
            article.slug,
            tags.len()
        );

        Ok(CreateAttempt::Created(article.id))
    }

    /// Overwrite an article's fields, tag set and attached files.
    /// The slug is left as it is.
    pub async fn update(&self, id: i32, dto: ArticleDto) -> Result<ArticleDetailDto> {
        let mut uow = self.store.begin().await?;

        if uow.lock_article(id).await?.is_none() {
            return Err(AppError::NotFound(format!("Article {} not found", id)));
        }

        let fields = article_fields(&dto);
        check_references(uow.as_mut(), &fields, &dto.file_urls).await?;

        let tags = reconcile_tags(&dto.tag_names, uow.as_mut()).await?;

        let article = uow
            .update_article(id, &fields)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Article {} not found", id)))?;

        uow.replace_tags(article.id, &tags).await?;
        uow.set_article_files(article.id, &dto.file_urls).await?;
        uow.commit().await?;

        info!(
            "Article updated: id={}, slug={}, tags={}",
            article.id,
            article.slug,
            tags.len()
        );

        self.get_by_id(id).await
    }

    /// Delete an article with its tag associations and attached files
    pub async fn delete(&self, id: i32) -> Result<()> {
        let mut uow = self.store.begin().await?;

        if !uow.delete_article(id).await? {
            return Err(AppError::NotFound(format!("Article {} not found", id)));
        }

        uow.commit().await?;
        info!("Article deleted: id={}", id);

        Ok(())
    }
}

fn article_fields(dto: &ArticleDto) -> ArticleFields {
    ArticleFields {
        title: dto.title.trim().to_string(),
        excerpt: dto.excerpt.clone(),
        content: dto.content.clone(),
        is_published: dto.is_published,
        published_on: ArticleFields::publication_date(
            dto.is_published,
            dto.published_on,
            Utc::now(),
        ),
        category_id: dto.category_id,
    }
}

/// Fail with `NotFound` before any write when the category or a file is unknown
async fn check_references(
    uow: &mut dyn ArticleUnitOfWork,
    fields: &ArticleFields,
    file_urls: &[String],
) -> Result<()> {
    if let Some(category_id) = fields.category_id {
        if !uow.category_exists(category_id).await? {
            return Err(AppError::NotFound(format!(
                "Category {} not found",
                category_id
            )));
        }
    }

    let known = uow.existing_file_urls(file_urls).await?;
    if let Some(missing) = file_urls.iter().find(|url| !known.contains(*url)) {
        return Err(AppError::NotFound(format!(
            "No uploaded file with URL '{}'",
            missing
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::MemoryStore;
    use chrono::TimeZone;
    use fake::faker::lorem::en::{Sentence, Words};
    use fake::Fake;

    fn service(store: &Arc<MemoryStore>) -> ArticleService {
        ArticleService::new(store.clone())
    }

    fn titled(title: &str) -> ArticleDto {
        ArticleDto {
            title: title.to_string(),
            content: "Body".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_derives_slug_from_title() {
        let store = MemoryStore::new();

        let article = service(&store).create(titled("Hello World!")).await.unwrap();

        assert_eq!(article.slug, "hello-world");
        assert_eq!(article.title, "Hello World!");
    }

    #[tokio::test]
    async fn test_create_long_decomposing_title_fits_slug_column() {
        let store = MemoryStore::new();
        let service = service(&store);
        let title = "\u{FB03}".repeat(255);

        let first = service.create(titled(&title)).await.unwrap();
        let second = service.create(titled(&title)).await.unwrap();

        assert_eq!(first.slug.chars().count(), MAX_ARTICLE_SLUG_BASE);
        assert!(first.slug.starts_with("ffi"));
        assert_eq!(second.slug, format!("{}-1", first.slug));
        assert!(second.slug.chars().count() <= 300);
    }

    #[tokio::test]
    async fn test_create_same_title_gets_ascending_suffixes() {
        let store = MemoryStore::new();
        let service = service(&store);

        let first = service.create(titled("Hello World")).await.unwrap();
        let second = service.create(titled("Hello World")).await.unwrap();
        let third = service.create(titled("Hello World")).await.unwrap();

        assert_eq!(first.slug, "hello-world");
        assert_eq!(second.slug, "hello-world-1");
        assert_eq!(third.slug, "hello-world-2");
    }

    #[tokio::test]
    async fn test_create_prefers_requested_slug() {
        let store = MemoryStore::new();
        let dto = ArticleDto {
            slug: Some("My Custom Slug".to_string()),
            ..titled("Whatever")
        };

        let article = service(&store).create(dto).await.unwrap();

        assert_eq!(article.slug, "my-custom-slug");
    }

    #[tokio::test]
    async fn test_create_blank_requested_slug_falls_back_to_title() {
        let store = MemoryStore::new();
        let dto = ArticleDto {
            slug: Some("   ".to_string()),
            ..titled("Fallback Title")
        };

        let article = service(&store).create(dto).await.unwrap();

        assert_eq!(article.slug, "fallback-title");
    }

    #[tokio::test]
    async fn test_create_symbol_only_title_gets_numeric_slug() {
        let store = MemoryStore::new();
        let service = service(&store);

        let first = service.create(titled("!!!")).await.unwrap();
        let second = service.create(titled("???")).await.unwrap();

        assert_eq!(first.slug, "-1");
        assert_eq!(second.slug, "-2");
    }

    #[tokio::test]
    async fn test_create_blank_title_is_rejected_without_writes() {
        let store = MemoryStore::new();

        let err = service(&store).create(titled("   ")).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.snapshot().await.articles.is_empty());
    }

    #[tokio::test]
    async fn test_create_collapses_case_variant_tags() {
        let store = MemoryStore::new();
        let dto = ArticleDto {
            tag_names: vec!["Go".to_string(), "go".to_string(), "GO".to_string()],
            ..titled("Go notes")
        };

        let article = service(&store).create(dto).await.unwrap();

        assert_eq!(article.tags.len(), 1);
        let state = store.snapshot().await;
        assert_eq!(state.tags.len(), 1);
        assert_eq!(state.article_tags.len(), 1);
    }

    #[tokio::test]
    async fn test_create_reuses_existing_tags() {
        let store = MemoryStore::new();
        let service = service(&store);

        service
            .create(ArticleDto {
                tag_names: vec!["Rust".to_string()],
                ..titled("First")
            })
            .await
            .unwrap();
        service
            .create(ArticleDto {
                tag_names: vec!["rust".to_string(), "Axum".to_string()],
                ..titled("Second")
            })
            .await
            .unwrap();

        let state = store.snapshot().await;
        assert_eq!(state.tags.len(), 2);
        assert_eq!(state.article_tags.len(), 3);
    }

    #[tokio::test]
    async fn test_create_unpublished_ignores_published_on() {
        let store = MemoryStore::new();
        let requested = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let dto = ArticleDto {
            is_published: false,
            published_on: Some(requested),
            ..titled("Draft")
        };

        let article = service(&store).create(dto).await.unwrap();

        assert!(!article.is_published);
        assert_eq!(article.published_on, None);
    }

    #[tokio::test]
    async fn test_create_published_defaults_published_on() {
        let store = MemoryStore::new();
        let before = Utc::now();
        let dto = ArticleDto {
            is_published: true,
            ..titled("Live")
        };

        let article = service(&store).create(dto).await.unwrap();

        let published_on = article.published_on.unwrap();
        assert!(published_on >= before);
    }

    #[tokio::test]
    async fn test_create_unknown_category_is_not_found() {
        let store = MemoryStore::new();
        let dto = ArticleDto {
            category_id: Some(77),
            tag_names: vec!["orphan".to_string()],
            ..titled("Lost")
        };

        let err = service(&store).create(dto).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        let state = store.snapshot().await;
        assert!(state.articles.is_empty());
        assert!(state.tags.is_empty());
    }

    #[tokio::test]
    async fn test_create_unknown_file_url_is_not_found() {
        let store = MemoryStore::new();
        let dto = ArticleDto {
            file_urls: vec!["http://files.local/never-uploaded.png".to_string()],
            ..titled("Attachment")
        };

        let err = service(&store).create(dto).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.snapshot().await.articles.is_empty());
    }

    #[tokio::test]
    async fn test_create_attaches_uploaded_files() {
        let store = MemoryStore::new();
        let file = store.seed_file("http://files.local/cover.png", None).await;
        let dto = ArticleDto {
            file_urls: vec![file.url.clone()],
            ..titled("With cover")
        };

        let article = service(&store).create(dto).await.unwrap();

        assert_eq!(article.files.len(), 1);
        assert_eq!(article.files[0].url, file.url);
        assert_eq!(article.files[0].article_id, Some(article.id));
    }

    #[tokio::test]
    async fn test_create_retries_once_after_lost_slug_race() {
        let store = MemoryStore::new();
        store.simulate_slug_race("hello-world").await;

        let article = service(&store).create(titled("Hello World")).await.unwrap();

        assert_eq!(article.slug, "hello-world-1");
        let state = store.snapshot().await;
        assert_eq!(state.articles.len(), 2);
    }

    #[tokio::test]
    async fn test_create_second_lost_race_is_conflict() {
        let store = MemoryStore::new();
        store.simulate_slug_race("hello-world").await;
        store.simulate_slug_race("hello-world-1").await;

        let err = service(&store)
            .create(ArticleDto {
                tag_names: vec!["race".to_string()],
                ..titled("Hello World")
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        let state = store.snapshot().await;
        // Only the two competing writers' articles exist
        assert_eq!(state.articles.len(), 2);
        assert!(state.tags.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_article_leaves_storage_unchanged() {
        let store = MemoryStore::new();
        store.seed_article("existing", true, None).await;
        let before = store.snapshot().await;

        let err = service(&store)
            .update(
                999,
                ArticleDto {
                    tag_names: vec!["new-tag".to_string()],
                    ..titled("Changed")
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_update_keeps_slug_and_replaces_tags() {
        let store = MemoryStore::new();
        let service = service(&store);
        let created = service
            .create(ArticleDto {
                tag_names: vec!["old".to_string(), "shared".to_string()],
                ..titled("Original Title")
            })
            .await
            .unwrap();

        let updated = service
            .update(
                created.id,
                ArticleDto {
                    slug: Some("ignored-on-update".to_string()),
                    tag_names: vec!["Shared".to_string(), "fresh".to_string()],
                    ..titled("Renamed Title")
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.slug, "original-title");
        assert_eq!(updated.title, "Renamed Title");
        let mut tags = updated.tags.clone();
        tags.sort();
        assert_eq!(tags, vec!["fresh".to_string(), "shared".to_string()]);
    }

    #[tokio::test]
    async fn test_update_allows_blank_title() {
        let store = MemoryStore::new();
        let article = store.seed_article("kept-slug", false, None).await;

        let updated = service(&store)
            .update(article.id, titled(""))
            .await
            .unwrap();

        assert_eq!(updated.title, "");
        assert_eq!(updated.slug, "kept-slug");
    }

    #[tokio::test]
    async fn test_update_unpublish_clears_published_on() {
        let store = MemoryStore::new();
        let article = store.seed_article("was-live", true, None).await;
        assert!(article.published_on.is_some());

        let updated = service(&store)
            .update(
                article.id,
                ArticleDto {
                    is_published: false,
                    published_on: Some(Utc::now()),
                    ..titled("Back to draft")
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.published_on, None);
    }

    #[tokio::test]
    async fn test_update_replaces_attached_files() {
        let store = MemoryStore::new();
        let article = store.seed_article("gallery", true, None).await;
        let old = store.seed_file("http://files.local/old.png", Some(article.id)).await;
        let new = store.seed_file("http://files.local/new.png", None).await;

        let updated = service(&store)
            .update(
                article.id,
                ArticleDto {
                    is_published: true,
                    file_urls: vec![new.url.clone()],
                    ..titled("Gallery")
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.files.len(), 1);
        assert_eq!(updated.files[0].url, new.url);
        let state = store.snapshot().await;
        let detached = state.files.iter().find(|f| f.id == old.id).unwrap();
        assert_eq!(detached.article_id, None);
    }

    #[tokio::test]
    async fn test_delete_removes_article_and_associations() {
        let store = MemoryStore::new();
        let service = service(&store);
        let created = service
            .create(ArticleDto {
                tag_names: vec!["gone".to_string()],
                ..titled("Short lived")
            })
            .await
            .unwrap();

        service.delete(created.id).await.unwrap();

        let state = store.snapshot().await;
        assert!(state.articles.is_empty());
        assert!(state.article_tags.is_empty());
        let err = service.get_by_id(created.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_article_is_not_found() {
        let store = MemoryStore::new();

        let err = service(&store).delete(5).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_public_reads_hide_drafts() {
        let store = MemoryStore::new();
        store.seed_article("live-post", true, None).await;
        store.seed_article("draft-post", false, None).await;
        let service = service(&store);

        let (published, total) = service
            .list_published(&ArticleListQuery::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(published[0].slug, "live-post");

        let (all, total) = service.list_all(&ArticleListQuery::default()).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(all.len(), 2);

        assert!(service.get_published_by_slug("live-post").await.is_ok());
        let err = service.get_published_by_slug("draft-post").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_filters_by_tag_and_search() {
        let store = MemoryStore::new();
        let service = service(&store);
        service
            .create(ArticleDto {
                is_published: true,
                tag_names: vec!["Rust".to_string()],
                ..titled("Ownership explained")
            })
            .await
            .unwrap();
        service
            .create(ArticleDto {
                is_published: true,
                tag_names: vec!["Go".to_string()],
                ..titled("Goroutines explained")
            })
            .await
            .unwrap();

        let by_tag = ArticleListQuery {
            tag: Some("rust".to_string()),
            ..Default::default()
        };
        let (items, total) = service.list_published(&by_tag).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].title, "Ownership explained");

        let by_search = ArticleListQuery {
            search: Some("EXPLAINED".to_string()),
            page_size: 1,
            ..Default::default()
        };
        let (items, total) = service.list_published(&by_search).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_random_creates_keep_slugs_unique() {
        let store = MemoryStore::new();
        let service = service(&store);
        let titles: Vec<String> = (0..5).map(|_| Sentence(1..4).fake()).collect();

        for i in 0..30 {
            let words: Vec<String> = Words(0..6).fake();
            let dto = ArticleDto {
                tag_names: words,
                ..titled(&titles[i % titles.len()])
            };
            service.create(dto).await.unwrap();
        }

        let state = store.snapshot().await;
        let mut slugs: Vec<&str> = state.articles.values().map(|a| a.slug.as_str()).collect();
        let count = slugs.len();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), count);

        let mut lowered: Vec<String> = state.tags.values().map(|t| t.name.to_lowercase()).collect();
        let tag_count = lowered.len();
        lowered.sort();
        lowered.dedup();
        assert_eq!(lowered.len(), tag_count);
    }
}
