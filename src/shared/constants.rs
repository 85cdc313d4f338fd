/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Maximum length of a tag name, in characters (matches `tags.name`)
pub const MAX_TAG_LENGTH: usize = 100;

/// Longest slug base for articles; leaves room for a `-N` suffix within `articles.slug`
pub const MAX_ARTICLE_SLUG_BASE: usize = 256;

/// Longest slug base for categories; leaves room for a `-N` suffix within `categories.slug`
pub const MAX_CATEGORY_SLUG_BASE: usize = 96;
