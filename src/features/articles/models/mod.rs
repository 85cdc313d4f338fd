mod article;

pub use article::{Article, ArticleFields, ArticleFilter, ArticleRecord};
