//! Blog articles.
//!
//! Writes derive a unique slug from the title and reconcile free-text tag
//! names into shared tags, all inside one unit of work per request.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/articles` | No | Published articles (search, category, tag, paging) |
//! | GET | `/api/articles/{slug}` | No | One published article |
//! | GET | `/api/admin/articles` | Yes | All articles including drafts |
//! | GET | `/api/admin/articles/{id}` | Yes | One article by ID |
//! | POST | `/api/admin/articles` | Yes | Create article |
//! | PUT | `/api/admin/articles/{id}` | Yes | Update article |
//! | DELETE | `/api/admin/articles/{id}` | Yes | Delete article |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{ArticleStore, PgArticleStore};
pub use services::ArticleService;
