//! Article categories.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/categories` | No | List categories |
//! | GET | `/api/admin/categories` | Yes | List categories |
//! | POST | `/api/admin/categories` | Yes | Create category |
//! | DELETE | `/api/admin/categories/{id}` | Yes | Delete category (articles keep existing) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{CategoryRepository, PgCategoryRepository};
pub use services::CategoryService;
