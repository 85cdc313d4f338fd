//! File uploads for article attachments.
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/admin/files/upload` | Yes | Upload a file, optionally owned by an article |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::{FileRepository, PgFileRepository};
pub use services::FileService;
