//! Tags attached to articles.
//!
//! Tags have no endpoints of their own; they are created and associated as a
//! side effect of article writes through [`services::reconcile_tags`].

pub mod models;
pub mod services;

pub use models::Tag;
pub use services::{reconcile_tags, TagSource};
