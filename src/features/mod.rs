pub mod articles;
pub mod auth;
pub mod categories;
pub mod files;
pub mod tags;
