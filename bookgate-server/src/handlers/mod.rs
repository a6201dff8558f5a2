//! HTTP request handlers

mod auth;
mod books;
mod health;
mod users;

pub use auth::authorize;
pub use books::{create_book, list_books};
pub use health::{health_live, health_ready, metrics};
pub use users::update_role;
