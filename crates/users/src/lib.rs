//! `tradepost-users` — user accounts and favorites.

pub mod favorites;
pub mod user;

pub use favorites::{add_favorite, remove_favorite};
pub use user::{Registration, User};
