//! `tradepost-store` — persistence for users, listings, and orders.
//!
//! The store seam is a set of async traits with two implementations: a
//! Postgres-backed one for production and an in-memory one for tests and
//! local development. No storage assumptions leak above the traits.

mod r#trait;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{OrderStore, ProductStore, StoreError, UserStore};
