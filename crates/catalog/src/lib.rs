//! `tradepost-catalog` — product listings.

pub mod listing;
pub mod query;

pub use listing::{Listing, ListingUpdate, NewListing};
pub use query::CatalogQuery;
