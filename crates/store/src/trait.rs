use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use tradepost_catalog::{CatalogQuery, Listing, ListingUpdate};
use tradepost_core::{ProductId, UserId};
use tradepost_orders::Order;
use tradepost_users::User;

/// Store operation error.
///
/// These are infrastructure failures plus the few storage-enforced rules
/// (unique email). Domain validation happens before a store call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email is already registered")]
    EmailTaken,

    #[error("not found")]
    NotFound,

    #[error("storage error: {0}")]
    Backend(String),
}

/// User accounts and their favorites.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with [`StoreError::EmailTaken`] when the
    /// email is already registered.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Append `product` to the user's favorites if absent (idempotent).
    /// Returns the updated favorites list in insertion order.
    async fn add_favorite(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<Vec<ProductId>, StoreError>;

    /// Remove `product` from the user's favorites; removing an absent id
    /// is a no-op. Returns the updated favorites list.
    async fn remove_favorite(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<Vec<ProductId>, StoreError>;

    async fn favorites(&self, user: UserId) -> Result<Vec<ProductId>, StoreError>;
}

/// Product listings and catalog queries.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert_listing(&self, listing: &Listing) -> Result<(), StoreError>;

    async fn listing(&self, id: ProductId) -> Result<Option<Listing>, StoreError>;

    /// Resolve several listings, preserving the input order and skipping
    /// ids that no longer exist (favorites may point at deleted listings).
    async fn listings_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Listing>, StoreError>;

    /// Owner-scoped update; `None` when no listing with this id belongs
    /// to `owner`.
    async fn update_owned(
        &self,
        id: ProductId,
        owner: UserId,
        update: ListingUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Listing>, StoreError>;

    /// Owner-scoped delete; `false` when nothing matched.
    async fn delete_owned(&self, id: ProductId, owner: UserId) -> Result<bool, StoreError>;

    /// All listings of `owner`, newest first.
    async fn listings_by_owner(&self, owner: UserId) -> Result<Vec<Listing>, StoreError>;

    /// One page of unsold listings matching `query`, newest first.
    async fn search_unsold(&self, query: &CatalogQuery) -> Result<Vec<Listing>, StoreError>;

    /// Total unsold listings matching `query`. Runs as a separate query
    /// from [`Self::search_unsold`]; under concurrent writes the two can
    /// disagree transiently.
    async fn count_unsold(&self, query: &CatalogQuery) -> Result<u64, StoreError>;

    /// Flip the sold flag to true and touch `updated_at`. The order
    /// workflow's second write.
    async fn mark_sold(&self, id: ProductId, now: DateTime<Utc>) -> Result<(), StoreError>;
}

/// Placed orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: &Order) -> Result<(), StoreError>;

    /// All orders placed by `buyer`, newest first.
    async fn orders_by_buyer(&self, buyer: UserId) -> Result<Vec<Order>, StoreError>;
}
