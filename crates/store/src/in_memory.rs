//! In-memory store.
//!
//! Intended for tests/dev. Not optimized for performance.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tradepost_catalog::{CatalogQuery, Listing, ListingUpdate};
use tradepost_core::{ProductId, UserId};
use tradepost_orders::Order;
use tradepost_users::{self as users, User};

use crate::r#trait::{OrderStore, ProductStore, StoreError, UserStore};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    listings: RwLock<HashMap<ProductId, Listing>>,
    orders: RwLock<Vec<Order>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

// Tie-break on the (time-ordered) id so sorts stay total with equal timestamps.
fn newest_first(listings: &mut [Listing]) {
    listings.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then(b.id.as_uuid().cmp(a.id.as_uuid()))
    });
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::EmailTaken);
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn add_favorite(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<Vec<ProductId>, StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;
        let user = users.get_mut(&user).ok_or(StoreError::NotFound)?;
        users::add_favorite(&mut user.favorites, product);
        Ok(user.favorites.clone())
    }

    async fn remove_favorite(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<Vec<ProductId>, StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;
        let user = users.get_mut(&user).ok_or(StoreError::NotFound)?;
        users::remove_favorite(&mut user.favorites, product);
        Ok(user.favorites.clone())
    }

    async fn favorites(&self, user: UserId) -> Result<Vec<ProductId>, StoreError> {
        let users = self.users.read().map_err(poisoned)?;
        let user = users.get(&user).ok_or(StoreError::NotFound)?;
        Ok(user.favorites.clone())
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn insert_listing(&self, listing: &Listing) -> Result<(), StoreError> {
        let mut listings = self.listings.write().map_err(poisoned)?;
        listings.insert(listing.id, listing.clone());
        Ok(())
    }

    async fn listing(&self, id: ProductId) -> Result<Option<Listing>, StoreError> {
        let listings = self.listings.read().map_err(poisoned)?;
        Ok(listings.get(&id).cloned())
    }

    async fn listings_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Listing>, StoreError> {
        let listings = self.listings.read().map_err(poisoned)?;
        Ok(ids.iter().filter_map(|id| listings.get(id).cloned()).collect())
    }

    async fn update_owned(
        &self,
        id: ProductId,
        owner: UserId,
        update: ListingUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Listing>, StoreError> {
        let mut listings = self.listings.write().map_err(poisoned)?;
        match listings.get_mut(&id) {
            Some(listing) if listing.owner == owner => {
                listing
                    .apply_update(update, now)
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                Ok(Some(listing.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_owned(&self, id: ProductId, owner: UserId) -> Result<bool, StoreError> {
        let mut listings = self.listings.write().map_err(poisoned)?;
        match listings.get(&id) {
            Some(listing) if listing.owner == owner => {
                listings.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn listings_by_owner(&self, owner: UserId) -> Result<Vec<Listing>, StoreError> {
        let listings = self.listings.read().map_err(poisoned)?;
        let mut mine: Vec<Listing> = listings
            .values()
            .filter(|l| l.owner == owner)
            .cloned()
            .collect();
        newest_first(&mut mine);
        Ok(mine)
    }

    async fn search_unsold(&self, query: &CatalogQuery) -> Result<Vec<Listing>, StoreError> {
        let listings = self.listings.read().map_err(poisoned)?;
        let mut matched: Vec<Listing> = listings
            .values()
            .filter(|l| !l.sold && query.matches(&l.title, &l.description))
            .cloned()
            .collect();
        newest_first(&mut matched);
        let page = matched
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit() as usize)
            .collect();
        Ok(page)
    }

    async fn count_unsold(&self, query: &CatalogQuery) -> Result<u64, StoreError> {
        let listings = self.listings.read().map_err(poisoned)?;
        let count = listings
            .values()
            .filter(|l| !l.sold && query.matches(&l.title, &l.description))
            .count();
        Ok(count as u64)
    }

    async fn mark_sold(&self, id: ProductId, now: DateTime<Utc>) -> Result<(), StoreError> {
        let mut listings = self.listings.write().map_err(poisoned)?;
        let listing = listings.get_mut(&id).ok_or(StoreError::NotFound)?;
        listing.sold = true;
        listing.updated_at = now;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().map_err(poisoned)?;
        orders.push(order.clone());
        Ok(())
    }

    async fn orders_by_buyer(&self, buyer: UserId) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().map_err(poisoned)?;
        let mut mine: Vec<Order> = orders.iter().filter(|o| o.buyer == buyer).cloned().collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradepost_catalog::NewListing;
    use tradepost_users::Registration;

    fn user(name: &str) -> User {
        User::new(
            &Registration {
                username: name.to_string(),
                email: format!("{name}@example.com"),
                password: "password123".to_string(),
            },
            "hash".to_string(),
            Utc::now(),
        )
    }

    fn listing(owner: UserId, title: &str) -> Listing {
        Listing::new(
            NewListing {
                title: title.to_string(),
                price: 100,
                description: format!("description of {title}"),
                image: String::new(),
            },
            owner,
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        let a = user("john");
        let mut b = user("johnny");
        b.email = a.email.clone();

        store.insert_user(&a).await.unwrap();
        assert!(matches!(
            store.insert_user(&b).await,
            Err(StoreError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn favorites_round_trip_is_idempotent() {
        let store = InMemoryStore::new();
        let u = user("john");
        store.insert_user(&u).await.unwrap();

        let p = ProductId::new();
        let first = store.add_favorite(u.id, p).await.unwrap();
        let second = store.add_favorite(u.id, p).await.unwrap();
        assert_eq!(first, vec![p]);
        assert_eq!(second, vec![p]);

        let after_remove = store.remove_favorite(u.id, p).await.unwrap();
        assert!(after_remove.is_empty());
        let after_absent_remove = store.remove_favorite(u.id, p).await.unwrap();
        assert!(after_absent_remove.is_empty());
    }

    #[tokio::test]
    async fn search_excludes_sold_and_respects_paging() {
        let store = InMemoryStore::new();
        let owner = UserId::new();
        for i in 0..15 {
            store
                .insert_listing(&listing(owner, &format!("Book {i}")))
                .await
                .unwrap();
        }
        let sold = listing(owner, "Sold Book");
        store.insert_listing(&sold).await.unwrap();
        store.mark_sold(sold.id, Utc::now()).await.unwrap();

        let q = CatalogQuery::new(Some("book".to_string()), Some(1), Some(10));
        let page = store.search_unsold(&q).await.unwrap();
        let total = store.count_unsold(&q).await.unwrap();

        assert_eq!(page.len(), 10);
        assert_eq!(total, 15);
        assert!(page.iter().all(|l| !l.sold));

        let q2 = CatalogQuery::new(Some("book".to_string()), Some(2), Some(10));
        assert_eq!(store.search_unsold(&q2).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn mark_sold_flips_the_flag_and_touches_updated_at() {
        let store = InMemoryStore::new();
        let l = listing(UserId::new(), "Clock");
        store.insert_listing(&l).await.unwrap();

        let later = l.updated_at + chrono::Duration::minutes(5);
        store.mark_sold(l.id, later).await.unwrap();

        let sold = store.listing(l.id).await.unwrap().unwrap();
        assert!(sold.sold);
        assert_eq!(sold.updated_at, later);
    }

    #[tokio::test]
    async fn owner_scoped_update_and_delete_miss_for_non_owner() {
        let store = InMemoryStore::new();
        let owner = UserId::new();
        let other = UserId::new();
        let l = listing(owner, "Lamp");
        store.insert_listing(&l).await.unwrap();

        let update = ListingUpdate {
            price: Some(200),
            ..ListingUpdate::default()
        };
        assert!(store
            .update_owned(l.id, other, update.clone(), Utc::now())
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete_owned(l.id, other).await.unwrap());

        let updated = store
            .update_owned(l.id, owner, update, Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.price, 200);
        assert!(store.delete_owned(l.id, owner).await.unwrap());
        assert!(store.listing(l.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn orders_are_listed_newest_first_per_buyer() {
        let store = InMemoryStore::new();
        let buyer = UserId::new();
        let first = Order::new(
            buyer,
            ProductId::new(),
            "addr".to_string(),
            "555".to_string(),
            Utc::now() - chrono::Duration::minutes(1),
        );
        let second = Order::new(
            buyer,
            ProductId::new(),
            "addr".to_string(),
            "555".to_string(),
            Utc::now(),
        );
        let foreign = Order::new(
            UserId::new(),
            ProductId::new(),
            "addr".to_string(),
            "555".to_string(),
            Utc::now(),
        );
        store.insert_order(&first).await.unwrap();
        store.insert_order(&second).await.unwrap();
        store.insert_order(&foreign).await.unwrap();

        let mine = store.orders_by_buyer(buyer).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, second.id);
        assert_eq!(mine[1].id, first.id);
    }
}
