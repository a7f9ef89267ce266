//! Postgres-backed store.
//!
//! Every query is parameterized through the sqlx connection pool; the
//! pool is thread-safe and shared by clone. `ensure_schema` bootstraps
//! the tables so a fresh database works without an external migration
//! step.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use tradepost_catalog::{CatalogQuery, Listing, ListingUpdate};
use tradepost_core::{OrderId, ProductId, UserId};
use tradepost_orders::{Order, OrderStatus};
use tradepost_users::User;

use crate::r#trait::{OrderStore, ProductStore, StoreError, UserStore};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                username TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                price BIGINT NOT NULL,
                description TEXT NOT NULL,
                image TEXT NOT NULL DEFAULT '',
                owner_id UUID NOT NULL REFERENCES users(id),
                sold BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id UUID PRIMARY KEY,
                buyer_id UUID NOT NULL REFERENCES users(id),
                product_id UUID NOT NULL REFERENCES products(id),
                address TEXT NOT NULL,
                phone TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'placed',
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS favorites (
                user_id UUID NOT NULL REFERENCES users(id),
                product_id UUID NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (user_id, product_id)
            )
            "#,
        ];
        for sql in statements {
            sqlx::query(sql).execute(&self.pool).await.map_err(backend)?;
        }
        Ok(())
    }

    async fn favorites_of(&self, user: UserId) -> Result<Vec<ProductId>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT product_id
            FROM favorites
            WHERE user_id = $1
            ORDER BY created_at, product_id
            "#,
        )
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter()
            .map(|r| {
                r.try_get::<Uuid, _>("product_id")
                    .map(ProductId::from_uuid)
                    .map_err(backend)
            })
            .collect()
    }

    async fn user_exists(&self, id: UserId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        Ok(row.is_some())
    }
}

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(backend)?),
        username: row.try_get("username").map_err(backend)?,
        email: row.try_get("email").map_err(backend)?,
        password_hash: row.try_get("password_hash").map_err(backend)?,
        favorites: Vec::new(),
        created_at: row.try_get("created_at").map_err(backend)?,
    })
}

fn listing_from_row(row: &PgRow) -> Result<Listing, StoreError> {
    Ok(Listing {
        id: ProductId::from_uuid(row.try_get("id").map_err(backend)?),
        title: row.try_get("title").map_err(backend)?,
        price: row.try_get("price").map_err(backend)?,
        description: row.try_get("description").map_err(backend)?,
        image: row.try_get("image").map_err(backend)?,
        owner: UserId::from_uuid(row.try_get("owner_id").map_err(backend)?),
        sold: row.try_get("sold").map_err(backend)?,
        created_at: row.try_get("created_at").map_err(backend)?,
        updated_at: row.try_get("updated_at").map_err(backend)?,
    })
}

fn order_from_row(row: &PgRow) -> Result<Order, StoreError> {
    let status: String = row.try_get("status").map_err(backend)?;
    let status: OrderStatus = status.parse().map_err(backend)?;
    Ok(Order {
        id: OrderId::from_uuid(row.try_get("id").map_err(backend)?),
        buyer: UserId::from_uuid(row.try_get("buyer_id").map_err(backend)?),
        product: ProductId::from_uuid(row.try_get("product_id").map_err(backend)?),
        address: row.try_get("address").map_err(backend)?,
        phone: row.try_get("phone").map_err(backend)?,
        status,
        created_at: row.try_get("created_at").map_err(backend)?,
    })
}

// `%`, `_`, and `\` are LIKE metacharacters; escape them so a search
// term matches itself literally.
fn search_pattern(query: &CatalogQuery) -> Option<String> {
    query.search.as_ref().map(|term| {
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{escaped}%")
    })
}

const LISTING_COLUMNS: &str =
    "id, title, price, description, image, owner_id, sold, created_at, updated_at";

#[async_trait]
impl UserStore for PostgresStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::EmailTaken,
            _ => backend(e),
        })?;
        Ok(())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(row) => {
                let mut user = user_from_row(&row)?;
                user.favorites = self.favorites_of(user.id).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(row) => {
                let mut user = user_from_row(&row)?;
                user.favorites = self.favorites_of(user.id).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn add_favorite(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<Vec<ProductId>, StoreError> {
        if !self.user_exists(user).await? {
            return Err(StoreError::NotFound);
        }
        sqlx::query(
            r#"
            INSERT INTO favorites (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, product_id) DO NOTHING
            "#,
        )
        .bind(user.as_uuid())
        .bind(product.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        self.favorites_of(user).await
    }

    async fn remove_favorite(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<Vec<ProductId>, StoreError> {
        if !self.user_exists(user).await? {
            return Err(StoreError::NotFound);
        }
        sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
            .bind(user.as_uuid())
            .bind(product.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        self.favorites_of(user).await
    }

    async fn favorites(&self, user: UserId) -> Result<Vec<ProductId>, StoreError> {
        if !self.user_exists(user).await? {
            return Err(StoreError::NotFound);
        }
        self.favorites_of(user).await
    }
}

#[async_trait]
impl ProductStore for PostgresStore {
    async fn insert_listing(&self, listing: &Listing) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, title, price, description, image, owner_id, sold, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(listing.id.as_uuid())
        .bind(&listing.title)
        .bind(listing.price)
        .bind(&listing.description)
        .bind(&listing.image)
        .bind(listing.owner.as_uuid())
        .bind(listing.sold)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn listing(&self, id: ProductId) -> Result<Option<Listing>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {LISTING_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.as_ref().map(listing_from_row).transpose()
    }

    async fn listings_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Listing>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {LISTING_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let fetched: Vec<Listing> = rows
            .iter()
            .map(listing_from_row)
            .collect::<Result<_, _>>()?;

        // Preserve the caller's order; drop ids that no longer resolve.
        Ok(ids
            .iter()
            .filter_map(|id| fetched.iter().find(|l| l.id == *id).cloned())
            .collect())
    }

    async fn update_owned(
        &self,
        id: ProductId,
        owner: UserId,
        update: ListingUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Listing>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE products SET
                title = COALESCE($3, title),
                price = COALESCE($4, price),
                description = COALESCE($5, description),
                image = COALESCE($6, image),
                updated_at = $7
            WHERE id = $1 AND owner_id = $2
            RETURNING {LISTING_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .bind(update.title)
        .bind(update.price)
        .bind(update.description)
        .bind(update.image)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.as_ref().map(listing_from_row).transpose()
    }

    async fn delete_owned(&self, id: ProductId, owner: UserId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND owner_id = $2")
            .bind(id.as_uuid())
            .bind(owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn listings_by_owner(&self, owner: UserId) -> Result<Vec<Listing>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {LISTING_COLUMNS} FROM products WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter().map(listing_from_row).collect()
    }

    async fn search_unsold(&self, query: &CatalogQuery) -> Result<Vec<Listing>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {LISTING_COLUMNS}
            FROM products
            WHERE sold = FALSE
              AND ($1::text IS NULL OR title ILIKE $1 OR description ILIKE $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(search_pattern(query))
        .bind(i64::from(query.page.limit()))
        .bind(query.page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter().map(listing_from_row).collect()
    }

    async fn count_unsold(&self, query: &CatalogQuery) -> Result<u64, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM products
            WHERE sold = FALSE
              AND ($1::text IS NULL OR title ILIKE $1 OR description ILIKE $1)
            "#,
        )
        .bind(search_pattern(query))
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        let total: i64 = row.try_get("total").map_err(backend)?;
        Ok(total as u64)
    }

    async fn mark_sold(&self, id: ProductId, now: DateTime<Utc>) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE products SET sold = TRUE, updated_at = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, buyer_id, product_id, address, phone, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.buyer.as_uuid())
        .bind(order.product.as_uuid())
        .bind(&order.address)
        .bind(&order.phone)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn orders_by_buyer(&self, buyer: UserId) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, buyer_id, product_id, address, phone, status, created_at
            FROM orders
            WHERE buyer_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(buyer.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter().map(order_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_patterns_escape_like_metacharacters() {
        let q = CatalogQuery::new(Some("100%_off\\".to_string()), None, None);
        assert_eq!(search_pattern(&q).unwrap(), "%100\\%\\_off\\\\%");
    }

    #[test]
    fn absent_search_term_yields_no_pattern() {
        assert_eq!(search_pattern(&CatalogQuery::default()), None);
    }
}
