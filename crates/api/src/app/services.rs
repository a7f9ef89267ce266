//! Store wiring and the application workflows that span more than one
//! handler-sized step.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Duration, Utc};
use thiserror::Error;

use tradepost_auth::{Hs256Tokens, JwtValidator, hash_password, verify_password};
use tradepost_core::{DomainError, ProductId, UserId};
use tradepost_orders::{Order, check_purchasable};
use tradepost_store::{OrderStore, ProductStore, StoreError, UserStore};
use tradepost_users::{Registration, User};

const TOKEN_TTL_HOURS: i64 = 24;

/// Application-level failure, mapped to an HTTP response in `errors.rs`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Product not found")]
    ProductNotFound,

    #[error("internal error")]
    Internal(String),
}

pub struct AppServices {
    users: Arc<dyn UserStore>,
    products: Arc<dyn ProductStore>,
    orders: Arc<dyn OrderStore>,
    tokens: Arc<Hs256Tokens>,
    upload_dir: PathBuf,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserStore>,
        products: Arc<dyn ProductStore>,
        orders: Arc<dyn OrderStore>,
        jwt_secret: &str,
        upload_dir: PathBuf,
    ) -> Self {
        Self {
            users,
            products,
            orders,
            tokens: Arc::new(Hs256Tokens::new(jwt_secret.as_bytes())),
            upload_dir,
        }
    }

    pub fn jwt(&self) -> Arc<dyn JwtValidator> {
        self.tokens.clone()
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    pub fn products(&self) -> &dyn ProductStore {
        self.products.as_ref()
    }

    pub fn orders(&self) -> &dyn OrderStore {
        self.orders.as_ref()
    }

    pub async fn register(&self, input: Registration) -> Result<User, AppError> {
        input.validate()?;
        let password_hash =
            hash_password(&input.password).map_err(|e| AppError::Internal(e.to_string()))?;
        let user = User::new(&input, password_hash, Utc::now());
        self.users.insert_user(&user).await?;
        Ok(user)
    }

    /// Verify credentials and issue a bearer token. Every failure mode
    /// (unknown email, wrong password, corrupt hash) collapses into the
    /// same uniform error.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .user_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)
            .map_err(|_| AppError::InvalidCredentials)?;

        self.tokens
            .issue(user.id, Utc::now(), Duration::hours(TOKEN_TTL_HOURS))
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// The order workflow: validate the listing (exists, unsold, not the
    /// buyer's own), insert the order, then flip the sold flag as a second
    /// write. The two writes share no transaction; if the flip fails the
    /// order stands and the listing stays purchasable, which is logged.
    pub async fn place_order(
        &self,
        buyer: UserId,
        product: ProductId,
        address: String,
        phone: String,
    ) -> Result<Order, AppError> {
        let listing = self
            .products
            .listing(product)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        check_purchasable(&listing, buyer)?;

        let now = Utc::now();
        let order = Order::new(buyer, product, address, phone, now);
        self.orders.insert_order(&order).await?;

        if let Err(e) = self.products.mark_sold(product, now).await {
            tracing::warn!(
                order_id = %order.id,
                product_id = %product,
                error = %e,
                "order inserted but the sold flag was not set"
            );
            return Err(AppError::Internal(e.to_string()));
        }

        Ok(order)
    }

    /// Persist an uploaded image under the upload directory with a
    /// generated name. Returns the public URL path.
    pub async fn save_image(&self, original_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let file_name = match Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
        {
            Some(ext) => format!("{}.{ext}", uuid::Uuid::now_v7()),
            None => uuid::Uuid::now_v7().to_string(),
        };

        tokio::fs::write(self.upload_dir.join(&file_name), bytes)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(format!("/uploads/{file_name}"))
    }
}
