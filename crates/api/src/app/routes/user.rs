use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    response::{IntoResponse, Response},
};

use tradepost_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub async fn add_favorite(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(product_id): Path<String>,
) -> Response {
    let product: ProductId = match product_id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };

    match services.users().add_favorite(current.user_id(), product).await {
        Ok(ids) => Json(ids).into_response(),
        Err(e) => errors::store_error_to_response(&e),
    }
}

pub async fn remove_favorite(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(product_id): Path<String>,
) -> Response {
    let product: ProductId = match product_id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };

    match services
        .users()
        .remove_favorite(current.user_id(), product)
        .await
    {
        Ok(ids) => Json(ids).into_response(),
        Err(e) => errors::store_error_to_response(&e),
    }
}

/// Favorites with listing details resolved, in insertion order. Ids that
/// point at deleted listings are silently dropped.
pub async fn list_favorites(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> Response {
    let ids = match services.users().favorites(current.user_id()).await {
        Ok(ids) => ids,
        Err(e) => return errors::store_error_to_response(&e),
    };

    let listings = match services.products().listings_by_ids(&ids).await {
        Ok(listings) => listings,
        Err(e) => return errors::store_error_to_response(&e),
    };

    let favorites: Vec<_> = listings.iter().map(dto::listing_to_json).collect();
    Json(favorites).into_response()
}
