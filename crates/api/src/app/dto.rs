use serde::Deserialize;
use serde_json::{Value, json};

use tradepost_catalog::Listing;
use tradepost_orders::Order;
use tradepost_users::User;

// -------------------------
// Request DTOs

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub product_id: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct CatalogParams {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// -------------------------
// Response mapping

/// Public user view; never includes the password hash.
pub fn user_to_json(user: &User) -> Value {
    json!({
        "id": user.id.to_string(),
        "username": user.username,
        "email": user.email,
        "createdAt": user.created_at,
    })
}

pub fn listing_to_json(listing: &Listing) -> Value {
    json!({
        "id": listing.id.to_string(),
        "title": listing.title,
        "price": listing.price,
        "description": listing.description,
        "image": listing.image,
        "owner": listing.owner.to_string(),
        "sold": listing.sold,
        "createdAt": listing.created_at,
        "updatedAt": listing.updated_at,
    })
}

/// Order view; `product` is the resolved listing when it still exists,
/// else the bare id.
pub fn order_to_json(order: &Order, product: Option<&Listing>) -> Value {
    let product = match product {
        Some(listing) => listing_to_json(listing),
        None => json!(order.product.to_string()),
    };
    json!({
        "id": order.id.to_string(),
        "buyer": order.buyer.to_string(),
        "product": product,
        "address": order.address,
        "phone": order.phone,
        "status": order.status.as_str(),
        "createdAt": order.created_at,
    })
}
