use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use tradepost_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<dto::PlaceOrderRequest>,
) -> Response {
    let product: ProductId = match body.product_id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(&e),
    };

    match services
        .place_order(current.user_id(), product, body.address, body.phone)
        .await
    {
        Ok(order) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "status": 201,
                "message": "Order placed successfully!",
                "order": dto::order_to_json(&order, None),
            })),
        )
            .into_response(),
        Err(e) => errors::app_error_to_response(e),
    }
}

pub async fn my_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> Response {
    let orders = match services.orders().orders_by_buyer(current.user_id()).await {
        Ok(orders) => orders,
        Err(e) => return errors::store_error_to_response(&e),
    };

    let product_ids: Vec<ProductId> = orders.iter().map(|o| o.product).collect();
    let listings = match services.products().listings_by_ids(&product_ids).await {
        Ok(listings) => listings,
        Err(e) => return errors::store_error_to_response(&e),
    };

    let orders: Vec<_> = orders
        .iter()
        .map(|order| {
            let product = listings.iter().find(|l| l.id == order.product);
            dto::order_to_json(order, product)
        })
        .collect();

    Json(orders).into_response()
}
