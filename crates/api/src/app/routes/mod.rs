use axum::{
    Router,
    routing::{get, post, put},
};

pub mod auth;
pub mod orders;
pub mod products;
pub mod system;
pub mod user;

/// Router for all authenticated endpoints. Public routes (health, auth,
/// catalog reads) are wired separately in `app::build_router`.
pub fn protected_router() -> Router {
    Router::new()
        .route("/api/products", post(products::create_product))
        .route("/api/products/my", get(products::my_products))
        .route(
            "/api/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/api/orders", post(orders::place_order))
        .route("/api/orders/my", get(orders::my_orders))
        .route("/api/user/favorites", get(user::list_favorites))
        .route(
            "/api/user/favorites/:productId",
            post(user::add_favorite).delete(user::remove_favorite),
        )
}
