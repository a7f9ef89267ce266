//! `tradepost-orders` — single-item purchase orders.

pub mod order;
pub mod placement;

pub use order::{Order, OrderStatus};
pub use placement::check_purchasable;
