use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradepost_core::{OrderId, ProductId, UserId};

/// Order lifecycle status. Orders are created as `Placed` and are
/// immutable afterwards; further states would only appear with fulfilment
/// features this marketplace does not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Placed
    }
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "placed",
        }
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = tradepost_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "placed" => Ok(Self::Placed),
            other => Err(tradepost_core::DomainError::validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

/// A placed order: one buyer, one product, a delivery address and phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer: UserId,
    pub product: ProductId,
    pub address: String,
    pub phone: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        buyer: UserId,
        product: ProductId,
        address: String,
        phone: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            buyer,
            product,
            address,
            phone,
            status: OrderStatus::default(),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_orders_are_placed() {
        let order = Order::new(
            UserId::new(),
            ProductId::new(),
            "221B Baker Street".to_string(),
            "555-0100".to_string(),
            Utc::now(),
        );
        assert_eq!(order.status, OrderStatus::Placed);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Placed).unwrap();
        assert_eq!(json, "\"placed\"");
    }
}
