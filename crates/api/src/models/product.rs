//! Catalog product model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tamarind_core::{Price, ProductId, UserId};

/// One catalog entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub category: String,
    pub description: String,
    pub image: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a product. `image` has already been checked
/// to be an absolute URL by the route layer.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub category: String,
    pub description: String,
    pub image: String,
    pub created_by: UserId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_serializes_price_as_decimal_string() {
        let product = Product {
            id: ProductId::new(3),
            name: "Clay Teapot".to_string(),
            price: Price::new(Decimal::new(2450, 2)).unwrap(),
            category: "kitchen".to_string(),
            description: "Hand-thrown teapot".to_string(),
            image: "https://cdn.example.com/teapot.jpg".to_string(),
            created_by: UserId::new(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["price"], "24.50");
        assert_eq!(value["createdBy"], 1);
    }
}
