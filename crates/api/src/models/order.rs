//! Order domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tamarind_core::{Email, OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId};

/// Catalog display data attached to a line item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub name: String,
    pub image: String,
}

/// A purchased line with its price snapshot.
///
/// `unit_price` is the catalog price at the moment the order was placed
/// and never changes afterwards. `product` is `None` when the referenced
/// product has since been removed from the catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Price,
    pub product: Option<ProductSummary>,
}

/// Purchaser identity attached to staff order views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// An order with hydrated line items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub email: Email,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub phone: String,
    pub street_address: String,
    pub city: String,
    pub zip_code: String,
    pub status: OrderStatus,
    /// Only populated for staff views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shipping destination captured at checkout.
#[derive(Debug, Clone)]
pub struct ShippingDetails {
    pub phone: String,
    pub street_address: String,
    pub city: String,
    pub zip_code: String,
}

/// Fields required to insert an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub email: Email,
    pub total_amount: Decimal,
    pub shipping: ShippingDetails,
    pub items: Vec<NewOrderItem>,
}

/// One line of a new order.
///
/// `quantity` has been validated positive and within `i32` range before
/// this struct is built.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Price,
}
