//! Domain models for the API.
//!
//! These types derive `Serialize` directly: their serialized form is the
//! public wire shape (camelCase field names, money as decimal strings).
//! Sensitive material never appears because the types simply do not carry
//! it; there is no field to forget to strip.

pub mod order;
pub mod product;
pub mod user;

pub use order::{
    CustomerSummary, NewOrder, NewOrderItem, Order, OrderItem, ProductSummary, ShippingDetails,
};
pub use product::{NewProduct, Product};
pub use user::User;
