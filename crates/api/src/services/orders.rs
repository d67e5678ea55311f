//! The order engine.
//!
//! Checkout turns a cart into an order by snapshotting each product's
//! current catalog price into the line items. From then on the order's
//! totals are frozen; catalog edits never reach back into history. Status
//! moves through pending → confirmed → shipped → delivered with
//! cancellation from any non-terminal state, but only the customer's
//! payment confirmation actually guards the current state. Staff updates
//! are deliberately unguarded beyond membership in the valid set.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use tamarind_core::{OrderId, OrderStatus, ProductId, Role, UserId};
use thiserror::Error;

use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::db::RepositoryError;
use crate::models::{NewOrder, NewOrderItem, Order, Product, ShippingDetails, User};

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The cart had no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A cart line referenced a product id absent from the catalog.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// A cart line's quantity was zero, negative, or out of range.
    #[error("quantity must be a positive integer")]
    InvalidQuantity,

    /// The order does not exist or is not visible to the caller.
    #[error("order not found")]
    NotFound,

    /// Payment confirmation on an order that already left `pending`.
    #[error("order is already confirmed or processed")]
    AlreadyProcessed,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One line of a checkout request, as received from the client.
#[derive(Debug, Clone, Copy)]
pub struct CartLine {
    pub product_id: ProductId,
    /// Raw client value; validated positive and in `i32` range here.
    pub quantity: i64,
}

/// Order lifecycle operations.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Create an order from a cart, snapshotting current catalog prices.
    ///
    /// The order and its items persist in one transaction; a failing line
    /// never leaves a partial order behind.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyCart`], [`OrderError::ProductNotFound`]
    /// naming the offending id, or [`OrderError::InvalidQuantity`] when
    /// the cart fails validation.
    pub async fn create(
        &self,
        caller: &User,
        lines: &[CartLine],
        shipping: ShippingDetails,
    ) -> Result<Order, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let ids: Vec<ProductId> = lines.iter().map(|line| line.product_id).collect();
        let products = self.products.get_many(&ids).await?;

        let (items, total_amount) = build_line_items(lines, &products)?;

        let draft = NewOrder {
            user_id: caller.id,
            email: caller.email.clone(),
            total_amount,
            shipping,
            items,
        };

        Ok(self.orders.create(&draft).await?)
    }

    /// Confirm payment on a pending order owned by the caller.
    ///
    /// This is the completion step of the external payment redirect, so
    /// only the purchaser may drive it, and only out of `pending`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] when the order is absent or not
    /// owned by the caller, and [`OrderError::AlreadyProcessed`] when its
    /// status already moved on.
    pub async fn confirm_payment(&self, id: OrderId, caller: UserId) -> Result<Order, OrderError> {
        if let Some(order) = self.orders.confirm_if_pending(id, caller).await? {
            return Ok(order);
        }

        // The guarded UPDATE matched nothing. Tell the caller which way it
        // failed: missing order versus an order past pending.
        match self.orders.get_for_user(id, caller).await? {
            Some(_) => Err(OrderError::AlreadyProcessed),
            None => Err(OrderError::NotFound),
        }
    }

    /// Set an order's status (staff operation, no adjacency guard).
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] when the order does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        self.orders
            .update_status(id, status)
            .await?
            .ok_or(OrderError::NotFound)
    }

    /// The caller's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_for_user(&self, caller: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_for_user(caller).await?)
    }

    /// Every order in the store, newest first, purchaser resolved.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_all().await?)
    }

    /// Fetch one order, visible to its owner or to any manager.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] when the order is absent, or when
    /// a non-manager caller does not own it. The two cases are rendered
    /// identically so order ids cannot be probed.
    pub async fn get_one(&self, id: OrderId, caller: &User) -> Result<Order, OrderError> {
        let order = if caller.role == Role::Manager {
            self.orders.get_by_id(id).await?
        } else {
            self.orders.get_for_user(id, caller.id).await?
        };

        order.ok_or(OrderError::NotFound)
    }
}

/// Resolve cart lines against fetched products, producing line items with
/// price snapshots and the order total.
///
/// # Errors
///
/// Returns [`OrderError::ProductNotFound`] for the first line whose
/// product id did not resolve, or [`OrderError::InvalidQuantity`] for a
/// quantity outside `1..=i32::MAX`.
fn build_line_items(
    lines: &[CartLine],
    products: &[Product],
) -> Result<(Vec<NewOrderItem>, Decimal), OrderError> {
    let by_id: HashMap<ProductId, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut items = Vec::with_capacity(lines.len());
    let mut total_amount = Decimal::ZERO;

    for line in lines {
        let quantity = u32::try_from(line.quantity)
            .ok()
            .filter(|q| *q > 0 && i32::try_from(*q).is_ok())
            .ok_or(OrderError::InvalidQuantity)?;

        let product = by_id
            .get(&line.product_id)
            .ok_or(OrderError::ProductNotFound(line.product_id))?;

        // The snapshot: the catalog price as of right now, frozen into the
        // item. Later price edits must never touch this order.
        let unit_price = product.price;
        total_amount += unit_price.line_total(quantity);

        items.push(NewOrderItem {
            product_id: line.product_id,
            quantity,
            unit_price,
        });
    }

    Ok((items, total_amount))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tamarind_core::Price;

    fn product(id: i32, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::parse(price).unwrap(),
            category: "kitchen".to_string(),
            description: "A product".to_string(),
            image: "https://cdn.example.com/p.jpg".to_string(),
            created_by: UserId::new(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(product_id: i32, quantity: i64) -> CartLine {
        CartLine {
            product_id: ProductId::new(product_id),
            quantity,
        }
    }

    #[test]
    fn test_total_is_sum_of_quantity_times_unit_price() {
        let products = vec![product(1, "10.00"), product(2, "4.50")];
        let (items, total) = build_line_items(&[line(1, 2), line(2, 3)], &products).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].unit_price, Price::parse("10.00").unwrap());
        assert_eq!(items[1].quantity, 3);
        assert_eq!(total, Decimal::new(3350, 2));
    }

    #[test]
    fn test_snapshot_is_independent_of_later_catalog_edits() {
        let mut products = vec![product(1, "10.00")];
        let (items, total) = build_line_items(&[line(1, 2)], &products).unwrap();

        // A price change after the build must not alter the snapshot.
        products[0].price = Price::parse("99.99").unwrap();
        assert_eq!(items[0].unit_price, Price::parse("10.00").unwrap());
        assert_eq!(total, Decimal::new(2000, 2));
    }

    #[test]
    fn test_missing_product_names_the_id() {
        let products = vec![product(1, "10.00")];
        let err = build_line_items(&[line(1, 1), line(42, 1)], &products).unwrap_err();
        assert!(matches!(err, OrderError::ProductNotFound(id) if id == ProductId::new(42)));
    }

    #[test]
    fn test_zero_and_negative_quantities_rejected() {
        let products = vec![product(1, "10.00")];
        for quantity in [0, -1, i64::MIN] {
            let err = build_line_items(&[line(1, quantity)], &products).unwrap_err();
            assert!(matches!(err, OrderError::InvalidQuantity));
        }
    }

    #[test]
    fn test_quantity_beyond_i32_rejected() {
        let products = vec![product(1, "10.00")];
        let err = build_line_items(&[line(1, i64::from(i32::MAX) + 1)], &products).unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity));
    }

    #[test]
    fn test_duplicate_product_lines_each_get_a_snapshot() {
        let products = vec![product(1, "5.00")];
        let (items, total) = build_line_items(&[line(1, 1), line(1, 2)], &products).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(total, Decimal::new(1500, 2));
    }
}
