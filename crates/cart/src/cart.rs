//! The cart value object.
//!
//! A [`Cart`] is plain data: a sequence of lines, each holding a product
//! id, a quantity, and the price snapshot taken when the line was first
//! added. It knows nothing about storage; hosts serialize it with
//! [`Cart::to_json`] and keep the string wherever suits them (local
//! storage, a file, a cookie). The JSON shape is a bare array of lines
//! with camelCase keys, so existing persisted carts keep loading as the
//! crate evolves.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tamarind_core::{Price, ProductId};

/// One line of a cart: a product, how many of it, and the unit price
/// captured when the line was added.
///
/// The snapshot is display state, not a quote. The backend re-reads
/// catalog prices when the order is placed, so a stale snapshot can only
/// ever mislead the cart badge, never the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// The catalog product this line refers to.
    pub product_id: ProductId,
    /// Units of the product. Always at least 1; a line that would drop
    /// below 1 is removed instead.
    pub quantity: u32,
    /// Catalog price per unit at the time the line was added.
    pub price_snapshot: Price,
}

impl CartLine {
    /// The cost of this line at the snapshotted price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price_snapshot.line_total(self.quantity)
    }
}

/// A line of the order-creation payload: product id and quantity only.
///
/// The backend ignores client prices and snapshots its own, so this is
/// all a checkout request carries per product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// An in-progress shopping cart.
///
/// Lines keep insertion order. Adding a product that is already in the
/// cart increments its line instead of appending a duplicate.
///
/// ```
/// use rust_decimal::Decimal;
/// use tamarind_core::{Price, ProductId};
/// use tamarind_cart::Cart;
///
/// let shirt = ProductId::new(1);
/// let price = Price::parse("25.00").unwrap();
///
/// let mut cart = Cart::new();
/// cart.add(shirt, price);
/// cart.add(shirt, price);
/// assert_eq!(cart.total_items(), 2);
/// assert_eq!(cart.total_price(), Decimal::new(5000, 2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of a product.
    ///
    /// If the product already has a line, its quantity goes up by one and
    /// the original price snapshot is kept. Otherwise a new line is
    /// appended with quantity 1 and `unit_price` as the snapshot.
    pub fn add(&mut self, product_id: ProductId, unit_price: Price) {
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = line.quantity.saturating_add(1);
            return;
        }
        self.lines.push(CartLine {
            product_id,
            quantity: 1,
            price_snapshot: unit_price,
        });
    }

    /// Set the quantity of a product's line.
    ///
    /// A quantity below 1 removes the line. Unknown products are a no-op.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity < 1 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = quantity;
        }
    }

    /// Remove a product's line entirely.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines (the cart badge number).
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |sum, line| sum.saturating_add(line.quantity))
    }

    /// Total cost across all lines at their snapshotted prices.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// The lines shaped for the backend's order-creation payload.
    #[must_use]
    pub fn checkout_lines(&self) -> Vec<CheckoutLine> {
        self.lines
            .iter()
            .map(|line| CheckoutLine {
                product_id: line.product_id,
                quantity: line.quantity,
            })
            .collect()
    }

    /// Serialize the cart for persistence.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails, which for this type
    /// means a bug rather than bad input.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Restore a cart persisted with [`Cart::to_json`].
    ///
    /// # Errors
    ///
    /// Returns an error when the input is not a valid persisted cart.
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}
