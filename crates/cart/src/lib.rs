//! Tamarind Cart - client-side storefront state.
//!
//! This crate carries the pieces of the shopping flow that live on the
//! client rather than in the API:
//!
//! - [`cart`] - the cart value object: ordered lines of product id,
//!   quantity, and the price snapshot taken when the line was added, plus
//!   a stable JSON contract so hosts can persist it wherever they like
//! - [`payment`] - construction of the external payment gateway's signed
//!   redirect form
//!
//! Like `tamarind-core`, this crate does no I/O of its own. Hosts decide
//! where cart state lives and how the redirect form reaches a browser.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod payment;

pub use cart::{Cart, CartLine, CheckoutLine};
pub use payment::{GatewayConfig, PaymentError, PaymentForm};
