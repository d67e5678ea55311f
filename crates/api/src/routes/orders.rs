//! Order lifecycle handlers.

use axum::extract::State;
use serde::Deserialize;
use tamarind_core::{OrderId, OrderStatus, ProductId};

use crate::error::{ApiError, Result};
use crate::extract::{AppJson, AppPath};
use crate::middleware::{CurrentUser, RequireManager};
use crate::models::{Order, ShippingDetails};
use crate::response::ApiResponse;
use crate::services::orders::{CartLine, OrderService};
use crate::state::AppState;
use crate::validate::Validator;

/// One cart line of a checkout request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemBody {
    pub product_id: i32,
    pub quantity: i64,
}

/// Shipping block of a checkout request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingBody {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub street_address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip_code: String,
}

/// Checkout request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    #[serde(default)]
    pub items: Vec<OrderItemBody>,
    #[serde(default)]
    pub shipping: ShippingBody,
}

impl CreateOrderBody {
    fn validate_shipping(&self) -> Result<ShippingDetails> {
        let mut v = Validator::new();
        v.require("phone", &self.shipping.phone);
        v.require("streetAddress", &self.shipping.street_address);
        v.require("city", &self.shipping.city);
        v.require("zipCode", &self.shipping.zip_code);
        v.finish()?;

        Ok(ShippingDetails {
            phone: self.shipping.phone.trim().to_string(),
            street_address: self.shipping.street_address.trim().to_string(),
            city: self.shipping.city.trim().to_string(),
            zip_code: self.shipping.zip_code.trim().to_string(),
        })
    }

    fn cart_lines(&self) -> Vec<CartLine> {
        self.items
            .iter()
            .map(|item| CartLine {
                product_id: ProductId::new(item.product_id),
                quantity: item.quantity,
            })
            .collect()
    }
}

/// Status update request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusBody {
    #[serde(default)]
    pub status: String,
}

/// `POST /orders` - create an order from a cart (any authenticated caller).
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(body): AppJson<CreateOrderBody>,
) -> Result<ApiResponse<Order>> {
    let shipping = body.validate_shipping()?;
    let lines = body.cart_lines();

    let order = OrderService::new(state.pool())
        .create(&user, &lines, shipping)
        .await?;

    tracing::info!(order_id = %order.id, user_id = %user.id, "order created");
    Ok(ApiResponse::created(order, "Order placed successfully"))
}

/// `GET /orders` - the caller's own orders, newest first.
pub async fn list_mine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<ApiResponse<Vec<Order>>> {
    let orders = OrderService::new(state.pool()).list_for_user(user.id).await?;
    Ok(ApiResponse::ok(orders, "Orders fetched successfully"))
}

/// `GET /orders/all` - every order with purchaser identity (manager only).
pub async fn list_all(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
) -> Result<ApiResponse<Vec<Order>>> {
    let orders = OrderService::new(state.pool()).list_all().await?;
    Ok(ApiResponse::ok(orders, "Orders fetched successfully"))
}

/// `GET /orders/{id}` - one order, visible to its owner or any manager.
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<i32>,
) -> Result<ApiResponse<Order>> {
    let order = OrderService::new(state.pool())
        .get_one(OrderId::new(id), &user)
        .await?;
    Ok(ApiResponse::ok(order, "Order fetched successfully"))
}

/// `PATCH /orders/{id}/confirm-payment` - complete the payment redirect.
///
/// Legal only while the order is `pending`; a second call answers 400.
pub async fn confirm_payment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<i32>,
) -> Result<ApiResponse<Order>> {
    let order = OrderService::new(state.pool())
        .confirm_payment(OrderId::new(id), user.id)
        .await?;

    tracing::info!(order_id = %order.id, user_id = %user.id, "payment confirmed");
    Ok(ApiResponse::ok(order, "Order payment confirmed"))
}

/// `PATCH /orders/{id}/status` - set an order's status (manager only).
///
/// Any of the five statuses is accepted regardless of the current one.
pub async fn update_status(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    AppPath(id): AppPath<i32>,
    AppJson(body): AppJson<UpdateStatusBody>,
) -> Result<ApiResponse<Order>> {
    let status = parse_status(&body.status)?;

    let order = OrderService::new(state.pool())
        .update_status(OrderId::new(id), status)
        .await?;

    tracing::info!(order_id = %order.id, manager_id = %manager.id, %status, "status updated");
    Ok(ApiResponse::ok(order, "Order status updated"))
}

fn parse_status(raw: &str) -> Result<OrderStatus> {
    raw.parse().map_err(|_| {
        let valid = OrderStatus::ALL.map(|s| s.as_str()).join(", ");
        ApiError::BadRequest(format!("status must be one of: {valid}"))
    })
}
