//! Order and line-item storage.
//!
//! Orders and their items are written in one transaction so a failed item
//! insert never leaves a partial order behind. Reads batch-hydrate items
//! with a single `ANY($1)` query and left-join the catalog for display
//! names, tolerating products that were deleted after the order was placed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tamarind_core::{Email, OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{CustomerSummary, NewOrder, Order, OrderItem, ProductSummary};

const ORDER_COLUMNS: &str =
    "id, user_id, email, total_amount, phone, street_address, city, zip_code, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    email: String,
    total_amount: Decimal,
    phone: String,
    street_address: String,
    city: String,
    zip_code: String,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(
        self,
        items: Vec<OrderItem>,
        customer: Option<CustomerSummary>,
    ) -> Result<Order, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("order {}: invalid email: {e}", self.id))
        })?;
        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            email,
            items,
            total_amount: self.total_amount,
            phone: self.phone,
            street_address: self.street_address,
            city: self.city,
            zip_code: self.zip_code,
            status: self.status,
            customer,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Order row joined with the purchaser, for staff views.
#[derive(Debug, sqlx::FromRow)]
struct OrderWithCustomerRow {
    #[sqlx(flatten)]
    order: OrderRow,
    customer_name: Option<String>,
    customer_email: Option<String>,
}

impl OrderWithCustomerRow {
    fn customer(&self) -> Result<Option<CustomerSummary>, RepositoryError> {
        match (&self.customer_name, &self.customer_email) {
            (Some(name), Some(email)) => {
                let email = Email::parse(email).map_err(|e| {
                    RepositoryError::DataCorruption(format!(
                        "user {}: invalid email: {e}",
                        self.order.user_id
                    ))
                })?;
                Ok(Some(CustomerSummary {
                    id: UserId::new(self.order.user_id),
                    name: name.clone(),
                    email,
                }))
            }
            _ => Ok(None),
        }
    }
}

/// Line-item row joined with the catalog for display data.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    unit_price: Price,
    product_name: Option<String>,
    product_image: Option<String>,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "order item {}: quantity {} is not positive",
                row.id, row.quantity
            ))
        })?;
        // The referenced product may have been deleted since the order was
        // placed; the snapshot price still stands.
        let product = match (row.product_name, row.product_image) {
            (Some(name), Some(image)) => Some(ProductSummary { name, image }),
            _ => None,
        };
        Ok(Self {
            id: OrderItemId::new(row.id),
            product_id: ProductId::new(row.product_id),
            quantity,
            unit_price: row.unit_price,
            product,
        })
    }
}

/// Repository for orders and their line items.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new repository backed by the given pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and all of its line items atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any statement fails; nothing is
    /// persisted in that case.
    pub async fn create(&self, draft: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO store.orders (user_id, email, total_amount, phone, street_address, city, zip_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            ",
        ))
        .bind(draft.user_id)
        .bind(&draft.email)
        .bind(draft.total_amount)
        .bind(&draft.shipping.phone)
        .bind(&draft.shipping.street_address)
        .bind(&draft.shipping.city)
        .bind(&draft.shipping.zip_code)
        .fetch_one(&mut *tx)
        .await?;

        for item in &draft.items {
            sqlx::query(
                r"
                INSERT INTO store.order_items (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(row.id)
            .bind(item.product_id)
            .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let items = self
            .items_for_orders(&[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();
        row.into_order(items, None)
    }

    /// Fetch one order by id, items included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM store.orders WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let items = self
            .items_for_orders(&[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();
        Ok(Some(row.into_order(items, None)?))
    }

    /// Fetch one order by id, restricted to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM store.orders WHERE id = $1 AND user_id = $2",
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let items = self
            .items_for_orders(&[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();
        Ok(Some(row.into_order(items, None)?))
    }

    /// All orders owned by `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM store.orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Every order in the store, newest first, purchaser resolved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderWithCustomerRow>(
            r"
            SELECT o.id, o.user_id, o.email, o.total_amount, o.phone, o.street_address,
                   o.city, o.zip_code, o.status, o.created_at, o.updated_at,
                   u.name AS customer_name, u.email AS customer_email
            FROM store.orders o
            LEFT JOIN store.users u ON u.id = o.user_id
            ORDER BY o.created_at DESC, o.id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.order.id).collect();
        let mut items = self.items_for_orders(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let customer = row.customer()?;
                let list = items.remove(&row.order.id).unwrap_or_default();
                row.order.into_order(list, customer)
            })
            .collect()
    }

    /// Move a pending order owned by `user_id` to `confirmed`.
    ///
    /// Returns `None` when no pending order matched, either because the
    /// order does not exist for that user or because its status already
    /// moved on. The guard in the `WHERE` clause makes concurrent confirms
    /// settle with exactly one winner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn confirm_if_pending(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE store.orders
            SET status = 'confirmed', updated_at = now()
            WHERE id = $1 AND user_id = $2 AND status = 'pending'
            RETURNING {ORDER_COLUMNS}
            ",
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let items = self
            .items_for_orders(&[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();
        Ok(Some(row.into_order(items, None)?))
    }

    /// Set an order's status unconditionally (staff operation).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE store.orders
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            ",
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let customer = self.customer_for(row.user_id).await?;
        let items = self
            .items_for_orders(&[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();
        Ok(Some(row.into_order(items, customer)?))
    }

    /// Batch-load items for a set of orders, keyed by order id.
    async fn items_for_orders(
        &self,
        order_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<OrderItem>>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.unit_price,
                   p.name AS product_name, p.image AS product_image
            FROM store.order_items oi
            LEFT JOIN store.products p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.id
            ",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let order_id = row.order_id;
            grouped.entry(order_id).or_default().push(row.try_into()?);
        }
        Ok(grouped)
    }

    async fn customer_for(&self, user_id: i32) -> Result<Option<CustomerSummary>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, name, email FROM store.users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn assemble(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut items = self.items_for_orders(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let list = items.remove(&row.id).unwrap_or_default();
                row.into_order(list, None)
            })
            .collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i32,
    name: String,
    email: String,
}

impl TryFrom<CustomerRow> for CustomerSummary {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("user {}: invalid email: {e}", row.id))
        })?;
        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample_order_row() -> OrderRow {
        OrderRow {
            id: 11,
            user_id: 4,
            email: "asha@example.com".to_string(),
            total_amount: Decimal::new(4500, 2),
            phone: "9800000001".to_string(),
            street_address: "12 Lakeside Rd".to_string(),
            city: "Pokhara".to_string(),
            zip_code: "33700".to_string(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_item_row() -> OrderItemRow {
        OrderItemRow {
            id: 21,
            order_id: 11,
            product_id: 3,
            quantity: 2,
            unit_price: Price::new(Decimal::new(2250, 2)).unwrap(),
            product_name: Some("Clay Teapot".to_string()),
            product_image: Some("https://cdn.example.com/teapot.jpg".to_string()),
        }
    }

    #[test]
    fn test_item_row_converts() {
        let item: OrderItem = sample_item_row().try_into().unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.product.as_ref().unwrap().name, "Clay Teapot");
    }

    #[test]
    fn test_item_row_tolerates_deleted_product() {
        let mut row = sample_item_row();
        row.product_name = None;
        row.product_image = None;
        let item: OrderItem = row.try_into().unwrap();
        assert!(item.product.is_none());
        assert_eq!(item.unit_price.amount(), Decimal::new(2250, 2));
    }

    #[test]
    fn test_item_row_negative_quantity_is_corruption() {
        let mut row = sample_item_row();
        row.quantity = -1;
        let result: Result<OrderItem, _> = row.try_into();
        assert!(matches!(result, Err(RepositoryError::DataCorruption(_))));
    }

    #[test]
    fn test_order_row_assembles() {
        let row = sample_order_row();
        let items = vec![sample_item_row().try_into().unwrap()];
        let order = row.into_order(items, None).unwrap();
        assert_eq!(order.id, OrderId::new(11));
        assert_eq!(order.items.len(), 1);
        assert!(order.customer.is_none());
    }

    #[test]
    fn test_customer_join_row() {
        let row = OrderWithCustomerRow {
            order: sample_order_row(),
            customer_name: Some("Asha".to_string()),
            customer_email: Some("asha@example.com".to_string()),
        };
        let customer = row.customer().unwrap().unwrap();
        assert_eq!(customer.id, UserId::new(4));
        assert_eq!(customer.email.as_str(), "asha@example.com");
    }

    #[test]
    fn test_missing_customer_join_is_none() {
        let row = OrderWithCustomerRow {
            order: sample_order_row(),
            customer_name: None,
            customer_email: None,
        };
        assert!(row.customer().unwrap().is_none());
    }
}
