//! # Order Repository
//!
//! Database operations for POS orders and their line items.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    POS Checkout (create)                                │
//! │                                                                         │
//! │  CreateOrderRequest { payment_method, items[] }                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PaymentMethod::from_str   ──✗──► ValidationError (nothing written)    │
//! │  price_order(items)        ──✗──► ValidationError (nothing written)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    INSERT orders       (total, payment_method, ordered_at)             │
//! │    INSERT order_items  × N (position keeps cart order)                 │
//! │  COMMIT  ──✗──► ROLLBACK, no rows visible                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderWithItems (subtotals and total as computed)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items are never updated after commit. Deleting an order removes its
//! items through `ON DELETE CASCADE`.

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, push_day_range};
use klinik_core::period::DayRange;
use klinik_core::pricing::price_order;
use klinik_core::{CreateOrderRequest, Order, OrderFilter, OrderItem, OrderWithItems, PaymentMethod};

const SELECT_ORDER: &str = "SELECT id, total_cents, payment_method, ordered_at FROM orders";

const SELECT_ITEM: &str = "SELECT id, order_id, item_name, unit_price_cents, quantity, subtotal_cents FROM order_items";

/// Repository for POS order database operations.
///
/// ## Usage
/// ```rust,ignore
/// let order = db.orders().create(CreateOrderRequest {
///     payment_method: "cash".to_string(),
///     items: vec![OrderLine::new("Konsultasi", "5000".parse()?, 2)],
/// }).await?;
///
/// assert_eq!(order.order.total.to_string(), "10000.00");
/// ```
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Checks out a cart as one atomic order, stamped with the current time.
    ///
    /// ## Errors
    /// - `DbError::Validation` for an empty cart, a bad line or a bad
    ///   payment method; no rows are written
    /// - Store errors roll back every row of the order
    pub async fn create(&self, request: CreateOrderRequest) -> DbResult<OrderWithItems> {
        self.create_at(request, Utc::now()).await
    }

    /// Checks out a cart with an explicit order time.
    pub async fn create_at(
        &self,
        request: CreateOrderRequest,
        ordered_at: DateTime<Utc>,
    ) -> DbResult<OrderWithItems> {
        let payment_method: PaymentMethod = request.payment_method.parse()?;
        let priced = price_order(&request.items)?;

        let order = Order {
            id: new_id(),
            total: priced.total,
            payment_method,
            ordered_at,
        };

        let items: Vec<OrderItem> = priced
            .lines
            .into_iter()
            .map(|line| OrderItem {
                id: new_id(),
                order_id: order.id.clone(),
                item_name: line.item_name,
                unit_price: line.unit_price,
                quantity: line.quantity,
                subtotal: line.subtotal,
            })
            .collect();

        debug!(
            id = %order.id,
            items = items.len(),
            total = %order.total,
            payment_method = %order.payment_method,
            "Creating order"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, total_cents, payment_method, ordered_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&order.id)
        .bind(order.total)
        .bind(order.payment_method)
        .bind(order.ordered_at)
        .execute(&mut *tx)
        .await?;

        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items
                    (id, order_id, position, item_name, unit_price_cents, quantity, subtotal_cents)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(position as i64)
            .bind(&item.item_name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(item.subtotal)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %order.id, total = %order.total, "Order created");

        Ok(OrderWithItems { order, items })
    }

    /// Gets an order with its items.
    ///
    /// ## Returns
    /// * `Ok(Some(OrderWithItems))` - Order found
    /// * `Ok(None)` - Unknown or deleted ID
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<OrderWithItems>> {
        debug!(id = %id, "Fetching order");

        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!("{} WHERE id = ?1", SELECT_ORDER))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let order = match order {
            Some(order) => order,
            None => return Ok(None),
        };

        let items = load_items(&mut *tx, &order.id).await?;
        tx.commit().await?;

        Ok(Some(OrderWithItems { order, items }))
    }

    /// Lists orders with their items, newest first.
    ///
    /// ## Filters (AND-combined, all optional)
    /// - `date_from` / `date_to`: inclusive local calendar days over `ordered_at`
    ///   (an inverted pair matches nothing)
    /// - `payment_method`: exact, case-sensitive match against the stored
    ///   value; blank is ignored and an unknown value matches nothing
    pub async fn list(&self, filter: &OrderFilter) -> DbResult<Vec<OrderWithItems>> {
        let range = DayRange::from_dates(filter.date_from, filter.date_to, &Local);
        let payment_method = filter
            .payment_method
            .as_deref()
            .filter(|method| !method.trim().is_empty());

        debug!(?filter, "Listing orders");

        let mut tx = self.pool.begin().await?;

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_ORDER);
        qb.push(" WHERE 1 = 1");
        push_day_range(&mut qb, "ordered_at", &range);
        if let Some(method) = payment_method {
            qb.push(" AND payment_method = ").push_bind(method.to_string());
        }
        qb.push(" ORDER BY ordered_at DESC, rowid DESC");

        let orders = qb.build_query_as::<Order>().fetch_all(&mut *tx).await?;

        let mut items_by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        if !orders.is_empty() {
            let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_ITEM);
            qb.push(" WHERE order_id IN (");
            let mut ids = qb.separated(", ");
            for order in &orders {
                ids.push_bind(order.id.clone());
            }
            ids.push_unseparated(") ORDER BY order_id, position");

            for item in qb.build_query_as::<OrderItem>().fetch_all(&mut *tx).await? {
                items_by_order
                    .entry(item.order_id.clone())
                    .or_default()
                    .push(item);
            }
        }

        tx.commit().await?;

        let orders: Vec<OrderWithItems> = orders
            .into_iter()
            .map(|order| {
                let items = items_by_order.remove(&order.id).unwrap_or_default();
                OrderWithItems { order, items }
            })
            .collect();

        debug!(count = orders.len(), "Listed orders");
        Ok(orders)
    }

    /// Returns the items of an order in cart order. Empty for unknown IDs.
    pub async fn items_for(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let mut conn = self.pool.acquire().await?;
        load_items(&mut *conn, order_id).await
    }

    /// Deletes an order and, by cascade, its items.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if the ID doesn't exist
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        info!(id = %id, "Order deleted");
        Ok(())
    }

    /// Counts all orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn load_items(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(&format!(
        "{} WHERE order_id = ?1 ORDER BY position",
        SELECT_ITEM
    ))
    .bind(order_id)
    .fetch_all(conn)
    .await?;

    Ok(items)
}

// =============================================================================
// Unit Tests
// =============================================================================
