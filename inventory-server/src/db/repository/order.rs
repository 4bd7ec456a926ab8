//! Purchase Order Repository
//!
//! Header aggregates (`item_count`, `total_amount`) are computed from the
//! current product prices when the order is placed and never recomputed.
//! Line items are read joined with the current product data.

use super::{RepoError, RepoResult};
use crate::db::filter::QueryFilter;
use shared::error::ErrorCode;
use shared::models::{Order, OrderItem, OrderItemInput, OrderStatus};
use sqlx::SqlitePool;

const ORDER_SELECT: &str = "SELECT o.id, o.order_number, o.created_at AS date, o.supplier_id, \
     s.name AS supplier_name, o.item_count, o.total_amount, o.status \
     FROM orders o JOIN suppliers s ON s.id = o.supplier_id";

const ITEM_SELECT: &str = "SELECT oi.product_id, p.name, p.sku, p.price, c.name AS category, \
     p.image_url, o.supplier_id, s.name AS supplier_name, oi.quantity, oi.selected_color, \
     oi.selected_size \
     FROM order_items oi \
     JOIN orders o ON o.id = oi.order_id \
     JOIN products p ON p.id = oi.product_id \
     JOIN categories c ON c.id = p.category_id \
     JOIN suppliers s ON s.id = o.supplier_id \
     WHERE oi.order_id = ? ORDER BY oi.id";

/// Human-facing order number derived from the creation time
pub fn order_number(now_millis: i64) -> String {
    format!("PO-{}", now_millis / 1000)
}

/// Place an order as one unit
///
/// Every line must reference a product owned by the caller under the
/// given supplier; otherwise nothing is written and the error is
/// `ProductNotFound` whichever of the three checks failed. Aggregates that
/// do not fit in an `i64` fail with `ValueOutOfRange`.
pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    supplier_id: i64,
    items: &[OrderItemInput],
) -> RepoResult<Order> {
    if items.is_empty() {
        return Err(RepoError::code(ErrorCode::OrderEmpty));
    }

    let mut tx = pool.begin().await?;

    let mut item_count = 0i64;
    let mut total_amount = 0i64;
    for item in items {
        let price = sqlx::query_scalar::<_, i64>(
            "SELECT price FROM products WHERE id = ? AND user_id = ? AND supplier_id = ?",
        )
        .bind(item.product_id)
        .bind(user_id)
        .bind(supplier_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepoError::code(ErrorCode::ProductNotFound))?;

        item_count = item_count
            .checked_add(item.quantity)
            .ok_or_else(|| RepoError::code(ErrorCode::ValueOutOfRange))?;
        total_amount = price
            .checked_mul(item.quantity)
            .and_then(|line| total_amount.checked_add(line))
            .ok_or_else(|| RepoError::code(ErrorCode::ValueOutOfRange))?;
    }

    let now = shared::util::now_millis();
    let order_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders (order_number, created_at, supplier_id, status, item_count, \
         total_amount, user_id) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(order_number(now))
    .bind(now)
    .bind(supplier_id)
    .bind(OrderStatus::Pending)
    .bind(item_count)
    .bind(total_amount)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    for item in items {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, selected_color, selected_size) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(&item.selected_color)
        .bind(&item.selected_size)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(order_id, supplier_id, item_count, total_amount, "Order placed");
    get_with_items(pool, user_id, order_id).await
}

pub async fn find_all(
    pool: &SqlitePool,
    user_id: i64,
    status: Option<OrderStatus>,
    supplier_id: Option<i64>,
) -> RepoResult<Vec<Order>> {
    let filter = QueryFilter::new()
        .eq_i64("o.user_id", user_id)
        .opt_text("o.status", status.map(|s| s.as_str()))
        .opt_i64("o.supplier_id", supplier_id);
    let sql = format!(
        "{ORDER_SELECT}{} ORDER BY o.created_at DESC, o.id DESC",
        filter.where_clause()
    );
    let orders = filter
        .bind_as(sqlx::query_as::<_, Order>(&sql))
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

pub async fn find_by_id(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "{ORDER_SELECT} WHERE o.id = ? AND o.user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(order)
}

pub async fn find_items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(ITEM_SELECT)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(items)
}

/// Owned order with its items, or `OrderNotFound`
pub async fn get_with_items(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<Order> {
    let mut order = find_by_id(pool, user_id, id)
        .await?
        .ok_or_else(|| RepoError::code(ErrorCode::OrderNotFound))?;
    order.items = Some(find_items(pool, order.id).await?);
    Ok(order)
}

/// Change the status; the only mutable field of an order
pub async fn update_status(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
    status: OrderStatus,
) -> RepoResult<Order> {
    let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ? AND user_id = ?")
        .bind(status)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::code(ErrorCode::OrderNotFound));
    }
    get_with_items(pool, user_id, id).await
}

pub async fn delete(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM orders WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::code(ErrorCode::OrderNotFound));
    }
    Ok(())
}
