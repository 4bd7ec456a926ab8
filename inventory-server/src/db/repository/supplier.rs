//! Supplier Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::Supplier;
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Supplier>> {
    let suppliers = sqlx::query_as::<_, Supplier>(
        "SELECT id, name FROM suppliers WHERE user_id = ? ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(suppliers)
}

pub async fn find_by_id(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<Option<Supplier>> {
    let supplier = sqlx::query_as::<_, Supplier>(
        "SELECT id, name FROM suppliers WHERE id = ? AND user_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(supplier)
}

/// Owned supplier or `SupplierNotFound`
pub async fn get(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<Supplier> {
    find_by_id(pool, user_id, id)
        .await?
        .ok_or_else(|| RepoError::code(ErrorCode::SupplierNotFound))
}

pub async fn create(pool: &SqlitePool, user_id: i64, name: &str) -> RepoResult<Supplier> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO suppliers (name, user_id, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(user_id)
    .bind(now)
    .fetch_one(pool)
    .await?;
    get(pool, user_id, id).await
}

/// Rename; `None` returns the current row
pub async fn update(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
    name: Option<&str>,
) -> RepoResult<Supplier> {
    let Some(name) = name else {
        return get(pool, user_id, id).await;
    };
    let rows = sqlx::query("UPDATE suppliers SET name = ? WHERE id = ? AND user_id = ?")
        .bind(name)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::code(ErrorCode::SupplierNotFound));
    }
    get(pool, user_id, id).await
}

/// Delete a supplier together with everything hanging off it
///
/// In one transaction: orders placed with the supplier or containing its
/// products (their items cascade), the products (variants cascade), then
/// the supplier row.
pub async fn delete(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    let owned = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM suppliers WHERE id = ? AND user_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;
    if owned == 0 {
        return Err(RepoError::code(ErrorCode::SupplierNotFound));
    }

    // Order items cascade with their orders
    let orders = sqlx::query(
        "DELETE FROM orders WHERE user_id = ? AND (supplier_id = ? OR id IN \
         (SELECT oi.order_id FROM order_items oi JOIN products p ON p.id = oi.product_id \
          WHERE p.supplier_id = ? AND p.user_id = ?))",
    )
    .bind(user_id)
    .bind(id)
    .bind(id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let products = sqlx::query("DELETE FROM products WHERE supplier_id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM suppliers WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        supplier_id = id,
        orders_removed = orders.rows_affected(),
        products_removed = products.rows_affected(),
        "Supplier deleted"
    );
    Ok(())
}
