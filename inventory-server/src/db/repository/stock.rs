//! Stock Variant Repository
//!
//! Variants are reached through their product, so every query joins
//! `products` for the ownership check. `products.stock` is rewritten in
//! the same transaction as any variant change.

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{StockDetail, StockVariant};
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Variant row ready for insertion (size already normalized)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariant {
    pub color: String,
    pub size: Option<String>,
    pub quantity: i64,
    pub image_url: Option<String>,
}

async fn product_owned(pool: &SqlitePool, user_id: i64, product_id: i64) -> RepoResult<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM products WHERE id = ? AND user_id = ?",
    )
    .bind(product_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

async fn lock_owned_product(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    product_id: i64,
) -> RepoResult<()> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM products WHERE id = ? AND user_id = ?",
    )
    .bind(product_id)
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;
    if count == 0 {
        return Err(RepoError::code(ErrorCode::ProductNotFound));
    }
    Ok(())
}

/// Set `products.stock` to the sum of its variant quantities
async fn recompute_stock(tx: &mut Transaction<'_, Sqlite>, product_id: i64) -> RepoResult<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(quantity), 0) FROM stock_variants WHERE product_id = ?",
    )
    .bind(product_id)
    .fetch_one(&mut **tx)
    .await?;
    sqlx::query("UPDATE products SET stock = ? WHERE id = ?")
        .bind(total)
        .bind(product_id)
        .execute(&mut **tx)
        .await?;
    Ok(total)
}

async fn list_variants(pool: &SqlitePool, product_id: i64) -> RepoResult<Vec<StockVariant>> {
    let variants = sqlx::query_as::<_, StockVariant>(
        "SELECT id, color, size, quantity, image_url FROM stock_variants \
         WHERE product_id = ? ORDER BY id",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;
    Ok(variants)
}

/// Variants of an owned product with their total
pub async fn find_by_product(
    pool: &SqlitePool,
    user_id: i64,
    product_id: i64,
) -> RepoResult<StockDetail> {
    if !product_owned(pool, user_id, product_id).await? {
        return Err(RepoError::code(ErrorCode::ProductNotFound));
    }
    let variants = list_variants(pool, product_id).await?;
    Ok(StockDetail::new(product_id, variants))
}

/// Replace every variant of a product
///
/// Delete-all then insert-all, followed by the stock recompute, in one
/// transaction. Nothing changes if any step fails.
pub async fn replace(
    pool: &SqlitePool,
    user_id: i64,
    product_id: i64,
    variants: &[NewVariant],
) -> RepoResult<StockDetail> {
    let mut tx = pool.begin().await?;
    lock_owned_product(&mut tx, user_id, product_id).await?;

    sqlx::query("DELETE FROM stock_variants WHERE product_id = ?")
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

    for variant in variants {
        sqlx::query(
            "INSERT INTO stock_variants (product_id, color, size, quantity, image_url) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(product_id)
        .bind(&variant.color)
        .bind(&variant.size)
        .bind(variant.quantity)
        .bind(&variant.image_url)
        .execute(&mut *tx)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => RepoError::code(ErrorCode::StockVariantDuplicate),
            other => other,
        })?;
    }

    let total = recompute_stock(&mut tx, product_id).await?;
    tx.commit().await?;

    tracing::info!(product_id, variants = variants.len(), total, "Stock replaced");
    find_by_product(pool, user_id, product_id).await
}

/// Delete the variant with the given (color, size) key
pub async fn delete_by_key(
    pool: &SqlitePool,
    user_id: i64,
    product_id: i64,
    color: &str,
    size: Option<&str>,
) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    lock_owned_product(&mut tx, user_id, product_id).await?;

    let result = sqlx::query(
        "DELETE FROM stock_variants WHERE product_id = ? AND color = ? \
         AND COALESCE(size, '') = COALESCE(?, '')",
    )
    .bind(product_id)
    .bind(color)
    .bind(size)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::code(ErrorCode::StockVariantNotFound));
    }

    recompute_stock(&mut tx, product_id).await?;
    tx.commit().await?;
    Ok(())
}

/// Delete a variant by id; it must belong to the product
pub async fn delete_by_id(
    pool: &SqlitePool,
    user_id: i64,
    product_id: i64,
    variant_id: i64,
) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    lock_owned_product(&mut tx, user_id, product_id).await?;

    let result = sqlx::query("DELETE FROM stock_variants WHERE id = ? AND product_id = ?")
        .bind(variant_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::code(ErrorCode::StockVariantNotFound));
    }

    recompute_stock(&mut tx, product_id).await?;
    tx.commit().await?;
    Ok(())
}
