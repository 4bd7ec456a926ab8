//! Product Repository
//!
//! Products are always read joined with their category and supplier
//! names. Listing filters go through [`QueryFilter`].

use super::{RepoError, RepoResult};
use crate::db::filter::QueryFilter;
use shared::error::{AppError, ErrorCode};
use shared::models::{Product, ProductPosition};
use sqlx::SqlitePool;

const PRODUCT_SELECT: &str = "SELECT p.id, p.name, p.sku, p.price, c.name AS category, p.image_url, \
     p.supplier_id, s.name AS supplier_name, p.stock, p.has_sizes, p.row_index, p.col_index \
     FROM products p \
     JOIN categories c ON c.id = p.category_id \
     JOIN suppliers s ON s.id = p.supplier_id";

/// Positioned products first, then by grid position, then id
const PRODUCT_ORDER: &str = " ORDER BY p.row_index IS NULL, p.row_index, \
     p.col_index IS NULL, p.col_index, p.id";

/// Product row ready for insertion (images already stored)
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category: String,
    pub price: i64,
    pub name: String,
    pub sku: String,
    pub image_url: Option<String>,
    pub has_sizes: bool,
}

pub async fn find_all(
    pool: &SqlitePool,
    user_id: i64,
    supplier_id: Option<i64>,
    category: Option<&str>,
) -> RepoResult<Vec<Product>> {
    let filter = QueryFilter::new()
        .eq_i64("p.user_id", user_id)
        .opt_i64("p.supplier_id", supplier_id)
        .opt_text("c.name", category);
    let sql = format!("{PRODUCT_SELECT}{}{PRODUCT_ORDER}", filter.where_clause());
    let products = filter
        .bind_as(sqlx::query_as::<_, Product>(&sql))
        .fetch_all(pool)
        .await?;
    Ok(products)
}

pub async fn find_by_id(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "{PRODUCT_SELECT} WHERE p.id = ? AND p.user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(product)
}

/// Owned product or `ProductNotFound`
pub async fn get(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<Product> {
    find_by_id(pool, user_id, id)
        .await?
        .ok_or_else(|| RepoError::code(ErrorCode::ProductNotFound))
}

/// Insert several products for one supplier in a single transaction
///
/// Category names resolve against the caller's categories; an unknown
/// name aborts the whole batch.
pub async fn bulk_create(
    pool: &SqlitePool,
    user_id: i64,
    supplier_id: i64,
    items: Vec<NewProduct>,
) -> RepoResult<Vec<Product>> {
    let mut tx = pool.begin().await?;

    let supplier_owned = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM suppliers WHERE id = ? AND user_id = ?",
    )
    .bind(supplier_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;
    if supplier_owned == 0 {
        return Err(RepoError::code(ErrorCode::SupplierNotFound));
    }

    let now = shared::util::now_millis();
    let mut ids = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let category_id = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM categories WHERE user_id = ? AND name = ?",
        )
        .bind(user_id)
        .bind(&item.category)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::invalid_field(
                &format!("items[{index}].category"),
                format!("Unknown category: {}", item.category),
            )
        })?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO products (name, sku, price, category_id, supplier_id, image_url, \
             has_sizes, user_id, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&item.name)
        .bind(&item.sku)
        .bind(item.price)
        .bind(category_id)
        .bind(supplier_id)
        .bind(&item.image_url)
        .bind(item.has_sizes)
        .bind(user_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        ids.push(id);
    }

    tx.commit().await?;

    let mut created = Vec::with_capacity(ids.len());
    for id in ids {
        created.push(get(pool, user_id, id).await?);
    }
    Ok(created)
}

/// Apply drag-and-drop grid positions within one supplier
///
/// Rows not owned by the caller or not under the supplier are left
/// untouched. Returns the number of rows updated.
pub async fn update_positions(
    pool: &SqlitePool,
    user_id: i64,
    supplier_id: i64,
    positions: &[ProductPosition],
) -> RepoResult<u64> {
    let mut tx = pool.begin().await?;
    let mut updated = 0;
    for pos in positions {
        let result = sqlx::query(
            "UPDATE products SET row_index = ?, col_index = ? \
             WHERE id = ? AND user_id = ? AND supplier_id = ?",
        )
        .bind(pos.row_index)
        .bind(pos.col_index)
        .bind(pos.product_id)
        .bind(user_id)
        .bind(supplier_id)
        .execute(&mut *tx)
        .await?;
        updated += result.rows_affected();
    }
    tx.commit().await?;
    Ok(updated)
}

/// Delete a product; one referenced by an order item is `ProductInUse`
pub async fn delete(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM products WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::InUse(_) => RepoError::code(ErrorCode::ProductInUse),
            other => other,
        })?;
    if result.rows_affected() == 0 {
        return Err(RepoError::code(ErrorCode::ProductNotFound));
    }
    Ok(())
}

/// Whether any product or stock variant of any user points at `url`
///
/// Stored images are shared by content hash, so this is not owner-scoped.
pub async fn image_in_use(pool: &SqlitePool, url: &str) -> RepoResult<bool> {
    let in_use = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM products WHERE image_url = ?1) \
         OR EXISTS(SELECT 1 FROM stock_variants WHERE image_url = ?1)",
    )
    .bind(url)
    .fetch_one(pool)
    .await?;
    Ok(in_use)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;

    fn new_product(category: &str, name: &str, price: i64) -> NewProduct {
        NewProduct {
            category: category.to_string(),
            price,
            name: name.to_string(),
            sku: format!("SKU-{name}"),
            image_url: None,
            has_sizes: category == "반지",
        }
    }

    fn code_of(err: RepoError) -> ErrorCode {
        match err {
            RepoError::App(e) => e.code,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_bulk_create_joins_names() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let s1 = test_support::supplier(&pool, alice, "S1").await;
        test_support::category(&pool, alice, "반지").await;
        test_support::category(&pool, alice, "목걸이").await;

        let created = bulk_create(
            &pool,
            alice,
            s1,
            vec![new_product("반지", "ring", 10000), new_product("목걸이", "chain", 5000)],
        )
        .await
        .unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].category, "반지");
        assert_eq!(created[0].supplier_name, "S1");
        assert!(created[0].has_sizes);
        assert!(!created[1].has_sizes);
        assert_eq!(created[1].stock, 0);
    }

    #[tokio::test]
    async fn test_bulk_create_is_all_or_nothing() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let s1 = test_support::supplier(&pool, alice, "S1").await;
        test_support::category(&pool, alice, "반지").await;

        let err = bulk_create(
            &pool,
            alice,
            s1,
            vec![new_product("반지", "ok", 1), new_product("없는분류", "bad", 1)],
        )
        .await
        .unwrap_err();
        assert_eq!(code_of(err), ErrorCode::ValidationFailed);
        assert!(find_all(&pool, alice, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_create_rejects_foreign_supplier() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let bob = test_support::user(&pool, "bob").await;
        let bobs = test_support::supplier(&pool, bob, "B").await;
        test_support::category(&pool, alice, "반지").await;

        let err = bulk_create(&pool, alice, bobs, vec![new_product("반지", "x", 1)])
            .await
            .unwrap_err();
        assert_eq!(code_of(err), ErrorCode::SupplierNotFound);
    }

    #[tokio::test]
    async fn test_filters_and_ordering() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let bob = test_support::user(&pool, "bob").await;
        let s1 = test_support::supplier(&pool, alice, "S1").await;
        let s2 = test_support::supplier(&pool, alice, "S2").await;
        let ring = test_support::category(&pool, alice, "반지").await;
        let chain = test_support::category(&pool, alice, "목걸이").await;
        let a = test_support::product(&pool, alice, s1, ring, "a", 1).await;
        let b = test_support::product(&pool, alice, s1, chain, "b", 1).await;
        let c = test_support::product(&pool, alice, s1, ring, "c", 1).await;
        test_support::product(&pool, alice, s2, ring, "d", 1).await;

        let all = find_all(&pool, alice, None, None).await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(find_all(&pool, bob, None, None).await.unwrap().is_empty());

        let rings = find_all(&pool, alice, Some(s1), Some("반지")).await.unwrap();
        assert_eq!(rings.iter().map(|p| p.id).collect::<Vec<_>>(), vec![a, c]);

        let updated = update_positions(
            &pool,
            alice,
            s1,
            &[
                ProductPosition { product_id: c, row_index: 0, col_index: 0 },
                ProductPosition { product_id: b, row_index: 0, col_index: 1 },
            ],
        )
        .await
        .unwrap();
        assert_eq!(updated, 2);

        let ordered = find_all(&pool, alice, Some(s1), None).await.unwrap();
        assert_eq!(ordered.iter().map(|p| p.id).collect::<Vec<_>>(), vec![c, b, a]);
        assert_eq!(ordered[0].row_index, Some(0));
        assert_eq!(ordered[2].row_index, None);
    }

    #[tokio::test]
    async fn test_positions_ignore_other_supplier_and_owner() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let bob = test_support::user(&pool, "bob").await;
        let s1 = test_support::supplier(&pool, alice, "S1").await;
        let s2 = test_support::supplier(&pool, alice, "S2").await;
        let ring = test_support::category(&pool, alice, "반지").await;
        let p = test_support::product(&pool, alice, s2, ring, "p", 1).await;

        let pos = [ProductPosition { product_id: p, row_index: 3, col_index: 3 }];
        assert_eq!(update_positions(&pool, alice, s1, &pos).await.unwrap(), 0);
        assert_eq!(update_positions(&pool, bob, s2, &pos).await.unwrap(), 0);
        assert_eq!(get(&pool, alice, p).await.unwrap().row_index, None);
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let bob = test_support::user(&pool, "bob").await;
        let s1 = test_support::supplier(&pool, alice, "S1").await;
        let ring = test_support::category(&pool, alice, "반지").await;
        let used = test_support::product(&pool, alice, s1, ring, "used", 1).await;
        let free = test_support::product(&pool, alice, s1, ring, "free", 1).await;

        let order_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO orders (order_number, created_at, supplier_id, item_count, total_amount, user_id) \
             VALUES ('PO-1', 0, ?, 1, 1, ?) RETURNING id",
        )
        .bind(s1)
        .bind(alice)
        .fetch_one(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, selected_color) VALUES (?, ?, 1, '골드')")
            .bind(order_id)
            .bind(used)
            .execute(&pool)
            .await
            .unwrap();

        assert_eq!(code_of(delete(&pool, alice, used).await.unwrap_err()), ErrorCode::ProductInUse);
        assert_eq!(code_of(delete(&pool, bob, free).await.unwrap_err()), ErrorCode::ProductNotFound);
        delete(&pool, alice, free).await.unwrap();
        assert_eq!(code_of(get(&pool, alice, free).await.unwrap_err()), ErrorCode::ProductNotFound);
    }

    #[tokio::test]
    async fn test_image_in_use() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice").await;
        let s1 = test_support::supplier(&pool, alice, "S1").await;
        let ring = test_support::category(&pool, alice, "반지").await;
        let p = test_support::product(&pool, alice, s1, ring, "P", 100).await;

        assert!(!image_in_use(&pool, "/uploads/images/a.jpg").await.unwrap());

        sqlx::query("UPDATE products SET image_url = '/uploads/images/a.jpg' WHERE id = ?")
            .bind(p)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO stock_variants (product_id, color, quantity, image_url) \
             VALUES (?, '골드', 1, '/uploads/images/b.jpg')",
        )
        .bind(p)
        .execute(&pool)
        .await
        .unwrap();

        assert!(image_in_use(&pool, "/uploads/images/a.jpg").await.unwrap());
        assert!(image_in_use(&pool, "/uploads/images/b.jpg").await.unwrap());
        assert!(!image_in_use(&pool, "/uploads/images/c.jpg").await.unwrap());
    }
}
