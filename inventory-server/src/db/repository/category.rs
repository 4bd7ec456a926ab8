//! Category Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Category, DEFAULT_CATEGORY_NAMES};
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name FROM categories WHERE user_id = ? ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

/// All categories, seeding the default set first when the user has none
pub async fn find_all_or_seed(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Category>> {
    let categories = find_all(pool, user_id).await?;
    if !categories.is_empty() {
        return Ok(categories);
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    for name in DEFAULT_CATEGORY_NAMES {
        // A concurrent first request may have seeded already
        sqlx::query(
            "INSERT INTO categories (name, user_id, created_at) VALUES (?, ?, ?) \
             ON CONFLICT (user_id, name) DO NOTHING",
        )
        .bind(name)
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    tracing::debug!(user_id, "Seeded default categories");

    find_all(pool, user_id).await
}

pub async fn find_by_id(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT id, name FROM categories WHERE id = ? AND user_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(category)
}

fn name_taken(err: sqlx::Error) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::code(ErrorCode::CategoryNameExists),
        other => other,
    }
}

pub async fn create(pool: &SqlitePool, user_id: i64, name: &str) -> RepoResult<Category> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO categories (name, user_id, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(user_id)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(name_taken)?;
    Ok(Category {
        id,
        name: name.to_string(),
    })
}

/// Rename; `None` returns the current row
pub async fn update(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
    name: Option<&str>,
) -> RepoResult<Category> {
    let existing = find_by_id(pool, user_id, id)
        .await?
        .ok_or_else(|| RepoError::code(ErrorCode::CategoryNotFound))?;
    let Some(name) = name else {
        return Ok(existing);
    };
    if name == existing.name {
        return Ok(existing);
    }

    sqlx::query("UPDATE categories SET name = ? WHERE id = ? AND user_id = ?")
        .bind(name)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(name_taken)?;
    Ok(Category {
        id,
        name: name.to_string(),
    })
}

pub async fn delete(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<()> {
    if find_by_id(pool, user_id, id).await?.is_none() {
        return Err(RepoError::code(ErrorCode::CategoryNotFound));
    }

    let in_use = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM products WHERE category_id = ? AND user_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    if in_use > 0 {
        return Err(RepoError::code(ErrorCode::CategoryHasProducts));
    }

    sqlx::query("DELETE FROM categories WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::InUse(_) => RepoError::code(ErrorCode::CategoryHasProducts),
            other => other,
        })?;
    Ok(())
}
