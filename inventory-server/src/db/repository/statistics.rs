//! Product Statistics Repository
//!
//! Aggregates order lines per product over a half-open time window.
//! Amounts use the current product price.

use super::{RepoError, RepoResult};
use crate::db::filter::QueryFilter;
use shared::error::ErrorCode;
use shared::models::{ProductStatistic, StatisticsSort};
use sqlx::SqlitePool;

/// Criteria of one statistics query
#[derive(Debug, Clone, Default)]
pub struct StatisticsQuery {
    /// Inclusive lower bound (Unix millis)
    pub start: i64,
    /// Exclusive upper bound (Unix millis)
    pub end: i64,
    pub supplier_id: Option<i64>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub sort_by: StatisticsSort,
}

impl StatisticsQuery {
    fn filter(&self, user_id: i64) -> QueryFilter {
        QueryFilter::new()
            .eq_i64("o.user_id", user_id)
            .range_i64("o.created_at", self.start, self.end)
            .opt_i64("o.supplier_id", self.supplier_id)
            .opt_text("c.name", self.category.as_deref())
            .opt_text("oi.selected_color", self.color.as_deref())
    }
}

fn order_by(sort: StatisticsSort) -> &'static str {
    match sort {
        StatisticsSort::Quantity => " ORDER BY total_qty DESC, p.id",
        StatisticsSort::Amount => " ORDER BY total_amount DESC, p.id",
    }
}

pub async fn product_statistics(
    pool: &SqlitePool,
    user_id: i64,
    query: &StatisticsQuery,
) -> RepoResult<Vec<ProductStatistic>> {
    if query.start >= query.end {
        return Ok(Vec::new());
    }

    let filter = query.filter(user_id);
    let sql = format!(
        "SELECT p.id, p.name, p.image_url, c.name AS category, o.supplier_id, \
         s.name AS supplier_name, p.price AS unit_price, \
         SUM(oi.quantity) AS total_qty, SUM(oi.quantity * p.price) AS total_amount \
         FROM order_items oi \
         JOIN orders o ON o.id = oi.order_id \
         JOIN products p ON p.id = oi.product_id \
         JOIN categories c ON c.id = p.category_id \
         JOIN suppliers s ON s.id = o.supplier_id{} \
         GROUP BY p.id{}",
        filter.where_clause(),
        order_by(query.sort_by)
    );

    let rows = filter
        .bind_as(sqlx::query_as::<_, ProductStatistic>(&sql))
        .fetch_all(pool)
        .await
        .map_err(map_sum_overflow)?;
    Ok(rows)
}

/// SQLite's `SUM` raises "integer overflow" instead of wrapping
fn map_sum_overflow(err: sqlx::Error) -> RepoError {
    match err.as_database_error() {
        Some(db_err) if db_err.message().contains("integer overflow") => {
            RepoError::code(ErrorCode::ValueOutOfRange)
        }
        _ => err.into(),
    }
}
