//! Product Statistics Model

use serde::{Deserialize, Serialize};

/// Sort key of the product statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatisticsSort {
    #[default]
    Quantity,
    Amount,
}

/// Aggregated order lines of one product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ProductStatistic {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
    pub category: String,
    pub supplier_id: i64,
    pub supplier_name: String,
    /// Current product price
    pub unit_price: i64,
    pub total_qty: i64,
    pub total_amount: i64,
}

/// Requested month range, rendered as `YYYY.M`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsRange {
    pub start: String,
    pub end: String,
}

/// Echo of the applied filters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsFilters {
    pub supplier_id: Option<i64>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub sort_by: StatisticsSort,
}

/// Grand totals over all returned rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsTotals {
    pub qty: i64,
    pub amount: i64,
}

impl StatisticsTotals {
    /// Sum of all rows; `None` when a total does not fit in an `i64`
    pub fn from_items(items: &[ProductStatistic]) -> Option<Self> {
        items.iter().try_fold(Self::default(), |acc, item| {
            Some(Self {
                qty: acc.qty.checked_add(item.total_qty)?,
                amount: acc.amount.checked_add(item.total_amount)?,
            })
        })
    }
}

/// `/statistics/products` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStatisticsReport {
    pub range: StatisticsRange,
    pub filters: StatisticsFilters,
    pub totals: StatisticsTotals,
    pub items: Vec<ProductStatistic>,
}
