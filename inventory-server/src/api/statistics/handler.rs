//! Statistics API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::statistics::{self, StatisticsQuery};
use crate::utils::time::month_range_millis;
use crate::utils::validation::{non_blank, parse_optional_i64, parse_required_i64};
use crate::utils::{AppError, AppResult, ErrorCode, ValidQuery};
use shared::models::{
    ProductStatisticsReport, StatisticsFilters, StatisticsRange, StatisticsSort,
    StatisticsTotals,
};

/// Raw query parameters; numbers arrive as text so blanks can be told apart
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatisticsParams {
    pub start_year: Option<String>,
    pub start_month: Option<String>,
    pub end_year: Option<String>,
    pub end_month: Option<String>,
    pub supplier_id: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub sort_by: Option<String>,
}

fn parse_sort(value: Option<&str>) -> AppResult<StatisticsSort> {
    match non_blank(value) {
        None | Some("quantity") => Ok(StatisticsSort::Quantity),
        Some("amount") => Ok(StatisticsSort::Amount),
        Some(other) => Err(AppError::invalid_field(
            "sortBy",
            format!("sortBy must be quantity or amount, got {other}"),
        )),
    }
}

fn parse_year(value: Option<&str>, field: &str) -> AppResult<i32> {
    let year = parse_required_i64(value, field)?;
    i32::try_from(year)
        .ok()
        .filter(|y| (1..=9999).contains(y))
        .ok_or_else(|| AppError::invalid_field(field, format!("{field} is out of range")))
}

fn parse_month(value: Option<&str>, field: &str) -> AppResult<u32> {
    let month = parse_required_i64(value, field)?;
    u32::try_from(month)
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| AppError::invalid_field(field, format!("{field} must be between 1 and 12")))
}

/// GET /api/statistics/products
pub async fn products(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidQuery(params): ValidQuery<ProductStatisticsParams>,
) -> AppResult<Json<ProductStatisticsReport>> {
    let start_year = parse_year(params.start_year.as_deref(), "startYear")?;
    let start_month = parse_month(params.start_month.as_deref(), "startMonth")?;
    let end_year = parse_year(params.end_year.as_deref(), "endYear")?;
    let end_month = parse_month(params.end_month.as_deref(), "endMonth")?;
    let sort_by = parse_sort(params.sort_by.as_deref())?;
    let supplier_id = parse_optional_i64(params.supplier_id.as_deref(), "supplierId")?;
    let category = non_blank(params.category.as_deref()).map(str::to_string);
    let color = non_blank(params.color.as_deref()).map(str::to_string);

    let (start, end) =
        month_range_millis(start_year, start_month, end_year, end_month, state.timezone)?;

    let query = StatisticsQuery {
        start,
        end,
        supplier_id,
        category,
        color,
        sort_by,
    };
    let items = statistics::product_statistics(&state.db, user.id, &query).await?;
    let totals = StatisticsTotals::from_items(&items)
        .ok_or_else(|| AppError::new(ErrorCode::ValueOutOfRange))?;

    Ok(Json(ProductStatisticsReport {
        range: StatisticsRange {
            start: format!("{start_year}.{start_month}"),
            end: format!("{end_year}.{end_month}"),
        },
        filters: StatisticsFilters {
            supplier_id: query.supplier_id,
            category: query.category,
            color: query.color,
            sort_by: query.sort_by,
        },
        totals,
        items,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort(None).unwrap(), StatisticsSort::Quantity);
        assert_eq!(parse_sort(Some("")).unwrap(), StatisticsSort::Quantity);
        assert_eq!(parse_sort(Some("amount")).unwrap(), StatisticsSort::Amount);
        assert!(parse_sort(Some("price")).is_err());
    }

    #[test]
    fn test_parse_month_bounds() {
        assert_eq!(parse_month(Some("1"), "startMonth").unwrap(), 1);
        assert_eq!(parse_month(Some("12"), "startMonth").unwrap(), 12);
        assert!(parse_month(Some("0"), "startMonth").is_err());
        assert!(parse_month(Some("13"), "startMonth").is_err());
        assert!(parse_month(None, "startMonth").is_err());
        assert!(parse_month(Some("x"), "startMonth").is_err());
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year(Some("2024"), "startYear").unwrap(), 2024);
        assert!(parse_year(Some("-1"), "startYear").is_err());
    }
}
