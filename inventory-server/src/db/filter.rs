//! Dynamic WHERE clause builder
//!
//! List and statistics queries take optional filters. Each condition is
//! pushed together with its bound value, so placeholders and bindings
//! cannot drift apart and values never end up inside the SQL text.

use sqlx::Sqlite;
use sqlx::query::QueryAs;
use sqlx::sqlite::SqliteArguments;

/// A value bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
}

/// Builder for `WHERE a = ? AND b >= ?` style clauses
#[derive(Debug, Default, Clone)]
pub struct QueryFilter {
    conditions: Vec<String>,
    bindings: Vec<FilterValue>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `{column} = ?` bound to an integer
    pub fn eq_i64(mut self, column: &str, value: i64) -> Self {
        self.conditions.push(format!("{column} = ?"));
        self.bindings.push(FilterValue::Integer(value));
        self
    }

    /// `{column} = ?` bound to text
    pub fn eq_text(mut self, column: &str, value: impl Into<String>) -> Self {
        self.conditions.push(format!("{column} = ?"));
        self.bindings.push(FilterValue::Text(value.into()));
        self
    }

    /// `{column} = ?` when a value is present
    pub fn opt_i64(self, column: &str, value: Option<i64>) -> Self {
        match value {
            Some(v) => self.eq_i64(column, v),
            None => self,
        }
    }

    /// `{column} = ?` when a non-blank value is present
    pub fn opt_text(self, column: &str, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => self.eq_text(column, v),
            None => self,
        }
    }

    /// Half-open `{column} >= ? AND {column} < ?`
    pub fn range_i64(mut self, column: &str, start: i64, end: i64) -> Self {
        self.conditions.push(format!("{column} >= ?"));
        self.bindings.push(FilterValue::Integer(start));
        self.conditions.push(format!("{column} < ?"));
        self.bindings.push(FilterValue::Integer(end));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn bindings(&self) -> &[FilterValue] {
        &self.bindings
    }

    /// Build the WHERE clause (empty if no conditions)
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Apply bindings to a `query_as`
    pub fn bind_as<'q, O>(
        &self,
        mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    ) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
        for binding in &self.bindings {
            query = match binding {
                FilterValue::Text(s) => query.bind(s.clone()),
                FilterValue::Integer(i) => query.bind(*i),
            };
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_where_clause() {
        let filter = QueryFilter::new();
        assert!(filter.is_empty());
        assert_eq!(filter.where_clause(), "");
    }

    #[test]
    fn test_conditions_keep_their_bindings_in_order() {
        let filter = QueryFilter::new()
            .eq_i64("p.user_id", 7)
            .eq_text("o.status", "PENDING");
        assert_eq!(filter.where_clause(), " WHERE p.user_id = ? AND o.status = ?");
        assert_eq!(
            filter.bindings(),
            &[
                FilterValue::Integer(7),
                FilterValue::Text("PENDING".to_string())
            ]
        );
    }

    #[test]
    fn test_optional_filters_skip_absent_and_blank() {
        let filter = QueryFilter::new()
            .opt_i64("supplier_id", None)
            .opt_text("category", Some("   "))
            .opt_text("color", None);
        assert!(filter.is_empty());

        let filter = QueryFilter::new().opt_text("c.name", Some(" 반지 "));
        assert_eq!(filter.bindings(), &[FilterValue::Text("반지".to_string())]);
    }

    #[test]
    fn test_range() {
        let filter = QueryFilter::new().range_i64("o.created_at", 10, 20);
        assert_eq!(
            filter.where_clause(),
            " WHERE o.created_at >= ? AND o.created_at < ?"
        );
        assert_eq!(
            filter.bindings(),
            &[FilterValue::Integer(10), FilterValue::Integer(20)]
        );
    }

    #[test]
    fn test_values_never_reach_sql_text() {
        let filter = QueryFilter::new().eq_text("name", "x' OR '1'='1");
        assert!(!filter.where_clause().contains("OR"));
    }
}
