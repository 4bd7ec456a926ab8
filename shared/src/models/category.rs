//! Category Model

use serde::{Deserialize, Serialize};

/// Categories every account starts with
pub const DEFAULT_CATEGORY_NAMES: [&str; 5] = ["반지", "목걸이", "팔찌", "귀걸이", "기타"];

/// Category entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    #[serde(default)]
    pub name: String,
}

/// Update category payload
///
/// An absent or empty name leaves the category unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
}
