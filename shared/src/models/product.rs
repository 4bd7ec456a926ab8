//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity, joined with its category and supplier names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub price: i64,
    /// Category name
    pub category: String,
    pub image_url: Option<String>,
    pub supplier_id: i64,
    pub supplier_name: String,
    /// Always equals the sum of the product's stock variant quantities
    pub stock: i64,
    /// Ring-like products carry a size on every variant
    pub has_sizes: bool,
    /// Grid position on the supplier board (None = not placed yet)
    pub row_index: Option<i64>,
    pub col_index: Option<i64>,
}

/// Bulk create payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBulkCreate {
    pub supplier_id: i64,
    #[serde(default)]
    pub items: Vec<ProductBulkItem>,
}

/// One product of a bulk create
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBulkItem {
    /// Category name, resolved against the caller's categories
    #[serde(default)]
    pub category: String,
    pub price: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: String,
    /// `data:image/<ext>;base64,...`
    pub image_base64: Option<String>,
    pub image_url: Option<String>,
    pub has_sizes: Option<bool>,
}

/// Drag-and-drop position update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPositionUpdate {
    pub supplier_id: i64,
    #[serde(default)]
    pub items: Vec<ProductPosition>,
}

/// New grid position of one product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPosition {
    pub product_id: i64,
    pub row_index: i64,
    pub col_index: i64,
}

impl ProductPosition {
    /// Negative indices come from stale client state and are ignored
    pub fn is_valid(&self) -> bool {
        self.product_id > 0 && self.row_index >= 0 && self.col_index >= 0
    }
}
