//! Stock Variant Model

use serde::{Deserialize, Serialize};

/// One (color, size) stock-keeping unit of a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StockVariant {
    pub id: i64,
    pub color: String,
    pub size: Option<String>,
    pub quantity: i64,
    pub image_url: Option<String>,
}

/// Stock of one product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDetail {
    pub product_id: i64,
    pub total: i64,
    pub variants: Vec<StockVariant>,
}

impl StockDetail {
    pub fn new(product_id: i64, variants: Vec<StockVariant>) -> Self {
        let total = variants.iter().map(|v| v.quantity).sum();
        Self {
            product_id,
            total,
            variants,
        }
    }
}

/// Variant entry of a stock replace request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockVariantInput {
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl StockVariantInput {
    /// Size with blank values folded into "no size"
    pub fn normalized_size(&self) -> Option<&str> {
        self.size
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_detail_total() {
        let variants = vec![
            StockVariant {
                id: 1,
                color: "골드".to_string(),
                size: Some("11호".to_string()),
                quantity: 5,
                image_url: None,
            },
            StockVariant {
                id: 2,
                color: "실버".to_string(),
                size: Some("11호".to_string()),
                quantity: 3,
                image_url: None,
            },
        ];
        let detail = StockDetail::new(9, variants);
        assert_eq!(detail.total, 8);
        assert_eq!(detail.product_id, 9);
    }

    #[test]
    fn test_normalized_size() {
        let input: StockVariantInput =
            serde_json::from_str(r#"{"color":"골드","size":"  ","quantity":1}"#).unwrap();
        assert_eq!(input.normalized_size(), None);

        let input: StockVariantInput =
            serde_json::from_str(r#"{"color":"골드","size":"7호","quantity":1}"#).unwrap();
        assert_eq!(input.normalized_size(), Some("7호"));
    }
}
