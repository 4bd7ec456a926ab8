//! Purchase Order Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    Pending,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(format!("Unknown order status: {other}")),
        }
    }
}

/// Order header joined with its supplier name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    /// Creation time (Unix millis)
    pub date: i64,
    pub supplier_id: i64,
    pub supplier_name: String,
    /// Σ item quantity at creation
    pub item_count: i64,
    /// Σ quantity × product price at creation
    pub total_amount: i64,
    pub status: OrderStatus,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub items: Option<Vec<OrderItem>>,
}

/// Order line joined with the current product, category and supplier data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: i64,
    pub name: String,
    pub sku: String,
    pub price: i64,
    pub category: String,
    pub image_url: Option<String>,
    pub supplier_id: i64,
    pub supplier_name: String,
    pub quantity: i64,
    pub selected_color: String,
    pub selected_size: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub supplier_id: i64,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

/// Line item of a create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub selected_color: String,
    #[serde(default)]
    pub selected_size: Option<String>,
}

/// Status update payload
///
/// Kept as text so an unknown value maps to `OrderInvalidStatus`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: String,
}
