//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category derived from the leading digit of the error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Supplier errors (2xxx)
    Supplier,
    /// Category errors (3xxx)
    Category,
    /// Order errors (4xxx)
    Order,
    /// Stock errors (5xxx)
    Stock,
    /// Product errors (6xxx)
    Product,
    /// Upload errors (7xxx)
    Upload,
    /// System errors (8xxx and 9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Supplier,
            3000..4000 => Self::Category,
            4000..5000 => Self::Order,
            5000..6000 => Self::Stock,
            6000..7000 => Self::Product,
            7000..8000 => Self::Upload,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Supplier => "supplier",
            Self::Category => "category",
            Self::Order => "order",
            Self::Stock => "stock",
            Self::Product => "product",
            Self::Upload => "upload",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
