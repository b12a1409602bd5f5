use serde::{Deserialize, Serialize};
use std::fmt;

/// 訂單單位，只允許 gm / kg / pieces 三種
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Gm,
    Kg,
    Pieces,
}

impl Unit {
    /// 正規化聊天中出現的單位字樣 (gms / g / pcs / piece ...)
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "gm" | "gms" | "g" => Some(Unit::Gm),
            "kg" => Some(Unit::Kg),
            "piece" | "pieces" | "pcs" => Some(Unit::Pieces),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Gm => "gm",
            Unit::Kg => "kg",
            Unit::Pieces => "pieces",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical chat message after continuation lines have been folded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub date: String,
    pub time: String,
    pub phone: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductMatch {
    pub product: &'static str,
    pub quantity: f64,
    pub unit: Unit,
}

/// 最終輸出的訂單記錄，遠端與本地解析共用同一個 schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub date: String,
    pub time: String,
    pub phone: String,
    pub customer_name: String,
    pub house_number: String,
    pub product: String,
    pub quantity: f64,
    pub unit: Unit,
    pub price_per_unit: f64,
    pub amount: f64,
}

/// JSON 匯出與遠端回應的外層包裝 `{"orders": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBatch {
    pub orders: Vec<OrderRecord>,
}

/// Why a message (or one product inside it) produced no order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmatchedReason {
    NoProducts,
    QuantityNotFound { product: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unmatched {
    pub date: String,
    pub time: String,
    pub phone: String,
    pub reason: UnmatchedReason,
}

#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub orders: Vec<OrderRecord>,
    pub unmatched: Vec<Unmatched>,
}

/// 每個產品 + 單位的彙總
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSummary {
    pub product: String,
    pub unit: Unit,
    pub orders: usize,
    pub total_quantity: f64,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub orders: Vec<OrderRecord>,
    pub csv_output: String,
    pub json_output: String,
    pub summary: Vec<ProductSummary>,
}
