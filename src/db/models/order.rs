//! Order Model
//!
//! Orders are created in one atomic write together with their item
//! snapshots and are never physically deleted — archival happens through
//! the status field. Item name and price are snapshots taken at creation
//! time; later menu edits must not change historical orders.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type OrderId = RecordId;

// =============================================================================
// Order
// =============================================================================

/// Order status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Done,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Done => "DONE",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item snapshot embedded in an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// `<order key>-ITEM01`, `<order key>-ITEM02`, ...
    pub id: String,
    /// Pure menu id at snapshot time ("BUR001")
    pub menu_id: String,
    /// Name snapshot
    pub name: String,
    pub quantity: i64,
    /// Unit price snapshot in whole rupiah
    pub price: i64,
    #[serde(default)]
    pub notes: Option<String>,
    /// Selected options, stored opaquely
    #[serde(default)]
    pub options: Option<serde_json::Value>,
}

/// Order entity (ids look like `order:ORD1754400000000`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<OrderId>,
    pub status: OrderStatus,
    pub order_type: String,
    pub payment_method: String,
    #[serde(default)]
    pub table_number: Option<String>,
    pub subtotal: i64,
    pub total: i64,
    /// Human-facing ticket number, assigned once at creation
    pub queue_number: i64,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub customer: Option<RecordId>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub created_at: i64,
}

impl Order {
    /// Pure id part without the table prefix
    pub fn key(&self) -> String {
        self.id
            .as_ref()
            .map(|t| t.key().to_string())
            .unwrap_or_default()
    }
}

/// Order joined with the customer name (query projection)
#[derive(Debug, Clone, Deserialize)]
pub struct OrderWithCustomer {
    #[serde(flatten)]
    pub order: Order,
    #[serde(default)]
    pub customer_name: Option<String>,
}

// =============================================================================
// API Request Types
// =============================================================================

/// Item line in an order request
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemInput {
    #[serde(rename = "menuId")]
    pub menu_id: String,
    pub name: String,
    pub quantity: i64,
    pub price: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub options: Option<serde_json::Value>,
}

/// Create order payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreate {
    #[serde(rename = "orderType")]
    pub order_type: Option<String>,
    #[serde(rename = "paymentMethod")]
    pub payment_method: Option<String>,
    #[serde(rename = "tableNumber", default)]
    pub table_number: Option<String>,
    #[serde(default)]
    pub subtotal: Option<i64>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub customer: Option<super::CustomerInput>,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}
