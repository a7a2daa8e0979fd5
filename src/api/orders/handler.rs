//! Order API Handlers
//!
//! Order placement is public (customer kiosk); the staff queues and the
//! status transition endpoint require authentication. Responses keep the
//! customer app's field names (orderId, tanggalOrder, antrian, ...).

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderStatus, OrderWithCustomer};
use crate::db::repository::OrderRepository;
use crate::orders::OrdersManager;
use crate::utils::time::{format_date_time_short, format_readable_date};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

/// Active queue statuses (everything a waiting customer still sees)
const ACTIVE: [OrderStatus; 3] = [
    OrderStatus::Pending,
    OrderStatus::InProgress,
    OrderStatus::Done,
];

/// Archive statuses
const HISTORY: [OrderStatus; 2] = [OrderStatus::Done, OrderStatus::Cancelled];

// =============================================================================
// Response shaping
// =============================================================================

/// Order item line in the staff view
#[derive(Debug, Serialize)]
pub struct FormattedItem {
    #[serde(rename = "namaMenu")]
    pub nama_menu: String,
    pub jumlah: i64,
    pub harga: i64,
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

/// Order as shown in the staff queues
#[derive(Debug, Serialize)]
pub struct FormattedOrder {
    #[serde(rename = "orderId")]
    pub order_id: String,
    #[serde(rename = "tanggalOrder")]
    pub tanggal_order: String,
    #[serde(rename = "totalOrder")]
    pub total_order: i64,
    pub nama: String,
    #[serde(rename = "tipeOrder")]
    pub tipe_order: String,
    pub pembayaran: String,
    pub antrian: i64,
    pub status: OrderStatus,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "tableNumber")]
    pub table_number: Option<String>,
    pub order: Vec<FormattedItem>,
}

impl From<OrderWithCustomer> for FormattedOrder {
    fn from(row: OrderWithCustomer) -> Self {
        let order = row.order;
        Self {
            order_id: order.key(),
            tanggal_order: format_readable_date(order.created_at),
            total_order: order.total,
            nama: row.customer_name.unwrap_or_else(|| "-".to_string()),
            tipe_order: order.order_type,
            pembayaran: order.payment_method,
            antrian: order.queue_number,
            status: order.status,
            created_at: order.created_at,
            table_number: order.table_number,
            order: order
                .items
                .into_iter()
                .map(|item| FormattedItem {
                    nama_menu: item.name,
                    jumlah: item.quantity,
                    harga: item.price,
                    note: item.notes,
                    options: item.options,
                })
                .collect(),
        }
    }
}

/// Product line in the customer session history
#[derive(Debug, Serialize)]
pub struct SessionProduct {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

/// Order as shown in the customer session history
#[derive(Debug, Serialize)]
pub struct SessionOrder {
    pub id: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "queueNumber")]
    pub queue_number: i64,
    /// Lowercased status for the customer app
    pub status: String,
    pub total: i64,
    pub products: Vec<SessionProduct>,
}

impl From<OrderWithCustomer> for SessionOrder {
    fn from(row: OrderWithCustomer) -> Self {
        let order = row.order;
        let (date, time) = format_date_time_short(order.created_at);
        Self {
            id: order.key(),
            date,
            time,
            queue_number: order.queue_number,
            status: order.status.as_str().to_lowercase(),
            total: order.total,
            products: order
                .items
                .into_iter()
                .map(|item| SessionProduct {
                    id: item.id,
                    name: item.name,
                    quantity: item.quantity,
                    price: item.price,
                    notes: item.notes,
                    options: item.options,
                })
                .collect(),
        }
    }
}

/// Order creation response: the stored order plus a formatted date
#[derive(Debug, Serialize)]
pub struct CreatedOrder {
    #[serde(flatten)]
    pub order: Order,
    #[serde(rename = "createdAtFormatted")]
    pub created_at_formatted: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/orders - 下单 (public)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<AppResponse<CreatedOrder>>> {
    let manager = OrdersManager::new(state.get_db());
    let order = manager.create_order(payload).await?;

    let created_at_formatted = format_readable_date(order.created_at);
    Ok(ok_with_message(
        CreatedOrder {
            order,
            created_at_formatted,
        },
        "Order created successfully",
    ))
}

/// GET /api/orders - 当前订单队列 (PENDING / IN_PROGRESS / DONE)
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<FormattedOrder>>>> {
    let repo = OrderRepository::new(state.get_db());
    let orders = repo.find_by_statuses(&ACTIVE).await?;
    Ok(ok_with_message(
        orders.into_iter().map(Into::into).collect(),
        "Orders retrieved successfully",
    ))
}

/// GET /api/orders/history - 历史订单 (DONE / CANCELLED)
pub async fn history(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<FormattedOrder>>>> {
    let repo = OrderRepository::new(state.get_db());
    let orders = repo.find_by_statuses(&HISTORY).await?;
    Ok(ok_with_message(
        orders.into_iter().map(Into::into).collect(),
        "Order history retrieved successfully",
    ))
}

/// GET /api/orders/progress - 制作中的订单
pub async fn progress(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<FormattedOrder>>>> {
    let repo = OrderRepository::new(state.get_db());
    let orders = repo.find_by_statuses(&[OrderStatus::InProgress]).await?;
    Ok(ok_with_message(
        orders.into_iter().map(Into::into).collect(),
        "Orders in progress retrieved successfully",
    ))
}

/// Status transition payload
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub action: String,
}

/// PUT /api/orders/:id/status - 订单状态流转
///
/// `pending_to_progress` additionally reserves stock for every tracked
/// item; on insufficient stock nothing is committed.
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<TransitionRequest>,
) -> AppResult<Json<AppResponse<FormattedOrder>>> {
    let manager = OrdersManager::new(state.get_db());
    let updated = manager.apply_transition(&id, &payload.action).await?;

    let repo = OrderRepository::new(state.get_db());
    let row = repo
        .find_by_id_with_customer(&updated.key())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;

    // The transition succeeded, so the prior status was the action's source
    let from = crate::orders::OrderAction::parse(&payload.action)
        .map(|a| a.source().to_string())
        .unwrap_or_default();
    let message = format!("Order status changed from {} to {}", from, updated.status);
    Ok(ok_with_message(row.into(), message))
}

/// Status response for customer polling
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub status: OrderStatus,
}

/// GET /api/orders/:id/status - 查询订单状态 (public)
pub async fn get_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<StatusResponse>>> {
    let manager = OrdersManager::new(state.get_db());
    let (order_id, status) = manager.get_status(&id).await?;
    Ok(ok(StatusResponse { order_id, status }))
}

/// GET /api/orders/session/:session_id - 会话订单历史 (public)
pub async fn by_session(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<AppResponse<Vec<SessionOrder>>>> {
    if session_id.trim().is_empty() {
        return Err(AppError::validation("sessionId is required"));
    }

    let repo = OrderRepository::new(state.get_db());
    let orders = repo.find_by_session(&session_id, &ACTIVE).await?;
    Ok(ok_with_message(
        orders.into_iter().map(Into::into).collect(),
        "Order history retrieved successfully",
    ))
}
