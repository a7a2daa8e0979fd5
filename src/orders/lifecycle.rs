//! Order Lifecycle State Machine
//!
//! Four named actions, each tied to exactly one source → target edge:
//!
//! | Action                  | From        | To          |
//! |-------------------------|-------------|-------------|
//! | `pending_to_progress`   | PENDING     | IN_PROGRESS |
//! | `progress_to_done`      | IN_PROGRESS | DONE        |
//! | `pending_to_cancelled`  | PENDING     | CANCELLED   |
//! | `progress_to_cancelled` | IN_PROGRESS | CANCELLED   |
//!
//! DONE and CANCELLED are terminal. Re-running an action against an order
//! already in the target state fails — the source no longer matches.

use crate::db::models::OrderStatus;

/// Named status-transition action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    /// Kitchen starts working on the order (reserves stock)
    StartProduction,
    /// Order completed
    Complete,
    /// Cancelled before production
    CancelPending,
    /// Cancelled while in production
    CancelInProgress,
}

impl OrderAction {
    /// Parse the wire action string; `None` for anything unrecognized
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "pending_to_progress" => Some(Self::StartProduction),
            "progress_to_done" => Some(Self::Complete),
            "pending_to_cancelled" => Some(Self::CancelPending),
            "progress_to_cancelled" => Some(Self::CancelInProgress),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartProduction => "pending_to_progress",
            Self::Complete => "progress_to_done",
            Self::CancelPending => "pending_to_cancelled",
            Self::CancelInProgress => "progress_to_cancelled",
        }
    }

    /// Required current status for this action
    pub fn source(&self) -> OrderStatus {
        match self {
            Self::StartProduction | Self::CancelPending => OrderStatus::Pending,
            Self::Complete | Self::CancelInProgress => OrderStatus::InProgress,
        }
    }

    /// Status the order moves to on success
    pub fn target(&self) -> OrderStatus {
        match self {
            Self::StartProduction => OrderStatus::InProgress,
            Self::Complete => OrderStatus::Done,
            Self::CancelPending | Self::CancelInProgress => OrderStatus::Cancelled,
        }
    }

    /// Only the start-production edge touches the stock ledger
    pub fn reserves_stock(&self) -> bool {
        matches!(self, Self::StartProduction)
    }
}

impl std::fmt::Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
