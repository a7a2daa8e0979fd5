//! Orders Manager
//!
//! Entry point for the two order mutations: creation and status
//! transitions. Placement is deliberately two-phase: creating an order
//! reserves a queue slot, not inventory — stock is committed only when the
//! kitchen starts work (`pending_to_progress`), at which point every
//! tracked item is reserved and the status flipped inside one storage
//! transaction. Cancelling an order that already entered production does
//! not return reserved stock; the kitchen has started using it.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Order, OrderCreate, OrderItem, OrderStatus};
use crate::db::repository::{
    CustomerRepository, MenuRepository, OrderRepository, SequenceRepository,
    order::{ReservationLine, TransitionTxnError},
};
use crate::utils::time::now_millis;

use super::OrderAction;
use super::error::OrderError;

pub type OrderResult<T> = Result<T, OrderError>;

/// Coordinates order creation and lifecycle transitions
#[derive(Clone)]
pub struct OrdersManager {
    orders: OrderRepository,
    menus: MenuRepository,
    customers: CustomerRepository,
    sequences: SequenceRepository,
}

impl OrdersManager {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            menus: MenuRepository::new(db.clone()),
            customers: CustomerRepository::new(db.clone()),
            sequences: SequenceRepository::new(db),
        }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Place a new order: validate, resolve the customer, allocate id and
    /// queue number, persist order + item snapshots atomically.
    ///
    /// Stock is NOT touched here.
    pub async fn create_order(&self, payload: OrderCreate) -> OrderResult<Order> {
        let order_type = payload
            .order_type
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| OrderError::InvalidInput("orderType is required".to_string()))?
            .to_string();
        let payment_method = payload
            .payment_method
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| OrderError::InvalidInput("paymentMethod is required".to_string()))?
            .to_string();
        if payload.items.is_empty() {
            return Err(OrderError::InvalidInput(
                "items must not be empty".to_string(),
            ));
        }
        for item in &payload.items {
            if item.quantity <= 0 {
                return Err(OrderError::InvalidInput(format!(
                    "Quantity for item '{}' must be positive",
                    item.name
                )));
            }
            if item.price < 0 {
                return Err(OrderError::InvalidInput(format!(
                    "Price for item '{}' must not be negative",
                    item.name
                )));
            }
        }

        // Resolve or create the customer by phone
        let customer = match payload.customer {
            Some(input) if !input.phone.trim().is_empty() => {
                Some(self.customers.upsert_by_phone(input).await?)
            }
            _ => None,
        };

        let queue_number = self.sequences.next_queue_number().await?;

        // Name and price are snapshots: later menu edits must not change
        // this order. Item ids are finalized by the repository once the
        // order key is allocated.
        let computed_subtotal: i64 = payload.items.iter().map(|i| i.price * i.quantity).sum();
        let items: Vec<OrderItem> = payload
            .items
            .into_iter()
            .map(|item| OrderItem {
                id: String::new(),
                menu_id: item.menu_id,
                name: item.name,
                quantity: item.quantity,
                price: item.price,
                notes: item.notes,
                options: item.options,
            })
            .collect();

        let order = Order {
            id: None,
            status: OrderStatus::Pending,
            order_type,
            payment_method,
            table_number: payload.table_number,
            subtotal: payload.subtotal.unwrap_or(computed_subtotal),
            total: payload.total.unwrap_or(computed_subtotal),
            queue_number,
            session_id: payload.session_id,
            customer: customer.and_then(|c| c.id),
            items,
            created_at: now_millis(),
        };

        let created = self.orders.create(order).await?;

        tracing::info!(
            order_id = %created.key(),
            queue_number = created.queue_number,
            items = created.items.len(),
            "Order created"
        );
        Ok(created)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Apply a named status transition to an order.
    ///
    /// For `pending_to_progress`, every stock-tracked item is reserved and
    /// the status flipped in one transaction: if any item is short, nothing
    /// is committed for any item of the order and the status is unchanged.
    pub async fn apply_transition(&self, order_id: &str, action: &str) -> OrderResult<Order> {
        let action = OrderAction::parse(action)
            .ok_or_else(|| OrderError::InvalidAction(action.to_string()))?;

        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;

        if order.status != action.source() {
            return Err(OrderError::IllegalTransition {
                status: order.status,
                action: action.as_str().to_string(),
            });
        }

        let updated = if action.reserves_stock() {
            self.start_production(&order, action).await?
        } else {
            match self
                .orders
                .update_status_checked(order_id, action.source(), action.target())
                .await?
            {
                Some(updated) => updated,
                // Lost the compare-and-swap: report the status it has now
                None => return Err(self.stale_transition(order_id, action).await),
            }
        };

        tracing::info!(
            order_id = %updated.key(),
            from = %action.source(),
            to = %updated.status,
            action = %action,
            "Order status changed"
        );
        Ok(updated)
    }

    /// Reserve stock for every tracked item and flip the status atomically
    async fn start_production(&self, order: &Order, action: OrderAction) -> OrderResult<Order> {
        let mut reservations = Vec::new();
        for item in &order.items {
            // Menus deleted since the snapshot are skipped, like untracked ones
            let Some(menu) = self.menus.find_by_id(&item.menu_id).await? else {
                continue;
            };
            if menu.status_stok {
                reservations.push(ReservationLine {
                    menu_key: menu.key(),
                    name: item.name.clone(),
                    quantity: item.quantity,
                });
            }
        }

        if reservations.is_empty() {
            // Nothing to reserve; plain conditional status flip
            return match self
                .orders
                .update_status_checked(&order.key(), action.source(), action.target())
                .await?
            {
                Some(updated) => Ok(updated),
                None => Err(self.stale_transition(&order.key(), action).await),
            };
        }

        match self
            .orders
            .start_production_txn(&order.key(), action.source(), action.target(), &reservations)
            .await
        {
            Ok(updated) => Ok(updated),
            Err(TransitionTxnError::InsufficientStock(name)) => {
                tracing::warn!(
                    order_id = %order.key(),
                    item = %name,
                    "Stock reservation rejected, transition rolled back"
                );
                Err(OrderError::InsufficientStock(name))
            }
            Err(TransitionTxnError::StaleStatus) => {
                Err(self.stale_transition(&order.key(), action).await)
            }
            Err(TransitionTxnError::Database(msg)) => Err(OrderError::Database(msg)),
        }
    }

    /// Build the error for a transition whose status check lost the race
    async fn stale_transition(&self, order_id: &str, action: OrderAction) -> OrderError {
        match self.orders.find_by_id(order_id).await {
            Ok(Some(order)) => OrderError::IllegalTransition {
                status: order.status,
                action: action.as_str().to_string(),
            },
            Ok(None) => OrderError::NotFound(order_id.to_string()),
            Err(e) => e.into(),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current status of an order
    pub async fn get_status(&self, order_id: &str) -> OrderResult<(String, OrderStatus)> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;
        Ok((order.key(), order.status))
    }
}
