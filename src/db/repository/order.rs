//! Order Repository
//!
//! Orders are written once at creation (together with their embedded item
//! snapshots) and afterwards mutated only by status-transition operations.
//! Both transition shapes are guarded at the storage layer:
//!
//! - plain transitions are a single conditional
//!   `UPDATE ... WHERE status = <source>` (compare-and-swap on the status),
//! - the start-production transition runs as one SurrealDB transaction that
//!   decrements every tracked item's stock and flips the status, throwing —
//!   and thereby cancelling the whole transaction — as soon as any item
//!   cannot be reserved.

use super::{BaseRepository, RepoError, RepoResult, strip_table_prefix};
use crate::db::models::{Order, OrderStatus, OrderWithCustomer};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "order";

/// Stock reservation line for the start-production transaction
#[derive(Debug, Clone)]
pub struct ReservationLine {
    /// Pure menu id ("BUR001")
    pub menu_key: String,
    /// Item display name, used in the insufficient-stock message
    pub name: String,
    pub quantity: i64,
}

/// Failure modes of the start-production transaction
#[derive(Debug)]
pub enum TransitionTxnError {
    /// A tracked item could not be reserved; carries the item name
    InsufficientStock(String),
    /// The order status no longer matched the expected source state
    StaleStatus,
    Database(String),
}

const INSUFFICIENT_MARKER: &str = "INSUFFICIENT_STOCK:";
const STALE_MARKER: &str = "STALE_STATUS";

/// Map a thrown transaction error back to its failure mode
fn parse_txn_error(err: &surrealdb::Error) -> TransitionTxnError {
    let msg = err.to_string();
    if let Some(pos) = msg.find(INSUFFICIENT_MARKER) {
        let rest = &msg[pos + INSUFFICIENT_MARKER.len()..];
        let name = rest
            .split(['"', '\'', '\n'])
            .next()
            .unwrap_or(rest)
            .trim()
            .to_string();
        TransitionTxnError::InsufficientStock(name)
    } else if msg.contains(STALE_MARKER) {
        TransitionTxnError::StaleStatus
    } else {
        TransitionTxnError::Database(msg)
    }
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find order by id ("order:1754..." or bare key)
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let order: Option<Order> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(order)
    }

    /// Find order by id with the customer name joined in
    pub async fn find_by_id_with_customer(&self, id: &str) -> RepoResult<Option<OrderWithCustomer>> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "SELECT *, customer.name AS customer_name \
                 FROM type::thing('order', $id)",
            )
            .bind(("id", pure_id))
            .await?;
        let orders: Vec<OrderWithCustomer> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Find orders in the given statuses, newest first
    pub async fn find_by_statuses(
        &self,
        statuses: &[OrderStatus],
    ) -> RepoResult<Vec<OrderWithCustomer>> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let mut result = self
            .base
            .db()
            .query(
                "SELECT *, customer.name AS customer_name FROM order \
                 WHERE status IN $statuses ORDER BY created_at DESC",
            )
            .bind(("statuses", statuses))
            .await?;
        let orders: Vec<OrderWithCustomer> = result.take(0)?;
        Ok(orders)
    }

    /// Find a session's orders in the given statuses, newest first
    pub async fn find_by_session(
        &self,
        session_id: &str,
        statuses: &[OrderStatus],
    ) -> RepoResult<Vec<OrderWithCustomer>> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let session_owned = session_id.to_string();
        let mut result = self
            .base
            .db()
            .query(
                "SELECT *, customer.name AS customer_name FROM order \
                 WHERE session_id = $session AND status IN $statuses \
                 ORDER BY created_at DESC",
            )
            .bind(("session", session_owned))
            .bind(("statuses", statuses))
            .await?;
        let orders: Vec<OrderWithCustomer> = result.take(0)?;
        Ok(orders)
    }

    /// Persist a new order with its item snapshots in one atomic create.
    ///
    /// Keys are `ORD<millis>` timestamps; a collision (two orders in the
    /// same millisecond) just bumps the key and retries. Item ids embed the
    /// final key (`<key>-ITEM01`, ...), so they are rewritten per attempt.
    pub async fn create(&self, mut order: Order) -> RepoResult<Order> {
        let base_key = now_millis();
        for attempt in 0..5 {
            let key = format!("ORD{}", base_key + attempt);
            order.id = None;
            for (index, item) in order.items.iter_mut().enumerate() {
                item.id = format!("{}-ITEM{:02}", key, index + 1);
            }
            let created: Result<Option<Order>, surrealdb::Error> = self
                .base
                .db()
                .create((TABLE, key))
                .content(order.clone())
                .await;
            match created {
                Ok(Some(created)) => return Ok(created),
                Ok(None) => {
                    return Err(RepoError::Database("Failed to create order".to_string()));
                }
                // Key taken, try the next millisecond slot
                Err(_) if attempt < 4 => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(RepoError::Database("Failed to allocate order id".to_string()))
    }

    /// Conditionally flip the order status (no stock side effects).
    ///
    /// Returns `None` when the order's status no longer matches `source`,
    /// i.e. the compare-and-swap lost.
    pub async fn update_status_checked(
        &self,
        id: &str,
        source: OrderStatus,
        target: OrderStatus,
    ) -> RepoResult<Option<Order>> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing('order', $id) SET status = $target \
                 WHERE status = $source RETURN AFTER",
            )
            .bind(("id", pure_id))
            .bind(("source", source.as_str()))
            .bind(("target", target.as_str()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Start production: reserve stock for every tracked item and flip the
    /// status, all inside one transaction.
    ///
    /// The reservation of each line is itself conditional
    /// (`status_stok = true AND jumlah_stok >= quantity`); an empty update
    /// result means the line cannot be reserved and the whole transaction is
    /// cancelled with THROW, leaving every count and the status untouched.
    pub async fn start_production_txn(
        &self,
        id: &str,
        source: OrderStatus,
        target: OrderStatus,
        reservations: &[ReservationLine],
    ) -> Result<Order, TransitionTxnError> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();

        let mut sql = String::from("BEGIN TRANSACTION;");
        for i in 0..reservations.len() {
            sql.push_str(&format!(
                "LET $m{i} = (UPDATE type::thing('menu', $menu{i}) \
                 SET tersedia = (jumlah_stok - $qty{i}) > 0, jumlah_stok -= $qty{i} \
                 WHERE status_stok = true AND jumlah_stok >= $qty{i} RETURN AFTER); \
                 IF array::len($m{i}) == 0 {{ THROW $err{i} }};"
            ));
        }
        sql.push_str(
            "LET $ord = (UPDATE type::thing('order', $id) SET status = $target \
             WHERE status = $source RETURN AFTER); \
             IF array::len($ord) == 0 { THROW $stale };",
        );
        sql.push_str("COMMIT TRANSACTION;");

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("id", pure_id.clone()))
            .bind(("source", source.as_str()))
            .bind(("target", target.as_str()))
            .bind(("stale", STALE_MARKER));

        for (i, line) in reservations.iter().enumerate() {
            query = query
                .bind((format!("menu{i}"), line.menu_key.clone()))
                .bind((format!("qty{i}"), line.quantity))
                .bind((
                    format!("err{i}"),
                    format!("{}{}", INSUFFICIENT_MARKER, line.name),
                ));
        }

        let response = query.await.map_err(|e| parse_txn_error(&e))?;
        response.check().map_err(|e| parse_txn_error(&e))?;

        self.find_by_id(&pure_id)
            .await
            .map_err(|e| TransitionTxnError::Database(e.to_string()))?
            .ok_or(TransitionTxnError::StaleStatus)
    }
}
