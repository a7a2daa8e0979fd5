//! Stock Ledger
//!
//! Sole writer of `jumlah_stok`/`tersedia` for stock-tracked menus.
//!
//! Every operation is a single conditional `UPDATE ... WHERE ... RETURN
//! AFTER` against one menu row, so the precondition check and the write
//! land in one storage-level operation: two concurrent reservations can
//! never both pass the `jumlah_stok >= quantity` check on the same stock.
//! The availability flag is recomputed from the count in the same
//! statement — never copied, never set independently — which keeps
//! `tersedia ⇔ jumlah_stok > 0` true after every ledger write.

use crate::db::models::Menu;
use crate::db::repository::strip_table_prefix;
use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Stock ledger failures, all recoverable by the caller
#[derive(Debug, Error)]
pub enum StockError {
    #[error("Menu {0} not found")]
    NotFound(String),

    #[error("Menu '{0}' is not stock-tracked")]
    NotStockTracked(String),

    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    /// Reservation rejected (order entering production)
    #[error("Insufficient stock for menu '{name}': {available} left, {requested} requested")]
    Insufficient {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Manual reduction rejected (stock correction outside the order flow)
    #[error("Cannot reduce stock of menu '{name}' below zero: {available} left, {requested} requested")]
    ReduceBelowZero {
        name: String,
        available: i64,
        requested: i64,
    },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for StockError {
    fn from(err: surrealdb::Error) -> Self {
        StockError::Database(err.to_string())
    }
}

impl From<StockError> for AppError {
    fn from(e: StockError) -> Self {
        match e {
            StockError::NotFound(msg) => AppError::NotFound(format!("Menu {} not found", msg)),
            StockError::NotStockTracked(name) => AppError::NotStockTracked(name),
            StockError::InvalidQuantity(q) => {
                AppError::InvalidQuantity(format!("Quantity must be positive, got {}", q))
            }
            e @ (StockError::Insufficient { .. } | StockError::ReduceBelowZero { .. }) => {
                AppError::InsufficientStock(e.to_string())
            }
            StockError::Database(msg) => AppError::Database(msg),
        }
    }
}

pub type StockResult<T> = Result<T, StockError>;

/// Stock ledger over the embedded database
#[derive(Clone)]
pub struct StockLedger {
    db: Surreal<Db>,
}

impl StockLedger {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    async fn fetch_menu(&self, menu_id: &str) -> StockResult<Menu> {
        let pure_id = strip_table_prefix("menu", menu_id);
        let menu: Option<Menu> = self.db.select(("menu", pure_id)).await?;
        menu.ok_or_else(|| StockError::NotFound(menu_id.to_string()))
    }

    /// Conditional decrement shared by `reserve` and `reduce`.
    ///
    /// Returns `None` when the compare-and-swap lost, i.e. the row no longer
    /// satisfied `status_stok = true AND jumlah_stok >= quantity`.
    async fn try_decrement(&self, menu_key: &str, quantity: i64) -> StockResult<Option<Menu>> {
        let mut result = self
            .db
            .query(
                "UPDATE type::thing('menu', $id) \
                 SET tersedia = (jumlah_stok - $qty) > 0, jumlah_stok -= $qty \
                 WHERE status_stok = true AND jumlah_stok >= $qty \
                 RETURN AFTER",
            )
            .bind(("id", menu_key.to_string()))
            .bind(("qty", quantity))
            .await?;
        let menus: Vec<Menu> = result.take(0)?;
        Ok(menus.into_iter().next())
    }

    /// Reserve stock for an order entering production.
    ///
    /// No-op (trivial success) when the menu is not stock-tracked.
    pub async fn reserve(&self, menu_id: &str, quantity: i64) -> StockResult<Menu> {
        if quantity <= 0 {
            return Err(StockError::InvalidQuantity(quantity));
        }

        let menu = self.fetch_menu(menu_id).await?;
        if !menu.status_stok {
            return Ok(menu);
        }

        let key = menu.key();
        match self.try_decrement(&key, quantity).await? {
            Some(updated) => Ok(updated),
            None => {
                // Re-read for an accurate count in the error message
                let current = self.fetch_menu(&key).await?;
                Err(StockError::Insufficient {
                    name: current.nama,
                    available: current.jumlah_stok.unwrap_or(0),
                    requested: quantity,
                })
            }
        }
    }

    /// Add stock back. Restocking always makes the menu available again.
    pub async fn restock(&self, menu_id: &str, quantity: i64) -> StockResult<Menu> {
        if quantity <= 0 {
            return Err(StockError::InvalidQuantity(quantity));
        }

        let menu = self.fetch_menu(menu_id).await?;
        if !menu.status_stok {
            return Err(StockError::NotStockTracked(menu.nama));
        }

        let mut result = self
            .db
            .query(
                "UPDATE type::thing('menu', $id) \
                 SET jumlah_stok += $qty, tersedia = true \
                 WHERE status_stok = true \
                 RETURN AFTER",
            )
            .bind(("id", menu.key()))
            .bind(("qty", quantity))
            .await?;
        let menus: Vec<Menu> = result.take(0)?;
        menus
            .into_iter()
            .next()
            .ok_or_else(|| StockError::NotFound(menu_id.to_string()))
    }

    /// Manual stock correction outside the order flow.
    ///
    /// Unlike `reserve`, reducing an untracked menu is an error rather than
    /// a no-op — a correction on a menu without a count is a caller mistake.
    pub async fn reduce(&self, menu_id: &str, quantity: i64) -> StockResult<Menu> {
        if quantity <= 0 {
            return Err(StockError::InvalidQuantity(quantity));
        }

        let menu = self.fetch_menu(menu_id).await?;
        if !menu.status_stok {
            return Err(StockError::NotStockTracked(menu.nama));
        }

        let key = menu.key();
        match self.try_decrement(&key, quantity).await? {
            Some(updated) => Ok(updated),
            None => {
                let current = self.fetch_menu(&key).await?;
                Err(StockError::ReduceBelowZero {
                    name: current.nama,
                    available: current.jumlah_stok.unwrap_or(0),
                    requested: quantity,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{MenuCreate, MenuUpdate};
    use crate::db::repository::MenuRepository;

    async fn setup() -> (MenuRepository, StockLedger) {
        let db = DbService::new_in_memory().await.unwrap();
        (MenuRepository::new(db.db.clone()), StockLedger::new(db.db))
    }

    async fn seed_menu(repo: &MenuRepository, tracked: bool, stock: i64) -> String {
        let menu = repo
            .create(MenuCreate {
                nama: "Burger Keju".to_string(),
                deskripsi: None,
                harga: 35_000,
                kategori: None,
                image: None,
                image_url: None,
            })
            .await
            .unwrap();
        let key = menu.key();
        if tracked {
            repo.update(
                &key,
                MenuUpdate {
                    status_stok: Some(true),
                    jumlah_stok: Some(stock),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }
        key
    }

    fn assert_invariant(menu: &Menu) {
        if menu.status_stok {
            let stock = menu.jumlah_stok.unwrap_or(0);
            assert!(stock >= 0, "stock must never go negative");
            assert_eq!(menu.tersedia, stock > 0, "tersedia must track the count");
        }
    }

    #[tokio::test]
    async fn test_reserve_decrements_and_recomputes_flag() {
        let (repo, ledger) = setup().await;
        let key = seed_menu(&repo, true, 5).await;

        let menu = ledger.reserve(&key, 3).await.unwrap();
        assert_eq!(menu.jumlah_stok, Some(2));
        assert!(menu.tersedia);
        assert_invariant(&menu);

        // Draining the stock flips tersedia off
        let menu = ledger.reserve(&key, 2).await.unwrap();
        assert_eq!(menu.jumlah_stok, Some(0));
        assert!(!menu.tersedia);
        assert_invariant(&menu);
    }

    #[tokio::test]
    async fn test_reserve_insufficient_leaves_stock_untouched() {
        let (repo, ledger) = setup().await;
        let key = seed_menu(&repo, true, 2).await;

        let err = ledger.reserve(&key, 3).await.unwrap_err();
        match err {
            StockError::Insufficient {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected Insufficient, got {other:?}"),
        }

        let menu = repo.find_by_id(&key).await.unwrap().unwrap();
        assert_eq!(menu.jumlah_stok, Some(2));
        assert!(menu.tersedia);
    }

    #[tokio::test]
    async fn test_reserve_untracked_is_noop() {
        let (repo, ledger) = setup().await;
        let key = seed_menu(&repo, false, 0).await;

        let menu = ledger.reserve(&key, 10).await.unwrap();
        assert!(!menu.status_stok);
        assert!(menu.tersedia);
        assert_eq!(menu.jumlah_stok, None);
    }

    #[tokio::test]
    async fn test_restock_from_zero_restores_availability() {
        // Scenario: restock(5) on a menu with jumlah_stok = 0
        let (repo, ledger) = setup().await;
        let key = seed_menu(&repo, true, 0).await;

        let menu = ledger.restock(&key, 5).await.unwrap();
        assert_eq!(menu.jumlah_stok, Some(5));
        assert!(menu.tersedia);
        assert_invariant(&menu);
    }

    #[tokio::test]
    async fn test_restock_untracked_rejected() {
        let (repo, ledger) = setup().await;
        let key = seed_menu(&repo, false, 0).await;

        let err = ledger.restock(&key, 5).await.unwrap_err();
        assert!(matches!(err, StockError::NotStockTracked(_)));
    }

    #[tokio::test]
    async fn test_non_positive_quantities_rejected() {
        let (repo, ledger) = setup().await;
        let key = seed_menu(&repo, true, 5).await;

        for qty in [0, -3] {
            assert!(matches!(
                ledger.reserve(&key, qty).await.unwrap_err(),
                StockError::InvalidQuantity(_)
            ));
            assert!(matches!(
                ledger.restock(&key, qty).await.unwrap_err(),
                StockError::InvalidQuantity(_)
            ));
            assert!(matches!(
                ledger.reduce(&key, qty).await.unwrap_err(),
                StockError::InvalidQuantity(_)
            ));
        }
    }

    #[tokio::test]
    async fn test_reduce_manual_correction() {
        let (repo, ledger) = setup().await;
        let key = seed_menu(&repo, true, 4).await;

        let menu = ledger.reduce(&key, 4).await.unwrap();
        assert_eq!(menu.jumlah_stok, Some(0));
        assert!(!menu.tersedia);

        let err = ledger.reduce(&key, 1).await.unwrap_err();
        assert!(matches!(err, StockError::ReduceBelowZero { .. }));

        let err = ledger.reduce(&seed_menu(&repo, false, 0).await, 1).await.unwrap_err();
        assert!(matches!(err, StockError::NotStockTracked(_)));
    }

    #[tokio::test]
    async fn test_unknown_menu() {
        let (_repo, ledger) = setup().await;
        assert!(matches!(
            ledger.reserve("BUR999", 1).await.unwrap_err(),
            StockError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_invariant_holds_across_operation_sequence() {
        let (repo, ledger) = setup().await;
        let key = seed_menu(&repo, true, 3).await;

        let ops: Vec<(&str, i64)> = vec![
            ("reserve", 1),
            ("reserve", 2),
            ("restock", 4),
            ("reduce", 3),
            ("reduce", 1),
            ("restock", 1),
        ];
        for (op, qty) in ops {
            let result = match op {
                "reserve" => ledger.reserve(&key, qty).await,
                "restock" => ledger.restock(&key, qty).await,
                _ => ledger.reduce(&key, qty).await,
            };
            let menu = result.unwrap();
            assert_invariant(&menu);
        }

        let menu = repo.find_by_id(&key).await.unwrap().unwrap();
        assert_eq!(menu.jumlah_stok, Some(1));
        assert!(menu.tersedia);
    }

    #[tokio::test]
    async fn test_concurrent_reservations_never_oversell() {
        let (repo, ledger) = setup().await;
        let key = seed_menu(&repo, true, 1).await;

        let (a, b) = tokio::join!(ledger.reserve(&key, 1), ledger.reserve(&key, 1));
        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one of two concurrent reservations may win");

        let menu = repo.find_by_id(&key).await.unwrap().unwrap();
        assert_eq!(menu.jumlah_stok, Some(0));
        assert!(!menu.tersedia);
    }
}
