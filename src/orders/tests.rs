use super::*;
use crate::db::DbService;
use crate::db::models::{
    CustomerInput, Menu, MenuCreate, MenuUpdate, OrderCreate, OrderItemInput, OrderStatus,
};
use crate::db::repository::{CustomerRepository, MenuRepository, OrderRepository};
use crate::orders::error::OrderError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

struct TestEnv {
    db: Surreal<Db>,
    manager: OrdersManager,
    menus: MenuRepository,
}

async fn setup() -> TestEnv {
    let db = DbService::new_in_memory().await.unwrap();
    TestEnv {
        manager: OrdersManager::new(db.db.clone()),
        menus: MenuRepository::new(db.db.clone()),
        db: db.db,
    }
}

impl TestEnv {
    /// Seed a menu; `stock = None` leaves it untracked
    async fn seed_menu(&self, nama: &str, stock: Option<i64>) -> String {
        let menu = self
            .menus
            .create(MenuCreate {
                nama: nama.to_string(),
                deskripsi: None,
                harga: 35_000,
                kategori: None,
                image: None,
                image_url: None,
            })
            .await
            .unwrap();
        let key = menu.key();
        if let Some(count) = stock {
            self.menus
                .update(
                    &key,
                    MenuUpdate {
                        status_stok: Some(true),
                        jumlah_stok: Some(count),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }
        key
    }

    async fn menu(&self, key: &str) -> Menu {
        self.menus.find_by_id(key).await.unwrap().unwrap()
    }
}

fn item(menu_id: &str, name: &str, quantity: i64) -> OrderItemInput {
    OrderItemInput {
        menu_id: menu_id.to_string(),
        name: name.to_string(),
        quantity,
        price: 35_000,
        notes: None,
        options: None,
    }
}

fn dine_in(items: Vec<OrderItemInput>) -> OrderCreate {
    OrderCreate {
        order_type: Some("DINE_IN".to_string()),
        payment_method: Some("CASH".to_string()),
        table_number: Some("4".to_string()),
        subtotal: None,
        total: None,
        session_id: None,
        customer: None,
        items,
    }
}

// ========================================================================
// Creation
// ========================================================================

#[tokio::test]
async fn test_create_order_assigns_queue_and_snapshots() {
    let env = setup().await;
    let menu = env.seed_menu("Burger Keju", Some(10)).await;

    let order = env
        .manager
        .create_order(dine_in(vec![item(&menu, "Burger Keju", 2)]))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.queue_number, 100);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 2);
    assert!(order.items[0].id.ends_with("-ITEM01"));
    assert_eq!(order.subtotal, 70_000);

    // Placement must not touch inventory
    let menu = env.menu(&menu).await;
    assert_eq!(menu.jumlah_stok, Some(10));

    let second = env
        .manager
        .create_order(dine_in(vec![item("BUR001", "Burger Keju", 1)]))
        .await
        .unwrap();
    assert_eq!(second.queue_number, 101);
}

#[tokio::test]
async fn test_create_order_validation() {
    let env = setup().await;

    // Missing items
    let err = env.manager.create_order(dine_in(vec![])).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidInput(_)));

    // Missing order type
    let mut req = dine_in(vec![item("BUR001", "Burger", 1)]);
    req.order_type = None;
    let err = env.manager.create_order(req).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidInput(_)));

    // Non-positive quantity
    let err = env
        .manager
        .create_order(dine_in(vec![item("BUR001", "Burger", 0)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidInput(_)));
}

#[tokio::test]
async fn test_create_order_upserts_customer_by_phone() {
    let env = setup().await;
    env.seed_menu("Burger Keju", None).await;

    let with_customer = |name: &str| {
        let mut req = dine_in(vec![item("BUR001", "Burger Keju", 1)]);
        req.customer = Some(CustomerInput {
            name: name.to_string(),
            phone: "081234567890".to_string(),
            email: None,
        });
        req
    };

    let a = env.manager.create_order(with_customer("Budi")).await.unwrap();
    let b = env.manager.create_order(with_customer("Budi")).await.unwrap();
    assert_eq!(a.customer, b.customer);

    let customers = CustomerRepository::new(env.db.clone());
    let found = customers.find_by_phone("081234567890").await.unwrap();
    assert!(found.is_some());
}

// ========================================================================
// Transitions — stock coupling
// ========================================================================

#[tokio::test]
async fn test_start_production_reserves_exact_stock() {
    // Scenario: BUR001 tracked with jumlah_stok = 2, order of 2 units
    let env = setup().await;
    let menu = env.seed_menu("Burger Keju", Some(2)).await;
    let order = env
        .manager
        .create_order(dine_in(vec![item(&menu, "Burger Keju", 2)]))
        .await
        .unwrap();

    let updated = env
        .manager
        .apply_transition(&order.key(), "pending_to_progress")
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::InProgress);

    let menu = env.menu(&menu).await;
    assert_eq!(menu.jumlah_stok, Some(0));
    assert!(!menu.tersedia);
}

#[tokio::test]
async fn test_start_production_insufficient_stock_aborts() {
    // Scenario: stock 2, order requests 3 — transition fails, stock intact
    let env = setup().await;
    let menu = env.seed_menu("Burger Keju", Some(2)).await;
    let order = env
        .manager
        .create_order(dine_in(vec![item(&menu, "Burger Keju", 3)]))
        .await
        .unwrap();

    let err = env
        .manager
        .apply_transition(&order.key(), "pending_to_progress")
        .await
        .unwrap_err();
    match &err {
        OrderError::InsufficientStock(name) => assert_eq!(name, "Burger Keju"),
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    let menu = env.menu(&menu).await;
    assert_eq!(menu.jumlah_stok, Some(2));
    assert!(menu.tersedia);

    let (_, status) = env.manager.get_status(&order.key()).await.unwrap();
    assert_eq!(status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_start_production_all_or_nothing_across_items() {
    // Two tracked items; the second is short. Neither may be decremented.
    let env = setup().await;
    let ok_menu = env.seed_menu("Burger Keju", Some(10)).await;
    let short_menu = env.seed_menu("Kentang Goreng", Some(1)).await;

    let order = env
        .manager
        .create_order(dine_in(vec![
            item(&ok_menu, "Burger Keju", 2),
            item(&short_menu, "Kentang Goreng", 5),
        ]))
        .await
        .unwrap();

    let before_ok = env.menu(&ok_menu).await;
    let before_short = env.menu(&short_menu).await;

    let err = env
        .manager
        .apply_transition(&order.key(), "pending_to_progress")
        .await
        .unwrap_err();
    match &err {
        OrderError::InsufficientStock(name) => assert_eq!(name, "Kentang Goreng"),
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // Snapshot diff: nothing changed anywhere
    let after_ok = env.menu(&ok_menu).await;
    let after_short = env.menu(&short_menu).await;
    assert_eq!(after_ok.jumlah_stok, before_ok.jumlah_stok);
    assert_eq!(after_ok.tersedia, before_ok.tersedia);
    assert_eq!(after_short.jumlah_stok, before_short.jumlah_stok);
    assert_eq!(after_short.tersedia, before_short.tersedia);

    let (_, status) = env.manager.get_status(&order.key()).await.unwrap();
    assert_eq!(status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_start_production_skips_untracked_items() {
    let env = setup().await;
    let untracked = env.seed_menu("Es Teh", None).await;
    let tracked = env.seed_menu("Burger Keju", Some(3)).await;

    let order = env
        .manager
        .create_order(dine_in(vec![
            item(&untracked, "Es Teh", 4),
            item(&tracked, "Burger Keju", 1),
        ]))
        .await
        .unwrap();

    env.manager
        .apply_transition(&order.key(), "pending_to_progress")
        .await
        .unwrap();

    assert_eq!(env.menu(&untracked).await.jumlah_stok, None);
    assert_eq!(env.menu(&tracked).await.jumlah_stok, Some(2));
}

#[tokio::test]
async fn test_cancel_after_production_keeps_stock_consumed() {
    // Reserved stock is treated as consumed even when the order is later
    // cancelled from IN_PROGRESS.
    let env = setup().await;
    let menu = env.seed_menu("Burger Keju", Some(5)).await;
    let order = env
        .manager
        .create_order(dine_in(vec![item(&menu, "Burger Keju", 2)]))
        .await
        .unwrap();

    env.manager
        .apply_transition(&order.key(), "pending_to_progress")
        .await
        .unwrap();
    let updated = env
        .manager
        .apply_transition(&order.key(), "progress_to_cancelled")
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Cancelled);

    let menu = env.menu(&menu).await;
    assert_eq!(menu.jumlah_stok, Some(3));
}

// ========================================================================
// Transitions — state machine edges
// ========================================================================

#[tokio::test]
async fn test_full_happy_path() {
    let env = setup().await;
    env.seed_menu("Burger Keju", None).await;
    let order = env
        .manager
        .create_order(dine_in(vec![item("BUR001", "Burger Keju", 1)]))
        .await
        .unwrap();

    let order_id = order.key();
    let updated = env
        .manager
        .apply_transition(&order_id, "pending_to_progress")
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::InProgress);

    let updated = env
        .manager
        .apply_transition(&order_id, "progress_to_done")
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Done);
}

#[tokio::test]
async fn test_cancel_before_production() {
    let env = setup().await;
    env.seed_menu("Burger Keju", None).await;
    let order = env
        .manager
        .create_order(dine_in(vec![item("BUR001", "Burger Keju", 1)]))
        .await
        .unwrap();

    let updated = env
        .manager
        .apply_transition(&order.key(), "pending_to_cancelled")
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_complete_on_pending_is_illegal() {
    // Scenario: "progress_to_done" on a PENDING order names both sides
    let env = setup().await;
    env.seed_menu("Burger Keju", None).await;
    let order = env
        .manager
        .create_order(dine_in(vec![item("BUR001", "Burger Keju", 1)]))
        .await
        .unwrap();

    let err = env
        .manager
        .apply_transition(&order.key(), "progress_to_done")
        .await
        .unwrap_err();
    match &err {
        OrderError::IllegalTransition { status, action } => {
            assert_eq!(*status, OrderStatus::Pending);
            assert_eq!(action, "progress_to_done");
        }
        other => panic!("expected IllegalTransition, got {other:?}"),
    }
    let msg = err.to_string();
    assert!(msg.contains("PENDING"));
    assert!(msg.contains("progress_to_done"));
}

#[tokio::test]
async fn test_repeat_transition_is_not_idempotent() {
    // Success then repeat: the second invocation must fail because the
    // source state no longer matches.
    let env = setup().await;
    env.seed_menu("Burger Keju", None).await;
    let order = env
        .manager
        .create_order(dine_in(vec![item("BUR001", "Burger Keju", 1)]))
        .await
        .unwrap();

    env.manager
        .apply_transition(&order.key(), "pending_to_progress")
        .await
        .unwrap();
    let err = env
        .manager
        .apply_transition(&order.key(), "pending_to_progress")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::IllegalTransition {
            status: OrderStatus::InProgress,
            ..
        }
    ));
}

#[tokio::test]
async fn test_terminal_states_reject_everything() {
    let env = setup().await;
    env.seed_menu("Burger Keju", None).await;
    let order = env
        .manager
        .create_order(dine_in(vec![item("BUR001", "Burger Keju", 1)]))
        .await
        .unwrap();
    let order_id = order.key();

    env.manager
        .apply_transition(&order_id, "pending_to_cancelled")
        .await
        .unwrap();

    for action in [
        "pending_to_progress",
        "progress_to_done",
        "pending_to_cancelled",
        "progress_to_cancelled",
    ] {
        let err = env
            .manager
            .apply_transition(&order_id, action)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::IllegalTransition { .. }));
    }
}

#[tokio::test]
async fn test_invalid_action_and_missing_order() {
    let env = setup().await;
    env.seed_menu("Burger Keju", None).await;
    let order = env
        .manager
        .create_order(dine_in(vec![item("BUR001", "Burger Keju", 1)]))
        .await
        .unwrap();

    let err = env
        .manager
        .apply_transition(&order.key(), "done_to_pending")
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidAction(_)));

    let err = env
        .manager
        .apply_transition("999999", "pending_to_progress")
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NotFound(_)));
}

// ========================================================================
// Listing
// ========================================================================

#[tokio::test]
async fn test_status_buckets() {
    let env = setup().await;
    env.seed_menu("Burger Keju", None).await;

    let mut keys = Vec::new();
    for _ in 0..3 {
        let order = env
            .manager
            .create_order(dine_in(vec![item("BUR001", "Burger Keju", 1)]))
            .await
            .unwrap();
        keys.push(order.key());
    }

    env.manager
        .apply_transition(&keys[0], "pending_to_progress")
        .await
        .unwrap();
    env.manager
        .apply_transition(&keys[1], "pending_to_cancelled")
        .await
        .unwrap();

    let repo = OrderRepository::new(env.db.clone());

    // Active queue: PENDING + IN_PROGRESS + DONE
    let active = repo
        .find_by_statuses(&[
            OrderStatus::Pending,
            OrderStatus::InProgress,
            OrderStatus::Done,
        ])
        .await
        .unwrap();
    assert_eq!(active.len(), 2);

    // History: DONE + CANCELLED
    let history = repo
        .find_by_statuses(&[OrderStatus::Done, OrderStatus::Cancelled])
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].order.status, OrderStatus::Cancelled);

    let in_progress = repo
        .find_by_statuses(&[OrderStatus::InProgress])
        .await
        .unwrap();
    assert_eq!(in_progress.len(), 1);
}

#[tokio::test]
async fn test_find_by_session() {
    let env = setup().await;
    env.seed_menu("Burger Keju", None).await;

    let mut req = dine_in(vec![item("BUR001", "Burger Keju", 1)]);
    req.session_id = Some("sesi-abc".to_string());
    env.manager.create_order(req).await.unwrap();

    env.manager
        .create_order(dine_in(vec![item("BUR001", "Burger Keju", 1)]))
        .await
        .unwrap();

    let repo = OrderRepository::new(env.db.clone());
    let orders = repo
        .find_by_session(
            "sesi-abc",
            &[
                OrderStatus::Pending,
                OrderStatus::InProgress,
                OrderStatus::Done,
            ],
        )
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
}
