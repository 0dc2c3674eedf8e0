mod common;

use common::{create_funded_user, create_test_app, create_test_app_with, test_config};
use futures::future::join_all;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use walletgate_core::services::WalletService;
use walletgate_core::store::{ledger_op, LedgerStore, MemoryLedgerStore};
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::entities::{AccountRole, NewAccount};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_debits_on_exact_balance_let_only_one_through() {
    let app = create_test_app();
    let user_id = create_funded_user(&app.state, dec!(50)).await;

    let racers = (0..2).map(|_| {
        let state = app.state.clone();
        tokio::spawn(async move { WalletService::debit(&state, user_id, dec!(50), None).await })
    });

    let outcomes: Vec<_> = join_all(racers)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let succeeded = outcomes.iter().filter(|r| r.is_ok()).count();
    let insufficient = outcomes
        .iter()
        .filter(|r| matches!(r, Err(ApiError::InsufficientBalance { .. })))
        .count();

    assert_eq!(succeeded, 1);
    assert_eq!(insufficient, 1);

    let summary = WalletService::wallet_summary(&app.state, user_id).await.unwrap();
    assert_eq!(summary.balance, dec!(0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn many_concurrent_debits_never_overdraw() {
    let app = create_test_app();
    let user_id = create_funded_user(&app.state, dec!(100)).await;

    let racers = (0..40).map(|_| {
        let state = app.state.clone();
        tokio::spawn(async move { WalletService::debit(&state, user_id, dec!(7), None).await })
    });

    let succeeded = join_all(racers)
        .await
        .into_iter()
        .filter(|joined| matches!(joined, Ok(Ok(_))))
        .count();

    // 100 / 7 leaves 2 behind after 14 debits.
    assert_eq!(succeeded, 14);

    let report = WalletService::reconcile(&app.state, user_id).await.unwrap();
    assert_eq!(report.balance, dec!(2));
    assert!(report.is_consistent());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_users_do_not_serialize_on_each_other() {
    let mut config = test_config();
    config.ledger.lock_timeout = Duration::from_millis(200);
    let app = create_test_app_with(config);

    let busy_user = create_funded_user(&app.state, dec!(10)).await;
    let other_user = create_funded_user(&app.state, dec!(10)).await;

    let (locked_tx, locked_rx) = std::sync::mpsc::channel();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

    let store = app.state.store.clone();
    let holder = std::thread::spawn(move || {
        store.with_locked_wallet(
            busy_user,
            ledger_op(move |_| {
                locked_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                Ok(None)
            }),
        )
    });
    locked_rx.recv().unwrap();

    let other = WalletService::debit(&app.state, other_user, dec!(1), None).await;
    assert_eq!(other.unwrap(), dec!(9));

    let blocked = WalletService::debit(&app.state, busy_user, dec!(1), None).await;
    assert!(matches!(blocked, Err(ref e) if e.is_retryable()));

    release_tx.send(()).unwrap();
    holder.join().unwrap().unwrap();

    let after = WalletService::debit(&app.state, busy_user, dec!(1), None).await;
    assert_eq!(after.unwrap(), dec!(9));
}

#[test]
fn lock_wait_is_bounded() {
    let store = Arc::new(MemoryLedgerStore::new(Duration::from_millis(30)));
    let user_id = uuid::Uuid::new_v4();
    store
        .create_account_with_wallet(NewAccount {
            id: user_id,
            name: "Lock".into(),
            email: "lock@walletgate.test".into(),
            mobile: None,
            role: AccountRole::Admin,
        })
        .unwrap();

    let (locked_tx, locked_rx) = std::sync::mpsc::channel();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

    let holder_store = store.clone();
    let holder = std::thread::spawn(move || {
        holder_store.with_locked_wallet(
            user_id,
            ledger_op(move |_| {
                locked_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                Ok(None)
            }),
        )
    });
    locked_rx.recv().unwrap();

    let started = std::time::Instant::now();
    let err = store
        .with_locked_wallet(user_id, ledger_op(|_| Ok(None)))
        .unwrap_err();

    assert!(matches!(err, ApiError::StorageConflict(_)));
    assert!(started.elapsed() < Duration::from_secs(2));

    release_tx.send(()).unwrap();
    holder.join().unwrap().unwrap();
}
