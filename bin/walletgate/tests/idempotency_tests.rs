mod common;

use common::{create_test_app, create_test_user};
use futures::future::join_all;
use rust_decimal_macros::dec;
use walletgate_core::services::WalletService;
use walletgate_primitives::models::entities::{AccountRole, EntryType, NotificationKind};

#[tokio::test]
async fn repeated_credit_reference_is_applied_once() {
    let app = create_test_app();
    let user_id = create_test_user(&app.state, AccountRole::Dsa).await;

    let first = WalletService::credit(&app.state, user_id, dec!(100), Some("ref1".into()))
        .await
        .unwrap();
    let second = WalletService::credit(&app.state, user_id, dec!(100), Some("ref1".into()))
        .await
        .unwrap();

    assert_eq!(first, dec!(100));
    assert_eq!(second, dec!(100));

    let history = WalletService::transaction_history(&app.state, user_id, None)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn replayed_credit_sends_no_second_payment_alert() {
    let app = create_test_app();
    let user_id = create_test_user(&app.state, AccountRole::Dsa).await;

    for _ in 0..3 {
        WalletService::credit(&app.state, user_id, dec!(100), Some("pay_once".into()))
            .await
            .unwrap();
    }

    assert_eq!(app.dispatcher.count(user_id, NotificationKind::PaymentSuccess), 1);
}

#[tokio::test]
async fn reference_is_trimmed_before_comparison() {
    let app = create_test_app();
    let user_id = create_test_user(&app.state, AccountRole::Dsa).await;

    WalletService::credit(&app.state, user_id, dec!(10), Some("pay_7".into()))
        .await
        .unwrap();
    let balance = WalletService::credit(&app.state, user_id, dec!(10), Some("  pay_7 ".into()))
        .await
        .unwrap();

    assert_eq!(balance, dec!(10));
}

#[tokio::test]
async fn credits_without_reference_are_never_deduplicated() {
    let app = create_test_app();
    let user_id = create_test_user(&app.state, AccountRole::Dsa).await;

    WalletService::credit(&app.state, user_id, dec!(10), None).await.unwrap();
    let balance = WalletService::credit(&app.state, user_id, dec!(10), Some("   ".into()))
        .await
        .unwrap();

    assert_eq!(balance, dec!(20));
}

#[tokio::test]
async fn debit_labels_may_repeat() {
    let app = create_test_app();
    let user_id = create_test_user(&app.state, AccountRole::Dsa).await;
    WalletService::credit(&app.state, user_id, dec!(20), Some("pay_d".into()))
        .await
        .unwrap();

    WalletService::debit(&app.state, user_id, dec!(5), Some("basic_form".into()))
        .await
        .unwrap();
    let balance = WalletService::debit(&app.state, user_id, dec!(5), Some("basic_form".into()))
        .await
        .unwrap();

    assert_eq!(balance, dec!(10));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_credits_apply_once() {
    let app = create_test_app();
    let user_id = create_test_user(&app.state, AccountRole::Dsa).await;

    let attempts = (0..8).map(|_| {
        let state = app.state.clone();
        tokio::spawn(async move {
            WalletService::credit(&state, user_id, dec!(100), Some("ref1".into())).await
        })
    });

    for outcome in join_all(attempts).await {
        assert_eq!(outcome.unwrap().unwrap(), dec!(100));
    }

    let history = WalletService::transaction_history(&app.state, user_id, None)
        .await
        .unwrap();
    let credits: Vec<_> = history
        .iter()
        .filter(|t| t.entry_type == EntryType::Credit && t.reference.as_deref() == Some("ref1"))
        .collect();
    assert_eq!(credits.len(), 1);

    let report = WalletService::reconcile(&app.state, user_id).await.unwrap();
    assert!(report.is_consistent());
}
