mod common;

use common::{create_funded_user, create_test_app, create_test_user};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;
use walletgate_core::services::{AccessService, AccountService, SubscriptionService, WalletService};
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::dtos::access_dto::{AccessDecision, AccessKind, Denial, Grant};
use walletgate_primitives::models::entities::{
    AccountRole, AccountStatus, ActionKind, WalletStatus,
};

#[tokio::test]
async fn subscription_grants_free_access_with_empty_wallet() {
    let app = create_test_app();
    let user_id = create_test_user(&app.state, AccountRole::Dsa).await;
    SubscriptionService::activate(&app.state, user_id, "Monthly", dec!(999), 30)
        .await
        .unwrap();

    let decision = AccessService::evaluate(&app.state, user_id, ActionKind::RealtimeValidation)
        .await
        .unwrap();

    assert_eq!(
        decision,
        AccessDecision::Grant(Grant {
            kind: AccessKind::Subscription,
            charge: Decimal::ZERO
        })
    );
}

#[tokio::test]
async fn expired_subscription_falls_back_to_wallet() {
    let app = create_test_app();
    let user_id = create_test_user(&app.state, AccountRole::Dsa).await;
    SubscriptionService::activate(&app.state, user_id, "Monthly", dec!(999), 30)
        .await
        .unwrap();

    let far_future = chrono::Utc::now()
        .date_naive()
        .checked_add_days(chrono::Days::new(31))
        .unwrap();
    SubscriptionService::expire_lapsed(&app.state, far_future).await.unwrap();

    let decision = AccessService::evaluate(&app.state, user_id, ActionKind::Basic)
        .await
        .unwrap();

    assert_eq!(
        decision,
        AccessDecision::Denial(Denial::InsufficientBalance {
            required: dec!(5),
            current: dec!(0)
        })
    );
}

#[tokio::test]
async fn prepaid_grant_charges_configured_rate() {
    let app = create_test_app();
    let user_id = create_funded_user(&app.state, dec!(60)).await;

    let basic = AccessService::evaluate(&app.state, user_id, ActionKind::Basic)
        .await
        .unwrap();
    assert_eq!(
        basic,
        AccessDecision::Grant(Grant {
            kind: AccessKind::Prepaid,
            charge: dec!(5)
        })
    );

    let realtime = AccessService::evaluate(&app.state, user_id, ActionKind::RealtimeValidation)
        .await
        .unwrap();
    assert!(realtime.is_granted());
}

#[tokio::test]
async fn blocked_account_is_denied_regardless_of_funds_or_plan() {
    let app = create_test_app();
    let user_id = create_funded_user(&app.state, dec!(1000)).await;
    SubscriptionService::activate(&app.state, user_id, "Annual", dec!(9999), 365)
        .await
        .unwrap();
    AccountService::set_status(&app.state, user_id, AccountStatus::Blocked)
        .await
        .unwrap();

    for action in ActionKind::ALL {
        let decision = AccessService::evaluate(&app.state, user_id, action).await.unwrap();
        assert_eq!(decision, AccessDecision::Denial(Denial::AccountBlocked));
    }

    let err = AccessService::authorize_and_charge(&app.state, user_id, ActionKind::Basic, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::AccountBlocked));
}

#[tokio::test]
async fn inactive_wallet_is_denied_on_prepaid_path() {
    let app = create_test_app();
    let user_id = create_funded_user(&app.state, dec!(500)).await;
    WalletService::set_validity(&app.state, user_id, WalletStatus::Expired, None)
        .await
        .unwrap();

    let decision = AccessService::evaluate(&app.state, user_id, ActionKind::Basic)
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::Denial(Denial::WalletInactive));
}

#[tokio::test]
async fn unknown_user_is_an_error() {
    let app = create_test_app();

    let err = AccessService::evaluate(&app.state, Uuid::new_v4(), ActionKind::Basic)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::AccountNotFound(_)));
}

#[tokio::test]
async fn authorize_and_charge_debits_on_prepaid_grant() {
    let app = create_test_app();
    let user_id = create_funded_user(&app.state, dec!(60)).await;

    let receipt = AccessService::authorize_and_charge(
        &app.state,
        user_id,
        ActionKind::RealtimeValidation,
        Some("realtime_validation".into()),
    )
    .await
    .unwrap();

    assert_eq!(receipt.access, AccessKind::Prepaid);
    assert_eq!(receipt.charged, dec!(50));
    assert_eq!(receipt.balance, Some(dec!(10)));

    let err = AccessService::authorize_and_charge(&app.state, user_id, ActionKind::RealtimeValidation, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::InsufficientBalance { required, current } if required == dec!(50) && current == dec!(10)
    ));
}

#[tokio::test]
async fn authorize_and_charge_is_free_under_subscription() {
    let app = create_test_app();
    let user_id = create_funded_user(&app.state, dec!(20)).await;
    SubscriptionService::activate(&app.state, user_id, "Monthly", dec!(999), 30)
        .await
        .unwrap();

    let receipt = AccessService::authorize_and_charge(&app.state, user_id, ActionKind::Basic, None)
        .await
        .unwrap();

    assert_eq!(receipt.access, AccessKind::Subscription);
    assert_eq!(receipt.charged, Decimal::ZERO);
    assert_eq!(receipt.balance, None);

    let summary = WalletService::wallet_summary(&app.state, user_id).await.unwrap();
    assert_eq!(summary.balance, dec!(20));
}

#[tokio::test]
async fn lost_race_after_grant_looks_like_eager_denial() {
    let app = create_test_app();
    let user_id = create_funded_user(&app.state, dec!(5)).await;

    let grant = AccessService::evaluate(&app.state, user_id, ActionKind::Basic)
        .await
        .unwrap()
        .into_result()
        .unwrap();

    // Another request spends the balance between the check and the debit.
    WalletService::debit(&app.state, user_id, dec!(5), None).await.unwrap();

    let late = WalletService::debit(&app.state, user_id, grant.charge, None)
        .await
        .unwrap_err();
    let eager = AccessService::evaluate(&app.state, user_id, ActionKind::Basic)
        .await
        .unwrap()
        .into_result()
        .unwrap_err();

    assert_eq!(late.to_string(), eager.to_string());
    assert_eq!(late.status_code(), eager.status_code());
}

#[tokio::test]
async fn balance_check_reports_per_action_eligibility() {
    let app = create_test_app();
    let user_id = create_funded_user(&app.state, dec!(20)).await;

    let check = AccessService::balance_check(&app.state, user_id).await.unwrap();

    assert_eq!(check.balance, dec!(20));
    assert_eq!(check.wallet_status, WalletStatus::Active);
    assert_eq!(check.access, AccessKind::Prepaid);
    assert!(check.subscription_end.is_none());
    assert!(check.can_submit_basic);
    assert!(!check.can_submit_realtime);
    assert_eq!(check.rates.realtime_validation, dec!(50));

    let sub = SubscriptionService::activate(&app.state, user_id, "Monthly", dec!(999), 30)
        .await
        .unwrap();
    let check = AccessService::balance_check(&app.state, user_id).await.unwrap();

    assert_eq!(check.access, AccessKind::Subscription);
    assert_eq!(check.subscription_end, Some(sub.end_date));
    assert!(check.can_submit_realtime);
}
