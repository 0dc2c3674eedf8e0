//! Property-based checks of the ledger invariants over random operation sequences.

mod common;

use common::{create_test_app, create_test_user};
use proptest::prelude::*;
use rust_decimal::Decimal;
use walletgate_core::services::WalletService;
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::entities::AccountRole;

#[derive(Debug, Clone)]
enum Op {
    Credit(i64, Option<u8>),
    Debit(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1i64..50_000, prop::option::of(0u8..5)).prop_map(|(cents, r)| Op::Credit(cents, r)),
        (1i64..50_000).prop_map(Op::Debit),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: balance never goes negative and always equals credits minus debits
    #[test]
    fn ledger_stays_non_negative_and_reconciled(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async {
            let app = create_test_app();
            let user_id = create_test_user(&app.state, AccountRole::Dsa).await;
            let mut expected = Decimal::ZERO;
            let mut applied_refs = Vec::new();

            for op in ops {
                match op {
                    Op::Credit(cents, reference) => {
                        let amount = Decimal::new(cents, 2);
                        let reference = reference.map(|r| format!("{}_ref_{}", user_id, r));
                        let fresh = match &reference {
                            Some(r) if applied_refs.contains(r) => false,
                            Some(r) => {
                                applied_refs.push(r.clone());
                                true
                            }
                            None => true,
                        };

                        let balance = WalletService::credit(&app.state, user_id, amount, reference)
                            .await
                            .unwrap();
                        if fresh {
                            expected += amount;
                        }
                        assert_eq!(balance, expected);
                    }
                    Op::Debit(cents) => {
                        let amount = Decimal::new(cents, 2);
                        match WalletService::debit(&app.state, user_id, amount, None).await {
                            Ok(balance) => {
                                expected -= amount;
                                assert_eq!(balance, expected);
                            }
                            Err(ApiError::InsufficientBalance { current, .. }) => {
                                assert!(amount > expected);
                                assert_eq!(current, expected);
                            }
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                    }
                }

                assert!(expected >= Decimal::ZERO);
            }

            let report = WalletService::reconcile(&app.state, user_id).await.unwrap();
            assert_eq!(report.balance, expected);
            assert!(report.is_consistent());
        });
    }
}
