pub mod account_repository;
pub mod notification_repository;
pub mod subscription_repository;
pub mod transaction_repository;
pub mod wallet_repository;
