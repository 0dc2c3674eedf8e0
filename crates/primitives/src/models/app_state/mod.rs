pub mod alert_settings;
pub mod app_config;
pub mod ledger_settings;
pub mod notifier_details;
pub mod payment_details;
pub mod rate_table;

pub use alert_settings::*;
pub use app_config::*;
pub use ledger_settings::*;
pub use notifier_details::*;
pub use payment_details::*;
pub use rate_table::*;
