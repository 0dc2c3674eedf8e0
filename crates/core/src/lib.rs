pub mod app_state;
pub mod clients;
pub mod repositories;
pub mod services;
pub mod store;

pub use app_state::AppState;
pub use store::{LedgerStore, MemoryLedgerStore, PgLedgerStore};
