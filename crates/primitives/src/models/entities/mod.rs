pub mod account;
pub mod enum_types;
pub mod notification;
pub mod subscription;
pub mod transaction;
pub mod wallet;

pub use account::*;
pub use enum_types::*;
pub use notification::*;
pub use subscription::*;
pub use transaction::*;
pub use wallet::*;
