pub mod access_dto;
pub mod alert_dto;
pub mod wallet_dto;

pub use access_dto::*;
pub use alert_dto::*;
pub use wallet_dto::*;
