pub mod notification;

pub use notification::{HttpNotificationDispatcher, NotificationDispatcher};
