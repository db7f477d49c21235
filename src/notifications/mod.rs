pub mod emitter;
pub mod messages;
pub mod store;

pub use emitter::NotificationEmitter;
pub use messages::{format_date_time, status_message, StatusMessage};
pub use store::{NotificationStore, NOTIFICATIONS_KEY};
