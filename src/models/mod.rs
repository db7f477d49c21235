pub mod notification;
pub mod reservation;

pub use notification::{DedupKey, NewNotification, Notification, NotificationKind, NotificationTone};
pub use reservation::{NewReservation, Reservation, ReservationStatus};
