use std::sync::Arc;

use crate::models::{NewNotification, Notification, NotificationKind, Reservation, ReservationStatus};

use super::{messages::status_message, NotificationStore};

/// Turns a detected status transition into a stored notification. The store
/// owns deduplication; titles come from fixed constants so a repeated
/// transition always yields the same key.
#[derive(Clone)]
pub struct NotificationEmitter {
    store: Arc<NotificationStore>,
}

impl NotificationEmitter {
    pub fn new(store: Arc<NotificationStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<NotificationStore> {
        &self.store
    }

    pub fn emit_status_change(
        &self,
        reservation: &Reservation,
        new_status: &ReservationStatus,
    ) -> Option<Notification> {
        let text = status_message(new_status, &reservation.date, &reservation.time);

        self.store.add(NewNotification {
            reservation_id: reservation.id.clone().unwrap_or_default(),
            kind: NotificationKind::StatusChange,
            title: text.title.to_string(),
            message: text.message,
            reservation: Some(reservation.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn reservation(status: &str) -> Reservation {
        Reservation {
            id: Some("r1".into()),
            date: "2024-08-01".into(),
            time: "10:00".into(),
            status: Some(status.into()),
            ..Reservation::default()
        }
    }

    #[test]
    fn same_transition_twice_stores_once() {
        let store = Arc::new(NotificationStore::new(Arc::new(MemoryStorage::new())));
        let emitter = NotificationEmitter::new(store.clone());

        let first = emitter
            .emit_status_change(&reservation("confirme"), &ReservationStatus::Confirmed)
            .unwrap();
        assert_eq!(first.title, "Réservation confirmée");
        assert_eq!(first.kind, NotificationKind::StatusChange);
        assert_eq!(
            first.reservation.as_ref().and_then(|r| r.status.as_deref()),
            Some("confirme")
        );

        let again =
            emitter.emit_status_change(&reservation("confirmé"), &ReservationStatus::Confirmed);
        assert!(again.is_none());
        assert_eq!(store.len(), 1);
    }
}
