use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Reservation;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    StatusChange,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::StatusChange => "status_change",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub reservation_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation: Option<Reservation>,
}

/// What a caller hands to the store; id, read flag and timestamp are the
/// store's to assign.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub reservation_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub reservation: Option<Reservation>,
}

/// Two notifications with equal keys are the same notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey<'a> {
    pub reservation_id: &'a str,
    pub title: &'a str,
    pub kind: NotificationKind,
}

/// Display tone of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTone {
    Confirmation,
    Status,
}

impl Notification {
    pub fn dedup_key(&self) -> DedupKey<'_> {
        DedupKey {
            reservation_id: &self.reservation_id,
            title: &self.title,
            kind: self.kind,
        }
    }

    pub fn tone(&self) -> NotificationTone {
        match self.kind {
            NotificationKind::StatusChange => {
                let title = self.title.to_lowercase();
                if title.contains("confirmé") || title.contains("confirme") {
                    NotificationTone::Confirmation
                } else {
                    NotificationTone::Status
                }
            }
        }
    }
}

impl NewNotification {
    pub fn dedup_key(&self) -> DedupKey<'_> {
        DedupKey {
            reservation_id: &self.reservation_id,
            title: &self.title,
            kind: self.kind,
        }
    }
}
