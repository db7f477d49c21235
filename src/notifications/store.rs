use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use tokio::sync::watch;

use crate::models::{NewNotification, Notification};
use crate::storage::SharedStorage;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

pub const NOTIFICATIONS_KEY: &str = "believe_notifications";

const RANDOM_ID_LEN: usize = 7;
const RESERVATION_FRAGMENT_LEN: usize = 8;

/// Ordered (most recent first) list of notifications, mirrored to a single
/// storage record. Every mutation rewrites the whole record and only then
/// publishes the new list to subscribers.
pub struct NotificationStore {
    storage: SharedStorage,
    data: RwLock<Vec<Notification>>,
    publisher: watch::Sender<Vec<Notification>>,
}

impl NotificationStore {
    /// Builds the store and loads whatever is persisted.
    pub fn new(storage: SharedStorage) -> Self {
        let (publisher, _) = watch::channel(Vec::new());
        let store = Self {
            storage,
            data: RwLock::new(Vec::new()),
            publisher,
        };
        store.load();
        store
    }

    /// Replaces in-memory state with the persisted record. Missing, empty or
    /// unreadable records all load as an empty list.
    pub fn load(&self) {
        let loaded = match self.read_persisted() {
            Ok(list) => list,
            Err(err) => {
                log_warn!("Discarding stored notifications: {err:#}");
                Vec::new()
            }
        };

        let mut guard = self.write_guard();
        *guard = loaded;
        self.publisher.send_replace(guard.clone());
    }

    /// Inserts `candidate` unless a notification with the same reservation,
    /// title and kind already exists. Returns the stored entry, or `None` for
    /// a duplicate.
    pub fn add(&self, candidate: NewNotification) -> Option<Notification> {
        let mut guard = self.write_guard();

        if guard
            .iter()
            .any(|existing| existing.dedup_key() == candidate.dedup_key())
        {
            return None;
        }

        let mut id = generate_id(&candidate.reservation_id);
        while guard.iter().any(|existing| existing.id == id) {
            id = generate_id(&candidate.reservation_id);
        }

        let notification = Notification {
            id,
            reservation_id: candidate.reservation_id,
            kind: candidate.kind,
            title: candidate.title,
            message: candidate.message,
            read: false,
            created_at: Utc::now(),
            reservation: candidate.reservation,
        };

        let mut updated = Vec::with_capacity(guard.len() + 1);
        updated.push(notification.clone());
        updated.extend(guard.iter().cloned());

        self.commit(&mut guard, updated);
        log_info!(
            "Stored notification {} for reservation {}",
            notification.id,
            notification.reservation_id
        );
        Some(notification)
    }

    pub fn mark_read(&self, id: &str) {
        self.mutate(|list| {
            for notification in list.iter_mut().filter(|n| n.id == id) {
                notification.read = true;
            }
        });
    }

    pub fn mark_all_read(&self) {
        self.mutate(|list| {
            for notification in list.iter_mut() {
                notification.read = true;
            }
        });
    }

    pub fn remove(&self, id: &str) {
        self.mutate(|list| list.retain(|n| n.id != id));
    }

    /// Empties the list and deletes the persisted record.
    pub fn clear(&self) {
        let mut guard = self.write_guard();
        if let Err(err) = self.storage.remove(NOTIFICATIONS_KEY) {
            log_error!("Failed to delete stored notifications: {err:#}");
        }
        guard.clear();
        self.publisher.send_replace(Vec::new());
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.read_guard().clone()
    }

    pub fn get(&self, id: &str) -> Option<Notification> {
        self.read_guard().iter().find(|n| n.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_guard().is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.read_guard().iter().filter(|n| !n.read).count()
    }

    /// Receives the full list after each mutation.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.publisher.subscribe()
    }

    fn mutate<F>(&self, apply: F)
    where
        F: FnOnce(&mut Vec<Notification>),
    {
        let mut guard = self.write_guard();
        let mut updated = guard.clone();
        apply(&mut updated);
        self.commit(&mut guard, updated);
    }

    /// Persist, then publish. A failed write is logged and the in-memory list
    /// still advances.
    fn commit(
        &self,
        guard: &mut RwLockWriteGuard<'_, Vec<Notification>>,
        updated: Vec<Notification>,
    ) {
        if let Err(err) = self.persist(&updated) {
            log_error!("Failed to save notifications: {err:#}");
        }
        self.publisher.send_replace(updated.clone());
        **guard = updated;
    }

    fn persist(&self, list: &[Notification]) -> Result<()> {
        let serialized =
            serde_json::to_string(list).context("failed to serialize notifications")?;
        self.storage.set(NOTIFICATIONS_KEY, &serialized)
    }

    fn read_persisted(&self) -> Result<Vec<Notification>> {
        let Some(raw) = self.storage.get(NOTIFICATIONS_KEY)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).context("stored notifications are not valid JSON")
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, Vec<Notification>> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Vec<Notification>> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// `<unix millis>-<7 random chars>-<reservation id prefix>`.
fn generate_id(reservation_id: &str) -> String {
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_ID_LEN)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();

    let fragment: String = reservation_id.chars().take(RESERVATION_FRAGMENT_LEN).collect();
    let fragment = if fragment.is_empty() { "new".to_string() } else { fragment };

    format!("{}-{}-{}", Utc::now().timestamp_millis(), random, fragment)
}
