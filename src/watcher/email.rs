use anyhow::Result;

use crate::storage::SharedStorage;

pub const EMAIL_KEY: &str = "reservation_email";

/// The email the customer last booked or looked up with. Its presence is what
/// decides whether the watcher starts Idle or Active.
#[derive(Clone)]
pub struct EmailMemory {
    storage: SharedStorage,
}

impl EmailMemory {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    pub fn recall(&self) -> Result<Option<String>> {
        Ok(self
            .storage
            .get(EMAIL_KEY)?
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty()))
    }

    /// Stores the trimmed email; blank input is ignored. Returns what was kept.
    pub fn remember(&self, email: &str) -> Result<Option<String>> {
        let email = email.trim();
        if email.is_empty() {
            return Ok(None);
        }
        self.storage.set(EMAIL_KEY, email)?;
        Ok(Some(email.to_string()))
    }

    pub fn forget(&self) -> Result<()> {
        self.storage.remove(EMAIL_KEY)
    }
}
