use anyhow::Result;

use crate::storage::SharedStorage;

pub const TOKEN_KEY: &str = "token";

/// Bearer token presence. Nothing here validates the token; the backend
/// decides, and a rejected token is simply dropped.
#[derive(Clone)]
pub struct AuthToken {
    storage: SharedStorage,
}

impl AuthToken {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    pub fn get(&self) -> Result<Option<String>> {
        Ok(self
            .storage
            .get(TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty()))
    }

    pub fn set(&self, token: &str) -> Result<()> {
        self.storage.set(TOKEN_KEY, token.trim())
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.remove(TOKEN_KEY)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn blank_token_counts_as_absent() {
        let token = AuthToken::new(Arc::new(MemoryStorage::new()));
        assert_eq!(token.get().unwrap(), None);

        token.set("  ").unwrap();
        assert_eq!(token.get().unwrap(), None);

        token.set(" abc ").unwrap();
        assert_eq!(token.get().unwrap().as_deref(), Some("abc"));

        token.clear().unwrap();
        assert_eq!(token.get().unwrap(), None);
    }
}
