use std::collections::HashMap;

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::debug;

const SERVICE_NAME: &str = "recipebook";

/// Read access to named client-side credentials (cookies, in browser terms).
pub trait CredentialStore {
    fn get(&self, name: &str) -> Option<String>;
}

impl<S: CredentialStore + ?Sized> CredentialStore for &S {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }
}

/// In-memory store, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Credentials kept in the OS keychain.
pub struct KeyringStore;

impl KeyringStore {
    /// Store a credential value in the OS keychain
    pub fn set(name: &str, value: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, name)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(value)
            .context("Failed to store credential in keychain")?;
        Ok(())
    }

    /// Delete a stored credential
    pub fn delete(name: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, name)
            .context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete credential from keychain")?;
        Ok(())
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, name: &str) -> Option<String> {
        let entry = match Entry::new(SERVICE_NAME, name) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(name, error = %e, "Keyring entry unavailable");
                return None;
            }
        };
        match entry.get_password() {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(name, error = %e, "No credential in keychain");
                None
            }
        }
    }
}
