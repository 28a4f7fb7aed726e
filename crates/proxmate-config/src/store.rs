// Credential stores.
//
// `KeyringStore` keeps one JSON entry per profile in the OS keyring;
// `MemoryStore` is process-local and backs tests and one-off sessions.

use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use proxmate_api::{CredentialStore, Credentials, StoreError};

const SERVICE: &str = "proxmate";

#[derive(Serialize, Deserialize)]
struct StoredCredentials {
    username: String,
    password: String,
    realm: String,
}

impl From<&Credentials> for StoredCredentials {
    fn from(creds: &Credentials) -> Self {
        Self {
            username: creds.username.clone(),
            password: creds.password.expose_secret().to_owned(),
            realm: creds.realm.clone(),
        }
    }
}

impl From<StoredCredentials> for Credentials {
    fn from(stored: StoredCredentials) -> Self {
        Self {
            username: stored.username,
            password: SecretString::from(stored.password),
            realm: stored.realm,
        }
    }
}

// ── KeyringStore ────────────────────────────────────────────────────

/// OS keyring entry `proxmate` / `{profile}/credentials`.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    profile: String,
}

impl KeyringStore {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, keyring::Error> {
        keyring::Entry::new(SERVICE, &format!("{}/credentials", self.profile))
    }
}

impl CredentialStore for KeyringStore {
    fn load(&self) -> Result<Option<Credentials>, StoreError> {
        match self.entry()?.get_password() {
            Ok(payload) => {
                let stored: StoredCredentials = serde_json::from_str(&payload)?;
                Ok(Some(stored.into()))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&StoredCredentials::from(credentials))?;
        self.entry()?.set_password(&payload)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ── MemoryStore ─────────────────────────────────────────────────────

/// In-memory store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Credentials>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(credentials: Credentials) -> Self {
        Self {
            slot: Mutex::new(Some(credentials)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Credentials>>, StoreError> {
        self.slot
            .lock()
            .map_err(|_| "credential store lock poisoned".into())
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<Option<Credentials>, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        *self.lock()? = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.lock()? = None;
        Ok(())
    }
}
