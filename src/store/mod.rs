//! Credential storage — named secrets, plaintext or encrypted.
//!
//! The durable layer is a plain name → value table ([`SettingsStore`]);
//! the host may bring its own backend, or use the bundled
//! [`sqlite::SqliteStore`] / [`memory::MemoryStore`]. On top of it,
//! [`CredentialStore`] enforces the representation rules: while the
//! encryption flag is set, a secret lives under `<name>_encrypted` as a
//! base64 blob and a successful encrypted write deletes the plaintext
//! shadow. Migration is one-directional — disabling encryption never
//! auto-decrypts existing blobs.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::crypto;
use crate::error::VaultError;
use crate::session::Session;

/// Durable name → value table.
pub trait SettingsStore: Send + Sync {
    fn get(&self, name: &str) -> Result<Option<String>>;
    fn set(&self, name: &str, value: &str) -> Result<()>;
    fn remove(&self, name: &str) -> Result<()>;
}

/// Storage entry for the process-wide encryption flag ("true"/absent).
pub const ENCRYPTION_ENABLED: &str = "encryption_enabled";

/// Storage entry for the per-installation KDF salt, hex-encoded.
pub const ENCRYPTION_SALT: &str = "encryption_salt";

/// Storage entry for the password-verification canary blob.
pub const ENCRYPTION_CANARY: &str = "encryption_canary";

/// Known plaintext encrypted into the canary at setup time. Used only
/// to test whether a candidate password is correct.
pub(crate) const CANARY_PLAINTEXT: &str = "utm-vault-canary-v1";

/// Suffix for a secret's encrypted representation.
const ENCRYPTED_SUFFIX: &str = "_encrypted";

/// Every secret the vault protects. Rotation and reset walk this list.
pub const SECRET_NAMES: &[&str] = &[
    "bitly_api_token",
    "bitly_group_id",
    "notion_api_token",
    "notion_database_id",
];

fn encrypted_name(name: &str) -> String {
    format!("{name}{ENCRYPTED_SUFFIX}")
}

/// Representation-aware secret access over a [`SettingsStore`].
pub struct CredentialStore {
    store: Arc<dyn SettingsStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Whether the encryption flag has been set. Once set it stays set
    /// until a full reset.
    pub fn encryption_enabled(&self) -> Result<bool, VaultError> {
        Ok(self.store.get(ENCRYPTION_ENABLED)?.as_deref() == Some("true"))
    }

    /// Load a named secret in whichever representation is active.
    ///
    /// With encryption enabled this needs a cached session password;
    /// a locked session yields `None`, as does a blob that fails to
    /// decrypt.
    pub fn load(&self, name: &str, session: &Session) -> Result<Option<String>, VaultError> {
        if !self.encryption_enabled()? {
            return Ok(self.store.get(name)?);
        }
        let Some(password) = session.password() else {
            debug!(secret = name, "load skipped, vault is locked");
            return Ok(None);
        };
        let Some(blob) = self.store.get(&encrypted_name(name))? else {
            return Ok(None);
        };
        let salt = self.salt()?;
        Ok(crypto::decrypt(&blob, password, &salt))
    }

    /// Save a named secret. With encryption enabled the value is
    /// written as a blob and the plaintext shadow removed, so stale
    /// plaintext can never be read back in preference to the blob.
    pub fn save(&self, name: &str, value: &str, session: &Session) -> Result<(), VaultError> {
        if !self.encryption_enabled()? {
            self.store.set(name, value)?;
            debug!(secret = name, "secret saved (plaintext)");
            return Ok(());
        }
        let Some(password) = session.password() else {
            return Err(VaultError::Locked);
        };
        let salt = self.salt()?;
        let blob = crypto::encrypt(value, password, &salt);
        self.store.set(&encrypted_name(name), &blob)?;
        self.store.remove(name)?;
        debug!(secret = name, "secret saved (encrypted)");
        Ok(())
    }

    /// Remove both representations of one secret.
    pub fn clear_secret(&self, name: &str) -> Result<(), VaultError> {
        self.store.remove(name)?;
        self.store.remove(&encrypted_name(name))?;
        Ok(())
    }

    /// The KDF salt for this installation. Stores written before
    /// per-installation salts existed fall back to the fixed legacy
    /// salt so their blobs still decrypt.
    pub(crate) fn salt(&self) -> Result<Vec<u8>, VaultError> {
        Ok(self
            .stored_salt()?
            .unwrap_or_else(|| crypto::LEGACY_SALT.to_vec()))
    }

    /// The persisted per-installation salt, if one exists. `None` means
    /// the store still derives keys from the legacy fixed salt.
    pub(crate) fn stored_salt(&self) -> Result<Option<Vec<u8>>, VaultError> {
        let Some(stored) = self.store.get(ENCRYPTION_SALT)? else {
            return Ok(None);
        };
        match hex::decode(stored.trim()) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(_) => {
                warn!("stored KDF salt is not valid hex, falling back to legacy salt");
                Ok(None)
            }
        }
    }

    pub(crate) fn set_salt(&self, salt: &[u8]) -> Result<(), VaultError> {
        Ok(self.store.set(ENCRYPTION_SALT, &hex::encode(salt))?)
    }

    pub(crate) fn set_encryption_enabled(&self, enabled: bool) -> Result<(), VaultError> {
        if enabled {
            self.store.set(ENCRYPTION_ENABLED, "true")?;
        } else {
            self.store.remove(ENCRYPTION_ENABLED)?;
        }
        Ok(())
    }

    pub(crate) fn canary(&self) -> Result<Option<String>, VaultError> {
        Ok(self.store.get(ENCRYPTION_CANARY)?)
    }

    pub(crate) fn set_canary(&self, blob: &str) -> Result<(), VaultError> {
        Ok(self.store.set(ENCRYPTION_CANARY, blob)?)
    }

    pub(crate) fn encrypted_blob(&self, name: &str) -> Result<Option<String>, VaultError> {
        Ok(self.store.get(&encrypted_name(name))?)
    }

    pub(crate) fn set_encrypted_blob(&self, name: &str, blob: &str) -> Result<(), VaultError> {
        Ok(self.store.set(&encrypted_name(name), blob)?)
    }

    /// Raw plaintext entry, bypassing decryption. Used by tests and the
    /// representation-exclusivity checks.
    pub fn plaintext_entry(&self, name: &str) -> Result<Option<String>, VaultError> {
        Ok(self.store.get(name)?)
    }

    /// Drop the flag, salt and canary. Secrets are cleared separately.
    pub(crate) fn clear_encryption_state(&self) -> Result<(), VaultError> {
        self.store.remove(ENCRYPTION_ENABLED)?;
        self.store.remove(ENCRYPTION_SALT)?;
        self.store.remove(ENCRYPTION_CANARY)?;
        Ok(())
    }
}
