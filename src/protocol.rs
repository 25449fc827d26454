//! Unlock protocol — the disabled/locked/unlocked state machine.
//!
//! Nothing prompts at startup. The first operation that actually needs
//! a secret drives [`Vault::verify`], which probes a candidate password
//! against the verification canary written at setup time. Setup leaves
//! the session unlocked immediately; locking is implicit when the
//! session ends. The only way back to `Disabled` is a full reset.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::crypto;
use crate::error::VaultError;
use crate::prompt::PasswordPrompt;
use crate::session::Session;
use crate::store::{CredentialStore, SettingsStore, CANARY_PLAINTEXT, SECRET_NAMES};

/// Minimum master password length, enforced at the prompt boundary.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Where the vault currently sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultState {
    /// Encryption has never been set up.
    Disabled,
    /// Flag set, no session password cached.
    Locked,
    /// Flag set and a session password is cached.
    Unlocked,
}

/// The credential-protection subsystem: representation-aware storage
/// plus the unlock and rotation protocols on top of it.
pub struct Vault {
    credentials: CredentialStore,
}

impl Vault {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            credentials: CredentialStore::new(store),
        }
    }

    /// Direct access to representation-aware secret load/save.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn state(&self, session: &Session) -> Result<VaultState, VaultError> {
        if !self.credentials.encryption_enabled()? {
            return Ok(VaultState::Disabled);
        }
        Ok(if session.is_unlocked() {
            VaultState::Unlocked
        } else {
            VaultState::Locked
        })
    }

    /// First-time setup: choose a master password, enable encryption
    /// and leave the session unlocked — no separate unlock step right
    /// after setup. Returns `false` if the user dismissed the dialog,
    /// with no state changed.
    pub async fn setup(
        &self,
        session: &mut Session,
        prompt: &dyn PasswordPrompt,
    ) -> Result<bool, VaultError> {
        if self.credentials.encryption_enabled()? {
            return Err(VaultError::AlreadyEnabled);
        }

        let mut error: Option<String> = None;
        let password = loop {
            let Some(chosen) = prompt.choose_password(error.as_deref()).await else {
                return Ok(false);
            };
            match validate_new_password(&chosen.password, &chosen.confirm) {
                Ok(()) => break chosen.password,
                Err(e) => error = Some(e.to_string()),
            }
        };

        // Salt and canary land before the flag, so a crash in between
        // cannot leave the flag set without its key-derivation state.
        let salt = crypto::generate_salt();
        self.credentials.set_salt(&salt)?;
        self.credentials
            .set_canary(&crypto::encrypt(CANARY_PLAINTEXT, &password, &salt))?;
        self.credentials.set_encryption_enabled(true)?;
        session.set_password(password);

        info!("🔐 Encryption enabled, master password cached for this session");
        prompt.notify_success("Encryption enabled! Your tokens will be protected.");
        Ok(true)
    }

    /// Opportunistic unlock: cache the entered password without
    /// probing. Verification is deferred to the first operation that
    /// actually decrypts something. Returns `false` on cancel.
    pub async fn unlock(
        &self,
        session: &mut Session,
        prompt: &dyn PasswordPrompt,
    ) -> Result<bool, VaultError> {
        if !self.credentials.encryption_enabled()? {
            return Err(VaultError::NotEnabled);
        }

        let mut error: Option<String> = None;
        loop {
            let Some(entered) = prompt.request_password(error.as_deref()).await else {
                return Ok(false);
            };
            let entered = entered.trim().to_string();
            if entered.is_empty() {
                error = Some("Please enter your password".into());
                continue;
            }
            session.set_password(entered);
            prompt.notify_success(
                "Password saved! It will be verified when you use encrypted features.",
            );
            return Ok(true);
        }
    }

    /// Verify the session password, prompting as needed. A wrong
    /// password re-prompts until the user cancels; `true` means a
    /// password that decrypts the canary is now cached.
    pub async fn verify(
        &self,
        session: &mut Session,
        prompt: &dyn PasswordPrompt,
    ) -> Result<bool, VaultError> {
        if !self.credentials.encryption_enabled()? {
            return Err(VaultError::NotEnabled);
        }

        // A cached password may have come from the opportunistic unlock
        // path; probe it before bothering the user.
        let cached_ok = match session.password() {
            Some(password) => Some(self.probe(password)?),
            None => None,
        };
        match cached_ok {
            Some(true) => return Ok(true),
            Some(false) => {
                warn!("cached session password failed verification");
                session.clear();
            }
            None => {}
        }

        let mut error: Option<String> = None;
        loop {
            let Some(entered) = prompt.request_password(error.as_deref()).await else {
                return Ok(false);
            };
            let entered = entered.trim().to_string();
            if entered.is_empty() {
                error = Some("Please enter your password".into());
                continue;
            }
            if self.probe(&entered)? {
                session.set_password(entered);
                return Ok(true);
            }
            error = Some("Incorrect password. Please try again.".into());
        }
    }

    /// Load a secret, driving the unlock protocol first if the vault is
    /// locked. `None` when the secret is absent or the user cancelled.
    pub async fn secret(
        &self,
        session: &mut Session,
        prompt: &dyn PasswordPrompt,
        name: &str,
    ) -> Result<Option<String>, VaultError> {
        if self.credentials.encryption_enabled()? && !self.verify(session, prompt).await? {
            return Ok(None);
        }
        self.credentials.load(name, session)
    }

    /// Full credential reset: clears the flag, the salt, the canary and
    /// every stored secret in both representations. The state machine
    /// is back at `Disabled`, as a fresh start.
    pub fn reset(&self, session: &mut Session) -> Result<(), VaultError> {
        for name in SECRET_NAMES {
            self.credentials.clear_secret(name)?;
        }
        self.credentials.clear_encryption_state()?;
        session.clear();
        info!("Credential store reset, encryption disabled");
        Ok(())
    }

    /// Probe a candidate password against the canary. Stores written
    /// before the canary existed fall back to probing any present
    /// encrypted secret; with nothing to probe at all, verification is
    /// vacuously true.
    pub(crate) fn probe(&self, password: &str) -> Result<bool, VaultError> {
        let salt = self.credentials.salt()?;
        if let Some(canary) = self.credentials.canary()? {
            return Ok(
                crypto::decrypt(&canary, password, &salt).as_deref() == Some(CANARY_PLAINTEXT)
            );
        }
        for name in SECRET_NAMES {
            if let Some(blob) = self.credentials.encrypted_blob(name)? {
                return Ok(crypto::decrypt(&blob, password, &salt).is_some());
            }
        }
        Ok(true)
    }
}

/// Prompt-boundary validation for a newly chosen password.
pub(crate) fn validate_new_password(password: &str, confirm: &str) -> Result<(), VaultError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(VaultError::PasswordTooShort);
    }
    if password != confirm {
        return Err(VaultError::ConfirmationMismatch);
    }
    Ok(())
}
