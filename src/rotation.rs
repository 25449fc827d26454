//! Password rotation — re-encrypt every stored secret under a new
//! master password.
//!
//! Rotation is staged: every blob is decrypted and re-encrypted in
//! memory before anything is written back, so an interrupted rotation
//! never leaves the store half under each password. A secret that does
//! not decrypt under the old password is left untouched — never
//! deleted — and counted in the report so the caller can tell a clean
//! rotation from a partial one.

use serde::Serialize;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::crypto;
use crate::error::VaultError;
use crate::prompt::PasswordPrompt;
use crate::protocol::{validate_new_password, Vault};
use crate::session::Session;
use crate::store::{CANARY_PLAINTEXT, SECRET_NAMES};

/// Outcome of a completed rotation.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RotationReport {
    /// Secrets re-encrypted under the new password.
    pub rotated: usize,
    /// Secrets left as-is because they did not decrypt under the old
    /// password.
    pub skipped: usize,
}

impl Vault {
    /// Change the master password, re-encrypting every stored secret.
    ///
    /// Fails with [`VaultError::WrongPassword`] before any mutation if
    /// `old` does not verify against the canary. Once verification
    /// passes, rotation runs to completion and the session password is
    /// updated to `new`.
    pub fn change_password(
        &self,
        session: &mut Session,
        old: &str,
        new: &str,
    ) -> Result<RotationReport, VaultError> {
        if !self.credentials().encryption_enabled()? {
            return Err(VaultError::NotEnabled);
        }
        validate_new_password(new, new)?;
        if !self.probe(old)? {
            return Err(VaultError::WrongPassword);
        }

        let old_salt = self.credentials().salt()?;
        // Legacy stores carry no persisted salt. Every surviving blob
        // is rewritten during rotation anyway, so this is the moment a
        // migrated store adopts a per-installation salt.
        let new_salt = match self.credentials().stored_salt()? {
            Some(stored) => stored,
            None => {
                info!("adopting a per-installation salt for this store");
                crypto::generate_salt().to_vec()
            }
        };

        // Stage: decrypt and re-encrypt in memory, write nothing yet.
        let mut staged: Vec<(&str, String)> = Vec::new();
        let mut report = RotationReport::default();
        for name in SECRET_NAMES {
            let Some(blob) = self.credentials().encrypted_blob(name)? else {
                continue;
            };
            match crypto::decrypt(&blob, old, &old_salt) {
                Some(plaintext) => {
                    let plaintext = Zeroizing::new(plaintext);
                    staged.push((*name, crypto::encrypt(&plaintext, new, &new_salt)));
                }
                None => {
                    warn!(
                        secret = name,
                        "secret does not decrypt under the old password, leaving it as-is"
                    );
                    report.skipped += 1;
                }
            }
        }

        // Commit: salt first so every later read derives the same keys
        // the staged blobs were written with, then the blobs, then the
        // canary.
        self.credentials().set_salt(&new_salt)?;
        for (name, blob) in &staged {
            self.credentials().set_encrypted_blob(name, blob)?;
            report.rotated += 1;
        }
        self.credentials()
            .set_canary(&crypto::encrypt(CANARY_PLAINTEXT, new, &new_salt))?;

        session.set_password(new.to_string());
        info!(
            rotated = report.rotated,
            skipped = report.skipped,
            "Master password changed"
        );
        Ok(report)
    }

    /// Interactive password change: prompt for current/new/confirm,
    /// validate at the prompt boundary and rotate. Cancellation before
    /// confirmation aborts cleanly; once rotation starts it runs to
    /// completion. Returns `false` on cancel or a wrong current
    /// password.
    pub async fn change_password_interactive(
        &self,
        session: &mut Session,
        prompt: &dyn PasswordPrompt,
    ) -> Result<bool, VaultError> {
        let mut error: Option<String> = None;
        let change = loop {
            let Some(change) = prompt.change_password(error.as_deref()).await else {
                return Ok(false);
            };
            if change.current.is_empty() || change.password.is_empty() || change.confirm.is_empty()
            {
                error = Some("All fields are required".into());
                continue;
            }
            match validate_new_password(&change.password, &change.confirm) {
                Ok(()) => break change,
                Err(e) => error = Some(e.to_string()),
            }
        };

        match self.change_password(session, &change.current, &change.password) {
            Ok(report) => {
                if report.skipped > 0 {
                    prompt.notify_error(&format!(
                        "Password changed, but {} secret(s) could not be re-encrypted",
                        report.skipped
                    ));
                } else {
                    prompt.notify_success("Master password changed successfully!");
                }
                Ok(true)
            }
            Err(VaultError::WrongPassword) => {
                prompt.notify_error("Current password is incorrect");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
