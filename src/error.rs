//! Error taxonomy for the vault.
//!
//! Authentication failures are deliberately coarse: a wrong password,
//! corrupted blob and tampered blob all surface the same way, so no
//! caller can branch on which one happened.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    /// Backing store failure (I/O, database).
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),

    /// Encryption has not been set up.
    #[error("encryption is not enabled")]
    NotEnabled,

    /// Setup was attempted while encryption is already configured.
    #[error("encryption is already enabled")]
    AlreadyEnabled,

    /// Encryption is enabled but no session password is cached.
    #[error("vault is locked")]
    Locked,

    /// The supplied master password failed verification.
    #[error("incorrect master password")]
    WrongPassword,

    /// New password rejected at the prompt boundary.
    #[error("password must be at least 8 characters")]
    PasswordTooShort,

    /// New password and its confirmation differ.
    #[error("passwords do not match")]
    ConfirmationMismatch,
}
