//! utm-vault — encrypted credential storage for the UTM link manager.
//!
//! Campaign-tool API credentials (link-shortener tokens, workspace
//! identifiers) are encrypted at rest under a user-chosen master
//! password.
//!
//! Security:
//! - AES-256-GCM blobs, fresh nonce per write, base64 in storage
//! - PBKDF2-HMAC-SHA256 key derivation, 100k iterations
//! - Random per-installation salt (legacy fixed-salt stores still read)
//! - Master password cached per session only, zeroized on drop
//! - Lazy unlock: the first operation that needs a secret prompts
//! - Decrypt failures are indistinguishable from corruption to callers
//! - Password rotation stages all re-encryption before writing
//!
//! Dialogs and persistence are collaborator seams: the host implements
//! [`PasswordPrompt`] for its UI and may swap the bundled SQLite
//! backend for its own [`SettingsStore`].

pub mod crypto;
pub mod error;
pub mod prompt;
pub mod protocol;
pub mod rotation;
pub mod session;
pub mod store;

pub use error::VaultError;
pub use prompt::{ChosenPassword, PasswordChange, PasswordPrompt};
pub use protocol::{Vault, VaultState, MIN_PASSWORD_LEN};
pub use rotation::RotationReport;
pub use session::Session;
pub use store::{CredentialStore, SettingsStore, SECRET_NAMES};
