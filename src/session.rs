//! Session-scoped master password.
//!
//! The password lives for one application session (one browser tab in
//! the original deployment) and never touches durable storage. The host
//! creates a [`Session`] at startup and threads it through every
//! credential operation; dropping it at session end is the implicit
//! lock. Clearing or dropping zeroizes the password.

use zeroize::Zeroizing;

#[derive(Default)]
pub struct Session {
    password: Option<Zeroizing<String>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached master password, if the vault is unlocked.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().map(|p| p.as_str())
    }

    /// Cache a password for the rest of the session.
    pub fn set_password(&mut self, password: String) {
        self.password = Some(Zeroizing::new(password));
    }

    /// Drop the cached password (explicit lock).
    pub fn clear(&mut self) {
        self.password = None;
    }

    pub fn is_unlocked(&self) -> bool {
        self.password.is_some()
    }
}
