//! UI collaborator seam — password dialogs and notifications.
//!
//! The vault never renders anything itself. The host application
//! implements [`PasswordPrompt`]; every prompt method may suspend
//! indefinitely while the user decides, and `None` means the dialog
//! was dismissed. The `error` argument carries the validation message
//! from a rejected previous attempt, so the host can re-show the
//! dialog with it.

use async_trait::async_trait;

/// A new master password chosen by the user, with its confirmation
/// field as typed. Validation happens on the vault side.
#[derive(Debug, Clone)]
pub struct ChosenPassword {
    pub password: String,
    pub confirm: String,
}

/// Fields of the change-password dialog.
#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub current: String,
    pub password: String,
    pub confirm: String,
}

#[async_trait]
pub trait PasswordPrompt: Send + Sync {
    /// Setup dialog: choose and confirm a master password.
    async fn choose_password(&self, error: Option<&str>) -> Option<ChosenPassword>;

    /// Unlock / verification dialog: enter the existing master password.
    async fn request_password(&self, error: Option<&str>) -> Option<String>;

    /// Change-password dialog: current password plus new pair.
    async fn change_password(&self, error: Option<&str>) -> Option<PasswordChange>;

    /// Success notification sink.
    fn notify_success(&self, message: &str);

    /// Error notification sink.
    fn notify_error(&self, message: &str);
}
