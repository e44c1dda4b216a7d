//! User-interaction seam.
//!
//! The coordinator never talks to a UI directly; destructive confirmations
//! and failure alerts go through this trait so the embedding layer (or a
//! test) decides how to present them.

pub trait Prompt: Send + Sync {
    /// Asks the user to confirm a destructive or surprising action.
    fn confirm(&self, message: &str) -> bool;

    /// Reports a failure the user must see.
    fn alert(&self, message: &str);
}

/// Confirms everything and routes alerts to the log. Suitable for headless
/// embedding where the caller surfaces errors through return values instead.
pub struct AutoConfirm;

impl Prompt for AutoConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }

    fn alert(&self, message: &str) {
        log::warn!("alert: {}", message);
    }
}
