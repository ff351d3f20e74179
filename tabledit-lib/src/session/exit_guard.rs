//! Confirm-on-quit hook.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

/// Tells the host whether leaving the application must be confirmed.
///
/// The editor arms the guard while it holds unsaved edits and disarms it once
/// they are saved or discarded. Hosts keep a clone and consult it from their
/// quit handler.
///
/// # Example
///
/// ```
/// use tabledit_lib::session::ExitGuard;
///
/// let guard = ExitGuard::new();
/// let hook = guard.clone();
///
/// guard.set_armed(true);
/// assert!(hook.should_intercept());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExitGuard {
    armed: Arc<AtomicBool>,
}

impl ExitGuard {
    /// Creates a disarmed guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms or disarms the guard.
    pub fn set_armed(&self, armed: bool) {
        let was = self.armed.swap(armed, Ordering::SeqCst);
        if was != armed {
            log::debug!("exit guard {}", if armed { "armed" } else { "disarmed" });
        }
    }

    /// Returns `true` if a quit attempt must be confirmed by the user.
    pub fn should_intercept(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}
