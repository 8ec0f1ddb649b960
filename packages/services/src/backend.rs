use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Which persistence backend a service is talking to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Remote,
    Local,
}

/// Explicit two-state machine behind the dual-backend policy.
///
/// Starts REMOTE; the single `demote` transition to LOCAL is irreversible
/// for the life of the process. Availability over consistency: once the
/// remote backend has failed, everything is served locally even if the
/// remote recovers.
#[derive(Debug, Default)]
pub struct BackendState {
    demoted: AtomicBool,
}

impl BackendState {
    pub fn new() -> Self {
        BackendState::default()
    }

    pub fn mode(&self) -> BackendMode {
        if self.demoted.load(Ordering::SeqCst) {
            BackendMode::Local
        } else {
            BackendMode::Remote
        }
    }

    pub fn is_remote(&self) -> bool {
        self.mode() == BackendMode::Remote
    }

    /// Takes the one-way transition to LOCAL. Logs only on the first call.
    pub fn demote(&self, cause: &dyn fmt::Display) {
        if !self.demoted.swap(true, Ordering::SeqCst) {
            warn!("Remote backend failed, falling back to local storage: {cause}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_remote() {
        let state = BackendState::new();
        assert_eq!(state.mode(), BackendMode::Remote);
        assert!(state.is_remote());
    }

    #[test]
    fn demotion_is_sticky() {
        let state = BackendState::new();
        state.demote(&"connection refused");
        assert_eq!(state.mode(), BackendMode::Local);

        // Repeated demotion does not change anything
        state.demote(&"still down");
        assert_eq!(state.mode(), BackendMode::Local);
        assert!(!state.is_remote());
    }
}
