//! Deferred placement after a single-asset import
//!
//! Importing finishes inside a host transaction, but interactive placement
//! can only start once the host is idle again. [`DeferredPlacement`] records
//! the target, subscribes to the host's idle signal once, and on the next
//! idle callback hands the target to the host's placement flow.
//!
//! The machine has exactly two states. Whatever happens during the handoff,
//! it leaves [`DeferredPlacement::on_idle`] in [`PlacementState::Idle`] with
//! the idle listener removed.

use crate::host::HostError;
use tracing::{debug, warn};

/// Source of "host is idle" signals
///
/// Both methods must be idempotent.
pub trait IdleSource {
    fn subscribe(&mut self);
    fn unsubscribe(&mut self);
    fn is_subscribed(&self) -> bool;
}

/// Host side of an interactive placement
pub trait PlacementHost<T> {
    /// Hide the coordinating window so the user can pick a location
    ///
    /// # Errors
    ///
    /// Returns `HostError` if the window cannot be hidden.
    fn hide_window(&mut self) -> Result<(), HostError>;

    /// Start the host's native placement flow for `target`
    ///
    /// # Errors
    ///
    /// Returns `HostError` if the host refuses to place the target.
    fn request_placement(&mut self, target: &T) -> Result<(), HostError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementState<T> {
    Idle,
    Armed(T),
}

/// One-shot coordinator between import and placement
#[derive(Debug)]
pub struct DeferredPlacement<T, I: IdleSource> {
    state: PlacementState<T>,
    idle: I,
}

impl<T, I: IdleSource> DeferredPlacement<T, I> {
    #[must_use]
    pub const fn new(idle: I) -> Self {
        Self {
            state: PlacementState::Idle,
            idle,
        }
    }

    /// Arm the coordinator with a placement target
    ///
    /// Ignored while already armed. Returns whether the target was accepted.
    pub fn start(&mut self, target: T) -> bool {
        if self.is_armed() {
            debug!("placement already pending, ignoring new target");
            return false;
        }
        self.state = PlacementState::Armed(target);
        self.idle.subscribe();
        true
    }

    /// Handle one idle signal
    ///
    /// Returns `true` if the target was handed to the host successfully.
    pub fn on_idle<H: PlacementHost<T>>(&mut self, host: &mut H) -> bool {
        self.idle.unsubscribe();
        let state = std::mem::replace(&mut self.state, PlacementState::Idle);
        let PlacementState::Armed(target) = state else {
            return false;
        };

        if let Err(e) = host.hide_window() {
            warn!(error = %e, "could not hide window before placement");
            return false;
        }
        match host.request_placement(&target) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "placement handoff failed");
                false
            }
        }
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        matches!(self.state, PlacementState::Armed(_))
    }

    #[must_use]
    pub const fn state(&self) -> &PlacementState<T> {
        &self.state
    }

    #[must_use]
    pub const fn idle_source(&self) -> &I {
        &self.idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingIdle {
        subscribed: bool,
        subscribe_calls: usize,
    }

    impl IdleSource for CountingIdle {
        fn subscribe(&mut self) {
            self.subscribed = true;
            self.subscribe_calls += 1;
        }
        fn unsubscribe(&mut self) {
            self.subscribed = false;
        }
        fn is_subscribed(&self) -> bool {
            self.subscribed
        }
    }

    #[derive(Default)]
    struct FakeHost {
        fail_hide: bool,
        fail_place: bool,
        placed: Vec<String>,
    }

    impl PlacementHost<String> for FakeHost {
        fn hide_window(&mut self) -> Result<(), HostError> {
            if self.fail_hide {
                return Err(HostError::Rejected("window".into()));
            }
            Ok(())
        }
        fn request_placement(&mut self, target: &String) -> Result<(), HostError> {
            if self.fail_place {
                return Err(HostError::Rejected("cancelled by user".into()));
            }
            self.placed.push(target.clone());
            Ok(())
        }
    }

    #[test]
    fn test_start_arms_and_subscribes() {
        let mut placement = DeferredPlacement::new(CountingIdle::default());
        assert!(placement.start("Door 600".to_string()));
        assert!(placement.is_armed());
        assert!(placement.idle_source().is_subscribed());
    }

    #[test]
    fn test_start_ignored_while_armed() {
        let mut placement = DeferredPlacement::new(CountingIdle::default());
        placement.start("first".to_string());
        assert!(!placement.start("second".to_string()));
        assert_eq!(placement.state(), &PlacementState::Armed("first".to_string()));
        assert_eq!(placement.idle_source().subscribe_calls, 1);
    }

    #[test]
    fn test_idle_hands_off_once() {
        let mut placement = DeferredPlacement::new(CountingIdle::default());
        let mut host = FakeHost::default();
        placement.start("Door 600".to_string());

        assert!(placement.on_idle(&mut host));
        assert!(!placement.on_idle(&mut host));
        assert_eq!(host.placed, vec!["Door 600"]);
        assert_eq!(placement.state(), &PlacementState::Idle);
        assert!(!placement.idle_source().is_subscribed());
    }

    #[test]
    fn test_failed_handoff_resets_state() {
        let mut placement = DeferredPlacement::new(CountingIdle::default());
        let mut host = FakeHost {
            fail_place: true,
            ..FakeHost::default()
        };
        placement.start("x".to_string());

        assert!(!placement.on_idle(&mut host));
        assert!(!placement.is_armed());
        assert!(!placement.idle_source().is_subscribed());

        assert!(placement.start("y".to_string()));
    }

    #[test]
    fn test_hide_failure_skips_placement() {
        let mut placement = DeferredPlacement::new(CountingIdle::default());
        let mut host = FakeHost {
            fail_hide: true,
            ..FakeHost::default()
        };
        placement.start("x".to_string());

        assert!(!placement.on_idle(&mut host));
        assert!(host.placed.is_empty());
        assert!(!placement.is_armed());
    }
}
