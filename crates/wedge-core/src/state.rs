//! Reader lifecycle states.
//!
//! # Valid Transitions
//!
//! - Idle → Running (start)
//! - Running → Stopping (stop requested)
//! - Stopping → Idle (I/O loop observably finished)
//!
//! # Examples
//!
//! ```
//! use wedge_core::RunState;
//!
//! assert!(RunState::Idle.can_transition_to(&RunState::Running));
//! assert!(!RunState::Running.can_transition_to(&RunState::Idle));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Lifecycle of a scan controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No I/O loop exists; the controller can be started.
    #[default]
    Idle,

    /// An I/O loop has been launched and owns the device.
    Running,

    /// Cancellation was requested and the I/O loop is winding down.
    Stopping,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            RunState::Idle => "Idle",
            RunState::Running => "Running",
            RunState::Stopping => "Stopping",
        };
        write!(f, "{}", state_str)
    }
}

impl RunState {
    /// Check if transition to target state is valid from this state.
    pub fn can_transition_to(&self, target: &RunState) -> bool {
        matches!(
            (self, target),
            (RunState::Idle, RunState::Running)
                | (RunState::Running, RunState::Stopping)
                | (RunState::Stopping, RunState::Idle)
        )
    }

    /// Validate a transition, returning the target state on success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] when the transition is not
    /// part of the lifecycle.
    pub fn transition_to(self, target: RunState) -> Result<RunState> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(Error::InvalidStateTransition {
                from: self,
                to: target,
            })
        }
    }

    /// True while an I/O loop exists (running or winding down).
    pub fn is_active(&self) -> bool {
        !matches!(self, RunState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RunState::Idle, RunState::Running, true)]
    #[case(RunState::Running, RunState::Stopping, true)]
    #[case(RunState::Stopping, RunState::Idle, true)]
    #[case(RunState::Idle, RunState::Stopping, false)]
    #[case(RunState::Running, RunState::Idle, false)]
    #[case(RunState::Running, RunState::Running, false)]
    #[case(RunState::Stopping, RunState::Running, false)]
    fn test_transitions(#[case] from: RunState, #[case] to: RunState, #[case] valid: bool) {
        assert_eq!(from.can_transition_to(&to), valid);
        assert_eq!(from.transition_to(to).is_ok(), valid);
    }

    #[test]
    fn test_invalid_transition_error_message() {
        let err = RunState::Running.transition_to(RunState::Running).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid state transition from Running to Running"
        );
    }

    #[test]
    fn test_default_is_idle() {
        assert_eq!(RunState::default(), RunState::Idle);
        assert!(!RunState::Idle.is_active());
        assert!(RunState::Running.is_active());
        assert!(RunState::Stopping.is_active());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&RunState::Stopping).unwrap();
        assert_eq!(json, "\"stopping\"");
        let back: RunState = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(back, RunState::Running);
    }
}
