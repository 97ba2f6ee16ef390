//! Driver lifecycle state machine
//!
//! Register (re)configuration only makes sense from a known state, so
//! every driver operation is gated on this two-state machine. Both
//! transitions report whether they actually ran: asking for the state
//! the driver is already in is a no-op and a failure, which is what
//! lets `start`/`stop` detect double invocation without touching a
//! single register.

/// Driver lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lifecycle {
    /// Peripheral disabled, buffers idle (initial state)
    #[default]
    Stopped,
    /// Peripheral configured, interrupts armed
    Running,
}

impl Lifecycle {
    pub fn is_running(self) -> bool {
        matches!(self, Lifecycle::Running)
    }

    /// Transition to `Running`. Returns `false` and stays put when
    /// already running.
    #[must_use]
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            false
        } else {
            *self = Lifecycle::Running;
            true
        }
    }

    /// Transition to `Stopped`. Returns `false` and stays put when
    /// already stopped.
    #[must_use]
    pub fn stop(&mut self) -> bool {
        if self.is_running() {
            *self = Lifecycle::Stopped;
            true
        } else {
            false
        }
    }
}
