//! Transaction send state machine.
//!
//! ```text
//! Constructing -> Submitted -> WaitingConfirmed -> Confirmed | Failed
//!                          \-> WaitingTimedOut  -> Confirmed | Failed
//! ```
//!
//! Both `Constructing` and `Submitted` may also fail directly (empty call list,
//! rejected submission).

use std::fmt;

/// Where a single transaction is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SendState {
    /// Calls are being assembled and fees estimated.
    #[default]
    Constructing,
    /// The ledger accepted the transaction.
    Submitted,
    /// Waiting for the receipt within the confirmation timeout.
    WaitingConfirmed,
    /// The timeout elapsed. The caller got a pending result and the wait continues detached.
    WaitingTimedOut,
    /// Execution succeeded.
    Confirmed,
    /// Submission, the receipt wait or execution failed.
    Failed,
}

impl SendState {
    /// Returns `true` if `next` is a legal successor of `self`.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Constructing, Self::Submitted | Self::Failed)
                | (Self::Submitted, Self::WaitingConfirmed | Self::WaitingTimedOut | Self::Failed)
                | (Self::WaitingConfirmed, Self::WaitingTimedOut | Self::Confirmed | Self::Failed)
                | (Self::WaitingTimedOut, Self::Confirmed | Self::Failed)
        )
    }

    /// Moves to `next`, returning `false` and staying put if the move is illegal.
    pub fn advance(&mut self, next: Self) -> bool {
        if self.can_transition_to(next) {
            tracing::trace!(from = %self, to = %next, "send state transition");
            *self = next;
            true
        } else {
            false
        }
    }

    /// Returns `true` for `Confirmed` and `Failed`.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }

    /// Returns the state name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Constructing => "constructing",
            Self::Submitted => "submitted",
            Self::WaitingConfirmed => "waiting_confirmed",
            Self::WaitingTimedOut => "waiting_timed_out",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
