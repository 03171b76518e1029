//! Appointment lifecycle states and the transitions between them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of an appointment.
///
/// `Pending` is the only initial state. `Rejected`, `Completed` and
/// `Deleted` are terminal, so nothing ever returns to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked, awaiting review; holds its slot.
    Pending,
    /// Accepted by the clinic; holds its slot.
    Confirmed,
    /// Declined by the clinic.
    Rejected,
    /// The visit took place.
    Completed,
    /// Removed from the calendar; kept for history.
    Deleted,
}

/// Administrative action that drives a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentAction {
    /// Accept a pending booking.
    Confirm,
    /// Decline a pending booking.
    Reject,
    /// Close a confirmed appointment.
    Complete,
    /// Soft-delete a confirmed appointment.
    Delete,
}

/// Error returned when parsing a status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseAppointmentStatusError;

/// An action that is not permitted from the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    /// Status the action was attempted from.
    pub from: AppointmentStatus,
    /// Rejected action.
    pub action: AppointmentAction,
}

impl AppointmentStatus {
    /// Statuses that hold a slot.
    pub const ACTIVE: [AppointmentStatus; 2] = [Self::Pending, Self::Confirmed];

    /// Statuses shown on the admin calendar.
    pub const SCHEDULED: [AppointmentStatus; 2] = [Self::Confirmed, Self::Completed];

    /// Wire and storage label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Deleted => "deleted",
        }
    }

    /// Whether an appointment in this state blocks its slot.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Whether no further transition is possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Deleted)
    }

    /// Apply `action`, returning the resulting state.
    ///
    /// # Examples
    /// ```
    /// use clinic_backend::domain::{AppointmentAction, AppointmentStatus};
    ///
    /// let next = AppointmentStatus::Pending.transition(AppointmentAction::Confirm);
    /// assert_eq!(next, Ok(AppointmentStatus::Confirmed));
    /// assert!(AppointmentStatus::Rejected
    ///     .transition(AppointmentAction::Confirm)
    ///     .is_err());
    /// ```
    pub fn transition(self, action: AppointmentAction) -> Result<Self, InvalidTransition> {
        use AppointmentAction as A;
        match (self, action) {
            (Self::Pending, A::Confirm) => Ok(Self::Confirmed),
            (Self::Pending, A::Reject) => Ok(Self::Rejected),
            (Self::Confirmed, A::Complete) => Ok(Self::Completed),
            (Self::Confirmed, A::Delete) => Ok(Self::Deleted),
            (from, action) => Err(InvalidTransition { from, action }),
        }
    }
}

impl AppointmentAction {
    /// Label used in logs and error details.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Reject => "reject",
            Self::Complete => "complete",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AppointmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ParseAppointmentStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid appointment status")
    }
}

impl std::error::Error for ParseAppointmentStatusError {}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot {} an appointment that is {}", self.action, self.from)
    }
}

impl std::error::Error for InvalidTransition {}

impl FromStr for AppointmentStatus {
    type Err = ParseAppointmentStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            "deleted" => Ok(Self::Deleted),
            _ => Err(ParseAppointmentStatusError),
        }
    }
}
