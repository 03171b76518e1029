//! The fixed daily slot catalogue.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the twelve half-hour consultation slots offered each day.
///
/// Declaration order is chronological, so the derived `Ord` sorts slots by
/// time of day. Morning slots run 09:00 to 11:30 and afternoon slots 14:00 to
/// 16:30; there is no slot over lunch.
///
/// # Examples
/// ```
/// use clinic_backend::domain::TimeSlot;
///
/// let slot: TimeSlot = "10:00".parse().expect("catalogue label");
/// assert_eq!(slot, TimeSlot::T1000);
/// assert_eq!(slot.to_string(), "10:00");
/// assert!(TimeSlot::T1130 < TimeSlot::T1400);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeSlot {
    /// 09:00.
    T0900,
    /// 09:30.
    T0930,
    /// 10:00.
    T1000,
    /// 10:30.
    T1030,
    /// 11:00.
    T1100,
    /// 11:30.
    T1130,
    /// 14:00.
    T1400,
    /// 14:30.
    T1430,
    /// 15:00.
    T1500,
    /// 15:30.
    T1530,
    /// 16:00.
    T1600,
    /// 16:30.
    T1630,
}

/// Error returned when a label is not part of the slot catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTimeSlotError {
    value: String,
}

impl ParseTimeSlotError {
    /// The rejected input.
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

impl fmt::Display for ParseTimeSlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a bookable time slot", self.value)
    }
}

impl std::error::Error for ParseTimeSlotError {}

impl TimeSlot {
    /// Every slot in canonical order.
    pub const ALL: [TimeSlot; 12] = [
        Self::T0900,
        Self::T0930,
        Self::T1000,
        Self::T1030,
        Self::T1100,
        Self::T1130,
        Self::T1400,
        Self::T1430,
        Self::T1500,
        Self::T1530,
        Self::T1600,
        Self::T1630,
    ];

    /// `HH:MM` label used on the wire and in storage.
    pub const fn label(self) -> &'static str {
        match self {
            Self::T0900 => "09:00",
            Self::T0930 => "09:30",
            Self::T1000 => "10:00",
            Self::T1030 => "10:30",
            Self::T1100 => "11:00",
            Self::T1130 => "11:30",
            Self::T1400 => "14:00",
            Self::T1430 => "14:30",
            Self::T1500 => "15:00",
            Self::T1530 => "15:30",
            Self::T1600 => "16:00",
            Self::T1630 => "16:30",
        }
    }

    /// Start of the slot as minutes after midnight.
    pub const fn minutes_from_midnight(self) -> u32 {
        match self {
            Self::T0900 => 9 * 60,
            Self::T0930 => 9 * 60 + 30,
            Self::T1000 => 10 * 60,
            Self::T1030 => 10 * 60 + 30,
            Self::T1100 => 11 * 60,
            Self::T1130 => 11 * 60 + 30,
            Self::T1400 => 14 * 60,
            Self::T1430 => 14 * 60 + 30,
            Self::T1500 => 15 * 60,
            Self::T1530 => 15 * 60 + 30,
            Self::T1600 => 16 * 60,
            Self::T1630 => 16 * 60 + 30,
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeSlot {
    type Err = ParseTimeSlotError;

    /// Accepts `HH:MM`, and `HH:MM:00` as emitted by SQL `time` columns.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let label = match trimmed.len() {
            8 => trimmed.strip_suffix(":00").unwrap_or(trimmed),
            _ => trimmed,
        };
        Self::ALL
            .into_iter()
            .find(|slot| slot.label() == label)
            .ok_or_else(|| ParseTimeSlotError {
                value: value.to_owned(),
            })
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = ParseTimeSlotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(value: TimeSlot) -> Self {
        value.label().to_owned()
    }
}
