//! Timetable period model.
//!
//! # Responsibility
//! - Define the weekly time-slot shape attendance is recorded against.
//! - Parse and validate wall-clock `HH:MM` boundaries.
//!
//! # Invariants
//! - `start_minute < end_minute`, both within a single day (`0..1440`).
//! - A period covers the half-open interval `[start_minute, end_minute)`.
//! - `subject` is the stable label attendance records reference; it is not
//!   rewritten when a period is edited.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for a timetable period.
pub type PeriodId = Uuid;

/// Minutes in one calendar day; period boundaries must stay below this.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("valid HH:MM regex"));

/// Day of week, serialized and stored as its full English name
/// (`"Monday"` .. `"Sunday"`), the format the timetable store uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Full English day name, matching the stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }
}

impl Display for Weekday {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = PeriodValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Monday" => Ok(Self::Monday),
            "Tuesday" => Ok(Self::Tuesday),
            "Wednesday" => Ok(Self::Wednesday),
            "Thursday" => Ok(Self::Thursday),
            "Friday" => Ok(Self::Friday),
            "Saturday" => Ok(Self::Saturday),
            "Sunday" => Ok(Self::Sunday),
            other => Err(PeriodValidationError::BadDay(other.to_string())),
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

/// Validation failure for period construction or persistence input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodValidationError {
    /// Subject label is empty after trimming.
    EmptySubject,
    /// Day name is not one of the seven full English names.
    BadDay(String),
    /// Time-of-day string does not match `HH:MM`.
    BadTime(String),
    /// Minute value falls outside `0..1440`.
    MinuteOutOfRange(u16),
    /// Start does not precede end, leaving an empty interval.
    StartNotBeforeEnd { start: u16, end: u16 },
}

impl Display for PeriodValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySubject => write!(f, "period subject cannot be empty"),
            Self::BadDay(value) => write!(f, "unknown day name: `{value}`"),
            Self::BadTime(value) => write!(f, "time must be HH:MM, got `{value}`"),
            Self::MinuteOutOfRange(minute) => {
                write!(f, "minute-of-day {minute} is outside 0..{MINUTES_PER_DAY}")
            }
            Self::StartNotBeforeEnd { start, end } => write!(
                f,
                "period start {} must be before end {}",
                format_hhmm(*start),
                format_hhmm(*end)
            ),
        }
    }
}

impl Error for PeriodValidationError {}

/// Parses a wall-clock `HH:MM` string into minutes since midnight.
pub fn parse_hhmm(value: &str) -> Result<u16, PeriodValidationError> {
    let trimmed = value.trim();
    let captures = TIME_RE
        .captures(trimmed)
        .ok_or_else(|| PeriodValidationError::BadTime(trimmed.to_string()))?;

    let hours: u16 = captures[1]
        .parse()
        .map_err(|_| PeriodValidationError::BadTime(trimmed.to_string()))?;
    let minutes: u16 = captures[2]
        .parse()
        .map_err(|_| PeriodValidationError::BadTime(trimmed.to_string()))?;
    Ok(hours * 60 + minutes)
}

/// Formats minutes since midnight back to `HH:MM`.
pub fn format_hhmm(minute: u16) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Weekly time-slot attendance is recorded against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Stable row identity; not referenced by attendance records.
    pub id: PeriodId,
    /// Subject/course label; the key attendance records are scoped to.
    pub subject: String,
    pub day: Weekday,
    /// Start of the slot, minutes since midnight, inclusive.
    pub start_minute: u16,
    /// End of the slot, minutes since midnight, exclusive.
    pub end_minute: u16,
}

impl Period {
    /// Creates a period with a generated stable ID.
    pub fn new(subject: impl Into<String>, day: Weekday, start_minute: u16, end_minute: u16) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            day,
            start_minute,
            end_minute,
        }
    }

    /// Creates a validated period from `HH:MM` boundary strings.
    ///
    /// This is the constructor the timetable write path uses; it never
    /// produces a period that fails `validate()`.
    pub fn from_times(
        subject: impl Into<String>,
        day: Weekday,
        start: &str,
        end: &str,
    ) -> Result<Self, PeriodValidationError> {
        let period = Self::new(subject, day, parse_hhmm(start)?, parse_hhmm(end)?);
        period.validate()?;
        Ok(period)
    }

    /// Checks subject and interval invariants.
    pub fn validate(&self) -> Result<(), PeriodValidationError> {
        if self.subject.trim().is_empty() {
            return Err(PeriodValidationError::EmptySubject);
        }
        for minute in [self.start_minute, self.end_minute] {
            if minute >= MINUTES_PER_DAY {
                return Err(PeriodValidationError::MinuteOutOfRange(minute));
            }
        }
        if self.start_minute >= self.end_minute {
            return Err(PeriodValidationError::StartNotBeforeEnd {
                start: self.start_minute,
                end: self.end_minute,
            });
        }
        Ok(())
    }

    /// Half-open containment test: start inclusive, end exclusive.
    pub fn contains_minute(&self, minute: u16) -> bool {
        minute >= self.start_minute && minute < self.end_minute
    }

    /// True when both periods sit on the same day and their intervals
    /// intersect. Touching boundaries (`end == start`) do not overlap.
    pub fn overlaps(&self, other: &Period) -> bool {
        self.day == other.day
            && self.start_minute < other.end_minute
            && other.start_minute < self.end_minute
    }

    /// Start boundary rendered as `HH:MM`.
    pub fn start_time(&self) -> String {
        format_hhmm(self.start_minute)
    }

    /// End boundary rendered as `HH:MM`.
    pub fn end_time(&self) -> String {
        format_hhmm(self.end_minute)
    }
}
