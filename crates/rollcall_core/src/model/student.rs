//! Roster student model.
//!
//! # Responsibility
//! - Define the enrolled-student shape the recorder validates against.
//! - Normalize institutional student numbers (USN) to one canonical form.
//!
//! # Invariants
//! - `usn` is unique across the roster and never reused.
//! - `usn` is stored uppercased; lookups normalize input the same way.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a roster entry.
pub type StudentId = Uuid;

static USN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9_-]+$").expect("valid USN regex"));

/// Validation failure for roster input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentValidationError {
    /// USN is empty after trimming.
    EmptyUsn,
    /// USN contains characters outside `A-Z 0-9 _ -` after normalization.
    InvalidUsn(String),
    /// Display name is empty after trimming.
    EmptyName,
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUsn => write!(f, "student USN cannot be empty"),
            Self::InvalidUsn(value) => write!(f, "invalid student USN: `{value}`"),
            Self::EmptyName => write!(f, "student name cannot be empty"),
        }
    }
}

impl Error for StudentValidationError {}

/// Canonical USN form: trimmed and uppercased.
pub fn normalize_usn(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Enrolled student as seen by the attendance core.
///
/// The roster is owned by an external collaborator; the recorder only reads
/// it to confirm a recognized identity exists before writing attendance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Stable row identity.
    pub id: StudentId,
    /// Institutional student number, the key recognition events carry.
    pub usn: String,
    /// Display name.
    pub name: String,
    /// Course/cohort label from enrollment.
    pub course: String,
}

impl Student {
    /// Creates a student with a generated stable ID and normalized USN.
    pub fn new(
        usn: impl AsRef<str>,
        name: impl Into<String>,
        course: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            usn: normalize_usn(usn.as_ref()),
            name: name.into(),
            course: course.into(),
        }
    }

    /// Checks USN shape and name presence.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if self.usn.is_empty() {
            return Err(StudentValidationError::EmptyUsn);
        }
        if !USN_RE.is_match(&self.usn) {
            return Err(StudentValidationError::InvalidUsn(self.usn.clone()));
        }
        if self.name.trim().is_empty() {
            return Err(StudentValidationError::EmptyName);
        }
        Ok(())
    }
}
