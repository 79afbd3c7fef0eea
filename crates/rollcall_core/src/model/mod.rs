//! Domain model for roster, timetable and attendance facts.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep validation rules next to the types they protect.
//!
//! # Invariants
//! - Every persisted object is identified by a stable UUID.
//! - Attendance records are insert-only facts; they are never mutated.

pub mod period;
pub mod record;
pub mod student;
