//! Canonical attendance domain model.
//!
//! # Responsibility
//! - Define the in-memory shapes every analytics/state component reads.
//! - Keep upstream wire naming out of core types.
//!
//! # Invariants
//! - An `AttendanceRecord` is replaced wholesale on every successful sync.
//! - Daily logs join subjects by name, never by id.

pub mod credentials;
pub mod record;
