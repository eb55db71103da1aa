//! Pure attendance analytics.
//!
//! # Responsibility
//! - Map percentages to risk tiers.
//! - Project sessions needed or safely missable against a threshold.
//! - Assemble per-record insight views for callers.
//!
//! # Invariants
//! - Every function here is total over its documented domain and side-effect free.
//! - Classification reads the server percentage; projection reads
//!   `present / total`. The two are not reconciled.

pub mod insights;
pub mod projection;
pub mod risk;
