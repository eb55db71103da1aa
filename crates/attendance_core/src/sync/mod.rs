//! Attendance sync pipeline.
//!
//! # Responsibility
//! - Define the proxy transport SPI and wire contracts.
//! - Normalize raw payloads and drive the sync lifecycle.
//!
//! # Invariants
//! - Transport is host-owned; core holds no network resources.
//! - Every failure maps to one `SyncError` variant.

pub mod api;
pub mod error;
pub mod normalizer;
pub mod orchestrator;
