//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and transport calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod session_service;
