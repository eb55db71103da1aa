//! Repository layer for the local session store.
//!
//! # Responsibility
//! - Define use-case oriented persistence contracts.
//! - Keep SQL details out of services.

pub mod credential_repo;
