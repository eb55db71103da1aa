//! Flutter-facing bindings for `attendance_core`.

pub mod api;
