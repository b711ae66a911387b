//! Common types module for the racket repair service.
//!
//! This module defines the core data types shared by every crate in the
//! workspace: the repair order and its statuses, rider and vendor records,
//! HTTP request/response contracts, notifications and storage keys.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Notification messages addressed to workflow parties.
pub mod notification;
/// The repair order, its statuses and OTP slots.
pub mod order;
/// Rider and vendor records.
pub mod party;
/// Registry trait for pluggable backend implementations.
pub mod registry;
/// Storage types for managing persistent data.
pub mod storage;
/// Utility functions for display formatting.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

pub use api::*;
pub use notification::*;
pub use order::*;
pub use party::*;
pub use registry::ImplementationRegistry;
pub use storage::*;
pub use utils::truncate_id;
pub use validation::*;
