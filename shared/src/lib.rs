//! Shared types for the booking platform
//!
//! Data models and utility types used by the server and its clients:
//! promotion/booking entities, payload types, and the reject-reason
//! taxonomy returned by promo-code validation.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
