//! Personal leveling tracker.
//!
//! Logged activities and free-text reports become experience, stat points,
//! level-ups and rank transitions, kept in a single JSON save file.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod ui;

pub use engine::session::Session;
pub use error::{Blocked, OracleError, Result, SystemError};
