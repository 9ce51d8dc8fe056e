//! # Chimeboard Common Library
//!
//! Shared code for the chimeboard crates including:
//! - Event types (BoardEvent enum) and the EventBus
//! - Error types
//! - Configuration file and sound root resolution
//! - Clock label formatting for timer and player displays

pub mod config;
pub mod error;
pub mod events;
pub mod human_time;

pub use error::{Error, Result};
