//! # SIMS Common Library
//!
//! Shared code for SIMS portal modules including:
//! - Common error type
//! - Event types (ImportEvent enum) and EventBus
//! - Configuration loading

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
