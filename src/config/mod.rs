//! Configuration module for crossfs
//!
//! Provides CLI arguments and the runtime configuration derived from them.

mod settings;

pub use settings::*;
