//! Core copy engine module
//!
//! Provides the path mapping between filesystem instances, the tree copy
//! engine built on top of it, and host copies driven by the CLI config.

mod copier;
mod host;
mod mapper;

pub use copier::*;
pub use host::*;
pub use mapper::*;
