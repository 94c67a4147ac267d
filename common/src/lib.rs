//! Shared building blocks for the netsweep workspace.
//!
//! Everything in here is free of scanning logic: the data model handed to
//! consumers, the capability traits the core dispatches through, the
//! explicit configuration value, and a few network helpers.

pub mod config;
pub mod error;
pub mod logging;
pub mod network;
pub mod scanning;
pub mod session;
pub mod utils;
pub mod vendors;

pub use tracing;
