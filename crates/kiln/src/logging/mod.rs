//! Logger setup.
//!
//! The crate logs through the `log` facade only; applications that already
//! install a logger can skip [`init_logging`] entirely.

mod init;

pub use init::{init_logging, LoggingConfig};
