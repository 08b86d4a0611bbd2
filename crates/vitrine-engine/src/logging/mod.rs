//! Logging utilities.
//!
//! Centralizes logger initialization. Library code uses the `log` facade only;
//! the hosting binary decides when (and whether) to install a backend.

mod init;

pub use init::{LoggingConfig, init_logging};
