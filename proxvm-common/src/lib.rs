//! # proxvm Common
//!
//! Shared utilities for the proxvm tools.
//!
//! ## Logging
//!
//! ```rust
//! use proxvm_common::{init, LogFormat};
//!
//! init("info", LogFormat::Pretty).unwrap();
//! tracing::info!(vmid = 100, "Resolved VM");
//! ```

pub mod logging;

pub use logging::{init, init_logging, init_logging_json, LogFormat};
