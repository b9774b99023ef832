//! # zkscan - ZKTeco fingerprint scanner wrapper
//!
//! Drives the vendor SDK (`libzkfp` for the USB ZK9500, `zkemsdk` for
//! networked terminals) loaded at runtime, and reports every operation as
//! one JSON line. Provides:
//! - A bounded acquisition poller with a table-driven outcome protocol
//! - RAII device and SDK sessions (released on every exit path)
//! - C FFI for native addons
//!
//! ## Quick Start
//! ```no_run
//! use zkscan::{AcquisitionPoller, AttemptBudget, Config, ZkfpLibrary};
//! use zkscan::report::Report;
//!
//! let config = Config::from_env();
//! let sdk = ZkfpLibrary::load(&config.zkfp_library).unwrap();
//! let result = AcquisitionPoller::new(AttemptBudget::new(10)).acquire(&sdk, 0);
//! println!("{}", Report::from_acquisition(&result, false).to_line());
//! ```

pub mod error;
pub mod codes;
pub mod types;
pub mod encoding;
pub mod config;
pub mod sdk;
pub mod terminal;
pub mod device;
pub mod poller;
pub mod report;
pub mod commands;
pub mod ffi;

pub use error::ScannerError;
pub use types::*;
pub use config::Config;
pub use device::{Device, SdkSession};
pub use poller::{AcquisitionPoller, CancelToken, Canceller};
pub use sdk::{FingerprintSdk, ZkfpLibrary};
pub use terminal::{TerminalSdk, ZkemLibrary};

/// Result type alias for zkscan operations.
pub type Result<T> = std::result::Result<T, ScannerError>;

/// `error` field of a usage failure.
pub const USAGE: &str = "Usage: zkscan <test|capture [timeout_seconds]|version|serial|connect <host> <port>|disconnect>";
