use crate::codes;
use crate::types::FailureKind;
use std::fmt;

/// Errors that can occur when driving the fingerprint SDK.
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("Failed to load SDK library: {0}")]
    Library(#[from] libloading::Error),

    #[error("SDK library not found (tried {0})")]
    LibraryNotFound(String),

    #[error("Failed to initialize SDK (code {0})")]
    Init(i32),

    #[error("No fingerprint devices found")]
    DeviceNotFound,

    #[error("Failed to open device {0}")]
    DeviceOpen(i32),

    #[error("Failed to get image dimensions (code {0})")]
    Dimensions(i32),

    #[error("Capture failed with code {0}")]
    Capture(i32),

    #[error("Capture cancelled after {0} attempt(s)")]
    Cancelled(u32),

    #[error("{0} not available in SDK library")]
    MissingFunction(&'static str),

    #[error("{op} failed with code {code}")]
    Terminal { op: &'static str, code: i32 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ScannerError {
    /// Failure category reported on the result channel.
    pub fn kind(&self) -> FailureKind {
        match self {
            ScannerError::Library(_) | ScannerError::LibraryNotFound(_) | ScannerError::Init(_) => {
                FailureKind::Initialization
            }
            ScannerError::DeviceNotFound => FailureKind::NoDevice,
            ScannerError::DeviceOpen(_) => FailureKind::DeviceOpen,
            ScannerError::Dimensions(_) => FailureKind::DimensionQuery,
            ScannerError::Capture(_) | ScannerError::Cancelled(_) => FailureKind::Capture,
            ScannerError::MissingFunction(_)
            | ScannerError::Terminal { .. }
            | ScannerError::InvalidArgument(_) => FailureKind::Terminal,
        }
    }

    /// Short label for the `error` field of a failure line.
    pub fn label(&self) -> String {
        match self {
            ScannerError::Terminal { op, .. } => format!("{} failed", op),
            ScannerError::MissingFunction(op) => format!("{} not available", op),
            ScannerError::InvalidArgument(_) => "Invalid argument".to_string(),
            other => other.kind().label().to_string(),
        }
    }

    /// Numeric SDK code preserved for the caller.
    pub fn code(&self) -> i32 {
        match self {
            ScannerError::Library(_) | ScannerError::LibraryNotFound(_) => codes::ERR_NOT_INIT,
            ScannerError::Init(code)
            | ScannerError::Dimensions(code)
            | ScannerError::Capture(code)
            | ScannerError::Terminal { code, .. } => *code,
            ScannerError::DeviceNotFound => codes::ERR_NO_DEVICE,
            ScannerError::DeviceOpen(_) => codes::ERR_OPEN,
            ScannerError::Cancelled(_) => codes::ERR_CANCEL,
            ScannerError::MissingFunction(_) => codes::ERR_NOT_INIT,
            ScannerError::InvalidArgument(_) => codes::ERR_INVALID_PARAM,
        }
    }

    /// Human-readable text for the `message` field.
    pub fn description(&self) -> String {
        match self {
            ScannerError::DeviceNotFound => "Please connect the ZK9500 scanner".to_string(),
            ScannerError::DeviceOpen(_) => {
                "Device may be in use by another application".to_string()
            }
            ScannerError::Dimensions(_) => "Device communication error".to_string(),
            ScannerError::Init(code) | ScannerError::Capture(code) => {
                codes::describe(*code).to_string()
            }
            ScannerError::Terminal { code, .. } => codes::describe(*code).to_string(),
            other => other.to_string(),
        }
    }
}

/// Thread-safe last-error storage for the C FFI layer.
pub(crate) struct LastError {
    message: std::sync::Mutex<String>,
}

impl LastError {
    pub const fn new() -> Self {
        Self {
            message: std::sync::Mutex::new(String::new()),
        }
    }

    pub fn set(&self, err: &dyn fmt::Display) {
        if let Ok(mut msg) = self.message.lock() {
            *msg = fmt::format(format_args!("{}\0", err));
        }
    }

    pub fn clear(&self) {
        if let Ok(mut msg) = self.message.lock() {
            msg.clear();
        }
    }

    pub fn as_ptr(&self) -> *const std::ffi::c_char {
        match self.message.lock() {
            Ok(msg) if !msg.is_empty() => msg.as_ptr() as *const std::ffi::c_char,
            _ => std::ptr::null(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_code() {
        let err = ScannerError::DeviceOpen(0);
        assert_eq!(err.kind(), FailureKind::DeviceOpen);
        assert_eq!(err.code(), -3);

        let err = ScannerError::Capture(-17);
        assert_eq!(err.kind(), FailureKind::Capture);
        assert_eq!(err.code(), -17);
        assert_eq!(err.description(), "Busy");
    }

    #[test]
    fn test_library_not_found_is_initialization() {
        let err = ScannerError::LibraryNotFound("libzkfp.so".into());
        assert_eq!(err.kind(), FailureKind::Initialization);
        assert_eq!(err.code(), -1);
        assert!(err.description().contains("libzkfp.so"));
    }

    #[test]
    fn test_last_error_roundtrip() {
        let last = LastError::new();
        assert!(last.as_ptr().is_null());
        last.set(&ScannerError::DeviceNotFound);
        let msg = unsafe { std::ffi::CStr::from_ptr(last.as_ptr()) };
        assert_eq!(msg.to_str().unwrap(), "No fingerprint devices found");
        last.clear();
        assert!(last.as_ptr().is_null());
    }
}
