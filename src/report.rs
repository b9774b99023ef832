//! The one-line JSON result protocol written to stdout.
//!
//! ```text
//! {"success":true,"template":"abcd","templateBase64":"q80=","image":"...","width":300,"height":400,"size":2,"elapsed_seconds":3,"message":"Fingerprint captured successfully"}
//! {"success":false,"error":"Timeout","code":-8,"timeout_seconds":2,"message":"No finger detected within 2 seconds. Please place your finger on the scanner."}
//! {"success":false,"error":"Capture failed","code":-17,"message":"Busy"}
//! ```

use crate::codes;
use crate::encoding;
use crate::error::ScannerError;
use crate::types::{AcquisitionResult, Capture};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureReport {
    pub success: bool,
    pub template: String,
    #[serde(rename = "templateBase64")]
    pub template_base64: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub size: usize,
    pub elapsed_seconds: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeoutReport {
    pub success: bool,
    pub error: String,
    pub code: i32,
    pub timeout_seconds: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadyReport {
    pub success: bool,
    pub devices: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionReport {
    pub success: bool,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerialReport {
    pub success: bool,
    pub serial: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub connected: bool,
}

/// Everything a command can print on the result channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Captured(CaptureReport),
    TimedOut(TimeoutReport),
    Failed(FailureReport),
    Ready(ReadyReport),
    Version(VersionReport),
    Serial(SerialReport),
    Connection(ConnectionReport),
}

impl Report {
    /// Build the capture line. `include_image` controls the hex image field.
    pub fn from_capture(capture: &Capture, include_image: bool) -> Self {
        let image = if include_image {
            capture.image.as_deref().map(encoding::hex_encode)
        } else {
            None
        };
        Report::Captured(CaptureReport {
            success: true,
            template: encoding::hex_encode(&capture.template),
            template_base64: encoding::base64_encode(&capture.template),
            image,
            width: capture.size.map(|s| s.width),
            height: capture.size.map(|s| s.height),
            size: capture.template.len(),
            elapsed_seconds: capture.elapsed_attempts,
            message: "Fingerprint captured successfully".to_string(),
        })
    }

    pub fn from_acquisition(result: &AcquisitionResult, include_image: bool) -> Self {
        match result {
            AcquisitionResult::Success(capture) => Report::from_capture(capture, include_image),
            AcquisitionResult::Timeout { limit, .. } => Report::TimedOut(TimeoutReport {
                success: false,
                error: "Timeout".to_string(),
                code: codes::ERR_TIMEOUT,
                timeout_seconds: *limit,
                message: format!(
                    "No finger detected within {} seconds. Please place your finger on the scanner.",
                    limit
                ),
            }),
            AcquisitionResult::Fatal {
                kind,
                code,
                description,
            } => Report::Failed(FailureReport {
                success: false,
                error: kind.label().to_string(),
                code: Some(*code),
                message: description.clone(),
            }),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Report::Failed(FailureReport {
            success: false,
            error: crate::USAGE.to_string(),
            code: None,
            message: message.into(),
        })
    }

    pub fn ready(devices: u32) -> Self {
        Report::Ready(ReadyReport {
            success: true,
            devices,
            message: "Scanner ready".to_string(),
        })
    }

    pub fn version(version: String) -> Self {
        Report::Version(VersionReport {
            success: true,
            version,
        })
    }

    pub fn serial(serial: String) -> Self {
        Report::Serial(SerialReport {
            success: true,
            serial,
        })
    }

    pub fn connection(connected: bool) -> Self {
        Report::Connection(ConnectionReport {
            success: true,
            connected,
        })
    }

    pub fn is_success(&self) -> bool {
        match self {
            Report::Captured(r) => r.success,
            Report::TimedOut(r) => r.success,
            Report::Failed(r) => r.success,
            Report::Ready(r) => r.success,
            Report::Version(r) => r.success,
            Report::Serial(r) => r.success,
            Report::Connection(r) => r.success,
        }
    }

    /// Process exit code: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                "{{\"success\":false,\"error\":\"Internal error\",\"message\":\"{}\"}}",
                e.to_string().replace('"', "'")
            )
        })
    }
}

impl From<&ScannerError> for Report {
    fn from(err: &ScannerError) -> Self {
        Report::Failed(FailureReport {
            success: false,
            error: err.label(),
            code: Some(err.code()),
            message: err.description(),
        })
    }
}

impl From<ScannerError> for Report {
    fn from(err: ScannerError) -> Self {
        Report::from(&err)
    }
}
