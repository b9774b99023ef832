use crate::codes;
use crate::error::ScannerError;

/// Sensor image geometry reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    /// Bytes needed for one 8-bit grayscale frame.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Outcome of one call to the foreign capture primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// Raw SDK return code.
    pub code: i32,
    /// Template bytes, empty unless `code` is OK.
    pub template: Vec<u8>,
    /// Raw sensor image, when the SDK filled one.
    pub image: Option<Vec<u8>>,
    pub size: Option<ImageSize>,
}

impl Attempt {
    /// An attempt that produced only a return code.
    pub fn code(code: i32) -> Self {
        Self {
            code,
            template: Vec::new(),
            image: None,
            size: None,
        }
    }

    /// A successful attempt carrying template and optional image.
    pub fn captured(template: Vec<u8>, image: Option<(Vec<u8>, ImageSize)>) -> Self {
        let (image, size) = match image {
            Some((buf, size)) => (Some(buf), Some(size)),
            None => (None, None),
        };
        Self {
            code: codes::ERR_OK,
            template,
            image,
            size,
        }
    }
}

/// A successfully captured fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub template: Vec<u8>,
    pub image: Option<Vec<u8>>,
    pub size: Option<ImageSize>,
    /// Attempts consumed, including the successful one.
    pub elapsed_attempts: u32,
}

/// Failure categories surfaced on the result channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Initialization,
    NoDevice,
    DeviceOpen,
    DimensionQuery,
    Capture,
    /// A networked-terminal (zkemsdk) call failed.
    Terminal,
}

impl FailureKind {
    /// Short label for the `error` field.
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::Initialization => "Failed to initialize SDK",
            FailureKind::NoDevice => "No fingerprint devices found",
            FailureKind::DeviceOpen => "Failed to open device",
            FailureKind::DimensionQuery => "Failed to get image dimensions",
            FailureKind::Capture => "Capture failed",
            FailureKind::Terminal => "Terminal command failed",
        }
    }
}

/// Terminal outcome of one acquisition. Exactly one is produced per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionResult {
    Success(Capture),
    Timeout {
        attempts_made: u32,
        limit: u32,
    },
    Fatal {
        kind: FailureKind,
        code: i32,
        description: String,
    },
}

impl AcquisitionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AcquisitionResult::Success(_))
    }
}

impl From<ScannerError> for AcquisitionResult {
    fn from(err: ScannerError) -> Self {
        AcquisitionResult::Fatal {
            kind: err.kind(),
            code: err.code(),
            description: err.description(),
        }
    }
}

/// Number of one-unit polling iterations allowed before timing out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptBudget(u32);

impl AttemptBudget {
    /// Out-of-range values fall back to the default budget.
    pub fn new(attempts: u32) -> Self {
        if (codes::MIN_TIMEOUT_SECONDS..=codes::MAX_TIMEOUT_SECONDS).contains(&attempts) {
            Self(attempts)
        } else {
            Self::default()
        }
    }

    /// Parse a CLI argument, silently falling back to `default`.
    pub fn parse(arg: Option<&str>, default: AttemptBudget) -> Self {
        Self(codes::parse_timeout(arg, default.0))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for AttemptBudget {
    fn default() -> Self {
        Self(codes::DEFAULT_TIMEOUT_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_range() {
        assert_eq!(AttemptBudget::new(1).get(), 1);
        assert_eq!(AttemptBudget::new(120).get(), 120);
        assert_eq!(AttemptBudget::new(0).get(), 30);
        assert_eq!(AttemptBudget::new(121).get(), 30);
    }

    #[test]
    fn test_budget_parse_uses_given_default() {
        let default = AttemptBudget::new(12);
        assert_eq!(AttemptBudget::parse(Some("x"), default).get(), 12);
        assert_eq!(AttemptBudget::parse(Some("-1"), default).get(), 12);
        assert_eq!(AttemptBudget::parse(Some("5"), default).get(), 5);
        assert_eq!(AttemptBudget::parse(None, default).get(), 12);
    }

    #[test]
    fn test_fatal_from_error() {
        let result = AcquisitionResult::from(ScannerError::Capture(-5));
        assert_eq!(
            result,
            AcquisitionResult::Fatal {
                kind: FailureKind::Capture,
                code: -5,
                description: "Driver error".into(),
            }
        );
        assert!(!result.is_success());
    }

    #[test]
    fn test_image_byte_len() {
        let size = ImageSize {
            width: 300,
            height: 400,
        };
        assert_eq!(size.byte_len(), 120_000);
    }
}
