//! SDK constants and the return-code table.
//!
//! Every code the capture primitive can return is classified here once.
//! Anything missing from [`CODE_TABLE`] is fatal with the description
//! "Unknown error".

// -- Return codes --
pub const ERR_OK: i32 = 0;
pub const ERR_NOT_INIT: i32 = -1;
pub const ERR_INVALID_PARAM: i32 = -2;
pub const ERR_OPEN: i32 = -3;
pub const ERR_NO_DEVICE: i32 = -4;
pub const ERR_DRIVER: i32 = -5;
pub const ERR_NOT_OPENED: i32 = -6;
pub const ERR_CAPTURING: i32 = -7;
/// "No finger detected yet". The only retryable code.
pub const ERR_TIMEOUT: i32 = -8;
pub const ERR_ALGORITHM: i32 = -9;
pub const ERR_DATABASE: i32 = -10;
pub const ERR_UNKNOWN: i32 = -11;
pub const ERR_MEMORY: i32 = -12;
pub const ERR_INVALID_TEMPLATE: i32 = -13;
pub const ERR_MERGE: i32 = -14;
pub const ERR_NOT_ENROLLED: i32 = -15;
pub const ERR_ALREADY_ENROLLED: i32 = -16;
pub const ERR_BUSY: i32 = -17;
pub const ERR_CANCEL: i32 = -18;

// -- ZKFPM_GetParameters codes --
pub const PARAM_IMAGE_WIDTH: i32 = 1;
pub const PARAM_IMAGE_HEIGHT: i32 = 2;

// -- Buffer and budget limits --
pub const MAX_TEMPLATE_SIZE: usize = 2048;
/// Largest width or height accepted from `ZKFPM_GetParameters`.
pub const MAX_IMAGE_DIMENSION: u32 = 4096;
pub const DEFAULT_TIMEOUT_SECONDS: u32 = 30;
pub const MIN_TIMEOUT_SECONDS: u32 = 1;
pub const MAX_TIMEOUT_SECONDS: u32 = 120;

/// How the poller treats a return code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCategory {
    Ok,
    /// Keep waiting; the sensor has not seen a finger yet.
    NoInput,
    Fatal,
}

/// `(code, category, description)` for every known code.
pub static CODE_TABLE: &[(i32, CodeCategory, &str)] = &[
    (ERR_OK, CodeCategory::Ok, "Success"),
    (ERR_NOT_INIT, CodeCategory::Fatal, "SDK not initialized"),
    (ERR_INVALID_PARAM, CodeCategory::Fatal, "Invalid parameter"),
    (ERR_OPEN, CodeCategory::Fatal, "Device open failed"),
    (ERR_NO_DEVICE, CodeCategory::Fatal, "Device not found"),
    (ERR_DRIVER, CodeCategory::Fatal, "Driver error"),
    (ERR_NOT_OPENED, CodeCategory::Fatal, "Device not open"),
    (ERR_CAPTURING, CodeCategory::Fatal, "Capture in progress"),
    (ERR_TIMEOUT, CodeCategory::NoInput, "No finger detected"),
    (ERR_ALGORITHM, CodeCategory::Fatal, "Algorithm error"),
    (ERR_DATABASE, CodeCategory::Fatal, "Database error"),
    (ERR_UNKNOWN, CodeCategory::Fatal, "Unknown error"),
    (ERR_MEMORY, CodeCategory::Fatal, "Memory allocation failed"),
    (ERR_INVALID_TEMPLATE, CodeCategory::Fatal, "Invalid template"),
    (ERR_MERGE, CodeCategory::Fatal, "Merge template error"),
    (ERR_NOT_ENROLLED, CodeCategory::Fatal, "Not enrolled"),
    (ERR_ALREADY_ENROLLED, CodeCategory::Fatal, "Already enrolled"),
    (ERR_BUSY, CodeCategory::Fatal, "Busy"),
    (ERR_CANCEL, CodeCategory::Fatal, "Capture cancelled"),
];

fn lookup(code: i32) -> Option<&'static (i32, CodeCategory, &'static str)> {
    CODE_TABLE.iter().find(|(c, _, _)| *c == code)
}

/// Classify a return code. Unknown codes are fatal.
pub fn classify(code: i32) -> CodeCategory {
    lookup(code).map_or(CodeCategory::Fatal, |(_, category, _)| *category)
}

/// Human-readable description of a return code.
pub fn describe(code: i32) -> &'static str {
    lookup(code).map_or("Unknown error", |(_, _, text)| text)
}

/// Parse a `timeout_seconds` argument into an attempt budget.
///
/// Anything non-numeric or outside `1..=120` yields `default`.
pub fn parse_timeout(arg: Option<&str>, default: u32) -> u32 {
    match arg.map(|s| s.trim().parse::<i64>()) {
        Some(Ok(n)) if n >= MIN_TIMEOUT_SECONDS as i64 && n <= MAX_TIMEOUT_SECONDS as i64 => {
            n as u32
        }
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_sentinel_is_retryable() {
        let retryable: Vec<i32> = CODE_TABLE
            .iter()
            .filter(|(_, cat, _)| *cat == CodeCategory::NoInput)
            .map(|(code, _, _)| *code)
            .collect();
        assert_eq!(retryable, vec![ERR_TIMEOUT]);
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<i32> = CODE_TABLE.iter().map(|(c, _, _)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), CODE_TABLE.len());
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(0), CodeCategory::Ok);
        assert_eq!(classify(-8), CodeCategory::NoInput);
        assert_eq!(classify(-17), CodeCategory::Fatal);
        assert_eq!(classify(-999), CodeCategory::Fatal);
        assert_eq!(classify(42), CodeCategory::Fatal);
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(-3), "Device open failed");
        assert_eq!(describe(-8), "No finger detected");
        assert_eq!(describe(-12), "Memory allocation failed");
        assert_eq!(describe(-1234), "Unknown error");
    }

    #[test]
    fn test_parse_timeout_in_range() {
        assert_eq!(parse_timeout(Some("1"), 30), 1);
        assert_eq!(parse_timeout(Some("45"), 30), 45);
        assert_eq!(parse_timeout(Some("120"), 30), 120);
        assert_eq!(parse_timeout(Some(" 7 "), 30), 7);
    }

    #[test]
    fn test_parse_timeout_falls_back() {
        for arg in ["0", "-5", "121", "99999999999", "abc", "", "3.5"] {
            assert_eq!(parse_timeout(Some(arg), 30), 30, "arg {:?}", arg);
        }
        assert_eq!(parse_timeout(None, 30), 30);
        assert_eq!(parse_timeout(Some("abc"), 10), 10);
    }
}
