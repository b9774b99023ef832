//! One entry point per CLI command. Each returns exactly one [`Report`].

use crate::device::SdkSession;
use crate::poller::{AcquisitionPoller, CancelToken};
use crate::report::Report;
use crate::sdk::FingerprintSdk;
use crate::terminal::TerminalSdk;
use crate::types::AttemptBudget;
use crate::ScannerError;

/// Options for the `capture` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    pub budget: AttemptBudget,
    pub device_index: i32,
    pub include_image: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            budget: AttemptBudget::default(),
            device_index: 0,
            include_image: true,
        }
    }
}

/// `test`: initialise the SDK and count attached scanners.
pub fn test<S: FingerprintSdk + ?Sized>(sdk: &S) -> Report {
    let session = match SdkSession::init(sdk) {
        Ok(session) => session,
        Err(e) => return Report::from(e),
    };
    match session.device_count() {
        0 => Report::from(ScannerError::DeviceNotFound),
        n => Report::ready(n),
    }
}

/// `capture [timeout]`: poll for a finger and return template and image.
pub fn capture<S: FingerprintSdk + ?Sized>(
    sdk: &S,
    options: &CaptureOptions,
    cancel: CancelToken,
) -> Report {
    let result = AcquisitionPoller::new(options.budget)
        .with_cancel(cancel)
        .acquire(sdk, options.device_index);
    Report::from_acquisition(&result, options.include_image)
}

/// `version`: firmware version of the connected terminal.
pub fn version<T: TerminalSdk + ?Sized>(sdk: &T) -> Report {
    match sdk.device_version() {
        Ok(v) => Report::version(v),
        Err(e) => Report::from(e),
    }
}

/// `serial`: serial number of the connected terminal.
pub fn serial<T: TerminalSdk + ?Sized>(sdk: &T) -> Report {
    match sdk.serial_number() {
        Ok(s) => Report::serial(s),
        Err(e) => Report::from(e),
    }
}

/// `connect <host> <port>`.
pub fn connect<T: TerminalSdk + ?Sized>(sdk: &T, host: &str, port: u16) -> Report {
    match sdk.connect(host, port) {
        Ok(()) => Report::connection(true),
        Err(e) => Report::from(e),
    }
}

/// `disconnect`.
pub fn disconnect<T: TerminalSdk + ?Sized>(sdk: &T) -> Report {
    match sdk.disconnect() {
        Ok(()) => Report::connection(false),
        Err(e) => Report::from(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes;
    use crate::sdk::fake::FakeSdk;
    use crate::terminal::fake::FakeTerminal;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn run_capture(sdk: &FakeSdk, budget: u32) -> Report {
        let result = AcquisitionPoller::new(AttemptBudget::new(budget))
            .with_unit(Duration::ZERO)
            .acquire(sdk, 0);
        Report::from_acquisition(&result, true)
    }

    #[test]
    fn test_scenario_success_on_third_attempt() {
        let sdk = FakeSdk::new(vec![
            Err(codes::ERR_TIMEOUT),
            Err(codes::ERR_TIMEOUT),
            Ok(vec![0xAB, 0xCD]),
        ]);
        let report = run_capture(&sdk, 3);
        let value: serde_json::Value = serde_json::from_str(&report.to_line()).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["template"], "abcd");
        assert_eq!(value["templateBase64"], "q80=");
        assert_eq!(value["elapsed_seconds"], 3);
        assert_eq!(value["size"], 2);
        assert_eq!(value["width"], 4);
        assert_eq!(value["height"], 2);
        assert_eq!(value["image"], "0001020304050607");
        assert_eq!(report.exit_code(), 0);
        assert_eq!(sdk.attempts.get(), 3);
    }

    #[test]
    fn test_scenario_timeout() {
        let sdk = FakeSdk::new(vec![Err(codes::ERR_TIMEOUT), Err(codes::ERR_TIMEOUT)]);
        let report = run_capture(&sdk, 2);
        let value: serde_json::Value = serde_json::from_str(&report.to_line()).unwrap();
        assert_eq!(value["error"], "Timeout");
        assert_eq!(value["code"], -8);
        assert_eq!(value["timeout_seconds"], 2);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(sdk.attempts.get(), 2);
    }

    #[test]
    fn test_scenario_open_failure() {
        let mut sdk = FakeSdk::new(vec![]);
        sdk.open_ok = false;
        let report = run_capture(&sdk, 5);
        let value: serde_json::Value = serde_json::from_str(&report.to_line()).unwrap();
        assert_eq!(value["error"], "Failed to open device");
        assert_eq!(value["code"], -3);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(sdk.attempts.get(), 0);
    }

    #[test]
    fn test_capture_command_fatal() {
        let sdk = FakeSdk::new(vec![Err(codes::ERR_BUSY)]);
        let report = capture(&sdk, &CaptureOptions::default(), CancelToken::never());
        assert_eq!(
            report.to_line(),
            r#"{"success":false,"error":"Capture failed","code":-17,"message":"Busy"}"#
        );
        assert_eq!(sdk.closes.get(), 1);
    }

    #[test]
    fn test_capture_command_without_image() {
        let sdk = FakeSdk::new(vec![Ok(vec![0x01])]);
        let options = CaptureOptions {
            include_image: false,
            ..CaptureOptions::default()
        };
        let line = capture(&sdk, &options, CancelToken::never()).to_line();
        assert!(line.contains(r#""template":"01""#));
        assert!(!line.contains(r#""image""#));
    }

    #[test]
    fn test_test_command() {
        let mut sdk = FakeSdk::new(vec![]);
        sdk.devices = 2;
        assert_eq!(test(&sdk), Report::ready(2));
        assert_eq!(sdk.terminates.get(), 1);

        sdk.devices = 0;
        let report = test(&sdk);
        assert_eq!(report.exit_code(), 1);

        sdk.init_code = -1;
        let line = test(&sdk).to_line();
        assert!(line.contains(r#""error":"Failed to initialize SDK""#));
    }

    #[test]
    fn test_terminal_commands() {
        let term = FakeTerminal::default();
        assert_eq!(connect(&term, "192.168.1.201", 4370), Report::connection(true));
        assert_eq!(
            *term.connected_to.borrow(),
            Some(("192.168.1.201".to_string(), 4370))
        );
        assert_eq!(
            version(&term),
            Report::version("Ver 6.60 Apr 28 2020".into())
        );
        assert_eq!(serial(&term), Report::serial("CGXH201960001".into()));
        assert_eq!(disconnect(&term), Report::connection(false));
        assert!(term.connected_to.borrow().is_none());
    }

    #[test]
    fn test_terminal_failures() {
        let term = FakeTerminal {
            connect_code: Some(-5),
            version: None,
            serial: Some(Err(-6)),
            ..FakeTerminal::default()
        };
        assert_eq!(
            connect(&term, "10.0.0.1", 4370).to_line(),
            r#"{"success":false,"error":"Connect failed","code":-5,"message":"Driver error"}"#
        );
        assert_eq!(version(&term).exit_code(), 1);
        assert!(version(&term)
            .to_line()
            .contains("ZKEM_GetDeviceVersion not available"));
        assert_eq!(
            serial(&term).to_line(),
            r#"{"success":false,"error":"GetSerial failed","code":-6,"message":"Device not open"}"#
        );
    }
}
