//! Runtime binding of the ZKTeco terminal SDK (`zkemsdk`).
//!
//! Unlike `libzkfp`, each entry point is optional: older SDK builds ship
//! without some of them, and a missing one only fails the command that
//! needs it.

use crate::sdk::load_library;
use crate::{Result, ScannerError};
use libloading::Library;
use std::ffi::{c_char, c_int, CStr, CString};

/// Size of the string buffers handed to the version/serial calls.
pub const INFO_BUFFER_SIZE: usize = 64;

/// Operations offered by a networked ZKTeco terminal.
pub trait TerminalSdk {
    fn connect(&self, host: &str, port: u16) -> Result<()>;
    fn disconnect(&self) -> Result<()>;
    fn device_version(&self) -> Result<String>;
    fn serial_number(&self) -> Result<String>;
}

type ConnectFn = unsafe extern "system" fn(*const c_char, c_int) -> c_int;
type DisconnectFn = unsafe extern "system" fn() -> c_int;
type InfoFn = unsafe extern "system" fn(*mut c_char) -> c_int;

/// Resolved `zkemsdk` entry points.
pub struct ZkemLibrary {
    connect: Option<ConnectFn>,
    disconnect: Option<DisconnectFn>,
    get_device_version: Option<InfoFn>,
    get_serial_number: Option<InfoFn>,
    _library: Library,
}

impl ZkemLibrary {
    pub fn load(candidates: &[String]) -> Result<Self> {
        let library = load_library(candidates)?;

        // SAFETY: signatures match the zkemsdk exports; pointers live no
        // longer than `_library`.
        let (connect, disconnect, get_device_version, get_serial_number) = unsafe {
            (
                library.get::<ConnectFn>(b"ZKEM_Connect\0").ok().map(|s| *s),
                library.get::<DisconnectFn>(b"ZKEM_Disconnect\0").ok().map(|s| *s),
                library.get::<InfoFn>(b"ZKEM_GetDeviceVersion\0").ok().map(|s| *s),
                library.get::<InfoFn>(b"ZKEM_GetSerialNumber\0").ok().map(|s| *s),
            )
        };
        if connect.is_none() {
            log::warn!("ZKEM_Connect not found in SDK library");
        }

        Ok(ZkemLibrary {
            connect,
            disconnect,
            get_device_version,
            get_serial_number,
            _library: library,
        })
    }
}

fn check(op: &'static str, code: c_int) -> Result<()> {
    if code == crate::codes::ERR_OK {
        Ok(())
    } else {
        Err(ScannerError::Terminal { op, code })
    }
}

fn read_info(op: &'static str, func: Option<InfoFn>, symbol: &'static str) -> Result<String> {
    let func = func.ok_or(ScannerError::MissingFunction(symbol))?;
    let mut buf = [0 as c_char; INFO_BUFFER_SIZE];
    check(op, unsafe { func(buf.as_mut_ptr()) })?;
    // The SDK may fill the whole buffer; force a terminator.
    buf[INFO_BUFFER_SIZE - 1] = 0;
    let text = unsafe { CStr::from_ptr(buf.as_ptr()) };
    Ok(text.to_string_lossy().trim().to_string())
}

impl TerminalSdk for ZkemLibrary {
    fn connect(&self, host: &str, port: u16) -> Result<()> {
        let func = self
            .connect
            .ok_or(ScannerError::MissingFunction("ZKEM_Connect"))?;
        let host = CString::new(host)
            .map_err(|_| ScannerError::InvalidArgument("host contains NUL".into()))?;
        log::info!("Connecting to terminal {}:{}", host.to_string_lossy(), port);
        check("Connect", unsafe { func(host.as_ptr(), c_int::from(port)) })
    }

    fn disconnect(&self) -> Result<()> {
        let func = self
            .disconnect
            .ok_or(ScannerError::MissingFunction("ZKEM_Disconnect"))?;
        check("Disconnect", unsafe { func() })
    }

    fn device_version(&self) -> Result<String> {
        read_info("GetVersion", self.get_device_version, "ZKEM_GetDeviceVersion")
    }

    fn serial_number(&self) -> Result<String> {
        read_info("GetSerial", self.get_serial_number, "ZKEM_GetSerialNumber")
    }
}
