//! Runtime binding of the ZKTeco USB scanner SDK (`libzkfp`).
//!
//! Symbols are resolved once into a [`ZkfpLibrary`] which the caller owns
//! and passes by reference; nothing is stored in globals. Everything above
//! this module talks to the [`FingerprintSdk`] trait so tests can swap in a
//! scripted device.

use crate::{Result, ScannerError};
use libloading::Library;
use std::ffi::{c_int, c_uchar, c_uint, c_void};
use std::ptr::NonNull;

/// Opaque device handle returned by `ZKFPM_OpenDevice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceHandle(NonNull<c_void>);

impl DeviceHandle {
    /// Wrap a raw SDK handle. Returns `None` for NULL.
    pub fn from_raw(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(DeviceHandle)
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// The subset of `libzkfp` the poller needs.
///
/// Methods mirror the C calls one to one and return raw SDK codes; the
/// RAII guards in [`crate::device`] turn them into errors.
pub trait FingerprintSdk {
    /// `ZKFPM_Init`.
    fn init(&self) -> i32;
    /// `ZKFPM_Terminate`.
    fn terminate(&self) -> i32;
    /// `ZKFPM_GetDeviceCount`.
    fn device_count(&self) -> i32;
    /// `ZKFPM_OpenDevice`. `None` when the device is missing or busy.
    fn open_device(&self, index: i32) -> Option<DeviceHandle>;
    /// `ZKFPM_CloseDevice`.
    fn close_device(&self, handle: DeviceHandle) -> i32;
    /// `ZKFPM_GetParameters` for a 4-byte little-endian value.
    fn get_parameter(&self, handle: DeviceHandle, code: i32) -> std::result::Result<u32, i32>;
    /// `ZKFPM_AcquireFingerprint`. `Ok(n)` is the template length written
    /// into `template`; `Err(code)` is any non-OK return.
    fn acquire_fingerprint(
        &self,
        handle: DeviceHandle,
        image: &mut [u8],
        template: &mut [u8],
    ) -> std::result::Result<usize, i32>;
}

type InitFn = unsafe extern "system" fn() -> c_int;
type TerminateFn = unsafe extern "system" fn() -> c_int;
type GetDeviceCountFn = unsafe extern "system" fn() -> c_int;
type OpenDeviceFn = unsafe extern "system" fn(c_int) -> *mut c_void;
type CloseDeviceFn = unsafe extern "system" fn(*mut c_void) -> c_int;
type GetParametersFn =
    unsafe extern "system" fn(*mut c_void, c_int, *mut c_uchar, *mut c_uint) -> c_int;
type AcquireFingerprintFn = unsafe extern "system" fn(
    *mut c_void,
    *mut c_uchar,
    c_uint,
    *mut c_uchar,
    *mut c_uint,
) -> c_int;

/// Load the first library in `candidates` that opens.
pub(crate) fn load_library(candidates: &[String]) -> Result<Library> {
    let mut last_err = None;
    for name in candidates {
        // SAFETY: the vendor SDK has no initialisation routines with
        // preconditions; ZKFPM_Init is called explicitly later.
        match unsafe { Library::new(name) } {
            Ok(lib) => {
                log::debug!("Loaded SDK library {}", name);
                return Ok(lib);
            }
            Err(e) => {
                log::debug!("Could not load {}: {}", name, e);
                last_err = Some(e);
            }
        }
    }
    match last_err {
        Some(e) if candidates.len() == 1 => Err(ScannerError::Library(e)),
        _ => Err(ScannerError::LibraryNotFound(candidates.join(", "))),
    }
}

/// Resolved `libzkfp` entry points.
pub struct ZkfpLibrary {
    init: InitFn,
    terminate: TerminateFn,
    get_device_count: GetDeviceCountFn,
    open_device: OpenDeviceFn,
    close_device: CloseDeviceFn,
    get_parameters: GetParametersFn,
    acquire_fingerprint: AcquireFingerprintFn,
    /// Keeps the function pointers above valid.
    _library: Library,
}

impl ZkfpLibrary {
    /// Load `libzkfp` from the first candidate that opens and resolve every
    /// symbol the poller needs.
    pub fn load(candidates: &[String]) -> Result<Self> {
        let library = load_library(candidates)?;

        // SAFETY: signatures match libzkfp.h; the pointers are only used
        // while `_library` is alive.
        let (
            init,
            terminate,
            get_device_count,
            open_device,
            close_device,
            get_parameters,
            acquire_fingerprint,
        ) = unsafe {
            (
                *library.get::<InitFn>(b"ZKFPM_Init\0")?,
                *library.get::<TerminateFn>(b"ZKFPM_Terminate\0")?,
                *library.get::<GetDeviceCountFn>(b"ZKFPM_GetDeviceCount\0")?,
                *library.get::<OpenDeviceFn>(b"ZKFPM_OpenDevice\0")?,
                *library.get::<CloseDeviceFn>(b"ZKFPM_CloseDevice\0")?,
                *library.get::<GetParametersFn>(b"ZKFPM_GetParameters\0")?,
                *library.get::<AcquireFingerprintFn>(b"ZKFPM_AcquireFingerprint\0")?,
            )
        };

        Ok(ZkfpLibrary {
            init,
            terminate,
            get_device_count,
            open_device,
            close_device,
            get_parameters,
            acquire_fingerprint,
            _library: library,
        })
    }
}

impl FingerprintSdk for ZkfpLibrary {
    fn init(&self) -> i32 {
        unsafe { (self.init)() }
    }

    fn terminate(&self) -> i32 {
        unsafe { (self.terminate)() }
    }

    fn device_count(&self) -> i32 {
        unsafe { (self.get_device_count)() }
    }

    fn open_device(&self, index: i32) -> Option<DeviceHandle> {
        DeviceHandle::from_raw(unsafe { (self.open_device)(index) })
    }

    fn close_device(&self, handle: DeviceHandle) -> i32 {
        unsafe { (self.close_device)(handle.as_ptr()) }
    }

    fn get_parameter(&self, handle: DeviceHandle, code: i32) -> std::result::Result<u32, i32> {
        let mut value = [0u8; 4];
        let mut size = value.len() as c_uint;
        let ret =
            unsafe { (self.get_parameters)(handle.as_ptr(), code, value.as_mut_ptr(), &mut size) };
        if ret != crate::codes::ERR_OK {
            return Err(ret);
        }
        Ok(u32::from_le_bytes(value))
    }

    fn acquire_fingerprint(
        &self,
        handle: DeviceHandle,
        image: &mut [u8],
        template: &mut [u8],
    ) -> std::result::Result<usize, i32> {
        let mut template_len = template.len() as c_uint;
        let ret = unsafe {
            (self.acquire_fingerprint)(
                handle.as_ptr(),
                image.as_mut_ptr(),
                image.len() as c_uint,
                template.as_mut_ptr(),
                &mut template_len,
            )
        };
        if ret != crate::codes::ERR_OK {
            return Err(ret);
        }
        Ok((template_len as usize).min(template.len()))
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted stand-in for `libzkfp`.

    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    pub struct FakeSdk {
        pub init_code: i32,
        pub devices: i32,
        pub open_ok: bool,
        pub width: std::result::Result<u32, i32>,
        pub height: std::result::Result<u32, i32>,
        /// One entry per acquire call; `Err(-8)` once exhausted.
        pub script: RefCell<VecDeque<std::result::Result<Vec<u8>, i32>>>,
        pub attempts: Cell<u32>,
        pub opens: Cell<u32>,
        pub closes: Cell<u32>,
        pub terminates: Cell<u32>,
    }

    impl FakeSdk {
        pub fn new(script: Vec<std::result::Result<Vec<u8>, i32>>) -> Self {
            FakeSdk {
                init_code: 0,
                devices: 1,
                open_ok: true,
                width: Ok(4),
                height: Ok(2),
                script: RefCell::new(script.into()),
                attempts: Cell::new(0),
                opens: Cell::new(0),
                closes: Cell::new(0),
                terminates: Cell::new(0),
            }
        }
    }

    impl FingerprintSdk for FakeSdk {
        fn init(&self) -> i32 {
            self.init_code
        }

        fn terminate(&self) -> i32 {
            self.terminates.set(self.terminates.get() + 1);
            0
        }

        fn device_count(&self) -> i32 {
            self.devices
        }

        fn open_device(&self, _index: i32) -> Option<DeviceHandle> {
            if !self.open_ok {
                return None;
            }
            self.opens.set(self.opens.get() + 1);
            Some(DeviceHandle(NonNull::dangling()))
        }

        fn close_device(&self, _handle: DeviceHandle) -> i32 {
            self.closes.set(self.closes.get() + 1);
            0
        }

        fn get_parameter(&self, _handle: DeviceHandle, code: i32) -> std::result::Result<u32, i32> {
            match code {
                crate::codes::PARAM_IMAGE_WIDTH => self.width,
                crate::codes::PARAM_IMAGE_HEIGHT => self.height,
                _ => Err(crate::codes::ERR_INVALID_PARAM),
            }
        }

        fn acquire_fingerprint(
            &self,
            _handle: DeviceHandle,
            image: &mut [u8],
            template: &mut [u8],
        ) -> std::result::Result<usize, i32> {
            self.attempts.set(self.attempts.get() + 1);
            match self.script.borrow_mut().pop_front() {
                Some(Ok(bytes)) => {
                    template[..bytes.len()].copy_from_slice(&bytes);
                    for (i, px) in image.iter_mut().enumerate() {
                        *px = i as u8;
                    }
                    Ok(bytes.len())
                }
                Some(Err(code)) => Err(code),
                None => Err(crate::codes::ERR_TIMEOUT),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle_rejected() {
        assert!(DeviceHandle::from_raw(std::ptr::null_mut()).is_none());
        let mut x = 0u8;
        let handle = DeviceHandle::from_raw(&mut x as *mut u8 as *mut c_void).unwrap();
        assert_eq!(handle.as_ptr() as *mut u8, &mut x as *mut u8);
    }

    #[test]
    fn test_missing_library_single_candidate() {
        let err = load_library(&["/nonexistent/libzkfp-test.so".to_string()]).err().unwrap();
        assert!(matches!(err, ScannerError::Library(_)));
        assert_eq!(err.code(), -1);
    }

    #[test]
    fn test_missing_library_many_candidates() {
        let names = vec!["/nonexistent/a.so".to_string(), "/nonexistent/b.so".to_string()];
        let err = load_library(&names).err().unwrap();
        match err {
            ScannerError::LibraryNotFound(tried) => {
                assert_eq!(tried, "/nonexistent/a.so, /nonexistent/b.so")
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_load_zkfp_missing() {
        let err = ZkfpLibrary::load(&["/nonexistent/libzkfp.so".to_string()]).err().unwrap();
        assert_eq!(err.kind(), crate::FailureKind::Initialization);
    }
}
