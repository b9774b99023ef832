use crate::codes;
use crate::sdk::{DeviceHandle, FingerprintSdk};
use crate::types::{Attempt, ImageSize};
use crate::{Result, ScannerError};

/// An initialised SDK. `ZKFPM_Terminate` runs when this is dropped.
pub struct SdkSession<'a, S: FingerprintSdk + ?Sized> {
    sdk: &'a S,
}

impl<'a, S: FingerprintSdk + ?Sized> SdkSession<'a, S> {
    /// Initialise the SDK.
    pub fn init(sdk: &'a S) -> Result<Self> {
        let ret = sdk.init();
        if ret != codes::ERR_OK {
            log::warn!("ZKFPM_Init failed: {} ({})", ret, codes::describe(ret));
            return Err(ScannerError::Init(ret));
        }
        log::debug!("SDK initialized");
        Ok(SdkSession { sdk })
    }

    /// Number of attached scanners. Negative SDK returns count as zero.
    pub fn device_count(&self) -> u32 {
        self.sdk.device_count().max(0) as u32
    }

    /// Open the scanner at `index`.
    ///
    /// The device is exclusive system-wide; a second opener gets
    /// [`ScannerError::DeviceOpen`] and is not retried.
    pub fn open_device(&self, index: i32) -> Result<Device<'_, S>> {
        let handle = self
            .sdk
            .open_device(index)
            .ok_or(ScannerError::DeviceOpen(index))?;
        log::info!("Opened fingerprint device {}", index);
        Ok(Device {
            sdk: self.sdk,
            handle,
            index,
        })
    }
}

impl<S: FingerprintSdk + ?Sized> Drop for SdkSession<'_, S> {
    fn drop(&mut self) {
        self.sdk.terminate();
        log::debug!("SDK terminated");
    }
}

/// An opened scanner. Closed exactly once when dropped.
pub struct Device<'a, S: FingerprintSdk + ?Sized> {
    sdk: &'a S,
    handle: DeviceHandle,
    index: i32,
}

impl<S: FingerprintSdk + ?Sized> Device<'_, S> {
    pub fn index(&self) -> i32 {
        self.index
    }

    /// Query the sensor image geometry.
    ///
    /// A zero width or height, or one above [`codes::MAX_IMAGE_DIMENSION`],
    /// is reported as a dimension failure with [`codes::ERR_INVALID_PARAM`].
    pub fn image_size(&self) -> Result<ImageSize> {
        let width = self
            .sdk
            .get_parameter(self.handle, codes::PARAM_IMAGE_WIDTH)
            .map_err(ScannerError::Dimensions)?;
        let height = self
            .sdk
            .get_parameter(self.handle, codes::PARAM_IMAGE_HEIGHT)
            .map_err(ScannerError::Dimensions)?;

        let valid = 1..=codes::MAX_IMAGE_DIMENSION;
        if !valid.contains(&width) || !valid.contains(&height) {
            log::warn!("Rejecting image size {}x{}", width, height);
            return Err(ScannerError::Dimensions(codes::ERR_INVALID_PARAM));
        }

        log::debug!("Image size: {}x{}", width, height);
        Ok(ImageSize { width, height })
    }

    /// One call to the capture primitive using caller-owned buffers.
    ///
    /// `image` must be `size.byte_len()` bytes; `template` at most
    /// [`codes::MAX_TEMPLATE_SIZE`].
    pub fn try_capture(&self, image: &mut [u8], template: &mut [u8], size: ImageSize) -> Attempt {
        match self.sdk.acquire_fingerprint(self.handle, image, template) {
            Ok(len) => {
                let frame = (!image.is_empty()).then(|| (image.to_vec(), size));
                Attempt::captured(template[..len].to_vec(), frame)
            }
            Err(code) => Attempt::code(code),
        }
    }
}

impl<S: FingerprintSdk + ?Sized> Drop for Device<'_, S> {
    fn drop(&mut self) {
        self.sdk.close_device(self.handle);
        log::info!("Closed fingerprint device {}", self.index);
    }
}
