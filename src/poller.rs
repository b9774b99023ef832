use crate::codes::{self, CodeCategory};
use crate::device::{Device, SdkSession};
use crate::sdk::FingerprintSdk;
use crate::types::{AcquisitionResult, AttemptBudget, Capture, ImageSize};
use crate::{Result, ScannerError};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Log a progress line every this many empty attempts.
const PROGRESS_EVERY: u32 = 5;

/// Receiving side of a cancellation request.
///
/// The wait between attempts blocks on the channel, so a cancel wakes the
/// poller immediately instead of after the current unit.
#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    wake: Receiver<()>,
}

/// Sending side of a [`CancelToken`].
#[derive(Clone)]
pub struct Canceller {
    flag: Arc<AtomicBool>,
    wake: Sender<()>,
}

impl CancelToken {
    /// A connected canceller/token pair.
    pub fn pair() -> (Canceller, CancelToken) {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let flag = Arc::new(AtomicBool::new(false));
        (
            Canceller {
                flag: flag.clone(),
                wake: sender,
            },
            CancelToken {
                flag,
                wake: receiver,
            },
        )
    }

    /// A token nobody can cancel.
    pub fn never() -> Self {
        CancelToken {
            flag: Arc::new(AtomicBool::new(false)),
            wake: crossbeam_channel::never(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Wait up to `timeout`. Returns `true` if cancelled meanwhile.
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        match self.wake.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) => self.is_cancelled(),
            Err(RecvTimeoutError::Disconnected) => {
                // Every canceller is gone; nothing can wake us any more.
                std::thread::sleep(timeout);
                self.is_cancelled()
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::never()
    }
}

impl Canceller {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
        let _ = self.wake.try_send(());
    }
}

/// Bounded retry loop around the capture primitive.
///
/// ```text
/// Idle -> Polling -> { Success | Timeout | Fatal }
/// ```
///
/// Only [`codes::ERR_TIMEOUT`] keeps the loop polling. Every other non-OK
/// code, including a lost USB link, ends it at once.
pub struct AcquisitionPoller {
    budget: AttemptBudget,
    unit: Duration,
    cancel: CancelToken,
}

impl AcquisitionPoller {
    pub fn new(budget: AttemptBudget) -> Self {
        Self {
            budget,
            unit: Duration::from_secs(1),
            cancel: CancelToken::never(),
        }
    }

    /// Override the wait between attempts (tests use zero).
    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Full acquisition: init the SDK, open the device, query geometry,
    /// poll. Device and SDK are released on every path before returning.
    pub fn acquire<S: FingerprintSdk + ?Sized>(&self, sdk: &S, device_index: i32) -> AcquisitionResult {
        self.acquire_inner(sdk, device_index)
            .unwrap_or_else(AcquisitionResult::from)
    }

    fn acquire_inner<S: FingerprintSdk + ?Sized>(
        &self,
        sdk: &S,
        device_index: i32,
    ) -> Result<AcquisitionResult> {
        let session = SdkSession::init(sdk)?;
        if session.device_count() == 0 {
            return Err(ScannerError::DeviceNotFound);
        }
        let device = session.open_device(device_index)?;
        let size = device.image_size()?;
        Ok(self.poll(&device, size))
    }

    /// Run the polling loop on an already opened device.
    pub fn poll<S: FingerprintSdk + ?Sized>(&self, device: &Device<'_, S>, size: ImageSize) -> AcquisitionResult {
        let limit = self.budget.get();
        let mut image = vec![0u8; size.byte_len()];
        let mut template = vec![0u8; codes::MAX_TEMPLATE_SIZE];
        let mut attempts: u32 = 0;

        log::info!("Place finger on scanner (timeout: {}s)", limit);

        loop {
            let attempt = device.try_capture(&mut image, &mut template, size);

            match codes::classify(attempt.code) {
                CodeCategory::Ok if !attempt.template.is_empty() => {
                    log::info!(
                        "Fingerprint captured: {} byte template after {} attempt(s)",
                        attempt.template.len(),
                        attempts + 1
                    );
                    return AcquisitionResult::Success(Capture {
                        template: attempt.template,
                        image: attempt.image,
                        size: attempt.size,
                        elapsed_attempts: attempts + 1,
                    });
                }
                // An empty template counts as "nothing on the sensor yet".
                CodeCategory::Ok | CodeCategory::NoInput => {
                    attempts += 1;
                    if attempts >= limit {
                        log::info!("No finger detected within {} attempt(s)", limit);
                        return AcquisitionResult::Timeout {
                            attempts_made: attempts,
                            limit,
                        };
                    }
                    if attempts % PROGRESS_EVERY == 0 {
                        log::info!("Waiting for finger... ({}/{})", attempts, limit);
                    }
                    if self.cancel.wait(self.unit) {
                        log::info!("Capture cancelled after {} attempt(s)", attempts);
                        return ScannerError::Cancelled(attempts).into();
                    }
                }
                CodeCategory::Fatal => {
                    log::warn!(
                        "Capture failed with code {} - {}",
                        attempt.code,
                        codes::describe(attempt.code)
                    );
                    return ScannerError::Capture(attempt.code).into();
                }
            }
        }
    }
}
