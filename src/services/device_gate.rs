use crate::error::GalleryError;
use crate::models::PanelSpec;
use crate::services::display_driver::{DisplayDriver, DriverError};
use image::RgbImage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Exclusive access to the panel.
///
/// At most one refresh runs at a time. Callers that find the panel busy are
/// turned away with [`GalleryError::DeviceBusy`]; nothing queues.
pub struct DeviceGate {
    busy: AtomicBool,
    panel: PanelSpec,
    driver: Mutex<Box<dyn DisplayDriver>>,
}

/// Proof of exclusive panel access. Releases the gate when dropped.
pub struct GatePermit {
    gate: Arc<DeviceGate>,
    released: bool,
}

impl DeviceGate {
    pub fn new(driver: Box<dyn DisplayDriver>) -> Self {
        Self {
            busy: AtomicBool::new(false),
            panel: driver.panel(),
            driver: Mutex::new(driver),
        }
    }

    pub fn panel(&self) -> PanelSpec {
        self.panel
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Take the gate if it is idle.
    pub fn try_acquire(self: &Arc<Self>) -> Result<GatePermit, GalleryError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GalleryError::DeviceBusy)?;
        tracing::debug!("Display gate acquired");
        Ok(GatePermit {
            gate: Arc::clone(self),
            released: false,
        })
    }

    fn release(&self) {
        self.busy.store(false, Ordering::Release);
        tracing::debug!("Display gate released");
    }

    /// Show `frame`: init, clear, send, sleep. The permit is consumed and the
    /// gate released on every path.
    pub fn render(&self, permit: GatePermit, frame: &RgbImage) -> Result<(), GalleryError> {
        self.run(permit, "render", |driver| {
            driver.init()?;
            driver.clear()?;
            driver.send(frame)?;
            driver.sleep()
        })
    }

    /// Blank the panel: init, clear, sleep.
    pub fn clear(&self, permit: GatePermit) -> Result<(), GalleryError> {
        self.run(permit, "clear", |driver| {
            driver.init()?;
            driver.clear()?;
            driver.sleep()
        })
    }

    fn run<F>(&self, permit: GatePermit, action: &'static str, sequence: F) -> Result<(), GalleryError>
    where
        F: FnOnce(&mut dyn DisplayDriver) -> Result<(), DriverError>,
    {
        debug_assert!(
            std::ptr::eq(Arc::as_ptr(&permit.gate), self),
            "permit belongs to another gate"
        );

        let result = {
            let mut driver = self.driver.lock().unwrap_or_else(PoisonError::into_inner);
            let result = sequence(&mut **driver);
            if let Err(e) = &result {
                tracing::error!(action, error = %e, "Display refresh failed");
                if let Err(sleep_err) = driver.sleep() {
                    tracing::warn!(error = %sleep_err, "Failed to put panel to sleep after error");
                }
            }
            result
        };

        permit.release();
        result.map_err(GalleryError::from)
    }
}

impl GatePermit {
    /// Give the gate back without using it.
    pub fn release(mut self) {
        self.released = true;
        self.gate.release();
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        if !self.released {
            self.gate.release();
        }
    }
}
