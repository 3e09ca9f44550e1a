//! Real scanners through libfprint.

use crate::scanner::{Driver, Scanner};
use crate::{Geometry, RawSample};
use fprint_rs::{Device, DiscoveredDevices, FPrint, FPrintError, SizeVariant};
use std::rc::Rc;
use tracing::{debug, info};

pub struct LibfprintDriver {
    devices: DiscoveredDevices,
    context: Rc<FPrint>,
}

impl LibfprintDriver {
    pub fn new() -> Result<Self, FPrintError> {
        let context = FPrint::new()?;
        let devices = context.discover()?;
        for (index, device) in devices.iter().enumerate() {
            debug!(index, driver = %device.get_driver().get_name(), "discovered scanner");
        }

        Ok(LibfprintDriver {
            devices,
            context: Rc::new(context),
        })
    }
}

impl Driver for LibfprintDriver {
    type Device = LibfprintScanner;

    fn device_count(&self) -> usize {
        self.devices.count()
    }

    fn open(&self, index: usize) -> Result<LibfprintScanner, failure::Error> {
        let device = self
            .devices
            .get(index)
            .ok_or(FPrintError::NoDevice(index))?
            .open()?;
        if !device.supports_imaging() {
            return Err(FPrintError::NotSupported(fprint_rs::NotSupportContext::CapturingImage).into());
        }

        match (device.get_img_width(), device.get_img_height()) {
            (SizeVariant::Static(width), SizeVariant::Static(height)) => {
                info!(width, height, "scanner has fixed image size")
            }
            _ => debug!("scanner image size varies"),
        }

        Ok(LibfprintScanner {
            device,
            _context: Rc::clone(&self.context),
        })
    }
}

/// Fields drop in order: the device is closed before the library context
/// can go away.
pub struct LibfprintScanner {
    device: Device,
    _context: Rc<FPrint>,
}

impl Scanner for LibfprintScanner {
    fn name(&self) -> String {
        self.device.get_driver().get_full_name()
    }

    /// Blocks until libfprint detects a finger, so it never reports an
    /// empty poll.
    fn acquire(&mut self) -> Result<Option<RawSample>, failure::Error> {
        let image = self.device.capture_image(false)?;
        let pixels = image.to_vec()?;
        let geometry = Geometry::new(image.get_width() as u32, image.get_height() as u32)?;

        Ok(Some(RawSample::with_geometry(pixels, geometry)))
    }
}
