#![warn(clippy::all)]

mod device;
mod discovered_device;
mod driver;
mod errors;

pub use crate::{device::*, discovered_device::*, driver::*, errors::*};

pub type Result<T> = std::result::Result<T, FPrintError>;

/// libfprint library context. Only one should exist at a time; dropping it
/// shuts the library down, so every device must be dropped first.
#[derive(Debug)]
pub struct FPrint {
    _private: (),
}

impl FPrint {
    /// Initialise libfprint.
    ///
    /// To enable debug output of libfprint specifically, use GLib's `G_MESSAGES_DEBUG` environment
    /// variable. To enable debugging of `libusb`, for USB-based fingerprint readers, use
    /// libusb's `LIBUSB_DEBUG` environment variable.
    ///
    /// Example:
    /// ```bash
    /// # LIBUSB_DEBUG=4 G_MESSAGES_DEBUG=all fpcapture
    /// ```
    pub fn new() -> crate::Result<FPrint> {
        let res = unsafe { fprint_sys::fp_init() } as i32;

        if res == 0 {
            Ok(FPrint { _private: () })
        } else {
            Err(crate::FPrintError::InitError(res))
        }
    }

    /// Scans the system and returns a list of discovered devices. This is your entry point
    /// into finding a fingerprint reader to operate.
    pub fn discover(&self) -> crate::Result<DiscoveredDevices> {
        let devices_list = unsafe { fprint_sys::fp_discover_devs() };
        if devices_list.is_null() {
            return Err(crate::FPrintError::NullPtr(crate::NullPtrContext::Discovering));
        }

        Ok(DiscoveredDevices::with_devices(devices_list))
    }
}

impl Drop for FPrint {
    fn drop(&mut self) {
        unsafe {
            fprint_sys::fp_exit();
        }
    }
}
