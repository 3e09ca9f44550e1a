use std::ffi::CStr;

/// Internally, libfprint is abstracted into various drivers to communicate with the different types
/// of supported fingerprint readers.
#[derive(Debug)]
pub struct Driver(*mut fprint_sys::fp_driver);

impl Driver {
    pub fn new(driver: *mut fprint_sys::fp_driver) -> Self {
        Driver(driver)
    }

    /// Retrieves the name of the driver. For example: "upekts"
    pub fn get_name(&self) -> String {
        unsafe { Self::c_string(fprint_sys::fp_driver_get_name(self.0)) }
    }

    /// Retrieves a descriptive name of the driver. For example: "UPEK TouchStrip"
    pub fn get_full_name(&self) -> String {
        unsafe { Self::c_string(fprint_sys::fp_driver_get_full_name(self.0)) }
    }

    unsafe fn c_string(name: *const std::os::raw::c_char) -> String {
        if name.is_null() {
            String::new()
        } else {
            CStr::from_ptr(name).to_string_lossy().into_owned()
        }
    }
}
