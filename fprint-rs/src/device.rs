use crate::Driver;
use std::os::raw::c_int;

/// An open fingerprint reader, closed on drop.
#[derive(Debug)]
pub struct Device(*mut fprint_sys::fp_dev);

impl Device {
    pub fn new(device: *mut fprint_sys::fp_dev) -> Self {
        Device(device)
    }

    /// Get the `Driver` for a fingerprint device.
    pub fn get_driver(&self) -> Driver {
        let driver = unsafe { fprint_sys::fp_dev_get_driver(self.0) };

        Driver::new(driver)
    }

    /// Determines if a device has imaging capabilities. Not all devices are imaging
    /// devices, some do all processing in hardware.
    pub fn supports_imaging(&self) -> bool {
        let result = unsafe { fprint_sys::fp_dev_supports_imaging(self.0) };

        result != 0
    }

    /// Gets the expected width of images that will be captured from the device.
    pub fn get_img_width(&self) -> SizeVariant {
        unsafe { fprint_sys::fp_dev_get_img_width(self.0) }.into()
    }

    /// Gets the expected height of images that will be captured from the device.
    pub fn get_img_height(&self) -> SizeVariant {
        unsafe { fprint_sys::fp_dev_get_img_height(self.0) }.into()
    }

    /// Captures an image from a device. The returned image is the raw image provided
    /// by the device.
    ///
    /// If set, the `unconditional` flag indicates that the device should capture an image
    /// unconditionally, regardless of whether a finger is there or not. If unset, this function
    /// will block until a finger is detected on the sensor.
    pub fn capture_image(&self, unconditional: bool) -> crate::Result<Image> {
        let mut image: *mut fprint_sys::fp_img = std::ptr::null_mut();
        let result =
            unsafe { fprint_sys::fp_dev_img_capture(self.0, unconditional as c_int, &mut image) };

        match result {
            0 if image.is_null() => Err(crate::FPrintError::NullPtr(
                crate::NullPtrContext::CaptureImage,
            )),
            0 => Ok(Image(image)),
            _ if result == -libc::ENOTSUP => Err(crate::FPrintError::NotSupported(
                crate::NotSupportContext::CapturingImage,
            )),
            res => Err(crate::FPrintError::CaptureFailed(res)),
        }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        unsafe { fprint_sys::fp_dev_close(self.0) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeVariant {
    NonImagingDevice,
    Variable,
    Static(u32),
}

impl From<c_int> for SizeVariant {
    fn from(value: c_int) -> Self {
        match value {
            0 => SizeVariant::Variable,
            s if s > 0 => SizeVariant::Static(s as u32),
            _ => SizeVariant::NonImagingDevice,
        }
    }
}

/// A greyscale image captured by a device, freed on drop.
#[derive(Debug)]
pub struct Image(*mut fprint_sys::fp_img);

impl Image {
    /// Gets the pixel height of an image.
    pub fn get_height(&self) -> i32 {
        unsafe { fprint_sys::fp_img_get_height(self.0) }
    }

    /// Gets the pixel width of an image.
    pub fn get_width(&self) -> i32 {
        unsafe { fprint_sys::fp_img_get_width(self.0) }
    }

    /// Copies the row-major greyscale pixels out of libfprint's buffer.
    pub fn to_vec(&self) -> crate::Result<Vec<u8>> {
        let (width, height) = (self.get_width(), self.get_height());
        let data = unsafe { fprint_sys::fp_img_get_data(self.0) };
        if data.is_null() || width <= 0 || height <= 0 {
            return Err(crate::FPrintError::EmptyImage(width, height));
        }

        let len = width as usize * height as usize;
        let pixels = unsafe { std::slice::from_raw_parts(data as *const u8, len) };

        Ok(pixels.to_vec())
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        unsafe { fprint_sys::fp_img_free(self.0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_variants() {
        assert_eq!(SizeVariant::from(-1), SizeVariant::NonImagingDevice);
        assert_eq!(SizeVariant::from(0), SizeVariant::Variable);
        assert_eq!(SizeVariant::from(384), SizeVariant::Static(384));
    }
}
