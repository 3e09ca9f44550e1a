use crate::{Device, Driver};

/// A fingerprint reader found by `FPrint::discover`. Discovered devices may no longer be
/// available at the time you open them, for example the user may have unplugged the device.
#[derive(Debug)]
pub struct DiscoveredDev<'a> {
    inner: *mut fprint_sys::fp_dscv_dev,
    _list: std::marker::PhantomData<&'a DiscoveredDevices>,
}

impl<'a> DiscoveredDev<'a> {
    /// Gets the `Driver` for a discovered device.
    pub fn get_driver(&self) -> Driver {
        let driver = unsafe { fprint_sys::fp_dscv_dev_get_driver(self.inner) };

        Driver::new(driver)
    }

    /// Opens and initialises a device. The device stays usable after the discovered
    /// device list is dropped.
    pub fn open(&self) -> crate::Result<Device> {
        let device = unsafe { fprint_sys::fp_dev_open(self.inner) };
        if device.is_null() {
            return Err(crate::FPrintError::NullPtr(crate::NullPtrContext::OpenDevice));
        }

        Ok(Device::new(device))
    }
}

/// Null-terminated device list owned by libfprint.
#[derive(Debug)]
pub struct DiscoveredDevices {
    inner: *mut *mut fprint_sys::fp_dscv_dev,
    count: usize,
}

impl DiscoveredDevices {
    pub fn with_devices(devices: *mut *mut fprint_sys::fp_dscv_dev) -> Self {
        let mut count = 0;
        if !devices.is_null() {
            while !unsafe { devices.add(count).read() }.is_null() {
                count += 1;
            }
        }

        DiscoveredDevices {
            inner: devices,
            count,
        }
    }

    pub fn get(&self, index: usize) -> Option<DiscoveredDev> {
        if index >= self.count {
            return None;
        }

        let device = unsafe { self.inner.add(index).read() };

        Some(DiscoveredDev {
            inner: device,
            _list: std::marker::PhantomData,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = DiscoveredDev> + '_ {
        (0..self.count).filter_map(move |index| self.get(index))
    }
}

impl Drop for DiscoveredDevices {
    fn drop(&mut self) {
        // fp_dscv_devs_free simply returns if the list is null.
        unsafe { fprint_sys::fp_dscv_devs_free(self.inner) };
    }
}
