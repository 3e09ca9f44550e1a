use crate::RawSample;

/// Access to the scanners attached to the machine.
pub trait Driver {
    type Device: Scanner;

    /// Number of scanners currently attached.
    fn device_count(&self) -> usize;

    /// Opens scanner `index`. The scanner is released when the returned
    /// value is dropped.
    fn open(&self, index: usize) -> Result<Self::Device, failure::Error>;
}

/// An open scanner.
pub trait Scanner {
    fn name(&self) -> String;

    /// Polls the scanner once. `Ok(None)` means no finger was read yet.
    fn acquire(&mut self) -> Result<Option<RawSample>, failure::Error>;
}
