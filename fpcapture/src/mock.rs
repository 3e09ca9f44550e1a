//! Simulated scanner for running without hardware.

use crate::scanner::{Driver, Scanner};
use crate::{Geometry, RawSample};
use failure::Fail;
use std::cell::Cell;
use std::rc::Rc;
use tracing::debug;

/// Synthetic image content produced by the simulated scanner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplePattern {
    /// Concentric ridges around the image centre.
    Ridges,
    /// Left to right gradient.
    Gradient,
    Solid(u8),
}

impl SamplePattern {
    pub fn render(self, geometry: Geometry) -> Vec<u8> {
        let (width, height) = (geometry.width() as usize, geometry.height() as usize);
        let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
        let mut data = Vec::with_capacity(geometry.len());

        for y in 0..height {
            for x in 0..width {
                let value = match self {
                    SamplePattern::Ridges => {
                        let r = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
                        128.0 + 100.0 * (r / 2.5).sin()
                    }
                    SamplePattern::Gradient => x as f64 * 255.0 / (width.max(2) - 1) as f64,
                    SamplePattern::Solid(level) => f64::from(level),
                };
                data.push(value.max(0.0).min(255.0) as u8);
            }
        }

        data
    }
}

#[derive(Debug, Fail)]
#[fail(display = "Simulated scanner failure")]
pub struct SimulatedFailure;

/// Open and release counters shared between a driver and its scanners.
#[derive(Debug, Default)]
pub struct DeviceStats {
    opened: Cell<usize>,
    released: Cell<usize>,
    polls: Cell<usize>,
}

impl DeviceStats {
    pub fn opened(&self) -> usize {
        self.opened.get()
    }

    pub fn released(&self) -> usize {
        self.released.get()
    }

    /// Calls to `acquire` over all scanners.
    pub fn polls(&self) -> usize {
        self.polls.get()
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedDriver {
    devices: usize,
    empty_polls: usize,
    geometry: Geometry,
    reported_geometry: Option<Geometry>,
    sample_len: Option<usize>,
    pattern: SamplePattern,
    fail_acquire: bool,
    stats: Rc<DeviceStats>,
}

impl Default for SimulatedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDriver {
    /// One scanner producing a ridge image of the default geometry on the
    /// first poll.
    pub fn new() -> Self {
        SimulatedDriver {
            devices: 1,
            empty_polls: 0,
            geometry: Geometry::default(),
            reported_geometry: None,
            sample_len: None,
            pattern: SamplePattern::Ridges,
            fail_acquire: false,
            stats: Rc::new(DeviceStats::default()),
        }
    }

    pub fn with_devices(mut self, devices: usize) -> Self {
        self.devices = devices;
        self
    }

    /// Number of polls that find no finger before a sample is produced.
    pub fn with_empty_polls(mut self, empty_polls: usize) -> Self {
        self.empty_polls = empty_polls;
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Geometry the scanner claims for its samples.
    pub fn with_reported_geometry(mut self, geometry: Geometry) -> Self {
        self.reported_geometry = Some(geometry);
        self
    }

    /// Truncates or pads samples to `len` bytes.
    pub fn with_sample_len(mut self, len: usize) -> Self {
        self.sample_len = Some(len);
        self
    }

    pub fn with_pattern(mut self, pattern: SamplePattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Makes the first poll after the empty ones fail.
    pub fn failing(mut self) -> Self {
        self.fail_acquire = true;
        self
    }

    pub fn stats(&self) -> Rc<DeviceStats> {
        Rc::clone(&self.stats)
    }
}

impl Driver for SimulatedDriver {
    type Device = SimulatedScanner;

    fn device_count(&self) -> usize {
        self.devices
    }

    fn open(&self, index: usize) -> Result<SimulatedScanner, failure::Error> {
        if index >= self.devices {
            return Err(failure::format_err!(
                "no scanner with index {} ({} attached)",
                index,
                self.devices
            ));
        }

        self.stats.opened.set(self.stats.opened.get() + 1);
        debug!(index, "simulated scanner opened");

        let mut data = self.pattern.render(self.geometry);
        if let Some(len) = self.sample_len {
            data.resize(len, 0);
        }

        Ok(SimulatedScanner {
            index,
            remaining_empty: self.empty_polls,
            fail: self.fail_acquire,
            sample: RawSample {
                data,
                geometry: self.reported_geometry,
            },
            stats: Rc::clone(&self.stats),
        })
    }
}

#[derive(Debug)]
pub struct SimulatedScanner {
    index: usize,
    remaining_empty: usize,
    fail: bool,
    sample: RawSample,
    stats: Rc<DeviceStats>,
}

impl Scanner for SimulatedScanner {
    fn name(&self) -> String {
        format!("Simulated scanner #{}", self.index)
    }

    fn acquire(&mut self) -> Result<Option<RawSample>, failure::Error> {
        self.stats.polls.set(self.stats.polls.get() + 1);

        if self.remaining_empty > 0 {
            self.remaining_empty -= 1;
            return Ok(None);
        }
        if self.fail {
            return Err(SimulatedFailure.into());
        }

        Ok(Some(self.sample.clone()))
    }
}

impl Drop for SimulatedScanner {
    fn drop(&mut self) {
        self.stats.released.set(self.stats.released.get() + 1);
        debug!(index = self.index, "simulated scanner released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_polls_come_first() {
        let driver = SimulatedDriver::new().with_empty_polls(2);
        let mut scanner = driver.open(0).unwrap();

        assert!(scanner.acquire().unwrap().is_none());
        assert!(scanner.acquire().unwrap().is_none());
        let sample = scanner.acquire().unwrap().unwrap();
        assert_eq!(sample.data.len(), Geometry::default().len());
        assert_eq!(driver.stats().polls(), 3);
    }

    #[test]
    fn drop_releases_the_scanner() {
        let driver = SimulatedDriver::new();
        let stats = driver.stats();
        {
            let _scanner = driver.open(0).unwrap();
            assert_eq!((stats.opened(), stats.released()), (1, 0));
        }
        assert_eq!((stats.opened(), stats.released()), (1, 1));
    }

    #[test]
    fn unknown_index_does_not_open() {
        let driver = SimulatedDriver::new().with_devices(1);

        assert!(driver.open(1).is_err());
        assert_eq!(driver.stats().opened(), 0);
    }

    #[test]
    fn patterns_stay_in_range() {
        let geometry = Geometry::new(40, 32).unwrap();

        assert!(SamplePattern::Solid(9).render(geometry).iter().all(|&p| p == 9));
        let gradient = SamplePattern::Gradient.render(geometry);
        assert_eq!((gradient[0], gradient[39]), (0, 255));
    }
}
