use crate::CaptureError;
use image::GrayImage;
use std::fmt;

/// Width of ZK-series sensor images.
pub const DEFAULT_WIDTH: u32 = 288;
/// Height of ZK-series sensor images.
pub const DEFAULT_HEIGHT: u32 = 375;

/// Smallest side the WSQ encoder accepts.
pub const MIN_SIDE: u32 = wsq::MIN_DIMENSION as u32;
/// Largest side a WSQ frame header can carry.
pub const MAX_SIDE: u32 = u16::MAX as u32;

const GEOMETRY_HINT: &str = "check --width and --height";

/// Dimensions of a single-channel 8-bit image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    width: u32,
    height: u32,
}

impl Geometry {
    /// Both sides must lie in `MIN_SIDE..=MAX_SIDE`, so every accepted
    /// geometry can be stored as WSQ.
    pub fn new(width: u32, height: u32) -> crate::Result<Self> {
        let valid = MIN_SIDE..=MAX_SIDE;
        if !valid.contains(&width) || !valid.contains(&height) {
            return Err(CaptureError::DecodeOrSave(format!(
                "invalid image geometry {}x{}, both sides must be within {}..={}",
                width, height, MIN_SIDE, MAX_SIDE
            )));
        }

        Ok(Geometry { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes one sample of this geometry occupies.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Raw bytes of one scan, as handed over by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSample {
    pub data: Vec<u8>,
    /// Image size reported by the device itself, when it knows it.
    pub geometry: Option<Geometry>,
}

impl RawSample {
    pub fn new(data: Vec<u8>) -> Self {
        RawSample {
            data,
            geometry: None,
        }
    }

    pub fn with_geometry(data: Vec<u8>, geometry: Geometry) -> Self {
        RawSample {
            data,
            geometry: Some(geometry),
        }
    }

    /// Interprets the bytes as a dense row-major grid of `geometry`.
    pub fn to_image(&self, geometry: Geometry) -> crate::Result<GrayImage> {
        if let Some(reported) = self.geometry {
            if reported != geometry {
                return Err(CaptureError::DecodeOrSave(format!(
                    "device reports {} images but {} is configured, {}",
                    reported, geometry, GEOMETRY_HINT
                )));
            }
        }
        if self.data.len() != geometry.len() {
            return Err(CaptureError::DecodeOrSave(format!(
                "sample holds {} bytes, {} needs {}, {}",
                self.data.len(),
                geometry,
                geometry.len(),
                GEOMETRY_HINT
            )));
        }

        GrayImage::from_raw(geometry.width, geometry.height, self.data.clone()).ok_or_else(|| {
            CaptureError::DecodeOrSave(format!("can not build {} image", geometry))
        })
    }
}
