use crate::Geometry;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OUTPUT_DIR: &str = "fingerprints";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);
pub const DEFAULT_PPI: u32 = 500;

/// Settings of one capture run.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    pub device_index: usize,
    pub output_dir: PathBuf,
    /// Size every sample must have.
    pub geometry: Geometry,
    /// Pause between polls that found no finger.
    pub poll_interval: Duration,
    pub wsq: wsq::EncodeOptions,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            device_index: 0,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            geometry: Geometry::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            wsq: wsq::EncodeOptions {
                ppi: Some(DEFAULT_PPI),
                ..wsq::EncodeOptions::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DriverKind {
    /// Scanners supported by the system libfprint
    Libfprint,
    /// Synthetic scanner producing a ridge pattern
    Simulated,
}

impl Default for DriverKind {
    fn default() -> Self {
        if cfg!(feature = "libfprint") {
            DriverKind::Libfprint
        } else {
            DriverKind::Simulated
        }
    }
}

/// Capture one fingerprint and store it as PNG and WSQ.
///
/// The WSQ bytes are also printed as base64 on a single line starting with
/// `FINGERPRINT_WSQ_B64:`.
#[derive(Debug, Parser)]
#[command(name = "fpcapture", version)]
pub struct CaptureArgs {
    /// Scanner backend
    #[arg(long, value_enum, env = "FPCAPTURE_DRIVER", default_value_t)]
    pub driver: DriverKind,

    /// Index of the scanner to open
    #[arg(long, env = "FPCAPTURE_DEVICE_INDEX", default_value_t = 0)]
    pub device_index: usize,

    /// Directory the images are written to
    #[arg(long, env = "FPCAPTURE_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Image width in pixels
    #[arg(long, env = "FPCAPTURE_WIDTH", default_value_t = crate::DEFAULT_WIDTH)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, env = "FPCAPTURE_HEIGHT", default_value_t = crate::DEFAULT_HEIGHT)]
    pub height: u32,

    /// Milliseconds to wait between polls
    #[arg(long, env = "FPCAPTURE_POLL_INTERVAL_MS", default_value_t = 200)]
    pub poll_interval_ms: u64,

    /// WSQ target bitrate in bits per pixel
    #[arg(long, env = "FPCAPTURE_WSQ_BITRATE", default_value_t = wsq::DEFAULT_BITRATE)]
    pub wsq_bitrate: f32,

    /// Scan resolution recorded in the WSQ file
    #[arg(long, env = "FPCAPTURE_PPI", default_value_t = DEFAULT_PPI)]
    pub ppi: u32,
}

impl CaptureArgs {
    pub fn to_config(&self) -> crate::Result<CaptureConfig> {
        Ok(CaptureConfig {
            device_index: self.device_index,
            output_dir: self.output_dir.clone(),
            geometry: Geometry::new(self.width, self.height)?,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            wsq: wsq::EncodeOptions {
                bitrate: self.wsq_bitrate,
                ppi: Some(self.ppi),
                comment: None,
            },
        })
    }
}

/// Decode a base64 WSQ payload, write it to a file and show it.
#[derive(Debug, Parser)]
#[command(name = "fpshow", version)]
pub struct DisplayArgs {
    /// Text file holding the base64 payload
    #[arg(long, env = "FPSHOW_INPUT", default_value = "image_base64.txt")]
    pub input: PathBuf,

    /// Where the decoded bytes are written
    #[arg(long, env = "FPSHOW_OUTPUT", default_value = "output.wsq")]
    pub output: PathBuf,

    /// Only write the files, do not open a viewer
    #[arg(long)]
    pub no_show: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_capture_config() {
        let args = CaptureArgs::try_parse_from(&["fpcapture"]).unwrap();
        let config = args.to_config().unwrap();

        assert_eq!(config, CaptureConfig::default());
        assert_eq!(args.driver, DriverKind::default());
    }

    #[test]
    fn flags_override_defaults() {
        let args = CaptureArgs::try_parse_from(&[
            "fpcapture",
            "--driver",
            "simulated",
            "--width",
            "256",
            "--height",
            "360",
            "--poll-interval-ms",
            "5",
            "--output-dir",
            "/tmp/prints",
        ])
        .unwrap();
        let config = args.to_config().unwrap();

        assert_eq!(args.driver, DriverKind::Simulated);
        assert_eq!(config.geometry, Geometry::new(256, 360).unwrap());
        assert_eq!(config.poll_interval, Duration::from_millis(5));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/prints"));
    }

    #[test]
    fn zero_width_is_rejected() {
        let args = CaptureArgs::try_parse_from(&["fpcapture", "--width", "0"]).unwrap();
        assert!(args.to_config().is_err());
    }

    #[test]
    fn width_below_wsq_minimum_is_rejected() {
        let args = CaptureArgs::try_parse_from(&["fpcapture", "--width", "16"]).unwrap();
        assert!(args.to_config().is_err());
    }

    #[test]
    fn display_defaults() {
        let args = DisplayArgs::try_parse_from(&["fpshow", "--no-show"]).unwrap();

        assert_eq!(args.input, PathBuf::from("image_base64.txt"));
        assert_eq!(args.output, PathBuf::from("output.wsq"));
        assert!(args.no_show);
    }
}
