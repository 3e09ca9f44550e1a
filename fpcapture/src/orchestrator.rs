use crate::scanner::{Driver, Scanner};
use crate::{payload, CaptureConfig, CaptureError, CodecRegistry, OutputFormat, RawSample};
use chrono::{DateTime, Local};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, info, warn};

/// Files written for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSample {
    pub png_path: PathBuf,
    pub wsq_path: PathBuf,
    pub wsq_len: usize,
}

/// What a successful capture left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReport {
    pub device: String,
    pub png_path: PathBuf,
    pub wsq_path: PathBuf,
    pub wsq_len: usize,
    /// Polls it took to get the sample.
    pub attempts: usize,
}

/// `fingerprint_<YYYYMMDD_HHMMSS>` for the given local time.
pub fn basename(now: DateTime<Local>) -> String {
    format!("fingerprint_{}", now.format("%Y%m%d_%H%M%S"))
}

fn report_line<W: Write>(out: &mut W, line: &str) -> crate::Result<()> {
    writeln!(out, "{}", line)
        .and_then(|_| out.flush())
        .map_err(|e| CaptureError::Unclassified(format!("can not write to output: {}", e)))
}

fn write_file(path: &Path, bytes: &[u8]) -> crate::Result<()> {
    fs::write(path, bytes)
        .map_err(|e| CaptureError::DecodeOrSave(format!("can not write {}: {}", path.display(), e)))
}

fn encode(
    registry: &CodecRegistry,
    format: OutputFormat,
    image: &image::GrayImage,
) -> crate::Result<(Vec<u8>, &'static str)> {
    let codec = registry
        .by_format(format)
        .ok_or_else(|| CaptureError::DecodeOrSave(format!("no {} codec registered", format)))?;
    let bytes = codec
        .encode(image)
        .map_err(|e| CaptureError::DecodeOrSave(e.to_string()))?;

    Ok((bytes, codec.extension()))
}

/// Turns one sample into the PNG and WSQ files and the marker line. Nothing
/// is written unless both images could be encoded, and the PNG is removed
/// again if the WSQ file can not be written.
pub fn process_sample<W: Write>(
    sample: &RawSample,
    config: &CaptureConfig,
    registry: &CodecRegistry,
    now: DateTime<Local>,
    out: &mut W,
) -> crate::Result<StoredSample> {
    // Samples are single-channel 8-bit already, so this is the gray image.
    let image = sample.to_image(config.geometry)?;
    let basename = basename(now);

    let (png, png_extension) = encode(registry, OutputFormat::Png, &image)?;
    let (wsq, wsq_extension) = encode(registry, OutputFormat::Wsq, &image)?;
    debug!(png = png.len(), wsq = wsq.len(), "images encoded");

    let png_path = config
        .output_dir
        .join(format!("{}.{}", basename, png_extension));
    write_file(&png_path, &png)?;
    report_line(out, &format!("PNG Image saved: {}", png_path.display()))?;

    let wsq_path = config
        .output_dir
        .join(format!("{}.{}", basename, wsq_extension));
    if let Err(error) = write_file(&wsq_path, &wsq) {
        if let Err(e) = fs::remove_file(&png_path) {
            warn!(path = %png_path.display(), error = %e, "can not remove orphaned PNG");
        }
        return Err(error);
    }
    report_line(out, &format!("WSQ Image saved: {}", wsq_path.display()))?;

    report_line(out, &payload::marker_line(&wsq))?;

    Ok(StoredSample {
        png_path,
        wsq_path,
        wsq_len: wsq.len(),
    })
}

fn poll<S: Scanner, W: Write>(
    scanner: &mut S,
    config: &CaptureConfig,
    out: &mut W,
) -> crate::Result<CaptureReport> {
    fs::create_dir_all(&config.output_dir).map_err(|e| {
        CaptureError::DecodeOrSave(format!(
            "can not create {}: {}",
            config.output_dir.display(),
            e
        ))
    })?;

    let registry = CodecRegistry::standard(config.wsq.clone());
    report_line(out, "Place your finger on the scanner...")?;

    let mut attempts = 0;
    loop {
        attempts += 1;
        match scanner.acquire() {
            Ok(None) => thread::sleep(config.poll_interval),
            Ok(Some(sample)) => {
                debug!(attempts, bytes = sample.data.len(), "sample acquired");
                let stored = process_sample(&sample, config, &registry, Local::now(), out)?;

                return Ok(CaptureReport {
                    device: scanner.name(),
                    png_path: stored.png_path,
                    wsq_path: stored.wsq_path,
                    wsq_len: stored.wsq_len,
                    attempts,
                });
            }
            Err(error) => {
                warn!(attempts, %error, "acquiring sample failed");
                return Err(CaptureError::Unclassified(error.to_string()));
            }
        }
    }
}

/// Opens scanner `config.device_index`, waits for one sample and stores it.
/// The scanner is released before this returns, whatever the outcome.
pub fn run_capture<D: Driver, W: Write>(
    driver: &D,
    config: &CaptureConfig,
    out: &mut W,
) -> crate::Result<CaptureReport> {
    let count = driver.device_count();
    if count == 0 {
        return Err(CaptureError::DeviceUnavailable(
            "No fingerprint device found.".to_string(),
        ));
    }

    let mut scanner = driver.open(config.device_index).map_err(|e| {
        CaptureError::DeviceUnavailable(format!(
            "can not open device {} of {}: {}",
            config.device_index, count, e
        ))
    })?;
    info!(device = %scanner.name(), index = config.device_index, "scanner opened");

    let result = poll(&mut scanner, config, out);
    drop(scanner);
    let terminated = report_line(out, "Device terminated.");

    let report = result?;
    terminated?;

    Ok(report)
}
