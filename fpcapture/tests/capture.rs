use fpcapture::mock::SimulatedDriver;
use chrono::{Local, TimeZone};
use fpcapture::{
    basename, decode_payload, extract_marker_payload, process_sample, run_capture, CaptureConfig,
    CaptureError, CodecRegistry, Geometry, RawSample, MARKER,
};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn geometry() -> Geometry {
    Geometry::new(96, 128).unwrap()
}

fn config(dir: &Path) -> CaptureConfig {
    CaptureConfig {
        output_dir: dir.join("fingerprints"),
        geometry: geometry(),
        poll_interval: Duration::from_millis(1),
        ..CaptureConfig::default()
    }
}

fn files_with_extension(dir: &Path, extension: &str) -> Vec<std::path::PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }
    fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |e| e == extension))
        .collect()
}

#[test]
fn empty_polls_then_one_capture() {
    let tmp = tempdir().unwrap();
    let config = config(tmp.path());
    let driver = SimulatedDriver::new()
        .with_geometry(geometry())
        .with_empty_polls(3);
    let stats = driver.stats();
    let mut out = Vec::new();

    let report = run_capture(&driver, &config, &mut out).unwrap();

    assert_eq!(report.attempts, 4);
    assert_eq!(stats.polls(), 4);
    assert_eq!(files_with_extension(&config.output_dir, "png"), vec![report.png_path.clone()]);
    assert_eq!(files_with_extension(&config.output_dir, "wsq"), vec![report.wsq_path.clone()]);

    let name = report.png_path.file_stem().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("fingerprint_"));
    assert_eq!(name.len(), "fingerprint_YYYYMMDD_HHMMSS".len());
    assert_eq!(report.wsq_path.file_stem(), report.png_path.file_stem());
}

#[test]
fn marker_line_carries_the_wsq_file() {
    let tmp = tempdir().unwrap();
    let config = config(tmp.path());
    let driver = SimulatedDriver::new().with_geometry(geometry());
    let mut out = Vec::new();

    let report = run_capture(&driver, &config, &mut out).unwrap();
    let transcript = String::from_utf8(out).unwrap();

    assert_eq!(transcript.lines().filter(|l| l.starts_with(MARKER)).count(), 1);
    let payload = extract_marker_payload(&transcript).unwrap();
    let wsq = fs::read(&report.wsq_path).unwrap();
    assert_eq!(decode_payload(payload).unwrap(), wsq);
    assert_eq!(report.wsq_len, wsq.len());

    let lines: Vec<&str> = transcript.lines().collect();
    assert_eq!(lines.first(), Some(&"Place your finger on the scanner..."));
    assert!(lines[1].starts_with("PNG Image saved: "));
    assert!(lines[2].starts_with("WSQ Image saved: "));
    assert_eq!(lines.last(), Some(&"Device terminated."));
}

#[test]
fn png_output_is_lossless() {
    let tmp = tempdir().unwrap();
    let config = config(tmp.path());
    let driver = SimulatedDriver::new().with_geometry(geometry());
    let expected = fpcapture::mock::SamplePattern::Ridges.render(geometry());

    let report = run_capture(&driver, &config, &mut Vec::new()).unwrap();
    let png = image::open(&report.png_path).unwrap().into_luma8();

    assert_eq!(png.dimensions(), (96, 128));
    assert_eq!(png.into_raw(), expected);
}

#[test]
fn wsq_output_decodes_to_the_configured_geometry() {
    let tmp = tempdir().unwrap();
    let config = config(tmp.path());
    let driver = SimulatedDriver::new().with_geometry(geometry());

    let report = run_capture(&driver, &config, &mut Vec::new()).unwrap();
    let image = wsq::decode(&fs::read(&report.wsq_path).unwrap()).unwrap();

    assert_eq!((image.width, image.height), (96, 128));
    assert_eq!(image.ppi, Some(500));
}

#[test]
fn no_device_means_no_polling_and_no_files() {
    let tmp = tempdir().unwrap();
    let config = config(tmp.path());
    let driver = SimulatedDriver::new().with_devices(0);
    let stats = driver.stats();
    let mut out = Vec::new();

    match run_capture(&driver, &config, &mut out) {
        Err(CaptureError::DeviceUnavailable(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!((stats.opened(), stats.polls()), (0, 0));
    assert!(!config.output_dir.exists());
    assert!(out.is_empty());
}

#[test]
fn out_of_range_index_is_unavailable() {
    let tmp = tempdir().unwrap();
    let config = CaptureConfig {
        device_index: 2,
        ..config(tmp.path())
    };
    let driver = SimulatedDriver::new().with_devices(2);
    let stats = driver.stats();

    match run_capture(&driver, &config, &mut Vec::new()) {
        Err(CaptureError::DeviceUnavailable(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(stats.polls(), 0);
    assert!(!config.output_dir.exists());
}

#[test]
fn length_mismatch_writes_nothing_and_releases_once() {
    let tmp = tempdir().unwrap();
    let config = config(tmp.path());
    let driver = SimulatedDriver::new()
        .with_geometry(geometry())
        .with_sample_len(geometry().len() - 1)
        .with_empty_polls(1);
    let stats = driver.stats();
    let mut out = Vec::new();

    match run_capture(&driver, &config, &mut out) {
        Err(CaptureError::DecodeOrSave(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    // polling is not resumed after the failure
    assert_eq!(stats.polls(), 2);
    assert_eq!((stats.opened(), stats.released()), (1, 1));
    assert!(files_with_extension(&config.output_dir, "png").is_empty());
    assert!(files_with_extension(&config.output_dir, "wsq").is_empty());
    assert!(!String::from_utf8(out).unwrap().contains(MARKER));
}

#[test]
fn reported_geometry_mismatch_is_a_decode_error() {
    let tmp = tempdir().unwrap();
    let config = config(tmp.path());
    let driver = SimulatedDriver::new()
        .with_geometry(geometry())
        .with_reported_geometry(Geometry::new(128, 96).unwrap());
    let stats = driver.stats();

    match run_capture(&driver, &config, &mut Vec::new()) {
        Err(CaptureError::DecodeOrSave(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(stats.released(), 1);
    assert!(files_with_extension(&config.output_dir, "png").is_empty());
}

#[test]
fn acquire_failure_is_unclassified_and_releases_once() {
    let tmp = tempdir().unwrap();
    let config = config(tmp.path());
    let driver = SimulatedDriver::new().with_empty_polls(2).failing();
    let stats = driver.stats();
    let mut out = Vec::new();

    match run_capture(&driver, &config, &mut out) {
        Err(CaptureError::Unclassified(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(stats.polls(), 3);
    assert_eq!((stats.opened(), stats.released()), (1, 1));
    assert!(String::from_utf8(out).unwrap().ends_with("Device terminated.\n"));
}

#[test]
fn success_releases_once() {
    let tmp = tempdir().unwrap();
    let config = config(tmp.path());
    let driver = SimulatedDriver::new().with_geometry(geometry());
    let stats = driver.stats();

    run_capture(&driver, &config, &mut Vec::new()).unwrap();

    assert_eq!((stats.opened(), stats.released()), (1, 1));
}

#[test]
fn failed_wsq_write_leaves_no_png() {
    let tmp = tempdir().unwrap();
    let config = config(tmp.path());
    let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap();
    // a directory in place of the WSQ file makes the write fail
    let blocked = config.output_dir.join(format!("{}.wsq", basename(now)));
    fs::create_dir_all(&blocked).unwrap();
    let sample = RawSample::new(fpcapture::mock::SamplePattern::Ridges.render(geometry()));
    let mut out = Vec::new();

    let result = process_sample(&sample, &config, &CodecRegistry::default(), now, &mut out);

    match result {
        Err(CaptureError::DecodeOrSave(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(files_with_extension(&config.output_dir, "png").is_empty());
    assert!(!String::from_utf8(out).unwrap().contains(MARKER));
}

#[test]
fn stored_sample_names_both_files() {
    let tmp = tempdir().unwrap();
    let config = config(tmp.path());
    fs::create_dir_all(&config.output_dir).unwrap();
    let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap();
    let sample = RawSample::new(fpcapture::mock::SamplePattern::Gradient.render(geometry()));

    let stored =
        process_sample(&sample, &config, &CodecRegistry::default(), now, &mut Vec::new()).unwrap();

    assert_eq!(stored.png_path, config.output_dir.join("fingerprint_20240309_070502.png"));
    assert_eq!(stored.wsq_path, config.output_dir.join("fingerprint_20240309_070502.wsq"));
    assert_eq!(stored.wsq_len, fs::read(&stored.wsq_path).unwrap().len());
}
