use clap::Parser;
use fpcapture::mock::SimulatedDriver;
use fpcapture::{run_capture, CaptureArgs, CaptureConfig, CaptureReport, DriverKind};
use std::io::{self, Write};
use std::process;
use tracing::info;

#[cfg(feature = "libfprint")]
fn capture_with_libfprint<W: Write>(
    config: &CaptureConfig,
    out: &mut W,
) -> Result<CaptureReport, failure::Error> {
    let driver = fpcapture::LibfprintDriver::new()
        .map_err(|e| fpcapture::CaptureError::DeviceUnavailable(e.to_string()))?;

    Ok(run_capture(&driver, config, out)?)
}

#[cfg(not(feature = "libfprint"))]
fn capture_with_libfprint<W: Write>(
    _config: &CaptureConfig,
    _out: &mut W,
) -> Result<CaptureReport, failure::Error> {
    Err(fpcapture::CaptureError::DeviceUnavailable(
        "built without libfprint support, use `--driver simulated`".to_string(),
    )
    .into())
}

fn run(args: &CaptureArgs) -> Result<(), failure::Error> {
    let config = args.to_config()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let report = match args.driver {
        DriverKind::Libfprint => capture_with_libfprint(&config, &mut out)?,
        DriverKind::Simulated => {
            let driver = SimulatedDriver::new().with_geometry(config.geometry);
            run_capture(&driver, &config, &mut out)?
        }
    };
    info!(
        device = %report.device,
        attempts = report.attempts,
        wsq_bytes = report.wsq_len,
        "capture finished"
    );

    Ok(())
}

fn main() {
    fpcapture::init_tracing();
    let args = CaptureArgs::parse();

    if let Err(error) = run(&args) {
        eprintln!("{}", error);
        process::exit(1);
    }
}
