use clap::Parser;
use fpcapture::{run_display, DisplayArgs};
use std::process;
use tracing::info;

fn main() {
    fpcapture::init_tracing();
    let args = DisplayArgs::parse();

    match run_display(&args.input, &args.output, !args.no_show) {
        Ok(report) => {
            info!(preview = %report.preview.display(), "preview written");
            println!(
                "{} image {}x{} saved: {}",
                report.format,
                report.width,
                report.height,
                report.output.display()
            );
        }
        Err(error) => {
            eprintln!("Error: {}", error);
            process::exit(1);
        }
    }
}
