#![warn(clippy::all)]

mod codec;
mod config;
mod display;
mod errors;
#[cfg(feature = "libfprint")]
mod libfprint;
pub mod mock;
mod orchestrator;
mod payload;
mod sample;
mod scanner;

#[cfg(feature = "libfprint")]
pub use crate::libfprint::*;
pub use crate::{
    codec::*, config::*, display::*, errors::*, orchestrator::*, payload::*, sample::*,
    scanner::*,
};

pub type Result<T> = std::result::Result<T, CaptureError>;

/// Diagnostics go to stderr so stdout only carries the tool's own output.
/// `RUST_LOG` overrides the default `fpcapture=info`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fpcapture=info,fpshow=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
