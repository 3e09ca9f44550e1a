//! Wavelet Scalar Quantization (WSQ), the FBI gray-scale fingerprint image
//! compression.
//!
//! ```
//! let pixels: Vec<u8> = (0..64 * 64).map(|i| (i % 64) as u8 * 4).collect();
//! let bytes = wsq::encode(&pixels, 64, 64, &wsq::EncodeOptions::default())?;
//! assert!(wsq::is_wsq(&bytes));
//!
//! let image = wsq::decode(&bytes)?;
//! assert_eq!((image.width, image.height), (64, 64));
//! # Ok::<(), wsq::WsqError>(())
//! ```
#![warn(clippy::all)]

mod bits;
mod decoder;
mod encoder;
mod errors;
mod huffman;
mod markers;
mod quant;
mod tables;
mod transform;
mod tree;

pub use crate::{
    decoder::{decode, read_header, WsqImage},
    encoder::{encode, EncodeOptions, DEFAULT_BITRATE, MIN_DIMENSION},
    errors::*,
    tables::FrameHeader,
};

pub type Result<T> = std::result::Result<T, WsqError>;

/// True if `bytes` start with the WSQ start-of-image marker.
pub fn is_wsq(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && u16::from_be_bytes([bytes[0], bytes[1]]) == markers::SOI
}
