//! Image codecs looked up by format, file extension or content.

use crate::CodecError;
use image::{GrayImage, ImageFormat};
use std::fmt;
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Wsq,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Wsq => "WSQ",
        };

        write!(f, "{}", name)
    }
}

pub trait ImageCodec {
    fn format(&self) -> OutputFormat;

    /// File extension without the leading dot.
    fn extension(&self) -> &'static str;

    fn encode(&self, image: &GrayImage) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<GrayImage, CodecError>;

    /// True if `bytes` look like this codec's format.
    fn sniff(&self, bytes: &[u8]) -> bool;
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Lossless PNG through the `image` crate.
#[derive(Debug, Clone, Default)]
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn extension(&self) -> &'static str {
        "png"
    }

    fn encode(&self, image: &GrayImage) -> Result<Vec<u8>, CodecError> {
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;

        Ok(buffer)
    }

    fn decode(&self, bytes: &[u8]) -> Result<GrayImage, CodecError> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;

        Ok(image.into_luma8())
    }

    fn sniff(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(&PNG_SIGNATURE)
    }
}

/// Lossy WSQ through the `wsq` crate.
#[derive(Debug, Clone, Default)]
pub struct WsqCodec {
    pub options: wsq::EncodeOptions,
}

impl WsqCodec {
    pub fn new(options: wsq::EncodeOptions) -> Self {
        WsqCodec { options }
    }
}

impl ImageCodec for WsqCodec {
    fn format(&self) -> OutputFormat {
        OutputFormat::Wsq
    }

    fn extension(&self) -> &'static str {
        "wsq"
    }

    fn encode(&self, image: &GrayImage) -> Result<Vec<u8>, CodecError> {
        let bytes = wsq::encode(
            image.as_raw(),
            image.width() as usize,
            image.height() as usize,
            &self.options,
        )?;

        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<GrayImage, CodecError> {
        let decoded = wsq::decode(bytes)?;
        let (width, height) = (decoded.width as u32, decoded.height as u32);
        let len = decoded.pixels.len();

        GrayImage::from_raw(width, height, decoded.pixels)
            .ok_or(CodecError::BufferSize(width, height, len))
    }

    fn sniff(&self, bytes: &[u8]) -> bool {
        wsq::is_wsq(bytes)
    }
}

/// The codecs available to the tools, tried in registration order.
pub struct CodecRegistry {
    codecs: Vec<Box<dyn ImageCodec>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        CodecRegistry { codecs: Vec::new() }
    }

    /// PNG and WSQ, the latter with the given encoder settings.
    pub fn standard(wsq_options: wsq::EncodeOptions) -> Self {
        let mut registry = Self::new();
        registry.register(PngCodec);
        registry.register(WsqCodec::new(wsq_options));

        registry
    }

    pub fn register(&mut self, codec: impl ImageCodec + 'static) {
        self.codecs.push(Box::new(codec));
    }

    pub fn by_format(&self, format: OutputFormat) -> Option<&dyn ImageCodec> {
        self.codecs
            .iter()
            .map(|codec| codec.as_ref())
            .find(|codec| codec.format() == format)
    }

    /// Case-insensitive; accepts the extension with or without its dot.
    pub fn by_extension(&self, extension: &str) -> Option<&dyn ImageCodec> {
        let extension = extension.trim_start_matches('.');

        self.codecs
            .iter()
            .map(|codec| codec.as_ref())
            .find(|codec| codec.extension().eq_ignore_ascii_case(extension))
    }

    /// Picks the codec by content, the way a generic image opener would.
    pub fn detect(&self, bytes: &[u8]) -> Result<&dyn ImageCodec, CodecError> {
        self.codecs
            .iter()
            .map(|codec| codec.as_ref())
            .find(|codec| codec.sniff(bytes))
            .ok_or(CodecError::UnknownFormat)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::standard(wsq::EncodeOptions::default())
    }
}
