use failure::Fail;

#[derive(Debug, Fail)]
pub enum WsqError {
    #[fail(display = "Image of {}x{} pixels can not be encoded", _0, _1)]
    InvalidDimensions(usize, usize),
    #[fail(display = "Expected {} pixels, got {}", _0, _1)]
    PixelCountMismatch(usize, usize),
    #[fail(display = "Bitrate must be a positive number, got {}", _0)]
    InvalidBitrate(f32),
    #[fail(display = "Stream ends unexpectedly")]
    Truncated,
    #[fail(display = "Expected marker {:#06X}, found {:#06X}", _0, _1)]
    UnexpectedMarker(u16, u16),
    #[fail(display = "Unknown marker {:#06X}", _0)]
    UnknownMarker(u16),
    #[fail(display = "Malformed {} table: {}", _0, _1)]
    InvalidTable(&'static str, String),
    #[fail(display = "Huffman table {} is not defined", _0)]
    MissingHuffmanTable(u8),
    #[fail(display = "Invalid Huffman code in entropy coded data")]
    InvalidHuffmanCode,
    #[fail(display = "Got {} quantized coefficients, expected {}", _0, _1)]
    CoefficientCount(usize, usize),
    #[fail(display = "{} segment is missing", _0)]
    MissingSegment(&'static str),
}
