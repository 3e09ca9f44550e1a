use failure::Fail;

/// Failures of a capture run, one variant per way the run can end early.
#[derive(Debug, Fail)]
pub enum CaptureError {
    #[fail(display = "Fingerprint device unavailable: {}", _0)]
    DeviceUnavailable(String),
    #[fail(display = "Error processing/saving image: {}", _0)]
    DecodeOrSave(String),
    #[fail(display = "Error: {}", _0)]
    Unclassified(String),
}

#[derive(Debug, Fail)]
pub enum CodecError {
    #[fail(display = "PNG codec failed: {}", _0)]
    Image(#[cause] image::ImageError),
    #[fail(display = "WSQ codec failed: {}", _0)]
    Wsq(#[cause] wsq::WsqError),
    #[fail(display = "{}x{} pixels can not hold {} bytes", _0, _1, _2)]
    BufferSize(u32, u32, usize),
    #[fail(display = "Unrecognized image format")]
    UnknownFormat,
}

impl From<image::ImageError> for CodecError {
    fn from(error: image::ImageError) -> Self {
        CodecError::Image(error)
    }
}

impl From<wsq::WsqError> for CodecError {
    fn from(error: wsq::WsqError) -> Self {
        CodecError::Wsq(error)
    }
}

#[derive(Debug, Fail)]
pub enum DisplayError {
    #[fail(display = "Payload is not valid base64: {}", _0)]
    InvalidPayload(#[cause] base64::DecodeError),
    #[fail(display = "Can not access `{}`: {}", _0, _1)]
    Io(String, #[cause] std::io::Error),
    #[fail(display = "{}", _0)]
    Codec(#[cause] CodecError),
    #[fail(display = "Can not open image viewer: {}", _0)]
    Viewer(#[cause] std::io::Error),
}

impl From<CodecError> for DisplayError {
    fn from(error: CodecError) -> Self {
        DisplayError::Codec(error)
    }
}
