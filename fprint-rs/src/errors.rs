use failure::Fail;

#[derive(Debug, Fail)]
pub enum FPrintError {
    #[fail(display = "Fail on init. FPrint error code: {}", _0)]
    InitError(i32),
    #[fail(display = "Null ptr found: {}", _0)]
    NullPtr(NullPtrContext),
    #[fail(display = "No discovered device with index {}", _0)]
    NoDevice(usize),
    #[fail(display = "Not supported: {}", _0)]
    NotSupported(NotSupportContext),
    #[fail(display = "Capturing image failed. Error code: {}", _0)]
    CaptureFailed(i32),
    #[fail(display = "Image of {}x{} pixels has no data", _0, _1)]
    EmptyImage(i32, i32),
}

#[derive(Debug, Fail)]
pub enum NullPtrContext {
    #[fail(display = "on discovering devices")]
    Discovering,
    #[fail(display = "on opening device")]
    OpenDevice,
    #[fail(display = "on capturing image")]
    CaptureImage,
}

#[derive(Debug, Fail)]
pub enum NotSupportContext {
    #[fail(
        display = "either the unconditional flag was set but the device does not support this, or that the device does not support imaging"
    )]
    CapturingImage,
}
