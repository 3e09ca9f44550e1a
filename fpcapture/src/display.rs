use crate::{decode_payload, CodecError, CodecRegistry, DisplayError, OutputFormat};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayReport {
    /// Format detected from the decoded bytes.
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub output: PathBuf,
    /// PNG rendering handed to the image viewer.
    pub preview: PathBuf,
}

/// `output.wsq` becomes `output.preview.png`.
pub fn preview_path(output: &Path) -> PathBuf {
    output.with_extension("preview.png")
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> DisplayError + '_ {
    move |error| DisplayError::Io(path.display().to_string(), error)
}

/// Decodes the base64 text in `input`, writes the bytes verbatim to `output`,
/// reopens that file by content and renders it. With `show` the rendering is
/// opened in the system image viewer.
pub fn run_display(input: &Path, output: &Path, show: bool) -> Result<DisplayReport, DisplayError> {
    let text = fs::read_to_string(input).map_err(io_error(input))?;
    let bytes = decode_payload(&text)?;
    fs::write(output, &bytes).map_err(io_error(output))?;
    debug!(bytes = bytes.len(), path = %output.display(), "payload written");

    let registry = CodecRegistry::default();
    let written = fs::read(output).map_err(io_error(output))?;
    let codec = registry.detect(&written)?;
    let image = codec.decode(&written)?;
    info!(format = %codec.format(), width = image.width(), height = image.height(), "image decoded");

    let png = registry
        .by_format(OutputFormat::Png)
        .ok_or(CodecError::UnknownFormat)?
        .encode(&image)?;
    let preview = preview_path(output);
    fs::write(&preview, png).map_err(io_error(&preview))?;

    if show {
        open::that(&preview).map_err(DisplayError::Viewer)?;
    }

    Ok(DisplayReport {
        format: codec.format(),
        width: image.width(),
        height: image.height(),
        output: output.to_path_buf(),
        preview,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_sits_next_to_output() {
        assert_eq!(
            preview_path(Path::new("out/output.wsq")),
            PathBuf::from("out/output.preview.png")
        );
    }
}
