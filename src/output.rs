//! Conversion output: the packaged image file and the caller-facing result.

use crate::config::RasterFormat;
use crate::error::{ConvertError, ErrorKind};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::Write;
use std::path::{Path, PathBuf};

/// The encoded preview, packaged as a named file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageFile {
    /// A `data:` URL that a browser can display directly.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }

    /// Write the image to `path` atomically (temp file in the same
    /// directory, then rename), creating parent directories as needed.
    pub async fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref().to_path_buf();
        let bytes = self.bytes.clone();

        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
            .await
            .map_err(std::io::Error::other)?
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// The only value a conversion hands back.
///
/// Exactly one of the image file or the error is present; the private
/// `outcome` makes the other combinations unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    outcome: Result<ImageFile, ConvertError>,
    media_type: String,
}

impl ConversionResult {
    pub(crate) fn success(file: ImageFile) -> Self {
        let media_type = file.media_type.clone();
        Self {
            outcome: Ok(file),
            media_type,
        }
    }

    pub(crate) fn failure(error: ConvertError, format: RasterFormat) -> Self {
        Self {
            outcome: Err(error),
            media_type: format.mime_type().to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Media type of the requested output, present on success and failure.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn file(&self) -> Option<&ImageFile> {
        self.outcome.as_ref().ok()
    }

    pub fn image_bytes(&self) -> Option<&[u8]> {
        self.file().map(|f| f.bytes.as_slice())
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file().map(|f| f.name.as_str())
    }

    /// Rendered `(width, height)` in pixels.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.file().map(|f| (f.width, f.height))
    }

    /// Displayable URL for the image; see [`ImageFile::data_url`].
    pub fn image_url(&self) -> Option<String> {
        self.file().map(ImageFile::data_url)
    }

    pub fn error(&self) -> Option<&ConvertError> {
        self.outcome.as_ref().err()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error().map(ConvertError::kind)
    }

    /// Convert into a plain `Result` for `?`-style callers.
    pub fn into_result(self) -> Result<ImageFile, ConvertError> {
        self.outcome
    }
}
