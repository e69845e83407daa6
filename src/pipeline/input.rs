//! Input acquisition: the in-memory document handed to the pipeline.
//!
//! pdfium opens a byte slice directly, so uploads, local files and URLs are
//! all read fully into an [`InputDocument`] and nothing is written to disk.
//! The declared media type travels with the bytes;
//! [`InputDocument::validate`] is the only gate before parsing.

use crate::error::ConvertError;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// The media type every accepted input must declare.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// An uploaded document: bytes plus the media type the uploader declared.
#[derive(Clone, PartialEq, Eq)]
pub struct InputDocument {
    bytes: Vec<u8>,
    media_type: String,
    name: Option<String>,
}

impl fmt::Debug for InputDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputDocument")
            .field("len", &self.bytes.len())
            .field("media_type", &self.media_type)
            .field("name", &self.name)
            .finish()
    }
}

impl InputDocument {
    pub fn new(bytes: impl Into<Vec<u8>>, media_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into(),
            name: None,
        }
    }

    /// Bytes declared as `application/pdf`.
    pub fn pdf(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes, PDF_MEDIA_TYPE)
    }

    /// Attach a display name (usually the uploaded file name).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Fails with [`ConvertError::Input`] when the document is empty or not
    /// declared as a PDF. Structural validity is left to the parser.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.bytes.is_empty() {
            return Err(ConvertError::input("no document provided (0 bytes)"));
        }
        if !is_pdf_media_type(&self.media_type) {
            return Err(ConvertError::input(format!(
                "expected media type {PDF_MEDIA_TYPE}, got '{}'",
                self.media_type
            )));
        }
        Ok(())
    }

    /// Read a local file, declaring it a PDF by extension or magic bytes.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                ConvertError::input(format!("file not found: '{}'", path.display()))
            }
            std::io::ErrorKind::PermissionDenied => {
                ConvertError::input(format!("permission denied reading '{}'", path.display()))
            }
            _ => ConvertError::input(format!("failed to read '{}': {e}", path.display())),
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        let media_type = sniff_media_type(name.as_deref(), &bytes);
        debug!("Read {} bytes from {}", bytes.len(), path.display());

        let doc = Self::new(bytes, media_type);
        Ok(match name {
            Some(n) => doc.with_name(n),
            None => doc,
        })
    }

    /// Download a document over HTTP(S).
    ///
    /// The response's `Content-Type` is used when it names a PDF; otherwise
    /// the media type is sniffed like a local file.
    pub async fn from_url(url: &str, timeout_secs: u64) -> Result<Self, ConvertError> {
        info!("Downloading PDF from: {}", url);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ConvertError::input(format!("failed to download '{url}': {e}")))?;

        let response = client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ConvertError::input(format!(
                    "download timed out after {timeout_secs}s for '{url}'"
                ))
            } else {
                ConvertError::input(format!("failed to download '{url}': {e}"))
            }
        })?;

        if !response.status().is_success() {
            return Err(ConvertError::input(format!(
                "failed to download '{url}': HTTP {}",
                response.status()
            )));
        }

        let header_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| is_pdf_media_type(v))
            .map(str::to_string);
        let name = filename_from_url(url);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ConvertError::input(format!("failed to download '{url}': {e}")))?
            .to_vec();

        let media_type =
            header_type.unwrap_or_else(|| sniff_media_type(name.as_deref(), &bytes));
        info!("Downloaded {} bytes", bytes.len());

        let doc = Self::new(bytes, media_type);
        Ok(match name {
            Some(n) => doc.with_name(n),
            None => doc,
        })
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load a local path or an HTTP(S) URL.
pub async fn load_input(input: &str, timeout_secs: u64) -> Result<InputDocument, ConvertError> {
    if input.trim().is_empty() {
        return Err(ConvertError::input("no input path or URL given"));
    }
    if is_url(input) {
        InputDocument::from_url(input, timeout_secs).await
    } else {
        InputDocument::from_path(input).await
    }
}

/// `application/pdf`, ignoring case and parameters such as `; charset=…`.
fn is_pdf_media_type(media_type: &str) -> bool {
    media_type
        .split(';')
        .next()
        .map(|t| t.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
        .unwrap_or(false)
}

fn sniff_media_type(name: Option<&str>, bytes: &[u8]) -> String {
    let pdf_extension = name
        .and_then(|n| Path::new(n).extension())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    if pdf_extension || bytes.starts_with(b"%PDF") {
        PDF_MEDIA_TYPE.to_string()
    } else {
        FALLBACK_MEDIA_TYPE.to_string()
    }
}

/// Last path segment of the URL when it looks like a file name.
fn filename_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    if !last.is_empty() && last.contains('.') {
        Some(last.to_string())
    } else {
        None
    }
}
