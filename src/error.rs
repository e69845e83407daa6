//! Error types for the resumind-preview library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConvertError`] — a typed stage failure. Every pipeline stage returns
//!   `Result<_, ConvertError>`; the orchestrator is the only place that turns
//!   one into the caller-facing [`crate::output::ConversionResult`]. It is
//!   `Clone + Serialize` because it is stored inside the result and shared
//!   between callers waiting on the same backend load.
//!
//! * [`ConfigError`] — builder validation failed before any conversion ran.

use crate::progress::ConversionStage;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A failure raised by one stage of the conversion pipeline.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The document is absent, empty, unreadable, or not declared as a PDF.
    #[error("Invalid input: {detail}")]
    Input { detail: String },

    // ── Backend errors ────────────────────────────────────────────────────
    /// The rendering engine could not be initialised.
    #[error(
        "Failed to load the PDF rendering backend: {detail}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or pass --pdfium-lib to use an existing copy."
    )]
    BackendLoad { detail: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The bytes are not a well-formed (or supported) PDF document.
    #[error("Failed to parse PDF: {detail}")]
    Parse { detail: String },

    /// The requested page does not exist.
    #[error("Page index {index} is out of range (document has {total} pages)")]
    PageIndex { index: usize, total: usize },

    /// No drawing surface could be allocated, or painting failed.
    #[error("Rasterisation failed: {detail}")]
    Render { detail: String },

    /// The pixel surface could not be serialised.
    #[error("Image encoding failed: {detail}")]
    Encode { detail: String },
}

impl ConvertError {
    pub fn input(detail: impl Into<String>) -> Self {
        Self::Input {
            detail: detail.into(),
        }
    }

    pub fn backend_load(detail: impl Into<String>) -> Self {
        Self::BackendLoad {
            detail: detail.into(),
        }
    }

    pub fn parse(detail: impl Into<String>) -> Self {
        Self::Parse {
            detail: detail.into(),
        }
    }

    pub fn render(detail: impl Into<String>) -> Self {
        Self::Render {
            detail: detail.into(),
        }
    }

    pub fn encode(detail: impl Into<String>) -> Self {
        Self::Encode {
            detail: detail.into(),
        }
    }

    /// The coarse category of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::Input { .. } => ErrorKind::Input,
            ConvertError::BackendLoad { .. } => ErrorKind::BackendLoad,
            ConvertError::Parse { .. } => ErrorKind::Parse,
            ConvertError::PageIndex { .. } => ErrorKind::PageIndex,
            ConvertError::Render { .. } => ErrorKind::Render,
            ConvertError::Encode { .. } => ErrorKind::Encode,
        }
    }
}

/// Category of a [`ConvertError`], one per pipeline failure surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Input,
    BackendLoad,
    Parse,
    PageIndex,
    Render,
    Encode,
}

impl ErrorKind {
    /// The stage a failure of this kind aborts.
    pub fn failed_stage(self) -> ConversionStage {
        match self {
            ErrorKind::Input => ConversionStage::Idle,
            ErrorKind::BackendLoad => ConversionStage::LoadingBackend,
            ErrorKind::Parse | ErrorKind::PageIndex => ConversionStage::Parsing,
            ErrorKind::Render => ConversionStage::Rendering,
            ErrorKind::Encode => ConversionStage::Encoding,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Input => "InputError",
            ErrorKind::BackendLoad => "BackendLoadError",
            ErrorKind::Parse => "ParseError",
            ErrorKind::PageIndex => "PageIndexError",
            ErrorKind::Render => "RenderError",
            ErrorKind::Encode => "EncodeError",
        };
        f.write_str(name)
    }
}

/// Returned by [`crate::config::ConversionConfigBuilder::build`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Scale must be a finite number > 0, got {0}")]
    InvalidScale(f32),

    #[error("Maximum dimension must be ≥ 1 px")]
    InvalidMaxDimension,

    #[error("Output file name must not be empty")]
    EmptyFileName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_index_display() {
        let e = ConvertError::PageIndex { index: 3, total: 1 };
        let msg = e.to_string();
        assert!(msg.contains("3"), "got: {msg}");
        assert!(msg.contains("1 pages"), "got: {msg}");
    }

    #[test]
    fn backend_load_display_mentions_override() {
        let e = ConvertError::backend_load("libpdfium.so not found");
        let msg = e.to_string();
        assert!(msg.contains("libpdfium.so not found"));
        assert!(msg.contains("PDFIUM_LIB_PATH"));
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(ConvertError::input("x").kind(), ErrorKind::Input);
        assert_eq!(ConvertError::parse("x").kind(), ErrorKind::Parse);
        assert_eq!(ConvertError::render("x").kind(), ErrorKind::Render);
        assert_eq!(ConvertError::encode("x").kind(), ErrorKind::Encode);
        assert_eq!(
            ConvertError::PageIndex { index: 0, total: 0 }.kind(),
            ErrorKind::PageIndex
        );
    }

    #[test]
    fn kind_display_uses_error_names() {
        assert_eq!(ErrorKind::Parse.to_string(), "ParseError");
        assert_eq!(ErrorKind::BackendLoad.to_string(), "BackendLoadError");
    }

    #[test]
    fn page_index_fails_before_rendering() {
        assert_eq!(
            ErrorKind::PageIndex.failed_stage(),
            ConversionStage::Parsing
        );
        assert_eq!(ErrorKind::Encode.failed_stage(), ConversionStage::Encoding);
    }

    #[test]
    fn convert_error_serialises() {
        let e = ConvertError::parse("bad xref");
        let json = serde_json::to_string(&e).unwrap();
        let back: ConvertError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
