//! # resumind-preview
//!
//! Turn an uploaded PDF résumé into a PNG preview of its first page, so it
//! can be shown next to AI-generated review feedback.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Input    validate presence and declared media type
//!  ├─ 2. Backend  bind pdfium once per converter (single-flight)
//!  ├─ 3. Parse    open the document, select page 0
//!  ├─ 4. Render   rasterise at 2× native size (spawn_blocking)
//!  ├─ 5. Encode   PNG at maximum compression
//!  └─ 6. Output   ConversionResult { resume.png, image/png } or an error
//! ```
//!
//! Every failure, at any stage, comes back as a [`ConversionResult`] with
//! `error()` set and no image. Conversions never return a bare `Err`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resumind_preview::{Converter, ConversionConfig, InputDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = Converter::new(ConversionConfig::default());
//!     let upload = InputDocument::pdf(std::fs::read("resume.pdf")?);
//!     let image = converter.convert(upload).await.into_result()?;
//!     image.write_to(&image.name).await?;
//!     eprintln!("{}x{} px", image.width, image.height);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `resumind-preview` binary (clap + anyhow + tracing-subscriber + indicatif + serde_json) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! resumind-preview = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, RasterFormat};
pub use convert::{convert_sync, Converter};
pub use error::{ConfigError, ConvertError, ErrorKind};
pub use output::{ConversionResult, ImageFile};
pub use pipeline::backend::{
    BackendFactory, BackendLoader, DocumentHandle, PageHandle, RenderBackend, Viewport,
};
pub use pipeline::input::InputDocument;
pub use pipeline::pdfium::{PdfiumBackend, PdfiumFactory};
pub use pipeline::render::PageSurface;
pub use progress::{
    ConversionProgressCallback, ConversionStage, NoopProgressCallback, ProgressCallback,
};
