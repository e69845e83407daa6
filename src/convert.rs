//! Conversion entry points: the orchestrator that sequences every stage.
//!
//! [`Converter`] owns the single-flight [`BackendLoader`], so the native
//! rendering library is bound at most once per converter no matter how many
//! conversions run concurrently. Create one converter at start-up and share
//! it (`&Converter` or `Arc<Converter>`); the backend is read-only after it
//! loads, so no further locking is needed.
//!
//! Internally each stage returns `Result<_, ConvertError>` and [`Converter::run`]
//! stops at the first `Err` via `?`. The public methods never return a bare
//! error: every outcome is folded into a [`ConversionResult`].

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::output::{ConversionResult, ImageFile};
use crate::pipeline::backend::{BackendFactory, BackendLoader, RenderBackend};
use crate::pipeline::input::{self, InputDocument};
use crate::pipeline::pdfium::PdfiumFactory;
use crate::pipeline::render::PageSurface;
use crate::pipeline::{encode, parse, render};
use crate::progress::{ConversionStage, StageReporter};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Converts uploaded PDF documents into first-page preview images.
///
/// # Example
/// ```rust,no_run
/// use resumind_preview::{Converter, ConversionConfig, InputDocument};
///
/// # #[tokio::main]
/// # async fn main() {
/// let converter = Converter::new(ConversionConfig::default());
/// let bytes = std::fs::read("resume.pdf").unwrap();
/// let result = converter.convert(InputDocument::pdf(bytes)).await;
/// match result.error() {
///     None => println!("{} ({} bytes)", result.file_name().unwrap(), result.image_bytes().unwrap().len()),
///     Some(e) => eprintln!("preview unavailable: {e}"),
/// }
/// # }
/// ```
pub struct Converter<F: BackendFactory = PdfiumFactory> {
    loader: BackendLoader<F>,
    config: ConversionConfig,
}

impl Converter<PdfiumFactory> {
    /// A pdfium-backed converter. The library is bound on first use.
    pub fn new(config: ConversionConfig) -> Self {
        let factory = PdfiumFactory::new(config.library_path.clone());
        Self::with_factory(factory, config)
    }
}

impl Default for Converter<PdfiumFactory> {
    fn default() -> Self {
        Self::new(ConversionConfig::default())
    }
}

impl<F: BackendFactory> Converter<F> {
    /// A converter over any rendering backend.
    pub fn with_factory(factory: F, config: ConversionConfig) -> Self {
        Self {
            loader: BackendLoader::new(factory),
            config,
        }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn loader(&self) -> &BackendLoader<F> {
        &self.loader
    }

    /// Load the backend ahead of the first conversion.
    pub async fn ensure_backend_ready(&self) -> Result<Arc<F::Backend>, ConvertError> {
        self.loader.ensure_ready().await
    }

    /// Convert `input` with this converter's configuration.
    pub async fn convert(&self, input: InputDocument) -> ConversionResult {
        self.convert_with_config(input, &self.config).await
    }

    /// Convert `input` with per-call settings (scale, format, page, …).
    ///
    /// Backend-location settings in `config` are ignored; the backend was
    /// configured when this converter was created.
    pub async fn convert_with_config(
        &self,
        input: InputDocument,
        config: &ConversionConfig,
    ) -> ConversionResult {
        let reporter = StageReporter::new(config.progress_callback.clone());
        reporter.enter(ConversionStage::Idle);

        let start = Instant::now();
        let label = input.name().unwrap_or("<upload>").to_string();
        info!("Starting conversion: {} ({} bytes)", label, input.len());

        let outcome = self.run(input, config, &reporter).await;
        let result = finish(outcome, config, &reporter);
        if result.is_success() {
            info!(
                "Conversion complete: {} in {}ms",
                label,
                start.elapsed().as_millis()
            );
        }
        result
    }

    /// Read a local path or download a URL, then convert it.
    ///
    /// Read and download failures are reported as input errors.
    pub async fn convert_file(&self, input_str: &str) -> ConversionResult {
        match input::load_input(input_str, self.config.download_timeout_secs).await {
            Ok(doc) => self.convert(doc).await,
            Err(e) => {
                let reporter = StageReporter::new(self.config.progress_callback.clone());
                reporter.enter(ConversionStage::Idle);
                finish(Err(e), &self.config, &reporter)
            }
        }
    }

    /// Convert several documents with at most `concurrency` in flight.
    ///
    /// Results are returned in input order. All conversions share one
    /// backend load.
    pub async fn convert_many(
        &self,
        inputs: Vec<InputDocument>,
        concurrency: usize,
    ) -> Vec<ConversionResult> {
        stream::iter(inputs.into_iter().map(|doc| self.convert(doc)))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    async fn run(
        &self,
        input: InputDocument,
        config: &ConversionConfig,
        reporter: &StageReporter,
    ) -> Result<ImageFile, ConvertError> {
        // ── Step 1: Validate input ───────────────────────────────────────
        input.validate()?;

        // ── Step 2: Backend ──────────────────────────────────────────────
        reporter.enter(ConversionStage::LoadingBackend);
        let backend = self.loader.ensure_ready().await?;

        // ── Step 3: Parse + rasterise ────────────────────────────────────
        reporter.enter(ConversionStage::Parsing);
        let surface = rasterise(backend, input.into_bytes(), config, reporter.clone()).await?;

        // ── Step 4: Encode ───────────────────────────────────────────────
        reporter.enter(ConversionStage::Encoding);
        let format = config.format;
        let (width, height) = (surface.width(), surface.height());
        let bytes = tokio::task::spawn_blocking(move || encode::encode_surface(&surface, format))
            .await
            .map_err(|e| ConvertError::encode(format!("encode task panicked: {e}")))??;

        // ── Step 5: Package ──────────────────────────────────────────────
        Ok(ImageFile {
            name: config.file_name.clone(),
            media_type: format.mime_type().to_string(),
            bytes,
            width,
            height,
        })
    }
}

/// Parse, select the page and render it on the blocking pool.
///
/// The document and page handles borrow the backend and the bytes, so both
/// stages share one blocking task and only the owned surface comes back.
async fn rasterise<B: RenderBackend>(
    backend: Arc<B>,
    bytes: Vec<u8>,
    config: &ConversionConfig,
    reporter: StageReporter,
) -> Result<PageSurface, ConvertError> {
    let password = config.password.clone();
    let page_index = config.page_index;
    let scale = config.scale;
    let max_dimension = config.max_dimension;
    let max_input_bytes = config.max_input_bytes;

    tokio::task::spawn_blocking(move || {
        let document = parse::parse(
            backend.as_ref(),
            &bytes,
            password.as_deref(),
            max_input_bytes,
        )?;
        let page = parse::get_page(document.as_ref(), page_index)?;

        reporter.enter(ConversionStage::Rendering);
        render::render(page.as_ref(), scale, max_dimension)
    })
    .await
    .map_err(|e| ConvertError::render(format!("render task panicked: {e}")))?
}

/// Fold a stage outcome into the caller-facing result and report it.
fn finish(
    outcome: Result<ImageFile, ConvertError>,
    config: &ConversionConfig,
    reporter: &StageReporter,
) -> ConversionResult {
    match outcome {
        Ok(file) => {
            reporter.complete(file.width, file.height, file.bytes.len());
            ConversionResult::success(file)
        }
        Err(e) => {
            warn!("Conversion failed ({}): {}", e.kind(), e);
            reporter.fail(e.kind(), &e.to_string());
            ConversionResult::failure(e, config.format)
        }
    }
}

/// Synchronous wrapper around [`Converter::convert`].
///
/// Creates a temporary tokio runtime internally, so the backend loaded by
/// `converter` is reused across calls but the runtime is not.
pub fn convert_sync<F: BackendFactory>(
    converter: &Converter<F>,
    input: InputDocument,
) -> std::io::Result<ConversionResult> {
    let runtime = tokio::runtime::Runtime::new()?;
    Ok(runtime.block_on(converter.convert(input)))
}
