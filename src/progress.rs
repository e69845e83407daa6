//! Per-call conversion stages and the progress-callback trait that observes them.
//!
//! Every `convert` call walks the same state machine:
//!
//! ```text
//! Idle ─▶ LoadingBackend ─▶ Parsing ─▶ Rendering ─▶ Encoding ─▶ Done
//!   │           │              │           │            │
//!   └───────────┴──────────────┴───────────┴────────────┴──▶ Failed(kind)
//! ```
//!
//! `Done` and `Failed` are terminal. There is no resumption from `Failed`;
//! the caller decides whether to run a fresh `convert`.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! stage transitions. The trait is `Send + Sync` because parsing and
//! rendering run on the blocking pool, so events may arrive from a
//! different thread than the one that called `convert`.
//!
//! # Example
//!
//! ```rust
//! use resumind_preview::{ConversionProgressCallback, ConversionConfig, ConversionStage};
//! use std::sync::Arc;
//!
//! struct LogStages;
//!
//! impl ConversionProgressCallback for LogStages {
//!     fn on_stage(&self, stage: ConversionStage) {
//!         eprintln!("→ {stage}");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(LogStages))
//!     .build()
//!     .unwrap();
//! ```

use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A state in the per-call conversion state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionStage {
    Idle,
    LoadingBackend,
    Parsing,
    Rendering,
    Encoding,
    Done,
    Failed(ErrorKind),
}

impl ConversionStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, ConversionStage::Done | ConversionStage::Failed(_))
    }
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionStage::Idle => f.write_str("idle"),
            ConversionStage::LoadingBackend => f.write_str("loading backend"),
            ConversionStage::Parsing => f.write_str("parsing"),
            ConversionStage::Rendering => f.write_str("rendering"),
            ConversionStage::Encoding => f.write_str("encoding"),
            ConversionStage::Done => f.write_str("done"),
            ConversionStage::Failed(kind) => write!(f, "failed ({kind})"),
        }
    }
}

/// Called by the conversion pipeline as it moves between stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called on every stage transition, including the terminal one.
    fn on_stage(&self, stage: ConversionStage) {
        let _ = stage;
    }

    /// Called once when a conversion produced an image.
    ///
    /// # Arguments
    /// * `width`, `height` — rendered surface size in pixels
    /// * `encoded_len`     — byte length of the encoded image
    fn on_conversion_complete(&self, width: u32, height: u32, encoded_len: usize) {
        let _ = (width, height, encoded_len);
    }

    /// Called once when a conversion failed.
    ///
    /// # Arguments
    /// * `kind`  — category of the failure
    /// * `error` — human-readable error description
    fn on_conversion_error(&self, kind: ErrorKind, error: &str) {
        let _ = (kind, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// Forwards stage transitions to tracing and to the optional callback.
///
/// Cheap to clone so it can be moved into blocking tasks.
#[derive(Clone, Default)]
pub(crate) struct StageReporter {
    callback: Option<ProgressCallback>,
}

impl StageReporter {
    pub(crate) fn new(callback: Option<ProgressCallback>) -> Self {
        Self { callback }
    }

    pub(crate) fn enter(&self, stage: ConversionStage) {
        debug!("Conversion stage → {}", stage);
        if let Some(ref cb) = self.callback {
            cb.on_stage(stage);
        }
    }

    pub(crate) fn complete(&self, width: u32, height: u32, encoded_len: usize) {
        self.enter(ConversionStage::Done);
        if let Some(ref cb) = self.callback {
            cb.on_conversion_complete(width, height, encoded_len);
        }
    }

    pub(crate) fn fail(&self, kind: ErrorKind, error: &str) {
        self.enter(ConversionStage::Failed(kind));
        if let Some(ref cb) = self.callback {
            cb.on_conversion_error(kind, error);
        }
    }
}
