//! Rendering backend seam and its single-flight loader.
//!
//! The pipeline never talks to pdfium directly. It goes through
//! [`RenderBackend`] → [`DocumentHandle`] → [`PageHandle`], whose lifetimes
//! mirror pdfium-render's own borrow chain (a document borrows the
//! library and the input bytes, a page borrows the document). Tests swap in
//! an in-memory backend through the same seam.
//!
//! ## Loading
//!
//! Binding the native library is slow and must happen at most once per
//! [`BackendLoader`]. The loader is a mutex-guarded state machine:
//!
//! ```text
//! Idle ──first caller──▶ Loading(shared future) ──ok──▶ Ready(Arc<Backend>)
//!   ▲                         │
//!   └─────────err─────────────┘
//! ```
//!
//! Callers arriving while a load is in flight clone the shared future and
//! receive the same outcome, success or failure. A failure returns the
//! loader to `Idle`, so the next call retries from scratch. The mutex is
//! only held to read or swap the state, never across an `.await`.

use crate::error::ConvertError;
use futures::future::{BoxFuture, FutureExt, Shared};
use image::DynamicImage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// A page's logical drawing area in PDF points, before any scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// A loaded rendering engine. Shared read-only by every conversion.
pub trait RenderBackend: Send + Sync + 'static {
    /// Parse `bytes` into a document handle.
    ///
    /// Fails with [`ConvertError::Parse`] on malformed input or a wrong password.
    fn open<'a>(
        &'a self,
        bytes: &'a [u8],
        password: Option<&'a str>,
    ) -> Result<Box<dyn DocumentHandle + 'a>, ConvertError>;
}

/// A parsed document, valid for the duration of one conversion.
pub trait DocumentHandle {
    fn page_count(&self) -> usize;

    /// Access one page. Callers check `index < page_count()` first.
    fn page(&self, index: usize) -> Result<Box<dyn PageHandle + '_>, ConvertError>;
}

/// One page of a [`DocumentHandle`].
pub trait PageHandle {
    /// Native page size in points.
    fn viewport(&self) -> Viewport;

    /// Paint the page into a freshly allocated `width × height` surface.
    fn paint(&self, width: u32, height: u32) -> Result<DynamicImage, ConvertError>;
}

/// Produces a [`RenderBackend`]. `load` blocks and runs on the blocking pool.
pub trait BackendFactory: Send + Sync + 'static {
    type Backend: RenderBackend;

    fn load(&self) -> Result<Self::Backend, ConvertError>;
}

type LoadFuture<B> = Shared<BoxFuture<'static, Result<Arc<B>, ConvertError>>>;

enum LoaderState<B> {
    Idle,
    Loading(LoadFuture<B>),
    Ready(Arc<B>),
}

/// Lazily loads and memoises a backend with single-flight semantics.
pub struct BackendLoader<F: BackendFactory> {
    factory: Arc<F>,
    state: Mutex<LoaderState<F::Backend>>,
    attempts: AtomicUsize,
}

impl<F: BackendFactory> BackendLoader<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory: Arc::new(factory),
            state: Mutex::new(LoaderState::Idle),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// `true` once a load has succeeded.
    pub fn is_ready(&self) -> bool {
        matches!(*self.lock_state(), LoaderState::Ready(_))
    }

    /// Number of loads started so far (failed ones included).
    pub fn load_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Return the backend, loading it first if necessary.
    pub async fn ensure_ready(&self) -> Result<Arc<F::Backend>, ConvertError> {
        let pending = {
            let mut state = self.lock_state();
            match &*state {
                LoaderState::Ready(backend) => return Ok(Arc::clone(backend)),
                LoaderState::Loading(pending) => {
                    debug!("Backend load already in flight; waiting on it");
                    pending.clone()
                }
                LoaderState::Idle => {
                    let pending = self.start_load();
                    *state = LoaderState::Loading(pending.clone());
                    pending
                }
            }
        };

        let outcome = pending.clone().await;

        let mut state = self.lock_state();
        // Only the load we awaited may settle the state; a newer load started
        // after a failure belongs to someone else.
        if let LoaderState::Loading(current) = &*state {
            if current.ptr_eq(&pending) {
                *state = match &outcome {
                    Ok(backend) => LoaderState::Ready(Arc::clone(backend)),
                    Err(e) => {
                        warn!("Backend load failed; next call will retry: {}", e);
                        LoaderState::Idle
                    }
                };
            }
        }
        outcome
    }

    fn start_load(&self) -> LoadFuture<F::Backend> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Loading rendering backend (attempt {})", attempt);

        let factory = Arc::clone(&self.factory);
        let handle = tokio::task::spawn_blocking(move || factory.load());

        async move {
            match handle.await {
                Ok(Ok(backend)) => {
                    info!("Rendering backend ready");
                    Ok(Arc::new(backend))
                }
                Ok(Err(e)) => Err(e),
                Err(e) => Err(ConvertError::backend_load(format!(
                    "backend loader task panicked: {e}"
                ))),
            }
        }
        .boxed()
        .shared()
    }

    fn lock_state(&self) -> MutexGuard<'_, LoaderState<F::Backend>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
