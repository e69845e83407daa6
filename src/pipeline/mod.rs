//! Pipeline stages for PDF-to-PNG preview conversion.
//!
//! Each submodule implements exactly one step. The rendering engine sits
//! behind [`backend::RenderBackend`]: pdfium in production, an in-memory
//! double in tests.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ backend ──▶ parse ──▶ render ──▶ encode
//! (bytes)   (load once) (pdfium)  (pixels)   (PNG)
//! ```
//!
//! 1. [`input`]   — the in-memory document and its declared media type
//! 2. [`backend`] — rendering traits and the single-flight loader
//! 3. [`parse`]   — bytes → document handle; bounds-checked page access
//! 4. [`render`]  — one page at one scale → pixel surface; runs in
//!    `spawn_blocking` together with parsing because a document handle
//!    borrows the backend and cannot cross an `.await`
//! 5. [`encode`]  — pixel surface → PNG bytes
//!
//! [`pdfium`] is the production backend.

pub mod backend;
pub mod encode;
pub mod input;
pub mod parse;
pub mod pdfium;
pub mod render;
