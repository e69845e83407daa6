//! pdfium-backed implementation of the rendering seam.
//!
//! ## Library resolution
//!
//! pdfium ships as a native shared library that must be located before the
//! first document is opened. [`PdfiumFactory::load`] tries, in order:
//!
//! 1. the explicit `library_path` from [`crate::ConversionConfig`];
//! 2. `PDFIUM_LIB_PATH` (a file, or a directory holding the platform library);
//! 3. the platform library name next to the running executable;
//! 4. the system library search path.
//!
//! Every failed attempt is listed in the resulting
//! [`ConvertError::BackendLoad`] so users can see where we looked.
//!
//! The `thread_safe` pdfium-render feature serialises calls into the C
//! library. The `sync` feature marks `Pdfium` as `Send + Sync`, so
//! [`PdfiumBackend`] satisfies [`RenderBackend`] and one loaded instance
//! serves every concurrent conversion.

use crate::error::ConvertError;
use crate::pipeline::backend::{
    BackendFactory, DocumentHandle, PageHandle, RenderBackend, Viewport,
};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable pointing at an existing pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Binds to the pdfium shared library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumFactory {
    library_path: Option<PathBuf>,
}

impl PdfiumFactory {
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }

    /// Candidate library files in resolution order, excluding the system search.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(ref p) = self.library_path {
            paths.push(resolve_library_file(p));
        }
        if let Ok(env_path) = std::env::var(PDFIUM_LIB_PATH_ENV) {
            if !env_path.is_empty() {
                paths.push(resolve_library_file(Path::new(&env_path)));
            }
        }
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            paths.push(PathBuf::from(Pdfium::pdfium_platform_library_name_at_path(
                &exe_dir,
            )));
        }
        paths
    }
}

/// A directory is expanded to the platform library file inside it.
fn resolve_library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        PathBuf::from(Pdfium::pdfium_platform_library_name_at_path(path))
    } else {
        path.to_path_buf()
    }
}

impl BackendFactory for PdfiumFactory {
    type Backend = PdfiumBackend;

    fn load(&self) -> Result<PdfiumBackend, ConvertError> {
        let mut attempts = Vec::new();

        for candidate in self.candidates() {
            if !candidate.exists() {
                attempts.push(format!("{}: not found", candidate.display()));
                continue;
            }
            match Pdfium::bind_to_library(&candidate) {
                Ok(bindings) => {
                    info!("Bound pdfium from {}", candidate.display());
                    return Ok(PdfiumBackend {
                        pdfium: Pdfium::new(bindings),
                    });
                }
                Err(e) => attempts.push(format!("{}: {}", candidate.display(), e)),
            }
        }

        match Pdfium::bind_to_system_library() {
            Ok(bindings) => {
                info!("Bound pdfium from the system library path");
                Ok(PdfiumBackend {
                    pdfium: Pdfium::new(bindings),
                })
            }
            Err(e) => {
                attempts.push(format!("system library: {e}"));
                Err(ConvertError::backend_load(attempts.join("; ")))
            }
        }
    }
}

/// A bound pdfium instance.
pub struct PdfiumBackend {
    pdfium: Pdfium,
}

impl RenderBackend for PdfiumBackend {
    fn open<'a>(
        &'a self,
        bytes: &'a [u8],
        password: Option<&'a str>,
    ) -> Result<Box<dyn DocumentHandle + 'a>, ConvertError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    if password.is_some() {
                        ConvertError::parse("wrong password")
                    } else {
                        ConvertError::parse("document is encrypted and requires a password")
                    }
                } else {
                    ConvertError::parse(err_str)
                }
            })?;
        Ok(Box::new(PdfiumDocument { document }))
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl DocumentHandle for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page(&self, index: usize) -> Result<Box<dyn PageHandle + '_>, ConvertError> {
        let total = self.page_count();
        let idx = u16::try_from(index).map_err(|_| ConvertError::PageIndex { index, total })?;
        let page = self
            .document
            .pages()
            .get(idx)
            .map_err(|e| ConvertError::parse(format!("page {index}: {e:?}")))?;
        Ok(Box::new(PdfiumPage { page }))
    }
}

struct PdfiumPage<'a> {
    page: PdfPage<'a>,
}

impl PageHandle for PdfiumPage<'_> {
    fn viewport(&self) -> Viewport {
        Viewport {
            width: self.page.width().value,
            height: self.page.height().value,
        }
    }

    fn paint(&self, width: u32, height: u32) -> Result<DynamicImage, ConvertError> {
        let target_width = i32::try_from(width)
            .map_err(|_| ConvertError::render(format!("width {width} px exceeds pdfium limits")))?;
        let target_height = i32::try_from(height).map_err(|_| {
            ConvertError::render(format!("height {height} px exceeds pdfium limits"))
        })?;

        let render_config = PdfRenderConfig::new()
            .set_target_width(target_width)
            .set_target_height(target_height);

        let bitmap = self
            .page
            .render_with_config(&render_config)
            .map_err(|e| ConvertError::render(format!("{:?}", e)))?;

        let image = bitmap.as_image();
        debug!("pdfium painted {}x{} px", image.width(), image.height());
        Ok(image)
    }
}
