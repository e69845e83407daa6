//! Page rasterisation: one [`PageHandle`] at one scale → [`PageSurface`].
//!
//! Output size is `round(viewport × scale)` on both edges. A page whose
//! scaled size exceeds `max_dimension` fails with a render error before any
//! pixels are allocated; the scale is never reduced to fit.

use crate::error::ConvertError;
use crate::pipeline::backend::{PageHandle, Viewport};
use image::{ColorType, DynamicImage};
use tracing::{debug, warn};

/// A rasterised pixel grid for exactly one page at one scale factor.
#[derive(Debug, Clone)]
pub struct PageSurface {
    image: DynamicImage,
    scale: f32,
}

impl PageSurface {
    pub fn new(image: DynamicImage, scale: f32) -> Self {
        Self { image, scale }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn pixel_format(&self) -> ColorType {
        self.image.color()
    }

    /// `true` when either edge is zero pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }
}

/// Pixel size of `viewport` at `scale`, rounded to the nearest pixel.
pub fn scaled_dimensions(
    viewport: Viewport,
    scale: f32,
    max_dimension: u32,
) -> Result<(u32, u32), ConvertError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ConvertError::render(format!(
            "scale must be a finite number > 0, got {scale}"
        )));
    }

    let width = (f64::from(viewport.width) * f64::from(scale)).round();
    let height = (f64::from(viewport.height) * f64::from(scale)).round();

    if !(width >= 1.0 && height >= 1.0) {
        return Err(ConvertError::render(format!(
            "page viewport {}x{} pt at scale {} has no pixels",
            viewport.width, viewport.height, scale
        )));
    }
    if width > f64::from(max_dimension) || height > f64::from(max_dimension) {
        return Err(ConvertError::render(format!(
            "{width}x{height} px exceeds the {max_dimension} px maximum edge"
        )));
    }

    Ok((width as u32, height as u32))
}

/// Render `page` at `scale` into a new surface.
pub fn render(
    page: &dyn PageHandle,
    scale: f32,
    max_dimension: u32,
) -> Result<PageSurface, ConvertError> {
    let viewport = page.viewport();
    let (width, height) = scaled_dimensions(viewport, scale, max_dimension)?;

    let image = page.paint(width, height)?;
    if image.width() != width || image.height() != height {
        warn!(
            "Backend painted {}x{} px, expected {}x{} px",
            image.width(),
            image.height(),
            width,
            height
        );
    }

    let surface = PageSurface::new(image, scale);
    if surface.is_empty() {
        return Err(ConvertError::render("backend returned an empty surface"));
    }
    debug!(
        "Rendered {}x{} pt page → {}x{} px at scale {}",
        viewport.width,
        viewport.height,
        surface.width(),
        surface.height(),
        scale
    );
    Ok(surface)
}
