//! Image encoding: [`PageSurface`] → compressed image bytes.
//!
//! PNG is lossless, so "maximum quality" means maximum compression effort:
//! the encoder runs with `CompressionType::Best` and adaptive filtering.
//! Text edges stay crisp and the file is as small as PNG allows.

use crate::config::RasterFormat;
use crate::error::ConvertError;
use crate::pipeline::render::PageSurface;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use tracing::debug;

/// Serialise `surface` in `format`.
///
/// Fails with [`ConvertError::Encode`] when the surface has a zero-length
/// edge or the encoder yields no output.
pub fn encode_surface(surface: &PageSurface, format: RasterFormat) -> Result<Vec<u8>, ConvertError> {
    if surface.is_empty() {
        return Err(ConvertError::encode(format!(
            "surface is empty ({}x{} px)",
            surface.width(),
            surface.height()
        )));
    }

    let mut buf = Vec::new();
    match format {
        RasterFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
            surface
                .image()
                .write_with_encoder(encoder)
                .map_err(|e| ConvertError::encode(e.to_string()))?;
        }
    }

    if buf.is_empty() {
        return Err(ConvertError::encode("encoder produced no output"));
    }
    debug!(
        "Encoded {}x{} px surface → {} bytes {}",
        surface.width(),
        surface.height(),
        buf.len(),
        format
    );
    Ok(buf)
}
