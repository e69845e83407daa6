//! Document parsing: raw bytes → [`DocumentHandle`], and bounds-checked page access.

use crate::error::ConvertError;
use crate::pipeline::backend::{DocumentHandle, PageHandle, RenderBackend};
use tracing::debug;

/// Parse `bytes` with an already-loaded backend.
///
/// Fails with [`ConvertError::Parse`] when `bytes` is empty, larger than
/// `max_input_bytes`, or rejected by the backend.
pub fn parse<'a, B>(
    backend: &'a B,
    bytes: &'a [u8],
    password: Option<&'a str>,
    max_input_bytes: usize,
) -> Result<Box<dyn DocumentHandle + 'a>, ConvertError>
where
    B: RenderBackend + ?Sized,
{
    if bytes.is_empty() {
        return Err(ConvertError::parse("document is empty"));
    }
    if bytes.len() > max_input_bytes {
        return Err(ConvertError::parse(format!(
            "document is {} bytes; the supported maximum is {} bytes",
            bytes.len(),
            max_input_bytes
        )));
    }

    let document = backend.open(bytes, password)?;
    debug!("PDF loaded: {} pages", document.page_count());
    Ok(document)
}

/// Fetch page `index` (0-based), failing with [`ConvertError::PageIndex`]
/// when it is out of range.
pub fn get_page(
    document: &dyn DocumentHandle,
    index: usize,
) -> Result<Box<dyn PageHandle + '_>, ConvertError> {
    let total = document.page_count();
    if index >= total {
        return Err(ConvertError::PageIndex { index, total });
    }
    document.page(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::backend::Viewport;
    use image::DynamicImage;

    /// Accepts anything starting with `%PDF`; one page per `P` byte.
    struct LetterBackend;

    struct LetterDocument {
        pages: usize,
    }

    struct LetterPage;

    impl RenderBackend for LetterBackend {
        fn open<'a>(
            &'a self,
            bytes: &'a [u8],
            _password: Option<&'a str>,
        ) -> Result<Box<dyn DocumentHandle + 'a>, ConvertError> {
            if !bytes.starts_with(b"%PDF") {
                return Err(ConvertError::parse("missing header"));
            }
            let pages = bytes[4..].iter().filter(|&&b| b == b'P').count();
            Ok(Box::new(LetterDocument { pages }))
        }
    }

    impl DocumentHandle for LetterDocument {
        fn page_count(&self) -> usize {
            self.pages
        }

        fn page(&self, _index: usize) -> Result<Box<dyn PageHandle + '_>, ConvertError> {
            Ok(Box::new(LetterPage))
        }
    }

    impl PageHandle for LetterPage {
        fn viewport(&self) -> Viewport {
            Viewport {
                width: 612.0,
                height: 792.0,
            }
        }

        fn paint(&self, width: u32, height: u32) -> Result<DynamicImage, ConvertError> {
            Ok(DynamicImage::new_rgba8(width, height))
        }
    }

    #[test]
    fn empty_bytes_are_a_parse_error() {
        let err = parse(&LetterBackend, b"", None, 1024).err().unwrap();
        assert!(matches!(err, ConvertError::Parse { .. }));
    }

    #[test]
    fn oversized_document_is_rejected_before_the_backend() {
        let bytes = b"%PDF PPPP";
        let err = parse(&LetterBackend, bytes, None, 4).err().unwrap();
        assert!(err.to_string().contains("supported maximum"));
    }

    #[test]
    fn malformed_bytes_are_a_parse_error() {
        let err = parse(&LetterBackend, b"GIF89a", None, 1024).err().unwrap();
        assert!(matches!(err, ConvertError::Parse { .. }));
    }

    #[test]
    fn page_index_is_bounds_checked() {
        let doc = parse(&LetterBackend, b"%PDF PP", None, 1024).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert!(get_page(doc.as_ref(), 1).is_ok());

        let err = get_page(doc.as_ref(), 2).err().unwrap();
        assert_eq!(err, ConvertError::PageIndex { index: 2, total: 2 });
    }

    #[test]
    fn zero_page_document_has_no_first_page() {
        let doc = parse(&LetterBackend, b"%PDF", None, 1024).unwrap();
        let err = get_page(doc.as_ref(), 0).err().unwrap();
        assert_eq!(err, ConvertError::PageIndex { index: 0, total: 0 });
    }
}
