//! End-to-end tests against the real pdfium engine.
//!
//! Skipped unless `PDFIUM_E2E=1`, since they need libpdfium on disk
//! (`PDFIUM_LIB_PATH`, next to the test binary, or a system install).
//!
//! ```sh
//! PDFIUM_E2E=1 PDFIUM_LIB_PATH=/opt/pdfium/lib cargo test --test pdfium_e2e
//! ```

use resumind_preview::{ConversionConfig, Converter, ErrorKind, InputDocument};

fn e2e_enabled() -> bool {
    std::env::var("PDFIUM_E2E").is_ok_and(|v| v == "1")
}

/// A one-page PDF with the given media box, xref offsets computed on the fly.
fn minimal_pdf(width: u32, height: u32) -> Vec<u8> {
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!("<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {width} {height}] /Contents 4 0 R >>"),
        {
            let stream = "0 0 1 rg 72 72 200 100 re f";
            format!("<< /Length {} >>\nstream\n{stream}\nendstream", stream.len())
        },
    ];

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}

#[tokio::test]
async fn letter_page_renders_at_double_size() {
    if !e2e_enabled() {
        eprintln!("skipping: set PDFIUM_E2E=1 to run");
        return;
    }
    let converter = Converter::new(ConversionConfig::default());

    let result = converter.convert(InputDocument::pdf(minimal_pdf(612, 792))).await;

    assert!(result.error().is_none(), "unexpected error: {:?}", result.error());
    assert_eq!(result.dimensions(), Some((1224, 1584)));
    assert_eq!(result.file_name(), Some("resume.png"));
    let bytes = result.image_bytes().expect("image bytes");
    let decoded = image::load_from_memory(bytes).expect("decodable png");
    assert_eq!((decoded.width(), decoded.height()), (1224, 1584));
}

#[tokio::test]
async fn garbage_bytes_are_a_parse_error() {
    if !e2e_enabled() {
        eprintln!("skipping: set PDFIUM_E2E=1 to run");
        return;
    }
    let converter = Converter::new(ConversionConfig::default());

    let result = converter
        .convert(InputDocument::pdf(b"definitely not a pdf".to_vec()))
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Parse));
}

#[tokio::test]
async fn missing_library_is_a_backend_load_error() {
    if !e2e_enabled() {
        eprintln!("skipping: set PDFIUM_E2E=1 to run");
        return;
    }
    // An explicit path is tried first, but the fallback chain may still find
    // a working library, so only a failure's kind is checked.
    let config = ConversionConfig::builder()
        .library_path("/nonexistent/libpdfium.so")
        .build()
        .unwrap();
    let converter = Converter::new(config);

    let result = converter.convert(InputDocument::pdf(minimal_pdf(612, 792))).await;

    if let Some(kind) = result.error_kind() {
        assert_eq!(kind, ErrorKind::BackendLoad);
    }
}
