//! In-memory rendering backend shared by the integration tests.
//!
//! Documents use a toy line format so tests can describe pages by size:
//!
//! ```text
//! %PDF-toy
//! page 612 792
//! page 595.28 841.89
//! %%EOF
//! ```
//!
//! Anything without the `%PDF` header and `%%EOF` trailer is a parse error.

#![allow(dead_code)]

use image::{DynamicImage, Rgba, RgbaImage};
use resumind_preview::{
    BackendFactory, ConversionConfig, ConvertError, Converter, DocumentHandle, PageHandle,
    RenderBackend, Viewport,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Build a toy document with one page per `(width, height)` pair.
pub fn toy_pdf(pages: &[(f32, f32)]) -> Vec<u8> {
    let mut doc = String::from("%PDF-toy\n");
    for (w, h) in pages {
        doc.push_str(&format!("page {w} {h}\n"));
    }
    doc.push_str("%%EOF\n");
    doc.into_bytes()
}

/// One US-Letter page.
pub fn letter_pdf() -> Vec<u8> {
    toy_pdf(&[(612.0, 792.0)])
}

/// Counters shared between a factory and the backends it produces.
#[derive(Default)]
pub struct Counters {
    pub loads: AtomicUsize,
    pub paints: AtomicUsize,
}

impl Counters {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn paints(&self) -> usize {
        self.paints.load(Ordering::SeqCst)
    }
}

/// Counts loads, sleeps `delay` per load and fails the first `fail_first`.
///
/// `panicking_load` and `panicking_paint` make the blocking work panic
/// instead of returning an error.
pub struct ToyFactory {
    pub counters: Arc<Counters>,
    delay: Duration,
    fail_first: usize,
    panic_on_load: bool,
    panic_on_paint: bool,
}

impl ToyFactory {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            delay: Duration::ZERO,
            fail_first: 0,
            panic_on_load: false,
            panic_on_paint: false,
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay = Duration::from_millis(delay_ms);
        self
    }

    pub fn failing_first(mut self, n: usize) -> Self {
        self.fail_first = n;
        self
    }

    pub fn panicking_load(mut self) -> Self {
        self.panic_on_load = true;
        self
    }

    pub fn panicking_paint(mut self) -> Self {
        self.panic_on_paint = true;
        self
    }
}

impl BackendFactory for ToyFactory {
    type Backend = ToyBackend;

    fn load(&self) -> Result<ToyBackend, ConvertError> {
        let n = self.counters.loads.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        if self.panic_on_load {
            panic!("toy backend crashed while loading");
        }
        if n < self.fail_first {
            return Err(ConvertError::backend_load("toy worker resource missing"));
        }
        Ok(ToyBackend {
            counters: Arc::clone(&self.counters),
            panic_on_paint: self.panic_on_paint,
        })
    }
}

pub struct ToyBackend {
    counters: Arc<Counters>,
    panic_on_paint: bool,
}

impl RenderBackend for ToyBackend {
    fn open<'a>(
        &'a self,
        bytes: &'a [u8],
        _password: Option<&'a str>,
    ) -> Result<Box<dyn DocumentHandle + 'a>, ConvertError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ConvertError::parse("not text"))?;
        let mut lines = text.lines();
        if !lines.next().is_some_and(|l| l.starts_with("%PDF")) {
            return Err(ConvertError::parse("missing %PDF header"));
        }

        let mut pages = Vec::new();
        let mut terminated = false;
        for line in lines {
            if line == "%%EOF" {
                terminated = true;
                break;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                ["page", w, h] => {
                    let width = w.parse().map_err(|_| ConvertError::parse("bad width"))?;
                    let height = h.parse().map_err(|_| ConvertError::parse("bad height"))?;
                    pages.push(Viewport { width, height });
                }
                _ => return Err(ConvertError::parse(format!("unexpected line '{line}'"))),
            }
        }
        if !terminated {
            return Err(ConvertError::parse("missing %%EOF trailer"));
        }

        Ok(Box::new(ToyDocument {
            pages,
            counters: &self.counters,
            panic_on_paint: self.panic_on_paint,
        }))
    }
}

struct ToyDocument<'a> {
    pages: Vec<Viewport>,
    counters: &'a Counters,
    panic_on_paint: bool,
}

impl DocumentHandle for ToyDocument<'_> {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<Box<dyn PageHandle + '_>, ConvertError> {
        let viewport = *self.pages.get(index).ok_or(ConvertError::PageIndex {
            index,
            total: self.pages.len(),
        })?;
        Ok(Box::new(ToyPage {
            viewport,
            counters: self.counters,
            panic_on_paint: self.panic_on_paint,
        }))
    }
}

struct ToyPage<'a> {
    viewport: Viewport,
    counters: &'a Counters,
    panic_on_paint: bool,
}

impl PageHandle for ToyPage<'_> {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn paint(&self, width: u32, height: u32) -> Result<DynamicImage, ConvertError> {
        self.counters.paints.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_paint {
            panic!("toy backend crashed while painting");
        }
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 200, 255])
        });
        Ok(DynamicImage::ImageRgba8(img))
    }
}

/// A converter over a fresh [`ToyFactory`] plus its counters.
pub fn toy_converter(factory: ToyFactory, config: ConversionConfig) -> (Converter<ToyFactory>, Arc<Counters>) {
    let counters = Arc::clone(&factory.counters);
    (Converter::with_factory(factory, config), counters)
}
