//! Native PDF engine abstraction layer.
//!
//! Isolates the concrete rasterizer (PDFium, or the C shim around poppler)
//! from the document lifecycle and the page renderer bridge. An engine only
//! loads documents, counts pages and rasterizes; ownership rules are
//! enforced by [`Document`](crate::Document) and [`bridge`](crate::bridge).

use std::path::Path;
use std::sync::Arc;

use crate::options::RenderHints;

#[cfg(feature = "pdfium")]
mod pdfium;
#[cfg(feature = "c-shim")]
mod shim;

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumEngine;
#[cfg(feature = "c-shim")]
pub use shim::{ShimBuffer, ShimDocument, ShimEngine};

/// Pixel layout tag reported by the engine for one raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Nothing was rendered
    None,
    /// 1 byte per pixel
    Grayscale,
    /// 3 bytes per pixel, R,G,B
    Rgb,
    /// 4 bytes per pixel, B,G,R,A on the wire
    Rgba,
}

impl PixelFormat {
    /// Bytes per pixel for this format; 0 for [`PixelFormat::None`].
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::None => 0,
            PixelFormat::Grayscale => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }

    /// Decode the integer tag of the native shim ABI.
    ///
    /// Unknown tags are treated as "nothing rendered".
    pub fn from_tag(tag: i32) -> Self {
        match tag {
            1 => PixelFormat::Grayscale,
            2 => PixelFormat::Rgb,
            3 => PixelFormat::Rgba,
            _ => PixelFormat::None,
        }
    }
}

/// One render call's parameters, already validated by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequest {
    /// Zero-based page index, `< page_count`
    pub index: usize,
    /// Resolution in dots per inch, `> 0`
    pub dpi: u32,
    /// Rasterizer quality hints
    pub hints: RenderHints,
}

impl RenderRequest {
    /// Scale factor from PDF points to pixels.
    pub fn scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

/// Engine-owned raster returned by a single render call.
///
/// `buffer` stays owned by the engine until handed back through
/// [`PdfEngine::release_raster`].
#[derive(Debug)]
pub struct NativeRaster<B> {
    pub buffer: B,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

/// Contract of the native PDF engine.
///
/// Every document returned by a `load_*` call must be passed to
/// [`release_document`](Self::release_document) exactly once, and every
/// raster returned by [`render_page`](Self::render_page) must have its buffer
/// passed to [`release_raster`](Self::release_raster) exactly once.
pub trait PdfEngine {
    /// Native document handle; may borrow the engine.
    type Document<'e>
    where
        Self: 'e;

    /// Native raster buffer, row-major and tightly packed.
    type Buffer: AsRef<[u8]>;

    /// Load a document from raw bytes.
    ///
    /// The engine may keep a clone of `data` and read it lazily until the
    /// document is released.
    fn load_from_raw_data<'e>(&'e self, data: Arc<[u8]>) -> Option<Self::Document<'e>>;

    /// Load a document from a file.
    fn load_from_file<'e>(&'e self, path: &Path) -> Option<Self::Document<'e>>;

    /// Release a loaded document.
    fn release_document(&self, doc: Self::Document<'_>);

    /// Number of pages in a loaded document.
    fn page_count(&self, doc: &Self::Document<'_>) -> usize;

    /// Rasterize one page; `None` when the engine produced nothing.
    fn render_page(
        &self,
        doc: &Self::Document<'_>,
        request: &RenderRequest,
    ) -> Option<NativeRaster<Self::Buffer>>;

    /// Release a raster buffer returned by [`render_page`](Self::render_page).
    fn release_raster(&self, buffer: Self::Buffer);
}
