//! # pdfrender
//!
//! Safe document handles over a native PDF rasterizer.
//!
//! Open a PDF from bytes or a path, ask for its page count, and render any
//! page at a chosen resolution into an owned pixel buffer. Parsing and
//! rasterization are delegated to a [`PdfEngine`]; this crate owns the
//! lifecycle around it: native documents and raster buffers are released
//! exactly once, page indices are validated before the engine is called,
//! and engine rasters are copied into [`PageImage`]s that hold no native
//! memory.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfrender::{Document, PdfiumEngine};
//!
//! fn main() -> pdfrender::Result<()> {
//!     let engine = PdfiumEngine::new()?;
//!     let doc = Document::open(&engine, "document.pdf")?;
//!     println!("{} pages", doc.page_count()?);
//!
//!     match doc.render_page(0, 150)? {
//!         Some(page) => page.save("page-1.png")?,
//!         None => println!("page 1 is blank"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `pdfium` (default): [`PdfiumEngine`], binding the PDFium shared library
//!   at runtime
//! - `c-shim`: `ShimEngine`, linking the `libpdfrender` poppler shim

pub mod bridge;
pub mod document;
pub mod engine;
pub mod error;
pub mod options;
pub mod page;

pub use document::{Document, PageRenders};
#[cfg(feature = "pdfium")]
pub use engine::PdfiumEngine;
#[cfg(feature = "c-shim")]
pub use engine::ShimEngine;
pub use engine::{NativeRaster, PdfEngine, PixelFormat, RenderRequest};
pub use error::{Error, Result};
pub use options::{PageSelection, RenderHints, RenderOptions, DEFAULT_DPI};
pub use page::{ColorMode, PageImage};

use serde::Serialize;

/// Summary of an opened document, as printed by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    /// Number of pages
    pub page_count: usize,
    /// Pixel size of each page at the requested DPI (`None` for blank pages)
    pub page_sizes: Vec<Option<(u32, u32)>>,
    /// Resolution the sizes were measured at
    pub dpi: u32,
}

impl DocumentInfo {
    /// Collect page count and rendered page sizes.
    ///
    /// Renders every page once; intended for inspection, not hot paths.
    pub fn collect<E: PdfEngine>(doc: &Document<'_, E>, dpi: u32) -> Result<Self> {
        let options = RenderOptions::new().with_dpi(dpi);
        let mut page_sizes = Vec::with_capacity(doc.page_count()?);
        for (_, page) in doc.render_pages(&options)? {
            page_sizes.push(page?.map(|p| p.dimensions()));
        }
        Ok(Self {
            page_count: doc.page_count()?,
            page_sizes,
            dpi,
        })
    }
}
