//! [`PdfEngine`] backed by PDFium through `pdfium-render`.
//!
//! The PDFium shared library is bound at runtime. Discovery order:
//! 1. `PDFIUM_DYNAMIC_LIB_PATH` (library file or the directory holding it)
//! 2. The current working directory
//! 3. System library search paths

use std::path::Path;
use std::sync::Arc;

use log::{debug, trace};
use pdfium_render::prelude::*;

use super::{NativeRaster, PdfEngine, PixelFormat, RenderRequest};
use crate::error::{Error, Result};

/// Environment variable naming the PDFium library to bind.
pub const PDFIUM_LIB_ENV: &str = "PDFIUM_DYNAMIC_LIB_PATH";

/// PDFium-backed engine. Documents borrow the engine.
pub struct PdfiumEngine {
    pdfium: Pdfium,
}

impl PdfiumEngine {
    /// Bind PDFium using the default discovery order.
    pub fn new() -> Result<Self> {
        if let Ok(path) = std::env::var(PDFIUM_LIB_ENV) {
            debug!("binding PDFium from {}={}", PDFIUM_LIB_ENV, path);
            return Self::from_library(path);
        }

        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| Error::EngineUnavailable(format!("PDFium library not found: {}", e)))?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    /// Bind PDFium from a library file, or from the platform library name
    /// inside a directory.
    pub fn from_library<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let location = path.to_string_lossy();
        let bindings = if path.is_dir() {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&*location))
        } else {
            Pdfium::bind_to_library(&*location)
        }
        .map_err(|e| {
            Error::EngineUnavailable(format!("failed to load PDFium from {}: {}", location, e))
        })?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PdfEngine for PdfiumEngine {
    type Document<'e> = PdfDocument<'e>;
    type Buffer = Vec<u8>;

    fn load_from_raw_data<'e>(&'e self, data: Arc<[u8]>) -> Option<PdfDocument<'e>> {
        match self.pdfium.load_pdf_from_byte_vec(data.to_vec(), None) {
            Ok(doc) => Some(doc),
            Err(e) => {
                debug!("PDFium rejected buffer: {}", e);
                None
            }
        }
    }

    fn load_from_file<'e>(&'e self, path: &Path) -> Option<PdfDocument<'e>> {
        match self.pdfium.load_pdf_from_file(&path, None) {
            Ok(doc) => Some(doc),
            Err(e) => {
                debug!("PDFium rejected {}: {}", path.display(), e);
                None
            }
        }
    }

    fn release_document(&self, doc: PdfDocument<'_>) {
        // Closing happens in PdfDocument's Drop.
        drop(doc);
    }

    fn page_count(&self, doc: &PdfDocument<'_>) -> usize {
        doc.pages().len() as usize
    }

    fn render_page(&self, doc: &PdfDocument<'_>, request: &RenderRequest) -> Option<NativeRaster<Vec<u8>>> {
        let index = request.index.try_into().ok()?;
        let page = match doc.pages().get(index) {
            Ok(page) => page,
            Err(e) => {
                debug!("PDFium could not load page {}: {}", request.index, e);
                return None;
            }
        };

        if request.hints.text_hinting {
            trace!("text hinting is not configurable in PDFium, ignoring");
        }
        let config = PdfRenderConfig::new()
            .scale_page_by_factor(request.scale())
            .set_format(PdfBitmapFormat::BGRA)
            .set_path_smoothing(request.hints.antialias)
            .set_image_smoothing(request.hints.antialias)
            .set_text_smoothing(request.hints.text_antialias);

        let bitmap = match page.render_with_config(&config) {
            Ok(bitmap) => bitmap,
            Err(e) => {
                debug!("PDFium failed to render page {}: {}", request.index, e);
                return None;
            }
        };

        let width = u32::try_from(bitmap.width()).ok()?;
        let height = u32::try_from(bitmap.height()).ok()?;
        let buffer = pack_rows(&bitmap.as_raw_bytes(), width, height);

        Some(NativeRaster {
            buffer,
            width,
            height,
            format: PixelFormat::Rgba,
        })
    }

    fn release_raster(&self, buffer: Vec<u8>) {
        drop(buffer);
    }
}

/// Copy a 4-byte-per-pixel bitmap into tightly packed rows.
///
/// PDFium rows may be padded past `width * 4`; the stride is derived from
/// the buffer length. A buffer with no padding is copied as is.
fn pack_rows(raw: &[u8], width: u32, height: u32) -> Vec<u8> {
    let row = width as usize * 4;
    let stride = if height == 0 {
        0
    } else {
        raw.len() / height as usize
    };
    if stride > row {
        raw.chunks_exact(stride)
            .flat_map(|line| &line[..row])
            .copied()
            .collect()
    } else {
        raw.to_vec()
    }
}
