//! Page renderer bridge.
//!
//! The only place raw engine rasters are read. A raster buffer is wrapped in
//! [`RasterGuard`] as soon as the engine hands it over, so it is released on
//! every exit path: success, "no image", malformed raster, or unwinding.

use log::{debug, trace, warn};

use crate::engine::{NativeRaster, PdfEngine, PixelFormat, RenderRequest};
use crate::error::{Error, Result};
use crate::page::{ColorMode, PageImage};

/// Owns an engine raster buffer until dropped, then releases it.
struct RasterGuard<'a, E: PdfEngine> {
    engine: &'a E,
    buffer: Option<E::Buffer>,
}

impl<'a, E: PdfEngine> RasterGuard<'a, E> {
    fn new(engine: &'a E, buffer: E::Buffer) -> Self {
        Self {
            engine,
            buffer: Some(buffer),
        }
    }

    fn bytes(&self) -> &[u8] {
        match &self.buffer {
            Some(buffer) => buffer.as_ref(),
            None => &[],
        }
    }
}

impl<E: PdfEngine> Drop for RasterGuard<'_, E> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            trace!("releasing native raster buffer");
            self.engine.release_raster(buffer);
        }
    }
}

/// Render one page of a loaded native document into an owned image.
///
/// The request must already be validated (`index < page_count`, `dpi > 0`).
/// Returns `Ok(None)` when the engine renders nothing.
pub fn render<E: PdfEngine>(
    engine: &E,
    doc: &E::Document<'_>,
    request: &RenderRequest,
) -> Result<Option<PageImage>> {
    let Some(raster) = engine.render_page(doc, request) else {
        debug!("page {} produced no raster", request.index);
        return Ok(None);
    };

    let NativeRaster {
        buffer,
        width,
        height,
        format,
    } = raster;
    let guard = RasterGuard::new(engine, buffer);

    let image = copy_raster(guard.bytes(), width, height, format, request.dpi)?;
    match &image {
        Some(page) => debug!(
            "rendered page {} at {} dpi: {}x{} {}",
            request.index,
            request.dpi,
            page.width(),
            page.height(),
            page.mode()
        ),
        None => debug!("page {} rendered blank ({:?})", request.index, format),
    }
    Ok(image)
}

/// Copy a native raster into canonical channel order.
fn copy_raster(
    bytes: &[u8],
    width: u32,
    height: u32,
    format: PixelFormat,
    dpi: u32,
) -> Result<Option<PageImage>> {
    let mode = match format {
        PixelFormat::None => return Ok(None),
        PixelFormat::Grayscale => ColorMode::Luma,
        PixelFormat::Rgb => ColorMode::Rgb,
        PixelFormat::Rgba => ColorMode::Rgba,
    };
    if width == 0 || height == 0 {
        return Ok(None);
    }

    let Some(expected) = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
    else {
        warn!(
            "engine raster {}x{} {:?} overflows the address space ({} bytes returned)",
            width,
            height,
            format,
            bytes.len()
        );
        return Err(Error::MalformedRaster {
            expected: usize::MAX,
            actual: bytes.len(),
        });
    };
    if bytes.len() != expected {
        warn!(
            "engine raster {}x{} {:?} is {} bytes, expected {}",
            width,
            height,
            format,
            bytes.len(),
            expected
        );
        return Err(Error::MalformedRaster {
            expected,
            actual: bytes.len(),
        });
    }

    let mut pixels = bytes.to_vec();
    if mode == ColorMode::Rgba {
        // BGRA -> RGBA
        for px in pixels.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
    }
    Ok(Some(PageImage::new(width, height, mode, pixels, dpi)))
}
