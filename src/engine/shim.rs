//! [`PdfEngine`] over the `libpdfrender` C shim.
//!
//! The shim wraps poppler-cpp behind six C functions. Documents and raster
//! buffers it returns are owned by the native side until handed back to
//! `delete_document` / `delete_image_data`.

use std::ffi::{c_char, c_int, c_void, CString};
use std::path::Path;
use std::ptr::NonNull;
use std::slice;
use std::sync::Arc;

use log::{debug, trace};

use super::{NativeRaster, PdfEngine, PixelFormat, RenderRequest};

#[link(name = "pdfrender")]
extern "C" {
    fn load_document_from_raw_data(file_data: *const c_char, file_data_length: c_int) -> *mut c_void;
    fn load_document_from_file(filename: *const c_char) -> *mut c_void;
    fn delete_document(doc: *mut c_void);
    fn num_pages(doc: *mut c_void) -> c_int;
    fn render_page(
        doc: *mut c_void,
        index: c_int,
        dpi: c_int,
        height: *mut c_int,
        width: *mut c_int,
        format: *mut c_int,
    ) -> *const c_char;
    fn delete_image_data(data: *const c_char);
}

/// Native document returned by the shim.
pub struct ShimDocument {
    ptr: NonNull<c_void>,
    /// Bytes the shim parses lazily; must outlive `ptr`.
    _data: Option<Arc<[u8]>>,
}

/// Native raster buffer returned by the shim.
pub struct ShimBuffer {
    ptr: NonNull<c_char>,
    len: usize,
}

impl AsRef<[u8]> for ShimBuffer {
    fn as_ref(&self) -> &[u8] {
        // SAFETY: the shim allocates `width * height * bpp` bytes for every
        // non-null result and keeps them alive until `delete_image_data`,
        // which only runs when this buffer is consumed by `release_raster`.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr().cast::<u8>(), self.len) }
    }
}

/// Engine linking against the native shim. Rendering hints are fixed by
/// the shim (anti-aliasing, text anti-aliasing and hinting all on).
#[derive(Debug, Default, Clone, Copy)]
pub struct ShimEngine;

impl ShimEngine {
    /// Create the engine. The shim library is linked, not loaded, so this
    /// cannot fail.
    pub fn new() -> Self {
        Self
    }
}

impl PdfEngine for ShimEngine {
    type Document<'e> = ShimDocument;
    type Buffer = ShimBuffer;

    fn load_from_raw_data(&self, data: Arc<[u8]>) -> Option<ShimDocument> {
        let len = c_int::try_from(data.len()).ok()?;
        // SAFETY: `data` is kept in the returned document, so the pointer
        // stays valid until `delete_document` has run.
        let ptr = unsafe { load_document_from_raw_data(data.as_ptr().cast::<c_char>(), len) };
        Some(ShimDocument {
            ptr: NonNull::new(ptr)?,
            _data: Some(data),
        })
    }

    fn load_from_file(&self, path: &Path) -> Option<ShimDocument> {
        let filename = CString::new(path.to_str()?).ok()?;
        // SAFETY: `filename` is a valid NUL-terminated string for the call.
        let ptr = unsafe { load_document_from_file(filename.as_ptr()) };
        Some(ShimDocument {
            ptr: NonNull::new(ptr)?,
            _data: None,
        })
    }

    fn release_document(&self, doc: ShimDocument) {
        // SAFETY: `doc` came from a load call and is consumed here, so the
        // handle is deleted exactly once. `doc._data` drops after this.
        unsafe { delete_document(doc.ptr.as_ptr()) };
    }

    fn page_count(&self, doc: &ShimDocument) -> usize {
        // SAFETY: `doc` is a live handle.
        let pages = unsafe { num_pages(doc.ptr.as_ptr()) };
        usize::try_from(pages).unwrap_or(0)
    }

    fn render_page(&self, doc: &ShimDocument, request: &RenderRequest) -> Option<NativeRaster<ShimBuffer>> {
        let index = c_int::try_from(request.index).ok()?;
        let dpi = c_int::try_from(request.dpi).ok()?;
        trace!("shim render hints are fixed, requested {:#x}", request.hints.bits());

        let (mut height, mut width, mut format): (c_int, c_int, c_int) = (0, 0, 0);
        // SAFETY: `doc` is live and the out-pointers reference locals.
        let ptr = unsafe { render_page(doc.ptr.as_ptr(), index, dpi, &mut height, &mut width, &mut format) };
        let ptr = NonNull::new(ptr.cast_mut())?;

        let format = PixelFormat::from_tag(format);
        let (width, height) = match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                debug!("shim returned negative raster size {}x{}", width, height);
                (0, 0)
            }
        };
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
            .unwrap_or(0);

        Some(NativeRaster {
            buffer: ShimBuffer { ptr, len },
            width,
            height,
            format,
        })
    }

    fn release_raster(&self, buffer: ShimBuffer) {
        // SAFETY: each non-null render result is wrapped in exactly one
        // ShimBuffer, consumed here.
        unsafe { delete_image_data(buffer.ptr.as_ptr()) };
    }
}
