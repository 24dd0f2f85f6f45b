//! Document handle: owns one native document for its whole lifetime.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use log::debug;

use crate::bridge;
use crate::engine::{PdfEngine, RenderRequest};
use crate::error::{Error, Result};
use crate::options::RenderOptions;
use crate::page::PageImage;

/// An opened PDF document.
///
/// The native document is released exactly once, by [`close`](Self::close)
/// or when the value is dropped, whichever comes first. Every operation
/// except `close` fails with [`Error::Closed`] afterwards.
///
/// # Example
///
/// ```no_run
/// use pdfrender::{Document, PdfiumEngine};
///
/// let engine = PdfiumEngine::new()?;
/// let doc = Document::open(&engine, "report.pdf")?;
/// if let Some(page) = doc.render_page(0, 150)? {
///     page.save("page-1.png")?;
/// }
/// # Ok::<(), pdfrender::Error>(())
/// ```
pub struct Document<'e, E: PdfEngine + 'e> {
    engine: &'e E,
    native: Option<E::Document<'e>>,
    /// Input bytes, kept alive while the engine may still read them.
    bytes: Option<Arc<[u8]>>,
    page_count: usize,
}

impl<'e, E: PdfEngine + 'e> Document<'e, E> {
    /// Open a document from the raw bytes of a PDF file.
    ///
    /// The bytes are copied; the document owns the copy until it is closed.
    pub fn from_bytes(engine: &'e E, data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            debug!("refusing to open empty buffer");
            return Err(Error::InvalidDocument);
        }

        let bytes: Arc<[u8]> = Arc::from(data);
        let native = engine
            .load_from_raw_data(Arc::clone(&bytes))
            .ok_or_else(|| {
                debug!("engine rejected {} byte buffer", bytes.len());
                Error::InvalidDocument
            })?;
        Ok(Self::wrap(engine, native, Some(bytes)))
    }

    /// Open a document from a file path.
    ///
    /// A missing or unreadable file is reported as [`Error::InvalidDocument`],
    /// like any other load failure.
    pub fn open<P: AsRef<Path>>(engine: &'e E, path: P) -> Result<Self> {
        let path = path.as_ref();
        let native = engine.load_from_file(path).ok_or_else(|| {
            debug!("engine could not load {}", path.display());
            Error::InvalidDocument
        })?;
        Ok(Self::wrap(engine, native, None))
    }

    /// Open a document by reading a reader to the end.
    pub fn from_reader<R: Read>(engine: &'e E, mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).map_err(|e| {
            debug!("failed to read document: {}", e);
            Error::InvalidDocument
        })?;
        Self::from_bytes(engine, &data)
    }

    fn wrap(engine: &'e E, native: E::Document<'e>, bytes: Option<Arc<[u8]>>) -> Self {
        let page_count = engine.page_count(&native);
        debug!("opened document with {} pages", page_count);
        Self {
            engine,
            native: Some(native),
            bytes,
            page_count,
        }
    }

    fn native(&self) -> Result<&E::Document<'e>> {
        self.native.as_ref().ok_or(Error::Closed)
    }

    /// Number of pages.
    pub fn page_count(&self) -> Result<usize> {
        self.native()?;
        Ok(self.page_count)
    }

    /// Number of pages, or 0 once closed.
    pub fn len(&self) -> usize {
        if self.is_closed() {
            0
        } else {
            self.page_count
        }
    }

    /// Whether the document has no pages (or is closed).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the native document has been released.
    pub fn is_closed(&self) -> bool {
        self.native.is_none()
    }

    /// Render one page at `dpi` with default render hints.
    ///
    /// Returns `Ok(None)` when the engine renders nothing for the page.
    pub fn render_page(&self, index: usize, dpi: u32) -> Result<Option<PageImage>> {
        self.render_page_with(index, &RenderOptions::new().with_dpi(dpi))
    }

    /// Render one page with explicit options. `options.pages` is ignored.
    pub fn render_page_with(&self, index: usize, options: &RenderOptions) -> Result<Option<PageImage>> {
        let native = self.native()?;
        if options.dpi == 0 {
            return Err(Error::InvalidDpi(options.dpi));
        }
        if index >= self.page_count {
            return Err(Error::IndexOutOfRange {
                index,
                page_count: self.page_count,
            });
        }

        let request = RenderRequest {
            index,
            dpi: options.dpi,
            hints: options.hints,
        };
        bridge::render(self.engine, native, &request)
    }

    /// Render every page selected by `options.pages`, lazily, in page order.
    pub fn render_pages<'a>(&'a self, options: &'a RenderOptions) -> Result<PageRenders<'a, 'e, E>> {
        let page_count = self.page_count()?;
        Ok(PageRenders {
            doc: self,
            options,
            indices: options.pages.indices(page_count).into_iter(),
        })
    }

    /// Release the native document. Calling it again is a no-op.
    pub fn close(&mut self) {
        if let Some(native) = self.native.take() {
            self.engine.release_document(native);
            debug!("document closed");
        }
        // The engine may have referenced these until the release above.
        self.bytes = None;
    }

    /// Run `f` with this document, closing it afterwards on every exit path.
    pub fn scoped<R>(mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let result = f(&mut self);
        self.close();
        result
    }
}

impl<'e, E: PdfEngine + 'e> Drop for Document<'e, E> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<'e, E: PdfEngine + 'e> fmt::Debug for Document<'e, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("page_count", &self.page_count)
            .field("closed", &self.is_closed())
            .field("in_memory", &self.bytes.is_some())
            .finish()
    }
}

/// Iterator returned by [`Document::render_pages`].
pub struct PageRenders<'a, 'e, E: PdfEngine + 'e> {
    doc: &'a Document<'e, E>,
    options: &'a RenderOptions,
    indices: std::vec::IntoIter<usize>,
}

impl<'a, 'e, E: PdfEngine + 'e> Iterator for PageRenders<'a, 'e, E> {
    /// Zero-based page index and its render outcome.
    type Item = (usize, Result<Option<PageImage>>);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.indices.next()?;
        Some((index, self.doc.render_page_with(index, self.options)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<'a, 'e, E: PdfEngine + 'e> ExactSizeIterator for PageRenders<'a, 'e, E> {}
