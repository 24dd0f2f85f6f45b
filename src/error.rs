//! Error types for pdfrender.

use std::io;
use thiserror::Error;

/// Result type alias for pdfrender operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by documents and the page renderer bridge.
///
/// Native engine failures never leak past this type: every load failure
/// collapses into [`Error::InvalidDocument`].
#[derive(Error, Debug)]
pub enum Error {
    /// The engine could not produce a document (malformed bytes, missing or
    /// unreadable file, password-protected content).
    #[error("invalid pdf file")]
    InvalidDocument,

    /// The requested page index is outside `[0, page_count)`.
    #[error("page index out of range: {index} (document has {page_count} pages)")]
    IndexOutOfRange { index: usize, page_count: usize },

    /// The document has been closed.
    #[error("document is closed")]
    Closed,

    /// Render resolution must be positive.
    #[error("invalid dpi: {0}")]
    InvalidDpi(u32),

    /// The engine returned a raster buffer whose length does not match its
    /// declared dimensions. `expected` is `usize::MAX` when the declared
    /// size itself overflows.
    #[error("malformed raster: expected {expected} bytes, engine returned {actual}")]
    MalformedRaster { expected: usize, actual: usize },

    /// The native engine library could not be loaded.
    #[error("PDF engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Error encoding or saving a page image.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error when writing output files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
