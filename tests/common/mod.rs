//! Shared fixtures: synthetic PDFs and an instrumented in-process engine.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Weak};

use pdfrender::{NativeRaster, PdfEngine, PixelFormat, RenderRequest};

/// US Letter in points.
pub const LETTER: (u32, u32) = (612, 792);

/// Fill colour painted on every synthetic page, RGB.
pub const FILL_RGB: [u8; 3] = [249, 178, 10];

/// Build a PDF with one page per `(width, height)` entry (points), each
/// page filled with [`FILL_RGB`].
pub fn build_pdf(pages: &[(u32, u32)]) -> Vec<u8> {
    build_pdf_with_trailer(pages, "")
}

/// A PDF whose trailer declares an encryption dictionary.
pub fn build_encrypted_pdf() -> Vec<u8> {
    build_pdf_with_trailer(
        &[LETTER],
        "/Encrypt << /Filter /Standard /V 1 /R 2 /Length 40 /P -4 \
         /O <0000000000000000000000000000000000000000000000000000000000000000> \
         /U <0000000000000000000000000000000000000000000000000000000000000000> >> \
         /ID [<00112233445566778899aabbccddeeff> <00112233445566778899aabbccddeeff>] ",
    )
}

fn build_pdf_with_trailer(pages: &[(u32, u32)], trailer_extra: &str) -> Vec<u8> {
    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::new();

    let mut push_obj = |out: &mut String, offsets: &mut Vec<usize>, body: String| {
        offsets.push(out.len());
        let num = offsets.len();
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", num, body));
    };

    push_obj(&mut out, &mut offsets, "<< /Type /Catalog /Pages 2 0 R >>".to_string());

    let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", 3 + i * 2)).collect();
    push_obj(
        &mut out,
        &mut offsets,
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
    );

    let [r, g, b] = FILL_RGB.map(|c| c as f32 / 255.0);
    for (i, (w, h)) in pages.iter().enumerate() {
        let content_obj = 4 + i * 2;
        push_obj(
            &mut out,
            &mut offsets,
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Contents {} 0 R >>",
                w, h, content_obj
            ),
        );
        let stream = format!("{:.4} {:.4} {:.4} rg 0 0 {} {} re f", r, g, b, w, h);
        push_obj(
            &mut out,
            &mut offsets,
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                stream.len(),
                stream
            ),
        );
    }

    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n", offsets.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for offset in &offsets {
        out.push_str(&format!("{:010} 00000 n \n", offset));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R {}>>\nstartxref\n{}\n%%EOF\n",
        offsets.len() + 1,
        trailer_extra,
        xref_offset
    ));
    out.into_bytes()
}

/// Page sizes of a synthetic PDF, or `None` if it is not one this engine
/// accepts (bad header, truncated, encrypted).
fn parse_pages(data: &[u8]) -> Option<Vec<(f32, f32)>> {
    let text = std::str::from_utf8(data).ok()?;
    if !text.starts_with("%PDF-") || !text.trim_end().ends_with("%%EOF") {
        return None;
    }
    if text.contains("/Encrypt") {
        return None;
    }

    let mut pages = Vec::new();
    for chunk in text.split("/Type /Page ").skip(1) {
        let media = chunk.split("/MediaBox [").nth(1)?.split(']').next()?;
        let nums: Vec<f32> = media
            .split_whitespace()
            .filter_map(|n| n.parse().ok())
            .collect();
        if nums.len() != 4 {
            return None;
        }
        pages.push((nums[2] - nums[0], nums[3] - nums[1]));
    }
    Some(pages)
}

/// Native document of the [`StubEngine`].
pub struct StubDocument {
    id: usize,
    pages: Vec<(f32, f32)>,
    /// Lazily-referenced input, like a native parser holding the buffer.
    _data: Option<Arc<[u8]>>,
}

/// Raster buffer of the [`StubEngine`].
pub struct StubBuffer {
    bytes: Vec<u8>,
}

impl AsRef<[u8]> for StubBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Instrumented engine: counts every native acquisition and release.
#[derive(Default)]
pub struct StubEngine {
    loads: Cell<usize>,
    released_docs: RefCell<HashSet<usize>>,
    render_calls: Cell<usize>,
    rasters_out: Cell<usize>,
    rasters_released: Cell<usize>,
    retained: RefCell<Vec<Weak<[u8]>>>,
    /// Pages answered with a `None` format tag (buffer still allocated)
    pub blank_pages: HashSet<usize>,
    /// Pages answered with no raster at all
    pub null_pages: HashSet<usize>,
    /// Pages answered with a buffer one row short
    pub short_pages: HashSet<usize>,
    /// Pages answered with a buffer one row long
    pub long_pages: HashSet<usize>,
    /// Pages rendered as grayscale
    pub gray_pages: HashSet<usize>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loads(&self) -> usize {
        self.loads.get()
    }

    pub fn released_documents(&self) -> usize {
        self.released_docs.borrow().len()
    }

    pub fn open_documents(&self) -> usize {
        self.loads() - self.released_documents()
    }

    pub fn render_calls(&self) -> usize {
        self.render_calls.get()
    }

    pub fn rasters_returned(&self) -> usize {
        self.rasters_out.get()
    }

    pub fn outstanding_rasters(&self) -> usize {
        self.rasters_out.get() - self.rasters_released.get()
    }

    /// Number of input buffers handed to the engine that are still alive.
    pub fn live_buffers(&self) -> usize {
        self.retained
            .borrow()
            .iter()
            .filter(|w| w.upgrade().is_some())
            .count()
    }

    fn load(&self, pages: Vec<(f32, f32)>, data: Option<Arc<[u8]>>) -> StubDocument {
        let id = self.loads.get();
        self.loads.set(id + 1);
        StubDocument {
            id,
            pages,
            _data: data,
        }
    }
}

impl PdfEngine for StubEngine {
    type Document<'e> = StubDocument;
    type Buffer = StubBuffer;

    fn load_from_raw_data(&self, data: Arc<[u8]>) -> Option<StubDocument> {
        let pages = parse_pages(&data)?;
        self.retained.borrow_mut().push(Arc::downgrade(&data));
        Some(self.load(pages, Some(data)))
    }

    fn load_from_file(&self, path: &Path) -> Option<StubDocument> {
        let data = std::fs::read(path).ok()?;
        let pages = parse_pages(&data)?;
        Some(self.load(pages, None))
    }

    fn release_document(&self, doc: StubDocument) {
        let fresh = self.released_docs.borrow_mut().insert(doc.id);
        assert!(fresh, "document {} released twice", doc.id);
    }

    fn page_count(&self, doc: &StubDocument) -> usize {
        doc.pages.len()
    }

    fn render_page(&self, doc: &StubDocument, request: &RenderRequest) -> Option<NativeRaster<StubBuffer>> {
        self.render_calls.set(self.render_calls.get() + 1);
        let index = request.index;
        assert!(index < doc.pages.len(), "engine called with unchecked index");

        if self.null_pages.contains(&index) {
            return None;
        }

        let (w, h) = doc.pages[index];
        let width = (w * request.scale()).round() as u32;
        let height = (h * request.scale()).round() as u32;
        let [r, g, b] = FILL_RGB;

        let (format, pixel): (PixelFormat, Vec<u8>) = if self.blank_pages.contains(&index) {
            (PixelFormat::None, vec![0; 4])
        } else if self.gray_pages.contains(&index) {
            (PixelFormat::Grayscale, vec![g])
        } else {
            (PixelFormat::Rgba, vec![b, g, r, 255])
        };

        let mut rows = height as usize;
        if self.short_pages.contains(&index) {
            rows = rows.saturating_sub(1);
        }
        if self.long_pages.contains(&index) {
            rows += 1;
        }
        let bytes = pixel.repeat(width as usize * rows);

        self.rasters_out.set(self.rasters_out.get() + 1);
        Some(NativeRaster {
            buffer: StubBuffer { bytes },
            width,
            height,
            format,
        })
    }

    fn release_raster(&self, _buffer: StubBuffer) {
        self.rasters_released.set(self.rasters_released.get() + 1);
    }
}
