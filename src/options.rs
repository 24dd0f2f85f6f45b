//! Render options and page selection.

use std::ops::RangeInclusive;

/// Resolution used when the caller does not choose one (1 pixel per point).
pub const DEFAULT_DPI: u32 = 72;

/// Options for rendering document pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Resolution in dots per inch, applied to both axes
    pub dpi: u32,

    /// Rasterizer quality hints
    pub hints: RenderHints,

    /// Pages to render with [`Document::render_pages`](crate::Document::render_pages)
    pub pages: PageSelection,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the render hints.
    pub fn with_hints(mut self, hints: RenderHints) -> Self {
        self.hints = hints;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Set a specific page range (inclusive, 1-indexed).
    pub fn with_page_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.pages = PageSelection::Range(range);
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            hints: RenderHints::default(),
            pages: PageSelection::All,
        }
    }
}

/// Quality hints forwarded to the rasterizer.
///
/// Engines that cannot honor a hint ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderHints {
    /// Anti-alias vector paths and images
    pub antialias: bool,
    /// Anti-alias glyphs
    pub text_antialias: bool,
    /// Apply font hinting to glyphs
    pub text_hinting: bool,
}

impl RenderHints {
    const ANTIALIAS: u32 = 0x1;
    const TEXT_ANTIALIAS: u32 = 0x2;
    const TEXT_HINTING: u32 = 0x4;

    /// All hints off: fastest, aliased output.
    pub fn none() -> Self {
        Self {
            antialias: false,
            text_antialias: false,
            text_hinting: false,
        }
    }

    /// Enable or disable path/image anti-aliasing.
    pub fn with_antialias(mut self, on: bool) -> Self {
        self.antialias = on;
        self
    }

    /// Enable or disable glyph anti-aliasing.
    pub fn with_text_antialias(mut self, on: bool) -> Self {
        self.text_antialias = on;
        self
    }

    /// Enable or disable glyph hinting.
    pub fn with_text_hinting(mut self, on: bool) -> Self {
        self.text_hinting = on;
        self
    }

    /// Bit encoding used by the native shim ABI.
    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.antialias {
            bits |= Self::ANTIALIAS;
        }
        if self.text_antialias {
            bits |= Self::TEXT_ANTIALIAS;
        }
        if self.text_hinting {
            bits |= Self::TEXT_HINTING;
        }
        bits
    }

    /// Decode the shim bit encoding; unknown bits are ignored.
    pub fn from_bits(bits: u32) -> Self {
        Self {
            antialias: bits & Self::ANTIALIAS != 0,
            text_antialias: bits & Self::TEXT_ANTIALIAS != 0,
            text_hinting: bits & Self::TEXT_HINTING != 0,
        }
    }
}

impl Default for RenderHints {
    fn default() -> Self {
        Self::from_bits(Self::ANTIALIAS | Self::TEXT_ANTIALIAS | Self::TEXT_HINTING)
    }
}

/// Page selection for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Render all pages
    #[default]
    All,
    /// Render a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Render specific pages (1-indexed)
    Pages(Vec<u32>),
    /// Render a union of inclusive, 1-indexed ranges. [`parse`](Self::parse)
    /// produces these sorted, with overlapping and adjacent ranges merged.
    Ranges(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    /// Check if a 1-indexed page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
            PageSelection::Ranges(ranges) => ranges.iter().any(|range| range.contains(&page)),
        }
    }

    /// Zero-based indices of the selected pages that exist in a document
    /// of `page_count` pages, in ascending order.
    pub fn indices(&self, page_count: usize) -> Vec<usize> {
        (0..page_count)
            .filter(|&index| {
                u32::try_from(index + 1)
                    .map(|page| self.includes(page))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                return Ok(PageSelection::Range(parse_range(s, start, end)?));
            }
        }

        let mut ranges = Vec::new();
        for part in s.split(',') {
            let range = match part.split_once('-') {
                Some((start, end)) => parse_range(part, start, end)?,
                None => {
                    let page = parse_page(part)?;
                    page..=page
                }
            };
            ranges.push(range);
        }

        Ok(PageSelection::Ranges(merge_ranges(ranges)))
    }
}

fn parse_range(s: &str, start: &str, end: &str) -> Result<RangeInclusive<u32>, String> {
    let start = parse_page(start)?;
    let end = parse_page(end)?;
    if start > end {
        return Err(format!("Invalid page range: {}", s.trim()));
    }
    Ok(start..=end)
}

/// Sort ranges by start and merge those that overlap or touch.
fn merge_ranges(mut ranges: Vec<RangeInclusive<u32>>) -> Vec<RangeInclusive<u32>> {
    ranges.sort_unstable_by_key(|range| *range.start());

    let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if *range.start() <= last.end().saturating_add(1) => {
                if range.end() > last.end() {
                    *last = *last.start()..=*range.end();
                }
            }
            _ => merged.push(range),
        }
    }
    merged
}

fn parse_page(s: &str) -> Result<u32, String> {
    match s.trim().parse::<u32>() {
        Ok(0) => Err("Page numbers start at 1".to_string()),
        Ok(page) => Ok(page),
        Err(_) => Err(format!("Invalid page number: {}", s.trim())),
    }
}
