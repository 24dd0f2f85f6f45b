//! Rendered page images.

use std::path::Path;

use ::image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::error::Result;

/// Channel layout of a [`PageImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Single channel grayscale
    Luma,
    /// Three channels, R,G,B
    Rgb,
    /// Four channels, R,G,B,A
    Rgba,
}

impl ColorMode {
    /// Number of bytes per pixel.
    pub fn channels(self) -> usize {
        match self {
            ColorMode::Luma => 1,
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }

    /// Conventional imaging mode name ("L", "RGB", "RGBA").
    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Luma => "L",
            ColorMode::Rgb => "RGB",
            ColorMode::Rgba => "RGBA",
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rasterized page.
///
/// Pixels are row-major and tightly packed: `pixels.len() == width * height
/// * mode.channels()`, channels in the order named by the [`ColorMode`]. The
/// image owns its bytes and holds no reference to the document it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    width: u32,
    height: u32,
    mode: ColorMode,
    pixels: Vec<u8>,
    dpi: (u32, u32),
}

impl PageImage {
    pub(crate) fn new(width: u32, height: u32, mode: ColorMode, pixels: Vec<u8>, dpi: u32) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * mode.channels()
        );
        Self {
            width,
            height,
            mode,
            pixels,
            dpi: (dpi, dpi),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Channel layout.
    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    /// Resolution the page was rendered at, `(x, y)`.
    pub fn dpi(&self) -> (u32, u32) {
        self.dpi
    }

    /// Raw pixel bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Consume the image, returning its pixel bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    /// Channels of the pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let channels = self.mode.channels();
        let start = (y as usize * self.width as usize + x as usize) * channels;
        self.pixels.get(start..start + channels)
    }

    /// Copy into an [`image::DynamicImage`](::image::DynamicImage).
    pub fn to_dynamic_image(&self) -> DynamicImage {
        let (w, h) = self.dimensions();
        match self.mode {
            ColorMode::Luma => {
                let mut buf = GrayImage::new(w, h);
                buf.copy_from_slice(&self.pixels);
                DynamicImage::ImageLuma8(buf)
            }
            ColorMode::Rgb => {
                let mut buf = RgbImage::new(w, h);
                buf.copy_from_slice(&self.pixels);
                DynamicImage::ImageRgb8(buf)
            }
            ColorMode::Rgba => {
                let mut buf = RgbaImage::new(w, h);
                buf.copy_from_slice(&self.pixels);
                DynamicImage::ImageRgba8(buf)
            }
        }
    }

    /// Save to a file, format inferred from the extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_dynamic_image().save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> PageImage {
        // 2x2 RGBA: red, green / blue, white
        let pixels = vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ];
        PageImage::new(2, 2, ColorMode::Rgba, pixels, 96)
    }

    #[test]
    fn test_color_mode() {
        assert_eq!(ColorMode::Luma.channels(), 1);
        assert_eq!(ColorMode::Rgb.channels(), 3);
        assert_eq!(ColorMode::Rgba.channels(), 4);
        assert_eq!(ColorMode::Rgba.to_string(), "RGBA");
        assert_eq!(ColorMode::Luma.as_str(), "L");
    }

    #[test]
    fn test_accessors() {
        let page = checker();
        assert_eq!(page.dimensions(), (2, 2));
        assert_eq!(page.mode(), ColorMode::Rgba);
        assert_eq!(page.dpi(), (96, 96));
        assert_eq!(page.as_bytes().len(), 16);
    }

    #[test]
    fn test_pixel_lookup() {
        let page = checker();
        assert_eq!(page.pixel(0, 0), Some(&[255, 0, 0, 255][..]));
        assert_eq!(page.pixel(1, 0), Some(&[0, 255, 0, 255][..]));
        assert_eq!(page.pixel(0, 1), Some(&[0, 0, 255, 255][..]));
        assert_eq!(page.pixel(2, 0), None);
        assert_eq!(page.pixel(0, 2), None);
    }

    #[test]
    fn test_to_dynamic_image() {
        let image = checker().to_dynamic_image();
        let rgba = image.as_rgba8().expect("rgba image");
        assert_eq!(rgba.dimensions(), (2, 2));
        assert_eq!(rgba.get_pixel(0, 1).0, [0, 0, 255, 255]);

        let gray = PageImage::new(3, 1, ColorMode::Luma, vec![0, 128, 255], 72);
        let luma = gray.to_dynamic_image();
        assert_eq!(luma.as_luma8().expect("luma image").get_pixel(1, 0).0, [128]);
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        checker().save(&path).unwrap();

        let reloaded = ::image::open(&path).unwrap().to_rgba8();
        assert_eq!(reloaded.dimensions(), (2, 2));
        assert_eq!(reloaded.get_pixel(1, 1).0, [255, 255, 255, 255]);
    }
}
