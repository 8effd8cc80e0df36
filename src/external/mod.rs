//! External rasterization collaborators
//!
//! Diagram and math rasterization are delegated to injected
//! implementations of [`DiagramRenderer`] and [`MathRasterizer`]. Both
//! report failure as `None`; the exporter substitutes its fallback.

mod cache;
#[cfg(not(target_arch = "wasm32"))]
mod command;

pub use cache::DiagramCache;
#[cfg(not(target_arch = "wasm32"))]
pub use command::{run_with_timeout, CommandDiagramRenderer, CommandMathRasterizer};

use mdocx_ir::ImageFormat;

use crate::config::ChartTheme;

/// Renders diagram source (e.g. Mermaid) with an explicit theme.
pub trait DiagramRenderer {
    fn render(&self, source: &str, theme: ChartTheme) -> Option<RasterImage>;
}

/// Rasterizes LaTeX math for image math mode.
pub trait MathRasterizer {
    fn rasterize(&self, latex: &str) -> Option<RasterImage>;
}

/// Always fails, so every diagram gets the error label.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagramRenderer;

impl DiagramRenderer for NoDiagramRenderer {
    fn render(&self, _source: &str, _theme: ChartTheme) -> Option<RasterImage> {
        None
    }
}

/// Always fails, so image math mode falls back to native math.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMathRasterizer;

impl MathRasterizer for NoMathRasterizer {
    fn rasterize(&self, _latex: &str) -> Option<RasterImage> {
        None
    }
}

/// Encoded image bytes with their pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub width_px: u32,
    pub height_px: u32,
}

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

impl RasterImage {
    /// Identify PNG, JPEG or GIF data and read its dimensions from the
    /// header. Returns `None` for anything else or a zero-sized image.
    pub fn from_bytes(data: Vec<u8>) -> Option<Self> {
        let (format, (width_px, height_px)) = if data.starts_with(PNG_MAGIC) {
            (ImageFormat::Png, png_dimensions(&data)?)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            (ImageFormat::Gif, gif_dimensions(&data)?)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            (ImageFormat::Jpeg, jpeg_dimensions(&data)?)
        } else {
            return None;
        };
        if width_px == 0 || height_px == 0 {
            return None;
        }
        Some(RasterImage {
            data,
            format,
            width_px,
            height_px,
        })
    }
}

fn be_u32(bytes: &[u8]) -> Option<u32> {
    Some(u32::from_be_bytes(bytes.get(..4)?.try_into().ok()?))
}

fn be_u16(bytes: &[u8]) -> Option<u16> {
    Some(u16::from_be_bytes(bytes.get(..2)?.try_into().ok()?))
}

fn le_u16(bytes: &[u8]) -> Option<u16> {
    Some(u16::from_le_bytes(bytes.get(..2)?.try_into().ok()?))
}

/// IHDR is always the first chunk.
fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.get(12..16)? != b"IHDR" {
        return None;
    }
    Some((be_u32(data.get(16..)?)?, be_u32(data.get(20..)?)?))
}

fn gif_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    Some((
        le_u16(data.get(6..)?)? as u32,
        le_u16(data.get(8..)?)? as u32,
    ))
}

/// Walk the marker segments up to the first start-of-frame.
fn jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let mut pos = 2;
    loop {
        while *data.get(pos)? == 0xFF {
            pos += 1;
        }
        let marker = *data.get(pos)?;
        pos += 1;
        if matches!(marker, 0xD8 | 0x01 | 0xD0..=0xD7) {
            continue;
        }
        let len = be_u16(data.get(pos..)?)? as usize;
        let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            let height = be_u16(data.get(pos + 3..)?)? as u32;
            let width = be_u16(data.get(pos + 5..)?)? as u32;
            return Some((width, height));
        }
        if len < 2 {
            return None;
        }
        pos += len;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal PNG header (signature + IHDR) with the given size.
    pub(crate) fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut data = PNG_MAGIC.to_vec();
        data.extend_from_slice(&13u32.to_be_bytes());
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, 6, 0, 0, 0]);
        data
    }

    #[test]
    fn png_dimensions_are_read() {
        let image = RasterImage::from_bytes(png_header(1200, 300)).expect("png");
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!((image.width_px, image.height_px), (1200, 300));
    }

    #[test]
    fn gif_dimensions_are_read() {
        let mut data = b"GIF89a".to_vec();
        data.extend_from_slice(&[0x40, 0x01, 0xC8, 0x00]);
        let image = RasterImage::from_bytes(data).expect("gif");
        assert_eq!((image.width_px, image.height_px), (320, 200));
    }

    #[test]
    fn jpeg_dimensions_are_read() {
        let mut data = vec![0xFF, 0xD8];
        // APP0 segment with a 4 byte payload.
        data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x06, 0, 0, 0, 0]);
        // SOF0: length, precision, height 100, width 250.
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x64, 0x00, 0xFA]);
        let image = RasterImage::from_bytes(data).expect("jpeg");
        assert_eq!(image.format, ImageFormat::Jpeg);
        assert_eq!((image.width_px, image.height_px), (250, 100));
    }

    #[test]
    fn unknown_or_empty_data_is_rejected() {
        assert!(RasterImage::from_bytes(b"<svg/>".to_vec()).is_none());
        assert!(RasterImage::from_bytes(Vec::new()).is_none());
        assert!(RasterImage::from_bytes(png_header(0, 10)).is_none());
        assert!(RasterImage::from_bytes(PNG_MAGIC.to_vec()).is_none());
    }

    #[test]
    fn null_collaborators_fail() {
        assert!(NoDiagramRenderer.render("graph TD", ChartTheme::Forest).is_none());
        assert!(NoMathRasterizer.rasterize("x").is_none());
    }
}
