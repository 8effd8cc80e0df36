//! Display sizing for embedded raster images

use mdocx_ir::Image;

use crate::external::RasterImage;

/// Scale `(width, height)` down to `max_width`, keeping the aspect ratio.
/// Images that already fit are left alone.
pub fn fit_to_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let scaled = (u64::from(height) * u64::from(max_width) + u64::from(width) / 2) / u64::from(width);
    (max_width, scaled.clamp(1, u64::from(u32::MAX)) as u32)
}

/// Document image for a rasterized diagram or formula.
pub fn embed(raster: RasterImage, max_width: u32, description: impl Into<String>) -> Image {
    let (width_px, height_px) = fit_to_width(raster.width_px, raster.height_px, max_width);
    Image {
        data: raster.data,
        format: raster.format,
        width_px,
        height_px,
        description: Some(description.into()),
    }
}
