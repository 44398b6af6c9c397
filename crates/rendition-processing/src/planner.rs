//! RenditionPlanner - output dimensions for a size class.

use rendition_core::RenditionSize;

/// Scale `(width, height)` so the longer side equals `base`, keeping the aspect ratio.
///
/// Landscape sources pin the width, portrait and square sources pin the height. The
/// other side is truncated toward zero, not rounded. `height` must be non-zero.
pub fn compute_dimensions(width: u32, height: u32, base: u32) -> (u32, u32) {
    let aspect_ratio = f64::from(width) / f64::from(height);
    if width > height {
        (base, (f64::from(base) / aspect_ratio) as u32)
    } else {
        ((f64::from(base) * aspect_ratio) as u32, base)
    }
}

/// Dimensions for every size class, in the given order.
pub fn plan_sizes(
    width: u32,
    height: u32,
    sizes: &[RenditionSize],
) -> Vec<(RenditionSize, (u32, u32))> {
    sizes
        .iter()
        .map(|size| (*size, compute_dimensions(width, height, size.base_dimension())))
        .collect()
}
