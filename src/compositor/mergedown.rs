//! Merging one plane's content into another.

use super::paint::Canvas;
use crate::buffer::Framebuffer;
use crate::error::Result;
use crate::geom::Rect;
use crate::scene::Plane;

/// Compose `region` of `src` over the matching area of `dst`.
///
/// The result is a `region`-sized patch meant to be written back into `dst`
/// at `(dst_y, dst_x)`. Callers have already checked both areas fit.
pub(crate) fn mergedown(
    src: &Plane,
    dst: &Plane,
    region: Rect,
    dst_y: u32,
    dst_x: u32,
) -> Result<Framebuffer> {
    let mut canvas = Canvas::new(region.rows, region.cols)?;
    canvas.paint(src, -i64::from(region.y), -i64::from(region.x))?;
    canvas.paint(dst, -i64::from(dst_y), -i64::from(dst_x))?;
    log::trace!(
        "merged {:?} {region:?} onto {:?} at ({dst_y}, {dst_x})",
        src.name(),
        dst.name()
    );
    Ok(canvas.finish())
}
