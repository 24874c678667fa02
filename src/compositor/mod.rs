//! Compositor: flattening a pile into a single framebuffer.
//!
//! Planes are visited from the top of the z-list down. For every output
//! cell the topmost plane that supplies a glyph wins the glyph, while colors
//! accumulate through planes whose alpha lets lower planes show through.
//!
//! The pass only reads the scene, so separate piles can be composed on
//! separate threads with a shared `&Scene`.

mod blend;
mod mergedown;
mod paint;

pub(crate) use mergedown::mergedown;

use crate::buffer::Framebuffer;
use crate::error::Result;
use crate::scene::{PileId, Scene};
use paint::Canvas;

/// Flatten `pile` into a `rows` x `cols` grid anchored at the pile origin.
pub(crate) fn render(scene: &Scene, pile: PileId, rows: u32, cols: u32) -> Result<Framebuffer> {
    let mut canvas = Canvas::new(rows, cols)?;
    let mut painted = 0usize;
    for id in scene.planes(pile) {
        let (y, x) = scene.abs_yx(id)?;
        canvas.paint(scene.plane(id)?, i64::from(y), i64::from(x))?;
        painted += 1;
    }
    log::trace!("composed {pile:?}: {painted} planes into {rows}x{cols}");
    Ok(canvas.finish())
}
