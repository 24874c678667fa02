//! Painter's pass: fold planes top to bottom into one canvas.
//!
//! Each output cell keeps a running accumulator. A channel stops taking
//! contributions once it turns opaque, and the glyph is locked by the first
//! plane that supplies one. Planes below a fully locked cell cannot change
//! it.

use super::blend::{blend, high_contrast_fg};
use crate::buffer::{Alpha, Cell, Channel, ChannelPair, Framebuffer};
use crate::error::Result;
use crate::scene::Plane;

#[derive(Debug, Clone, Copy, Default)]
struct Accum {
    fg_blends: u32,
    bg_blends: u32,
    high_contrast: bool,
    locked: bool,
}

/// An in-progress composition.
pub(crate) struct Canvas {
    out: Framebuffer,
    acc: Vec<Accum>,
}

impl Canvas {
    pub(crate) fn new(rows: u32, cols: u32) -> Result<Self> {
        let mut out = Framebuffer::new(rows, cols)?;
        let transparent = Channel::DEFAULT.with_alpha(Alpha::Transparent);
        let start = ChannelPair::combine(transparent, transparent);
        for cell in out.cells_mut() {
            cell.set_channels(start);
        }
        let acc = vec![Accum::default(); out.len()];
        Ok(Self { out, acc })
    }

    /// Fold `plane` in beneath everything painted so far, with its origin
    /// at canvas position `(oy, ox)`.
    pub(crate) fn paint(&mut self, plane: &Plane, oy: i64, ox: i64) -> Result<()> {
        let (rows, cols) = self.out.dims();
        let fb = plane.framebuffer();
        let base = *plane.base_cell();

        let py0 = u32::try_from(-oy).unwrap_or(0);
        let px0 = u32::try_from(-ox).unwrap_or(0);
        for py in py0..fb.rows() {
            let Ok(ty) = u32::try_from(oy + i64::from(py)) else {
                continue;
            };
            if ty >= rows {
                break;
            }
            for px in px0..fb.cols() {
                let Ok(tx) = u32::try_from(ox + i64::from(px)) else {
                    continue;
                };
                if tx >= cols {
                    break;
                }
                let t = (ty as usize) * (cols as usize) + tx as usize;
                let raw = fb.cells()[(py as usize) * (fb.cols() as usize) + px as usize];
                self.paint_cell(t, tx, &raw, &base, fb)?;
            }
        }
        Ok(())
    }

    fn paint_cell(
        &mut self,
        t: usize,
        tx: u32,
        raw: &Cell,
        base: &Cell,
        fb: &Framebuffer,
    ) -> Result<()> {
        let cols = self.out.cols();
        let mut target = self.out.cells()[t];
        if target.is_wide_continuation() {
            return Ok(());
        }
        let mut acc = self.acc[t];

        if target.fchannel().alpha() != Alpha::Opaque {
            let vis = if raw.fchannel().is_default() { base } else { raw };
            let src = vis.fchannel();
            let mut fg = target.fchannel();
            if src.is_palindex() {
                if fg.alpha() == Alpha::Transparent {
                    fg = src.with_alpha(Alpha::Opaque);
                }
            } else {
                if src.alpha() == Alpha::HighContrast {
                    acc.high_contrast = true;
                }
                fg = blend(fg, src, &mut acc.fg_blends);
                if acc.high_contrast {
                    fg.set_alpha(Alpha::Opaque);
                }
            }
            target.set_channels(target.channels().with_fg(fg));
        }

        if target.bchannel().alpha() != Alpha::Opaque {
            let vis = if raw.bchannel().is_default() { base } else { raw };
            let mut src = vis.bchannel();
            if src.alpha() == Alpha::HighContrast {
                src.set_alpha(Alpha::Opaque);
            }
            let mut bg = target.bchannel();
            if src.is_palindex() {
                if bg.alpha() == Alpha::Transparent {
                    bg = src.with_alpha(Alpha::Opaque);
                }
            } else {
                bg = blend(bg, src, &mut acc.bg_blends);
            }
            target.set_channels(target.channels().with_bg(bg));
        }

        if !acc.locked {
            let vis = if raw.is_unwritten() { base } else { raw };
            if vis.has_glyph() {
                let next_locked = self.acc.get(t + 1).is_some_and(|a| a.locked);
                let glyph = if vis.is_wide() && (tx + 1 >= cols || next_locked) {
                    Cell::new(' ')
                } else {
                    self.out.adopt(vis, fb.pool())?
                };
                target.set_glyph_from(&glyph);
                target.set_style(vis.style());
                acc.locked = true;
            } else if vis.is_wide_continuation() {
                target.set_glyph_from(&Cell::wide_continuation());
                target.set_style(vis.style());
                acc.locked = true;
            }
        }

        self.out.cells_mut()[t] = target;
        self.acc[t] = acc;
        Ok(())
    }

    /// Resolve leftovers and return the flattened grid.
    ///
    /// Channels nobody painted fall back to the default color, high-contrast
    /// foregrounds are resolved against their final background, cells with
    /// no glyph become spaces, and wide glyphs are made whole.
    pub(crate) fn finish(mut self) -> Framebuffer {
        let cols = self.out.cols() as usize;
        let Self { out, acc } = &mut self;

        for (cell, state) in out.cells_mut().iter_mut().zip(acc.iter()) {
            let (mut fg, mut bg) = cell.channels().split();
            settle(&mut fg);
            settle(&mut bg);
            if state.high_contrast {
                fg = Channel::from_rgb(high_contrast_fg(bg));
            }
            cell.set_channels(ChannelPair::combine(fg, bg));
            if !state.locked {
                cell.set_glyph_from(&Cell::new(' '));
            }
        }

        for row in out.cells_mut().chunks_mut(cols) {
            let mut x = 0;
            while x < row.len() {
                if row[x].is_wide() {
                    if row.get(x + 1).is_some_and(Cell::is_wide_continuation) {
                        let (channels, style) = (row[x].channels(), row[x].style());
                        row[x + 1].set_channels(channels).set_style(style);
                        x += 2;
                        continue;
                    }
                    row[x].set_glyph_from(&Cell::new(' '));
                } else if row[x].is_wide_continuation() {
                    row[x].set_glyph_from(&Cell::new(' '));
                }
                x += 1;
            }
        }
        self.out
    }
}

/// Transparent becomes default. Everything else is reported as opaque.
fn settle(c: &mut Channel) {
    if c.alpha() == Alpha::Transparent {
        c.set_default();
    } else if !c.is_default() {
        c.set_alpha(Alpha::Opaque);
    }
}
