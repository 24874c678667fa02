//! Plane: a sized, positioned, mutable grid of cells.
//!
//! A plane owns its cell grid and cluster pool. Its offset is relative to
//! the plane it is bound to (or to the pile origin for roots); the binding
//! tree and stacking order live in the [`Scene`](super::Scene).
//!
//! Writes go through a cursor and a working channel pair + style:
//!
//! ```text
//!   set_fg_rgb8 / on_styles ──► working state
//!                                   │
//!   put_egc_yx(y, x, "日") ─────────┴──► [lead w=2][cont w=0] ──► cursor (y, x+2)
//! ```
//!
//! Grid positions that were never written are drawn with the base cell.

use crate::buffer::{Alpha, Cell, ChannelPair, Framebuffer, Style};
use crate::error::{Error, Result};
use crate::geom::Rect;
use std::any::Any;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Geometry and name for a new plane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaneOptions {
    /// Row offset relative to the parent (or pile origin).
    pub y: i32,
    /// Column offset relative to the parent (or pile origin).
    pub x: i32,
    /// Row count, at least 1.
    pub rows: u32,
    /// Column count, at least 1.
    pub cols: u32,
    /// Optional name for debugging.
    pub name: Option<String>,
}

impl PlaneOptions {
    /// A `rows` x `cols` plane at offset (0, 0).
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self {
            y: 0,
            x: 0,
            rows,
            cols,
            name: None,
        }
    }

    /// Place the plane at `(y, x)`.
    #[must_use]
    pub const fn at(mut self, y: i32, x: i32) -> Self {
        self.y = y;
        self.x = x;
        self
    }

    /// Attach a name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A drawing surface.
pub struct Plane {
    name: Option<String>,
    y: i32,
    x: i32,
    fb: Framebuffer,
    base: Cell,
    channels: ChannelPair,
    style: Style,
    cursor_y: u32,
    cursor_x: u32,
    user: Option<Box<dyn Any + Send + Sync>>,
}

/// Columns occupied by a grapheme cluster, as stored in a cell.
fn egc_width(egc: &str) -> u8 {
    UnicodeWidthStr::width(egc).clamp(1, 2) as u8
}

/// Reject empty strings, control characters and multi-cluster input.
fn check_egc(egc: &str) -> Result<()> {
    if egc.is_empty() {
        return Err(Error::InvalidArgument("empty grapheme cluster"));
    }
    if egc.chars().any(char::is_control) {
        return Err(Error::InvalidArgument("control character in grapheme cluster"));
    }
    if egc.graphemes(true).nth(1).is_some() {
        return Err(Error::InvalidArgument("more than one grapheme cluster"));
    }
    Ok(())
}

impl Plane {
    /// Build a detached plane. Scenes call this when creating planes.
    pub(crate) fn new(opts: PlaneOptions) -> Result<Self> {
        let fb = Framebuffer::new(opts.rows, opts.cols)?;
        Ok(Self {
            name: opts.name,
            y: opts.y,
            x: opts.x,
            fb,
            base: Cell::EMPTY,
            channels: ChannelPair::DEFAULT,
            style: Style::empty(),
            cursor_y: 0,
            cursor_x: 0,
            user: None,
        })
    }

    /// Copy geometry, content, base cell and working state. User data is not copied.
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            name: self.name.clone(),
            y: self.y,
            x: self.x,
            fb: self.fb.clone(),
            base: self.base,
            channels: self.channels,
            style: self.style,
            cursor_y: self.cursor_y,
            cursor_x: self.cursor_x,
            user: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────
    // Geometry
    // ─────────────────────────────────────────────────────────────────

    /// `(rows, cols)`.
    #[inline]
    pub const fn dims(&self) -> (u32, u32) {
        self.fb.dims()
    }

    /// Row count.
    #[inline]
    pub const fn rows(&self) -> u32 {
        self.fb.rows()
    }

    /// Column count.
    #[inline]
    pub const fn cols(&self) -> u32 {
        self.fb.cols()
    }

    /// Offset relative to the binding parent (or the pile origin for roots).
    #[inline]
    pub const fn yx(&self) -> (i32, i32) {
        (self.y, self.x)
    }

    /// Move the plane. O(1); nothing is redrawn until the next render.
    #[inline]
    pub fn move_yx(&mut self, y: i32, x: i32) {
        self.y = y;
        self.x = x;
    }

    pub(crate) fn shift(&mut self, dy: i32, dx: i32) {
        self.y = self.y.saturating_add(dy);
        self.x = self.x.saturating_add(dx);
    }

    /// The plane's name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The cell grid and its pool.
    #[inline]
    pub const fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    // ─────────────────────────────────────────────────────────────────
    // Cursor
    // ─────────────────────────────────────────────────────────────────

    /// Cursor position. After writing into the last column the column
    /// equals [`cols`](Self::cols) and cursor-relative writes fail until the
    /// cursor is moved.
    #[inline]
    pub const fn cursor_yx(&self) -> (u32, u32) {
        (self.cursor_y, self.cursor_x)
    }

    /// Move the cursor. Fails if `(y, x)` is outside the plane.
    pub fn cursor_move_yx(&mut self, y: u32, x: u32) -> Result<()> {
        self.fb.checked_index(y, x)?;
        self.cursor_y = y;
        self.cursor_x = x;
        Ok(())
    }

    /// Move the cursor to (0, 0).
    #[inline]
    pub fn home(&mut self) {
        self.cursor_y = 0;
        self.cursor_x = 0;
    }

    // ─────────────────────────────────────────────────────────────────
    // Working state
    // ─────────────────────────────────────────────────────────────────

    /// Working channel pair used by subsequent writes.
    #[inline]
    pub const fn channels(&self) -> ChannelPair {
        self.channels
    }

    /// Replace the working channel pair.
    #[inline]
    pub fn set_channels(&mut self, channels: ChannelPair) {
        self.channels = channels;
    }

    /// Working style used by subsequent writes.
    #[inline]
    pub const fn styles(&self) -> Style {
        self.style
    }

    /// Replace the working style.
    #[inline]
    pub fn set_styles(&mut self, style: Style) {
        self.style = style;
    }

    /// Add styles to the working style.
    #[inline]
    pub fn on_styles(&mut self, style: Style) {
        self.style |= style;
    }

    /// Remove styles from the working style.
    #[inline]
    pub fn off_styles(&mut self, style: Style) {
        self.style &= !style;
    }

    /// Set the working foreground. Fails if a component exceeds 255.
    pub fn set_fg_rgb8(&mut self, r: u32, g: u32, b: u32) -> Result<()> {
        self.channels.set_fg_rgb8(r, g, b)
    }

    /// Set the working background. Fails if a component exceeds 255.
    pub fn set_bg_rgb8(&mut self, r: u32, g: u32, b: u32) -> Result<()> {
        self.channels.set_bg_rgb8(r, g, b)
    }

    /// Set the working foreground, clamping components into range.
    pub fn set_fg_rgb8_clipped(&mut self, r: i32, g: i32, b: i32) {
        self.channels.set_fg_rgb8_clipped(r, g, b);
    }

    /// Set the working background, clamping components into range.
    pub fn set_bg_rgb8_clipped(&mut self, r: i32, g: i32, b: i32) {
        self.channels.set_bg_rgb8_clipped(r, g, b);
    }

    /// Set the working foreground from `0xRRGGBB`.
    pub fn set_fg_rgb(&mut self, rgb: u32) -> Result<()> {
        self.channels.set_fg_rgb(rgb)
    }

    /// Set the working background from `0xRRGGBB`.
    pub fn set_bg_rgb(&mut self, rgb: u32) -> Result<()> {
        self.channels.set_bg_rgb(rgb)
    }

    /// Use a palette entry for the working foreground.
    pub fn set_fg_palindex(&mut self, idx: u32) -> Result<()> {
        self.channels.set_fg_palindex(idx)
    }

    /// Use a palette entry for the working background.
    pub fn set_bg_palindex(&mut self, idx: u32) -> Result<()> {
        self.channels.set_bg_palindex(idx)
    }

    /// Use the terminal's default foreground.
    pub fn set_fg_default(&mut self) {
        self.channels.set_fg_default();
    }

    /// Use the terminal's default background.
    pub fn set_bg_default(&mut self) {
        self.channels.set_bg_default();
    }

    /// Set the working foreground alpha.
    pub fn set_fg_alpha(&mut self, alpha: Alpha) {
        self.channels.set_fg_alpha(alpha);
    }

    /// Set the working background alpha. High contrast is rejected.
    pub fn set_bg_alpha(&mut self, alpha: Alpha) -> Result<()> {
        self.channels.set_bg_alpha(alpha)
    }

    // ─────────────────────────────────────────────────────────────────
    // Writing
    // ─────────────────────────────────────────────────────────────────

    /// Write one grapheme cluster at `(y, x)` with the working state.
    ///
    /// Returns the number of columns the cursor advanced (1 or 2). A wide
    /// cluster that does not fit before the right edge fails without
    /// touching the grid. Overwriting either half of an existing wide glyph
    /// blanks its other half.
    pub fn put_egc_yx(&mut self, y: u32, x: u32, egc: &str) -> Result<u32> {
        check_egc(egc)?;
        let width = egc_width(egc);
        let idx = self.fb.checked_index(y, x)?;
        if width == 2 && x + 1 >= self.cols() {
            return Err(Error::out_of_bounds(y, x + 1, self.rows(), self.cols()));
        }

        let cell = self
            .fb
            .load(egc, width)?
            .with_channels(self.channels)
            .with_style(self.style);

        let cols = self.cols();
        let cells = self.fb.cells_mut();
        if cells[idx].is_wide_continuation() && x > 0 {
            cells[idx - 1].reset();
        }
        let last = idx + usize::from(width) - 1;
        if cells[last].is_wide() && x + u32::from(width) < cols {
            cells[last + 1].reset();
        }
        cells[idx] = cell;
        if width == 2 {
            cells[idx + 1] = Cell::wide_continuation()
                .with_channels(self.channels)
                .with_style(self.style);
        }

        self.cursor_y = y;
        self.cursor_x = x + u32::from(width);
        Ok(u32::from(width))
    }

    /// Write `egc` with explicit channels and no style, leaving the working
    /// state and cursor as they were.
    pub(crate) fn put_colored_yx(&mut self, y: u32, x: u32, egc: &str, channels: ChannelPair) -> Result<u32> {
        let saved = (self.channels, self.style, self.cursor_y, self.cursor_x);
        self.channels = channels;
        self.style = Style::empty();
        let written = self.put_egc_yx(y, x, egc);
        (self.channels, self.style, self.cursor_y, self.cursor_x) = saved;
        written
    }

    /// Write one grapheme cluster at the cursor.
    pub fn put_egc(&mut self, egc: &str) -> Result<u32> {
        self.put_egc_yx(self.cursor_y, self.cursor_x, egc)
    }

    /// Write one character at `(y, x)`.
    pub fn putchar_yx(&mut self, y: u32, x: u32, c: char) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.put_egc_yx(y, x, c.encode_utf8(&mut buf))
    }

    /// Write a string starting at `(y, x)`.
    ///
    /// The string is split into grapheme clusters. `'\n'` moves to the
    /// start of the next row. Stops at the first cluster that cannot be
    /// written and returns that error; earlier clusters stay written.
    pub fn putstr_yx(&mut self, y: u32, x: u32, s: &str) -> Result<u32> {
        self.cursor_move_yx(y, x)?;
        self.putstr(s)
    }

    /// Write a string at the cursor. See [`putstr_yx`](Self::putstr_yx).
    pub fn putstr(&mut self, s: &str) -> Result<u32> {
        let mut total = 0;
        for egc in s.graphemes(true) {
            if egc == "\n" || egc == "\r\n" {
                let next = self.cursor_y + 1;
                if next >= self.rows() {
                    return Err(Error::out_of_bounds(next, 0u32, self.rows(), self.cols()));
                }
                self.cursor_y = next;
                self.cursor_x = 0;
                continue;
            }
            total += self.put_egc(egc)?;
        }
        Ok(total)
    }

    // ─────────────────────────────────────────────────────────────────
    // Reading
    // ─────────────────────────────────────────────────────────────────

    /// The raw cell at `(y, x)`; never-written cells come back empty.
    pub fn cell_at(&self, y: u32, x: u32) -> Result<&Cell> {
        let idx = self.fb.checked_index(y, x)?;
        Ok(&self.fb.cells()[idx])
    }

    /// The effective cluster and cell at `(y, x)`.
    ///
    /// Never-written positions resolve to the base cell.
    pub fn at_yx(&self, y: u32, x: u32) -> Result<(&str, Cell)> {
        let cell = self.cell_at(y, x)?;
        let cell = if cell.is_unwritten() { &self.base } else { cell };
        Ok((self.fb.egc(cell), *cell))
    }

    /// Set the cell drawn at never-written positions.
    ///
    /// `egc` may be empty, in which case the base contributes only colors.
    /// The base cluster must be a single column wide.
    pub fn set_base(&mut self, egc: &str, style: Style, channels: ChannelPair) -> Result<()> {
        let cell = if egc.is_empty() {
            Cell::EMPTY
        } else {
            check_egc(egc)?;
            if egc_width(egc) != 1 {
                return Err(Error::InvalidArgument("base cell must be a single column"));
            }
            self.fb.load(egc, 1)?
        };
        self.base = cell.with_style(style).with_channels(channels);
        Ok(())
    }

    /// The base cell and its cluster.
    pub fn base(&self) -> (&str, Cell) {
        (self.fb.egc(&self.base), self.base)
    }

    pub(crate) const fn base_cell(&self) -> &Cell {
        &self.base
    }

    /// Reset every cell to never-written and home the cursor.
    pub fn erase(&mut self) -> Result<()> {
        let (egc, base) = self.base();
        let egc = base.pool_offset().map(|_| egc.to_owned());
        self.fb.clear();
        if let Some(egc) = egc {
            let offset = self.fb.stash(&egc)?;
            self.base = Cell::pooled(offset, 1)
                .with_channels(base.channels())
                .with_style(base.style());
        }
        self.home();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────
    // Resizing
    // ─────────────────────────────────────────────────────────────────

    /// Resize the plane, keeping the `keep` region of the old grid in place.
    ///
    /// `keep` is given in old plane coordinates and may be empty. Any part
    /// of it past the old grid is ignored.
    /// `(yoff, xoff)` place the new origin relative to the kept region's
    /// origin, so the kept material does not move on screen and the plane's
    /// offset becomes `old + keep + off`. Kept cells falling outside the new
    /// grid are dropped; all other cells start never-written. Wide glyphs
    /// cut by the new edges are blanked.
    pub fn resize(&mut self, keep: Rect, yoff: i32, xoff: i32, rows: u32, cols: u32) -> Result<()> {
        if rows == 0 || cols == 0 {
            return Err(Error::invalid_dims(rows, cols));
        }
        if (keep.rows == 0) != (keep.cols == 0) {
            return Err(Error::InvalidArgument("kept region must be empty in both dimensions or neither"));
        }
        // Only the part of `keep` inside the old grid is copied.
        let kept = keep.intersection(&Rect::from_size(self.rows(), self.cols()));

        let mut fb = Framebuffer::new(rows, cols)?;
        self.base = fb.adopt(&self.base, self.fb.pool())?;

        for ky in kept.y..kept.bottom() {
            let ny = i64::from(ky) - i64::from(keep.y) - i64::from(yoff);
            let Ok(ny) = u32::try_from(ny) else { continue };
            if ny >= rows {
                continue;
            }
            for kx in kept.x..kept.right() {
                let nx = i64::from(kx) - i64::from(keep.x) - i64::from(xoff);
                let Ok(nx) = u32::try_from(nx) else { continue };
                let (Some(src), Some(dst)) = (self.fb.index_of(ky, kx), fb.index_of(ny, nx)) else {
                    continue;
                };
                let cell = fb.adopt(&self.fb.cells()[src], self.fb.pool())?;
                fb.cells_mut()[dst] = cell;
            }
        }
        for y in 0..rows {
            fb.repair_wide_row(y);
        }

        log::trace!(
            "resize {:?}: {}x{} -> {rows}x{cols}",
            self.name,
            self.rows(),
            self.cols()
        );
        self.fb = fb;
        let anchor = |keep: u32, off: i32| i32::try_from(keep).unwrap_or(i32::MAX).saturating_add(off);
        self.shift(anchor(keep.y, yoff), anchor(keep.x, xoff));
        self.cursor_y = self.cursor_y.min(rows - 1);
        self.cursor_x = self.cursor_x.min(cols - 1);
        Ok(())
    }

    /// Resize keeping the origin and as much content as fits.
    pub fn resize_simple(&mut self, rows: u32, cols: u32) -> Result<()> {
        let keep = Rect::from_size(self.rows().min(rows), self.cols().min(cols));
        self.resize(keep, 0, 0, rows, cols)
    }

    /// Overwrite cells starting at `(y, x)` with the cells of `patch`.
    ///
    /// Cells falling outside the plane are dropped. Wide glyphs split at the
    /// patch's edges are blanked.
    pub(crate) fn write_patch(&mut self, y: u32, x: u32, patch: &Framebuffer) -> Result<()> {
        for (py, row) in patch.rows_iter().enumerate() {
            let ty = y + py as u32;
            if ty >= self.rows() {
                break;
            }
            for (px, cell) in row.iter().enumerate() {
                let Some(idx) = self.fb.index_of(ty, x + px as u32) else {
                    break;
                };
                let cell = self.fb.adopt(cell, patch.pool())?;
                self.fb.cells_mut()[idx] = cell;
            }
            self.fb.repair_wide_row(ty);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────
    // User data
    // ─────────────────────────────────────────────────────────────────

    /// Attach arbitrary data, replacing any previous value.
    pub fn set_user_data<T: Any + Send + Sync>(&mut self, data: T) {
        self.user = Some(Box::new(data));
    }

    /// Borrow attached data if it is a `T`.
    pub fn user_data<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.user.as_ref()?.downcast_ref()
    }

    /// Detach and return the attached data.
    pub fn take_user_data(&mut self) -> Option<Box<dyn Any + Send + Sync>> {
        self.user.take()
    }
}

impl std::fmt::Debug for Plane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plane")
            .field("name", &self.name)
            .field("yx", &(self.y, self.x))
            .field("dims", &self.dims())
            .field("cursor", &self.cursor_yx())
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}
