//! Framebuffer: a grid of cells plus the pool its long clusters live in.
//!
//! The same type backs each plane's drawing surface and the flattened
//! snapshot produced by a render pass. Cells are stored in row-major order
//! in one contiguous allocation.

use super::cell::Cell;
use super::egcpool::EgcPool;
use crate::error::{ConstructionError, Error, Result};

/// A grid of cells with its own cluster pool.
///
/// Access is in row-major order: `index = y * cols + x`.
#[derive(Clone)]
pub struct Framebuffer {
    /// Contiguous cell storage (row-major order).
    cells: Vec<Cell>,
    rows: u32,
    cols: u32,
    /// Clusters longer than four bytes.
    pool: EgcPool,
}

impl Framebuffer {
    /// Create a grid of never-written cells.
    ///
    /// Fails on zero dimensions or if the grid cannot be allocated.
    pub fn new(rows: u32, cols: u32) -> Result<Self> {
        Ok(Self {
            cells: alloc_cells(rows, cols)?,
            rows,
            cols,
            pool: EgcPool::new(),
        })
    }

    /// Row count.
    #[inline]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Column count.
    #[inline]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub const fn dims(&self) -> (u32, u32) {
        (self.rows, self.cols)
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false after construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The underlying cell slice.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The underlying cell slice, mutably.
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// The cluster pool.
    #[inline]
    pub const fn pool(&self) -> &EgcPool {
        &self.pool
    }

    /// Convert `(y, x)` to a linear index, `None` if out of bounds.
    #[inline]
    pub const fn index_of(&self, y: u32, x: u32) -> Option<usize> {
        if y < self.rows && x < self.cols {
            Some((y as usize) * (self.cols as usize) + (x as usize))
        } else {
            None
        }
    }

    /// Convert a linear index back to `(y, x)`.
    #[inline]
    pub fn coords_of(&self, index: usize) -> Option<(u32, u32)> {
        if index < self.cells.len() {
            let cols = self.cols as usize;
            Some(((index / cols) as u32, (index % cols) as u32))
        } else {
            None
        }
    }

    /// Bounds-checked index, as an [`Error::OutOfBounds`] on failure.
    #[inline]
    pub fn checked_index(&self, y: u32, x: u32) -> Result<usize> {
        self.index_of(y, x)
            .ok_or_else(|| Error::out_of_bounds(y, x, self.rows, self.cols))
    }

    /// The cell at `(y, x)`.
    #[inline]
    pub fn get(&self, y: u32, x: u32) -> Option<&Cell> {
        self.index_of(y, x).map(|i| &self.cells[i])
    }

    /// The cell at `(y, x)`, mutably.
    #[inline]
    pub fn get_mut(&mut self, y: u32, x: u32) -> Option<&mut Cell> {
        self.index_of(y, x).map(|i| &mut self.cells[i])
    }

    /// Resolve a cell's cluster against this grid's pool.
    #[inline]
    pub fn egc<'a>(&'a self, cell: &'a Cell) -> &'a str {
        cell.egc(&self.pool)
    }

    /// The cluster at `(y, x)`.
    #[inline]
    pub fn egc_at(&self, y: u32, x: u32) -> Option<&str> {
        self.get(y, x).map(|c| c.egc(&self.pool))
    }

    /// Build a cell for `egc`, pooling it here if it does not fit inline.
    #[inline]
    pub fn load(&mut self, egc: &str, width: u8) -> Result<Cell> {
        Cell::load(egc, width, &mut self.pool)
    }

    /// Rebind a cell that belongs to `from` so it is valid in this grid.
    ///
    /// Inline cells come back unchanged. Pooled clusters are copied into
    /// this grid's pool.
    pub fn adopt(&mut self, cell: &Cell, from: &EgcPool) -> Result<Cell> {
        let Some(offset) = cell.pool_offset() else {
            return Ok(*cell);
        };
        let egc = from.get(offset);
        let offset = self.pool.stash(egc).map_err(ConstructionError::Allocation)?;
        let mut adopted = Cell::pooled(offset, cell.width());
        adopted.set_channels(cell.channels()).set_style(cell.style());
        Ok(adopted)
    }

    /// Set every cell to the never-written state and drop the pool.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
        self.pool.clear();
    }

    /// Append a cluster to the pool.
    pub(crate) fn stash(&mut self, egc: &str) -> Result<u32> {
        Ok(self.pool.stash(egc).map_err(ConstructionError::Allocation)?)
    }

    /// Blank any wide glyph half whose partner is missing in row `y`.
    ///
    /// Leads need a continuation directly to their right. Continuations need
    /// a lead directly to their left.
    pub(crate) fn repair_wide_row(&mut self, y: u32) {
        let Some(start) = self.index_of(y, 0) else {
            return;
        };
        let row = &mut self.cells[start..start + self.cols as usize];
        for x in 0..row.len() {
            if row[x].is_wide() {
                if row.get(x + 1).is_none_or(|c| !c.is_wide_continuation()) {
                    row[x].reset();
                }
            } else if row[x].is_wide_continuation() && (x == 0 || !row[x - 1].is_wide()) {
                row[x].reset();
            }
        }
    }

    /// Iterate over rows.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols as usize)
    }

    /// Memory usage in bytes (approximate).
    pub fn memory_usage(&self) -> usize {
        self.cells.len() * std::mem::size_of::<Cell>() + self.pool.len() + std::mem::size_of::<Self>()
    }

    /// Render the glyphs as plain text, one line per row.
    ///
    /// Continuation cells are skipped and unwritten cells print as spaces.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.rows as usize);
        for (y, row) in self.rows_iter().enumerate() {
            if y > 0 {
                out.push('\n');
            }
            for cell in row {
                if cell.is_wide_continuation() {
                    continue;
                }
                match self.egc(cell) {
                    "" => out.push(' '),
                    egc => out.push_str(egc),
                }
            }
        }
        out
    }
}

/// Reserve a `rows * cols` grid of empty cells without aborting on failure.
fn alloc_cells(rows: u32, cols: u32) -> Result<Vec<Cell>> {
    if rows == 0 || cols == 0 {
        return Err(Error::invalid_dims(rows, cols));
    }
    let size = (rows as usize)
        .checked_mul(cols as usize)
        .ok_or(Error::invalid_dims(rows, cols))?;
    let mut cells = Vec::new();
    cells
        .try_reserve_exact(size)
        .map_err(ConstructionError::Allocation)?;
    cells.resize(size, Cell::EMPTY);
    Ok(cells)
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("pool", &self.pool)
            .field("memory_bytes", &self.memory_usage())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framebuffer_new() {
        let fb = Framebuffer::new(24, 80).unwrap();
        assert_eq!(fb.dims(), (24, 80));
        assert_eq!(fb.len(), 80 * 24);
        assert!(fb.cells().iter().all(Cell::is_unwritten));
    }

    #[test]
    fn test_framebuffer_zero_dims() {
        assert!(matches!(
            Framebuffer::new(0, 24),
            Err(Error::Construction(ConstructionError::InvalidDimensions { rows: 0, cols: 24 }))
        ));
        assert!(Framebuffer::new(3, 0).is_err());
    }

    #[test]
    fn test_framebuffer_bounds() {
        let fb = Framebuffer::new(24, 80).unwrap();
        assert!(fb.get(23, 79).is_some());
        assert!(fb.get(23, 80).is_none());
        assert!(fb.get(24, 79).is_none());
        assert!(matches!(
            fb.checked_index(24, 0),
            Err(Error::OutOfBounds { y: 24, x: 0, .. })
        ));
    }

    #[test]
    fn test_framebuffer_index_coords() {
        let fb = Framebuffer::new(24, 80).unwrap();
        assert_eq!(fb.index_of(10, 5), Some(10 * 80 + 5));
        assert_eq!(fb.coords_of(10 * 80 + 5), Some((10, 5)));
    }

    #[test]
    fn test_adopt_copies_pooled() {
        let family = "\u{1f468}\u{200d}\u{1f469}\u{200d}\u{1f467}";
        let mut src = Framebuffer::new(1, 2).unwrap();
        src.stash("filler").unwrap();
        let cell = src.load(family, 2).unwrap();

        let mut dst = Framebuffer::new(1, 2).unwrap();
        let adopted = dst.adopt(&cell, src.pool()).unwrap();
        assert_eq!(dst.egc(&adopted), family);
        assert_eq!(adopted.width(), 2);

        let plain = Cell::new('q');
        assert_eq!(dst.adopt(&plain, src.pool()).unwrap(), plain);
    }

    #[test]
    fn test_to_text() {
        let mut fb = Framebuffer::new(2, 3).unwrap();
        fb.cells_mut()[0] = Cell::new('a');
        fb.cells_mut()[1] = Cell::inline("\u{65e5}", 2).unwrap();
        fb.cells_mut()[2] = Cell::wide_continuation();
        fb.cells_mut()[4] = Cell::new('b');
        assert_eq!(fb.to_text(), "a\u{65e5}\n b ");
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new(2, 2).unwrap();
        fb.cells_mut()[3] = Cell::new('X');
        fb.stash("abcdefgh").unwrap();
        fb.clear();
        assert_eq!(fb.get(1, 1), Some(&Cell::EMPTY));
        assert!(fb.pool().is_empty());
    }
}
