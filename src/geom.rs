//! Rect: a rectangle primitive for plane regions.

/// A rectangle defined by its top-left corner and size, in cells.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Row of the top-left corner.
    pub y: u32,
    /// Column of the top-left corner.
    pub x: u32,
    /// Height in rows.
    pub rows: u32,
    /// Width in columns.
    pub cols: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(y: u32, x: u32, rows: u32, cols: u32) -> Self {
        Self { y, x, rows, cols }
    }

    /// A rectangle at the origin.
    #[inline]
    pub const fn from_size(rows: u32, cols: u32) -> Self {
        Self::new(0, 0, rows, cols)
    }

    /// Number of cells covered.
    #[inline]
    pub const fn area(&self) -> u64 {
        (self.rows as u64) * (self.cols as u64)
    }

    /// Whether the rectangle covers nothing.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.rows)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.cols)
    }

    /// Whether `(y, x)` lies inside.
    #[inline]
    pub const fn contains(&self, y: u32, x: u32) -> bool {
        y >= self.y && y < self.bottom() && x >= self.x && x < self.right()
    }

    /// Whether `other` lies entirely inside.
    #[inline]
    pub const fn contains_rect(&self, other: &Self) -> bool {
        other.y >= self.y
            && other.x >= self.x
            && other.bottom() <= self.bottom()
            && other.right() <= self.right()
    }

    /// The overlap of two rectangles, empty if they do not meet.
    #[inline]
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let y = self.y.max(other.y);
        let x = self.x.max(other.x);
        let bottom = self.bottom().min(other.bottom());
        let right = self.right().min(other.right());
        if bottom <= y || right <= x {
            return Self::default();
        }
        Self::new(y, x, bottom - y, right - x)
    }
}

impl std::fmt::Debug for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rect({}, {} {}x{})", self.y, self.x, self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(2, 3, 4, 5);
        assert!(r.contains(2, 3));
        assert!(r.contains(5, 7));
        assert!(!r.contains(6, 7));
        assert!(!r.contains(2, 8));
        assert_eq!(r.area(), 20);
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0, 0, 5, 5);
        let b = Rect::new(2, 2, 5, 5);
        assert_eq!(a.intersection(&b), Rect::new(2, 2, 3, 3));
        assert!(a.intersection(&Rect::new(5, 5, 2, 2)).is_empty());
    }

    #[test]
    fn test_rect_contains_rect() {
        let outer = Rect::from_size(10, 10);
        assert!(outer.contains_rect(&Rect::new(1, 1, 9, 9)));
        assert!(!outer.contains_rect(&Rect::new(1, 1, 10, 9)));
    }
}
