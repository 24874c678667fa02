//! Cell: The atomic unit of terminal display.
//!
//! # Memory Layout
//!
//! The `Cell` struct is 16 bytes, four cells per cache line:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Cell Layout (16 bytes)                                       │
//! ├─────────────────────────┬─────────────┬───────┬───────┬───────┤
//! │        channels         │  gcluster   │ width │ flags │ style │
//! │  u64 (fg hi | bg lo)    │  [u8; 4]    │  u8   │  u8   │  u16  │
//! │        8 bytes          │  4 bytes    │  1b   │  1b   │  2b   │
//! └─────────────────────────┴─────────────┴───────┴───────┴───────┘
//! ```
//!
//! `gcluster` holds up to four UTF-8 bytes inline, nul padded. Longer
//! clusters set `POOLED` and store a little-endian offset into the owning
//! [`EgcPool`]. The all-zero cell has never been written; the compositor
//! substitutes the plane's base cell for it.

use super::channel::{Channel, ChannelPair};
use super::egcpool::EgcPool;
use bitflags::bitflags;

bitflags! {
    /// Text styles.
    ///
    /// These can be combined using bitwise OR.
    ///
    /// # Example
    /// ```
    /// use laminate::Style;
    /// let style = Style::BOLD | Style::ITALIC;
    /// ```
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Style: u16 {
        /// Bold text
        const BOLD = 0x0001;
        /// Dim/faint text
        const DIM = 0x0002;
        /// Italic text
        const ITALIC = 0x0004;
        /// Underlined text
        const UNDERLINE = 0x0008;
        /// Blinking text
        const BLINK = 0x0010;
        /// Reversed colors (fg/bg swapped)
        const REVERSED = 0x0020;
        /// Hidden/invisible text
        const HIDDEN = 0x0040;
        /// Strikethrough text
        const STRIKETHROUGH = 0x0080;
        /// Curly underline
        const UNDERCURL = 0x0100;
    }
}

impl std::fmt::Debug for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

bitflags! {
    /// Cell-level flags for special states.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellFlags: u8 {
        /// `gcluster` is an offset into the egc pool
        const POOLED = 0b0000_0001;
        /// Right half of a wide glyph
        const WIDE_CONTINUATION = 0b0000_0010;
    }
}

impl std::fmt::Debug for CellFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// A single terminal cell.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    channels: ChannelPair,
    gcluster: [u8; 4],
    width: u8,
    flags: CellFlags,
    style: Style,
}

const _: () = assert!(
    std::mem::size_of::<Cell>() == 16,
    "Cell must be exactly 16 bytes for cache efficiency"
);

impl Cell {
    /// A cell that has never been written.
    pub const EMPTY: Self = Self {
        channels: ChannelPair::DEFAULT,
        gcluster: [0; 4],
        width: 0,
        flags: CellFlags::empty(),
        style: Style::empty(),
    };

    /// A single-column ASCII cell.
    #[inline]
    pub fn new(c: char) -> Self {
        debug_assert!(c.is_ascii(), "Use Cell::inline for non-ASCII");
        Self {
            gcluster: [c as u8, 0, 0, 0],
            width: 1,
            ..Self::EMPTY
        }
    }

    /// Store a cluster of at most four bytes inline.
    ///
    /// Returns `None` if the cluster is longer and must be pooled.
    #[inline]
    pub fn inline(egc: &str, width: u8) -> Option<Self> {
        let bytes = egc.as_bytes();
        if bytes.len() > 4 {
            return None;
        }
        let mut gcluster = [0u8; 4];
        gcluster[..bytes.len()].copy_from_slice(bytes);
        Some(Self {
            gcluster,
            width,
            ..Self::EMPTY
        })
    }

    /// A cell whose cluster lives at `offset` in the owning pool.
    #[inline]
    pub const fn pooled(offset: u32, width: u8) -> Self {
        Self {
            gcluster: offset.to_le_bytes(),
            width,
            flags: CellFlags::POOLED,
            ..Self::EMPTY
        }
    }

    /// The right half of a wide glyph.
    #[inline]
    pub const fn wide_continuation() -> Self {
        Self {
            flags: CellFlags::WIDE_CONTINUATION,
            ..Self::EMPTY
        }
    }

    /// Store `egc` inline if it fits, otherwise append it to `pool`.
    pub fn load(egc: &str, width: u8, pool: &mut EgcPool) -> crate::Result<Self> {
        if let Some(cell) = Self::inline(egc, width) {
            return Ok(cell);
        }
        let offset = pool
            .stash(egc)
            .map_err(crate::error::ConstructionError::Allocation)?;
        Ok(Self::pooled(offset, width))
    }

    /// The inline cluster, or `None` for pooled cells.
    #[inline]
    pub fn inline_egc(&self) -> Option<&str> {
        if self.is_pooled() {
            return None;
        }
        let len = self.gcluster.iter().position(|&b| b == 0).unwrap_or(4);
        std::str::from_utf8(&self.gcluster[..len]).ok()
    }

    /// The pool offset, or `None` for inline cells.
    #[inline]
    pub const fn pool_offset(&self) -> Option<u32> {
        if self.is_pooled() {
            Some(u32::from_le_bytes(self.gcluster))
        } else {
            None
        }
    }

    /// Resolve the cluster against the pool that owns this cell.
    #[inline]
    pub fn egc<'a>(&'a self, pool: &'a EgcPool) -> &'a str {
        match self.pool_offset() {
            Some(offset) => pool.get(offset),
            None => self.inline_egc().unwrap_or(""),
        }
    }

    /// Whether the cell carries no glyph at all.
    #[inline]
    pub const fn has_glyph(&self) -> bool {
        self.is_pooled() || self.gcluster[0] != 0
    }

    /// Whether the cluster lives in a pool.
    #[inline]
    pub const fn is_pooled(&self) -> bool {
        self.flags.contains(CellFlags::POOLED)
    }

    /// Whether this is the right half of a wide glyph.
    #[inline]
    pub const fn is_wide_continuation(&self) -> bool {
        self.flags.contains(CellFlags::WIDE_CONTINUATION)
    }

    /// Whether this is the left half of a wide glyph.
    #[inline]
    pub const fn is_wide(&self) -> bool {
        self.width == 2
    }

    /// Whether the cell has never been written.
    #[inline]
    pub const fn is_unwritten(&self) -> bool {
        !self.has_glyph() && !self.is_wide_continuation()
    }

    /// Display width (0, 1, or 2).
    #[inline]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// The channel pair.
    #[inline]
    pub const fn channels(&self) -> ChannelPair {
        self.channels
    }

    /// Foreground channel.
    #[inline]
    pub const fn fchannel(&self) -> Channel {
        self.channels.fchannel()
    }

    /// Background channel.
    #[inline]
    pub const fn bchannel(&self) -> Channel {
        self.channels.bchannel()
    }

    /// The style mask.
    #[inline]
    pub const fn style(&self) -> Style {
        self.style
    }

    /// The flags.
    #[inline]
    pub const fn flags(&self) -> CellFlags {
        self.flags
    }

    /// Set the channel pair.
    #[inline]
    pub fn set_channels(&mut self, channels: ChannelPair) -> &mut Self {
        self.channels = channels;
        self
    }

    /// Set the style mask.
    #[inline]
    pub fn set_style(&mut self, style: Style) -> &mut Self {
        self.style = style;
        self
    }

    /// Set the display width.
    #[inline]
    pub(crate) fn set_width(&mut self, width: u8) {
        self.width = width;
    }

    /// Copy glyph, width and flags from `other`, keeping colors and style.
    #[inline]
    pub(crate) fn set_glyph_from(&mut self, other: &Self) {
        self.gcluster = other.gcluster;
        self.width = other.width;
        self.flags = other.flags;
    }

    /// Set the channel pair (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_channels(mut self, channels: ChannelPair) -> Self {
        self.channels = channels;
        self
    }

    /// Set the foreground channel (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_fg(mut self, fg: Channel) -> Self {
        self.channels = self.channels.with_fg(fg);
        self
    }

    /// Set the background channel (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_bg(mut self, bg: Channel) -> Self {
        self.channels = self.channels.with_bg(bg);
        self
    }

    /// Set the style mask (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Reset to the never-written state.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::EMPTY;
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Cell");
        match self.pool_offset() {
            Some(offset) => s.field("pooled", &offset),
            None => s.field("egc", &self.inline_egc().unwrap_or("")),
        };
        s.field("width", &self.width)
            .field("fg", &self.fchannel())
            .field("bg", &self.bchannel())
            .field("style", &self.style)
            .field("flags", &self.flags)
            .finish()
    }
}
