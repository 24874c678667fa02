//! Channels: packed color + alpha descriptors.
//!
//! A [`Channel`] is 32 bits. Two of them make a [`ChannelPair`], with the
//! foreground in the high word and the background in the low word.
//!
//! ```text
//! ┌────┬──────────┬────────┬─────────┬──────────┬──────────────────────────┐
//! │ 31 │    30    │ 29..28 │    27   │  26..24  │          23..0           │
//! ├────┼──────────┼────────┼─────────┼──────────┼──────────────────────────┤
//! │ -- │ explicit │ alpha  │ palette │ reserved │ RGB (or index in 7..0)   │
//! └────┴──────────┴────────┴─────────┴──────────┴──────────────────────────┘
//! ```
//!
//! A clear "explicit" bit means the terminal's default color. The all-zero
//! channel is therefore the default, opaque channel.

use crate::error::{Error, Result};

const EXPLICIT: u32 = 0x4000_0000;
const ALPHA_MASK: u32 = 0x3000_0000;
const PALETTE: u32 = 0x0800_0000;
const RGB_MASK: u32 = 0x00ff_ffff;
const PALINDEX_MASK: u32 = 0x0000_00ff;

/// True-color RGB representation.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black (0, 0, 0)
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White (255, 255, 255)
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Create from a 24-bit hex color (e.g., 0xFF5500). Upper bits are ignored.
    #[inline]
    pub const fn from_u32(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }

    /// Pack into `0xRRGGBB`.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    #[inline]
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// How a channel combines with whatever lies beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum Alpha {
    /// Replace everything below.
    #[default]
    Opaque = 0,
    /// Average with everything below.
    Blend = 0x1000_0000,
    /// Contribute nothing.
    Transparent = 0x2000_0000,
    /// Foreground only: force maximal contrast against the final background.
    HighContrast = 0x3000_0000,
}

impl Alpha {
    /// The raw alpha bits, positioned as in a [`Channel`].
    #[inline]
    pub const fn bits(self) -> u32 {
        self as u32
    }

    #[inline]
    const fn from_masked(bits: u32) -> Self {
        match bits & ALPHA_MASK {
            0x1000_0000 => Self::Blend,
            0x2000_0000 => Self::Transparent,
            0x3000_0000 => Self::HighContrast,
            _ => Self::Opaque,
        }
    }
}

impl TryFrom<u32> for Alpha {
    type Error = Error;

    /// Accepts exactly the four positioned alpha values.
    fn try_from(bits: u32) -> Result<Self> {
        if bits & !ALPHA_MASK != 0 {
            return Err(Error::InvalidArgument("unrecognized alpha value"));
        }
        Ok(Self::from_masked(bits))
    }
}

/// A single 32-bit color channel.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Channel(u32);

impl Channel {
    /// The terminal's default color, opaque.
    pub const DEFAULT: Self = Self(0);

    /// Wrap raw channel bits.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw channel bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// An opaque, explicit RGB channel.
    #[inline]
    pub const fn from_rgb(rgb: Rgb) -> Self {
        Self(EXPLICIT | rgb.to_u32())
    }

    /// Red component.
    #[inline]
    pub const fn r(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    /// Green component.
    #[inline]
    pub const fn g(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    /// Blue component.
    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// All three components.
    #[inline]
    pub const fn to_rgb(self) -> Rgb {
        Rgb::from_u32(self.0)
    }

    /// Components as an `(r, g, b)` tuple.
    #[inline]
    pub const fn rgb8(self) -> (u8, u8, u8) {
        (self.r(), self.g(), self.b())
    }

    /// Components packed as `0xRRGGBB`.
    #[inline]
    pub const fn rgb(self) -> u32 {
        self.0 & RGB_MASK
    }

    /// The alpha mode.
    #[inline]
    pub const fn alpha(self) -> Alpha {
        Alpha::from_masked(self.0)
    }

    /// Whether this channel uses the terminal's default color.
    #[inline]
    pub const fn is_default(self) -> bool {
        self.0 & EXPLICIT == 0
    }

    /// Whether this channel holds a palette index.
    #[inline]
    pub const fn is_palindex(self) -> bool {
        !self.is_default() && self.0 & PALETTE != 0
    }

    /// Palette index. Only meaningful when [`is_palindex`](Self::is_palindex).
    #[inline]
    pub const fn palindex(self) -> u8 {
        (self.0 & PALINDEX_MASK) as u8
    }

    /// Set 8-bit components, failing if any exceeds 255.
    pub fn set_rgb8(&mut self, r: u32, g: u32, b: u32) -> Result<()> {
        if r > 255 || g > 255 || b > 255 {
            return Err(Error::InvalidArgument("color component above 255"));
        }
        self.store_rgb((r << 16) | (g << 8) | b);
        Ok(())
    }

    /// Set 8-bit components, clamping each into `[0, 255]`.
    pub fn set_rgb8_clipped(&mut self, r: i32, g: i32, b: i32) {
        let clip = |c: i32| c.clamp(0, 255) as u32;
        self.store_rgb((clip(r) << 16) | (clip(g) << 8) | clip(b));
    }

    /// Set from a packed `0xRRGGBB` value, failing on any higher bit.
    pub fn set_rgb(&mut self, rgb: u32) -> Result<()> {
        if rgb & !RGB_MASK != 0 {
            return Err(Error::InvalidArgument("packed rgb above 0xffffff"));
        }
        self.store_rgb(rgb);
        Ok(())
    }

    /// Select a palette entry. Palette channels are always opaque.
    pub fn set_palindex(&mut self, idx: u32) -> Result<()> {
        if idx > 255 {
            return Err(Error::InvalidArgument("palette index above 255"));
        }
        self.0 = (self.0 & !(RGB_MASK | ALPHA_MASK)) | EXPLICIT | PALETTE | idx;
        Ok(())
    }

    /// Use the terminal's default color. Also resets alpha to opaque.
    #[inline]
    pub fn set_default(&mut self) {
        self.0 &= !(EXPLICIT | PALETTE | ALPHA_MASK);
    }

    /// Set the alpha mode. Any non-opaque mode marks the channel explicit.
    #[inline]
    pub fn set_alpha(&mut self, alpha: Alpha) {
        self.0 = (self.0 & !ALPHA_MASK) | alpha.bits();
        if alpha != Alpha::Opaque {
            self.0 |= EXPLICIT;
        }
    }

    /// Builder form of [`set_alpha`](Self::set_alpha).
    #[inline]
    #[must_use]
    pub fn with_alpha(mut self, alpha: Alpha) -> Self {
        self.set_alpha(alpha);
        self
    }

    #[inline]
    fn store_rgb(&mut self, rgb: u32) {
        self.0 = (self.0 & !(RGB_MASK | PALETTE)) | EXPLICIT | rgb;
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_default() {
            write!(f, "default")?;
        } else if self.is_palindex() {
            write!(f, "pal({})", self.palindex())?;
        } else {
            write!(f, "{:?}", self.to_rgb())?;
        }
        match self.alpha() {
            Alpha::Opaque => Ok(()),
            alpha => write!(f, "/{alpha:?}"),
        }
    }
}

/// Foreground and background channels packed into 64 bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChannelPair(u64);

impl ChannelPair {
    /// Both channels default and opaque.
    pub const DEFAULT: Self = Self(0);

    /// Pack a foreground and a background channel.
    #[inline]
    pub const fn combine(fg: Channel, bg: Channel) -> Self {
        Self(((fg.0 as u64) << 32) | bg.0 as u64)
    }

    /// Wrap raw pair bits.
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw pair bits.
    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Split back into `(fg, bg)`. Exact inverse of [`combine`](Self::combine).
    #[inline]
    pub const fn split(self) -> (Channel, Channel) {
        (self.fchannel(), self.bchannel())
    }

    /// Foreground channel.
    #[inline]
    pub const fn fchannel(self) -> Channel {
        Channel((self.0 >> 32) as u32)
    }

    /// Background channel.
    #[inline]
    pub const fn bchannel(self) -> Channel {
        Channel(self.0 as u32)
    }

    /// Replace the foreground channel.
    #[inline]
    pub fn set_fchannel(&mut self, fg: Channel) {
        *self = Self::combine(fg, self.bchannel());
    }

    /// Replace the background channel.
    #[inline]
    pub fn set_bchannel(&mut self, bg: Channel) {
        *self = Self::combine(self.fchannel(), bg);
    }

    /// Builder form of [`set_fchannel`](Self::set_fchannel).
    #[inline]
    #[must_use]
    pub const fn with_fg(self, fg: Channel) -> Self {
        Self::combine(fg, self.bchannel())
    }

    /// Builder form of [`set_bchannel`](Self::set_bchannel).
    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: Channel) -> Self {
        Self::combine(self.fchannel(), bg)
    }

    fn update_fg<T>(&mut self, f: impl FnOnce(&mut Channel) -> T) -> T {
        let mut fg = self.fchannel();
        let out = f(&mut fg);
        self.set_fchannel(fg);
        out
    }

    fn update_bg<T>(&mut self, f: impl FnOnce(&mut Channel) -> T) -> T {
        let mut bg = self.bchannel();
        let out = f(&mut bg);
        self.set_bchannel(bg);
        out
    }

    /// See [`Channel::set_rgb8`]. The pair is untouched on failure.
    pub fn set_fg_rgb8(&mut self, r: u32, g: u32, b: u32) -> Result<()> {
        self.update_fg(|c| c.set_rgb8(r, g, b))
    }

    /// See [`Channel::set_rgb8`]. The pair is untouched on failure.
    pub fn set_bg_rgb8(&mut self, r: u32, g: u32, b: u32) -> Result<()> {
        self.update_bg(|c| c.set_rgb8(r, g, b))
    }

    /// See [`Channel::set_rgb8_clipped`].
    pub fn set_fg_rgb8_clipped(&mut self, r: i32, g: i32, b: i32) {
        self.update_fg(|c| c.set_rgb8_clipped(r, g, b));
    }

    /// See [`Channel::set_rgb8_clipped`].
    pub fn set_bg_rgb8_clipped(&mut self, r: i32, g: i32, b: i32) {
        self.update_bg(|c| c.set_rgb8_clipped(r, g, b));
    }

    /// See [`Channel::set_rgb`].
    pub fn set_fg_rgb(&mut self, rgb: u32) -> Result<()> {
        self.update_fg(|c| c.set_rgb(rgb))
    }

    /// See [`Channel::set_rgb`].
    pub fn set_bg_rgb(&mut self, rgb: u32) -> Result<()> {
        self.update_bg(|c| c.set_rgb(rgb))
    }

    /// See [`Channel::set_palindex`].
    pub fn set_fg_palindex(&mut self, idx: u32) -> Result<()> {
        self.update_fg(|c| c.set_palindex(idx))
    }

    /// See [`Channel::set_palindex`].
    pub fn set_bg_palindex(&mut self, idx: u32) -> Result<()> {
        self.update_bg(|c| c.set_palindex(idx))
    }

    /// Use the terminal's default foreground.
    pub fn set_fg_default(&mut self) {
        self.update_fg(Channel::set_default);
    }

    /// Use the terminal's default background.
    pub fn set_bg_default(&mut self) {
        self.update_bg(Channel::set_default);
    }

    /// Set the foreground alpha mode.
    pub fn set_fg_alpha(&mut self, alpha: Alpha) {
        self.update_fg(|c| c.set_alpha(alpha));
    }

    /// Set the background alpha mode.
    ///
    /// High contrast only makes sense for foregrounds and is rejected here.
    pub fn set_bg_alpha(&mut self, alpha: Alpha) -> Result<()> {
        if alpha == Alpha::HighContrast {
            return Err(Error::InvalidArgument("high contrast is foreground-only"));
        }
        self.update_bg(|c| c.set_alpha(alpha));
        Ok(())
    }
}

impl std::fmt::Debug for ChannelPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelPair")
            .field("fg", &self.fchannel())
            .field("bg", &self.bchannel())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALPHAS: [Alpha; 4] = [
        Alpha::Opaque,
        Alpha::Blend,
        Alpha::Transparent,
        Alpha::HighContrast,
    ];

    #[test]
    fn test_default_is_zero() {
        let c = Channel::default();
        assert!(c.is_default());
        assert_eq!(c.alpha(), Alpha::Opaque);
        assert_eq!(ChannelPair::default().bits(), 0);
    }

    #[test]
    fn test_channel_roundtrip() {
        for &(r, g, b) in &[(0, 0, 0), (255, 255, 255), (1, 128, 254), (200, 3, 77)] {
            for alpha in ALPHAS {
                let mut fg = Channel::default();
                fg.set_rgb8(r, g, b).unwrap();
                fg.set_alpha(alpha);
                let mut bg = Channel::default();
                bg.set_rgb8(b, r, g).unwrap();

                let (f2, b2) = ChannelPair::combine(fg, bg).split();
                assert_eq!(f2.rgb8(), (r as u8, g as u8, b as u8));
                assert_eq!(f2.alpha(), alpha);
                assert_eq!(b2.rgb8(), (b as u8, r as u8, g as u8));
                assert!(!f2.is_default());
            }
        }
    }

    #[test]
    fn test_pair_bits_roundtrip() {
        for bits in [0u64, u64::MAX, 0x4012_3456_2000_0000, 0xdead_beef_0bad_f00d] {
            let pair = ChannelPair::from_bits(bits);
            let (fg, bg) = pair.split();
            assert_eq!(ChannelPair::combine(fg, bg).bits(), bits);
        }
    }

    #[test]
    fn test_strict_rejects_and_preserves() {
        let mut c = Channel::from_rgb(Rgb::new(1, 2, 3));
        assert!(c.set_rgb8(256, 0, 0).is_err());
        assert_eq!(c.to_rgb(), Rgb::new(1, 2, 3));
        assert!(c.set_rgb(0x0100_0000).is_err());
        assert!(c.set_palindex(256).is_err());
    }

    #[test]
    fn test_clipped_clamps() {
        let mut c = Channel::default();
        c.set_rgb8_clipped(-20, 300, 128);
        assert_eq!(c.to_rgb(), Rgb::new(0, 255, 128));
        assert!(!c.is_default());
    }

    #[test]
    fn test_set_default_forces_opaque() {
        let mut c = Channel::from_rgb(Rgb::new(9, 9, 9)).with_alpha(Alpha::Blend);
        c.set_default();
        assert!(c.is_default());
        assert_eq!(c.alpha(), Alpha::Opaque);
    }

    #[test]
    fn test_palindex() {
        let mut c = Channel::default().with_alpha(Alpha::Blend);
        c.set_palindex(42).unwrap();
        assert!(c.is_palindex());
        assert_eq!(c.palindex(), 42);
        assert_eq!(c.alpha(), Alpha::Opaque);

        c.set_rgb(0x00ff_0000).unwrap();
        assert!(!c.is_palindex());
    }

    #[test]
    fn test_alpha_try_from() {
        for alpha in ALPHAS {
            assert_eq!(Alpha::try_from(alpha.bits()).unwrap(), alpha);
        }
        assert!(Alpha::try_from(0x4000_0000).is_err());
        assert!(Alpha::try_from(1).is_err());
    }

    #[test]
    fn test_bg_rejects_highcontrast() {
        let mut pair = ChannelPair::default();
        assert!(pair.set_bg_alpha(Alpha::HighContrast).is_err());
        assert_eq!(pair, ChannelPair::default());
        pair.set_fg_alpha(Alpha::HighContrast);
        assert_eq!(pair.fchannel().alpha(), Alpha::HighContrast);
    }

    #[test]
    fn test_pair_setters_touch_one_side() {
        let mut pair = ChannelPair::default();
        pair.set_fg_rgb8(10, 20, 30).unwrap();
        assert!(pair.bchannel().is_default());
        pair.set_bg_rgb(0x0000_00ff).unwrap();
        assert_eq!(pair.fchannel().to_rgb(), Rgb::new(10, 20, 30));
        assert_eq!(pair.bchannel().to_rgb(), Rgb::new(0, 0, 255));
    }

    #[test]
    fn test_debug_format() {
        let c = Channel::from_rgb(Rgb::new(255, 0, 16)).with_alpha(Alpha::Blend);
        assert_eq!(format!("{c:?}"), "#ff0010/Blend");
        assert_eq!(format!("{:?}", Channel::DEFAULT), "default");
    }
}
