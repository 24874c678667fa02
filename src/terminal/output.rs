//! `OutputBuffer`: single-syscall output buffer for escape sequences.

use super::caps::ColorMode;
use crate::buffer::{Rgb, Style};
use std::fmt;
use std::io::Write;

/// SGR parameter for each style bit, in emission order.
const STYLE_SGR: [(Style, &str); 9] = [
    (Style::BOLD, "1"),
    (Style::DIM, "2"),
    (Style::ITALIC, "3"),
    (Style::UNDERLINE, "4"),
    (Style::BLINK, "5"),
    (Style::REVERSED, "7"),
    (Style::HIDDEN, "8"),
    (Style::STRIKETHROUGH, "9"),
    (Style::UNDERCURL, "4:3"),
];

/// Pre-allocated buffer for building a frame's escape sequences.
///
/// All output is accumulated here, then handed to the sink with a single
/// `write_all` so a frame never reaches the terminal half-drawn.
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create an output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a typical terminal (64KB).
    pub fn new() -> Self {
        Self::with_capacity(65536)
    }

    /// Clear the buffer for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// The buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn push_fmt(&mut self, args: fmt::Arguments<'_>) {
        // Writing into a Vec cannot fail.
        let _ = self.data.write_fmt(args);
    }

    /// The buffer length.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been written since the last clear.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write raw bytes.
    #[inline]
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write a string.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Move the cursor to `(y, x)`, 0-indexed.
    ///
    /// Uses the most compact form:
    /// - `\x1b[H` for the origin
    /// - `\x1b[{row}H` for column 0
    /// - `\x1b[{row};{col}H` otherwise
    #[inline]
    pub fn cursor_move(&mut self, y: u32, x: u32) {
        let row = y + 1;
        let col = x + 1;
        if row == 1 && col == 1 {
            self.data.extend_from_slice(b"\x1b[H");
        } else if col == 1 {
            self.push_fmt(format_args!("\x1b[{row}H"));
        } else {
            self.push_fmt(format_args!("\x1b[{row};{col}H"));
        }
    }

    /// Reset all attributes.
    #[inline]
    pub fn reset_attrs(&mut self) {
        self.data.extend_from_slice(b"\x1b[0m");
    }

    /// Turn on `style` in one SGR sequence. Nothing is written for an empty set.
    pub fn set_style(&mut self, style: Style) {
        if style.is_empty() {
            return;
        }
        self.data.extend_from_slice(b"\x1b[");
        let mut first = true;
        for (bit, code) in STYLE_SGR {
            if style.contains(bit) {
                if !first {
                    self.data.push(b';');
                }
                self.data.extend_from_slice(code.as_bytes());
                first = false;
            }
        }
        self.data.push(b'm');
    }

    /// Restore the default foreground, background, or both.
    pub fn set_default_colors(&mut self, fg: bool, bg: bool) {
        match (fg, bg) {
            (true, true) => self.data.extend_from_slice(b"\x1b[39;49m"),
            (true, false) => self.data.extend_from_slice(b"\x1b[39m"),
            (false, true) => self.data.extend_from_slice(b"\x1b[49m"),
            (false, false) => {}
        }
    }

    /// Set the foreground color in the given mode.
    #[inline]
    pub fn set_fg(&mut self, color: Rgb, mode: ColorMode) {
        self.color(38, color, mode);
    }

    /// Set the background color in the given mode.
    #[inline]
    pub fn set_bg(&mut self, color: Rgb, mode: ColorMode) {
        self.color(48, color, mode);
    }

    /// Set the foreground to palette entry `idx`.
    #[inline]
    pub fn set_fg_palindex(&mut self, idx: u8, mode: ColorMode) {
        self.palindex(38, idx, mode);
    }

    /// Set the background to palette entry `idx`.
    #[inline]
    pub fn set_bg_palindex(&mut self, idx: u8, mode: ColorMode) {
        self.palindex(48, idx, mode);
    }

    fn color(&mut self, base: u8, c: Rgb, mode: ColorMode) {
        match mode {
            ColorMode::Direct => {
                self.push_fmt(format_args!("\x1b[{base};2;{};{};{}m", c.r, c.g, c.b));
            }
            ColorMode::Indexed256 => self.palindex(base, rgb_to_256(c), mode),
            ColorMode::Indexed8 => self.palindex(base, rgb_to_8(c), mode),
        }
    }

    fn palindex(&mut self, base: u8, idx: u8, mode: ColorMode) {
        if mode == ColorMode::Indexed8 {
            self.push_fmt(format_args!("\x1b[{}m", base / 10 * 10 + idx % 8));
        } else {
            self.push_fmt(format_args!("\x1b[{base};5;{idx}m"));
        }
    }

    /// Flush to a writer with one `write_all`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Nearest entry of the xterm 6x6x6 cube or gray ramp.
pub fn rgb_to_256(c: Rgb) -> u8 {
    if c.r == c.g && c.g == c.b {
        return match c.r {
            0..=7 => 16,
            249..=255 => 231,
            v => 232 + ((v - 8) / 10).min(23),
        };
    }
    let q = |v: u8| -> u8 {
        match v {
            0..=47 => 0,
            48..=114 => 1,
            v => (v - 35) / 40,
        }
    };
    16 + 36 * q(c.r) + 6 * q(c.g) + q(c.b)
}

/// One of the eight basic colors: bit 0 red, bit 1 green, bit 2 blue.
pub fn rgb_to_8(c: Rgb) -> u8 {
    u8::from(c.r > 127) | u8::from(c.g > 127) << 1 | u8::from(c.b > 127) << 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_forms() {
        let mut out = OutputBuffer::new();
        out.cursor_move(0, 0);
        out.cursor_move(4, 0);
        out.cursor_move(4, 9);
        assert_eq!(out.as_bytes(), b"\x1b[H\x1b[5H\x1b[5;10H");
    }

    #[test]
    fn test_len_and_clear() {
        let mut out = OutputBuffer::new();
        assert!(out.is_empty());
        out.cursor_move(11, 79);
        assert_eq!(out.len(), b"\x1b[12;80H".len());
        out.clear();
        assert!(out.is_empty());
        assert_eq!(out.len(), 0);
    }

    #[test]
    fn test_style_sequence() {
        let mut out = OutputBuffer::new();
        out.set_style(Style::BOLD | Style::ITALIC | Style::UNDERCURL);
        out.set_style(Style::empty());
        assert_eq!(out.as_bytes(), b"\x1b[1;3;4:3m");
    }

    #[test]
    fn test_color_modes() {
        let c = Rgb::new(255, 0, 0);
        let mut out = OutputBuffer::new();
        out.set_fg(c, ColorMode::Direct);
        out.set_bg(c, ColorMode::Indexed256);
        out.set_fg(c, ColorMode::Indexed8);
        out.set_bg_palindex(12, ColorMode::Indexed8);
        assert_eq!(
            out.as_bytes(),
            b"\x1b[38;2;255;0;0m\x1b[48;5;196m\x1b[31m\x1b[44m".as_slice()
        );
    }

    #[test]
    fn test_default_colors() {
        let mut out = OutputBuffer::new();
        out.set_default_colors(true, true);
        out.set_default_colors(false, true);
        out.set_default_colors(false, false);
        assert_eq!(out.as_bytes(), b"\x1b[39;49m\x1b[49m");
    }

    #[test]
    fn test_quantize() {
        assert_eq!(rgb_to_256(Rgb::BLACK), 16);
        assert_eq!(rgb_to_256(Rgb::WHITE), 231);
        assert_eq!(rgb_to_256(Rgb::new(128, 128, 128)), 244);
        assert_eq!(rgb_to_256(Rgb::new(0, 0, 255)), 21);
        assert_eq!(rgb_to_8(Rgb::new(200, 200, 0)), 3);
    }
}
