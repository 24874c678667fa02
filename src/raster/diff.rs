//! Damage diff: minimal escape sequences between two frames.
//!
//! 1. Compare each cell of the new frame against the retained one
//! 2. Skip identical cells, moving the cursor only when the next write is
//!    not where the last one left it
//! 3. Track style and colors so no redundant SGR is sent
//!
//! Everything lands in one [`OutputBuffer`].

use super::stats::DiffCounts;
use crate::buffer::{Cell, Channel, Framebuffer, Rgb, Style};
use crate::terminal::{OutputBuffer, TermCaps};

/// A color as last sent to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ink {
    Default,
    Rgb(Rgb),
    Palette(u8),
}

impl From<Channel> for Ink {
    fn from(c: Channel) -> Self {
        if c.is_default() {
            Self::Default
        } else if c.is_palindex() {
            Self::Palette(c.palindex())
        } else {
            Self::Rgb(c.to_rgb())
        }
    }
}

/// What the terminal is believed to show. `None` means unknown.
#[derive(Debug, Clone, Default)]
pub(crate) struct DiffState {
    cursor: Option<(u32, u32)>,
    fg: Option<Ink>,
    bg: Option<Ink>,
    style: Option<Style>,
}

impl DiffState {
    pub(crate) const fn new() -> Self {
        Self {
            cursor: None,
            fg: None,
            bg: None,
            style: None,
        }
    }

    /// Forget everything, e.g. after a failed or partial write.
    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Same glyph, width, style and colors, with clusters resolved against each
/// frame's own pool.
fn same_cell(a: &Cell, fa: &Framebuffer, b: &Cell, fb: &Framebuffer) -> bool {
    a.channels() == b.channels()
        && a.style() == b.style()
        && a.width() == b.width()
        && a.is_wide_continuation() == b.is_wide_continuation()
        && fa.egc(a) == fb.egc(b)
}

/// Append the sequences turning `prev` into `next`, or paint all of `next`
/// when there is no previous frame. Both frames must share dimensions.
pub(crate) fn render_diff(
    prev: Option<&Framebuffer>,
    next: &Framebuffer,
    caps: &TermCaps,
    out: &mut OutputBuffer,
    state: &mut DiffState,
) -> DiffCounts {
    debug_assert!(prev.is_none_or(|p| p.dims() == next.dims()));
    let mut counts = DiffCounts::default();
    let cols = next.cols() as usize;

    for (i, cell) in next.cells().iter().enumerate() {
        if cell.is_wide_continuation() {
            continue;
        }
        if let Some(prev) = prev {
            if same_cell(&prev.cells()[i], prev, cell, next) {
                counts.cell_elisions += 1;
                continue;
            }
        }
        let (y, x) = ((i / cols) as u32, (i % cols) as u32);
        emit_cell(y, x, cell, next, caps, out, state, &mut counts);
        counts.cell_emissions += 1;
    }
    counts
}

#[allow(clippy::too_many_arguments)]
fn emit_cell(
    y: u32,
    x: u32,
    cell: &Cell,
    frame: &Framebuffer,
    caps: &TermCaps,
    out: &mut OutputBuffer,
    state: &mut DiffState,
    counts: &mut DiffCounts,
) {
    if state.cursor != Some((y, x)) {
        out.cursor_move(y, x);
    }

    // Any removal needs a full reset, which also restores default colors.
    let style = cell.style() & caps.styles;
    let current = match state.style {
        Some(current) if current.difference(style).is_empty() => current,
        _ => {
            out.reset_attrs();
            state.fg = Some(Ink::Default);
            state.bg = Some(Ink::Default);
            Style::empty()
        }
    };
    out.set_style(style.difference(current));
    state.style = Some(style);

    let (fg, bg) = (Ink::from(cell.fchannel()), Ink::from(cell.bchannel()));
    let fg_default = fg == Ink::Default && state.fg != Some(Ink::Default);
    let bg_default = bg == Ink::Default && state.bg != Some(Ink::Default);
    if fg_default || bg_default {
        out.set_default_colors(fg_default, bg_default);
        counts.default_emissions += 1;
    } else if fg == Ink::Default || bg == Ink::Default {
        counts.default_elisions += 1;
    }
    if fg != Ink::Default {
        if state.fg == Some(fg) {
            counts.fg_elisions += 1;
        } else {
            match fg {
                Ink::Rgb(c) => out.set_fg(c, caps.color),
                Ink::Palette(idx) => out.set_fg_palindex(idx, caps.color),
                Ink::Default => {}
            }
            counts.fg_emissions += 1;
        }
    }
    if bg != Ink::Default {
        if state.bg == Some(bg) {
            counts.bg_elisions += 1;
        } else {
            match bg {
                Ink::Rgb(c) => out.set_bg(c, caps.color),
                Ink::Palette(idx) => out.set_bg_palindex(idx, caps.color),
                Ink::Default => {}
            }
            counts.bg_emissions += 1;
        }
    }
    state.fg = Some(fg);
    state.bg = Some(bg);

    match frame.egc(cell) {
        "" => out.write_raw(b" "),
        egc => out.write_str(egc),
    }

    let next_x = x + u32::from(cell.width().max(1));
    state.cursor = (next_x < frame.cols()).then_some((y, next_x));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ChannelPair;

    fn frame(rows: u32, lines: &[&str]) -> Framebuffer {
        let cols = lines.iter().map(|l| l.len()).max().unwrap_or(1) as u32;
        let mut fb = Framebuffer::new(rows, cols).unwrap();
        for (y, line) in lines.iter().enumerate() {
            for (x, c) in line.chars().enumerate() {
                *fb.get_mut(y as u32, x as u32).unwrap() = Cell::new(c);
            }
        }
        fb
    }

    fn diff(prev: Option<&Framebuffer>, next: &Framebuffer, state: &mut DiffState) -> (Vec<u8>, DiffCounts) {
        let mut out = OutputBuffer::new();
        let counts = render_diff(prev, next, &TermCaps::default(), &mut out, state);
        (out.as_bytes().to_vec(), counts)
    }

    #[test]
    fn test_full_paint_bytes() {
        let next = frame(2, &["ab", "cd"]);
        let (bytes, counts) = diff(None, &next, &mut DiffState::new());
        assert_eq!(bytes, b"\x1b[H\x1b[0mab\x1b[2Hcd");
        assert_eq!(counts.cell_emissions, 4);
        assert_eq!(counts.default_elisions, 4);
    }

    #[test]
    fn test_identical_frames_elide() {
        let a = frame(2, &["ab", "cd"]);
        let mut state = DiffState::new();
        diff(None, &a, &mut state);
        let (bytes, counts) = diff(Some(&a), &a.clone(), &mut state);
        assert!(bytes.is_empty());
        assert_eq!(counts.cell_elisions, 4);
        assert_eq!(counts.cell_emissions, 0);
    }

    #[test]
    fn test_adjacent_writes_skip_cursor_moves() {
        let a = frame(1, &["abcd"]);
        let b = frame(1, &["aXYd"]);
        let mut state = DiffState::new();
        diff(None, &a, &mut state);
        let (bytes, _) = diff(Some(&a), &b, &mut state);
        assert_eq!(bytes, b"\x1b[1;2HXY");
    }

    #[test]
    fn test_color_tracking() {
        let red = Channel::from_rgb(Rgb::new(255, 0, 0));
        let mut next = frame(1, &["ab"]);
        for cell in next.cells_mut() {
            cell.set_channels(ChannelPair::DEFAULT.with_fg(red));
        }
        let (bytes, counts) = diff(None, &next, &mut DiffState::new());
        assert_eq!(bytes, b"\x1b[H\x1b[0m\x1b[38;2;255;0;0mab");
        assert_eq!(counts.fg_emissions, 1);
        assert_eq!(counts.fg_elisions, 1);
        assert_eq!(counts.default_elisions, 2);
    }

    #[test]
    fn test_style_removal_resets() {
        let mut bold = frame(1, &["a"]);
        bold.cells_mut()[0].set_style(Style::BOLD);
        let plain = frame(1, &["b"]);
        let mut state = DiffState::new();
        diff(None, &bold, &mut state);
        let (bytes, _) = diff(Some(&bold), &plain, &mut state);
        assert_eq!(bytes, b"\x1b[H\x1b[0mb");
    }

    #[test]
    fn test_unsupported_styles_masked() {
        let mut next = frame(1, &["a"]);
        next.cells_mut()[0].set_style(Style::ITALIC | Style::BOLD);
        let caps = TermCaps {
            styles: Style::BOLD,
            ..TermCaps::default()
        };
        let mut out = OutputBuffer::new();
        render_diff(None, &next, &caps, &mut out, &mut DiffState::new());
        assert_eq!(out.as_bytes(), b"\x1b[H\x1b[0m\x1b[1ma");
    }
}
