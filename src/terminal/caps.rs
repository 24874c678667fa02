//! Terminal capabilities.
//!
//! The rasterizer never queries the terminal itself; it is handed a
//! [`TermCaps`] describing which color forms and styles to emit and the
//! control sequences to use.

use crate::buffer::Style;
use crate::error::Result;

/// How colors can be expressed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// 24-bit `38;2;r;g;b`.
    #[default]
    Direct,
    /// The 256-color palette, `38;5;n`.
    Indexed256,
    /// The eight basic colors, `30..=37`.
    Indexed8,
}

/// What the output terminal supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermCaps {
    /// Color depth.
    pub color: ColorMode,
    /// Styles the terminal renders. Others are silently dropped.
    pub styles: Style,
    /// Enter the alternate screen.
    pub smcup: &'static str,
    /// Leave the alternate screen.
    pub rmcup: &'static str,
    /// Hide the cursor.
    pub civis: &'static str,
    /// Show the cursor.
    pub cnorm: &'static str,
    /// Clear the screen.
    pub clear: &'static str,
}

impl Default for TermCaps {
    fn default() -> Self {
        Self::xterm(ColorMode::Direct)
    }
}

impl TermCaps {
    /// An xterm-compatible terminal with the given color depth and every style.
    pub fn xterm(color: ColorMode) -> Self {
        Self {
            color,
            styles: Style::all(),
            smcup: "\x1b[?1049h",
            rmcup: "\x1b[?1049l",
            civis: "\x1b[?25l",
            cnorm: "\x1b[?25h",
            clear: "\x1b[2J",
        }
    }

    /// Guess capabilities from the environment (`TERM`, `COLORTERM`).
    pub fn detect() -> Self {
        let term = std::env::var("TERM").ok();
        let colorterm = std::env::var("COLORTERM").ok();
        let caps = Self::from_env_values(term.as_deref(), colorterm.as_deref());
        log::debug!("detected {:?} color for TERM={term:?}", caps.color);
        caps
    }

    /// Capabilities for the given `TERM` and `COLORTERM` values.
    pub fn from_env_values(term: Option<&str>, colorterm: Option<&str>) -> Self {
        let term = term.unwrap_or("");
        let color = if matches!(colorterm, Some("truecolor" | "24bit"))
            || term.ends_with("-direct")
        {
            ColorMode::Direct
        } else if term.contains("256color") {
            ColorMode::Indexed256
        } else if term == "linux" || term.starts_with("vt") || term.is_empty() {
            ColorMode::Indexed8
        } else {
            ColorMode::Indexed256
        };
        let mut caps = Self::xterm(color);
        if term == "linux" {
            caps.styles = Style::BOLD | Style::UNDERLINE | Style::BLINK | Style::REVERSED;
        }
        caps
    }

    /// The current terminal size as `(rows, cols)`.
    ///
    /// # Errors
    ///
    /// Fails if stdout is not a terminal.
    pub fn size() -> Result<(u32, u32)> {
        let (cols, rows) = crossterm::terminal::size()?;
        Ok((u32::from(rows), u32::from(cols)))
    }
}
