//! Terminal session: raw mode and screen setup, undone on drop.

use super::caps::TermCaps;
use crate::error::Result;
use crossterm::terminal;
use std::io::{self, Stdout, Write};

/// Configuration for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Whether to use the alternate screen buffer.
    pub alternate_screen: bool,
    /// Whether to hide the cursor while the session is open.
    pub hide_cursor: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            hide_cursor: true,
        }
    }
}

/// An open terminal in raw mode.
///
/// `Session` is a [`Write`] sink for the rasterizer. Dropping it shows the
/// cursor, leaves the alternate screen and restores cooked mode.
pub struct Session {
    config: SessionConfig,
    caps: TermCaps,
    stdout: Stdout,
}

impl Session {
    /// Enter raw mode and prepare the screen.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled or the setup sequences
    /// cannot be written.
    pub fn open(config: SessionConfig, caps: TermCaps) -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut session = Self {
            config,
            caps,
            stdout: io::stdout(),
        };
        let mut setup = String::new();
        if session.config.alternate_screen {
            setup.push_str(session.caps.smcup);
        }
        if session.config.hide_cursor {
            setup.push_str(session.caps.civis);
        }
        setup.push_str(session.caps.clear);
        // Drop still runs on failure here, restoring cooked mode.
        session.stdout.write_all(setup.as_bytes())?;
        session.stdout.flush()?;
        log::debug!("terminal session opened ({:?})", session.config);
        Ok(session)
    }

    /// The capabilities this session was opened with.
    pub const fn caps(&self) -> &TermCaps {
        &self.caps
    }

    /// The current terminal size as `(rows, cols)`.
    ///
    /// # Errors
    ///
    /// Fails if the size cannot be queried.
    pub fn size(&self) -> Result<(u32, u32)> {
        TermCaps::size()
    }
}

impl Write for Session {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stdout.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stdout.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let mut teardown = String::from("\x1b[0m");
        if self.config.hide_cursor {
            teardown.push_str(self.caps.cnorm);
        }
        if self.config.alternate_screen {
            teardown.push_str(self.caps.rmcup);
        }
        let _ = self.stdout.write_all(teardown.as_bytes());
        let _ = self.stdout.flush();
        let _ = terminal::disable_raw_mode();
    }
}
