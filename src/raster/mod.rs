//! Rasterizer: turning framebuffers into terminal output.
//!
//! The rasterizer retains the last frame it wrote successfully and only
//! emits what changed since then. A pass assembles all of its output in one
//! buffer and hands it to the sink with a single `write_all`.

mod diff;
mod stats;

pub use stats::RenderStats;

use crate::buffer::Framebuffer;
use crate::error::Result;
use crate::scene::{PileId, Scene};
use crate::terminal::{OutputBuffer, TermCaps};
use diff::DiffState;
use std::io::Write;
use std::time::Instant;

/// Configuration for a [`Rasterizer`].
#[derive(Debug, Clone)]
pub struct RasterConfig {
    /// What the output terminal supports.
    pub caps: TermCaps,
    /// Initial output buffer capacity in bytes.
    pub output_capacity: usize,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            caps: TermCaps::default(),
            output_capacity: 65536,
        }
    }
}

/// Diffs frames against the last one written and emits the difference.
pub struct Rasterizer {
    caps: TermCaps,
    last: Option<Framebuffer>,
    state: DiffState,
    output: OutputBuffer,
    stats: RenderStats,
}

impl Rasterizer {
    /// Create a rasterizer with nothing written yet.
    pub fn new(config: RasterConfig) -> Self {
        Self {
            caps: config.caps,
            last: None,
            state: DiffState::new(),
            output: OutputBuffer::with_capacity(config.output_capacity),
            stats: RenderStats::default(),
        }
    }

    /// The capabilities output is tailored to.
    pub const fn caps(&self) -> &TermCaps {
        &self.caps
    }

    /// The last frame written successfully.
    pub const fn last_frame(&self) -> Option<&Framebuffer> {
        self.last.as_ref()
    }

    /// Write whatever differs between `frame` and the last frame written.
    ///
    /// Returns the number of bytes written, zero when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the sink fails. The pass is
    /// then counted as failed and the previously written frame stays
    /// retained.
    pub fn rasterize<W: Write + ?Sized>(&mut self, frame: Framebuffer, sink: &mut W) -> Result<usize> {
        self.rasterize_since(frame, sink, Instant::now())
    }

    /// Compose `pile` and rasterize the result.
    ///
    /// # Errors
    ///
    /// Fails on a stale pile, or as [`rasterize`](Self::rasterize) does.
    pub fn render<W: Write + ?Sized>(&mut self, scene: &Scene, pile: PileId, sink: &mut W) -> Result<usize> {
        let start = Instant::now();
        let frame = scene.render(pile)?;
        self.rasterize_since(frame, sink, start)
    }

    fn rasterize_since<W: Write + ?Sized>(
        &mut self,
        frame: Framebuffer,
        sink: &mut W,
        start: Instant,
    ) -> Result<usize> {
        if self.last.as_ref().is_some_and(|l| l.dims() != frame.dims()) {
            log::debug!("frame size changed to {:?}, repainting", frame.dims());
            self.invalidate();
        }

        self.output.clear();
        let counts = diff::render_diff(
            self.last.as_ref(),
            &frame,
            &self.caps,
            &mut self.output,
            &mut self.state,
        );

        if !self.output.is_empty() {
            if let Err(e) = self.output.flush_to(sink) {
                self.stats.failed_renders += 1;
                self.state.reset();
                log::warn!("render failed after {} cells: {e}", counts.cell_emissions);
                return Err(e.into());
            }
        }

        let bytes = self.output.len();
        let ns = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.stats.record(bytes as u64, ns, &counts);
        self.last = Some(frame);
        log::debug!(
            "rendered {bytes} bytes in {ns}ns ({} cells written, {} elided)",
            counts.cell_emissions,
            counts.cell_elisions
        );
        Ok(bytes)
    }

    /// Forget the retained frame and terminal state so the next pass
    /// repaints everything.
    pub fn invalidate(&mut self) {
        self.last = None;
        self.state.reset();
    }

    /// A copy of the counters.
    pub const fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Zero the counters, returning their values from just before.
    pub fn reset_stats(&mut self) -> RenderStats {
        std::mem::take(&mut self.stats)
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(RasterConfig::default())
    }
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("caps", &self.caps)
            .field("retained", &self.last.as_ref().map(Framebuffer::dims))
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
