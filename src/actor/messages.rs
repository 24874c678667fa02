//! Message types for the raster actor.

use crate::buffer::Framebuffer;
use crate::raster::RenderStats;
use crossbeam_channel::Sender;

/// Commands sent to the raster thread.
#[derive(Debug)]
pub enum RasterCommand {
    /// Write the difference between this frame and the last one written.
    Frame(Box<Framebuffer>),
    /// Repaint everything on the next frame.
    Invalidate,
    /// Reply with a copy of the counters.
    Stats(Sender<RenderStats>),
    /// Zero the counters, replying with their previous values.
    ResetStats(Sender<RenderStats>),
    /// Stop the thread.
    Shutdown,
}
