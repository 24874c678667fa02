//! Raster actor: a dedicated thread that owns a rasterizer and its sink.
//!
//! Composition stays on the caller's thread. Finished frames are sent over
//! a bounded channel, so a slow terminal applies back-pressure instead of
//! queueing frames without limit.

use super::messages::RasterCommand;
use crate::buffer::Framebuffer;
use crate::error::{Error, Result};
use crate::raster::{Rasterizer, RenderStats};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Frames that may wait for the raster thread.
const QUEUE_DEPTH: usize = 4;

/// Spawns raster threads.
pub struct RasterActor;

/// Handle to a running raster thread.
///
/// Dropping the handle stops the thread and waits for it. Frames still
/// queued at that point are discarded; call [`shutdown`](Self::shutdown)
/// to have them written first.
pub struct RasterHandle {
    sender: Sender<RasterCommand>,
    handle: Option<JoinHandle<Rasterizer>>,
    shutdown: Arc<AtomicBool>,
}

fn disconnected() -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::BrokenPipe,
        "raster thread has stopped",
    ))
}

impl RasterActor {
    /// Move `rasterizer` and `sink` onto a new thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the thread cannot be spawned.
    pub fn spawn<W: Write + Send + 'static>(rasterizer: Rasterizer, sink: W) -> Result<RasterHandle> {
        let (sender, receiver) = bounded(QUEUE_DEPTH);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("laminate-raster".to_string())
            .spawn(move || Self::run_loop(rasterizer, sink, &receiver, &shutdown_clone))?;

        Ok(RasterHandle {
            sender,
            handle: Some(handle),
            shutdown,
        })
    }

    /// Main loop. Returns the rasterizer when asked to stop.
    fn run_loop<W: Write>(
        mut rasterizer: Rasterizer,
        mut sink: W,
        receiver: &Receiver<RasterCommand>,
        shutdown: &AtomicBool,
    ) -> Rasterizer {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            let command = match receiver.recv_timeout(Duration::from_millis(16)) {
                Ok(command) => command,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };
            match command {
                RasterCommand::Frame(frame) => {
                    // Counted in the stats; the next frame retries.
                    if let Err(e) = rasterizer.rasterize(*frame, &mut sink) {
                        log::warn!("raster thread dropped a frame: {e}");
                    }
                }
                RasterCommand::Invalidate => rasterizer.invalidate(),
                RasterCommand::Stats(reply) => {
                    let _ = reply.send(rasterizer.stats());
                }
                RasterCommand::ResetStats(reply) => {
                    let _ = reply.send(rasterizer.reset_stats());
                }
                RasterCommand::Shutdown => break,
            }
        }
        log::debug!("raster thread exiting");
        rasterizer
    }
}

impl RasterHandle {
    /// Queue a frame, blocking while the queue is full.
    ///
    /// # Errors
    ///
    /// Fails if the raster thread has stopped.
    pub fn submit(&self, frame: Framebuffer) -> Result<()> {
        self.send(RasterCommand::Frame(Box::new(frame)))
    }

    /// Make the next frame repaint everything.
    ///
    /// # Errors
    ///
    /// Fails if the raster thread has stopped.
    pub fn invalidate(&self) -> Result<()> {
        self.send(RasterCommand::Invalidate)
    }

    /// Counters as of every frame queued before this call.
    ///
    /// # Errors
    ///
    /// Fails if the raster thread has stopped.
    pub fn stats(&self) -> Result<RenderStats> {
        let (reply, answer) = bounded(1);
        self.send(RasterCommand::Stats(reply))?;
        answer.recv().map_err(|_| disconnected())
    }

    /// Zero the counters, returning their previous values.
    ///
    /// # Errors
    ///
    /// Fails if the raster thread has stopped.
    pub fn reset_stats(&self) -> Result<RenderStats> {
        let (reply, answer) = bounded(1);
        self.send(RasterCommand::ResetStats(reply))?;
        answer.recv().map_err(|_| disconnected())
    }

    /// Drain queued frames, stop the thread and take the rasterizer back.
    ///
    /// # Errors
    ///
    /// Fails if the raster thread panicked.
    pub fn shutdown(mut self) -> Result<Rasterizer> {
        let _ = self.sender.send(RasterCommand::Shutdown);
        let handle = self.handle.take().ok_or_else(disconnected)?;
        handle
            .join()
            .map_err(|_| Error::Io(io::Error::other("raster thread panicked")))
    }

    fn send(&self, command: RasterCommand) -> Result<()> {
        self.sender.send(command).map_err(|_| disconnected())
    }
}

impl Drop for RasterHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.shutdown.store(true, Ordering::Relaxed);
            let pending = self.sender.len();
            if pending > 0 {
                log::debug!("raster handle dropped with {pending} queued commands");
            }
            let _ = handle.join();
        }
    }
}
