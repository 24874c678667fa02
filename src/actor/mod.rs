//! Off-thread rasterization.
//!
//! A [`RasterActor`] owns a [`Rasterizer`](crate::Rasterizer) and its output
//! sink on a dedicated thread. The caller composes frames and sends them
//! over a bounded crossbeam channel.
//!
//! ```text
//! ┌──────────────┐  RasterCommand   ┌───────────────┐  bytes   ┌──────┐
//! │  Main thread │ ───────────────▶ │ Raster thread │ ───────▶ │ sink │
//! │  (compose)   │ ◀─────────────── │  (diff+emit)  │          └──────┘
//! └──────────────┘   RenderStats    └───────────────┘
//! ```

mod messages;
mod renderer;

pub use messages::RasterCommand;
pub use renderer::{RasterActor, RasterHandle};
