//! # Laminate
//!
//! A plane-based terminal compositor.
//!
//! Laminate keeps a retained scene of rectangular drawing surfaces
//! ("planes") stacked into independent piles. A render pass flattens a pile
//! into one framebuffer, blending colors through translucent planes, and a
//! rasterization pass diffs that framebuffer against the last one written
//! to emit a minimal escape-sequence stream.
//!
//! ## Core Concepts
//!
//! - **Planes**: sized grids of cells with a cursor, working colors and a
//!   base cell drawn wherever nothing was written
//! - **Piles**: z-ordered stacks of planes, each rendered on its own
//! - **Channels**: packed 32-bit color + alpha, two per cell
//! - **Damage diffing**: only changed cells reach the terminal
//!
//! ## Example
//!
//! ```rust
//! use laminate::{PlaneOptions, Rasterizer, Scene};
//!
//! let mut scene = Scene::new();
//! let root = scene.create_pile(PlaneOptions::new(2, 10))?;
//! scene.plane_mut(root)?.putstr_yx(0, 0, "hello")?;
//!
//! let pile = scene.pile_of(root)?;
//! let mut raster = Rasterizer::default();
//! let mut out = Vec::new();
//! raster.render(&scene, pile, &mut out)?;
//! assert_eq!(raster.render(&scene, pile, &mut out)?, 0);
//! # Ok::<(), laminate::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod actor;
pub mod buffer;
mod compositor;
pub mod error;
pub mod geom;
pub mod raster;
pub mod scene;
pub mod terminal;
pub mod visual;

// Re-exports for convenience
pub use actor::{RasterActor, RasterCommand, RasterHandle};
pub use buffer::{Alpha, Cell, CellFlags, Channel, ChannelPair, EgcPool, Framebuffer, Rgb, Style};
pub use error::{ConstructionError, Error, Result};
pub use geom::Rect;
pub use raster::{RasterConfig, Rasterizer, RenderStats};
pub use scene::{PileId, Plane, PlaneId, PlaneOptions, Scene, ZIter};
pub use terminal::{ColorMode, Session, SessionConfig, TermCaps};
pub use visual::{Blitter, PixelSource, RgbaImage};
