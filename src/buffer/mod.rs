//! Buffer module: the cell codec and the grids built from it.
//!
//! This module contains:
//! - [`Channel`] / [`ChannelPair`]: packed color + alpha descriptors
//! - [`Cell`]: The atomic unit of display, 16 bytes
//! - [`EgcPool`]: append-only storage for long grapheme clusters
//! - [`Framebuffer`]: A grid of cells and its pool

mod cell;
mod channel;
mod egcpool;
mod framebuffer;

pub use cell::{Cell, CellFlags, Style};
pub use channel::{Alpha, Channel, ChannelPair, Rgb};
pub use egcpool::EgcPool;
pub use framebuffer::Framebuffer;
