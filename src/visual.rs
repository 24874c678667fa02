//! Drawing pixel data into planes with block characters.
//!
//! Two blitters are available:
//!
//! ```text
//!   Space       one pixel per cell     ' ' with the pixel as background
//!   HalfBlock   two pixels per cell    '▀' upper = foreground, lower = background
//! ```
//!
//! Pixels with alpha below 128 are not drawn, so whatever lies beneath
//! shows through.

use crate::buffer::{Alpha, Channel, ChannelPair, Rgb};
use crate::error::{Error, Result};
use crate::scene::Plane;

/// Anything that can be sampled as RGBA pixels.
pub trait PixelSource {
    /// `(rows, cols)` in pixels.
    fn dims(&self) -> (u32, u32);

    /// The RGBA value at `(y, x)`. Only called within [`dims`](Self::dims).
    fn pixel(&self, y: u32, x: u32) -> [u8; 4];
}

/// An owned, row-major RGBA image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    rows: u32,
    cols: u32,
    data: Vec<u8>,
}

impl RgbaImage {
    /// Wrap `data`, which must hold exactly `rows * cols * 4` bytes.
    pub fn new(rows: u32, cols: u32, data: Vec<u8>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::invalid_dims(rows, cols));
        }
        if data.len() as u64 != u64::from(rows) * u64::from(cols) * 4 {
            return Err(Error::InvalidArgument("pixel data does not match dimensions"));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build an image by evaluating `f` at every pixel.
    pub fn from_fn(rows: u32, cols: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Result<Self> {
        let mut data = Vec::with_capacity(rows as usize * cols as usize * 4);
        for y in 0..rows {
            for x in 0..cols {
                data.extend_from_slice(&f(y, x));
            }
        }
        Self::new(rows, cols, data)
    }
}

impl PixelSource for RgbaImage {
    fn dims(&self) -> (u32, u32) {
        (self.rows, self.cols)
    }

    fn pixel(&self, y: u32, x: u32) -> [u8; 4] {
        let i = (y as usize * self.cols as usize + x as usize) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

/// How pixels map onto cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blitter {
    /// One pixel per cell.
    #[default]
    Space,
    /// Two vertically stacked pixels per cell.
    HalfBlock,
}

impl Blitter {
    /// Pixel rows covered by one cell.
    pub const fn pixels_per_row(self) -> u32 {
        match self {
            Self::Space => 1,
            Self::HalfBlock => 2,
        }
    }
}

fn opaque(px: [u8; 4]) -> Option<Channel> {
    (px[3] >= 128).then(|| Channel::from_rgb(Rgb::new(px[0], px[1], px[2])))
}

impl Plane {
    /// Draw `src` with its top-left pixel at cell `(y, x)`.
    ///
    /// Content past the plane's edges is clipped. Returns the number of
    /// cells written.
    ///
    /// # Errors
    ///
    /// Fails if `(y, x)` is outside the plane.
    pub fn blit(&mut self, src: &dyn PixelSource, blitter: Blitter, y: u32, x: u32) -> Result<u32> {
        self.framebuffer().checked_index(y, x)?;
        let (prows, pcols) = src.dims();
        let step = blitter.pixels_per_row();
        let cell_rows = prows.div_ceil(step).min(self.rows() - y);
        let cell_cols = pcols.min(self.cols() - x);
        let clear = Channel::DEFAULT.with_alpha(Alpha::Transparent);

        let mut written = 0;
        for cy in 0..cell_rows {
            for cx in 0..cell_cols {
                let upper = opaque(src.pixel(cy * step, cx));
                let (egc, channels) = match blitter {
                    Blitter::Space => match upper {
                        Some(bg) => (" ", ChannelPair::DEFAULT.with_bg(bg)),
                        None => continue,
                    },
                    Blitter::HalfBlock => {
                        let lower_y = cy * step + 1;
                        let lower = if lower_y < prows {
                            opaque(src.pixel(lower_y, cx))
                        } else {
                            None
                        };
                        match (upper, lower) {
                            (Some(fg), Some(bg)) => ("\u{2580}", ChannelPair::combine(fg, bg)),
                            (Some(fg), None) => ("\u{2580}", ChannelPair::combine(fg, clear)),
                            (None, Some(fg)) => ("\u{2584}", ChannelPair::combine(fg, clear)),
                            (None, None) => continue,
                        }
                    }
                };
                self.put_colored_yx(y + cy, x + cx, egc, channels)?;
                written += 1;
            }
        }
        log::trace!("blitted {prows}x{pcols} pixels as {written} cells ({blitter:?})");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{PlaneOptions, Scene};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const CLEAR: [u8; 4] = [9, 9, 9, 0];

    fn plane(rows: u32, cols: u32) -> (Scene, crate::scene::PlaneId) {
        let mut scene = Scene::new();
        let id = scene.create_pile(PlaneOptions::new(rows, cols)).unwrap();
        (scene, id)
    }

    #[test]
    fn test_image_size_checked() {
        assert!(RgbaImage::new(2, 2, vec![0; 15]).is_err());
        assert!(RgbaImage::new(0, 2, Vec::new()).is_err());
        assert!(RgbaImage::new(1, 2, vec![0; 8]).is_ok());
    }

    #[test]
    fn test_space_blit() {
        let (mut scene, id) = plane(2, 2);
        let img = RgbaImage::from_fn(2, 2, |y, x| if (y, x) == (1, 1) { CLEAR } else { RED }).unwrap();
        let p = scene.plane_mut(id).unwrap();
        assert_eq!(p.blit(&img, Blitter::Space, 0, 0).unwrap(), 3);

        let (egc, cell) = p.at_yx(0, 1).unwrap();
        assert_eq!(egc, " ");
        assert_eq!(cell.bchannel().to_rgb(), Rgb::new(255, 0, 0));
        assert!(p.cell_at(1, 1).unwrap().is_unwritten());
        assert_eq!(p.cursor_yx(), (0, 0));
    }

    #[test]
    fn test_half_block_blit() {
        let (mut scene, id) = plane(2, 1);
        let img = RgbaImage::from_fn(3, 1, |y, _| match y {
            0 => RED,
            1 => BLUE,
            _ => CLEAR,
        })
        .unwrap();
        let p = scene.plane_mut(id).unwrap();
        assert_eq!(p.blit(&img, Blitter::HalfBlock, 0, 0).unwrap(), 1);
        let (egc, cell) = p.at_yx(0, 0).unwrap();
        assert_eq!(egc, "\u{2580}");
        assert_eq!(cell.fchannel().to_rgb(), Rgb::new(255, 0, 0));
        assert_eq!(cell.bchannel().to_rgb(), Rgb::new(0, 0, 255));
        assert!(p.cell_at(1, 0).unwrap().is_unwritten());
    }

    #[test]
    fn test_half_block_lower_only() {
        let (mut scene, id) = plane(1, 1);
        let img = RgbaImage::from_fn(2, 1, |y, _| if y == 0 { CLEAR } else { BLUE }).unwrap();
        let p = scene.plane_mut(id).unwrap();
        p.blit(&img, Blitter::HalfBlock, 0, 0).unwrap();
        let (egc, cell) = p.at_yx(0, 0).unwrap();
        assert_eq!(egc, "\u{2584}");
        assert_eq!(cell.fchannel().to_rgb(), Rgb::new(0, 0, 255));
        assert_eq!(cell.bchannel().alpha(), Alpha::Transparent);
    }

    #[test]
    fn test_blit_clips() {
        let (mut scene, id) = plane(2, 2);
        let img = RgbaImage::from_fn(4, 4, |_, _| RED).unwrap();
        let p = scene.plane_mut(id).unwrap();
        assert_eq!(p.blit(&img, Blitter::Space, 1, 1).unwrap(), 1);
        assert!(matches!(
            p.blit(&img, Blitter::Space, 2, 0),
            Err(Error::OutOfBounds { .. })
        ));
    }
}
