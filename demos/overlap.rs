//! Overlap demo: translucent planes drifting over a gradient.
//!
//! Frames are composed on the main thread and handed to the raster actor,
//! which owns the terminal session. Runs for about three seconds.

use laminate::{
    Alpha, PlaneOptions, RasterActor, RasterConfig, Rasterizer, Scene, Session, SessionConfig,
    TermCaps,
};
use std::time::Duration;

const FRAMES: u32 = 180;

fn main() -> laminate::Result<()> {
    env_logger::init();

    let session = Session::open(SessionConfig::default(), TermCaps::detect())?;
    let (rows, cols) = session.size()?;
    let caps = session.caps().clone();

    let mut scene = Scene::new();
    let root = scene.create_pile(PlaneOptions::new(rows, cols))?;
    {
        let plane = scene.plane_mut(root)?;
        for y in 0..rows {
            for x in 0..cols {
                plane.set_bg_rgb8(x * 255 / cols.max(1), 40, y * 255 / rows.max(1))?;
                plane.putchar_yx(y, x, ' ')?;
            }
        }
        plane.set_fg_rgb8(255, 255, 255)?;
        plane.putstr_yx(0, 1, "laminate overlap demo")?;
    }

    let colors = [(255, 60, 60), (60, 255, 60), (60, 60, 255)];
    let mut boxes = Vec::new();
    for (i, (r, g, b)) in colors.into_iter().enumerate() {
        let id = scene.create_plane(root, PlaneOptions::new(8, 24).at(2 + i as i32 * 3, 4 + i as i32 * 10))?;
        let plane = scene.plane_mut(id)?;
        plane.set_bg_rgb8(r, g, b)?;
        plane.set_bg_alpha(Alpha::Blend)?;
        plane.set_fg_alpha(Alpha::HighContrast);
        for y in 0..8 {
            plane.putstr_yx(y, 0, &" ".repeat(24))?;
        }
        plane.putstr_yx(3, 8, "blended")?;
        boxes.push(id);
    }

    let pile = scene.pile_of(root)?;
    let raster = Rasterizer::new(RasterConfig {
        caps,
        ..RasterConfig::default()
    });
    let handle = RasterActor::spawn(raster, session)?;

    for frame in 0..FRAMES {
        for (i, &id) in boxes.iter().enumerate() {
            let phase = f64::from(frame) / 20.0 + i as f64 * 2.1;
            let y = (f64::from(rows) / 3.0 * (1.0 + phase.sin())) as i32;
            let x = (f64::from(cols) / 3.0 * (1.0 + phase.cos())) as i32;
            scene.plane_mut(id)?.move_yx(y, x);
        }
        handle.submit(scene.render(pile)?)?;
        std::thread::sleep(Duration::from_millis(16));
    }

    let raster = handle.shutdown()?;
    let stats = raster.stats();
    log::info!(
        "{} renders, {} bytes, {} cells written, {} elided",
        stats.renders,
        stats.render_bytes,
        stats.cell_emissions,
        stats.cell_elisions
    );
    Ok(())
}
