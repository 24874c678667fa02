//! Channel blending and contrast.
//!
//! Blending averages every contributing color with equal weight: after `n`
//! blends the accumulator holds the mean of `n + 1` colors. Components are
//! integers, so each step floors.

use crate::buffer::{Alpha, Channel, Rgb};

/// Fold `src` into `acc`, where `blends` counts prior contributions.
///
/// Transparent sources leave both `acc` and `blends` untouched. A default
/// color only mixes when nothing has been accumulated yet.
pub(crate) fn blend(acc: Channel, src: Channel, blends: &mut u32) -> Channel {
    if src.alpha() == Alpha::Transparent {
        return acc;
    }
    let n = *blends;
    let out = if n == 0 {
        if src.is_default() {
            let mut c = Channel::DEFAULT;
            c.set_alpha(src.alpha());
            c
        } else if src.is_palindex() {
            src
        } else {
            Channel::from_rgb(src.to_rgb()).with_alpha(src.alpha())
        }
    } else if !src.is_default() && !acc.is_default() {
        let mix = |a: u8, b: u8| ((u32::from(a) * n + u32::from(b)) / (n + 1)) as u8;
        Channel::from_rgb(Rgb::new(
            mix(acc.r(), src.r()),
            mix(acc.g(), src.g()),
            mix(acc.b(), src.b()),
        ))
        .with_alpha(src.alpha())
    } else {
        acc
    };
    *blends += 1;
    out
}

fn linear(c: u8) -> f64 {
    let c = f64::from(c) / 255.0;
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// WCAG relative luminance in `0.0..=1.0`.
pub(crate) fn relative_luminance(rgb: Rgb) -> f64 {
    0.2126 * linear(rgb.r) + 0.7152 * linear(rgb.g) + 0.0722 * linear(rgb.b)
}

/// WCAG contrast ratio in `1.0..=21.0`.
pub(crate) fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let (la, lb) = (relative_luminance(a), relative_luminance(b));
    let (hi, lo) = if la > lb { (la, lb) } else { (lb, la) };
    (hi + 0.05) / (lo + 0.05)
}

/// Black or white, whichever stands out more against `bg`.
///
/// A default background is assumed dark.
pub(crate) fn high_contrast_fg(bg: Channel) -> Rgb {
    let bg = if bg.is_default() { Rgb::BLACK } else { bg.to_rgb() };
    if contrast_ratio(Rgb::WHITE, bg) >= contrast_ratio(Rgb::BLACK, bg) {
        Rgb::WHITE
    } else {
        Rgb::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(r: u8, g: u8, b: u8) -> Channel {
        Channel::from_rgb(Rgb::new(r, g, b))
    }

    #[test]
    fn test_transparent_contributes_nothing() {
        let mut n = 0;
        let acc = Channel::DEFAULT.with_alpha(Alpha::Transparent);
        let out = blend(acc, rgb(1, 2, 3).with_alpha(Alpha::Transparent), &mut n);
        assert_eq!(out, acc);
        assert_eq!(n, 0);
    }

    #[test]
    fn test_first_blend_copies() {
        let mut n = 0;
        let acc = Channel::DEFAULT.with_alpha(Alpha::Transparent);
        let out = blend(acc, rgb(10, 20, 30).with_alpha(Alpha::Blend), &mut n);
        assert_eq!(out.to_rgb(), Rgb::new(10, 20, 30));
        assert_eq!(out.alpha(), Alpha::Blend);
        assert_eq!(n, 1);

        let mut n = 0;
        let out = blend(acc, Channel::DEFAULT, &mut n);
        assert!(out.is_default());
        assert_eq!(out.alpha(), Alpha::Opaque);
    }

    #[test]
    fn test_average_floors() {
        let mut n = 1;
        let acc = rgb(255, 0, 0).with_alpha(Alpha::Blend);
        let out = blend(acc, rgb(0, 0, 255), &mut n);
        assert_eq!(out.to_rgb(), Rgb::new(127, 0, 127));
        assert_eq!(out.alpha(), Alpha::Opaque);
        assert_eq!(n, 2);
    }

    #[test]
    fn test_equal_weights() {
        let mut n = 0;
        let mut acc = Channel::DEFAULT.with_alpha(Alpha::Transparent);
        for c in [90u8, 0, 30] {
            acc = blend(acc, rgb(c, c, c).with_alpha(Alpha::Blend), &mut n);
        }
        assert_eq!(acc.to_rgb(), Rgb::new(40, 40, 40));
    }

    #[test]
    fn test_default_does_not_mix() {
        let mut n = 1;
        let acc = rgb(200, 100, 0).with_alpha(Alpha::Blend);
        let out = blend(acc, Channel::DEFAULT, &mut n);
        assert_eq!(out.to_rgb(), Rgb::new(200, 100, 0));
        assert_eq!(out.alpha(), Alpha::Blend);
        assert_eq!(n, 2);
    }

    #[test]
    fn test_contrast() {
        assert!((contrast_ratio(Rgb::WHITE, Rgb::BLACK) - 21.0).abs() < 1e-9);
        assert_eq!(high_contrast_fg(rgb(250, 250, 250)), Rgb::BLACK);
        assert_eq!(high_contrast_fg(rgb(0, 0, 80)), Rgb::WHITE);
        assert_eq!(high_contrast_fg(Channel::DEFAULT), Rgb::WHITE);
    }
}
