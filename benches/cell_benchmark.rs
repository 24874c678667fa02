//! Cell benchmark: cell comparison and channel packing.
//!
//! Target: < 1ns per comparison

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use laminate::{Alpha, Cell, Channel, ChannelPair, Rgb, Style};

fn colored(c: char, fg: Rgb) -> Cell {
    Cell::new(c)
        .with_fg(Channel::from_rgb(fg))
        .with_bg(Channel::from_rgb(Rgb::new(32, 32, 32)))
}

fn cell_equality_same(c: &mut Criterion) {
    let cell_a = colored('A', Rgb::new(255, 128, 64)).with_style(Style::BOLD);
    let cell_b = cell_a;

    c.bench_function("cell_eq_same", |b| {
        b.iter(|| black_box(&cell_a) == black_box(&cell_b))
    });
}

fn cell_equality_different_grapheme(c: &mut Criterion) {
    let cell_a = Cell::new('A');
    let cell_b = Cell::new('B');

    c.bench_function("cell_eq_diff_grapheme", |b| {
        b.iter(|| black_box(&cell_a) == black_box(&cell_b))
    });
}

fn cell_equality_different_color(c: &mut Criterion) {
    let cell_a = colored('A', Rgb::new(255, 0, 0));
    let cell_b = colored('A', Rgb::new(0, 255, 0));

    c.bench_function("cell_eq_diff_color", |b| {
        b.iter(|| black_box(&cell_a) == black_box(&cell_b))
    });
}

fn channel_packing(c: &mut Criterion) {
    c.bench_function("channel_set_rgb8_alpha", |b| {
        b.iter(|| {
            let mut ch = Channel::DEFAULT;
            let _ = ch.set_rgb8(black_box(12), black_box(34), black_box(56));
            ch.set_alpha(Alpha::Blend);
            ch
        })
    });

    let pair = ChannelPair::combine(
        Channel::from_rgb(Rgb::new(1, 2, 3)),
        Channel::from_rgb(Rgb::new(4, 5, 6)).with_alpha(Alpha::Transparent),
    );
    c.bench_function("channel_pair_split_combine", |b| {
        b.iter(|| {
            let (fg, bg) = black_box(pair).split();
            ChannelPair::combine(bg, fg)
        })
    });
}

criterion_group!(
    benches,
    cell_equality_same,
    cell_equality_different_grapheme,
    cell_equality_different_color,
    channel_packing,
);
criterion_main!(benches);
