//! PNG progress chart
//!
//! One polyline per training day: x is the exercise position in the day,
//! y the last logged weight of that exercise. No text is drawn; days are
//! told apart by colour.

use crate::runtime::ChartRenderer;
use crate::store::Day;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use std::collections::BTreeMap;

const WIDTH: u32 = 600;
const HEIGHT: u32 = 300;
const MARGIN: u32 = 30;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);

/// Line colour per day, Monday first
const DAY_COLOURS: [Rgb<u8>; 7] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
    Rgb([148, 103, 189]),
    Rgb([140, 86, 75]),
    Rgb([227, 119, 194]),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct PngChartRenderer;

impl ChartRenderer for PngChartRenderer {
    fn render_progress(&self, series: &BTreeMap<Day, Vec<f64>>) -> Option<Vec<u8>> {
        let img = draw(series)?;
        match encode_png(&img) {
            Ok(png) => Some(png),
            Err(e) => {
                tracing::error!(error = %e, "PNG encoding failed");
                None
            }
        }
    }
}

fn draw(series: &BTreeMap<Day, Vec<f64>>) -> Option<RgbImage> {
    let longest = series.values().map(Vec::len).max().unwrap_or(0);
    if longest == 0 {
        return None;
    }
    let top = series
        .values()
        .flatten()
        .copied()
        .fold(0.0_f64, f64::max);
    let scale = Scale {
        points: longest,
        max_weight: if top > 0.0 { top * 1.1 } else { 1.0 },
    };

    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    // Horizontal grid at quarters of the range
    for step in 1..=4 {
        let y = scale.y(scale.max_weight * f64::from(step) / 4.0);
        line(&mut img, (i64::from(MARGIN), y), (i64::from(WIDTH - MARGIN), y), GRID);
    }
    let origin = (i64::from(MARGIN), i64::from(HEIGHT - MARGIN));
    line(&mut img, origin, (i64::from(WIDTH - MARGIN), origin.1), AXIS);
    line(&mut img, origin, (origin.0, i64::from(MARGIN)), AXIS);

    for (day, weights) in series {
        let colour = DAY_COLOURS[Day::ALL.iter().position(|d| d == day).unwrap_or(0)];
        let points: Vec<(i64, i64)> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| (scale.x(i), scale.y(*w)))
            .collect();
        for pair in points.windows(2) {
            line(&mut img, pair[0], pair[1], colour);
        }
        for point in &points {
            marker(&mut img, *point, colour);
        }
    }

    Some(img)
}

/// Maps series positions and weights onto the plot area
struct Scale {
    points: usize,
    max_weight: f64,
}

impl Scale {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn x(&self, index: usize) -> i64 {
        let width = f64::from(WIDTH - 2 * MARGIN);
        let offset = if self.points <= 1 {
            width / 2.0
        } else {
            width * index as f64 / (self.points - 1) as f64
        };
        i64::from(MARGIN) + offset.round() as i64
    }

    #[allow(clippy::cast_possible_truncation)]
    fn y(&self, weight: f64) -> i64 {
        let height = f64::from(HEIGHT - 2 * MARGIN);
        let ratio = (weight / self.max_weight).clamp(0.0, 1.0);
        i64::from(HEIGHT - MARGIN) - (height * ratio).round() as i64
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, colour: Rgb<u8>) {
    if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) {
        if x < img.width() && y < img.height() {
            img.put_pixel(x, y, colour);
        }
    }
}

/// Bresenham line, two pixels thick
fn line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), colour: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put(img, x, y, colour);
        put(img, x, y + 1, colour);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn marker(img: &mut RgbImage, (cx, cy): (i64, i64), colour: Rgb<u8>) {
    for x in cx - 3..=cx + 3 {
        for y in cy - 3..=cy + 3 {
            put(img, x, y, colour);
        }
    }
}

fn encode_png(img: &RgbImage) -> image::ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(buf)
}
