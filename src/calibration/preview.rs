//! Preview rendering for detection results.
//!
//! Draws the logical-pixel grid, a ring per candidate, and rank numbers
//! for the best candidates onto a copy of the captured canvas.

use image::{Rgb, RgbImage};

use crate::automation::config::Config;
use crate::automation::scanner::ScanResult;

pub const COLOR_GRID: Rgb<u8> = Rgb([200, 200, 200]);
pub const COLOR_LABEL: Rgb<u8> = Rgb([0, 255, 0]);

pub const MARKER_RADIUS: u32 = 6;
pub const MARKER_THICKNESS: u32 = 2;

/// Only the best candidates get a rank number.
pub const LABELED_CANDIDATES: usize = 30;

const LABEL_OFFSET: i32 = 8;
const GLYPH_SCALE: u32 = 2;

/// 3x5 bitmaps for the digits 0-9, one row per entry, high bit on the left.
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Red marker color whose intensity follows the score.
pub fn marker_color(score: f32) -> Rgb<u8> {
    let intensity = (score * 20.0).clamp(0.0, 255.0) as u8;
    Rgb([intensity, 0, 0])
}

/// Renders the grid and detections over a copy of `image`.
pub fn render_detection(image: &RgbImage, scan: &ScanResult, config: &Config) -> RgbImage {
    let mut img = image.clone();
    draw_grid(&mut img, config.cell_size, COLOR_GRID);

    for (rank, candidate) in scan.candidates().iter().enumerate() {
        let cx = candidate.center_x as i32;
        let cy = candidate.center_y as i32;
        draw_circle(
            &mut img,
            cx,
            cy,
            MARKER_RADIUS,
            marker_color(candidate.score),
            MARKER_THICKNESS,
        );
        if rank < LABELED_CANDIDATES {
            let glyph_height = (5 * GLYPH_SCALE) as i32;
            draw_number(
                &mut img,
                cx + LABEL_OFFSET,
                cy + LABEL_OFFSET - glyph_height,
                rank + 1,
                COLOR_LABEL,
            );
        }
    }

    img
}

/// Draws one-pixel grid lines every `spacing` pixels, starting at 0.
pub fn draw_grid(img: &mut RgbImage, spacing: f64, color: Rgb<u8>) {
    if spacing <= 0.0 || !spacing.is_finite() {
        return;
    }
    let (img_w, img_h) = img.dimensions();

    let mut x = 0.0;
    while x < img_w as f64 {
        let px = x as u32;
        for py in 0..img_h {
            img.put_pixel(px, py, color);
        }
        x += spacing;
    }

    let mut y = 0.0;
    while y < img_h as f64 {
        let py = y as u32;
        for px in 0..img_w {
            img.put_pixel(px, py, color);
        }
        y += spacing;
    }
}

/// Draws a ring of the given thickness centered on `radius`, clipped to the image.
pub fn draw_circle(
    img: &mut RgbImage,
    cx: i32,
    cy: i32,
    radius: u32,
    color: Rgb<u8>,
    thickness: u32,
) {
    let (img_w, img_h) = img.dimensions();
    let half = thickness as f64 / 2.0;
    let inner = (radius as f64 - half).max(0.0);
    let outer = radius as f64 + half;
    let reach = outer.ceil() as i32;

    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let dist = ((dx * dx + dy * dy) as f64).sqrt();
            if dist < inner || dist > outer {
                continue;
            }
            let px = cx + dx;
            let py = cy + dy;
            if px >= 0 && py >= 0 && (px as u32) < img_w && (py as u32) < img_h {
                img.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

/// Draws `value` in decimal with its top-left corner at (`x`, `y`).
pub fn draw_number(img: &mut RgbImage, x: i32, y: i32, value: usize, color: Rgb<u8>) {
    let (img_w, img_h) = img.dimensions();
    let advance = (4 * GLYPH_SCALE) as i32;

    for (i, ch) in value.to_string().chars().enumerate() {
        let Some(digit) = ch.to_digit(10) else {
            continue;
        };
        let glyph = &DIGITS[digit as usize];
        let left = x + i as i32 * advance;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..3 {
                if bits & (0b100 >> col) == 0 {
                    continue;
                }
                for sy in 0..GLYPH_SCALE {
                    for sx in 0..GLYPH_SCALE {
                        let px = left + (col * GLYPH_SCALE + sx) as i32;
                        let py = y + (row as u32 * GLYPH_SCALE + sy) as i32;
                        if px >= 0 && py >= 0 && (px as u32) < img_w && (py as u32) < img_h {
                            img.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
    }
}
