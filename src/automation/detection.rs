//! Non-uniformity detection for single canvas cells.
//!
//! A cell painted with one color looks the same at its center and at four
//! points part-way to each edge. Cells with sub-pixel detail (placed colors
//! smaller than one canvas pixel, anti-aliased edges) diverge radially. The
//! probe reads five pixels per cell so a full-canvas scan stays cheap.

use image::{GenericImageView, Rgb, RgbImage, SubImage};
use std::collections::HashSet;

use crate::capture::Frame;

/// Average probe distance above which a cell is always flagged,
/// independent of the configured variance.
pub const SECONDARY_VARIANCE_THRESHOLD: f32 = 15.0;

/// Probes sit this fraction of the way from the center to each edge.
const PROBE_REACH: f64 = 2.0 / 3.0;

/// Channel quantization step used when counting distinct colors.
const QUANTIZE_STEP: u8 = 15;

/// A borrowed cell of a frame. Only lives while it is scored; deref it
/// (`&*cell`) to get the pixel view.
pub type Cell<'a> = SubImage<&'a RgbImage>;

/// Extracts the cell whose top-left corner is at `(origin_x, origin_y)`.
///
/// Bounds are floored to whole pixels. Returns `None` when the cell would
/// start at a negative coordinate, run past the frame, or be empty. Edge
/// cells are expected, so this is not an error.
pub fn sample_cell(frame: &Frame, origin_x: f64, origin_y: f64, cell_size: f64) -> Option<Cell<'_>> {
    let image = frame.image();
    let x_start = origin_x.floor();
    let y_start = origin_y.floor();
    let x_end = (origin_x + cell_size).floor();
    let y_end = (origin_y + cell_size).floor();

    if x_start < 0.0
        || y_start < 0.0
        || x_end > image.width() as f64
        || y_end > image.height() as f64
    {
        return None;
    }
    if x_end <= x_start || y_end <= y_start {
        return None;
    }

    Some(image.view(
        x_start as u32,
        y_start as u32,
        (x_end - x_start) as u32,
        (y_end - y_start) as u32,
    ))
}

/// Center and the four directional probe coordinates of a `width x height` cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbePoints {
    pub center: (u32, u32),
    pub right: (u32, u32),
    pub left: (u32, u32),
    pub bottom: (u32, u32),
    pub top: (u32, u32),
}

impl ProbePoints {
    /// Callers guarantee a non-empty cell.
    pub fn for_size(width: u32, height: u32) -> Self {
        let cx = width / 2;
        let cy = height / 2;

        let right_x = (cx as f64 + PROBE_REACH * (width - 1 - cx) as f64) as u32;
        let left_x = (cx as f64 - PROBE_REACH * cx as f64) as u32;
        let bottom_y = (cy as f64 + PROBE_REACH * (height - 1 - cy) as f64) as u32;
        let top_y = (cy as f64 - PROBE_REACH * cy as f64) as u32;

        Self {
            center: (cx, cy),
            right: (right_x, cy),
            left: (left_x, cy),
            bottom: (cx, bottom_y),
            top: (cx, top_y),
        }
    }
}

/// Result of probing one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellScore {
    pub has_variance: bool,
    /// `max_distance + avg_distance`
    pub score: f32,
    pub max_distance: f32,
    pub avg_distance: f32,
}

/// Euclidean distance between two colors, channels taken as reals.
pub fn color_distance(a: Rgb<u8>, b: Rgb<u8>) -> f32 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&p, &q)| {
            let d = p as f32 - q as f32;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

/// Scores a cell with the five-point radial probe.
///
/// Empty cells score `(false, 0)`.
pub fn score_cell<V>(cell: &V, min_color_variance: f32) -> CellScore
where
    V: GenericImageView<Pixel = Rgb<u8>>,
{
    let (width, height) = cell.dimensions();
    if width == 0 || height == 0 {
        return CellScore::default();
    }

    let probes = ProbePoints::for_size(width, height);
    let center = cell.get_pixel(probes.center.0, probes.center.1);
    let distances = [probes.right, probes.left, probes.bottom, probes.top]
        .map(|(x, y)| color_distance(center, cell.get_pixel(x, y)));

    let max_distance = distances.iter().copied().fold(0.0_f32, f32::max);
    let avg_distance = distances.iter().sum::<f32>() / distances.len() as f32;

    CellScore {
        has_variance: max_distance > min_color_variance
            || avg_distance > SECONDARY_VARIANCE_THRESHOLD,
        score: max_distance + avg_distance,
        max_distance,
        avg_distance,
    }
}

/// Whole-cell statistics shown by the detection test. Not used for ranking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellStats {
    /// Distinct colors after quantizing channels to multiples of 15
    pub unique_colors: usize,
    /// Mean of the per-channel population standard deviations
    pub mean_std_dev: f64,
}

pub fn cell_stats<V>(cell: &V) -> CellStats
where
    V: GenericImageView<Pixel = Rgb<u8>>,
{
    let (width, height) = cell.dimensions();
    let count = (width as usize) * (height as usize);
    if count == 0 {
        return CellStats {
            unique_colors: 0,
            mean_std_dev: 0.0,
        };
    }

    let mut colors = HashSet::new();
    let mut sums = [0.0_f64; 3];
    let mut squares = [0.0_f64; 3];
    for (_, _, pixel) in cell.pixels() {
        colors.insert(pixel.0.map(|c| (c / QUANTIZE_STEP) * QUANTIZE_STEP));
        for (channel, &value) in pixel.0.iter().enumerate() {
            sums[channel] += value as f64;
            squares[channel] += (value as f64) * (value as f64);
        }
    }

    let n = count as f64;
    let std_sum: f64 = (0..3)
        .map(|c| {
            let mean = sums[c] / n;
            (squares[c] / n - mean * mean).max(0.0).sqrt()
        })
        .sum();

    CellStats {
        unique_colors: colors.len(),
        mean_std_dev: std_sum / 3.0,
    }
}
