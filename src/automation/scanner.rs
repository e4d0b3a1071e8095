//! Full-canvas grid scan.
//!
//! Sweeps the frame row by row in steps of one cell, probes every whole cell
//! and ranks the flagged ones by score, highest first.

use chrono::{DateTime, Local};
use std::time::Instant;

use crate::automation::config::Config;
use crate::automation::detection::{sample_cell, score_cell};
use crate::capture::Frame;

/// A flagged cell waiting to be clicked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Cell center, relative to the canvas origin
    pub center_x: f64,
    pub center_y: f64,
    pub score: f32,
    pub grid_x: u32,
    pub grid_y: u32,
}

/// Output of one scan cycle. Candidates are sorted by score, descending,
/// with ties kept in row-major discovery order.
#[derive(Clone, Debug)]
pub struct ScanResult {
    candidates: Vec<Candidate>,
    /// Cells that were sampled and scored
    pub cells_checked: usize,
    /// Whole cells per row and per column
    pub grid: (u32, u32),
    /// Capture time of the scanned frame
    pub captured_at: DateTime<Local>,
}

impl ScanResult {
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Scans `frame` with the geometry and thresholds in `config`.
///
/// The cursor advances in floating point so fractional cell sizes work;
/// grid indices come from separate integer counters. A trailing strip
/// narrower than one cell is never sampled.
pub fn scan_frame(frame: &Frame, config: &Config) -> ScanResult {
    let started = Instant::now();
    let cell_size = config.cell_size;
    let (grid_width, grid_height) = config.grid_dimensions();
    let width = config.width as f64;
    let height = config.height as f64;

    log::info!(
        "Scanning {}x{} canvas: grid {}x{}, cell {:.4} px, min variance {}",
        config.width,
        config.height,
        grid_width,
        grid_height,
        cell_size,
        config.min_color_variance
    );

    let mut candidates = Vec::new();
    let mut cells_checked = 0;
    let mut last_progress = 0;

    if cell_size > 0.0 {
        let mut canvas_y = 0.0;
        let mut grid_y = 0;
        while grid_y < grid_height && canvas_y + cell_size <= height {
            let mut canvas_x = 0.0;
            let mut grid_x = 0;
            while grid_x < grid_width && canvas_x + cell_size <= width {
                if let Some(cell) = sample_cell(frame, canvas_x, canvas_y, cell_size) {
                    let result = score_cell(&*cell, config.min_color_variance);
                    cells_checked += 1;
                    if result.has_variance {
                        candidates.push(Candidate {
                            center_x: canvas_x + cell_size / 2.0,
                            center_y: canvas_y + cell_size / 2.0,
                            score: result.score,
                            grid_x,
                            grid_y,
                        });
                    }
                }
                canvas_x += cell_size;
                grid_x += 1;
            }

            let progress = grid_y * 100 / grid_height.max(1);
            if progress >= last_progress + 10 {
                log::debug!(
                    "Scan progress: {}% ({} candidates)",
                    progress,
                    candidates.len()
                );
                last_progress = progress;
            }

            canvas_y += cell_size;
            grid_y += 1;
        }
    }

    // sort_by is stable, so equal scores keep scan order
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    log::info!(
        "Scan complete: {} candidates ({} cells checked) in {:.1}ms",
        candidates.len(),
        cells_checked,
        started.elapsed().as_secs_f64() * 1000.0
    );

    ScanResult {
        candidates,
        cells_checked,
        grid: (grid_width, grid_height),
        captured_at: frame.captured_at(),
    }
}
