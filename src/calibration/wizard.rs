//! Two-point canvas calibration.
//!
//! The user hovers the canvas top-left corner and presses the calibration
//! key, then does the same at the bottom-right corner.

use anyhow::{Context, Result, bail};
use std::time::Duration;

use crate::automation::clock::Clock;
use crate::automation::config::Config;
use crate::input::{InputDriver, Key};

/// Pause between a key press and the cursor read; also keeps one press from counting twice.
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// Screen rectangle recorded by the wizard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Calibration {
    pub origin_x: i32,
    pub origin_y: i32,
    pub width: u32,
    pub height: u32,
}

impl Calibration {
    /// Builds the rectangle from two corners. The second corner must lie
    /// strictly below and to the right of the first.
    pub fn from_corners(top_left: (i32, i32), bottom_right: (i32, i32)) -> Result<Self> {
        let width = bottom_right.0 - top_left.0;
        let height = bottom_right.1 - top_left.1;
        if width <= 0 || height <= 0 {
            bail!(
                "Bottom-right corner ({}, {}) is not below and right of top-left corner ({}, {})",
                bottom_right.0,
                bottom_right.1,
                top_left.0,
                top_left.1
            );
        }
        Ok(Self {
            origin_x: top_left.0,
            origin_y: top_left.1,
            width: width as u32,
            height: height as u32,
        })
    }

    pub fn apply(&self, config: &mut Config) {
        config.origin_x = self.origin_x;
        config.origin_y = self.origin_y;
        config.width = self.width;
        config.height = self.height;
    }
}

fn record_corner(
    input: &mut dyn InputDriver,
    clock: &dyn Clock,
    key: Key,
    name: &str,
) -> Result<(i32, i32)> {
    log::info!("Hover the {} corner of the canvas and press {}", name, key);
    input.wait_for_key(key)?;
    clock.sleep(DEBOUNCE);
    let position = input
        .cursor_position()
        .with_context(|| format!("Failed to read {} corner", name))?;
    log::info!("{} corner: ({}, {})", name, position.0, position.1);
    Ok(position)
}

/// Records the canvas rectangle and stores it in `config`.
///
/// On a degenerate rectangle the configuration is left untouched.
pub fn calibrate_canvas(
    config: &mut Config,
    input: &mut dyn InputDriver,
    clock: &dyn Clock,
) -> Result<Calibration> {
    let key: Key = config
        .calibration_key
        .parse()
        .context("Invalid calibration key")?;

    let top_left = record_corner(input, clock, key, "top-left")?;
    let bottom_right = record_corner(input, clock, key, "bottom-right")?;

    let calibration = Calibration::from_corners(top_left, bottom_right)?;
    calibration.apply(config);

    let (cols, rows) = config.grid_dimensions();
    log::info!(
        "Canvas calibrated: origin ({}, {}), size {}x{}",
        calibration.origin_x,
        calibration.origin_y,
        calibration.width,
        calibration.height
    );
    log::info!(
        "Estimated grid: {}x{} pixels at {:.2}px",
        cols,
        rows,
        config.cell_size
    );

    Ok(calibration)
}
