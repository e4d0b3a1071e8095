//! Runtime configuration for the clicker.
//!
//! One `Config` is created at startup (optionally seeded from config.json
//! next to the executable) and owned by the session. The interactive editor
//! goes through the validating setters below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Canvas width before calibration; used to detect an uncalibrated rect.
pub const DEFAULT_CANVAS_SIZE: u32 = 1000;

/// Screen pixels per canvas pixel at the site's default zoom.
pub const DEFAULT_CELL_SIZE: f64 = 41.07;

pub const CPS_RANGE: (f64, f64) = (0.1, 100.0);
pub const MIN_UNIQUE_COLORS_RANGE: (u32, u32) = (2, 10);
pub const MIN_COLOR_VARIANCE_RANGE: (f32, f32) = (5.0, 50.0);

/// Rejected parameter input. The previous value is always kept.
#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("{name}: '{input}' is not a number")]
    NotANumber { name: &'static str, input: String },
    #[error("{name} must be between {min} and {max} (got {value})")]
    OutOfRange {
        name: &'static str,
        value: String,
        min: String,
        max: String,
    },
    #[error("{name} must be greater than 0 (got {value})")]
    NotPositive { name: &'static str, value: String },
    #[error("{name} must not be negative (got {value})")]
    Negative { name: &'static str, value: String },
    #[error("{name} is too large (got {value})")]
    TooLarge { name: &'static str, value: String },
}

/// Complete clicker configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Screen X of the canvas top-left corner
    pub origin_x: i32,
    /// Screen Y of the canvas top-left corner
    pub origin_y: i32,
    /// Canvas width in screen pixels
    pub width: u32,
    /// Canvas height in screen pixels
    pub height: u32,
    /// Size of one canvas pixel in screen pixels (may be fractional)
    pub cell_size: f64,
    /// Click rate limit
    pub clicks_per_second: f64,
    /// Seconds between forced re-scans
    pub scan_interval_secs: f64,
    /// Max probe distance above which a cell is flagged
    pub min_color_variance: f32,
    /// Shown by the detection test only; the scorer ignores it
    pub min_unique_colors: u32,
    /// Key that stops the clicker when held
    pub stop_key: String,
    /// Key pressed to record a calibration corner
    pub calibration_key: String,
    /// Countdown before the clicker starts, in seconds
    pub start_delay_secs: u64,
    /// True while a clicker session owns this config
    #[serde(skip)]
    pub running: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            origin_x: 0,
            origin_y: 0,
            width: DEFAULT_CANVAS_SIZE,
            height: DEFAULT_CANVAS_SIZE,
            cell_size: DEFAULT_CELL_SIZE,
            clicks_per_second: 20.0,
            scan_interval_secs: 10.0,
            min_color_variance: 20.0,
            min_unique_colors: 4,
            stop_key: "q".to_string(),
            calibration_key: "f".to_string(),
            start_delay_secs: 3,
            running: false,
        }
    }
}

impl Config {
    /// Grid size in whole cells: `floor(width / cell) x floor(height / cell)`.
    pub fn grid_dimensions(&self) -> (u32, u32) {
        if self.cell_size <= 0.0 {
            return (0, 0);
        }
        (
            (self.width as f64 / self.cell_size).floor() as u32,
            (self.height as f64 / self.cell_size).floor() as u32,
        )
    }

    /// Target time between two clicks, in seconds.
    pub fn click_delay_secs(&self) -> f64 {
        1.0 / self.clicks_per_second
    }

    /// Validated CPS keeps this within 10 s; anything else clicks without delay.
    pub fn click_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.click_delay_secs()).unwrap_or_default()
    }

    /// Validated intervals always fit; anything else never forces a re-scan.
    pub fn scan_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.scan_interval_secs).unwrap_or(Duration::MAX)
    }

    /// The canvas rect has never been set (still the 1000x1000 default at x = 0).
    pub fn needs_calibration(&self) -> bool {
        self.width == DEFAULT_CANVAS_SIZE && self.origin_x == 0
    }

    pub fn set_clicks_per_second(&mut self, input: &str) -> Result<(), ParamError> {
        self.clicks_per_second = check_cps(parse_number("CPS", input)?)?;
        Ok(())
    }

    pub fn set_cell_size(&mut self, input: &str) -> Result<(), ParamError> {
        self.cell_size = check_cell_size(parse_number("Pixel size", input)?)?;
        Ok(())
    }

    pub fn set_min_unique_colors(&mut self, input: &str) -> Result<(), ParamError> {
        self.min_unique_colors = check_unique_colors(parse_number("Min unique colors", input)?)?;
        Ok(())
    }

    pub fn set_min_color_variance(&mut self, input: &str) -> Result<(), ParamError> {
        self.min_color_variance = check_variance(parse_number("Min variance", input)?)?;
        Ok(())
    }

    pub fn set_scan_interval(&mut self, input: &str) -> Result<(), ParamError> {
        self.scan_interval_secs = check_scan_interval(parse_number("Scan interval", input)?)?;
        Ok(())
    }

    /// Replaces every out-of-range field with its default, logging each one.
    fn sanitized(mut self) -> Self {
        let defaults = Config::default();

        if let Err(e) = check_cps(self.clicks_per_second) {
            log::warn!("{}. Using default {}.", e, defaults.clicks_per_second);
            self.clicks_per_second = defaults.clicks_per_second;
        }
        if let Err(e) = check_cell_size(self.cell_size) {
            log::warn!("{}. Using default {}.", e, defaults.cell_size);
            self.cell_size = defaults.cell_size;
        }
        if let Err(e) = check_unique_colors(self.min_unique_colors) {
            log::warn!("{}. Using default {}.", e, defaults.min_unique_colors);
            self.min_unique_colors = defaults.min_unique_colors;
        }
        if let Err(e) = check_variance(self.min_color_variance) {
            log::warn!("{}. Using default {}.", e, defaults.min_color_variance);
            self.min_color_variance = defaults.min_color_variance;
        }
        if let Err(e) = check_scan_interval(self.scan_interval_secs) {
            log::warn!("{}. Using default {}.", e, defaults.scan_interval_secs);
            self.scan_interval_secs = defaults.scan_interval_secs;
        }
        if let Err(e) = check_canvas_side("Canvas width", self.width) {
            log::warn!("{}. Using default {}.", e, defaults.width);
            self.width = defaults.width;
        }
        if let Err(e) = check_canvas_side("Canvas height", self.height) {
            log::warn!("{}. Using default {}.", e, defaults.height);
            self.height = defaults.height;
        }
        self
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, input: &str) -> Result<T, ParamError> {
    input.trim().parse().map_err(|_| ParamError::NotANumber {
        name,
        input: input.trim().to_string(),
    })
}

fn check_range<T>(name: &'static str, value: T, (min, max): (T, T)) -> Result<T, ParamError>
where
    T: PartialOrd + std::fmt::Display,
{
    // NaN fails both comparisons
    if !(value >= min && value <= max) {
        return Err(ParamError::OutOfRange {
            name,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(value)
}

fn check_cps(value: f64) -> Result<f64, ParamError> {
    check_range("CPS", value, CPS_RANGE)
}

fn check_unique_colors(value: u32) -> Result<u32, ParamError> {
    check_range("Min unique colors", value, MIN_UNIQUE_COLORS_RANGE)
}

fn check_variance(value: f32) -> Result<f32, ParamError> {
    check_range("Min variance", value, MIN_COLOR_VARIANCE_RANGE)
}

fn check_cell_size(value: f64) -> Result<f64, ParamError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(ParamError::NotPositive {
            name: "Pixel size",
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn check_scan_interval(value: f64) -> Result<f64, ParamError> {
    if value < 0.0 || value.is_nan() {
        return Err(ParamError::Negative {
            name: "Scan interval",
            value: value.to_string(),
        });
    }
    if Duration::try_from_secs_f64(value).is_err() {
        return Err(ParamError::TooLarge {
            name: "Scan interval",
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn check_canvas_side(name: &'static str, value: u32) -> Result<u32, ParamError> {
    if value == 0 {
        return Err(ParamError::NotPositive {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Loads configuration from `path` or returns defaults.
///
/// The file is only a seed: nothing is ever written back.
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        log::info!("{} not found. Using default config.", path.display());
        return Config::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                log::info!("Config loaded from {}", path.display());
                Config::sanitized(config)
            }
            Err(e) => {
                log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                Config::default()
            }
        },
        Err(e) => {
            log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
            Config::default()
        }
    }
}

/// Loads config.json from next to the executable.
pub fn load_config() -> Config {
    load_config_from(&crate::paths::get_config_path())
}
