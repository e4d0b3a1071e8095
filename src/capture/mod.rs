//! Screen capture of the calibrated canvas rectangle.
//!
//! This module provides:
//! - The capture rectangle and frame snapshot types
//! - The `CaptureProvider` seam used by the scheduler
//! - An xcap-backed screen provider (`desktop` feature)

#[cfg(feature = "desktop")]
pub mod screen;

use anyhow::Result;
use chrono::{DateTime, Local};
use image::RgbImage;

use crate::automation::config::Config;

#[cfg(feature = "desktop")]
pub use screen::ScreenCapture;

/// A rectangle in absolute screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureRect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRect {
    /// The canvas rectangle described by the configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            left: config.origin_x,
            top: config.origin_y,
            width: config.width,
            height: config.height,
        }
    }
}

/// An immutable snapshot of the canvas, consumed by one scan.
#[derive(Clone, Debug)]
pub struct Frame {
    image: RgbImage,
    captured_at: DateTime<Local>,
}

impl Frame {
    /// Wraps a captured image, stamping it with the current time.
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            captured_at: Local::now(),
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }
}

/// Produces frames of a screen rectangle.
///
/// Implementations must return the same frame size for the same rectangle
/// and report failures as errors rather than substituting an image.
pub trait CaptureProvider {
    fn capture(&mut self, rect: &CaptureRect) -> Result<Frame>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_config() {
        let config = Config {
            origin_x: 120,
            origin_y: -40,
            width: 800,
            height: 600,
            ..Config::default()
        };
        let rect = CaptureRect::from_config(&config);
        assert_eq!(
            rect,
            CaptureRect {
                left: 120,
                top: -40,
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn test_frame_reports_dimensions() {
        let frame = Frame::new(RgbImage::new(30, 20));
        assert_eq!((frame.width(), frame.height()), (30, 20));
    }
}
