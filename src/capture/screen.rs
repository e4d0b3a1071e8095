//! Screen capture using xcap.

use anyhow::{Context, Result, anyhow};
use image::{Rgb, RgbImage};
use xcap::Monitor;

use super::{CaptureProvider, CaptureRect, Frame};

/// Captures a rectangle of the monitor containing its top-left corner.
#[derive(Default)]
pub struct ScreenCapture;

impl ScreenCapture {
    pub fn new() -> Self {
        Self
    }
}

impl CaptureProvider for ScreenCapture {
    fn capture(&mut self, rect: &CaptureRect) -> Result<Frame> {
        if rect.width == 0 || rect.height == 0 {
            return Err(anyhow!(
                "Capture region is empty ({}x{})",
                rect.width,
                rect.height
            ));
        }

        let monitor = Monitor::from_point(rect.left, rect.top).with_context(|| {
            format!("No monitor contains point ({}, {})", rect.left, rect.top)
        })?;
        let monitor_x = monitor.x().context("Failed to read monitor origin")?;
        let monitor_y = monitor.y().context("Failed to read monitor origin")?;

        // capture_region takes monitor-relative coordinates
        let rel_x = u32::try_from(rect.left - monitor_x)
            .map_err(|_| anyhow!("Capture region starts left of its monitor"))?;
        let rel_y = u32::try_from(rect.top - monitor_y)
            .map_err(|_| anyhow!("Capture region starts above its monitor"))?;

        let rgba = monitor
            .capture_region(rel_x, rel_y, rect.width, rect.height)
            .with_context(|| {
                format!(
                    "Failed to capture {}x{} at ({}, {})",
                    rect.width, rect.height, rect.left, rect.top
                )
            })?;

        if rgba.width() != rect.width || rgba.height() != rect.height {
            return Err(anyhow!(
                "Captured {}x{} but requested {}x{}",
                rgba.width(),
                rgba.height(),
                rect.width,
                rect.height
            ));
        }

        // RGBA -> RGB, alpha carries nothing for a screen grab
        let image = RgbImage::from_fn(rect.width, rect.height, |x, y| {
            let p = rgba.get_pixel(x, y);
            Rgb([p[0], p[1], p[2]])
        });

        log::debug!(
            "Captured {}x{} at ({}, {})",
            rect.width,
            rect.height,
            rect.left,
            rect.top
        );
        Ok(Frame::new(image))
    }
}
