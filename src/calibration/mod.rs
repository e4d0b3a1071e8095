//! Canvas calibration and detection previews.
//!
//! Provides the two-point wizard that locates the canvas on screen, and
//! the overlay renderer used by the detection test.

pub mod preview;
pub mod wizard;

pub use preview::render_detection;
pub use wizard::{Calibration, calibrate_canvas};
