//! wplace touch-up clicker.
//!
//! Captures a calibrated canvas rectangle, scores every logical canvas pixel
//! for non-uniformity with a five-point radial probe, and clicks the worst
//! cells first at a fixed clicks-per-second rate, re-scanning periodically.

pub mod automation;
pub mod calibration;
pub mod capture;
pub mod input;
pub mod logging;
pub mod menu;
pub mod paths;
