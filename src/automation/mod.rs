//! The touch-up clicker.
//!
//! This module provides:
//! - Parameter storage and validation
//! - Five-point radial variance scoring of canvas cells
//! - Whole-canvas scans ranked by score
//! - The clicker state machine and its session runner
//! - The one-shot detection test

pub mod clock;
pub mod config;
pub mod detection;
pub mod queue;
pub mod runner;
pub mod scanner;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, SystemClock};
pub use config::{Config, ParamError, load_config};
pub use runner::{DetectionReport, countdown, run_clicker, run_detection_test};
pub use scanner::{Candidate, ScanResult, scan_frame};
pub use state::{SessionReport, StopReason, StopSignal};
