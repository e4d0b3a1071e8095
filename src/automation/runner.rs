//! Session entry points.
//!
//! `run_clicker` drives the state machine to completion and always produces
//! a report, whatever ends the session. `run_detection_test` is the one-shot
//! diagnostic scan that writes annotated images.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::automation::clock::Clock;
use crate::automation::config::Config;
use crate::automation::detection::{cell_stats, sample_cell, score_cell};
use crate::automation::scanner::{ScanResult, scan_frame};
use crate::automation::state::{ClickContext, ClickerState, SessionReport, StopReason, StopSignal};
use crate::calibration::preview::render_detection;
use crate::capture::{CaptureProvider, CaptureRect};
use crate::input::{InputDriver, Key};

/// Cells probed individually by the detection test, in grid units.
const TEST_CELLS: [(u32, u32); 5] = [(0, 0), (1, 0), (2, 0), (0, 1), (1, 1)];

/// How many ranked candidates the detection test lists.
const TEST_LIST_LEN: usize = 20;

pub const CAPTURE_FILE_NAME: &str = "canvas_capture.png";
pub const DETECTION_FILE_NAME: &str = "canvas_detection.png";

/// Logs a one-per-second countdown.
pub fn countdown(secs: u64, label: &str, clock: &dyn Clock) {
    for remaining in (1..=secs).rev() {
        log::info!("{} in {}...", label, remaining);
        clock.sleep(Duration::from_secs(1));
    }
}

/// Runs a clicker session until the stop key, an interrupt, or a failure.
///
/// Errors inside the loop are logged with full context and end the session;
/// every exit path goes through the same report.
pub fn run_clicker(
    config: &mut Config,
    capture: &mut dyn CaptureProvider,
    input: &mut dyn InputDriver,
    clock: &dyn Clock,
    stop: &StopSignal,
) -> SessionReport {
    let stop_key = match config.stop_key.parse::<Key>() {
        Ok(key) => key,
        Err(e) => {
            log::error!("Cannot start clicker: {}", e);
            return SessionReport {
                clicks: 0,
                scans: 0,
                elapsed: Duration::ZERO,
                reason: StopReason::Error(e.to_string()),
            };
        }
    };

    stop.arm();
    let mut ctx = ClickContext::new(config, capture, input, clock, stop.clone(), stop_key);

    loop {
        match ctx.step() {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                log::error!("Clicker failed while {}: {:?}", ctx.state, e);
                ctx.state = ClickerState::Stopped(StopReason::Error(format!("{:#}", e)));
                break;
            }
        }
    }

    let report = ctx.finish();
    stop.disarm();
    report
}

/// Per-cell diagnostics from the detection test.
#[derive(Clone, Debug, PartialEq)]
pub struct CellProbe {
    pub grid_x: u32,
    pub grid_y: u32,
    pub unique_colors: usize,
    pub mean_std_dev: f64,
    pub score: f32,
    pub has_variance: bool,
}

/// What the detection test found and where it wrote its images.
#[derive(Debug)]
pub struct DetectionReport {
    pub probes: Vec<CellProbe>,
    pub scan: ScanResult,
    pub capture_path: PathBuf,
    pub detection_path: PathBuf,
}

/// Captures the canvas once, probes a few fixed cells, runs a full scan,
/// and saves the raw and annotated frames into `out_dir`.
pub fn run_detection_test(
    config: &Config,
    capture: &mut dyn CaptureProvider,
    out_dir: &Path,
) -> Result<DetectionReport> {
    let frame = capture
        .capture(&CaptureRect::from_config(config))
        .context("Failed to capture canvas")?;

    let mut probes = Vec::new();
    for (grid_x, grid_y) in TEST_CELLS {
        let origin_x = grid_x as f64 * config.cell_size;
        let origin_y = grid_y as f64 * config.cell_size;
        let Some(cell) = sample_cell(&frame, origin_x, origin_y, config.cell_size) else {
            continue;
        };
        let result = score_cell(&*cell, config.min_color_variance);
        let stats = cell_stats(&*cell);
        let probe = CellProbe {
            grid_x,
            grid_y,
            unique_colors: stats.unique_colors,
            mean_std_dev: stats.mean_std_dev,
            score: result.score,
            has_variance: result.has_variance,
        };
        log::info!(
            "Grid pixel ({},{}): {} unique colors (threshold {}), mean variance {:.2}, score {:.2} - {}",
            probe.grid_x,
            probe.grid_y,
            probe.unique_colors,
            config.min_unique_colors,
            probe.mean_std_dev,
            probe.score,
            if probe.has_variance { "NUANCED" } else { "UNIFORM" }
        );
        probes.push(probe);
    }

    let scan = scan_frame(&frame, config);
    if !scan.is_empty() {
        log::info!("Top {} nuanced pixels:", TEST_LIST_LEN.min(scan.len()));
        for (i, candidate) in scan.candidates().iter().take(TEST_LIST_LEN).enumerate() {
            log::info!(
                "  {}. Grid ({},{}), score {:.2}",
                i + 1,
                candidate.grid_x,
                candidate.grid_y,
                candidate.score
            );
        }
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let capture_path = out_dir.join(CAPTURE_FILE_NAME);
    let detection_path = out_dir.join(DETECTION_FILE_NAME);

    frame
        .image()
        .save(&capture_path)
        .with_context(|| format!("Failed to save {}", capture_path.display()))?;
    render_detection(frame.image(), &scan, config)
        .save(&detection_path)
        .with_context(|| format!("Failed to save {}", detection_path.display()))?;

    log::info!("Images saved:");
    log::info!("  - {} (original image)", capture_path.display());
    log::info!("  - {} (grid and detections)", detection_path.display());

    Ok(DetectionReport {
        probes,
        scan,
        capture_path,
        detection_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::testing::{ManualClock, RecordingInput, ScriptedCapture, marked_row};
    use image::{Rgb, RgbImage};

    fn row_config() -> Config {
        Config {
            origin_x: 50,
            origin_y: 60,
            width: 30,
            height: 10,
            cell_size: 10.0,
            ..Config::default()
        }
    }

    #[test]
    fn test_countdown_sleeps_once_per_second() {
        let clock = ManualClock::new();
        countdown(3, "Starting", &clock);
        assert_eq!(*clock.sleeps.borrow(), vec![Duration::from_secs(1); 3]);
    }

    #[test]
    fn test_run_clicker_reports_stop_key() {
        let mut config = row_config();
        let mut capture = ScriptedCapture::repeating(marked_row(&[30, 90, 60]));
        let mut input = RecordingInput {
            stop_after_clicks: Some(2),
            ..Default::default()
        };
        let clock = ManualClock::new();
        let stop = StopSignal::new();

        let report = run_clicker(&mut config, &mut capture, &mut input, &clock, &stop);

        assert_eq!(report.reason, StopReason::StopKey);
        assert_eq!(report.clicks, 2);
        assert_eq!(report.elapsed, Duration::from_millis(100));
        assert!(!config.running);
        assert!(!stop.is_armed());
    }

    #[test]
    fn test_run_clicker_stops_on_input_error() {
        let mut config = row_config();
        let mut capture = ScriptedCapture::repeating(marked_row(&[30, 90, 60]));
        let mut input = RecordingInput {
            fail_clicks: true,
            ..Default::default()
        };
        let clock = ManualClock::new();

        let report = run_clicker(
            &mut config,
            &mut capture,
            &mut input,
            &clock,
            &StopSignal::new(),
        );

        assert_eq!(
            report.reason,
            StopReason::Error("input backend disconnected".to_string())
        );
        assert_eq!(report.clicks, 0);
        assert!(!config.running);
    }

    #[test]
    fn test_run_clicker_clears_stale_interrupt() {
        let stop = StopSignal::new();
        stop.request();

        let mut config = row_config();
        let mut capture = ScriptedCapture::repeating(marked_row(&[30, 90, 60]));
        let mut input = RecordingInput {
            stop_after_clicks: Some(1),
            ..Default::default()
        };
        let clock = ManualClock::new();

        let report = run_clicker(&mut config, &mut capture, &mut input, &clock, &stop);
        assert_eq!(report.reason, StopReason::StopKey);
        assert_eq!(report.clicks, 1);
    }

    #[test]
    fn test_run_clicker_rejects_bad_stop_key() {
        let mut config = Config {
            stop_key: "ctrl".to_string(),
            ..row_config()
        };
        let mut capture = ScriptedCapture::repeating(marked_row(&[30]));
        let mut input = RecordingInput::default();
        let clock = ManualClock::new();

        let report = run_clicker(
            &mut config,
            &mut capture,
            &mut input,
            &clock,
            &StopSignal::new(),
        );
        assert!(matches!(report.reason, StopReason::Error(_)));
        assert!(capture.requests.is_empty());
    }

    #[test]
    fn test_detection_test_writes_images() {
        let dir = tempfile::tempdir().unwrap();
        let mut image = RgbImage::from_pixel(30, 20, Rgb([128, 128, 128]));
        // right probe of cell (1, 0)
        image.put_pixel(17, 5, Rgb([128, 128, 200]));
        let config = Config {
            width: 30,
            height: 20,
            cell_size: 10.0,
            ..Config::default()
        };
        let mut capture = ScriptedCapture::repeating(image);

        let report = run_detection_test(&config, &mut capture, dir.path()).unwrap();

        assert_eq!(report.probes.len(), 5);
        assert!(report.probes[1].has_variance);
        assert!(!report.probes[0].has_variance);
        assert_eq!(report.probes[0].unique_colors, 1);
        assert_eq!(report.scan.len(), 1);
        assert!(report.capture_path.exists());
        assert!(report.detection_path.exists());

        let saved = image::open(&report.capture_path).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (30, 20));
    }

    #[test]
    fn test_detection_test_propagates_capture_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut capture = ScriptedCapture::failing();
        let err = run_detection_test(&Config::default(), &mut capture, dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to capture canvas"));
    }
}
