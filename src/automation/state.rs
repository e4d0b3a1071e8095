//! Clicker state machine.
//!
//! The state machine sequences through: Idle → Scanning → Dispatching →
//! (Waiting | Scanning) → Stopped. Each step checks the host stop signal;
//! the stop key is polled once per dispatch.

use anyhow::Result;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::automation::clock::Clock;
use crate::automation::config::Config;
use crate::automation::queue::ClickQueue;
use crate::automation::scanner::{Candidate, scan_frame};
use crate::capture::{CaptureProvider, CaptureRect};
use crate::input::{InputDriver, Key};

/// Pause after a scan that found nothing.
pub const EMPTY_SCAN_BACKOFF: Duration = Duration::from_secs(2);

/// Host-level stop request shared with the interrupt handler.
///
/// While armed (a session is running) an interrupt only requests a stop;
/// the scheduler picks it up at its next step.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    armed: Arc<AtomicBool>,
    requested: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a session as running and clears stale requests.
    pub fn arm(&self) {
        self.requested.store(false, Ordering::SeqCst);
        self.armed.store(true, Ordering::SeqCst);
    }

    pub fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Why a session ended.
#[derive(Clone, Debug, PartialEq)]
pub enum StopReason {
    /// The stop key was held
    StopKey,
    /// Host interrupt (Ctrl+C)
    Interrupted,
    /// The canvas could not be captured
    CaptureFailed(String),
    /// Any other failure inside the loop
    Error(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::StopKey => write!(f, "stop key pressed"),
            StopReason::Interrupted => write!(f, "interrupted"),
            StopReason::CaptureFailed(msg) => write!(f, "capture failed: {}", msg),
            StopReason::Error(msg) => write!(f, "error: {}", msg),
        }
    }
}

/// Clicker states.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickerState {
    /// Not started yet
    Idle,
    /// Capturing and scanning the canvas
    Scanning,
    /// Clicking queued candidates
    Dispatching,
    /// Backing off after an empty scan
    Waiting,
    /// Session over
    Stopped(StopReason),
}

impl fmt::Display for ClickerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClickerState::Idle => write!(f, "Idle"),
            ClickerState::Scanning => write!(f, "Scanning"),
            ClickerState::Dispatching => write!(f, "Dispatching"),
            ClickerState::Waiting => write!(f, "Waiting"),
            ClickerState::Stopped(reason) => write!(f, "Stopped ({})", reason),
        }
    }
}

/// Summary logged when a session stops.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionReport {
    pub clicks: u64,
    pub scans: u64,
    pub elapsed: Duration,
    pub reason: StopReason,
}

impl SessionReport {
    /// Clicks per second actually achieved.
    pub fn effective_cps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.clicks as f64 / secs
        } else {
            0.0
        }
    }
}

/// Absolute screen position of a candidate's center.
pub fn screen_position(config: &Config, candidate: &Candidate) -> (i32, i32) {
    (
        (config.origin_x as f64 + candidate.center_x).floor() as i32,
        (config.origin_y as f64 + candidate.center_y).floor() as i32,
    )
}

/// Everything one clicker session works with. The config is borrowed
/// exclusively for the whole session.
pub struct ClickContext<'a> {
    /// Current state
    pub state: ClickerState,
    config: &'a mut Config,
    capture: &'a mut dyn CaptureProvider,
    input: &'a mut dyn InputDriver,
    clock: &'a dyn Clock,
    stop: StopSignal,
    stop_key: Key,
    queue: Option<ClickQueue>,
    last_scan: Option<Instant>,
    /// Clicks issued so far
    pub click_count: u64,
    /// Scans completed so far
    pub scan_count: u64,
    started_at: Instant,
}

impl<'a> ClickContext<'a> {
    pub fn new(
        config: &'a mut Config,
        capture: &'a mut dyn CaptureProvider,
        input: &'a mut dyn InputDriver,
        clock: &'a dyn Clock,
        stop: StopSignal,
        stop_key: Key,
    ) -> Self {
        let started_at = clock.now();
        Self {
            state: ClickerState::Idle,
            config,
            capture,
            input,
            clock,
            stop,
            stop_key,
            queue: None,
            last_scan: None,
            click_count: 0,
            scan_count: 0,
            started_at,
        }
    }

    /// Advances the state machine by one step.
    ///
    /// Returns `Ok(true)` to keep going, `Ok(false)` once stopped.
    pub fn step(&mut self) -> Result<bool> {
        if self.stop.is_requested() && !matches!(self.state, ClickerState::Stopped(_)) {
            log::info!("Interrupt received, stopping clicker");
            self.state = ClickerState::Stopped(StopReason::Interrupted);
            return Ok(false);
        }

        match &self.state {
            ClickerState::Idle => {
                self.config.running = true;
                log::info!(
                    "Clicker started: {} CPS ({:.3}s between clicks), rescan every {}s, hold {} to stop",
                    self.config.clicks_per_second,
                    self.config.click_delay_secs(),
                    self.config.scan_interval_secs,
                    self.stop_key
                );
                self.state = ClickerState::Scanning;
                Ok(true)
            }

            ClickerState::Scanning => self.scan(),

            ClickerState::Dispatching => self.dispatch(),

            ClickerState::Waiting => {
                log::info!(
                    "No candidates, waiting {}s before next scan",
                    EMPTY_SCAN_BACKOFF.as_secs()
                );
                self.clock.sleep(EMPTY_SCAN_BACKOFF);
                self.state = ClickerState::Dispatching;
                Ok(true)
            }

            ClickerState::Stopped(_) => Ok(false),
        }
    }

    fn scan(&mut self) -> Result<bool> {
        let scan_started = self.clock.now();
        let rect = CaptureRect::from_config(self.config);

        let frame = match self.capture.capture(&rect) {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("Capture failed: {:#}", e);
                self.state = ClickerState::Stopped(StopReason::CaptureFailed(format!("{:#}", e)));
                return Ok(false);
            }
        };

        let result = scan_frame(&frame, self.config);
        self.scan_count += 1;
        self.last_scan = Some(scan_started);

        self.state = if result.is_empty() {
            ClickerState::Waiting
        } else {
            ClickerState::Dispatching
        };
        self.queue = Some(ClickQueue::new(result));
        Ok(true)
    }

    fn rescan_due(&self) -> bool {
        let queue_empty = self.queue.as_ref().is_none_or(ClickQueue::is_empty);
        let interval_elapsed = self.last_scan.is_none_or(|at| {
            self.clock.now().saturating_duration_since(at) > self.config.scan_interval()
        });
        queue_empty || interval_elapsed
    }

    fn dispatch(&mut self) -> Result<bool> {
        if self.input.is_key_pressed(self.stop_key)? {
            log::info!("Stop key {} pressed", self.stop_key);
            self.state = ClickerState::Stopped(StopReason::StopKey);
            return Ok(false);
        }

        if self.rescan_due() {
            self.state = ClickerState::Scanning;
            return Ok(true);
        }

        let Some(candidate) = self.queue.as_mut().and_then(ClickQueue::pop) else {
            self.state = ClickerState::Scanning;
            return Ok(true);
        };

        let (x, y) = screen_position(self.config, &candidate);
        let click_started = self.clock.now();
        self.input.move_to(x, y)?;
        self.input.click()?;
        let click_time = self.clock.now().saturating_duration_since(click_started);
        self.click_count += 1;

        log::info!(
            "Click #{} at grid ({}, {}) score {:.1} in {:.1}ms - {} left",
            self.click_count,
            candidate.grid_x,
            candidate.grid_y,
            candidate.score,
            click_time.as_secs_f64() * 1000.0,
            self.queue.as_ref().map_or(0, ClickQueue::remaining)
        );

        let delay = self.config.click_delay().saturating_sub(click_time);
        if !delay.is_zero() {
            self.clock.sleep(delay);
        }
        Ok(true)
    }

    /// Ends the session: clears `running` and logs the report.
    pub fn finish(self) -> SessionReport {
        self.config.running = false;
        let reason = match self.state {
            ClickerState::Stopped(reason) => reason,
            other => StopReason::Error(format!("loop exited in state {}", other)),
        };
        let report = SessionReport {
            clicks: self.click_count,
            scans: self.scan_count,
            elapsed: self.clock.now().saturating_duration_since(self.started_at),
            reason,
        };

        log::info!("=== Clicker stopped ({}) ===", report.reason);
        log::info!(
            "Total clicks: {} over {} scans in {:.1}s",
            report.clicks,
            report.scans,
            report.elapsed.as_secs_f64()
        );
        if report.clicks > 0 {
            log::info!("Average CPS: {:.2}", report.effective_cps());
        }
        report
    }
}
