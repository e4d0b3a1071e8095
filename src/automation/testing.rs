//! Test doubles for the scheduler: scripted capture, recording input, manual clock.

use anyhow::{Result, anyhow};
use image::{Rgb, RgbImage};
use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

use crate::automation::clock::Clock;
use crate::automation::state::StopSignal;
use crate::capture::{CaptureProvider, CaptureRect, Frame};
use crate::input::{InputDriver, Key};

pub const GRAY: Rgb<u8> = Rgb([128, 128, 128]);

/// A gray canvas of `count` 10 px cells in one row; cell `i` gets a blue
/// offset of `offsets[i]` on its right probe, so larger offsets score higher.
pub fn marked_row(offsets: &[u8]) -> RgbImage {
    let mut image = RgbImage::from_pixel(10 * offsets.len() as u32, 10, GRAY);
    for (i, &offset) in offsets.iter().enumerate() {
        image.put_pixel(i as u32 * 10 + 7, 5, Rgb([128, 128, 128 + offset]));
    }
    image
}

/// Returns a copy of the same image on every capture, or always fails.
pub struct ScriptedCapture {
    image: Option<RgbImage>,
    pub requests: Vec<CaptureRect>,
}

impl ScriptedCapture {
    pub fn repeating(image: RgbImage) -> Self {
        Self {
            image: Some(image),
            requests: Vec::new(),
        }
    }

    pub fn failing() -> Self {
        Self {
            image: None,
            requests: Vec::new(),
        }
    }
}

impl CaptureProvider for ScriptedCapture {
    fn capture(&mut self, rect: &CaptureRect) -> Result<Frame> {
        self.requests.push(*rect);
        match &self.image {
            Some(image) => Ok(Frame::new(image.clone())),
            None => Err(anyhow!("region is off-screen")),
        }
    }
}

/// Records pointer actions and presses the stop key on cue.
#[derive(Default)]
pub struct RecordingInput {
    pub moves: Vec<(i32, i32)>,
    pub clicks: usize,
    pub key_polls: Vec<Key>,
    /// Report the polled key as pressed once this many clicks happened
    pub stop_after_clicks: Option<usize>,
    /// Report the polled key as pressed on this (1-based) poll
    pub stop_on_poll: Option<usize>,
    /// Request a host interrupt right after this click
    pub interrupt_after_click: Option<(usize, StopSignal)>,
    pub fail_clicks: bool,
    pub cursor: (i32, i32),
    /// Cursor positions handed out by successive `wait_for_key` calls
    pub cursor_script: Vec<(i32, i32)>,
}

impl InputDriver for RecordingInput {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.moves.push((x, y));
        self.cursor = (x, y);
        Ok(())
    }

    fn click(&mut self) -> Result<()> {
        if self.fail_clicks {
            return Err(anyhow!("input backend disconnected"));
        }
        self.clicks += 1;
        if let Some((after, signal)) = &self.interrupt_after_click {
            if self.clicks == *after {
                signal.request();
            }
        }
        Ok(())
    }

    fn is_key_pressed(&mut self, key: Key) -> Result<bool> {
        self.key_polls.push(key);
        let by_clicks = self.stop_after_clicks.is_some_and(|n| self.clicks >= n);
        let by_poll = self.stop_on_poll == Some(self.key_polls.len());
        Ok(by_clicks || by_poll)
    }

    fn cursor_position(&mut self) -> Result<(i32, i32)> {
        Ok(self.cursor)
    }

    fn wait_for_key(&mut self, key: Key) -> Result<()> {
        self.key_polls.push(key);
        if !self.cursor_script.is_empty() {
            self.cursor = self.cursor_script.remove(0);
        }
        Ok(())
    }
}

/// A clock that only moves when something sleeps on it.
pub struct ManualClock {
    start: Instant,
    offset: Cell<Duration>,
    pub sleeps: RefCell<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Cell::new(Duration::ZERO),
            sleeps: RefCell::new(Vec::new()),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.offset.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.offset.set(self.offset.get() + duration);
    }
}
