//! Consumption queue over a scan result.
//!
//! The scan result stays untouched; the queue only moves a cursor through it,
//! so "what was found" and "what is left to click" never alias.

use crate::automation::scanner::{Candidate, ScanResult};

/// Hands out candidates of one scan, best first.
#[derive(Clone, Debug)]
pub struct ClickQueue {
    scan: ScanResult,
    next: usize,
}

impl ClickQueue {
    pub fn new(scan: ScanResult) -> Self {
        Self { scan, next: 0 }
    }

    /// Takes the highest-scoring candidate not yet handed out.
    pub fn pop(&mut self) -> Option<Candidate> {
        let candidate = self.scan.candidates().get(self.next).copied()?;
        self.next += 1;
        Some(candidate)
    }

    pub fn remaining(&self) -> usize {
        self.scan.len() - self.next
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The scan this queue was built from.
    pub fn scan(&self) -> &ScanResult {
        &self.scan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::config::Config;
    use crate::automation::scanner::scan_frame;
    use crate::capture::Frame;
    use image::{Rgb, RgbImage};

    fn scan_with_marks(offsets: &[u8]) -> ScanResult {
        let width = 10 * offsets.len() as u32;
        let mut image = RgbImage::from_pixel(width, 10, Rgb([100, 100, 100]));
        for (i, &offset) in offsets.iter().enumerate() {
            // right probe of a 10 px cell
            image.put_pixel(i as u32 * 10 + 7, 5, Rgb([100, 100, 100 + offset]));
        }
        let config = Config {
            width,
            height: 10,
            cell_size: 10.0,
            ..Config::default()
        };
        scan_frame(&Frame::new(image), &config)
    }

    #[test]
    fn test_pop_in_score_order() {
        let mut queue = ClickQueue::new(scan_with_marks(&[30, 90, 60]));
        assert_eq!(queue.remaining(), 3);

        let grid: Vec<u32> = std::iter::from_fn(|| queue.pop())
            .map(|c| c.grid_x)
            .collect();
        assert_eq!(grid, vec![1, 2, 0]);
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_popping_leaves_scan_intact() {
        let mut queue = ClickQueue::new(scan_with_marks(&[40, 50]));
        queue.pop();
        assert_eq!(queue.remaining(), 1);
        assert_eq!(queue.scan().len(), 2);
    }

    #[test]
    fn test_empty_scan_gives_empty_queue() {
        let mut queue = ClickQueue::new(scan_with_marks(&[0, 0]));
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }
}
