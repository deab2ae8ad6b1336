//! # Frame-rate counter
//!
//! Counts frames over a fixed window and reports frames per second each time
//! the window fills. A short history of frame times feeds the panel graph.
//!
//! ## Usage
//!
//! ```rust
//! use sheen_viewer::performance::FpsCounter;
//!
//! let mut counter = FpsCounter::new(1000);
//! // once per presented frame
//! counter.tick();
//! let fps = counter.fps();
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frame times kept for the history graph.
const HISTORY_LEN: usize = 120;

pub struct FpsCounter {
    /// Frames per report
    sample_frames: u32,
    frames: u32,
    window_start: Instant,
    last_frame: Instant,
    /// Ring buffer of recent frame times
    frame_times: VecDeque<Duration>,
    fps: Option<f64>,
}

impl FpsCounter {
    /// Zero is treated as a one-frame window.
    pub fn new(sample_frames: u32) -> Self {
        Self::starting_at(sample_frames, Instant::now())
    }

    fn starting_at(sample_frames: u32, now: Instant) -> Self {
        Self {
            sample_frames: sample_frames.max(1),
            frames: 0,
            window_start: now,
            last_frame: now,
            frame_times: VecDeque::with_capacity(HISTORY_LEN),
            fps: None,
        }
    }

    /// Counts one frame. Returns the new rate when the window just filled.
    pub fn tick(&mut self) -> Option<f64> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Option<f64> {
        if self.frame_times.len() >= HISTORY_LEN {
            self.frame_times.pop_front();
        }
        self.frame_times
            .push_back(now.saturating_duration_since(self.last_frame));
        self.last_frame = now;

        self.frames += 1;
        if self.frames < self.sample_frames {
            return None;
        }

        let elapsed = now.saturating_duration_since(self.window_start).as_secs_f64();
        let fps = if elapsed > 0.0 {
            f64::from(self.frames) / elapsed
        } else {
            0.0
        };
        log::info!("FPS: {fps:.1}");

        self.fps = Some(fps);
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }

    /// Rate of the last completed window, if any.
    pub fn fps(&self) -> Option<f64> {
        self.fps
    }

    /// Get frame time history in milliseconds for graphing
    pub fn frame_time_history(&self) -> Vec<f32> {
        self.frame_times
            .iter()
            .map(|duration| duration.as_secs_f32() * 1000.0)
            .collect()
    }
}
