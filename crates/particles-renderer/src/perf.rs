//! Frame timing and per-frame draw statistics.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::manager::DrawStats;

const DEFAULT_SAMPLES: usize = 120;

#[derive(Debug, Clone, Copy)]
struct FrameSample {
    duration: Duration,
    instances: u32,
    bytes: u64,
}

/// Rolling window of frame durations and the draws made in each frame.
pub struct FrameTimer {
    samples: VecDeque<FrameSample>,
    last_frame: Instant,
    max_samples: usize,
    frames_total: u64,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SAMPLES)
    }

    pub fn with_capacity(max_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples),
            last_frame: Instant::now(),
            max_samples: max_samples.max(1),
            frames_total: 0,
        }
    }

    /// Start a new frame and return seconds elapsed since the previous one.
    pub fn begin_frame(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;
        self.push(FrameSample {
            duration: dt,
            instances: 0,
            bytes: 0,
        });
        dt.as_secs_f32()
    }

    /// Attribute a draw to the current frame.
    pub fn record_draw(&mut self, stats: DrawStats) {
        if let Some(current) = self.samples.back_mut() {
            current.instances += stats.instances;
            current.bytes += stats.bytes_uploaded;
        }
    }

    fn push(&mut self, sample: FrameSample) {
        self.samples.push_back(sample);
        if self.samples.len() > self.max_samples {
            self.samples.pop_front();
        }
        self.frames_total += 1;
    }

    /// Average frames per second over the window.
    pub fn fps(&self) -> f64 {
        let total = self.total_seconds();
        if total <= 0.0 {
            return 0.0;
        }
        self.samples.len() as f64 / total
    }

    /// Average frame time in milliseconds.
    pub fn frame_time_ms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.total_seconds() / self.samples.len() as f64 * 1000.0
    }

    pub fn average_instances(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let total: u64 = self.samples.iter().map(|s| u64::from(s.instances)).sum();
        total as f64 / self.samples.len() as f64
    }

    /// Bytes uploaded across the whole window.
    pub fn bytes_uploaded(&self) -> u64 {
        self.samples.iter().map(|s| s.bytes).sum()
    }

    /// True once every `every` frames, for periodic log lines.
    pub fn should_report(&self, every: u64) -> bool {
        every > 0 && self.frames_total > 0 && self.frames_total % every == 0
    }

    fn total_seconds(&self) -> f64 {
        self.samples.iter().map(|s| s.duration.as_secs_f64()).sum()
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_timer_reports_zero() {
        let timer = FrameTimer::new();
        assert_eq!(timer.fps(), 0.0);
        assert_eq!(timer.frame_time_ms(), 0.0);
        assert_eq!(timer.average_instances(), 0.0);
        assert_eq!(timer.bytes_uploaded(), 0);
    }

    #[test]
    fn fps_after_frames() {
        let mut timer = FrameTimer::new();
        for _ in 0..10 {
            std::thread::sleep(Duration::from_millis(1));
            let dt = timer.begin_frame();
            assert!(dt > 0.0);
        }
        assert!(timer.fps() > 0.0);
        assert!(timer.frame_time_ms() > 0.0);
        assert_eq!(timer.samples.len(), 10);
    }

    #[test]
    fn window_is_bounded() {
        let mut timer = FrameTimer::with_capacity(8);
        for _ in 0..50 {
            timer.begin_frame();
        }
        assert_eq!(timer.samples.len(), 8);
    }

    #[test]
    fn draws_accumulate_into_current_frame() {
        let mut timer = FrameTimer::new();
        timer.record_draw(DrawStats {
            instances: 99,
            bytes_uploaded: 99,
        });
        assert_eq!(timer.bytes_uploaded(), 0);

        timer.begin_frame();
        timer.record_draw(DrawStats {
            instances: 10,
            bytes_uploaded: 960,
        });
        timer.begin_frame();
        timer.record_draw(DrawStats {
            instances: 30,
            bytes_uploaded: 2880,
        });
        assert_eq!(timer.average_instances(), 20.0);
        assert_eq!(timer.bytes_uploaded(), 3840);
    }

    #[test]
    fn reports_periodically() {
        let mut timer = FrameTimer::new();
        assert!(!timer.should_report(3));
        let reports: Vec<bool> = (0..6)
            .map(|_| {
                timer.begin_frame();
                timer.should_report(3)
            })
            .collect();
        assert_eq!(reports, [false, false, true, false, false, true]);
        assert!(!timer.should_report(0));
    }
}
