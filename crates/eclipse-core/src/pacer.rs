//! Fixed-rate frame pacing with millisecond sleeps.
//!
//! Sleeps can only be whole milliseconds, so the sub-millisecond remainder of
//! every short frame is banked in a carry and spent on a later frame. Over many
//! frames the average period converges on the target interval.

use std::time::Duration;

/// Outcome of pacing one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pace {
    pub sleep_ms: u64,
    pub carry: f32,
}

/// Sleep needed after a frame that took `frame_time` seconds.
///
/// Frames at or over budget neither sleep nor touch the carry.
pub fn pace(frame_time: f32, interval: f32, carry: f32) -> Pace {
    if frame_time >= interval {
        return Pace {
            sleep_ms: 0,
            carry,
        };
    }

    let total = (interval - frame_time) + carry;
    let sleep_ms = (total * 1e3).floor().max(0.0) as u64;
    Pace {
        sleep_ms,
        carry: total - sleep_ms as f32 * 1e-3,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FramePacer {
    interval: f32,
    carry: f32,
}

impl FramePacer {
    /// `interval` in seconds; zero or less never sleeps.
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            carry: 0.0,
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn carry(&self) -> f32 {
        self.carry
    }

    /// Update the carry and return how long to sleep.
    pub fn pace(&mut self, frame_time: f32) -> Duration {
        let Pace { sleep_ms, carry } = pace(frame_time, self.interval, self.carry);
        self.carry = carry;
        Duration::from_millis(sleep_ms)
    }
}
