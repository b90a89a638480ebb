//! Simulation clock.
//!
//! Time is kept as a monotonic `u32` millisecond counter. The counter wraps
//! after roughly 49 days of uptime, so elapsed time must always be computed
//! with [`get_ms_time_diff`] instead of plain subtraction.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    /// Current simulation time in milliseconds.
    pub now_ms: u32,
    /// Milliseconds advanced by the last tick.
    pub delta_ms: u32,
    /// Number of ticks run so far.
    pub tick_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            now_ms: 0,
            delta_ms: 0,
            tick_count: 0,
        }
    }
}

impl WorldTime {
    /// Start the clock at an arbitrary millisecond value.
    pub fn starting_at(now_ms: u32) -> Self {
        WorldTime {
            now_ms,
            ..Default::default()
        }
    }
}

/// Milliseconds elapsed from `old` to `new`, tolerant to counter wraparound.
#[inline]
pub fn get_ms_time_diff(old: u32, new: u32) -> u32 {
    new.wrapping_sub(old)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_plain() {
        assert_eq!(get_ms_time_diff(1000, 1250), 250);
        assert_eq!(get_ms_time_diff(1000, 1000), 0);
    }

    #[test]
    fn test_diff_across_wraparound() {
        let old = u32::MAX - 99;
        let new = 150;
        assert_eq!(get_ms_time_diff(old, new), 250);
    }

    #[test]
    fn test_starting_at() {
        let wt = WorldTime::starting_at(42);
        assert_eq!(wt.now_ms, 42);
        assert_eq!(wt.delta_ms, 0);
        assert_eq!(wt.tick_count, 0);
    }
}
