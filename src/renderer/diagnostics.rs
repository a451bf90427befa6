use std::time::{Duration, Instant};

use crate::renderer::TraceStats;

/// Average frame time over rolling windows of one second.
#[derive(Clone, Debug)]
pub struct FrameTimer {
    window_start: Instant,
    frames: u32,
}

impl FrameTimer {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        FrameTimer {
            window_start: start,
            frames: 0,
        }
    }

    pub fn frame_finished(&mut self) -> Option<Duration> {
        self.frame_finished_at(Instant::now())
    }

    /// Counts a finished frame. Once a window is full, returns the average frame time
    /// over it and starts a new window.
    pub fn frame_finished_at(&mut self, now: Instant) -> Option<Duration> {
        self.frames += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < Self::WINDOW {
            return None;
        }

        let average = elapsed / self.frames;
        log::info!(
            "{:.2} ms/frame ({} frames)",
            average.as_secs_f64() * 1000.0,
            self.frames
        );

        self.window_start = now;
        self.frames = 0;
        Some(average)
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Intersection test counts of one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameStats {
    pub primary_rays: usize,
    pub total_tests: usize,
    pub box_tests: usize,
    pub primitive_tests: usize,
    pub average_tests_per_ray: f32,
    pub max_tests_per_ray: usize,
    pub deepest_depth: u32,
}

impl From<&TraceStats> for FrameStats {
    fn from(stats: &TraceStats) -> Self {
        let total_tests = stats.totals.total_tests();
        FrameStats {
            primary_rays: stats.primary_rays,
            total_tests,
            box_tests: stats.totals.box_tests,
            primitive_tests: stats.totals.primitive_tests,
            average_tests_per_ray: if stats.primary_rays > 0 {
                total_tests as f32 / stats.primary_rays as f32
            } else {
                0.0
            },
            max_tests_per_ray: stats.tests_per_ray.max,
            deepest_depth: stats.deepest_depth,
        }
    }
}

impl FrameStats {
    pub fn log(&self) {
        log::info!(
            "{} intersection tests ({} box, {} primitive) for {} rays, {:.1} per ray (max {}), depth {}",
            self.total_tests,
            self.box_tests,
            self.primitive_tests,
            self.primary_rays,
            self.average_tests_per_ray,
            self.max_tests_per_ray,
            self.deepest_depth,
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scene::QueryStats;
    use crate::util::Stats;
    use assert2::{assert, let_assert};

    #[test]
    fn timer_reports_once_per_window() {
        let start = Instant::now();
        let mut timer = FrameTimer::starting_at(start);

        for i in 1..10 {
            assert!(timer.frame_finished_at(start + Duration::from_millis(100 * i)).is_none());
        }
        let_assert!(Some(average) = timer.frame_finished_at(start + Duration::from_millis(1000)));
        assert!(average == Duration::from_millis(100));

        // New window starts at the last report
        assert!(timer.frame_finished_at(start + Duration::from_millis(1500)).is_none());
        let_assert!(Some(average) = timer.frame_finished_at(start + Duration::from_millis(2000)));
        assert!(average == Duration::from_millis(500));
    }

    #[test]
    fn slow_frame_fills_window_alone() {
        let start = Instant::now();
        let mut timer = FrameTimer::starting_at(start);
        let_assert!(Some(average) = timer.frame_finished_at(start + Duration::from_secs(3)));
        assert!(average == Duration::from_secs(3));
    }

    #[test]
    fn frame_stats_averages() {
        let mut tests_per_ray = Stats::default();
        tests_per_ray.add_samples([10, 30]);
        let trace_stats = TraceStats {
            primary_rays: 2,
            tests_per_ray,
            totals: QueryStats {
                box_tests: 15,
                primitive_tests: 25,
                leaves_visited: 4,
            },
            deepest_depth: 3,
        };

        let stats = FrameStats::from(&trace_stats);
        assert!(stats.total_tests == 40);
        assert!(stats.average_tests_per_ray == 20.0);
        assert!(stats.max_tests_per_ray == 30);
    }

    #[test]
    fn frame_stats_of_empty_frame() {
        let stats = FrameStats::from(&TraceStats::default());
        assert!(stats.average_tests_per_ray == 0.0);
    }
}
