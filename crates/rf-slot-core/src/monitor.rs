//! Performance monitor — frame rate window, rendering counts, game counters
//!
//! Shared behind `Arc` as the machine's [`EventSink`]; game events go to the
//! wrapped [`GameCounters`], frame and rendering data to a locked state.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::events::{EventSink, GameCounters, GameCounts, GameEvent};

/// FPS samples kept for the rolling average
pub const FPS_SAMPLE_WINDOW: usize = 60;

/// Average FPS below this raises [`PerformanceWarning::LowFrameRate`]
pub const LOW_FPS_THRESHOLD: f64 = 30.0;
pub const MEMORY_LIMIT_MB: f64 = 100.0;
pub const DRAW_CALL_LIMIT: u64 = 1000;
pub const TEXTURE_SWAP_LIMIT: u64 = 100;

/// Frame rate summary; all zeros before the first timed frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRateStats {
    pub current: f64,
    /// Mean over the last [`FPS_SAMPLE_WINDOW`] samples
    pub average: f64,
    /// Lowest since creation or the last reset
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

/// Renderer counts for the most recent frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderingCounts {
    pub draw_calls: u64,
    pub texture_swaps: u64,
    pub vertices_drawn: u64,
    pub batches_drawn: u64,
}

/// Memory figures in megabytes, as reported by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub used_mb: f64,
    pub total_mb: f64,
    pub peak_mb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub frame_rate: FrameRateStats,
    pub memory: MemoryUsage,
    pub rendering: RenderingCounts,
    pub game: GameCounts,
    pub uptime_secs: f64,
    /// Frames recorded, timed or not
    pub total_frames: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceWarning {
    LowFrameRate,
    HighMemoryUsage,
    HighDrawCalls,
    HighTextureSwaps,
}

impl fmt::Display for PerformanceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::LowFrameRate => "Low average frame rate detected",
            Self::HighMemoryUsage => "High memory usage detected",
            Self::HighDrawCalls => "High number of draw calls",
            Self::HighTextureSwaps => "High number of texture swaps",
        };
        f.write_str(message)
    }
}

#[derive(Debug)]
struct MonitorState {
    samples: VecDeque<f64>,
    current: f64,
    /// (min, max) once a frame has been timed
    extremes: Option<(f64, f64)>,
    rendering: RenderingCounts,
    memory: MemoryUsage,
    started: Instant,
    total_frames: u64,
}

impl MonitorState {
    fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(FPS_SAMPLE_WINDOW),
            current: 0.0,
            extremes: None,
            rendering: RenderingCounts::default(),
            memory: MemoryUsage::default(),
            started: Instant::now(),
            total_frames: 0,
        }
    }

    fn frame_rate(&self) -> FrameRateStats {
        let average = if self.samples.is_empty() {
            0.0
        } else {
            self.samples.iter().sum::<f64>() / self.samples.len() as f64
        };
        let (min, max) = self.extremes.unwrap_or_default();

        FrameRateStats {
            current: self.current,
            average,
            min,
            max,
            samples: self.samples.len(),
        }
    }
}

/// Collects frame, rendering, memory and gameplay metrics
#[derive(Debug)]
pub struct PerformanceMonitor {
    counters: GameCounters,
    state: RwLock<MonitorState>,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self {
            counters: GameCounters::new(),
            state: RwLock::new(MonitorState::new()),
        }
    }

    pub fn counters(&self) -> &GameCounters {
        &self.counters
    }

    /// Count one frame; a non-zero duration also becomes an FPS sample
    pub fn record_frame(&self, delta: Duration) {
        let mut state = self.state.write();
        state.total_frames += 1;

        let seconds = delta.as_secs_f64();
        if seconds <= 0.0 {
            return;
        }

        let fps = 1.0 / seconds;
        state.current = fps;
        if state.samples.len() >= FPS_SAMPLE_WINDOW {
            state.samples.pop_front();
        }
        state.samples.push_back(fps);
        state.extremes = Some(match state.extremes {
            Some((min, max)) => (min.min(fps), max.max(fps)),
            None => (fps, fps),
        });
    }

    /// Replace the rendering counts with the latest frame's
    pub fn record_rendering(&self, counts: RenderingCounts) {
        self.state.write().rendering = counts;
    }

    pub fn record_memory(&self, used_mb: f64, total_mb: f64) {
        let mut state = self.state.write();
        state.memory.used_mb = used_mb;
        state.memory.total_mb = total_mb;
        state.memory.peak_mb = state.memory.peak_mb.max(used_mb);
    }

    pub fn metrics(&self) -> PerformanceMetrics {
        let state = self.state.read();
        PerformanceMetrics {
            frame_rate: state.frame_rate(),
            memory: state.memory,
            rendering: state.rendering,
            game: self.counters.snapshot(),
            uptime_secs: state.started.elapsed().as_secs_f64(),
            total_frames: state.total_frames,
        }
    }

    /// Thresholds currently exceeded
    ///
    /// The frame rate check only applies once a frame has been timed.
    pub fn warnings(&self) -> Vec<PerformanceWarning> {
        let state = self.state.read();
        let mut warnings = Vec::new();

        if !state.samples.is_empty() && state.frame_rate().average < LOW_FPS_THRESHOLD {
            warnings.push(PerformanceWarning::LowFrameRate);
        }
        if state.memory.used_mb > MEMORY_LIMIT_MB {
            warnings.push(PerformanceWarning::HighMemoryUsage);
        }
        if state.rendering.draw_calls > DRAW_CALL_LIMIT {
            warnings.push(PerformanceWarning::HighDrawCalls);
        }
        if state.rendering.texture_swaps > TEXTURE_SWAP_LIMIT {
            warnings.push(PerformanceWarning::HighTextureSwaps);
        }

        warnings
    }

    /// Clear every metric and restart the uptime clock
    pub fn reset(&self) {
        *self.state.write() = MonitorState::new();
        self.counters.reset();
        log::debug!("Performance metrics reset");
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for PerformanceMonitor {
    fn record(&self, event: GameEvent) {
        self.counters.record(event);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn frames(monitor: &PerformanceMonitor, count: usize, millis: u64) {
        for _ in 0..count {
            monitor.record_frame(Duration::from_millis(millis));
        }
    }

    #[test]
    fn test_empty_monitor() {
        let monitor = PerformanceMonitor::new();
        let metrics = monitor.metrics();
        assert_eq!(metrics.frame_rate, FrameRateStats::default());
        assert_eq!(metrics.total_frames, 0);
        assert!(monitor.warnings().is_empty());
    }

    #[test]
    fn test_window_keeps_last_sixty_samples() {
        let monitor = PerformanceMonitor::new();
        frames(&monitor, FPS_SAMPLE_WINDOW, 10); // 100 fps
        frames(&monitor, FPS_SAMPLE_WINDOW, 50); // 20 fps

        let rate = monitor.metrics().frame_rate;
        assert_eq!(rate.samples, FPS_SAMPLE_WINDOW);
        assert_relative_eq!(rate.average, 20.0, epsilon = 1e-9);
        assert_relative_eq!(rate.current, 20.0, epsilon = 1e-9);
        // Extremes outlive the window
        assert_relative_eq!(rate.min, 20.0, epsilon = 1e-9);
        assert_relative_eq!(rate.max, 100.0, epsilon = 1e-9);
        assert_eq!(monitor.metrics().total_frames, 120);
    }

    #[test]
    fn test_partial_window_average() {
        let monitor = PerformanceMonitor::new();
        monitor.record_frame(Duration::from_millis(10));
        monitor.record_frame(Duration::from_millis(20));
        assert_relative_eq!(monitor.metrics().frame_rate.average, 75.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_duration_counts_frame_only() {
        let monitor = PerformanceMonitor::new();
        monitor.record_frame(Duration::ZERO);
        let metrics = monitor.metrics();
        assert_eq!(metrics.total_frames, 1);
        assert_eq!(metrics.frame_rate.samples, 0);
    }

    #[test]
    fn test_low_frame_rate_warning() {
        let monitor = PerformanceMonitor::new();
        frames(&monitor, 10, 25); // 40 fps
        assert!(monitor.warnings().is_empty());

        frames(&monitor, FPS_SAMPLE_WINDOW, 40); // 25 fps
        assert_eq!(monitor.warnings(), vec![PerformanceWarning::LowFrameRate]);
    }

    #[test]
    fn test_draw_call_warning() {
        let monitor = PerformanceMonitor::new();
        monitor.record_rendering(RenderingCounts {
            draw_calls: DRAW_CALL_LIMIT,
            ..Default::default()
        });
        assert!(monitor.warnings().is_empty());

        monitor.record_rendering(RenderingCounts {
            draw_calls: DRAW_CALL_LIMIT + 1,
            ..Default::default()
        });
        assert_eq!(monitor.warnings(), vec![PerformanceWarning::HighDrawCalls]);
    }

    #[test]
    fn test_texture_swap_warning() {
        let monitor = PerformanceMonitor::new();
        monitor.record_rendering(RenderingCounts {
            texture_swaps: TEXTURE_SWAP_LIMIT,
            ..Default::default()
        });
        assert!(monitor.warnings().is_empty());

        monitor.record_rendering(RenderingCounts {
            texture_swaps: TEXTURE_SWAP_LIMIT + 1,
            ..Default::default()
        });
        let warnings = monitor.warnings();
        assert_eq!(warnings, vec![PerformanceWarning::HighTextureSwaps]);
        assert_eq!(warnings[0].to_string(), "High number of texture swaps");
    }

    #[test]
    fn test_memory_warning_and_peak() {
        let monitor = PerformanceMonitor::new();
        monitor.record_memory(120.0, 256.0);
        monitor.record_memory(80.0, 256.0);

        let memory = monitor.metrics().memory;
        assert_eq!(memory.used_mb, 80.0);
        assert_eq!(memory.peak_mb, 120.0);
        assert!(monitor.warnings().is_empty());

        monitor.record_memory(MEMORY_LIMIT_MB + 0.5, 256.0);
        assert_eq!(monitor.warnings(), vec![PerformanceWarning::HighMemoryUsage]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let monitor = PerformanceMonitor::new();
        frames(&monitor, 5, 40);
        monitor.record_rendering(RenderingCounts {
            draw_calls: 5000,
            texture_swaps: 500,
            vertices_drawn: 20_000,
            batches_drawn: 12,
        });
        monitor.record(GameEvent::SpinPerformed);
        monitor.record(GameEvent::SymbolsUpdated { count: 15 });
        assert_eq!(monitor.warnings().len(), 3);

        monitor.reset();
        let metrics = monitor.metrics();
        assert_eq!(metrics.frame_rate, FrameRateStats::default());
        assert_eq!(metrics.rendering, RenderingCounts::default());
        assert_eq!(metrics.game, GameCounts::default());
        assert_eq!(metrics.total_frames, 0);
        assert!(monitor.warnings().is_empty());
    }

    #[test]
    fn test_game_events_reach_counters() {
        let monitor = PerformanceMonitor::new();
        monitor.record(GameEvent::SpinPerformed);
        monitor.record(GameEvent::SymbolsUpdated { count: 15 });
        monitor.record(GameEvent::WinCalculated);

        let game = monitor.metrics().game;
        assert_eq!(game.spins_performed, 1);
        assert_eq!(game.symbols_updated, 15);
        assert_eq!(game.wins_calculated, 1);
        assert_eq!(monitor.counters().snapshot(), game);
    }
}
