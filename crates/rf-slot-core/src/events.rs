//! Game event notifications for observability
//!
//! Fire-and-forget: the core reports what happened and keeps nothing.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Discrete gameplay events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    SpinPerformed,
    /// Number of grid cells rebound to new symbols
    SymbolsUpdated { count: usize },
    WinCalculated,
}

/// Receiver for [`GameEvent`]s
pub trait EventSink: Send + Sync {
    fn record(&self, event: GameEvent);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: GameEvent) {}
}

/// Running totals of gameplay events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCounts {
    pub spins_performed: u64,
    pub symbols_updated: u64,
    pub wins_calculated: u64,
}

/// Sink that counts events
#[derive(Debug, Default)]
pub struct GameCounters {
    counts: Mutex<GameCounts>,
}

impl GameCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> GameCounts {
        *self.counts.lock()
    }

    pub fn reset(&self) {
        *self.counts.lock() = GameCounts::default();
    }
}

impl EventSink for GameCounters {
    fn record(&self, event: GameEvent) {
        let mut counts = self.counts.lock();
        match event {
            GameEvent::SpinPerformed => counts.spins_performed += 1,
            GameEvent::SymbolsUpdated { count } => counts.symbols_updated += count as u64,
            GameEvent::WinCalculated => counts.wins_calculated += 1,
        }
    }
}
