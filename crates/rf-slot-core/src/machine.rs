//! Slot machine — spin, project, evaluate, report

use std::sync::Arc;

use rand::RngCore;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::SlotConfig;
use crate::error::Result;
use crate::events::{EventSink, GameEvent};
use crate::paytable::{PayoutEvaluator, WinResult};
use crate::reels::{ReelEngine, SymbolGrid};

/// Everything the presentation layer needs after one spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub spin_id: String,
    /// Reel offsets the spin landed on
    pub positions: Vec<usize>,
    pub grid: SymbolGrid,
    pub wins: WinResult,
    /// Formatted win display text
    pub display: String,
}

impl SpinOutcome {
    pub fn total_wins(&self) -> f64 {
        self.wins.total_wins
    }
}

/// Reel engine and evaluator wired to an event sink
pub struct SlotMachine<R: RngCore = ChaCha8Rng> {
    reels: ReelEngine<R>,
    evaluator: PayoutEvaluator,
    events: Arc<dyn EventSink>,
    spin_count: u64,
}

impl SlotMachine<ChaCha8Rng> {
    pub fn new(config: &SlotConfig, events: Arc<dyn EventSink>) -> Result<Self> {
        Self::from_parts(ReelEngine::new(config)?, config, events)
    }

    /// Reproducible spin sequence
    pub fn seeded(config: &SlotConfig, seed: u64, events: Arc<dyn EventSink>) -> Result<Self> {
        Self::from_parts(ReelEngine::seeded(config, seed)?, config, events)
    }
}

impl<R: RngCore> SlotMachine<R> {
    /// Build around an existing reel engine
    pub fn from_parts(
        reels: ReelEngine<R>,
        config: &SlotConfig,
        events: Arc<dyn EventSink>,
    ) -> Result<Self> {
        Ok(Self {
            reels,
            evaluator: PayoutEvaluator::new(config)?,
            events,
            spin_count: 0,
        })
    }

    pub fn reels(&self) -> &ReelEngine<R> {
        &self.reels
    }

    pub fn reels_mut(&mut self) -> &mut ReelEngine<R> {
        &mut self.reels
    }

    pub fn evaluator(&self) -> &PayoutEvaluator {
        &self.evaluator
    }

    pub fn spin_count(&self) -> u64 {
        self.spin_count
    }

    pub fn visible_symbols(&self) -> SymbolGrid {
        self.reels.visible_symbols()
    }

    /// Spin the reels and evaluate the landed grid
    pub fn spin(&mut self) -> Result<SpinOutcome> {
        self.events.record(GameEvent::SpinPerformed);
        self.reels.spin();
        self.spin_count += 1;
        self.evaluate_current(format!("spin-{:06}", self.spin_count))
    }

    /// Evaluate the reels where they currently stand
    ///
    /// Used after `set_reel_position`/`restore` to replay a known stop.
    pub fn evaluate_current(&mut self, spin_id: String) -> Result<SpinOutcome> {
        let grid = self.reels.visible_symbols();
        self.events.record(GameEvent::SymbolsUpdated {
            count: grid.rows().iter().map(Vec::len).sum(),
        });

        let wins = self.evaluator.calculate_wins(&grid)?;
        self.events.record(GameEvent::WinCalculated);

        let display = self
            .evaluator
            .format_win_display(wins.total_wins, &wins.win_details);

        log::debug!("{spin_id}: total wins {}", wins.total_wins);

        Ok(SpinOutcome {
            spin_id,
            positions: self.reels.all_reel_positions(),
            grid,
            wins,
            display,
        })
    }
}
