//! Reel engine — circular reel offsets and the visible symbol window

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{GridSpec, SlotConfig};
use crate::error::{Result, SlotError};
use crate::symbols::{ReelBand, SymbolId};

/// One offset per column; the band index of the topmost visible row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReelState {
    offsets: Vec<usize>,
}

impl ReelState {
    pub fn new(offsets: Vec<usize>) -> Self {
        Self { offsets }
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Visible symbols, `rows × columns`, indexed `[row][column]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolGrid {
    rows: Vec<Vec<SymbolId>>,
}

impl SymbolGrid {
    pub fn from_rows(rows: Vec<Vec<SymbolId>>) -> Self {
        Self { rows }
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&SymbolId> {
        self.rows.get(row)?.get(column)
    }

    pub fn rows(&self) -> &[Vec<SymbolId>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Columns in the first row (0 for an empty grid)
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Symbols down one column, top to bottom
    pub fn column(&self, column: usize) -> Vec<&SymbolId> {
        self.rows.iter().filter_map(|r| r.get(column)).collect()
    }
}

/// Owns the reel bands and their current offsets
///
/// The random source is a type parameter so tests can inject a seeded
/// generator; [`ReelEngine::new`] seeds from the OS.
#[derive(Debug, Clone)]
pub struct ReelEngine<R: RngCore = ChaCha8Rng> {
    bands: Vec<ReelBand>,
    state: ReelState,
    initial: ReelState,
    grid: GridSpec,
    rng: R,
}

impl ReelEngine<ChaCha8Rng> {
    /// Engine with an OS-seeded generator
    pub fn new(config: &SlotConfig) -> Result<Self> {
        Self::with_rng(config, ChaCha8Rng::from_os_rng())
    }

    /// Engine with a reproducible generator
    pub fn seeded(config: &SlotConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Reseed in place
    pub fn seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }
}

impl<R: RngCore> ReelEngine<R> {
    /// Engine drawing offsets from `rng`
    pub fn with_rng(config: &SlotConfig, rng: R) -> Result<Self> {
        config.validate()?;

        let initial = ReelState::new(config.initial_positions.clone());
        Ok(Self {
            bands: config.bands.clone(),
            state: initial.clone(),
            initial,
            grid: config.grid,
            rng,
        })
    }

    pub fn grid_spec(&self) -> GridSpec {
        self.grid
    }

    pub fn columns(&self) -> usize {
        self.grid.columns
    }

    pub fn rows(&self) -> usize {
        self.grid.rows
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN
    // ═══════════════════════════════════════════════════════════════════════════

    /// Draw a fresh uniform offset for every column
    pub fn spin(&mut self) -> &ReelState {
        for (offset, band) in self.state.offsets.iter_mut().zip(&self.bands) {
            *offset = self.rng.random_range(0..band.len());
        }
        log::debug!("Spin landed on {:?}", self.state.offsets);
        &self.state
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PROJECTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Visible window: `grid[row][col] = band[col][(offset[col] + row) % len]`
    pub fn visible_symbols(&self) -> SymbolGrid {
        let rows = (0..self.grid.rows)
            .map(|row| {
                (0..self.grid.columns)
                    .filter_map(|column| self.project(column, row))
                    .cloned()
                    .collect()
            })
            .collect();
        SymbolGrid::from_rows(rows)
    }

    /// Symbol at a visible cell
    pub fn symbol_at(&self, column: usize, row: usize) -> Result<&SymbolId> {
        if column >= self.grid.columns || row >= self.grid.rows {
            return Err(SlotError::OutOfRange(format!(
                "position column {column}, row {row} (grid {}×{})",
                self.grid.columns, self.grid.rows
            )));
        }
        self.project(column, row).ok_or_else(|| SlotError::InvalidState {
            column,
            detail: "reel band is empty".to_string(),
        })
    }

    fn project(&self, column: usize, row: usize) -> Option<&SymbolId> {
        let offset = *self.state.offsets.get(column)?;
        self.bands.get(column)?.symbol_at(offset + row)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // POSITIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Place a reel at an exact band index (replay and tests)
    pub fn set_reel_position(&mut self, column: usize, position: usize) -> Result<()> {
        let band_len = self.reel_band_length(column)?;
        if position >= band_len {
            return Err(SlotError::OutOfRange(format!(
                "position {position} for column {column} (band length {band_len})"
            )));
        }
        self.state.offsets[column] = position;
        Ok(())
    }

    pub fn reel_position(&self, column: usize) -> Result<usize> {
        self.state
            .offsets
            .get(column)
            .copied()
            .ok_or_else(|| SlotError::invalid_column(column, self.grid.columns))
    }

    pub fn all_reel_positions(&self) -> Vec<usize> {
        self.state.offsets.clone()
    }

    pub fn state(&self) -> &ReelState {
        &self.state
    }

    /// Replace the whole state; rejected states leave the engine unchanged
    pub fn restore(&mut self, state: ReelState) -> Result<()> {
        self.validate_state(&state)?;
        self.state = state;
        Ok(())
    }

    /// Back to the configured initial positions
    pub fn reset(&mut self) {
        self.state = self.initial.clone();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BANDS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn reel_band(&self, column: usize) -> Result<&ReelBand> {
        self.bands
            .get(column)
            .ok_or_else(|| SlotError::invalid_column(column, self.grid.columns))
    }

    pub fn reel_bands(&self) -> &[ReelBand] {
        &self.bands
    }

    pub fn reel_band_length(&self, column: usize) -> Result<usize> {
        self.reel_band(column).map(ReelBand::len)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Re-check that every current offset indexes its band
    pub fn validate_reel_state(&self) -> Result<()> {
        self.validate_state(&self.state)
    }

    /// Check an arbitrary state against this engine's bands
    pub fn validate_state(&self, state: &ReelState) -> Result<()> {
        if state.len() != self.grid.columns {
            return Err(SlotError::InvalidState {
                column: state.len().min(self.grid.columns),
                detail: format!(
                    "{} offsets for {} columns",
                    state.len(),
                    self.grid.columns
                ),
            });
        }

        for (column, (&offset, band)) in state.offsets.iter().zip(&self.bands).enumerate() {
            if offset >= band.len() {
                return Err(SlotError::InvalidState {
                    column,
                    detail: format!("offset {offset} (band length {})", band.len()),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paytable::{PayLine, PayTable};

    fn two_stop_config() -> SlotConfig {
        SlotConfig {
            grid: GridSpec::new(5, 1),
            bands: vec![ReelBand::from_strs(&["A", "B"]); 5],
            initial_positions: vec![0; 5],
            pay_table: PayTable::new().with_pays("A", &[(5, 50.0)]),
            pay_lines: vec![PayLine::straight(0, 5)],
            rules: Default::default(),
            assets: Default::default(),
        }
    }

    #[test]
    fn test_initial_window() {
        let engine = ReelEngine::seeded(&SlotConfig::classic(), 1).unwrap();
        let grid = engine.visible_symbols();
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.column_count(), 5);
        // Column 0 band starts hv2, lv3, lv3
        assert_eq!(grid.column(0), vec!["hv2", "lv3", "lv3"]);
    }

    #[test]
    fn test_window_wraps_band_end() {
        let mut engine = ReelEngine::seeded(&SlotConfig::classic(), 1).unwrap();
        engine.set_reel_position(0, 19).unwrap();
        // Last stop then wraps to the first two
        assert_eq!(engine.symbol_at(0, 0).unwrap(), "hv2");
        assert_eq!(engine.symbol_at(0, 1).unwrap(), "hv2");
        assert_eq!(engine.symbol_at(0, 2).unwrap(), "lv3");
    }

    #[test]
    fn test_symbol_at_bounds() {
        let engine = ReelEngine::seeded(&SlotConfig::classic(), 1).unwrap();
        assert!(matches!(engine.symbol_at(5, 0), Err(SlotError::OutOfRange(_))));
        assert!(matches!(engine.symbol_at(0, 3), Err(SlotError::OutOfRange(_))));
    }

    #[test]
    fn test_set_position_bounds() {
        let mut engine = ReelEngine::seeded(&SlotConfig::classic(), 1).unwrap();
        assert!(engine.set_reel_position(5, 0).is_err());
        assert!(engine.set_reel_position(0, 20).is_err());
        engine.set_reel_position(4, 7).unwrap();
        assert_eq!(engine.reel_position(4).unwrap(), 7);
        assert!(engine.reel_position(5).is_err());
    }

    #[test]
    fn test_spin_is_reproducible() {
        let config = SlotConfig::classic();
        let mut a = ReelEngine::seeded(&config, 42).unwrap();
        let mut b = ReelEngine::seeded(&config, 42).unwrap();
        for _ in 0..10 {
            assert_eq!(a.spin(), b.spin());
        }
    }

    #[test]
    fn test_reset_restores_initial_positions() {
        let mut config = SlotConfig::classic();
        config.initial_positions = vec![1, 2, 3, 4, 5];
        let mut engine = ReelEngine::seeded(&config, 9).unwrap();
        engine.spin();
        engine.set_reel_position(0, 11).unwrap();
        engine.reset();
        assert_eq!(engine.all_reel_positions(), vec![1, 2, 3, 4, 5]);
        engine.reset();
        assert_eq!(engine.all_reel_positions(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_restore_rejects_invalid_state() {
        let mut engine = ReelEngine::seeded(&SlotConfig::classic(), 3).unwrap();
        engine.set_reel_position(1, 4).unwrap();

        let err = engine.restore(ReelState::new(vec![0, 0, 25, 0, 0])).unwrap_err();
        assert!(matches!(err, SlotError::InvalidState { column: 2, .. }));
        assert!(engine.restore(ReelState::new(vec![0, 0])).is_err());
        assert_eq!(engine.all_reel_positions(), vec![0, 4, 0, 0, 0]);

        engine.restore(ReelState::new(vec![19, 18, 17, 16, 15])).unwrap();
        assert!(engine.validate_reel_state().is_ok());
    }

    #[test]
    fn test_band_accessors() {
        let engine = ReelEngine::seeded(&two_stop_config(), 0).unwrap();
        assert_eq!(engine.reel_bands().len(), 5);
        assert_eq!(engine.reel_band_length(2).unwrap(), 2);
        assert_eq!(engine.reel_band(0).unwrap().symbols()[1], "B");
        assert!(engine.reel_band(5).is_err());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = two_stop_config();
        config.initial_positions = vec![0; 4];
        assert!(matches!(
            ReelEngine::seeded(&config, 0),
            Err(SlotError::Config(_))
        ));
    }
}
