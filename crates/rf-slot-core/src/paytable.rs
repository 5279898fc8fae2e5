//! Paytable, paylines and win calculation

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::config::{GameRules, GridSpec, SlotConfig};
use crate::error::{Result, SlotError};
use crate::reels::SymbolGrid;
use crate::symbols::SymbolId;

/// A grid coordinate, serialized as `[row, column]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct Cell {
    pub row: usize,
    pub column: usize,
}

impl Cell {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl From<[usize; 2]> for Cell {
    fn from([row, column]: [usize; 2]) -> Self {
        Self { row, column }
    }
}

impl From<Cell> for [usize; 2] {
    fn from(cell: Cell) -> Self {
        [cell.row, cell.column]
    }
}

/// A payline: one cell per column, left to right
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayLine {
    cells: Vec<Cell>,
}

impl PayLine {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Build from `(row, column)` pairs
    pub fn from_pairs(pairs: &[(usize, usize)]) -> Self {
        Self::new(pairs.iter().map(|&(row, column)| Cell::new(row, column)).collect())
    }

    /// Same row across every column
    pub fn straight(row: usize, columns: usize) -> Self {
        Self::new((0..columns).map(|column| Cell::new(row, column)).collect())
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// The seven lines of the classic 5×3 game
pub fn classic_pay_lines() -> Vec<PayLine> {
    vec![
        // Straight lines
        PayLine::straight(1, 5), // Middle
        PayLine::straight(0, 5), // Top
        PayLine::straight(2, 5), // Bottom
        // Steps
        PayLine::from_pairs(&[(0, 0), (0, 1), (1, 2), (2, 3), (2, 4)]),
        PayLine::from_pairs(&[(2, 0), (2, 1), (1, 2), (0, 3), (0, 4)]),
        // V shapes
        PayLine::from_pairs(&[(0, 0), (1, 1), (2, 2), (1, 3), (0, 4)]),
        PayLine::from_pairs(&[(2, 0), (1, 1), (0, 2), (1, 3), (2, 4)]),
    ]
}

/// Symbol → match count → payout
///
/// A missing count is "no payout defined", distinct from a count defined
/// as `0.0`. Neither produces a win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayTable {
    entries: BTreeMap<SymbolId, BTreeMap<u8, f64>>,
}

impl PayTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classic pays for 3, 4 and 5 of a kind
    pub fn classic() -> Self {
        let mut table = Self::new();
        for (symbol, pays) in [
            ("hv1", [10.0, 20.0, 50.0]),
            ("hv2", [5.0, 10.0, 20.0]),
            ("hv3", [5.0, 10.0, 15.0]),
            ("hv4", [5.0, 10.0, 15.0]),
            ("lv1", [2.0, 5.0, 10.0]),
            ("lv2", [1.0, 2.0, 5.0]),
            ("lv3", [1.0, 2.0, 3.0]),
            ("lv4", [1.0, 2.0, 3.0]),
        ] {
            table = table.with_pays(symbol, &[(3, pays[0]), (4, pays[1]), (5, pays[2])]);
        }
        table
    }

    /// Set the payout for a symbol at an exact match count
    pub fn set_pay(&mut self, symbol: impl Into<SymbolId>, count: u8, payout: f64) {
        self.entries
            .entry(symbol.into())
            .or_default()
            .insert(count, payout);
    }

    /// Builder form of [`set_pay`](Self::set_pay) for several counts
    pub fn with_pays(mut self, symbol: impl Into<SymbolId>, pays: &[(u8, f64)]) -> Self {
        let symbol = symbol.into();
        let counts = self.entries.entry(symbol).or_default();
        for &(count, payout) in pays {
            counts.insert(count, payout);
        }
        self
    }

    /// Payout defined for `symbol` at exactly `count`
    pub fn payout(&self, symbol: &SymbolId, count: u8) -> Option<f64> {
        self.entries.get(symbol)?.get(&count).copied()
    }

    /// Whether the symbol has any entry at all
    pub fn has_symbol(&self, symbol: &SymbolId) -> bool {
        self.entries.contains_key(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &SymbolId> {
        self.entries.keys()
    }

    pub fn pays_for(&self, symbol: &SymbolId) -> Option<&BTreeMap<u8, f64>> {
        self.entries.get(symbol)
    }
}

/// A winning payline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinDetail {
    /// Payline number, 1-based
    pub pay_line: usize,
    pub symbol: SymbolId,
    /// Run length from the leftmost cell
    pub count: u8,
    pub payout: f64,
}

/// Result of evaluating one grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinResult {
    pub total_wins: f64,
    /// Ordered by payline number
    pub win_details: Vec<WinDetail>,
}

impl WinResult {
    pub fn is_win(&self) -> bool {
        !self.win_details.is_empty()
    }
}

/// Walks paylines over a grid and prices left-anchored runs
#[derive(Debug, Clone)]
pub struct PayoutEvaluator {
    pay_table: PayTable,
    pay_lines: Vec<PayLine>,
    grid: GridSpec,
    rules: GameRules,
}

impl PayoutEvaluator {
    /// Evaluator for a validated config
    pub fn new(config: &SlotConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            pay_table: config.pay_table.clone(),
            pay_lines: config.pay_lines.clone(),
            grid: config.grid,
            rules: config.rules,
        })
    }

    pub fn pay_table(&self) -> &PayTable {
        &self.pay_table
    }

    pub fn pay_lines(&self) -> &[PayLine] {
        &self.pay_lines
    }

    /// Evaluate every payline in declaration order
    pub fn calculate_wins(&self, grid: &SymbolGrid) -> Result<WinResult> {
        self.validate_symbols(Some(grid))?;

        let mut result = WinResult::default();
        let mut line_symbols = Vec::with_capacity(self.grid.columns);

        for (index, line) in self.pay_lines.iter().enumerate() {
            line_symbols.clear();
            for cell in line.cells() {
                let symbol = grid.get(cell.row, cell.column).ok_or_else(|| {
                    SlotError::MalformedGrid(format!(
                        "payline {} reaches [{}, {}] outside the grid",
                        index + 1,
                        cell.row,
                        cell.column
                    ))
                })?;
                line_symbols.push(symbol.clone());
            }

            if let Some(win) = self.check_pay_line(&line_symbols, index + 1) {
                result.total_wins += win.payout;
                result.win_details.push(win);
            }
        }

        log::debug!(
            "Evaluated {} paylines: {} wins, total {}",
            self.pay_lines.len(),
            result.win_details.len(),
            result.total_wins
        );

        Ok(result)
    }

    /// Price one projected line
    ///
    /// Counts how many leading symbols equal the first one and stops at the
    /// first mismatch or at `max_match_count`. Only the exact count is
    /// looked up.
    pub fn check_pay_line(&self, line_symbols: &[SymbolId], pay_line: usize) -> Option<WinDetail> {
        let first = line_symbols.first()?;
        let run = line_symbols
            .iter()
            .take_while(|&s| s == first)
            .take(usize::from(self.rules.max_match_count))
            .count();
        let count = u8::try_from(run).ok()?;

        if count < self.rules.min_match_count {
            return None;
        }

        let payout = self.pay_table.payout(first, count)?;
        if payout <= 0.0 {
            return None;
        }

        Some(WinDetail {
            pay_line,
            symbol: first.clone(),
            count,
            payout,
        })
    }

    /// Render a result for the win display
    pub fn format_win_display(&self, total_wins: f64, win_details: &[WinDetail]) -> String {
        format_win_display(total_wins, win_details)
    }

    /// Check the grid has the configured rows × columns shape
    pub fn validate_symbols(&self, grid: Option<&SymbolGrid>) -> Result<()> {
        let grid = grid.ok_or_else(|| SlotError::MalformedGrid("no grid supplied".to_string()))?;

        if grid.row_count() != self.grid.rows {
            return Err(SlotError::MalformedGrid(format!(
                "expected {} rows, got {}",
                self.grid.rows,
                grid.row_count()
            )));
        }

        for (row, symbols) in grid.rows().iter().enumerate() {
            if symbols.len() != self.grid.columns {
                return Err(SlotError::MalformedGrid(format!(
                    "row {} has {} columns, expected {}",
                    row,
                    symbols.len(),
                    self.grid.columns
                )));
            }
        }

        Ok(())
    }
}

/// `Total wins: N` followed by one `- payline n, SYMBOL xCOUNT, PAYOUT` line per win
pub fn format_win_display(total_wins: f64, win_details: &[WinDetail]) -> String {
    let mut out = format!("Total wins: {total_wins}");

    if !win_details.is_empty() {
        out.push('\n');
        for win in win_details {
            let _ = writeln!(
                out,
                "- payline {}, {} x{}, {}",
                win.pay_line, win.symbol, win.count, win.payout
            );
        }
    }

    out
}
