//! Slot configuration
//!
//! Reel bands, pay table, paylines and grid dimensions travel together as a
//! [`SlotConfig`] value. Each component receives its own copy at
//! construction; nothing reads a shared global.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paytable::{Cell, PayLine, PayTable};
use crate::symbols::ReelBand;

/// Grid specification (columns × rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of reels
    pub columns: usize,
    /// Number of visible rows per reel
    pub rows: usize,
}

impl GridSpec {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }

    /// Standard 5×3
    pub fn standard_5x3() -> Self {
        Self::new(5, 3)
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.columns * self.rows
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.column < self.columns
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_5x3()
    }
}

/// Evaluation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    /// Shortest run that can pay
    pub min_match_count: u8,
    /// Longest run a payline counts; longer runs are evaluated at this length
    pub max_match_count: u8,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            min_match_count: 3,
            max_match_count: 5,
        }
    }
}

/// Asset paths to load at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub symbol_paths: Vec<String>,
}

impl AssetManifest {
    /// Symbol textures plus the spin button
    pub fn classic() -> Self {
        let mut symbol_paths: Vec<String> = crate::symbols::classic_symbols()
            .iter()
            .map(|s| format!("/assets/{s}_symbol.png"))
            .collect();
        symbol_paths.push("/assets/spin_button.png".to_string());
        Self { symbol_paths }
    }
}

/// Complete slot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotConfig {
    pub grid: GridSpec,
    /// One band per column
    pub bands: Vec<ReelBand>,
    /// Offsets restored by `reset()`
    pub initial_positions: Vec<usize>,
    pub pay_table: PayTable,
    /// Evaluated in declaration order; reported 1-based
    pub pay_lines: Vec<PayLine>,
    #[serde(default)]
    pub rules: GameRules,
    #[serde(default)]
    pub assets: AssetManifest,
}

impl SlotConfig {
    /// The classic 5×3 game: twenty-stop bands, eight symbols, seven lines
    pub fn classic() -> Self {
        let bands = [
            [
                "hv2", "lv3", "lv3", "hv1", "hv1", "lv1", "hv1", "hv4", "lv1", "hv3", "hv2",
                "hv3", "lv4", "hv4", "lv1", "hv2", "lv4", "lv1", "lv3", "hv2",
            ],
            [
                "hv1", "lv2", "lv3", "lv2", "lv1", "lv1", "lv4", "lv1", "lv1", "hv4", "lv3",
                "hv2", "lv1", "lv3", "hv1", "lv1", "lv2", "lv4", "lv3", "lv2",
            ],
            [
                "lv1", "hv2", "lv3", "lv4", "hv3", "hv2", "lv2", "hv2", "hv2", "lv1", "hv3",
                "lv1", "hv1", "lv2", "hv3", "hv2", "hv4", "hv1", "lv2", "lv4",
            ],
            [
                "hv2", "lv2", "hv3", "lv2", "lv4", "lv4", "hv3", "lv2", "lv4", "hv1", "lv1",
                "hv1", "lv2", "hv3", "lv2", "lv3", "hv2", "lv1", "hv3", "lv2",
            ],
            [
                "lv3", "lv4", "hv2", "hv3", "hv4", "hv1", "hv3", "hv2", "hv2", "hv4", "hv4",
                "hv2", "lv2", "hv4", "hv1", "lv2", "hv1", "lv2", "hv4", "lv4",
            ],
        ]
        .iter()
        .map(|band| ReelBand::from_strs(band))
        .collect();

        Self {
            grid: GridSpec::standard_5x3(),
            bands,
            initial_positions: vec![0; 5],
            pay_table: PayTable::classic(),
            pay_lines: crate::paytable::classic_pay_lines(),
            rules: GameRules::default(),
            assets: AssetManifest::classic(),
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check structural consistency between grid, bands and paylines
    pub fn validate(&self) -> Result<(), ConfigError> {
        let columns = self.grid.columns;

        if columns == 0 || self.grid.rows == 0 {
            return Err(ConfigError::Validation(format!(
                "Grid must be at least 1×1, got {}×{}",
                columns, self.grid.rows
            )));
        }

        if self.bands.len() != columns {
            return Err(ConfigError::Validation(format!(
                "Expected {} reel bands, got {}",
                columns,
                self.bands.len()
            )));
        }

        if let Some(column) = self.bands.iter().position(ReelBand::is_empty) {
            return Err(ConfigError::Validation(format!(
                "Reel band {column} is empty"
            )));
        }

        if self.initial_positions.len() != columns {
            return Err(ConfigError::Validation(format!(
                "Expected {} initial positions, got {}",
                columns,
                self.initial_positions.len()
            )));
        }

        for (column, (&position, band)) in
            self.initial_positions.iter().zip(&self.bands).enumerate()
        {
            if position >= band.len() {
                return Err(ConfigError::Validation(format!(
                    "Initial position {position} out of range for column {column} (band length {})",
                    band.len()
                )));
            }
        }

        for (index, line) in self.pay_lines.iter().enumerate() {
            if line.len() != columns {
                return Err(ConfigError::Validation(format!(
                    "Payline {} has {} cells, expected {}",
                    index + 1,
                    line.len(),
                    columns
                )));
            }
            if let Some(cell) = line.cells().iter().find(|&&c| !self.grid.contains(c)) {
                return Err(ConfigError::Validation(format!(
                    "Payline {} cell [{}, {}] lies outside the {}×{} grid",
                    index + 1,
                    cell.row,
                    cell.column,
                    columns,
                    self.grid.rows
                )));
            }
        }

        if self.rules.min_match_count == 0 {
            return Err(ConfigError::Validation(
                "min_match_count must be at least 1".to_string(),
            ));
        }

        if self.rules.max_match_count < self.rules.min_match_count {
            return Err(ConfigError::Validation(format!(
                "max_match_count {} below min_match_count {}",
                self.rules.max_match_count, self.rules.min_match_count
            )));
        }

        Ok(())
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self::classic()
    }
}
