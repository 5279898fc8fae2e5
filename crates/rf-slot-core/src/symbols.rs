//! Symbol identifiers and reel bands

use std::fmt;

use serde::{Deserialize, Serialize};

/// Symbol identifier (e.g., "hv1", "lv4")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(String);

impl SymbolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SymbolId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SymbolId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for SymbolId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SymbolId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// High-value symbols, highest paying first
pub const HIGH_VALUE_SYMBOLS: [&str; 4] = ["hv1", "hv2", "hv3", "hv4"];

/// Low-value symbols, highest paying first
pub const LOW_VALUE_SYMBOLS: [&str; 4] = ["lv1", "lv2", "lv3", "lv4"];

/// The classic eight-symbol alphabet
pub fn classic_symbols() -> Vec<SymbolId> {
    HIGH_VALUE_SYMBOLS
        .iter()
        .chain(LOW_VALUE_SYMBOLS.iter())
        .map(|&s| SymbolId::from(s))
        .collect()
}

/// A reel band: the fixed cyclic symbol sequence of one column
///
/// Only a window of `rows` consecutive entries is visible at a time; the
/// window wraps past the end of the band back to index 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReelBand {
    symbols: Vec<SymbolId>,
}

impl ReelBand {
    pub fn new(symbols: Vec<SymbolId>) -> Self {
        Self { symbols }
    }

    /// Build a band from string literals
    pub fn from_strs(symbols: &[&str]) -> Self {
        Self::new(symbols.iter().map(|&s| SymbolId::from(s)).collect())
    }

    /// Symbol at position (wraps around)
    ///
    /// Returns `None` only for an empty band.
    pub fn symbol_at(&self, position: usize) -> Option<&SymbolId> {
        if self.symbols.is_empty() {
            return None;
        }
        self.symbols.get(position % self.symbols.len())
    }

    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
