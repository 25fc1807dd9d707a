//! Authorization matrix: maps a monetary value to a base RAISE level.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{RaiseError, RaiseLevel, Result};
use crate::metrics::METRICS;
use crate::obs::emit_matrix_fallback;

/// Anything able to map a value to a base level.
///
/// The settings layer owns the actual table; the calculator only needs this
/// lookup.
pub trait LevelLookup {
    fn level_for_value(&self, value: Decimal) -> RaiseLevel;
}

impl<F> LevelLookup for F
where
    F: Fn(Decimal) -> RaiseLevel,
{
    fn level_for_value(&self, value: Decimal) -> RaiseLevel {
        self(value)
    }
}

/// A single matrix row: values at or above `threshold` (and below the next
/// higher threshold) receive `level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixEntry {
    pub threshold: Decimal,
    pub level: RaiseLevel,
}

impl MatrixEntry {
    pub fn new(threshold: impl Into<Decimal>, level: RaiseLevel) -> Self {
        Self {
            threshold: threshold.into(),
            level,
        }
    }
}

/// Ordered table of thresholds, highest bound first.
///
/// Evaluated first-match-wins: the first entry whose threshold is `<=` the
/// value decides the level. The zero-bound entry is the catch-all.
/// Serialized as a plain list; loading re-sorts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<MatrixEntry>", into = "Vec<MatrixEntry>")]
pub struct AuthorizationMatrix {
    entries: Vec<MatrixEntry>,
}

impl AuthorizationMatrix {
    /// Build and validate a matrix. Entries may be given in any order.
    ///
    /// # Errors
    ///
    /// Returns `RaiseError::InvalidMatrix` if the table is empty, has a
    /// negative or duplicate bound, or lacks a zero-bound catch-all.
    pub fn new(entries: Vec<MatrixEntry>) -> Result<Self> {
        let matrix = Self::from_entries_unchecked(entries);
        matrix.validate()?;
        Ok(matrix)
    }

    /// Build a matrix without validation. Lookups still never panic; values
    /// nothing matches fall back to [`RaiseLevel::MOST_SEVERE`].
    pub fn from_entries_unchecked(mut entries: Vec<MatrixEntry>) -> Self {
        entries.sort_by(|a, b| b.threshold.cmp(&a.threshold));
        Self { entries }
    }

    /// Reference table.
    ///
    /// | Lower bound  | Level |
    /// |--------------|-------|
    /// | 50 000 000   | L1    |
    /// | 20 000 000   | L2    |
    /// |  5 000 000   | L3    |
    /// |  1 000 000   | L4    |
    /// |    250 000   | L5    |
    /// |          0   | L6    |
    pub fn standard() -> Self {
        Self::from_entries_unchecked(vec![
            MatrixEntry::new(50_000_000, RaiseLevel::L1),
            MatrixEntry::new(20_000_000, RaiseLevel::L2),
            MatrixEntry::new(5_000_000, RaiseLevel::L3),
            MatrixEntry::new(1_000_000, RaiseLevel::L4),
            MatrixEntry::new(250_000, RaiseLevel::L5),
            MatrixEntry::new(0, RaiseLevel::L6),
        ])
    }

    /// Entries, highest bound first.
    pub fn entries(&self) -> &[MatrixEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the table invariants.
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(RaiseError::InvalidMatrix("matrix has no entries".into()));
        }
        if let Some(neg) = self.entries.iter().find(|e| e.threshold.is_sign_negative()) {
            return Err(RaiseError::InvalidMatrix(format!(
                "negative threshold {} for {}",
                neg.threshold, neg.level
            )));
        }
        for pair in self.entries.windows(2) {
            if pair[0].threshold == pair[1].threshold {
                return Err(RaiseError::InvalidMatrix(format!(
                    "duplicate threshold {} ({} and {})",
                    pair[0].threshold, pair[0].level, pair[1].level
                )));
            }
        }
        if self.entries.last().map(|e| e.threshold) != Some(Decimal::ZERO) {
            return Err(RaiseError::InvalidMatrix(
                "no catch-all entry with threshold 0".into(),
            ));
        }
        Ok(())
    }

    /// The matching entry for `value`, if any.
    pub fn entry_for_value(&self, value: Decimal) -> Option<&MatrixEntry> {
        self.entries.iter().find(|e| e.threshold <= value)
    }
}

impl From<Vec<MatrixEntry>> for AuthorizationMatrix {
    fn from(entries: Vec<MatrixEntry>) -> Self {
        Self::from_entries_unchecked(entries)
    }
}

impl From<AuthorizationMatrix> for Vec<MatrixEntry> {
    fn from(matrix: AuthorizationMatrix) -> Self {
        matrix.entries
    }
}

impl Default for AuthorizationMatrix {
    fn default() -> Self {
        Self::standard()
    }
}

impl LevelLookup for AuthorizationMatrix {
    /// Level of the first entry whose bound is `<= value`.
    ///
    /// When nothing matches (empty table, negative value, missing zero
    /// bound) the lookup falls back to [`RaiseLevel::MOST_SEVERE`].
    fn level_for_value(&self, value: Decimal) -> RaiseLevel {
        match self.entry_for_value(value) {
            Some(entry) => entry.level,
            None => {
                METRICS.inc_matrix_fallbacks();
                emit_matrix_fallback(value, self.entries.len());
                RaiseLevel::MOST_SEVERE
            }
        }
    }
}
