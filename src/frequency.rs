//! Byte frequency analysis.

use crate::error::{CodecError, Result};

/// Occurrence counts for the symbols present in an input.
///
/// Entries keep the order in which each symbol was first seen during the
/// build scan. That order is what goes on the wire and what the tree uses
/// to break weight ties, so encoder and decoder agree on it exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(u8, u32)>,
}

impl FrequencyTable {
    /// Counts every byte of `data` in one pass.
    ///
    /// Counts saturate at `u32::MAX`; callers bound input size beforehand.
    pub fn build(data: &[u8]) -> Self {
        let mut slot: [Option<usize>; 256] = [None; 256];
        let mut entries: Vec<(u8, u32)> = Vec::new();
        for &b in data {
            match slot[b as usize] {
                Some(i) => entries[i].1 = entries[i].1.saturating_add(1),
                None => {
                    slot[b as usize] = Some(entries.len());
                    entries.push((b, 1));
                }
            }
        }
        Self { entries }
    }

    /// Rebuilds a table parsed from a container header.
    pub fn from_entries(entries: Vec<(u8, u32)>) -> Result<Self> {
        let mut seen = [false; 256];
        for &(symbol, count) in &entries {
            if count == 0 {
                return Err(CodecError::corrupt(format!(
                    "symbol {:#04x} has zero frequency",
                    symbol
                )));
            }
            if std::mem::replace(&mut seen[symbol as usize], true) {
                return Err(CodecError::corrupt(format!(
                    "symbol {:#04x} listed twice",
                    symbol
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(u8, u32)] {
        &self.entries
    }

    pub fn get(&self, symbol: u8) -> Option<u32> {
        self.entries
            .iter()
            .find(|&&(s, _)| s == symbol)
            .map(|&(_, count)| count)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts, i.e. the length of the input the table came from.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|&(_, count)| count as u64).sum()
    }
}
