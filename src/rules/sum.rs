use tracing::{debug, warn};

use super::table::{RuleTable, STATE_COUNT};
use super::{BlendRule, Neighborhood, StepRule};
use crate::config::{BoundaryMode, DEFAULT_RULE};
use crate::error::DecodeError;
use crate::rng::Rng;

const TOP_STATE: u8 = STATE_COUNT - 1;

/// Multi-state summation automaton.
///
/// The next state is `table[sum]` where `sum` is the literal sum of the
/// contributing block values. Missing neighbors are not compensated for:
/// the table is indexed by the raw sum, not an average.
#[derive(Clone, Debug, PartialEq)]
pub struct SumRule {
    number: String,
    table: RuleTable,
}

impl SumRule {
    pub fn new(text: &str) -> Result<Self, DecodeError> {
        let table = RuleTable::decode(text)?;
        Ok(Self {
            number: text.trim().to_string(),
            table,
        })
    }

    /// Replace the rule. On error the previous number and table stay active.
    pub fn set_rule(&mut self, text: &str) -> Result<(), DecodeError> {
        match RuleTable::decode(text) {
            Ok(table) => {
                self.table = table;
                self.number = text.trim().to_string();
                debug!(rule = %self.number, "rule applied");
                Ok(())
            }
            Err(err) => {
                warn!(%err, kept = %self.number, "keeping previous rule");
                Err(err)
            }
        }
    }

    /// Rule text as last accepted.
    pub fn rule_number(&self) -> &str {
        &self.number
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }
}

impl Default for SumRule {
    fn default() -> Self {
        Self {
            number: DEFAULT_RULE.to_string(),
            table: RuleTable::decode(DEFAULT_RULE).unwrap_or_default(),
        }
    }
}

impl StepRule for SumRule {
    type Cell = u8;

    const SERIES: &'static [&'static str] = &["mean", "active", "entropy"];

    fn supports_boundary(&self, _mode: BoundaryMode) -> bool {
        true
    }

    fn supports_mask(&self) -> bool {
        true
    }

    fn next(&self, hood: &Neighborhood<u8>) -> u8 {
        let sum: usize = hood.values().map(usize::from).sum();
        self.table.lookup(sum)
    }

    fn seed(&self, rng: &mut Rng) -> u8 {
        rng.range_usize(STATE_COUNT as usize) as u8
    }

    fn normalize(&self, cell: u8) -> u8 {
        cell.min(TOP_STATE)
    }

    fn is_active(&self, cell: u8) -> bool {
        cell > 0
    }

    /// Normalized mean state, active fraction and normalized Shannon entropy.
    fn summarize(&self, cells: &[u8]) -> Vec<f64> {
        if cells.is_empty() {
            return vec![0.0; 3];
        }
        let mut counts = [0usize; STATE_COUNT as usize];
        let mut sum = 0usize;
        for &v in cells {
            let v = v.min(TOP_STATE);
            counts[v as usize] += 1;
            sum += v as usize;
        }
        let total = cells.len() as f64;
        let active = (total - counts[0] as f64) / total;

        let entropy: f64 = counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / total;
                -p * p.ln()
            })
            .sum();
        let max_entropy = (STATE_COUNT as f64).ln();

        vec![
            sum as f64 / (total * TOP_STATE as f64),
            active,
            if max_entropy > 0.0 { entropy / max_entropy } else { 0.0 },
        ]
    }
}

impl BlendRule for SumRule {
    /// Convex blend toward a random state, floored to an integer state.
    fn blend(&self, current: u8, weight: f32, rng: &mut Rng) -> u8 {
        let w = weight.clamp(0.0, 1.0);
        let target = rng.range_usize(STATE_COUNT as usize) as f32;
        let blended = current as f32 * (1.0 - w) + target * w;
        blended.clamp(0.0, TOP_STATE as f32).floor() as u8
    }
}
