pub mod life;
pub mod species;
pub mod sum;
pub mod table;

pub use life::Life;
pub use species::{Species, ThreeSpecies};
pub use sum::SumRule;
pub use table::{MAX_SUM, RuleTable, STATE_COUNT};

use crate::config::BoundaryMode;
use crate::rng::Rng;

/// The 3x3 Moore block around one cell, after boundary and mask handling.
///
/// `contributions` is row-major from offset (-1,-1) to (1,1); slot 4 is the
/// cell itself. `None` marks a neighbor that contributes nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighborhood<C> {
    pub center: C,
    pub contributions: [Option<C>; 9],
}

impl<C: Copy> Neighborhood<C> {
    pub const CENTER: usize = 4;

    /// Number of contributing slots, center included.
    pub fn included(&self) -> usize {
        self.contributions.iter().filter(|c| c.is_some()).count()
    }

    /// Contributing values over the whole block.
    pub fn values(&self) -> impl Iterator<Item = C> + '_ {
        self.contributions.iter().filter_map(|c| *c)
    }

    /// Contributing values of the eight surrounding cells.
    pub fn around(&self) -> impl Iterator<Item = C> + '_ {
        self.contributions
            .iter()
            .enumerate()
            .filter(|(k, _)| *k != Self::CENTER)
            .filter_map(|(_, c)| *c)
    }
}

/// Per-variant local rule plugged into the generic engine.
///
/// `Cell::default()` is the variant's empty value, written into
/// mask-excluded cells.
pub trait StepRule: Send + Sync {
    type Cell: Copy + Default + PartialEq + Send + Sync + std::fmt::Debug;

    /// Names of the scalar series recorded per generation. Empty means the
    /// variant keeps no history.
    const SERIES: &'static [&'static str];

    fn supports_boundary(&self, mode: BoundaryMode) -> bool;

    fn supports_mask(&self) -> bool;

    /// Next value of the center cell.
    fn next(&self, hood: &Neighborhood<Self::Cell>) -> Self::Cell;

    /// Fresh random value for reseeding.
    fn seed(&self, rng: &mut Rng) -> Self::Cell;

    /// Saturate an externally supplied value into the valid range.
    fn normalize(&self, cell: Self::Cell) -> Self::Cell {
        cell
    }

    fn is_active(&self, cell: Self::Cell) -> bool;

    /// One value per entry of [`StepRule::SERIES`].
    fn summarize(&self, cells: &[Self::Cell]) -> Vec<f64>;
}

/// Rules that support radius perturbation.
pub trait BlendRule: StepRule {
    /// Move `current` toward a random value; `weight` is in (0, 1].
    fn blend(&self, current: Self::Cell, weight: f32, rng: &mut Rng) -> Self::Cell;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn around_skips_center_and_missing() {
        let mut contributions = [Some(1u8); 9];
        contributions[0] = None;
        contributions[Neighborhood::<u8>::CENTER] = Some(9);
        let hood = Neighborhood { center: 9, contributions };
        assert_eq!(hood.included(), 8);
        assert_eq!(hood.around().count(), 7);
        assert_eq!(hood.values().map(u32::from).sum::<u32>(), 16);
    }
}
