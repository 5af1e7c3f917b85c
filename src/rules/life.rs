use super::{Neighborhood, StepRule};
use crate::config::BoundaryMode;
use crate::rng::Rng;

/// Conway's Game of Life, B3/S23, on a torus.
#[derive(Clone, Debug, PartialEq)]
pub struct Life {
    /// Probability that a cell starts alive when reseeding.
    pub density: f64,
}

impl Default for Life {
    fn default() -> Self {
        Self { density: 0.18 }
    }
}

impl Life {
    pub fn new(density: f64) -> Self {
        Self {
            density: density.clamp(0.0, 1.0),
        }
    }

    pub fn set_density(&mut self, density: f64) {
        self.density = density.clamp(0.0, 1.0);
    }

    /// Birth on exactly 3 live neighbors, survival on 2 or 3.
    #[inline]
    pub fn rule(alive: bool, neighbors: usize) -> bool {
        matches!((alive, neighbors), (true, 2) | (_, 3))
    }
}

impl StepRule for Life {
    type Cell = u8;

    const SERIES: &'static [&'static str] = &[];

    fn supports_boundary(&self, mode: BoundaryMode) -> bool {
        mode == BoundaryMode::Wrap
    }

    fn supports_mask(&self) -> bool {
        false
    }

    fn next(&self, hood: &Neighborhood<u8>) -> u8 {
        let neighbors = hood.around().filter(|&v| v != 0).count();
        Self::rule(hood.center != 0, neighbors) as u8
    }

    fn seed(&self, rng: &mut Rng) -> u8 {
        rng.chance(self.density) as u8
    }

    fn normalize(&self, cell: u8) -> u8 {
        cell.min(1)
    }

    fn is_active(&self, cell: u8) -> bool {
        cell != 0
    }

    fn summarize(&self, _cells: &[u8]) -> Vec<f64> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_512_blocks_follow_b3_s23() {
        let rule = Life::default();
        for bits in 0u32..512 {
            let mut contributions = [None; 9];
            for (k, slot) in contributions.iter_mut().enumerate() {
                *slot = Some(((bits >> k) & 1) as u8);
            }
            let center = ((bits >> 4) & 1) as u8;
            let hood = Neighborhood { center, contributions };
            let count = (bits & !(1 << 4)).count_ones();
            let expected = match (center == 1, count) {
                (true, 2) | (true, 3) => 1,
                (true, _) => 0,
                (false, 3) => 1,
                (false, _) => 0,
            };
            assert_eq!(rule.next(&hood), expected, "block {bits:09b}");
        }
    }

    #[test]
    fn only_wrap_is_supported() {
        let rule = Life::default();
        assert!(rule.supports_boundary(BoundaryMode::Wrap));
        assert!(!rule.supports_boundary(BoundaryMode::Open));
        assert!(!rule.supports_boundary(BoundaryMode::Fill));
        assert!(!rule.supports_mask());
    }

    #[test]
    fn density_is_clamped() {
        assert_eq!(Life::new(2.0).density, 1.0);
        assert_eq!(Life::new(-1.0).density, 0.0);
    }
}
