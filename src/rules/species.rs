//! Three-species cyclic reaction field.
//!
//! Each cell carries concentrations `[a, b, c]`. A step averages every field
//! over the Moore block and applies the local reaction
//!
//! ```text
//! a' = clamp01(a + a(αb − γc))
//! b' = clamp01(b + b(βc − αa))
//! c' = clamp01(c + c(γa − βb))
//! ```
//!
//! Coefficients are unconstrained; the clamp absorbs divergence.

use super::{BlendRule, Neighborhood, StepRule};
use crate::config::BoundaryMode;
use crate::rng::Rng;

/// Concentrations `[a, b, c]`, each in [0, 1].
pub type Species = [f32; 3];

#[inline]
fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

#[derive(Clone, Debug, PartialEq)]
pub struct ThreeSpecies {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
}

impl Default for ThreeSpecies {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

impl ThreeSpecies {
    pub fn new(alpha: f32, beta: f32, gamma: f32) -> Self {
        Self { alpha, beta, gamma }
    }

    pub fn set_coefficients(&mut self, alpha: f32, beta: f32, gamma: f32) {
        self.alpha = alpha;
        self.beta = beta;
        self.gamma = gamma;
    }

    /// Local reaction applied to block averages.
    #[inline]
    pub fn react(&self, [a, b, c]: Species) -> Species {
        [
            clamp01(a + a * (self.alpha * b - self.gamma * c)),
            clamp01(b + b * (self.beta * c - self.alpha * a)),
            clamp01(c + c * (self.gamma * a - self.beta * b)),
        ]
    }
}

impl StepRule for ThreeSpecies {
    type Cell = Species;

    const SERIES: &'static [&'static str] = &["a", "b", "c"];

    fn supports_boundary(&self, mode: BoundaryMode) -> bool {
        matches!(mode, BoundaryMode::Wrap | BoundaryMode::Open)
    }

    fn supports_mask(&self) -> bool {
        true
    }

    fn next(&self, hood: &Neighborhood<Species>) -> Species {
        let mut sum = [0.0f32; 3];
        let mut count = 0u32;
        for v in hood.values() {
            sum[0] += v[0];
            sum[1] += v[1];
            sum[2] += v[2];
            count += 1;
        }
        if count == 0 {
            return Species::default();
        }
        let n = count as f32;
        self.react([sum[0] / n, sum[1] / n, sum[2] / n])
    }

    fn seed(&self, rng: &mut Rng) -> Species {
        [rng.next_f32(), rng.next_f32(), rng.next_f32()]
    }

    fn normalize(&self, cell: Species) -> Species {
        cell.map(|v| if v.is_nan() { 0.0 } else { clamp01(v) })
    }

    fn is_active(&self, cell: Species) -> bool {
        cell.iter().any(|&v| v > 0.0)
    }

    fn summarize(&self, cells: &[Species]) -> Vec<f64> {
        if cells.is_empty() {
            return vec![0.0; 3];
        }
        let mut sum = [0.0f64; 3];
        for cell in cells {
            for (s, &v) in sum.iter_mut().zip(cell) {
                *s += v as f64;
            }
        }
        let total = cells.len() as f64;
        sum.iter().map(|s| s / total).collect()
    }
}

impl BlendRule for ThreeSpecies {
    fn blend(&self, current: Species, weight: f32, rng: &mut Rng) -> Species {
        let w = clamp01(weight);
        current.map(|v| clamp01(v * (1.0 - w) + rng.next_f32() * w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(v: Species) -> Neighborhood<Species> {
        Neighborhood {
            center: v,
            contributions: [Some(v); 9],
        }
    }

    #[test]
    fn equal_coefficients_on_uniform_field_are_stable() {
        // With α=β=γ and a=b=c the three reaction terms cancel.
        let rule = ThreeSpecies::default();
        let next = rule.next(&uniform([0.4, 0.4, 0.4]));
        for v in next {
            assert!((v - 0.4).abs() < 1e-6);
        }
    }

    #[test]
    fn reaction_matches_formula() {
        let rule = ThreeSpecies::new(1.2, 0.8, 0.5);
        let [a, b, c] = [0.3f32, 0.6, 0.2];
        let got = rule.react([a, b, c]);
        let want = [
            a + a * (1.2 * b - 0.5 * c),
            b + b * (0.8 * c - 1.2 * a),
            c + c * (0.5 * a - 0.8 * b),
        ];
        for k in 0..3 {
            assert!((got[k] - want[k].clamp(0.0, 1.0)).abs() < 1e-6);
        }
    }

    #[test]
    fn divergent_coefficients_are_clamped() {
        let rule = ThreeSpecies::new(100.0, -50.0, 1e6);
        let next = rule.next(&uniform([0.9, 0.1, 0.7]));
        assert!(next.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn average_ignores_excluded_slots() {
        let rule = ThreeSpecies::new(0.0, 0.0, 0.0);
        let mut contributions = [None; 9];
        contributions[4] = Some([0.2, 0.4, 0.6]);
        contributions[5] = Some([0.4, 0.0, 0.2]);
        let hood = Neighborhood {
            center: [0.2, 0.4, 0.6],
            contributions,
        };
        // With zero coefficients the result is the plain mean of two cells.
        let next = rule.next(&hood);
        assert!((next[0] - 0.3).abs() < 1e-6);
        assert!((next[1] - 0.2).abs() < 1e-6);
        assert!((next[2] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn empty_block_yields_empty_cell() {
        let rule = ThreeSpecies::default();
        let hood = Neighborhood {
            center: [0.5; 3],
            contributions: [None; 9],
        };
        assert_eq!(rule.next(&hood), [0.0; 3]);
    }

    #[test]
    fn summary_is_per_field_mean() {
        let rule = ThreeSpecies::default();
        let cells = [[0.0, 1.0, 0.5], [1.0, 0.0, 0.5]];
        assert_eq!(rule.summarize(&cells), vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn blend_full_weight_stays_in_range_and_zero_weight_keeps_value() {
        let rule = ThreeSpecies::default();
        let mut rng = Rng::new(9);
        let cell = [0.25, 0.5, 0.75];
        assert_eq!(rule.blend(cell, 0.0, &mut rng), cell);
        for _ in 0..100 {
            let out = rule.blend(cell, 1.0, &mut rng);
            assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn blend_is_convex_toward_the_drawn_target() {
        let rule = ThreeSpecies::default();
        let cell = [0.2, 0.6, 1.0];
        for w in [1.0f32, 0.5, 0.25] {
            let mut rng = Rng::new(41);
            let mut draws = rng.clone();
            let got = rule.blend(cell, w, &mut rng);
            for k in 0..3 {
                let target = draws.next_f32();
                let want = cell[k] * (1.0 - w) + target * w;
                assert!((got[k] - want).abs() < 1e-6, "w={w} k={k}");
            }
        }
    }
}
