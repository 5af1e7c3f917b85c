use rayon::prelude::*;

use crate::config::{SpeciesPalette, SumPalette};
use crate::grid::Grid;
use crate::rules::{STATE_COUNT, Species};

type Rgb = [f32; 3];

// Life colors
const LIFE_ALIVE: [u8; 4] = [126, 237, 183, 255];
const LIFE_DEAD: [u8; 4] = [15, 20, 32, 255];

const TURBO: [[u8; 3]; 10] = [
    [48, 18, 59],
    [48, 70, 139],
    [38, 129, 198],
    [34, 181, 192],
    [40, 223, 140],
    [122, 245, 71],
    [211, 244, 45],
    [253, 196, 53],
    [241, 93, 34],
    [133, 16, 12],
];

const PLASMA: [[u8; 3]; 9] = [
    [13, 8, 135],
    [75, 3, 161],
    [125, 3, 168],
    [168, 34, 150],
    [203, 70, 121],
    [229, 107, 93],
    [248, 148, 65],
    [253, 195, 40],
    [240, 249, 33],
];

const RELIEF_GAMMA: f32 = 0.7;

const TRIAD: [[u8; 3]; 3] = [[29, 210, 168], [255, 120, 104], [250, 207, 90]];

const EMBER: [[u8; 3]; 6] = [
    [5, 5, 15],
    [68, 25, 78],
    [140, 36, 84],
    [214, 85, 52],
    [243, 140, 69],
    [255, 215, 131],
];

const MARINE: [[u8; 3]; 5] = [
    [3, 10, 30],
    [19, 46, 99],
    [40, 115, 155],
    [93, 201, 189],
    [178, 248, 219],
];

const ICE: [[u8; 3]; 5] = [
    [9, 7, 38],
    [34, 31, 88],
    [70, 86, 150],
    [133, 181, 196],
    [217, 240, 245],
];

const SPECTRUM: [[u8; 3]; 7] = [
    [28, 31, 101],
    [72, 12, 132],
    [168, 0, 121],
    [236, 66, 32],
    [255, 176, 0],
    [120, 219, 87],
    [34, 189, 215],
];

// Soft cyclic ramp, 20 stops, rises then falls back.
const CYCLIC: [Rgb; 20] = [
    [0.15, 0.1, 0.18],
    [0.18, 0.12, 0.22],
    [0.21, 0.15, 0.26],
    [0.25, 0.18, 0.3],
    [0.3, 0.22, 0.35],
    [0.35, 0.26, 0.4],
    [0.4, 0.31, 0.45],
    [0.45, 0.35, 0.5],
    [0.5, 0.4, 0.55],
    [0.55, 0.45, 0.6],
    [0.6, 0.5, 0.6],
    [0.55, 0.45, 0.55],
    [0.5, 0.4, 0.5],
    [0.45, 0.35, 0.45],
    [0.4, 0.31, 0.4],
    [0.35, 0.26, 0.36],
    [0.3, 0.23, 0.33],
    [0.25, 0.2, 0.3],
    [0.2, 0.16, 0.26],
    [0.17, 0.13, 0.22],
];

#[inline]
fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

#[inline]
fn unit(c: [u8; 3]) -> Rgb {
    [c[0] as f32 / 255.0, c[1] as f32 / 255.0, c[2] as f32 / 255.0]
}

#[inline]
fn to_rgba(c: Rgb) -> [u8; 4] {
    [
        (clamp01(c[0]) * 255.0) as u8,
        (clamp01(c[1]) * 255.0) as u8,
        (clamp01(c[2]) * 255.0) as u8,
        255,
    ]
}

/// Piecewise-linear gradient through `stops` at `t` in [0, 1].
fn sample_gradient(stops: &[[u8; 3]], t: f32) -> Rgb {
    let x = clamp01(t) * (stops.len() - 1) as f32;
    let i0 = x.floor() as usize;
    let i1 = (i0 + 1).min(stops.len() - 1);
    let frac = x - i0 as f32;
    let (c0, c1) = (unit(stops[i0]), unit(stops[i1]));
    [
        c0[0] + (c1[0] - c0[0]) * frac,
        c0[1] + (c1[1] - c0[1]) * frac,
        c0[2] + (c1[2] - c0[2]) * frac,
    ]
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    match (i as i32).rem_euclid(6) {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

#[inline]
fn spread([a, b, c]: Species) -> f32 {
    (a - b).abs().max((b - c).abs()).max((c - a).abs())
}

#[inline]
fn relief_height([a, b, c]: Species) -> f32 {
    0.55 * a + 0.35 * b + 0.10 * c
}

/// Color for one three-species cell. `relief` has no neighbors here and
/// shades the bare height; [`render_species`] adds the edge term.
pub fn species_color(palette: SpeciesPalette, cell: Species) -> Rgb {
    let [a, b, c] = cell;
    match palette {
        SpeciesPalette::Relief => sample_gradient(&PLASMA, clamp01(relief_height(cell)).powf(RELIEF_GAMMA)),
        SpeciesPalette::Soft => [0.25 + 0.75 * a, 0.25 + 0.75 * c, 0.25 + 0.75 * b],
        SpeciesPalette::Triad => {
            let sum = a + b + c + 1e-6;
            let w = [a / sum, b / sum, c / sum];
            let t = TRIAD.map(unit);
            [
                w[0] * t[0][0] + w[1] * t[1][0] + w[2] * t[2][0],
                w[0] * t[0][1] + w[1] * t[1][1] + w[2] * t[2][1],
                w[0] * t[0][2] + w[1] * t[1][2] + w[2] * t[2][2],
            ]
        }
        SpeciesPalette::Turbo => {
            let level = clamp01(0.55 * (a + b + c) / 3.0 + 0.55 * spread(cell));
            sample_gradient(&TURBO, level)
        }
        SpeciesPalette::Hue => {
            let angle = (c - b).atan2(a - 0.5 * (b + c));
            let hue = (angle / std::f32::consts::TAU + 1.0).rem_euclid(1.0);
            let sat = (1.2 * spread(cell)).min(1.0);
            let val = clamp01(0.5 + 0.5 * (a + b + c) / 3.0);
            hsv_to_rgb(hue, sat, val)
        }
    }
}

/// Color for one summation-automaton state at row `y` of an `n`-row grid.
pub fn state_color(palette: SumPalette, state: u8, y: usize, n: usize) -> Rgb {
    let t = clamp01(state as f32 / (STATE_COUNT - 1) as f32);
    match palette {
        SumPalette::Ember => sample_gradient(&EMBER, t),
        SumPalette::Marine => sample_gradient(&MARINE, t),
        SumPalette::Ice => sample_gradient(&ICE, t),
        // Slight rotation across rows for more motion.
        SumPalette::Spectrum => {
            sample_gradient(&SPECTRUM, clamp01(t * 0.9 + (y % 32) as f32 / (n as f32 * 1.1)))
        }
        SumPalette::Cyclic => CYCLIC[(t * (CYCLIC.len() - 1) as f32).floor() as usize],
    }
}

/// Central difference inside, one-sided at the edges.
fn derivative(i: usize, n: usize, at: impl Fn(usize) -> f32) -> f32 {
    if n < 2 {
        0.0
    } else if i == 0 {
        at(1) - at(0)
    } else if i == n - 1 {
        at(i) - at(i - 1)
    } else {
        0.5 * (at(i + 1) - at(i - 1))
    }
}

/// Relief heights: weighted field plus 0.45 times its gradient magnitude,
/// rescaled to [0, 1] over the frame and gamma-corrected.
fn relief_levels(grid: &Grid<Species>) -> Grid<f32> {
    let (w, h) = (grid.w, grid.h);
    let field: Vec<f32> = grid.data.iter().map(|&c| relief_height(c)).collect();

    let mut levels: Grid<f32> = Grid::new(w, h);
    levels.data.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        for (x, out) in row.iter_mut().enumerate() {
            let gx = derivative(x, w, |i| field[y * w + i]);
            let gy = derivative(y, h, |j| field[j * w + x]);
            *out = clamp01(field[y * w + x] + 0.45 * (gx * gx + gy * gy).sqrt());
        }
    });

    let (lo, hi) = levels
        .data
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = hi - lo;
    for v in levels.data.iter_mut() {
        *v = if span > 0.0 { ((*v - lo) / span).powf(RELIEF_GAMMA) } else { 0.0 };
    }
    levels
}

/// Render a three-species field to RGBA8.
pub fn render_species(grid: &Grid<Species>, palette: SpeciesPalette) -> Vec<u8> {
    if palette == SpeciesPalette::Relief {
        let levels = relief_levels(grid);
        return levels
            .data
            .par_iter()
            .flat_map_iter(|&t| to_rgba(sample_gradient(&PLASMA, t)))
            .collect();
    }
    let w = grid.w;
    let mut rgba = vec![0u8; w * grid.h * 4];
    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            let color = to_rgba(species_color(palette, grid.get(x, y)));
            row[x * 4..x * 4 + 4].copy_from_slice(&color);
        }
    });
    rgba
}

/// Render summation-automaton states to RGBA8.
pub fn render_states(grid: &Grid<u8>, palette: SumPalette) -> Vec<u8> {
    let w = grid.w;
    let h = grid.h;
    let mut rgba = vec![0u8; w * h * 4];
    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            let color = to_rgba(state_color(palette, grid.get(x, y), y, h));
            row[x * 4..x * 4 + 4].copy_from_slice(&color);
        }
    });
    rgba
}

/// Render a Life grid to RGBA8.
pub fn render_life(grid: &Grid<u8>) -> Vec<u8> {
    let mut rgba = vec![0u8; grid.data.len() * 4];
    rgba.par_chunks_mut(4)
        .zip(grid.data.par_iter())
        .for_each(|(px, &cell)| {
            px.copy_from_slice(if cell != 0 { &LIFE_ALIVE } else { &LIFE_DEAD });
        });
    rgba
}

/// Fading Life display: live cells are fully lit, dead cells lose
/// `rate` of their alpha per generation until they reach the background.
#[derive(Clone, Debug)]
pub struct LifeTrail {
    alpha: Grid<f32>,
    rate: f32,
}

impl LifeTrail {
    pub fn new(grid: &Grid<u8>, rate: f32) -> Self {
        let mut trail = Self {
            alpha: Grid::new(grid.w, grid.h),
            rate: rate.max(0.0),
        };
        trail.update(grid);
        trail
    }

    pub fn update(&mut self, grid: &Grid<u8>) {
        let rate = self.rate;
        self.alpha
            .data
            .par_iter_mut()
            .zip(grid.data.par_iter())
            .for_each(|(a, &cell)| {
                *a = if cell != 0 { 1.0 } else { (*a - rate).max(0.0) };
            });
    }

    pub fn alpha(&self) -> &Grid<f32> {
        &self.alpha
    }

    /// Live color composited over the dead background by trail alpha.
    pub fn render(&self) -> Vec<u8> {
        let (alive, dead) = (LIFE_ALIVE, LIFE_DEAD);
        let mut rgba = vec![0u8; self.alpha.data.len() * 4];
        rgba.par_chunks_mut(4)
            .zip(self.alpha.data.par_iter())
            .for_each(|(px, &a)| {
                for k in 0..3 {
                    px[k] = (dead[k] as f32 + (alive[k] as f32 - dead[k] as f32) * a).round() as u8;
                }
                px[3] = 255;
            });
        rgba
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_hits_end_stops() {
        assert_eq!(sample_gradient(&EMBER, 0.0), unit(EMBER[0]));
        assert_eq!(sample_gradient(&EMBER, 1.0), unit(EMBER[5]));
        assert_eq!(sample_gradient(&EMBER, 7.0), unit(EMBER[5]));
    }

    #[test]
    fn soft_palette_maps_channels() {
        let rgba = to_rgba(species_color(SpeciesPalette::Soft, [1.0, 0.0, 0.0]));
        assert_eq!(rgba, [255, 63, 63, 255]);
    }

    #[test]
    fn every_palette_stays_in_gamut() {
        let cells = [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.2, 0.9, 0.4], [1.0, 0.0, 0.5]];
        for palette in [
            SpeciesPalette::Soft,
            SpeciesPalette::Relief,
            SpeciesPalette::Triad,
            SpeciesPalette::Turbo,
            SpeciesPalette::Hue,
        ] {
            for cell in cells {
                let c = species_color(palette, cell);
                assert!(c.iter().all(|v| v.is_finite() && (0.0..=1.0001).contains(v)), "{palette:?}");
            }
        }
        for palette in [
            SumPalette::Ember,
            SumPalette::Marine,
            SumPalette::Ice,
            SumPalette::Spectrum,
            SumPalette::Cyclic,
        ] {
            for state in 0..STATE_COUNT {
                let c = state_color(palette, state, 40, 220);
                assert!(c.iter().all(|v| (0.0..=1.0).contains(v)), "{palette:?}");
            }
        }
    }

    #[test]
    fn life_render_sizes_and_colors() {
        let mut grid: Grid<u8> = Grid::square(3);
        grid.set(1, 0, 1);
        let rgba = render_life(&grid);
        assert_eq!(rgba.len(), 36);
        assert_eq!(&rgba[0..4], &LIFE_DEAD);
        assert_eq!(&rgba[4..8], &LIFE_ALIVE);
    }

    #[test]
    fn state_render_is_row_major() {
        let mut grid: Grid<u8> = Grid::square(4);
        grid.set(3, 2, 19);
        let rgba = render_states(&grid, SumPalette::Ember);
        let i = (2 * 4 + 3) * 4;
        assert_eq!(&rgba[i..i + 4], &to_rgba(unit(EMBER[5])));
    }

    #[test]
    fn relief_spans_plasma_and_highlights_edges() {
        let mut grid: Grid<Species> = Grid::square(5);
        for x in 3..5 {
            for y in 0..5 {
                grid.set(x, y, [1.0, 1.0, 1.0]);
            }
        }
        let levels = relief_levels(&grid);
        assert_eq!(levels.get(0, 2), 0.0);
        assert_eq!(levels.get(4, 2), 1.0);
        // The step between columns 2 and 3 lifts the low side off the floor.
        assert_eq!(levels.get(1, 2), 0.0);
        assert!((levels.get(2, 2) - 0.225f32.powf(RELIEF_GAMMA)).abs() < 1e-5);

        let rgba = render_species(&grid, SpeciesPalette::Relief);
        assert_eq!(rgba.len(), 5 * 5 * 4);
        assert_eq!(&rgba[0..4], &to_rgba(unit(PLASMA[0])));
        let last = rgba.len() - 4;
        assert_eq!(&rgba[last..], &to_rgba(unit(PLASMA[8])));
    }

    #[test]
    fn relief_of_flat_field_is_floor() {
        let grid: Grid<Species> = Grid::square(4);
        assert!(relief_levels(&grid).data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn trail_fades_dead_cells() {
        let mut grid: Grid<u8> = Grid::square(2);
        grid.set(0, 0, 1);
        let mut trail = LifeTrail::new(&grid, 0.25);
        assert_eq!(trail.alpha().get(0, 0), 1.0);
        assert_eq!(trail.alpha().get(1, 0), 0.0);

        grid.set(0, 0, 0);
        trail.update(&grid);
        assert_eq!(trail.alpha().get(0, 0), 0.75);
        for _ in 0..5 {
            trail.update(&grid);
        }
        assert_eq!(trail.alpha().get(0, 0), 0.0);

        grid.set(1, 1, 1);
        trail.update(&grid);
        let rgba = trail.render();
        assert_eq!(&rgba[0..4], &LIFE_DEAD);
        assert_eq!(&rgba[12..16], &LIFE_ALIVE);
    }

    #[test]
    fn trail_midpoint_blends_colors() {
        let mut grid: Grid<u8> = Grid::square(1);
        grid.set(0, 0, 1);
        let mut trail = LifeTrail::new(&grid, 0.5);
        grid.set(0, 0, 0);
        trail.update(&grid);
        let rgba = trail.render();
        for k in 0..3 {
            let mid = ((LIFE_ALIVE[k] as f32 + LIFE_DEAD[k] as f32) / 2.0).round() as u8;
            assert!(rgba[k].abs_diff(mid) <= 1);
        }
    }
}
