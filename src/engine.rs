use rayon::prelude::*;
use tracing::debug;

use crate::boundary::{Contribution, admit, resolve};
use crate::config::{BoundaryMode, GridParams, MAX_HISTORY, MaskMode};
use crate::error::ConfigError;
use crate::grid::{Buffers, Grid};
use crate::history::{History, HistorySample};
use crate::mask::DomainMask;
use crate::rng::Rng;
use crate::rules::{BlendRule, Neighborhood, StepRule};

/// One running automaton: double-buffered grid, boundary and mask policy,
/// generation counter and history, advanced by a [`StepRule`].
///
/// All state is owned; hosts hold as many independent engines as they like.
/// `step` and `perturb` both take `&mut self`, so a perturbation can never
/// land while a step is reading the current buffer.
#[derive(Clone, Debug)]
pub struct Engine<R: StepRule> {
    rule: R,
    buffers: Buffers<R::Cell>,
    mask: DomainMask,
    mask_mode: MaskMode,
    boundary: BoundaryMode,
    generation: u64,
    history: History,
    rng: Rng,
}

impl<R: StepRule> Engine<R> {
    pub fn new(rule: R, params: &GridParams, seed: u64) -> Result<Self, ConfigError> {
        if params.size == 0 {
            return Err(ConfigError::InvalidSize(params.size));
        }
        if !R::SERIES.is_empty() {
            if params.history_capacity == 0 {
                return Err(ConfigError::ZeroHistory);
            }
            if params.history_capacity > MAX_HISTORY {
                return Err(ConfigError::HistoryTooLarge(params.history_capacity));
            }
        }
        let mut engine = Self {
            rule,
            buffers: Buffers::square(params.size),
            mask: DomainMask::disc(params.size),
            mask_mode: MaskMode::Full,
            boundary: BoundaryMode::Wrap,
            generation: 0,
            history: History::new(R::SERIES, params.history_capacity),
            rng: Rng::new(seed),
        };
        engine.set_mask(params.mask);
        engine.set_boundary(params.boundary);
        engine.reseed();
        Ok(engine)
    }

    pub fn size(&self) -> usize {
        self.buffers.size()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn boundary(&self) -> BoundaryMode {
        self.boundary
    }

    pub fn mask_mode(&self) -> MaskMode {
        self.mask_mode
    }

    pub fn mask(&self) -> &DomainMask {
        &self.mask
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Rule parameters are hot-swappable between steps.
    pub fn rule_mut(&mut self) -> &mut R {
        &mut self.rule
    }

    /// Current generation, for rendering.
    pub fn grid(&self) -> &Grid<R::Cell> {
        &self.buffers.current
    }

    pub fn cells(&self) -> &[R::Cell] {
        &self.buffers.current.data
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn live_count(&self) -> usize {
        self.cells().iter().filter(|&&c| self.rule.is_active(c)).count()
    }

    fn active_mask(&self) -> Option<&DomainMask> {
        (self.mask_mode == MaskMode::Round).then_some(&self.mask)
    }

    /// The block the next step would feed to the rule for `(x, y)`.
    pub fn neighborhood(&self, x: usize, y: usize) -> Neighborhood<R::Cell> {
        gather(&self.buffers.current, x, y, self.boundary, self.active_mask())
    }

    /// Change the boundary mode. Refused when the rule does not support it or
    /// when `wrap` is requested while the round mask is active.
    pub fn set_boundary(&mut self, mode: BoundaryMode) -> bool {
        if !self.rule.supports_boundary(mode) {
            debug!(?mode, "boundary not supported by rule");
            return false;
        }
        if mode == BoundaryMode::Wrap && self.mask_mode == MaskMode::Round {
            debug!("wrap refused while round mask is active");
            return false;
        }
        self.boundary = mode;
        true
    }

    /// Switch masking. Activating the round mask empties excluded cells now
    /// and moves a `wrap` boundary to `open`.
    pub fn set_mask(&mut self, mode: MaskMode) -> bool {
        if mode == MaskMode::Round && !self.rule.supports_mask() {
            debug!("masking not supported by rule");
            return false;
        }
        self.mask_mode = mode;
        if mode == MaskMode::Round {
            self.clear_excluded();
            if self.boundary == BoundaryMode::Wrap {
                self.boundary = BoundaryMode::Open;
            }
            if let Some(sample) = self.sample() {
                self.history.replace_last(sample);
            }
        }
        true
    }

    fn clear_excluded(&mut self) {
        let empty = R::Cell::default();
        for (i, cell) in self.buffers.current.data.iter_mut().enumerate() {
            if !self.mask.includes(i) {
                *cell = empty;
            }
        }
    }

    /// Fill every cell from the engine's RNG and restart at generation 0.
    pub fn reseed(&mut self) {
        for cell in self.buffers.current.data.iter_mut() {
            *cell = self.rule.seed(&mut self.rng);
        }
        self.buffers.next.fill(R::Cell::default());
        if self.mask_mode == MaskMode::Round {
            self.clear_excluded();
        }
        self.restart();
        debug!(size = self.size(), "reseeded");
    }

    /// Empty every cell and restart at generation 0.
    pub fn clear(&mut self) {
        self.buffers.current.fill(R::Cell::default());
        self.buffers.next.fill(R::Cell::default());
        self.restart();
    }

    fn restart(&mut self) {
        self.generation = 0;
        self.history.clear();
        self.record();
    }

    /// Reallocate for a new side length. Buffers and mask are replaced
    /// together, then the grid is reseeded.
    pub fn resize(&mut self, size: usize) -> Result<(), ConfigError> {
        if size == 0 {
            return Err(ConfigError::InvalidSize(size));
        }
        let buffers = Buffers::square(size);
        let mask = DomainMask::disc(size);
        self.buffers = buffers;
        self.mask = mask;
        self.reseed();
        Ok(())
    }

    /// Direct write into the current generation, visible immediately.
    /// Off-grid or mask-excluded targets are ignored.
    pub fn set(&mut self, x: i64, y: i64, value: R::Cell) {
        let Some(idx) = self.buffers.current.checked_idx(x, y) else {
            return;
        };
        if self.mask_mode == MaskMode::Round && !self.mask.includes(idx) {
            return;
        }
        self.buffers.current.data[idx] = self.rule.normalize(value);
    }

    /// Advance one generation.
    pub fn step(&mut self) {
        let Self {
            rule,
            buffers,
            mask,
            mask_mode,
            boundary,
            ..
        } = self;
        let rule = &*rule;
        let mask = (*mask_mode == MaskMode::Round).then_some(&*mask);
        let mode = *boundary;
        let n = buffers.size();
        let Buffers { current, next } = buffers;
        let current = &*current;
        let empty = R::Cell::default();

        next.data.par_chunks_mut(n).enumerate().for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                *out = match mask {
                    Some(m) if !m.includes(y * n + x) => empty,
                    _ => rule.next(&gather(current, x, y, mode, mask)),
                };
            }
        });

        self.buffers.swap();
        self.generation += 1;
        self.record();
    }

    pub fn steps(&mut self, count: usize) {
        for _ in 0..count {
            self.step();
        }
    }

    fn sample(&self) -> Option<HistorySample> {
        if R::SERIES.is_empty() {
            return None;
        }
        Some(HistorySample {
            generation: self.generation,
            values: self.rule.summarize(self.cells()),
        })
    }

    fn record(&mut self) {
        if let Some(sample) = self.sample() {
            self.history.push(sample);
        }
    }
}

impl<R: BlendRule> Engine<R> {
    /// Blend cells within `radius` of `(cx, cy)` toward random values, with
    /// weight falling linearly from 1 at the center to 0 at `radius`.
    ///
    /// Each cell is blended at most once per call. Under `wrap` a cell
    /// reachable by several offsets takes the shortest one. Off-grid centers
    /// and a zero radius do nothing.
    pub fn perturb(&mut self, cx: i64, cy: i64, radius: u32) {
        let n = self.size();
        if radius == 0 || cx < 0 || cy < 0 || cx >= n as i64 || cy >= n as i64 {
            return;
        }
        let mask = (self.mask_mode == MaskMode::Round).then_some(&self.mask);
        let r = i64::from(radius);
        let xs = axis_offsets(cx, r, n, self.boundary);
        let ys = axis_offsets(cy, r, n, self.boundary);
        for &dy in &ys {
            for &dx in &xs {
                let Some(idx) = admit(cx + dx, cy + dy, n, self.boundary, mask) else {
                    continue;
                };
                let dist = ((dx * dx + dy * dy) as f64).sqrt();
                let fade = (1.0 - dist / f64::from(radius)).max(0.0) as f32;
                if fade <= 0.0 {
                    continue;
                }
                let cell = &mut self.buffers.current.data[idx];
                *cell = self.rule.blend(*cell, fade, &mut self.rng);
            }
        }
    }
}

/// Offsets along one axis that reach a distinct cell within `r` of `c`.
///
/// Never more than `n` entries. Under `wrap` each column appears once, at
/// its shortest signed offset; otherwise offsets leaving the grid are dropped.
fn axis_offsets(c: i64, r: i64, n: usize, mode: BoundaryMode) -> Vec<i64> {
    let n = n as i64;
    if mode == BoundaryMode::Wrap {
        let mut offsets: Vec<i64> = (0..n)
            .map(|t| {
                let d = (t - c).rem_euclid(n);
                if d > n / 2 { d - n } else { d }
            })
            .filter(|d| d.abs() <= r)
            .collect();
        offsets.sort_unstable();
        offsets
    } else {
        ((-r).max(-c)..=r.min(n - 1 - c)).collect()
    }
}

fn gather<C: Copy>(
    grid: &Grid<C>,
    x: usize,
    y: usize,
    mode: BoundaryMode,
    mask: Option<&DomainMask>,
) -> Neighborhood<C> {
    let n = grid.w;
    let center = grid.data[y * n + x];
    let mut contributions = [None; 9];
    for (k, slot) in contributions.iter_mut().enumerate() {
        let dx = (k % 3) as i64 - 1;
        let dy = (k / 3) as i64 - 1;
        *slot = match resolve(x, y, dx, dy, n, mode, mask) {
            Contribution::Cell(i) => Some(grid.data[i]),
            Contribution::Center => Some(center),
            Contribution::Excluded => None,
        };
    }
    Neighborhood {
        center,
        contributions,
    }
}
