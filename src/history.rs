use std::collections::VecDeque;

use serde::Serialize;

/// Scalar summaries for one completed generation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistorySample {
    pub generation: u64,
    pub values: Vec<f64>,
}

/// Bounded trailing window of per-generation summaries for charting.
///
/// `steps` and every entry of `series` are parallel and always the same
/// length; the oldest sample is evicted once `capacity` is exceeded.
#[derive(Clone, Debug, Serialize)]
pub struct History {
    capacity: usize,
    names: &'static [&'static str],
    steps: VecDeque<u64>,
    series: Vec<VecDeque<f64>>,
}

impl History {
    /// Storage grows with recorded samples, not with `capacity`.
    pub fn new(names: &'static [&'static str], capacity: usize) -> Self {
        Self {
            capacity,
            names,
            steps: VecDeque::new(),
            series: names.iter().map(|_| VecDeque::new()).collect(),
        }
    }

    pub fn push(&mut self, sample: HistorySample) {
        debug_assert_eq!(sample.values.len(), self.series.len());
        self.steps.push_back(sample.generation);
        for (series, v) in self.series.iter_mut().zip(sample.values) {
            series.push_back(v);
        }
        while self.steps.len() > self.capacity {
            self.steps.pop_front();
            for series in &mut self.series {
                series.pop_front();
            }
        }
    }

    /// Overwrite the newest sample if it belongs to the same generation.
    pub fn replace_last(&mut self, sample: HistorySample) -> bool {
        if self.steps.back() != Some(&sample.generation) {
            return false;
        }
        for (series, v) in self.series.iter_mut().zip(sample.values) {
            if let Some(last) = series.back_mut() {
                *last = v;
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.steps.clear();
        for series in &mut self.series {
            series.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    pub fn steps(&self) -> &VecDeque<u64> {
        &self.steps
    }

    pub fn series(&self, i: usize) -> Option<&VecDeque<f64>> {
        self.series.get(i)
    }

    pub fn last(&self) -> Option<HistorySample> {
        let generation = *self.steps.back()?;
        let values = self
            .series
            .iter()
            .filter_map(|s| s.back().copied())
            .collect();
        Some(HistorySample { generation, values })
    }

    /// Chart x-range: the last `capacity` generations ending at the newest.
    pub fn window(&self) -> Option<(u64, u64)> {
        let x_max = *self.steps.back()?;
        let x_min = x_max.saturating_sub(self.capacity.max(1) as u64 - 1);
        Some((x_min, if x_min == x_max { x_max + 1 } else { x_max }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &[&str] = &["mean", "active"];

    fn sample(generation: u64) -> HistorySample {
        HistorySample {
            generation,
            values: vec![generation as f64, 1.0],
        }
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let mut h = History::new(NAMES, 360);
        for g in 0..=400 {
            h.push(sample(g));
        }
        assert_eq!(h.len(), 360);
        assert_eq!(h.steps().front(), Some(&(400 - 359)));
        assert_eq!(h.series(0).unwrap().len(), 360);
        assert_eq!(h.series(1).unwrap().len(), 360);
        assert_eq!(h.series(0).unwrap().front(), Some(&41.0));
    }

    #[test]
    fn replace_last_only_for_same_generation() {
        let mut h = History::new(NAMES, 4);
        h.push(sample(3));
        assert!(!h.replace_last(sample(4)));
        assert!(h.replace_last(HistorySample {
            generation: 3,
            values: vec![9.0, 0.0],
        }));
        assert_eq!(h.len(), 1);
        assert_eq!(h.last().unwrap().values, vec![9.0, 0.0]);
    }

    #[test]
    fn window_tracks_newest() {
        let mut h = History::new(NAMES, 10);
        assert_eq!(h.window(), None);
        h.push(sample(0));
        assert_eq!(h.window(), Some((0, 1)));
        for g in 1..25 {
            h.push(sample(g));
        }
        assert_eq!(h.window(), Some((15, 24)));
    }

    #[test]
    fn capacity_is_a_bound_not_a_reservation() {
        let mut h = History::new(NAMES, usize::MAX);
        assert_eq!(h.steps().capacity(), 0);
        for g in 0..3 {
            h.push(sample(g));
        }
        assert_eq!(h.len(), 3);
        assert!(h.steps().capacity() < 1024);
        assert_eq!(h.window(), Some((0, 2)));
    }

    #[test]
    fn clear_empties_all_series() {
        let mut h = History::new(NAMES, 4);
        h.push(sample(0));
        h.clear();
        assert!(h.is_empty());
        assert!(h.series(0).unwrap().is_empty());
    }
}
