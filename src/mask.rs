use crate::grid::Grid;

/// Fraction of the grid side used as the disc radius.
pub const DISC_RADIUS: f64 = 0.48;

/// Static inclusion flags for a square grid: the disc inscribed in it.
///
/// Built once per grid size and never mutated; whether it is applied is
/// decided by the engine's mask mode.
#[derive(Clone, Debug)]
pub struct DomainMask {
    cells: Grid<bool>,
}

impl DomainMask {
    pub fn disc(n: usize) -> Self {
        let mut cells = Grid::square(n);
        let center = (n as f64 - 1.0) / 2.0;
        let radius = n as f64 * DISC_RADIUS;
        let radius2 = radius * radius;
        for y in 0..n {
            let dy = y as f64 - center;
            for x in 0..n {
                let dx = x as f64 - center;
                cells.set(x, y, dx * dx + dy * dy <= radius2);
            }
        }
        Self { cells }
    }

    pub fn size(&self) -> usize {
        self.cells.w
    }

    #[inline]
    pub fn includes(&self, idx: usize) -> bool {
        self.cells.data[idx]
    }

    pub fn included_count(&self) -> usize {
        self.cells.data.iter().filter(|&&c| c).count()
    }
}
