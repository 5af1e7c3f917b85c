use crate::config::BoundaryMode;
use crate::grid::wrap;
use crate::mask::DomainMask;

/// What a neighbor offset contributes to a neighborhood.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contribution {
    /// Read the cell at this linear index.
    Cell(usize),
    /// Substitute the center cell's own value (`fill`).
    Center,
    /// Contributes nothing and is not counted (`open`).
    Excluded,
}

/// Resolve the neighbor of `(x, y)` at offset `(dx, dy)` on an `n`x`n` grid.
///
/// A mask-excluded in-bounds neighbor is treated exactly like an
/// off-grid one under the current mode, so `fill` substitutes the center
/// value for both.
#[inline]
pub fn resolve(
    x: usize,
    y: usize,
    dx: i64,
    dy: i64,
    n: usize,
    mode: BoundaryMode,
    mask: Option<&DomainMask>,
) -> Contribution {
    let nx = x as i64 + dx;
    let ny = y as i64 + dy;
    let idx = match mode {
        BoundaryMode::Wrap => wrap(ny, n) * n + wrap(nx, n),
        BoundaryMode::Open | BoundaryMode::Fill => {
            if nx < 0 || ny < 0 || nx >= n as i64 || ny >= n as i64 {
                return missing(mode);
            }
            ny as usize * n + nx as usize
        }
    };
    match mask {
        Some(mask) if !mask.includes(idx) => missing(mode),
        _ => Contribution::Cell(idx),
    }
}

#[inline]
fn missing(mode: BoundaryMode) -> Contribution {
    match mode {
        BoundaryMode::Fill => Contribution::Center,
        _ => Contribution::Excluded,
    }
}

/// Target cell for a direct write at signed `(x, y)`, if admissible.
///
/// Same rules as a neighbor lookup, evaluated against the target itself:
/// wrapped under `wrap`, dropped when off-grid otherwise, dropped when
/// masked out.
#[inline]
pub fn admit(x: i64, y: i64, n: usize, mode: BoundaryMode, mask: Option<&DomainMask>) -> Option<usize> {
    let idx = match mode {
        BoundaryMode::Wrap => wrap(y, n) * n + wrap(x, n),
        BoundaryMode::Open | BoundaryMode::Fill => {
            if x < 0 || y < 0 || x >= n as i64 || y >= n as i64 {
                return None;
            }
            y as usize * n + x as usize
        }
    };
    match mask {
        Some(mask) if !mask.includes(idx) => None,
        _ => Some(idx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_always_resolves_to_a_cell() {
        assert_eq!(resolve(0, 0, -1, -1, 4, BoundaryMode::Wrap, None), Contribution::Cell(15));
        assert_eq!(resolve(3, 3, 1, 1, 4, BoundaryMode::Wrap, None), Contribution::Cell(0));
        assert_eq!(resolve(1, 2, 0, 0, 4, BoundaryMode::Wrap, None), Contribution::Cell(9));
    }

    #[test]
    fn open_excludes_off_grid() {
        assert_eq!(resolve(0, 0, -1, 0, 4, BoundaryMode::Open, None), Contribution::Excluded);
        assert_eq!(resolve(0, 0, 1, 1, 4, BoundaryMode::Open, None), Contribution::Cell(5));
    }

    #[test]
    fn fill_substitutes_center_off_grid() {
        assert_eq!(resolve(3, 0, 1, 0, 4, BoundaryMode::Fill, None), Contribution::Center);
        assert_eq!(resolve(3, 0, -1, 0, 4, BoundaryMode::Fill, None), Contribution::Cell(2));
    }

    #[test]
    fn masked_neighbor_behaves_like_off_grid() {
        let n = 20;
        let mask = DomainMask::disc(n);
        // (1,1) is outside the disc, (2,2) neighbours it.
        assert!(!mask.includes(n + 1));
        assert_eq!(resolve(2, 2, -1, -1, n, BoundaryMode::Open, Some(&mask)), Contribution::Excluded);
        assert_eq!(resolve(2, 2, -1, -1, n, BoundaryMode::Fill, Some(&mask)), Contribution::Center);
        assert_eq!(resolve(10, 10, 1, 0, n, BoundaryMode::Open, Some(&mask)), Contribution::Cell(10 * n + 11));
    }

    #[test]
    fn admit_follows_mode() {
        assert_eq!(admit(-1, 0, 4, BoundaryMode::Wrap, None), Some(3));
        assert_eq!(admit(-1, 0, 4, BoundaryMode::Open, None), None);
        assert_eq!(admit(4, 0, 4, BoundaryMode::Fill, None), None);
        assert_eq!(admit(2, 1, 4, BoundaryMode::Fill, None), Some(6));

        let mask = DomainMask::disc(20);
        assert_eq!(admit(0, 0, 20, BoundaryMode::Open, Some(&mask)), None);
    }
}
