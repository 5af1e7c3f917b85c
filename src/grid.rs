/// Row-major flat grid. No per-cell objects.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub w: usize,
    pub h: usize,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            data: vec![T::default(); w * h],
            w,
            h,
        }
    }

    pub fn square(n: usize) -> Self {
        Self::new(n, n)
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.w && y < self.h);
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: T) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Index of a signed coordinate, or None when it falls off the grid.
    #[inline]
    pub fn checked_idx(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.w as i64 || y >= self.h as i64 {
            return None;
        }
        Some(y as usize * self.w + x as usize)
    }

    pub fn fill(&mut self, v: T) {
        self.data.fill(v);
    }
}

/// Wrap a signed coordinate onto [0, n).
#[inline]
pub fn wrap(v: i64, n: usize) -> usize {
    v.rem_euclid(n as i64) as usize
}

/// Current generation plus scratch space for the next one.
///
/// A step writes only into `next` while reading only `current`, then `swap`
/// promotes the result without copying.
#[derive(Clone, Debug)]
pub struct Buffers<T> {
    pub current: Grid<T>,
    pub next: Grid<T>,
}

impl<T: Copy + Default> Buffers<T> {
    pub fn square(n: usize) -> Self {
        Self {
            current: Grid::square(n),
            next: Grid::square(n),
        }
    }

    pub fn size(&self) -> usize {
        self.current.w
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_handles_negative_and_overflow() {
        assert_eq!(wrap(-1, 5), 4);
        assert_eq!(wrap(5, 5), 0);
        assert_eq!(wrap(-6, 5), 4);
        assert_eq!(wrap(2, 5), 2);
    }

    #[test]
    fn checked_idx_rejects_out_of_range() {
        let g: Grid<u8> = Grid::square(4);
        assert_eq!(g.checked_idx(-1, 0), None);
        assert_eq!(g.checked_idx(0, 4), None);
        assert_eq!(g.checked_idx(3, 2), Some(11));
    }

    #[test]
    fn swap_exchanges_without_copy() {
        let mut b: Buffers<u8> = Buffers::square(3);
        b.next.set(1, 1, 7);
        let ptr = b.next.data.as_ptr();
        b.swap();
        assert_eq!(b.current.get(1, 1), 7);
        assert_eq!(b.current.data.as_ptr(), ptr);
        assert_eq!(b.next.get(1, 1), 0);
    }
}
