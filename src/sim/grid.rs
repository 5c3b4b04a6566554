//! Bounds-checked grid storage and cell validity checks
//!
//! `valid` and `is_valid_move` are the single source of truth for "can this
//! cell be occupied"; movement, AI and explosion propagation all go through
//! them.

use glam::IVec2;

use super::state::Wall;

/// Dense row-major storage addressed by grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: i32,
    height: i32,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `fill`
    ///
    /// Non-positive extents produce an empty grid where every cell is out of bounds.
    pub fn new(width: i32, height: i32, fill: T) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![fill; (width * height) as usize],
        }
    }
}

impl<T> Grid<T> {
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Check if a cell lies inside the grid
    #[inline]
    pub fn contains(&self, pos: IVec2) -> bool {
        valid(pos, self.width, self.height)
    }

    #[inline]
    fn index(&self, pos: IVec2) -> Option<usize> {
        self.contains(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn get(&self, pos: IVec2) -> Option<&T> {
        self.index(pos).map(|i| &self.cells[i])
    }

    /// Store a value; returns false (and stores nothing) when out of bounds
    pub fn set(&mut self, pos: IVec2, value: T) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    /// Iterate all cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &T)> + '_ {
        self.cells.iter().enumerate().map(move |(i, value)| {
            let i = i as i32;
            (IVec2::new(i % self.width, i / self.width), value)
        })
    }
}

impl<T: Copy + Default> Grid<T> {
    /// Copy out a cell, falling back to the default outside the grid
    #[inline]
    pub fn at(&self, pos: IVec2) -> T {
        self.get(pos).copied().unwrap_or_default()
    }
}

/// Check if a cell lies within `[0, width) x [0, height)`
#[inline]
pub fn valid(pos: IVec2, width: i32, height: i32) -> bool {
    pos.x >= 0 && pos.x < width && pos.y >= 0 && pos.y < height
}

/// Check if a cell is in bounds and free of walls
pub fn is_valid_move(pos: IVec2, width: i32, height: i32, walls: &[Wall]) -> bool {
    valid(pos, width, height) && !walls.iter().any(|w| w.pos == pos)
}
