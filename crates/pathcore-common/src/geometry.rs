//! Integer-grid geometry primitives

/// An inclusive axis-aligned rectangle in grid coordinates.
///
/// Used for region-change notifications: map edits report the rectangle of
/// affected cells and downstream consumers (caches, hierarchical graphs,
/// in-flight searches) decide what to invalidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl GridRect {
    /// Creates a rectangle from corner coordinates, normalizing the order
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// Single-cell rectangle
    pub fn cell(x: i32, y: i32) -> Self {
        Self::new(x, y, x, y)
    }

    /// Smallest rectangle covering every point; `None` for an empty iterator
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut iter = points.into_iter();
        let (x, y) = iter.next()?;
        let mut rect = Self::cell(x, y);
        for (x, y) in iter {
            rect.min_x = rect.min_x.min(x);
            rect.min_y = rect.min_y.min(y);
            rect.max_x = rect.max_x.max(x);
            rect.max_y = rect.max_y.max(y);
        }
        Some(rect)
    }

    /// Returns true if the cell lies inside the rectangle
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Returns true if the two rectangles overlap
    #[inline]
    pub fn intersects(&self, other: &GridRect) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Grows the rectangle by `n` cells on every side
    pub fn expand(&self, n: i32) -> Self {
        Self {
            min_x: self.min_x - n,
            min_y: self.min_y - n,
            max_x: self.max_x + n,
            max_y: self.max_y + n,
        }
    }
}
