//! Geometry primitives: [`CellPoint`], [`SubPoint`] and [`CenterPoint`].
//!
//! The world uses two aligned grids. Elements occupy rectangular footprints
//! on the coarse N×M grid ([`CellPoint`]); path search and range computation
//! happen on the fine 2N×2M sub-cell grid ([`SubPoint`]). Each coarse cell
//! covers exactly four fine cells. [`CenterPoint`] is a continuous
//! coordinate used only for nearest-target distance ranking.

use std::fmt;
use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// CellPoint
// ---------------------------------------------------------------------------

/// A coordinate on the coarse object-placement grid. X grows right, Y grows
/// down (screen coordinates).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellPoint {
    pub x: i32,
    pub y: i32,
}

impl CellPoint {
    /// Create a new coarse point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return a point shifted by (dx, dy).
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Squared Euclidean distance to another coarse point.
    #[inline]
    pub fn sqr_distance(self, other: CellPoint) -> i32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// The four fine cells covered by this coarse cell.
    #[inline]
    pub fn subcells(self) -> [SubPoint; 4] {
        let (fx, fy) = (self.x * 2, self.y * 2);
        [
            SubPoint::new(fx, fy),
            SubPoint::new(fx + 1, fy),
            SubPoint::new(fx, fy + 1),
            SubPoint::new(fx + 1, fy + 1),
        ]
    }

    /// Continuous center of this cell.
    #[inline]
    pub fn center(self) -> CenterPoint {
        CenterPoint::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }
}

impl fmt::Display for CellPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for CellPoint {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for CellPoint {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// ---------------------------------------------------------------------------
// SubPoint
// ---------------------------------------------------------------------------

/// A coordinate on the fine sub-cell grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubPoint {
    pub x: i32,
    pub y: i32,
}

impl SubPoint {
    /// Origin (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new fine point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return a point shifted by (dx, dy).
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The coarse cell containing this fine cell.
    ///
    /// Grid coordinates are non-negative, so integer division by two is the
    /// exact many-to-one inverse of [`CellPoint::subcells`].
    #[inline]
    pub const fn cell(self) -> CellPoint {
        CellPoint::new(self.x / 2, self.y / 2)
    }

    /// Continuous center of this fine cell.
    #[inline]
    pub fn center(self) -> CenterPoint {
        CenterPoint::new(self.x as f32 * 0.5 + 0.25, self.y as f32 * 0.5 + 0.25)
    }

    /// Squared Euclidean distance to another fine point.
    #[inline]
    pub fn sqr_distance(self, other: SubPoint) -> i32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// The four cardinal neighbours, in left, up, right, down order.
    #[inline]
    pub fn neighbors_4(self) -> [SubPoint; 4] {
        [
            Self::new(self.x - 1, self.y),
            Self::new(self.x, self.y - 1),
            Self::new(self.x + 1, self.y),
            Self::new(self.x, self.y + 1),
        ]
    }
}

impl fmt::Display for SubPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for SubPoint {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for SubPoint {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// ---------------------------------------------------------------------------
// CenterPoint
// ---------------------------------------------------------------------------

/// A continuous coordinate, used for ranking targets by real distance.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CenterPoint {
    pub x: f32,
    pub y: f32,
}

impl CenterPoint {
    /// Create a new continuous point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another continuous point.
    #[inline]
    pub fn sqr_distance(self, other: CenterPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }
}

impl fmt::Display for CenterPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
