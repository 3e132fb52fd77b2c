//! Precomputed circular range masks.
//!
//! A [`Mask`] stores one quadrant of a boolean disc of radius `r`; the other
//! three quadrants follow by sign reflection. The offset variant shifts the
//! disc center by a fractional amount, used for ranges measured from element
//! footprints whose centers sit between fine cells. [`MaskCache`] memoizes
//! masks by their parameters and never evicts.

use std::collections::HashMap;

use crate::geom::SubPoint;

/// One quadrant of a boolean disc over fine-cell offsets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    side: i32,
    cells: Vec<bool>,
}

impl Mask {
    /// Integer-centered disc: offset `(i, j)` is inside iff `i² + j² ≤ r²`.
    pub fn disc(r: i32) -> Self {
        assert!(r >= 0, "negative mask radius {r}");
        let side = r + 1;
        let sqr_r = r * r;
        let mut cells = vec![false; (side * side) as usize];
        for i in 0..side {
            for j in 0..side {
                cells[(i * side + j) as usize] = i * i + j * j <= sqr_r;
            }
        }
        Self { side, cells }
    }

    /// Disc with its center shifted by the fractional `(dx, dy)`: offset
    /// `(i, j)` is inside iff `(i+dx)² + (j+dy)² ≤ r²`.
    pub fn disc_offset(r: i32, dx: f32, dy: f32) -> Self {
        assert!(r >= 0, "negative mask radius {r}");
        let side = r + 1;
        let sqr_r = (r * r) as f32;
        let mut cells = vec![false; (side * side) as usize];
        for i in 0..side {
            for j in 0..side {
                let px = i as f32 + dx;
                let py = j as f32 + dy;
                cells[(i * side + j) as usize] = px * px + py * py <= sqr_r;
            }
        }
        Self { side, cells }
    }

    /// Quadrant side length (radius + 1).
    #[inline]
    pub fn side(&self) -> i32 {
        self.side
    }

    /// Whether quadrant offset `(i, j)` is inside the disc.
    #[inline]
    pub fn contains(&self, i: i32, j: i32) -> bool {
        if i < 0 || j < 0 || i >= self.side || j >= self.side {
            return false;
        }
        self.cells[(i * self.side + j) as usize]
    }

    /// Cells set in `self` but not in `other`. With two discs of radii
    /// `r2 > r1` this yields the annular band between them.
    pub fn difference(&self, other: &Mask) -> Mask {
        let mut result = self.clone();
        for i in 0..self.side {
            for j in 0..self.side {
                if other.contains(i, j) {
                    result.cells[(i * self.side + j) as usize] = false;
                }
            }
        }
        result
    }

    /// Expand the quadrant into all four quadrants by sign reflection,
    /// skipping the duplicate images of axis cells.
    ///
    /// The result is exactly the set of integer offsets within the disc.
    pub fn points(&self) -> Vec<SubPoint> {
        let mut out = Vec::new();
        for i in 0..self.side {
            for j in 0..self.side {
                if !self.cells[(i * self.side + j) as usize] {
                    continue;
                }
                out.push(SubPoint::new(i, j));
                if i != 0 {
                    out.push(SubPoint::new(-i, j));
                }
                if j != 0 {
                    out.push(SubPoint::new(i, -j));
                }
                if i != 0 && j != 0 {
                    out.push(SubPoint::new(-i, -j));
                }
            }
        }
        out
    }

    /// Expansion for a mask built with a `(0.5, 0.5)` center offset: the
    /// center sits between cells, so the mirror images shift by `-1` and
    /// every quadrant cell has four distinct images.
    pub fn points_offset(&self) -> Vec<SubPoint> {
        let mut out = Vec::new();
        for i in 0..self.side {
            for j in 0..self.side {
                if !self.cells[(i * self.side + j) as usize] {
                    continue;
                }
                out.push(SubPoint::new(i, j));
                out.push(SubPoint::new(-i - 1, j));
                out.push(SubPoint::new(i, -j - 1));
                out.push(SubPoint::new(-i - 1, -j - 1));
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// MaskCache
// ---------------------------------------------------------------------------

/// Append-only memoization of masks by their parameters.
///
/// Offsets are half-integers in practice, so offset keys store them in
/// half-units to stay hashable.
#[derive(Default)]
pub struct MaskCache {
    discs: HashMap<i32, Mask>,
    offset_discs: HashMap<(i32, i32, i32), Mask>,
    annuli: HashMap<(i32, i32), Mask>,
}

impl MaskCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Integer-centered disc of radius `r`.
    pub fn disc(&mut self, r: i32) -> &Mask {
        self.discs.entry(r).or_insert_with(|| Mask::disc(r))
    }

    /// Offset disc of radius `r`; `dx` and `dy` must be half-integers.
    pub fn disc_offset(&mut self, r: i32, dx: f32, dy: f32) -> &Mask {
        let key = (r, (dx * 2.0).round() as i32, (dy * 2.0).round() as i32);
        self.offset_discs
            .entry(key)
            .or_insert_with(|| Mask::disc_offset(r, dx, dy))
    }

    /// Annular band containing offsets at distance in `(min_r - 1, max_r]`.
    pub fn annulus(&mut self, min_r: i32, max_r: i32) -> &Mask {
        assert!(min_r >= 1 && max_r > min_r, "invalid annulus {min_r}..{max_r}");
        let key = (min_r, max_r);
        if !self.annuli.contains_key(&key) {
            let outer = self.disc(max_r).clone();
            let inner = self.disc(min_r - 1).clone();
            self.annuli.insert(key, outer.difference(&inner));
        }
        &self.annuli[&key]
    }
}
