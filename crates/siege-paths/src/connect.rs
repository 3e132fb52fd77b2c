//! Connectivity labelling over the fine grid.

use siege_core::SubPoint;

use crate::traits::Walkable;

/// Component id of unwalkable cells.
pub const NO_COMPONENT: u32 = 0;

/// A snapshot partition of the grid's walkable cells into 4-connected
/// components.
///
/// Built once from the grid's current walkability; any grid mutation
/// invalidates it and callers rebuild before the next query. There is no
/// incremental repair.
pub struct ConnectivityMap {
    width: i32,
    height: i32,
    labels: Vec<u32>,
    components: u32,
}

impl ConnectivityMap {
    /// Label every walkable cell, flooding from each unlabelled walkable
    /// cell in raster order with an explicit stack.
    pub fn build<G: Walkable>(grid: &G) -> Self {
        let width = grid.width();
        let height = grid.height();
        let len = (width.max(0) as usize) * (height.max(0) as usize);
        let mut map = Self {
            width,
            height,
            labels: vec![NO_COMPONENT; len],
            components: 0,
        };

        let mut stack: Vec<SubPoint> = Vec::new();
        let mut next = 1u32;
        for y in 0..height {
            for x in 0..width {
                let seed = SubPoint::new(x, y);
                let si = map.idx(seed);
                if map.labels[si] != NO_COMPONENT || !grid.is_walkable(seed) {
                    continue;
                }
                map.labels[si] = next;
                stack.push(seed);
                while let Some(c) = stack.pop() {
                    for n in c.neighbors_4() {
                        if !grid.contains(n) {
                            continue;
                        }
                        let ni = map.idx(n);
                        if map.labels[ni] == NO_COMPONENT && grid.is_walkable(n) {
                            map.labels[ni] = next;
                            stack.push(n);
                        }
                    }
                }
                next += 1;
            }
        }
        map.components = next - 1;
        map
    }

    /// Number of components found.
    #[inline]
    pub fn component_count(&self) -> u32 {
        self.components
    }

    /// Component id of `p`; [`NO_COMPONENT`] for unwalkable cells.
    #[inline]
    pub fn component(&self, p: SubPoint) -> u32 {
        assert!(self.in_bounds(p), "point {p} out of bounds");
        self.labels[self.idx(p)]
    }

    /// Whether `a` and `b` sit in the same walkable component. O(1).
    #[inline]
    pub fn is_reachable(&self, a: SubPoint, b: SubPoint) -> bool {
        let la = self.component(a);
        la != NO_COMPONENT && la == self.component(b)
    }

    /// All cells of the component containing `p`, in raster order; empty
    /// when `p` is unwalkable. O(area).
    pub fn cells_in_component(&self, p: SubPoint) -> Vec<SubPoint> {
        let label = self.component(p);
        if label == NO_COMPONENT {
            return Vec::new();
        }
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.labels[(y * self.width + x) as usize] == label {
                    out.push(SubPoint::new(x, y));
                }
            }
        }
        out
    }

    #[inline]
    fn in_bounds(&self, p: SubPoint) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    #[inline]
    fn idx(&self, p: SubPoint) -> usize {
        (p.y * self.width + p.x) as usize
    }
}
