use siege_core::SubPoint;

/// Rectangular fine-grid bounds shared by the search engines.
pub trait GridBounds {
    /// Grid width in fine cells.
    fn width(&self) -> i32;
    /// Grid height in fine cells.
    fn height(&self) -> i32;

    /// Whether `p` lies inside the grid.
    #[inline]
    fn contains(&self, p: SubPoint) -> bool {
        p.x >= 0 && p.x < self.width() && p.y >= 0 && p.y < self.height()
    }
}

/// Grid queried by the A* search.
///
/// A cost of `0` marks an impassable cell; any positive value is walkable.
/// The magnitude only gates passability — step costs are the fixed
/// orthogonal/diagonal scheme, not scaled by cell cost.
pub trait WalkCost: GridBounds {
    fn walk_cost(&self, p: SubPoint) -> i32;
}

/// Grid queried by connectivity labelling.
pub trait Walkable: GridBounds {
    fn is_walkable(&self, p: SubPoint) -> bool;
}
