//! Bounded A* over the fine grid.

use siege_core::SubPoint;

use crate::bucket::BucketQueue;
use crate::traits::WalkCost;

/// Cost of an orthogonal step.
pub const ORTHO_COST: i32 = 5;
/// Cost of a diagonal step.
pub const DIAG_COST: i32 = 7;

/// Sentinel index meaning "no parent".
const NO_PARENT: usize = usize::MAX;

/// A found path: the fine cells from the step after the start through the
/// goal, plus the exact integer cost of walking them.
///
/// When start and goal coincide, `steps` is empty and `cost` is 0.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub steps: Vec<SubPoint>,
    pub cost: i32,
}

/// Reusable A* search state.
///
/// Owns the per-cell tables (open/closed flags, best f-score, parent
/// indices) and the bucket queue. Every call to [`route`](Self::route)
/// clears them, so one `PathField` serves any number of sequential queries.
/// Queries against a grid of different dimensions resize the tables.
pub struct PathField {
    width: i32,
    height: i32,
    open: Vec<bool>,
    closed: Vec<bool>,
    fscore: Vec<i32>,
    parent: Vec<usize>,
    queue: BucketQueue,
}

/// Octile heuristic matched to the 5/7 step costs: with `dx`, `dy` the
/// absolute coordinate deltas to the goal, the estimate is
/// `5 * max(dx, dy) + 2 * min(dx, dy)`.
#[inline]
fn heuristic(p: SubPoint, goal: SubPoint) -> i32 {
    let dx = (goal.x - p.x).abs();
    let dy = (goal.y - p.y).abs();
    if dx > dy {
        dx * 5 + dy * 2
    } else {
        dy * 5 + dx * 2
    }
}

impl PathField {
    /// Create a field for a `width` × `height` fine grid.
    pub fn new(width: i32, height: i32) -> Self {
        let len = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width,
            height,
            open: vec![false; len],
            closed: vec![false; len],
            fscore: vec![0; len],
            parent: vec![NO_PARENT; len],
            queue: BucketQueue::new(),
        }
    }

    /// Shortest route from `start` to `goal`, unbounded.
    pub fn route<G: WalkCost>(&mut self, grid: &G, start: SubPoint, goal: SubPoint) -> Option<Route> {
        self.route_bounded(grid, start, goal, i32::MAX)
    }

    /// Shortest route from `start` to `goal` with every frontier entry
    /// capped at `limit` total estimated cost.
    ///
    /// `None` is the normal "no path" outcome: the open queue drained, or
    /// every remaining frontier entry exceeded `limit`. Out-of-bounds
    /// endpoints are caller errors.
    pub fn route_bounded<G: WalkCost>(
        &mut self,
        grid: &G,
        start: SubPoint,
        goal: SubPoint,
        limit: i32,
    ) -> Option<Route> {
        self.reset(grid);
        assert!(grid.contains(start), "start {start} out of bounds");
        assert!(grid.contains(goal), "goal {goal} out of bounds");

        let si = self.idx(start);
        let h0 = heuristic(start, goal);
        self.fscore[si] = h0;
        self.open[si] = true;
        self.queue.push(h0, start);

        while let Some((f, n)) = self.queue.pop() {
            let ni = self.idx(n);
            self.open[ni] = false;
            self.closed[ni] = true;
            if n == goal {
                return Some(self.rebuild(start, goal, f));
            }
            let g = f - heuristic(n, goal);

            let (x, y) = (n.x, n.y);
            if y != 0 {
                if x != 0 {
                    self.step(grid, ni, SubPoint::new(x - 1, y - 1), DIAG_COST, g, goal, limit);
                }
                self.step(grid, ni, SubPoint::new(x, y - 1), ORTHO_COST, g, goal, limit);
                if x != self.width - 1 {
                    self.step(grid, ni, SubPoint::new(x + 1, y - 1), DIAG_COST, g, goal, limit);
                }
            }
            if x != 0 {
                self.step(grid, ni, SubPoint::new(x - 1, y), ORTHO_COST, g, goal, limit);
            }
            if x != self.width - 1 {
                self.step(grid, ni, SubPoint::new(x + 1, y), ORTHO_COST, g, goal, limit);
            }
            if y != self.height - 1 {
                if x != 0 {
                    self.step(grid, ni, SubPoint::new(x - 1, y + 1), DIAG_COST, g, goal, limit);
                }
                self.step(grid, ni, SubPoint::new(x, y + 1), ORTHO_COST, g, goal, limit);
                if x != self.width - 1 {
                    self.step(grid, ni, SubPoint::new(x + 1, y + 1), DIAG_COST, g, goal, limit);
                }
            }
        }

        None
    }

    /// Relax the edge from the node at `ni` to neighbour `m`.
    fn step<G: WalkCost>(
        &mut self,
        grid: &G,
        ni: usize,
        m: SubPoint,
        step_cost: i32,
        g: i32,
        goal: SubPoint,
        limit: i32,
    ) {
        if grid.walk_cost(m) == 0 {
            return;
        }
        let f = g + heuristic(m, goal) + step_cost;
        if f > limit {
            return;
        }
        let mi = self.idx(m);
        if !self.open[mi] && !self.closed[mi] {
            self.queue.push(f, m);
            self.fscore[mi] = f;
            self.open[mi] = true;
            self.parent[mi] = ni;
        } else if self.open[mi] {
            if f < self.fscore[mi] {
                self.queue.reschedule(self.fscore[mi], f, m);
                self.fscore[mi] = f;
                self.parent[mi] = ni;
            }
        } else if f < self.fscore[mi] {
            // A cheaper way into a closed cell: reopen it.
            self.queue.push(f, m);
            self.fscore[mi] = f;
            self.open[mi] = true;
            self.closed[mi] = false;
            self.parent[mi] = ni;
        }
    }

    /// Walk parent indices back from the goal. The start cell carries the
    /// explicit no-parent sentinel and is excluded from the steps.
    fn rebuild(&self, start: SubPoint, goal: SubPoint, cost: i32) -> Route {
        let si = self.idx(start);
        let mut steps = Vec::new();
        let mut ci = self.idx(goal);
        while ci != si {
            debug_assert_ne!(ci, NO_PARENT);
            steps.push(self.point(ci));
            ci = self.parent[ci];
        }
        steps.reverse();
        Route { steps, cost }
    }

    /// Clear per-cell tables and the queue, resizing on dimension change.
    fn reset<G: WalkCost>(&mut self, grid: &G) {
        let (w, h) = (grid.width(), grid.height());
        if w != self.width || h != self.height {
            let len = (w.max(0) as usize) * (h.max(0) as usize);
            self.width = w;
            self.height = h;
            self.open.clear();
            self.open.resize(len, false);
            self.closed.clear();
            self.closed.resize(len, false);
            self.fscore.clear();
            self.fscore.resize(len, 0);
            self.parent.clear();
            self.parent.resize(len, NO_PARENT);
        } else {
            self.open.fill(false);
            self.closed.fill(false);
            self.fscore.fill(0);
            self.parent.fill(NO_PARENT);
        }
        self.queue.clear();
    }

    #[inline]
    fn idx(&self, p: SubPoint) -> usize {
        (p.y * self.width + p.x) as usize
    }

    #[inline]
    fn point(&self, idx: usize) -> SubPoint {
        let w = self.width as usize;
        SubPoint::new((idx % w) as i32, (idx / w) as i32)
    }
}
