//! The village: coarse occupancy grid and placed elements.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use ordered_float::OrderedFloat;
use siege_core::{CellPoint, CenterPoint, MaskCache, SubPoint};
use siege_paths::{GridBounds, WalkCost, Walkable};

use crate::element::{Element, ElementId, ElementKind};

/// Default coarse grid side length.
pub const DEFAULT_SIZE: i32 = 50;

type ChangeCallback = Box<dyn FnMut(CellPoint)>;

/// Rejected placement. The village is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// Part of the footprint falls outside the grid.
    OutOfBounds { cell: CellPoint },
    /// Part of the footprint overlaps an existing element.
    Occupied { cell: CellPoint },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { cell } => {
                write!(f, "footprint cell {cell} is outside the village")
            }
            Self::Occupied { cell } => write!(f, "footprint cell {cell} is already occupied"),
        }
    }
}

impl std::error::Error for BuildError {}

/// The world grid: owns every placed element and the coarse occupancy map.
///
/// Every cell covered by an element's footprint maps to that element's id;
/// footprints never overlap.
pub struct Village {
    width: i32,
    height: i32,
    grid: Vec<Option<ElementId>>,
    elements: BTreeMap<ElementId, Element>,
    next_id: ElementId,
    on_change: Option<ChangeCallback>,
}

impl Default for Village {
    fn default() -> Self {
        Self::new()
    }
}

impl Village {
    /// Create an empty village with the default dimensions.
    pub fn new() -> Self {
        Self::with_size(DEFAULT_SIZE, DEFAULT_SIZE)
    }

    /// Create an empty village with the given coarse dimensions.
    pub fn with_size(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "degenerate village {width}x{height}");
        Self {
            width,
            height,
            grid: vec![None; (width * height) as usize],
            elements: BTreeMap::new(),
            next_id: 1,
            on_change: None,
        }
    }

    /// Coarse grid width.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Coarse grid height.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether `p` lies inside the coarse grid.
    #[inline]
    pub fn contains(&self, p: CellPoint) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    #[inline]
    fn idx(&self, p: CellPoint) -> usize {
        (p.y * self.width + p.x) as usize
    }

    /// Register a callback invoked with every coarse cell whose occupancy
    /// changes. Display layers consume this; nothing here depends on it.
    pub fn set_on_change(&mut self, f: impl FnMut(CellPoint) + 'static) {
        self.on_change = Some(Box::new(f));
    }

    fn notify(&mut self, p: CellPoint) {
        if let Some(cb) = &mut self.on_change {
            cb(p);
        }
    }

    /// The element covering `p`, if any.
    pub fn element_at(&self, p: CellPoint) -> Option<&Element> {
        if !self.contains(p) {
            return None;
        }
        self.grid[self.idx(p)].and_then(|id| self.elements.get(&id))
    }

    /// Look up a placed element by id.
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Whether the coarse cell is inside the grid and unoccupied.
    #[inline]
    pub fn is_walkable_cell(&self, p: CellPoint) -> bool {
        self.contains(p) && self.grid[self.idx(p)].is_none()
    }

    /// Place an element. On error the village is unchanged.
    pub fn build(&mut self, origin: CellPoint, kind: ElementKind) -> Result<ElementId, BuildError> {
        for cell in kind.footprint(origin) {
            if !self.contains(cell) {
                return Err(BuildError::OutOfBounds { cell });
            }
            if self.grid[self.idx(cell)].is_some() {
                return Err(BuildError::Occupied { cell });
            }
        }
        let id = self.next_id;
        self.next_id += 1;
        for cell in kind.footprint(origin) {
            let i = self.idx(cell);
            self.grid[i] = Some(id);
            self.notify(cell);
        }
        self.elements.insert(id, Element { id, kind, origin });
        Ok(id)
    }

    /// Remove an element, clearing its footprint. Returns the removed
    /// element, or `None` for an unknown id.
    pub fn destroy(&mut self, id: ElementId) -> Option<Element> {
        let elem = self.elements.remove(&id)?;
        for cell in elem.kind.footprint(elem.origin) {
            let i = self.idx(cell);
            self.grid[i] = None;
            self.notify(cell);
        }
        Some(elem)
    }

    /// All placed elements, in placement order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// All targetable facilities, in placement order.
    pub fn facilities(&self) -> impl Iterator<Item = &Element> {
        self.elements.values().filter(|e| e.kind.targetable())
    }

    /// Rank facilities by squared center distance from `from` and keep the
    /// `k` smallest distinct distance values, ties included.
    ///
    /// A facility's distance is the minimum over its footprint cell centers.
    /// Distance buckets holding more than one facility are reported as a
    /// diagnostic; callers break the tie by iteration order.
    pub fn nearest_facilities(&self, from: CenterPoint, k: usize) -> Vec<&Element> {
        let mut buckets: BTreeMap<OrderedFloat<f32>, Vec<&Element>> = BTreeMap::new();
        for facility in self.facilities() {
            let d = facility
                .cells()
                .map(|c| OrderedFloat(c.center().sqr_distance(from)))
                .min()
                .unwrap_or(OrderedFloat(f32::INFINITY));
            buckets.entry(d).or_default().push(facility);
            if buckets.len() > k {
                buckets.pop_last();
            }
        }
        for (d, group) in &buckets {
            if group.len() >= 2 {
                log::debug!(
                    "{} facilities tied at squared distance {d}; ranking keeps all of them",
                    group.len()
                );
            }
        }
        buckets.into_values().flatten().collect()
    }

    /// Fine cells from which an attacker with the given range (in fine
    /// cells) reaches the element: the union of the offset range mask
    /// anchored at each footprint cell's fine center.
    ///
    /// Cells outside the grid are included; callers intersect with the
    /// reachable area.
    pub fn attack_cells(
        &self,
        masks: &mut MaskCache,
        id: ElementId,
        range: i32,
    ) -> Vec<SubPoint> {
        let Some(elem) = self.elements.get(&id) else {
            return Vec::new();
        };
        let offsets = masks.disc_offset(range, 0.5, 0.5).points_offset();
        let mut seen: HashSet<SubPoint> = HashSet::new();
        let mut out = Vec::new();
        for cell in elem.kind.footprint(elem.origin) {
            let anchor = SubPoint::new(cell.x * 2 + 1, cell.y * 2 + 1);
            for &d in &offsets {
                let p = anchor + d;
                if seen.insert(p) {
                    out.push(p);
                }
            }
        }
        out
    }

    /// Fine-grid adapter for the search engines.
    pub fn detail_view(&self) -> DetailView<'_> {
        DetailView { village: self }
    }

    /// Capture the persistent layout of this village.
    pub fn layout(&self) -> VillageLayout {
        VillageLayout {
            width: self.width,
            height: self.height,
            elements: self
                .elements
                .values()
                .map(|e| (e.origin, e.kind))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// DetailView
// ---------------------------------------------------------------------------

/// Fine-resolution view of the village, as seen by the search engines.
///
/// Each coarse cell maps to four fine cells sharing its walkability.
pub struct DetailView<'a> {
    village: &'a Village,
}

impl GridBounds for DetailView<'_> {
    fn width(&self) -> i32 {
        self.village.width * 2
    }

    fn height(&self) -> i32 {
        self.village.height * 2
    }
}

impl WalkCost for DetailView<'_> {
    fn walk_cost(&self, p: SubPoint) -> i32 {
        // Negative fine coordinates truncate toward zero under division, so
        // the fine bounds check must come before the coarse lookup.
        if !self.contains(p) {
            return 0;
        }
        if self.village.is_walkable_cell(p.cell()) { 1 } else { 0 }
    }
}

impl Walkable for DetailView<'_> {
    fn is_walkable(&self, p: SubPoint) -> bool {
        self.walk_cost(p) != 0
    }
}

// ---------------------------------------------------------------------------
// VillageLayout
// ---------------------------------------------------------------------------

/// Persistent snapshot of a village: dimensions and placed footprints.
///
/// Search and connectivity state is absent; it is always rebuilt from the
/// occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VillageLayout {
    pub width: i32,
    pub height: i32,
    pub elements: Vec<(CellPoint, ElementKind)>,
}

impl VillageLayout {
    /// Rebuild a village from the layout. Entries whose footprints no
    /// longer fit are skipped with a warning rather than failing the whole
    /// restore.
    pub fn restore(&self) -> Village {
        let mut village = Village::with_size(self.width, self.height);
        for &(origin, kind) in &self.elements {
            if let Err(err) = village.build(origin, kind) {
                log::warn!("skipping stored element at {origin}: {err}");
            }
        }
        village
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn c(x: i32, y: i32) -> CellPoint {
        CellPoint::new(x, y)
    }

    #[test]
    fn build_covers_footprint() {
        let mut v = Village::with_size(10, 10);
        let id = v.build(c(2, 3), ElementKind::Facility3x3).unwrap();
        for cell in ElementKind::Facility3x3.footprint(c(2, 3)) {
            assert_eq!(v.element_at(cell).map(|e| e.id), Some(id));
            assert!(!v.is_walkable_cell(cell));
        }
        assert!(v.is_walkable_cell(c(1, 3)));
        assert!(v.is_walkable_cell(c(5, 3)));
    }

    #[test]
    fn overlap_is_rejected_without_state_change() {
        let mut v = Village::with_size(10, 10);
        v.build(c(2, 2), ElementKind::Facility2x2).unwrap();
        let err = v.build(c(3, 3), ElementKind::Facility2x2).unwrap_err();
        assert!(matches!(err, BuildError::Occupied { cell } if cell == c(3, 3)));
        // The rejected footprint's free cells stay free.
        assert!(v.is_walkable_cell(c(4, 3)));
        assert!(v.is_walkable_cell(c(4, 4)));
        assert_eq!(v.elements().count(), 1);
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let mut v = Village::with_size(10, 10);
        let err = v.build(c(8, 8), ElementKind::Facility3x3).unwrap_err();
        assert!(matches!(err, BuildError::OutOfBounds { .. }));
        let err = v.build(c(-1, 0), ElementKind::Wall).unwrap_err();
        assert!(matches!(err, BuildError::OutOfBounds { .. }));
        assert_eq!(v.elements().count(), 0);
    }

    #[test]
    fn destroy_clears_footprint() {
        let mut v = Village::with_size(10, 10);
        let id = v.build(c(4, 4), ElementKind::Facility2x2).unwrap();
        let elem = v.destroy(id).unwrap();
        assert_eq!(elem.id, id);
        for cell in elem.cells() {
            assert!(v.is_walkable_cell(cell));
        }
        assert!(v.destroy(id).is_none());
    }

    #[test]
    fn change_callback_sees_every_cell() {
        let mut v = Village::with_size(10, 10);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        v.set_on_change(move |p| sink.borrow_mut().push(p));

        let id = v.build(c(1, 1), ElementKind::Facility2x2).unwrap();
        assert_eq!(seen.borrow().len(), 4);
        v.destroy(id);
        assert_eq!(seen.borrow().len(), 8);
        for cell in ElementKind::Facility2x2.footprint(c(1, 1)) {
            assert!(seen.borrow().contains(&cell));
        }
    }

    #[test]
    fn walls_block_but_are_not_targets() {
        let mut v = Village::with_size(10, 10);
        v.build(c(5, 5), ElementKind::Wall).unwrap();
        v.build(c(0, 0), ElementKind::Facility2x2).unwrap();
        assert_eq!(v.elements().count(), 2);
        assert_eq!(v.facilities().count(), 1);
        assert!(!v.is_walkable_cell(c(5, 5)));
    }

    #[test]
    fn nearest_facilities_ranks_by_center_distance() {
        let mut v = Village::with_size(30, 30);
        let far = v.build(c(20, 20), ElementKind::Facility2x2).unwrap();
        let near = v.build(c(2, 2), ElementKind::Facility2x2).unwrap();
        let mid = v.build(c(10, 2), ElementKind::Facility2x2).unwrap();

        let ranked = v.nearest_facilities(CenterPoint::new(0.5, 0.5), 3);
        let ids: Vec<ElementId> = ranked.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![near, mid, far]);

        // k = 2 drops the farthest distance value.
        let ranked = v.nearest_facilities(CenterPoint::new(0.5, 0.5), 2);
        let ids: Vec<ElementId> = ranked.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![near, mid]);
    }

    #[test]
    fn nearest_facilities_keeps_distance_ties() {
        let mut v = Village::with_size(40, 40);
        // Two facilities mirrored across the query point share a distance.
        let a = v.build(c(10, 0), ElementKind::Facility2x2).unwrap();
        let b = v.build(c(0, 10), ElementKind::Facility2x2).unwrap();
        let far = v.build(c(30, 30), ElementKind::Facility2x2).unwrap();

        let ranked = v.nearest_facilities(CenterPoint::new(0.5, 0.5), 1);
        let ids: Vec<ElementId> = ranked.iter().map(|e| e.id).collect();
        // One distance value kept, both tied facilities included.
        assert_eq!(ids, vec![a, b]);
        assert!(!ids.contains(&far));
    }

    #[test]
    fn attack_cells_surround_the_footprint() {
        let mut v = Village::with_size(30, 30);
        let id = v.build(c(10, 10), ElementKind::Facility2x2).unwrap();
        let mut masks = MaskCache::new();
        let cells = v.attack_cells(&mut masks, id, 4);
        assert!(!cells.is_empty());
        // No duplicates.
        let unique: HashSet<SubPoint> = cells.iter().copied().collect();
        assert_eq!(unique.len(), cells.len());
        // Every cell is within `range` of some footprint cell's fine
        // center, measured with the offset predicate.
        for p in &cells {
            let ok = ElementKind::Facility2x2.footprint(c(10, 10)).any(|fc| {
                let anchor = SubPoint::new(fc.x * 2 + 1, fc.y * 2 + 1);
                let dx = (p.x - anchor.x) as f32 + 0.5;
                let dy = (p.y - anchor.y) as f32 + 0.5;
                dx * dx + dy * dy <= 16.0
            });
            assert!(ok, "cell {p} outside every anchor disc");
        }
    }

    #[test]
    fn detail_view_tracks_coarse_walkability() {
        let mut v = Village::with_size(10, 10);
        v.build(c(3, 3), ElementKind::Wall).unwrap();
        let view = v.detail_view();
        assert_eq!(view.width(), 20);
        assert_eq!(view.height(), 20);
        for s in c(3, 3).subcells() {
            assert_eq!(view.walk_cost(s), 0);
            assert!(!view.is_walkable(s));
        }
        for s in c(2, 3).subcells() {
            assert_eq!(view.walk_cost(s), 1);
        }
        // Outside the grid is impassable.
        assert!(!view.is_walkable(SubPoint::new(-1, 0)));
        assert!(!view.is_walkable(SubPoint::new(0, 20)));
    }

    #[test]
    fn layout_round_trip() {
        let mut v = Village::with_size(20, 20);
        v.build(c(1, 1), ElementKind::Wall).unwrap();
        v.build(c(5, 5), ElementKind::Facility3x3).unwrap();
        let layout = v.layout();
        let restored = layout.restore();
        assert_eq!(restored.layout(), layout);
        assert_eq!(restored.elements().count(), 2);
        assert_eq!(restored.facilities().count(), 1);
    }

    #[test]
    fn layout_restore_skips_broken_entries() {
        let layout = VillageLayout {
            width: 10,
            height: 10,
            elements: vec![
                (c(0, 0), ElementKind::Facility3x3),
                // Overlaps the first entry.
                (c(1, 1), ElementKind::Facility2x2),
                // Out of bounds.
                (c(9, 9), ElementKind::Facility2x2),
            ],
        };
        let v = layout.restore();
        assert_eq!(v.elements().count(), 1);
    }
}
