//! The per-tick pursuit loop.

use std::collections::{HashSet, VecDeque};

use siege_core::{MaskCache, SubPoint};
use siege_paths::{ConnectivityMap, PathField, Route};

use crate::element::ElementId;
use crate::village::Village;

/// Attack range in fine cells (5 coarse cells).
pub const ATTACK_RANGE: i32 = 10;

/// Distinct nearest-target distances considered per replan.
const CANDIDATES: usize = 3;

/// Ceiling on route cost during candidate evaluation. Far above any real
/// route on the default grid, but finite so searches against distant decoys
/// stay bounded.
const COST_LIMIT: i32 = 20_000;

/// Result of one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// The raider's position after the tick.
    pub pos: SubPoint,
    /// The facility destroyed this tick, if any.
    pub destroyed: Option<ElementId>,
}

/// Drives a single raider through the village, one step per tick.
///
/// The raider either pursues a chosen facility along a planned route or,
/// with no live route, resolves its attack and replans: rank the nearest
/// facilities, keep those with an attack cell reachable from here, search a
/// route to every such cell, and adopt the globally cheapest.
pub struct Simulator {
    village: Village,
    pos: SubPoint,
    path: VecDeque<SubPoint>,
    target: Option<ElementId>,
    field: PathField,
    masks: MaskCache,
}

impl Simulator {
    /// Create a simulator over `village` with the raider at fine position
    /// `start`.
    pub fn new(village: Village, start: SubPoint) -> Self {
        let (fw, fh) = (village.width() * 2, village.height() * 2);
        assert!(
            start.x >= 0 && start.x < fw && start.y >= 0 && start.y < fh,
            "start {start} outside the fine grid"
        );
        Self {
            field: PathField::new(fw, fh),
            masks: MaskCache::new(),
            path: VecDeque::new(),
            target: None,
            village,
            pos: start,
        }
    }

    /// The village being raided.
    pub fn village(&self) -> &Village {
        &self.village
    }

    /// Mutable access for external build/destroy between ticks. The next
    /// replan rebuilds its connectivity snapshot from the mutated grid.
    pub fn village_mut(&mut self) -> &mut Village {
        &mut self.village
    }

    /// The raider's current fine position.
    pub fn pos(&self) -> SubPoint {
        self.pos
    }

    /// The facility currently being pursued.
    pub fn target(&self) -> Option<ElementId> {
        self.target
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self) -> Tick {
        // A target removed under us (external destroy) voids the plan.
        if let Some(id) = self.target {
            if self.village.element(id).is_none() {
                self.target = None;
                self.path.clear();
            }
        }

        if let Some(step) = self.path.pop_front() {
            self.pos = step;
            return Tick {
                pos: self.pos,
                destroyed: None,
            };
        }

        // Route exhausted: the held target has been reached and is attacked.
        let destroyed = self
            .target
            .take()
            .and_then(|id| self.village.destroy(id))
            .map(|e| e.id);

        if let Some((id, route)) = self.plan() {
            self.target = Some(id);
            self.path = route.steps.into();
            if let Some(step) = self.path.pop_front() {
                self.pos = step;
            }
        }
        // No plan: hold position; the world may change before the next tick.

        Tick {
            pos: self.pos,
            destroyed,
        }
    }

    /// Pick the cheapest route to an attack cell of one of the nearest
    /// facilities, or `None` when no candidate is attackable from here.
    fn plan(&mut self) -> Option<(ElementId, Route)> {
        let view = self.village.detail_view();
        let connectivity = ConnectivityMap::build(&view);
        let reachable: HashSet<SubPoint> = connectivity
            .cells_in_component(self.pos)
            .into_iter()
            .collect();
        if reachable.is_empty() {
            return None;
        }

        let candidates = self.village.nearest_facilities(self.pos.center(), CANDIDATES);
        let ids: Vec<ElementId> = candidates.iter().map(|f| f.id).collect();

        let mut best: Option<(ElementId, Route)> = None;
        for id in ids {
            let goals = self.village.attack_cells(&mut self.masks, id, ATTACK_RANGE);
            for goal in goals {
                if !reachable.contains(&goal) {
                    continue;
                }
                let Some(route) = self.field.route_bounded(&view, self.pos, goal, COST_LIMIT)
                else {
                    continue;
                };
                match &best {
                    Some((_, b)) if route.cost > b.cost => {}
                    Some((_, b)) if route.cost == b.cost => {
                        log::debug!(
                            "route to {goal} ties the current best at cost {}; keeping the first",
                            b.cost
                        );
                    }
                    _ => best = Some((id, route)),
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use siege_core::CellPoint;

    fn c(x: i32, y: i32) -> CellPoint {
        CellPoint::new(x, y)
    }

    fn s(x: i32, y: i32) -> SubPoint {
        SubPoint::new(x, y)
    }

    #[test]
    fn pursuit_takes_exactly_the_optimal_tick_count() {
        // Single 2x2 facility on an empty 20x20 village; fine anchors at
        // (21, 21) etc. The cheapest attack cell from (0, 0) costs 96:
        // 13 diagonal steps plus one orthogonal, 14 steps total.
        let mut village = Village::with_size(20, 20);
        let id = village.build(c(10, 10), ElementKind::Facility2x2).unwrap();
        let mut sim = Simulator::new(village, s(0, 0));

        for tick_no in 1..=14 {
            let tick = sim.tick();
            assert_eq!(tick.destroyed, None, "destroyed early at tick {tick_no}");
        }
        assert_eq!(sim.target(), Some(id));
        // In range now; the attack resolves one tick after the route ends.
        let tick = sim.tick();
        assert_eq!(tick.destroyed, Some(id));
        assert_eq!(sim.village().facilities().count(), 0);

        // Nothing left: the raider holds.
        let rest = sim.tick();
        assert_eq!(rest.destroyed, None);
        assert_eq!(rest.pos, tick.pos);
    }

    #[test]
    fn already_in_range_destroys_one_tick_later() {
        let mut village = Village::with_size(20, 20);
        let id = village.build(c(2, 2), ElementKind::Facility2x2).unwrap();
        // A free cell well inside the facility's attack range: the plan is
        // an empty route of cost zero.
        let mut sim = Simulator::new(village, s(10, 5));

        let first = sim.tick();
        assert_eq!(first.destroyed, None);
        assert_eq!(first.pos, s(10, 5));
        assert_eq!(sim.target(), Some(id));

        let second = sim.tick();
        assert_eq!(second.destroyed, Some(id));
        assert_eq!(second.pos, s(10, 5));
    }

    #[test]
    fn unreachable_target_means_holding_position() {
        // A wall line splits the village; the facility sits deep enough in
        // the far half that no attack cell crosses into the near component.
        let mut village = Village::with_size(20, 20);
        for x in 0..20 {
            village.build(c(x, 5), ElementKind::Wall).unwrap();
        }
        village.build(c(12, 12), ElementKind::Facility2x2).unwrap();
        let mut sim = Simulator::new(village, s(0, 0));

        for _ in 0..5 {
            let tick = sim.tick();
            assert_eq!(tick.pos, s(0, 0));
            assert_eq!(tick.destroyed, None);
        }
        assert_eq!(sim.target(), None);
        assert_eq!(sim.village().facilities().count(), 1);
    }

    #[test]
    fn clears_facilities_nearest_first() {
        let mut village = Village::with_size(30, 30);
        let far = village.build(c(20, 20), ElementKind::Facility2x2).unwrap();
        let near = village.build(c(5, 5), ElementKind::Facility2x2).unwrap();
        let mut sim = Simulator::new(village, s(0, 0));

        let mut destroyed = Vec::new();
        for _ in 0..500 {
            if let Some(id) = sim.tick().destroyed {
                destroyed.push(id);
            }
            if sim.village().facilities().count() == 0 {
                break;
            }
        }
        assert_eq!(destroyed, vec![near, far]);
    }

    #[test]
    fn externally_destroyed_target_forces_a_replan() {
        let mut village = Village::with_size(30, 30);
        let near = village.build(c(5, 5), ElementKind::Facility2x2).unwrap();
        let far = village.build(c(20, 20), ElementKind::Facility2x2).unwrap();
        let mut sim = Simulator::new(village, s(0, 0));

        sim.tick();
        assert_eq!(sim.target(), Some(near));

        // The pursued facility vanishes between ticks.
        sim.village_mut().destroy(near);
        let tick = sim.tick();
        // The simulator did not attack it, so nothing is reported.
        assert_eq!(tick.destroyed, None);
        assert_eq!(sim.target(), Some(far));

        let mut destroyed = Vec::new();
        for _ in 0..500 {
            if let Some(id) = sim.tick().destroyed {
                destroyed.push(id);
            }
            if sim.village().facilities().count() == 0 {
                break;
            }
        }
        assert_eq!(destroyed, vec![far]);
    }

    #[test]
    fn only_the_nearest_candidates_are_considered() {
        // Three facilities in a sealed pocket rank nearest; a reachable one
        // ranks fourth. With the candidate list capped at three distances,
        // the raider holds instead of walking to the reachable facility.
        let mut village = Village::with_size(50, 50);
        for x in 0..=14 {
            village.build(c(x, 14), ElementKind::Wall).unwrap();
        }
        for y in 0..14 {
            village.build(c(14, y), ElementKind::Wall).unwrap();
        }
        // Deep enough in the pocket that no attack cell crosses the wall:
        // the farthest mask offset is 9 fine cells, and the wall sits at
        // fine x/y 28.
        village.build(c(3, 3), ElementKind::Facility2x2).unwrap();
        village.build(c(7, 3), ElementKind::Facility2x2).unwrap();
        village.build(c(3, 7), ElementKind::Facility2x2).unwrap();
        let open = village.build(c(30, 6), ElementKind::Facility2x2).unwrap();

        let mut sim = Simulator::new(village, s(32, 12));
        for _ in 0..5 {
            let tick = sim.tick();
            assert_eq!(tick.pos, s(32, 12));
            assert_eq!(tick.destroyed, None);
        }
        assert!(sim.village().element(open).is_some());
        assert_eq!(sim.village().facilities().count(), 4);
    }

    #[test]
    fn route_steps_stay_walkable_and_adjacent() {
        let mut village = Village::with_size(20, 20);
        for y in 2..18 {
            village.build(c(8, y), ElementKind::Wall).unwrap();
        }
        village.build(c(14, 10), ElementKind::Facility3x3).unwrap();
        let mut sim = Simulator::new(village, s(0, 20));

        let mut prev = sim.pos();
        for _ in 0..400 {
            let tick = sim.tick();
            let d = tick.pos - prev;
            assert!(d.x.abs() <= 1 && d.y.abs() <= 1, "jump from {prev} to {}", tick.pos);
            let cell = tick.pos.cell();
            assert!(
                sim.village().element_at(cell).is_none(),
                "raider standing inside an element at {cell}"
            );
            prev = tick.pos;
            if tick.destroyed.is_some() {
                return;
            }
        }
        panic!("facility never destroyed");
    }
}
