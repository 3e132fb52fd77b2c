//! Random demo layouts.

use rand::RngExt;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use siege_core::CellPoint;

use crate::element::ElementKind;
use crate::village::Village;

/// Facility kinds the generator draws from.
const FACILITY_KINDS: [ElementKind; 4] = [
    ElementKind::Facility2x2,
    ElementKind::Facility3x3,
    ElementKind::Facility4x4,
    ElementKind::Facility5x5,
];

/// Generate a village with randomly scattered walls and facilities.
///
/// Placements that collide are simply retried; the top-left corner is kept
/// clear so a raider can start there.
pub fn random_village(seed: u64, walls: usize, facilities: usize) -> Village {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut village = Village::new();

    scatter(&mut rng, &mut village, facilities, |rng| {
        FACILITY_KINDS[rng.random_range(0..FACILITY_KINDS.len())]
    });
    scatter(&mut rng, &mut village, walls, |_| ElementKind::Wall);

    village
}

fn scatter(
    rng: &mut SmallRng,
    village: &mut Village,
    count: usize,
    mut pick: impl FnMut(&mut SmallRng) -> ElementKind,
) {
    let mut placed = 0;
    let mut attempts = 0;
    while placed < count && attempts < count * 50 {
        attempts += 1;
        let kind = pick(rng);
        let origin = CellPoint::new(
            rng.random_range(1..village.width() - kind.size()),
            rng.random_range(1..village.height() - kind.size()),
        );
        if village.build(origin, kind).is_ok() {
            placed += 1;
        }
    }
}
