//! ASCII demo: a raider clearing a randomly generated village.

use raider::scenario::random_village;
use raider::{ElementKind, Simulator};
use siege_core::{CellPoint, SubPoint};

const MAX_TICKS: usize = 4000;

fn main() {
    let village = random_village(7, 60, 8);
    let mut sim = Simulator::new(village, SubPoint::new(0, 0));

    println!("initial village:");
    print_village(&sim);

    let mut held_for = 0;
    for tick_no in 1..=MAX_TICKS {
        let before = sim.pos();
        let tick = sim.tick();
        held_for = if tick.pos == before && tick.destroyed.is_none() {
            held_for + 1
        } else {
            0
        };

        if let Some(id) = tick.destroyed {
            println!("tick {tick_no}: facility {id} destroyed at {}", tick.pos);
        }
        if sim.village().facilities().count() == 0 {
            println!("village cleared in {tick_no} ticks");
            print_village(&sim);
            return;
        }
        if held_for > 3 {
            println!("tick {tick_no}: no facility is attackable from {}", tick.pos);
            print_village(&sim);
            return;
        }
    }
    println!("tick budget exhausted");
    print_village(&sim);
}

fn print_village(sim: &Simulator) {
    let village = sim.village();
    let raider_cell = sim.pos().cell();
    for y in 0..village.height() {
        let mut row = String::with_capacity(village.width() as usize);
        for x in 0..village.width() {
            let cell = CellPoint::new(x, y);
            row.push(if cell == raider_cell {
                '@'
            } else {
                glyph(village.element_at(cell).map(|e| e.kind))
            });
        }
        println!("{row}");
    }
}

fn glyph(kind: Option<ElementKind>) -> char {
    match kind {
        None => '.',
        Some(ElementKind::Wall) => '#',
        Some(ElementKind::Facility2x2) => '2',
        Some(ElementKind::Facility3x3) => '3',
        Some(ElementKind::Facility4x4) => '4',
        Some(ElementKind::Facility5x5) => '5',
    }
}
