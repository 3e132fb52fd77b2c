//! Grid elements: walls and targetable facilities.

use siege_core::{CellPoint, CenterPoint, SubPoint};

/// Identifier of a placed element, unique within one village.
pub type ElementId = u32;

/// The kind of a placed element. Footprint size and targetability are fixed
/// per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementKind {
    /// 1×1 blocking wall segment; never targeted.
    Wall,
    Facility2x2,
    Facility3x3,
    Facility4x4,
    Facility5x5,
}

impl ElementKind {
    /// Footprint side length in coarse cells.
    pub fn size(self) -> i32 {
        match self {
            Self::Wall => 1,
            Self::Facility2x2 => 2,
            Self::Facility3x3 => 3,
            Self::Facility4x4 => 4,
            Self::Facility5x5 => 5,
        }
    }

    /// Whether the raider can target and destroy this element.
    pub fn targetable(self) -> bool {
        !matches!(self, Self::Wall)
    }

    /// The coarse cells covered when placed at `origin`.
    pub fn footprint(self, origin: CellPoint) -> impl Iterator<Item = CellPoint> {
        let side = self.size();
        (0..side).flat_map(move |i| (0..side).map(move |j| origin.shift(i, j)))
    }
}

/// A placed element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub origin: CellPoint,
}

impl Element {
    /// The coarse cells covered by this element.
    pub fn cells(&self) -> impl Iterator<Item = CellPoint> {
        self.kind.footprint(self.origin)
    }

    /// Continuous center of the footprint.
    pub fn center(&self) -> CenterPoint {
        let half = self.kind.size() as f32 / 2.0;
        CenterPoint::new(self.origin.x as f32 + half, self.origin.y as f32 + half)
    }

    /// Center of the footprint on the fine grid.
    pub fn center_sub(&self) -> SubPoint {
        SubPoint::new(
            self.origin.x * 2 + self.kind.size(),
            self.origin.y * 2 + self.kind.size(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footprints_are_square() {
        let cells: Vec<CellPoint> = ElementKind::Facility3x3
            .footprint(CellPoint::new(2, 5))
            .collect();
        assert_eq!(cells.len(), 9);
        assert!(cells.contains(&CellPoint::new(2, 5)));
        assert!(cells.contains(&CellPoint::new(4, 7)));
        assert!(!cells.contains(&CellPoint::new(5, 5)));
    }

    #[test]
    fn wall_is_single_cell_and_untargetable() {
        assert_eq!(ElementKind::Wall.size(), 1);
        assert!(!ElementKind::Wall.targetable());
        assert!(ElementKind::Facility2x2.targetable());
        let cells: Vec<CellPoint> = ElementKind::Wall.footprint(CellPoint::new(7, 7)).collect();
        assert_eq!(cells, vec![CellPoint::new(7, 7)]);
    }

    #[test]
    fn centers() {
        let e = Element {
            id: 1,
            kind: ElementKind::Facility2x2,
            origin: CellPoint::new(10, 10),
        };
        assert_eq!(e.center(), CenterPoint::new(11.0, 11.0));
        assert_eq!(e.center_sub(), SubPoint::new(22, 22));

        let e = Element {
            id: 2,
            kind: ElementKind::Facility3x3,
            origin: CellPoint::new(0, 0),
        };
        assert_eq!(e.center(), CenterPoint::new(1.5, 1.5));
        assert_eq!(e.center_sub(), SubPoint::new(3, 3));
    }
}
