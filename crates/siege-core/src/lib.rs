//! **siege-core** — dual-resolution grid geometry and circular range masks.
//!
//! Foundational types for the siege engine: coordinates on the coarse
//! object-placement grid and on the fine sub-cell grid used for pathing,
//! conversions between the two resolutions, and precomputed boolean disc
//! masks for range queries.

pub mod geom;
pub mod mask;

pub use geom::{CellPoint, CenterPoint, SubPoint};
pub use mask::{Mask, MaskCache};
