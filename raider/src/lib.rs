//! Raider — a pursuit simulation on a two-resolution grid village.
//!
//! A village of walls and facilities occupies the coarse placement grid; a
//! raider moves on the fine sub-cell grid, repeatedly picking the nearest
//! reachable facility it can attack and advancing one step per tick.

pub mod element;
pub mod scenario;
pub mod simulator;
pub mod village;

pub use element::{Element, ElementId, ElementKind};
pub use simulator::{Simulator, Tick};
pub use village::{BuildError, DetailView, Village, VillageLayout};
