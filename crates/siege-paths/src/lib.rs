//! Path search and connectivity for the siege engine.
//!
//! Two engines operate over the fine sub-cell grid:
//!
//! - **Bounded A\*** shortest-cost search ([`PathField::route`]), using an
//!   integer bucket priority queue with a monotone low-water mark
//! - **Connectivity labelling** ([`ConnectivityMap`]), partitioning walkable
//!   cells into flood-fill components for O(1) reachability queries
//!
//! The path search is 8-connected with fixed step costs (5 orthogonal, 7
//! diagonal). Connectivity labelling is 4-connected; its components serve as
//! a reachability pre-filter ahead of exact searches, never as a cost
//! estimate.
//!
//! # Trait hierarchy
//!
//! | Trait | Required for |
//! |---|---|
//! | [`GridBounds`] | — |
//! | [`WalkCost`] : [`GridBounds`] | A* search |
//! | [`Walkable`] : [`GridBounds`] | connectivity labelling |

mod astar;
mod bucket;
mod connect;
mod traits;

pub use astar::{DIAG_COST, ORTHO_COST, PathField, Route};
pub use bucket::BucketQueue;
pub use connect::{ConnectivityMap, NO_COMPONENT};
pub use traits::{GridBounds, WalkCost, Walkable};
