//! Spatial partitioning for hit-testing and occupancy queries.

mod node;
mod quadtree;

pub use node::{NodeStatus, QuadtreeNode, SpatialEntry};
pub use quadtree::{Quadtree, DEFAULT_MAX_DEPTH};
