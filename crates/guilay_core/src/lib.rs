//! # Guilay Core
//!
//! The value types and storage every other guilay crate builds on:
//! - Geometry primitives (points, sizes, rectangles, colors)
//! - The orthographic projection that maps window pixels to device coordinates
//! - `SlotList`, the growable owning list behind every element child list
//!
//! ## Coordinate space
//!
//! ```text
//!  (0, h) ┌──────────────────┐ (w, h)
//!         │                  │
//!         │   window pixels  │   y grows upward,
//!         │                  │   origin bottom-left
//!  (0, 0) └──────────────────┘ (w, 0)
//! ```
//!
//! [`projection::orthographic`] maps this box onto the `[-1, 1]` device cube.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod geometry;
pub mod memory;
pub mod projection;

pub use geometry::{Color, Extent, Point, Rect, Size};
pub use memory::{SlotList, SlotListError};
pub use projection::{orthographic, Mat4};
