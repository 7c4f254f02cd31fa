//! Quadtree over element bounds.

use guilay_core::{Point, Rect};
use tracing::debug;

use super::node::{QuadtreeNode, SpatialEntry};
use crate::element::ElementId;
use crate::error::{SpatialError, SpatialResult};

/// Default depth limit.
pub const DEFAULT_MAX_DEPTH: u32 = 8;

/// Spatial index answering "which element is at this point / in this region"
/// without walking the element tree.
///
/// Holds [`ElementId`]s only. The index is not kept in sync with the tree
/// automatically; rebuild it after the tree changes.
#[derive(Debug, Clone)]
pub struct Quadtree {
    root: QuadtreeNode,
    max_depth: u32,
    next_order: u64,
    len: usize,
}

impl Quadtree {
    /// Creates an empty index over `bounds`.
    #[must_use]
    pub fn new(bounds: Rect, max_depth: u32) -> Self {
        Self {
            root: QuadtreeNode::new(bounds),
            max_depth,
            next_order: 0,
            len: 0,
        }
    }

    /// Returns the indexed region.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.root.bounds()
    }

    /// Returns the depth limit.
    #[must_use]
    pub const fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Returns the root node.
    #[must_use]
    pub const fn root(&self) -> &QuadtreeNode {
        &self.root
    }

    /// Returns the number of indexed elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indexes an element.
    ///
    /// Elements inserted later sit on top for [`hit_test`](Self::hit_test).
    /// Inserting an id that is already indexed moves it and keeps its
    /// stacking position.
    ///
    /// # Errors
    ///
    /// [`SpatialError::OutOfBounds`] if `bounds` leaves the indexed region,
    /// [`SpatialError::CapacityExceeded`] if it touches a reserved region.
    pub fn insert(&mut self, id: ElementId, bounds: Rect) -> SpatialResult<()> {
        if !self.root.bounds().contains_rect(&bounds) {
            return Err(SpatialError::OutOfBounds { bounds });
        }
        if self.root.is_reserved(&bounds) {
            return Err(SpatialError::CapacityExceeded { bounds });
        }

        let order = match self.root.remove(id) {
            Some(previous) => previous.order,
            None => {
                self.len += 1;
                let order = self.next_order;
                self.next_order += 1;
                order
            }
        };
        self.root
            .insert(SpatialEntry { id, bounds, order }, self.max_depth)
    }

    /// Moves an indexed element. Returns false if `id` is not indexed.
    ///
    /// # Errors
    ///
    /// Fails like [`insert`](Self::insert); the old entry is kept.
    pub fn update(&mut self, id: ElementId, bounds: Rect) -> SpatialResult<bool> {
        if self.root.find(id).is_none() {
            return Ok(false);
        }
        self.insert(id, bounds)?;
        Ok(true)
    }

    /// Removes an element. Returns its stored bounds.
    pub fn remove(&mut self, id: ElementId) -> Option<Rect> {
        let removed = self.root.remove(id)?;
        self.len -= 1;
        Some(removed.bounds)
    }

    /// Returns the stored bounds of an element.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<Rect> {
        self.root.find(id).map(|entry| entry.bounds)
    }

    /// Returns the elements whose bounds intersect `region`, bottom to top.
    #[must_use]
    pub fn query(&self, region: Rect) -> Vec<ElementId> {
        self.root
            .query(&region)
            .into_iter()
            .map(|entry| entry.id)
            .collect()
    }

    /// Returns the top-most element containing `point`.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<ElementId> {
        self.root.hit_test(point).map(|entry| entry.id)
    }

    /// Returns every element containing `point`, bottom to top.
    #[must_use]
    pub fn elements_at(&self, point: Point) -> Vec<ElementId> {
        self.root
            .stack_at(point)
            .into_iter()
            .map(|entry| entry.id)
            .collect()
    }

    /// Returns true if `region` overlaps an element or a reserved region.
    #[must_use]
    pub fn is_occupied(&self, region: Rect) -> bool {
        self.root.is_occupied(&region)
    }

    /// Reserves `region` for opaque content; later inserts touching it fail.
    ///
    /// # Errors
    ///
    /// [`SpatialError::OutOfBounds`] if the region leaves the indexed region,
    /// [`SpatialError::CapacityExceeded`] if it overlaps an indexed element.
    pub fn reserve(&mut self, region: Rect) -> SpatialResult<()> {
        if !self.root.bounds().contains_rect(&region) {
            return Err(SpatialError::OutOfBounds { bounds: region });
        }
        self.root.reserve(&region, self.max_depth)?;
        debug!(?region, "reserved region");
        Ok(())
    }

    /// Drops every entry and reservation.
    pub fn clear(&mut self) {
        self.root = QuadtreeNode::new(self.root.bounds());
        self.next_order = 0;
        self.len = 0;
    }
}
