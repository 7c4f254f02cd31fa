//! Quadtree nodes.
//!
//! State machine per node:
//!
//! ```text
//!   Empty ──insert──▶ ContainsItem ──conflicting insert──▶ PartiallyOccupied
//!     │                                                     (irreversible)
//!     └──reserve──▶ FullyOccupied  (rejects every later insert)
//! ```

use guilay_core::{Point, Rect};

use crate::element::ElementId;
use crate::error::{SpatialError, SpatialResult};

/// Occupancy of one quadtree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    /// Nothing stored, not reserved.
    Empty,
    /// Split into four children.
    PartiallyOccupied,
    /// Reserved for opaque content. Holds no element.
    FullyOccupied,
    /// Holds exactly one element directly.
    ContainsItem,
}

/// An element reference stored in the index. Never owns the element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialEntry {
    /// The referenced element.
    pub id: ElementId,
    /// Bounds at the time of insertion.
    pub bounds: Rect,
    /// Insertion order; later entries are drawn on top.
    pub order: u64,
}

/// A node of the quadtree.
///
/// The four children quadrisect `bounds` in `[NW, NE, SW, SE]` order and
/// exist only while the node is [`NodeStatus::PartiallyOccupied`]. Every
/// stored entry lies inside the bounds of the node holding it.
#[derive(Debug, Clone)]
pub struct QuadtreeNode {
    bounds: Rect,
    depth: u32,
    status: NodeStatus,
    children: Option<Box<[QuadtreeNode; 4]>>,
    occupant: Option<SpatialEntry>,
    /// Entries of a split node that no single child fully contains, or that
    /// reached the depth limit.
    straddlers: Vec<SpatialEntry>,
}

impl QuadtreeNode {
    /// Creates an empty root node.
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        Self::with_depth(bounds, 0)
    }

    fn with_depth(bounds: Rect, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            status: NodeStatus::Empty,
            children: None,
            occupant: None,
            straddlers: Vec::new(),
        }
    }

    /// Returns the node bounds.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Returns the depth (root is 0).
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Returns the occupancy status.
    #[must_use]
    pub const fn status(&self) -> NodeStatus {
        self.status
    }

    /// Returns true for `Empty`, `FullyOccupied` and `ContainsItem` nodes.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Returns the four children, if split.
    #[must_use]
    pub fn children(&self) -> Option<&[QuadtreeNode; 4]> {
        self.children.as_deref()
    }

    /// Returns the direct occupant of a `ContainsItem` node.
    #[must_use]
    pub const fn occupant(&self) -> Option<&SpatialEntry> {
        self.occupant.as_ref()
    }

    /// Marks an empty node as reserved.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::CapacityExceeded`] unless the node is empty.
    pub fn mark_fully_occupied(&mut self) -> SpatialResult<()> {
        match self.status {
            NodeStatus::Empty => {
                self.status = NodeStatus::FullyOccupied;
                Ok(())
            }
            NodeStatus::FullyOccupied => Ok(()),
            _ => Err(SpatialError::CapacityExceeded {
                bounds: self.bounds,
            }),
        }
    }

    /// Inserts an entry.
    ///
    /// Items descend into the child that fully contains them while the node
    /// depth is below `max_depth`. An entry whose id already occupies the
    /// landing node replaces it instead of splitting.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::CapacityExceeded`] if the entry touches a
    /// reserved node. Nothing is modified in that case.
    pub fn insert(&mut self, entry: SpatialEntry, max_depth: u32) -> SpatialResult<()> {
        if self.is_reserved(&entry.bounds) {
            return Err(SpatialError::CapacityExceeded {
                bounds: entry.bounds,
            });
        }
        self.insert_unreserved(entry, max_depth);
        Ok(())
    }

    /// Returns true if `bounds` touches a reserved node.
    #[must_use]
    pub fn is_reserved(&self, bounds: &Rect) -> bool {
        if !touches(&self.bounds, bounds) {
            return false;
        }
        match self.status {
            NodeStatus::FullyOccupied => true,
            NodeStatus::PartiallyOccupied => self
                .children
                .iter()
                .flat_map(|children| children.iter())
                .any(|child| child.is_reserved(bounds)),
            NodeStatus::Empty | NodeStatus::ContainsItem => false,
        }
    }

    fn insert_unreserved(&mut self, entry: SpatialEntry, max_depth: u32) {
        match self.status {
            NodeStatus::Empty => {
                self.status = NodeStatus::ContainsItem;
                self.occupant = Some(entry);
            }
            NodeStatus::ContainsItem => match self.occupant.take() {
                Some(existing) if existing.id == entry.id => self.occupant = Some(entry),
                existing => {
                    self.split();
                    if let Some(existing) = existing {
                        self.place(existing, max_depth);
                    }
                    self.place(entry, max_depth);
                }
            },
            NodeStatus::PartiallyOccupied => self.place(entry, max_depth),
            // Guarded by the reservation check in `insert`
            NodeStatus::FullyOccupied => {}
        }
    }

    fn split(&mut self) {
        let depth = self.depth + 1;
        self.children = Some(Box::new(
            self.bounds
                .quadrisect()
                .map(|quadrant| Self::with_depth(quadrant, depth)),
        ));
        self.status = NodeStatus::PartiallyOccupied;
    }

    fn place(&mut self, entry: SpatialEntry, max_depth: u32) {
        if self.depth < max_depth {
            if let Some(child) = self
                .children
                .iter_mut()
                .flat_map(|children| children.iter_mut())
                .find(|child| child.bounds.contains_rect(&entry.bounds))
            {
                child.insert_unreserved(entry, max_depth);
                return;
            }
        }
        self.straddlers.push(entry);
    }

    /// Returns every entry whose bounds intersect `region`, in insertion order.
    #[must_use]
    pub fn query(&self, region: &Rect) -> Vec<SpatialEntry> {
        let mut found = Vec::new();
        self.collect(region, &mut found);
        found.sort_by_key(|entry| entry.order);
        found
    }

    fn collect(&self, region: &Rect, found: &mut Vec<SpatialEntry>) {
        found.extend(
            self.occupant
                .iter()
                .chain(&self.straddlers)
                .filter(|entry| entry.bounds.intersects(region)),
        );
        for child in self.children.iter().flat_map(|children| children.iter()) {
            if child.bounds.intersects(region) {
                child.collect(region, found);
            }
        }
    }

    /// Returns every entry containing `point`, bottom to top.
    #[must_use]
    pub fn stack_at(&self, point: Point) -> Vec<SpatialEntry> {
        let mut found: Vec<SpatialEntry> = Vec::new();
        let mut node = Some(self);
        // Quadrants tile their parent, so at most one child holds the point
        while let Some(current) = node.filter(|n| n.bounds.contains(point)) {
            found.extend(
                current
                    .occupant
                    .iter()
                    .chain(&current.straddlers)
                    .filter(|entry| entry.bounds.contains(point)),
            );
            node = current
                .children
                .iter()
                .flat_map(|children| children.iter())
                .find(|child| child.bounds.contains(point));
        }
        found.sort_by_key(|entry| entry.order);
        found
    }

    /// Returns the top-most entry containing `point`.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<SpatialEntry> {
        self.stack_at(point).pop()
    }

    /// Returns true if `region` overlaps a stored entry or a reserved node.
    /// A zero-area region is never occupied.
    #[must_use]
    pub fn is_occupied(&self, region: &Rect) -> bool {
        !region.is_empty() && (self.is_reserved(region) || !self.query(region).is_empty())
    }

    /// Finds the entry stored for `id`.
    #[must_use]
    pub fn find(&self, id: ElementId) -> Option<&SpatialEntry> {
        self.occupant
            .iter()
            .chain(&self.straddlers)
            .find(|entry| entry.id == id)
            .or_else(|| {
                self.children
                    .iter()
                    .flat_map(|children| children.iter())
                    .find_map(|child| child.find(id))
            })
    }

    /// Removes the entry stored for `id`.
    ///
    /// A `ContainsItem` node falls back to `Empty`. Split nodes stay split.
    pub fn remove(&mut self, id: ElementId) -> Option<SpatialEntry> {
        if self.occupant.is_some_and(|entry| entry.id == id) {
            self.status = NodeStatus::Empty;
            return self.occupant.take();
        }
        if let Some(index) = self.straddlers.iter().position(|entry| entry.id == id) {
            return Some(self.straddlers.remove(index));
        }
        self.children
            .iter_mut()
            .flat_map(|children| children.iter_mut())
            .find_map(|child| child.remove(id))
    }

    /// Reserves `region`.
    ///
    /// Empty nodes fully covered by the region become `FullyOccupied`;
    /// partially covered ones are split and the reservation continues below.
    /// At `max_depth` a partially covered empty node is reserved whole, so
    /// reservations are rounded outward to the smallest cell size.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::CapacityExceeded`] if the region intersects a
    /// stored entry, or if the rounded reservation would have to share a
    /// cell with one at the depth limit. Nothing is modified in that case.
    pub fn reserve(&mut self, region: &Rect, max_depth: u32) -> SpatialResult<()> {
        let conflict = SpatialError::CapacityExceeded { bounds: *region };
        if !self.query(region).is_empty() {
            return Err(conflict);
        }

        let mut reserved = self.clone();
        if !reserved.reserve_unchecked(region, max_depth)
            || reserved.any_entry(&|entry: &SpatialEntry| reserved.is_reserved(&entry.bounds))
        {
            return Err(conflict);
        }
        *self = reserved;
        Ok(())
    }

    /// Returns false if an occupied cell at the depth limit blocks the region.
    fn reserve_unchecked(&mut self, region: &Rect, max_depth: u32) -> bool {
        if !self.bounds.intersects(region) {
            return true;
        }
        let covered = region.contains_rect(&self.bounds);
        match self.status {
            NodeStatus::FullyOccupied => return true,
            NodeStatus::Empty if covered || self.depth >= max_depth => {
                self.status = NodeStatus::FullyOccupied;
                return true;
            }
            NodeStatus::Empty => self.split(),
            NodeStatus::ContainsItem if self.depth < max_depth => {
                let existing = self.occupant.take();
                self.split();
                if let Some(existing) = existing {
                    self.place(existing, max_depth);
                }
            }
            // The occupant keeps the deepest cell
            NodeStatus::ContainsItem => return false,
            NodeStatus::PartiallyOccupied => {}
        }
        self.children
            .iter_mut()
            .flat_map(|children| children.iter_mut())
            .all(|child| child.reserve_unchecked(region, max_depth))
    }

    fn any_entry(&self, predicate: &dyn Fn(&SpatialEntry) -> bool) -> bool {
        self.occupant
            .iter()
            .chain(&self.straddlers)
            .any(|entry| predicate(entry))
            || self
                .children
                .iter()
                .flat_map(|children| children.iter())
                .any(|child| child.any_entry(predicate))
    }

    /// Counts the stored entries in this subtree.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        usize::from(self.occupant.is_some())
            + self.straddlers.len()
            + self
                .children
                .iter()
                .flat_map(|children| children.iter())
                .map(Self::entry_count)
                .sum::<usize>()
    }
}

/// Positive-area overlap, or containment for degenerate rectangles.
fn touches(node: &Rect, bounds: &Rect) -> bool {
    node.intersects(bounds) || (bounds.is_empty() && node.contains_rect(bounds))
}
