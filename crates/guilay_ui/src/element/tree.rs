//! Element tree with single-owner child lists.

use guilay_core::{Color, Rect, SlotList};
use slotmap::SlotMap;
use tracing::debug;

use super::core::{Button, Element, ElementId, Text};
use crate::error::{ElementError, ElementResult};

/// Default upper bound on live elements per tree.
pub const DEFAULT_MAX_ELEMENTS: usize = 255;

/// The list an element is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentRef {
    /// The window's root list.
    Root,
    /// A section's child list.
    Section(ElementId),
}

/// Mutable view of a section's own fields. The child list stays with the tree.
#[derive(Debug)]
pub struct SectionMut<'a> {
    /// Absolute window bounds.
    pub bounds: &'a mut Rect,
    /// Background color.
    pub color: &'a mut Color,
}

#[derive(Debug)]
struct Node {
    element: Element,
    attached: bool,
}

/// Owns every element of one window.
///
/// Elements are created detached and become owned once attached to the root
/// list or to a section. Destroying an element destroys its whole subtree.
/// All mutating operations either succeed completely or leave the tree
/// untouched.
#[derive(Debug)]
pub struct ElementTree {
    nodes: SlotMap<ElementId, Node>,
    roots: SlotList<ElementId>,
    max_elements: usize,
}

impl ElementTree {
    /// Creates an empty tree with the default element limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_elements(DEFAULT_MAX_ELEMENTS)
    }

    /// Creates an empty tree holding at most `max_elements` live elements.
    #[must_use]
    pub fn with_max_elements(max_elements: usize) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            roots: SlotList::new(),
            max_elements,
        }
    }

    /// Returns the element limit.
    #[must_use]
    pub const fn max_elements(&self) -> usize {
        self.max_elements
    }

    /// Returns the number of live elements, attached or not.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.nodes.len()
    }

    /// Creates a detached element.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::Allocation`] when the element limit is reached.
    pub fn create(&mut self, element: impl Into<Element>) -> ElementResult<ElementId> {
        let live = self.nodes.len();
        if live >= self.max_elements {
            return Err(ElementError::Allocation {
                live,
                capacity: self.max_elements,
            });
        }
        Ok(self.nodes.insert(Node {
            element: element.into(),
            attached: false,
        }))
    }

    /// Appends a detached element as the new last child of `parent`.
    ///
    /// Returns the index it was stored at, which is always the old length.
    ///
    /// # Errors
    ///
    /// Fails on unknown handles, non-section parents, already attached
    /// children, cycles, or when the list cannot grow.
    pub fn add_child(&mut self, parent: ParentRef, id: ElementId) -> ElementResult<usize> {
        self.check_attachable(parent, id)?;
        let index = self.list_mut(parent)?.push(id)?;
        self.mark_attached(id);
        debug!(?parent, ?id, index, "attached element");
        Ok(index)
    }

    /// Creates an element and appends it to `parent` in one step.
    ///
    /// # Errors
    ///
    /// Fails like [`create`](Self::create) or [`add_child`](Self::add_child);
    /// the element is never left behind on failure.
    pub fn add_element(
        &mut self,
        parent: ParentRef,
        element: impl Into<Element>,
    ) -> ElementResult<ElementId> {
        let id = self.create(element)?;
        if let Err(err) = self.add_child(parent, id) {
            self.nodes.remove(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Resizes a child list to exactly `count` slots.
    ///
    /// Growth appends vacant slots that [`set`](Self::set) can fill.
    /// Shrinking destroys the subtrees of every trailing child.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::OutOfMemory`] if growth fails; the list is
    /// unchanged.
    pub fn resize(&mut self, parent: ParentRef, count: usize) -> ElementResult<()> {
        let dropped = self.list_mut(parent)?.resize(count)?;
        debug!(?parent, count, destroyed = dropped.len(), "resized child list");
        for id in dropped {
            self.destroy_subtree(id);
        }
        Ok(())
    }

    /// Attaches a detached element into a vacant slot.
    ///
    /// # Errors
    ///
    /// Fails like [`add_child`](Self::add_child), or if the slot is out of
    /// range or occupied.
    pub fn set(&mut self, parent: ParentRef, index: usize, id: ElementId) -> ElementResult<()> {
        self.check_attachable(parent, id)?;
        self.list_mut(parent)?.set(index, id)?;
        self.mark_attached(id);
        Ok(())
    }

    /// Removes the child at `index`, destroying its subtree and compacting
    /// the list.
    ///
    /// Returns false if the slot was vacant.
    ///
    /// # Errors
    ///
    /// Fails if `parent` is not a list or `index` is out of range.
    pub fn remove(&mut self, parent: ParentRef, index: usize) -> ElementResult<bool> {
        let removed = self.list_mut(parent)?.remove(index)?;
        Ok(match removed {
            Some(id) => {
                self.destroy_subtree(id);
                debug!(?parent, index, "removed element");
                true
            }
            None => false,
        })
    }

    /// Destroys a detached element and its subtree.
    ///
    /// # Errors
    ///
    /// Fails if the handle is unknown or the element is still owned by a list.
    pub fn discard(&mut self, id: ElementId) -> ElementResult<()> {
        let node = self.nodes.get(id).ok_or(ElementError::UnknownElement(id))?;
        if node.attached {
            return Err(ElementError::AlreadyAttached(id));
        }
        self.destroy_subtree(id);
        Ok(())
    }

    /// Destroys every element.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    /// Returns true if the handle names a live element.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns true if the element is owned by a list.
    #[must_use]
    pub fn is_attached(&self, id: ElementId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.attached)
    }

    /// Gets an element.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id).map(|node| &node.element)
    }

    /// Gets mutable access to a text element.
    pub fn text_mut(&mut self, id: ElementId) -> Option<&mut Text> {
        match &mut self.nodes.get_mut(id)?.element {
            Element::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Gets mutable access to a section's bounds and color.
    pub fn section_mut(&mut self, id: ElementId) -> Option<SectionMut<'_>> {
        match &mut self.nodes.get_mut(id)?.element {
            Element::Section(section) => Some(SectionMut {
                bounds: &mut section.bounds,
                color: &mut section.color,
            }),
            _ => None,
        }
    }

    /// Gets mutable access to a button.
    pub fn button_mut(&mut self, id: ElementId) -> Option<&mut Button> {
        match &mut self.nodes.get_mut(id)?.element {
            Element::Button(button) => Some(button),
            _ => None,
        }
    }

    /// Runs a button's callback. Returns false for non-buttons or buttons
    /// without a callback.
    pub fn activate(&mut self, id: ElementId) -> bool {
        self.button_mut(id).is_some_and(Button::activate)
    }

    /// Returns the slot count of a child list (vacant slots included).
    ///
    /// Unknown or non-section parents have no slots.
    #[must_use]
    pub fn len(&self, parent: ParentRef) -> usize {
        self.list(parent).map_or(0, SlotList::len)
    }

    /// Returns true if a child list has no slots.
    #[must_use]
    pub fn is_empty(&self, parent: ParentRef) -> bool {
        self.len(parent) == 0
    }

    /// Returns the child at `index`, if the slot is filled.
    #[must_use]
    pub fn child_at(&self, parent: ParentRef, index: usize) -> Option<ElementId> {
        self.list(parent)?.get(index).copied()
    }

    /// Iterates over the filled slots of a child list in order.
    pub fn children(&self, parent: ParentRef) -> impl Iterator<Item = ElementId> + '_ {
        self.list(parent)
            .into_iter()
            .flat_map(|list| list.iter().copied())
    }

    /// Iterates over every attached element in depth-first child order,
    /// yielding each handle with its depth (root children are depth 0).
    pub fn iter_dfs(&self) -> impl Iterator<Item = (ElementId, usize)> + '_ {
        ElementDfsIterator {
            tree: self,
            stack: self.roots.iter().rev().map(|&id| (id, 0)).collect(),
        }
    }

    fn list(&self, parent: ParentRef) -> Option<&SlotList<ElementId>> {
        match parent {
            ParentRef::Root => Some(&self.roots),
            ParentRef::Section(id) => match &self.nodes.get(id)?.element {
                Element::Section(section) => Some(&section.children),
                _ => None,
            },
        }
    }

    fn list_mut(&mut self, parent: ParentRef) -> ElementResult<&mut SlotList<ElementId>> {
        match parent {
            ParentRef::Root => Ok(&mut self.roots),
            ParentRef::Section(id) => {
                let node = self
                    .nodes
                    .get_mut(id)
                    .ok_or(ElementError::UnknownElement(id))?;
                match &mut node.element {
                    Element::Section(section) => Ok(&mut section.children),
                    _ => Err(ElementError::NotAContainer(id)),
                }
            }
        }
    }

    fn check_attachable(&self, parent: ParentRef, id: ElementId) -> ElementResult<()> {
        let node = self.nodes.get(id).ok_or(ElementError::UnknownElement(id))?;
        if node.attached {
            return Err(ElementError::AlreadyAttached(id));
        }
        if let ParentRef::Section(parent_id) = parent {
            let parent_node = self
                .nodes
                .get(parent_id)
                .ok_or(ElementError::UnknownElement(parent_id))?;
            if !parent_node.element.is_container() {
                return Err(ElementError::NotAContainer(parent_id));
            }
            if self.subtree_contains(id, parent_id) {
                return Err(ElementError::WouldCycle {
                    parent: parent_id,
                    child: id,
                });
            }
        }
        Ok(())
    }

    fn subtree_contains(&self, root: ElementId, target: ElementId) -> bool {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if let Some(list) = self.list(ParentRef::Section(id)) {
                stack.extend(list.iter().copied());
            }
        }
        false
    }

    fn mark_attached(&mut self, id: ElementId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.attached = true;
        }
    }

    fn destroy_subtree(&mut self, id: ElementId) {
        let mut stack = vec![id];
        let mut destroyed = 0usize;
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(id) {
                destroyed += 1;
                if let Element::Section(mut section) = node.element {
                    stack.extend(section.children.clear());
                }
            }
        }
        debug!(?id, destroyed, "destroyed subtree");
    }
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first iterator over attached elements.
struct ElementDfsIterator<'a> {
    tree: &'a ElementTree,
    stack: Vec<(ElementId, usize)>,
}

impl Iterator for ElementDfsIterator<'_> {
    type Item = (ElementId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;

        // Push children in reverse order so they're processed left-to-right
        if let Some(children) = self.tree.list(ParentRef::Section(id)) {
            self.stack
                .extend(children.iter().rev().map(|&child| (child, depth + 1)));
        }

        Some((id, depth))
    }
}
