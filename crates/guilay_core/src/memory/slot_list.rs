//! # Slot List
//!
//! An ordered list of optional slots. Growth appends vacant slots, shrinking
//! returns the values it cut off, and removal compacts.

use thiserror::Error;

/// Errors raised by [`SlotList`] operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotListError {
    /// Backing storage could not be grown to the requested slot count.
    #[error("out of memory: could not grow list to {requested} slots")]
    OutOfMemory {
        /// The slot count that was requested.
        requested: usize,
    },

    /// An index past the end of the list.
    #[error("index {index} out of bounds for list of {len} slots")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Current slot count.
        len: usize,
    },

    /// Attempted to fill a slot that already holds a value.
    #[error("slot {index} is already occupied")]
    SlotOccupied {
        /// The occupied index.
        index: usize,
    },
}

/// Result type for slot list operations.
pub type SlotListResult<T> = Result<T, SlotListError>;

/// A growable, ordered list of slots.
///
/// `len()` is the number of addressable slots. A slot is either occupied or
/// vacant; vacant slots only appear after an explicit [`SlotList::resize`]
/// growth and are skipped by [`SlotList::iter`].
///
/// # Example
///
/// ```rust
/// use guilay_core::SlotList;
///
/// let mut list = SlotList::new();
/// let index = list.push("first").unwrap();
/// assert_eq!(index, 0);
/// assert_eq!(list.get(0), Some(&"first"));
/// ```
#[derive(Debug, Clone)]
pub struct SlotList<T> {
    /// The slots, in insertion order.
    slots: Vec<Option<T>>,
}

impl<T> SlotList<T> {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Returns the number of addressable slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the list has no slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the number of occupied slots.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Gets the value at `index`, or None if the slot is vacant or out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)?.as_ref()
    }

    /// Gets mutable access to the value at `index`.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)?.as_mut()
    }

    /// Resizes the list to exactly `new_count` slots.
    ///
    /// Growing appends vacant slots and preserves existing entries at their
    /// indices. Shrinking drops trailing slots and returns their values in
    /// order so the caller can tear down whatever they own.
    ///
    /// # Errors
    ///
    /// Returns [`SlotListError::OutOfMemory`] if the growth cannot be
    /// reserved. The list is left exactly as it was.
    pub fn resize(&mut self, new_count: usize) -> SlotListResult<Vec<T>> {
        let len = self.slots.len();
        if new_count >= len {
            self.slots
                .try_reserve_exact(new_count - len)
                .map_err(|_| SlotListError::OutOfMemory {
                    requested: new_count,
                })?;
            self.slots.resize_with(new_count, || None);
            return Ok(Vec::new());
        }

        Ok(self.slots.drain(new_count..).flatten().collect())
    }

    /// Appends a value as the new last slot and returns its index.
    ///
    /// The list grows by exactly one slot and the value lands at the first
    /// slot created by that growth (index `len - 1` afterwards).
    ///
    /// # Errors
    ///
    /// Returns [`SlotListError::OutOfMemory`] if the slot cannot be reserved.
    pub fn push(&mut self, value: T) -> SlotListResult<usize> {
        let index = self.slots.len();
        self.resize(index + 1)?;
        self.slots[index] = Some(value);
        Ok(index)
    }

    /// Fills a vacant slot.
    ///
    /// # Errors
    ///
    /// Fails if `index` is out of range or the slot is occupied.
    pub fn set(&mut self, index: usize, value: T) -> SlotListResult<()> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(SlotListError::IndexOutOfBounds { index, len })?;
        if slot.is_some() {
            return Err(SlotListError::SlotOccupied { index });
        }
        *slot = Some(value);
        Ok(())
    }

    /// Removes the slot at `index`, shifting later slots down by one.
    ///
    /// Returns the value that occupied the slot, if any.
    ///
    /// # Errors
    ///
    /// Fails if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> SlotListResult<Option<T>> {
        let len = self.slots.len();
        if index >= len {
            return Err(SlotListError::IndexOutOfBounds { index, len });
        }
        Ok(self.slots.remove(index))
    }

    /// Returns the index of the first slot holding `value`.
    pub fn position(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.slots
            .iter()
            .position(|slot| slot.as_ref() == Some(value))
    }

    /// Iterates over occupied slots in order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Iterates over every slot, vacant ones included.
    pub fn slots(&self) -> impl DoubleEndedIterator<Item = Option<&T>> + '_ {
        self.slots.iter().map(Option::as_ref)
    }

    /// Removes every slot, returning the values that were stored.
    pub fn clear(&mut self) -> Vec<T> {
        self.slots.drain(..).flatten().collect()
    }
}

impl<T> Default for SlotList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_appends_at_last_slot() {
        let mut list = SlotList::new();

        for expected in 0..5usize {
            let index = list.push(expected * 10).unwrap();
            assert_eq!(index, expected);
            assert_eq!(list.len(), expected + 1);
            assert_eq!(list.get(index), Some(&(expected * 10)));
        }
        assert_eq!(list.occupied(), 5);
    }

    #[test]
    fn test_grow_preserves_and_leaves_vacant() {
        let mut list = SlotList::new();
        list.push('a').unwrap();
        list.push('b').unwrap();

        let dropped = list.resize(4).unwrap();
        assert!(dropped.is_empty());
        assert_eq!(list.len(), 4);
        assert_eq!(list.get(0), Some(&'a'));
        assert_eq!(list.get(1), Some(&'b'));
        assert_eq!(list.get(2), None);
        assert_eq!(list.occupied(), 2);

        list.set(2, 'c').unwrap();
        assert_eq!(list.get(2), Some(&'c'));
        assert_eq!(list.set(2, 'x'), Err(SlotListError::SlotOccupied { index: 2 }));
    }

    #[test]
    fn test_shrink_returns_trailing_values() {
        let mut list = SlotList::new();
        for value in 0..6 {
            list.push(value).unwrap();
        }

        let dropped = list.resize(2).unwrap();
        assert_eq!(dropped, vec![2, 3, 4, 5]);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_failed_growth_leaves_list_unchanged() {
        let mut list = SlotList::new();
        list.push(1u64).unwrap();
        list.push(2u64).unwrap();

        let err = list.resize(usize::MAX).unwrap_err();
        assert_eq!(err, SlotListError::OutOfMemory { requested: usize::MAX });
        assert_eq!(list.len(), 2);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_remove_compacts() {
        let mut list = SlotList::new();
        for value in ["a", "b", "c", "d"] {
            list.push(value).unwrap();
        }

        assert_eq!(list.remove(1).unwrap(), Some("b"));
        assert_eq!(list.len(), 3);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec!["a", "c", "d"]);
        assert!(matches!(
            list.remove(3),
            Err(SlotListError::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }
}
