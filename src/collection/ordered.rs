use std::sync::Arc;

/// Items compared by stable identity rather than by value.
pub trait Keyed {
    /// Identity type.
    type Key: Copy + Eq + std::fmt::Debug;

    /// Identity of this item.
    fn key(&self) -> Self::Key;
}

/// Immutable ordered list with identity-based editing.
///
/// Every edit returns a new list; storage of a published list is never written again, so clones
/// handed to readers stay valid.
#[derive(Debug)]
pub struct OrderedList<T> {
    items: Arc<[T]>,
}

impl<T> Clone for OrderedList<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self {
            items: Arc::from(Vec::new()),
        }
    }
}

impl<T> From<Vec<T>> for OrderedList<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: Arc::from(items),
        }
    }
}

impl<T> FromIterator<T> for OrderedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T> OrderedList<T> {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Items in order.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterate in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when the list has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First item, if any.
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// `true` when both lists share the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

impl<T: Keyed + Clone> OrderedList<T> {
    /// Index of the item with identity `key`.
    pub fn position(&self, key: T::Key) -> Option<usize> {
        self.items.iter().position(|item| item.key() == key)
    }

    /// Item with identity `key`.
    pub fn get(&self, key: T::Key) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    /// `true` when an item with identity `key` is present.
    pub fn contains(&self, key: T::Key) -> bool {
        self.position(key).is_some()
    }

    /// New list with `item` appended.
    pub fn push(&self, item: T) -> Self {
        self.extend(std::iter::once(item))
    }

    /// New list with `items` appended in order.
    pub fn extend(&self, items: impl IntoIterator<Item = T>) -> Self {
        self.items.iter().cloned().chain(items).collect()
    }

    /// New list without the item with identity `key`. Unknown keys leave the order as is.
    pub fn remove(&self, key: T::Key) -> Self {
        self.items
            .iter()
            .filter(|item| item.key() != key)
            .cloned()
            .collect()
    }

    /// New list with the item swapped with its left neighbor. No-op at the left edge.
    pub fn move_left(&self, key: T::Key) -> Self {
        match self.position(key) {
            Some(index) if index > 0 => self.swapped(index - 1, index),
            _ => self.clone(),
        }
    }

    /// New list with the item swapped with its right neighbor. No-op at the right edge.
    pub fn move_right(&self, key: T::Key) -> Self {
        match self.position(key) {
            Some(index) if index + 1 < self.items.len() => self.swapped(index, index + 1),
            _ => self.clone(),
        }
    }

    /// New list with the item identified by `key` replaced by `item`.
    pub fn replace(&self, key: T::Key, item: T) -> Self {
        let mut items = self.items.to_vec();
        if let Some(slot) = items.iter_mut().find(|it| it.key() == key) {
            *slot = item;
        }
        Self::from(items)
    }

    fn swapped(&self, a: usize, b: usize) -> Self {
        let mut items = self.items.to_vec();
        items.swap(a, b);
        Self::from(items)
    }
}

impl<'a, T> IntoIterator for &'a OrderedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: serde::Serialize> serde::Serialize for OrderedList<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/collection/ordered.rs"]
mod tests;
