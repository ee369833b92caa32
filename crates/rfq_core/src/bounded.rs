/// Fixed-capacity log that keeps the most recent entries.
///
/// Inserts are O(1) and never reallocate once the buffer is full: the slot
/// holding the oldest entry is overwritten in place. Iteration yields entries
/// newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedLog<T> {
    slots: Vec<T>,
    // Index of the oldest entry once the buffer has wrapped.
    head: usize,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.slots.len() < self.capacity {
            self.slots.push(item);
        } else {
            self.slots[self.head] = item;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed entry.
    pub fn latest(&self) -> Option<&T> {
        self.iter().next()
    }

    /// Entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let len = self.slots.len();
        let head = self.head;
        (0..len).map(move |offset| &self.slots[(head + len - 1 - offset) % len])
    }
}

impl<T: Clone> BoundedLog<T> {
    /// Clones up to `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<T> {
        self.iter().take(limit).cloned().collect()
    }
}
