//! Growable stack primitive
//!
//! One generic amortized-doubling stack, instantiated twice in this crate:
//! traversal frames in the engine and edit records in the undo/redo log.
//! The destroy/count walks in the tree module reuse it as their work list.

/// LIFO stack over a growable array
#[derive(Debug)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Stack<T> {
    /// Initial capacity before the first doubling
    const INITIAL_CAPACITY: usize = 16;

    /// Create an empty stack
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(Self::INITIAL_CAPACITY),
        }
    }

    /// Push `item` on top, doubling the backing array when full
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Pop the top item, or `None` when empty
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Borrow the top item without removing it
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    /// Drop all items, keeping the backing array for reuse
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// True when no items are stacked
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of stacked items
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
