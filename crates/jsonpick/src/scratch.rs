//! Reusable scratch storage for the lexer and skipper.
//!
//! A [`ScratchBuffer`] separates its *logical* length (the bytes written since
//! the last [`reset`](ScratchBuffer::reset)) from the physical storage behind
//! it. Resetting only rewinds the cursor, so a buffer that has grown to fit
//! the longest string seen so far keeps that storage for every later string,
//! key and number in the stream.

/// Physical size reserved by the first write.
const INITIAL_CAPACITY: usize = 8;

/// Growable buffer with a resettable logical length.
///
/// Elements default to bytes; the skipper reuses the same type for its
/// bracket stack.
#[derive(Debug)]
pub(crate) struct ScratchBuffer<T = u8> {
    data: Vec<T>,
    len: usize,
}

impl<T> Default for ScratchBuffer<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            len: 0,
        }
    }
}

impl<T: Copy + Default> ScratchBuffer<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Rewind the logical length to zero without releasing storage.
    #[inline]
    pub(crate) fn reset(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Elements written since the last reset.
    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        &self.data[..self.len]
    }

    /// Physical storage currently held, in elements.
    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Write `item` at `index` without moving the logical length.
    ///
    /// Storage doubles when `index` lies past its end. Writing below the
    /// logical length overwrites the element already there, which is how an
    /// escaped quote replaces its backslash.
    pub(crate) fn insert(&mut self, index: usize, item: T) {
        if index >= self.data.len() {
            self.grow_to(index + 1);
        }
        self.data[index] = item;
    }

    #[inline]
    pub(crate) fn push(&mut self, item: T) {
        self.insert(self.len, item);
        self.len += 1;
    }

    pub(crate) fn extend_from_slice(&mut self, items: &[T]) {
        let end = self.len + items.len();
        if end > self.data.len() {
            self.grow_to(end);
        }
        self.data[self.len..end].copy_from_slice(items);
        self.len = end;
    }

    /// Remove and return the last logical element.
    pub(crate) fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.data[self.len])
    }

    fn grow_to(&mut self, min: usize) {
        let grown = (self.data.len() * 2).max(INITIAL_CAPACITY).max(min);
        self.data.resize(grown, T::default());
    }
}
