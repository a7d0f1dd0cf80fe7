use std::iter::FusedIterator;

use super::Array;
use super::storage::{Boxed, Storage};

/// A borrowing iterator over the elements of an [`Array`].
///
/// The iterator walks whole leaves at a time: a lookup descends the tree
/// once per leaf and then yields the leaf's elements in order.
/// Iteration works from both ends.
pub struct ArrayIterator<'a, T, S: Storage<T> = Boxed> {
    array: &'a Array<T, S>,
    front: usize,
    back: usize,
    front_chunk: &'a [S::Slot],
    back_chunk: &'a [S::Slot],
}

impl<'a, T, S: Storage<T>> ArrayIterator<'a, T, S> {
    pub(crate) fn new(array: &'a Array<T, S>) -> Self {
        Self {
            array,
            front: 0,
            back: array.len(),
            front_chunk: &[],
            back_chunk: &[],
        }
    }
}

impl<T, S: Storage<T>> Clone for ArrayIterator<'_, T, S> {
    fn clone(&self) -> Self {
        Self {
            array: self.array,
            front: self.front,
            back: self.back,
            front_chunk: self.front_chunk,
            back_chunk: self.back_chunk,
        }
    }
}

impl<'a, T, S: Storage<T>> Iterator for ArrayIterator<'a, T, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        if self.front_chunk.is_empty() {
            let (chunk, offset) = self.array.chunk_at(self.front);
            self.front_chunk = &chunk[offset..];
        }
        let (first, rest) = self.front_chunk.split_first()?;
        self.front_chunk = rest;
        self.front += 1;
        Some(S::peek(first))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T, S: Storage<T>> DoubleEndedIterator for ArrayIterator<'_, T, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        if self.back_chunk.is_empty() {
            let (chunk, offset) = self.array.chunk_at(self.back - 1);
            self.back_chunk = &chunk[..=offset];
        }
        let (last, rest) = self.back_chunk.split_last()?;
        self.back_chunk = rest;
        self.back -= 1;
        Some(S::peek(last))
    }
}

impl<T, S: Storage<T>> ExactSizeIterator for ArrayIterator<'_, T, S> {
    fn len(&self) -> usize {
        self.back - self.front
    }
}

impl<T, S: Storage<T>> FusedIterator for ArrayIterator<'_, T, S> {}

/// A cursor over an [`Array`] that sits between two elements.
///
/// [`next`](Iterator::next) returns the element at
/// [`next_index`](Self::next_index) and moves right, while
/// [`previous`](Self::previous) returns the element before the cursor and
/// moves left. The leaf under the cursor is kept, so the tree is only
/// descended again when a move leaves it.
pub struct ArrayCursor<'a, T, S: Storage<T> = Boxed> {
    array: &'a Array<T, S>,
    position: usize,
    chunk: &'a [S::Slot],
    chunk_start: usize,
}

impl<'a, T, S: Storage<T>> ArrayCursor<'a, T, S> {
    pub(crate) const fn new(array: &'a Array<T, S>, position: usize) -> Self {
        Self {
            array,
            position,
            chunk: &[],
            chunk_start: 0,
        }
    }

    /// Index of the element the next call to `next` returns.
    #[must_use]
    pub const fn next_index(&self) -> usize {
        self.position
    }

    /// Index of the element the next call to `previous` returns, or `None`
    /// at the start of the array.
    #[must_use]
    pub const fn previous_index(&self) -> Option<usize> {
        self.position.checked_sub(1)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.position < self.array.len()
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.position > 0
    }

    /// Moves the cursor one element to the left and returns that element.
    pub fn previous(&mut self) -> Option<&'a T> {
        let index = self.position.checked_sub(1)?;
        let element = self.element(index);
        self.position = index;
        Some(element)
    }

    fn element(&mut self, index: usize) -> &'a T {
        if index < self.chunk_start || index >= self.chunk_start + self.chunk.len() {
            let (chunk, offset) = self.array.chunk_at(index);
            self.chunk = chunk;
            self.chunk_start = index - offset;
        }
        S::peek(&self.chunk[index - self.chunk_start])
    }
}

impl<T, S: Storage<T>> Clone for ArrayCursor<'_, T, S> {
    fn clone(&self) -> Self {
        Self {
            array: self.array,
            position: self.position,
            chunk: self.chunk,
            chunk_start: self.chunk_start,
        }
    }
}

impl<'a, T, S: Storage<T>> Iterator for ArrayCursor<'a, T, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_next() {
            return None;
        }
        let element = self.element(self.position);
        self.position += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.array.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl<T, S: Storage<T>> ExactSizeIterator for ArrayCursor<'_, T, S> {}

/// An owning iterator over the elements of an [`Array`].
///
/// Elements are cloned out of the array since its structure may be shared.
pub struct ArrayIntoIterator<T, S: Storage<T> = Boxed> {
    array: Array<T, S>,
    front: usize,
    back: usize,
}

impl<T, S: Storage<T>> ArrayIntoIterator<T, S> {
    pub(crate) fn new(array: Array<T, S>) -> Self {
        let back = array.len();
        Self {
            array,
            front: 0,
            back,
        }
    }
}

impl<T: Clone, S: Storage<T>> Iterator for ArrayIntoIterator<T, S> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let element = self.array.get(self.front).ok()?.clone();
        self.front += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: Clone, S: Storage<T>> DoubleEndedIterator for ArrayIntoIterator<T, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.array.get(self.back).ok().cloned()
    }
}

impl<T: Clone, S: Storage<T>> ExactSizeIterator for ArrayIntoIterator<T, S> {}

impl<T: Clone, S: Storage<T>> FusedIterator for ArrayIntoIterator<T, S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistent::array::Unboxed;
    use rstest::rstest;

    fn unboxed(count: u32) -> Array<u32, Unboxed> {
        (0..count).collect()
    }

    #[rstest]
    #[case(0)]
    #[case(7)]
    #[case(40)]
    #[case(1_000)]
    fn test_forward_and_backward(#[case] count: u32) {
        let array = unboxed(count);
        assert!(array.iter().copied().eq(0..count));
        assert!(array.iter().rev().copied().eq((0..count).rev()));
        assert_eq!(array.iter().len(), count as usize);
    }

    #[rstest]
    fn test_meeting_in_the_middle() {
        let array = unboxed(101);
        let mut iterator = array.iter();
        let mut seen = Vec::new();
        while let Some(&front) = iterator.next() {
            seen.push(front);
            if let Some(&back) = iterator.next_back() {
                seen.push(back);
            }
        }
        seen.sort_unstable();
        assert!(seen.into_iter().eq(0..101));
        assert_eq!(iterator.next(), None);
        assert_eq!(iterator.next_back(), None);
    }

    #[rstest]
    #[case(0)]
    #[case(13)]
    #[case(500)]
    fn test_iter_from_starts_at_index(#[case] start: u32) {
        let array = unboxed(500);
        let iterator = array.iter_from(start as usize).unwrap();
        assert!(iterator.copied().eq(start..500));
    }

    #[rstest]
    #[case(0)]
    #[case(13)]
    #[case(500)]
    fn test_cursor_walks_back_to_the_start(#[case] start: u32) {
        let array = unboxed(500);
        let mut cursor = array.iter_from(start as usize).unwrap();
        let mut seen = Vec::new();
        while let Some(&element) = cursor.previous() {
            seen.push(element);
        }
        assert!(seen.into_iter().eq((0..start).rev()));
        assert_eq!(cursor.previous_index(), None);
        assert!(cursor.copied().eq(0..500));
    }

    #[rstest]
    fn test_cursor_turns_around_inside_a_leaf() {
        let array: Array<u32> = (0..100).collect();
        let mut cursor = array.iter_from(50).unwrap();
        assert_eq!(cursor.next(), Some(&50));
        assert_eq!(cursor.previous(), Some(&50));
        assert_eq!(cursor.previous(), Some(&49));
        assert_eq!(cursor.next_index(), 49);
        assert_eq!(cursor.previous_index(), Some(48));
        assert_eq!(cursor.len(), 51);
    }

    #[rstest]
    fn test_into_iterator_clones_elements() {
        let array: Array<String> = ["a", "b", "c"].iter().map(ToString::to_string).collect();
        let collected: Vec<String> = array.clone().into_iter().collect();
        assert_eq!(collected, vec!["a", "b", "c"]);
        let reversed: Vec<String> = array.into_iter().rev().collect();
        assert_eq!(reversed, vec!["c", "b", "a"]);
    }

    #[rstest]
    fn test_cloned_iterator_is_independent() {
        let array = unboxed(30);
        let mut iterator = array.iter();
        iterator.next();
        let copy = iterator.clone();
        assert_eq!(iterator.count(), 29);
        assert_eq!(copy.count(), 29);
    }
}
