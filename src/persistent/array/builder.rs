//! Incremental construction of [`Array`]s.
//!
//! [`ArrayBuilder`] collects elements at both ends in amortized O(1) and
//! turns them into an immutable [`Array`] with [`ArrayBuilder::freeze`].
//! Elements are kept in a ring buffer holding the two outer digits; when a
//! side is full, a leaf is cut from its inner end and handed to a
//! [`TreeBuilder`], which does the same one level deeper with nodes.

use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use super::Array;
use super::finger_tree::FingerTree;
use super::node::{MAX_BRANCH, Node};
use super::storage::{Boxed, Storage};

/// Maximum number of nodes a [`TreeBuilder`] keeps on one side.
const DIGIT_NODES: usize = 4;

// =============================================================================
// TreeBuilder
// =============================================================================

/// Builds a [`FingerTree`] from nodes added at both ends.
///
/// The digits live in a ring of `2 * DIGIT_NODES` nodes split after
/// `in_left` entries. Once both digits are in use, every overflow moves
/// three nodes as one branch into the nested builder.
pub(crate) struct TreeBuilder<T, S: Storage<T>> {
    nodes: VecDeque<Node<T, S>>,
    in_left: usize,
    size: usize,
    nested: Option<Box<TreeBuilder<T, S>>>,
}

impl<T, S: Storage<T>> TreeBuilder<T, S> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: VecDeque::with_capacity(2 * DIGIT_NODES),
            in_left: 0,
            size: 0,
            nested: None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of elements below all nodes added so far.
    pub(crate) const fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn prepend(&mut self, node: Node<T, S>) {
        self.size += node.size();
        let in_right = self.nodes.len() - self.in_left;
        if self.in_left < DIGIT_NODES {
            self.in_left += 1;
        } else if self.nested.is_none() && in_right < DIGIT_NODES {
            // the innermost left node becomes part of the right digit
        } else {
            let inner: Vec<_> = self.nodes.drain(1..=MAX_BRANCH).collect();
            self.nested
                .get_or_insert_with(|| Box::new(Self::new()))
                .prepend(Node::branch(inner));
            self.in_left = 2;
        }
        self.nodes.push_front(node);
    }

    pub(crate) fn append(&mut self, node: Node<T, S>) {
        self.size += node.size();
        let in_right = self.nodes.len() - self.in_left;
        if in_right < DIGIT_NODES {
            // room on the right
        } else if self.nested.is_none() && self.in_left < DIGIT_NODES {
            self.in_left += 1;
        } else {
            let inner: Vec<_> = self
                .nodes
                .drain(self.in_left..self.in_left + MAX_BRANCH)
                .collect();
            self.nested
                .get_or_insert_with(|| Box::new(Self::new()))
                .append(Node::branch(inner));
        }
        self.nodes.push_back(node);
    }

    pub(crate) fn freeze(self) -> FingerTree<T, S> {
        let Self {
            nodes,
            in_left,
            nested,
            ..
        } = self;
        let mut left: Vec<_> = nodes.into();
        match nested {
            None => FingerTree::from_nodes(left),
            Some(nested) => {
                let right = left.split_off(in_left);
                FingerTree::from_parts(left, nested.freeze(), right)
            }
        }
    }

    fn for_each<'a, F: FnMut(&'a T)>(&'a self, visit: &mut F) {
        for node in self.nodes.iter().take(self.in_left) {
            node.for_each(visit);
        }
        if let Some(nested) = &self.nested {
            nested.for_each(visit);
        }
        for node in self.nodes.iter().skip(self.in_left) {
            node.for_each(visit);
        }
    }
}

// =============================================================================
// ArrayBuilder
// =============================================================================

/// A single-owner builder for [`Array`]s.
///
/// Elements can be added at both ends in amortized O(1). [`freeze`](Self::freeze)
/// consumes the builder, so it cannot be used after the array was produced.
///
/// # Design
///
/// - `PhantomData<Rc<()>>` keeps the builder `!Send` and `!Sync`
/// - Clone is not implemented; a builder has exactly one owner
///
/// # Examples
///
/// ```rust
/// use fingerarray::persistent::{Array, ArrayBuilder};
///
/// let mut builder: ArrayBuilder<i32> = ArrayBuilder::new();
/// builder.append(2);
/// builder.append(3);
/// builder.prepend(1);
/// assert_eq!(builder.to_string(), "ArrayBuilder[1, 2, 3]");
///
/// let array: Array<i32> = builder.freeze();
/// assert_eq!(array, Array::from_slice(&[1, 2, 3]));
/// ```
pub struct ArrayBuilder<T, S: Storage<T> = Boxed> {
    slots: VecDeque<S::Slot>,
    in_left: usize,
    tree: TreeBuilder<T, S>,
    /// Marker to ensure `!Send` and `!Sync`.
    _marker: PhantomData<Rc<()>>,
}

static_assertions::assert_not_impl_any!(ArrayBuilder<i32>: Send, Sync);
static_assertions::assert_not_impl_any!(ArrayBuilder<i32, super::Unboxed>: Send, Sync);

impl<T, S: Storage<T>> ArrayBuilder<T, S> {
    /// Number of slots cut into one leaf when a digit overflows.
    const LEAF: usize = (S::MIN_LEAF + S::MAX_LEAF + 1) / 2;

    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: VecDeque::with_capacity(2 * S::MAX_DIGIT),
            in_left: 0,
            tree: TreeBuilder::new(),
            _marker: PhantomData,
        }
    }

    /// Returns the number of elements added so far.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() + self.tree.size()
    }

    /// Returns `true` if no element was added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Adds an element in front of all elements added so far.
    ///
    /// # Complexity
    ///
    /// Amortized O(1)
    pub fn prepend(&mut self, element: T) {
        let in_right = self.slots.len() - self.in_left;
        if self.in_left < S::MAX_DIGIT {
            self.in_left += 1;
        } else if self.tree.is_empty() && in_right < S::MAX_DIGIT {
            // the innermost left element becomes part of the right digit
        } else {
            let leaf: Vec<_> = self
                .slots
                .drain(self.in_left - Self::LEAF..self.in_left)
                .collect();
            self.tree.prepend(Node::leaf(leaf));
            self.in_left = self.in_left - Self::LEAF + 1;
        }
        self.slots.push_front(S::wrap(element));
    }

    /// Adds an element behind all elements added so far.
    ///
    /// # Complexity
    ///
    /// Amortized O(1)
    pub fn append(&mut self, element: T) {
        let in_right = self.slots.len() - self.in_left;
        if in_right < S::MAX_DIGIT {
            // room on the right
        } else if self.tree.is_empty() && self.in_left < S::MAX_DIGIT {
            self.in_left += 1;
        } else {
            let leaf: Vec<_> = self
                .slots
                .drain(self.in_left..self.in_left + Self::LEAF)
                .collect();
            self.tree.append(Node::leaf(leaf));
        }
        self.slots.push_back(S::wrap(element));
    }

    /// Consumes the builder and returns the array of all added elements.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn freeze(self) -> Array<T, S> {
        let Self {
            slots,
            in_left,
            tree,
            ..
        } = self;
        let mut left: Vec<_> = slots.into();
        if tree.is_empty() {
            return Array::from_flat(left);
        }
        let right = left.split_off(in_left);
        Array::from_parts(left, tree.freeze(), right)
    }

    fn for_each<'a, F: FnMut(&'a T)>(&'a self, visit: &mut F) {
        for slot in self.slots.iter().take(self.in_left) {
            visit(S::peek(slot));
        }
        self.tree.for_each(visit);
        for slot in self.slots.iter().skip(self.in_left) {
            visit(S::peek(slot));
        }
    }
}

impl<T, S: Storage<T>> Default for ArrayBuilder<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: Storage<T>> Extend<T> for ArrayBuilder<T, S> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.append(element);
        }
    }
}

impl<T: fmt::Display, S: Storage<T>> fmt::Display for ArrayBuilder<T, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut elements = Vec::with_capacity(self.len());
        self.for_each(&mut |element| elements.push(element));
        write!(formatter, "ArrayBuilder[")?;
        for (index, element) in elements.iter().enumerate() {
            if index > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}
