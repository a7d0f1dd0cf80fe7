//! Nodes of the finger tree underneath [`Array`](super::Array).
//!
//! A [`Node`] is either a leaf holding a run of element slots or a branch
//! holding two or three nodes of the next lower depth. Slicing and removal
//! can leave behind nodes that are too small to be stored; those are
//! represented by [`Partial`] and must be merged into a neighbor before a
//! value is returned to the caller.
//!
//! | Operation | Result |
//! |-----------|--------|
//! | `insert`  | one or two nodes, siblings possibly rebalanced |
//! | `remove`  | zero or one node, siblings possibly rebalanced, or a [`Partial`] |
//! | `slice`   | a [`Fragment`] carrying exactly the requested range |
//! | `concat`  | one or two fragments |
//!
//! Overflow is pushed into the left sibling before the right one, and an
//! underflowing node steals from (or merges with) its left sibling before
//! its right one.

use arrayvec::ArrayVec;
use smallvec::{SmallVec, smallvec};

use super::super::ReferenceCounter;
use super::storage::{Chunk, Storage};

/// Minimum number of children of a branch.
pub(crate) const MIN_BRANCH: usize = 2;
/// Maximum number of children of a branch.
pub(crate) const MAX_BRANCH: usize = 3;

// =============================================================================
// Node
// =============================================================================

/// A node of the finger tree.
///
/// Leaves live at depth 0 and hold `MIN_LEAF..=MAX_LEAF` slots. Branches hold
/// `MIN_BRANCH..=MAX_BRANCH` children and cache the number of elements below
/// them.
pub(crate) enum Node<T, S: Storage<T>> {
    Leaf(Chunk<T, S>),
    Branch {
        size: usize,
        children: ReferenceCounter<[Node<T, S>]>,
    },
}

impl<T, S: Storage<T>> Clone for Node<T, S> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(slots) => Self::Leaf(slots.clone()),
            Self::Branch { size, children } => Self::Branch {
                size: *size,
                children: children.clone(),
            },
        }
    }
}

impl<T, S: Storage<T>> Node<T, S> {
    pub(crate) fn leaf(slots: Vec<S::Slot>) -> Self {
        Self::Leaf(slots.into())
    }

    pub(crate) fn branch(children: Vec<Self>) -> Self {
        let size = children.iter().map(Self::size).sum();
        Self::Branch {
            size,
            children: children.into(),
        }
    }

    /// Number of elements stored below this node.
    pub(crate) fn size(&self) -> usize {
        match self {
            Self::Leaf(slots) => slots.len(),
            Self::Branch { size, .. } => *size,
        }
    }

    /// Number of slots of a leaf or children of a branch.
    pub(crate) fn arity(&self) -> usize {
        match self {
            Self::Leaf(slots) => slots.len(),
            Self::Branch { children, .. } => children.len(),
        }
    }

    pub(crate) fn slots(&self) -> &[S::Slot] {
        match self {
            Self::Leaf(slots) => slots,
            Self::Branch { .. } => unreachable!("branch used as a leaf"),
        }
    }

    pub(crate) fn children(&self) -> &[Self] {
        match self {
            Self::Branch { children, .. } => children,
            Self::Leaf(_) => unreachable!("leaf used as a branch"),
        }
    }

    pub(crate) fn get(&self, index: usize) -> &T {
        match self {
            Self::Leaf(slots) => S::peek(&slots[index]),
            Self::Branch { children, .. } => {
                let (position, offset) = locate(children, index);
                children[position].get(offset)
            }
        }
    }

    /// Returns the leaf slots containing `index` and the offset of `index`
    /// inside them.
    pub(crate) fn chunk_at(&self, index: usize) -> (&[S::Slot], usize) {
        match self {
            Self::Leaf(slots) => (&slots[..], index),
            Self::Branch { children, .. } => {
                let (position, offset) = locate(children, index);
                children[position].chunk_at(offset)
            }
        }
    }

    pub(crate) fn reverse(&self) -> Self {
        match self {
            Self::Leaf(slots) => Self::Leaf(slots.iter().rev().cloned().collect()),
            Self::Branch { size, children } => Self::Branch {
                size: *size,
                children: children.iter().rev().map(Self::reverse).collect(),
            },
        }
    }

    /// Visits every element below this node from left to right.
    pub(crate) fn for_each<'a, F: FnMut(&'a T)>(&'a self, visit: &mut F) {
        match self {
            Self::Leaf(slots) => {
                for slot in slots.iter() {
                    visit(S::peek(slot));
                }
            }
            Self::Branch { children, .. } => {
                for child in children.iter() {
                    child.for_each(visit);
                }
            }
        }
    }

    /// Inserts `slot` before `position` (`0..=size`).
    ///
    /// `left` and `right` are the siblings of this node inside its parent.
    /// The returned [`Neighborhood`] replaces this node and the given
    /// siblings.
    pub(crate) fn insert(
        &self,
        left: Option<&Self>,
        right: Option<&Self>,
        position: usize,
        slot: S::Slot,
    ) -> Neighborhood<T, S> {
        match self {
            Self::Leaf(slots) => {
                let mut slots = slots.to_vec();
                slots.insert(position, slot);
                Self::spill(slots, left, right, S::MAX_LEAF, Self::slots, Self::leaf)
            }
            Self::Branch { children, .. } => {
                let (index, offset) = locate_position(children, position);
                let (before, after) = siblings(children, index);
                let replaced = children[index].insert(before, after, offset, slot);
                let children = replace_window(children, index, replaced.into_nodes());
                Self::spill(children, left, right, MAX_BRANCH, Self::children, Self::branch)
            }
        }
    }

    /// Removes the element at `position` (`0..size`).
    ///
    /// Underflow is only reported when the node has no siblings to steal
    /// from or merge with.
    pub(crate) fn remove(
        &self,
        left: Option<&Self>,
        right: Option<&Self>,
        position: usize,
    ) -> Removal<T, S> {
        match self {
            Self::Leaf(slots) => {
                let mut slots = slots.to_vec();
                slots.remove(position);
                match Self::settle(slots, left, right, S::MIN_LEAF, Self::slots, Self::leaf) {
                    Ok(neighborhood) => Removal::Rebalanced(neighborhood),
                    Err(slots) => Removal::Underflow(Partial::Leaf(slots.into())),
                }
            }
            Self::Branch { children, .. } => {
                let (index, offset) = locate(children, position);
                let (before, after) = siblings(children, index);
                let Removal::Rebalanced(replaced) = children[index].remove(before, after, offset)
                else {
                    unreachable!("a node with siblings never underflows");
                };
                let children = replace_window(children, index, replaced.into_nodes());
                match Self::settle(children, left, right, MIN_BRANCH, Self::children, Self::branch) {
                    Ok(neighborhood) => Removal::Rebalanced(neighborhood),
                    Err(children) => {
                        let Some(child) = children.into_iter().next() else {
                            unreachable!("an underflowing branch keeps one child");
                        };
                        Removal::Underflow(Partial::Branch(Box::new(Fragment::Whole(child))))
                    }
                }
            }
        }
    }

    /// Returns the elements `offset..offset + length` of this node.
    ///
    /// The node itself is shared when the whole range is requested.
    pub(crate) fn slice(&self, offset: usize, length: usize) -> Fragment<T, S> {
        if offset == 0 && length == self.size() {
            return Fragment::Whole(self.clone());
        }
        match self {
            Self::Leaf(slots) => {
                let slots = &slots[offset..offset + length];
                if length < S::MIN_LEAF {
                    Fragment::Partial(Partial::Leaf(slots.into()))
                } else {
                    Fragment::Whole(Self::Leaf(slots.into()))
                }
            }
            Self::Branch { children, .. } => {
                let end = offset + length;
                let mut parts = Vec::with_capacity(MAX_BRANCH);
                let mut start = 0;
                for child in children.iter() {
                    let child_end = start + child.size();
                    if start < end && offset < child_end {
                        let from = offset.max(start);
                        let part = child.slice(from - start, end.min(child_end) - from);
                        Fragment::push(&mut parts, part);
                    }
                    start = child_end;
                }
                Fragment::gather(parts)
            }
        }
    }

    /// Checks the shape of this node and returns the number of elements
    /// below it.
    ///
    /// # Panics
    ///
    /// Panics if an arity, depth or cached size is wrong.
    pub(crate) fn check_invariants(&self, depth: usize) -> usize {
        match self {
            Self::Leaf(slots) => {
                assert_eq!(depth, 0, "leaf found at depth {depth}");
                assert!(
                    (S::MIN_LEAF..=S::MAX_LEAF).contains(&slots.len()),
                    "leaf holds {} elements, expected {}..={}",
                    slots.len(),
                    S::MIN_LEAF,
                    S::MAX_LEAF
                );
                slots.len()
            }
            Self::Branch { size, children } => {
                assert!(depth > 0, "branch found at depth 0");
                assert!(
                    (MIN_BRANCH..=MAX_BRANCH).contains(&self.arity()),
                    "branch holds {} children",
                    self.arity()
                );
                let actual: usize = children
                    .iter()
                    .map(|child| child.check_invariants(depth - 1))
                    .sum();
                assert_eq!(*size, actual, "cached branch size is stale");
                actual
            }
        }
    }

    /// Rebuilds a node from `items`, pushing overflow into a sibling with
    /// spare room or splitting in half when both siblings are full.
    fn spill<I: Clone>(
        mut items: Vec<I>,
        left: Option<&Self>,
        right: Option<&Self>,
        max: usize,
        parts: fn(&Self) -> &[I],
        build: fn(Vec<I>) -> Self,
    ) -> Neighborhood<T, S> {
        let mut neighborhood = Neighborhood::around(left, right);
        if items.len() <= max {
            neighborhood.nodes.push(build(items));
            return neighborhood;
        }

        if let Some(sibling) = left.map(parts).filter(|sibling| sibling.len() < max) {
            let moved = (max - sibling.len() + 1) / 2;
            let mut grown = sibling.to_vec();
            grown.extend(items.drain(..moved));
            neighborhood.left = Some(build(grown));
            neighborhood.nodes.push(build(items));
        } else if let Some(sibling) = right.map(parts).filter(|sibling| sibling.len() < max) {
            let moved = (max - sibling.len() + 1) / 2;
            let mut grown = items.split_off(items.len() - moved);
            grown.extend_from_slice(sibling);
            neighborhood.right = Some(build(grown));
            neighborhood.nodes.push(build(items));
        } else {
            let upper = items.split_off(items.len() / 2);
            neighborhood.nodes.push(build(items));
            neighborhood.nodes.push(build(upper));
        }
        neighborhood
    }

    /// Rebuilds a node from `items`, stealing from or merging with a sibling
    /// when it fell below `min`.
    ///
    /// Returns the items unchanged if they are too few and there is no
    /// sibling.
    fn settle<I: Clone>(
        mut items: Vec<I>,
        left: Option<&Self>,
        right: Option<&Self>,
        min: usize,
        parts: fn(&Self) -> &[I],
        build: fn(Vec<I>) -> Self,
    ) -> Result<Neighborhood<T, S>, Vec<I>> {
        let mut neighborhood = Neighborhood::around(left, right);
        if items.len() >= min {
            neighborhood.nodes.push(build(items));
            return Ok(neighborhood);
        }

        match (left.map(parts), right.map(parts)) {
            (Some(sibling), _) if sibling.len() > min => {
                let keep = sibling.len() - (sibling.len() - min + 1) / 2;
                let mut grown = sibling[keep..].to_vec();
                grown.append(&mut items);
                neighborhood.left = Some(build(sibling[..keep].to_vec()));
                neighborhood.nodes.push(build(grown));
            }
            (_, Some(sibling)) if sibling.len() > min => {
                let moved = (sibling.len() - min + 1) / 2;
                items.extend_from_slice(&sibling[..moved]);
                neighborhood.nodes.push(build(items));
                neighborhood.right = Some(build(sibling[moved..].to_vec()));
            }
            (Some(sibling), _) => {
                let mut merged = sibling.to_vec();
                merged.append(&mut items);
                neighborhood.left = Some(build(merged));
            }
            (None, Some(sibling)) => {
                items.extend_from_slice(sibling);
                neighborhood.right = Some(build(items));
            }
            (None, None) => return Err(items),
        }
        Ok(neighborhood)
    }
}

// =============================================================================
// Neighborhood / Removal
// =============================================================================

/// Replacement for a node and its siblings after an insertion or removal.
///
/// `left` and `right` are present exactly when the corresponding sibling was
/// passed in, possibly rebuilt. `nodes` holds two nodes after a split and
/// none after a merge.
pub(crate) struct Neighborhood<T, S: Storage<T>> {
    pub(crate) left: Option<Node<T, S>>,
    pub(crate) nodes: ArrayVec<Node<T, S>, 2>,
    pub(crate) right: Option<Node<T, S>>,
}

impl<T, S: Storage<T>> Neighborhood<T, S> {
    fn around(left: Option<&Node<T, S>>, right: Option<&Node<T, S>>) -> Self {
        Self {
            left: left.cloned(),
            nodes: ArrayVec::new(),
            right: right.cloned(),
        }
    }

    pub(crate) fn into_nodes(self) -> impl Iterator<Item = Node<T, S>> {
        self.left.into_iter().chain(self.nodes).chain(self.right)
    }
}

/// Outcome of [`Node::remove`].
pub(crate) enum Removal<T, S: Storage<T>> {
    Rebalanced(Neighborhood<T, S>),
    Underflow(Partial<T, S>),
}

// =============================================================================
// Partial / Fragment
// =============================================================================

/// A node below its minimum arity.
///
/// A partial leaf holds `1..MIN_LEAF` slots; a partial branch wraps a single
/// child of the next lower depth.
pub(crate) enum Partial<T, S: Storage<T>> {
    Leaf(Chunk<T, S>),
    Branch(Box<Fragment<T, S>>),
}

impl<T, S: Storage<T>> Partial<T, S> {
    #[cfg(test)]
    pub(crate) fn size(&self) -> usize {
        match self {
            Self::Leaf(slots) => slots.len(),
            Self::Branch(child) => child.size(),
        }
    }

    /// Slots of a partial leaf.
    pub(crate) fn slots(&self) -> &[S::Slot] {
        match self {
            Self::Leaf(slots) => slots,
            Self::Branch(_) => unreachable!("partial branch used as a leaf"),
        }
    }

    /// Unwraps the only child of a partial branch.
    pub(crate) fn into_child(self) -> Fragment<T, S> {
        match self {
            Self::Branch(child) => *child,
            Self::Leaf(_) => unreachable!("partial leaf used as a branch"),
        }
    }
}

/// A whole node or a partial one.
pub(crate) enum Fragment<T, S: Storage<T>> {
    Whole(Node<T, S>),
    Partial(Partial<T, S>),
}

impl<T, S: Storage<T>> Fragment<T, S> {
    #[cfg(test)]
    pub(crate) fn size(&self) -> usize {
        match self {
            Self::Whole(node) => node.size(),
            Self::Partial(partial) => partial.size(),
        }
    }

    pub(crate) const fn is_partial(&self) -> bool {
        matches!(self, Self::Partial(_))
    }

    const fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::Whole(Node::Leaf(_)) | Self::Partial(Partial::Leaf(_))
        )
    }

    pub(crate) fn into_whole(self) -> Node<T, S> {
        match self {
            Self::Whole(node) => node,
            Self::Partial(_) => unreachable!("partial node escaped its merge"),
        }
    }

    fn slots(&self) -> &[S::Slot] {
        match self {
            Self::Whole(node) => node.slots(),
            Self::Partial(partial) => partial.slots(),
        }
    }

    fn into_children(self) -> Vec<Self> {
        match self {
            Self::Whole(node) => node.children().iter().cloned().map(Self::Whole).collect(),
            Self::Partial(partial) => vec![partial.into_child()],
        }
    }

    /// Appends `fragment` to a run of fragments of the same depth.
    ///
    /// Partial fragments are merged with their predecessor, so a run of two
    /// or more fragments never contains a partial one.
    pub(crate) fn push(run: &mut Vec<Self>, fragment: Self) {
        match run.pop() {
            Some(last) if last.is_partial() || fragment.is_partial() => {
                run.extend(last.concat(fragment));
            }
            Some(last) => {
                run.push(last);
                run.push(fragment);
            }
            None => run.push(fragment),
        }
    }

    /// Merges two fragments of the same depth.
    ///
    /// The result is a single fragment if the combined contents fit into
    /// one node, otherwise two whole nodes.
    pub(crate) fn concat(self, other: Self) -> SmallVec<[Self; 2]> {
        if self.is_leaf() {
            let mut slots = self.slots().to_vec();
            slots.extend_from_slice(other.slots());
            return if slots.len() < S::MIN_LEAF {
                smallvec![Self::Partial(Partial::Leaf(slots.into()))]
            } else if slots.len() <= S::MAX_LEAF {
                smallvec![Self::Whole(Node::leaf(slots))]
            } else {
                let upper = slots.split_off(slots.len() / 2);
                smallvec![Self::Whole(Node::leaf(slots)), Self::Whole(Node::leaf(upper))]
            };
        }

        let mut children = Vec::with_capacity(2 * MAX_BRANCH);
        for child in self.into_children().into_iter().chain(other.into_children()) {
            Self::push(&mut children, child);
        }
        if children.len() <= MAX_BRANCH {
            smallvec![Self::gather(children)]
        } else {
            pack(children.into_iter().map(Self::into_whole).collect())
                .into_iter()
                .map(Self::Whole)
                .collect()
        }
    }

    /// Wraps a run of one to three children into a branch fragment.
    fn gather(mut children: Vec<Self>) -> Self {
        if children.len() == 1 {
            let Some(child) = children.pop() else {
                unreachable!("run has one element");
            };
            return Self::Partial(Partial::Branch(Box::new(child)));
        }
        Self::Whole(Node::branch(
            children.into_iter().map(Self::into_whole).collect(),
        ))
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Finds the node containing `index` and the offset inside it.
pub(crate) fn locate<T, S: Storage<T>>(nodes: &[Node<T, S>], mut index: usize) -> (usize, usize) {
    for (position, node) in nodes.iter().enumerate() {
        let size = node.size();
        if index < size {
            return (position, index);
        }
        index -= size;
    }
    unreachable!("index beyond the end of the nodes")
}

/// Like [`locate`], but an insertion position at a boundary belongs to the
/// node on its left.
pub(crate) fn locate_position<T, S: Storage<T>>(
    nodes: &[Node<T, S>],
    mut position: usize,
) -> (usize, usize) {
    for (index, node) in nodes.iter().enumerate() {
        let size = node.size();
        if position <= size {
            return (index, position);
        }
        position -= size;
    }
    unreachable!("position beyond the end of the nodes")
}

pub(crate) fn siblings<T, S: Storage<T>>(
    nodes: &[Node<T, S>],
    index: usize,
) -> (Option<&Node<T, S>>, Option<&Node<T, S>>) {
    (
        index.checked_sub(1).map(|before| &nodes[before]),
        nodes.get(index + 1),
    )
}

/// Replaces `nodes[index]` and its direct siblings with `replacement`.
pub(crate) fn replace_window<T, S: Storage<T>>(
    nodes: &[Node<T, S>],
    index: usize,
    replacement: impl IntoIterator<Item = Node<T, S>>,
) -> Vec<Node<T, S>> {
    let start = index.saturating_sub(1);
    let end = (index + 2).min(nodes.len());
    let mut result = Vec::with_capacity(nodes.len() + 1);
    result.extend_from_slice(&nodes[..start]);
    result.extend(replacement);
    result.extend_from_slice(&nodes[end..]);
    result
}

/// Groups at least two nodes into branches of two or three children.
pub(crate) fn pack<T, S: Storage<T>>(nodes: Vec<Node<T, S>>) -> Vec<Node<T, S>> {
    debug_assert!(nodes.len() >= MIN_BRANCH, "cannot pack a single node");
    let mut remaining = nodes.len();
    let mut nodes = nodes.into_iter();
    let mut packed = Vec::with_capacity(remaining / MAX_BRANCH + 1);
    while remaining > 0 {
        let take = if remaining == 2 || remaining == 4 {
            MIN_BRANCH
        } else {
            MAX_BRANCH
        };
        packed.push(Node::branch(nodes.by_ref().take(take).collect()));
        remaining -= take;
    }
    packed
}

pub(crate) fn total_size<T, S: Storage<T>>(nodes: &[Node<T, S>]) -> usize {
    nodes.iter().map(Node::size).sum()
}
