//! The 2-3 finger tree holding the interior of a deep [`Array`](super::Array).
//!
//! A tree at depth `d` stores depth-`d` [`Node`]s in its digits and a middle
//! tree of depth `d + 1` branches. The array facade keeps its own element
//! digits and stores a tree of leaves (depth 0) in between.
//!
//! Sizes are cached at every level, so [`FingerTree::size`] is O(1) and
//! indexed access descends in O(log n).
//!
//! Operations that can leave an undersized node behind ([`FingerTree::slice`]
//! and [`FingerTree::remove`]) return a [`TreeSlice`]: either a finished tree
//! or a single [`Partial`] node the caller has to merge into its own digits.

use std::mem;

use arrayvec::ArrayVec;

use super::super::ReferenceCounter;
use super::node::{
    Fragment, MAX_BRANCH, Node, Partial, Removal, locate, locate_position, pack, replace_window,
    siblings, total_size,
};
use super::storage::Storage;

/// Maximum number of nodes in a digit.
const MAX_DIGIT_NODES: usize = 4;

type Digit<T, S> = ArrayVec<Node<T, S>, MAX_DIGIT_NODES>;

pub(crate) enum FingerTree<T, S: Storage<T>> {
    Empty,
    Single(Node<T, S>),
    Deep(ReferenceCounter<DeepTree<T, S>>),
}

pub(crate) struct DeepTree<T, S: Storage<T>> {
    size: usize,
    left: Digit<T, S>,
    middle: FingerTree<T, S>,
    right: Digit<T, S>,
}

/// Result of slicing or removing from a tree.
pub(crate) enum TreeSlice<T, S: Storage<T>> {
    Tree(FingerTree<T, S>),
    Partial(Partial<T, S>),
}

impl<T, S: Storage<T>> Clone for FingerTree<T, S> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Single(node) => Self::Single(node.clone()),
            Self::Deep(deep) => Self::Deep(deep.clone()),
        }
    }
}

impl<T, S: Storage<T>> FingerTree<T, S> {
    pub(crate) const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub(crate) fn size(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Single(node) => node.size(),
            Self::Deep(deep) => deep.size,
        }
    }

    fn deep(left: Digit<T, S>, middle: Self, right: Digit<T, S>) -> Self {
        let size = total_size(&left) + middle.size() + total_size(&right);
        Self::Deep(ReferenceCounter::new(DeepTree {
            size,
            left,
            middle,
            right,
        }))
    }

    /// Builds a tree from a run of nodes of the same depth.
    pub(crate) fn from_nodes(mut nodes: Vec<Node<T, S>>) -> Self {
        match nodes.len() {
            0 => Self::Empty,
            1 => match nodes.pop() {
                Some(node) => Self::Single(node),
                None => unreachable!("run has one node"),
            },
            length if length <= 2 * MAX_DIGIT_NODES => {
                let right = nodes.split_off(length / 2);
                Self::deep(digit(nodes), Self::Empty, digit(right))
            }
            length => {
                let right = nodes.split_off(length - MAX_BRANCH);
                let inner = nodes.split_off(MAX_BRANCH);
                Self::deep(digit(nodes), Self::from_nodes(pack(inner)), digit(right))
            }
        }
    }

    /// Builds a tree from digits of any length, borrowing from the middle
    /// tree when a digit is empty and pushing overflow into it when a digit
    /// is too long.
    pub(crate) fn from_parts(mut left: Vec<Node<T, S>>, mut middle: Self, mut right: Vec<Node<T, S>>) -> Self {
        while left.len() > MAX_DIGIT_NODES {
            let inner = left.split_off(left.len() - MAX_BRANCH);
            middle = middle.cons(Node::branch(inner));
        }
        while right.len() > MAX_DIGIT_NODES {
            let outer = right.split_off(MAX_BRANCH);
            middle = middle.snoc(Node::branch(mem::replace(&mut right, outer)));
        }
        if left.is_empty() {
            if middle.is_empty() {
                return Self::from_nodes(right);
            }
            left = middle.head().children().to_vec();
            middle = middle.tail();
        }
        if right.is_empty() {
            if middle.is_empty() {
                return Self::from_nodes(left);
            }
            right = middle.last().children().to_vec();
            middle = middle.init();
        }
        Self::deep(digit(left), middle, digit(right))
    }

    pub(crate) fn cons(&self, node: Node<T, S>) -> Self {
        match self {
            Self::Empty => Self::Single(node),
            Self::Single(only) => Self::deep(digit(vec![node]), Self::Empty, digit(vec![only.clone()])),
            Self::Deep(deep) => {
                if deep.left.len() < MAX_DIGIT_NODES {
                    let mut left = Digit::new();
                    left.push(node);
                    left.extend(deep.left.iter().cloned());
                    return Self::deep(left, deep.middle.clone(), deep.right.clone());
                }
                let pushed = Node::branch(deep.left[1..].to_vec());
                let left = digit(vec![node, deep.left[0].clone()]);
                Self::deep(left, deep.middle.cons(pushed), deep.right.clone())
            }
        }
    }

    pub(crate) fn snoc(&self, node: Node<T, S>) -> Self {
        match self {
            Self::Empty => Self::Single(node),
            Self::Single(only) => Self::deep(digit(vec![only.clone()]), Self::Empty, digit(vec![node])),
            Self::Deep(deep) => {
                if deep.right.len() < MAX_DIGIT_NODES {
                    let mut right = deep.right.clone();
                    right.push(node);
                    return Self::deep(deep.left.clone(), deep.middle.clone(), right);
                }
                let pushed = Node::branch(deep.right[..MAX_BRANCH].to_vec());
                let right = digit(vec![deep.right[MAX_BRANCH].clone(), node]);
                Self::deep(deep.left.clone(), deep.middle.snoc(pushed), right)
            }
        }
    }

    pub(crate) fn head(&self) -> &Node<T, S> {
        match self {
            Self::Empty => unreachable!("head of an empty tree"),
            Self::Single(node) => node,
            Self::Deep(deep) => &deep.left[0],
        }
    }

    pub(crate) fn last(&self) -> &Node<T, S> {
        match self {
            Self::Empty => unreachable!("last of an empty tree"),
            Self::Single(node) => node,
            Self::Deep(deep) => &deep.right[deep.right.len() - 1],
        }
    }

    pub(crate) fn tail(&self) -> Self {
        match self {
            Self::Empty => unreachable!("tail of an empty tree"),
            Self::Single(_) => Self::Empty,
            Self::Deep(deep) => Self::from_parts(
                deep.left[1..].to_vec(),
                deep.middle.clone(),
                deep.right.to_vec(),
            ),
        }
    }

    pub(crate) fn init(&self) -> Self {
        match self {
            Self::Empty => unreachable!("init of an empty tree"),
            Self::Single(_) => Self::Empty,
            Self::Deep(deep) => Self::from_parts(
                deep.left.to_vec(),
                deep.middle.clone(),
                deep.right[..deep.right.len() - 1].to_vec(),
            ),
        }
    }

    pub(crate) fn replace_head(&self, node: Node<T, S>) -> Self {
        match self {
            Self::Empty => unreachable!("replace_head of an empty tree"),
            Self::Single(_) => Self::Single(node),
            Self::Deep(deep) => {
                let mut left = deep.left.clone();
                left[0] = node;
                Self::deep(left, deep.middle.clone(), deep.right.clone())
            }
        }
    }

    pub(crate) fn replace_last(&self, node: Node<T, S>) -> Self {
        match self {
            Self::Empty => unreachable!("replace_last of an empty tree"),
            Self::Single(_) => Self::Single(node),
            Self::Deep(deep) => {
                let mut right = deep.right.clone();
                let last = right.len() - 1;
                right[last] = node;
                Self::deep(deep.left.clone(), deep.middle.clone(), right)
            }
        }
    }

    /// Finds the node of this level (or of a deeper one) containing
    /// `index`, together with the offset inside it.
    fn locate(&self, index: usize) -> (&Node<T, S>, usize) {
        match self {
            Self::Empty => unreachable!("lookup in an empty tree"),
            Self::Single(node) => (node, index),
            Self::Deep(deep) => {
                let left = total_size(&deep.left);
                if index < left {
                    let (position, offset) = locate(&deep.left, index);
                    return (&deep.left[position], offset);
                }
                let index = index - left;
                let middle = deep.middle.size();
                if index < middle {
                    return deep.middle.locate(index);
                }
                let (position, offset) = locate(&deep.right, index - middle);
                (&deep.right[position], offset)
            }
        }
    }

    pub(crate) fn get(&self, index: usize) -> &T {
        let (node, offset) = self.locate(index);
        node.get(offset)
    }

    pub(crate) fn chunk_at(&self, index: usize) -> (&[S::Slot], usize) {
        let (node, offset) = self.locate(index);
        node.chunk_at(offset)
    }

    /// Inserts `slot` before `position`, which must lie strictly inside the
    /// tree or at the boundary of one of its digits.
    pub(crate) fn insert(&self, position: usize, slot: S::Slot) -> Self {
        match self {
            Self::Empty => unreachable!("insertion into an empty tree"),
            Self::Single(node) => {
                Self::from_nodes(node.insert(None, None, position, slot).into_nodes().collect())
            }
            Self::Deep(deep) => {
                let left = total_size(&deep.left);
                if position <= left {
                    return Self::from_parts(
                        insert_into(&deep.left, position, slot),
                        deep.middle.clone(),
                        deep.right.to_vec(),
                    );
                }
                let position = position - left;
                let middle = deep.middle.size();
                if position < middle {
                    return Self::deep(
                        deep.left.clone(),
                        deep.middle.insert(position, slot),
                        deep.right.clone(),
                    );
                }
                Self::from_parts(
                    deep.left.to_vec(),
                    deep.middle.clone(),
                    insert_into(&deep.right, position - middle, slot),
                )
            }
        }
    }

    /// Removes the element at `position`.
    ///
    /// Only a tree consisting of a single node can underflow into a
    /// [`TreeSlice::Partial`].
    pub(crate) fn remove(&self, position: usize) -> TreeSlice<T, S> {
        match self {
            Self::Empty => unreachable!("removal from an empty tree"),
            Self::Single(node) => match node.remove(None, None, position) {
                Removal::Rebalanced(neighborhood) => {
                    TreeSlice::Tree(Self::from_nodes(neighborhood.into_nodes().collect()))
                }
                Removal::Underflow(partial) => TreeSlice::Partial(partial),
            },
            Self::Deep(deep) => {
                let left = total_size(&deep.left);
                if position < left {
                    return match remove_from(&deep.left, position) {
                        Ok(nodes) => TreeSlice::Tree(Self::from_parts(
                            nodes,
                            deep.middle.clone(),
                            deep.right.to_vec(),
                        )),
                        Err(partial) => Self::glue(
                            vec![Fragment::Partial(partial)],
                            deep.middle.clone(),
                            wholes(&deep.right),
                        ),
                    };
                }
                let position = position - left;
                let middle = deep.middle.size();
                if position < middle {
                    return match deep.middle.remove(position) {
                        TreeSlice::Tree(tree) => {
                            TreeSlice::Tree(Self::from_parts(deep.left.to_vec(), tree, deep.right.to_vec()))
                        }
                        TreeSlice::Partial(partial) => {
                            let mut run = wholes(&deep.left);
                            Fragment::push(&mut run, partial.into_child());
                            Self::glue(run, Self::Empty, wholes(&deep.right))
                        }
                    };
                }
                match remove_from(&deep.right, position - middle) {
                    Ok(nodes) => TreeSlice::Tree(Self::from_parts(
                        deep.left.to_vec(),
                        deep.middle.clone(),
                        nodes,
                    )),
                    Err(partial) => Self::glue(
                        wholes(&deep.left),
                        deep.middle.clone(),
                        vec![Fragment::Partial(partial)],
                    ),
                }
            }
        }
    }

    /// Concatenates `self`, the nodes `nodes` and `other`.
    pub(crate) fn concat(&self, nodes: Vec<Node<T, S>>, other: &Self) -> Self {
        match (self, other) {
            (Self::Empty, _) => nodes
                .into_iter()
                .rev()
                .fold(other.clone(), |tree, node| tree.cons(node)),
            (_, Self::Empty) => nodes
                .into_iter()
                .fold(self.clone(), |tree, node| tree.snoc(node)),
            (Self::Single(only), _) => nodes
                .into_iter()
                .rev()
                .fold(other.clone(), |tree, node| tree.cons(node))
                .cons(only.clone()),
            (_, Self::Single(only)) => nodes
                .into_iter()
                .fold(self.clone(), |tree, node| tree.snoc(node))
                .snoc(only.clone()),
            (Self::Deep(first), Self::Deep(second)) => {
                let mut facing = first.right.to_vec();
                facing.extend(nodes);
                facing.extend(second.left.iter().cloned());
                Self::deep(
                    first.left.clone(),
                    first.middle.concat(pack(facing), &second.middle),
                    second.right.clone(),
                )
            }
        }
    }

    /// Returns the elements `offset..offset + length` (`length > 0`).
    pub(crate) fn slice(&self, offset: usize, length: usize) -> TreeSlice<T, S> {
        if offset == 0 && length == self.size() {
            return TreeSlice::Tree(self.clone());
        }
        match self {
            Self::Empty => unreachable!("slice of an empty tree"),
            Self::Single(node) => match node.slice(offset, length) {
                Fragment::Whole(node) => TreeSlice::Tree(Self::Single(node)),
                Fragment::Partial(partial) => TreeSlice::Partial(partial),
            },
            Self::Deep(deep) => {
                let end = offset + length;
                let mut start = 0;
                let mut left = Vec::new();
                slice_digit(&deep.left, &mut start, offset, end, &mut left);

                let size = deep.middle.size();
                let from = offset.max(start);
                let to = end.min(start + size);
                let mut middle = Self::Empty;
                if from < to {
                    match deep.middle.slice(from - start, to - from) {
                        TreeSlice::Tree(tree) => middle = tree,
                        TreeSlice::Partial(partial) => {
                            Fragment::push(&mut left, partial.into_child());
                        }
                    }
                }
                start += size;

                let mut right = Vec::new();
                let target = if middle.is_empty() {
                    &mut left
                } else {
                    &mut right
                };
                slice_digit(&deep.right, &mut start, offset, end, target);
                Self::glue(left, middle, right)
            }
        }
    }

    /// Joins runs of fragments around a middle tree, merging a lone partial
    /// fragment into its nearest neighbor.
    fn glue(
        mut left: Vec<Fragment<T, S>>,
        mut middle: Self,
        mut right: Vec<Fragment<T, S>>,
    ) -> TreeSlice<T, S> {
        if is_lone_partial(&left) {
            if middle.is_empty() {
                for fragment in mem::take(&mut right) {
                    Fragment::push(&mut left, fragment);
                }
            } else {
                for child in middle.head().children() {
                    Fragment::push(&mut left, Fragment::Whole(child.clone()));
                }
                middle = middle.tail();
            }
        }
        if is_lone_partial(&right) {
            if middle.is_empty() {
                for fragment in mem::take(&mut right) {
                    Fragment::push(&mut left, fragment);
                }
            } else {
                let mut run = wholes(middle.last().children());
                for fragment in mem::take(&mut right) {
                    Fragment::push(&mut run, fragment);
                }
                right = run;
                middle = middle.init();
            }
        }
        if is_lone_partial(&left) {
            let Some(Fragment::Partial(partial)) = left.pop() else {
                unreachable!("run holds a single partial");
            };
            return TreeSlice::Partial(partial);
        }
        TreeSlice::Tree(Self::from_parts(
            left.into_iter().map(Fragment::into_whole).collect(),
            middle,
            right.into_iter().map(Fragment::into_whole).collect(),
        ))
    }

    pub(crate) fn reverse(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Single(node) => Self::Single(node.reverse()),
            Self::Deep(deep) => Self::deep(
                deep.right.iter().rev().map(Node::reverse).collect(),
                deep.middle.reverse(),
                deep.left.iter().rev().map(Node::reverse).collect(),
            ),
        }
    }

    /// Checks every level of this tree and returns its element count.
    ///
    /// # Panics
    ///
    /// Panics if a digit, node or cached size is malformed.
    pub(crate) fn check_invariants(&self, depth: usize) -> usize {
        match self {
            Self::Empty => 0,
            Self::Single(node) => node.check_invariants(depth),
            Self::Deep(deep) => {
                assert!(!deep.left.is_empty(), "empty left digit at depth {depth}");
                assert!(!deep.right.is_empty(), "empty right digit at depth {depth}");
                let left: usize = deep
                    .left
                    .iter()
                    .map(|node| node.check_invariants(depth))
                    .sum();
                let middle = deep.middle.check_invariants(depth + 1);
                let right: usize = deep
                    .right
                    .iter()
                    .map(|node| node.check_invariants(depth))
                    .sum();
                assert_eq!(
                    deep.size,
                    left + middle + right,
                    "cached tree size is stale at depth {depth}"
                );
                deep.size
            }
        }
    }

    /// Appends the number of elements held directly by each level.
    pub(crate) fn level_sizes(&self, levels: &mut Vec<usize>) {
        match self {
            Self::Empty => {}
            Self::Single(node) => levels.push(node.size()),
            Self::Deep(deep) => {
                levels.push(total_size(&deep.left) + total_size(&deep.right));
                deep.middle.level_sizes(levels);
            }
        }
    }
}

fn digit<T, S: Storage<T>>(nodes: Vec<Node<T, S>>) -> Digit<T, S> {
    nodes.into_iter().collect()
}

fn wholes<T, S: Storage<T>>(nodes: &[Node<T, S>]) -> Vec<Fragment<T, S>> {
    nodes.iter().cloned().map(Fragment::Whole).collect()
}

fn is_lone_partial<T, S: Storage<T>>(run: &[Fragment<T, S>]) -> bool {
    matches!(run, [Fragment::Partial(_)])
}

fn insert_into<T, S: Storage<T>>(nodes: &[Node<T, S>], position: usize, slot: S::Slot) -> Vec<Node<T, S>> {
    let (index, offset) = locate_position(nodes, position);
    let (before, after) = siblings(nodes, index);
    let neighborhood = nodes[index].insert(before, after, offset, slot);
    replace_window(nodes, index, neighborhood.into_nodes())
}

fn remove_from<T, S: Storage<T>>(
    nodes: &[Node<T, S>],
    position: usize,
) -> Result<Vec<Node<T, S>>, Partial<T, S>> {
    let (index, offset) = locate(nodes, position);
    let (before, after) = siblings(nodes, index);
    match nodes[index].remove(before, after, offset) {
        Removal::Rebalanced(neighborhood) => Ok(replace_window(nodes, index, neighborhood.into_nodes())),
        Removal::Underflow(partial) => Err(partial),
    }
}

/// Pushes the parts of `nodes` overlapping `offset..end` onto `run`.
/// `start` is the index of the first element of `nodes` and is advanced past
/// them.
fn slice_digit<T, S: Storage<T>>(
    nodes: &[Node<T, S>],
    start: &mut usize,
    offset: usize,
    end: usize,
    run: &mut Vec<Fragment<T, S>>,
) {
    for node in nodes {
        let node_end = *start + node.size();
        if *start < end && offset < node_end {
            let from = offset.max(*start);
            Fragment::push(run, node.slice(from - *start, end.min(node_end) - from));
        }
        *start = node_end;
    }
}
