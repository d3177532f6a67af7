mod cursor;
mod inorder;

pub use cursor::*;
pub use inorder::*;

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;
use std::mem;

use crate::error::{Error, Result};
use crate::slab::{Ptr, Slab};

#[derive(Debug, Clone)]
struct InnerNode<T> {
    value: T,
    left: Ptr,
    right: Ptr,
}

impl<T> InnerNode<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            left: Ptr::null(),
            right: Ptr::null(),
        }
    }
}

/// An ordered set backed by an unbalanced binary search tree (BST)
///
/// BST properties: For each node with value `v`:
/// - The value of each node in the left subtree is less than `v`
/// - The value of each node in the right subtree is greater than `v`
///
/// Duplicate values are not allowed. Inserting a value that already exists in
/// the tree does not modify the tree.
///
/// No rebalancing is ever performed, so the shape of the tree is entirely
/// determined by the insertion order. Inserting values in sorted order
/// degenerates the tree into a linked list.
///
/// Nodes live in a slab indexed by plain integers, so the tree exclusively
/// owns every node reachable from its root and child links are indexes
/// rather than boxed pointers.
#[derive(Clone)]
pub struct BSTree<T> {
    nodes: Slab<InnerNode<T>>,
    root: Ptr,
    len: usize,
}

impl<T> Default for BSTree<T> {
    fn default() -> Self {
        Self {
            nodes: Slab::new(),
            root: Ptr::null(),
            len: 0,
        }
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for BSTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter_inorder()).finish()
    }
}

/// Renders the elements in ascending order, space-separated
impl<T: Ord + fmt::Display> fmt::Display for BSTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut values = self.iter_inorder();
        if let Some(value) = values.next() {
            write!(f, "{}", value)?;
        }
        for value in values {
            write!(f, " {}", value)?;
        }

        Ok(())
    }
}

impl<T: Ord> PartialEq for BSTree<T> {
    fn eq(&self, other: &Self) -> bool {
        // Trees with different shapes but the same elements compare equal
        self.len() == other.len()
            && self.iter_inorder().zip(other.iter_inorder()).all(|(v1, v2)| v1 == v2)
    }
}

impl<T: Ord> Eq for BSTree<T> {}

impl<T: Ord> BSTree<T> {
    /// Creates an empty `BSTree`
    ///
    /// The tree is initially created with a capacity of 0, so it will not allocate until it is
    /// first inserted into.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::BSTree;
    /// let mut tree: BSTree<&str> = BSTree::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty tree with the specified capacity.
    ///
    /// The tree will be able to hold at least `capacity` elements without reallocating. If
    /// `capacity` is 0, the tree will not allocate.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Returns the number of elements in the tree (i.e. the number of nodes reachable from the
    /// root)
    ///
    /// Time complexity: `O(1)`
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::BSTree;
    ///
    /// let mut tree = BSTree::new();
    /// assert_eq!(tree.len(), 0);
    /// tree.insert(1);
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.len, self.nodes.len());
        self.len
    }

    /// Returns true if the tree is empty
    ///
    /// Time complexity: `O(1)`
    pub fn is_empty(&self) -> bool {
        debug_assert!(self.nodes.is_empty() == self.root.is_null());
        self.len() == 0
    }

    /// Returns the number of elements the tree can hold without reallocating.
    ///
    /// This number is a lower bound; the tree might be able to hold more, but is guaranteed to be
    /// able to hold at least this many.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Returns `true` if the tree contains the specified value.
    ///
    /// The value may be any borrowed form of the tree's value type, but the ordering on the
    /// borrowed form must match the ordering on the value type.
    ///
    /// Time complexity: `O(height)`
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::BSTree;
    ///
    /// let mut tree = BSTree::new();
    /// tree.insert(1);
    /// assert!(tree.contains(&1));
    /// assert!(!tree.contains(&2));
    /// ```
    pub fn contains<Q>(&self, value: &Q) -> bool
        where T: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.get(value).is_some()
    }

    /// Returns a reference to the value in the tree, if any, that is equal to the given one
    ///
    /// The value may be any borrowed form of the tree's value type, but the ordering on the
    /// borrowed form must match the ordering on the value type.
    ///
    /// Time complexity: `O(height)`
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::BSTree;
    ///
    /// let mut tree = BSTree::new();
    /// tree.insert(String::from("abc"));
    /// assert_eq!(tree.get("abc"), Some(&String::from("abc")));
    /// assert_eq!(tree.get("def"), None);
    /// ```
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
        where T: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(node) = self.nodes.get(current) {
            match value.cmp(node.value.borrow()) {
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
                Ordering::Equal => return Some(&node.value),
            }
        }

        None
    }

    /// Inserts a new value into the tree
    ///
    /// If the tree did not have this value present, `true` is returned.
    ///
    /// If the tree did have this value present, `false` is returned, the
    /// value is dropped, and the length does not change.
    ///
    /// Time complexity: `O(height)`, no rebalancing
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::BSTree;
    ///
    /// let mut tree = BSTree::new();
    /// assert!(tree.insert(37));
    /// assert!(!tree.insert(37));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        if self.root.is_null() {
            self.root = self.nodes.push(InnerNode::new(value));
            self.len += 1;
            return true;
        }

        let mut current = self.root;
        loop {
            let (ord, left, right) = {
                let node = &self.nodes[current];
                (value.cmp(&node.value), node.left, node.right)
            };

            match ord {
                Ordering::Less => {
                    // Value not found, insert where we stopped
                    if left.is_null() {
                        let ptr = self.nodes.push(InnerNode::new(value));
                        self.nodes[current].left = ptr;
                        self.len += 1;
                        log::trace!("BSTree::insert: linked left leaf, len = {}", self.len);
                        return true;
                    }
                    current = left;
                },

                Ordering::Greater => {
                    // Value not found, insert where we stopped
                    if right.is_null() {
                        let ptr = self.nodes.push(InnerNode::new(value));
                        self.nodes[current].right = ptr;
                        self.len += 1;
                        log::trace!("BSTree::insert: linked right leaf, len = {}", self.len);
                        return true;
                    }
                    current = right;
                },

                Ordering::Equal => {
                    // An equal element is never linked in: it would sit below
                    // an equal-valued node and be unreachable by the descent.
                    // The length only counts reachable nodes.
                    log::trace!("BSTree::insert: dropped equal element, len = {}", self.len);
                    return false;
                },
            }
        }
    }

    /// Removes a value from the tree. Returns whether the value was present in the tree.
    ///
    /// The value may be any borrowed form of the tree's value type, but the ordering on the
    /// borrowed form must match the ordering on the value type.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::BSTree;
    ///
    /// let mut tree = BSTree::new();
    /// tree.insert(String::from("abc"));
    /// assert!(tree.remove("abc"));
    /// assert!(!tree.remove("def"));
    /// ```
    pub fn remove<Q>(&mut self, value: &Q) -> bool
        where T: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.take(value).is_some()
    }

    /// Removes and returns the value in the tree, if any, that is equal to the given one.
    ///
    /// The value may be any borrowed form of the tree's value type, but the ordering on the
    /// borrowed form must match the ordering on the value type.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::BSTree;
    ///
    /// let mut tree = BSTree::new();
    /// tree.insert(String::from("abc"));
    /// assert_eq!(tree.take("abc"), Some(String::from("abc")));
    /// assert_eq!(tree.take("abc"), None);
    /// ```
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
        where T: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let (ptr, parent) = self.locate(value)?;
        self.len -= 1;
        Some(self.unlink(ptr, parent))
    }

    /// Clears the tree, removing all elements
    ///
    /// Note that this method has no effect on the allocated capacity of the tree.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = Ptr::null();
        self.len = 0;
    }

    /// Returns a cursor positioned before the first (smallest) element.
    ///
    /// The cursor is fail-fast: any mutation of the tree that bypasses the
    /// cursor's own [`remove_current`](InorderCursor::remove_current) makes
    /// every later cursor operation fail with [`Error::Stale`].
    ///
    /// # Errors
    ///
    /// Fails with [`Error::EmptyTree`] if the tree has no elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::{BSTree, Error};
    ///
    /// let mut tree = BSTree::new();
    /// assert_eq!(tree.cursor().err(), Some(Error::EmptyTree));
    ///
    /// tree.insert(2);
    /// tree.insert(1);
    /// tree.insert(3);
    ///
    /// let mut cursor = tree.cursor()?;
    /// let mut values = Vec::new();
    /// while cursor.has_next(&tree)? {
    ///     values.push(*cursor.next(&tree)?);
    /// }
    /// assert_eq!(values, [1, 2, 3]);
    /// # Ok::<(), bstree::Error>(())
    /// ```
    pub fn cursor(&self) -> Result<InorderCursor<T>> {
        if self.root.is_null() {
            return Err(Error::EmptyTree);
        }

        Ok(InorderCursor::new(self))
    }

    /// Performs an in-order traversal of the tree, yielding the elements in ascending order
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::BSTree;
    ///
    /// let tree: BSTree<i32> = [5, 3, 8].iter().copied().collect();
    /// let values: Vec<_> = tree.iter_inorder().copied().collect();
    /// assert_eq!(values, [3, 5, 8]);
    /// ```
    pub fn iter_inorder(&self) -> IterInorder<'_, T> {
        IterInorder::new(&self.nodes, self.root)
    }

    /// Reserves capacity for at least `additional` more elements to be inserted in the tree.
    pub fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional)
    }

    /// Shrinks the capacity of the tree as much as possible.
    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit()
    }

    /// Finds the node holding `value` along with its parent, tracked during
    /// the descent. The parent is null when the node is the root.
    fn locate<Q>(&self, value: &Q) -> Option<(Ptr, Ptr)>
        where T: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let mut parent = Ptr::null();
        let mut current = self.root;
        while let Some(node) = self.nodes.get(current) {
            match value.cmp(node.value.borrow()) {
                Ordering::Equal => return Some((current, parent)),
                Ordering::Less => {
                    parent = current;
                    current = node.left;
                },
                Ordering::Greater => {
                    parent = current;
                    current = node.right;
                },
            }
        }

        None
    }

    /// Removes the node at `ptr` by running the same value-keyed descent that
    /// [`take`](Self::take) uses. Since equal elements are never linked in,
    /// the descent lands back on `ptr` itself.
    ///
    /// Returns `None` if `ptr` no longer points at a live node.
    fn take_at(&mut self, ptr: Ptr) -> Option<T> {
        let (found, parent) = {
            let value = &self.nodes.get(ptr)?.value;
            self.locate(value)?
        };
        self.len -= 1;
        Some(self.unlink(found, parent))
    }

    /// Unlinks the node at `ptr` from the tree and returns its value.
    ///
    /// `parent` must be the node's parent as produced by `locate`, and the
    /// length must already have been updated by the caller.
    fn unlink(&mut self, ptr: Ptr, parent: Ptr) -> T {
        let (left, right) = {
            let node = &self.nodes[ptr];
            (node.left, node.right)
        };

        // A node missing a child is spliced out of its parent link directly
        if left.is_null() || right.is_null() {
            let child = if left.is_null() { right } else { left };

            if parent.is_null() {
                self.root = child;
            } else if self.nodes[parent].left == ptr {
                self.nodes[parent].left = child;
            } else {
                self.nodes[parent].right = child;
            }

            log::trace!("BSTree::unlink: spliced out node, len = {}", self.len);
            return self.nodes.remove(ptr).value;
        }

        // Neither subtree is empty. The node keeps its slot and takes over
        // the value of its in-order successor: the leftmost node of the right
        // subtree. The successor has no left child by construction, so
        // unlinking it is always the simple splice.
        let mut succ_parent = ptr;
        let mut succ = right;
        loop {
            let next = self.nodes[succ].left;
            if next.is_null() {
                break;
            }
            succ_parent = succ;
            succ = next;
        }

        let succ_right = self.nodes[succ].right;
        if succ_parent == ptr {
            self.nodes[succ_parent].right = succ_right;
        } else {
            self.nodes[succ_parent].left = succ_right;
        }

        log::trace!("BSTree::unlink: promoted in-order successor, len = {}", self.len);
        let succ_node = self.nodes.remove(succ);
        mem::replace(&mut self.nodes[ptr].value, succ_node.value)
    }
}

impl<T: Ord> Extend<T> for BSTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for BSTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}
