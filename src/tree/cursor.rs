use std::fmt;
use std::marker::PhantomData;

use crate::error::{Error, Result};
use crate::slab::Ptr;

use super::BSTree;

/// A stateful in-order cursor over a [`BSTree`], yielding elements in
/// ascending order and supporting removal of the element it last yielded.
///
/// The cursor stores no borrow of its tree. Instead it holds indexes into the
/// tree's node storage plus the tree length it last synchronized with, and
/// every operation takes the tree by reference. Before any stored index is
/// touched, the recorded length is compared against the tree's live length;
/// a mismatch means the tree was mutated behind the cursor's back and the
/// operation fails with [`Error::Stale`] instead of traversing stale links.
///
/// Any number of cursors may traverse the same tree at the same time. The
/// moment one of them (or any direct caller) mutates the tree, every other
/// cursor becomes stale.
///
/// # Examples
///
/// ```
/// use bstree::BSTree;
///
/// let mut tree: BSTree<i32> = (1..=5).collect();
/// let mut cursor = tree.cursor()?;
///
/// while cursor.has_next(&tree)? {
///     if *cursor.next(&tree)? % 2 == 0 {
///         cursor.remove_current(&mut tree)?;
///     }
/// }
///
/// assert_eq!(tree.to_string(), "1 3 5");
/// # Ok::<(), bstree::Error>(())
/// ```
pub struct InorderCursor<T> {
    /// The chain of ancestors whose right subtree has not been visited yet.
    /// The top of the stack is the next node to yield.
    stack: Vec<Ptr>,
    /// The most recently yielded node
    current: Ptr,
    /// Whether `remove_current` is currently legal
    can_remove: bool,
    /// The tree length this cursor last synchronized with
    expected_len: usize,
    /// One-shot right-link override, see `remove_current`.
    ///
    /// When a two-child removal moves the successor's value into the slot the
    /// cursor just yielded, the next pop of that slot must descend into the
    /// successor's former right subtree, not the slot's own right link (that
    /// subtree is already pending deeper in the stack).
    override_node: Ptr,
    override_right: Ptr,
    _marker: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for InorderCursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InorderCursor")
            .field("stack", &self.stack)
            .field("current", &self.current)
            .field("can_remove", &self.can_remove)
            .field("expected_len", &self.expected_len)
            .finish()
    }
}

impl<T: Ord> InorderCursor<T> {
    pub(super) fn new(tree: &BSTree<T>) -> Self {
        // Push the root and every left descendant so the stack top is the
        // minimum element
        let mut stack = Vec::new();
        let mut current = tree.root;
        while let Some(node) = tree.nodes.get(current) {
            stack.push(current);
            current = node.left;
        }

        Self {
            stack,
            current: Ptr::null(),
            can_remove: false,
            expected_len: tree.len(),
            override_node: Ptr::null(),
            override_right: Ptr::null(),
            _marker: PhantomData,
        }
    }

    /// Fails with [`Error::Stale`] if the tree has been mutated through
    /// anything other than this cursor since the last synchronization.
    fn check_in_sync(&self, tree: &BSTree<T>) -> Result<()> {
        if self.expected_len != tree.len() {
            return Err(Error::Stale);
        }

        Ok(())
    }

    /// Returns true if the traversal has more elements to yield.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Stale`] if the tree was mutated outside this
    /// cursor. The check runs on every call, so even just polling `has_next`
    /// after an external mutation reports the failure immediately.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::{BSTree, Error};
    ///
    /// let mut tree = BSTree::new();
    /// tree.insert(1);
    ///
    /// let cursor = tree.cursor()?;
    /// tree.insert(2);
    ///
    /// assert_eq!(cursor.has_next(&tree), Err(Error::Stale));
    /// # Ok::<(), bstree::Error>(())
    /// ```
    pub fn has_next(&self, tree: &BSTree<T>) -> Result<bool> {
        self.check_in_sync(tree)?;

        Ok(!self.stack.is_empty())
    }

    /// Yields the next element in ascending order.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Exhausted`] when no elements remain and with
    /// [`Error::Stale`] if the tree was mutated outside this cursor.
    pub fn next<'t>(&mut self, tree: &'t BSTree<T>) -> Result<&'t T> {
        if !self.has_next(tree)? {
            return Err(Error::Exhausted);
        }

        let top = match self.stack.pop() {
            Some(ptr) => ptr,
            None => return Err(Error::Exhausted),
        };

        self.can_remove = true;
        self.current = top;

        // Establish the path to the in-order successor: the yielded node's
        // right child followed by that child's entire left-descendant chain
        let node = tree.nodes.get(top).ok_or(Error::Stale)?;
        let mut current = if top == self.override_node {
            let right = self.override_right;
            self.override_node = Ptr::null();
            self.override_right = Ptr::null();
            right
        } else {
            node.right
        };
        while let Some(child) = tree.nodes.get(current) {
            self.stack.push(current);
            current = child.left;
        }

        Ok(&node.value)
    }

    /// Removes the element most recently yielded by [`next`](Self::next) and
    /// returns it, delegating to the tree's own removal descent keyed on that
    /// element's value.
    ///
    /// Removal is single-use per yielded element: calling this twice without
    /// an intervening `next` fails, as does calling it before the first
    /// `next`. A successful removal re-synchronizes the cursor with the tree,
    /// so the traversal continues without going stale.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NoCurrentElement`] when no element is eligible and
    /// with [`Error::Stale`] if the tree was mutated outside this cursor.
    ///
    /// # Examples
    ///
    /// ```
    /// use bstree::{BSTree, Error};
    ///
    /// let mut tree = BSTree::new();
    /// tree.insert(2);
    ///
    /// let mut cursor = tree.cursor()?;
    /// assert_eq!(cursor.remove_current(&mut tree), Err(Error::NoCurrentElement));
    ///
    /// assert_eq!(*cursor.next(&tree)?, 2);
    /// assert_eq!(cursor.remove_current(&mut tree)?, 2);
    /// assert_eq!(cursor.remove_current(&mut tree), Err(Error::NoCurrentElement));
    ///
    /// assert_eq!(tree.len(), 0);
    /// assert_eq!(cursor.has_next(&tree)?, false);
    /// # Ok::<(), bstree::Error>(())
    /// ```
    pub fn remove_current(&mut self, tree: &mut BSTree<T>) -> Result<T> {
        if !self.can_remove {
            return Err(Error::NoCurrentElement);
        }
        self.check_in_sync(tree)?;

        // When the current node still has both children, the removal below
        // keeps its slot alive (the in-order successor's value moves into it)
        // and frees the successor's slot instead. That successor is exactly
        // the top of the stack: redirect the stack to the slot the value
        // moved to, and record that the pop of that slot must continue into
        // the successor's former right subtree.
        let repair = {
            let node = tree.nodes.get(self.current).ok_or(Error::Stale)?;
            if node.left.is_null() || node.right.is_null() {
                None
            } else {
                // leftmost node of the right subtree
                let mut succ = node.right;
                while let Some(child) = tree.nodes.get(succ) {
                    if child.left.is_null() {
                        break;
                    }
                    succ = child.left;
                }
                tree.nodes.get(succ).map(|child| child.right)
            }
        };

        self.expected_len -= 1;
        let removed = tree.take_at(self.current).ok_or(Error::Stale)?;

        if let Some(succ_right) = repair {
            if let Some(top) = self.stack.last_mut() {
                *top = self.current;
            }
            self.override_node = self.current;
            self.override_right = succ_right;
        }

        self.can_remove = false;
        self.current = Ptr::null();

        Ok(removed)
    }
}
