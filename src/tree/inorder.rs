use std::iter::FusedIterator;

use crate::slab::{Ptr, Slab};

use super::InnerNode;

/// A borrowing in-order traversal of the tree, yielding elements in
/// ascending order
pub struct IterInorder<'a, T> {
    nodes: &'a Slab<InnerNode<T>>,
    stack: Vec<Ptr>,
}

impl<'a, T> IterInorder<'a, T> {
    pub(super) fn new(nodes: &'a Slab<InnerNode<T>>, root: Ptr) -> Self {
        let mut stack = Vec::new();
        let mut current = root;
        while let Some(node) = nodes.get(current) {
            stack.push(current);
            current = node.left;
        }

        Self { nodes, stack }
    }
}

impl<'a, T> Iterator for IterInorder<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let top = self.stack.pop()?;
        let node = &self.nodes[top];

        let mut current = node.right;
        while let Some(child) = self.nodes.get(current) {
            self.stack.push(current);
            current = child.left;
        }

        Some(&node.value)
    }
}

impl<'a, T> FusedIterator for IterInorder<'a, T> {}
