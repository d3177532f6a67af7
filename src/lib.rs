//! An ordered set backed by an unbalanced binary search tree, with a
//! fail-fast in-order cursor that supports removing elements mid-traversal.
//!
//! The tree itself is deliberately simple: no rebalancing, iterative
//! insert/lookup/remove, and a length counter that always matches the number
//! of reachable nodes. The interesting part is the [`InorderCursor`]: a
//! detached cursor that yields elements in ascending order and detects any
//! mutation of the tree that bypassed it, failing with [`Error::Stale`]
//! instead of walking stale links.
//!
//! # Examples
//!
//! ```
//! use bstree::BSTree;
//!
//! let mut tree = BSTree::new();
//! for value in [5, 3, 8, 1, 4, 7, 9] {
//!     tree.insert(value);
//! }
//!
//! assert_eq!(tree.to_string(), "1 3 4 5 7 8 9");
//!
//! // Remove every element greater than 6 during a single traversal
//! let mut cursor = tree.cursor()?;
//! while cursor.has_next(&tree)? {
//!     if *cursor.next(&tree)? > 6 {
//!         cursor.remove_current(&mut tree)?;
//!     }
//! }
//!
//! assert_eq!(tree.to_string(), "1 3 4 5");
//! # Ok::<(), bstree::Error>(())
//! ```

mod error;
mod slab;
pub mod tree;

pub use error::{Error, Result};
pub use tree::{BSTree, InorderCursor, IterInorder};

#[macro_export(local_inner_macros)]
macro_rules! bstree {
    (@single $($x:tt)*) => (());
    (@count $($rest:expr),*) => (<[()]>::len(&[$(bstree!(@single $rest)),*]));

    ($($value:expr,)+) => { bstree!($($value),+) };
    ($($value:expr),*) => {
        {
            let _cap = bstree!(@count $($value),*);
            let mut _tree = $crate::BSTree::with_capacity(_cap);
            $(
                let _ = _tree.insert($value);
            )*
            _tree
        }
    };
}
