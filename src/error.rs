use thiserror::Error;

/// Errors raised by cursor construction and cursor operations.
///
/// Every error is returned synchronously from the call that triggered it and
/// none are retried internally. A cursor that reported [`Error::Stale`] is out
/// of sync with its tree for good and should be dropped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A cursor was requested over a tree with no elements
    #[error("cannot create a cursor over an empty tree")]
    EmptyTree,

    /// `next` was called after the traversal yielded its last element
    #[error("in-order traversal is exhausted")]
    Exhausted,

    /// The tree was mutated through something other than this cursor since
    /// the cursor last synchronized with it
    #[error("tree was modified during traversal")]
    Stale,

    /// `remove_current` was called before any element was yielded, or twice
    /// without an intervening `next`
    #[error("no element is currently eligible for removal")]
    NoCurrentElement,
}

/// A `Result` alias using this crate's [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;
