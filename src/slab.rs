use std::mem;
use std::ops::{Index, IndexMut};

#[cfg(test)]
use static_assertions::const_assert_eq;

/// An index into a slab, or "null"
///
/// This type is essentially `Option<usize>`. The value usize::MAX is
/// reserved to represent `None` or "null". That keeps links stored inline in
/// entries down to a single word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Ptr(usize);

// We've designed `Ptr` to use as little space as possible to help with cache
#[cfg(test)]
const_assert_eq!(mem::size_of::<Ptr>(), mem::size_of::<usize>());
// Using `Option<usize>` directly would use more space.
#[cfg(test)]
const_assert_eq!(mem::size_of::<Option<usize>>(), 2 * mem::size_of::<usize>());

impl Default for Ptr {
    #[inline(always)]
    fn default() -> Self {
        Self::null()
    }
}

impl Ptr {
    #[inline(always)]
    pub fn new(index: usize) -> Option<Self> {
        if index == usize::MAX {
            None
        } else {
            Some(Ptr(index))
        }
    }

    #[inline(always)]
    pub fn null() -> Self {
        Ptr(usize::MAX)
    }

    // Methods on this type must be `#[inline]` to help the compiler see that the `Option` values
    // are only intermediate values used to make writing code easier. Instead of checking for `None`
    // and then `usize::MAX`, we want the compiler to just check the latter.
    #[inline(always)]
    pub fn into_index(self) -> Option<usize> {
        let Ptr(index) = self;
        if index == usize::MAX {
            None
        } else {
            Some(index)
        }
    }

    #[inline(always)]
    pub fn is_null(self) -> bool {
        self.0 == usize::MAX
    }
}

#[derive(Debug, Clone)]
enum Entry<T> {
    Occupied(T),
    /// A removed slot, linking to the next reusable slot
    Free { next: Ptr },
}

/// An allocation primitive similar to `Vec`, but implemented to reuse space from removed entries.
///
/// Items are kept contiguously in memory, but indexes are not shifted when an individual item is
/// removed. Instead of always pushing items after the previously pushed item, this data structure
/// will reuse space from previously removed entries when possible. Indexes returned from `push`
/// stay valid until the entry is removed or the slab is cleared.
///
/// Every entry records whether it currently holds a value, so `get` on a
/// removed or out-of-bounds index is always a checked `None`, never undefined
/// behavior. Callers that hold on to indexes across removals rely on this.
#[derive(Debug, Clone)]
pub struct Slab<T> {
    items: Vec<Entry<T>>,
    /// The index of the first entry in the free list or Ptr::null() if the free list is empty
    ///
    /// The free list is a linked list stored in `items` that is used as a stack to track which
    /// entries have space that can be reused in calls to `push`.
    free_list_head: Ptr,
    /// The length of the free list
    free_len: usize,
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self {
            items: Vec::default(),
            free_list_head: Ptr::null(),
            free_len: 0,
        }
    }
}

impl<T> Slab<T> {
    /// Creates an empty slab
    ///
    /// The slab is initially created with a capacity of 0, so it will not allocate until it is
    /// first inserted into.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty slab with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Returns the number of entries in the slab that contain values
    ///
    /// This is the number of items pushed minus the number of items removed
    pub fn len(&self) -> usize {
        self.items.len() - self.free_len
    }

    /// Returns true if the slab is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of elements the slab can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Returns a reference to the value at the given index, or `None` if the
    /// index is null, out of bounds, or points at a removed entry
    pub fn get(&self, ptr: Ptr) -> Option<&T> {
        match self.items.get(ptr.into_index()?) {
            Some(Entry::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value at the given index, or `None`
    /// if the index is null, out of bounds, or points at a removed entry
    pub fn get_mut(&mut self, ptr: Ptr) -> Option<&mut T> {
        match self.items.get_mut(ptr.into_index()?) {
            Some(Entry::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Pushes a value into the slab and returns the index at which it was inserted.
    ///
    /// The item may be inserted at the end of the list, or in the space from an item that was
    /// previously removed.
    pub fn push(&mut self, value: T) -> Ptr {
        // Check if we can reuse some space from the free list
        if let Some(free_list_head) = self.free_list_head.into_index() {
            let entry = &mut self.items[free_list_head];

            // Update the free list to point to the next free list entry
            let next = match *entry {
                Entry::Free { next } => next,
                Entry::Occupied(_) => unreachable!("bug: occupied entry on the free list"),
            };
            self.free_list_head = next;
            self.free_len -= 1;

            *entry = Entry::Occupied(value);

            return Ptr(free_list_head);
        }

        let index = self.items.len();
        // Since we store `Ptr` internally, we can't have usize::MAX as a valid index into the slab
        if index >= usize::MAX {
            panic!("cannot have more than usize::MAX - 1 entries in slab");
        }

        self.items.push(Entry::Occupied(value));

        Ptr(index)
    }

    /// Removes an item from the slab, returning its value.
    ///
    /// The space for the item will be reused in future calls to `push`. This does not move or
    /// modify any other entries in the slab. Their indexes remain the same and can still be used.
    ///
    /// # Panics
    ///
    /// Panics if the index is null, out of bounds, or points at an entry that
    /// was already removed.
    pub fn remove(&mut self, ptr: Ptr) -> T {
        let index = match ptr.into_index() {
            Some(index) if index < self.items.len() => index,
            _ => panic!("invalid pointer passed to Slab::remove"),
        };
        if let Entry::Free { .. } = self.items[index] {
            panic!("invalid pointer passed to Slab::remove");
        }

        // Retrieve the value in this entry by swapping in a free entry
        let prev = mem::replace(&mut self.items[index], Entry::Free {
            next: self.free_list_head,
        });

        self.free_list_head = Ptr(index);
        self.free_len += 1;

        match prev {
            Entry::Occupied(value) => value,
            Entry::Free { .. } => unreachable!(),
        }
    }

    /// Clears the slab, removing all values.
    ///
    /// Note that this method has no effect on the allocated capacity of the slab.
    ///
    /// This invalidates all previous indexes returned from `push`.
    pub fn clear(&mut self) {
        // Clearing `items` marks every entry as free without affecting the allocated capacity.
        self.items.clear();
        // The free list resided in `items`, so it must be reset as well
        self.free_list_head = Ptr::null();
        self.free_len = 0;
    }

    /// Reserves capacity for at least `additional` more elements to be inserted in the slab.
    pub fn reserve(&mut self, additional: usize) {
        self.items.reserve(additional)
    }

    /// Shrinks the capacity of the slab as much as possible.
    ///
    /// It will drop down as close as possible to the length but may still be greater.
    pub fn shrink_to_fit(&mut self) {
        self.items.shrink_to_fit()
    }
}

impl<T> Index<Ptr> for Slab<T> {
    type Output = T;

    fn index(&self, ptr: Ptr) -> &T {
        match self.get(ptr) {
            Some(value) => value,
            None => panic!("invalid pointer used to index slab"),
        }
    }
}

impl<T> IndexMut<Ptr> for Slab<T> {
    fn index_mut(&mut self, ptr: Ptr) -> &mut T {
        match self.get_mut(ptr) {
            Some(value) => value,
            None => panic!("invalid pointer used to index slab"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ptr_api() {
        let ptr = Ptr::new(0).unwrap();
        assert_eq!(ptr.into_index(), Some(0));
        assert!(!ptr.is_null());

        let ptr = Ptr::new(5).unwrap();
        assert_eq!(ptr.into_index(), Some(5));
        assert!(!ptr.is_null());

        let ptr = Ptr::new(usize::MAX);
        assert_eq!(ptr, None);

        let ptr = Ptr::null();
        assert_eq!(ptr.into_index(), None);
        assert!(ptr.is_null());

        // default to the null ptr
        assert_eq!(Ptr::default(), Ptr::null());
    }

    #[test]
    fn push_remove_reuses_slots() {
        let mut slab = Slab::new();

        assert_eq!(slab.len(), 0);
        assert!(slab.is_empty());
        assert_eq!(slab.capacity(), 0);

        // Push a single value
        let first = slab.push(19384);
        assert_eq!(slab.get(first), Some(&19384));
        assert_eq!(slab.len(), 1);
        assert!(!slab.is_empty());

        // Remove the only value in the slab
        assert_eq!(slab.remove(first), 19384);
        assert_eq!(slab.get(first), None);
        assert!(slab.is_empty());
        assert!(slab.capacity() > 0);

        // The freed slot gets reused by the next push
        let second = slab.push(831783);
        assert_eq!(second, first);
        assert_eq!(slab.get(second), Some(&831783));
        assert_eq!(slab.len(), 1);

        // Push a second value
        let third = slab.push(57);
        assert_ne!(third, second);
        assert_eq!(slab.get(second), Some(&831783));
        assert_eq!(slab.get(third), Some(&57));
        assert_eq!(slab.len(), 2);

        // Remove the first value (second should still be available at the same index)
        assert_eq!(slab.remove(second), 831783);
        assert_eq!(slab.get(second), None);
        assert_eq!(slab.get(third), Some(&57));
        assert_eq!(slab.len(), 1);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut slab = Slab::new();

        let ptr = slab.push(-12);
        *slab.get_mut(ptr).unwrap() *= -1;
        assert_eq!(slab.get(ptr), Some(&12));

        assert_eq!(slab.get_mut(Ptr::null()), None);
    }

    #[test]
    fn indexes_stay_stable_across_growth() {
        let mut slab = Slab::new();

        let first = slab.push(-1);

        // Push enough values for the capacity to change a few times
        let initial_capacity = slab.capacity();
        let mut ptrs = Vec::new();
        for i in 0.. {
            ptrs.push(slab.push(i as i32));
            if slab.capacity() >= initial_capacity * 5 {
                break;
            }
        }

        // indexes returned from push remain stable and usable even after the capacity changed
        assert_eq!(slab.get(first), Some(&-1));
        for (i, ptr) in ptrs.iter().copied().enumerate() {
            assert_eq!(slab.get(ptr), Some(&(i as i32)));
        }

        // change the capacity again
        slab.shrink_to_fit();
        assert_eq!(slab.get(first), Some(&-1));
        for (i, ptr) in ptrs.iter().copied().enumerate() {
            assert_eq!(slab.get(ptr), Some(&(i as i32)));
        }
    }

    #[test]
    fn clear_resets_but_keeps_capacity() {
        let mut slab = Slab::new();

        let first = slab.push("abc".to_string());
        slab.push("def".to_string());
        let capacity = slab.capacity();

        slab.clear();
        assert!(slab.is_empty());
        assert_eq!(slab.capacity(), capacity);
        assert_eq!(slab.get(first), None);

        // insertions after clear start from a clean free list
        let ptr = slab.push("ghi".to_string());
        assert_eq!(slab.get(ptr), Some(&"ghi".to_string()));
        assert_eq!(slab.len(), 1);

        // clearing an empty slab is fine too
        slab.clear();
        slab.clear();
        assert!(slab.is_empty());
    }

    #[test]
    #[should_panic(expected = "invalid pointer")]
    fn remove_vacant_panics() {
        let mut slab = Slab::new();
        let ptr = slab.push(1);
        slab.remove(ptr);
        slab.remove(ptr);
    }
}
