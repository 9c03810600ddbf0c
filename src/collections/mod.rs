use std::hash::BuildHasherDefault;

use ahash::AHasher;
use linked_hash_set::LinkedHashSet;

/// An insertion-ordered hash set using `ahash`
pub(crate) type LinkedAHashSet<T> = LinkedHashSet<T, BuildHasherDefault<AHasher>>;
