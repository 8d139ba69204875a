//! Body → owning-system indexes
//!
//! Three interchangeable realizations of [`BodyIndex`]:
//! - [`ordered::OrderedIndex`]: unbalanced binary search tree under a caller comparator
//! - [`hash::HashIndex`]: open addressing with linear probing
//! - [`flat::FlatIndex`]: insertion-ordered list keyed by body name
//!
//! An index is a snapshot: it is built from a hierarchy and does not follow
//! later changes to that hierarchy.

pub mod flat;
pub mod hash;
pub mod ordered;

use log::debug;

use crate::hierarchy::composite::SystemRef;
use crate::simulation::states::{Body, BodyRef};

pub use flat::FlatIndex;
pub use hash::HashIndex;
pub use ordered::OrderedIndex;

pub trait BodyIndex {
    /// Register every body of `system`, each mapped to the system that
    /// directly holds it
    ///
    /// All or nothing: if any of the bodies is already a key (or the system
    /// repeats one), the index is left unchanged and `false` is returned.
    fn add(&mut self, system: &SystemRef) -> bool;

    /// System directly holding `body`, `None` if `body` is not a key
    fn parent_of(&self, body: &Body) -> Option<SystemRef>;

    fn contains(&self, body: &Body) -> bool {
        self.parent_of(body).is_some()
    }

    /// Drop `body` from the index, returning the system it was mapped to
    fn remove(&mut self, body: &Body) -> Option<SystemRef>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every key, in the realization's own order
    fn keys(&self) -> Vec<BodyRef>;
}

/// Entries of `system` to register, or `None` if the batch collides with
/// an existing key (`is_key`) or with itself (`same_key`)
pub(crate) fn fresh_entries<F, G>(
    system: &SystemRef,
    is_key: F,
    same_key: G,
) -> Option<Vec<(BodyRef, SystemRef)>>
where
    F: Fn(&Body) -> bool,
    G: Fn(&Body, &Body) -> bool,
{
    let entries = system.entries();
    if entries.is_empty() {
        return None;
    }
    for (i, (body, _)) in entries.iter().enumerate() {
        let body = body.borrow();
        if is_key(&*body)
            || entries[..i]
                .iter()
                .any(|(earlier, _)| same_key(&*earlier.borrow(), &*body))
        {
            debug!("{} is already indexed, rejecting {}", body.name(), system.name());
            return None;
        }
    }
    Some(entries)
}

/// Stock comparators for [`OrderedIndex`]
pub mod comparators {
    use std::cmp::Ordering;

    use crate::simulation::states::Body;

    /// Alphabetical by name; equal bodies always tie
    pub fn by_name(a: &Body, b: &Body) -> Ordering {
        a.name().cmp(b.name())
    }

    /// Reverse alphabetical by name
    pub fn by_name_desc(a: &Body, b: &Body) -> Ordering {
        b.name().cmp(a.name())
    }
}
