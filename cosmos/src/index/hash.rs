//! Open-addressing hash index with linear probing
//!
//! The bucket array always has a power-of-two length so probes wrap with a
//! mask. The table doubles (and reinserts every entry) before the load
//! factor would pass 3/4. Removal shifts the rest of the probe run back into
//! the freed slot, so no lookup ever stops early at a hole.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{BuildHasher, BuildHasherDefault};

use log::debug;

use crate::hierarchy::composite::SystemRef;
use crate::index::{fresh_entries, BodyIndex};
use crate::simulation::states::{Body, BodyRef};

pub const MIN_CAPACITY: usize = 8;

pub type DefaultBuildHasher = BuildHasherDefault<DefaultHasher>;

struct Slot {
    key: BodyRef,
    system: SystemRef,
}

pub struct HashIndex<S = DefaultBuildHasher> {
    slots: Vec<Option<Slot>>,
    len: usize,
    collisions: usize,
    hasher: S,
}

impl HashIndex<DefaultBuildHasher> {
    pub fn new() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }

    /// Room for `capacity` buckets, rounded up to a power of two
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultBuildHasher::default())
    }
}

impl Default for HashIndex<DefaultBuildHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BuildHasher> HashIndex<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(MIN_CAPACITY, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        let capacity = capacity.max(MIN_CAPACITY).next_power_of_two();
        Self {
            slots: empty_slots(capacity),
            len: 0,
            collisions: 0,
            hasher,
        }
    }

    /// Number of buckets
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Insertions whose home bucket was already taken by another key
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Keep only the entries for which `keep` returns true
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Body, &SystemRef) -> bool,
    {
        let doomed: Vec<BodyRef> = self
            .slots
            .iter()
            .flatten()
            .filter(|slot| !keep(&*slot.key.borrow(), &slot.system))
            .map(|slot| slot.key.clone())
            .collect();
        for key in doomed {
            self.remove(&*key.borrow());
        }
    }

    fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    fn home(&self, body: &Body) -> usize {
        (self.hasher.hash_one(body) as usize) & self.mask()
    }

    /// `Ok(slot)` holding `body`, or `Err(slot)` where the probe met a free bucket
    fn find(&self, body: &Body) -> Result<usize, usize> {
        let mask = self.mask();
        let mut i = self.home(body);
        loop {
            match &self.slots[i] {
                None => return Err(i),
                Some(slot) if *slot.key.borrow() == *body => return Ok(i),
                Some(_) => i = (i + 1) & mask,
            }
        }
    }

    /// Insert a key known to be absent
    fn insert_new(&mut self, key: BodyRef, system: SystemRef) {
        if (self.len + 1) * 4 > self.slots.len() * 3 {
            self.grow();
        }
        let home = self.home(&key.borrow());
        if self.slots[home].is_some() {
            self.collisions += 1;
        }
        let (Ok(i) | Err(i)) = self.find(&key.borrow());
        self.slots[i] = Some(Slot { key, system });
        self.len += 1;
    }

    fn grow(&mut self) {
        let capacity = self.slots.len() * 2;
        let old = std::mem::replace(&mut self.slots, empty_slots(capacity));
        for slot in old.into_iter().flatten() {
            let (Ok(i) | Err(i)) = self.find(&slot.key.borrow());
            self.slots[i] = Some(slot);
        }
        debug!("hash index grown to {capacity} buckets");
    }
}

fn empty_slots(capacity: usize) -> Vec<Option<Slot>> {
    (0..capacity).map(|_| None).collect()
}

impl<S: BuildHasher> BodyIndex for HashIndex<S> {
    fn add(&mut self, system: &SystemRef) -> bool {
        let fresh = fresh_entries(system, |b| self.find(b).is_ok(), |a, b| a == b);
        let Some(entries) = fresh else {
            return false;
        };
        for (key, parent) in entries {
            self.insert_new(key, parent);
        }
        true
    }

    fn parent_of(&self, body: &Body) -> Option<SystemRef> {
        let i = self.find(body).ok()?;
        self.slots[i].as_ref().map(|slot| slot.system.clone())
    }

    fn remove(&mut self, body: &Body) -> Option<SystemRef> {
        let mut hole = self.find(body).ok()?;
        let removed = self.slots[hole].take()?;
        self.len -= 1;

        // back-shift: pull later members of the run into the hole unless
        // their home bucket lies between the hole and their current slot
        let mask = self.mask();
        let mut i = (hole + 1) & mask;
        while let Some(slot) = &self.slots[i] {
            let home = self.home(&slot.key.borrow());
            if (i.wrapping_sub(home) & mask) >= (i.wrapping_sub(hole) & mask) {
                self.slots[hole] = self.slots[i].take();
                hole = i;
            }
            i = (i + 1) & mask;
        }
        Some(removed.system)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn keys(&self) -> Vec<BodyRef> {
        self.slots
            .iter()
            .flatten()
            .map(|slot| slot.key.clone())
            .collect()
    }
}

impl<S> fmt::Display for HashIndex<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in self.slots.iter().flatten() {
            writeln!(f, "{}", slot.key.borrow().name())?;
        }
        Ok(())
    }
}
