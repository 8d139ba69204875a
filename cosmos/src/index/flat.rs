//! Insertion-ordered index keyed by body name
//!
//! Meant for flat subsystems (systems holding bodies only), where the
//! owning system of a body is the whole subsystem. Lookups are linear.

use std::fmt;

use crate::hierarchy::composite::SystemRef;
use crate::index::{fresh_entries, BodyIndex};
use crate::simulation::states::{Body, BodyRef};

struct Entry {
    name: String,
    key: BodyRef,
    system: SystemRef,
}

#[derive(Default)]
pub struct FlatIndex {
    entries: Vec<Entry>,
}

impl FlatIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// System holding the body called `name`
    pub fn parent_by_name(&self, name: &str) -> Option<SystemRef> {
        self.position(name).map(|i| self.entries[i].system.clone())
    }

    /// Registration order of the body called `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn get(&self, i: usize) -> Option<(&BodyRef, &SystemRef)> {
        self.entries.get(i).map(|e| (&e.key, &e.system))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BodyRef, &SystemRef)> + '_ {
        self.entries.iter().map(|e| (&e.key, &e.system))
    }
}

impl BodyIndex for FlatIndex {
    fn add(&mut self, system: &SystemRef) -> bool {
        let fresh = fresh_entries(
            system,
            |b| self.position(b.name()).is_some(),
            |a, b| a.name() == b.name(),
        );
        let Some(entries) = fresh else {
            return false;
        };
        self.entries.extend(entries.into_iter().map(|(key, system)| Entry {
            name: key.name(),
            key,
            system,
        }));
        true
    }

    fn parent_of(&self, body: &Body) -> Option<SystemRef> {
        self.parent_by_name(body.name())
    }

    fn remove(&mut self, body: &Body) -> Option<SystemRef> {
        let i = self.position(body.name())?;
        Some(self.entries.remove(i).system)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn keys(&self) -> Vec<BodyRef> {
        self.entries.iter().map(|e| e.key.clone()).collect()
    }
}

impl fmt::Display for FlatIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.entries {
            writeln!(f, "({}, {})", e.name, e.system.borrow().name())?;
        }
        Ok(())
    }
}
