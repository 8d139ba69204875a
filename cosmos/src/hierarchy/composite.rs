//! Named, ordered systems of bodies and nested subsystems
//!
//! A `CompositeSystem` holds `Component`s in insertion order. Systems are
//! shared through `SystemRef` so that an index can point at the very system
//! a body lives in while the integrator keeps moving that body.
//!
//! Name uniqueness is checked against direct children only. Indexes built
//! from a hierarchy enforce uniqueness over the whole flattened sequence.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::error::{CosmosError, Result};
use crate::simulation::states::{Body, BodyRef, NVec3};

/// A direct child of a `CompositeSystem`
#[derive(Debug, Clone)]
pub enum Component {
    Body(BodyRef),
    System(SystemRef),
}

impl Component {
    pub fn name(&self) -> String {
        match self {
            Component::Body(b) => b.name(),
            Component::System(s) => s.name(),
        }
    }

    pub fn mass(&self) -> f64 {
        match self {
            Component::Body(b) => b.mass(),
            Component::System(s) => s.borrow().mass(),
        }
    }

    pub fn body_count(&self) -> usize {
        match self {
            Component::Body(_) => 1,
            Component::System(s) => s.borrow().body_count(),
        }
    }

    pub fn mass_center(&self) -> NVec3 {
        match self {
            Component::Body(b) => b.borrow().position(),
            Component::System(s) => s.borrow().mass_center(),
        }
    }
}

impl From<BodyRef> for Component {
    fn from(body: BodyRef) -> Self {
        Component::Body(body)
    }
}

impl From<Body> for Component {
    fn from(body: Body) -> Self {
        Component::Body(BodyRef::new(body))
    }
}

impl From<SystemRef> for Component {
    fn from(system: SystemRef) -> Self {
        Component::System(system)
    }
}

impl From<CompositeSystem> for Component {
    fn from(system: CompositeSystem) -> Self {
        Component::System(SystemRef::new(system))
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Body(b) => f.write_str(b.borrow().name()),
            Component::System(s) => fmt::Display::fmt(&*s.borrow(), f),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompositeSystem {
    name: String,
    children: Vec<Component>,
}

impl CompositeSystem {
    /// Empty system
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// System seeded with at least two components
    ///
    /// Components whose name repeats an earlier sibling are skipped, like
    /// they would be by [`CompositeSystem::add`].
    pub fn seeded<I, C>(name: impl Into<String>, children: I) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Component>,
    {
        let mut system = Self::new(name);
        for child in children {
            system.add(child);
        }
        if system.children.len() < 2 {
            return Err(CosmosError::InvalidArgument(format!(
                "system {} needs at least two distinct children",
                system.name
            )));
        }
        Ok(system)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append `component` unless a direct child already carries its name.
    /// Returns whether the system changed.
    pub fn add(&mut self, component: impl Into<Component>) -> bool {
        let component = component.into();
        if self.position_of(&component.name()).is_some() {
            return false;
        }
        self.children.push(component);
        true
    }

    /// Insert `component` at position `i` (`0..=len()`), same uniqueness rule as `add`
    pub fn insert(&mut self, i: usize, component: impl Into<Component>) -> bool {
        let component = component.into();
        if i > self.children.len() || self.position_of(&component.name()).is_some() {
            return false;
        }
        self.children.insert(i, component);
        true
    }

    /// Remove the direct child called `name`
    pub fn remove(&mut self, name: &str) -> Option<Component> {
        let i = self.position_of(name)?;
        Some(self.children.remove(i))
    }

    /// Direct child called `name`
    pub fn get(&self, name: &str) -> Option<Component> {
        self.position_of(name).map(|i| self.children[i].clone())
    }

    pub fn child(&self, i: usize) -> Option<&Component> {
        self.children.get(i)
    }

    pub fn children(&self) -> &[Component] {
        &self.children
    }

    /// Number of direct children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn mass(&self) -> f64 {
        self.children.iter().map(Component::mass).sum()
    }

    pub fn body_count(&self) -> usize {
        self.children.iter().map(Component::body_count).sum()
    }

    /// Same as [`CompositeSystem::body_count`]
    pub fn size(&self) -> usize {
        self.body_count()
    }

    /// Mass-weighted mean position, zero for a massless system
    pub fn mass_center(&self) -> NVec3 {
        let mass = self.mass();
        if mass == 0.0 {
            return NVec3::zeros();
        }
        let weighted = self
            .children
            .iter()
            .fold(NVec3::zeros(), |acc, c| acc + c.mass_center() * c.mass());
        weighted / mass
    }

    /// True if every direct child is a body
    pub fn is_flat(&self) -> bool {
        self.children.iter().all(|c| matches!(c, Component::Body(_)))
    }

    /// Shallow copy with the children in reverse order
    pub fn reversed(&self) -> Self {
        Self {
            name: self.name.clone(),
            children: self.children.iter().rev().cloned().collect(),
        }
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|c| c.name() == name)
    }
}

impl fmt::Display for CompositeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.name)?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{child}")?;
        }
        f.write_str("}")
    }
}

/// Shared, mutable handle to a [`CompositeSystem`]
#[derive(Clone)]
pub struct SystemRef(Rc<RefCell<CompositeSystem>>);

impl SystemRef {
    pub fn new(system: CompositeSystem) -> Self {
        SystemRef(Rc::new(RefCell::new(system)))
    }

    pub fn borrow(&self) -> Ref<'_, CompositeSystem> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, CompositeSystem> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &SystemRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    /// [`CompositeSystem::add`] that also refuses to nest a system inside itself
    pub fn add(&self, component: impl Into<Component>) -> bool {
        let component = component.into();
        if let Component::System(s) = &component {
            if s.ptr_eq(self) || s.encloses(self) {
                return false;
            }
        }
        self.0.borrow_mut().add(component)
    }

    /// True if `other` is nested somewhere below this system
    pub fn encloses(&self, other: &SystemRef) -> bool {
        self.0.borrow().children.iter().any(|c| match c {
            Component::System(s) => s.ptr_eq(other) || s.encloses(other),
            Component::Body(_) => false,
        })
    }

    /// Depth-first, left-to-right traversal over every body below this system
    pub fn bodies(&self) -> Bodies {
        Bodies {
            stack: vec![(self.clone(), 0)],
            last: None,
        }
    }

    /// Flattened bodies paired with the system that directly holds each one
    pub fn entries(&self) -> Vec<(BodyRef, SystemRef)> {
        let mut bodies = self.bodies();
        let mut out = Vec::new();
        while let Some(entry) = bodies.next_entry() {
            out.push(entry);
        }
        out
    }

    /// Nearest system below (or equal to) this one that directly holds a body equal to `body`
    pub fn parent_of(&self, body: &Body) -> Option<SystemRef> {
        let system = self.0.borrow();
        for child in &system.children {
            match child {
                Component::Body(b) => {
                    if *b.borrow() == *body {
                        return Some(self.clone());
                    }
                }
                Component::System(s) => {
                    if let Some(parent) = s.parent_of(body) {
                        return Some(parent);
                    }
                }
            }
        }
        None
    }

    pub fn contains(&self, body: &Body) -> bool {
        self.bodies().any(|b| *b.borrow() == *body)
    }

    /// Owned copies of the flattened bodies, force accumulators cleared
    pub fn to_vec(&self) -> Vec<Body> {
        self.bodies()
            .map(|b| {
                let mut copy = b.borrow().clone();
                copy.force = None;
                copy
            })
            .collect()
    }
}

impl From<CompositeSystem> for SystemRef {
    fn from(system: CompositeSystem) -> Self {
        SystemRef::new(system)
    }
}

impl fmt::Debug for SystemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0.borrow(), f)
    }
}

impl fmt::Display for SystemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0.borrow(), f)
    }
}

/// Flattening iterator over the bodies of a system
///
/// Holds handles and positions only, never a borrow, so the hierarchy can be
/// inspected between calls. [`Bodies::remove`] is the only mutation with a
/// defined effect on the remaining traversal.
pub struct Bodies {
    stack: Vec<(SystemRef, usize)>, // system and its next child position
    last: Option<(BodyRef, SystemRef)>,
}

impl Bodies {
    /// Like `next`, but exhaustion is an error
    pub fn next_body(&mut self) -> Result<BodyRef> {
        self.next().ok_or(CosmosError::NoSuchElement)
    }

    /// Next body together with the system that directly holds it
    pub fn next_entry(&mut self) -> Option<(BodyRef, SystemRef)> {
        self.last = None;
        loop {
            let (system, pos) = self.stack.last_mut()?;
            let child = system.borrow().children.get(*pos).cloned();
            match child {
                None => {
                    self.stack.pop();
                }
                Some(Component::Body(body)) => {
                    *pos += 1;
                    let owner = system.clone();
                    self.last = Some((body.clone(), owner.clone()));
                    return Some((body, owner));
                }
                Some(Component::System(nested)) => {
                    *pos += 1;
                    self.stack.push((nested, 0));
                }
            }
        }
    }

    /// Remove the body returned by the last successful advance from the
    /// system that directly holds it, and return it
    pub fn remove(&mut self) -> Result<BodyRef> {
        let (body, owner) = self
            .last
            .take()
            .ok_or(CosmosError::IllegalState("remove() must follow a successful next()"))?;

        let idx = owner
            .borrow()
            .children
            .iter()
            .position(|c| matches!(c, Component::Body(b) if b.ptr_eq(&body)))
            .ok_or(CosmosError::IllegalState("body is no longer held by its system"))?;
        owner.borrow_mut().children.remove(idx);

        // keep the cursor on the child that followed the removed one
        if let Some((system, pos)) = self.stack.last_mut() {
            if system.ptr_eq(&owner) && idx < *pos {
                *pos -= 1;
            }
        }
        Ok(body)
    }
}

impl Iterator for Bodies {
    type Item = BodyRef;

    fn next(&mut self) -> Option<BodyRef> {
        self.next_entry().map(|(body, _)| body)
    }
}
