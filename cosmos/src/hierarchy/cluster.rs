//! The cluster capability shared by bodies, composite systems and balanced
//! clusters: add a body, total mass, body count, mass centre and a
//! flattening traversal.

use std::fmt;

use log::debug;

use crate::hierarchy::balanced::BalancedCluster;
use crate::hierarchy::composite::{Bodies, SystemRef};
use crate::simulation::states::{BodyRef, NVec3};

pub enum Cluster {
    Body(BodyRef),
    Composite(SystemRef),
    Balanced(Box<BalancedCluster>),
}

impl Cluster {
    /// Add `body` and return the resulting cluster
    ///
    /// - a leaf body becomes a balanced pair {leaf, body}
    /// - a composite appends the body unless a direct child has its name,
    ///   and stays the same composite either way
    /// - a balanced cluster inserts on its lighter side
    pub fn add(self, body: BodyRef) -> Cluster {
        match self {
            Cluster::Body(leaf) => Cluster::Balanced(Box::new(BalancedCluster::new(
                Cluster::Body(leaf),
                Cluster::Body(body),
            ))),
            Cluster::Composite(system) => {
                let name = body.name();
                if !system.add(body) {
                    debug!("{} already holds a body named {name}", system.name());
                }
                Cluster::Composite(system)
            }
            Cluster::Balanced(balanced) => Cluster::Balanced(Box::new(balanced.add(body))),
        }
    }

    pub fn mass(&self) -> f64 {
        match self {
            Cluster::Body(b) => b.mass(),
            Cluster::Composite(s) => s.borrow().mass(),
            Cluster::Balanced(c) => c.mass(),
        }
    }

    pub fn body_count(&self) -> usize {
        match self {
            Cluster::Body(_) => 1,
            Cluster::Composite(s) => s.borrow().body_count(),
            Cluster::Balanced(c) => c.body_count(),
        }
    }

    pub fn mass_center(&self) -> NVec3 {
        match self {
            Cluster::Body(b) => b.borrow().position(),
            Cluster::Composite(s) => s.borrow().mass_center(),
            Cluster::Balanced(c) => c.mass_center(),
        }
    }

    pub fn bodies(&self) -> ClusterBodies<'_> {
        ClusterBodies {
            pending: vec![self],
            nested: None,
        }
    }
}

impl From<BodyRef> for Cluster {
    fn from(body: BodyRef) -> Self {
        Cluster::Body(body)
    }
}

impl From<SystemRef> for Cluster {
    fn from(system: SystemRef) -> Self {
        Cluster::Composite(system)
    }
}

impl From<BalancedCluster> for Cluster {
    fn from(cluster: BalancedCluster) -> Self {
        Cluster::Balanced(Box::new(cluster))
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cluster::Body(b) => f.write_str(b.borrow().name()),
            Cluster::Composite(s) => fmt::Display::fmt(s, f),
            Cluster::Balanced(c) => fmt::Display::fmt(c, f),
        }
    }
}

/// Depth-first, left-to-right traversal over the bodies of a cluster
pub struct ClusterBodies<'a> {
    pub(crate) pending: Vec<&'a Cluster>, // popped from the back
    pub(crate) nested: Option<Bodies>,
}

impl Iterator for ClusterBodies<'_> {
    type Item = BodyRef;

    fn next(&mut self) -> Option<BodyRef> {
        loop {
            if let Some(nested) = self.nested.as_mut() {
                if let Some(body) = nested.next() {
                    return Some(body);
                }
                self.nested = None;
            }
            match self.pending.pop()? {
                Cluster::Body(b) => return Some(b.clone()),
                Cluster::Composite(s) => self.nested = Some(s.bodies()),
                Cluster::Balanced(c) => {
                    self.pending.push(c.right());
                    self.pending.push(c.left());
                }
            }
        }
    }
}
