//! Mass-balanced binary cluster tree
//!
//! Bodies are distributed greedily: each insertion goes to the side with
//! the smaller total mass (left on ties), so after any sequence of
//! insertions the two halves of every node differ by at most the mass of
//! the heaviest body inserted below it. The split ignores geometry entirely.

use std::fmt;

use crate::error::{CosmosError, Result};
use crate::hierarchy::cluster::{Cluster, ClusterBodies};
use crate::simulation::states::{BodyRef, NVec3};

pub struct BalancedCluster {
    left: Cluster,
    right: Cluster,
}

impl BalancedCluster {
    pub fn new(left: Cluster, right: Cluster) -> Self {
        Self { left, right }
    }

    /// Build a cluster by inserting `bodies` one after another
    pub fn from_bodies<I>(bodies: I) -> Result<Self>
    where
        I: IntoIterator<Item = BodyRef>,
    {
        let mut bodies = bodies.into_iter();
        let (Some(first), Some(second)) = (bodies.next(), bodies.next()) else {
            return Err(CosmosError::InvalidArgument(
                "a balanced cluster needs at least two bodies".to_string(),
            ));
        };
        let cluster = Self::new(Cluster::Body(first), Cluster::Body(second));
        Ok(bodies.fold(cluster, BalancedCluster::add))
    }

    /// Insert on the right if the left side is strictly heavier, otherwise on the left
    pub fn add(self, body: BodyRef) -> Self {
        let Self { left, right } = self;
        if left.mass() > right.mass() {
            Self {
                left,
                right: right.add(body),
            }
        } else {
            Self {
                left: left.add(body),
                right,
            }
        }
    }

    pub fn left(&self) -> &Cluster {
        &self.left
    }

    pub fn right(&self) -> &Cluster {
        &self.right
    }

    pub fn mass(&self) -> f64 {
        self.left.mass() + self.right.mass()
    }

    pub fn body_count(&self) -> usize {
        self.left.body_count() + self.right.body_count()
    }

    pub fn mass_center(&self) -> NVec3 {
        let (ml, mr) = (self.left.mass(), self.right.mass());
        if ml + mr == 0.0 {
            return NVec3::zeros();
        }
        (self.left.mass_center() * ml + self.right.mass_center() * mr) / (ml + mr)
    }

    /// Number of balanced levels down to the deepest leaf
    pub fn depth(&self) -> usize {
        fn depth_of(c: &Cluster) -> usize {
            match c {
                Cluster::Balanced(b) => b.depth(),
                _ => 0,
            }
        }
        1 + depth_of(&self.left).max(depth_of(&self.right))
    }

    /// Left subtree's bodies, then the right's
    pub fn bodies(&self) -> ClusterBodies<'_> {
        ClusterBodies {
            pending: vec![&self.right, &self.left],
            nested: None,
        }
    }
}

impl fmt::Display for BalancedCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Left mass: {:?}, right mass: {:?}",
            self.left.mass(),
            self.right.mass()
        )
    }
}
