//! Force contributors for the n-body engine
//!
//! A `ForceSet` sums the contributions of its `ForceLaw` terms into one
//! force vector per body. The only law shipped is direct pairwise Newtonian
//! gravity, O(n^2) per step.

use crate::error::Result;
use crate::simulation::states::{BodyRef, NVec3};

/// Collection of force terms
/// Each term implements [`ForceLaw`] and their contributions are summed
/// into a single force vector per body
#[derive(Default)]
pub struct ForceSet {
    terms: Vec<Box<dyn ForceLaw>>,
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add a force term
    pub fn with(mut self, term: impl ForceLaw + 'static) -> Self {
        self.terms.push(Box::new(term));
        self
    }

    /// Compute total forces on `bodies`
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_forces(&self, bodies: &[BodyRef], out: &mut [NVec3]) -> Result<()> {
        // Zero buffer
        for f in out.iter_mut() {
            *f = NVec3::zeros();
        }
        for term in &self.terms {
            term.force(bodies, out)?;
        }
        Ok(())
    }
}

/// Force sources operating on a flattened body sequence
/// Implementations add their contribution into `out[i]` for each body
pub trait ForceLaw {
    fn force(&self, bodies: &[BodyRef], out: &mut [NVec3]) -> Result<()>;
}

/// Direct Newtonian gravity with optional softening
#[allow(non_snake_case)]
pub struct NewtonianGravity {
    pub G: f64, // gravitational constant
    pub eps2: f64, // softening, added to the squared separation
}

impl ForceLaw for NewtonianGravity {
    fn force(&self, bodies: &[BodyRef], out: &mut [NVec3]) -> Result<()> {
        let n = bodies.len();

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            for j in (i + 1)..n {
                // The same body listed twice does not attract itself
                if bodies[i].ptr_eq(&bodies[j]) {
                    continue;
                }
                let bi = bodies[i].borrow();
                let bj = bodies[j].borrow();

                // Force on i due to j, pointing from i toward j
                let f = bi.gravitational_force(&bj, self.G, self.eps2)?;

                // Equal and opposite on j
                out[i] += f;
                out[j] -= f;
            }
        }
        Ok(())
    }
}
