//! Fixed-step time integration over a body hierarchy
//!
//! Each step flattens the hierarchy, accumulates pairwise forces through a
//! `ForceSet` and applies a semi-implicit (symplectic) Euler update:
//! velocities from the new forces first, then positions from the new
//! velocities. `Simulation` has a single "stepping" state and no terminal
//! condition; the caller decides how many steps to run.

use log::trace;

use crate::error::Result;
use crate::hierarchy::composite::SystemRef;
use crate::simulation::forces::ForceSet;
use crate::simulation::params::Parameters;
use crate::simulation::states::{BodyRef, NVec3};

/// Advance `bodies` by one semi-implicit Euler step of `params.dt`
///
/// Forces are computed for every body before any of them moves. If the force
/// computation fails, no position or velocity has been changed.
pub fn symplectic_euler(bodies: &[BodyRef], forces: &ForceSet, params: &Parameters) -> Result<()> {
    let n = bodies.len();
    if n == 0 { // no bodies, return
        return Ok(());
    }

    // F_n from x_n
    let mut f = vec![NVec3::zeros(); n];
    forces.accumulate_forces(bodies, &mut f)?;

    for (b, f) in bodies.iter().zip(f) {
        b.borrow_mut().force = Some(f);
    }

    // Kick then drift: v_n+1 = v_n + dt F_n / m, x_n+1 = x_n + dt v_n+1
    for b in bodies {
        b.borrow_mut().advance(params.dt);
    }
    Ok(())
}

/// Drives the step loop over a live hierarchy
pub struct Simulation {
    pub system: SystemRef,
    pub forces: ForceSet,
    pub parameters: Parameters,
    pub t: f64, // simulated time
    pub steps: u64, // steps taken so far
}

impl Simulation {
    pub fn new(system: SystemRef, forces: ForceSet, parameters: Parameters) -> Result<Self> {
        parameters.validate()?;
        Ok(Self {
            system,
            forces,
            parameters,
            t: 0.0,
            steps: 0,
        })
    }

    /// Flattened bodies in traversal order, each body object at most once
    pub fn bodies(&self) -> Vec<BodyRef> {
        let mut bodies: Vec<BodyRef> = Vec::new();
        for b in self.system.bodies() {
            if !bodies.iter().any(|seen| seen.ptr_eq(&b)) {
                bodies.push(b);
            }
        }
        bodies
    }

    pub fn step(&mut self) -> Result<()> {
        let bodies = self.bodies();
        symplectic_euler(&bodies, &self.forces, &self.parameters)?;
        self.t += self.parameters.dt;
        self.steps += 1;
        trace!("step {} done, t = {}", self.steps, self.t);
        Ok(())
    }

    /// Run `n_steps` steps and return the simulated time
    pub fn run(&mut self, n_steps: u64) -> Result<f64> {
        for _ in 0..n_steps {
            self.step()?;
        }
        Ok(self.t)
    }

    /// Sum of m v over all bodies, constant up to round-off under gravity alone
    pub fn total_momentum(&self) -> NVec3 {
        self.bodies()
            .iter()
            .fold(NVec3::zeros(), |acc, b| acc + b.borrow().momentum())
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies().iter().map(|b| b.borrow().kinetic_energy()).sum()
    }
}
