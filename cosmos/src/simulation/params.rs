//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - integration step size and the number of steps the driver runs,
//! - how often the driver reports progress,
//! - softening and gravitational constant (`eps2`, `G`)

use crate::error::{CosmosError, Result};

/// Gravitational constant in SI units (m^3 kg^-1 s^-2)
pub const G_SI: f64 = 6.6743e-11;

#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct Parameters {
    pub dt: f64, // step size
    pub steps: u64, // steps run by the driver
    pub report_every: u64, // log the state every n steps, 0 = never
    pub eps2: f64, // softening, 0 = plain Newtonian gravity
    pub G: f64, // gravitational constant
}

impl Default for Parameters {
    /// One-second steps in SI units, as the solar system scenarios use
    fn default() -> Self {
        Self {
            dt: 1.0,
            steps: 0,
            report_every: 0,
            eps2: 0.0,
            G: G_SI,
        }
    }
}

impl Parameters {
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(CosmosError::InvalidArgument(format!(
                "time step must be a positive real, got {}",
                self.dt
            )));
        }
        if !(self.eps2.is_finite() && self.eps2 >= 0.0) {
            return Err(CosmosError::InvalidArgument(format!(
                "softening must be a non-negative real, got {}",
                self.eps2
            )));
        }
        if !self.G.is_finite() {
            return Err(CosmosError::InvalidArgument(format!(
                "gravitational constant must be finite, got {}",
                self.G
            )));
        }
        Ok(())
    }
}
