//! Core state types for the simulation
//!
//! - `Body`: a named celestial body with constant mass/radius and mutable
//!   kinematic state (`x`, `v`, accumulated `force`)
//! - `BodyRef`: shared handle to a `Body`; the hierarchy, the indexes and
//!   the balanced clusters all point at the same bodies the integrator moves
//!
//! Bodies compare by value (name + mass within `MASS_EPSILON`), handles
//! compare by identity through [`BodyRef::ptr_eq`].

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use nalgebra::Vector3;

use crate::error::{CosmosError, Result};

pub type NVec3 = Vector3<f64>;

/// Two bodies with equal names are equal if their masses differ by less than this
pub const MASS_EPSILON: f64 = 1e-7;

/// Opaque display tag handed to a renderer, never read by the physics
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Appearance(pub String);

impl Default for Appearance {
    fn default() -> Self {
        Appearance("white".to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    name: String,
    mass: f64,   // kg
    radius: f64, // m, display only
    appearance: Appearance,
    pub x: NVec3,                // position
    pub v: NVec3,                // current movement per unit time
    pub force: Option<NVec3>,    // recomputed every step, absent before the first one
}

impl Body {
    /// Create a body with initial position `x` and velocity `v`
    ///
    /// Mass and radius must be positive finite reals; a zero mass would make
    /// the velocity update divide by zero.
    pub fn new(name: impl Into<String>, mass: f64, radius: f64, x: NVec3, v: NVec3) -> Result<Self> {
        let name = name.into();
        if !(mass.is_finite() && mass > 0.0) {
            return Err(CosmosError::InvalidArgument(format!(
                "mass of {name} must be a positive real, got {mass}"
            )));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(CosmosError::InvalidArgument(format!(
                "radius of {name} must be a positive real, got {radius}"
            )));
        }
        Ok(Self {
            name,
            mass,
            radius,
            appearance: Appearance::default(),
            x,
            v,
            force: None,
        })
    }

    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    pub fn position(&self) -> NVec3 {
        self.x
    }

    pub fn distance_to(&self, other: &Body) -> f64 {
        (other.x - self.x).norm()
    }

    pub fn momentum(&self) -> NVec3 {
        self.v * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.v.norm_squared()
    }

    /// Gravitational force exerted by `other` on this body
    ///
    /// Magnitude `G * m_self * m_other / d2` along the unit vector from this
    /// body toward `other`, where `d2 = |r|^2 + eps2`. With `eps2 = 0` this is
    /// plain Newtonian gravity.
    pub fn gravitational_force(&self, other: &Body, g: f64, eps2: f64) -> Result<NVec3> {
        let r = other.x - self.x;
        let d2 = r.norm_squared() + eps2;
        if d2 == 0.0 {
            return Err(CosmosError::DegenerateSeparation {
                first: self.name.clone(),
                second: other.name.clone(),
            });
        }
        // G m_i m_j r / d^3
        let inv_d = d2.sqrt().recip();
        Ok(g * self.mass * other.mass * inv_d * inv_d * inv_d * r)
    }

    /// Semi-implicit Euler update from the accumulated force
    ///
    /// v' = v + F/m * dt, then x' = x + v' * dt
    pub fn advance(&mut self, dt: f64) {
        let f = self.force.unwrap_or_else(NVec3::zeros);
        self.v += f * (dt / self.mass);
        self.x += self.v * dt;
    }
}

impl PartialEq for Body {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && (self.mass - other.mass).abs() < MASS_EPSILON
    }
}

// Name only: equal bodies always share a name, but near-equal masses may not
// share bit patterns.
impl Hash for Body {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {:?} kg, radius: {:?}m, position: {} m, movement: {} m/s.",
            self.name,
            self.mass,
            self.radius,
            vec3_string(&self.x),
            vec3_string(&self.v)
        )
    }
}

/// `[x,y,z]`
pub fn vec3_string(v: &NVec3) -> String {
    format!("[{:?},{:?},{:?}]", v.x, v.y, v.z)
}

/// Shared, mutable handle to a [`Body`]
#[derive(Clone)]
pub struct BodyRef(Rc<RefCell<Body>>);

impl BodyRef {
    pub fn new(body: Body) -> Self {
        BodyRef(Rc::new(RefCell::new(body)))
    }

    pub fn borrow(&self) -> Ref<'_, Body> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Body> {
        self.0.borrow_mut()
    }

    /// Same body object, not merely an equal one
    pub fn ptr_eq(&self, other: &BodyRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn mass(&self) -> f64 {
        self.0.borrow().mass
    }
}

impl From<Body> for BodyRef {
    fn from(body: Body) -> Self {
        BodyRef::new(body)
    }
}

impl fmt::Debug for BodyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0.borrow(), f)
    }
}

impl fmt::Display for BodyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0.borrow(), f)
    }
}
