//! Scenario configuration types loaded from YAML
//!
//! A scenario file picks the body index and the balancing option, sets the
//! step parameters and describes the hierarchy as a recursive tree. A node
//! with `children` is a subsystem, any other node is a body.
//!
//! ```yaml
//! engine:
//!   index: "hash"           # "ordered", "hash" or "flat"
//!   balance: true           # also partition the bodies by mass
//!
//! parameters:
//!   dt: 3600.0              # step size
//!   steps: 8760             # steps run by the driver
//!   report_every: 720       # log the state every n steps
//!   eps2: 0.0               # softening epsilon^2
//!   G: 6.6743e-11           # gravitational constant
//!
//! system:
//!   name: "Solar System"
//!   children:
//!     - name: "Sun"
//!       mass: 1.989e30
//!       radius: 6.96e8
//!       x: [ 0.0, 0.0, 0.0 ]
//!       v: [ 0.0, 0.0, 0.0 ]
//!       appearance: "yellow"
//!     - name: "Earth System"
//!       children:
//!         - name: "Earth"
//!           mass: 5.972e24
//!           radius: 6.371e6
//!           x: [ 1.496e11, 0.0, 0.0 ]
//!           v: [ 0.0, 29780.0, 0.0 ]
//! ```

use std::io::Read;

use serde::Deserialize;

/// Which body index the driver builds over the hierarchy
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexConfig {
    #[serde(rename = "ordered")] // binary search tree ordered by body name
    Ordered,

    #[serde(rename = "hash")] // open addressing, linear probing
    Hash,

    #[serde(rename = "flat")] // insertion-ordered list keyed by name
    Flat,
}

#[derive(Deserialize, Debug)]
pub struct EngineConfig {
    pub index: IndexConfig,
    #[serde(default)]
    pub balance: bool, // `true` - build a BalancedCluster over all bodies
}

#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub dt: f64,
    pub steps: u64,
    #[serde(default)]
    pub report_every: u64, // 0 = report only at the end
    #[serde(default)]
    pub eps2: f64, // softening, 0 = plain Newtonian gravity
    pub G: f64,
}

/// Initial state of a single body
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub name: String,
    #[serde(alias = "m")]
    pub mass: f64,
    pub radius: f64,
    pub x: Vec<f64>, // initial position, three components
    pub v: Vec<f64>, // initial velocity, three components
    #[serde(default)]
    pub appearance: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SystemConfig {
    pub name: String,
    pub children: Vec<ComponentConfig>,
}

/// A node of the hierarchy: subsystems are recognised by their `children`
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum ComponentConfig {
    System(SystemConfig),
    Body(BodyConfig),
}

/// Top-level scenario configuration loaded from YAML
#[derive(Deserialize, Debug)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub system: SystemConfig, // root of the hierarchy
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(reader)
    }
}
