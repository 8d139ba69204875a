pub mod error;
pub mod simulation;
pub mod hierarchy;
pub mod index;
pub mod configuration;
pub mod benchmark;

pub use error::{CosmosError, Result};

pub use simulation::states::{Appearance, Body, BodyRef, NVec3};
pub use simulation::forces::{ForceLaw, ForceSet, NewtonianGravity};
pub use simulation::integrator::{symplectic_euler, Simulation};
pub use simulation::params::Parameters;
pub use simulation::scenario::Scenario;

pub use hierarchy::balanced::BalancedCluster;
pub use hierarchy::cluster::Cluster;
pub use hierarchy::composite::{Component, CompositeSystem, SystemRef};

pub use index::{BodyIndex, FlatIndex, HashIndex, OrderedIndex};

pub use configuration::config::{BodyConfig, ComponentConfig, EngineConfig, IndexConfig, ParametersConfig, ScenarioConfig, SystemConfig};

pub use benchmark::benchmark::{bench_indexes, bench_step};
