//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario`, containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - the body hierarchy (`SystemRef` with bodies at t = 0)
//! - active force set (`ForceSet`)
//!
//! Bodies and parameters are validated on the way; the first invalid value
//! aborts the build.

use log::warn;

use crate::configuration::config::{BodyConfig, ComponentConfig, ScenarioConfig, SystemConfig};
use crate::error::{CosmosError, Result};
use crate::hierarchy::composite::{CompositeSystem, SystemRef};
use crate::simulation::engine::Engine;
use crate::simulation::forces::{ForceSet, NewtonianGravity};
use crate::simulation::params::Parameters;
use crate::simulation::states::{Appearance, Body, NVec3};

/// Fully-initialized simulation scenario
///
/// This is the main "runtime bundle" constructed from a [`ScenarioConfig`]:
/// it contains the engine settings, parameters, the live hierarchy and the
/// set of active force laws
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub system: SystemRef,
    pub forces: ForceSet,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        // Parameters (runtime) from ParametersConfig
        let p_cfg = cfg.parameters;
        let parameters = Parameters {
            dt: p_cfg.dt,
            steps: p_cfg.steps,
            report_every: p_cfg.report_every,
            eps2: p_cfg.eps2,
            G: p_cfg.G,
        };
        parameters.validate()?;

        // Engine (runtime) from EngineConfig
        let engine = Engine {
            index: cfg.engine.index,
            balance: cfg.engine.balance,
        };

        // Hierarchy: map the config tree onto composite systems
        let system = SystemRef::new(build_system(&cfg.system)?);

        // Forces: construct a ForceSet and register Newtonian gravity
        let forces = ForceSet::new().with(NewtonianGravity {
            G: parameters.G,
            eps2: parameters.eps2,
        });

        Ok(Self {
            engine,
            parameters,
            system,
            forces,
        })
    }
}

fn build_system(cfg: &SystemConfig) -> Result<CompositeSystem> {
    let mut system = CompositeSystem::new(cfg.name.as_str());
    for child in &cfg.children {
        let added = match child {
            ComponentConfig::Body(bc) => system.add(build_body(bc)?),
            ComponentConfig::System(sc) => system.add(build_system(sc)?),
        };
        if !added {
            let name = match child {
                ComponentConfig::Body(bc) => &bc.name,
                ComponentConfig::System(sc) => &sc.name,
            };
            warn!("{} already holds a child named {name}, skipping it", cfg.name);
        }
    }
    Ok(system)
}

fn build_body(bc: &BodyConfig) -> Result<Body> {
    let x = vec3(&bc.x, &bc.name, "position")?;
    let v = vec3(&bc.v, &bc.name, "velocity")?;
    let body = Body::new(bc.name.as_str(), bc.mass, bc.radius, x, v)?;
    Ok(match &bc.appearance {
        Some(tag) => body.with_appearance(Appearance(tag.clone())),
        None => body,
    })
}

fn vec3(components: &[f64], body: &str, what: &str) -> Result<NVec3> {
    match components {
        [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
        _ => Err(CosmosError::InvalidArgument(format!(
            "{what} of {body} needs 3 components, got {}",
            components.len()
        ))),
    }
}
