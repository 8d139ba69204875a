use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use cosmos::configuration::config::{ComponentConfig, IndexConfig, ScenarioConfig};
use cosmos::error::CosmosError;
use cosmos::index::{BodyIndex, HashIndex};
use cosmos::simulation::integrator::Simulation;
use cosmos::simulation::scenario::Scenario;

const NESTED: &str = r#"
engine:
  index: "flat"

parameters:
  dt: 0.5
  steps: 4
  G: 1.0

system:
  name: "Root"
  children:
    - name: "Sun"
      mass: 100.0
      radius: 1.0
      x: [ 0.0, 0.0, 0.0 ]
      v: [ 0.0, 0.0, 0.0 ]
      appearance: "yellow"
    - name: "Earth System"
      children:
        - name: "Earth"
          m: 1.0
          radius: 0.1
          x: [ 10.0, 0.0, 0.0 ]
          v: [ 0.0, 3.0, 0.0 ]
        - name: "Moon"
          mass: 0.01
          radius: 0.05
          x: [ 10.5, 0.0, 0.0 ]
          v: [ 0.0, 3.5, 0.0 ]
"#;

/// Load one of the bundled scenario files
pub fn bundled(file_name: &str) -> ScenarioConfig {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let reader = BufReader::new(File::open(path).unwrap());
    ScenarioConfig::from_reader(reader).unwrap()
}

// ==================================================================================
// Configuration tests
// ==================================================================================

#[test]
fn parses_a_nested_hierarchy() {
    let cfg = ScenarioConfig::from_yaml_str(NESTED).unwrap();

    assert_eq!(cfg.engine.index, IndexConfig::Flat);
    assert!(!cfg.engine.balance);
    assert_eq!(cfg.parameters.report_every, 0);
    assert_eq!(cfg.parameters.eps2, 0.0);

    assert_eq!(cfg.system.children.len(), 2);
    assert!(matches!(&cfg.system.children[0], ComponentConfig::Body(b) if b.name == "Sun"));
    match &cfg.system.children[1] {
        ComponentConfig::System(s) => {
            assert_eq!(s.name, "Earth System");
            assert!(matches!(&s.children[0], ComponentConfig::Body(b) if b.mass == 1.0));
        }
        ComponentConfig::Body(_) => panic!("Earth System is a subsystem"),
    }
}

#[test]
fn rejects_an_unknown_index() {
    let yaml = NESTED.replace("\"flat\"", "\"quadtree\"");
    assert!(ScenarioConfig::from_yaml_str(&yaml).is_err());
}

// ==================================================================================
// Scenario tests
// ==================================================================================

#[test]
fn builds_the_runtime_hierarchy() {
    let scenario = Scenario::build_scenario(ScenarioConfig::from_yaml_str(NESTED).unwrap()).unwrap();

    assert_eq!(scenario.system.to_string(), "Root{Sun, Earth System{Earth, Moon}}");
    assert_eq!(scenario.system.borrow().body_count(), 3);
    assert_eq!(scenario.engine.index, IndexConfig::Flat);
    assert_eq!(scenario.parameters.dt, 0.5);

    let sun = scenario.system.bodies().next().unwrap();
    assert_eq!(sun.borrow().appearance().0, "yellow");
}

#[test]
fn scenario_runs_its_steps() {
    let scenario = Scenario::build_scenario(ScenarioConfig::from_yaml_str(NESTED).unwrap()).unwrap();
    let steps = scenario.parameters.steps;

    let mut sim = Simulation::new(scenario.system, scenario.forces, scenario.parameters).unwrap();
    let t = sim.run(steps).unwrap();
    assert_eq!(t, 2.0);
}

#[test]
fn rejects_a_short_vector() {
    let yaml = NESTED.replace("x: [ 10.0, 0.0, 0.0 ]", "x: [ 10.0, 0.0 ]");
    let result = Scenario::build_scenario(ScenarioConfig::from_yaml_str(&yaml).unwrap());
    assert!(matches!(result, Err(CosmosError::InvalidArgument(_))));
}

#[test]
fn rejects_a_massless_body() {
    let yaml = NESTED.replace("mass: 0.01", "mass: 0.0");
    let result = Scenario::build_scenario(ScenarioConfig::from_yaml_str(&yaml).unwrap());
    assert!(matches!(result, Err(CosmosError::InvalidArgument(_))));
}

#[test]
fn rejects_a_non_positive_step() {
    let yaml = NESTED.replace("dt: 0.5", "dt: -0.5");
    let result = Scenario::build_scenario(ScenarioConfig::from_yaml_str(&yaml).unwrap());
    assert!(matches!(result, Err(CosmosError::InvalidArgument(_))));
}

#[test]
fn skips_a_duplicate_sibling() {
    let yaml = NESTED.replace("name: \"Moon\"", "name: \"Earth\"");
    let scenario = Scenario::build_scenario(ScenarioConfig::from_yaml_str(&yaml).unwrap()).unwrap();
    assert_eq!(scenario.system.to_string(), "Root{Sun, Earth System{Earth}}");
}

#[test]
fn an_empty_root_is_told_apart_from_a_repeated_body() {
    let yaml = r#"
engine:
  index: "hash"
parameters:
  dt: 0.5
  steps: 1
  G: 1.0
system:
  name: "Void"
  children: []
"#;
    let scenario = Scenario::build_scenario(ScenarioConfig::from_yaml_str(yaml).unwrap()).unwrap();
    assert_eq!(scenario.system.borrow().body_count(), 0);

    // registering fails for an empty root too, so emptiness has to be checked first
    let mut index = HashIndex::new();
    assert!(!index.add(&scenario.system));

    let repeated = NESTED
        .replace("name: \"Moon\"", "name: \"Sun\"")
        .replace("mass: 0.01", "mass: 100.0");
    let scenario = Scenario::build_scenario(ScenarioConfig::from_yaml_str(&repeated).unwrap()).unwrap();
    assert_eq!(scenario.system.borrow().body_count(), 3);
    assert!(!HashIndex::new().add(&scenario.system));
}

// ==================================================================================
// Bundled scenarios
// ==================================================================================

#[test]
fn solar_system_scenario_builds_and_indexes() {
    let scenario = Scenario::build_scenario(bundled("solar_system.yaml")).unwrap();

    assert_eq!(
        scenario.system.to_string(),
        "Solar System{Sun, Mercury, Venus, Earth System{Earth, Moon}, Mars System{Mars, Phobos, Deimos}}"
    );
    assert_eq!(scenario.engine.index, IndexConfig::Hash);
    assert!(scenario.engine.balance);

    let mut index = HashIndex::new();
    assert!(index.add(&scenario.system));
    for b in scenario.system.bodies() {
        let b = b.borrow();
        let parent = index.parent_of(&b).unwrap();
        assert!(parent.ptr_eq(&scenario.system.parent_of(&b).unwrap()));
    }
}

#[test]
fn two_body_scenario_builds() {
    let scenario = Scenario::build_scenario(bundled("two_body.yaml")).unwrap();
    assert_eq!(scenario.system.to_string(), "Binary{A, B}");
    assert_eq!(scenario.engine.index, IndexConfig::Ordered);
    assert_eq!(scenario.parameters.steps, 100);
}
