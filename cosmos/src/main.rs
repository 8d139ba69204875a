use cosmos::{ScenarioConfig, Scenario, Simulation};
use cosmos::{BalancedCluster, BodyIndex, FlatIndex, HashIndex, IndexConfig, OrderedIndex};
use cosmos::{bench_indexes, bench_step};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, default_value = "solar_system.yaml")]
    file_name: String,

    /// Override the number of steps from the scenario file
    #[arg(short = 'n')]
    steps: Option<u64>,

    /// Run the benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("failed to open {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg = ScenarioConfig::from_reader(reader)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn build_index(kind: IndexConfig) -> Box<dyn BodyIndex> {
    match kind {
        IndexConfig::Ordered => Box::new(OrderedIndex::by_name()),
        IndexConfig::Hash => Box::new(HashIndex::new()),
        IndexConfig::Flat => Box::new(FlatIndex::new()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.bench {
        bench_step()?;
        bench_indexes()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg).context("invalid scenario")?;
    info!("loaded {}", scenario.system);

    if scenario.system.borrow().body_count() == 0 {
        anyhow::bail!("{} holds no bodies, nothing to simulate", scenario.system.name());
    }
    let mut index = build_index(scenario.engine.index);
    if !index.add(&scenario.system) {
        anyhow::bail!("{} repeats a body, cannot index it", scenario.system.name());
    }
    info!("{:?} index holds {} bodies", scenario.engine.index, index.len());

    if scenario.engine.balance {
        let cluster = BalancedCluster::from_bodies(scenario.system.bodies())?;
        info!("balanced cluster: {cluster}, depth {}", cluster.depth());
    }

    let steps = args.steps.unwrap_or(scenario.parameters.steps);
    let report_every = scenario.parameters.report_every;
    let mut sim = Simulation::new(scenario.system, scenario.forces, scenario.parameters)?;

    for step in 1..=steps {
        sim.step()?;
        if report_every > 0 && step % report_every == 0 {
            info!(
                "t = {:.1}, kinetic energy = {:e}, momentum = {:e}",
                sim.t,
                sim.kinetic_energy(),
                sim.total_momentum().norm()
            );
        }
    }

    for body in sim.system.bodies() {
        let parent = index.parent_of(&body.borrow()).map(|s| s.name()).unwrap_or_default();
        info!("{body} ({parent})");
    }

    Ok(())
}
