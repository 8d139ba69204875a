use std::time::Instant;

use crate::error::Result;
use crate::hierarchy::composite::{CompositeSystem, SystemRef};
use crate::index::{BodyIndex, FlatIndex, HashIndex, OrderedIndex};
use crate::simulation::forces::{ForceSet, NewtonianGravity};
use crate::simulation::integrator::symplectic_euler;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, BodyRef, NVec3};

/// Helper to build a hierarchy of `n` bodies split over subsystems of `group` bodies
pub fn make_system(n: usize, group: usize) -> Result<SystemRef> {
    let root = SystemRef::new(CompositeSystem::new("Bench"));
    let group = group.max(1);
    let mut current = CompositeSystem::new("Group 0");

    for i in 0..n {
        let i_f = i as f64;
        // deterministic positions, no rand needed
        let x = NVec3::new(
            (i_f * 0.37).sin() * 5.0,
            (i_f * 0.13).cos() * 5.0,
            (i_f * 0.07).sin() * 5.0,
        );
        // scrambled but unique names, so a name-ordered tree stays shallow
        let name = format!("Body {:016x}", (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        current.add(Body::new(name, 1.0, 0.01, x, NVec3::zeros())?);

        if current.len() == group {
            let next = CompositeSystem::new(format!("Group {}", i / group + 1));
            root.add(std::mem::replace(&mut current, next));
        }
    }
    if !current.is_empty() {
        root.add(current);
    }
    Ok(root)
}

/// Helper for the benchmark parameters
fn make_params() -> Parameters {
    Parameters {
        dt: 0.001,
        steps: 0,
        report_every: 0,
        eps2: 1e-4,
        G: 0.1,
    }
}

/// Time one direct-summation step for growing `n`
pub fn bench_step() -> Result<()> {
    let ns = [200, 400, 800, 1600, 3200];
    let steps = 2; // steps per n

    for n in ns {
        let system = make_system(n, 10)?;
        let bodies: Vec<BodyRef> = system.bodies().collect();

        let params = make_params();
        let forces = ForceSet::new().with(NewtonianGravity {
            G: params.G,
            eps2: params.eps2,
        });

        // Warm-up
        symplectic_euler(&bodies, &forces, &params)?;

        let t0 = Instant::now();
        for _ in 0..steps {
            symplectic_euler(&bodies, &forces, &params)?;
        }
        let per_step = t0.elapsed().as_secs_f64() / steps as f64;

        println!("N = {n:5}, direct step = {per_step:8.6} s");
    }
    Ok(())
}

/// Time building each index realization and looking up every body once
pub fn bench_indexes() -> Result<()> {
    println!("N,ordered_ms,hash_ms,flat_ms");

    for n in (1000..=8000).step_by(1000) {
        let system = make_system(n, 10)?;
        let bodies: Vec<BodyRef> = system.bodies().collect();

        let ms_ordered = time_index(OrderedIndex::by_name(), &system, &bodies);
        let ms_hash = time_index(HashIndex::new(), &system, &bodies);
        let ms_flat = time_index(FlatIndex::new(), &system, &bodies);

        println!("{n},{ms_ordered:.6},{ms_hash:.6},{ms_flat:.6}");
    }
    Ok(())
}

fn time_index<I: BodyIndex>(mut index: I, system: &SystemRef, bodies: &[BodyRef]) -> f64 {
    let t0 = Instant::now();
    let added = index.add(system);
    debug_assert!(added, "{} repeats a body", system.name());
    let found = bodies
        .iter()
        .filter(|b| index.contains(&b.borrow()))
        .count();
    let ms = t0.elapsed().as_secs_f64() * 1000.0;
    debug_assert_eq!(found, bodies.len());
    ms
}
