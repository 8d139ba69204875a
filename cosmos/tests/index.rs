use std::hash::{BuildHasherDefault, Hasher};

use cosmos::benchmark::benchmark::make_system;
use cosmos::hierarchy::composite::{CompositeSystem, SystemRef};
use cosmos::index::{comparators, BodyIndex, FlatIndex, HashIndex, OrderedIndex};
use cosmos::simulation::states::{Body, BodyRef, NVec3};

/// Hashes every key to bucket 0
#[derive(Default)]
struct ConstHasher;

impl Hasher for ConstHasher {
    fn finish(&self) -> u64 {
        0
    }

    fn write(&mut self, _bytes: &[u8]) {}
}

type Colliding = BuildHasherDefault<ConstHasher>;

pub fn body(name: &str, m: f64) -> BodyRef {
    BodyRef::new(Body::new(name, m, 1.0, NVec3::new(m, 0.0, 0.0), NVec3::zeros()).unwrap())
}

pub fn lookup(name: &str, m: f64) -> Body {
    Body::new(name, m, 1.0, NVec3::zeros(), NVec3::zeros()).unwrap()
}

/// Flat system named `name` holding the given bodies
pub fn flat(name: &str, bodies: &[(&str, f64)]) -> SystemRef {
    let mut system = CompositeSystem::new(name);
    for (n, m) in bodies {
        system.add(body(n, *m));
    }
    SystemRef::new(system)
}

/// Sol{Sun, Inner{Mercury, Venus}, Earth System{Earth, Moon}, Jupiter}
pub fn solar() -> SystemRef {
    let root = flat("Sol", &[("Sun", 1000.0)]);
    root.add(flat("Inner", &[("Mercury", 0.3), ("Venus", 4.8)]));
    root.add(flat("Earth System", &[("Earth", 6.0), ("Moon", 0.07)]));
    root.add(body("Jupiter", 1900.0));
    root
}

fn all_indexes() -> Vec<Box<dyn BodyIndex>> {
    vec![
        Box::new(OrderedIndex::by_name()),
        Box::new(OrderedIndex::new(comparators::by_name_desc)),
        Box::new(HashIndex::new()),
        Box::new(HashIndex::with_hasher(Colliding::default())),
        Box::new(FlatIndex::new()),
    ]
}

fn sorted_names(keys: Vec<BodyRef>) -> Vec<String> {
    let mut names: Vec<String> = keys.iter().map(|k| k.name()).collect();
    names.sort();
    names
}

// ==================================================================================
// Shared contract
// ==================================================================================

#[test]
fn every_index_maps_bodies_to_their_direct_owner() {
    let root = solar();
    for mut index in all_indexes() {
        assert!(index.add(&root));
        assert_eq!(index.len(), 6);

        for b in root.bodies() {
            let b = b.borrow();
            let expected = root.parent_of(&b).unwrap();
            let found = index.parent_of(&b).unwrap();
            assert!(found.ptr_eq(&expected), "{} mapped to {}", b.name(), found.name());
            assert!(index.contains(&b));
        }
    }
}

#[test]
fn indexes_agree_on_every_body() {
    let root = solar();
    let mut indexes = all_indexes();
    for index in indexes.iter_mut() {
        assert!(index.add(&root));
    }

    for b in root.bodies() {
        let b = b.borrow();
        let parents: Vec<SystemRef> = indexes.iter().map(|i| i.parent_of(&b).unwrap()).collect();
        assert!(parents.windows(2).all(|w| w[0].ptr_eq(&w[1])), "disagreement on {}", b.name());
    }
}

#[test]
fn duplicate_registration_changes_nothing() {
    let root = solar();
    let intruder = flat("Intruder", &[("Mars", 0.6), ("Earth", 6.0)]);

    for mut index in all_indexes() {
        assert!(index.add(&root));
        let before = sorted_names(index.keys());

        assert!(!index.add(&intruder));
        assert!(!index.add(&root));

        assert_eq!(index.len(), 6);
        assert_eq!(sorted_names(index.keys()), before);
        assert!(!index.contains(&lookup("Mars", 0.6)));
        let earth = index.parent_of(&lookup("Earth", 6.0)).unwrap();
        assert_eq!(earth.name(), "Earth System");
    }
}

#[test]
fn a_system_repeating_a_body_is_rejected() {
    let root = flat("S", &[("A", 1.0), ("B", 1.0)]);
    root.add(flat("T", &[("A", 1.0)]));

    for mut index in all_indexes() {
        assert!(!index.add(&root));
        assert!(index.is_empty());
    }
}

#[test]
fn an_empty_system_registers_nothing() {
    let empty = SystemRef::new(CompositeSystem::new("Void"));
    for mut index in all_indexes() {
        assert!(!index.add(&empty));
        assert!(index.is_empty());
    }
}

#[test]
fn missing_keys_are_absent() {
    let root = solar();
    for mut index in all_indexes() {
        assert!(index.parent_of(&lookup("Pluto", 0.01)).is_none());
        index.add(&root);
        assert!(index.parent_of(&lookup("Pluto", 0.01)).is_none());
        assert!(index.remove(&lookup("Pluto", 0.01)).is_none());
        assert_eq!(index.len(), 6);
    }
}

#[test]
fn disjoint_systems_can_both_be_registered() {
    let a = flat("A", &[("A1", 1.0), ("A2", 2.0)]);
    let b = flat("B", &[("B1", 1.0), ("B2", 2.0), ("B3", 3.0)]);

    for mut index in all_indexes() {
        assert!(index.add(&a));
        assert!(index.add(&b));
        assert_eq!(index.len(), 5);
        assert!(index.parent_of(&lookup("B3", 3.0)).is_some_and(|s| s.ptr_eq(&b)));
        assert!(index.parent_of(&lookup("A1", 1.0)).is_some_and(|s| s.ptr_eq(&a)));
    }
}

#[test]
fn remove_drops_only_that_key() {
    let root = solar();
    for mut index in all_indexes() {
        index.add(&root);

        let owner = index.remove(&lookup("Mercury", 0.3)).unwrap();
        assert_eq!(owner.name(), "Inner");
        assert_eq!(index.len(), 5);
        assert!(!index.contains(&lookup("Mercury", 0.3)));

        for b in root.bodies().filter(|b| b.name() != "Mercury") {
            assert!(index.contains(&b.borrow()), "lost {}", b.name());
        }
        assert_eq!(index.keys().len(), 5);
    }
}

#[test]
fn index_is_a_snapshot() {
    let root = solar();
    let mut index = HashIndex::new();
    index.add(&root);

    root.add(body("Saturn", 570.0));
    assert!(!index.contains(&lookup("Saturn", 570.0)));
    assert_eq!(index.len(), 6);
}

// ==================================================================================
// Ordered index tests
// ==================================================================================

#[test]
fn ordered_keys_follow_the_comparator() {
    let root = solar();
    let mut by_name = OrderedIndex::by_name();
    let mut desc = OrderedIndex::new(comparators::by_name_desc);
    by_name.add(&root);
    desc.add(&root);

    let names: Vec<String> = by_name.keys().iter().map(|k| k.name()).collect();
    assert_eq!(names, ["Earth", "Jupiter", "Mercury", "Moon", "Sun", "Venus"]);

    let reversed: Vec<String> = desc.keys().iter().map(|k| k.name()).collect();
    assert_eq!(reversed, ["Venus", "Sun", "Moon", "Mercury", "Jupiter", "Earth"]);
}

#[test]
fn benchmark_hierarchy_registers_every_body() {
    let system = make_system(250, 10).unwrap();
    let bodies: Vec<BodyRef> = system.bodies().collect();
    for mut index in all_indexes() {
        assert!(index.add(&system));
        assert_eq!(index.len(), bodies.len());
        assert!(bodies.iter().all(|b| index.contains(&b.borrow())));
    }
}

#[test]
fn ordered_index_finds_keys_within_mass_epsilon() {
    // Z sits at the root, X below it; the lookup differs from X by less than
    // MASS_EPSILON but is heavier than Z
    let root = flat("S", &[("Z", 1.000_000_03), ("X", 1.0)]);
    let mut ordered = OrderedIndex::by_name();
    let mut hash = HashIndex::new();
    assert!(ordered.add(&root));
    assert!(hash.add(&root));

    let near_x = lookup("X", 1.000_000_04);
    assert_eq!(near_x, lookup("X", 1.0));
    let from_ordered = ordered.parent_of(&near_x).unwrap();
    let from_hash = hash.parent_of(&near_x).unwrap();
    assert!(from_ordered.ptr_eq(&from_hash));

    // a near-equal X is the same key, so registering it again changes nothing
    assert!(!ordered.add(&flat("T", &[("X", 1.000_000_04)])));
    assert!(!hash.add(&flat("T", &[("X", 1.000_000_04)])));
    assert_eq!(ordered.len(), 2);
    assert_eq!(hash.len(), 2);
}

#[test]
fn ordered_lookup_is_by_value() {
    let root = solar();
    let mut index = OrderedIndex::by_name();
    index.add(&root);

    // same name, mass within epsilon
    assert!(index.contains(&lookup("Earth", 6.0 + 1e-9)));
    // same name, different mass
    assert!(!index.contains(&lookup("Earth", 7.0)));
}

#[test]
fn ordered_removal_keeps_order() {
    let root = flat("S", &[("M", 1.0), ("D", 1.0), ("T", 1.0), ("B", 1.0), ("F", 1.0), ("R", 1.0), ("W", 1.0)]);
    let mut index = OrderedIndex::by_name();
    index.add(&root);
    assert_eq!(index.depth(), 3);
    assert_eq!(index.leaf_count(), 4);

    // root node with two children, then an inner node, then a leaf
    for name in ["M", "D", "W"] {
        assert!(index.remove(&lookup(name, 1.0)).is_some());
    }
    let names: Vec<String> = index.keys().iter().map(|k| k.name()).collect();
    assert_eq!(names, ["B", "F", "R", "T"]);
    assert_eq!(index.len(), 4);
}

#[test]
fn ordered_index_degrades_with_sorted_input() {
    let root = flat("S", &[("A", 1.0), ("B", 1.0), ("C", 1.0), ("D", 1.0), ("E", 1.0)]);
    let mut index = OrderedIndex::by_name();
    index.add(&root);

    assert_eq!(index.depth(), 5);
    assert_eq!(index.leaf_count(), 1);
}

#[test]
fn ordered_index_with_custom_comparator() {
    let root = flat("S", &[("A", 1.0), ("B", 2.0), ("C", 3.0)]);
    let mut index = OrderedIndex::new(|a: &Body, b: &Body| b.name().cmp(a.name()));
    index.add(&root);

    let names: Vec<String> = index.iter().map(|(k, _)| k.name()).collect();
    assert_eq!(names, ["C", "B", "A"]);
}

#[test]
fn ordered_display() {
    let root = flat("S", &[("B", 2.0), ("A", 1.0)]);
    let mut index = OrderedIndex::by_name();
    index.add(&root);

    let a = root.bodies().find(|b| b.name() == "A").unwrap();
    let b = root.bodies().find(|b| b.name() == "B").unwrap();
    assert_eq!(
        index.to_string(),
        format!("{{{a} belongs to S{{B, A}},\n{b} belongs to S{{B, A}}}}")
    );
    assert_eq!(OrderedIndex::by_name().to_string(), "{}");
}

// ==================================================================================
// Hash index tests
// ==================================================================================

#[test]
fn hash_capacity_is_a_power_of_two() {
    assert_eq!(HashIndex::new().capacity(), 8);
    assert_eq!(HashIndex::with_capacity(0).capacity(), 8);
    assert_eq!(HashIndex::with_capacity(10).capacity(), 16);
    assert_eq!(HashIndex::with_capacity(64).capacity(), 64);
}

#[test]
fn hash_collisions_are_counted_once_per_insertion() {
    let root = flat("S", &[("A", 1.0), ("B", 1.0), ("C", 1.0)]);
    let mut index = HashIndex::with_hasher(Colliding::default());
    index.add(&root);

    // A takes bucket 0, B and C both find it taken
    assert_eq!(index.collisions(), 2);
    assert_eq!(index.to_string(), "A\nB\nC\n");
}

#[test]
fn rejected_registration_counts_no_collisions() {
    let mut index = HashIndex::with_hasher(Colliding::default());
    index.add(&flat("S", &[("A", 1.0), ("B", 1.0)]));
    assert_eq!(index.collisions(), 1);

    assert!(!index.add(&flat("T", &[("C", 1.0), ("A", 1.0)])));
    assert_eq!(index.collisions(), 1);
}

#[test]
fn hash_removal_shifts_the_probe_run_back() {
    let root = flat("S", &[("A", 1.0), ("B", 1.0), ("C", 1.0)]);
    let mut index = HashIndex::with_hasher(Colliding::default());
    index.add(&root);

    assert!(index.remove(&lookup("A", 1.0)).is_some());
    assert_eq!(index.to_string(), "B\nC\n");
    assert!(index.contains(&lookup("B", 1.0)));
    assert!(index.contains(&lookup("C", 1.0)));

    assert!(index.remove(&lookup("B", 1.0)).is_some());
    assert!(index.contains(&lookup("C", 1.0)));
    assert_eq!(index.len(), 1);
}

#[test]
fn hash_grows_past_three_quarters_load() {
    let six: Vec<(String, f64)> = (0..6).map(|i| (format!("B{i}"), 1.0)).collect();
    let six: Vec<(&str, f64)> = six.iter().map(|(n, m)| (n.as_str(), *m)).collect();

    let mut index = HashIndex::new();
    index.add(&flat("Six", &six));
    assert_eq!(index.capacity(), 8);

    index.add(&flat("One", &[("Extra", 1.0)]));
    assert_eq!(index.capacity(), 16);
    assert_eq!(index.len(), 7);
    for (name, m) in six.iter().chain([("Extra", 1.0)].iter()) {
        assert!(index.contains(&lookup(name, *m)), "lost {name}");
    }
}

#[test]
fn hash_lookup_is_by_value() {
    let mut index = HashIndex::new();
    index.add(&solar());

    assert!(index.contains(&lookup("Venus", 4.8 + 1e-9)));
    assert!(!index.contains(&lookup("Venus", 5.8)));
}

#[test]
fn hash_retain() {
    let root = solar();
    let mut index = HashIndex::new();
    index.add(&root);

    index.retain(|_, system| system.ptr_eq(&root));
    assert_eq!(sorted_names(index.keys()), ["Jupiter", "Sun"]);
    assert_eq!(index.len(), 2);
}

// ==================================================================================
// Flat index tests
// ==================================================================================

#[test]
fn flat_index_keeps_registration_order() {
    let inner = flat("Inner", &[("Mercury", 0.3), ("Venus", 4.8)]);
    let outer = flat("Outer", &[("Saturn", 570.0), ("Jupiter", 1900.0)]);
    let mut index = FlatIndex::new();
    index.add(&inner);
    index.add(&outer);

    assert_eq!(index.position("Saturn"), Some(2));
    assert_eq!(index.get(3).map(|(k, _)| k.name()), Some("Jupiter".to_string()));
    assert!(index.parent_by_name("Venus").is_some_and(|s| s.ptr_eq(&inner)));
    assert!(index.parent_by_name("Pluto").is_none());
    assert_eq!(
        index.to_string(),
        "(Mercury, Inner)\n(Venus, Inner)\n(Saturn, Outer)\n(Jupiter, Outer)\n"
    );
}

#[test]
fn flat_index_is_keyed_by_name() {
    let mut index = FlatIndex::new();
    index.add(&flat("Inner", &[("Mercury", 0.3), ("Venus", 4.8)]));

    // a body of another mass but the same name is the same key
    assert!(index.contains(&lookup("Venus", 99.0)));
    assert!(!index.add(&flat("Other", &[("Venus", 99.0)])));
    assert_eq!(index.len(), 2);
}
