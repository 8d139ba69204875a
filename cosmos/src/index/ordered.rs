//! Binary search tree index ordered by a caller-supplied comparator
//!
//! Keys are inserted in the order the source hierarchy yields them and the
//! tree is never rebalanced, so lookups cost O(depth) and an unlucky
//! insertion order degrades to a list. Keys the comparator considers equal
//! go to the right, which is also where lookups continue on a tie.

use std::cmp::Ordering;
use std::fmt;

use crate::hierarchy::composite::SystemRef;
use crate::index::{comparators, fresh_entries, BodyIndex};
use crate::simulation::states::{Body, BodyRef};

pub type BodyComparator = fn(&Body, &Body) -> Ordering;

#[derive(Default)]
enum Tree {
    #[default]
    Empty,
    Node(Box<Node>),
}

struct Node {
    key: BodyRef,
    system: SystemRef,
    left: Tree,
    right: Tree,
}

impl Tree {
    fn insert<C>(&mut self, node: Box<Node>, cmp: &C)
    where
        C: Fn(&Body, &Body) -> Ordering,
    {
        match self {
            Tree::Empty => *self = Tree::Node(node),
            Tree::Node(current) => {
                let goes_left = cmp(&*current.key.borrow(), &*node.key.borrow()) == Ordering::Greater;
                if goes_left {
                    current.left.insert(node, cmp);
                } else {
                    current.right.insert(node, cmp);
                }
            }
        }
    }

    fn get<C>(&self, body: &Body, cmp: &C) -> Option<&Node>
    where
        C: Fn(&Body, &Body) -> Ordering,
    {
        let Tree::Node(node) = self else {
            return None;
        };
        let key = node.key.borrow();
        if *key == *body {
            Some(node.as_ref())
        } else if cmp(&*key, body) == Ordering::Greater {
            node.left.get(body, cmp)
        } else {
            node.right.get(body, cmp)
        }
    }

    fn remove<C>(&mut self, body: &Body, cmp: &C) -> Option<SystemRef>
    where
        C: Fn(&Body, &Body) -> Ordering,
    {
        let Tree::Node(node) = self else {
            return None;
        };
        if *node.key.borrow() != *body {
            let goes_left = cmp(&*node.key.borrow(), body) == Ordering::Greater;
            return if goes_left {
                node.left.remove(body, cmp)
            } else {
                node.right.remove(body, cmp)
            };
        }

        let Tree::Node(removed) = std::mem::take(self) else {
            return None;
        };
        let Node {
            system, left, right, ..
        } = *removed;
        *self = match (left, right) {
            (Tree::Empty, child) | (child, Tree::Empty) => child,
            (left, Tree::Node(right)) => {
                // in-order successor takes the removed node's place
                let (successor, rest) = pop_min(right);
                let Node { key, system, .. } = *successor;
                Tree::Node(Box::new(Node {
                    key,
                    system,
                    left,
                    right: rest,
                }))
            }
        };
        Some(system)
    }

    fn depth(&self) -> usize {
        match self {
            Tree::Empty => 0,
            Tree::Node(n) => 1 + n.left.depth().max(n.right.depth()),
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            Tree::Empty => 0,
            Tree::Node(n) => match (&n.left, &n.right) {
                (Tree::Empty, Tree::Empty) => 1,
                (l, r) => l.leaf_count() + r.leaf_count(),
            },
        }
    }
}

/// Detach the leftmost node of `node`'s subtree, returning it and what remains
fn pop_min(mut node: Box<Node>) -> (Box<Node>, Tree) {
    match std::mem::take(&mut node.left) {
        Tree::Empty => {
            let rest = std::mem::take(&mut node.right);
            (node, rest)
        }
        Tree::Node(left) => {
            let (min, rest) = pop_min(left);
            node.left = rest;
            (min, Tree::Node(node))
        }
    }
}

pub struct OrderedIndex<C = BodyComparator> {
    root: Tree,
    comparator: C,
    len: usize,
}

impl OrderedIndex<BodyComparator> {
    /// Index ordered alphabetically by body name
    pub fn by_name() -> Self {
        Self::new(comparators::by_name)
    }
}

impl<C> OrderedIndex<C>
where
    C: Fn(&Body, &Body) -> Ordering,
{
    /// Index ordered by `comparator`
    ///
    /// The comparator must agree with `Body` equality: two equal bodies have
    /// to compare the same way against every other key, or lookups can walk
    /// past an equal key. Orders on the name alone qualify; orders on mass
    /// do not, since equal bodies may differ in mass by up to `MASS_EPSILON`.
    pub fn new(comparator: C) -> Self {
        Self {
            root: Tree::Empty,
            comparator,
            len: 0,
        }
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Key/system pairs in comparator order
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(&self.root);
        iter
    }

    /// Longest root-to-leaf path, 0 for an empty index
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }
}

impl<C> BodyIndex for OrderedIndex<C>
where
    C: Fn(&Body, &Body) -> Ordering,
{
    fn add(&mut self, system: &SystemRef) -> bool {
        let fresh = fresh_entries(
            system,
            |b| self.root.get(b, &self.comparator).is_some(),
            |a, b| a == b,
        );
        let Some(entries) = fresh else {
            return false;
        };
        for (key, parent) in entries {
            let node = Box::new(Node {
                key,
                system: parent,
                left: Tree::Empty,
                right: Tree::Empty,
            });
            self.root.insert(node, &self.comparator);
            self.len += 1;
        }
        true
    }

    fn parent_of(&self, body: &Body) -> Option<SystemRef> {
        self.root
            .get(body, &self.comparator)
            .map(|node| node.system.clone())
    }

    fn remove(&mut self, body: &Body) -> Option<SystemRef> {
        let removed = self.root.remove(body, &self.comparator);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    fn len(&self) -> usize {
        self.len
    }

    fn keys(&self) -> Vec<BodyRef> {
        self.iter().map(|(key, _)| key.clone()).collect()
    }
}

impl<C> fmt::Display for OrderedIndex<C>
where
    C: Fn(&Body, &Body) -> Ordering,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, system)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",\n")?;
            }
            write!(f, "{key} belongs to {system}")?;
        }
        f.write_str("}")
    }
}

/// In-order traversal
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    fn push_left(&mut self, mut tree: &'a Tree) {
        while let Tree::Node(node) = tree {
            self.stack.push(node);
            tree = &node.left;
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a BodyRef, &'a SystemRef);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(&node.right);
        Some((&node.key, &node.system))
    }
}
