//! Bubble-up scheduling of the packages affected by a change.
//!
//! Given a gathered graph and the hash of a package that changed, this
//! computes every package that must be republished (the reverse-dependency
//! closure of the change), classifies each one's relationship to the rest of
//! the closure, and assigns levels so that processing in level order is
//! always bottom-up.
//!
//! # Algorithm Overview
//!
//! 1. Build a directed graph with an edge from each dependency to its dependent
//! 2. Walk dependent edges from every root to find the closure
//! 3. Classify direct, indirect and also-update dependencies inside the closure
//! 4. Assign levels round by round: a package gets a level once all of its
//!    in-closure dependencies have one
//! 5. Sort by level, dependency count, dependency names, then name

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use serde::Serialize;
use tracing::debug;

use crate::package::{GraphError, Package, Packages, PkgHash};

/// One package of the affected closure, before any rollout state exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedEntry {
  pub hash: PkgHash,
  pub name: String,
  pub path: PathBuf,
  /// Distance from the leaves of the closure; leaves are 0.
  pub level: usize,
  /// In-closure packages this one depends on directly.
  pub direct_deps: Vec<String>,
  /// Other explicit roots this one must be moved onto.
  pub also_update: Vec<String>,
  /// In-closure packages reached only through another affected package.
  pub indirect_deps: Vec<String>,
}

/// Schedule the closure of packages affected by a change to `target`.
pub fn bubble_list(pkgs: &Packages, target: &PkgHash) -> Result<Vec<AffectedEntry>, GraphError> {
  bubble_list_with_roots(pkgs, target, &[])
}

/// Schedule a rollout started from several explicit roots at once.
///
/// The closure is the union of the closures of `target` and `extra_roots`. A
/// package that declares one of these roots by name, but pinned to a different
/// hash, lists that root under `also_update`.
///
/// Levels only follow direct in-closure dependencies, not `also_update`. An
/// entry can therefore sit at a lower level than a root it has to be moved
/// onto, and it only becomes ready once that later root is published.
pub fn bubble_list_with_roots(
  pkgs: &Packages,
  target: &PkgHash,
  extra_roots: &[PkgHash],
) -> Result<Vec<AffectedEntry>, GraphError> {
  let graph = PackageGraph::new(pkgs);

  let mut roots = vec![target.clone()];
  roots.extend(extra_roots.iter().filter(|h| *h != target).cloned());

  let mut root_nodes = Vec::with_capacity(roots.len());
  for hash in &roots {
    let idx = graph.node(hash).ok_or_else(|| GraphError::NotFound(hash.clone()))?;
    root_nodes.push(idx);
  }

  let closure = graph.closure(&root_nodes);
  let levels = graph.levels(&closure)?;

  let mut entries: Vec<AffectedEntry> = closure
    .iter()
    .map(|&idx| {
      let pkg = graph.package(idx);
      AffectedEntry {
        hash: pkg.hash.clone(),
        name: pkg.name.clone(),
        path: pkg.path.clone(),
        level: levels[&idx],
        direct_deps: graph.names(graph.direct_deps(idx, &closure)),
        also_update: also_update(pkg, &graph, &root_nodes, &closure, idx),
        indirect_deps: graph.names(graph.indirect_deps(idx, &closure)),
      }
    })
    .collect();

  entries.sort_by(processing_order);

  debug!(
    target = %target,
    affected = entries.len(),
    levels = entries.last().map(|e| e.level + 1).unwrap_or(0),
    "computed bubble list"
  );

  Ok(entries)
}

/// The canonical processing order: level, dependency count, dependency names, name.
fn processing_order(a: &AffectedEntry, b: &AffectedEntry) -> Ordering {
  a.level
    .cmp(&b.level)
    .then_with(|| a.direct_deps.len().cmp(&b.direct_deps.len()))
    .then_with(|| a.direct_deps.cmp(&b.direct_deps))
    .then_with(|| a.name.cmp(&b.name))
}

fn also_update(
  pkg: &Package,
  graph: &PackageGraph<'_>,
  root_nodes: &[NodeIndex],
  closure: &HashSet<NodeIndex>,
  idx: NodeIndex,
) -> Vec<String> {
  let direct: HashSet<NodeIndex> = graph.direct_deps(idx, closure).into_iter().collect();
  let names: BTreeSet<String> = root_nodes
    .iter()
    .filter(|&&root| root != idx && !direct.contains(&root))
    .map(|&root| graph.package(root))
    .filter(|root| root.name != pkg.name && pkg.declares(&root.name))
    .map(|root| root.name.clone())
    .collect();
  names.into_iter().collect()
}

/// Dependency structure of a gathered graph.
///
/// Edges point from a dependency to its dependent, so walking outgoing edges
/// from a package visits everything affected by it.
struct PackageGraph<'a> {
  graph: DiGraph<&'a Package, ()>,
  nodes: HashMap<&'a PkgHash, NodeIndex>,
}

impl<'a> PackageGraph<'a> {
  fn new(pkgs: &'a Packages) -> Self {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    for (hash, pkg) in pkgs {
      nodes.insert(hash, graph.add_node(pkg));
    }

    for (hash, pkg) in pkgs {
      let dependent = nodes[hash];
      for dep in &pkg.deps {
        // Dependencies outside the gathered graph cannot be affected
        if let Some(&dependency) = nodes.get(&dep.hash) {
          graph.update_edge(dependency, dependent, ());
        }
      }
    }

    Self { graph, nodes }
  }

  fn node(&self, hash: &PkgHash) -> Option<NodeIndex> {
    self.nodes.get(hash).copied()
  }

  fn package(&self, idx: NodeIndex) -> &'a Package {
    self.graph[idx]
  }

  fn names(&self, nodes: impl IntoIterator<Item = NodeIndex>) -> Vec<String> {
    let names: BTreeSet<String> = nodes.into_iter().map(|idx| self.package(idx).name.clone()).collect();
    names.into_iter().collect()
  }

  /// Every package depending, directly or transitively, on one of `roots`, plus the roots.
  fn closure(&self, roots: &[NodeIndex]) -> HashSet<NodeIndex> {
    let mut closure = HashSet::new();
    for &root in roots {
      let mut bfs = Bfs::new(&self.graph, root);
      while let Some(idx) = bfs.next(&self.graph) {
        closure.insert(idx);
      }
    }
    closure
  }

  fn direct_deps(&self, idx: NodeIndex, closure: &HashSet<NodeIndex>) -> Vec<NodeIndex> {
    self
      .graph
      .neighbors_directed(idx, Direction::Incoming)
      .filter(|dep| closure.contains(dep))
      .collect()
  }

  /// In-closure packages reachable from `idx` only through another in-closure package.
  fn indirect_deps(&self, idx: NodeIndex, closure: &HashSet<NodeIndex>) -> Vec<NodeIndex> {
    let direct: HashSet<NodeIndex> = self.direct_deps(idx, closure).into_iter().collect();
    let mut seen: HashSet<NodeIndex> = direct.clone();
    let mut stack: Vec<NodeIndex> = direct.iter().copied().collect();
    let mut indirect = Vec::new();

    while let Some(current) = stack.pop() {
      for dep in self.direct_deps(current, closure) {
        if dep != idx && seen.insert(dep) {
          indirect.push(dep);
          stack.push(dep);
        }
      }
    }

    indirect
  }

  /// Assign each closure member 1 + the highest level among its in-closure deps.
  fn levels(&self, closure: &HashSet<NodeIndex>) -> Result<HashMap<NodeIndex, usize>, GraphError> {
    let mut pending: HashMap<NodeIndex, usize> = closure
      .iter()
      .map(|&idx| (idx, self.direct_deps(idx, closure).len()))
      .collect();
    let mut levels = HashMap::with_capacity(closure.len());
    let mut current_level = 0;

    while !pending.is_empty() {
      let ready: Vec<NodeIndex> = pending
        .iter()
        .filter(|&(_, &remaining)| remaining == 0)
        .map(|(&idx, _)| idx)
        .collect();

      if ready.is_empty() {
        let mut stuck: Vec<&str> = pending.keys().map(|&idx| self.package(idx).hash.as_str()).collect();
        stuck.sort_unstable();
        return Err(GraphError::CyclicDependency { chain: stuck.join(", ") });
      }

      for idx in ready {
        pending.remove(&idx);
        levels.insert(idx, current_level);
        for dependent in self.graph.neighbors_directed(idx, Direction::Outgoing) {
          if let Some(remaining) = pending.get_mut(&dependent) {
            *remaining = remaining.saturating_sub(1);
          }
        }
      }

      current_level += 1;
    }

    Ok(levels)
  }
}
