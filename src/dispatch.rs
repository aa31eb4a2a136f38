//! Multi-agent dispatcher: turns a partition into k depot-rooted closed walks
//! whose union covers every edge of the input graph.

use std::collections::HashSet;

use indexmap::IndexSet;
use noisy_float::prelude::n64;
use serde::{Deserialize, Serialize};

use crate::cpp::{solve_cpp, Tour};
use crate::dijkstra::dijkstra;
use crate::error::EngineError;
use crate::graph::{Graph, VertexId};
use crate::matching::TwoOptConfig;
use crate::partition::{greedy_assignment, recursive_bisection};

/// Which partitioning strategy to hand vertex sets off to before dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartitionStrategy {
	/// Recursive Kernighan-Lin bisection.
	RecursiveBisection,
	/// Greedy nearest-to-frontier assignment rooted at the depot.
	GreedyAssignment,
}

/// One agent's dispatched tour plus the partition it was built from, for
/// diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentTour {
	pub vertices_assigned: Vec<VertexId>,
	pub tour: Tour,
}

/// Dispatches `k` agents rooted at `depot` over `g`. Each agent's tour is a
/// closed walk starting and ending at `depot`; the union of all agents'
/// traversed edges covers every edge of `g` at least once.
pub fn dispatch(g: &Graph, depot: VertexId, k: usize, strategy: PartitionStrategy, config: &TwoOptConfig) -> Result<Vec<AgentTour>, EngineError> {
	// Partition the vertex set among the k agents.
	let partitions = match strategy {
		PartitionStrategy::RecursiveBisection => recursive_bisection(g, k)?,
		PartitionStrategy::GreedyAssignment => greedy_assignment(g, depot, k)?,
	};

	let depot_paths = dijkstra(g, depot);

	// Every edge must end up owned by exactly one partition's subgraph,
	// including edges whose endpoints straddle two partitions. A
	// cross-partition edge goes to the partition holding its lower-indexed
	// endpoint, since the engine has no vertex coordinates to fall back on a
	// midpoint heuristic.
	let subgraphs = partition_owned_subgraphs(g, &partitions);

	let mut results = Vec::with_capacity(partitions.len());
	for (part, sub) in partitions.into_iter().zip(subgraphs) {
		results.push(dispatch_one_partition(g, depot, &part, &sub, &depot_paths, config)?);
	}
	Ok(results)
}

/// Assigns every edge of `g` to exactly one partition, producing one subgraph
/// per entry of `partitions`. An edge with both endpoints in the same
/// partition belongs to it; a cross-partition edge belongs to the partition
/// holding its lower-indexed endpoint (see `dispatch`'s doc comment).
fn partition_owned_subgraphs(g: &Graph, partitions: &[IndexSet<VertexId>]) -> Vec<Graph> {
	let owner_of = |v: VertexId| -> usize {
		partitions.iter().position(|p| p.contains(&v)).expect("every vertex of g is assigned to some partition")
	};
	let mut subgraphs: Vec<Graph> = (0..partitions.len()).map(|_| Graph::new()).collect();
	for (i, part) in partitions.iter().enumerate() {
		for &v in part {
			subgraphs[i].add_vertex(v);
		}
	}
	for e in g.edges() {
		let owner_u = owner_of(e.u);
		let owner_v = owner_of(e.v);
		let owner = if owner_u == owner_v {
			owner_u
		} else if e.u.min(e.v) == e.u {
			owner_u
		} else {
			owner_v
		};
		subgraphs[owner].add_edge_with_id(e.id, e.u, e.v, e.weight);
	}
	subgraphs
}

fn dispatch_one_partition(
	g: &Graph,
	depot: VertexId,
	part: &IndexSet<VertexId>,
	sub: &Graph,
	depot_paths: &crate::dijkstra::ShortestPaths,
	config: &TwoOptConfig,
) -> Result<AgentTour, EngineError> {
	// An empty partition produces an empty walk rooted at the depot.
	if sub.edge_count() == 0 {
		return Ok(AgentTour {
			vertices_assigned: part.iter().copied().collect(),
			tour: Tour { edges: Vec::new(), vertices: vec![depot], cost: n64(0.0), matching: None, duplicated_paths: Default::default() },
		});
	}

	// Handle each connected component of the induced subgraph separately,
	// then concatenate, joining via shortest paths back to depot.
	let components = connected_components(sub);
	let mut merged_edges = Vec::new();
	let mut merged_vertices = vec![depot];
	let mut total_cost = n64(0.0);
	let mut last_matching = None;
	let mut all_duplicated_paths = std::collections::HashMap::new();

	for component in components {
		let comp_sub = sub.induced_subgraph(&component);

		// Route directly if depot is in this component; otherwise
		// prepend/append a shortest-path prefix/suffix between depot and the
		// nearest vertex of the component.
		let entry = if component.contains(&depot) {
			depot
		} else {
			component
				.iter()
				.copied()
				.min_by_key(|&v| depot_paths.distance(v).unwrap_or(n64(f64::INFINITY)))
				.ok_or_else(|| EngineError::InternalInvariant("connected component of a non-empty partition was empty".to_string()))?
		};

		let prefix = if entry == depot { Vec::new() } else { depot_paths.path_to(entry)? };
		let prefix_cost: noisy_float::prelude::N64 = path_cost(g, &prefix);

		// CPP solve on the (possibly depot-disjoint) component.
		let component_tour = solve_cpp(&comp_sub, entry, config)?;

		if !prefix.is_empty() {
			merged_vertices.extend(prefix.iter().skip(1).copied());
		}
		merged_vertices.extend(component_tour.vertices.iter().skip(1).copied());
		if !prefix.is_empty() {
			merged_vertices.extend(prefix.iter().rev().skip(1).copied());
		}

		merged_edges.extend(path_as_traversed_edges(g, &prefix));
		merged_edges.extend(component_tour.edges.iter().copied());
		merged_edges.extend(path_as_traversed_edges(g, &prefix.iter().rev().copied().collect::<Vec<_>>()));

		total_cost += prefix_cost + prefix_cost + component_tour.cost;
		if component_tour.matching.is_some() {
			last_matching = component_tour.matching;
		}
		all_duplicated_paths.extend(component_tour.duplicated_paths);
	}

	Ok(AgentTour {
		vertices_assigned: part.iter().copied().collect(),
		tour: Tour { edges: merged_edges, vertices: merged_vertices, cost: total_cost, matching: last_matching, duplicated_paths: all_duplicated_paths },
	})
}

fn path_cost(g: &Graph, path: &[VertexId]) -> noisy_float::prelude::N64 {
	path.windows(2).map(|w| g.min_weight(w[0], w[1]).unwrap_or(n64(0.0))).sum()
}

fn path_as_traversed_edges(g: &Graph, path: &[VertexId]) -> Vec<crate::cpp::TraversedEdge> {
	path.windows(2)
		.map(|w| {
			let (u, v) = (w[0], w[1]);
			let id = g.edge_ids_between(u, v).iter().copied().min_by_key(|&id| g.get_edge(id).unwrap().weight).expect("adjacent by construction");
			let weight = g.get_edge(id).unwrap().weight;
			crate::cpp::TraversedEdge { id, u, v, weight }
		})
		.collect()
}

/// Connected components of `g`'s non-isolated vertices, via stack-based DFS.
/// Visits start vertices in `g`'s own insertion order rather than popping an
/// arbitrary element from a hash set, so component order, and each
/// component's internal vertex order, is reproducible across runs on the
/// same input.
fn connected_components(g: &Graph) -> Vec<IndexSet<VertexId>> {
	let mut seen: HashSet<VertexId> = HashSet::new();
	let mut components = Vec::new();
	for start in g.non_isolated_vertices() {
		if seen.contains(&start) {
			continue;
		}
		let mut component: IndexSet<VertexId> = IndexSet::new();
		let mut stack = vec![start];
		while let Some(v) = stack.pop() {
			if !component.insert(v) {
				continue;
			}
			seen.insert(v);
			for n in g.neighbors(v) {
				if !component.contains(&n) {
					stack.push(n);
				}
			}
		}
		components.push(component);
	}
	components
}
