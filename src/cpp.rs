//! Chinese Postman solver: the single-agent core that every other component
//! of this engine builds on.

use std::collections::HashMap;

use noisy_float::prelude::n64;
use serde::{Deserialize, Serialize};

use crate::dijkstra::dijkstra;
use crate::error::EngineError;
use crate::eulerian::{extract_circuit, Multigraph};
use crate::graph::{EdgeId, Graph, VertexId};
use crate::matching::{min_weight_perfect_matching, Matching, TwoOptConfig};

/// One traversed edge of a closed walk: the original edge's identity and
/// weight, plus the direction it was walked in for this particular tour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraversedEdge {
	pub id: EdgeId,
	pub u: VertexId,
	pub v: VertexId,
	pub weight: noisy_float::prelude::N64,
}

/// The result of solving the Chinese Postman Problem on a connected graph: a
/// closed walk covering every edge at least once, its cost, and enough
/// diagnostics to explain the cost.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tour {
	pub edges: Vec<TraversedEdge>,
	pub vertices: Vec<VertexId>,
	pub cost: noisy_float::prelude::N64,
	pub matching: Option<Matching>,
	pub duplicated_paths: HashMap<(VertexId, VertexId), Vec<VertexId>>,
}

/// Solves the Chinese Postman Problem on `g`, starting the walk at `start`.
///
/// `g`'s edge-bearing subgraph must be connected; `start` must carry at least
/// one incident edge unless `g` has no edges at all, in which case the tour is
/// trivially empty. Finds the odd-degree vertices, pairs them off by minimum
/// weight, duplicates the shortest path for each pair, and extracts an
/// Eulerian circuit from the resulting augmented multigraph.
pub fn solve_cpp(g: &Graph, start: VertexId, config: &TwoOptConfig) -> Result<Tour, EngineError> {
	if g.edge_count() == 0 {
		return Ok(Tour {
			edges: Vec::new(),
			vertices: vec![start],
			cost: n64(0.0),
			matching: None,
			duplicated_paths: HashMap::new(),
		});
	}
	if !g.is_connected() {
		return Err(EngineError::Disconnected("the edge-bearing subgraph has more than one connected component".to_string()));
	}
	if g.degree(start) == 0 {
		return Err(EngineError::InvalidInput(format!("start vertex {} has no incident edges", start)));
	}

	// Step 1: odd-degree vertices.
	let odd = g.odd_vertices();
	if odd.len() % 2 != 0 {
		return Err(EngineError::InternalInvariant(format!("odd-vertex count {} is itself odd; impossible for an undirected graph", odd.len())));
	}

	// Step 2: Dijkstra from each odd vertex only.
	let shortest_paths: HashMap<VertexId, crate::dijkstra::ShortestPaths> = odd.iter().map(|&o| (o, dijkstra(g, o))).collect();

	// Step 3 & 4: matching over O, then augment with duplicated shortest paths.
	let (matching, duplicated_paths) = if odd.is_empty() {
		(None, HashMap::new())
	} else {
		let weight = |a: VertexId, b: VertexId| {
			shortest_paths
				.get(&a)
				.and_then(|sp| sp.distance(b))
				.expect("odd vertices were all sourced in step 2, so any pair is reachable on a connected graph")
		};
		let m = min_weight_perfect_matching(&odd, weight, config)?;
		let mut duplicated_paths = HashMap::new();
		for &(a, b) in &m.pairs {
			let path = shortest_paths.get(&a).expect("source ran in step 2").path_to(b)?;
			duplicated_paths.insert((a.min(b), a.max(b)), path);
		}
		(Some(m), duplicated_paths)
	};

	// Step 4 (continued): build the augmented multigraph, one copy of every
	// original edge plus one extra copy per edge along each duplicated path.
	let mut mg = Multigraph::new();
	for e in g.edges() {
		mg.add_copy(e.u, e.v, e.id);
	}
	for path in duplicated_paths.values() {
		for window in path.windows(2) {
			let (a, b) = (window[0], window[1]);
			let id = g
				.edge_ids_between(a, b)
				.iter()
				.copied()
				.min_by_key(|&id| g.get_edge(id).expect("edge id came from this graph").weight)
				.expect("consecutive path vertices are adjacent by construction");
			mg.add_copy(a, b, id);
		}
	}

	// Step 5: Hierholzer.
	let circuit = extract_circuit(mg, start)?;

	// Step 6: total cost from steps 2 & 3 directly, not by re-summing the walk.
	let matching_weight = matching.as_ref().map_or(n64(0.0), |m| m.total_weight);
	let cost = g.total_weight() + matching_weight;

	let mut vertices = Vec::with_capacity(circuit.len() + 1);
	if let Some(first) = circuit.first() {
		vertices.push(first.u);
	} else {
		vertices.push(start);
	}
	let edges = circuit
		.into_iter()
		.map(|ce| {
			vertices.push(ce.v);
			let weight = g.get_edge(ce.edge_id).expect("edge id came from this graph").weight;
			TraversedEdge { id: ce.edge_id, u: ce.u, v: ce.v, weight }
		})
		.collect();

	log::debug!("solved CPP from {}: {} odd vertices, cost {}", start, odd.len(), cost);
	Ok(Tour { edges, vertices, cost, matching, duplicated_paths })
}

#[cfg(test)]
mod tests {
	use super::*;

	fn triangle() -> Graph {
		let mut g = Graph::new();
		g.add_edge(1, 2, 1.0).unwrap();
		g.add_edge(2, 3, 1.0).unwrap();
		g.add_edge(3, 1, 1.0).unwrap();
		g
	}

	#[test]
	fn already_eulerian_graph_skips_matching() {
		let g = triangle();
		let tour = solve_cpp(&g, 1, &TwoOptConfig::default()).unwrap();
		assert!(tour.matching.is_none());
		assert_eq!(tour.cost, n64(3.0));
		assert_eq!(tour.vertices.first(), tour.vertices.last());
		assert_eq!(tour.edges.len(), 3);
	}

	#[test]
	fn path_of_three_edges_duplicates_the_whole_path() {
		let mut g = Graph::new();
		g.add_edge(1, 2, 1.0).unwrap();
		g.add_edge(2, 3, 1.0).unwrap();
		g.add_edge(3, 4, 1.0).unwrap();
		let tour = solve_cpp(&g, 1, &TwoOptConfig::default()).unwrap();
		assert_eq!(tour.cost, n64(6.0));
		assert_eq!(tour.edges.len(), 6);
		assert_eq!(tour.vertices.first(), tour.vertices.last());
	}

	#[test]
	fn two_vertices_one_edge_traversed_twice() {
		let mut g = Graph::new();
		g.add_edge(1, 2, 5.0).unwrap();
		let tour = solve_cpp(&g, 1, &TwoOptConfig::default()).unwrap();
		assert_eq!(tour.cost, n64(10.0));
		assert_eq!(tour.edges.len(), 2);
		assert_eq!(tour.vertices, vec![1, 2, 1]);
	}

	#[test]
	fn disconnected_input_is_rejected() {
		let mut g = Graph::new();
		g.add_edge(1, 2, 1.0).unwrap();
		g.add_edge(3, 4, 1.0).unwrap();
		assert!(matches!(solve_cpp(&g, 1, &TwoOptConfig::default()), Err(EngineError::Disconnected(_))));
	}

	#[test]
	fn isolated_start_vertex_is_rejected() {
		let mut g = triangle();
		g.add_vertex(99);
		assert!(matches!(solve_cpp(&g, 99, &TwoOptConfig::default()), Err(EngineError::InvalidInput(_))));
	}

	#[test]
	fn empty_graph_yields_trivial_tour() {
		let mut g = Graph::new();
		g.add_vertex(1);
		let tour = solve_cpp(&g, 1, &TwoOptConfig::default()).unwrap();
		assert!(tour.edges.is_empty());
		assert_eq!(tour.cost, n64(0.0));
	}

	#[test]
	fn square_with_diagonal_matches_the_direct_edge() {
		let mut g = Graph::new();
		g.add_edge(1, 2, 1.0).unwrap();
		g.add_edge(2, 3, 1.0).unwrap();
		g.add_edge(3, 4, 1.0).unwrap();
		g.add_edge(4, 1, 1.0).unwrap();
		g.add_edge(1, 3, 2.0).unwrap();
		let tour = solve_cpp(&g, 1, &TwoOptConfig::default()).unwrap();
		assert_eq!(tour.cost, n64(8.0));
	}

	#[test]
	fn k4_unit_weights_matches_optimally() {
		let mut g = Graph::new();
		for &(a, b) in &[(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4)] {
			g.add_edge(a, b, 1.0).unwrap();
		}
		let tour = solve_cpp(&g, 1, &TwoOptConfig::default()).unwrap();
		assert_eq!(tour.cost, n64(8.0));
	}

	#[test]
	fn cost_is_independent_of_start_vertex() {
		let g = triangle();
		let a = solve_cpp(&g, 1, &TwoOptConfig::default()).unwrap();
		let b = solve_cpp(&g, 2, &TwoOptConfig::default()).unwrap();
		assert_eq!(a.cost, b.cost);
	}
}
