//! Graph store: an undirected weighted multigraph with stable edge identities.
//!
//! Historically this crate's graph handling grew out of a generic `Edge`/`Graph`
//! pair built for a street-network plowing solver; here it is pared down and
//! specialized to exactly what the routing engine needs: vertices are opaque
//! `u64`s, edges are unordered pairs with a positive finite weight and a stable
//! id, and parallel edges between the same two vertices are allowed (the simple
//! graph view, one weight per vertex pair, is a derived query, not a separate
//! structure).

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use noisy_float::prelude::{n64, N64};

use crate::error::EngineError;

/// Opaque vertex identifier. No intrinsic attributes are consulted by the
/// engine; callers may attach coordinates or other metadata out-of-band.
pub type VertexId = u64;

/// Stable identity of an edge, assigned incrementally on insertion.
pub type EdgeId = u64;

/// An edge of the graph: an unordered pair of distinct vertices with a
/// positive finite weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
	pub id: EdgeId,
	pub u: VertexId,
	pub v: VertexId,
	pub weight: N64,
}

impl Edge {
	/// Given one endpoint, returns the other.
	pub fn other(&self, from: VertexId) -> VertexId {
		if from == self.u {
			self.v
		} else {
			self.u
		}
	}
}

/// An undirected weighted multigraph.
///
/// Invariant: adjacency is symmetric, `u` appears among `v`'s neighbors iff
/// `v` appears among `u`'s. Self-loops are rejected on insertion. Vertices
/// are iterated in insertion order (`IndexMap`), so neighbor order and
/// therefore tie-breaking in Dijkstra and Hierholzer is reproducible.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	adjacency: IndexMap<VertexId, IndexMap<VertexId, Vec<EdgeId>>>,
	edges: IndexMap<EdgeId, Edge>,
	next_edge_id: EdgeId,
}

impl Graph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Ensures `v` exists, even if it ends up with no incident edges.
	pub fn add_vertex(&mut self, v: VertexId) {
		self.adjacency.entry(v).or_default();
	}

	/// Inserts an edge between `u` and `v` with the given weight. Duplicate
	/// edges between the same pair are allowed and kept as distinct parallel
	/// edges (each gets its own id); `Graph::min_weight` is the simple-graph
	/// view that collapses them.
	pub fn add_edge(&mut self, u: VertexId, v: VertexId, weight: f64) -> Result<EdgeId, EngineError> {
		if u == v {
			return Err(EngineError::InvalidInput(format!("self-loop at vertex {} rejected", u)));
		}
		if !weight.is_finite() || weight <= 0.0 {
			return Err(EngineError::InvalidInput(format!("edge ({},{}) has non-positive or non-finite weight {}", u, v, weight)));
		}
		let weight = n64(weight);
		let id = self.next_edge_id;
		self.next_edge_id += 1;
		self.add_vertex(u);
		self.add_vertex(v);
		self.adjacency.get_mut(&u).unwrap().entry(v).or_default().push(id);
		self.adjacency.get_mut(&v).unwrap().entry(u).or_default().push(id);
		self.edges.insert(id, Edge { id, u, v, weight });
		log::trace!("added edge #{} ({},{}) weight {}", id, u, v, weight);
		Ok(id)
	}

	/// Inserts an edge reusing an existing edge's id, rather than minting a
	/// fresh one. Used when building a derived graph (an induced subgraph, a
	/// partition's owned subgraph) that must still let callers trace a
	/// traversed edge back to the original edge it came from. Bumps the id
	/// counter past `id` so any later `add_edge` call on this graph can't
	/// collide with it.
	pub(crate) fn add_edge_with_id(&mut self, id: EdgeId, u: VertexId, v: VertexId, weight: N64) {
		self.add_vertex(u);
		self.add_vertex(v);
		self.adjacency.get_mut(&u).unwrap().entry(v).or_default().push(id);
		self.adjacency.get_mut(&v).unwrap().entry(u).or_default().push(id);
		self.edges.insert(id, Edge { id, u, v, weight });
		self.next_edge_id = self.next_edge_id.max(id + 1);
	}

	pub fn vertex_count(&self) -> usize {
		self.adjacency.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
		self.adjacency.keys().copied()
	}

	pub fn edges(&self) -> impl Iterator<Item = &Edge> {
		self.edges.values()
	}

	pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
		self.edges.get(&id)
	}

	/// Degree of `v`, counting each parallel edge separately.
	pub fn degree(&self, v: VertexId) -> usize {
		self.adjacency.get(&v).map_or(0, |neighbors| neighbors.values().map(Vec::len).sum())
	}

	/// Vertices in insertion order (consistent with `vertices()`) whose degree
	/// is odd.
	pub fn odd_vertices(&self) -> Vec<VertexId> {
		self.vertices().filter(|v| self.degree(*v) % 2 == 1).collect()
	}

	/// Neighbors of `v`, one entry per distinct neighbor (parallel edges
	/// collapsed), in insertion order.
	pub fn neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
		self.adjacency.get(&v).into_iter().flat_map(|neighbors| neighbors.keys().copied())
	}

	/// All edge ids between `u` and `v` (empty if not adjacent).
	pub fn edge_ids_between(&self, u: VertexId, v: VertexId) -> &[EdgeId] {
		self.adjacency.get(&u).and_then(|n| n.get(&v)).map_or(&[], Vec::as_slice)
	}

	/// Minimum weight among parallel edges between `u` and `v`: the
	/// simple-graph view of this multigraph, one weight per vertex pair.
	pub fn min_weight(&self, u: VertexId, v: VertexId) -> Option<N64> {
		self.edge_ids_between(u, v).iter().filter_map(|id| self.edges.get(id)).map(|e| e.weight).min()
	}

	/// Sum of the weights of every edge (parallel edges counted individually).
	pub fn total_weight(&self) -> N64 {
		self.edges.values().map(|e| e.weight).sum()
	}

	/// Vertices with at least one incident edge.
	pub fn non_isolated_vertices(&self) -> Vec<VertexId> {
		self.vertices().filter(|v| self.degree(*v) > 0).collect()
	}

	/// Whether every edge-bearing vertex is reachable from any other via some
	/// path, i.e. the edge-bearing subgraph is a single connected component.
	/// Isolated vertices (no incident edges) do not count against this.
	pub fn is_connected(&self) -> bool {
		let non_isolated = self.non_isolated_vertices();
		let start = match non_isolated.first() {
			Some(v) => *v,
			None => return true,
		};
		let mut visited: HashSet<VertexId> = HashSet::new();
		let mut stack = vec![start];
		while let Some(u) = stack.pop() {
			if !visited.insert(u) {
				continue;
			}
			for v in self.neighbors(u) {
				if !visited.contains(&v) {
					stack.push(v);
				}
			}
		}
		non_isolated.into_iter().all(|v| visited.contains(&v))
	}

	/// Builds the induced subgraph on `subset`, keeping only edges whose both
	/// endpoints are in the subset. Preserves each kept edge's original id.
	pub fn induced_subgraph(&self, subset: &IndexSet<VertexId>) -> Graph {
		let mut g = Graph::new();
		for v in subset {
			g.add_vertex(*v);
		}
		for e in self.edges() {
			if subset.contains(&e.u) && subset.contains(&e.v) {
				g.add_edge_with_id(e.id, e.u, e.v, e.weight);
			}
		}
		g
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn symmetric_adjacency() {
		let mut g = Graph::new();
		g.add_edge(1, 2, 1.0).unwrap();
		assert!(g.neighbors(1).any(|v| v == 2));
		assert!(g.neighbors(2).any(|v| v == 1));
		assert_eq!(g.degree(1), 1);
		assert_eq!(g.degree(2), 1);
	}

	#[test]
	fn rejects_self_loop() {
		let mut g = Graph::new();
		assert!(g.add_edge(1, 1, 1.0).is_err());
	}

	#[test]
	fn rejects_non_positive_weight() {
		let mut g = Graph::new();
		assert!(g.add_edge(1, 2, 0.0).is_err());
		assert!(g.add_edge(1, 2, -1.0).is_err());
		assert!(g.add_edge(1, 2, f64::NAN).is_err());
		assert!(g.add_edge(1, 2, f64::INFINITY).is_err());
	}

	#[test]
	fn parallel_edges_reduce_to_minimum() {
		let mut g = Graph::new();
		g.add_edge(1, 2, 5.0).unwrap();
		g.add_edge(1, 2, 2.0).unwrap();
		assert_eq!(g.min_weight(1, 2), Some(n64(2.0)));
		assert_eq!(g.degree(1), 2);
	}

	#[test]
	fn odd_vertices_of_a_path() {
		let mut g = Graph::new();
		g.add_edge(1, 2, 1.0).unwrap();
		g.add_edge(2, 3, 1.0).unwrap();
		g.add_edge(3, 4, 1.0).unwrap();
		let mut odd = g.odd_vertices();
		odd.sort_unstable();
		assert_eq!(odd, vec![1, 4]);
	}

	#[test]
	fn connectivity() {
		let mut g = Graph::new();
		g.add_edge(1, 2, 1.0).unwrap();
		g.add_edge(3, 4, 1.0).unwrap();
		assert!(!g.is_connected());
		g.add_edge(2, 3, 1.0).unwrap();
		assert!(g.is_connected());
	}

	#[test]
	fn induced_subgraph_keeps_only_internal_edges() {
		let mut g = Graph::new();
		g.add_edge(1, 2, 1.0).unwrap();
		g.add_edge(2, 3, 1.0).unwrap();
		let sub = g.induced_subgraph(&IndexSet::from_iter([1, 2]));
		assert_eq!(sub.edge_count(), 1);
		assert_eq!(sub.vertex_count(), 2);
	}

	#[test]
	fn induced_subgraph_preserves_original_edge_ids() {
		let mut g = Graph::new();
		let id = g.add_edge(1, 2, 1.0).unwrap();
		g.add_edge(2, 3, 1.0).unwrap();
		let sub = g.induced_subgraph(&IndexSet::from_iter([1, 2]));
		assert_eq!(sub.get_edge(id).map(|e| (e.u, e.v)), Some((1, 2)));
	}
}
