//! Eulerian circuit extraction via Hierholzer's algorithm.

use indexmap::IndexMap;

use crate::error::EngineError;
use crate::graph::{EdgeId, VertexId};

/// A local, mutable working copy of parallel-edge counts between vertices,
/// built once from the augmented edge multiset, consumed by `extract_circuit`,
/// and then discarded. Unlike `graph::Graph` it tracks edge ids per parallel
/// copy, so the extracted circuit can report which original edge was
/// traversed, but carries no weight of its own: weights are looked up from the
/// original simple graph when reporting.
#[derive(Clone, Debug, Default)]
pub struct Multigraph {
	adjacency: IndexMap<VertexId, IndexMap<VertexId, Vec<EdgeId>>>,
}

impl Multigraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds one copy of the edge `(u, v)` carrying `id` (the original edge's
	/// identity; duplicated copies from matching-path augmentation reuse the
	/// id of the original edge they duplicate).
	pub fn add_copy(&mut self, u: VertexId, v: VertexId, id: EdgeId) {
		self.adjacency.entry(u).or_default().entry(v).or_default().push(id);
		self.adjacency.entry(v).or_default().entry(u).or_default().push(id);
	}

	pub fn degree(&self, v: VertexId) -> usize {
		self.adjacency.get(&v).map_or(0, |n| n.values().map(Vec::len).sum())
	}

	/// Removes one copy of an edge incident to `v`, the first remaining
	/// neighbor/copy in insertion order, and returns the other endpoint and
	/// the edge id removed.
	fn take_one_incident_edge(&mut self, v: VertexId) -> Option<(VertexId, EdgeId)> {
		let neighbors = self.adjacency.get_mut(&v)?;
		let (&u, copies) = neighbors.iter_mut().find(|(_, copies)| !copies.is_empty())?;
		let id = copies.pop().unwrap();
		if let Some(back) = self.adjacency.get_mut(&u).and_then(|n| n.get_mut(&v)) {
			if let Some(pos) = back.iter().position(|&e| e == id) {
				back.remove(pos);
			}
		}
		Some((u, id))
	}

	fn total_remaining_edges(&self) -> usize {
		self.adjacency.values().map(|n| n.values().map(Vec::len).sum::<usize>()).sum::<usize>() / 2
	}
}

/// One traversed edge of an extracted Eulerian circuit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircuitEdge {
	pub u: VertexId,
	pub v: VertexId,
	pub edge_id: EdgeId,
}

/// Runs Hierholzer's algorithm on `mg`, starting at `start`, consuming `mg` in
/// the process.
///
/// Precondition (checked): every vertex of `mg` has even degree and all of
/// `mg`'s edges lie in one connected component reachable from `start`.
pub fn extract_circuit(mut mg: Multigraph, start: VertexId) -> Result<Vec<CircuitEdge>, EngineError> {
	let total_edges = mg.total_remaining_edges();
	if total_edges == 0 {
		return Ok(Vec::new());
	}
	for v in mg.adjacency.keys().copied().collect::<Vec<_>>() {
		if mg.degree(v) % 2 != 0 {
			return Err(EngineError::InternalInvariant(format!("vertex {} has odd degree entering Hierholzer", v)));
		}
	}
	// Stack entries carry the edge used to arrive at that vertex (`None` only
	// for `start`). Edges are recorded on the way back up (pop), not on the
	// way down: a vertex is popped once it has no edges left, and the edge
	// that led into it is then attached between it and whatever is now on
	// top of the stack. The resulting list is in reverse traversal order and
	// is reversed once at the end.
	let mut stack: Vec<(VertexId, Option<EdgeId>)> = vec![(start, None)];
	let mut circuit: Vec<CircuitEdge> = Vec::with_capacity(total_edges);
	while let Some(&(top, _)) = stack.last() {
		if let Some((next, edge_id)) = mg.take_one_incident_edge(top) {
			stack.push((next, Some(edge_id)));
		} else {
			let (popped, arrived_via) = stack.pop().unwrap();
			if let (Some(&(prev, _)), Some(edge_id)) = (stack.last(), arrived_via) {
				circuit.push(CircuitEdge { u: prev, v: popped, edge_id });
			}
		}
	}
	circuit.reverse();
	if circuit.len() != total_edges {
		return Err(EngineError::InternalInvariant(format!(
			"Hierholzer consumed {} of {} edges; the multigraph was not a single Eulerian component reachable from {}",
			circuit.len(),
			total_edges,
			start
		)));
	}
	Ok(circuit)
}
