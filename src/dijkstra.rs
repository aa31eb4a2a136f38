//! Single-source shortest paths.

use std::collections::HashMap;

use noisy_float::prelude::{n64, N64};
use priority_queue::PriorityQueue;

use crate::error::EngineError;
use crate::graph::{Graph, VertexId};

/// Result of a single-source Dijkstra run: for every reachable vertex, its
/// distance from the source and its predecessor on some shortest path.
/// Absence of a vertex signals unreachability.
#[derive(Clone, Debug, Default)]
pub struct ShortestPaths {
	pub source: VertexId,
	dist: HashMap<VertexId, N64>,
	pred: HashMap<VertexId, VertexId>,
}

impl ShortestPaths {
	pub fn distance(&self, v: VertexId) -> Option<N64> {
		self.dist.get(&v).copied()
	}

	pub fn is_reachable(&self, v: VertexId) -> bool {
		v == self.source || self.dist.contains_key(&v)
	}

	/// Reconstructs the path from the source to `v` by walking predecessors
	/// back to the source, then reversing. Fails with `Unreachable` if `v`
	/// was never settled.
	pub fn path_to(&self, v: VertexId) -> Result<Vec<VertexId>, EngineError> {
		if !self.is_reachable(v) {
			return Err(EngineError::Unreachable(v));
		}
		let mut path = vec![v];
		let mut cur = v;
		while cur != self.source {
			cur = *self.pred.get(&cur).expect("reachable vertex must have a predecessor unless it is the source");
			path.push(cur);
		}
		path.reverse();
		Ok(path)
	}
}

/// Heap-optimized lazy Dijkstra over the simple-graph (min-parallel-weight)
/// view of `g`, starting at `source`. Ties are broken by the `IndexMap`
/// iteration order of `Graph::neighbors`, which is stable for a given graph.
pub fn dijkstra(g: &Graph, source: VertexId) -> ShortestPaths {
	let mut dist: HashMap<VertexId, N64> = HashMap::new();
	let mut pred: HashMap<VertexId, VertexId> = HashMap::new();
	let mut heap: PriorityQueue<VertexId, N64> = PriorityQueue::new();
	dist.insert(source, n64(0.0));
	heap.push(source, n64(0.0));
	while let Some((u, neg_d)) = heap.pop() {
		let d = -neg_d;
		if dist.get(&u).map_or(true, |best| *best < d) {
			continue;
		}
		for v in g.neighbors(u) {
			let w = g.min_weight(u, v).expect("neighbor implies an edge exists");
			let nd = d + w;
			if dist.get(&v).map_or(true, |best| nd < *best) {
				dist.insert(v, nd);
				pred.insert(v, u);
				heap.push(v, -nd);
			}
		}
	}
	log::debug!("dijkstra from {}: {} vertices reached", source, dist.len());
	ShortestPaths { source, dist, pred }
}
