//! Vertex partitioning into k groups: recursive Kernighan-Lin bisection, and
//! greedy nearest-to-frontier distance-based assignment.

use std::collections::HashSet;

use indexmap::IndexSet;
use noisy_float::prelude::n64;

use crate::dijkstra::dijkstra;
use crate::error::EngineError;
use crate::graph::{Graph, VertexId};

/// Balanced bisection, then recurse on the induced halves with `floor(k/2)`
/// and `ceil(k/2)` agents respectively.
pub fn recursive_bisection(g: &Graph, k: usize) -> Result<Vec<IndexSet<VertexId>>, EngineError> {
	let vertices: IndexSet<VertexId> = g.vertices().collect();
	if k == 0 {
		return Err(EngineError::InvalidInput("partition count k must be positive".to_string()));
	}
	if k > vertices.len() {
		return Err(EngineError::InvalidInput(format!("partition count k={} exceeds vertex count {}", k, vertices.len())));
	}
	if k == 1 {
		return Ok(vec![vertices.into_iter().collect()]);
	}
	let (a, b) = kernighan_lin_bisection(g, &vertices);
	let ga = g.induced_subgraph(&a);
	let gb = g.induced_subgraph(&b);
	let ka = k / 2;
	let kb = k - ka;
	let mut parts = recursive_bisection(&ga, ka.max(1))?;
	parts.extend(recursive_bisection(&gb, kb.max(1))?);
	Ok(parts)
}

/// One pass of Kernighan-Lin: start from an arbitrary balanced split (first
/// half / second half of insertion order, for determinism), then repeatedly
/// swap the cross-cut vertex pair that most reduces cut weight, locking each
/// vertex after it has swapped once, accepting the best prefix of the pass.
/// Repeat full passes until a pass improves nothing.
fn kernighan_lin_bisection(g: &Graph, vertices: &IndexSet<VertexId>) -> (IndexSet<VertexId>, IndexSet<VertexId>) {
	let n = vertices.len();
	let mid = n / 2;
	let mut a: IndexSet<VertexId> = vertices.iter().take(mid.max(1)).copied().collect();
	let mut b: IndexSet<VertexId> = vertices.iter().skip(mid.max(1)).copied().collect();
	if a.is_empty() || b.is_empty() {
		return (a, b);
	}

	let cut_weight = |a: &IndexSet<VertexId>, b: &IndexSet<VertexId>| -> f64 {
		g.edges().filter(|e| (a.contains(&e.u) && b.contains(&e.v)) || (a.contains(&e.v) && b.contains(&e.u))).map(|e| e.weight.raw()).sum()
	};

	loop {
		// Simulate a full pass of swaps on working copies, locking each vertex
		// after it trades sides once, recording the cut value after every swap.
		let mut a_trial = a.clone();
		let mut b_trial = b.clone();
		let mut locked: HashSet<VertexId> = HashSet::new();
		let mut swaps: Vec<(VertexId, VertexId)> = Vec::new();
		let mut cut_after: Vec<f64> = Vec::new();

		let max_swaps = a.len().min(b.len());
		for _ in 0..max_swaps {
			let candidates_a: Vec<VertexId> = a_trial.iter().copied().filter(|v| !locked.contains(v)).collect();
			let candidates_b: Vec<VertexId> = b_trial.iter().copied().filter(|v| !locked.contains(v)).collect();
			let mut best: Option<(VertexId, VertexId, f64)> = None;
			for &va in &candidates_a {
				for &vb in &candidates_b {
					let mut pa = a_trial.clone();
					let mut pb = b_trial.clone();
					pa.remove(&va);
					pa.insert(vb);
					pb.remove(&vb);
					pb.insert(va);
					let c = cut_weight(&pa, &pb);
					if best.map_or(true, |(_, _, best_c)| c < best_c) {
						best = Some((va, vb, c));
					}
				}
			}
			let (va, vb, c) = match best {
				Some(x) => x,
				None => break,
			};
			a_trial.remove(&va);
			a_trial.insert(vb);
			b_trial.remove(&vb);
			b_trial.insert(va);
			locked.insert(va);
			locked.insert(vb);
			swaps.push((va, vb));
			cut_after.push(c);
		}

		if swaps.is_empty() {
			break;
		}
		let current_cut = cut_weight(&a, &b);
		let (best_len, best_cut) =
			cut_after.iter().enumerate().fold((0usize, current_cut), |acc, (i, &c)| if c < acc.1 { (i + 1, c) } else { acc });
		if best_len == 0 || best_cut >= current_cut - 1e-12 {
			break;
		}
		for &(va, vb) in &swaps[..best_len] {
			a.remove(&va);
			a.insert(vb);
			b.remove(&vb);
			b.insert(va);
		}
	}
	(a, b)
}

/// One agent's incrementally grown vertex set under greedy assignment.
struct Agent {
	vertices: IndexSet<VertexId>,
	cost: noisy_float::prelude::N64,
	current: VertexId,
}

/// Greedy nearest-to-frontier assignment: grow each agent's route one vertex
/// at a time, always handing the next-closest unassigned vertex to whichever
/// agent can reach it cheapest from its current position.
pub fn greedy_assignment(g: &Graph, s: VertexId, k: usize) -> Result<Vec<IndexSet<VertexId>>, EngineError> {
	let vertex_count = g.vertex_count();
	if k == 0 {
		return Err(EngineError::InvalidInput("agent count k must be positive".to_string()));
	}
	if k > vertex_count {
		return Err(EngineError::InvalidInput(format!("agent count k={} exceeds vertex count {}", k, vertex_count)));
	}
	let sp = dijkstra(g, s);
	let mut sorted: Vec<VertexId> = g.vertices().filter(|&v| v != s).collect();
	sorted.sort_by_key(|&v| sp.distance(v).unwrap_or(n64(f64::INFINITY)));

	let mut agents: Vec<Agent> = (0..k).map(|_| Agent { vertices: [s].into_iter().collect(), cost: n64(0.0), current: s }).collect();
	// Cached per distinct `current` vertex seen so far: agents frequently
	// share a `current` (all start at `s`), and a vertex's shortest-path tree
	// is reusable across every later lookup from that same source.
	let mut sp_cache: std::collections::HashMap<VertexId, crate::dijkstra::ShortestPaths> = std::collections::HashMap::new();
	sp_cache.insert(s, sp);

	for v in sorted {
		let mut best_agent = 0usize;
		let mut best_total = n64(f64::INFINITY);
		for (i, agent) in agents.iter().enumerate() {
			let from_sp = sp_cache.entry(agent.current).or_insert_with(|| dijkstra(g, agent.current));
			let increment = from_sp.distance(v).ok_or(EngineError::Unreachable(v))?;
			let total = agent.cost + increment;
			if total < best_total {
				best_total = total;
				best_agent = i;
			}
		}
		let from_sp = sp_cache.get(&agents[best_agent].current).expect("computed above for every agent");
		let increment = from_sp.distance(v).ok_or(EngineError::Unreachable(v))?;
		agents[best_agent].cost += increment;
		agents[best_agent].current = v;
		agents[best_agent].vertices.insert(v);
	}

	Ok(agents.into_iter().map(|a| a.vertices).collect())
}
