//! Minimum-weight perfect matching over an even-sized vertex set.
//!
//! Two strategies are selected purely by size: an exact bitmask DP for
//! `m <= EXACT_THRESHOLD` (memoized over `2^m` subsets, feasible up to m=20),
//! and a greedy-then-2-opt heuristic above that.

use itertools::Itertools;
use noisy_float::prelude::{n64, N64};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::graph::VertexId;

/// Above this many vertices, the exact DP is abandoned in favor of the greedy
/// + 2-opt heuristic.
pub const EXACT_THRESHOLD: usize = 20;

/// Bounds on the greedy + 2-opt local search.
#[derive(Clone, Copy, Debug)]
pub struct TwoOptConfig {
	pub max_iterations: usize,
	pub epsilon: f64,
}

impl Default for TwoOptConfig {
	fn default() -> Self {
		Self { max_iterations: 1000, epsilon: 1e-12 }
	}
}

/// A minimum (or approximately minimum) weight perfect matching: a set of
/// vertex-disjoint pairs covering every input vertex exactly once.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matching {
	pub pairs: Vec<(VertexId, VertexId)>,
	pub total_weight: N64,
}

/// Computes a minimum-weight perfect matching of `vertices` under the given
/// symmetric `weight` function. `vertices` must have even length; `weight`
/// need not be defined for a vertex against itself (never queried as such).
pub fn min_weight_perfect_matching<F>(vertices: &[VertexId], weight: F, config: &TwoOptConfig) -> Result<Matching, EngineError>
where
	F: Fn(VertexId, VertexId) -> N64,
{
	let m = vertices.len();
	if m % 2 != 0 {
		return Err(EngineError::InvalidInput(format!("matching requires an even-sized vertex set, got {}", m)));
	}
	if m == 0 {
		return Ok(Matching { pairs: Vec::new(), total_weight: n64(0.0) });
	}
	let mut cost = vec![vec![n64(0.0); m]; m];
	for i in 0..m {
		for j in (i + 1)..m {
			let w = weight(vertices[i], vertices[j]);
			cost[i][j] = w;
			cost[j][i] = w;
		}
	}
	let index_pairs = if m <= EXACT_THRESHOLD {
		log::debug!("matching {} vertices exactly (bitmask DP)", m);
		exact_bitmask_matching(m, &cost)
	} else {
		log::debug!("matching {} vertices heuristically (greedy + 2-opt)", m);
		greedy_two_opt_matching(m, &cost, config)
	};
	let total_weight = index_pairs.iter().map(|&(i, j)| cost[i][j]).sum();
	let pairs = index_pairs.into_iter().map(|(i, j)| (vertices[i], vertices[j])).collect();
	Ok(Matching { pairs, total_weight })
}

/// `f(mask)` = minimum weight perfect matching of the subset of indices set
/// in `mask` (always even popcount). Computed bottom-up over all `2^m` masks
/// so that `f(mask)` only ever depends on already-computed smaller masks.
fn exact_bitmask_matching(m: usize, cost: &[Vec<N64>]) -> Vec<(usize, usize)> {
	let full: u32 = (1u32 << m) - 1;
	let mut memo: Vec<Option<N64>> = vec![None; 1usize << m];
	let mut choice: Vec<Option<(usize, usize)>> = vec![None; 1usize << m];
	memo[0] = Some(n64(0.0));
	for mask in 1..=full {
		if mask.count_ones() % 2 != 0 {
			continue;
		}
		let i = mask.trailing_zeros() as usize;
		let mask2 = mask & !(1 << i);
		let mut best: Option<N64> = None;
		let mut best_j = 0usize;
		let mut remaining = mask2;
		while remaining != 0 {
			let jbit = remaining & remaining.wrapping_neg();
			let j = jbit.trailing_zeros() as usize;
			let sub = memo[(mask2 ^ jbit) as usize].expect("submask with even popcount already computed");
			let candidate = cost[i][j] + sub;
			if best.map_or(true, |b| candidate < b) {
				best = Some(candidate);
				best_j = j;
			}
			remaining ^= jbit;
		}
		memo[mask as usize] = best;
		choice[mask as usize] = Some((i, best_j));
	}
	let mut pairs = Vec::with_capacity(m / 2);
	let mut mask = full;
	while mask != 0 {
		let (i, j) = choice[mask as usize].expect("full mask and all descendants were computed");
		pairs.push((i, j));
		mask &= !(1 << i);
		mask &= !(1 << j);
	}
	pairs
}

/// Greedy-accept-cheapest-pair followed by bounded pairwise 2-opt
/// improvement, the fallback for large `m` where the exact DP is infeasible.
fn greedy_two_opt_matching(m: usize, cost: &[Vec<N64>], config: &TwoOptConfig) -> Vec<(usize, usize)> {
	let mut all_pairs: Vec<(N64, usize, usize)> = (0..m).tuple_combinations().map(|(i, j)| (cost[i][j], i, j)).collect();
	all_pairs.sort_by(|a, b| a.0.cmp(&b.0));
	let mut used = vec![false; m];
	let mut matching: Vec<(usize, usize)> = Vec::with_capacity(m / 2);
	for (_, i, j) in all_pairs {
		if !used[i] && !used[j] {
			used[i] = true;
			used[j] = true;
			matching.push((i, j));
		}
	}

	let epsilon = n64(config.epsilon);
	let mut improved = true;
	let mut iterations = 0;
	while improved && iterations < config.max_iterations {
		improved = false;
		iterations += 1;
		'outer: for p in 0..matching.len() {
			let (a, b) = matching[p];
			for q in (p + 1)..matching.len() {
				let (c, d) = matching[q];
				let current = cost[a][b] + cost[c][d];
				let swap_ac_bd = cost[a][c] + cost[b][d];
				let swap_ad_bc = cost[a][d] + cost[b][c];
				if swap_ac_bd + epsilon < current {
					matching[p] = (a, c);
					matching[q] = (b, d);
					improved = true;
					break 'outer;
				} else if swap_ad_bc + epsilon < current {
					matching[p] = (a, d);
					matching[q] = (b, c);
					improved = true;
					break 'outer;
				}
			}
		}
	}
	log::trace!("greedy+2-opt matching converged after {} pass(es)", iterations);
	matching
}
