//! Error taxonomy for the routing engine.

use crate::graph::VertexId;

/// Everything that can go wrong inside the engine.
///
/// Every fallible public function returns `Result<_, EngineError>`; there is no
/// internal panic path except for post-condition checks that indicate a bug in
/// this crate rather than bad caller input (`InternalInvariant`).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EngineError {
	/// Malformed graph, bad parameters, or anything the caller could have
	/// avoided by constructing valid input (odd-sized matching input,
	/// non-finite/negative weight, self-loop, `k <= 0` or `k > |V|`, ...).
	#[error("invalid input: {0}")]
	InvalidInput(String),
	/// The edge-bearing subgraph a component was asked to operate on has more
	/// than one connected component.
	#[error("graph is disconnected: {0}")]
	Disconnected(String),
	/// A requested shortest-path destination is not reachable from the source.
	#[error("vertex {0} is unreachable from the requested source")]
	Unreachable(VertexId),
	/// A post-condition check failed (e.g. a non-Eulerian multigraph reached
	/// Hierholzer). Indicates a bug in this crate, not bad caller input.
	#[error("internal invariant violated: {0}")]
	InternalInvariant(String),
}
