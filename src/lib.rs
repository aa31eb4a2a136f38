//! Arc routing engine: Chinese Postman solving over weighted graphs, and
//! multi-agent depot-rooted dispatch built on top of it.
//!
//! The crate is a pure, synchronous library: it consumes and produces
//! in-memory graphs and tours, and never touches the filesystem or the
//! network. Build a [`graph::Graph`], then call [`cpp::solve_cpp`] for a
//! single closed walk covering every edge, or [`dispatch::dispatch`] to split
//! the work across several depot-rooted agents.

pub mod cpp;
pub mod dijkstra;
pub mod dispatch;
pub mod error;
pub mod eulerian;
pub mod graph;
pub mod matching;
pub mod partition;

pub use cpp::{solve_cpp, Tour, TraversedEdge};
pub use dispatch::{dispatch, AgentTour, PartitionStrategy};
pub use error::EngineError;
pub use graph::{EdgeId, Graph, VertexId};
pub use matching::{min_weight_perfect_matching, Matching, TwoOptConfig};
