//! End-to-end scenarios with literal inputs, matched against hand-computed
//! expected costs.

use std::collections::HashSet;
use std::thread;

use arc_router::{dispatch, solve_cpp, Graph, PartitionStrategy, TwoOptConfig, VertexId};
use noisy_float::prelude::n64;

#[test]
fn scenario_a_triangle_all_even() {
	let mut g = Graph::new();
	g.add_edge(1, 2, 1.0).unwrap();
	g.add_edge(2, 3, 1.0).unwrap();
	g.add_edge(3, 1, 1.0).unwrap();
	let tour = solve_cpp(&g, 1, &TwoOptConfig::default()).unwrap();
	assert_eq!(tour.cost, n64(3.0));
	assert!(tour.matching.is_none());
	assert_eq!(tour.vertices.first(), tour.vertices.last());
	assert_eq!(tour.edges.len(), 3);
}

#[test]
fn scenario_b_path_of_three_edges() {
	let mut g = Graph::new();
	g.add_edge(1, 2, 1.0).unwrap();
	g.add_edge(2, 3, 1.0).unwrap();
	g.add_edge(3, 4, 1.0).unwrap();
	let tour = solve_cpp(&g, 1, &TwoOptConfig::default()).unwrap();
	assert_eq!(tour.cost, n64(6.0));
	let matching = tour.matching.as_ref().unwrap();
	assert_eq!(matching.pairs, vec![(1, 4)]);
	assert_eq!(matching.total_weight, n64(3.0));
	assert_eq!(tour.edges.len(), 6);
}

#[test]
fn scenario_c_square_with_diagonal() {
	let mut g = Graph::new();
	g.add_edge(1, 2, 1.0).unwrap();
	g.add_edge(2, 3, 1.0).unwrap();
	g.add_edge(3, 4, 1.0).unwrap();
	g.add_edge(4, 1, 1.0).unwrap();
	g.add_edge(1, 3, 2.0).unwrap();
	let tour = solve_cpp(&g, 1, &TwoOptConfig::default()).unwrap();
	assert_eq!(tour.cost, n64(8.0));
	let matching = tour.matching.as_ref().unwrap();
	assert_eq!(matching.pairs, vec![(1, 3)]);
	assert_eq!(matching.total_weight, n64(2.0));
}

#[test]
fn scenario_d_k4_unit_weights() {
	let mut g = Graph::new();
	for &(a, b) in &[(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4)] {
		g.add_edge(a, b, 1.0).unwrap();
	}
	let tour = solve_cpp(&g, 1, &TwoOptConfig::default()).unwrap();
	assert_eq!(tour.cost, n64(8.0));
	assert_eq!(g.odd_vertices().len(), 4);
	let matching = tour.matching.as_ref().unwrap();
	assert_eq!(matching.pairs.len(), 2);
	assert_eq!(matching.total_weight, n64(2.0));
}

#[test]
fn scenario_e_two_agents_on_a_four_edge_path() {
	let mut g = Graph::new();
	g.add_edge(1, 2, 1.0).unwrap();
	g.add_edge(2, 3, 1.0).unwrap();
	g.add_edge(3, 4, 1.0).unwrap();
	g.add_edge(4, 5, 1.0).unwrap();

	let agents = dispatch(&g, 1, 2, PartitionStrategy::GreedyAssignment, &TwoOptConfig::default()).unwrap();
	assert_eq!(agents.len(), 2);

	let mut covered: HashSet<(VertexId, VertexId)> = HashSet::new();
	for agent in &agents {
		assert_eq!(agent.tour.vertices.first(), Some(&1));
		assert_eq!(agent.tour.vertices.last(), Some(&1));
		for e in &agent.tour.edges {
			covered.insert((e.u.min(e.v), e.u.max(e.v)));
		}
	}
	let mut expected: HashSet<(VertexId, VertexId)> = HashSet::new();
	for e in g.edges() {
		expected.insert((e.u.min(e.v), e.u.max(e.v)));
	}
	assert_eq!(covered, expected);
}

#[test]
fn boundary_already_eulerian_skips_matching() {
	let mut g = Graph::new();
	g.add_edge(1, 2, 1.0).unwrap();
	g.add_edge(2, 3, 1.0).unwrap();
	g.add_edge(3, 1, 1.0).unwrap();
	let tour = solve_cpp(&g, 2, &TwoOptConfig::default()).unwrap();
	assert!(tour.matching.is_none());
}

#[test]
fn boundary_single_edge_is_traversed_twice() {
	let mut g = Graph::new();
	g.add_edge(1, 2, 4.0).unwrap();
	let tour = solve_cpp(&g, 1, &TwoOptConfig::default()).unwrap();
	assert_eq!(tour.vertices, vec![1, 2, 1]);
	assert_eq!(tour.cost, n64(8.0));
}

#[test]
fn boundary_two_odd_vertices_matches_a_single_pair() {
	let mut g = Graph::new();
	g.add_edge(1, 2, 1.0).unwrap();
	g.add_edge(2, 3, 1.0).unwrap();
	let tour = solve_cpp(&g, 1, &TwoOptConfig::default()).unwrap();
	assert_eq!(tour.cost, n64(2.0 + 2.0));
	assert_eq!(tour.matching.unwrap().pairs, vec![(1, 3)]);
}

#[test]
fn repeated_solves_on_one_graph_agree_on_cost() {
	let mut g = Graph::new();
	g.add_edge(1, 2, 1.0).unwrap();
	g.add_edge(2, 3, 1.0).unwrap();
	g.add_edge(3, 4, 1.0).unwrap();
	g.add_edge(4, 1, 1.0).unwrap();
	g.add_edge(1, 3, 2.0).unwrap();

	let a = solve_cpp(&g, 1, &TwoOptConfig::default()).unwrap();
	let b = solve_cpp(&g, 1, &TwoOptConfig::default()).unwrap();
	assert_eq!(a.cost, b.cost);
}

#[test]
fn concurrent_solves_from_two_threads_agree_on_cost() {
	let mut g = Graph::new();
	g.add_edge(1, 2, 1.0).unwrap();
	g.add_edge(2, 3, 1.0).unwrap();
	g.add_edge(3, 4, 1.0).unwrap();
	let g = std::sync::Arc::new(g);

	let g1 = g.clone();
	let g2 = g.clone();
	let t1 = thread::spawn(move || solve_cpp(&g1, 1, &TwoOptConfig::default()).unwrap().cost);
	let t2 = thread::spawn(move || solve_cpp(&g2, 4, &TwoOptConfig::default()).unwrap().cost);
	assert_eq!(t1.join().unwrap(), t2.join().unwrap());
}
