//! Search matching, gravity range filtering and membership subgraphs.

use std::collections::{HashMap, HashSet};

use super::CouplingGraph;
use super::snapshot::Snapshot;

/// Result of matching a search query against node labels.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
	/// Empty query: no selection, no suggestions.
	Cleared,
	/// A single node whose label equals the query exactly.
	Selected(String),
	/// Every node whose label contains the query, ignoring case. May be empty.
	Suggested(HashSet<String>),
}

/// Match `query` against node labels.
///
/// Matching is a case-insensitive substring test. Only when exactly one node
/// matches and its label equals the query byte for byte is it selected.
pub fn search(graph: &CouplingGraph, query: &str) -> SearchOutcome {
	if query.is_empty() {
		return SearchOutcome::Cleared;
	}
	let needle = query.to_lowercase();
	let matches: Vec<(&str, &str)> = graph
		.nodes()
		.filter(|(_, node)| node.label.to_lowercase().contains(&needle))
		.map(|(key, node)| (key, node.label.as_str()))
		.collect();

	match matches.as_slice() {
		[(key, label)] if *label == query => SearchOutcome::Selected(key.to_string()),
		_ => SearchOutcome::Suggested(matches.iter().map(|(key, _)| key.to_string()).collect()),
	}
}

/// Labels offered as autocomplete options, in graph order.
pub fn search_labels(graph: &CouplingGraph) -> Vec<String> {
	graph.nodes().map(|(_, node)| node.label.clone()).collect()
}

/// Inclusive gravity interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravityRange {
	/// Inclusive lower bound.
	pub min: f64,
	/// Inclusive upper bound.
	pub max: f64,
}

impl GravityRange {
	/// Build a range from two slider thumbs in either order.
	pub fn new(a: f64, b: f64) -> Self {
		Self {
			min: a.min(b),
			max: a.max(b),
		}
	}

	/// Unknown gravity never falls inside a numeric range.
	pub fn contains(&self, gravity: Option<f64>) -> bool {
		gravity.is_some_and(|g| self.min <= g && g <= self.max)
	}
}

impl Default for GravityRange {
	fn default() -> Self {
		Self { min: 0.0, max: 1.0 }
	}
}

/// Counts of what stayed visible after a range filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RangeSummary {
	/// Edges left visible.
	pub visible_edges: usize,
	/// Nodes left visible.
	pub visible_nodes: usize,
}

/// Hide edges whose gravity is outside `range`, then hide every node left
/// without a visible incident edge.
pub fn apply_gravity_range(graph: &mut CouplingGraph, range: GravityRange) -> RangeSummary {
	let mut summary = RangeSummary::default();
	let mut lit: HashSet<String> = HashSet::new();

	for key in graph.edge_keys() {
		let visible = graph.edge(&key).is_some_and(|edge| range.contains(edge.gravity));
		if let Some(edge) = graph.edge_mut(&key) {
			edge.hidden = !visible;
		}
		if visible {
			summary.visible_edges += 1;
			if let Some((src, tgt)) = graph.extremities(&key) {
				lit.insert(src.to_string());
				lit.insert(tgt.to_string());
			}
		}
	}

	for key in graph.node_keys() {
		let visible = lit.contains(&key);
		if let Some(node) = graph.node_mut(&key) {
			node.hidden = !visible;
		}
		if visible {
			summary.visible_nodes += 1;
		}
	}
	summary
}

/// Keep the edges whose endpoints both belong to `a` or `b`, and exactly the
/// nodes those edges touch. Connectivity is not considered.
pub fn membership_subgraph(snapshot: &Snapshot, a: &str, b: &str) -> Snapshot {
	let membership: HashMap<&str, &str> = snapshot
		.nodes
		.iter()
		.filter_map(|node| Some((node.key.as_str(), node.attributes.microservice_id.as_deref()?)))
		.collect();
	let member = |key: &str| membership.get(key).is_some_and(|&id| id == a || id == b);

	let edges: Vec<_> = snapshot
		.edges
		.iter()
		.filter(|edge| member(&edge.source) && member(&edge.target))
		.cloned()
		.collect();
	let endpoints: HashSet<&str> = edges
		.iter()
		.flat_map(|edge| [edge.source.as_str(), edge.target.as_str()])
		.collect();
	let nodes = snapshot
		.nodes
		.iter()
		.filter(|node| endpoints.contains(node.key.as_str()))
		.cloned()
		.collect();

	Snapshot {
		nodes,
		edges,
		build_date: snapshot.build_date,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::tests::graph_of;

	fn labels() -> CouplingGraph {
		graph_of(
			&[
				("1", "orders"),
				("2", "Orders-API"),
				("3", "billing"),
				("4", "Billing"),
				("5", "shipping"),
			],
			&[],
		)
	}

	fn set(keys: &[&str]) -> HashSet<String> {
		keys.iter().map(|k| k.to_string()).collect()
	}

	#[test]
	fn unique_exact_match_selects() {
		assert_eq!(search(&labels(), "shipping"), SearchOutcome::Selected("5".into()));
	}

	#[test]
	fn unique_substring_match_only_suggests() {
		assert_eq!(search(&labels(), "ship"), SearchOutcome::Suggested(set(&["5"])));
	}

	#[test]
	fn unique_match_differing_in_case_only_suggests() {
		assert_eq!(search(&labels(), "SHIPPING"), SearchOutcome::Suggested(set(&["5"])));
	}

	#[test]
	fn several_matches_suggest_even_with_exact_label() {
		assert_eq!(search(&labels(), "billing"), SearchOutcome::Suggested(set(&["3", "4"])));
		assert_eq!(search(&labels(), "order"), SearchOutcome::Suggested(set(&["1", "2"])));
	}

	#[test]
	fn no_match_is_an_empty_suggestion_set() {
		assert_eq!(search(&labels(), "zzz"), SearchOutcome::Suggested(HashSet::new()));
	}

	#[test]
	fn empty_query_clears() {
		assert_eq!(search(&labels(), ""), SearchOutcome::Cleared);
	}

	#[test]
	fn range_bounds_are_inclusive() {
		let range = GravityRange::new(0.8, 0.2);
		assert_eq!(range, GravityRange { min: 0.2, max: 0.8 });
		assert!(range.contains(Some(0.2)));
		assert!(range.contains(Some(0.8)));
		assert!(!range.contains(Some(0.81)));
		assert!(!range.contains(None));
		assert!(!GravityRange::default().contains(None));
	}

	#[test]
	fn range_filter_couples_node_and_edge_visibility() {
		let mut graph = graph_of(
			&[("x", "X"), ("y", "Y"), ("z", "Z"), ("lonely", "L"), ("w", "W")],
			&[
				("xy", "x", "y", Some(0.2)),
				("yz", "y", "z", Some(0.8)),
				("zw", "z", "w", None),
			],
		);
		let summary = apply_gravity_range(&mut graph, GravityRange::new(0.5, 1.0));
		assert_eq!(summary, RangeSummary { visible_edges: 1, visible_nodes: 2 });

		assert!(graph.edge("xy").unwrap().hidden);
		assert!(!graph.edge("yz").unwrap().hidden);
		assert!(graph.edge("zw").unwrap().hidden);
		assert!(graph.node("x").unwrap().hidden);
		assert!(!graph.node("y").unwrap().hidden);
		assert!(!graph.node("z").unwrap().hidden);
		assert!(graph.node("w").unwrap().hidden);
		assert!(graph.node("lonely").unwrap().hidden);

		apply_gravity_range(&mut graph, GravityRange::default());
		assert!(!graph.node("x").unwrap().hidden);
		assert!(!graph.edge("xy").unwrap().hidden);
		assert!(graph.node("lonely").unwrap().hidden);
	}

	#[test]
	fn membership_subgraph_keeps_only_pairwise_members() {
		let snapshot = Snapshot::from_json(
			r#"{
			"nodes": [
				{ "key": "f1", "attributes": { "microservice_id": "A" } },
				{ "key": "f2", "attributes": { "microservice_id": "B" } },
				{ "key": "f3", "attributes": { "microservice_id": "A" } },
				{ "key": "f4", "attributes": { "microservice_id": "C" } },
				{ "key": "f5", "attributes": { "microservice_id": "B" } }
			],
			"edges": [
				{ "source": "f1", "target": "f2" },
				{ "source": "f1", "target": "f3" },
				{ "source": "f3", "target": "f4" },
				{ "source": "f4", "target": "f5" }
			]
		}"#,
		)
		.unwrap();
		let sub = membership_subgraph(&snapshot, "A", "B");
		let edges: Vec<_> = sub.edges.iter().map(|e| e.identity()).collect();
		assert_eq!(edges, vec!["f1->f2", "f1->f3"]);
		let nodes: Vec<_> = sub.nodes.iter().map(|n| n.key.as_str()).collect();
		assert_eq!(nodes, vec!["f1", "f2", "f3"]);
	}

	#[test]
	fn nodes_without_membership_belong_to_no_pair() {
		let snapshot = Snapshot::from_json(
			r#"{
			"nodes": [
				{ "key": "f1", "attributes": { "microservice_id": 7 } },
				{ "key": "f2" },
				{ "key": "f3", "attributes": { "microservice_id": "8" } }
			],
			"edges": [
				{ "source": "f1", "target": "f2" },
				{ "source": "f1", "target": "f3" }
			]
		}"#,
		)
		.unwrap();
		let sub = membership_subgraph(&snapshot, "7", "8");
		let edges: Vec<_> = sub.edges.iter().map(|e| e.identity()).collect();
		assert_eq!(edges, vec!["f1->f3"]);
	}

	#[test]
	fn loaded_snapshot_filters_by_gravity_range() {
		let snapshot = Snapshot::from_json(
			r##"{
			"nodes": [
				{ "key": "x", "attributes": { "label": "X", "color": "#111111" } },
				{ "key": "y", "attributes": { "label": "Y", "color": "#222222" } },
				{ "key": "z", "attributes": { "label": "Z", "color": "#333333" } }
			],
			"edges": [
				{ "key": "xy", "source": "x", "target": "y", "attributes": { "gravity": 0.2, "files": 3 } },
				{ "key": "yz", "source": "y", "target": "z", "attributes": { "gravity": 0.8, "files": 5 } }
			]
		}"##,
		)
		.unwrap();
		let (mut graph, _) = crate::graph::style::graph_view(&snapshot);

		let summary = apply_gravity_range(&mut graph, GravityRange::new(0.5, 1.0));
		assert_eq!(summary, RangeSummary { visible_edges: 1, visible_nodes: 2 });
		assert!(graph.node("x").unwrap().hidden);
		assert!(!graph.node("y").unwrap().hidden);
		assert!(!graph.node("z").unwrap().hidden);
		assert!(graph.edge("xy").unwrap().hidden);
		assert!(!graph.edge("yz").unwrap().hidden);
	}
}
