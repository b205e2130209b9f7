//! Per-page node and edge styling, and the legend colors it hands out.

use std::collections::BTreeMap;

use super::snapshot::Snapshot;
use super::{CouplingGraph, DEFAULT_NODE_SIZE};

/// Color of the source microservice's files on the edge-detail page.
pub const SOURCE_MEMBER_COLOR: &str = "#3498db";
/// Color of every other microservice's files on the edge-detail page.
pub const OTHER_MEMBER_COLOR: &str = "#db8bfa";
/// File-level couplings on the edge-detail page.
pub const DETAIL_EDGE_COLOR: &str = "#FEF0D9";
/// Width of file-level couplings.
pub const DETAIL_EDGE_SIZE: f64 = 3.0;

/// Legend entries: membership label to the color its nodes are drawn with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorRegistry {
	colors: BTreeMap<String, String>,
}

impl ColorRegistry {
	/// Record `color` for `label`; later assignments win.
	pub fn assign(&mut self, label: impl Into<String>, color: impl Into<String>) {
		self.colors.insert(label.into(), color.into());
	}

	/// Color assigned to `label`.
	pub fn get(&self, label: &str) -> Option<&str> {
		self.colors.get(label).map(String::as_str)
	}

	/// Number of legend entries.
	pub fn len(&self) -> usize {
		self.colors.len()
	}

	/// No legend entries.
	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}

	/// Entries sorted by label.
	pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
		self.colors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

/// Graph page: snapshot colors as-is; the legend maps each microservice to
/// the color of its first node.
pub fn graph_view(snapshot: &Snapshot) -> (CouplingGraph, ColorRegistry) {
	let graph = CouplingGraph::from_snapshot(snapshot);
	let mut colors = ColorRegistry::default();
	for (_, node) in graph.nodes() {
		if let Some(label) = node.membership_label.as_ref().or(node.membership.as_ref()) {
			if colors.get(label).is_none() {
				colors.assign(label.clone(), node.color.clone());
			}
		}
	}
	(graph, colors)
}

/// Edge-detail page: files of `source` and of the other microservice get
/// fixed contrasting colors, edges a uniform pale color.
pub fn edge_detail(snapshot: &Snapshot, source: &str) -> (CouplingGraph, ColorRegistry) {
	let mut graph = CouplingGraph::from_snapshot(snapshot);
	let mut colors = ColorRegistry::default();
	for key in graph.node_keys() {
		let Some(node) = graph.node_mut(&key) else {
			continue;
		};
		let color = if node.membership.as_deref() == Some(source) {
			SOURCE_MEMBER_COLOR
		} else {
			OTHER_MEMBER_COLOR
		};
		node.color = color.to_string();
		node.size = DEFAULT_NODE_SIZE;
		if let Some(label) = node.membership_label.as_ref().or(node.membership.as_ref()) {
			colors.assign(label.clone(), color);
		}
	}
	for key in graph.edge_keys() {
		if let Some(edge) = graph.edge_mut(&key) {
			edge.color = DETAIL_EDGE_COLOR.to_string();
			edge.size = DETAIL_EDGE_SIZE;
		}
	}
	(graph, colors)
}

#[cfg(test)]
mod tests {
	use super::*;

	const FILES: &str = r##"{
		"nodes": [
			{"key": "f1", "attributes": {"label": "a.rs", "microservice_id": "A", "microservice_label": "Orders", "color": "#111111", "size": 4}},
			{"key": "f2", "attributes": {"label": "b.rs", "microservice_id": "B", "microservice_label": "Billing", "color": "#222222"}},
			{"key": "f3", "attributes": {"label": "c.rs", "microservice_id": "B", "color": "#333333"}}
		],
		"edges": [
			{"source": "f1", "target": "f2", "attributes": {"gravity": 0.4, "files": 2}}
		]
	}"##;

	#[test]
	fn edge_detail_colors_by_source_membership() {
		let snapshot = Snapshot::from_json(FILES).unwrap();
		let (graph, colors) = edge_detail(&snapshot, "A");
		assert_eq!(graph.node("f1").unwrap().color, SOURCE_MEMBER_COLOR);
		assert_eq!(graph.node("f1").unwrap().size, DEFAULT_NODE_SIZE);
		assert_eq!(graph.node("f2").unwrap().color, OTHER_MEMBER_COLOR);
		let edge = graph.edge("f1->f2").unwrap();
		assert_eq!((edge.color.as_str(), edge.size), (DETAIL_EDGE_COLOR, DETAIL_EDGE_SIZE));

		let legend: Vec<_> = colors.entries().collect();
		assert_eq!(
			legend,
			vec![
				("B", OTHER_MEMBER_COLOR),
				("Billing", OTHER_MEMBER_COLOR),
				("Orders", SOURCE_MEMBER_COLOR),
			]
		);
	}

	#[test]
	fn graph_view_keeps_snapshot_colors() {
		let snapshot = Snapshot::from_json(FILES).unwrap();
		let (graph, colors) = graph_view(&snapshot);
		assert_eq!(graph.node("f1").unwrap().color, "#111111");
		assert_eq!(graph.node("f1").unwrap().size, 4.0);
		assert_eq!(colors.get("Billing"), Some("#222222"));
		assert_eq!(colors.get("B"), Some("#333333"));
		assert_eq!(colors.len(), 3);
	}
}
