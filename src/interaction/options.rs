//! Declarative feature set for a page session.

use std::time::Duration;

use crate::graph::CouplingGraph;

/// Computes an edge's display size from its key and the graph.
pub type EdgeSizeFn = fn(&str, &CouplingGraph) -> f64;

/// Builds tooltip HTML for a hovered edge. `None` keeps the tooltip hidden.
pub type TooltipContentFn = fn(&str, &CouplingGraph) -> Option<String>;

/// How long the force layout runs before positions are frozen.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutSettings {
	/// Layout running time after a load.
	pub run_for: Duration,
	/// Pull nodes harder towards each other (small, dense subgraphs).
	pub strong_gravity: bool,
}

impl Default for LayoutSettings {
	fn default() -> Self {
		Self {
			run_for: Duration::from_millis(5000),
			strong_gravity: false,
		}
	}
}

/// Which interactions and visual encodings a page enables.
#[derive(Clone, Debug)]
pub struct PageOptions {
	/// Nodes can be dragged.
	pub draggable: bool,
	/// Hovering a node highlights it and its neighbors.
	pub hover_nodes: bool,
	/// Hovering an edge highlights it and its endpoints.
	pub hover_edges: bool,
	/// Search input drives highlighting.
	pub searchable: bool,
	/// Edges take their color from gravity.
	pub color_by_gravity: bool,
	/// Show a tooltip over hovered edges.
	pub tooltip: bool,
	/// Gravity sliders filter edges.
	pub range_filter: bool,
	/// Open the edge-detail page when an edge is clicked.
	pub edge_click: bool,
	/// Overrides the stored edge size.
	pub edge_size: Option<EdgeSizeFn>,
	/// Tooltip HTML for a hovered edge.
	pub tooltip_content: Option<TooltipContentFn>,
	/// Force layout settings.
	pub layout: LayoutSettings,
}

impl Default for PageOptions {
	fn default() -> Self {
		Self {
			draggable: true,
			hover_nodes: true,
			hover_edges: true,
			searchable: true,
			color_by_gravity: true,
			tooltip: true,
			range_filter: true,
			edge_click: false,
			edge_size: None,
			tooltip_content: Some(coupling_tooltip),
			layout: LayoutSettings::default(),
		}
	}
}

impl PageOptions {
	/// Whole-system coupling view.
	pub fn graph_view() -> Self {
		Self {
			edge_click: true,
			edge_size: Some(size_by_files),
			tooltip_content: Some(coupling_tooltip_with_files),
			..Self::default()
		}
	}

	/// File-level view of the coupling between two microservices.
	pub fn edge_detail() -> Self {
		Self {
			layout: LayoutSettings {
				run_for: Duration::from_millis(2500),
				strong_gravity: true,
			},
			..Self::default()
		}
	}
}

/// Edge width proportional to changed files, clamped to `[3, 19]`.
pub fn size_by_files(edge: &str, graph: &CouplingGraph) -> f64 {
	let files = graph.edge(edge).and_then(|e| e.files).unwrap_or(0);
	(files as f64 / 10.0).clamp(3.0, 19.0)
}

fn escape_html(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'&' => out.push_str("&amp;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(c),
		}
	}
	out
}

fn or_na<T: ToString>(value: Option<T>) -> String {
	value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn tooltip_lines(edge: &str, graph: &CouplingGraph, with_files: bool) -> Option<String> {
	let (source, target) = graph.extremities(edge)?;
	let attrs = graph.edge(edge)?;
	let label = |key: &str| {
		escape_html(graph.node(key).map_or(key, |node| node.label.as_str()))
	};
	let mut html = format!(
		"<strong>Edge ID:</strong> {}<br /><strong>Source:</strong> {}<br /><strong>Target:</strong> {}<br /><strong>Coupling:</strong> {}<br />",
		escape_html(edge),
		label(source),
		label(target),
		or_na(attrs.gravity),
	);
	if with_files {
		html.push_str(&format!("<strong>Files:</strong> {}<br />", or_na(attrs.files)));
	}
	Some(html)
}

/// Edge id, endpoint labels and coupling.
pub fn coupling_tooltip(edge: &str, graph: &CouplingGraph) -> Option<String> {
	tooltip_lines(edge, graph, false)
}

/// [`coupling_tooltip`] plus the changed-file count.
pub fn coupling_tooltip_with_files(edge: &str, graph: &CouplingGraph) -> Option<String> {
	tooltip_lines(edge, graph, true)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::tests::graph_of;

	#[test]
	fn edge_size_is_clamped() {
		let mut graph = graph_of(&[("a", "A"), ("b", "B")], &[("ab", "a", "b", None)]);
		assert_eq!(size_by_files("ab", &graph), 3.0);
		graph.edge_mut("ab").unwrap().files = Some(120);
		assert_eq!(size_by_files("ab", &graph), 12.0);
		graph.edge_mut("ab").unwrap().files = Some(5000);
		assert_eq!(size_by_files("ab", &graph), 19.0);
	}

	#[test]
	fn tooltip_falls_back_to_na() {
		let graph = graph_of(&[("a", "<A>"), ("b", "B")], &[("ab", "a", "b", None)]);
		let html = coupling_tooltip_with_files("ab", &graph).unwrap();
		assert!(html.contains("<strong>Source:</strong> &lt;A&gt;"));
		assert!(html.contains("<strong>Coupling:</strong> N/A"));
		assert!(html.contains("<strong>Files:</strong> N/A"));
		assert!(coupling_tooltip("missing", &graph).is_none());
	}

	#[test]
	fn zero_gravity_is_shown_not_na() {
		let graph = graph_of(&[("a", "A"), ("b", "B")], &[("ab", "a", "b", Some(0.0))]);
		let html = coupling_tooltip("ab", &graph).unwrap();
		assert!(html.contains("<strong>Coupling:</strong> 0<br />"));
		assert!(!html.contains("Files"));
	}
}
