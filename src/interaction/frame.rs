//! A reduced, draw-ready view of the graph and hit-testing against it.

use std::collections::HashMap;

use super::reducers::{EdgeDisplay, NodeDisplay, ReducerContext, reduce_edge, reduce_node};
use super::renderer::Hit;

/// Minimum pointer tolerance around an edge, in pixels.
const EDGE_HIT_TOLERANCE: f64 = 4.0;

/// A visible node and how to draw it.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameNode {
	/// Node key.
	pub key: String,
	/// Reduced appearance.
	pub display: NodeDisplay,
}

/// A visible edge with its endpoint positions.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameEdge {
	/// Edge key.
	pub key: String,
	/// Source position in graph space.
	pub source: (f64, f64),
	/// Target position in graph space.
	pub target: (f64, f64),
	/// Reduced appearance.
	pub display: EdgeDisplay,
}

/// Visible nodes and edges after reduction, in paint order (lowest z first).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
	/// Paint order: lowest z-index first.
	pub nodes: Vec<FrameNode>,
	/// Visible edges, lowest z-index first.
	pub edges: Vec<FrameEdge>,
}

impl Frame {
	/// Run every reducer over the graph. Hidden items are dropped, as are
	/// edges with a hidden endpoint.
	pub fn build(ctx: &ReducerContext<'_>) -> Self {
		let mut nodes: Vec<FrameNode> = ctx
			.graph
			.nodes()
			.map(|(key, attrs)| FrameNode {
				key: key.to_string(),
				display: reduce_node(ctx, key, attrs),
			})
			.filter(|n| !n.display.hidden)
			.collect();

		let positions: HashMap<&str, (f64, f64)> = nodes
			.iter()
			.map(|n| (n.key.as_str(), (n.display.x, n.display.y)))
			.collect();
		let position = |key: &str| positions.get(key).copied();
		let mut edges: Vec<FrameEdge> = ctx
			.graph
			.edges()
			.filter_map(|(key, source, target, attrs)| {
				let display = reduce_edge(ctx, key, attrs);
				if display.hidden {
					return None;
				}
				Some(FrameEdge {
					key: key.to_string(),
					source: position(source)?,
					target: position(target)?,
					display,
				})
			})
			.collect();

		nodes.sort_by_key(|n| n.display.z_index);
		edges.sort_by_key(|e| e.display.z_index);
		Self { nodes, edges }
	}

	/// Topmost node under `point`. `pixel` is the graph-space length of one
	/// screen pixel; node sizes are radii in pixels.
	pub fn node_at(&self, point: (f64, f64), pixel: f64) -> Option<&str> {
		self.nodes
			.iter()
			.rev()
			.find(|n| {
				let (dx, dy) = (n.display.x - point.0, n.display.y - point.1);
				(dx * dx + dy * dy).sqrt() <= n.display.size * pixel
			})
			.map(|n| n.key.as_str())
	}

	/// Topmost edge under `point`.
	pub fn edge_at(&self, point: (f64, f64), pixel: f64) -> Option<&str> {
		self.edges
			.iter()
			.rev()
			.find(|e| {
				let tolerance = (e.display.size / 2.0).max(EDGE_HIT_TOLERANCE) * pixel;
				segment_distance(point, e.source, e.target) <= tolerance
			})
			.map(|e| e.key.as_str())
	}

	/// Nodes are above edges.
	pub fn hit(&self, point: (f64, f64), pixel: f64) -> Hit {
		if let Some(node) = self.node_at(point, pixel) {
			return Hit::Node(node.to_string());
		}
		match self.edge_at(point, pixel) {
			Some(edge) => Hit::Edge(edge.to_string()),
			None => Hit::Stage,
		}
	}

	/// `(min_x, min_y, max_x, max_y)` over visible nodes.
	pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
		let mut iter = self.nodes.iter().map(|n| (n.display.x, n.display.y));
		let (x, y) = iter.next()?;
		Some(iter.fold((x, y, x, y), |(x0, y0, x1, y1), (x, y)| {
			(x0.min(x), y0.min(y), x1.max(x), y1.max(y))
		}))
	}
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len_sq = dx * dx + dy * dy;
	let t = if len_sq == 0.0 {
		0.0
	} else {
		(((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
	((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}
