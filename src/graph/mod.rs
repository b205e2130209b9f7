//! Keyed coupling graph store.
//!
//! Nodes and edges are addressed by their snapshot keys; the topology lives
//! in an undirected `petgraph` stable graph so neighbor and incidence queries
//! stay cheap while the renderer reads attributes every frame.

pub mod compose;
pub mod filter;
pub mod snapshot;
pub mod style;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use log::warn;
use petgraph::Undirected;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use snapshot::Snapshot;

/// Node radius when none is stored.
pub const DEFAULT_NODE_SIZE: f64 = 20.0;
/// Node color when none is stored.
pub const DEFAULT_NODE_COLOR: &str = "#3498db";
/// Edge width when none is stored.
pub const DEFAULT_EDGE_SIZE: f64 = 1.0;
/// Edge color when none is stored.
pub const DEFAULT_EDGE_COLOR: &str = "#cccccc";

/// Stored attributes of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeAttributes {
	/// Graph-space x, owned by the layout once it runs.
	pub x: f64,
	/// Graph-space y.
	pub y: f64,
	/// Display radius in screen pixels.
	pub size: f64,
	/// Name shown next to the node and matched by search.
	pub label: String,
	/// Base CSS color.
	pub color: String,
	/// Owning microservice id.
	pub membership: Option<String>,
	/// Owning microservice name.
	pub membership_label: Option<String>,
	/// When the node first appeared.
	pub created_at: Option<DateTime<Utc>>,
	/// Hidden by the range filter.
	pub hidden: bool,
	/// Set while the node is being dragged.
	pub highlighted: bool,
}

impl Default for NodeAttributes {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			size: DEFAULT_NODE_SIZE,
			label: String::new(),
			color: DEFAULT_NODE_COLOR.to_string(),
			membership: None,
			membership_label: None,
			created_at: None,
			hidden: false,
			highlighted: false,
		}
	}
}

/// Stored attributes of an edge. Absent metrics mean "unknown", never zero.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeAttributes {
	/// Coupling strength in `[0, 1]`; `None` is unknown, not zero.
	pub gravity: Option<f64>,
	/// Number of files involved in the coupling.
	pub files: Option<u64>,
	/// Files changed by the commit; present in build snapshots.
	pub commit_files: Option<u64>,
	/// Gravity before the commit.
	pub previous_commit_gravity: Option<f64>,
	/// Gravity after the commit.
	pub commit_gravity: Option<f64>,
	/// When the coupling first appeared.
	pub created_at: Option<DateTime<Utc>>,
	/// Last change to the coupling.
	pub modified_at: Option<DateTime<Utc>>,
	/// Text shown on hover.
	pub label: String,
	/// Base CSS color.
	pub color: String,
	/// Line width in screen pixels.
	pub size: f64,
	/// Hidden by the range filter.
	pub hidden: bool,
}

impl Default for EdgeAttributes {
	fn default() -> Self {
		Self {
			gravity: None,
			files: None,
			commit_files: None,
			previous_commit_gravity: None,
			commit_gravity: None,
			created_at: None,
			modified_at: None,
			label: String::new(),
			color: DEFAULT_EDGE_COLOR.to_string(),
			size: DEFAULT_EDGE_SIZE,
			hidden: false,
		}
	}
}

#[derive(Clone, Debug)]
struct NodeEntry {
	key: String,
	attrs: NodeAttributes,
}

#[derive(Clone, Debug)]
struct EdgeEntry {
	key: String,
	attrs: EdgeAttributes,
}

/// The graph store read by the reducers and written by the handlers.
#[derive(Clone, Debug, Default)]
pub struct CouplingGraph {
	graph: StableGraph<NodeEntry, EdgeEntry, Undirected>,
	nodes: HashMap<String, NodeIndex>,
	edges: HashMap<String, EdgeIndex>,
}

impl CouplingGraph {
	/// An empty graph.
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a graph from a snapshot, filling in display defaults.
	pub fn from_snapshot(snapshot: &Snapshot) -> Self {
		let mut graph = Self::new();
		for node in &snapshot.nodes {
			let a = &node.attributes;
			graph.add_node(
				&node.key,
				NodeAttributes {
					x: a.x.unwrap_or(0.0),
					y: a.y.unwrap_or(0.0),
					size: a.size.unwrap_or(DEFAULT_NODE_SIZE),
					label: a.label.clone().unwrap_or_else(|| node.key.clone()),
					color: a.color.clone().unwrap_or_else(|| DEFAULT_NODE_COLOR.to_string()),
					membership: a.microservice_id.clone(),
					membership_label: a.microservice_label.clone(),
					created_at: a.created_at,
					hidden: false,
					highlighted: false,
				},
			);
		}
		for edge in &snapshot.edges {
			let a = &edge.attributes;
			let inserted = graph.add_edge(
				&edge.identity(),
				&edge.source,
				&edge.target,
				EdgeAttributes {
					gravity: a.gravity,
					files: a.files,
					commit_files: a.commit_files,
					previous_commit_gravity: a.previous_commit_gravity,
					commit_gravity: a.commit_gravity,
					created_at: a.created_at,
					modified_at: a.modified_at,
					label: String::new(),
					color: a.color.clone().unwrap_or_else(|| DEFAULT_EDGE_COLOR.to_string()),
					size: a.size.unwrap_or(DEFAULT_EDGE_SIZE),
					hidden: false,
				},
			);
			if !inserted {
				warn!(
					"coupling-graph: skipping edge {} ({} -> {}): unknown endpoint",
					edge.identity(),
					edge.source,
					edge.target
				);
			}
		}
		graph
	}

	/// Insert a node, replacing the attributes of an existing key.
	pub fn add_node(&mut self, key: &str, attrs: NodeAttributes) {
		if let Some(&idx) = self.nodes.get(key) {
			self.graph[idx].attrs = attrs;
			return;
		}
		let idx = self.graph.add_node(NodeEntry {
			key: key.to_string(),
			attrs,
		});
		self.nodes.insert(key.to_string(), idx);
	}

	/// Insert an edge between two existing nodes. Returns `false` when an
	/// endpoint is unknown. A repeated key replaces the stored attributes.
	pub fn add_edge(&mut self, key: &str, source: &str, target: &str, attrs: EdgeAttributes) -> bool {
		let (Some(&src), Some(&tgt)) = (self.nodes.get(source), self.nodes.get(target)) else {
			return false;
		};
		if let Some(&idx) = self.edges.get(key) {
			self.graph[idx].attrs = attrs;
			return true;
		}
		let idx = self.graph.add_edge(
			src,
			tgt,
			EdgeEntry {
				key: key.to_string(),
				attrs,
			},
		);
		self.edges.insert(key.to_string(), idx);
		true
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of edges.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// Whether `key` names a node.
	pub fn has_node(&self, key: &str) -> bool {
		self.nodes.contains_key(key)
	}

	/// Attributes of node `key`.
	pub fn node(&self, key: &str) -> Option<&NodeAttributes> {
		self.nodes.get(key).map(|&idx| &self.graph[idx].attrs)
	}

	/// Mutable attributes of node `key`.
	pub fn node_mut(&mut self, key: &str) -> Option<&mut NodeAttributes> {
		let idx = *self.nodes.get(key)?;
		Some(&mut self.graph[idx].attrs)
	}

	/// Attributes of edge `key`.
	pub fn edge(&self, key: &str) -> Option<&EdgeAttributes> {
		self.edges.get(key).map(|&idx| &self.graph[idx].attrs)
	}

	/// Mutable attributes of edge `key`.
	pub fn edge_mut(&mut self, key: &str) -> Option<&mut EdgeAttributes> {
		let idx = *self.edges.get(key)?;
		Some(&mut self.graph[idx].attrs)
	}

	/// Source and target keys of an edge.
	pub fn extremities(&self, key: &str) -> Option<(&str, &str)> {
		let idx = *self.edges.get(key)?;
		let (src, tgt) = self.graph.edge_endpoints(idx)?;
		Some((self.graph[src].key.as_str(), self.graph[tgt].key.as_str()))
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeAttributes)> {
		self.graph
			.node_indices()
			.map(|idx| (self.graph[idx].key.as_str(), &self.graph[idx].attrs))
	}

	/// Edges in insertion order as `(key, source, target, attributes)`.
	pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &str, &EdgeAttributes)> {
		self.graph.edge_references().map(|edge| {
			(
				edge.weight().key.as_str(),
				self.graph[edge.source()].key.as_str(),
				self.graph[edge.target()].key.as_str(),
				&edge.weight().attrs,
			)
		})
	}

	/// All node keys.
	pub fn node_keys(&self) -> Vec<String> {
		self.nodes().map(|(key, _)| key.to_string()).collect()
	}

	/// All edge keys.
	pub fn edge_keys(&self) -> Vec<String> {
		self.edges().map(|(key, ..)| key.to_string()).collect()
	}

	/// Keys of the edges touching `node`.
	pub fn incident_edges(&self, node: &str) -> Vec<&str> {
		let Some(&idx) = self.nodes.get(node) else {
			return Vec::new();
		};
		self.graph
			.edges(idx)
			.map(|edge| edge.weight().key.as_str())
			.collect()
	}

	/// Direct neighbors of `node`, excluding itself unless it has a self-loop.
	pub fn neighbors(&self, node: &str) -> HashSet<String> {
		let Some(&idx) = self.nodes.get(node) else {
			return HashSet::new();
		};
		self.graph
			.neighbors(idx)
			.map(|n| self.graph[n].key.clone())
			.collect()
	}

	/// Whether an edge joins `a` and `b`, in either direction.
	pub fn are_neighbors(&self, a: &str, b: &str) -> bool {
		match (self.nodes.get(a), self.nodes.get(b)) {
			(Some(&ia), Some(&ib)) => self.graph.find_edge(ia, ib).is_some(),
			_ => false,
		}
	}

	/// Move node `key`. Unknown keys are ignored.
	pub fn set_position(&mut self, key: &str, x: f64, y: f64) {
		if let Some(node) = self.node_mut(key) {
			node.x = x;
			node.y = y;
		}
	}
}
