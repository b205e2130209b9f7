//! Force-directed layout over the coupling graph.
//!
//! Wraps the `force_graph` physics simulation. The layout owns its own copy
//! of the topology; positions flow back into the graph store on every tick
//! while it runs.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use crate::graph::CouplingGraph;
use crate::interaction::options::LayoutSettings;

/// Radius of the ring used when the snapshot carries no usable positions.
const FALLBACK_RADIUS: f64 = 100.0;

/// Per-node payload carried through the simulation.
#[derive(Clone, Debug, Default)]
pub struct LayoutNode {
	/// Graph key of the simulated node.
	pub key: String,
}

/// Force simulation over a session's nodes.
pub struct ForceLayout {
	sim: ForceGraph<LayoutNode, ()>,
	indices: HashMap<String, DefaultNodeIdx>,
	running: bool,
}

fn parameters(settings: &LayoutSettings) -> SimulationParameters {
	if settings.strong_gravity {
		SimulationParameters {
			force_charge: 80.0,
			force_spring: 0.12,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.85,
		}
	} else {
		SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		}
	}
}

/// Stored positions, or a ring when every node sits on the same point.
fn initial_positions(graph: &CouplingGraph) -> Vec<(String, f64, f64)> {
	let positions: Vec<(String, f64, f64)> = graph
		.nodes()
		.map(|(key, attrs)| (key.to_string(), attrs.x, attrs.y))
		.collect();
	let degenerate = positions
		.windows(2)
		.all(|pair| pair[0].1 == pair[1].1 && pair[0].2 == pair[1].2);
	if !degenerate || positions.len() < 2 {
		return positions;
	}
	let n = positions.len() as f64;
	positions
		.into_iter()
		.enumerate()
		.map(|(i, (key, _, _))| {
			let angle = (i as f64) * 2.0 * PI / n;
			(key, FALLBACK_RADIUS * angle.cos(), FALLBACK_RADIUS * angle.sin())
		})
		.collect()
}

impl ForceLayout {
	/// Seed the simulation from the graph. The layout starts stopped.
	pub fn new(graph: &CouplingGraph, settings: &LayoutSettings) -> Self {
		let mut sim = ForceGraph::new(parameters(settings));
		let mut indices = HashMap::new();

		for (key, x, y) in initial_positions(graph) {
			let idx = sim.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: LayoutNode { key: key.clone() },
			});
			indices.insert(key, idx);
		}
		for (_, source, target, _) in graph.edges() {
			if let (Some(&src), Some(&tgt)) = (indices.get(source), indices.get(target)) {
				sim.add_edge(src, tgt, EdgeData::default());
			}
		}

		Self {
			sim,
			indices,
			running: false,
		}
	}

	/// Resume ticking.
	pub fn start(&mut self) {
		debug!("coupling-graph: layout started for {} nodes", self.indices.len());
		self.running = true;
	}

	/// Freeze positions where they are.
	pub fn stop(&mut self) {
		if self.running {
			debug!("coupling-graph: layout stopped");
		}
		self.running = false;
	}

	/// Whether `tick` currently moves nodes.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Advance the simulation by `dt` seconds. Returns whether anything moved.
	pub fn tick(&mut self, dt: f32) -> bool {
		if !self.running {
			return false;
		}
		self.sim.update(dt);
		true
	}

	/// Copy simulated positions into the graph store.
	pub fn write_positions(&self, graph: &mut CouplingGraph) {
		self.sim.visit_nodes(|node| {
			graph.set_position(&node.data.user_data.key, node.x() as f64, node.y() as f64);
		});
	}

	/// Fix a node at a position; the simulation no longer moves it.
	pub fn pin(&mut self, key: &str, x: f64, y: f64) {
		let Some(&idx) = self.indices.get(key) else {
			return;
		};
		self.sim.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = x as f32;
				node.data.y = y as f32;
				node.data.is_anchor = true;
			}
		});
	}

	/// Simulated position of `key`.
	pub fn position(&self, key: &str) -> Option<(f64, f64)> {
		let &idx = self.indices.get(key)?;
		let mut found = None;
		self.sim.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}
}
