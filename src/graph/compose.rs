//! Composition of baseline and build snapshots.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use log::debug;

use super::snapshot::{EdgeRecord, Snapshot};
use crate::error::LoadError;

/// How a build snapshot becomes the displayed graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Composition {
	/// Show the build snapshot as-is.
	Direct,
	/// Overlay the build's edge metrics onto the baseline as of the build date.
	CommitMerge,
}

impl Composition {
	/// Mode selected by the `commitView` query flag.
	pub fn from_commit_view(commit_view: bool) -> Self {
		if commit_view {
			Composition::CommitMerge
		} else {
			Composition::Direct
		}
	}
}

/// Snapshot to show for a build, given the baseline when merging.
pub fn compose(
	baseline: &Snapshot,
	build: Snapshot,
	mode: Composition,
) -> Result<Snapshot, LoadError> {
	match mode {
		Composition::Direct => Ok(build),
		Composition::CommitMerge => commit_merge(baseline, &build),
	}
}

fn existed_at(created_at: Option<DateTime<Utc>>, build_date: DateTime<Utc>) -> bool {
	created_at.is_none_or(|t| t <= build_date)
}

/// Baseline topology as of the build date, with the build's edge metrics
/// laid over matching edges.
///
/// Nodes and edges created after `buildDate` are dropped, as are edges that
/// lost an endpoint. Edges only present in the build are ignored.
pub fn commit_merge(baseline: &Snapshot, build: &Snapshot) -> Result<Snapshot, LoadError> {
	let build_date = build.build_date.ok_or(LoadError::MissingBuildDate)?;

	let nodes: Vec<_> = baseline
		.nodes
		.iter()
		.filter(|node| existed_at(node.attributes.created_at, build_date))
		.cloned()
		.collect();
	let kept: HashSet<&str> = nodes.iter().map(|node| node.key.as_str()).collect();

	let overlay: HashMap<String, &EdgeRecord> = build
		.edges
		.iter()
		.map(|edge| (edge.identity(), edge))
		.collect();

	let mut matched = 0usize;
	let edges: Vec<_> = baseline
		.edges
		.iter()
		.filter(|edge| existed_at(edge.attributes.created_at, build_date))
		.filter(|edge| kept.contains(edge.source.as_str()) && kept.contains(edge.target.as_str()))
		.map(|edge| {
			let mut merged = edge.clone();
			if let Some(update) = overlay.get(&edge.identity()) {
				merged.attributes.overlay(&update.attributes);
				matched += 1;
			}
			merged
		})
		.collect();

	debug!(
		"coupling-graph: commit merge kept {}/{} nodes, {}/{} edges, {} overlaid",
		nodes.len(),
		baseline.nodes.len(),
		edges.len(),
		baseline.edges.len(),
		matched
	);

	Ok(Snapshot {
		nodes,
		edges,
		build_date: Some(build_date),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn baseline() -> Snapshot {
		Snapshot::from_json(
			r#"{
			"nodes": [
				{ "key": "a", "attributes": { "createdAt": "2024-01-01T00:00:00Z" } },
				{ "key": "b", "attributes": { "createdAt": "2024-01-05T00:00:00Z" } },
				{ "key": "c", "attributes": { "createdAt": "2024-03-01T00:00:00Z" } },
				{ "key": "d" }
			],
			"edges": [
				{ "key": "ab", "source": "a", "target": "b", "attributes": { "createdAt": "2024-01-06T00:00:00Z", "files": 4, "gravity": 0.1 } },
				{ "key": "bc", "source": "b", "target": "c", "attributes": { "createdAt": "2024-01-06T00:00:00Z", "gravity": 0.2 } },
				{ "key": "ad", "source": "a", "target": "d", "attributes": { "createdAt": "2024-02-15T00:00:00Z", "gravity": 0.3 } },
				{ "key": "bd", "source": "b", "target": "d", "attributes": { "gravity": 0.4 } }
			]
		}"#,
		)
		.unwrap()
	}

	fn build(edges: &str) -> Snapshot {
		Snapshot::from_json(&format!(
			r#"{{ "buildDate": "2024-02-01T00:00:00Z", "nodes": [], "edges": {edges} }}"#
		))
		.unwrap()
	}

	fn keys(snapshot: &Snapshot) -> (Vec<&str>, Vec<String>) {
		(
			snapshot.nodes.iter().map(|n| n.key.as_str()).collect(),
			snapshot.edges.iter().map(|e| e.identity()).collect(),
		)
	}

	#[test]
	fn empty_overlay_reproduces_filtered_baseline() {
		let base = baseline();
		let merged = commit_merge(&base, &build("[]")).unwrap();
		let (nodes, edges) = keys(&merged);
		assert_eq!(nodes, vec!["a", "b", "d"]);
		assert_eq!(edges, vec!["ab", "bd"]);
		for edge in &merged.edges {
			let original = base.edges.iter().find(|e| e.identity() == edge.identity()).unwrap();
			assert_eq!(edge, original);
		}
	}

	#[test]
	fn never_introduces_entities_newer_than_build() {
		let merged = commit_merge(&baseline(), &build("[]")).unwrap();
		let build_date = merged.build_date.unwrap();
		assert!(merged.nodes.iter().all(|n| n.attributes.created_at.is_none_or(|t| t <= build_date)));
		assert!(merged.edges.iter().all(|e| e.attributes.created_at.is_none_or(|t| t <= build_date)));
	}

	#[test]
	fn overlays_matched_edges_and_ignores_build_only_edges() {
		let merged = commit_merge(
			&baseline(),
			&build(
				r#"[
				{ "key": "ab", "source": "a", "target": "b", "attributes": { "gravity": 0.9, "commit_files": 2 } },
				{ "key": "zz", "source": "a", "target": "z", "attributes": { "gravity": 0.5 } }
			]"#,
			),
		)
		.unwrap();
		let ab = merged.edges.iter().find(|e| e.identity() == "ab").unwrap();
		assert_eq!(ab.attributes.gravity, Some(0.9));
		assert_eq!(ab.attributes.commit_files, Some(2));
		assert_eq!(ab.attributes.files, Some(4));
		assert!(merged.edges.iter().all(|e| e.identity() != "zz"));
		let bd = merged.edges.iter().find(|e| e.identity() == "bd").unwrap();
		assert_eq!(bd.attributes.gravity, Some(0.4));
	}

	#[test]
	fn build_without_date_cannot_merge() {
		let undated = Snapshot::default();
		assert!(matches!(
			commit_merge(&baseline(), &undated),
			Err(LoadError::MissingBuildDate)
		));
	}

	#[test]
	fn direct_mode_passes_build_through() {
		let b = build(r#"[{ "source": "x", "target": "y" }]"#);
		let shown = compose(&baseline(), b.clone(), Composition::Direct).unwrap();
		assert_eq!(shown, b);
	}
}
