//! Snapshot fetching from the snapshot server.

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, info};
use reqwest::Client;

use crate::error::LoadError;
use crate::graph::compose::{Composition, compose};
use crate::graph::snapshot::Snapshot;
use crate::params::GraphViewParams;

/// Whole-system snapshot every build is compared against.
pub const BASELINE_SNAPSHOT: &str = "ms_data";
/// File-level snapshot used by the edge-detail page.
pub const FILES_SNAPSHOT: &str = "ms_files";

/// HTTP client for `GET /data/{name}` and `GET /builds`.
#[derive(Clone, Debug)]
pub struct SnapshotClient {
	base: String,
	http: Client,
}

impl SnapshotClient {
	/// `base` is the server origin, e.g. `http://localhost:3001`.
	pub fn new(base: impl Into<String>) -> Self {
		Self {
			base: base.into().trim_end_matches('/').to_string(),
			http: Client::new(),
		}
	}

	/// URL of snapshot `name`.
	pub fn snapshot_url(&self, name: &str) -> String {
		format!("{}/data/{}", self.base, urlencoding::encode(name))
	}

	/// URL of the build listing.
	pub fn builds_url(&self) -> String {
		format!("{}/builds", self.base)
	}

	async fn get_text(&self, url: &str) -> Result<String, LoadError> {
		let request_failed = |source: reqwest::Error| LoadError::Request {
			url: url.to_string(),
			source,
		};
		let resp = self.http.get(url).send().await.map_err(request_failed)?;
		if !resp.status().is_success() {
			return Err(LoadError::Status {
				url: url.to_string(),
				status: resp.status().as_u16(),
			});
		}
		resp.text().await.map_err(request_failed)
	}

	pub async fn fetch_snapshot(&self, name: &str) -> Result<Snapshot, LoadError> {
		let url = self.snapshot_url(name);
		let text = self.get_text(&url).await?;
		let snapshot = Snapshot::from_json(&text).map_err(|source| LoadError::Parse {
			url: url.clone(),
			source,
		})?;
		debug!(
			"coupling-graph: fetched {} ({} nodes, {} edges)",
			name,
			snapshot.nodes.len(),
			snapshot.edges.len()
		);
		Ok(snapshot)
	}

	/// Build ids available on the server, without the `.json` suffix.
	pub async fn list_builds(&self) -> Result<Vec<String>, LoadError> {
		let url = self.builds_url();
		let text = self.get_text(&url).await?;
		let files: Vec<String> =
			serde_json::from_str(&text).map_err(|source| LoadError::Parse { url, source })?;
		Ok(build_ids(files))
	}

	/// The snapshot the graph page shows for `params`: the baseline, the
	/// build as-is, or the build merged onto the baseline.
	pub async fn load_graph_view(&self, params: &GraphViewParams) -> Result<Snapshot, LoadError> {
		let Some(build_id) = params.build_id.as_deref() else {
			return self.fetch_snapshot(BASELINE_SNAPSHOT).await;
		};
		let mode = Composition::from_commit_view(params.commit_view);
		info!("coupling-graph: loading build {build_id} ({mode:?})");
		match mode {
			Composition::Direct => self.fetch_snapshot(build_id).await,
			Composition::CommitMerge => {
				let baseline = self.fetch_snapshot(BASELINE_SNAPSHOT).await?;
				let build = self.fetch_snapshot(build_id).await?;
				compose(&baseline, build, mode)
			}
		}
	}
}

/// Strip `.json` from a `/builds` listing, dropping the baseline snapshots.
pub fn build_ids(files: Vec<String>) -> Vec<String> {
	let mut ids: Vec<String> = files
		.into_iter()
		.filter_map(|file| file.strip_suffix(".json").map(str::to_string))
		.filter(|id| id != BASELINE_SNAPSHOT && id != FILES_SNAPSHOT)
		.collect();
	ids.sort();
	ids
}

/// Monotonic load counter. Each navigation takes a new ticket; results
/// arriving for an older ticket are discarded.
#[derive(Clone, Debug, Default)]
pub struct LoadGeneration(Rc<Cell<u64>>);

/// Identifies one load started by [`LoadGeneration::next`].
#[derive(Clone, Debug)]
pub struct LoadTicket {
	generation: u64,
	counter: LoadGeneration,
}

impl LoadGeneration {
	/// Start a load, outdating every earlier ticket.
	pub fn next(&self) -> LoadTicket {
		let generation = self.0.get() + 1;
		self.0.set(generation);
		LoadTicket {
			generation,
			counter: self.clone(),
		}
	}
}

impl LoadTicket {
	/// No newer load has started since this ticket was taken.
	pub fn is_current(&self) -> bool {
		self.counter.0.get() == self.generation
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn urls_are_rooted_at_base() {
		let client = SnapshotClient::new("http://localhost:3001/");
		assert_eq!(client.snapshot_url("ms_data"), "http://localhost:3001/data/ms_data");
		assert_eq!(
			client.snapshot_url("build 7"),
			"http://localhost:3001/data/build%207"
		);
		assert_eq!(client.builds_url(), "http://localhost:3001/builds");
	}

	#[test]
	fn build_listing_is_sorted_and_excludes_baselines() {
		let files = vec![
			"b2.json".to_string(),
			"ms_data.json".to_string(),
			"notes.txt".to_string(),
			"ms_files.json".to_string(),
			"b10.json".to_string(),
		];
		assert_eq!(build_ids(files), vec!["b10", "b2"]);
	}

	#[test]
	fn stale_tickets_are_rejected() {
		let generation = LoadGeneration::default();
		let first = generation.next();
		assert!(first.is_current());
		let second = generation.next();
		assert!(!first.is_current());
		assert!(second.is_current());
	}
}
