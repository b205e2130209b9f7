//! JSON snapshot format served by the snapshot server.
//!
//! A snapshot is a graphology-style export: a `nodes` array of
//! `{ key, attributes }` records and an `edges` array of
//! `{ key?, source, target, attributes }` records, plus an optional
//! `buildDate` for build-specific files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A complete graph snapshot as stored on disk.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Snapshot {
	/// Node records.
	#[serde(default)]
	pub nodes: Vec<NodeRecord>,
	/// Edge records.
	#[serde(default)]
	pub edges: Vec<EdgeRecord>,
	#[serde(
		rename = "buildDate",
		default,
		deserialize_with = "timestamp::deserialize",
		skip_serializing_if = "Option::is_none"
	)]
	/// Point in history a build snapshot was taken at.
	pub build_date: Option<DateTime<Utc>>,
}

impl Snapshot {
	/// Parse a snapshot file.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}
}

/// A node as exported.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct NodeRecord {
	/// Unique node key.
	pub key: String,
	/// Stored attributes.
	#[serde(default)]
	pub attributes: NodeRecordAttributes,
}

/// Node attributes; all optional on disk.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct NodeRecordAttributes {
	/// Graph-space x.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	/// Graph-space y.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
	/// Display radius.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size: Option<f64>,
	/// Display name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// CSS color.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	/// Owning microservice. Accepts numeric ids as well as strings.
	#[serde(
		default,
		deserialize_with = "scalar::deserialize",
		skip_serializing_if = "Option::is_none"
	)]
	pub microservice_id: Option<String>,
	/// Owning microservice name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub microservice_label: Option<String>,
	/// When the node first appeared.
	#[serde(
		rename = "createdAt",
		default,
		deserialize_with = "timestamp::deserialize",
		skip_serializing_if = "Option::is_none"
	)]
	pub created_at: Option<DateTime<Utc>>,
}

/// An edge as exported.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EdgeRecord {
	/// Edge key; see [`EdgeRecord::identity`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
	/// Endpoint node keys.
	pub source: String,
	/// Target node key.
	pub target: String,
	/// Stored attributes.
	#[serde(default)]
	pub attributes: EdgeRecordAttributes,
}

impl EdgeRecord {
	/// Stable identity used to match edges across snapshots.
	///
	/// Falls back to `"<source>-><target>"` when the snapshot carries no key.
	pub fn identity(&self) -> String {
		match &self.key {
			Some(key) => key.clone(),
			None => format!("{}->{}", self.source, self.target),
		}
	}
}

/// Edge attributes; all optional on disk.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct EdgeRecordAttributes {
	/// When the coupling first appeared.
	#[serde(
		rename = "createdAt",
		default,
		deserialize_with = "timestamp::deserialize",
		skip_serializing_if = "Option::is_none"
	)]
	pub created_at: Option<DateTime<Utc>>,
	/// Last change to the coupling.
	#[serde(
		rename = "modifiedAt",
		default,
		deserialize_with = "timestamp::deserialize",
		skip_serializing_if = "Option::is_none"
	)]
	pub modified_at: Option<DateTime<Utc>>,
	/// Files involved.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub files: Option<u64>,
	/// Coupling strength in `[0, 1]`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gravity: Option<f64>,
	/// Files changed by the commit.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub commit_files: Option<u64>,
	/// Gravity before the commit.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub previous_commit_gravity: Option<f64>,
	/// Gravity after the commit.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub commit_gravity: Option<f64>,
	/// CSS color.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	/// Line width.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size: Option<f64>,
}

impl EdgeRecordAttributes {
	/// Replace every metric present in `overlay`; absent ones keep their value.
	/// Creation time always stays with the receiver.
	pub fn overlay(&mut self, overlay: &EdgeRecordAttributes) {
		fn take<T: Clone>(slot: &mut Option<T>, from: &Option<T>) {
			if let Some(value) = from {
				*slot = Some(value.clone());
			}
		}
		take(&mut self.modified_at, &overlay.modified_at);
		take(&mut self.files, &overlay.files);
		take(&mut self.gravity, &overlay.gravity);
		take(&mut self.commit_files, &overlay.commit_files);
		take(&mut self.previous_commit_gravity, &overlay.previous_commit_gravity);
		take(&mut self.commit_gravity, &overlay.commit_gravity);
		take(&mut self.color, &overlay.color);
		take(&mut self.size, &overlay.size);
	}
}

/// Timestamps arrive either as RFC 3339 strings or epoch milliseconds.
mod timestamp {
	use super::*;

	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Millis(i64),
		Text(String),
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw: Option<Raw> = Option::deserialize(deserializer)?;
		match raw {
			None => Ok(None),
			Some(Raw::Millis(ms)) => DateTime::from_timestamp_millis(ms)
				.map(Some)
				.ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {ms}"))),
			Some(Raw::Text(text)) => DateTime::parse_from_rfc3339(&text)
				.map(|dt| Some(dt.with_timezone(&Utc)))
				.map_err(serde::de::Error::custom),
		}
	}
}

mod scalar {
	use super::*;

	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Text(String),
		Int(i64),
		Float(f64),
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw: Option<Raw> = Option::deserialize(deserializer)?;
		Ok(raw.map(|raw| match raw {
			Raw::Text(text) => text,
			Raw::Int(n) => n.to_string(),
			Raw::Float(f) => f.to_string(),
		}))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = r#"{
		"nodes": [
			{ "key": "a", "attributes": { "x": 1.5, "y": 2, "label": "Orders", "microservice_id": 7, "createdAt": "2024-01-02T00:00:00Z" } },
			{ "key": "b", "attributes": { "label": "Billing", "createdAt": 1704153600000 } }
		],
		"edges": [
			{ "key": "e1", "source": "a", "target": "b", "attributes": { "files": 12, "gravity": 0.4 } },
			{ "source": "b", "target": "a" }
		],
		"buildDate": "2024-02-01T12:00:00+01:00"
	}"#;

	#[test]
	fn parses_graphology_export() {
		let snapshot = Snapshot::from_json(SAMPLE).unwrap();
		assert_eq!(snapshot.nodes.len(), 2);
		assert_eq!(snapshot.edges.len(), 2);

		let a = &snapshot.nodes[0].attributes;
		assert_eq!(a.microservice_id.as_deref(), Some("7"));
		assert_eq!(a.x, Some(1.5));
		assert!(a.created_at.is_some());

		let b = &snapshot.nodes[1].attributes;
		assert_eq!(b.created_at, DateTime::from_timestamp_millis(1_704_153_600_000));

		assert_eq!(snapshot.edges[0].attributes.gravity, Some(0.4));
		assert_eq!(snapshot.edges[1].attributes, EdgeRecordAttributes::default());
		assert_eq!(
			snapshot.build_date.unwrap().to_rfc3339(),
			"2024-02-01T11:00:00+00:00"
		);
	}

	#[test]
	fn edge_identity_falls_back_to_endpoints() {
		let snapshot = Snapshot::from_json(SAMPLE).unwrap();
		assert_eq!(snapshot.edges[0].identity(), "e1");
		assert_eq!(snapshot.edges[1].identity(), "b->a");
	}

	#[test]
	fn malformed_json_is_an_error() {
		assert!(Snapshot::from_json("{\"nodes\": [").is_err());
		assert!(Snapshot::from_json("{\"nodes\": [{\"attributes\": {}}]}").is_err());
	}

	#[test]
	fn overlay_keeps_absent_metrics() {
		let mut base = EdgeRecordAttributes {
			files: Some(10),
			gravity: Some(0.3),
			created_at: DateTime::from_timestamp_millis(0),
			..Default::default()
		};
		base.overlay(&EdgeRecordAttributes {
			gravity: Some(0.9),
			commit_gravity: Some(0.5),
			created_at: DateTime::from_timestamp_millis(1000),
			..Default::default()
		});
		assert_eq!(base.files, Some(10));
		assert_eq!(base.gravity, Some(0.9));
		assert_eq!(base.commit_gravity, Some(0.5));
		assert_eq!(base.created_at, DateTime::from_timestamp_millis(0));
	}
}
