//! Navigation query parameters for the graph and edge-detail pages.

use crate::error::ParamError;

/// Path of the edge-detail page.
pub const EDGE_DETAIL_PAGE: &str = "analyze.html";

/// Parameters of the main graph page.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphViewParams {
	/// Snapshot to show instead of the baseline.
	pub build_id: Option<String>,
	/// Merge the build onto the baseline rather than showing it directly.
	pub commit_view: bool,
}

impl Default for GraphViewParams {
	fn default() -> Self {
		Self {
			build_id: None,
			commit_view: true,
		}
	}
}

impl GraphViewParams {
	/// Read from a query lookup. Only `commitView=false` disables commit view.
	pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
		Self {
			build_id: get("buildId").filter(|id| !id.is_empty()),
			commit_view: get("commitView").as_deref() != Some("false"),
		}
	}

	/// Query string, with leading `?`, that parses back to `self`.
	pub fn to_query(&self) -> String {
		match &self.build_id {
			Some(id) => format!(
				"?buildId={}&commitView={}",
				urlencoding::encode(id),
				self.commit_view
			),
			None => String::new(),
		}
	}
}

/// Parameters of the edge-detail page: the coupling between two microservices.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeDetailParams {
	/// Source membership id.
	pub source: String,
	/// Target membership id.
	pub target: String,
	/// Files involved, as shown in the heading.
	pub files: f64,
	/// Coupling strength in `[0, 1]`.
	pub gravity: f64,
}

impl EdgeDetailParams {
	/// Validate every parameter. `files` must be positive and `gravity`
	/// within `[0, 1]`.
	pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ParamError> {
		let required = |name: &'static str| {
			get(name)
				.filter(|value| !value.is_empty())
				.ok_or(ParamError::Missing(name))
		};
		let number = |name: &'static str| -> Result<f64, ParamError> {
			let raw = required(name)?;
			let parsed = raw.trim().parse::<f64>().ok().filter(|n| n.is_finite());
			parsed.ok_or(ParamError::NotANumber { name, value: raw })
		};

		let source = required("source")?;
		let target = required("target")?;
		let files = number("files")?;
		if files <= 0.0 {
			return Err(ParamError::OutOfRange {
				name: "files",
				value: files,
			});
		}
		let gravity = number("gravity")?;
		if !(0.0..=1.0).contains(&gravity) {
			return Err(ParamError::OutOfRange {
				name: "gravity",
				value: gravity,
			});
		}
		Ok(Self {
			source,
			target,
			files,
			gravity,
		})
	}

	/// Relative URL of the edge-detail page for these parameters.
	pub fn to_url(&self) -> String {
		format!(
			"{EDGE_DETAIL_PAGE}?source={}&target={}&files={}&gravity={}",
			urlencoding::encode(&self.source),
			urlencoding::encode(&self.target),
			self.files,
			self.gravity
		)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |key: &str| map.get(key).cloned()
	}

	#[test]
	fn graph_view_defaults_to_commit_view() {
		assert_eq!(GraphViewParams::from_lookup(lookup(&[])), GraphViewParams::default());
		let params = GraphViewParams::from_lookup(lookup(&[("buildId", "b42"), ("commitView", "false")]));
		assert_eq!(params.build_id.as_deref(), Some("b42"));
		assert!(!params.commit_view);
		assert!(GraphViewParams::from_lookup(lookup(&[("commitView", "yes")])).commit_view);
	}

	#[test]
	fn valid_edge_detail_params() {
		let params = EdgeDetailParams::from_lookup(lookup(&[
			("source", "A"),
			("target", "B"),
			("files", "5"),
			("gravity", "0.5"),
		]))
		.unwrap();
		assert_eq!(
			params,
			EdgeDetailParams {
				source: "A".into(),
				target: "B".into(),
				files: 5.0,
				gravity: 0.5,
			}
		);
	}

	#[test]
	fn gravity_out_of_range_is_rejected() {
		let err = EdgeDetailParams::from_lookup(lookup(&[
			("source", "A"),
			("target", "B"),
			("files", "5"),
			("gravity", "1.5"),
		]))
		.unwrap_err();
		assert_eq!(err, ParamError::OutOfRange { name: "gravity", value: 1.5 });
	}

	#[test]
	fn missing_target_is_rejected() {
		let err = EdgeDetailParams::from_lookup(lookup(&[("source", "A"), ("files", "5"), ("gravity", "0.5")]))
			.unwrap_err();
		assert_eq!(err, ParamError::Missing("target"));
	}

	#[test]
	fn files_must_be_a_positive_number() {
		let base = [("source", "A"), ("target", "B"), ("gravity", "0.5")];
		let with = |files: &'static str| {
			let mut pairs = base.to_vec();
			pairs.push(("files", files));
			EdgeDetailParams::from_lookup(lookup(&pairs))
		};
		assert!(matches!(with("0"), Err(ParamError::OutOfRange { name: "files", .. })));
		assert!(matches!(with("many"), Err(ParamError::NotANumber { name: "files", .. })));
		assert!(with("0.5").is_ok());
	}

	#[test]
	fn edge_detail_url_encodes_members() {
		let params = EdgeDetailParams {
			source: "order service".into(),
			target: "B".into(),
			files: 12.0,
			gravity: 0.25,
		};
		assert_eq!(
			params.to_url(),
			"analyze.html?source=order%20service&target=B&files=12&gravity=0.25"
		);
	}
}
