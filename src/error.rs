//! Error types for snapshot loading and navigation parameter validation.

use thiserror::Error;

/// Failure to obtain a usable graph snapshot.
#[derive(Debug, Error)]
pub enum LoadError {
	/// The request could not be sent or its body not read.
	#[error("request for {url} failed: {source}")]
	Request {
		url: String,
		#[source]
		source: reqwest::Error,
	},
	/// The server answered with a non-success status.
	#[error("{url} returned status {status}")]
	Status { url: String, status: u16 },
	/// The body is not a valid snapshot.
	#[error("malformed JSON from {url}: {source}")]
	Parse {
		url: String,
		#[source]
		source: serde_json::Error,
	},
	/// Commit view needs the build's `buildDate`.
	#[error("build snapshot has no buildDate, cannot merge onto baseline")]
	MissingBuildDate,
}

/// Invalid or missing navigation query parameter.
#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
	/// Parameter absent or empty.
	#[error("missing required parameter `{0}`")]
	Missing(&'static str),
	/// Parameter is not a finite number.
	#[error("parameter `{name}` is not a number: {value:?}")]
	NotANumber { name: &'static str, value: String },
	/// Parameter outside its allowed range.
	#[error("parameter `{name}` out of range: {value}")]
	OutOfRange { name: &'static str, value: f64 },
}
