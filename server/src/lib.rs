//! HTTP server for coupling graph snapshots.
//!
//! Serves `<data_dir>/<name>.json` snapshots under `/data/{name}`, a listing
//! of available snapshot files under `/builds`, and the client's static
//! assets from the public directory.

mod assets;
mod config;
mod error;
mod routes;

pub use config::Config;
pub use error::ServerError;
pub use routes::{AppState, list_json_files, router, serve, snapshot_path};
