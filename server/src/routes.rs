use super::assets::COMMON_HTML_PAGE;
use super::config::Config;
use super::error::ServerError;
use axum::{
	Json, Router,
	extract::{Path, State},
	http::{StatusCode, header},
	response::{Html, IntoResponse, Response},
	routing::get,
};
use log::{error, info, warn};
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

/// Application state shared across handlers
pub struct AppState {
	/// Directory holding the snapshot files.
	pub data_dir: PathBuf,
}

/// Build the router: snapshot routes, then static assets as the fallback.
///
/// Unknown asset paths (such as `analyze.html`) get the client's
/// `index.html`, which picks the page from the location.
pub fn router(state: Arc<AppState>, public_dir: impl Into<PathBuf>) -> Router {
	let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);
	let public_dir = public_dir.into();
	let assets = ServeDir::new(&public_dir).fallback(ServeFile::new(public_dir.join("index.html")));

	Router::new()
		.route("/data/{filename}", get(data_handler))
		.route("/builds", get(builds_handler))
		.route("/commonHtmlPage", get(common_page_handler))
		.fallback_service(assets)
		.layer(cors)
		.with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> Result<(), ServerError> {
	if !config.data_dir.is_dir() {
		return Err(ServerError::MissingDataDir(config.data_dir));
	}
	let state = Arc::new(AppState {
		data_dir: config.data_dir,
	});
	let app = router(state, config.public_dir);

	let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
	let listener = tokio::net::TcpListener::bind(addr)
		.await
		.map_err(|source| ServerError::Bind { addr, source })?;
	info!("Server running on http://localhost:{}", config.port);

	axum::serve(listener, app).await.map_err(ServerError::Serve)
}

/// File backing snapshot `name`. Names that would escape the data directory
/// have none.
pub fn snapshot_path(data_dir: &std::path::Path, name: &str) -> Option<PathBuf> {
	if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
		return None;
	}
	Some(data_dir.join(format!("{name}.json")))
}

/// `*.json` file names in `dir`, sorted.
pub async fn list_json_files(dir: &std::path::Path) -> std::io::Result<Vec<String>> {
	let mut entries = tokio::fs::read_dir(dir).await?;
	let mut files = Vec::new();
	while let Some(entry) = entries.next_entry().await? {
		let name = entry.file_name().to_string_lossy().into_owned();
		if name.ends_with(".json") {
			files.push(name);
		}
	}
	files.sort();
	Ok(files)
}

fn file_not_found() -> Response {
	(StatusCode::NOT_FOUND, Json(json!({ "error": "File not found" }))).into_response()
}

async fn data_handler(State(state): State<Arc<AppState>>, Path(filename): Path<String>) -> Response {
	let Some(path) = snapshot_path(&state.data_dir, &filename) else {
		warn!("Rejected snapshot name {filename:?}");
		return file_not_found();
	};
	info!("Requesting file: {}", path.display());

	match tokio::fs::read(&path).await {
		Ok(bytes) => ([(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
		Err(err) => {
			error!("Error sending file: {err}");
			file_not_found()
		}
	}
}

async fn builds_handler(State(state): State<Arc<AppState>>) -> Response {
	match list_json_files(&state.data_dir).await {
		Ok(files) => Json(files).into_response(),
		Err(err) => {
			error!("Error reading data folder: {err}");
			(StatusCode::INTERNAL_SERVER_ERROR, "Error reading data folder").into_response()
		}
	}
}

async fn common_page_handler() -> impl IntoResponse {
	Html(COMMON_HTML_PAGE)
}
