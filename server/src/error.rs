use std::net::SocketAddr;
use std::path::PathBuf;

/// Startup and runtime failures of the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// `--data-dir` is not a directory.
	#[error("data directory {} does not exist", .0.display())]
	MissingDataDir(PathBuf),
	/// The listen address could not be bound.
	#[error("failed to bind {addr}: {source}")]
	Bind {
		addr: SocketAddr,
		#[source]
		source: std::io::Error,
	},
	/// The server loop stopped with an I/O error.
	#[error("server error: {0}")]
	Serve(#[source] std::io::Error),
}
