//! Serves coupling snapshots and the compiled client.

// Bin target reuses lib deps, silence noisy lint.
#![allow(unused_crate_dependencies)]

use clap::Parser;
use coupling_graph_server::{Config, serve};

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt::init();

	let config = Config::parse();
	if let Err(err) = serve(config).await {
		log::error!("{err}");
		std::process::exit(1);
	}
}
