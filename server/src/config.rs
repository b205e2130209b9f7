use clap::Parser;
use std::path::PathBuf;

/// Command-line and environment settings.
#[derive(Parser, Debug, Clone)]
#[command(name = "coupling-graph-server")]
#[command(about = "Serve coupling graph snapshots and the visualization client")]
#[command(version)]
pub struct Config {
	/// Port to listen on
	#[arg(long, env = "PORT", default_value_t = 3001)]
	pub port: u16,

	/// Directory holding `<name>.json` snapshots
	#[arg(long, default_value = "data")]
	pub data_dir: PathBuf,

	/// Directory of static client assets
	#[arg(long, default_value = "public")]
	pub public_dir: PathBuf,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn directories_default_relative_to_cwd() {
		let config = Config::try_parse_from(["coupling-graph-server", "--port", "8080"]).unwrap();
		assert_eq!(config.port, 8080);
		assert_eq!(config.data_dir, PathBuf::from("data"));
		assert_eq!(config.public_dir, PathBuf::from("public"));
	}

	#[test]
	fn rejects_non_numeric_port() {
		assert!(Config::try_parse_from(["coupling-graph-server", "--port", "http"]).is_err());
	}
}
