//! Main entry point for the racket repair service.
//!
//! Loads the configuration, wires the storage and notification backends
//! named there into a repair engine and serves the HTTP API until the
//! process is stopped.

use clap::Parser;
use repair_config::Config;
use repair_core::{RepairBuilder, RepairEngine, RepairFactories};
use repair_notify::NotificationFactory;
use repair_storage::StorageFactory;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

/// Command-line arguments for the repair service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	// RUST_LOG wins over the command-line level
	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.as_str()));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config_path = args
		.config
		.to_str()
		.ok_or_else(|| format!("Config path is not valid UTF-8: {}", args.config.display()))?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let engine = Arc::new(build_engine(config)?);

	let api_config = engine.config().api_or_default();
	if !api_config.enabled {
		tracing::warn!("API server disabled in configuration, nothing to serve");
		return Ok(());
	}

	server::start_server(api_config, engine).await?;

	tracing::info!("Stopped repair service");
	Ok(())
}

/// Builds the repair engine from every backend compiled into this binary.
fn build_engine(config: Config) -> Result<RepairEngine, Box<dyn std::error::Error>> {
	let storage_factories: HashMap<String, StorageFactory> = repair_storage::get_all_implementations()
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect();
	let notification_factories: HashMap<String, NotificationFactory> =
		repair_notify::get_all_implementations()
			.into_iter()
			.map(|(name, factory)| (name.to_string(), factory))
			.collect();

	let factories = RepairFactories {
		storage_factories,
		notification_factories,
	};

	Ok(RepairBuilder::new(config).build(factories)?)
}
