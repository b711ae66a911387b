//! Builder pattern for constructing repair engines.
//!
//! Backends are chosen by name from the configuration and created through
//! factory functions, so the binary decides which implementations exist and
//! the configuration decides which are used.

use crate::engine::RepairEngine;
use crate::otp::{OtpGenerator, RandomOtpGenerator};
use repair_config::Config;
use repair_notify::{NotificationError, NotificationInterface, NotificationService};
use repair_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Factory functions for every pluggable component, keyed by implementation
/// name.
pub struct RepairFactories<SF, NF> {
	pub storage_factories: HashMap<String, SF>,
	pub notification_factories: HashMap<String, NF>,
}

/// Builder for constructing a RepairEngine with pluggable implementations.
pub struct RepairBuilder {
	config: Config,
	otp: Arc<dyn OtpGenerator>,
}

impl RepairBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			otp: Arc::new(RandomOtpGenerator),
		}
	}

	/// Replaces the random OTP source.
	pub fn with_otp_generator(mut self, otp: Arc<dyn OtpGenerator>) -> Self {
		self.otp = otp;
		self
	}

	/// Builds the engine using the factories for each component type.
	///
	/// Only the primary storage implementation is created. Every configured
	/// notification sink is created and receives all notifications. A
	/// configured implementation with no matching factory is an error.
	pub fn build<SF, NF>(
		self,
		factories: RepairFactories<SF, NF>,
	) -> Result<RepairEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
		NF: Fn(&toml::Value) -> Result<Box<dyn NotificationInterface>, NotificationError>,
	{
		let primary = &self.config.storage.primary;
		let storage_config = self
			.config
			.storage
			.implementations
			.get(primary)
			.ok_or_else(|| {
				BuilderError::Config(format!(
					"Primary storage '{}' not found in implementations",
					primary
				))
			})?;
		let factory = factories.storage_factories.get(primary).ok_or_else(|| {
			BuilderError::Config(format!("Unknown storage implementation '{}'", primary))
		})?;
		let backend = match factory(storage_config) {
			Ok(backend) => {
				tracing::info!(component = "storage", implementation = %primary, "Loaded");
				backend
			},
			Err(e) => {
				tracing::error!(
					component = "storage",
					implementation = %primary,
					error = %e,
					"Failed to create storage implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create storage implementation '{}': {}",
					primary, e
				)));
			},
		};
		let storage = Arc::new(StorageService::new(backend));

		let mut sinks = Vec::new();
		let mut names: Vec<_> = self.config.notifications.implementations.keys().collect();
		names.sort();
		for name in names {
			let factory = factories.notification_factories.get(name).ok_or_else(|| {
				BuilderError::Config(format!("Unknown notification implementation '{}'", name))
			})?;
			let config = &self.config.notifications.implementations[name];
			match factory(config) {
				Ok(sink) => {
					tracing::info!(component = "notifications", implementation = %name, "Loaded");
					sinks.push((name.clone(), sink));
				},
				Err(e) => {
					tracing::error!(
						component = "notifications",
						implementation = %name,
						error = %e,
						"Failed to create notification implementation"
					);
					return Err(BuilderError::Config(format!(
						"Failed to create notification implementation '{}': {}",
						name, e
					)));
				},
			}
		}

		if sinks.is_empty() {
			tracing::warn!("No notification implementations configured - notifications are disabled");
		}
		let notifications = Arc::new(NotificationService::new(sinks));

		Ok(RepairEngine::new(self.config, storage, notifications, self.otp))
	}
}
