//! Notification sink that writes each message to the tracing log.
//!
//! Stands in for SMS/WhatsApp/email gateways during development.

use crate::{NotificationError, NotificationFactory, NotificationInterface, NotificationRegistry};
use async_trait::async_trait;
use repair_types::{
	truncate_id, ConfigSchema, Field, FieldType, ImplementationRegistry, Notification, Schema,
	ValidationError,
};
use tracing::Level;

const LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];

pub struct LogNotifier {
	level: Level,
	/// When false only the recipient and order are logged, keeping the
	/// handoff codes carried in message text out of the logs.
	include_message: bool,
}

impl LogNotifier {
	pub fn new(level: Level, include_message: bool) -> Self {
		Self {
			level,
			include_message,
		}
	}
}

#[async_trait]
impl NotificationInterface for LogNotifier {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LogNotifierSchema)
	}

	async fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
		let recipient = &notification.recipient;
		let order_id = truncate_id(&notification.order_id);
		let message = if self.include_message {
			notification.message.as_str()
		} else {
			"Notification sent"
		};

		// tracing needs the level at compile time
		if self.level == Level::ERROR {
			tracing::error!(%recipient, %order_id, "{}", message);
		} else if self.level == Level::WARN {
			tracing::warn!(%recipient, %order_id, "{}", message);
		} else if self.level >= Level::DEBUG {
			tracing::debug!(%recipient, %order_id, "{}", message);
		} else {
			tracing::info!(%recipient, %order_id, "{}", message);
		}
		Ok(())
	}
}

pub struct LogNotifierSchema;

impl ConfigSchema for LogNotifierSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("level", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(level) if LEVELS.contains(&level) => Ok(()),
						_ => Err(format!("level must be one of {}", LEVELS.join(", "))),
					}
				}),
				Field::new("include_message", FieldType::Boolean),
			],
		);
		schema.validate(config)
	}
}

/// Factory function to create a log notifier from configuration.
///
/// Configuration parameters:
/// - `level`: one of debug, info, warn, error (default: "info")
/// - `include_message`: log the message text (default: true)
pub fn create_notifier(
	config: &toml::Value,
) -> Result<Box<dyn NotificationInterface>, NotificationError> {
	LogNotifierSchema
		.validate(config)
		.map_err(|e| NotificationError::Configuration(e.to_string()))?;

	let level = match config.get("level").and_then(|v| v.as_str()) {
		Some("debug") => Level::DEBUG,
		Some("warn") => Level::WARN,
		Some("error") => Level::ERROR,
		_ => Level::INFO,
	};
	let include_message = config
		.get("include_message")
		.and_then(|v| v.as_bool())
		.unwrap_or(true);
	Ok(Box::new(LogNotifier::new(level, include_message)))
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "log";
	type Factory = NotificationFactory;

	fn factory() -> Self::Factory {
		create_notifier
	}
}

impl NotificationRegistry for Registry {}
