//! Notification module for the racket repair service.
//!
//! Workflow steps tell customers, riders, vendors and the admin console what
//! happened to an order. Sinks are pluggable; delivery is best effort and a
//! failing sink never fails the workflow step that triggered it.

use async_trait::async_trait;
use repair_types::{ConfigSchema, ImplementationRegistry, Notification};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod log;
}

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum NotificationError {
	/// The sink could not deliver the message.
	#[error("Delivery failed: {0}")]
	Delivery(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait implemented by every notification sink.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationInterface: Send + Sync {
	/// Returns the configuration schema for this sink.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Delivers one notification.
	async fn notify(&self, notification: &Notification) -> Result<(), NotificationError>;
}

/// Type alias for notification factory functions.
pub type NotificationFactory =
	fn(&toml::Value) -> Result<Box<dyn NotificationInterface>, NotificationError>;

/// Registry trait for notification implementations.
pub trait NotificationRegistry: ImplementationRegistry<Factory = NotificationFactory> {}

/// Get all registered notification implementations.
pub fn get_all_implementations() -> Vec<(&'static str, NotificationFactory)> {
	use implementations::log;

	vec![(log::Registry::NAME, log::Registry::factory())]
}

/// Fans every notification out to all configured sinks.
pub struct NotificationService {
	sinks: Vec<(String, Box<dyn NotificationInterface>)>,
}

impl NotificationService {
	pub fn new(sinks: Vec<(String, Box<dyn NotificationInterface>)>) -> Self {
		Self { sinks }
	}

	/// A service with no sinks; every notification is dropped.
	pub fn disabled() -> Self {
		Self { sinks: Vec::new() }
	}

	pub fn sink_count(&self) -> usize {
		self.sinks.len()
	}

	/// Sends a batch of notifications to every sink.
	///
	/// Sink failures are logged and otherwise ignored.
	pub async fn send(&self, notifications: &[Notification]) {
		for notification in notifications {
			for (name, sink) in &self.sinks {
				if let Err(e) = sink.notify(notification).await {
					tracing::warn!(
						sink = %name,
						recipient = %notification.recipient,
						order_id = %repair_types::truncate_id(&notification.order_id),
						error = %e,
						"Failed to deliver notification"
					);
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use mockall::predicate::*;
	use repair_types::Recipient;

	#[tokio::test]
	async fn test_send_reaches_every_sink() {
		let notification = Notification::new(Recipient::Admin, "order-1", "done");

		let mut first = MockNotificationInterface::new();
		first
			.expect_notify()
			.with(eq(notification.clone()))
			.times(1)
			.returning(|_| Ok(()));
		let mut second = MockNotificationInterface::new();
		second.expect_notify().times(1).returning(|_| Ok(()));

		let service = NotificationService::new(vec![
			("first".to_string(), Box::new(first)),
			("second".to_string(), Box::new(second)),
		]);
		service.send(&[notification]).await;
	}

	#[tokio::test]
	async fn test_failing_sink_does_not_stop_others() {
		let mut failing = MockNotificationInterface::new();
		failing
			.expect_notify()
			.times(2)
			.returning(|_| Err(NotificationError::Delivery("gateway down".into())));
		let mut healthy = MockNotificationInterface::new();
		healthy.expect_notify().times(2).returning(|_| Ok(()));

		let service = NotificationService::new(vec![
			("failing".to_string(), Box::new(failing)),
			("healthy".to_string(), Box::new(healthy)),
		]);
		service
			.send(&[
				Notification::new(Recipient::Rider("r1".into()), "o1", "pick up"),
				Notification::new(Recipient::Vendor("v1".into()), "o1", "incoming"),
			])
			.await;
	}

	#[tokio::test]
	async fn test_disabled_service_accepts_notifications() {
		let service = NotificationService::disabled();
		assert_eq!(service.sink_count(), 0);
		service
			.send(&[Notification::new(Recipient::Admin, "o1", "noop")])
			.await;
	}

	#[test]
	fn test_log_backend_registered() {
		let names: Vec<_> = get_all_implementations().into_iter().map(|(n, _)| n).collect();
		assert_eq!(names, vec!["log"]);
	}
}
