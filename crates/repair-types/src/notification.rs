//! Notification types.
//!
//! Notifications stand in for SMS/WhatsApp/email messages sent to the parties
//! of an order. Delivery is best effort.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The party a notification is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "lowercase")]
pub enum Recipient {
	Customer(String),
	Rider(String),
	Vendor(String),
	/// Operations console; has no individual identity.
	Admin,
}

impl fmt::Display for Recipient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Recipient::Customer(id) => write!(f, "Customer {}", id),
			Recipient::Rider(id) => write!(f, "Rider {}", id),
			Recipient::Vendor(id) => write!(f, "Vendor {}", id),
			Recipient::Admin => f.write_str("Admin"),
		}
	}
}

/// A message about an order addressed to one party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
	pub recipient: Recipient,
	pub order_id: String,
	pub message: String,
}

impl Notification {
	pub fn new(recipient: Recipient, order_id: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			recipient,
			order_id: order_id.into(),
			message: message.into(),
		}
	}
}
