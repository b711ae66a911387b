//! Rider and vendor records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A rider who carries rackets between customers and vendors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rider {
	pub id: String,
	pub name: String,
	pub email: Option<String>,
	pub phone: Option<String>,
	/// Free-form vehicle description, e.g. "Bike - XYZ123".
	pub vehicle: Option<String>,
	pub created_at: DateTime<Utc>,
}

/// A repair shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
	pub id: String,
	pub name: String,
	pub email: Option<String>,
	pub phone: Option<String>,
	pub address: Option<String>,
	pub shop_name: Option<String>,
	pub created_at: DateTime<Utc>,
}
