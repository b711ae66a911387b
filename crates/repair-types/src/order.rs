//! Repair order types.
//!
//! An order follows a single racket from the customer to the vendor and back.
//! Each physical handoff is gated by a one-time code kept in one of four OTP
//! slots on the order, and each step stamps the time it happened so that
//! rider, vendor and total service durations can be derived later.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A racket repair order with its full workflow state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Unique identifier for this order.
	pub id: String,
	/// Customer who submitted the request.
	pub customer_id: String,
	/// Vendor performing the repair.
	pub vendor_id: String,
	/// Rider assigned to carry the racket.
	pub rider_id: Option<String>,
	/// Current workflow status.
	pub status: OrderStatus,
	pub pickup_address: String,
	pub delivery_address: Option<String>,
	/// Customer's description of the requested repair.
	pub racket_details: Option<String>,
	pub vendor_notes: Option<String>,
	/// Path of the racket photo supplied at submission.
	pub racket_image: Option<String>,

	pub quote_amount: Option<Decimal>,
	#[serde(default)]
	pub quote_status: QuoteStatus,
	pub price: Option<Decimal>,
	#[serde(default)]
	pub payment_status: PaymentStatus,
	pub payment_reference: Option<String>,

	pub rider_pickup_otp: Option<String>,
	pub rider_delivery_to_vendor_otp: Option<String>,
	pub vendor_handover_to_rider_otp: Option<String>,
	pub customer_return_otp: Option<String>,

	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub service_timer_start: Option<DateTime<Utc>>,
	pub rider_pickup_start_time: Option<DateTime<Utc>>,
	pub rider_delivery_to_vendor_time: Option<DateTime<Utc>>,
	pub vendor_service_start_time: Option<DateTime<Utc>>,
	pub vendor_service_end_time: Option<DateTime<Utc>>,
	pub rider_return_to_court_time: Option<DateTime<Utc>>,
	pub customer_completion_time: Option<DateTime<Utc>>,

	/// Rider minutes (outbound plus return leg), set on completion.
	pub total_rider_time: Option<f64>,
	/// Vendor minutes, set when the vendor completes the service.
	pub total_vendor_time: Option<f64>,
	/// End-to-end minutes, set on completion.
	pub total_service_time: Option<f64>,

	pub pickup_evidence_image: Option<String>,
	pub delivery_to_vendor_evidence_image: Option<String>,
	pub service_complete_evidence_image: Option<String>,
	pub return_to_court_evidence_image: Option<String>,
	pub customer_pickup_evidence_image: Option<String>,
}

impl Order {
	/// Returns a mutable reference to the OTP slot of the given kind.
	pub fn otp_slot_mut(&mut self, kind: OtpKind) -> &mut Option<String> {
		match kind {
			OtpKind::RiderPickup => &mut self.rider_pickup_otp,
			OtpKind::RiderDeliveryToVendor => &mut self.rider_delivery_to_vendor_otp,
			OtpKind::VendorHandoverToRider => &mut self.vendor_handover_to_rider_otp,
			OtpKind::CustomerReturn => &mut self.customer_return_otp,
		}
	}

	/// Returns a mutable reference to the evidence image slot of the given kind.
	pub fn evidence_slot_mut(&mut self, kind: EvidenceKind) -> &mut Option<String> {
		match kind {
			EvidenceKind::Pickup => &mut self.pickup_evidence_image,
			EvidenceKind::DeliveryToVendor => &mut self.delivery_to_vendor_evidence_image,
			EvidenceKind::ServiceComplete => &mut self.service_complete_evidence_image,
			EvidenceKind::ReturnToCourt => &mut self.return_to_court_evidence_image,
			EvidenceKind::CustomerPickup => &mut self.customer_pickup_evidence_image,
		}
	}

	pub fn is_paid(&self) -> bool {
		self.payment_status == PaymentStatus::Paid
	}
}

/// Workflow status of an order.
///
/// Orders only move forward through this sequence:
/// Pending -> Picked -> InProgress -> AwaitingRiderPickup -> OutForDelivery -> Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
	/// Submitted, waiting for the rider to collect the racket.
	Pending,
	/// Rider has the racket and is heading to the vendor.
	Picked,
	/// Vendor has the racket and is repairing it.
	InProgress,
	/// Repair finished, waiting for the rider to collect from the vendor.
	#[serde(rename = "vendor-completed-service-awaiting-rider-pickup")]
	AwaitingRiderPickup,
	/// Rider is bringing the racket back to the customer.
	OutForDelivery,
	/// Racket returned; terminal.
	Completed,
}

impl OrderStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Picked => "picked",
			OrderStatus::InProgress => "in-progress",
			OrderStatus::AwaitingRiderPickup => "vendor-completed-service-awaiting-rider-pickup",
			OrderStatus::OutForDelivery => "out-for-delivery",
			OrderStatus::Completed => "completed",
		}
	}

	/// Returns an iterator over all statuses in workflow order.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Pending,
			Self::Picked,
			Self::InProgress,
			Self::AwaitingRiderPickup,
			Self::OutForDelivery,
			Self::Completed,
		]
		.into_iter()
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::all()
			.find(|status| status.as_str() == s)
			.ok_or_else(|| format!("Unknown order status: {}", s))
	}
}

/// State of the vendor's quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
	#[default]
	None,
	Proposed,
	Accepted,
	Rejected,
}

impl fmt::Display for QuoteStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			QuoteStatus::None => "none",
			QuoteStatus::Proposed => "proposed",
			QuoteStatus::Accepted => "accepted",
			QuoteStatus::Rejected => "rejected",
		};
		f.write_str(s)
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
	#[default]
	Pending,
	Paid,
}

/// Identifies one of the four handoff codes on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OtpKind {
	/// Customer hands the racket to the rider.
	RiderPickup,
	/// Rider hands the racket to the vendor.
	RiderDeliveryToVendor,
	/// Vendor hands the repaired racket to the rider.
	VendorHandoverToRider,
	/// Rider returns the racket to the customer.
	CustomerReturn,
}

impl fmt::Display for OtpKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			OtpKind::RiderPickup => "rider pickup",
			OtpKind::RiderDeliveryToVendor => "vendor delivery",
			OtpKind::VendorHandoverToRider => "vendor handover",
			OtpKind::CustomerReturn => "customer return",
		};
		f.write_str(s)
	}
}

/// Workflow step an evidence photo documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvidenceKind {
	Pickup,
	DeliveryToVendor,
	ServiceComplete,
	ReturnToCourt,
	CustomerPickup,
}

impl FromStr for EvidenceKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pickup" => Ok(EvidenceKind::Pickup),
			"delivery-to-vendor" => Ok(EvidenceKind::DeliveryToVendor),
			"service-complete" => Ok(EvidenceKind::ServiceComplete),
			"return-to-court" => Ok(EvidenceKind::ReturnToCourt),
			"customer-pickup" => Ok(EvidenceKind::CustomerPickup),
			_ => Err(format!("Unknown evidence kind: {}", s)),
		}
	}
}
