//! Handlers for the repair workflow.
//!
//! Each handler owns one area of the workflow: the OTP-gated order steps,
//! quoting, payment, evidence photos, the rider/vendor registry and vendor
//! reporting.

pub mod evidence;
pub mod order;
pub mod party;
pub mod payment;
pub mod quote;
pub mod report;

pub use evidence::EvidenceHandler;
pub use order::OrderHandler;
pub use party::PartyHandler;
pub use payment::PaymentHandler;
pub use quote::QuoteHandler;
pub use report::ReportHandler;

use crate::state::OrderStateError;
use repair_types::{ApiError, OtpKind};
use thiserror::Error;

/// Errors returned by workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
	#[error("Order not found: {0}")]
	OrderNotFound(String),
	#[error("Rider not found: {0}")]
	RiderNotFound(String),
	#[error("Vendor not found: {0}")]
	VendorNotFound(String),
	/// Wrong, missing or already used handoff code. Nothing was changed.
	#[error("Invalid {0} OTP")]
	InvalidOtp(OtpKind),
	#[error("{0}")]
	Validation(String),
	/// The operation is not allowed in the order's current state.
	#[error("{0}")]
	InvalidTransition(String),
	#[error("Storage error: {0}")]
	Storage(String),
}

impl From<OrderStateError> for WorkflowError {
	fn from(err: OrderStateError) -> Self {
		match err {
			OrderStateError::OrderNotFound(id) => WorkflowError::OrderNotFound(id),
			OrderStateError::InvalidOtp(kind) => WorkflowError::InvalidOtp(kind),
			e @ (OrderStateError::InvalidTransition { .. }
			| OrderStateError::InvalidQuoteTransition { .. }) => {
				WorkflowError::InvalidTransition(e.to_string())
			},
			OrderStateError::Storage(message) => WorkflowError::Storage(message),
		}
	}
}

impl From<WorkflowError> for ApiError {
	fn from(err: WorkflowError) -> Self {
		let message = err.to_string();
		match err {
			WorkflowError::OrderNotFound(_) => ApiError::NotFound {
				error_type: "ORDER_NOT_FOUND".to_string(),
				message,
			},
			WorkflowError::RiderNotFound(_) => ApiError::NotFound {
				error_type: "RIDER_NOT_FOUND".to_string(),
				message,
			},
			WorkflowError::VendorNotFound(_) => ApiError::NotFound {
				error_type: "VENDOR_NOT_FOUND".to_string(),
				message,
			},
			WorkflowError::InvalidOtp(_) => ApiError::BadRequest {
				error_type: "INVALID_OTP".to_string(),
				message,
				details: None,
			},
			WorkflowError::Validation(_) => ApiError::validation(message),
			WorkflowError::InvalidTransition(_) => ApiError::Conflict {
				error_type: "INVALID_TRANSITION".to_string(),
				message,
			},
			WorkflowError::Storage(message) => ApiError::internal(message),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::StatusCode;
	use repair_types::OrderStatus;

	#[test]
	fn test_state_errors_map_to_workflow_errors() {
		let err: WorkflowError = OrderStateError::InvalidTransition {
			from: OrderStatus::Pending,
			to: OrderStatus::Completed,
		}
		.into();
		assert!(matches!(err, WorkflowError::InvalidTransition(msg) if msg.contains("pending")));

		let err: WorkflowError = OrderStateError::InvalidOtp(OtpKind::RiderPickup).into();
		assert!(matches!(err, WorkflowError::InvalidOtp(OtpKind::RiderPickup)));
	}

	#[test]
	fn test_api_status_codes() {
		let cases = [
			(WorkflowError::OrderNotFound("o1".into()), StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
			(WorkflowError::VendorNotFound("v1".into()), StatusCode::NOT_FOUND, "VENDOR_NOT_FOUND"),
			(
				WorkflowError::InvalidOtp(OtpKind::CustomerReturn),
				StatusCode::BAD_REQUEST,
				"INVALID_OTP",
			),
			(
				WorkflowError::Validation("bad".into()),
				StatusCode::BAD_REQUEST,
				"VALIDATION_ERROR",
			),
			(
				WorkflowError::InvalidTransition("no".into()),
				StatusCode::CONFLICT,
				"INVALID_TRANSITION",
			),
			(
				WorkflowError::Storage("disk full".into()),
				StatusCode::INTERNAL_SERVER_ERROR,
				"INTERNAL_ERROR",
			),
		];
		for (err, status, code) in cases {
			let api: ApiError = err.into();
			assert_eq!(api.status_code(), status);
			assert_eq!(api.to_error_response().error, code);
		}
	}
}
