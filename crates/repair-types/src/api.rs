//! API types for the repair service HTTP API.
//!
//! Every request body has an explicit, validated contract; nothing is read
//! from an untyped JSON object. Field names on the wire are camelCase.

use crate::OrderStatus;
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Request to submit a new repair order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderRequest {
	#[validate(length(min = 1, max = 128))]
	pub customer_id: String,
	#[validate(length(min = 1, max = 128))]
	pub vendor_id: String,
	#[validate(length(min = 1, max = 512))]
	pub pickup_address: String,
	#[validate(length(max = 512))]
	pub delivery_address: Option<String>,
	#[validate(length(max = 2000))]
	pub racket_details: Option<String>,
	/// Path of an already uploaded racket photo.
	#[validate(length(min = 1, max = 1024))]
	pub racket_image: Option<String>,
	/// Agreed base price, if known up front.
	pub price: Option<Decimal>,
}

/// Body of every OTP-gated transition.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OtpRequest {
	#[validate(length(equal = 6))]
	pub otp: String,
}

/// Vendor's quote proposal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct QuoteRequest {
	/// Required; kept optional here so a missing amount is reported as a
	/// validation error rather than a JSON parse failure.
	pub amount: Option<Decimal>,
	#[validate(length(max = 2000))]
	pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
	#[validate(length(min = 1, max = 128))]
	pub payment_reference: Option<String>,
}

/// Path of an evidence photo for one workflow step.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EvidenceRequest {
	#[validate(length(min = 1, max = 1024))]
	pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewRiderRequest {
	#[validate(length(min = 1, max = 128))]
	pub name: String,
	#[validate(email)]
	pub email: Option<String>,
	#[validate(length(min = 5, max = 20))]
	pub phone: Option<String>,
	#[validate(length(max = 128))]
	pub vehicle: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewVendorRequest {
	#[validate(length(min = 1, max = 128))]
	pub name: String,
	#[validate(email)]
	pub email: Option<String>,
	#[validate(length(min = 5, max = 20))]
	pub phone: Option<String>,
	#[validate(length(max = 512))]
	pub address: Option<String>,
	#[validate(length(max = 128))]
	pub shop_name: Option<String>,
}

/// Filter for listing orders. Unset fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
	pub customer_id: Option<String>,
	pub vendor_id: Option<String>,
	pub rider_id: Option<String>,
	pub status: Option<OrderStatus>,
}

/// Elapsed-time report for one order, in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
	pub order_id: String,
	pub status: OrderStatus,
	pub total_rider_time: f64,
	pub total_vendor_time: f64,
	/// Null when the order has no service start time.
	pub total_service_time: Option<f64>,
}

/// Revenue figures for one vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorEarnings {
	pub vendor_id: String,
	pub total_orders: usize,
	pub completed_orders: usize,
	pub paid_orders: usize,
	pub total_revenue: Decimal,
	pub outstanding_to_collect: Decimal,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	/// Additional error context
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Malformed or invalid input, including a wrong OTP (400)
	BadRequest {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Referenced record does not exist (404)
	NotFound { error_type: String, message: String },
	/// Request is valid but not allowed in the order's current state (409)
	Conflict { error_type: String, message: String },
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl ApiError {
	pub fn validation(message: impl Into<String>) -> Self {
		ApiError::BadRequest {
			error_type: "VALIDATION_ERROR".to_string(),
			message: message.into(),
			details: None,
		}
	}

	pub fn internal(message: impl Into<String>) -> Self {
		ApiError::InternalServerError {
			error_type: "INTERNAL_ERROR".to_string(),
			message: message.into(),
		}
	}

	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> StatusCode {
		match self {
			ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
			ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
			ApiError::Conflict { .. } => StatusCode::CONFLICT,
			ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			ApiError::BadRequest {
				error_type,
				message,
				details,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: details.clone(),
			},
			ApiError::NotFound {
				error_type,
				message,
			}
			| ApiError::Conflict {
				error_type,
				message,
			}
			| ApiError::InternalServerError {
				error_type,
				message,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
			},
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			ApiError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
			ApiError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
			ApiError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		let status = self.status_code();
		(status, axum::Json(self.to_error_response())).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::response::IntoResponse;

	#[test]
	fn test_otp_request_length_checked() {
		let ok = OtpRequest {
			otp: "123456".to_string(),
		};
		assert!(ok.validate().is_ok());

		let short = OtpRequest {
			otp: "1234".to_string(),
		};
		assert!(short.validate().is_err());
	}

	#[test]
	fn test_new_order_request_requires_ids() {
		let request: NewOrderRequest = serde_json::from_value(serde_json::json!({
			"customerId": "",
			"vendorId": "v1",
			"pickupAddress": "Court 3"
		}))
		.unwrap();
		let errors = request.validate().unwrap_err();
		assert!(errors.field_errors().contains_key("customer_id"));
	}

	#[test]
	fn test_quote_amount_accepts_number() {
		let request: QuoteRequest =
			serde_json::from_value(serde_json::json!({ "amount": 500 })).unwrap();
		assert_eq!(request.amount, Some(Decimal::from(500)));
	}

	#[test]
	fn test_order_filter_parses_status() {
		let filter: OrderFilter = serde_json::from_value(serde_json::json!({
			"riderId": "r1",
			"status": "out-for-delivery"
		}))
		.unwrap();
		assert_eq!(filter.rider_id.as_deref(), Some("r1"));
		assert_eq!(filter.status, Some(OrderStatus::OutForDelivery));
	}

	#[tokio::test]
	async fn test_api_error_into_response() {
		let response = ApiError::NotFound {
			error_type: "ORDER_NOT_FOUND".to_string(),
			message: "Order not found: abc".to_string(),
		}
		.into_response();
		assert_eq!(response.status(), StatusCode::NOT_FOUND);

		let body = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
		assert_eq!(json["error"], "ORDER_NOT_FOUND");
		assert!(json.get("details").is_none());
	}
}
