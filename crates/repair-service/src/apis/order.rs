//! Order endpoints: submission, the OTP-gated handoffs, quoting, payment,
//! evidence photos and summaries.

use super::{reject, ValidatedJson};
use crate::server::AppState;
use axum::{
	extract::{rejection::QueryRejection, Path, Query, State},
	http::StatusCode,
	Json,
};
use repair_types::{
	ApiError, EvidenceKind, EvidenceRequest, NewOrderRequest, Order, OrderFilter, OrderSummary,
	OtpRequest, PaymentRequest, QuoteRequest,
};

/// Handles POST /api/orders.
pub async fn submit_order(
	State(state): State<AppState>,
	ValidatedJson(request): ValidatedJson<NewOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
	let order = state.engine.orders().submit(request).await.map_err(reject)?;
	Ok((StatusCode::CREATED, Json(order)))
}

/// Handles GET /api/orders, filtered by the query string.
pub async fn list_orders(
	State(state): State<AppState>,
	query: Result<Query<OrderFilter>, QueryRejection>,
) -> Result<Json<Vec<Order>>, ApiError> {
	let Query(filter) = query.map_err(|e| ApiError::validation(e.body_text()))?;
	let orders = state.engine.orders().list(&filter).await.map_err(reject)?;
	Ok(Json(orders))
}

pub async fn get_order(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
	state.engine.orders().get(&id).await.map(Json).map_err(reject)
}

pub async fn get_summary(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<OrderSummary>, ApiError> {
	state.engine.orders().summary(&id).await.map(Json).map_err(reject)
}

/// Handles POST /api/orders/{id}/pickup.
pub async fn confirm_pickup(
	State(state): State<AppState>,
	Path(id): Path<String>,
	ValidatedJson(request): ValidatedJson<OtpRequest>,
) -> Result<Json<Order>, ApiError> {
	state
		.engine
		.orders()
		.confirm_pickup(&id, &request.otp)
		.await
		.map(Json)
		.map_err(reject)
}

/// Handles POST /api/orders/{id}/deliver-to-vendor.
pub async fn deliver_to_vendor(
	State(state): State<AppState>,
	Path(id): Path<String>,
	ValidatedJson(request): ValidatedJson<OtpRequest>,
) -> Result<Json<Order>, ApiError> {
	state
		.engine
		.orders()
		.deliver_to_vendor(&id, &request.otp)
		.await
		.map(Json)
		.map_err(reject)
}

/// Handles POST /api/orders/{id}/service-complete. No OTP: the vendor
/// already holds the racket.
pub async fn complete_service(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
	state
		.engine
		.orders()
		.complete_service(&id)
		.await
		.map(Json)
		.map_err(reject)
}

/// Handles POST /api/orders/{id}/vendor-handover-to-rider.
pub async fn handover_to_rider(
	State(state): State<AppState>,
	Path(id): Path<String>,
	ValidatedJson(request): ValidatedJson<OtpRequest>,
) -> Result<Json<Order>, ApiError> {
	state
		.engine
		.orders()
		.handover_to_rider(&id, &request.otp)
		.await
		.map(Json)
		.map_err(reject)
}

/// Handles POST /api/orders/{id}/return-to-court.
pub async fn return_to_customer(
	State(state): State<AppState>,
	Path(id): Path<String>,
	ValidatedJson(request): ValidatedJson<OtpRequest>,
) -> Result<Json<Order>, ApiError> {
	state
		.engine
		.orders()
		.return_to_customer(&id, &request.otp)
		.await
		.map(Json)
		.map_err(reject)
}

pub async fn pay(
	State(state): State<AppState>,
	Path(id): Path<String>,
	ValidatedJson(request): ValidatedJson<PaymentRequest>,
) -> Result<Json<Order>, ApiError> {
	state
		.engine
		.payments()
		.pay(&id, request)
		.await
		.map(Json)
		.map_err(reject)
}

pub async fn propose_quote(
	State(state): State<AppState>,
	Path(id): Path<String>,
	ValidatedJson(request): ValidatedJson<QuoteRequest>,
) -> Result<Json<Order>, ApiError> {
	state
		.engine
		.quotes()
		.propose(&id, request)
		.await
		.map(Json)
		.map_err(reject)
}

pub async fn accept_quote(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
	state.engine.quotes().accept(&id).await.map(Json).map_err(reject)
}

pub async fn reject_quote(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
	state.engine.quotes().reject(&id).await.map(Json).map_err(reject)
}

/// Handles POST /api/orders/{id}/evidence/{kind}.
pub async fn attach_evidence(
	State(state): State<AppState>,
	Path((id, kind)): Path<(String, String)>,
	ValidatedJson(request): ValidatedJson<EvidenceRequest>,
) -> Result<Json<Order>, ApiError> {
	let kind: EvidenceKind = kind.parse().map_err(ApiError::validation)?;
	state
		.engine
		.evidence()
		.attach(&id, kind, request.path)
		.await
		.map(Json)
		.map_err(reject)
}
