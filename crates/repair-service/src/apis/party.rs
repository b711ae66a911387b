//! Rider and vendor registry endpoints, plus vendor earnings.

use super::{reject, ValidatedJson};
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	http::StatusCode,
	Json,
};
use repair_types::{ApiError, NewRiderRequest, NewVendorRequest, Rider, Vendor, VendorEarnings};

pub async fn register_rider(
	State(state): State<AppState>,
	ValidatedJson(request): ValidatedJson<NewRiderRequest>,
) -> Result<(StatusCode, Json<Rider>), ApiError> {
	let rider = state
		.engine
		.parties()
		.register_rider(request)
		.await
		.map_err(reject)?;
	Ok((StatusCode::CREATED, Json(rider)))
}

pub async fn list_riders(State(state): State<AppState>) -> Result<Json<Vec<Rider>>, ApiError> {
	state.engine.parties().list_riders().await.map(Json).map_err(reject)
}

pub async fn get_rider(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Rider>, ApiError> {
	state.engine.parties().get_rider(&id).await.map(Json).map_err(reject)
}

pub async fn register_vendor(
	State(state): State<AppState>,
	ValidatedJson(request): ValidatedJson<NewVendorRequest>,
) -> Result<(StatusCode, Json<Vendor>), ApiError> {
	let vendor = state
		.engine
		.parties()
		.register_vendor(request)
		.await
		.map_err(reject)?;
	Ok((StatusCode::CREATED, Json(vendor)))
}

pub async fn list_vendors(State(state): State<AppState>) -> Result<Json<Vec<Vendor>>, ApiError> {
	state.engine.parties().list_vendors().await.map(Json).map_err(reject)
}

pub async fn get_vendor(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Vendor>, ApiError> {
	state.engine.parties().get_vendor(&id).await.map(Json).map_err(reject)
}

/// Handles GET /api/vendors/{id}/earnings.
pub async fn vendor_earnings(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<VendorEarnings>, ApiError> {
	state
		.engine
		.reports()
		.vendor_earnings(&id)
		.await
		.map(Json)
		.map_err(reject)
}
