//! HTTP server for the racket repair API.
//!
//! Every route lives under `/api` and delegates to the handlers in
//! [`crate::apis`].

use crate::apis::{order, party};
use axum::{
	extract::DefaultBodyLimit,
	response::Json,
	routing::{get, post},
	Router,
};
use repair_config::ApiConfig;
use repair_core::RepairEngine;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Engine running every workflow operation.
	pub engine: Arc<RepairEngine>,
}

/// Builds the API router with its middleware.
pub fn router(engine: Arc<RepairEngine>, max_request_size: usize) -> Router {
	let api = Router::new()
		.route("/orders", post(order::submit_order).get(order::list_orders))
		.route("/orders/{id}", get(order::get_order))
		.route("/orders/{id}/summary", get(order::get_summary))
		.route("/orders/{id}/pickup", post(order::confirm_pickup))
		.route("/orders/{id}/deliver-to-vendor", post(order::deliver_to_vendor))
		.route("/orders/{id}/service-complete", post(order::complete_service))
		.route(
			"/orders/{id}/vendor-handover-to-rider",
			post(order::handover_to_rider),
		)
		.route("/orders/{id}/return-to-court", post(order::return_to_customer))
		.route("/orders/{id}/pay", post(order::pay))
		.route("/orders/{id}/quote", post(order::propose_quote))
		.route("/orders/{id}/vendor-accept", post(order::accept_quote))
		.route("/orders/{id}/vendor-reject", post(order::reject_quote))
		.route("/orders/{id}/evidence/{kind}", post(order::attach_evidence))
		.route("/riders", post(party::register_rider).get(party::list_riders))
		.route("/riders/{id}", get(party::get_rider))
		.route("/vendors", post(party::register_vendor).get(party::list_vendors))
		.route("/vendors/{id}", get(party::get_vendor))
		.route("/vendors/{id}/earnings", get(party::vendor_earnings))
		.route("/health", get(health));

	Router::new()
		.nest("/api", api)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive())
				.layer(DefaultBodyLimit::max(max_request_size)),
		)
		.with_state(AppState { engine })
}

/// Starts the HTTP server and serves until the listener fails.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<RepairEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(engine, api_config.max_request_size);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Racket repair API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles GET /api/health.
async fn health() -> Json<Value> {
	Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{
		body::Body,
		http::{Request, StatusCode},
	};
	use repair_config::Config;
	use repair_core::{RepairBuilder, RepairFactories};
	use tower::ServiceExt;

	fn app() -> Router {
		let config: Config = r#"
[service]
id = "api-test"

[storage]
primary = "memory"
[storage.implementations.memory]
"#
		.parse()
		.unwrap();

		let factories = RepairFactories {
			storage_factories: repair_storage::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			notification_factories: repair_notify::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		};
		let engine = RepairBuilder::new(config).build(factories).unwrap();
		router(Arc::new(engine), 1024 * 1024)
	}

	async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
		let mut builder = Request::builder().method(method).uri(uri);
		if body.is_some() {
			builder = builder.header("content-type", "application/json");
		}
		let body = match body {
			Some(v) => Body::from(serde_json::to_string(&v).unwrap()),
			None => Body::empty(),
		};
		let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
		let status = response.status();
		let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
			.await
			.unwrap();
		let json = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).unwrap_or(Value::Null)
		};
		(status, json)
	}

	/// Registers a vendor and a rider and submits one order for them.
	async fn submitted_order(app: &Router) -> (Value, String) {
		let (status, vendor) = call(
			app,
			"POST",
			"/api/vendors",
			Some(json!({ "name": "Strings & Co", "shopName": "Strings & Co" })),
		)
		.await;
		assert_eq!(status, StatusCode::CREATED);
		let vendor_id = vendor["id"].as_str().unwrap().to_string();

		let (status, _) = call(app, "POST", "/api/riders", Some(json!({ "name": "Asha" }))).await;
		assert_eq!(status, StatusCode::CREATED);

		let (status, order) = call(
			app,
			"POST",
			"/api/orders",
			Some(json!({
				"customerId": "customer-1",
				"vendorId": vendor_id,
				"pickupAddress": "Court 3, Riverside Club",
				"racketDetails": "Snapped main string",
				"price": 500
			})),
		)
		.await;
		assert_eq!(status, StatusCode::CREATED);
		(order, vendor_id)
	}

	fn otp(order: &Value, field: &str) -> String {
		order[field].as_str().unwrap().to_string()
	}

	#[tokio::test]
	async fn test_health() {
		let (status, body) = call(&app(), "GET", "/api/health", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, json!({ "status": "ok" }));
	}

	#[tokio::test]
	async fn test_full_repair_flow() {
		let app = app();
		let (order, vendor_id) = submitted_order(&app).await;
		let id = order["id"].as_str().unwrap().to_string();
		assert_eq!(order["status"], "pending");

		let (status, body) = call(
			&app,
			"POST",
			&format!("/api/orders/{}/pickup", id),
			Some(json!({ "otp": "000000" })),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "INVALID_OTP");

		let (status, picked) = call(
			&app,
			"POST",
			&format!("/api/orders/{}/pickup", id),
			Some(json!({ "otp": otp(&order, "riderPickupOtp") })),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(picked["status"], "picked");
		assert!(picked["riderPickupOtp"].is_null());

		let (status, delivered) = call(
			&app,
			"POST",
			&format!("/api/orders/{}/deliver-to-vendor", id),
			Some(json!({ "otp": otp(&picked, "riderDeliveryToVendorOtp") })),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(delivered["status"], "in-progress");

		let (status, serviced) = call(
			&app,
			"POST",
			&format!("/api/orders/{}/service-complete", id),
			None,
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(serviced["status"], "vendor-completed-service-awaiting-rider-pickup");

		let (status, handed) = call(
			&app,
			"POST",
			&format!("/api/orders/{}/vendor-handover-to-rider", id),
			Some(json!({ "otp": otp(&serviced, "vendorHandoverToRiderOtp") })),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(handed["status"], "out-for-delivery");

		let (status, completed) = call(
			&app,
			"POST",
			&format!("/api/orders/{}/return-to-court", id),
			Some(json!({ "otp": otp(&serviced, "customerReturnOtp") })),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(completed["status"], "completed");
		assert!(completed["totalServiceTime"].is_number());

		let (status, summary) =
			call(&app, "GET", &format!("/api/orders/{}/summary", id), None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(summary["status"], "completed");

		let (status, paid) =
			call(&app, "POST", &format!("/api/orders/{}/pay", id), Some(json!({}))).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(paid["paymentStatus"], "paid");
		assert!(paid["paymentReference"].as_str().unwrap().starts_with("STUB-"));

		let (status, earnings) = call(
			&app,
			"GET",
			&format!("/api/vendors/{}/earnings", vendor_id),
			None,
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(earnings["completedOrders"], 1);
		assert_eq!(earnings["paidOrders"], 1);
		assert_eq!(earnings["totalRevenue"].as_f64(), Some(500.0));
	}

	#[tokio::test]
	async fn test_out_of_order_step_conflicts() {
		let app = app();
		let (order, _) = submitted_order(&app).await;
		let id = order["id"].as_str().unwrap();

		let (status, body) = call(
			&app,
			"POST",
			&format!("/api/orders/{}/service-complete", id),
			None,
		)
		.await;
		assert_eq!(status, StatusCode::CONFLICT);
		assert_eq!(body["error"], "INVALID_TRANSITION");
	}

	#[tokio::test]
	async fn test_request_validation() {
		let app = app();
		let (order, _) = submitted_order(&app).await;
		let id = order["id"].as_str().unwrap();

		// Missing pickup address
		let (status, body) = call(
			&app,
			"POST",
			"/api/orders",
			Some(json!({ "customerId": "c1", "vendorId": "v1" })),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "VALIDATION_ERROR");

		// OTP of the wrong length never reaches the state machine
		let (status, body) = call(
			&app,
			"POST",
			&format!("/api/orders/{}/pickup", id),
			Some(json!({ "otp": "12" })),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "VALIDATION_ERROR");

		let (status, body) = call(
			&app,
			"POST",
			&format!("/api/orders/{}/evidence/selfie", id),
			Some(json!({ "path": "/uploads/a.jpg" })),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "VALIDATION_ERROR");

		let (status, body) = call(
			&app,
			"POST",
			&format!("/api/orders/{}/quote", id),
			Some(json!({ "notes": "restring" })),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "VALIDATION_ERROR");
	}

	#[tokio::test]
	async fn test_unknown_records_are_not_found() {
		let app = app();

		let (status, body) = call(&app, "GET", "/api/orders/missing", None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["error"], "ORDER_NOT_FOUND");

		let (status, body) = call(&app, "GET", "/api/riders/missing", None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["error"], "RIDER_NOT_FOUND");

		let (status, body) = call(&app, "GET", "/api/vendors/missing/earnings", None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["error"], "VENDOR_NOT_FOUND");

		let (status, body) = call(
			&app,
			"POST",
			"/api/orders",
			Some(json!({
				"customerId": "c1",
				"vendorId": "missing",
				"pickupAddress": "Court 1"
			})),
		)
		.await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["error"], "VENDOR_NOT_FOUND");
	}

	#[tokio::test]
	async fn test_quote_and_evidence() {
		let app = app();
		let (order, _) = submitted_order(&app).await;
		let id = order["id"].as_str().unwrap();

		let (status, quoted) = call(
			&app,
			"POST",
			&format!("/api/orders/{}/quote", id),
			Some(json!({ "amount": 650, "notes": "Frame crack" })),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(quoted["quoteStatus"], "proposed");
		assert_eq!(quoted["vendorNotes"], "Frame crack");

		let (status, accepted) = call(
			&app,
			"POST",
			&format!("/api/orders/{}/vendor-accept", id),
			None,
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(accepted["quoteStatus"], "accepted");

		let (status, body) = call(
			&app,
			"POST",
			&format!("/api/orders/{}/vendor-reject", id),
			None,
		)
		.await;
		assert_eq!(status, StatusCode::CONFLICT);
		assert_eq!(body["error"], "INVALID_TRANSITION");

		let (status, with_photo) = call(
			&app,
			"POST",
			&format!("/api/orders/{}/evidence/pickup", id),
			Some(json!({ "path": "/uploads/pickup.jpg" })),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(with_photo["pickupEvidenceImage"], "/uploads/pickup.jpg");
	}

	#[tokio::test]
	async fn test_list_orders_by_status() {
		let app = app();
		let (order, vendor_id) = submitted_order(&app).await;

		let (status, orders) = call(&app, "GET", "/api/orders?status=pending", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(orders.as_array().unwrap().len(), 1);
		assert_eq!(orders[0]["id"], order["id"]);

		let (_, orders) = call(
			&app,
			"GET",
			&format!("/api/orders?vendorId={}&status=completed", vendor_id),
			None,
		)
		.await;
		assert!(orders.as_array().unwrap().is_empty());

		let (status, body) = call(&app, "GET", "/api/orders?status=lost", None).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "VALIDATION_ERROR");
	}
}
