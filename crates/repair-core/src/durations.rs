//! Elapsed-time metrics derived from an order's timestamps.
//!
//! All values are minutes. A span with a missing bound, or one that comes out
//! negative, counts as zero.

use chrono::{DateTime, Utc};
use repair_types::{Order, OrderSummary};

/// Minutes from `start` to `end`, or 0 when either is missing or the span is
/// negative.
pub fn minutes_between(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> f64 {
	let (Some(start), Some(end)) = (start, end) else {
		return 0.0;
	};
	let minutes = (end - start).num_milliseconds() as f64 / 60_000.0;
	if minutes.is_finite() && minutes > 0.0 {
		minutes
	} else {
		0.0
	}
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
	(value * 100.0).round() / 100.0
}

/// Rider minutes: pickup to vendor drop-off plus vendor handover to court.
pub fn rider_minutes(order: &Order) -> f64 {
	let outbound = minutes_between(
		order.rider_pickup_start_time,
		order.rider_delivery_to_vendor_time,
	);
	let inbound = minutes_between(
		order.vendor_service_end_time,
		order.rider_return_to_court_time,
	);
	outbound + inbound
}

pub fn vendor_minutes(order: &Order) -> f64 {
	minutes_between(order.vendor_service_start_time, order.vendor_service_end_time)
}

/// End-to-end minutes. Runs up to `now` while the order is open; `None` when
/// the timer never started.
pub fn service_minutes(order: &Order, now: DateTime<Utc>) -> Option<f64> {
	let start = order.service_timer_start?;
	let end = order.customer_completion_time.unwrap_or(now);
	Some(minutes_between(Some(start), Some(end)))
}

/// Builds the duration report for an order. Totals stored on the order take
/// precedence over recomputed ones.
pub fn summarize(order: &Order, now: DateTime<Utc>) -> OrderSummary {
	let total_rider_time = order
		.total_rider_time
		.unwrap_or_else(|| rider_minutes(order));
	let total_vendor_time = order
		.total_vendor_time
		.unwrap_or_else(|| vendor_minutes(order));
	let total_service_time = order
		.total_service_time
		.or_else(|| service_minutes(order, now));

	OrderSummary {
		order_id: order.id.clone(),
		status: order.status,
		total_rider_time: round2(total_rider_time),
		total_vendor_time: round2(total_vendor_time),
		total_service_time: total_service_time.map(round2),
	}
}
