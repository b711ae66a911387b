//! Order handler for the OTP-gated repair workflow.
//!
//! Covers submission and the five status steps that follow it. Each handoff
//! step consumes the code issued by the step before it and issues the code
//! for the next handoff. Parties are notified after the change is persisted.

use super::{PartyHandler, WorkflowError};
use crate::durations;
use crate::otp::OtpGenerator;
use crate::state::OrderStateMachine;
use chrono::Utc;
use repair_notify::NotificationService;
use repair_types::{
	truncate_id, NewOrderRequest, Notification, Order, OrderFilter, OrderStatus, OrderSummary,
	OtpKind, PaymentStatus, QuoteStatus, Recipient,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

pub struct OrderHandler {
	state_machine: Arc<OrderStateMachine>,
	parties: Arc<PartyHandler>,
	otp: Arc<dyn OtpGenerator>,
	notifications: Arc<NotificationService>,
}

impl OrderHandler {
	pub fn new(
		state_machine: Arc<OrderStateMachine>,
		parties: Arc<PartyHandler>,
		otp: Arc<dyn OtpGenerator>,
		notifications: Arc<NotificationService>,
	) -> Self {
		Self {
			state_machine,
			parties,
			otp,
			notifications,
		}
	}

	/// Creates a pending order, issues the pickup code and assigns a rider.
	#[instrument(skip_all, fields(customer_id = %request.customer_id))]
	pub async fn submit(&self, request: NewOrderRequest) -> Result<Order, WorkflowError> {
		if request.price.is_some_and(|price| price <= Decimal::ZERO) {
			return Err(WorkflowError::Validation(
				"price must be positive".to_string(),
			));
		}

		let vendor = self.parties.get_vendor(&request.vendor_id).await?;
		let rider = self.parties.assign_rider().await?;

		let now = Utc::now();
		let order = Order {
			id: Uuid::new_v4().to_string(),
			customer_id: request.customer_id,
			vendor_id: vendor.id,
			rider_id: Some(rider.id),
			status: OrderStatus::Pending,
			pickup_address: request.pickup_address,
			delivery_address: request.delivery_address,
			racket_details: request.racket_details,
			vendor_notes: None,
			racket_image: request.racket_image,
			quote_amount: None,
			quote_status: QuoteStatus::None,
			price: request.price,
			payment_status: PaymentStatus::Pending,
			payment_reference: None,
			rider_pickup_otp: Some(self.otp.generate()),
			rider_delivery_to_vendor_otp: None,
			vendor_handover_to_rider_otp: None,
			customer_return_otp: None,
			created_at: now,
			updated_at: now,
			service_timer_start: Some(now),
			rider_pickup_start_time: None,
			rider_delivery_to_vendor_time: None,
			vendor_service_start_time: None,
			vendor_service_end_time: None,
			rider_return_to_court_time: None,
			customer_completion_time: None,
			total_rider_time: None,
			total_vendor_time: None,
			total_service_time: None,
			pickup_evidence_image: None,
			delivery_to_vendor_evidence_image: None,
			service_complete_evidence_image: None,
			return_to_court_evidence_image: None,
			customer_pickup_evidence_image: None,
		};
		self.state_machine.store_order(&order).await?;

		tracing::info!(
			order_id = %truncate_id(&order.id),
			rider_id = %truncate_id(&assigned_rider(&order)),
			"Order submitted"
		);

		self.notifications
			.send(&[
				Notification::new(
					Recipient::Rider(assigned_rider(&order)),
					&order.id,
					format!(
						"New order {} submitted by customer {}. Please pick up at {}. OTP for pickup: {}",
						order.id,
						order.customer_id,
						order.pickup_address,
						order.rider_pickup_otp.as_deref().unwrap_or_default()
					),
				),
				Notification::new(
					Recipient::Vendor(order.vendor_id.clone()),
					&order.id,
					format!(
						"New order {} has been submitted. Racket will be delivered by rider.",
						order.id
					),
				),
			])
			.await;

		Ok(order)
	}

	/// Rider collects the racket from the customer.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn confirm_pickup(&self, order_id: &str, otp: &str) -> Result<Order, WorkflowError> {
		let delivery_otp = self.otp.generate();
		let order = self
			.state_machine
			.transition_order_status(
				order_id,
				OrderStatus::Picked,
				Some((OtpKind::RiderPickup, otp)),
				|order, now| {
					order.rider_pickup_start_time = Some(now);
					order.rider_delivery_to_vendor_otp = Some(delivery_otp.clone());
				},
			)
			.await?;

		tracing::info!("Racket picked up");
		self.notifications
			.send(&[Notification::new(
				Recipient::Vendor(order.vendor_id.clone()),
				&order.id,
				format!(
					"Racket for order {} is en route. Rider will deliver with OTP: {}",
					order.id, delivery_otp
				),
			)])
			.await;

		Ok(order)
	}

	/// Rider hands the racket to the vendor; the repair clock starts.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn deliver_to_vendor(
		&self,
		order_id: &str,
		otp: &str,
	) -> Result<Order, WorkflowError> {
		let order = self
			.state_machine
			.transition_order_status(
				order_id,
				OrderStatus::InProgress,
				Some((OtpKind::RiderDeliveryToVendor, otp)),
				|order, now| {
					order.rider_delivery_to_vendor_time = Some(now);
					order.vendor_service_start_time = Some(now);
				},
			)
			.await?;

		tracing::info!("Racket delivered to vendor");
		self.notifications
			.send(&[Notification::new(
				Recipient::Customer(order.customer_id.clone()),
				&order.id,
				format!(
					"Your racket for order {} has been delivered to the vendor. Service is now in progress.",
					order.id
				),
			)])
			.await;

		Ok(order)
	}

	/// Vendor finishes the repair. Issues the handover code for the rider and
	/// the return code for the customer.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn complete_service(&self, order_id: &str) -> Result<Order, WorkflowError> {
		let handover_otp = self.otp.generate();
		let return_otp = self.otp.generate();
		let order = self
			.state_machine
			.transition_order_status(
				order_id,
				OrderStatus::AwaitingRiderPickup,
				None,
				|order, now| {
					order.vendor_service_end_time = Some(now);
					order.total_vendor_time =
						Some(durations::round2(durations::vendor_minutes(order)));
					order.vendor_handover_to_rider_otp = Some(handover_otp.clone());
					order.customer_return_otp = Some(return_otp.clone());
				},
			)
			.await?;

		tracing::info!(
			total_vendor_time = order.total_vendor_time.unwrap_or_default(),
			"Service completed"
		);
		self.notifications
			.send(&[
				Notification::new(
					Recipient::Rider(assigned_rider(&order)),
					&order.id,
					format!(
						"Racket for order {} is ready for pickup from vendor. OTP for handover: {}",
						order.id, handover_otp
					),
				),
				Notification::new(
					Recipient::Customer(order.customer_id.clone()),
					&order.id,
					format!(
						"Your racket for order {} is ready for delivery! Give OTP {} to the rider on return.",
						order.id, return_otp
					),
				),
			])
			.await;

		Ok(order)
	}

	/// Vendor hands the repaired racket to the rider.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn handover_to_rider(
		&self,
		order_id: &str,
		otp: &str,
	) -> Result<Order, WorkflowError> {
		let order = self
			.state_machine
			.transition_order_status(
				order_id,
				OrderStatus::OutForDelivery,
				Some((OtpKind::VendorHandoverToRider, otp)),
				|_, _| {},
			)
			.await?;

		tracing::info!("Racket out for delivery");
		self.notifications
			.send(&[
				Notification::new(
					Recipient::Customer(order.customer_id.clone()),
					&order.id,
					format!("Your racket for order {} is now out for delivery!", order.id),
				),
				Notification::new(
					Recipient::Rider(assigned_rider(&order)),
					&order.id,
					format!(
						"You have picked up order {} from the vendor. Please deliver to {}.",
						order.id,
						order
							.delivery_address
							.as_deref()
							.unwrap_or(&order.pickup_address)
					),
				),
			])
			.await;

		Ok(order)
	}

	/// Rider returns the racket to the customer; the order completes and its
	/// totals are fixed.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn return_to_customer(
		&self,
		order_id: &str,
		otp: &str,
	) -> Result<Order, WorkflowError> {
		let order = self
			.state_machine
			.transition_order_status(
				order_id,
				OrderStatus::Completed,
				Some((OtpKind::CustomerReturn, otp)),
				|order, now| {
					order.rider_return_to_court_time = Some(now);
					order.customer_completion_time = Some(now);
					order.total_rider_time =
						Some(durations::round2(durations::rider_minutes(order)));
					order.total_service_time =
						durations::service_minutes(order, now).map(durations::round2);
				},
			)
			.await?;

		let service = order.total_service_time.unwrap_or_default();
		let rider = order.total_rider_time.unwrap_or_default();
		let vendor = order.total_vendor_time.unwrap_or_default();
		tracing::info!(
			total_service_time = service,
			total_rider_time = rider,
			total_vendor_time = vendor,
			"Order completed"
		);
		self.notifications
			.send(&[
				Notification::new(
					Recipient::Customer(order.customer_id.clone()),
					&order.id,
					format!(
						"Your racket for order {} has been returned and service is now complete. Thank you!",
						order.id
					),
				),
				Notification::new(
					Recipient::Admin,
					&order.id,
					format!(
						"Order {} completed. Total Service Time: {} mins, Total Rider Time: {} mins, Total Vendor Time: {} mins.",
						order.id, service, rider, vendor
					),
				),
			])
			.await;

		Ok(order)
	}

	pub async fn get(&self, order_id: &str) -> Result<Order, WorkflowError> {
		Ok(self.state_machine.get_order(order_id).await?)
	}

	/// Orders matching every set field of `filter`, newest first.
	pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, WorkflowError> {
		let mut orders: Vec<Order> = self
			.state_machine
			.list_orders()
			.await?
			.into_iter()
			.filter(|order| matches_filter(order, filter))
			.collect();
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
		Ok(orders)
	}

	pub async fn summary(&self, order_id: &str) -> Result<OrderSummary, WorkflowError> {
		let order = self.state_machine.get_order(order_id).await?;
		Ok(durations::summarize(&order, Utc::now()))
	}
}

fn assigned_rider(order: &Order) -> String {
	order.rider_id.clone().unwrap_or_default()
}

fn matches_filter(order: &Order, filter: &OrderFilter) -> bool {
	filter
		.customer_id
		.as_ref()
		.is_none_or(|id| *id == order.customer_id)
		&& filter
			.vendor_id
			.as_ref()
			.is_none_or(|id| *id == order.vendor_id)
		&& filter
			.rider_id
			.as_ref()
			.is_none_or(|id| order.rider_id.as_ref() == Some(id))
		&& filter.status.is_none_or(|status| status == order.status)
}
