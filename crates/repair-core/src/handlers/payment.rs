//! Stub payment recording.

use super::WorkflowError;
use crate::state::OrderStateMachine;
use repair_types::{truncate_id, Order, PaymentRequest, PaymentStatus};
use std::sync::Arc;
use tracing::instrument;

pub struct PaymentHandler {
	state_machine: Arc<OrderStateMachine>,
}

impl PaymentHandler {
	pub fn new(state_machine: Arc<OrderStateMachine>) -> Self {
		Self { state_machine }
	}

	/// Marks an order paid. Paying an already paid order returns it unchanged.
	///
	/// Without a reference one is generated as `STUB-<unix millis>`.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn pay(&self, order_id: &str, request: PaymentRequest) -> Result<Order, WorkflowError> {
		let order = self.state_machine.get_order(order_id).await?;
		if order.is_paid() {
			tracing::debug!("Order already paid");
			return Ok(order);
		}

		let mut newly_paid = false;
		let order = self
			.state_machine
			.update_order_with(order_id, |order, now| {
				// Re-checked under the lock; a concurrent payment may have won
				if order.is_paid() {
					return Ok(());
				}
				order.payment_status = PaymentStatus::Paid;
				order.payment_reference = Some(
					request
						.payment_reference
						.unwrap_or_else(|| format!("STUB-{}", now.timestamp_millis())),
				);
				newly_paid = true;
				Ok(())
			})
			.await?;

		if newly_paid {
			tracing::info!(
				reference = order.payment_reference.as_deref().unwrap_or_default(),
				"Payment recorded"
			);
		}
		Ok(order)
	}
}
