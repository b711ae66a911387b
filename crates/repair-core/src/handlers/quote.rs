//! Vendor quote sub-flow.
//!
//! Runs alongside the status chain: a vendor may propose a price at any point
//! and the proposal is then accepted or rejected. A rejected quote may be
//! replaced by a new proposal.

use super::WorkflowError;
use crate::state::{OrderStateError, OrderStateMachine};
use repair_types::{truncate_id, Order, QuoteRequest, QuoteStatus};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::instrument;

pub struct QuoteHandler {
	state_machine: Arc<OrderStateMachine>,
}

impl QuoteHandler {
	pub fn new(state_machine: Arc<OrderStateMachine>) -> Self {
		Self { state_machine }
	}

	/// Records a proposed amount; the order's price follows the proposal.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn propose(
		&self,
		order_id: &str,
		request: QuoteRequest,
	) -> Result<Order, WorkflowError> {
		let amount = request
			.amount
			.ok_or_else(|| WorkflowError::Validation("amount is required".to_string()))?;
		if amount <= Decimal::ZERO {
			return Err(WorkflowError::Validation(
				"amount must be positive".to_string(),
			));
		}

		let order = self
			.set_quote_status(order_id, QuoteStatus::Proposed, |order| {
				order.quote_amount = Some(amount);
				order.price = Some(amount);
				if request.notes.is_some() {
					order.vendor_notes = request.notes;
				}
			})
			.await?;

		tracing::info!(%amount, "Quote proposed");
		Ok(order)
	}

	/// Accepts the proposed quote. Price falls back to the quoted amount if
	/// it was never set.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn accept(&self, order_id: &str) -> Result<Order, WorkflowError> {
		let order = self
			.set_quote_status(order_id, QuoteStatus::Accepted, |order| {
				if order.price.is_none() {
					order.price = order.quote_amount;
				}
			})
			.await?;

		tracing::info!("Quote accepted");
		Ok(order)
	}

	/// Rejects the proposed quote; the price is left as it was.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn reject(&self, order_id: &str) -> Result<Order, WorkflowError> {
		let order = self
			.set_quote_status(order_id, QuoteStatus::Rejected, |_| {})
			.await?;

		tracing::info!("Quote rejected");
		Ok(order)
	}

	async fn set_quote_status<F>(
		&self,
		order_id: &str,
		to: QuoteStatus,
		effects: F,
	) -> Result<Order, WorkflowError>
	where
		F: FnOnce(&mut Order),
	{
		let order = self
			.state_machine
			.update_order_with(order_id, |order, _| {
				if !OrderStateMachine::is_valid_quote_transition(order.quote_status, to) {
					return Err(OrderStateError::InvalidQuoteTransition {
						from: order.quote_status,
						to,
					});
				}
				order.quote_status = to;
				effects(order);
				Ok(())
			})
			.await?;
		Ok(order)
	}
}
