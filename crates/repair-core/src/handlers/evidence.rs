//! Evidence photo paths for workflow steps.

use super::WorkflowError;
use crate::state::OrderStateMachine;
use repair_types::{truncate_id, EvidenceKind, Order};
use std::sync::Arc;
use tracing::instrument;

pub struct EvidenceHandler {
	state_machine: Arc<OrderStateMachine>,
}

impl EvidenceHandler {
	pub fn new(state_machine: Arc<OrderStateMachine>) -> Self {
		Self { state_machine }
	}

	/// Stores the path of an already uploaded photo, replacing any earlier
	/// one for the same step. The path is not checked.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id), kind = ?kind))]
	pub async fn attach(
		&self,
		order_id: &str,
		kind: EvidenceKind,
		path: String,
	) -> Result<Order, WorkflowError> {
		let order = self
			.state_machine
			.update_order_with(order_id, |order, _| {
				*order.evidence_slot_mut(kind) = Some(path);
				Ok(())
			})
			.await?;

		tracing::debug!("Evidence attached");
		Ok(order)
	}
}
