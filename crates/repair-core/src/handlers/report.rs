//! Vendor revenue reporting.

use super::{PartyHandler, WorkflowError};
use crate::state::OrderStateMachine;
use repair_types::{OrderStatus, VendorEarnings};
use rust_decimal::Decimal;
use std::sync::Arc;

pub struct ReportHandler {
	state_machine: Arc<OrderStateMachine>,
	parties: Arc<PartyHandler>,
}

impl ReportHandler {
	pub fn new(state_machine: Arc<OrderStateMachine>, parties: Arc<PartyHandler>) -> Self {
		Self {
			state_machine,
			parties,
		}
	}

	/// Sums a vendor's orders. Revenue counts paid orders; everything unpaid
	/// is outstanding. Orders without a price count as zero.
	pub async fn vendor_earnings(&self, vendor_id: &str) -> Result<VendorEarnings, WorkflowError> {
		self.parties.get_vendor(vendor_id).await?;

		let orders = self.state_machine.list_orders().await?;
		let mut earnings = VendorEarnings {
			vendor_id: vendor_id.to_string(),
			total_orders: 0,
			completed_orders: 0,
			paid_orders: 0,
			total_revenue: Decimal::ZERO,
			outstanding_to_collect: Decimal::ZERO,
		};

		for order in orders.iter().filter(|o| o.vendor_id == vendor_id) {
			let price = order.price.unwrap_or_default();
			earnings.total_orders += 1;
			if order.status == OrderStatus::Completed {
				earnings.completed_orders += 1;
			}
			if order.is_paid() {
				earnings.paid_orders += 1;
				earnings.total_revenue += price;
			} else {
				earnings.outstanding_to_collect += price;
			}
		}

		Ok(earnings)
	}
}
