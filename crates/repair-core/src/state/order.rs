//! Order state machine implementation.
//!
//! Orders move forward through a fixed sequence: Pending -> Picked ->
//! InProgress -> AwaitingRiderPickup -> OutForDelivery -> Completed.
//! Every read-modify-write of an order runs under that order's async mutex, so
//! duplicate OTP submissions or a quote change racing a status change are
//! applied one after the other. An update that fails leaves the stored order
//! untouched.

use crate::otp;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use repair_storage::{StorageError, StorageService};
use repair_types::{Order, OrderStatus, OtpKind, QuoteStatus, StorageKey};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors that can occur during order state management.
#[derive(Debug, Error)]
pub enum OrderStateError {
	#[error("Storage error: {0}")]
	Storage(String),
	#[error("Invalid state transition from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	#[error("Invalid quote transition from {from} to {to}")]
	InvalidQuoteTransition { from: QuoteStatus, to: QuoteStatus },
	#[error("Invalid {0} OTP")]
	InvalidOtp(OtpKind),
	#[error("Order not found: {0}")]
	OrderNotFound(String),
}

/// Manages order state transitions and persistence
pub struct OrderStateMachine {
	storage: Arc<StorageService>,
	/// One mutex per order id that has been touched.
	locks: DashMap<String, Arc<Mutex<()>>>,
}

impl OrderStateMachine {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self {
			storage,
			locks: DashMap::new(),
		}
	}

	fn order_lock(&self, order_id: &str) -> Arc<Mutex<()>> {
		self.locks.entry(order_id.to_string()).or_default().clone()
	}

	/// Loads an order, applies `updater` and persists the result, all while
	/// holding the order's lock.
	///
	/// The updater receives the timestamp of this change. If it returns an
	/// error nothing is written. `updated_at` is set automatically.
	pub async fn update_order_with<F>(
		&self,
		order_id: &str,
		updater: F,
	) -> Result<Order, OrderStateError>
	where
		F: FnOnce(&mut Order, DateTime<Utc>) -> Result<(), OrderStateError>,
	{
		let lock = self.order_lock(order_id);
		let guard = lock.lock().await;

		let mut order = match self.get_order(order_id).await {
			Ok(order) => order,
			Err(e) => {
				drop(guard);
				drop(lock);
				// Don't keep locks around for ids that were never stored
				self.locks
					.remove_if(order_id, |_, m| Arc::strong_count(m) == 1);
				return Err(e);
			},
		};

		let now = Utc::now();
		updater(&mut order, now)?;
		order.updated_at = now;

		self.storage
			.update(StorageKey::Orders.as_str(), order_id, &order)
			.await
			.map_err(|e| map_storage_error(e, order_id))?;

		Ok(order)
	}

	/// Moves an order to `to`, applying `effects` alongside the status change.
	///
	/// When `otp` is given the code is checked against its slot first and
	/// consumed on a match; a missing or already consumed code never matches.
	/// The status transition is validated after the OTP.
	pub async fn transition_order_status<F>(
		&self,
		order_id: &str,
		to: OrderStatus,
		otp: Option<(OtpKind, &str)>,
		effects: F,
	) -> Result<Order, OrderStateError>
	where
		F: FnOnce(&mut Order, DateTime<Utc>),
	{
		self.update_order_with(order_id, |order, now| {
			if let Some((kind, candidate)) = otp {
				if !otp::consume(order.otp_slot_mut(kind), candidate) {
					return Err(OrderStateError::InvalidOtp(kind));
				}
			}

			if !Self::is_valid_transition(order.status, to) {
				return Err(OrderStateError::InvalidTransition {
					from: order.status,
					to,
				});
			}

			order.status = to;
			effects(order, now);
			Ok(())
		})
		.await
	}

	/// Checks if a status transition is valid
	pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
		// Static transition table - each state maps to allowed next states
		static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
			use OrderStatus::*;

			HashMap::from([
				(Pending, HashSet::from([Picked])),
				(Picked, HashSet::from([InProgress])),
				(InProgress, HashSet::from([AwaitingRiderPickup])),
				(AwaitingRiderPickup, HashSet::from([OutForDelivery])),
				(OutForDelivery, HashSet::from([Completed])),
				(Completed, HashSet::new()), // terminal
			])
		});

		TRANSITIONS
			.get(&from)
			.is_some_and(|allowed| allowed.contains(&to))
	}

	/// Checks if a quote status change is valid
	pub fn is_valid_quote_transition(from: QuoteStatus, to: QuoteStatus) -> bool {
		matches!(
			(from, to),
			(
				QuoteStatus::None | QuoteStatus::Proposed | QuoteStatus::Rejected,
				QuoteStatus::Proposed
			) | (
				QuoteStatus::Proposed,
				QuoteStatus::Accepted | QuoteStatus::Rejected
			)
		)
	}

	/// Gets an order by ID
	pub async fn get_order(&self, order_id: &str) -> Result<Order, OrderStateError> {
		self.storage
			.retrieve(StorageKey::Orders.as_str(), order_id)
			.await
			.map_err(|e| map_storage_error(e, order_id))
	}

	/// Stores a new order
	pub async fn store_order(&self, order: &Order) -> Result<(), OrderStateError> {
		self.storage
			.store(StorageKey::Orders.as_str(), &order.id, order)
			.await
			.map_err(|e| OrderStateError::Storage(e.to_string()))
	}

	/// Loads every stored order, in no particular order.
	pub async fn list_orders(&self) -> Result<Vec<Order>, OrderStateError> {
		self.storage
			.retrieve_all(StorageKey::Orders.as_str())
			.await
			.map_err(|e| OrderStateError::Storage(e.to_string()))
	}
}

fn map_storage_error(error: StorageError, order_id: &str) -> OrderStateError {
	match error {
		StorageError::NotFound => OrderStateError::OrderNotFound(order_id.to_string()),
		e => OrderStateError::Storage(e.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{sample_order, storage};

	fn machine() -> OrderStateMachine {
		OrderStateMachine::new(storage())
	}

	#[test]
	fn test_transition_table_only_moves_forward() {
		let statuses: Vec<_> = OrderStatus::all().collect();
		for (i, from) in statuses.iter().enumerate() {
			for (j, to) in statuses.iter().enumerate() {
				assert_eq!(
					OrderStateMachine::is_valid_transition(*from, *to),
					j == i + 1,
					"{} -> {}",
					from,
					to
				);
			}
		}
	}

	#[test]
	fn test_quote_transitions() {
		use QuoteStatus::{Accepted, Proposed, Rejected};
		let none = QuoteStatus::None;
		assert!(OrderStateMachine::is_valid_quote_transition(none, Proposed));
		assert!(OrderStateMachine::is_valid_quote_transition(Rejected, Proposed));
		assert!(OrderStateMachine::is_valid_quote_transition(Proposed, Proposed));
		assert!(OrderStateMachine::is_valid_quote_transition(Proposed, Accepted));
		assert!(OrderStateMachine::is_valid_quote_transition(Proposed, Rejected));
		assert!(!OrderStateMachine::is_valid_quote_transition(none, Accepted));
		assert!(!OrderStateMachine::is_valid_quote_transition(Accepted, Proposed));
		assert!(!OrderStateMachine::is_valid_quote_transition(Rejected, Accepted));
	}

	#[tokio::test]
	async fn test_wrong_otp_leaves_order_untouched() {
		let machine = machine();
		let order = sample_order("o1", "123456");
		machine.store_order(&order).await.unwrap();

		let result = machine
			.transition_order_status(
				"o1",
				OrderStatus::Picked,
				Some((OtpKind::RiderPickup, "999999")),
				|o, now| o.rider_pickup_start_time = Some(now),
			)
			.await;
		assert!(matches!(
			result,
			Err(OrderStateError::InvalidOtp(OtpKind::RiderPickup))
		));

		let stored = machine.get_order("o1").await.unwrap();
		assert_eq!(stored, order);
	}

	#[tokio::test]
	async fn test_invalid_transition_does_not_consume_otp() {
		let machine = machine();
		let mut order = sample_order("o1", "123456");
		order.status = OrderStatus::Picked;
		machine.store_order(&order).await.unwrap();

		let result = machine
			.transition_order_status(
				"o1",
				OrderStatus::Picked,
				Some((OtpKind::RiderPickup, "123456")),
				|_, _| {},
			)
			.await;
		assert!(matches!(
			result,
			Err(OrderStateError::InvalidTransition {
				from: OrderStatus::Picked,
				to: OrderStatus::Picked
			})
		));

		let stored = machine.get_order("o1").await.unwrap();
		assert_eq!(stored.rider_pickup_otp.as_deref(), Some("123456"));
	}

	#[tokio::test]
	async fn test_successful_transition_persists() {
		let machine = machine();
		machine
			.store_order(&sample_order("o1", "123456"))
			.await
			.unwrap();

		let updated = machine
			.transition_order_status(
				"o1",
				OrderStatus::Picked,
				Some((OtpKind::RiderPickup, "123456")),
				|o, now| o.rider_pickup_start_time = Some(now),
			)
			.await
			.unwrap();

		assert_eq!(updated.status, OrderStatus::Picked);
		assert!(updated.rider_pickup_otp.is_none());
		assert_eq!(updated.rider_pickup_start_time, Some(updated.updated_at));
		assert_eq!(machine.get_order("o1").await.unwrap(), updated);
	}

	#[tokio::test]
	async fn test_concurrent_duplicate_otp_applies_once() {
		let machine = Arc::new(machine());
		machine
			.store_order(&sample_order("o1", "123456"))
			.await
			.unwrap();

		let mut tasks = Vec::new();
		for _ in 0..8 {
			let machine = machine.clone();
			tasks.push(tokio::spawn(async move {
				machine
					.transition_order_status(
						"o1",
						OrderStatus::Picked,
						Some((OtpKind::RiderPickup, "123456")),
						|_, _| {},
					)
					.await
					.is_ok()
			}));
		}

		let mut successes = 0;
		for task in tasks {
			if task.await.unwrap() {
				successes += 1;
			}
		}
		assert_eq!(successes, 1);
		assert_eq!(
			machine.get_order("o1").await.unwrap().status,
			OrderStatus::Picked
		);
	}

	#[tokio::test]
	async fn test_missing_order_is_not_found_and_lock_released() {
		let machine = machine();
		let result = machine.update_order_with("ghost", |_, _| Ok(())).await;
		assert!(matches!(result, Err(OrderStateError::OrderNotFound(id)) if id == "ghost"));
		assert!(machine.locks.get("ghost").is_none());
	}
}
