//! Rider and vendor registry, and rider assignment for new orders.

use super::WorkflowError;
use chrono::Utc;
use rand::Rng;
use repair_storage::{StorageError, StorageService};
use repair_types::{NewRiderRequest, NewVendorRequest, Rider, StorageKey, Vendor};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub struct PartyHandler {
	storage: Arc<StorageService>,
	default_rider_name: String,
	/// Serializes assignment so an empty registry yields one default rider.
	assignment: Mutex<()>,
}

impl PartyHandler {
	pub fn new(storage: Arc<StorageService>, default_rider_name: impl Into<String>) -> Self {
		Self {
			storage,
			default_rider_name: default_rider_name.into(),
			assignment: Mutex::new(()),
		}
	}

	pub async fn register_rider(&self, request: NewRiderRequest) -> Result<Rider, WorkflowError> {
		let rider = Rider {
			id: Uuid::new_v4().to_string(),
			name: request.name,
			email: request.email,
			phone: request.phone,
			vehicle: request.vehicle,
			created_at: Utc::now(),
		};
		self.store(StorageKey::Riders, &rider.id, &rider).await?;

		tracing::info!(rider_id = %rider.id, name = %rider.name, "Registered rider");
		Ok(rider)
	}

	pub async fn register_vendor(
		&self,
		request: NewVendorRequest,
	) -> Result<Vendor, WorkflowError> {
		let vendor = Vendor {
			id: Uuid::new_v4().to_string(),
			name: request.name,
			email: request.email,
			phone: request.phone,
			address: request.address,
			shop_name: request.shop_name,
			created_at: Utc::now(),
		};
		self.store(StorageKey::Vendors, &vendor.id, &vendor).await?;

		tracing::info!(vendor_id = %vendor.id, name = %vendor.name, "Registered vendor");
		Ok(vendor)
	}

	pub async fn get_rider(&self, rider_id: &str) -> Result<Rider, WorkflowError> {
		self.storage
			.retrieve(StorageKey::Riders.as_str(), rider_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => WorkflowError::RiderNotFound(rider_id.to_string()),
				e => WorkflowError::Storage(e.to_string()),
			})
	}

	pub async fn get_vendor(&self, vendor_id: &str) -> Result<Vendor, WorkflowError> {
		self.storage
			.retrieve(StorageKey::Vendors.as_str(), vendor_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => WorkflowError::VendorNotFound(vendor_id.to_string()),
				e => WorkflowError::Storage(e.to_string()),
			})
	}

	/// Lists riders, oldest first.
	pub async fn list_riders(&self) -> Result<Vec<Rider>, WorkflowError> {
		let mut riders: Vec<Rider> = self
			.storage
			.retrieve_all(StorageKey::Riders.as_str())
			.await
			.map_err(|e| WorkflowError::Storage(e.to_string()))?;
		riders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
		Ok(riders)
	}

	/// Lists vendors, oldest first.
	pub async fn list_vendors(&self) -> Result<Vec<Vendor>, WorkflowError> {
		let mut vendors: Vec<Vendor> = self
			.storage
			.retrieve_all(StorageKey::Vendors.as_str())
			.await
			.map_err(|e| WorkflowError::Storage(e.to_string()))?;
		vendors.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
		Ok(vendors)
	}

	/// Picks a rider for a new order uniformly at random.
	///
	/// When no rider is registered a default rider is created first.
	pub async fn assign_rider(&self) -> Result<Rider, WorkflowError> {
		let _guard = self.assignment.lock().await;

		let mut riders = self.list_riders().await?;
		if riders.is_empty() {
			tracing::warn!(
				name = %self.default_rider_name,
				"No riders available, creating a default rider"
			);
			return self
				.register_rider(NewRiderRequest {
					name: self.default_rider_name.clone(),
					email: None,
					phone: None,
					vehicle: None,
				})
				.await;
		}

		let index = rand::rng().random_range(0..riders.len());
		Ok(riders.swap_remove(index))
	}

	async fn store<T: serde::Serialize>(
		&self,
		key: StorageKey,
		id: &str,
		value: &T,
	) -> Result<(), WorkflowError> {
		self.storage
			.store(key.as_str(), id, value)
			.await
			.map_err(|e| WorkflowError::Storage(e.to_string()))
	}
}
