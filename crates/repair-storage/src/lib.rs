//! Key-value persistence for orders, riders and vendors.
//!
//! Backends only deal in raw bytes under string keys. [`StorageService`]
//! layers JSON encoding and `namespace:id` keys on top, which is all the
//! workflow ever sees.

use async_trait::async_trait;
use repair_types::{ConfigSchema, ImplementationRegistry};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub mod implementations {
	pub mod file;
	pub mod memory;
}

#[derive(Debug, Error)]
pub enum StorageError {
	#[error("Not found")]
	NotFound,
	/// A stored document could not be encoded or decoded.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// The backend itself failed (I/O and the like).
	#[error("Backend error: {0}")]
	Backend(String),
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Byte-level operations every storage backend provides.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Returns `NotFound` for a missing key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes, replacing any previous value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Removes a key. Removing a missing key is not an error.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Lists every stored key starting with `prefix`, in no particular order.
	async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Creates a backend from its `[storage.implementations.<name>]` table.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Every storage backend compiled into this crate, by name.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// Typed JSON documents on top of a byte backend.
pub struct StorageService {
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn key(namespace: &str, id: &str) -> String {
		format!("{}:{}", namespace, id)
	}

	fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
		serde_json::to_vec(value).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StorageError> {
		serde_json::from_slice(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Creates or overwrites a document.
	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		value: &T,
	) -> Result<(), StorageError> {
		self.backend
			.set_bytes(&Self::key(namespace, id), Self::encode(value)?)
			.await
	}

	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(&Self::key(namespace, id)).await?;
		Self::decode(&bytes)
	}

	/// Loads every document in a namespace.
	///
	/// Keys that disappear between listing and reading are skipped.
	pub async fn retrieve_all<T: DeserializeOwned>(
		&self,
		namespace: &str,
	) -> Result<Vec<T>, StorageError> {
		let prefix = format!("{}:", namespace);
		let keys = self.backend.keys_with_prefix(&prefix).await?;

		let mut values = Vec::with_capacity(keys.len());
		for key in keys {
			match self.backend.get_bytes(&key).await {
				Ok(bytes) => values.push(Self::decode(&bytes)?),
				Err(StorageError::NotFound) => {
					tracing::debug!(%key, "Key vanished during listing");
				},
				Err(e) => return Err(e),
			}
		}
		Ok(values)
	}

	/// Overwrites an existing document; `NotFound` if there is none.
	pub async fn update<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		value: &T,
	) -> Result<(), StorageError> {
		let key = Self::key(namespace, id);
		if !self.backend.exists(&key).await? {
			return Err(StorageError::NotFound);
		}
		self.backend.set_bytes(&key, Self::encode(value)?).await
	}
}
