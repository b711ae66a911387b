//! File-based storage backend.
//!
//! Each key is stored as one JSON document under a base directory. Writes go
//! to a temporary file first and are then renamed over the target, so a crash
//! mid-write never leaves a truncated document behind.

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use async_trait::async_trait;
use repair_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use std::path::PathBuf;
use tokio::fs;

const EXTENSION: &str = "json";

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage instance rooted at `base_path`.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Makes a key filesystem-safe by replacing path and namespace separators.
	fn sanitize(key: &str) -> String {
		key.replace(['/', ':'], "_")
	}

	fn get_file_path(&self, key: &str) -> PathBuf {
		self.base_path
			.join(format!("{}.{}", Self::sanitize(key), EXTENSION))
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.get_file_path(key);

		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		fs::create_dir_all(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		// Write atomically by writing to temp file then renaming
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		fs::try_exists(self.get_file_path(key))
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	/// Lists keys by scanning the base directory.
	///
	/// Keys are reconstructed from file names, so a key whose id part
	/// contained `/` or `:` comes back with those characters replaced by `_`.
	/// Such a key still resolves to the same file.
	async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
		let file_prefix = Self::sanitize(prefix);

		let mut entries = match fs::read_dir(&self.base_path).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut keys = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new(EXTENSION)) {
				continue;
			}
			let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
				tracing::debug!("Skipping file {:?}: name is not valid UTF-8", path);
				continue;
			};
			if let Some(rest) = stem.strip_prefix(&file_prefix) {
				keys.push(format!("{}{}", prefix, rest));
			}
		}
		Ok(keys)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![Field::new("storage_path", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some(path) if !path.trim().is_empty() => Ok(()),
					_ => Err("storage_path cannot be empty".to_string()),
				}
			})],
		);
		schema.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for file storage (default: "./data/storage")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/storage");

	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))))
}

/// Registry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn storage() -> (TempDir, FileStorage) {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().join("store"));
		(dir, storage)
	}

	#[tokio::test]
	async fn test_roundtrip_and_delete() {
		let (_dir, storage) = storage();

		storage
			.set_bytes("orders:abc", b"{\"a\":1}".to_vec())
			.await
			.unwrap();
		assert!(storage.exists("orders:abc").await.unwrap());
		assert_eq!(
			storage.get_bytes("orders:abc").await.unwrap(),
			b"{\"a\":1}".to_vec()
		);

		storage.delete("orders:abc").await.unwrap();
		assert!(!storage.exists("orders:abc").await.unwrap());
		assert!(matches!(
			storage.get_bytes("orders:abc").await,
			Err(StorageError::NotFound)
		));

		// Deleting twice is fine
		storage.delete("orders:abc").await.unwrap();
	}

	#[tokio::test]
	async fn test_keys_with_prefix_scans_directory() {
		let (_dir, storage) = storage();

		assert!(storage.keys_with_prefix("orders:").await.unwrap().is_empty());

		storage.set_bytes("orders:1", vec![b'1']).await.unwrap();
		storage.set_bytes("orders:2", vec![b'2']).await.unwrap();
		storage.set_bytes("vendors:1", vec![b'3']).await.unwrap();

		let mut keys = storage.keys_with_prefix("orders:").await.unwrap();
		keys.sort();
		assert_eq!(keys, vec!["orders:1", "orders:2"]);

		for key in keys {
			assert!(storage.get_bytes(&key).await.is_ok());
		}
	}

	#[tokio::test]
	async fn test_overwrite_leaves_no_temp_file() {
		let (dir, storage) = storage();
		storage.set_bytes("riders:r1", vec![1]).await.unwrap();
		storage.set_bytes("riders:r1", vec![2]).await.unwrap();

		assert_eq!(storage.get_bytes("riders:r1").await.unwrap(), vec![2]);
		let names: Vec<_> = std::fs::read_dir(dir.path().join("store"))
			.unwrap()
			.map(|e| e.unwrap().file_name().into_string().unwrap())
			.collect();
		assert_eq!(names, vec!["riders_r1.json"]);
	}

	#[test]
	fn test_schema_rejects_empty_path() {
		let config: toml::Value = toml::from_str("storage_path = \"  \"").unwrap();
		assert!(create_storage(&config).is_err());

		let config: toml::Value = toml::from_str("storage_path = \"/tmp/x\"").unwrap();
		assert!(create_storage(&config).is_ok());
	}
}
