//! Storage service implementation using Apache OpenDAL.

use benefit_shared::config::StorageSettings;
use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use uuid::Uuid;

use super::error::{ResultExt, StorageError};

/// Storage service for attachment files.
#[derive(Clone)]
pub struct StorageService {
    operator: Operator,
    provider: &'static str,
}

impl std::fmt::Debug for StorageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageService")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

impl StorageService {
    /// Create a storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let (operator, provider) = match settings {
            StorageSettings::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                (
                    Operator::new(builder)
                        .map_err(|e| StorageError::configuration(e.to_string()))?
                        .finish(),
                    "s3",
                )
            }
            StorageSettings::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);
                (
                    Operator::new(builder)
                        .map_err(|e| StorageError::configuration(e.to_string()))?
                        .finish(),
                    "azure_blob",
                )
            }
            StorageSettings::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::configuration("invalid path"))?;
                (
                    Operator::new(services::Fs::default().root(root))
                        .map_err(|e| StorageError::configuration(e.to_string()))?
                        .finish(),
                    "local",
                )
            }
        };
        Ok(Self { operator, provider })
    }

    /// In-memory storage, used by tests and local tooling.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be built.
    pub fn in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            operator: Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish(),
            provider: "memory",
        })
    }

    /// Write a file.
    pub async fn write(&self, key: &str, content: Bytes) -> Result<(), StorageError> {
        self.operator.write(key, content).await.for_key(key)?;
        Ok(())
    }

    /// Read a whole file.
    pub async fn read(&self, key: &str) -> Result<Bytes, StorageError> {
        let buffer = self.operator.read(key).await.for_key(key)?;
        Ok(buffer.to_bytes())
    }

    /// Delete a file. Deleting a missing file succeeds.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.for_key(key)
    }

    /// Check if a file exists in storage.
    pub async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match self.operator.stat(key).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Operation(e.to_string())),
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider
    }
}

/// Storage key for an attachment.
///
/// Format: `applications/{application_id}/{attachment_id}/{sanitized_filename}`
#[must_use]
pub fn storage_key(application_id: Uuid, attachment_id: Uuid, filename: &str) -> String {
    format!(
        "applications/{application_id}/{attachment_id}/{}",
        sanitize_filename(filename)
    )
}

/// Sanitize filename for storage key.
///
/// Only ASCII alphanumeric characters, dots, hyphens, and underscores survive.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.trim_matches('.').is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}
