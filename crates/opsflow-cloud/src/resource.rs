//! Managed resource lifecycle trait

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Lifecycle contract for a single managed resource type
///
/// Each resource adapter (OpsWorks application, ...) implements this trait.
/// The orchestrator guarantees at most one in-flight operation per entity, so
/// implementations hold no per-entity state between calls.
#[async_trait]
pub trait ManagedResource: Send + Sync {
    /// Canonical configuration record for this resource type
    type Config: Clone + Send + Sync + Serialize + DeserializeOwned;

    /// Resource type name (e.g., "aws_opsworks_application")
    fn resource_type(&self) -> &str;

    /// Upstream identifier carried by a reconciled record, if any
    fn id_of(config: &Self::Config) -> Option<&str>;

    /// Create the resource and return the reconciled record
    ///
    /// If the resource was created but could not be read back, return
    /// [`CloudError::Unconfirmed`](crate::CloudError::Unconfirmed) with its id.
    async fn create(&self, config: &Self::Config) -> Result<Self::Config>;

    /// Read the resource back. `Ok(None)` means it no longer exists upstream.
    async fn read(&self, id: &str) -> Result<Option<Self::Config>>;

    /// Update the resource in place and return the reconciled record
    async fn update(&self, id: &str, config: &Self::Config) -> Result<Self::Config>;

    /// Delete the resource. Deleting something already gone succeeds.
    async fn delete(&self, id: &str) -> Result<()>;
}
