//! Entity lifecycle driven against the state store
//!
//! ```text
//! Unmanaged ─apply─▶ Creating ─▶ Present ─apply─▶ Updating ─▶ Present
//!     ▲                              │
//!     └──────── destroy / drift ─────┘
//! ```
//!
//! A create that succeeded upstream but could not be read back stays in
//! `Creating` with its id recorded; the next `apply` updates it and the next
//! `refresh` confirms it.

use crate::error::{CloudError, Result};
use crate::resource::ManagedResource;
use crate::state::{GlobalState, ResourceState, ResourceStatus, StateLock, StateManager};

/// What a reconciliation pass did to an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Refreshed,
    /// The entity disappeared upstream and was dropped from the store
    Drifted,
    Deleted,
    /// Nothing stored under that name
    Unmanaged,
}

/// Runs lifecycle operations for one resource type and records the results
pub struct Reconciler<R: ManagedResource> {
    resource: R,
    store: StateManager,
}

impl<R: ManagedResource> Reconciler<R> {
    pub fn new(resource: R, store: StateManager) -> Self {
        Self { resource, store }
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    fn key(&self, name: &str) -> String {
        GlobalState::key(self.resource.resource_type(), name)
    }

    /// Current lifecycle status, `None` when unmanaged
    pub async fn status(&self, name: &str) -> Result<Option<ResourceStatus>> {
        let state = self.store.load().await?;
        Ok(state.get_resource(&self.key(name)).map(|r| r.status))
    }

    /// Last reconciled record, `None` when unmanaged
    pub async fn current(&self, name: &str) -> Result<Option<R::Config>> {
        let state = self.store.load().await?;
        state
            .get_resource(&self.key(name))
            .filter(|r| r.has_id())
            .map(|r| r.attributes_as())
            .transpose()
    }

    /// Create the entity if unmanaged, otherwise update it in place
    pub async fn apply(&self, name: &str, desired: &R::Config) -> Result<(Outcome, R::Config)> {
        let lock = self.store.acquire_lock().await?;
        let result = self.apply_locked(name, desired).await;
        release(lock).await;
        result
    }

    async fn apply_locked(&self, name: &str, desired: &R::Config) -> Result<(Outcome, R::Config)> {
        let key = self.key(name);
        let mut state = self.store.load().await?;

        let existing_id = state
            .get_resource(&key)
            .filter(|r| r.has_id())
            .map(|r| r.id.clone());

        if let Some(id) = existing_id {
            self.transition(&mut state, &key, ResourceStatus::Updating)
                .await?;
            tracing::info!("Updating {} {} ({})", self.resource.resource_type(), name, id);

            match self.resource.update(&id, desired).await {
                Ok(reconciled) => {
                    self.store_present(&mut state, &key, &reconciled).await?;
                    return Ok((Outcome::Updated, reconciled));
                }
                Err(err) if err.is_not_found() => {
                    tracing::info!(
                        "{} {} ({}) no longer exists upstream, creating it again",
                        self.resource.resource_type(),
                        name,
                        id
                    );
                    state.remove_resource(&key);
                }
                Err(err) => {
                    self.transition(&mut state, &key, ResourceStatus::Present)
                        .await?;
                    return Err(err);
                }
            }
        }

        state.set_resource(
            key.clone(),
            ResourceState::new(self.resource.resource_type()),
        );
        self.store.save(&state).await?;
        tracing::info!("Creating {} {}", self.resource.resource_type(), name);

        match self.resource.create(desired).await {
            Ok(reconciled) => {
                self.store_present(&mut state, &key, &reconciled).await?;
                Ok((Outcome::Created, reconciled))
            }
            Err(err) => {
                match err.created_id() {
                    // An entity that exists upstream never loses its id
                    Some(id) => {
                        tracing::warn!(
                            "{} {} was created as {} but not read back",
                            self.resource.resource_type(),
                            name,
                            id
                        );
                        let mut resource = ResourceState::new(self.resource.resource_type());
                        resource.record(id, desired)?;
                        state.set_resource(key.clone(), resource);
                    }
                    None => {
                        state.remove_resource(&key);
                    }
                }
                self.store.save(&state).await?;
                Err(err)
            }
        }
    }

    /// Re-read the entity; drops it from the store if it vanished upstream
    pub async fn refresh(&self, name: &str) -> Result<(Outcome, Option<R::Config>)> {
        let lock = self.store.acquire_lock().await?;
        let result = self.refresh_locked(name).await;
        release(lock).await;
        result
    }

    async fn refresh_locked(&self, name: &str) -> Result<(Outcome, Option<R::Config>)> {
        let key = self.key(name);
        let mut state = self.store.load().await?;

        let Some(id) = state
            .get_resource(&key)
            .filter(|r| r.has_id())
            .map(|r| r.id.clone())
        else {
            return Ok((Outcome::Unmanaged, None));
        };

        match self.resource.read(&id).await? {
            Some(current) => {
                self.store_present(&mut state, &key, &current).await?;
                Ok((Outcome::Refreshed, Some(current)))
            }
            None => {
                tracing::info!(
                    "{} {} ({}) no longer exists upstream, dropping it",
                    self.resource.resource_type(),
                    name,
                    id
                );
                state.remove_resource(&key);
                self.store.save(&state).await?;
                Ok((Outcome::Drifted, None))
            }
        }
    }

    /// Delete the entity upstream and forget it
    pub async fn destroy(&self, name: &str) -> Result<Outcome> {
        let lock = self.store.acquire_lock().await?;
        let result = self.destroy_locked(name).await;
        release(lock).await;
        result
    }

    async fn destroy_locked(&self, name: &str) -> Result<Outcome> {
        let key = self.key(name);
        let mut state = self.store.load().await?;

        let Some(existing) = state.get_resource(&key) else {
            return Ok(Outcome::Unmanaged);
        };

        if existing.has_id() {
            let id = existing.id.clone();
            self.transition(&mut state, &key, ResourceStatus::Deleting)
                .await?;
            tracing::info!("Deleting {} {} ({})", self.resource.resource_type(), name, id);

            if let Err(err) = self.resource.delete(&id).await {
                self.transition(&mut state, &key, ResourceStatus::Present)
                    .await?;
                return Err(err);
            }
        }

        state.remove_resource(&key);
        self.store.save(&state).await?;
        Ok(Outcome::Deleted)
    }

    async fn transition(
        &self,
        state: &mut GlobalState,
        key: &str,
        status: ResourceStatus,
    ) -> Result<()> {
        let Some(resource) = state.resources.get_mut(key) else {
            return Err(CloudError::State(format!("{} is not managed", key)));
        };
        resource.set_status(status);
        state.updated_at = chrono::Utc::now();
        self.store.save(state).await
    }

    async fn store_present(
        &self,
        state: &mut GlobalState,
        key: &str,
        config: &R::Config,
    ) -> Result<()> {
        let id = R::id_of(config).ok_or_else(|| {
            CloudError::State(format!("reconciled record for {} has no identifier", key))
        })?;

        let mut resource = state
            .get_resource(key)
            .cloned()
            .unwrap_or_else(|| ResourceState::new(self.resource.resource_type()));
        resource.record(id, config)?;
        resource.set_status(ResourceStatus::Present);
        state.set_resource(key, resource);
        self.store.save(state).await
    }
}

async fn release(lock: StateLock) {
    if let Err(err) = lock.release().await {
        tracing::warn!("Failed to release state lock: {}", err);
    }
}
