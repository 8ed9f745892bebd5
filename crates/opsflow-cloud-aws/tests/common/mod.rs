//! In-memory OpsWorks API for tests

use async_trait::async_trait;
use opsflow_cloud::{CloudError, Result};
use opsflow_cloud_aws::{AppRecord, AppRequest, OpsWorksApi};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// How a scripted operation should fail
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
pub enum FailureMode {
    /// Throttle every call
    AlwaysTransient,
    /// Throttle the next N calls, then succeed
    TransientTimes(usize),
    /// Reject with a non-retryable code
    Fatal,
}

impl FailureMode {
    /// Error for this call, or `None` once the failure budget is spent
    fn next_error(&mut self, attempt: usize) -> Option<CloudError> {
        match self {
            FailureMode::AlwaysTransient => Some(CloudError::transient(
                "ThrottlingException",
                format!("Rate exceeded (attempt {})", attempt),
            )),
            FailureMode::TransientTimes(0) => None,
            FailureMode::TransientTimes(remaining) => {
                *remaining -= 1;
                Some(CloudError::transient(
                    "ThrottlingException",
                    format!("Rate exceeded (attempt {})", attempt),
                ))
            }
            FailureMode::Fatal => Some(CloudError::fatal(
                "ValidationException",
                "Unable to find stack with ID",
            )),
        }
    }
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub create_app: usize,
    pub describe_apps: usize,
    pub update_app: usize,
    pub delete_app: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.create_app + self.describe_apps + self.update_app + self.delete_app
    }
}

/// Mock OpsWorks client. Clones share state.
#[derive(Clone, Default)]
pub struct MockOpsWorks {
    apps: Arc<Mutex<HashMap<String, AppRecord>>>,
    next_id: Arc<Mutex<usize>>,
    create_failure: Arc<Mutex<Option<FailureMode>>>,
    update_failure: Arc<Mutex<Option<FailureMode>>>,
    describe_failure: Arc<Mutex<Option<FailureMode>>>,
    call_count: Arc<Mutex<CallCounts>>,
    captured_requests: Arc<Mutex<Vec<AppRequest>>>,
}

#[allow(dead_code)]
impl MockOpsWorks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_create_failure(self, mode: FailureMode) -> Self {
        *self.create_failure.try_lock().unwrap() = Some(mode);
        self
    }

    pub fn with_update_failure(self, mode: FailureMode) -> Self {
        *self.update_failure.try_lock().unwrap() = Some(mode);
        self
    }

    pub fn with_describe_failure(self, mode: FailureMode) -> Self {
        *self.describe_failure.try_lock().unwrap() = Some(mode);
        self
    }

    pub async fn calls(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Create/update bodies in call order
    pub async fn captured_requests(&self) -> Vec<AppRequest> {
        self.captured_requests.lock().await.clone()
    }

    pub async fn stored(&self, app_id: &str) -> Option<AppRecord> {
        self.apps.lock().await.get(app_id).cloned()
    }

    /// Simulate the app being removed outside of opsflow
    pub async fn remove_app(&self, app_id: &str) {
        self.apps.lock().await.remove(app_id);
    }
}

fn not_found(app_id: &str) -> CloudError {
    CloudError::NotFound(format!("Unable to find app with ID {}", app_id))
}

#[async_trait]
impl OpsWorksApi for MockOpsWorks {
    async fn create_app(&self, request: &AppRequest) -> Result<String> {
        let attempt = {
            let mut calls = self.call_count.lock().await;
            calls.create_app += 1;
            calls.create_app
        };
        self.captured_requests.lock().await.push(request.clone());

        if let Some(mode) = self.create_failure.lock().await.as_mut() {
            if let Some(err) = mode.next_error(attempt) {
                return Err(err);
            }
        }

        let app_id = {
            let mut next = self.next_id.lock().await;
            *next += 1;
            format!("app-{:04}", *next)
        };
        self.apps
            .lock()
            .await
            .insert(app_id.clone(), request.to_record(&app_id));
        Ok(app_id)
    }

    async fn describe_apps(&self, app_ids: &[String]) -> Result<Vec<AppRecord>> {
        let attempt = {
            let mut calls = self.call_count.lock().await;
            calls.describe_apps += 1;
            calls.describe_apps
        };

        if let Some(mode) = self.describe_failure.lock().await.as_mut() {
            if let Some(err) = mode.next_error(attempt) {
                return Err(err);
            }
        }

        let apps = self.apps.lock().await;
        app_ids
            .iter()
            .map(|id| apps.get(id).cloned().ok_or_else(|| not_found(id)))
            .collect()
    }

    async fn update_app(&self, app_id: &str, request: &AppRequest) -> Result<()> {
        let attempt = {
            let mut calls = self.call_count.lock().await;
            calls.update_app += 1;
            calls.update_app
        };
        self.captured_requests.lock().await.push(request.clone());

        if let Some(mode) = self.update_failure.lock().await.as_mut() {
            if let Some(err) = mode.next_error(attempt) {
                return Err(err);
            }
        }

        let mut apps = self.apps.lock().await;
        let existing = apps.get_mut(app_id).ok_or_else(|| not_found(app_id))?;
        let stack_id = existing.stack_id.clone();
        *existing = AppRecord {
            stack_id,
            ..request.to_record(app_id)
        };
        Ok(())
    }

    async fn delete_app(&self, app_id: &str) -> Result<()> {
        self.call_count.lock().await.delete_app += 1;

        self.apps
            .lock()
            .await
            .remove(app_id)
            .map(|_| ())
            .ok_or_else(|| not_found(app_id))
    }
}
