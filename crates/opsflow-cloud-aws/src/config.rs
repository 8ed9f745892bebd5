//! Wiring from opsflow settings to a ready-to-use resource

use crate::application::ApplicationResource;
use crate::error::Result;
use crate::sdk::SdkOpsWorksClient;
use opsflow_cloud::RetryConfig;
use opsflow_config::{RetrySettings, Settings};
use std::time::Duration;

/// Retry policy described by the settings file
pub fn retry_config(settings: &RetrySettings) -> RetryConfig {
    RetryConfig {
        timeout: Duration::from_secs(settings.timeout_secs),
        initial_delay: Duration::from_millis(settings.initial_delay_ms),
        max_delay: Duration::from_millis(settings.max_delay_ms),
        backoff_multiplier: settings.multiplier,
    }
}

/// Build the application resource for the given settings
pub async fn connect_with(settings: &Settings) -> ApplicationResource<SdkOpsWorksClient> {
    let client = SdkOpsWorksClient::from_settings(&settings.aws).await;
    ApplicationResource::new(client).with_retry(retry_config(&settings.retry))
}

/// Load settings from the usual locations and build the application resource
pub async fn connect() -> Result<ApplicationResource<SdkOpsWorksClient>> {
    let settings = opsflow_config::load_settings()?;
    tracing::debug!(
        "Connecting to OpsWorks (region: {})",
        settings.aws.region.as_deref().unwrap_or("default")
    );
    Ok(connect_with(&settings).await)
}
