//! `aws_opsworks_application` resource
//!
//! Translates an [`Application`] into CreateApp/UpdateApp requests and
//! rebuilds it from DescribeApps. Mutating calls go through the
//! deadline-bounded [`retry`] loop; every create and update is followed by a
//! read so the returned record reflects what OpsWorks actually stored.

use crate::api::{
    AppRecord, AppRequest, OpsWorksApi, WireDataSource, WireEnvironmentVariable, WireSource,
    WireSslConfiguration,
};
use crate::model::{AppSource, Application, DataSource, EnvironmentVariable, SslConfiguration};
use async_trait::async_trait;
use opsflow_cloud::{CloudError, ManagedResource, Result, RetryConfig, retry};

pub const RESOURCE_TYPE: &str = "aws_opsworks_application";

/// Lifecycle adapter for OpsWorks applications
pub struct ApplicationResource<C> {
    client: C,
    retry: RetryConfig,
}

impl<C: OpsWorksApi> ApplicationResource<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Create the app and return it as read back from OpsWorks
    ///
    /// When CreateApp succeeds but the read-back fails, the error is
    /// [`CloudError::Unconfirmed`] carrying the new app id.
    pub async fn create(&self, app: &Application) -> Result<Application> {
        app.validate()?;
        let request = &build_request(app);

        tracing::info!("Creating OpsWorks app {} in stack {}", app.name, app.stack_id);
        let app_id = retry(&self.retry, "CreateApp", move || {
            self.client.create_app(request)
        })
        .await?;
        tracing::info!("Created OpsWorks app {} ({})", app.name, app_id);

        match self.read(&app_id).await {
            Ok(Some(created)) => Ok(created),
            Ok(None) => {
                let missing = CloudError::NotFound(format!("OpsWorks app {}", app_id));
                Err(CloudError::unconfirmed(app_id, missing))
            }
            Err(err) => Err(CloudError::unconfirmed(app_id, err)),
        }
    }

    /// Read the app. `Ok(None)` means it no longer exists.
    pub async fn read(&self, id: &str) -> Result<Option<Application>> {
        tracing::debug!("Reading OpsWorks app: {}", id);

        let records = match self.client.describe_apps(&[id.to_string()]).await {
            Ok(records) => records,
            Err(err) if err.is_not_found() => {
                tracing::info!("OpsWorks app not found: {}", id);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let Some(record) = records.into_iter().next() else {
            tracing::info!("OpsWorks app not found: {}", id);
            return Ok(None);
        };

        Ok(Some(application_from_record(id, record)))
    }

    /// Resend every mutable field and return the app as read back
    pub async fn update(&self, id: &str, app: &Application) -> Result<Application> {
        app.validate()?;
        let request = &build_request(app);

        tracing::info!("Updating OpsWorks app: {}", id);
        retry(&self.retry, "UpdateApp", move || {
            self.client.update_app(id, request)
        })
        .await?;

        self.read(id)
            .await?
            .ok_or_else(|| CloudError::NotFound(format!("OpsWorks app {}", id)))
    }

    /// Delete the app in a single attempt; a missing app counts as deleted
    pub async fn delete(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting OpsWorks app: {}", id);

        match self.client.delete_app(id).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() => {
                tracing::debug!("OpsWorks app {} already gone", id);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl<C: OpsWorksApi> ManagedResource for ApplicationResource<C> {
    type Config = Application;

    fn resource_type(&self) -> &str {
        RESOURCE_TYPE
    }

    fn id_of(config: &Application) -> Option<&str> {
        config.id.as_deref()
    }

    async fn create(&self, config: &Application) -> Result<Application> {
        ApplicationResource::create(self, config).await
    }

    async fn read(&self, id: &str) -> Result<Option<Application>> {
        ApplicationResource::read(self, id).await
    }

    async fn update(&self, id: &str, config: &Application) -> Result<Application> {
        ApplicationResource::update(self, id, config).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        ApplicationResource::delete(self, id).await
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

/// Certificate material is sent without surrounding whitespace or newlines
fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Build the CreateApp/UpdateApp body. Unconfigured blocks stay absent.
pub fn build_request(app: &Application) -> AppRequest {
    let ssl_configuration = app
        .ssl_configuration
        .as_ref()
        .map(|ssl| WireSslConfiguration {
            certificate: trimmed(&ssl.certificate),
            private_key: trimmed(&ssl.private_key),
            chain: ssl.chain.as_deref().and_then(trimmed),
        });

    let app_source = app
        .app_source
        .as_ref()
        .filter(|source| !source.is_empty())
        .map(|source| WireSource {
            source_type: non_empty(&source.source_type),
            url: non_empty(&source.url),
            username: non_empty(&source.username),
            password: non_empty(&source.password),
            revision: non_empty(&source.revision),
            ssh_key: non_empty(&source.ssh_key),
        });

    let data_sources = app
        .data_source
        .iter()
        .filter(|ds| ds.is_present())
        .map(|ds| WireDataSource {
            data_source_type: non_empty(&ds.data_source_type),
            database_name: non_empty(&ds.database_name),
            arn: non_empty(&ds.arn),
        })
        .collect();

    let environment = app
        .environment
        .iter()
        .map(|env| WireEnvironmentVariable {
            key: env.key.clone(),
            value: env.value.clone(),
            secure: Some(env.secure),
        })
        .collect();

    AppRequest {
        stack_id: app.stack_id.clone(),
        name: app.name.clone(),
        app_type: app.app_type.clone(),
        description: app.description.clone(),
        domains: app.domains.clone(),
        enable_ssl: app.enable_ssl,
        ssl_configuration,
        app_source,
        data_sources,
        environment,
    }
}

/// Rebuild an [`Application`] from a describe record
///
/// Sub-fields missing upstream stay absent; nothing is defaulted except
/// `enable_ssl` and `secure`, which default to true.
pub fn application_from_record(id: &str, record: AppRecord) -> Application {
    let ssl_configuration = record.ssl_configuration.and_then(|ssl| {
        let set = ssl.certificate.is_some() || ssl.private_key.is_some() || ssl.chain.is_some();
        set.then(|| SslConfiguration {
            certificate: ssl.certificate.unwrap_or_default(),
            private_key: ssl.private_key.unwrap_or_default(),
            chain: ssl.chain,
        })
    });

    let app_source = record.app_source.map(|source| AppSource {
        source_type: source.source_type,
        url: source.url,
        username: source.username,
        password: source.password,
        revision: source.revision,
        ssh_key: source.ssh_key,
    });

    let data_source = record.data_sources.into_iter().next().map(|ds| DataSource {
        data_source_type: ds.data_source_type,
        database_name: ds.database_name,
        arn: ds.arn,
    });

    let environment = record
        .environment
        .into_iter()
        .map(|env| EnvironmentVariable {
            key: env.key,
            value: env.value,
            secure: env.secure.unwrap_or(true),
        })
        .collect();

    Application {
        id: Some(record.app_id.unwrap_or_else(|| id.to_string())),
        name: record.name.unwrap_or_default(),
        app_type: record.app_type.unwrap_or_default(),
        stack_id: record.stack_id.unwrap_or_default(),
        description: record.description.unwrap_or_default(),
        domains: record.domains,
        enable_ssl: record.enable_ssl.unwrap_or(true),
        app_source,
        ssl_configuration,
        data_source,
        environment,
    }
}
