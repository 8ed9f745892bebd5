//! Upstream OpsWorks API surface
//!
//! The wire types mirror the OpsWorks `App` structures: every sub-field is
//! optional, exactly as the service returns them.

use async_trait::async_trait;
use opsflow_cloud::Result;

/// The four OpsWorks app operations
///
/// Implementations classify failures into [`opsflow_cloud::CloudError`]:
/// `NotFound` for missing apps, `Transient` for retryable failures and
/// `Fatal` for everything else.
#[async_trait]
pub trait OpsWorksApi: Send + Sync {
    /// CreateApp; returns the assigned app id
    async fn create_app(&self, request: &AppRequest) -> Result<String>;

    /// DescribeApps for exactly the given ids
    async fn describe_apps(&self, app_ids: &[String]) -> Result<Vec<AppRecord>>;

    /// UpdateApp; `stack_id` in the request is ignored
    async fn update_app(&self, app_id: &str, request: &AppRequest) -> Result<()>;

    /// DeleteApp
    async fn delete_app(&self, app_id: &str) -> Result<()>;
}

/// Body shared by CreateApp and UpdateApp
#[derive(Debug, Clone, PartialEq)]
pub struct AppRequest {
    pub stack_id: String,
    pub name: String,
    pub app_type: String,
    pub description: String,
    pub domains: Vec<String>,
    pub enable_ssl: bool,
    pub ssl_configuration: Option<WireSslConfiguration>,
    pub app_source: Option<WireSource>,
    pub data_sources: Vec<WireDataSource>,
    pub environment: Vec<WireEnvironmentVariable>,
}

/// One entry of a DescribeApps response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppRecord {
    pub app_id: Option<String>,
    pub stack_id: Option<String>,
    pub name: Option<String>,
    pub app_type: Option<String>,
    pub description: Option<String>,
    pub domains: Vec<String>,
    pub enable_ssl: Option<bool>,
    pub ssl_configuration: Option<WireSslConfiguration>,
    pub app_source: Option<WireSource>,
    pub data_sources: Vec<WireDataSource>,
    pub environment: Vec<WireEnvironmentVariable>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireSource {
    pub source_type: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub revision: Option<String>,
    pub ssh_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireSslConfiguration {
    pub certificate: Option<String>,
    pub private_key: Option<String>,
    pub chain: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireDataSource {
    pub data_source_type: Option<String>,
    pub database_name: Option<String>,
    pub arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WireEnvironmentVariable {
    pub key: String,
    pub value: String,
    pub secure: Option<bool>,
}

impl AppRequest {
    /// What a describe call would report right after this request was applied
    pub fn to_record(&self, app_id: impl Into<String>) -> AppRecord {
        AppRecord {
            app_id: Some(app_id.into()),
            stack_id: Some(self.stack_id.clone()),
            name: Some(self.name.clone()),
            app_type: Some(self.app_type.clone()),
            description: Some(self.description.clone()),
            domains: self.domains.clone(),
            enable_ssl: Some(self.enable_ssl),
            ssl_configuration: self.ssl_configuration.clone(),
            app_source: self.app_source.clone(),
            data_sources: self.data_sources.clone(),
            environment: self.environment.clone(),
        }
    }
}
