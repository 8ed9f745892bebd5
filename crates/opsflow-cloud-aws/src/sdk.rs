//! OpsWorks client backed by the AWS SDK

use crate::api::{
    AppRecord, AppRequest, OpsWorksApi, WireDataSource, WireEnvironmentVariable, WireSource,
    WireSslConfiguration,
};
use crate::error::classify_code;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_opsworks::Client;
use aws_sdk_opsworks::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_opsworks::types::{
    App, AppType, DataSource, EnvironmentVariable, Source, SourceType, SslConfiguration,
};
use opsflow_cloud::{CloudError, Result};
use opsflow_config::AwsSettings;

/// [`OpsWorksApi`] over `aws-sdk-opsworks`
#[derive(Clone)]
pub struct SdkOpsWorksClient {
    client: Client,
}

impl SdkOpsWorksClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the shared AWS configuration chain plus overrides
    pub async fn from_settings(settings: &AwsSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &settings.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint) = &settings.endpoint_url {
            tracing::debug!("Using OpsWorks endpoint override: {}", endpoint);
            loader = loader.endpoint_url(endpoint);
        }

        let shared_config = loader.load().await;
        Self::new(Client::new(&shared_config))
    }
}

/// Classify an SDK failure. Transport-level failures are transient.
fn classify_sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> CloudError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let message = format!("{}: {}", operation, DisplayErrorContext(&err));
    match &err {
        SdkError::TimeoutError(_) => CloudError::transient("RequestTimeout", message),
        SdkError::DispatchFailure(_) => CloudError::transient("DispatchFailure", message),
        SdkError::ResponseError(_) => CloudError::transient("ResponseError", message),
        _ => classify_code(err.as_service_error().and_then(|e| e.code()), message),
    }
}

fn sdk_ssl(ssl: &WireSslConfiguration) -> Result<SslConfiguration> {
    SslConfiguration::builder()
        .certificate(ssl.certificate.clone().unwrap_or_default())
        .private_key(ssl.private_key.clone().unwrap_or_default())
        .set_chain(ssl.chain.clone())
        .build()
        .map_err(|e| CloudError::validation(e.to_string()))
}

fn sdk_source(source: &WireSource) -> Source {
    Source::builder()
        .set_type(source.source_type.as_deref().map(SourceType::from))
        .set_url(source.url.clone())
        .set_username(source.username.clone())
        .set_password(source.password.clone())
        .set_revision(source.revision.clone())
        .set_ssh_key(source.ssh_key.clone())
        .build()
}

fn sdk_data_source(data_source: &WireDataSource) -> DataSource {
    DataSource::builder()
        .set_type(data_source.data_source_type.clone())
        .set_database_name(data_source.database_name.clone())
        .set_arn(data_source.arn.clone())
        .build()
}

fn sdk_environment(variables: &[WireEnvironmentVariable]) -> Result<Vec<EnvironmentVariable>> {
    variables
        .iter()
        .map(|variable| {
            EnvironmentVariable::builder()
                .key(&variable.key)
                .value(&variable.value)
                .set_secure(variable.secure)
                .build()
                .map_err(|e| CloudError::validation(e.to_string()))
        })
        .collect()
}

/// Request body converted into SDK types
struct SdkAppBody {
    ssl_configuration: Option<SslConfiguration>,
    app_source: Option<Source>,
    data_sources: Vec<DataSource>,
    environment: Vec<EnvironmentVariable>,
}

impl SdkAppBody {
    fn from_request(request: &AppRequest) -> Result<Self> {
        Ok(Self {
            ssl_configuration: request.ssl_configuration.as_ref().map(sdk_ssl).transpose()?,
            app_source: request.app_source.as_ref().map(sdk_source),
            data_sources: request.data_sources.iter().map(sdk_data_source).collect(),
            environment: sdk_environment(&request.environment)?,
        })
    }
}

fn record_from_sdk(app: &App) -> AppRecord {
    AppRecord {
        app_id: app.app_id().map(str::to_string),
        stack_id: app.stack_id().map(str::to_string),
        name: app.name().map(str::to_string),
        app_type: app.r#type().map(|t| t.as_str().to_string()),
        description: app.description().map(str::to_string),
        domains: app.domains().to_vec(),
        enable_ssl: app.enable_ssl(),
        ssl_configuration: app.ssl_configuration().map(|ssl| WireSslConfiguration {
            certificate: Some(ssl.certificate().to_string()).filter(|s| !s.is_empty()),
            private_key: Some(ssl.private_key().to_string()).filter(|s| !s.is_empty()),
            chain: ssl.chain().filter(|s| !s.is_empty()).map(str::to_string),
        }),
        app_source: app.app_source().map(|source| WireSource {
            source_type: source.r#type().map(|t| t.as_str().to_string()),
            url: source.url().map(str::to_string),
            username: source.username().map(str::to_string),
            password: source.password().map(str::to_string),
            revision: source.revision().map(str::to_string),
            ssh_key: source.ssh_key().map(str::to_string),
        }),
        data_sources: app
            .data_sources()
            .iter()
            .map(|ds| WireDataSource {
                data_source_type: ds.r#type().map(str::to_string),
                database_name: ds.database_name().map(str::to_string),
                arn: ds.arn().map(str::to_string),
            })
            .collect(),
        environment: app
            .environment()
            .iter()
            .map(|env| WireEnvironmentVariable {
                key: env.key().to_string(),
                value: env.value().to_string(),
                secure: env.secure(),
            })
            .collect(),
    }
}

#[async_trait]
impl OpsWorksApi for SdkOpsWorksClient {
    async fn create_app(&self, request: &AppRequest) -> Result<String> {
        let body = SdkAppBody::from_request(request)?;

        let output = self
            .client
            .create_app()
            .stack_id(&request.stack_id)
            .name(&request.name)
            .r#type(AppType::from(request.app_type.as_str()))
            .description(&request.description)
            .set_domains(Some(request.domains.clone()))
            .enable_ssl(request.enable_ssl)
            .set_ssl_configuration(body.ssl_configuration)
            .set_app_source(body.app_source)
            .set_data_sources(Some(body.data_sources))
            .set_environment(Some(body.environment))
            .send()
            .await
            .map_err(|e| classify_sdk_error("CreateApp", e))?;

        output
            .app_id()
            .map(str::to_string)
            .ok_or_else(|| CloudError::fatal("MissingAppId", "CreateApp returned no app id"))
    }

    async fn describe_apps(&self, app_ids: &[String]) -> Result<Vec<AppRecord>> {
        let output = self
            .client
            .describe_apps()
            .set_app_ids(Some(app_ids.to_vec()))
            .send()
            .await
            .map_err(|e| classify_sdk_error("DescribeApps", e))?;

        Ok(output.apps().iter().map(record_from_sdk).collect())
    }

    async fn update_app(&self, app_id: &str, request: &AppRequest) -> Result<()> {
        let body = SdkAppBody::from_request(request)?;

        self.client
            .update_app()
            .app_id(app_id)
            .name(&request.name)
            .r#type(AppType::from(request.app_type.as_str()))
            .description(&request.description)
            .set_domains(Some(request.domains.clone()))
            .enable_ssl(request.enable_ssl)
            .set_ssl_configuration(body.ssl_configuration)
            .set_app_source(body.app_source)
            .set_data_sources(Some(body.data_sources))
            .set_environment(Some(body.environment))
            .send()
            .await
            .map_err(|e| classify_sdk_error("UpdateApp", e))?;

        Ok(())
    }

    async fn delete_app(&self, app_id: &str) -> Result<()> {
        self.client
            .delete_app()
            .app_id(app_id)
            .send()
            .await
            .map_err(|e| classify_sdk_error("DeleteApp", e))?;

        Ok(())
    }
}
