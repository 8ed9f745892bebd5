//! External attribute layouts for `aws_opsworks_application`
//!
//! Two layouts have been used for the same resource over time:
//!
//! - nested: `app_source`, `ssl_configuration` and `data_source` as lists of
//!   blocks
//! - flat: `app_source_*`, `ssl_*` and `data_source_*` attributes
//!
//! Both convert into the canonical [`Application`] and back. The block-count
//! and half-configured SSL checks happen here, before anything reaches the
//! upstream API.

use crate::model::{AppSource, Application, DataSource, EnvironmentVariable, SslConfiguration};
use opsflow_cloud::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

fn default_true() -> bool {
    true
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Nested-block layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedApplicationSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(rename = "type")]
    pub app_type: String,

    pub stack_id: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub domains: Vec<String>,

    #[serde(default = "default_true")]
    pub enable_ssl: bool,

    #[serde(default)]
    pub app_source: Vec<AppSource>,

    #[serde(default)]
    pub ssl_configuration: Vec<SslConfiguration>,

    #[serde(default)]
    pub data_source: Vec<DataSource>,

    #[serde(default)]
    pub environment: BTreeSet<EnvironmentVariable>,
}

impl TryFrom<NestedApplicationSchema> for Application {
    type Error = CloudError;

    fn try_from(schema: NestedApplicationSchema) -> Result<Self> {
        if schema.app_source.len() > 1 {
            return Err(CloudError::validation("Only one app_source is permitted"));
        }
        if schema.ssl_configuration.len() > 1 {
            return Err(CloudError::validation(
                "Only one ssl_configuration is permitted",
            ));
        }

        let mut data_sources = schema.data_source.into_iter().filter(DataSource::is_present);
        let data_source = data_sources.next();
        if data_sources.next().is_some() {
            return Err(CloudError::validation("Only one data_source is permitted"));
        }

        let app = Application {
            id: schema.id,
            name: schema.name,
            app_type: schema.app_type,
            stack_id: schema.stack_id,
            description: schema.description,
            domains: schema.domains,
            enable_ssl: schema.enable_ssl,
            app_source: schema
                .app_source
                .into_iter()
                .next()
                .filter(|source| !source.is_empty()),
            ssl_configuration: schema.ssl_configuration.into_iter().next(),
            data_source,
            environment: schema.environment,
        };
        app.validate()?;
        Ok(app)
    }
}

impl From<&Application> for NestedApplicationSchema {
    fn from(app: &Application) -> Self {
        Self {
            id: app.id.clone(),
            name: app.name.clone(),
            app_type: app.app_type.clone(),
            stack_id: app.stack_id.clone(),
            description: app.description.clone(),
            domains: app.domains.clone(),
            enable_ssl: app.enable_ssl,
            app_source: app.app_source.iter().cloned().collect(),
            ssl_configuration: app.ssl_configuration.iter().cloned().collect(),
            data_source: app.data_source.iter().cloned().collect(),
            environment: app.environment.clone(),
        }
    }
}

/// Flat-attribute layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatApplicationSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(rename = "type")]
    pub app_type: String,

    pub stack_id: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub domains: Vec<String>,

    #[serde(default = "default_true")]
    pub enable_ssl: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_source_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_source_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_source_revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_source_ssh_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_chain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_database_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_arn: Option<String>,

    #[serde(default)]
    pub environment: BTreeSet<EnvironmentVariable>,
}

impl TryFrom<FlatApplicationSchema> for Application {
    type Error = CloudError;

    fn try_from(schema: FlatApplicationSchema) -> Result<Self> {
        let app_source = Some(AppSource {
            source_type: non_empty(schema.app_source_type),
            url: non_empty(schema.app_source_url),
            username: non_empty(schema.app_source_username),
            password: non_empty(schema.app_source_password),
            revision: non_empty(schema.app_source_revision),
            ssh_key: non_empty(schema.app_source_ssh_key),
        })
        .filter(|source| !source.is_empty());

        let ssl_configuration = match (
            non_empty(schema.ssl_certificate),
            non_empty(schema.ssl_private_key),
            non_empty(schema.ssl_chain),
        ) {
            (Some(certificate), Some(private_key), chain) => Some(SslConfiguration {
                certificate,
                private_key,
                chain,
            }),
            (None, None, None) => None,
            _ => {
                return Err(CloudError::validation(
                    "ssl_certificate and ssl_private_key must be set together",
                ));
            }
        };

        let data_source = Some(DataSource {
            data_source_type: non_empty(schema.data_source_type),
            database_name: non_empty(schema.data_source_database_name),
            arn: non_empty(schema.data_source_arn),
        })
        .filter(DataSource::is_present);

        let app = Application {
            id: schema.id,
            name: schema.name,
            app_type: schema.app_type,
            stack_id: schema.stack_id,
            description: schema.description,
            domains: schema.domains,
            enable_ssl: schema.enable_ssl,
            app_source,
            ssl_configuration,
            data_source,
            environment: schema.environment,
        };
        app.validate()?;
        Ok(app)
    }
}

impl From<&Application> for FlatApplicationSchema {
    fn from(app: &Application) -> Self {
        let source = app.app_source.clone().unwrap_or_default();
        let data_source = app.data_source.clone().unwrap_or_default();
        let (ssl_certificate, ssl_private_key, ssl_chain) = match &app.ssl_configuration {
            Some(ssl) => (
                Some(ssl.certificate.clone()),
                Some(ssl.private_key.clone()),
                ssl.chain.clone(),
            ),
            None => (None, None, None),
        };

        Self {
            id: app.id.clone(),
            name: app.name.clone(),
            app_type: app.app_type.clone(),
            stack_id: app.stack_id.clone(),
            description: app.description.clone(),
            domains: app.domains.clone(),
            enable_ssl: app.enable_ssl,
            app_source_type: source.source_type,
            app_source_url: source.url,
            app_source_username: source.username,
            app_source_password: source.password,
            app_source_revision: source.revision,
            app_source_ssh_key: source.ssh_key,
            ssl_certificate,
            ssl_private_key,
            ssl_chain,
            data_source_type: data_source.data_source_type,
            data_source_database_name: data_source.database_name,
            data_source_arn: data_source.arn,
            environment: app.environment.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::build_request;
    use serde_json::json;

    fn nested(value: serde_json::Value) -> Result<Application> {
        let schema: NestedApplicationSchema = serde_json::from_value(value).unwrap();
        Application::try_from(schema)
    }

    fn flat(value: serde_json::Value) -> Result<Application> {
        let schema: FlatApplicationSchema = serde_json::from_value(value).unwrap();
        Application::try_from(schema)
    }

    #[test]
    fn test_nested_rejects_two_app_sources() {
        let result = nested(json!({
            "name": "web", "type": "rails", "stack_id": "stack-1",
            "app_source": [
                {"type": "git", "url": "https://github.com/example/a.git"},
                {"type": "git", "url": "https://github.com/example/b.git"}
            ]
        }));
        assert!(
            matches!(result, Err(CloudError::Validation(ref msg)) if msg.contains("app_source"))
        );
    }

    #[test]
    fn test_nested_ssl_block_without_private_key_is_a_validation_error() {
        let result = nested(json!({
            "name": "web", "type": "rails", "stack_id": "stack-1",
            "ssl_configuration": [{"certificate": "CERT"}]
        }));
        assert!(matches!(
            result,
            Err(CloudError::Validation(ref msg)) if msg.contains("private_key")
        ));
    }

    #[test]
    fn test_nested_rejects_two_ssl_blocks() {
        let result = nested(json!({
            "name": "web", "type": "rails", "stack_id": "stack-1",
            "ssl_configuration": [
                {"certificate": "CERT-A", "private_key": "KEY-A"},
                {"certificate": "CERT-B", "private_key": "KEY-B"}
            ]
        }));
        assert!(matches!(
            result,
            Err(CloudError::Validation(ref msg)) if msg.contains("ssl_configuration")
        ));
    }

    #[test]
    fn test_nested_rejects_two_present_data_sources() {
        let result = nested(json!({
            "name": "web", "type": "rails", "stack_id": "stack-1",
            "data_source": [
                {"type": "RdsDbInstance", "arn": "arn:aws:rds:a"},
                {"type": "RdsDbInstance", "arn": "arn:aws:rds:b"}
            ]
        }));
        assert!(matches!(result, Err(CloudError::Validation(_))));

        // empty entries don't count
        let app = nested(json!({
            "name": "web", "type": "rails", "stack_id": "stack-1",
            "data_source": [{}, {"type": "AutoSelectOpsworksMysqlInstance"}]
        }))
        .unwrap();
        assert_eq!(
            app.data_source.unwrap().data_source_type.as_deref(),
            Some("AutoSelectOpsworksMysqlInstance")
        );
    }

    #[test]
    fn test_nested_defaults() {
        let app = nested(json!({
            "name": "web", "type": "static", "stack_id": "stack-1",
            "environment": [{"key": "A", "value": "1"}]
        }))
        .unwrap();

        assert!(app.enable_ssl);
        assert!(app.app_source.is_none());
        assert!(app.ssl_configuration.is_none());
        assert!(app.environment.iter().next().unwrap().secure);
    }

    #[test]
    fn test_flat_rejects_certificate_without_key() {
        let result = flat(json!({
            "name": "web", "type": "rails", "stack_id": "stack-1",
            "ssl_certificate": "-----BEGIN CERTIFICATE-----"
        }));
        assert!(matches!(result, Err(CloudError::Validation(_))));

        let result = flat(json!({
            "name": "web", "type": "rails", "stack_id": "stack-1",
            "ssl_chain": "-----BEGIN CERTIFICATE-----"
        }));
        assert!(matches!(result, Err(CloudError::Validation(_))));
    }

    #[test]
    fn test_flat_and_nested_build_the_same_request() {
        let from_nested = nested(json!({
            "name": "web", "type": "rails", "stack_id": "stack-1",
            "domains": ["example.com", "www.example.com"],
            "app_source": [{
                "type": "git",
                "url": "https://github.com/example/app.git",
                "revision": "main"
            }],
            "ssl_configuration": [{"certificate": "CERT\n", "private_key": "KEY\n"}],
            "data_source": [{
                "type": "RdsDbInstance",
                "database_name": "app",
                "arn": "arn:aws:rds:db"
            }],
            "environment": [{"key": "RAILS_ENV", "value": "production", "secure": false}]
        }))
        .unwrap();

        let from_flat = flat(json!({
            "name": "web", "type": "rails", "stack_id": "stack-1",
            "domains": ["example.com", "www.example.com"],
            "app_source_type": "git",
            "app_source_url": "https://github.com/example/app.git",
            "app_source_revision": "main",
            "ssl_certificate": "CERT\n",
            "ssl_private_key": "KEY\n",
            "data_source_type": "RdsDbInstance",
            "data_source_database_name": "app",
            "data_source_arn": "arn:aws:rds:db",
            "environment": [{"key": "RAILS_ENV", "value": "production", "secure": false}]
        }))
        .unwrap();

        assert_eq!(from_nested, from_flat);
        assert_eq!(build_request(&from_nested), build_request(&from_flat));
    }

    #[test]
    fn test_layouts_convert_back_from_application() {
        let app = Application::new("web", "nodejs", "stack-1")
            .with_app_source(AppSource::new("git", "https://github.com/example/app.git"))
            .with_ssl_configuration(SslConfiguration::new("CERT", "KEY"));

        let nested_schema = NestedApplicationSchema::from(&app);
        assert_eq!(nested_schema.app_source.len(), 1);
        assert!(nested_schema.data_source.is_empty());
        assert_eq!(Application::try_from(nested_schema).unwrap(), app);

        let flat_schema = FlatApplicationSchema::from(&app);
        assert_eq!(flat_schema.app_source_type.as_deref(), Some("git"));
        assert_eq!(flat_schema.ssl_private_key.as_deref(), Some("KEY"));
        assert!(flat_schema.data_source_arn.is_none());
        assert_eq!(Application::try_from(flat_schema).unwrap(), app);
    }
}
