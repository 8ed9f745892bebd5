//! AWS OpsWorks provider for opsflow
//!
//! This crate implements the `aws_opsworks_application` resource: it maps an
//! [`Application`] record onto the OpsWorks `CreateApp`, `DescribeApps`,
//! `UpdateApp` and `DeleteApp` calls.
//!
//! # Requirements
//!
//! - AWS credentials resolvable by the default provider chain
//! - Optional `opsflow.yaml` for region, profile, endpoint and retry settings
//!
//! # Example
//!
//! ```ignore
//! use opsflow_cloud_aws::{Application, AppSource};
//!
//! let resource = opsflow_cloud_aws::connect().await?;
//!
//! let app = Application::new("web", "rails", "2f1e...-stack-id")
//!     .with_domains(["example.com"])
//!     .with_app_source(AppSource::new("git", "https://github.com/example/app.git"))
//!     .with_env("RAILS_ENV", "production", false);
//!
//! let created = resource.create(&app).await?;
//! let current = resource.read(created.id.as_deref().unwrap()).await?;
//! ```

pub mod api;
pub mod application;
pub mod config;
pub mod error;
pub mod model;
pub mod schema;
pub mod sdk;

pub use api::{AppRecord, AppRequest, OpsWorksApi};
pub use application::{ApplicationResource, RESOURCE_TYPE};
pub use config::{connect, connect_with, retry_config};
pub use error::{AwsError, Result};
pub use model::{AppSource, Application, DataSource, EnvironmentVariable, SslConfiguration};
pub use schema::{FlatApplicationSchema, NestedApplicationSchema};
pub use sdk::SdkOpsWorksClient;
