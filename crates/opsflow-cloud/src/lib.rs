//! opsflow cloud resource layer
//!
//! Provider-neutral building blocks for declaratively managed cloud
//! resources: the lifecycle contract every resource adapter implements, the
//! error taxonomy upstream clients classify into, a deadline-bounded retry
//! loop, and the JSON state store that records reconciled entities.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  orchestrator                    │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                opsflow-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  Reconciler ── trait ManagedResource      │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │    retry     │  │  State Mgmt  │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼─────────────────┐
//! │ opsflow-cloud-aws       │
//! │ (OpsWorks application)  │
//! └─────────────────────────┘
//! ```

pub mod error;
pub mod reconcile;
pub mod resource;
pub mod retry;
pub mod state;

// Re-exports
pub use error::{CloudError, Result};
pub use reconcile::{Outcome, Reconciler};
pub use resource::ManagedResource;
pub use retry::{RetryConfig, retry};
pub use state::{GlobalState, ResourceState, ResourceStatus, StateLock, StateManager};
