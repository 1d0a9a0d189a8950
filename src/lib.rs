//! # actinia-client
//!
//! An async client for the [actinia](https://actinia.mundialis.de) geoprocessing
//! service: discover locations, mapsets and processing modules, assemble process
//! chains, submit them and follow the resulting jobs.
//!
//! ## Features
//!
//! - **Process Chains**: Turn an ordered list of modules and parameter maps into the
//!   request body the service expects
//! - **Lazy Module Details**: Module parameters are fetched once, on first use, and kept
//! - **Explicit Polling**: Jobs are refreshed when you ask, never behind your back
//! - **Pluggable Transport**: The HTTP layer sits behind a trait (feature `http`, on by default)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use actinia_client::prelude::*;
//!
//! # async fn run() -> Result<(), ActiniaError> {
//! let config = ClientConfig::new("https://actinia.mundialis.de")
//!     .with_credentials("demouser", "gu3st!pa55w0rd");
//! let client = Client::new(config)?;
//!
//! let region = client.module("g.region").await?.expect("g.region is always available");
//! let slope = client.module("r.slope.aspect").await?.expect("r.slope.aspect is available");
//!
//! let mut region_params = ParameterMap::new();
//! region_params.insert("raster".into(), "elevation@PERMANENT".into());
//! let mut slope_params = ParameterMap::new();
//! slope_params.insert("elevation".into(), "elevation@PERMANENT".into());
//! slope_params.insert("slope".into(), "slope".into());
//!
//! // The Nth parameter map belongs to the Nth module.
//! let mut job = client
//!     .run_process("nc_spm_08", "user1", &[region, slope], &[region_params, slope_params])
//!     .await?;
//!
//! while !job.is_terminal() {
//!     job.refresh().await?;
//!     tokio::time::sleep(std::time::Duration::from_secs(2)).await;
//! }
//! println!("job ended as {:?}", job.status());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`chain`]: Process chain documents and the chain builder
//! - [`module`]: Module descriptors with lazily fetched parameters
//! - [`job`]: The job status tracker
//! - [`api`]: Service endpoints and the calls the core depends on
//! - [`transport`]: The HTTP seam

// ============================================================================
// Modules
// ============================================================================

pub mod api;
pub mod chain;
pub mod client;
pub mod config;
pub mod error;
pub mod job;
pub mod module;
pub mod parameter;
pub mod transport;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use api::{ActiniaApi, Api, ModuleDetailRecord, ModuleSummary};
pub use chain::{ChainStep, ParameterBinding, ParameterMap, ProcessChain};
pub use client::{Client, Location, Mapset};
pub use config::ClientConfig;
pub use error::{ActiniaError, TransportError};
pub use job::JobStatus;
pub use module::{Module, ModuleSignature, Population};
pub use parameter::Parameter;
pub use transport::Transport;

#[cfg(feature = "http")]
pub use transport::HttpTransport;

/// Everything needed to build and submit process chains.
///
/// # Example
/// ```rust
/// use actinia_client::prelude::*;
/// ```
pub mod prelude {
    pub use super::{
        ActiniaError, Client, ClientConfig, JobStatus, Module, ModuleSignature, Parameter,
        ParameterMap, ProcessChain,
    };
}

// ============================================================================
// Re-export commonly used external types for convenience
// ============================================================================

pub use serde_json::Value as JsonValue;

// ============================================================================
// Library Metadata
// ============================================================================

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate.
pub const NAME: &str = env!("CARGO_PKG_NAME");
