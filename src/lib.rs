//! dockerrun-deploy - Elastic Beanstalk single-container deployment helper
//!
//! Resolves deployment options from an optional `dockerrun.yml` file merged
//! with explicit overrides, packages a `Dockerrun.aws.json` source bundle,
//! uploads it to object storage, and triggers an environment update.

pub mod bundle;
pub mod client;
pub mod dockerrun;
pub mod error;
pub mod options;

// Re-exports for convenience
pub use bundle::{build_bundle, SourceBundle};
pub use client::{AwsCli, PlatformClient, StorageClient};
pub use dockerrun::Dockerrun;
pub use error::{DeployError, DeployResult};
pub use options::{ConfigWarning, OptionKey, ResolvedOptions, DEFAULT_VAR_FILE};
