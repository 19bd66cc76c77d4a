//! Storage and platform client seams
//!
//! The deploy flow talks to object storage and the orchestration service
//! through these traits. The production implementation drives the `aws`
//! command-line tool; tests substitute in-memory fakes.

mod aws_cli;

pub use aws_cli::AwsCli;

use std::path::Path;

use crate::error::DeployResult;

/// Uploads the source bundle to object storage.
pub trait StorageClient {
    /// Store `file` at (`bucket`, `key`).
    fn put_object(&self, bucket: &str, key: &str, file: &Path) -> DeployResult<()>;
}

/// Registers application versions and triggers environment updates.
pub trait PlatformClient {
    /// Register (`application`, `label`) pointing at the uploaded bundle.
    fn create_application_version(
        &self,
        application: &str,
        label: &str,
        description: Option<&str>,
        bucket: &str,
        key: &str,
    ) -> DeployResult<()>;

    /// Deploy (`application`, `label`) to `environment`.
    fn update_environment(
        &self,
        application: &str,
        label: &str,
        environment: &str,
    ) -> DeployResult<()>;
}
