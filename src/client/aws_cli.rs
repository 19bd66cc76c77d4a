//! AWS CLI backed clients
//!
//! Spawns the `aws` command-line tool with captured stderr and surfaces the
//! exit status in errors. Explicit credentials travel via the subprocess
//! environment; when none are resolved, the tool's ambient credential chain
//! (profile, environment, instance role) applies.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{DeployError, DeployResult};
use crate::options::{OptionKey, ResolvedOptions};

use super::{PlatformClient, StorageClient};

/// Client state shared by the storage and platform calls.
#[derive(Debug, Clone, Default)]
pub struct AwsCli {
    credentials: Option<Credentials>,
    region: Option<String>,
}

#[derive(Debug, Clone)]
struct Credentials {
    access_key_id: String,
    secret_access_key: String,
}

impl AwsCli {
    /// Build a client from resolved options.
    ///
    /// Credentials are injected only when both halves are present;
    /// `aws-region` becomes a `--region` argument when resolved.
    pub fn from_options(opts: &ResolvedOptions) -> AwsCli {
        let credentials = match (
            opts.get(OptionKey::AwsAccessKeyId),
            opts.get(OptionKey::AwsSecretAccessKey),
        ) {
            (Some(id), Some(secret)) => Some(Credentials {
                access_key_id: id.to_string(),
                secret_access_key: secret.to_string(),
            }),
            _ => None,
        };

        AwsCli {
            credentials,
            region: opts.get(OptionKey::AwsRegion).map(str::to_string),
        }
    }

    /// Check if the `aws` tool is installed and on PATH.
    pub fn check_available() -> bool {
        Command::new("aws")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Fail with a clear error when the tool is missing.
    pub fn ensure_available() -> DeployResult<()> {
        if Self::check_available() {
            Ok(())
        } else {
            Err(DeployError::AwsCliUnavailable)
        }
    }

    fn run(&self, mut args: Vec<String>) -> DeployResult<()> {
        if let Some(region) = &self.region {
            args.push("--region".to_string());
            args.push(region.clone());
        }

        let mut cmd = Command::new("aws");
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if let Some(creds) = &self.credentials {
            cmd.env("AWS_ACCESS_KEY_ID", &creds.access_key_id);
            cmd.env("AWS_SECRET_ACCESS_KEY", &creds.secret_access_key);
        }

        let output = cmd.output()?;
        if !output.status.success() {
            return Err(DeployError::CommandFailed {
                tool: "aws",
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

impl StorageClient for AwsCli {
    fn put_object(&self, bucket: &str, key: &str, file: &Path) -> DeployResult<()> {
        self.run(put_object_args(bucket, key, file))
    }
}

impl PlatformClient for AwsCli {
    fn create_application_version(
        &self,
        application: &str,
        label: &str,
        description: Option<&str>,
        bucket: &str,
        key: &str,
    ) -> DeployResult<()> {
        self.run(create_version_args(application, label, description, bucket, key))
    }

    fn update_environment(
        &self,
        application: &str,
        label: &str,
        environment: &str,
    ) -> DeployResult<()> {
        self.run(update_environment_args(application, label, environment))
    }
}

fn put_object_args(bucket: &str, key: &str, file: &Path) -> Vec<String> {
    vec![
        "s3api".to_string(),
        "put-object".to_string(),
        "--bucket".to_string(),
        bucket.to_string(),
        "--key".to_string(),
        key.to_string(),
        "--body".to_string(),
        file.display().to_string(),
    ]
}

fn create_version_args(
    application: &str,
    label: &str,
    description: Option<&str>,
    bucket: &str,
    key: &str,
) -> Vec<String> {
    let mut args = vec![
        "elasticbeanstalk".to_string(),
        "create-application-version".to_string(),
        "--application-name".to_string(),
        application.to_string(),
        "--version-label".to_string(),
        label.to_string(),
        "--source-bundle".to_string(),
        format!("S3Bucket={bucket},S3Key={key}"),
        "--no-auto-create-application".to_string(),
    ];
    if let Some(desc) = description {
        args.push("--description".to_string());
        args.push(desc.to_string());
    }
    args
}

fn update_environment_args(application: &str, label: &str, environment: &str) -> Vec<String> {
    vec![
        "elasticbeanstalk".to_string(),
        "update-environment".to_string(),
        "--application-name".to_string(),
        application.to_string(),
        "--version-label".to_string(),
        label.to_string(),
        "--environment-name".to_string(),
        environment.to_string(),
    ]
}
