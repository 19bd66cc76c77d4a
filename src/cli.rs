use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dockerrun_deploy::options::OptionKey;

/// dockerrun-deploy - package and ship single-container Dockerrun bundles
#[derive(Parser, Debug)]
#[command(name = "dockerrun-deploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Package the run descriptor, upload it, register a version, and deploy it
    Deploy(DeployArgs),

    /// Show version information
    Version,
}

/// Flags mirror the option-file keys; anything passed here overrides the file.
#[derive(Args, Debug, Default)]
pub struct DeployArgs {
    /// File holding variables for deployment (default ./dockerrun.yml)
    #[arg(short = 'f', long, value_name = "PATH")]
    pub var_file: Option<PathBuf>,

    /// Tag for the docker image to pull in; defaults to 'latest'
    #[arg(short = 't', long)]
    pub tag_name: Option<String>,

    /// Name of the docker image to use
    #[arg(short = 'i', long)]
    pub image_name: Option<String>,

    /// S3 bucket where the dockercfg file is stored, if registry auth is required
    #[arg(long)]
    pub auth_bucket_name: Option<String>,

    /// S3 key of the dockercfg file; a bucket name must also be provided
    #[arg(long)]
    pub auth_bucket_key: Option<String>,

    /// Port exposed by the container; defaults to 3000
    #[arg(short = 'p', long)]
    pub container_port: Option<String>,

    /// Name of the application to deploy
    #[arg(short = 'a', long)]
    pub application_name: Option<String>,

    /// Name of the application environment to update
    #[arg(short = 'e', long)]
    pub env_name: Option<String>,

    /// Label for the new application version; defaults to a generated id
    #[arg(long)]
    pub version_label: Option<String>,

    /// Description for the new application version
    #[arg(long)]
    pub version_desc: Option<String>,

    /// S3 bucket where the new application version is stored
    #[arg(short = 'b', long)]
    pub bucket_name: Option<String>,

    /// S3 key for the uploaded application version; defaults to the version label
    #[arg(short = 'k', long)]
    pub bucket_key: Option<String>,

    /// AWS access key; stored credentials or environment apply when unset
    #[arg(long)]
    pub aws_access_key_id: Option<String>,

    /// AWS secret access key; stored credentials or environment apply when unset
    #[arg(long)]
    pub aws_secret_access_key: Option<String>,

    /// AWS region to operate in
    #[arg(long)]
    pub aws_region: Option<String>,

    /// Nginx config file to bundle under .platform/nginx/conf.d/
    #[arg(long, value_name = "PATH")]
    pub proxy_config: Option<String>,

    /// Directory that also receives a copy of the finished bundle
    #[arg(long, value_name = "PATH")]
    pub dest: Option<String>,

    /// Resolve, validate, and package without calling the platform
    #[arg(long)]
    pub dry_run: bool,
}

impl DeployArgs {
    /// Explicit overrides for the resolver; unset flags stay absent so they
    /// never mask option-file values.
    pub fn to_overrides(&self) -> BTreeMap<OptionKey, String> {
        let pairs = [
            (OptionKey::TagName, &self.tag_name),
            (OptionKey::ImageName, &self.image_name),
            (OptionKey::AuthBucketName, &self.auth_bucket_name),
            (OptionKey::AuthBucketKey, &self.auth_bucket_key),
            (OptionKey::ContainerPort, &self.container_port),
            (OptionKey::ApplicationName, &self.application_name),
            (OptionKey::EnvName, &self.env_name),
            (OptionKey::VersionLabel, &self.version_label),
            (OptionKey::VersionDesc, &self.version_desc),
            (OptionKey::BucketName, &self.bucket_name),
            (OptionKey::BucketKey, &self.bucket_key),
            (OptionKey::AwsAccessKeyId, &self.aws_access_key_id),
            (OptionKey::AwsSecretAccessKey, &self.aws_secret_access_key),
            (OptionKey::AwsRegion, &self.aws_region),
            (OptionKey::ProxyConfig, &self.proxy_config),
            (OptionKey::Dest, &self.dest),
        ];

        pairs
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key, v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_deploy_defaults() {
        let cli = Cli::try_parse_from(["dockerrun-deploy", "deploy"]).unwrap();
        let Commands::Deploy(args) = cli.command else {
            panic!("Expected Deploy command");
        };
        assert_eq!(args.var_file, None);
        assert_eq!(args.tag_name, None);
        assert!(!args.dry_run);
        assert!(args.to_overrides().is_empty());
    }

    #[test]
    fn test_cli_parse_deploy_short_flags() {
        let cli = Cli::try_parse_from([
            "dockerrun-deploy",
            "deploy",
            "-i",
            "acme/web",
            "-t",
            "v3",
            "-a",
            "my-app",
            "-e",
            "my-app-dev",
            "-b",
            "deploys",
        ])
        .unwrap();

        let Commands::Deploy(args) = cli.command else {
            panic!("Expected Deploy command");
        };
        let overrides = args.to_overrides();
        assert_eq!(overrides[&OptionKey::ImageName], "acme/web");
        assert_eq!(overrides[&OptionKey::TagName], "v3");
        assert_eq!(overrides[&OptionKey::ApplicationName], "my-app");
        assert_eq!(overrides[&OptionKey::EnvName], "my-app-dev");
        assert_eq!(overrides[&OptionKey::BucketName], "deploys");
        assert!(!overrides.contains_key(&OptionKey::BucketKey));
    }

    #[test]
    fn test_cli_parse_deploy_var_file() {
        let cli = Cli::try_parse_from([
            "dockerrun-deploy",
            "deploy",
            "-f",
            "conf/deploy.yml",
            "--dry-run",
        ])
        .unwrap();

        let Commands::Deploy(args) = cli.command else {
            panic!("Expected Deploy command");
        };
        assert_eq!(args.var_file, Some(PathBuf::from("conf/deploy.yml")));
        assert!(args.dry_run);
    }

    #[test]
    fn test_cli_parse_version() {
        let cli = Cli::try_parse_from(["dockerrun-deploy", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_cli_verbose_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["dockerrun-deploy", "deploy", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_empty_string_override_is_present() {
        // absence and empty string are distinct: an explicit empty value
        // still overrides the file
        let cli =
            Cli::try_parse_from(["dockerrun-deploy", "deploy", "--version-desc", ""]).unwrap();
        let Commands::Deploy(args) = cli.command else {
            panic!("Expected Deploy command");
        };
        assert_eq!(args.to_overrides()[&OptionKey::VersionDesc], "");
    }
}
