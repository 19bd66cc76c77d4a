//! Deploy command entry point
//!
//! Resolves options, assembles the source bundle, then walks the three
//! platform steps (upload, register version, update environment), checking
//! each step's required keys immediately before it runs.

use anyhow::Result;

use dockerrun_deploy::bundle::build_bundle;
use dockerrun_deploy::client::{AwsCli, PlatformClient, StorageClient};
use dockerrun_deploy::error::DeployResult;
use dockerrun_deploy::options::{ConfigWarning, OptionKey, ResolvedOptions};

use crate::cli::DeployArgs;

/// Deploy command entry point
pub fn cmd_deploy(args: DeployArgs, verbose: u8) -> Result<()> {
    let overrides = args.to_overrides();
    let (opts, warnings) = ResolvedOptions::resolve(&overrides, args.var_file.as_deref())?;
    print_config_warnings(&warnings);

    if verbose > 0 {
        match opts.option_file() {
            Some(path) => println!("Options file: {}", path.display()),
            None => println!("Options file: (none)"),
        }
    }

    if args.dry_run {
        run_dry(&opts, verbose)?;
        return Ok(());
    }

    AwsCli::ensure_available()?;
    let client = AwsCli::from_options(&opts);
    run_deploy(&opts, &client, &client, verbose)?;
    Ok(())
}

/// The real deploy flow. Generic over the clients so tests can observe the
/// calls without touching the network.
fn run_deploy<S, P>(
    opts: &ResolvedOptions,
    storage: &S,
    platform: &P,
    verbose: u8,
) -> DeployResult<()>
where
    S: StorageClient,
    P: PlatformClient,
{
    println!("Creating source bundle...");
    let bundle = build_bundle(opts)?;
    if verbose > 0 {
        println!("Bundle sha256: {}", bundle.sha256());
    }

    let bucket = opts.required(OptionKey::BucketName)?;
    let key = opts.required(OptionKey::BucketKey)?;
    storage.put_object(bucket, key, bundle.path())?;

    println!("Creating app version...");
    opts.require(&[
        OptionKey::ApplicationName,
        OptionKey::VersionLabel,
        OptionKey::BucketName,
        OptionKey::BucketKey,
    ])?;
    platform.create_application_version(
        opts.required(OptionKey::ApplicationName)?,
        opts.required(OptionKey::VersionLabel)?,
        opts.get(OptionKey::VersionDesc),
        bucket,
        key,
    )?;

    println!("Deploying app version...");
    opts.require(&[
        OptionKey::ApplicationName,
        OptionKey::VersionLabel,
        OptionKey::EnvName,
    ])?;
    platform.update_environment(
        opts.required(OptionKey::ApplicationName)?,
        opts.required(OptionKey::VersionLabel)?,
        opts.required(OptionKey::EnvName)?,
    )?;

    println!("Deployed!");
    Ok(())
}

/// Dry run: full local pipeline and every checkpoint, no network calls.
fn run_dry(opts: &ResolvedOptions, verbose: u8) -> DeployResult<()> {
    println!("Creating source bundle...");
    let bundle = build_bundle(opts)?;
    if verbose > 0 {
        println!("Bundle sha256: {}", bundle.sha256());
    }

    opts.require(&[
        OptionKey::ApplicationName,
        OptionKey::VersionLabel,
        OptionKey::BucketName,
        OptionKey::BucketKey,
    ])?;
    opts.require(&[
        OptionKey::ApplicationName,
        OptionKey::VersionLabel,
        OptionKey::EnvName,
    ])?;

    println!(
        "Would upload {} to s3://{}/{}",
        bundle.path().display(),
        opts.required(OptionKey::BucketName)?,
        opts.required(OptionKey::BucketKey)?,
    );
    println!(
        "Would create version '{}' of application '{}'",
        opts.required(OptionKey::VersionLabel)?,
        opts.required(OptionKey::ApplicationName)?,
    );
    println!(
        "Would deploy version '{}' to environment '{}'",
        opts.required(OptionKey::VersionLabel)?,
        opts.required(OptionKey::EnvName)?,
    );
    Ok(())
}

fn print_config_warnings(warnings: &[ConfigWarning]) {
    for w in warnings {
        if let Some(line) = w.line {
            eprintln!(
                "⚠ Unknown option key '{}' in {}:{}",
                w.key,
                w.file.display(),
                line
            );
        } else {
            eprintln!("⚠ Unknown option key '{}' in {}", w.key, w.file.display());
        }

        if let Some(suggestion) = &w.suggestion {
            eprintln!("   Did you mean '{}'?", suggestion);
        }
    }
}
