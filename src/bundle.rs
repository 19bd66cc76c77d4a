//! Source bundle assembly
//!
//! Stages the run descriptor (and optional proxy configuration) in a
//! transient temp directory and writes the `app_source.zip` that the storage
//! client uploads. The bundle digest is reported so deploy logs can be
//! matched to what actually shipped.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::dockerrun::Dockerrun;
use crate::error::{DeployError, DeployResult};
use crate::options::{OptionKey, ResolvedOptions};

/// File name of the descriptor inside the bundle.
pub const DESCRIPTOR_NAME: &str = "Dockerrun.aws.json";

/// File name of the produced archive.
pub const BUNDLE_NAME: &str = "app_source.zip";

/// Directory inside the bundle where the proxy config lands.
const PROXY_CONF_DIR: &str = ".platform/nginx/conf.d";

/// A finished source bundle.
#[derive(Debug)]
pub struct SourceBundle {
    // Keeps the staging directory (and with it the archive) alive until the
    // bundle is dropped.
    _staging: TempDir,
    path: PathBuf,
    sha256: String,
}

impl SourceBundle {
    /// Path of the archive on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hex SHA-256 of the archive contents.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }
}

/// Build the uploadable bundle from resolved options.
///
/// The upload coordinates (`bucket-name`, `bucket-key`) are required up
/// front so a doomed deploy fails before any work happens. With
/// `proxy-config` resolved, the named file (relative paths resolved against
/// the option file's directory) is bundled under `.platform/nginx/conf.d/`.
/// With `dest` resolved, the finished archive is also copied to
/// `<dest>/app_source.zip`.
pub fn build_bundle(opts: &ResolvedOptions) -> DeployResult<SourceBundle> {
    opts.require(&[OptionKey::BucketName, OptionKey::BucketKey])?;

    let descriptor = Dockerrun::from_options(opts)?.to_json()?;

    let staging = TempDir::new()?;
    let zip_path = staging.path().join(BUNDLE_NAME);
    let mut zip = ZipWriter::new(File::create(&zip_path)?);
    let entry_opts =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file(DESCRIPTOR_NAME, entry_opts)?;
    zip.write_all(descriptor.as_bytes())?;

    if let Some(proxy) = opts.get(OptionKey::ProxyConfig) {
        let source = opts.resolve_path(proxy);
        if !source.is_file() {
            return Err(DeployError::ProxyConfigNotFound { path: source });
        }
        let contents = fs::read(&source)?;
        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("proxy.conf");
        zip.start_file(format!("{PROXY_CONF_DIR}/{file_name}"), entry_opts)?;
        zip.write_all(&contents)?;
    }

    zip.finish()?;

    let sha256 = hash_file(&zip_path)?;

    if let Some(dest) = opts.get(OptionKey::Dest) {
        let dest_dir = opts.resolve_path(dest);
        fs::create_dir_all(&dest_dir)?;
        fs::copy(&zip_path, dest_dir.join(BUNDLE_NAME))?;
    }

    Ok(SourceBundle {
        _staging: staging,
        path: zip_path,
        sha256,
    })
}

fn hash_file(path: &Path) -> DeployResult<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
