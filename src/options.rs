//! Deployment option resolution
//!
//! Merges the optional `dockerrun.yml` option file with explicit overrides
//! (overrides win), applies defaults, and validates cross-field dependencies
//! before any network call is made. Resolution happens exactly once per
//! invocation; the resulting set is immutable.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml_ng::Value;
use uuid::Uuid;

use crate::error::{DeployError, DeployResult};

/// Default location of the option file, relative to the current directory.
pub const DEFAULT_VAR_FILE: &str = "./dockerrun.yml";

/// The closed set of option keys the resolver knows about.
///
/// Keys outside this set are ignored when read from the option file
/// (surfaced as warnings, never errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    TagName,
    ImageName,
    AuthBucketName,
    AuthBucketKey,
    ContainerPort,
    ApplicationName,
    EnvName,
    VersionLabel,
    VersionDesc,
    BucketName,
    BucketKey,
    AwsAccessKeyId,
    AwsSecretAccessKey,
    AwsRegion,
    ProxyConfig,
    Dest,
}

impl OptionKey {
    /// Every known key, in declaration order.
    pub const ALL: [OptionKey; 16] = [
        OptionKey::TagName,
        OptionKey::ImageName,
        OptionKey::AuthBucketName,
        OptionKey::AuthBucketKey,
        OptionKey::ContainerPort,
        OptionKey::ApplicationName,
        OptionKey::EnvName,
        OptionKey::VersionLabel,
        OptionKey::VersionDesc,
        OptionKey::BucketName,
        OptionKey::BucketKey,
        OptionKey::AwsAccessKeyId,
        OptionKey::AwsSecretAccessKey,
        OptionKey::AwsRegion,
        OptionKey::ProxyConfig,
        OptionKey::Dest,
    ];

    /// Canonical kebab-case form, as written in option files and flags.
    pub fn as_str(self) -> &'static str {
        match self {
            OptionKey::TagName => "tag-name",
            OptionKey::ImageName => "image-name",
            OptionKey::AuthBucketName => "auth-bucket-name",
            OptionKey::AuthBucketKey => "auth-bucket-key",
            OptionKey::ContainerPort => "container-port",
            OptionKey::ApplicationName => "application-name",
            OptionKey::EnvName => "env-name",
            OptionKey::VersionLabel => "version-label",
            OptionKey::VersionDesc => "version-desc",
            OptionKey::BucketName => "bucket-name",
            OptionKey::BucketKey => "bucket-key",
            OptionKey::AwsAccessKeyId => "aws-access-key-id",
            OptionKey::AwsSecretAccessKey => "aws-secret-access-key",
            OptionKey::AwsRegion => "aws-region",
            OptionKey::ProxyConfig => "proxy-config",
            OptionKey::Dest => "dest",
        }
    }

    /// Parse a canonical key name; unknown names yield `None`.
    pub fn parse(name: &str) -> Option<OptionKey> {
        OptionKey::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal warning for an unknown key in the option file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// The final immutable option set for one invocation.
///
/// Construction either fully succeeds or fails; no partially-resolved set is
/// ever observable. Repeated reads return identical values (the generated
/// `version-label` is computed once during construction).
#[derive(Debug)]
pub struct ResolvedOptions {
    opts: BTreeMap<OptionKey, String>,
    option_file: Option<PathBuf>,
    working_path: PathBuf,
}

impl ResolvedOptions {
    /// Resolve options from explicit overrides plus the optional option file.
    ///
    /// `var_file` overrides the default `./dockerrun.yml` location. A missing
    /// file is an empty mapping, not an error. Returns the resolved set and
    /// any unknown-key warnings collected from the file.
    pub fn resolve(
        overrides: &BTreeMap<OptionKey, String>,
        var_file: Option<&Path>,
    ) -> DeployResult<(ResolvedOptions, Vec<ConfigWarning>)> {
        let source = OptionFile::load(var_file)?;

        let mut opts = BTreeMap::new();
        for key in OptionKey::ALL {
            if let Some(value) = overrides.get(&key) {
                opts.insert(key, value.clone());
            } else if let Some(value) = source.values.get(&key) {
                opts.insert(key, value.clone());
            }
        }

        apply_defaults(&mut opts);
        validate_auth(&opts)?;

        Ok((
            ResolvedOptions {
                opts,
                option_file: source.path,
                working_path: source.working_path,
            },
            source.warnings,
        ))
    }

    /// Look up a resolved value. Never fails; absent keys yield `None`.
    pub fn get(&self, key: OptionKey) -> Option<&str> {
        self.opts.get(&key).map(String::as_str)
    }

    /// Like [`get`](Self::get), but absence is a configuration error.
    pub fn required(&self, key: OptionKey) -> DeployResult<&str> {
        self.get(key).ok_or(DeployError::MissingOption { key })
    }

    /// Fail with the first missing key, in the order given.
    ///
    /// Re-runnable; call before each downstream operation with the subset of
    /// keys that operation depends on.
    pub fn require(&self, keys: &[OptionKey]) -> DeployResult<()> {
        for &key in keys {
            if !self.opts.contains_key(&key) {
                return Err(DeployError::MissingOption { key });
            }
        }
        Ok(())
    }

    /// Absolute path of the option file that was read, if one existed.
    pub fn option_file(&self) -> Option<&Path> {
        self.option_file.as_deref()
    }

    /// Base directory for relative artifact paths: the option file's parent
    /// directory, or the current working directory when no file was read.
    pub fn working_path(&self) -> &Path {
        &self.working_path
    }

    /// Resolve a possibly-relative path against [`working_path`](Self::working_path).
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.working_path.join(p)
        }
    }
}

/// Parsed option file contents plus resolver state derived from its location.
struct OptionFile {
    values: BTreeMap<OptionKey, String>,
    warnings: Vec<ConfigWarning>,
    path: Option<PathBuf>,
    working_path: PathBuf,
}

impl OptionFile {
    fn load(var_file: Option<&Path>) -> DeployResult<OptionFile> {
        let path = absolutize(var_file.unwrap_or(Path::new(DEFAULT_VAR_FILE)))?;

        if !path.exists() {
            return Ok(OptionFile {
                values: BTreeMap::new(),
                warnings: Vec::new(),
                path: None,
                working_path: std::env::current_dir()?,
            });
        }

        let content = fs::read_to_string(&path)?;
        let parsed: Value = serde_yaml_ng::from_str(&content).map_err(|e| {
            DeployError::MalformedOptionFile {
                file: path.clone(),
                message: e.to_string(),
            }
        })?;

        let mapping = match parsed {
            // An empty file parses to null; treat it as an empty mapping.
            Value::Null => serde_yaml_ng::Mapping::new(),
            Value::Mapping(m) => m,
            _ => {
                return Err(DeployError::MalformedOptionFile {
                    file: path.clone(),
                    message: "expected a key/value mapping at the top level".to_string(),
                })
            }
        };

        let mut values = BTreeMap::new();
        let mut warnings = Vec::new();
        for (name, value) in &mapping {
            let Some(name) = name.as_str() else { continue };
            match OptionKey::parse(name) {
                Some(key) => match coerce_scalar(value) {
                    Ok(Some(v)) => {
                        values.insert(key, v);
                    }
                    // `key:` with no value is absent, not empty
                    Ok(None) => {}
                    Err(()) => {
                        return Err(DeployError::MalformedOptionFile {
                            file: path.clone(),
                            message: format!("non-scalar value for key '{name}'"),
                        })
                    }
                },
                None => warnings.push(ConfigWarning {
                    key: name.to_string(),
                    file: path.clone(),
                    line: find_line_number(&content, name),
                    suggestion: suggest_key(name),
                }),
            }
        }

        let working_path = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(OptionFile {
            values,
            warnings,
            path: Some(path),
            working_path,
        })
    }
}

/// Expand to an absolute path without touching the filesystem.
fn absolutize(path: &Path) -> DeployResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// YAML scalars are read as their string form; null means absent.
fn coerce_scalar(value: &Value) -> Result<Option<String>, ()> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        _ => Err(()),
    }
}

/// Defaults applied in a fixed order, each only if the key is still absent.
/// `bucket-key` must come after `version-label` so it can pick up the
/// generated label.
fn apply_defaults(opts: &mut BTreeMap<OptionKey, String>) {
    opts.entry(OptionKey::TagName)
        .or_insert_with(|| "latest".to_string());
    opts.entry(OptionKey::ContainerPort)
        .or_insert_with(|| "3000".to_string());
    opts.entry(OptionKey::VersionLabel)
        .or_insert_with(|| Uuid::new_v4().to_string());
    let label = opts[&OptionKey::VersionLabel].clone();
    opts.entry(OptionKey::BucketKey).or_insert(label);
}

/// `auth-bucket-name` and `auth-bucket-key` are a dependent pair: either
/// both present or both absent.
fn validate_auth(opts: &BTreeMap<OptionKey, String>) -> DeployResult<()> {
    let has_name = opts.contains_key(&OptionKey::AuthBucketName);
    let has_key = opts.contains_key(&OptionKey::AuthBucketKey);
    match (has_name, has_key) {
        (true, false) => Err(DeployError::MissingCounterpart {
            present: OptionKey::AuthBucketName,
            missing: OptionKey::AuthBucketKey,
        }),
        (false, true) => Err(DeployError::MissingCounterpart {
            present: OptionKey::AuthBucketKey,
            missing: OptionKey::AuthBucketName,
        }),
        _ => Ok(()),
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for candidate in OptionKey::ALL {
        let dist = levenshtein(unknown, candidate.as_str());
        best = match best {
            None => Some((candidate.as_str(), dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate.as_str(), dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
