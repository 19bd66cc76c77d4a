//! `Dockerrun.aws.json` descriptor model
//!
//! Version 1 of the single-container run descriptor consumed by the
//! orchestration platform. Field names follow the wire format exactly.

use serde::Serialize;

use crate::error::DeployResult;
use crate::options::{OptionKey, ResolvedOptions};

/// Single-container run descriptor (`AWSEBDockerrunVersion` 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dockerrun {
    #[serde(rename = "AWSEBDockerrunVersion")]
    pub version: String,

    #[serde(rename = "Image")]
    pub image: Image,

    #[serde(rename = "Ports")]
    pub ports: Vec<PortMapping>,

    #[serde(rename = "Authentication", skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
}

/// Image reference and update policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Update")]
    pub update: String,
}

/// Port exposed by the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortMapping {
    #[serde(rename = "ContainerPort")]
    pub container_port: String,
}

/// Location of the registry auth file (`dockercfg`) in object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Authentication {
    #[serde(rename = "Bucket")]
    pub bucket: String,

    #[serde(rename = "Key")]
    pub key: String,
}

impl Dockerrun {
    /// Build the descriptor from resolved options.
    ///
    /// `tag-name` and `container-port` always carry defaults after
    /// resolution; `image-name` must have been supplied by file or override.
    /// The auth block is included only when the auth bucket pair resolved
    /// (the resolver guarantees it is all-or-nothing).
    pub fn from_options(opts: &ResolvedOptions) -> DeployResult<Dockerrun> {
        let name = format!(
            "{}:{}",
            opts.required(OptionKey::ImageName)?,
            opts.required(OptionKey::TagName)?
        );

        let authentication = match (
            opts.get(OptionKey::AuthBucketName),
            opts.get(OptionKey::AuthBucketKey),
        ) {
            (Some(bucket), Some(key)) => Some(Authentication {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            _ => None,
        };

        Ok(Dockerrun {
            version: "1".to_string(),
            image: Image {
                name,
                update: "true".to_string(),
            },
            ports: vec![PortMapping {
                container_port: opts.required(OptionKey::ContainerPort)?.to_string(),
            }],
            authentication,
        })
    }

    /// Serialize to the JSON document written into the source bundle.
    pub fn to_json(&self) -> DeployResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
