//! serde model for the subset of the compose file format that a dump
//! needs: services with their build contexts, env files and volumes,
//! plus top-level named volume declarations. Unknown keys are ignored.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ComposeFile {
    pub version: Option<String>,
    #[serde(default)]
    pub services: BTreeMap<String, Service>,
    #[serde(default)]
    pub volumes: BTreeMap<String, Option<VolumeDeclaration>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Service {
    pub image: Option<String>,
    pub build: Option<Build>,
    #[serde(default)]
    pub volumes: Vec<ServiceVolume>,
    pub env_file: Option<EnvFiles>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Build {
    Context(String),
    Detailed(BuildDetails),
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildDetails {
    pub context: Option<String>,
    pub dockerfile: Option<String>,
}

impl Build {
    pub fn context(&self) -> Option<&str> {
        match self {
            Build::Context(path) => Some(path),
            Build::Detailed(details) => details.context.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnvFiles {
    One(String),
    Many(Vec<String>),
}

impl EnvFiles {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let paths: &[String] = match self {
            EnvFiles::One(path) => std::slice::from_ref(path),
            EnvFiles::Many(paths) => paths,
        };
        paths.iter().map(String::as_str)
    }
}

/// A service volume entry, either the short `source:target[:mode]`
/// string form or the long map form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ServiceVolume {
    Short(String),
    Long(LongVolume),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LongVolume {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
}

/// A normalized service volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mount {
    Bind { source: String, target: String },
    Volume { name: String, target: String },
    Anonymous { target: String },
}

impl ServiceVolume {
    /// Normalize to a [`Mount`]. Returns `None` for entries that never
    /// take part in a dump, such as tmpfs mounts.
    pub fn mount(&self) -> Option<Mount> {
        match self {
            ServiceVolume::Short(spec) => parse_short(spec),
            ServiceVolume::Long(long) => {
                let target = long.target.clone().unwrap_or_default();
                match (long.kind.as_deref(), &long.source) {
                    (Some("bind"), Some(source)) => {
                        Some(Mount::Bind { source: source.clone(), target })
                    }
                    (Some("volume"), Some(name)) => {
                        Some(Mount::Volume { name: name.clone(), target })
                    }
                    (Some("volume"), None) => Some(Mount::Anonymous { target }),
                    (None, Some(source)) => Some(classify(source, &target)),
                    (None, None) => Some(Mount::Anonymous { target }),
                    _ => None,
                }
            }
        }
    }
}

fn parse_short(spec: &str) -> Option<Mount> {
    let mut parts = spec.splitn(3, ':');
    let first = parts.next()?;
    match parts.next() {
        None => Some(Mount::Anonymous { target: first.to_string() }),
        Some(target) => Some(classify(first, target)),
    }
}

fn classify(source: &str, target: &str) -> Mount {
    let is_path = source.starts_with('/')
        || source.starts_with("./")
        || source.starts_with("../")
        || source.starts_with('~')
        || source == "."
        || source == "..";
    if is_path {
        Mount::Bind { source: source.to_string(), target: target.to_string() }
    } else {
        Mount::Volume { name: source.to_string(), target: target.to_string() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumeDeclaration {
    #[serde(default)]
    pub external: External,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum External {
    Bool(bool),
    Named { name: String },
}

impl Default for External {
    fn default() -> Self {
        External::Bool(false)
    }
}

impl External {
    pub fn is_external(&self) -> bool {
        !matches!(self, External::Bool(false))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            External::Named { name } => Some(name),
            External::Bool(_) => None,
        }
    }
}
