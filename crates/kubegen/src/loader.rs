//! Decoding and encoding of [`Config`] documents.
//!
//! Documents are YAML or JSON. Several documents can be layered with a [`ConfigLoader`]: later
//! sources override earlier ones, mappings are merged key by key and every other value
//! (including sequences) is replaced as a whole.
//!
//! ```
//! use kubegen::loader::{ConfigLoader, Format};
//!
//! let config = ConfigLoader::new()
//!     .source("services: [{name: web, port: 80, targetPort: 8080}]", Format::Yaml)
//!     .source(r#"{"ingresses": [{"name": "public"}]}"#, Format::Json)
//!     .load()
//!     .unwrap();
//!
//! assert_eq!(config.services[0].target_port, 8080);
//! assert_eq!(config.ingresses[0].name, "public");
//! ```
use std::{
    ffi::OsStr,
    io::Read,
    path::{Path, PathBuf},
};

use kubegen_shared::yaml::{self, SerializeOptions};
use serde_yaml::Value;
use snafu::{OptionExt, ResultExt, Snafu};
use strum::{Display, EnumString};

use crate::{de::Document, model::Config};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to read configuration file {path:?}"))]
    ReadFile {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to read configuration"))]
    ReadInput { source: std::io::Error },

    #[snafu(display(
        "cannot determine the format of configuration file {path:?}, expected a .yaml, .yml or .json extension"
    ))]
    UnsupportedFormat { path: PathBuf },

    #[snafu(display("failed to parse configuration as YAML"))]
    ParseYaml { source: serde_yaml::Error },

    #[snafu(display("failed to parse configuration as JSON"))]
    ParseJson { source: serde_json::Error },

    #[snafu(display("failed to resolve YAML merge keys"))]
    ResolveMergeKeys { source: serde_yaml::Error },

    #[snafu(display("configuration does not match the expected schema"))]
    Schema { source: serde_yaml::Error },

    #[snafu(display("failed to encode configuration as YAML"))]
    Encode { source: yaml::Error },
}

/// The document formats configuration can be written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Format {
    #[strum(to_string = "yaml", serialize = "yml")]
    Yaml,
    Json,
}

impl Format {
    /// Derives the format from the extension of `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(OsStr::to_str)
            .and_then(|extension| extension.parse().ok())
            .context(UnsupportedFormatSnafu { path })
    }

    fn parse_value(self, input: &str) -> Result<Value> {
        let value = match self {
            Self::Yaml => {
                let Document(mut value) = serde_yaml::from_str(input).context(ParseYamlSnafu)?;
                value.apply_merge().context(ResolveMergeKeysSnafu)?;
                value
            }
            Self::Json => {
                let Document(value) = serde_json::from_str(input).context(ParseJsonSnafu)?;
                value
            }
        };

        // An empty document describes an empty configuration
        Ok(match value {
            Value::Null => Value::Mapping(serde_yaml::Mapping::new()),
            value => value,
        })
    }
}

/// Decodes a single document.
pub fn from_str(input: &str, format: Format) -> Result<Config> {
    decode(format.parse_value(input)?)
}

/// Decodes a single document read from `reader`.
pub fn from_reader<R: Read>(mut reader: R, format: Format) -> Result<Config> {
    let mut input = String::new();
    reader.read_to_string(&mut input).context(ReadInputSnafu)?;
    from_str(&input, format)
}

/// Decodes a single document from a file, the format is derived from its extension.
pub fn from_file(path: impl AsRef<Path>) -> Result<Config> {
    ConfigLoader::new().file(path).load()
}

/// Encodes `config` as an explicit YAML document.
pub fn to_yaml_string(config: &Config) -> Result<String> {
    yaml::to_string(config, &SerializeOptions::default()).context(EncodeSnafu)
}

fn decode(value: Value) -> Result<Config> {
    let config: Config = serde_yaml::from_value(value).context(SchemaSnafu)?;

    tracing::debug!(
        deployments = config.deployments.len(),
        services = config.services.len(),
        ingresses = config.ingresses.len(),
        statefulsets = config.stateful_sets.len(),
        "decoded configuration"
    );

    Ok(config)
}

#[derive(Debug)]
enum Source {
    File(PathBuf),
    Inline { input: String, format: Format },
}

/// Loads a [`Config`] from one or more layered sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    sources: Vec<Source>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file source, its format is derived from the file extension.
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.sources.push(Source::File(path.as_ref().to_path_buf()));
        self
    }

    /// Adds an in-memory source.
    pub fn source(mut self, input: impl Into<String>, format: Format) -> Self {
        self.sources.push(Source::Inline {
            input: input.into(),
            format,
        });
        self
    }

    /// Reads, merges and decodes all sources in the order they were added. Without any source
    /// an empty [`Config`] is returned.
    pub fn load(self) -> Result<Config> {
        let mut merged = Value::Mapping(serde_yaml::Mapping::new());

        for source in self.sources {
            let value = match source {
                Source::File(path) => {
                    let format = Format::from_path(&path)?;
                    let input =
                        std::fs::read_to_string(&path).context(ReadFileSnafu { path: &path })?;
                    tracing::debug!(path = %path.display(), %format, "read configuration file");
                    format.parse_value(&input)?
                }
                Source::Inline { input, format } => format.parse_value(&input)?,
            };

            yaml::merge(&mut merged, value);
        }

        let config = decode(merged)?;
        tracing::info!(
            resources = config.resources().count(),
            "loaded configuration"
        );

        Ok(config)
    }
}
