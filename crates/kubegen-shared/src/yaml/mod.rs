//! Utility functions for processing data in the YAML file format
use std::io::Write;

use serde_yaml::{Mapping, Value};
use snafu::{ResultExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Represents every error which can be encountered during YAML serialization.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to serialize YAML"))]
    SerializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to write YAML document separator"))]
    WriteDocumentSeparator { source: std::io::Error },

    #[snafu(display("failed to parse bytes as valid UTF-8 string"))]
    ParseUtf8Bytes { source: std::string::FromUtf8Error },
}

/// Provides configurable options during YAML serialization.
///
/// For most people the default implementation [`SerializeOptions::default()`] is sufficient as it
/// enables explicit document and singleton map serialization.
pub struct SerializeOptions {
    /// Adds leading triple dashes (`---`) to the output string.
    pub explicit_document: bool,

    /// Serialize enum variants as YAML maps using the variant name as the key.
    pub singleton_map: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            explicit_document: true,
            singleton_map: true,
        }
    }
}

/// Serializes the given data structure and writes it to a [`Writer`](Write).
pub fn serialize<T, W>(value: &T, mut writer: W, options: &SerializeOptions) -> Result<()>
where
    T: serde::Serialize,
    W: Write,
{
    if options.explicit_document {
        writer
            .write_all(b"---\n")
            .context(WriteDocumentSeparatorSnafu)?;
    }

    let mut serializer = serde_yaml::Serializer::new(writer);

    if options.singleton_map {
        serde_yaml::with::singleton_map_recursive::serialize(value, &mut serializer)
            .context(SerializeYamlSnafu)?;
    } else {
        value
            .serialize(&mut serializer)
            .context(SerializeYamlSnafu)?;
    }

    Ok(())
}

/// Serializes the given data structure into a YAML [`String`].
///
/// # Example
///
/// ```
/// use serde::Serialize;
/// use kubegen_shared::yaml::{self, SerializeOptions};
///
/// #[derive(Serialize)]
/// struct Service {
///     name: String,
///     port: u16,
/// }
///
/// let value = Service {
///     name: "web".into(),
///     port: 80,
/// };
///
/// let actual_yaml = yaml::to_string(&value, &SerializeOptions::default()).unwrap();
/// let expected_yaml = "---
/// name: web
/// port: 80
/// ";
///
/// assert_eq!(expected_yaml, actual_yaml);
/// ```
pub fn to_string<T>(value: &T, options: &SerializeOptions) -> Result<String>
where
    T: serde::Serialize,
{
    let mut buffer = Vec::new();
    serialize(value, &mut buffer, options)?;
    String::from_utf8(buffer).context(ParseUtf8BytesSnafu)
}

/// Merges `overlay` into `base`.
///
/// Mappings are merged key by key, recursively. Every other value (scalars, sequences, `null`)
/// in `overlay` replaces the value in `base` as a whole. Keys only present in `base` are kept.
///
/// ```
/// use indoc::indoc;
/// use kubegen_shared::yaml::merge;
///
/// let mut base: serde_yaml::Value = serde_yaml::from_str(indoc! {"
///     service:
///       name: web
///       port: 80
/// "}).unwrap();
/// let overlay: serde_yaml::Value = serde_yaml::from_str("service: {port: 8080}").unwrap();
///
/// merge(&mut base, overlay);
///
/// assert_eq!(base["service"]["name"], "web");
/// assert_eq!(base["service"]["port"], 8080);
/// ```
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => merge_mappings(base, overlay),
        (base, overlay) => *base = overlay,
    }
}

fn merge_mappings(base: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => merge(existing, value),
            None => {
                tracing::trace!(?key, "adding key from overlay");
                base.insert(key, value);
            }
        }
    }
}
