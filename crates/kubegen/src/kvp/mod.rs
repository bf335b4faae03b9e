//! Parsing of Kubernetes label and annotation keys and values.
//!
//! The configuration model stores labels as a single `key=value` string and annotations as a
//! bare key. The types in this module turn those strings into validated [`Key`]s and
//! [`LabelValue`]s.
use std::str::FromStr;

use snafu::{OptionExt, ResultExt, Snafu};

mod key;
mod value;

pub use key::*;
pub use value::*;

/// The error type for parsing a `key=value` label.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum LabelError {
    #[snafu(display("label {input:?} is missing the '=' separator between key and value"))]
    MissingSeparator { input: String },

    #[snafu(display("failed to parse key of label {input:?}"))]
    InvalidKey { source: KeyError, input: String },

    #[snafu(display("failed to parse value of label {input:?}"))]
    InvalidValue {
        source: LabelValueError,
        input: String,
    },
}

/// Parses a label of the form `key=value`, splitting at the first `=`.
///
/// ```
/// use kubegen::kvp::parse_label;
///
/// let (key, value) = parse_label("app.kubernetes.io/name=web").unwrap();
/// assert_eq!(key.to_string(), "app.kubernetes.io/name");
/// assert_eq!(&*value, "web");
/// ```
pub fn parse_label(input: &str) -> Result<(Key, LabelValue), LabelError> {
    let (key, value) = input
        .split_once('=')
        .context(MissingSeparatorSnafu { input })?;

    let key = Key::from_str(key).context(InvalidKeySnafu { input })?;
    let value = LabelValue::from_str(value.trim()).context(InvalidValueSnafu { input })?;

    Ok((key, value))
}
