use std::{fmt::Display, ops::Deref, str::FromStr, sync::LazyLock};

use regex::Regex;
use snafu::{ResultExt, Snafu, ensure};

const KEY_PREFIX_MAX_LEN: usize = 253;
const KEY_NAME_MAX_LEN: usize = 63;

// Lazily initialized regular expressions
static KEY_PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z](\.?[a-zA-Z0-9-])*\.[a-zA-Z]{2,}\.?$")
        .expect("failed to compile key prefix regex")
});

static KEY_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9A-Z]([a-z0-9A-Z-_.]*[a-z0-9A-Z]+)?$")
        .expect("failed to compile key name regex")
});

/// The error type for key parsing/validation operations.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum KeyError {
    /// The key must at least contain a name. The prefix is optional.
    #[snafu(display("key input cannot be empty"))]
    EmptyInput,

    /// Keys like `app.kubernetes.io/nested/name` contain more than one prefix.
    #[snafu(display("key prefixes cannot be nested, only use a single slash"))]
    NestedPrefix,

    #[snafu(display("failed to parse key prefix"))]
    KeyPrefixError { source: KeyPrefixError },

    #[snafu(display("failed to parse key name"))]
    KeyNameError { source: KeyNameError },
}

/// The key of a label or annotation. It contains an optional prefix, and a required name.
///
/// The general format is `(<PREFIX>/)<NAME>`. The Kubernetes documentation defines the format
/// and allowed characters in more detail [here][k8s-labels].
///
/// ```
/// use kubegen::kvp::Key;
///
/// let key: Key = "app.kubernetes.io/name".parse().unwrap();
/// assert_eq!(key.prefix().map(|prefix| &**prefix), Some("app.kubernetes.io"));
/// assert_eq!(&**key.name(), "name");
/// ```
///
/// [k8s-labels]: https://kubernetes.io/docs/concepts/overview/working-with-objects/labels/
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    prefix: Option<KeyPrefix>,
    name: KeyName,
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        ensure!(!input.is_empty(), EmptyInputSnafu);

        let (prefix, name) = match input.split('/').collect::<Vec<_>>()[..] {
            [name] => (None, name),
            [prefix, name] => (Some(prefix), name),
            _ => return NestedPrefixSnafu.fail(),
        };

        Ok(Self {
            prefix: prefix
                .map(KeyPrefix::from_str)
                .transpose()
                .context(KeyPrefixSnafu)?,
            name: KeyName::from_str(name).context(KeyNameSnafu)?,
        })
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}/{}", prefix, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl Key {
    pub fn prefix(&self) -> Option<&KeyPrefix> {
        self.prefix.as_ref()
    }

    pub fn name(&self) -> &KeyName {
        &self.name
    }
}

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum KeyPrefixError {
    /// Prevents keys like `/name`.
    #[snafu(display("prefix segment of key cannot be empty"))]
    PrefixEmpty,

    #[snafu(display(
        "prefix segment of key exceeds the maximum length - expected 253 characters or less, got {length}"
    ))]
    PrefixTooLong { length: usize },

    #[snafu(display("prefix segment of key contains non-ascii characters"))]
    PrefixNotAscii,

    #[snafu(display("prefix segment of key violates kubernetes format"))]
    PrefixInvalid,
}

/// A validated optional prefix segment of a [`Key`], a DNS subdomain.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPrefix(String);

impl FromStr for KeyPrefix {
    type Err = KeyPrefixError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        ensure!(!input.is_empty(), PrefixEmptySnafu);
        ensure!(
            input.len() <= KEY_PREFIX_MAX_LEN,
            PrefixTooLongSnafu {
                length: input.len()
            }
        );
        ensure!(input.is_ascii(), PrefixNotAsciiSnafu);
        ensure!(KEY_PREFIX_REGEX.is_match(input), PrefixInvalidSnafu);

        Ok(Self(input.to_owned()))
    }
}

impl Deref for KeyPrefix {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for KeyPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum KeyNameError {
    #[snafu(display("name segment of key cannot be empty"))]
    NameEmpty,

    #[snafu(display(
        "name segment of key exceeds the maximum length - expected 63 characters or less, got {length}"
    ))]
    NameTooLong { length: usize },

    #[snafu(display("name segment of key contains non-ascii characters"))]
    NameNotAscii,

    #[snafu(display("name segment of key violates kubernetes format"))]
    NameInvalid,
}

/// A validated name segment of a [`Key`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyName(String);

impl FromStr for KeyName {
    type Err = KeyNameError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        ensure!(!input.is_empty(), NameEmptySnafu);
        ensure!(
            input.len() <= KEY_NAME_MAX_LEN,
            NameTooLongSnafu {
                length: input.len()
            }
        );
        ensure!(input.is_ascii(), NameNotAsciiSnafu);
        ensure!(KEY_NAME_REGEX.is_match(input), NameInvalidSnafu);

        Ok(Self(input.to_owned()))
    }
}

impl Deref for KeyName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for KeyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("app", None, "app")]
    #[case(" app ", None, "app")]
    #[case("app.kubernetes.io/name", Some("app.kubernetes.io"), "name")]
    #[case("example.com/team_name", Some("example.com"), "team_name")]
    #[case("tier", None, "tier")]
    fn key_valid(#[case] input: &str, #[case] prefix: Option<&str>, #[case] name: &str) {
        let key = Key::from_str(input).expect("key is valid");

        assert_eq!(key.prefix().map(|p| &**p), prefix);
        assert_eq!(&**key.name(), name);
        assert_eq!(
            key.to_string(),
            prefix.map_or_else(|| name.to_owned(), |p| format!("{p}/{name}"))
        );
    }

    #[rstest]
    #[case("", KeyError::EmptyInput)]
    #[case("a/b/c", KeyError::NestedPrefix)]
    #[case("/name", KeyError::KeyPrefixError { source: KeyPrefixError::PrefixEmpty })]
    #[case("localhost/name", KeyError::KeyPrefixError { source: KeyPrefixError::PrefixInvalid })]
    #[case("exämple.com/name", KeyError::KeyPrefixError { source: KeyPrefixError::PrefixNotAscii })]
    #[case("example.com/", KeyError::KeyNameError { source: KeyNameError::NameEmpty })]
    #[case("-name", KeyError::KeyNameError { source: KeyNameError::NameInvalid })]
    #[case("name-", KeyError::KeyNameError { source: KeyNameError::NameInvalid })]
    #[case("nämé", KeyError::KeyNameError { source: KeyNameError::NameNotAscii })]
    fn key_invalid(#[case] input: &str, #[case] error: KeyError) {
        assert_eq!(Key::from_str(input), Err(error));
    }

    #[test]
    fn key_name_too_long() {
        let input = "a".repeat(64);
        assert_eq!(
            Key::from_str(&input),
            Err(KeyError::KeyNameError {
                source: KeyNameError::NameTooLong { length: 64 }
            })
        );
    }
}
