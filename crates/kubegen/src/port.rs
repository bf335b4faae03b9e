//! Parsing of container, service and ingress backend ports.
use std::{fmt::Display, str::FromStr, sync::LazyLock};

use regex::Regex;
use snafu::{Snafu, ensure};

const PORT_NAME_MAX_LEN: usize = 15;

// Lazily initialized regular expressions
static PORT_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").expect("failed to compile port name regex")
});

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum PortError {
    #[snafu(display("port cannot be empty"))]
    EmptyPort,

    #[snafu(display("port {input:?} is not a number"))]
    NotANumber { input: String },

    #[snafu(display("port {port} is out of range - expected a value between 1 and 65535"))]
    OutOfRange { port: String },

    #[snafu(display(
        "port name {name:?} exceeds the maximum length - expected 15 characters or less, got {length}"
    ))]
    NameTooLong { name: String, length: usize },

    #[snafu(display(
        "port name {name:?} must consist of lower case alphanumeric characters or '-' and must start and end with an alphanumeric character"
    ))]
    NameInvalid { name: String },

    #[snafu(display("port name {name:?} cannot contain consecutive '-' characters"))]
    NameConsecutiveHyphens { name: String },

    #[snafu(display("port name {name:?} must contain at least one letter"))]
    NameWithoutLetter { name: String },
}

/// Returns the port if `port` is a valid TCP/UDP port number (1-65535).
pub fn check_port(port: i64) -> Result<u16, PortError> {
    match u16::try_from(port) {
        Ok(port) if port != 0 => Ok(port),
        _ => OutOfRangeSnafu {
            port: port.to_string(),
        }
        .fail(),
    }
}

/// Parses a textual port number made of decimal digits only, surrounding whitespace is ignored.
///
/// ```
/// use kubegen::port::{PortError, parse_port};
///
/// assert_eq!(parse_port("8080"), Ok(8080));
/// assert_eq!(
///     parse_port("0"),
///     Err(PortError::OutOfRange { port: "0".into() })
/// );
/// ```
pub fn parse_port(input: &str) -> Result<u16, PortError> {
    let trimmed = input.trim();
    ensure!(!trimmed.is_empty(), EmptyPortSnafu);
    ensure!(
        trimmed.bytes().all(|b| b.is_ascii_digit()),
        NotANumberSnafu { input }
    );

    // Only overflow can fail here
    match trimmed.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => OutOfRangeSnafu { port: trimmed }.fail(),
    }
}

/// A reference to a port of a backend, either by number or by name.
///
/// Named ports follow the IANA service name rules, which Kubernetes uses for the `name` of a
/// container or service port.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PortRef {
    Number(u16),
    Named(String),
}

impl FromStr for PortRef {
    type Err = PortError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        ensure!(!input.is_empty(), EmptyPortSnafu);

        if input.bytes().all(|b| b.is_ascii_digit()) {
            return parse_port(input).map(Self::Number);
        }

        ensure!(
            input.len() <= PORT_NAME_MAX_LEN,
            NameTooLongSnafu {
                name: input,
                length: input.len()
            }
        );
        ensure!(PORT_NAME_REGEX.is_match(input), NameInvalidSnafu { name: input });
        ensure!(
            !input.contains("--"),
            NameConsecutiveHyphensSnafu { name: input }
        );
        ensure!(
            input.bytes().any(|b| b.is_ascii_lowercase()),
            NameWithoutLetterSnafu { name: input }
        );

        Ok(Self::Named(input.to_owned()))
    }
}

impl Display for PortRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(port) => write!(f, "{port}"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}
