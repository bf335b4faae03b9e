// This is adapted from Kubernetes.
// See apimachinery/pkg/util/validation/validation.go in the Kubernetes source

use std::{fmt::Display, sync::LazyLock};

use const_format::concatcp;
use regex::Regex;
use snafu::Snafu;

use super::Errors;

/// Minimal length required by RFC 1123 is 63. Up to 255 allowed, unsupported by k8s.
const RFC_1123_LABEL_MAX_LENGTH: usize = 63;
const RFC_1123_LABEL_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?";
const RFC_1123_LABEL_ERROR_MSG: &str = "a lowercase RFC 1123 label must consist of lower case alphanumeric characters or '-', and must start and end with an alphanumeric character";

/// This is a subdomain's max length in DNS (RFC 1123)
const RFC_1123_SUBDOMAIN_MAX_LENGTH: usize = 253;
const RFC_1123_SUBDOMAIN_FMT: &str =
    concatcp!(RFC_1123_LABEL_FMT, "(\\.", RFC_1123_LABEL_FMT, ")*");
const RFC_1123_SUBDOMAIN_ERROR_MSG: &str = "a lowercase RFC 1123 subdomain must consist of lower case alphanumeric characters, '-' or '.', and must start and end with an alphanumeric character";

const RFC_1035_LABEL_FMT: &str = "[a-z]([-a-z0-9]*[a-z0-9])?";
const RFC_1035_LABEL_ERROR_MSG: &str = "a DNS-1035 label must consist of lower case alphanumeric characters or '-', start with an alphabetic character, and end with an alphanumeric character";

// This is a label's max length in DNS (RFC 1035)
const RFC_1035_LABEL_MAX_LENGTH: usize = 63;

// Lazily initialized regular expressions
static RFC_1123_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{RFC_1123_LABEL_FMT}$")).expect("failed to compile RFC 1123 label regex")
});

static RFC_1123_SUBDOMAIN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{RFC_1123_SUBDOMAIN_FMT}$"))
        .expect("failed to compile RFC 1123 subdomain regex")
});

static RFC_1035_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{RFC_1035_LABEL_FMT}$")).expect("failed to compile RFC 1035 label regex")
});

type Result<T = (), E = Errors<NameError>> = std::result::Result<T, E>;

/// A single violated naming rule.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum NameError {
    #[snafu(transparent)]
    Regex { source: RegexError },

    #[snafu(display("input is {length} bytes long but must be no more than {max_length}"))]
    TooLong { length: usize, max_length: usize },
}

#[derive(Debug, PartialEq, Eq)]
pub struct RegexError {
    /// The primary error message.
    msg: &'static str,

    /// The regex that the input must match.
    regex: &'static str,

    /// Examples of valid inputs (if non-empty).
    examples: &'static [&'static str],
}

impl Display for RegexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self {
            msg,
            regex,
            examples,
        } = self;
        write!(f, "{msg} (")?;
        for (i, example) in examples.iter().enumerate() {
            let prefix = match i {
                0 => "e.g.",
                _ => "or",
            };
            write!(f, "{prefix} {example:?}, ")?;
        }
        write!(f, "regex used for validation is {regex:?})")
    }
}

impl std::error::Error for RegexError {}

/// Returns [`Ok`] if `value`'s length fits within `max_length`.
fn validate_str_length(value: &str, max_length: usize) -> Result<(), NameError> {
    if value.len() > max_length {
        TooLongSnafu {
            length: value.len(),
            max_length,
        }
        .fail()
    } else {
        Ok(())
    }
}

/// Returns [`Ok`] if `value` matches `regex`.
fn validate_str_regex(
    value: &str,
    regex: &'static Regex,
    error_msg: &'static str,
    examples: &'static [&'static str],
) -> Result<(), NameError> {
    if regex.is_match(value) {
        Ok(())
    } else {
        Err(RegexError {
            msg: error_msg,
            regex: regex
                .as_str()
                // Clean up start/end-of-line markers
                .trim_start_matches('^')
                .trim_end_matches('$'),
            examples,
        }
        .into())
    }
}

/// Returns [`Ok`] if *all* validations are [`Ok`], otherwise returns all errors.
fn validate_all(validations: impl IntoIterator<Item = Result<(), NameError>>) -> Result {
    let errors = validations
        .into_iter()
        .filter_map(Result::err)
        .collect::<Vec<_>>();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Errors(errors))
    }
}

/// Tests for a string that conforms to the definition of a lowercase label in DNS (RFC 1123).
/// This is what Kubernetes requires for container names.
pub fn is_rfc_1123_label(value: &str) -> Result {
    validate_all([
        validate_str_length(value, RFC_1123_LABEL_MAX_LENGTH),
        validate_str_regex(
            value,
            &RFC_1123_LABEL_REGEX,
            RFC_1123_LABEL_ERROR_MSG,
            &["example-label", "1-label-1"],
        ),
    ])
}

/// Tests for a string that conforms to the definition of a lowercase subdomain in DNS
/// (RFC 1123). Most object names, like Deployment and Ingress names, use this format.
pub fn is_rfc_1123_subdomain(value: &str) -> Result {
    validate_all([
        validate_str_length(value, RFC_1123_SUBDOMAIN_MAX_LENGTH),
        validate_str_regex(
            value,
            &RFC_1123_SUBDOMAIN_REGEX,
            RFC_1123_SUBDOMAIN_ERROR_MSG,
            &["example.com"],
        ),
    ])
}

/// Tests for a string that conforms to the definition of a label in DNS (RFC 1035).
/// Service names use this format.
pub fn is_rfc_1035_label(value: &str) -> Result {
    validate_all([
        validate_str_length(value, RFC_1035_LABEL_MAX_LENGTH),
        validate_str_regex(
            value,
            &RFC_1035_LABEL_REGEX,
            RFC_1035_LABEL_ERROR_MSG,
            &["my-name", "abc-123"],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("")]
    #[case("-")]
    #[case("a-")]
    #[case("-a")]
    #[case("_")]
    #[case("a_b")]
    #[case(".")]
    #[case("a.")]
    #[case(".a")]
    #[case("a..b")]
    #[case("a b")]
    #[case("A")]
    #[case("aBc")]
    #[case("a@b")]
    #[case(&"a".repeat(254))]
    fn is_rfc_1123_subdomain_fail(#[case] value: &str) {
        assert!(is_rfc_1123_subdomain(value).is_err());
    }

    #[rstest]
    #[case("a")]
    #[case("ab")]
    #[case("a1")]
    #[case("a-1")]
    #[case("a--1--2--b")]
    #[case("0")]
    #[case("1a")]
    #[case("a.a")]
    #[case("a1.1")]
    #[case("a--1--2--b.a")]
    #[case("a.b.c.d.e")]
    #[case(&"a".repeat(253))]
    fn is_rfc_1123_subdomain_pass(#[case] value: &str) {
        assert_eq!(is_rfc_1123_subdomain(value), Ok(()));
    }

    #[rstest]
    #[case("a.b")]
    #[case("a-")]
    #[case("")]
    #[case(&"a".repeat(64))]
    fn is_rfc_1123_label_fail(#[case] value: &str) {
        assert!(is_rfc_1123_label(value).is_err());
    }

    #[rstest]
    #[case("sidecar")]
    #[case("1-label-1")]
    #[case(&"a".repeat(63))]
    fn is_rfc_1123_label_pass(#[case] value: &str) {
        assert_eq!(is_rfc_1123_label(value), Ok(()));
    }

    #[rstest]
    #[case("1a")]
    #[case("a.b")]
    #[case("a-")]
    #[case("Web")]
    fn is_rfc_1035_label_fail(#[case] value: &str) {
        assert!(is_rfc_1035_label(value).is_err());
    }

    #[rstest]
    #[case("web")]
    #[case("abc-123")]
    fn is_rfc_1035_label_pass(#[case] value: &str) {
        assert_eq!(is_rfc_1035_label(value), Ok(()));
    }

    #[test]
    fn errors_are_collected() {
        let errors = is_rfc_1035_label(&format!("1{}", "a".repeat(63)))
            .expect_err("name is invalid");

        assert_eq!(errors.len(), 2);
        assert!(matches!(
            errors.iter().next(),
            Some(NameError::TooLong {
                length: 64,
                max_length: 63
            })
        ));
    }
}
