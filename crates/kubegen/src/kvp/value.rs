use std::{fmt::Display, ops::Deref, str::FromStr, sync::LazyLock};

use regex::Regex;
use snafu::{Snafu, ensure};

const LABEL_VALUE_MAX_LEN: usize = 63;

// Lazily initialized regular expressions
static LABEL_VALUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9A-Z]([a-z0-9A-Z-_.]*[a-z0-9A-Z]+)?$")
        .expect("failed to compile value regex")
});

/// The error type for label value parse/validation operations.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum LabelValueError {
    #[snafu(display(
        "value exceeds the maximum length - expected 63 characters or less, got {length}"
    ))]
    ValueTooLong { length: usize },

    #[snafu(display("value contains non-ascii characters"))]
    ValueNotAscii,

    #[snafu(display("value violates kubernetes format"))]
    ValueInvalid,
}

/// A validated Kubernetes label value.
///
/// Instances of this struct are always valid. Unlike keys, label values may be empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelValue(String);

impl FromStr for LabelValue {
    type Err = LabelValueError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        ensure!(
            input.len() <= LABEL_VALUE_MAX_LEN,
            ValueTooLongSnafu {
                length: input.len()
            }
        );
        ensure!(input.is_ascii(), ValueNotAsciiSnafu);
        ensure!(
            input.is_empty() || LABEL_VALUE_REGEX.is_match(input),
            ValueInvalidSnafu
        );

        Ok(Self(input.to_owned()))
    }
}

impl Deref for LabelValue {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for LabelValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("")]
    #[case("v1")]
    #[case("frontend.web_2")]
    fn valid_value(#[case] input: &str) {
        assert_eq!(&*LabelValue::from_str(input).expect("value is valid"), input);
    }

    #[rstest]
    #[case("a".repeat(64), LabelValueError::ValueTooLong { length: 64 })]
    #[case("foo-", LabelValueError::ValueInvalid)]
    #[case("two words", LabelValueError::ValueInvalid)]
    #[case("ä", LabelValueError::ValueNotAscii)]
    fn invalid_value(#[case] input: String, #[case] error: LabelValueError) {
        assert_eq!(LabelValue::from_str(&input), Err(error));
    }
}
