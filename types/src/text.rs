use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Text with at least one non-whitespace character. The original spelling
/// is kept; only the emptiness check trims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, Error)]
#[error("value must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(EmptyStringError);
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::NonEmptyString;

    #[test]
    fn blank_text_is_rejected() {
        assert!(NonEmptyString::new("").is_err());
        assert!(NonEmptyString::new(" \t\n").is_err());
    }

    #[test]
    fn spelling_is_preserved() {
        let goal = NonEmptyString::new(" check my rule ").unwrap();
        assert_eq!(goal.as_str(), " check my rule ");
        assert_eq!(String::from(goal), " check my rule ");
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<NonEmptyString>("\"  \"").is_err());
        let parsed: NonEmptyString = serde_json::from_str("\"goal\"").unwrap();
        assert_eq!(parsed.to_string(), "goal");
    }
}
