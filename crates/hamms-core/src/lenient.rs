//! Settings that may be written either as a value or as text.
//!
//! Environment overrides reach the config loader as TOML strings
//! (`HAMMS_RANKING_TOP_K=5` becomes `top_k = '5'`), so numeric settings
//! accept both `5` and `'5'`.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// A value, or text that parses into one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Value(T),
    Text(String),
}

impl<T> Lenient<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    /// The value, parsing it from text if needed.
    ///
    /// # Errors
    ///
    /// Returns the parse error message when the text is not a valid `T`.
    pub fn into_value(self) -> Result<T, String> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Text(text) => text
                .trim()
                .parse()
                .map_err(|e| format!("invalid value '{}': {}", text, e)),
        }
    }
}

/// For `#[serde(deserialize_with = "...")]` on an optional numeric field.
pub fn deserialize_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    Option::<Lenient<T>>::deserialize(deserializer)?
        .map(Lenient::into_value)
        .transpose()
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Limits {
        #[serde(default, deserialize_with = "deserialize_option")]
        count: Option<usize>,
        #[serde(default, deserialize_with = "deserialize_option")]
        ratio: Option<f64>,
    }

    #[test]
    fn test_value_or_text() {
        assert_eq!(Lenient::Value(2.5).into_value(), Ok(2.5));
        assert_eq!(Lenient::<f64>::Text(" 2.5 ".to_string()).into_value(), Ok(2.5));
        assert!(Lenient::<usize>::Text("many".to_string()).into_value().is_err());
    }

    #[test]
    fn test_optional_fields_from_toml() {
        let limits: Limits = toml::from_str("count = 5\nratio = 0.6\n").unwrap();
        assert_eq!(limits.count, Some(5));
        assert_eq!(limits.ratio, Some(0.6));

        let limits: Limits = toml::from_str("count = '5'\nratio = '0.6'\n").unwrap();
        assert_eq!(limits.count, Some(5));
        assert_eq!(limits.ratio, Some(0.6));

        let limits: Limits = toml::from_str("").unwrap();
        assert!(limits.count.is_none());
        assert!(limits.ratio.is_none());

        assert!(toml::from_str::<Limits>("count = '-1'\n").is_err());
    }

    #[test]
    fn test_optional_fields_from_json_null() {
        let limits: Limits = serde_json::from_str(r#"{"count": null, "ratio": 1}"#).unwrap();
        assert!(limits.count.is_none());
        assert_eq!(limits.ratio, Some(1.0));
    }
}
