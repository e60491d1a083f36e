//! Flat build attributes of a version node

use crate::indent::{to_prefixed_json, IndentedJson};
use crate::{Result, VersionError};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};

/// Build variable holding the commit id
pub const ENV_COMMIT_ID: &str = "VERSTAMP_COMMIT_ID";
/// Build variable holding the RFC 3339 commit date
pub const ENV_COMMIT_DATE: &str = "VERSTAMP_COMMIT_DATE";
/// Build variable holding the RFC 3339 build date
pub const ENV_BUILD_DATE: &str = "VERSTAMP_BUILD_DATE";
/// Build variable holding the project home page
pub const ENV_HOME_PAGE: &str = "VERSTAMP_HOME_PAGE";
/// Build variable holding the artifact hash
pub const ENV_HASH: &str = "VERSTAMP_HASH";

/// Build and version attributes
///
/// Empty strings and unset dates are left out of every encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(rename = "CommitID", default, skip_serializing_if = "String::is_empty")]
    pub commit_id: String,

    #[serde(
        rename = "CommitDate",
        default,
        skip_serializing_if = "Option::is_none",
        with = "rfc3339"
    )]
    pub commit_date: Option<DateTime<FixedOffset>>,

    #[serde(
        rename = "BuildDate",
        default,
        skip_serializing_if = "Option::is_none",
        with = "rfc3339"
    )]
    pub build_date: Option<DateTime<FixedOffset>>,

    #[serde(rename = "HomePage", default, skip_serializing_if = "String::is_empty")]
    pub home_page: String,

    #[serde(rename = "Hash", default, skip_serializing_if = "String::is_empty")]
    pub hash: String,
}

impl Attributes {
    /// Create attributes holding only a commit id
    pub fn with_commit(commit_id: impl Into<String>) -> Self {
        Self {
            commit_id: commit_id.into(),
            ..Self::default()
        }
    }

    /// True when no field is populated
    pub fn is_empty(&self) -> bool {
        self.commit_id.is_empty()
            && self.commit_date.is_none()
            && self.build_date.is_none()
            && self.home_page.is_empty()
            && self.hash.is_empty()
    }

    /// Human-readable summary.
    ///
    /// Each populated field becomes a `Key: value` line preceded by a newline
    /// and a tab, in the order HomePage, CommitID, CommitDate, BuildDate, Hash.
    /// Returns an empty string when nothing is populated.
    pub fn summary(&self) -> String {
        let mut values = Vec::new();
        if !self.home_page.is_empty() {
            values.push(format!("HomePage: {}", self.home_page));
        }
        if !self.commit_id.is_empty() {
            values.push(format!("CommitID: {}", self.commit_id));
        }
        if let Some(date) = &self.commit_date {
            values.push(format!(
                "CommitDate: {}",
                date.to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }
        if let Some(date) = &self.build_date {
            values.push(format!(
                "BuildDate: {}",
                date.to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }
        if !self.hash.is_empty() {
            values.push(format!("Hash: {}", self.hash));
        }

        values.iter().map(|line| format!("\n\t{}", line)).collect()
    }

    /// Load attributes from the process environment
    pub fn from_build_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load attributes through `lookup`, which maps a `VERSTAMP_*` variable
    /// name to its value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let date = |key: &str| -> Result<Option<DateTime<FixedOffset>>> {
            match get(key) {
                Some(value) => DateTime::parse_from_rfc3339(&value)
                    .map(Some)
                    .map_err(|source| VersionError::InvalidTimestamp {
                        field: key.to_string(),
                        value,
                        source,
                    }),
                None => Ok(None),
            }
        };

        Ok(Self {
            commit_id: get(ENV_COMMIT_ID).unwrap_or_default(),
            commit_date: date(ENV_COMMIT_DATE)?,
            build_date: date(ENV_BUILD_DATE)?,
            home_page: get(ENV_HOME_PAGE).unwrap_or_default(),
            hash: get(ENV_HASH).unwrap_or_default(),
        })
    }
}

impl IndentedJson for Attributes {
    fn to_json_indent(&self, prefix: &str, indent: &str) -> Result<Vec<u8>> {
        to_prefixed_json(self, prefix, indent)
    }
}

/// RFC 3339 encoding for optional timestamps
mod rfc3339 {
    use chrono::{DateTime, FixedOffset, SecondsFormat};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<FixedOffset>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&format(date)),
            None => serializer.serialize_none(),
        }
    }

    /// RFC 3339 with nanoseconds, trailing zero digits of the fraction and a
    /// bare dot removed
    pub fn format(date: &DateTime<FixedOffset>) -> String {
        let text = date.to_rfc3339_opts(SecondsFormat::Nanos, true);
        let Some(dot) = text.find('.') else {
            return text;
        };
        let end = text[dot + 1..]
            .find(|c: char| !c.is_ascii_digit())
            .map_or(text.len(), |offset| dot + 1 + offset);
        let fraction = text[dot + 1..end].trim_end_matches('0');

        let mut out = String::with_capacity(text.len());
        out.push_str(&text[..dot]);
        if !fraction.is_empty() {
            out.push('.');
            out.push_str(fraction);
        }
        out.push_str(&text[end..]);
        out
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => DateTime::parse_from_rfc3339(&text)
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid RFC 3339 timestamp {:?}: {}", text, e))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn date(text: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(text).unwrap()
    }

    fn full() -> Attributes {
        Attributes {
            commit_id: "abc123".to_string(),
            commit_date: Some(date("2020-01-02T03:04:05Z")),
            build_date: Some(date("2020-01-03T10:00:00.5+02:00")),
            home_page: "https://example.org".to_string(),
            hash: "deadbeef".to_string(),
        }
    }

    #[test]
    fn test_compact_omits_empty_fields() {
        let json = serde_json::to_string(&Attributes::with_commit("abc123")).unwrap();
        assert_eq!(json, r#"{"CommitID":"abc123"}"#);
        assert_eq!(serde_json::to_string(&Attributes::default()).unwrap(), "{}");
    }

    #[test]
    fn test_compact_field_order_and_dates() {
        let json = serde_json::to_string(&full()).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"CommitID":"abc123","CommitDate":"2020-01-02T03:04:05Z","#,
                r#""BuildDate":"2020-01-03T10:00:00.5+02:00","#,
                r#""HomePage":"https://example.org","Hash":"deadbeef"}"#
            )
        );
    }

    #[test]
    fn test_fraction_trailing_zeros_dropped() {
        let encode = |text: &str| {
            let attrs = Attributes {
                commit_date: Some(date(text)),
                ..Attributes::default()
            };
            serde_json::to_string(&attrs).unwrap()
        };

        assert_eq!(encode("2020-01-03T10:00:00.5+02:00"), r#"{"CommitDate":"2020-01-03T10:00:00.5+02:00"}"#);
        assert_eq!(
            encode("2020-01-03T10:00:00.123456700Z"),
            r#"{"CommitDate":"2020-01-03T10:00:00.1234567Z"}"#
        );
        assert_eq!(encode("2020-01-03T10:00:00.000Z"), r#"{"CommitDate":"2020-01-03T10:00:00Z"}"#);
        assert_eq!(encode("2020-01-03T10:00:00-07:00"), r#"{"CommitDate":"2020-01-03T10:00:00-07:00"}"#);
    }

    #[test]
    fn test_from_build_env() {
        std::env::set_var(ENV_HOME_PAGE, "https://build.example.org");
        let attrs = Attributes::from_build_env();
        std::env::remove_var(ENV_HOME_PAGE);

        assert_eq!(attrs.unwrap().home_page, "https://build.example.org");
    }

    #[test]
    fn test_decode_round_trip() {
        let json = serde_json::to_string(&full()).unwrap();
        let back: Attributes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, full());
        assert_eq!(back.build_date.unwrap().offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn test_decode_rejects_bad_timestamp() {
        let result: std::result::Result<Attributes, _> = serde_json::from_str(r#"{"CommitDate":"yesterday"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_indented_attributes() {
        let out = Attributes::with_commit("abc").to_json_indent_string("  ", "  ").unwrap();
        assert_eq!(out, "{\n    \"CommitID\": \"abc\"\n  }\n");

        let empty = Attributes::default().to_json_indent_string("  ", "  ").unwrap();
        assert_eq!(empty, "{}\n");
    }

    #[test]
    fn test_summary_order() {
        assert_eq!(
            full().summary(),
            concat!(
                "\n\tHomePage: https://example.org",
                "\n\tCommitID: abc123",
                "\n\tCommitDate: 2020-01-02T03:04:05Z",
                "\n\tBuildDate: 2020-01-03T10:00:00+02:00",
                "\n\tHash: deadbeef",
            )
        );
    }

    #[test]
    fn test_summary_empty() {
        assert_eq!(Attributes::default().summary(), "");
        assert_eq!(Attributes::with_commit("x").summary(), "\n\tCommitID: x");
    }

    #[test]
    fn test_from_lookup() {
        let mut vars = HashMap::new();
        vars.insert(ENV_COMMIT_ID, "abc");
        vars.insert(ENV_BUILD_DATE, "2021-05-06T07:08:09Z");
        vars.insert(ENV_HASH, "");

        let attrs = Attributes::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(attrs.commit_id, "abc");
        assert_eq!(attrs.build_date, Some(date("2021-05-06T07:08:09Z")));
        assert!(attrs.commit_date.is_none());
        assert!(attrs.hash.is_empty());
    }

    #[test]
    fn test_from_lookup_bad_date() {
        let err = Attributes::from_lookup(|key| {
            (key == ENV_COMMIT_DATE).then(|| "not a date".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, VersionError::InvalidTimestamp { ref field, .. } if field == ENV_COMMIT_DATE));
    }
}
