use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Placeholder error text when a result has no data and no recorded error.
pub const NO_DATA_ERROR: &str = "Unable to obtain data";

/// Hierarchical cache key: collection, then operation, then region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CachePath {
    pub collection: String,
    pub operation: String,
    pub region: String,
}

impl CachePath {
    pub fn new(
        collection: impl Into<String>,
        operation: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            operation: operation.into(),
            region: region.into(),
        }
    }
}

impl std::fmt::Display for CachePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}@{}", self.collection, self.operation, self.region)
    }
}

/// A cached API response: either data, errors, or (malformed) neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult<T> {
    #[serde(
        default,
        alias = "error",
        deserialize_with = "deserialize_errors",
        skip_serializing_if = "Option::is_none"
    )]
    pub err: Option<Vec<String>>,
    #[serde(default)]
    pub data: Option<Vec<T>>,
}

impl<T> FetchResult<T> {
    pub fn ok(data: Vec<T>) -> Self {
        Self {
            err: None,
            data: Some(data),
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            err: Some(errors),
            data: None,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.err.as_ref().is_some_and(|e| !e.is_empty())
    }
}

/// Typed view of one cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    /// The path was never populated for this run.
    Absent,
    /// The fetch errored, returned no data, or returned data that does not
    /// decode into `T`. May be empty when data was simply missing.
    Failed(Vec<String>),
    Data(Vec<T>),
}

impl<T: DeserializeOwned> Fetched<T> {
    /// Classify a raw cache entry. Errors take precedence over data.
    ///
    /// An entry that is not shaped like a [`FetchResult`] (e.g. `null`, or
    /// `data` that is not a list) is `Failed` for its own path only.
    pub fn from_raw(raw: Option<Value>) -> Self {
        let Some(raw) = raw else {
            return Fetched::Absent;
        };

        let raw: FetchResult<Value> = match serde_json::from_value(raw) {
            Ok(raw) => raw,
            Err(e) => return Fetched::Failed(vec![format!("malformed cache entry: {e}")]),
        };

        if raw.has_errors() {
            return Fetched::Failed(raw.err.unwrap_or_default());
        }

        let Some(items) = raw.data else {
            return Fetched::Failed(Vec::new());
        };

        let mut decoded = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value(item) {
                Ok(value) => decoded.push(value),
                Err(e) => {
                    return Fetched::Failed(vec![format!("malformed record at index {index}: {e}")]);
                }
            }
        }
        Fetched::Data(decoded)
    }
}

/// Join error strings for a finding message.
///
/// # Examples
///
/// ```
/// use cloudguard_cache::describe_errors;
///
/// assert_eq!(describe_errors(&[]), "Unable to obtain data");
/// assert_eq!(
///     describe_errors(&["permission denied".to_string(), "quota".to_string()]),
///     "permission denied, quota"
/// );
/// ```
pub fn describe_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        NO_DATA_ERROR.to_string()
    } else {
        errors.join(", ")
    }
}

fn deserialize_errors<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorsInput {
        One(String),
        Many(Vec<String>),
        Other(Value),
    }

    Ok(match Option::<ErrorsInput>::deserialize(deserializer)? {
        None => None,
        Some(ErrorsInput::One(err)) => Some(vec![err]),
        Some(ErrorsInput::Many(errs)) => Some(errs),
        Some(ErrorsInput::Other(value)) => Some(vec![value.to_string()]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Item {
        name: String,
    }

    fn parse(value: Value) -> FetchResult<Value> {
        serde_json::from_value(value).expect("raw result should parse")
    }

    #[test]
    fn should_report_absent_when_path_was_never_populated() {
        assert_eq!(Fetched::<Item>::from_raw(None), Fetched::Absent);
    }

    #[test]
    fn should_prefer_errors_over_data() {
        let result = Some(json!({"err": ["permission denied"], "data": [{"name": "a"}]}));
        assert_eq!(
            Fetched::<Item>::from_raw(result),
            Fetched::Failed(vec!["permission denied".to_string()])
        );
    }

    #[test]
    fn should_treat_missing_data_as_failure_without_errors() {
        let result = Some(json!({"data": null}));
        assert_eq!(Fetched::<Item>::from_raw(result), Fetched::Failed(vec![]));
    }

    #[test]
    fn should_treat_empty_error_list_as_success() {
        let result = Some(json!({"err": [], "data": [{"name": "a"}]}));
        assert_eq!(
            Fetched::<Item>::from_raw(result),
            Fetched::Data(vec![Item {
                name: "a".to_string()
            }])
        );
    }

    #[test]
    fn should_accept_error_alias_and_scalar_error() {
        let result = parse(json!({"error": "quota exceeded"}));
        assert_eq!(result.err, Some(vec!["quota exceeded".to_string()]));

        let result = parse(json!({"err": {"code": 403}}));
        assert_eq!(result.err, Some(vec![r#"{"code":403}"#.to_string()]));
    }

    #[test]
    fn should_fail_when_entry_is_not_shaped_like_a_fetch_result() {
        for entry in [json!(null), json!({"data": {"name": "a"}}), json!({"data": "x"})] {
            match Fetched::<Item>::from_raw(Some(entry.clone())) {
                Fetched::Failed(errors) => {
                    assert_eq!(errors.len(), 1);
                    assert!(errors[0].starts_with("malformed cache entry"), "got {}", errors[0]);
                }
                other => panic!("expected failure for {entry}, got {other:?}"),
            }
        }
    }

    #[test]
    fn should_fail_when_record_does_not_decode() {
        let result = Some(json!({"data": [{"name": "a"}, {"name": 7}]}));
        match Fetched::<Item>::from_raw(result) {
            Fetched::Failed(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("index 1"), "got {}", errors[0]);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
