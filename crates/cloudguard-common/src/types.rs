use serde::{Deserialize, Serialize};

/// Finding severity, ordered from best to worst.
///
/// The numeric [`Severity::code`] is the status code reported to downstream
/// aggregators.
///
/// # Examples
///
/// ```
/// use cloudguard_common::types::Severity;
///
/// let sev: Severity = "fail".parse().unwrap();
/// assert_eq!(sev, Severity::Fail);
/// assert_eq!(sev.code(), 2);
/// assert_eq!(sev.to_string(), "FAIL");
/// assert!(Severity::Unknown > Severity::Ok);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warn,
    Fail,
    Unknown,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Ok,
        Severity::Warn,
        Severity::Fail,
        Severity::Unknown,
    ];

    pub fn code(self) -> u8 {
        match self {
            Severity::Ok => 0,
            Severity::Warn => 1,
            Severity::Fail => 2,
            Severity::Unknown => 3,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Ok => write!(f, "OK"),
            Severity::Warn => write!(f, "WARN"),
            Severity::Fail => write!(f, "FAIL"),
            Severity::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ok" | "pass" | "0" => Ok(Severity::Ok),
            "warn" | "warning" | "1" => Ok(Severity::Warn),
            "fail" | "2" => Ok(Severity::Fail),
            "unknown" | "3" => Ok(Severity::Unknown),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// A severity-graded statement about one region's compliance status for one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
    pub region: String,
    /// Evidence reference, e.g. the alert policy that satisfied the rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Raw error detail from a failed fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Vec<String>>,
}

impl Finding {
    pub fn new(severity: Severity, message: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            region: region.into(),
            resource: None,
            extra: None,
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_extra(mut self, extra: Vec<String>) -> Self {
        self.extra = Some(extra);
        self
    }
}

/// A compliance framework mapping, e.g. `pci` with a free-text rationale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComplianceMapping {
    pub framework: &'static str,
    pub text: &'static str,
}

/// Static descriptive data every rule exposes to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleMetadata {
    /// Stable identifier used for rule selection and in reports.
    pub id: &'static str,
    pub title: &'static str,
    pub category: &'static str,
    pub domain: &'static str,
    pub description: &'static str,
    pub more_info: &'static str,
    pub link: &'static str,
    pub recommended_action: &'static str,
    /// API operations (`collection:operation`) whose cached results the rule reads.
    pub apis: &'static [&'static str],
    pub compliance: &'static [ComplianceMapping],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_order_severities_by_code() {
        let codes: Vec<u8> = Severity::ALL.iter().map(|s| s.code()).collect();
        assert_eq!(codes, vec![0, 1, 2, 3]);
        assert!(Severity::Fail > Severity::Warn);
    }

    #[test]
    fn should_parse_numeric_and_named_severities() {
        assert_eq!("3".parse::<Severity>().unwrap(), Severity::Unknown);
        assert_eq!("WARNING".parse::<Severity>().unwrap(), Severity::Warn);
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn should_omit_empty_optional_fields_when_serializing_finding() {
        let finding = Finding::new(Severity::Fail, "No log metrics found", "global");
        let value = serde_json::to_value(&finding).unwrap();
        assert_eq!(value["severity"], "fail");
        assert!(value.get("resource").is_none());
        assert!(value.get("extra").is_none());

        let finding = finding.with_resource("policy1");
        let value = serde_json::to_value(&finding).unwrap();
        assert_eq!(value["resource"], "policy1");
    }
}
