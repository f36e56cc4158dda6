use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured resume as returned by the oracle.
///
/// Expected keys are `basic_info`, `work_experience` and `project_experience`,
/// but nothing enforces that: consumers must tolerate missing and extra
/// fields. An empty record means "no data", check `ParseStatus` to know why.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeRecord(Map<String, Value>);

impl ResumeRecord {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// `basic_info.full_name`, falling back to first + last name.
    pub fn full_name(&self) -> Option<String> {
        let basic = self.get("basic_info")?;
        if let Some(full) = basic.get("full_name").and_then(|v| v.as_str()) {
            if !full.trim().is_empty() {
                return Some(full.trim().to_string());
            }
        }
        let parts: Vec<&str> = ["first_name", "last_name"]
            .iter()
            .filter_map(|k| basic.get(*k).and_then(|v| v.as_str()))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    pub fn work_experience_count(&self) -> usize {
        self.get("work_experience")
            .and_then(|v| v.as_array())
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl From<Map<String, Value>> for ResumeRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Whether the oracle's output could be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParseStatus {
    Parsed,
    #[serde(rename = "RECORD_PARSE_ERROR")]
    Unparseable { reason: String },
}

impl ParseStatus {
    pub fn code(&self) -> &'static str {
        match self {
            ParseStatus::Parsed => "PARSED",
            ParseStatus::Unparseable { .. } => "RECORD_PARSE_ERROR",
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseStatus::Parsed)
    }
}

/// Output of the record parser: always a record, plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedResume {
    pub record: ResumeRecord,
    pub status: ParseStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> ResumeRecord {
        match value {
            Value::Object(map) => ResumeRecord::from(map),
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_record_serializes_as_bare_mapping() {
        let r = record(json!({"basic_info": {"first_name": "John"}}));
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"basic_info": {"first_name": "John"}})
        );
        assert_eq!(serde_json::to_string(&ResumeRecord::empty()).unwrap(), "{}");
    }

    #[test]
    fn test_full_name_prefers_full_name_field() {
        let r = record(json!({"basic_info": {
            "full_name": "Jane Q. Public", "first_name": "Jane", "last_name": "Public"
        }}));
        assert_eq!(r.full_name().as_deref(), Some("Jane Q. Public"));
    }

    #[test]
    fn test_full_name_falls_back_to_first_and_last() {
        let r = record(json!({"basic_info": {"first_name": "Jane", "last_name": "Public", "full_name": ""}}));
        assert_eq!(r.full_name().as_deref(), Some("Jane Public"));
        assert_eq!(ResumeRecord::empty().full_name(), None);
    }

    #[test]
    fn test_work_experience_count_tolerates_missing_or_wrong_type() {
        let r = record(json!({"work_experience": [{"company": "A"}, {"company": "B"}]}));
        assert_eq!(r.work_experience_count(), 2);
        let r = record(json!({"work_experience": "none"}));
        assert_eq!(r.work_experience_count(), 0);
    }

    #[test]
    fn test_parse_status_codes() {
        assert_eq!(ParseStatus::Parsed.code(), "PARSED");
        let failed = ParseStatus::Unparseable {
            reason: "expected value".to_string(),
        };
        assert_eq!(failed.code(), "RECORD_PARSE_ERROR");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"code": "RECORD_PARSE_ERROR", "reason": "expected value"})
        );
        assert_eq!(
            serde_json::to_value(ParseStatus::Parsed).unwrap(),
            json!({"code": "PARSED"})
        );
    }
}
