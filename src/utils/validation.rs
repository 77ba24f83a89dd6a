use serde::{Deserialize, Deserializer};
use validator::ValidationError;

pub const WORK_MODES: [&str; 3] = ["Onsite", "Hybrid", "Remote"];

pub fn validate_work_mode(value: &str) -> Result<(), ValidationError> {
    if WORK_MODES.contains(&value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("work_mode");
        err.message = Some("The selected work mode is invalid.".into());
        Err(err)
    }
}

/// Rejects values that are empty once trimmed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("This field is required.".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Query-string booleans: `1/true/on/yes` and `0/false/off/no`; empty means unset.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

pub fn deserialize_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) if s.trim().is_empty() => Ok(None),
        Some(BoolOrString::String(s)) => parse_flag(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid boolean string: {}", s))),
    }
}

/// Numeric ids from the query string; an empty value counts as absent.
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("Invalid id: {}", s))),
    }
}
