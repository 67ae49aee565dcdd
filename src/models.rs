use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One persisted row of the `logs` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct LogEntry {
    pub id: i64,
    pub created_at: String,
    pub team: String,
    pub member: String,
    pub cwid: String,
    pub activity: String,
    pub duration: i64,
}

/// Body of `POST /api/log`. Every field is optional on the wire so that a
/// missing `member` or `activity` is reported as a validation failure instead
/// of a decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogRequest {
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub member: Option<String>,
    #[serde(default)]
    pub cwid: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub duration: Option<Value>,
}

/// A request that passed validation, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub team: String,
    pub member: String,
    pub cwid: String,
    pub activity: String,
    pub duration: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppendResponse {
    pub id: i64,
    pub created_at: String,
}

impl LogRequest {
    pub fn into_new_entry(self) -> Result<NewLogEntry, &'static str> {
        let member = self.member.filter(|value| !value.is_empty());
        let activity = self.activity.filter(|value| !value.is_empty());
        let (Some(member), Some(activity)) = (member, activity) else {
            return Err("member and activity required");
        };

        Ok(NewLogEntry {
            team: self.team.unwrap_or_default(),
            member,
            cwid: self.cwid.unwrap_or_default(),
            activity,
            duration: coerce_duration(self.duration.as_ref()),
        })
    }
}

/// Lenient integer coercion for the `duration` field. Numbers are truncated,
/// strings are read up to the first non-digit, and anything unreadable or
/// negative becomes 0.
pub fn coerce_duration(value: Option<&Value>) -> i64 {
    let parsed = match value {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(Value::String(text)) => parse_leading_int(text),
        _ => None,
    };
    parsed.filter(|duration| *duration > 0).unwrap_or(0)
}

fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duration_coercion_matches_lenient_parse() {
        assert_eq!(coerce_duration(Some(&json!("30"))), 30);
        assert_eq!(coerce_duration(Some(&json!(45))), 45);
        assert_eq!(coerce_duration(Some(&json!(12.9))), 12);
        assert_eq!(coerce_duration(Some(&json!(" 15 "))), 15);
        assert_eq!(coerce_duration(Some(&json!("12abc"))), 12);
        assert_eq!(coerce_duration(Some(&json!("-5"))), 0);
        assert_eq!(coerce_duration(Some(&json!(-5))), 0);
        assert_eq!(coerce_duration(Some(&json!("abc"))), 0);
        assert_eq!(coerce_duration(Some(&json!(""))), 0);
        assert_eq!(coerce_duration(Some(&json!(true))), 0);
        assert_eq!(coerce_duration(Some(&Value::Null)), 0);
        assert_eq!(coerce_duration(None), 0);
    }

    #[test]
    fn missing_member_or_activity_is_rejected() {
        let request = LogRequest {
            member: Some(String::new()),
            activity: Some("Run".into()),
            ..Default::default()
        };
        assert!(request.into_new_entry().is_err());

        let request = LogRequest {
            member: Some("Alice".into()),
            ..Default::default()
        };
        assert!(request.into_new_entry().is_err());
    }

    #[test]
    fn optional_fields_default_to_empty() {
        let request = LogRequest {
            member: Some("Alice".into()),
            activity: Some("Run".into()),
            ..Default::default()
        };
        let entry = request.into_new_entry().expect("valid request");
        assert_eq!(entry.team, "");
        assert_eq!(entry.cwid, "");
        assert_eq!(entry.duration, 0);
    }
}
