use super::LogPayload;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix every external form field identifier carries.
pub const FIELD_PREFIX: &str = "entry.";

/// Logical fields of a submission, in the order they appear in the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Team,
    Member,
    Cwid,
    Activity,
    Duration,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Team,
        FormField::Member,
        FormField::Cwid,
        FormField::Activity,
        FormField::Duration,
    ];
}

/// Normalized mapping from logical field to external identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    identifiers: BTreeMap<FormField, String>,
}

impl FieldMap {
    /// Identifiers compiled into the client.
    pub fn builtin() -> Self {
        Self::from_identifiers(&BTreeMap::from([
            (FormField::Team, "entry.500000070".to_string()),
            (FormField::Member, "entry.721958901".to_string()),
            (FormField::Cwid, "entry.1522950107".to_string()),
            (FormField::Activity, "entry.1322466239".to_string()),
            (FormField::Duration, "entry.737958173".to_string()),
        ]))
    }

    /// Blank identifiers are dropped, the rest gain [`FIELD_PREFIX`] if missing.
    pub fn from_identifiers(raw: &BTreeMap<FormField, String>) -> Self {
        let identifiers = raw
            .iter()
            .filter_map(|(field, id)| {
                let id = id.trim();
                if id.is_empty() {
                    return None;
                }
                let id = if id.starts_with(FIELD_PREFIX) {
                    id.to_string()
                } else {
                    format!("{FIELD_PREFIX}{id}")
                };
                Some((*field, id))
            })
            .collect();
        Self { identifiers }
    }

    pub fn identifier(&self, field: FormField) -> Option<&str> {
        self.identifiers.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

/// Builds the pre-filled external form link for `payload`.
///
/// Fields without an identifier or with an empty value are left out. A zero
/// duration counts as empty.
pub fn build_external_url(payload: &LogPayload, fields: &FieldMap, base_url: &str) -> String {
    let duration = (payload.duration > 0).then(|| payload.duration.to_string());
    let query = FormField::ALL
        .iter()
        .filter_map(|field| {
            let value = match field {
                FormField::Team => Some(payload.team.as_str()),
                FormField::Member => Some(payload.member.as_str()),
                FormField::Cwid => Some(payload.cwid.as_str()),
                FormField::Activity => Some(payload.activity.as_str()),
                FormField::Duration => duration.as_deref(),
            }
            .filter(|value| !value.is_empty())?;
            let id = fields.identifier(*field)?;
            Some(format!(
                "{}={}",
                urlencoding::encode(id),
                urlencoding::encode(value)
            ))
        })
        .collect::<Vec<_>>()
        .join("&");

    if query.is_empty() {
        return base_url.to_string();
    }
    let separator = if base_url.ends_with('?') || base_url.ends_with('&') {
        ""
    } else if base_url.contains('?') {
        "&"
    } else {
        "?"
    };
    format!("{base_url}{separator}{query}")
}
