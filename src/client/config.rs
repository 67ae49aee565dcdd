//! Client configuration: the roster, the activity/duration choices and where
//! submissions go.
//!
//! [`ClientConfig`] is what the user writes. [`ClientConfig::resolve`] turns it
//! into a [`ResolvedClientConfig`] once at startup, and everything downstream
//! consumes only the resolved form.

use super::external_url::{FieldMap, FormField};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, env, path::Path, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read client config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse client config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("field_map_source is \"configured\" but form.fields maps no fields")]
    EmptyFieldMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub name: String,
    #[serde(default)]
    pub cwid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMapSource {
    /// Use the built-in identifiers.
    #[default]
    Static,
    /// Use `form.fields` from the config file.
    Configured,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    pub base_url: String,
    pub field_map_source: FieldMapSource,
    pub fields: BTreeMap<FormField, String>,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            base_url: "https://docs.google.com/forms/d/e/FORM_ID/viewform".to_string(),
            field_map_source: FieldMapSource::Static,
            fields: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogServiceSettings {
    pub url: String,
    pub api_key: String,
}

impl Default for LogServiceSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_string(),
            api_key: "dev-key".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderSettings {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl Default for SliderSettings {
    fn default() -> Self {
        Self {
            min: 5,
            max: 180,
            step: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub team: String,
    pub members: Vec<MemberProfile>,
    pub activities: Vec<String>,
    pub durations: Vec<u32>,
    pub slider: SliderSettings,
    pub form: FormSettings,
    pub log_service: LogServiceSettings,
    pub enable_local_history: bool,
    pub history_path: PathBuf,
    pub history_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            team: "Activity Team".to_string(),
            members: vec![
                MemberProfile {
                    name: "Alice".to_string(),
                    cwid: "10000001".to_string(),
                },
                MemberProfile {
                    name: "Bob".to_string(),
                    cwid: "10000002".to_string(),
                },
            ],
            activities: ["Walking", "Running", "Cycling", "Swimming", "Yoga"]
                .into_iter()
                .map(String::from)
                .collect(),
            durations: vec![15, 30, 45, 60],
            slider: SliderSettings::default(),
            form: FormSettings::default(),
            log_service: LogServiceSettings::default(),
            enable_local_history: false,
            history_path: PathBuf::from("data/recent.json"),
            history_limit: 20,
        }
    }
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Loads `path` if given, else the file named by `env_var`, else the
    /// defaults.
    pub fn load_or_default(path: Option<&Path>, env_var: &str) -> Result<Self, ConfigError> {
        match path
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(env_var).map(PathBuf::from))
        {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn resolve(self) -> Result<ResolvedClientConfig, ConfigError> {
        let fields = match self.form.field_map_source {
            FieldMapSource::Static => FieldMap::builtin(),
            FieldMapSource::Configured => {
                let map = FieldMap::from_identifiers(&self.form.fields);
                if map.is_empty() {
                    return Err(ConfigError::EmptyFieldMap);
                }
                map
            }
        };

        Ok(ResolvedClientConfig {
            team: self.team,
            members: self.members,
            activities: self.activities,
            durations: self.durations,
            slider: self.slider,
            form_base_url: self.form.base_url,
            fields,
            log_service: self.log_service,
            history: self.enable_local_history.then_some(HistorySettings {
                path: self.history_path,
                limit: self.history_limit.max(1),
            }),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySettings {
    pub path: PathBuf,
    pub limit: usize,
}

/// Configuration after the one-time resolution step.
#[derive(Debug, Clone)]
pub struct ResolvedClientConfig {
    pub team: String,
    pub members: Vec<MemberProfile>,
    pub activities: Vec<String>,
    pub durations: Vec<u32>,
    pub slider: SliderSettings,
    pub form_base_url: String,
    pub fields: FieldMap,
    pub log_service: LogServiceSettings,
    /// `Some` only when local history is enabled.
    pub history: Option<HistorySettings>,
}

impl ResolvedClientConfig {
    pub fn member(&self, index: usize) -> Option<&MemberProfile> {
        self.members.get(index)
    }

    /// Finds a member by roster index or by case-insensitive name.
    pub fn find_member(&self, key: &str) -> Option<usize> {
        let key = key.trim();
        if let Ok(index) = key.parse::<usize>() {
            return (index < self.members.len()).then_some(index);
        }
        self.members
            .iter()
            .position(|member| member.name.eq_ignore_ascii_case(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_source_uses_builtin_identifiers() {
        let resolved = ClientConfig::default().resolve().unwrap();
        assert_eq!(resolved.fields, FieldMap::builtin());
        assert!(resolved.history.is_none());
    }

    #[test]
    fn configured_source_normalizes_identifiers() {
        let config: ClientConfig = serde_json::from_value(serde_json::json!({
            "team": "T",
            "form": {
                "base_url": "https://forms.example/viewform",
                "field_map_source": "configured",
                "fields": { "member": "111", "activity": "entry.222" }
            },
            "enable_local_history": true
        }))
        .unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.fields.identifier(FormField::Member), Some("entry.111"));
        assert_eq!(resolved.fields.identifier(FormField::Activity), Some("entry.222"));
        assert_eq!(resolved.fields.identifier(FormField::Team), None);
        assert_eq!(resolved.history.unwrap().limit, 20);
    }

    #[test]
    fn configured_source_without_fields_is_an_error() {
        let mut config = ClientConfig::default();
        config.form.field_map_source = FieldMapSource::Configured;
        assert!(matches!(config.resolve(), Err(ConfigError::EmptyFieldMap)));
    }

    #[test]
    fn unknown_field_names_fail_to_parse() {
        let parsed: Result<ClientConfig, _> = serde_json::from_value(serde_json::json!({
            "form": { "fields": { "nickname": "entry.1" } }
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn members_resolve_by_index_or_name() {
        let resolved = ClientConfig::default().resolve().unwrap();
        assert_eq!(resolved.find_member("1"), Some(1));
        assert_eq!(resolved.find_member("alice"), Some(0));
        assert_eq!(resolved.find_member("7"), None);
        assert_eq!(resolved.find_member("Mallory"), None);
    }
}
