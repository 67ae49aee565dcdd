use super::LogPayload;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentLog {
    pub member: String,
    pub activity: String,
    pub duration: u32,
    pub submitted_at: String,
    /// Whether the log service accepted the entry.
    #[serde(default)]
    pub logged: bool,
}

/// Submissions made from this machine, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentHistory {
    pub entries: Vec<RecentLog>,
}

impl RecentHistory {
    pub fn record(&mut self, payload: &LogPayload, submitted_at: String, logged: bool, limit: usize) {
        self.entries.insert(
            0,
            RecentLog {
                member: payload.member.clone(),
                activity: payload.activity.clone(),
                duration: payload.duration,
                submitted_at,
                logged,
            },
        );
        self.entries.truncate(limit);
    }
}

pub async fn load_history(path: &Path) -> RecentHistory {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(history) => history,
            Err(err) => {
                error!("failed to parse history file: {err}");
                RecentHistory::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => RecentHistory::default(),
        Err(err) => {
            error!("failed to read history file: {err}");
            RecentHistory::default()
        }
    }
}

pub async fn persist_history(path: &Path, history: &RecentHistory) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let payload = serde_json::to_vec_pretty(history)?;
    fs::write(path, payload).await
}
