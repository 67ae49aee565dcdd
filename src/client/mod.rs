//! Submission client: form state, validation, the best-effort log write and the
//! pre-filled external form link.

pub mod config;
pub mod external_url;
pub mod form;
pub mod history;
pub mod leaderboard;
pub mod submit;

use crate::models::LogRequest;
use serde::{Deserialize, Serialize};

pub use config::{ClientConfig, MemberProfile, ResolvedClientConfig};
pub use external_url::{build_external_url, FieldMap, FormField};
pub use form::{DurationSource, FormState, Submission, ValidationError, ValidationErrors};
pub use submit::{
    Launcher, LogServiceClient, LogSink, SinkError, StoreSink, SubmitOutcome, Submitter,
    SystemLauncher,
};

/// JSON body the client sends to the log service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPayload {
    pub team: String,
    pub member: String,
    pub cwid: String,
    pub activity: String,
    pub duration: u32,
}

impl LogPayload {
    pub fn new(team: &str, submission: &Submission) -> Self {
        Self {
            team: team.to_string(),
            member: submission.profile.name.clone(),
            cwid: submission.profile.cwid.clone(),
            activity: submission.activity.clone(),
            duration: submission.duration,
        }
    }
}

impl From<&LogPayload> for LogRequest {
    fn from(payload: &LogPayload) -> Self {
        Self {
            team: Some(payload.team.clone()),
            member: Some(payload.member.clone()),
            cwid: Some(payload.cwid.clone()),
            activity: Some(payload.activity.clone()),
            duration: Some(payload.duration.into()),
        }
    }
}
