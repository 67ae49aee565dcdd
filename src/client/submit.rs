use super::config::{LogServiceSettings, ResolvedClientConfig};
use super::external_url::build_external_url;
use super::form::Submission;
use super::LogPayload;
use crate::errors::StoreError;
use crate::models::{AppendResponse, LogEntry};
use crate::storage::Store;
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, StatusCode};
use std::{process::Command, sync::Arc, time::Duration};
use tracing::{info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("log service unreachable: {0}")]
    Network(#[from] reqwest::Error),
    #[error("log service responded with {0}")]
    Status(StatusCode),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Destination for the best-effort log write.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn append(&self, payload: &LogPayload) -> Result<AppendResponse, SinkError>;
}

/// HTTP client for the log service.
#[derive(Clone)]
pub struct LogServiceClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl LogServiceClient {
    pub fn new(settings: &LogServiceSettings) -> Result<Self, SinkError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    pub async fn list_recent(&self) -> Result<Vec<LogEntry>, SinkError> {
        let response = self
            .http
            .get(format!("{}/api/logs", self.base_url))
            .header(AUTHORIZATION, self.bearer())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SinkError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl LogSink for LogServiceClient {
    async fn append(&self, payload: &LogPayload) -> Result<AppendResponse, SinkError> {
        let response = self
            .http
            .post(format!("{}/api/log", self.base_url))
            .header(AUTHORIZATION, self.bearer())
            .json(payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SinkError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

/// Writes straight into the local store, for submissions handled by the
/// service's own form page.
#[derive(Clone)]
pub struct StoreSink {
    store: Store,
}

impl StoreSink {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LogSink for StoreSink {
    async fn append(&self, payload: &LogPayload) -> Result<AppendResponse, SinkError> {
        Ok(self.store.append(payload.into()).await?)
    }
}

/// Opens a URL for the user.
pub trait Launcher {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Hands the URL to the platform's default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn open(&self, url: &str) -> std::io::Result<()> {
        let mut command = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(windows) {
            let mut command = Command::new("rundll32");
            command.arg("url.dll,FileProtocolHandler");
            command
        } else {
            Command::new("xdg-open")
        };
        spawn_detached(command.arg(url))
    }
}

/// Starts `command` and reaps it on a background thread so the handler never
/// lingers as a zombie in a long-lived process.
fn spawn_detached(command: &mut Command) -> std::io::Result<()> {
    let mut child = command.spawn()?;
    std::thread::spawn(move || {
        if let Err(err) = child.wait() {
            warn!("url handler did not exit cleanly: {err}");
        }
    });
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    /// `None` when the log write failed; the failure has already been logged.
    pub logged: Option<AppendResponse>,
    pub external_url: String,
    /// Whether a launcher accepted the link.
    pub opened: bool,
}

pub struct Submitter<S> {
    sink: S,
    config: Arc<ResolvedClientConfig>,
}

impl<S: LogSink> Submitter<S> {
    pub fn new(sink: S, config: Arc<ResolvedClientConfig>) -> Self {
        Self { sink, config }
    }

    /// Attempts the log write, then builds the external form link. A failed
    /// write never prevents the link from being produced.
    pub async fn submit(&self, submission: &Submission) -> SubmitOutcome {
        let payload = LogPayload::new(&self.config.team, submission);

        let logged = match self.sink.append(&payload).await {
            Ok(response) => {
                info!(id = response.id, member = %payload.member, "activity logged");
                Some(response)
            }
            Err(err) => {
                warn!("activity log write failed, continuing: {err}");
                None
            }
        };

        let external_url =
            build_external_url(&payload, &self.config.fields, &self.config.form_base_url);
        SubmitOutcome {
            logged,
            external_url,
            opened: false,
        }
    }

    /// Like [`Submitter::submit`], then opens the link once the write attempt
    /// has settled.
    pub async fn submit_and_open(
        &self,
        submission: &Submission,
        launcher: &impl Launcher,
    ) -> SubmitOutcome {
        let mut outcome = self.submit(submission).await;
        match launcher.open(&outcome.external_url) {
            Ok(()) => outcome.opened = true,
            Err(err) => warn!("could not open {}: {err}", outcome.external_url),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::config::{ClientConfig, MemberProfile};
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Events(Arc<Mutex<Vec<String>>>);

    impl Events {
        fn push(&self, event: impl Into<String>) {
            self.0.lock().unwrap().push(event.into());
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    #[cfg(unix)]
    #[test]
    fn detached_spawn_reports_missing_handler() {
        assert!(spawn_detached(&mut Command::new("true")).is_ok());
        let err = spawn_detached(&mut Command::new("/nonexistent/url-handler")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    struct FailingSink(Events);

    #[async_trait]
    impl LogSink for FailingSink {
        async fn append(&self, _payload: &LogPayload) -> Result<AppendResponse, SinkError> {
            tokio::task::yield_now().await;
            self.0.push("append");
            Err(SinkError::Status(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }

    struct OkSink(Events);

    #[async_trait]
    impl LogSink for OkSink {
        async fn append(&self, payload: &LogPayload) -> Result<AppendResponse, SinkError> {
            self.0.push(format!("append {}", payload.activity));
            Ok(AppendResponse {
                id: 7,
                created_at: "2026-01-01T00:00:00.000Z".into(),
            })
        }
    }

    struct RecordingLauncher(Events);

    impl Launcher for RecordingLauncher {
        fn open(&self, url: &str) -> std::io::Result<()> {
            self.0.push(format!("open {url}"));
            Ok(())
        }
    }

    fn submission() -> Submission {
        Submission {
            profile: MemberProfile {
                name: "Alice".into(),
                cwid: "123".into(),
            },
            activity: "Run".into(),
            duration: 30,
        }
    }

    fn config() -> Arc<ResolvedClientConfig> {
        Arc::new(ClientConfig::default().resolve().unwrap())
    }

    #[tokio::test]
    async fn failed_write_still_opens_the_form() {
        let events = Events::default();
        let submitter = Submitter::new(FailingSink(events.clone()), config());
        let outcome = submitter
            .submit_and_open(&submission(), &RecordingLauncher(events.clone()))
            .await;

        assert!(outcome.logged.is_none());
        assert!(outcome.opened);
        assert!(outcome.external_url.contains("=Run"));
        assert!(outcome.external_url.contains("=30"));
        let events = events.take();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], "append");
        assert!(events[1].starts_with("open https://"));
    }

    #[tokio::test]
    async fn successful_write_is_reported() {
        let events = Events::default();
        let submitter = Submitter::new(OkSink(events.clone()), config());
        let outcome = submitter.submit(&submission()).await;
        assert_eq!(outcome.logged.map(|r| r.id), Some(7));
        assert_eq!(events.take(), vec!["append Run".to_string()]);
    }

    #[tokio::test]
    async fn unreachable_service_is_swallowed() {
        let sink = LogServiceClient::new(&LogServiceSettings {
            url: "http://127.0.0.1:9".into(),
            api_key: "k".into(),
        })
        .unwrap();
        let outcome = Submitter::new(sink, config()).submit(&submission()).await;
        assert!(outcome.logged.is_none());
        assert!(!outcome.external_url.is_empty());
    }
}
