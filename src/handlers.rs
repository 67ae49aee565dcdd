use crate::client::{DurationSource, FormState, StoreSink, Submitter};
use crate::errors::AppError;
use crate::models::{AppendResponse, LogEntry, LogRequest};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.client, &FormState::new(), None))
}

pub async fn append_log(
    State(state): State<AppState>,
    payload: Result<Json<LogRequest>, JsonRejection>,
) -> Result<Json<AppendResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let member = request.member.clone().unwrap_or_default();
    let response = state.store.append(request).await?;
    info!(id = response.id, member = %member, "log entry appended");
    Ok(Json(response))
}

pub async fn list_logs(State(state): State<AppState>) -> Result<Json<Vec<LogEntry>>, AppError> {
    Ok(Json(state.store.list_recent().await?))
}

/// Fields posted by the form page.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitFields {
    #[serde(default)]
    pub member: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub duration_choice: Option<String>,
    #[serde(default)]
    pub duration_manual: Option<String>,
    #[serde(default)]
    pub duration_slider: Option<String>,
    #[serde(default)]
    pub duration_source: Option<String>,
}

impl SubmitFields {
    /// Replays the posted widgets into a [`FormState`]. The widget named by
    /// `duration_source` is applied last so it wins; without one the manual
    /// input takes precedence over a quick pick, which beats the slider.
    pub fn into_form_state(self) -> FormState {
        let mut form = FormState::new();
        form.select_member(self.member.as_deref().and_then(|m| m.trim().parse().ok()));
        form.set_activity(self.activity.unwrap_or_default());

        let choice = self.duration_choice.as_deref().and_then(parse_minutes);
        let slider = self.duration_slider.as_deref().and_then(parse_minutes);
        let manual = self.duration_manual.as_deref().filter(|m| !m.trim().is_empty());

        let source = self
            .duration_source
            .as_deref()
            .and_then(DurationSource::parse)
            .or_else(|| {
                if manual.is_some() {
                    Some(DurationSource::Manual)
                } else if choice.is_some() {
                    Some(DurationSource::Choice)
                } else if slider.is_some() {
                    Some(DurationSource::Slider)
                } else {
                    None
                }
            });

        match source {
            Some(DurationSource::Choice) => form.pick_choice(choice.unwrap_or(0)),
            Some(DurationSource::Manual) => form.type_manual(manual.unwrap_or("")),
            Some(DurationSource::Slider) => form.slide(slider.unwrap_or(0)),
            None => {}
        }
        form
    }
}

fn parse_minutes(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

/// Handles the form page: validates, attempts the log write, then redirects to
/// the pre-filled external form regardless of the write's outcome.
pub async fn submit_form(State(state): State<AppState>, Form(fields): Form<SubmitFields>) -> Response {
    let form = fields.into_form_state();
    let submission = match form.validate(&state.client) {
        Ok(submission) => submission,
        Err(errors) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(render_index(&state.client, &form, Some(&errors))),
            )
                .into_response();
        }
    };

    let submitter = Submitter::new(StoreSink::new(state.store.clone()), state.client.clone());
    let outcome = submitter.submit(&submission).await;
    match HeaderValue::from_str(&outcome.external_url) {
        Ok(location) => (StatusCode::SEE_OTHER, [(LOCATION, location)]).into_response(),
        Err(err) => AppError::internal(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_source_wins_over_other_widgets() {
        let fields = SubmitFields {
            member: Some("0".into()),
            activity: Some("Run".into()),
            duration_choice: Some("15".into()),
            duration_manual: Some("40".into()),
            duration_slider: Some("90".into()),
            duration_source: Some("slider".into()),
        };
        let form = fields.into_form_state();
        assert_eq!(form.duration().minutes(), Some(90));
        assert_eq!(form.member(), Some(0));
    }

    #[test]
    fn manual_input_wins_without_a_source() {
        let fields = SubmitFields {
            duration_choice: Some("15".into()),
            duration_manual: Some("40".into()),
            duration_slider: Some("90".into()),
            ..Default::default()
        };
        assert_eq!(fields.into_form_state().duration().minutes(), Some(40));
    }

    #[test]
    fn blank_member_is_unselected() {
        let fields = SubmitFields {
            member: Some(String::new()),
            ..Default::default()
        };
        let form = fields.into_form_state();
        assert_eq!(form.member(), None);
        assert_eq!(form.duration().minutes(), None);
    }
}
