use super::config::{MemberProfile, ResolvedClientConfig};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The widget that last set the duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationSource {
    Choice,
    Manual,
    Slider,
}

impl DurationSource {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "choice" => Some(Self::Choice),
            "manual" => Some(Self::Manual),
            "slider" => Some(Self::Slider),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Choice => "choice",
            Self::Manual => "manual",
            Self::Slider => "slider",
        }
    }
}

/// Single duration value shared by the quick-pick buttons, the manual input and
/// the slider. Whichever was used last wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationInput {
    minutes: Option<u32>,
    source: Option<DurationSource>,
}

impl DurationInput {
    pub fn minutes(&self) -> Option<u32> {
        self.minutes
    }

    pub fn source(&self) -> Option<DurationSource> {
        self.source
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationError {
    Member,
    Activity,
    Duration,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::Member => "Please choose a member.",
            Self::Activity => "Please choose an activity.",
            Self::Duration => "Please pick a duration greater than zero.",
        };
        f.write_str(message)
    }
}

/// Every validation failure of one submit attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn contains(&self, kind: ValidationError) -> bool {
        self.errors.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ValidationError> + '_ {
        self.errors.iter().copied()
    }

    fn push(&mut self, kind: ValidationError) {
        if !self.contains(kind) {
            self.errors.push(kind);
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.iter().map(|kind| kind.to_string()).collect();
        f.write_str(&messages.join(" "))
    }
}

impl std::error::Error for ValidationErrors {}

/// A validated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub profile: MemberProfile,
    pub activity: String,
    pub duration: u32,
}

/// Owned state of the submission form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    member: Option<usize>,
    activity: String,
    duration: DurationInput,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_member(&mut self, index: Option<usize>) {
        self.member = index;
    }

    pub fn set_activity(&mut self, activity: impl Into<String>) {
        self.activity = activity.into();
    }

    pub fn pick_choice(&mut self, minutes: u32) {
        self.set_duration(Some(minutes).filter(|m| *m > 0), DurationSource::Choice);
    }

    /// Free-form input; anything that is not a positive number clears the
    /// duration.
    pub fn type_manual(&mut self, raw: &str) {
        let minutes = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 1.0)
            .map(|value| value.min(f64::from(u32::MAX)) as u32);
        self.set_duration(minutes, DurationSource::Manual);
    }

    pub fn slide(&mut self, minutes: u32) {
        self.set_duration(Some(minutes).filter(|m| *m > 0), DurationSource::Slider);
    }

    fn set_duration(&mut self, minutes: Option<u32>, source: DurationSource) {
        self.duration = DurationInput {
            minutes,
            source: Some(source),
        };
    }

    pub fn member(&self) -> Option<usize> {
        self.member
    }

    pub fn activity(&self) -> &str {
        &self.activity
    }

    pub fn duration(&self) -> DurationInput {
        self.duration
    }

    /// Checks all three fields and reports every failing one at once.
    pub fn validate(&self, config: &ResolvedClientConfig) -> Result<Submission, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let profile = self.member.and_then(|index| config.member(index));
        if profile.is_none() {
            errors.push(ValidationError::Member);
        }
        let activity = self.activity.trim();
        if activity.is_empty() {
            errors.push(ValidationError::Activity);
        }
        let duration = self.duration.minutes.filter(|minutes| *minutes > 0);
        if duration.is_none() {
            errors.push(ValidationError::Duration);
        }

        match (profile, duration) {
            (Some(profile), Some(duration)) if errors.is_empty() => Ok(Submission {
                profile: profile.clone(),
                activity: activity.to_string(),
                duration,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::config::ClientConfig;

    fn config() -> ResolvedClientConfig {
        ClientConfig::default().resolve().unwrap()
    }

    #[test]
    fn empty_form_reports_all_three_errors() {
        let errors = FormState::new().validate(&config()).unwrap_err();
        assert!(errors.contains(ValidationError::Member));
        assert!(errors.contains(ValidationError::Activity));
        assert!(errors.contains(ValidationError::Duration));
    }

    #[test]
    fn errors_chain_under_a_context_message() {
        let mut form = FormState::new();
        form.set_activity("Running");
        let errors = form.validate(&config()).unwrap_err();
        let err = anyhow::Error::new(errors).context("submission is incomplete");
        assert_eq!(
            format!("{err:#}"),
            "submission is incomplete: Please choose a member. Please pick a duration greater than zero."
        );
    }

    #[test]
    fn each_error_clears_independently() {
        let config = config();
        let mut form = FormState::new();
        form.set_activity("Running");
        let errors = form.validate(&config).unwrap_err();
        assert!(errors.contains(ValidationError::Member));
        assert!(!errors.contains(ValidationError::Activity));
        assert!(errors.contains(ValidationError::Duration));

        form.pick_choice(30);
        let errors = form.validate(&config).unwrap_err();
        assert_eq!(errors.iter().collect::<Vec<_>>(), vec![ValidationError::Member]);

        form.select_member(Some(0));
        let submission = form.validate(&config).unwrap();
        assert_eq!(submission.profile.name, "Alice");
        assert_eq!(submission.duration, 30);
    }

    #[test]
    fn unknown_member_index_is_rejected() {
        let mut form = FormState::new();
        form.select_member(Some(99));
        form.set_activity("Running");
        form.slide(10);
        let errors = form.validate(&config()).unwrap_err();
        assert_eq!(errors.iter().collect::<Vec<_>>(), vec![ValidationError::Member]);
    }

    #[test]
    fn last_duration_widget_wins() {
        let mut form = FormState::new();
        form.pick_choice(15);
        form.type_manual("42");
        assert_eq!(form.duration().minutes(), Some(42));
        assert_eq!(form.duration().source(), Some(DurationSource::Manual));

        form.slide(90);
        assert_eq!(form.duration().minutes(), Some(90));
        assert_eq!(form.duration().source(), Some(DurationSource::Slider));

        form.pick_choice(45);
        assert_eq!(form.duration().minutes(), Some(45));
        assert_eq!(form.duration().source(), Some(DurationSource::Choice));
    }

    #[test]
    fn non_positive_manual_input_clears_duration() {
        let mut form = FormState::new();
        form.pick_choice(30);
        form.type_manual("-5");
        assert_eq!(form.duration().minutes(), None);
        form.type_manual("abc");
        assert_eq!(form.duration().minutes(), None);
        form.type_manual("0");
        assert_eq!(form.duration().minutes(), None);
        form.type_manual(" 20 ");
        assert_eq!(form.duration().minutes(), Some(20));
    }

    #[test]
    fn whitespace_activity_is_missing() {
        let mut form = FormState::new();
        form.select_member(Some(1));
        form.set_activity("   ");
        form.pick_choice(15);
        let errors = form.validate(&config()).unwrap_err();
        assert_eq!(errors.iter().collect::<Vec<_>>(), vec![ValidationError::Activity]);
    }
}
