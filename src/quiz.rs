//! Quiz state machine collecting a [`PreferenceProfile`].
//!
//! Progresses linearly: Step1 (flavor) → Step2 (type) → Step3 (occasion) →
//! Step4 (budget) → Step5 (boldness) → Step6 (optional details) → Loading →
//! Result. Required steps advance as soon as an answer is recorded; step 6
//! waits for an explicit submit. Result is terminal.

use strum::Display;

use crate::profile::{
    option_labels, parse_choice, Boldness, Budget, Flavor, PreferenceProfile, ProfileDraft,
    ProfileError, ProfileField, WineType, DEFAULT_OCCASION,
};
use crate::recommend::{RecommendationResult, RecommendationService};

/// Where a quiz session currently is.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum QuizState {
    /// Flavor question.
    #[strum(to_string = "step 1")]
    Step1,
    /// Wine type question.
    #[strum(to_string = "step 2")]
    Step2,
    /// Occasion question.
    #[strum(to_string = "step 3")]
    Step3,
    /// Budget question.
    #[strum(to_string = "step 4")]
    Step4,
    /// Boldness question.
    #[strum(to_string = "step 5")]
    Step5,
    /// Optional details, waiting for submit.
    #[strum(to_string = "step 6")]
    Step6,
    /// Waiting for the recommendation service.
    #[strum(to_string = "loading")]
    Loading,
    /// Terminal state holding the rendered fragment.
    #[strum(to_string = "result")]
    Result {
        /// Recommendation or fallback markup.
        markup: String,
    },
}

impl QuizState {
    /// The required field answered at this step, if any.
    pub fn field(&self) -> Option<ProfileField> {
        match self {
            Self::Step1 => Some(ProfileField::Flavor),
            Self::Step2 => Some(ProfileField::WineType),
            Self::Step3 => Some(ProfileField::Occasion),
            Self::Step4 => Some(ProfileField::Budget),
            Self::Step5 => Some(ProfileField::Boldness),
            _ => None,
        }
    }

    /// Question shown to the user at this step.
    pub fn question(&self) -> Option<&'static str> {
        match self {
            Self::Step1 => Some("Fruity, Dry, or Sweet?"),
            Self::Step2 => Some("Red, White, Rosé, or Sparkling?"),
            Self::Step3 => Some("For a meal or solo? If meal, what’s cooking?"),
            Self::Step4 => Some("Budget: Under €15, €15–30, or €30+?"),
            Self::Step5 => Some("Light, Medium, or Bold?"),
            Self::Step6 => Some("Anything else? All of these are optional."),
            Self::Loading | Self::Result { .. } => None,
        }
    }

    /// Choice labels for steps with a fixed option list; empty for free text.
    pub fn options(&self) -> Vec<String> {
        match self {
            Self::Step1 => option_labels::<Flavor>(),
            Self::Step2 => option_labels::<WineType>(),
            Self::Step4 => option_labels::<Budget>(),
            Self::Step5 => option_labels::<Boldness>(),
            _ => Vec::new(),
        }
    }

    fn next_required(&self) -> Option<Self> {
        match self {
            Self::Step1 => Some(Self::Step2),
            Self::Step2 => Some(Self::Step3),
            Self::Step3 => Some(Self::Step4),
            Self::Step4 => Some(Self::Step5),
            Self::Step5 => Some(Self::Step6),
            _ => None,
        }
    }

    /// Whether the session is finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Result { .. })
    }
}

/// Prompt text for one of the optional step-6 fields.
pub fn optional_question(field: ProfileField) -> Option<&'static str> {
    match field {
        ProfileField::Country => Some("Where are you? (Optional)"),
        ProfileField::City => Some("Which city? (Optional)"),
        ProfileField::ExtraPreferences => {
            Some("Anything else we should know? (Optional, e.g., region, allergies, tastes)")
        }
        _ => None,
    }
}

/// Rejected quiz actions. The session state is unchanged after any of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    /// The action is not valid in the current state.
    #[error("cannot {action} in {state}")]
    WrongState {
        /// Attempted action.
        action: &'static str,
        /// State at the time.
        state: QuizState,
    },
    /// The answer does not fit the current question.
    #[error(transparent)]
    InvalidAnswer(#[from] ProfileError),
    /// Only the step-6 fields can be edited freely.
    #[error("{field} is not an optional field")]
    NotOptional {
        /// Field that was targeted.
        field: ProfileField,
    },
}

/// One run through the quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    state: QuizState,
    draft: ProfileDraft,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    /// Fresh session at step 1 with an empty profile.
    pub fn new() -> Self {
        Self {
            state: QuizState::Step1,
            draft: ProfileDraft::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &QuizState {
        &self.state
    }

    /// Answers recorded so far.
    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    /// Result markup once the session is finished.
    pub fn markup(&self) -> Option<&str> {
        match &self.state {
            QuizState::Result { markup } => Some(markup),
            _ => None,
        }
    }

    /// Record the answer for the current required step and advance.
    ///
    /// Choice answers are matched case-insensitively and stored under their
    /// canonical label. A blank occasion is stored as `"solo"`.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::WrongState`] outside steps 1-5 and
    /// [`QuizError::InvalidAnswer`] for blank or unknown choice labels.
    pub fn record(&mut self, answer: &str) -> Result<&QuizState, QuizError> {
        let (Some(field), Some(next)) = (self.state.field(), self.state.next_required()) else {
            return Err(self.wrong_state("record an answer"));
        };

        let value = match field {
            ProfileField::Flavor => parse_choice::<Flavor>(field, answer)?.to_string(),
            ProfileField::WineType => parse_choice::<WineType>(field, answer)?.to_string(),
            ProfileField::Budget => parse_choice::<Budget>(field, answer)?.to_string(),
            ProfileField::Boldness => parse_choice::<Boldness>(field, answer)?.to_string(),
            _ => match answer.trim() {
                "" => DEFAULT_OCCASION.to_owned(),
                text => text.to_owned(),
            },
        };

        self.draft.set(field, value);
        self.state = next;
        Ok(&self.state)
    }

    /// Overwrite one of the optional step-6 fields without advancing.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::NotOptional`] for required fields and
    /// [`QuizError::WrongState`] outside step 6.
    pub fn set_optional(&mut self, field: ProfileField, value: &str) -> Result<(), QuizError> {
        if !field.is_optional() {
            return Err(QuizError::NotOptional { field });
        }
        if self.state != QuizState::Step6 {
            return Err(self.wrong_state("edit optional details"));
        }
        self.draft.set(field, value);
        Ok(())
    }

    /// Freeze the profile and move step 6 → Loading.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::WrongState`] outside step 6.
    pub fn begin_submit(&mut self) -> Result<PreferenceProfile, QuizError> {
        if self.state != QuizState::Step6 {
            return Err(self.wrong_state("submit"));
        }
        let profile = self.draft.freeze()?;
        self.state = QuizState::Loading;
        Ok(profile)
    }

    /// Move Loading → Result with whatever the service returned.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::WrongState`] unless the session is loading.
    pub fn finish(&mut self, result: RecommendationResult) -> Result<&str, QuizError> {
        if self.state != QuizState::Loading {
            return Err(self.wrong_state("finish"));
        }
        self.state = QuizState::Result {
            markup: result.into_markup(),
        };
        Ok(self.markup().unwrap_or_default())
    }

    /// Submit the profile to the service and store the returned markup.
    ///
    /// Success and fallback are treated alike; both end in Result.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::WrongState`] outside step 6.
    pub async fn submit(&mut self, service: &RecommendationService) -> Result<&str, QuizError> {
        let profile = self.begin_submit()?;
        let result = service.recommend(&profile).await;
        self.finish(result)
    }

    fn wrong_state(&self, action: &'static str) -> QuizError {
        QuizError::WrongState {
            action,
            state: self.state.clone(),
        }
    }
}
