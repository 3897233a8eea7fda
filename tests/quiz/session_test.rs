//! Quiz state machine transitions.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use sommelier::profile::{ProfileError, ProfileField};
use sommelier::providers::{LlmProvider, ProviderError};
use sommelier::quiz::{QuizError, QuizSession, QuizState};
use sommelier::recommend::{RecommendationResult, RecommendationService};
use sommelier::sanitize::FALLBACK_FRAGMENT;

struct FixedProvider(Result<&'static str, &'static str>);

#[async_trait]
impl LlmProvider for FixedProvider {
    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        match self.0 {
            Ok(text) => Ok(text.to_owned()),
            Err(reason) => Err(ProviderError::HttpStatus {
                status: 503,
                body: reason.to_owned(),
            }),
        }
    }

    fn model_id(&self) -> &str {
        "fixed/test"
    }
}

fn service(reply: Result<&'static str, &'static str>) -> RecommendationService {
    RecommendationService::new(Arc::new(FixedProvider(reply)), Duration::from_secs(5))
}

fn at_step_six() -> QuizSession {
    let mut session = QuizSession::new();
    for answer in ["Fruity", "White", "solo", "€15–30", "Light"] {
        let recorded = session.record(answer);
        assert!(recorded.is_ok(), "{answer} should be accepted");
    }
    session
}

#[test]
fn new_session_starts_at_step_one_with_empty_draft() {
    let session = QuizSession::new();
    assert_eq!(session.state(), &QuizState::Step1);
    assert_eq!(session.draft().flavor, "");
    assert_eq!(session.markup(), None);
}

#[test]
fn flavor_answer_advances_to_step_two() {
    let mut session = QuizSession::new();
    let state = session.record("Dry").cloned();
    assert_eq!(state.ok(), Some(QuizState::Step2));
    assert_eq!(session.draft().flavor, "Dry");
}

#[test]
fn five_answers_reach_step_six() {
    let session = at_step_six();
    assert_eq!(session.state(), &QuizState::Step6);
    assert_eq!(session.draft().wine_type, "White");
    assert_eq!(session.draft().budget, "€15–30");
}

#[test]
fn choice_answers_are_stored_under_canonical_labels() {
    let mut session = QuizSession::new();
    assert!(session.record("fruity").is_ok());
    assert!(session.record("rose").is_ok());
    assert!(session.record("").is_ok());
    assert!(session.record("30-plus").is_ok());
    assert!(session.record("BOLD").is_ok());

    let draft = session.draft();
    assert_eq!(draft.flavor, "Fruity");
    assert_eq!(draft.wine_type, "Rosé");
    assert_eq!(draft.budget, "€30+");
    assert_eq!(draft.boldness, "Bold");
}

#[test]
fn blank_occasion_is_recorded_as_solo() {
    let mut session = QuizSession::new();
    assert!(session.record("Sweet").is_ok());
    assert!(session.record("Sparkling").is_ok());
    assert!(session.record("   ").is_ok());
    assert_eq!(session.draft().occasion, "solo");
    assert_eq!(session.state(), &QuizState::Step4);
}

#[test]
fn unknown_option_is_rejected_without_advancing() {
    let mut session = QuizSession::new();
    let err = session.record("Smoky").err();
    assert!(matches!(
        err,
        Some(QuizError::InvalidAnswer(ProfileError::InvalidOption {
            field: ProfileField::Flavor,
            ..
        }))
    ));
    assert_eq!(session.state(), &QuizState::Step1);
}

#[test]
fn blank_choice_is_rejected() {
    let mut session = QuizSession::new();
    let err = session.record("").err();
    assert!(matches!(
        err,
        Some(QuizError::InvalidAnswer(ProfileError::MissingField { .. }))
    ));
}

#[test]
fn record_at_step_six_is_wrong_state() {
    let mut session = at_step_six();
    let err = session.record("Dry").err();
    assert!(matches!(
        err,
        Some(QuizError::WrongState {
            state: QuizState::Step6,
            ..
        })
    ));
}

#[test]
fn optional_edits_overwrite_without_advancing() {
    let mut session = at_step_six();
    assert!(session.set_optional(ProfileField::City, "Lyon").is_ok());
    assert!(session.set_optional(ProfileField::City, "Paris").is_ok());
    assert_eq!(session.draft().city, "Paris");
    assert_eq!(session.state(), &QuizState::Step6);
}

#[test]
fn optional_edits_are_limited_to_step_six_fields() {
    let mut session = at_step_six();
    let err = session.set_optional(ProfileField::Budget, "€30+").err();
    assert!(matches!(
        err,
        Some(QuizError::NotOptional {
            field: ProfileField::Budget
        })
    ));

    let mut early = QuizSession::new();
    let err = early.set_optional(ProfileField::Country, "France").err();
    assert!(matches!(err, Some(QuizError::WrongState { .. })));
}

#[test]
fn submit_before_step_six_is_rejected() {
    let mut session = QuizSession::new();
    assert!(session.record("Dry").is_ok());
    let err = session.begin_submit().err();
    assert!(matches!(err, Some(QuizError::WrongState { .. })));
    assert_eq!(session.state(), &QuizState::Step2);
}

#[test]
fn split_submit_moves_through_loading() {
    let mut session = at_step_six();
    let profile = session.begin_submit();
    assert!(profile.is_ok());
    assert_eq!(session.state(), &QuizState::Loading);
    assert!(session.begin_submit().is_err());

    let markup = session.finish(RecommendationResult::fallback()).map(str::to_owned);
    assert_eq!(markup.ok().as_deref(), Some(FALLBACK_FRAGMENT));
    assert!(session.state().is_terminal());
}

#[test]
fn finish_outside_loading_is_rejected() {
    let mut session = at_step_six();
    let err = session.finish(RecommendationResult::fallback()).err();
    assert!(matches!(err, Some(QuizError::WrongState { .. })));
}

#[tokio::test]
async fn submit_with_empty_optionals_reaches_result() {
    let mut session = at_step_six();
    let markup = session
        .submit(&service(Ok("<h3>Test</h3><p>Body</p>")))
        .await
        .map(str::to_owned);

    assert_eq!(markup.ok().as_deref(), Some("<h3>Test</h3><p>Body</p>"));
    assert_eq!(
        session.state(),
        &QuizState::Result {
            markup: "<h3>Test</h3><p>Body</p>".to_owned()
        }
    );
}

#[tokio::test]
async fn provider_failure_still_reaches_result() {
    let mut session = at_step_six();
    let submitted = session.submit(&service(Err("offline"))).await;
    assert!(submitted.is_ok());
    assert_eq!(session.markup(), Some(FALLBACK_FRAGMENT));
}

#[tokio::test]
async fn result_is_terminal() {
    let mut session = at_step_six();
    assert!(session.submit(&service(Ok("<p>ok</p>"))).await.is_ok());

    assert!(session.record("Dry").is_err());
    assert!(session.set_optional(ProfileField::City, "Rome").is_err());
    assert!(session.submit(&service(Ok("<p>again</p>"))).await.is_err());
    assert_eq!(session.markup(), Some("<p>ok</p>"));
}

#[test]
fn every_question_step_has_prompt_text() {
    assert_eq!(QuizState::Step1.question(), Some("Fruity, Dry, or Sweet?"));
    assert_eq!(QuizState::Step1.options(), vec!["Fruity", "Dry", "Sweet"]);
    assert!(QuizState::Step3.options().is_empty());
    assert_eq!(
        QuizState::Step4.options(),
        vec!["Under €15", "€15–30", "€30+"]
    );
    assert_eq!(QuizState::Loading.question(), None);
}
