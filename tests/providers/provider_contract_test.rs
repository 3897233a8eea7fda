//! Provider capability contract tests.

use std::sync::Arc;

use strum::IntoEnumIterator;

use sommelier::providers::openai::OpenAiCompatProvider;
use sommelier::providers::{LlmProvider, ProviderKind};

#[test]
fn every_kind_reports_kind_slash_model_id() {
    for kind in ProviderKind::iter() {
        let provider = OpenAiCompatProvider::with_defaults(kind, "test-api-key".to_owned());
        assert_eq!(
            provider.model_id(),
            format!("{kind}/{}", kind.default_model())
        );
        assert_eq!(provider.endpoint(), kind.default_endpoint());
        assert_eq!(provider.kind(), kind);
    }
}

#[test]
fn provider_is_shareable_as_trait_object() {
    fn assert_send_sync<T: Send + Sync + ?Sized>() {}
    assert_send_sync::<dyn LlmProvider>();

    let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiCompatProvider::new(
        ProviderKind::Grok,
        "https://api.x.ai/v1/chat/completions".to_owned(),
        "grok-beta".to_owned(),
        "test-api-key".to_owned(),
    ));
    assert_eq!(provider.model_id(), "grok/grok-beta");
}

#[test]
fn provider_kind_parses_names_and_aliases() {
    assert_eq!("openai".parse::<ProviderKind>().ok(), Some(ProviderKind::OpenAi));
    assert_eq!("Grok".parse::<ProviderKind>().ok(), Some(ProviderKind::Grok));
    assert_eq!("xai".parse::<ProviderKind>().ok(), Some(ProviderKind::Grok));
    assert_eq!("DEEPSEEK".parse::<ProviderKind>().ok(), Some(ProviderKind::DeepSeek));
    assert!("anthropic".parse::<ProviderKind>().is_err());
}

#[test]
fn only_deepseek_skips_the_system_message() {
    let skipping: Vec<ProviderKind> = ProviderKind::iter()
        .filter(|kind| !kind.sends_system_prompt())
        .collect();
    assert_eq!(skipping, vec![ProviderKind::DeepSeek]);
}
