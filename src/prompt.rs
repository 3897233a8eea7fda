//! Instruction text sent to the provider.
//!
//! [`build_prompt`] is a pure function of the profile: the same profile always
//! renders byte-identical text, so prompts can be asserted on in tests.

use std::fmt::Write as _;

use crate::profile::{PreferenceProfile, ProfileField};

/// System message prepended by providers that support one.
pub const SOMMELIER_SYSTEM_PROMPT: &str = "You are a professional wine sommelier.";

/// Placeholder for a missing country or city.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Placeholder for missing extra preferences.
pub const NO_EXTRA_PREFERENCES: &str = "None";

/// Maximum words per `<p>` element requested from the provider.
pub const MAX_WORDS_PER_PARAGRAPH: u32 = 50;

/// Render the recommendation instructions for a profile.
pub fn build_prompt(profile: &PreferenceProfile) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(
        "You are a friendly, professional sommelier assisting beginner and intermediate \
         wine lovers. Based on these preferences, provide a casual, approachable wine \
         recommendation:\n",
    );

    let occasion = single_line(&profile.occasion);
    let country = optional_value(profile.country.as_deref(), NOT_SPECIFIED);
    let city = optional_value(profile.city.as_deref(), NOT_SPECIFIED);
    let extra = optional_value(profile.extra_preferences.as_deref(), NO_EXTRA_PREFERENCES);

    let fields: [(ProfileField, String); 8] = [
        (ProfileField::Flavor, profile.flavor.to_string()),
        (ProfileField::WineType, profile.wine_type.to_string()),
        (ProfileField::Occasion, occasion),
        (ProfileField::Budget, profile.budget.to_string()),
        (ProfileField::Boldness, profile.boldness.to_string()),
        (ProfileField::Country, country),
        (ProfileField::City, city),
        (ProfileField::ExtraPreferences, extra),
    ];
    for (field, value) in &fields {
        let _ = writeln!(prompt, "- {field}: {value}");
    }

    prompt.push_str(
        "\nYour response must include:\n\
         1. Summary: a short, casual recap of the preferences above to confirm you understood them.\n\
         2. Suggestion: 2-3 general wine styles (e.g. Riesling, Silvaner) matching the flavor, \
         type, boldness and pairing, adjusted for any extra preferences.\n\
         3. Brands: 2-3 specific wines, each with availability in the given city (or general \
         options if none is given), a price range within the budget, pairing notes, and special \
         features such as organic or low sulfites when relevant.\n\
         4. Where to Buy: common stores or wine shops in the given city or country, or general \
         options such as \"local wine shops\" when no location is given.\n\
         5. Extra Preferences: address any extra preferences explicitly and explain how the \
         picks align with them.\n",
    );

    let _ = write!(
        prompt,
        "\nFormat your response as HTML-ready text:\n\
         - Use <h3> for section headers and wine names (e.g. \"<h3>Dr. Loosen Riesling (White)</h3>\").\n\
         - Use <p> for all explanatory text (e.g. \"<p>Pick it up at your local wine shop.</p>\").\n\
         - Keep each <p> under {MAX_WORDS_PER_PARAGRAPH} words.\n\
         - Return only <h3> and <p> elements, with no text outside the tags.\n\
         \nKeep the tone casual, friendly and professional."
    );

    prompt
}

fn optional_value(value: Option<&str>, placeholder: &str) -> String {
    match value.map(single_line) {
        Some(text) if !text.is_empty() => text,
        _ => placeholder.to_owned(),
    }
}

/// Collapse whitespace so free text cannot open new directive lines.
fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
