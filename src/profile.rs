//! Preference profile collected by the quiz.
//!
//! A [`ProfileDraft`] is the mutable, stringly-typed form the quiz and the
//! HTTP boundary fill in. [`ProfileDraft::freeze`] validates it into an
//! immutable [`PreferenceProfile`] that the recommendation service consumes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Occasion used when the user leaves the occasion step blank.
pub const DEFAULT_OCCASION: &str = "solo";

/// Flavor preference (quiz step 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Flavor {
    /// Fruit-forward wines.
    Fruity,
    /// Low residual sugar.
    Dry,
    /// Noticeably sweet.
    Sweet,
}

/// Wine type (quiz step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum WineType {
    /// Red wine.
    Red,
    /// White wine.
    White,
    /// Rosé wine.
    #[strum(to_string = "Rosé", serialize = "rose", serialize = "ROSÉ")]
    Rose,
    /// Sparkling wine.
    Sparkling,
}

/// Price band per bottle (quiz step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Budget {
    /// Below €15.
    #[strum(
        to_string = "Under €15",
        serialize = "under-15",
        serialize = "under 15",
        serialize = "under15"
    )]
    Under15,
    /// Between €15 and €30.
    #[strum(
        to_string = "€15–30",
        serialize = "15-30",
        serialize = "€15-30",
        serialize = "€15-€30",
        serialize = "15–30"
    )]
    From15To30,
    /// €30 and above.
    #[strum(to_string = "€30+", serialize = "30-plus", serialize = "30+", serialize = "30plus")]
    Over30,
}

/// Body/intensity preference (quiz step 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Boldness {
    /// Light-bodied.
    Light,
    /// Medium-bodied.
    Medium,
    /// Full-bodied.
    Bold,
}

/// Human labels of every option for a choice field, in quiz order.
pub fn option_labels<E: IntoEnumIterator + std::fmt::Display>() -> Vec<String> {
    E::iter().map(|option| option.to_string()).collect()
}

/// Individual profile fields, used in validation errors and quiz steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ProfileField {
    /// Flavor preference.
    Flavor,
    /// Wine type.
    #[strum(to_string = "Type")]
    WineType,
    /// Occasion or food pairing.
    #[strum(to_string = "Occasion/Food Pairing")]
    Occasion,
    /// Budget band.
    Budget,
    /// Boldness.
    Boldness,
    /// Country (optional).
    Country,
    /// City (optional).
    City,
    /// Extra preferences (optional).
    #[strum(to_string = "Extra Preferences")]
    ExtraPreferences,
}

impl ProfileField {
    /// Whether the field is one of the three optional step-6 fields.
    pub fn is_optional(self) -> bool {
        matches!(self, Self::Country | Self::City | Self::ExtraPreferences)
    }
}

/// Validation failures when freezing a draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    /// A required field was left empty.
    #[error("missing required field: {field}")]
    MissingField {
        /// The empty field.
        field: ProfileField,
    },
    /// A choice field held a label that matches none of its options.
    #[error("invalid value {value:?} for {field}")]
    InvalidOption {
        /// The offending field.
        field: ProfileField,
        /// Raw value supplied.
        value: String,
    },
}

/// Mutable profile under construction.
///
/// Mirrors the JSON body posted by the quiz client: every field is a string
/// and an empty string means "not answered".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileDraft {
    /// Flavor label.
    pub flavor: String,
    /// Wine type label.
    #[serde(rename = "type")]
    pub wine_type: String,
    /// Occasion or food pairing.
    pub occasion: String,
    /// Budget label.
    pub budget: String,
    /// Boldness label.
    pub boldness: String,
    /// Country, optional.
    pub country: String,
    /// City, optional.
    pub city: String,
    /// Free-form extra preferences, optional.
    pub extra_preferences: String,
}

impl ProfileDraft {
    /// Current raw value of a field.
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Flavor => &self.flavor,
            ProfileField::WineType => &self.wine_type,
            ProfileField::Occasion => &self.occasion,
            ProfileField::Budget => &self.budget,
            ProfileField::Boldness => &self.boldness,
            ProfileField::Country => &self.country,
            ProfileField::City => &self.city,
            ProfileField::ExtraPreferences => &self.extra_preferences,
        }
    }

    /// Overwrite a field with a new raw value.
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let slot = match field {
            ProfileField::Flavor => &mut self.flavor,
            ProfileField::WineType => &mut self.wine_type,
            ProfileField::Occasion => &mut self.occasion,
            ProfileField::Budget => &mut self.budget,
            ProfileField::Boldness => &mut self.boldness,
            ProfileField::Country => &mut self.country,
            ProfileField::City => &mut self.city,
            ProfileField::ExtraPreferences => &mut self.extra_preferences,
        };
        *slot = value.into();
    }

    /// Validate the draft into an immutable [`PreferenceProfile`].
    ///
    /// A blank occasion becomes [`DEFAULT_OCCASION`]; blank optional fields
    /// become `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] for the first required field that is empty
    /// or holds an unknown option label.
    pub fn freeze(&self) -> Result<PreferenceProfile, ProfileError> {
        let flavor = parse_choice(ProfileField::Flavor, &self.flavor)?;
        let wine_type = parse_choice(ProfileField::WineType, &self.wine_type)?;
        let occasion = match self.occasion.trim() {
            "" => DEFAULT_OCCASION.to_owned(),
            value => value.to_owned(),
        };
        let budget = parse_choice(ProfileField::Budget, &self.budget)?;
        let boldness = parse_choice(ProfileField::Boldness, &self.boldness)?;

        Ok(PreferenceProfile {
            flavor,
            wine_type,
            occasion,
            budget,
            boldness,
            country: non_blank(&self.country),
            city: non_blank(&self.city),
            extra_preferences: non_blank(&self.extra_preferences),
        })
    }
}

/// Parse a choice label for `field`, rejecting blanks and unknown labels.
///
/// # Errors
///
/// Returns [`ProfileError::MissingField`] for blank input and
/// [`ProfileError::InvalidOption`] when no option matches.
pub fn parse_choice<T: std::str::FromStr>(field: ProfileField, raw: &str) -> Result<T, ProfileError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ProfileError::MissingField { field });
    }
    trimmed.parse().map_err(|_| ProfileError::InvalidOption {
        field,
        value: trimmed.to_owned(),
    })
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Validated, immutable preference profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceProfile {
    /// Flavor preference.
    pub flavor: Flavor,
    /// Wine type.
    pub wine_type: WineType,
    /// Occasion or food pairing; never blank.
    pub occasion: String,
    /// Budget band.
    pub budget: Budget,
    /// Boldness.
    pub boldness: Boldness,
    /// Country, if given.
    pub country: Option<String>,
    /// City, if given.
    pub city: Option<String>,
    /// Extra preferences, if given.
    pub extra_preferences: Option<String>,
}
