//! Sommelier: a wine preference quiz backed by a text-generation provider.
//!
//! A [`quiz::QuizSession`] collects a [`profile::PreferenceProfile`] one
//! answer at a time. [`recommend::RecommendationService`] turns it into a
//! prompt, calls the single configured provider, and sanitizes the reply
//! into `<h3>`/`<p>` markup, or returns a fixed fallback fragment.
//!
//! See `DESIGN.md` for architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod logging;
pub mod providers;

pub mod profile;
pub mod prompt;
pub mod quiz;
pub mod recommend;
pub mod sanitize;

pub mod api;
