//! Provider output cleanup before it is rendered as markup.
//!
//! Rules, applied in order:
//! 1. every Markdown code fence marker is removed, with its language tag,
//!    and the text trimmed
//! 2. only `<h3>` and `<p>` tags survive; any other angle bracket is escaped
//! 3. if nothing is left, [`clean`] returns `None` and the caller renders
//!    [`FALLBACK_FRAGMENT`]

use std::sync::LazyLock;

use regex::Regex;

/// Fixed fragment rendered whenever no recommendation could be produced.
pub const FALLBACK_FRAGMENT: &str = "<h3>Oops, Sip Happens!</h3>\n\
<p>We couldn’t find your perfect wine right now. Give it another swirl soon!</p>";

/// Tags allowed through to the rendered fragment.
const ALLOWED_TAGS: [&str; 2] = ["h3", "p"];

// A fence marker plus either a language tag ending its line or an inline
// `html`/`xml` tag.
static FENCE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"```(?:[A-Za-z0-9_+-]*[ \t]*\r?\n|(?i:html|xml))?").ok()
});
static ANY_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^<>]*>").ok());
static TAG_PARTS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^<\s*(/?)\s*([A-Za-z][A-Za-z0-9]*)[^>]*>$").ok());

/// Turn raw provider output into a render-ready fragment.
///
/// Returns `None` for empty or whitespace-only output, and for output that
/// is empty once fences are removed.
pub fn clean(raw: &str) -> Option<String> {
    let unfenced = strip_code_fences(raw);
    if unfenced.is_empty() {
        return None;
    }

    let cleaned = enforce_allow_list(&unfenced);
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_owned())
}

/// Remove every fence marker, wherever it appears, and trim.
pub fn strip_code_fences(text: &str) -> String {
    match FENCE.as_ref() {
        Some(fence) => fence.replace_all(text, "").trim().to_owned(),
        None => text.replace("```", "").trim().to_owned(),
    }
}

/// Keep `<h3>`/`<p>` open and close tags (attributes dropped) and escape
/// every other angle bracket.
pub fn enforce_allow_list(text: &str) -> String {
    let Some(any_tag) = ANY_TAG.as_ref() else {
        return escape_angle_brackets(text);
    };

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for found in any_tag.find_iter(text) {
        out.push_str(&escape_angle_brackets(&text[cursor..found.start()]));
        match allowed_tag(found.as_str()) {
            Some(tag) => out.push_str(&tag),
            None => out.push_str(&escape_angle_brackets(found.as_str())),
        }
        cursor = found.end();
    }
    out.push_str(&escape_angle_brackets(&text[cursor..]));
    out
}

fn allowed_tag(raw: &str) -> Option<String> {
    let caps = TAG_PARTS.as_ref()?.captures(raw)?;
    let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
    let name = caps.get(2)?.as_str().to_ascii_lowercase();
    if !ALLOWED_TAGS.contains(&name.as_str()) {
        return None;
    }
    Some(if closing {
        format!("</{name}>")
    } else {
        format!("<{name}>")
    })
}

fn escape_angle_brackets(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}
