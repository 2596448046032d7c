//! File-name heuristics for picking a recipient or template.
//!
//! Matching is literal substring containment after [`normalize`], never a
//! similarity score. The first token (outer loop) paired with the first
//! candidate (inner loop) that satisfies the rule wins.

pub mod safety;

pub use safety::{DEFAULT_CORPORATE_SUFFIXES, SafetyRules, SafetyWarning, validate_send_safety};

use mailpilot_remote::{Recipient, Template};

/// Characters that separate tokens in a file's base name.
pub const TOKEN_DELIMITERS: [char; 5] = ['_', ' ', '(', ')', '-'];

/// Lower-cases `s` and removes every whitespace character.
#[must_use]
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Returns `file_name` without its final extension.
#[must_use]
pub fn strip_extension(file_name: &str) -> &str {
    file_name
        .rfind('.')
        .map_or(file_name, |dot| &file_name[..dot])
}

/// Splits a file's base name into non-empty tokens, in order.
#[must_use]
pub fn tokenize_file_name(file_name: &str) -> Vec<&str> {
    strip_extension(file_name)
        .split(TOKEN_DELIMITERS)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Normalized tokens of `file_name`, skipping any that normalize to nothing.
fn normalized_tokens(file_name: &str) -> impl Iterator<Item = String> {
    tokenize_file_name(file_name)
        .into_iter()
        .map(normalize)
        .filter(|token| !token.is_empty())
}

/// Finds the recipient a file most plausibly belongs to.
///
/// A token matches a recipient when the normalized name, the normalized
/// company, or the two concatenated contain it.
#[must_use]
pub fn match_recipient_by_file_name<'a>(
    file_name: &str,
    recipients: &'a [Recipient],
) -> Option<&'a Recipient> {
    for token in normalized_tokens(file_name) {
        let found = recipients.iter().find(|recipient| {
            let name = normalize(&recipient.name);
            let company = normalize(&recipient.company);
            name.contains(&token)
                || company.contains(&token)
                || format!("{name}{company}").contains(&token)
        });
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Finds the template a file most plausibly belongs to.
///
/// Containment is checked both ways: the template name may contain the
/// token, or the token may contain the template name. A template whose name
/// normalizes to nothing is contained in every token.
#[must_use]
pub fn match_template_by_file_name<'a>(
    file_name: &str,
    templates: &'a [Template],
) -> Option<&'a Template> {
    for token in normalized_tokens(file_name) {
        let found = templates.iter().find(|template| {
            let name = normalize(&template.name);
            name.contains(&token) || token.contains(&name)
        });
        if found.is_some() {
            return found;
        }
    }
    None
}
