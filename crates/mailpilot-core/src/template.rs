//! Template placeholder expansion.

use mailpilot_remote::{Recipient, Template};

/// Replaces the `{{name}}`, `{{company}}`, `{{email}}` and `{{id}}`
/// placeholders in `text`.
///
/// Without a recipient the text is returned unchanged.
#[must_use]
pub fn apply_template_variables(text: &str, recipient: Option<&Recipient>) -> String {
    let Some(recipient) = recipient else {
        return text.to_string();
    };

    text.replace("{{name}}", &recipient.name)
        .replace("{{company}}", &recipient.company)
        .replace("{{email}}", &recipient.email)
        .replace("{{id}}", &recipient.id)
}

/// A subject and body ready to send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    /// Subject line.
    pub subject: String,
    /// Body including signature.
    pub body: String,
}

impl Draft {
    /// Expands `template` for `recipient` and appends a signature.
    ///
    /// The template's own signature takes precedence over `fallback_signature`.
    #[must_use]
    pub fn from_template(
        template: &Template,
        recipient: Option<&Recipient>,
        fallback_signature: &str,
    ) -> Self {
        let signature = if template.signature.is_empty() {
            fallback_signature
        } else {
            template.signature.as_str()
        };

        Self {
            subject: apply_template_variables(&template.subject, recipient),
            body: append_signature(&apply_template_variables(&template.body, recipient), signature),
        }
    }
}

/// Appends `signature` after a blank line; an empty signature leaves the body as is.
#[must_use]
pub fn append_signature(body: &str, signature: &str) -> String {
    if signature.is_empty() {
        return body.to_string();
    }
    format!("{}\n\n{signature}", body.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yamada() -> Recipient {
        Recipient {
            id: "12".to_string(),
            name: "山田 太郎".to_string(),
            company: "ABC商事".to_string(),
            email: "yamada@example.com".to_string(),
            template_id: String::new(),
        }
    }

    #[test]
    fn test_apply_template_variables() {
        let text = "{{company}}\n{{name}} 様 ({{email}}, #{{id}}) {{name}}";
        assert_eq!(
            apply_template_variables(text, Some(&yamada())),
            "ABC商事\n山田 太郎 様 (yamada@example.com, #12) 山田 太郎"
        );
    }

    #[test]
    fn test_apply_without_recipient() {
        assert_eq!(apply_template_variables("{{name}}", None), "{{name}}");
    }

    #[test]
    fn test_unknown_placeholders_survive() {
        assert_eq!(
            apply_template_variables("{{title}} {{name}}", Some(&yamada())),
            "{{title}} 山田 太郎"
        );
    }

    #[test]
    fn test_draft_prefers_template_signature() {
        let template = Template {
            subject: "Quote for {{company}}".to_string(),
            body: "Dear {{name}}\n".to_string(),
            signature: "-- Sales".to_string(),
            ..Template::default()
        };

        let draft = Draft::from_template(&template, Some(&yamada()), "-- Default");
        assert_eq!(draft.subject, "Quote for ABC商事");
        assert_eq!(draft.body, "Dear 山田 太郎\n\n-- Sales");

        let plain = Template {
            signature: String::new(),
            ..template
        };
        let draft = Draft::from_template(&plain, None, "-- Default");
        assert_eq!(draft.body, "Dear {{name}}\n\n-- Default");
    }

    #[test]
    fn test_append_empty_signature() {
        assert_eq!(append_signature("Body\n", ""), "Body\n");
    }
}
