//! Pre-send consistency checks between a recipient and the message.

use super::normalize;
use mailpilot_remote::{Attachment, Recipient};

/// Japanese legal-entity markers stripped before comparing company names.
///
/// They appear in almost every company name and in many file names, so they
/// say nothing about which company a file belongs to.
pub const DEFAULT_CORPORATE_SUFFIXES: [&str; 8] = [
    "株式会社",
    "有限会社",
    "合同会社",
    "合資会社",
    "合名会社",
    "(株)",
    "（株）",
    "㈱",
];

/// Minimum length of a contiguous company substring accepted in a file name.
const COMPANY_WINDOW: usize = 3;

/// Minimum length of a name or company fragment accepted on its own.
const MIN_FRAGMENT: usize = 2;

/// Advisory produced by [`validate_send_safety`].
///
/// Warnings never block sending; the caller decides what to do with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyWarning {
    /// No recipient is selected.
    NoRecipient,
    /// An enabled attachment does not mention the recipient.
    AttachmentMismatch {
        /// Display name of the attachment.
        file_name: String,
        /// Company of the selected recipient.
        company: String,
    },
    /// The body mentions neither the recipient's company nor name.
    BodyMissingRecipient,
}

impl SafetyWarning {
    /// Get human-readable warning message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NoRecipient => "no recipient selected".to_string(),
            Self::AttachmentMismatch { file_name, company } => {
                format!("attachment \"{file_name}\" may not belong to recipient \"{company}\"")
            }
            Self::BodyMissingRecipient => {
                "body does not mention the recipient's company or name".to_string()
            }
        }
    }
}

impl std::fmt::Display for SafetyWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Tunables for [`SafetyRules::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyRules {
    corporate_suffixes: Vec<String>,
}

impl Default for SafetyRules {
    fn default() -> Self {
        Self::with_suffixes(DEFAULT_CORPORATE_SUFFIXES)
    }
}

impl SafetyRules {
    /// Creates rules stripping the given corporate suffixes.
    #[must_use]
    pub fn with_suffixes<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            corporate_suffixes: suffixes
                .into_iter()
                .map(|suffix| normalize(suffix.as_ref()))
                .filter(|suffix| !suffix.is_empty())
                .collect(),
        }
    }

    /// Normalized suffixes in use.
    #[must_use]
    pub fn corporate_suffixes(&self) -> &[String] {
        &self.corporate_suffixes
    }

    fn strip_suffixes(&self, mut s: String) -> String {
        for suffix in &self.corporate_suffixes {
            if s.contains(suffix.as_str()) {
                s = s.replace(suffix.as_str(), "");
            }
        }
        s
    }

    /// Checks that every enabled attachment and the body plausibly belong to
    /// `recipient`.
    ///
    /// Warnings come back in a fixed order: one per mismatching attachment
    /// (in attachment order), then at most one for the body. Without a
    /// recipient the only warning is [`SafetyWarning::NoRecipient`].
    #[must_use]
    pub fn validate(
        &self,
        recipient: Option<&Recipient>,
        attachments: &[Attachment],
        body: &str,
    ) -> Vec<SafetyWarning> {
        let Some(recipient) = recipient else {
            return vec![SafetyWarning::NoRecipient];
        };

        let mut warnings: Vec<SafetyWarning> = attachments
            .iter()
            .filter(|attachment| attachment.enabled)
            .filter(|attachment| !self.attachment_matches(recipient, &attachment.file_name))
            .map(|attachment| SafetyWarning::AttachmentMismatch {
                file_name: attachment.file_name.clone(),
                company: recipient.company.clone(),
            })
            .collect();

        if !body_mentions(recipient, body) {
            warnings.push(SafetyWarning::BodyMissingRecipient);
        }

        warnings
    }

    fn attachment_matches(&self, recipient: &Recipient, file_name: &str) -> bool {
        let file_name = self.strip_suffixes(normalize(file_name));
        let company = self.strip_suffixes(normalize(&recipient.company));

        file_name.contains(&company)
            || company_window_found(&company, &file_name)
            || fragment_found(&normalize(&recipient.name), &file_name)
    }
}

/// Validates with the default Japanese suffix list.
///
/// See [`SafetyRules::validate`].
#[must_use]
pub fn validate_send_safety(
    recipient: Option<&Recipient>,
    attachments: &[Attachment],
    body: &str,
) -> Vec<SafetyWarning> {
    SafetyRules::default().validate(recipient, attachments, body)
}

fn body_mentions(recipient: &Recipient, body: &str) -> bool {
    let body = normalize(body);

    body.contains(&normalize(&recipient.company))
        || fragment_found(&recipient.company.to_lowercase(), &body)
        || fragment_found(&recipient.name.to_lowercase(), &body)
}

/// True if any `COMPANY_WINDOW`-character run of `company` occurs in `haystack`.
fn company_window_found(company: &str, haystack: &str) -> bool {
    let chars: Vec<char> = company.chars().collect();
    chars.len() >= COMPANY_WINDOW
        && chars
            .windows(COMPANY_WINDOW)
            .any(|window| haystack.contains(&window.iter().collect::<String>()))
}

/// True if any whitespace-separated fragment of `source` with at least
/// `MIN_FRAGMENT` characters occurs in `haystack`.
fn fragment_found(source: &str, haystack: &str) -> bool {
    source
        .split_whitespace()
        .filter(|fragment| fragment.chars().count() >= MIN_FRAGMENT)
        .any(|fragment| haystack.contains(fragment))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn recipient(name: &str, company: &str) -> Recipient {
        Recipient {
            id: "1".to_string(),
            name: name.to_string(),
            company: company.to_string(),
            email: "to@example.com".to_string(),
            template_id: String::new(),
        }
    }

    fn attachment(file_name: &str) -> Attachment {
        Attachment::new(format!("/tmp/{file_name}"), file_name, "", "application/pdf")
    }

    #[test]
    fn test_no_recipient_stops_all_checks() {
        let warnings = validate_send_safety(None, &[attachment("x.pdf")], "");
        assert_eq!(warnings, vec![SafetyWarning::NoRecipient]);
    }

    #[test]
    fn test_empty_company_raises_no_warnings() {
        let to = recipient("", "");
        let warnings = validate_send_safety(
            Some(&to),
            &[attachment("suzuki.pdf"), attachment("見積書.xlsx")],
            "Hello",
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_attachment_with_unrelated_name_warns() {
        let to = recipient("田中 太郎", "株式会社田中商事");
        let warnings = validate_send_safety(Some(&to), &[attachment("suzuki.pdf")], "田中様");

        assert_eq!(
            warnings,
            vec![SafetyWarning::AttachmentMismatch {
                file_name: "suzuki.pdf".to_string(),
                company: "株式会社田中商事".to_string(),
            }]
        );
    }

    #[test]
    fn test_attachment_full_company_after_suffix_strip() {
        let to = recipient("佐藤", "株式会社田中商事");
        let warnings =
            validate_send_safety(Some(&to), &[attachment("㈱田中商事_請求書.pdf")], "株式会社田中商事 佐藤様");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_attachment_partial_company_window() {
        let to = recipient("Sato", "Acme Trading");
        let warnings = validate_send_safety(Some(&to), &[attachment("ACM_invoice.pdf")], "acme");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_attachment_matches_recipient_name() {
        let to = recipient("Yamada", "Zeta");
        let warnings = validate_send_safety(Some(&to), &[attachment("yamada-quote.pdf")], "zeta");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_disabled_attachments_are_skipped() {
        let to = recipient("田中太郎", "田中商事");
        let attachments = vec![attachment("suzuki.pdf").with_enabled(false)];
        assert!(validate_send_safety(Some(&to), &attachments, "田中商事").is_empty());
    }

    #[test]
    fn test_body_name_fragment_is_enough() {
        let to = recipient("田中 太郎", "株式会社山本");
        let warnings = validate_send_safety(Some(&to), &[], "田中様\nいつもお世話になっております。");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_body_company_fragment_is_enough() {
        let to = recipient("Jiro", "Blue Sky Partners");
        let warnings = validate_send_safety(Some(&to), &[], "Dear partners at Sky,");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_body_without_recipient_warns() {
        let to = recipient("Suzuki Ichiro", "Northwind");
        let warnings = validate_send_safety(Some(&to), &[], "Hello there");
        assert_eq!(warnings, vec![SafetyWarning::BodyMissingRecipient]);
    }

    #[test]
    fn test_warning_order_and_determinism() {
        let to = recipient("Kato", "Orion");
        let attachments = vec![attachment("a.pdf"), attachment("orion.pdf"), attachment("b.pdf")];

        let first = validate_send_safety(Some(&to), &attachments, "nothing");
        let second = validate_send_safety(Some(&to), &attachments, "nothing");

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert!(matches!(&first[0], SafetyWarning::AttachmentMismatch { file_name, .. } if file_name == "a.pdf"));
        assert!(matches!(&first[1], SafetyWarning::AttachmentMismatch { file_name, .. } if file_name == "b.pdf"));
        assert_eq!(first[2], SafetyWarning::BodyMissingRecipient);
    }

    #[test]
    fn test_custom_suffixes() {
        let rules = SafetyRules::with_suffixes(["Inc."]);
        let to = recipient("Lee", "Globex Inc.");
        let warnings = rules.validate(Some(&to), &[attachment("globex.pdf")], "globex");
        assert!(warnings.is_empty());
        assert_eq!(rules.corporate_suffixes(), ["inc."]);
    }

    #[test]
    fn test_warning_messages() {
        let warning = SafetyWarning::AttachmentMismatch {
            file_name: "x.pdf".to_string(),
            company: "Orion".to_string(),
        };
        assert!(warning.to_string().contains("x.pdf"));
        assert!(warning.to_string().contains("Orion"));
        assert_eq!(SafetyWarning::NoRecipient.to_string(), "no recipient selected");
    }
}
