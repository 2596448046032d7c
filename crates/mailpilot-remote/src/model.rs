//! Wire types exchanged with the backend.
//!
//! Field names follow the backend's camelCase JSON conventions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Operation selector sent as the `action` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// Connectivity probe.
    Test,
    /// List mail templates.
    GetTemplates,
    /// List recipients.
    GetRecipients,
    /// List signatures.
    GetSignatures,
    /// Fetch backend settings.
    GetSettings,
    /// Send a message.
    SendMail,
    /// Create or update a template.
    SaveTemplate,
}

impl Action {
    /// Returns the wire tag for this action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::GetTemplates => "getTemplates",
            Self::GetRecipients => "getRecipients",
            Self::GetSignatures => "getSignatures",
            Self::GetSettings => "getSettings",
            Self::SendMail => "sendMail",
            Self::SaveTemplate => "saveTemplate",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mail template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    /// Unique identifier (row number on the backend).
    pub id: String,
    /// Template name.
    pub name: String,
    /// Subject line.
    pub subject: String,
    /// Body text, may contain `{{placeholders}}`.
    pub body: String,
    /// Signature attached to this template, empty when unset.
    pub signature: String,
}

/// A mail recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Recipient {
    /// Unique identifier.
    pub id: String,
    /// Person name.
    pub name: String,
    /// Company name.
    pub company: String,
    /// Email address.
    pub email: String,
    /// Linked template, empty when unset.
    pub template_id: String,
}

/// A named signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Signature {
    /// Display name.
    pub name: String,
    /// Signature text.
    pub content: String,
}

/// A file attached to an outgoing message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Attachment {
    /// Local path the file was read from.
    pub file_path: String,
    /// Display file name.
    pub file_name: String,
    /// Whether the file is included when sending.
    pub enabled: bool,
    /// Base64-encoded file content.
    pub data: String,
    /// MIME type.
    pub mime_type: String,
}

impl Attachment {
    /// Creates an enabled attachment from already-encoded content.
    #[must_use]
    pub fn new(
        file_path: impl Into<String>,
        file_name: impl Into<String>,
        data: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            file_name: file_name.into(),
            enabled: true,
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Sets the inclusion flag.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Payload of a `sendMail` call.
#[derive(Debug, Clone, Serialize)]
pub struct SendMailRequest {
    /// Always [`Action::SendMail`].
    pub action: Action,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
    /// Attachments, in order.
    pub attachments: Vec<Attachment>,
}

impl SendMailRequest {
    /// Creates a send request without attachments.
    #[must_use]
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            action: Action::SendMail,
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            attachments: Vec::new(),
        }
    }

    /// Sets the attachments.
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

/// Payload of a `saveTemplate` call.
#[derive(Debug, Clone, Serialize)]
pub struct SaveTemplateRequest {
    /// Always [`Action::SaveTemplate`].
    pub action: Action,
    /// Template id; empty creates a new template.
    pub id: String,
    /// Template name.
    pub name: String,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
}

impl SaveTemplateRequest {
    /// Creates a save request.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            action: Action::SaveTemplate,
            id: id.into(),
            name: name.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Response to `sendMail` and `saveTemplate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SendMailResponse {
    /// Success flag as reported by the backend.
    pub success: bool,
    /// Error message, empty on success.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// Response to `getTemplates`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TemplatesResponse {
    /// Templates.
    pub templates: Vec<Template>,
    /// Error message, empty on success.
    pub error: String,
}

/// Response to `getRecipients`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecipientsResponse {
    /// Recipients.
    pub recipients: Vec<Recipient>,
    /// Error message, empty on success.
    pub error: String,
}

/// Response to `getSignatures`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignaturesResponse {
    /// Signatures.
    pub signatures: Vec<Signature>,
    /// Error message, empty on success.
    pub error: String,
}

/// Response to `getSettings`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsResponse {
    /// Free-form settings map.
    pub settings: HashMap<String, serde_json::Value>,
    /// Default signature; filled from local configuration when empty.
    pub signature: String,
    /// Error message, empty on success.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// Response to `test`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionTestResponse {
    /// Whether the backend is reachable.
    pub success: bool,
    /// Informational message.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Error message.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl ConnectionTestResponse {
    /// A successful probe with a message.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: String::new(),
        }
    }

    /// A failed probe with an error message.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: String::new(),
            error: error.into(),
        }
    }
}
