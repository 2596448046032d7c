//! # mailpilot-core
//!
//! Core services for the `MailPilot` mail client.
//!
//! This crate provides:
//! - Layered local configuration (distribution file, user file, environment)
//! - Attachment loading with MIME detection and size limits
//! - File-name matching of recipients and templates
//! - Send-safety validation of attachments and body against the recipient
//! - Template placeholder expansion
//! - The [`MailPilot`] service tying these to the backend client

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod attachment;
pub mod config;
mod error;
pub mod matching;
pub mod service;
pub mod template;

pub use attachment::{MAX_ATTACHMENT_SIZE, mime_type_for, read_attachment, read_attachments};
pub use config::{Config, ConfigPaths};
pub use error::{Error, Result};
pub use matching::{
    SafetyRules, SafetyWarning, match_recipient_by_file_name, match_template_by_file_name,
    normalize, tokenize_file_name, validate_send_safety,
};
pub use service::MailPilot;
pub use template::{Draft, apply_template_variables};
