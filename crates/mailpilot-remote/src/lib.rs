//! # mailpilot-remote
//!
//! Request layer for a script-hosted mail backend reachable through a single
//! URL, where an `action` field selects the operation and every JSON response
//! carries a `success`/`error` envelope.
//!
//! ## Features
//!
//! - **Retries**: up to three attempts with exponential backoff (1s, 2s)
//! - **Redirect-safe POST**: 301/302 answers to a POST are re-issued as an
//!   authenticated GET against `Location`, since the body cannot be replayed
//! - **Basic authentication**: sent on every call, including redirect GETs
//! - **Typed actions**: templates, recipients, signatures, settings, send, save
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailpilot_remote::{RequestClient, SendMailRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RequestClient::new("https://script.google.com/macros/s/ID/exec")?
//!         .with_basic_auth("user", "secret");
//!
//!     let templates = client.get_templates().await?;
//!     println!("{} templates", templates.len());
//!
//!     let request = SendMailRequest::new("taro@example.com", "Quote", "Dear Yamada...");
//!     client.send_mail(&request).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod client;
mod error;
pub mod log;
pub mod model;

pub use client::{Credentials, MAX_REDIRECTS, REQUEST_TIMEOUT, RequestClient, RetryPolicy};
pub use error::{Error, Result};
pub use log::{LogHandle, RequestLog, TracingLog};
pub use model::{
    Action, Attachment, ConnectionTestResponse, Recipient, SaveTemplateRequest, SendMailRequest,
    SendMailResponse, SettingsResponse, Signature, Template,
};
