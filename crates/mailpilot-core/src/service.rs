//! Orchestration service between a front end and the backend.
//!
//! Guards every backend call with a configuration check, keeps the local
//! signature as a fallback, and routes file-name matching and send-safety
//! checks through the configured rules.

use crate::config::{Config, ConfigPaths};
use crate::error::{Error, Result};
use crate::matching::{
    SafetyRules, SafetyWarning, match_recipient_by_file_name, match_template_by_file_name,
};
use crate::template::apply_template_variables;
use mailpilot_remote::{
    Attachment, ConnectionTestResponse, LogHandle, Recipient, RequestClient, SaveTemplateRequest,
    SendMailRequest, SendMailResponse, SettingsResponse, Signature, Template,
};

/// Application service owning the configuration and the request client.
#[derive(Debug)]
pub struct MailPilot {
    config: Config,
    paths: ConfigPaths,
    client: RequestClient,
    rules: SafetyRules,
}

impl MailPilot {
    /// Creates a service whose client is built from `config` and logs
    /// through `tracing`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: Config, paths: ConfigPaths) -> Result<Self> {
        Self::with_log(config, paths, LogHandle::default())
    }

    /// Creates a service whose client reports request events to `log`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_log(config: Config, paths: ConfigPaths, log: LogHandle) -> Result<Self> {
        let client = RequestClient::new(config.gas_url.clone())?.with_log(log);
        Ok(Self::with_client(config, paths, client))
    }

    /// Creates a service around an existing client, applying `config`'s URL
    /// and credentials to it.
    #[must_use]
    pub fn with_client(config: Config, paths: ConfigPaths, mut client: RequestClient) -> Self {
        client.set_base_url(config.gas_url.clone());
        client.set_basic_auth(config.basic_auth_id.clone(), config.basic_auth_pw.clone());
        let rules = config.safety_rules();
        Self {
            config,
            paths,
            client,
            rules,
        }
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying request client.
    #[must_use]
    pub const fn client(&self) -> &RequestClient {
        &self.client
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(Error::NotConfigured)
        }
    }

    /// Replaces the configuration, persists it, and reconfigures the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written.
    pub async fn update_config(&mut self, config: Config) -> Result<()> {
        config.save(&self.paths).await.inspect_err(|e| {
            tracing::error!("Failed to save settings: {e}");
        })?;

        self.client.set_base_url(config.gas_url.clone());
        self.client
            .set_basic_auth(config.basic_auth_id.clone(), config.basic_auth_pw.clone());
        self.rules = config.safety_rules();
        self.config = config;

        tracing::info!("Settings updated");
        Ok(())
    }

    /// Saves the URL and signature, keeping current credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written.
    pub async fn save_config(&mut self, gas_url: &str, signature: &str) -> Result<()> {
        let config = Config {
            gas_url: gas_url.to_string(),
            signature: signature.to_string(),
            ..self.config.clone()
        };
        self.update_config(config).await
    }

    /// Saves the URL, signature and Basic authentication credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written.
    pub async fn save_config_with_auth(
        &mut self,
        gas_url: &str,
        signature: &str,
        auth_id: &str,
        auth_pw: &str,
    ) -> Result<()> {
        let config = Config {
            gas_url: gas_url.to_string(),
            signature: signature.to_string(),
            basic_auth_id: auth_id.to_string(),
            basic_auth_pw: auth_pw.to_string(),
            ..self.config.clone()
        };
        self.update_config(config).await
    }

    /// Probes the backend; failures are reported in the response, never as
    /// an error.
    pub async fn test_connection(&self) -> ConnectionTestResponse {
        if self.ensure_configured().is_err() {
            return ConnectionTestResponse::failed(Error::NotConfigured.to_string());
        }
        match self.client.test_connection().await {
            Ok(response) => response,
            Err(e) => ConnectionTestResponse::failed(e.to_string()),
        }
    }

    /// Lists templates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] without a URL, or the request error.
    pub async fn templates(&self) -> Result<Vec<Template>> {
        self.ensure_configured()?;
        Ok(self.client.get_templates().await?)
    }

    /// Lists recipients.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] without a URL, or the request error.
    pub async fn recipients(&self) -> Result<Vec<Recipient>> {
        self.ensure_configured()?;
        Ok(self.client.get_recipients().await?)
    }

    /// Lists signatures.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] without a URL, or the request error.
    pub async fn signatures(&self) -> Result<Vec<Signature>> {
        self.ensure_configured()?;
        Ok(self.client.get_signatures().await?)
    }

    /// Fetches settings, falling back to the local signature.
    ///
    /// Without a URL, or when the backend fails, only the local signature is
    /// returned. A backend response without a signature gets the local one.
    pub async fn settings(&self) -> SettingsResponse {
        let local_signature = &self.config.signature;
        let local_only = || SettingsResponse {
            signature: local_signature.clone(),
            ..SettingsResponse::default()
        };

        if !self.config.is_configured() {
            return local_only();
        }

        match self.client.get_settings().await {
            Ok(mut response) => {
                if response.signature.is_empty() {
                    response.signature.clone_from(local_signature);
                }
                response
            }
            Err(e) => {
                tracing::error!("Failed to fetch settings, using local settings: {e}");
                local_only()
            }
        }
    }

    /// Sends a message with the enabled attachments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] without a URL, or the request error.
    pub async fn send_mail(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachments: &[Attachment],
    ) -> Result<SendMailResponse> {
        self.ensure_configured()?;
        let enabled = attachments.iter().filter(|a| a.enabled).cloned().collect();
        let request = SendMailRequest::new(to, subject, body).with_attachments(enabled);
        Ok(self.client.send_mail(&request).await?)
    }

    /// Creates or updates a template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] without a URL, or the request error.
    pub async fn save_template(&self, id: &str, name: &str, subject: &str, body: &str) -> Result<()> {
        self.ensure_configured()?;
        let request = SaveTemplateRequest::new(id, name, subject, body);
        Ok(self.client.save_template(&request).await?)
    }

    /// Expands recipient placeholders in `text`.
    #[must_use]
    pub fn apply_template_variables(&self, text: &str, recipient: Option<&Recipient>) -> String {
        apply_template_variables(text, recipient)
    }

    /// Picks the recipient a file name refers to.
    #[must_use]
    pub fn match_recipient<'a>(
        &self,
        file_name: &str,
        recipients: &'a [Recipient],
    ) -> Option<&'a Recipient> {
        let found = match_recipient_by_file_name(file_name, recipients);
        match found {
            Some(r) => tracing::info!("Recipient match: {file_name} -> {} ({})", r.name, r.company),
            None => tracing::debug!("No recipient match for {file_name}"),
        }
        found
    }

    /// Picks the template a file name refers to.
    #[must_use]
    pub fn match_template<'a>(&self, file_name: &str, templates: &'a [Template]) -> Option<&'a Template> {
        let found = match_template_by_file_name(file_name, templates);
        match found {
            Some(t) => tracing::info!("Template match: {file_name} -> {}", t.name),
            None => tracing::debug!("No template match for {file_name}"),
        }
        found
    }

    /// Checks attachments and body against the recipient with the configured
    /// suffix list.
    #[must_use]
    pub fn validate_send_safety(
        &self,
        recipient: Option<&Recipient>,
        attachments: &[Attachment],
        body: &str,
    ) -> Vec<SafetyWarning> {
        let warnings = self.rules.validate(recipient, attachments, body);
        for warning in &warnings {
            tracing::info!("Send check: {warning}");
        }
        warnings
    }
}
