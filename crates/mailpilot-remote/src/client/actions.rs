//! One typed call per backend action.

use super::RequestClient;
use crate::error::{Error, Result};
use crate::model::{
    Action, ConnectionTestResponse, Recipient, RecipientsResponse, SaveTemplateRequest,
    SendMailRequest, SendMailResponse, SettingsResponse, Signature, SignaturesResponse, Template,
    TemplatesResponse,
};
use serde::de::DeserializeOwned;

/// A response shape carrying the backend's `error` field.
trait Envelope: DeserializeOwned {
    fn error(&self) -> &str;
}

macro_rules! envelope {
    ($($ty:ty),* $(,)?) => {
        $(impl Envelope for $ty {
            fn error(&self) -> &str {
                &self.error
            }
        })*
    };
}

envelope!(
    ConnectionTestResponse,
    TemplatesResponse,
    RecipientsResponse,
    SignaturesResponse,
    SettingsResponse,
    SendMailResponse,
);

/// Decodes an envelope; a non-empty `error` fails the call whatever the
/// success flag says.
fn decode<T: Envelope>(body: &[u8]) -> Result<T> {
    let response: T = serde_json::from_slice(body)?;
    if !response.error().is_empty() {
        return Err(Error::Backend(response.error().to_owned()));
    }
    Ok(response)
}

impl RequestClient {
    async fn fetch<T: Envelope>(&self, action: Action) -> Result<T> {
        let body = self.get(&[("action", action.as_str())]).await?;
        decode(&body).inspect_err(|err| self.log.error(format!("{action} failed: {err}")))
    }

    /// Probes the backend.
    ///
    /// A 200 response whose body is not JSON still counts as reachable: the
    /// backend sometimes answers with an HTML confirmation page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports an error.
    pub async fn test_connection(&self) -> Result<ConnectionTestResponse> {
        self.log.info(format!("connection test: {}", self.base_url));
        let body = self.get(&[("action", Action::Test.as_str())]).await?;

        match decode::<ConnectionTestResponse>(&body) {
            Ok(response) => {
                self.log
                    .info(format!("connection test result: success={}", response.success));
                Ok(response)
            }
            Err(Error::Json(_)) => {
                self.log.info("connection test succeeded (non-JSON response)");
                Ok(ConnectionTestResponse::ok("connected"))
            }
            Err(err) => {
                self.log.error(format!("connection test failed: {err}"));
                Err(err)
            }
        }
    }

    /// Lists mail templates.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the body is not valid JSON, or
    /// the backend reports an error.
    pub async fn get_templates(&self) -> Result<Vec<Template>> {
        self.log.info("fetching templates");
        let response: TemplatesResponse = self.fetch(Action::GetTemplates).await?;
        self.log
            .info(format!("fetched {} templates", response.templates.len()));
        Ok(response.templates)
    }

    /// Lists recipients.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the body is not valid JSON, or
    /// the backend reports an error.
    pub async fn get_recipients(&self) -> Result<Vec<Recipient>> {
        self.log.info("fetching recipients");
        let response: RecipientsResponse = self.fetch(Action::GetRecipients).await?;
        self.log
            .info(format!("fetched {} recipients", response.recipients.len()));
        Ok(response.recipients)
    }

    /// Lists signatures.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the body is not valid JSON, or
    /// the backend reports an error.
    pub async fn get_signatures(&self) -> Result<Vec<Signature>> {
        self.log.info("fetching signatures");
        let response: SignaturesResponse = self.fetch(Action::GetSignatures).await?;
        self.log
            .info(format!("fetched {} signatures", response.signatures.len()));
        Ok(response.signatures)
    }

    /// Fetches backend settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the body is not valid JSON, or
    /// the backend reports an error.
    pub async fn get_settings(&self) -> Result<SettingsResponse> {
        self.log.info("fetching settings");
        let response: SettingsResponse = self.fetch(Action::GetSettings).await?;
        self.log.info("fetched settings");
        Ok(response)
    }

    /// Sends a message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] with the backend's message if sending was
    /// refused, or a transport/decoding error.
    pub async fn send_mail(&self, request: &SendMailRequest) -> Result<SendMailResponse> {
        self.log.info(format!(
            "sending mail: to={}, subject={}, attachments={}",
            request.to,
            request.subject,
            request.attachments.len()
        ));
        let body = self.post(request).await?;
        let response: SendMailResponse =
            decode(&body).inspect_err(|err| self.log.error(format!("send failed: {err}")))?;
        self.log.info("mail sent");
        Ok(response)
    }

    /// Creates or updates a template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] with the backend's message if saving was
    /// refused, or a transport/decoding error.
    pub async fn save_template(&self, request: &SaveTemplateRequest) -> Result<()> {
        self.log.info(format!(
            "saving template: id={}, name={}",
            request.id, request.name
        ));
        let body = self.post(request).await?;
        let _: SendMailResponse = decode(&body)
            .inspect_err(|err| self.log.error(format!("template save failed: {err}")))?;
        self.log.info("template saved");
        Ok(())
    }
}
