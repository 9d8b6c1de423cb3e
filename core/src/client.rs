//! Stateless request builder and response parser for the SES query API.
//!
//! # Design
//! `SesClient` holds only a `Config` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces a
//! signed `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The signing time is an argument to every `build_*`, so
//! requests are reproducible; `SesMailer` supplies the current time.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::error::SesError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::sign;
use crate::types::{
    EmailMessage, GetSendQuotaResponse, GetSendStatisticsResponse, SendDataPoint, SendQuota,
    SendResponse,
};

/// Parameters of one call, keyed by their wire names.
///
/// A `BTreeMap` keeps the encoded form sorted by key.
pub type ParameterSet = BTreeMap<String, String>;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Synchronous, stateless client for the SES query API.
#[derive(Debug, Clone)]
pub struct SesClient {
    config: Config,
}

impl SesClient {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `SendEmail` with a plain-text body to a single recipient.
    pub fn build_send_email(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> HttpRequest {
        let params = self.message_params(&EmailMessage::new(from, to, subject, body));
        self.post(params, now)
    }

    /// `SendEmail` with both a text and an HTML body to a single recipient.
    pub fn build_send_email_html(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body_text: &str,
        body_html: &str,
        now: DateTime<Utc>,
    ) -> HttpRequest {
        let message = EmailMessage::new(from, to, subject, body_text).with_html_body(body_html);
        self.post(self.message_params(&message), now)
    }

    /// `SendEmail` for an arbitrary `EmailMessage`.
    ///
    /// Fails with `Validation` when the message has no recipients.
    pub fn build_send_message(
        &self,
        message: &EmailMessage,
        now: DateTime<Utc>,
    ) -> Result<HttpRequest, SesError> {
        if message.recipient_count() == 0 {
            return Err(SesError::Validation(
                "message needs at least one to, cc or bcc recipient".to_string(),
            ));
        }
        Ok(self.post(self.message_params(message), now))
    }

    /// `SendRawEmail`; `raw` is the complete MIME message.
    pub fn build_send_raw_email(&self, raw: &[u8], now: DateTime<Utc>) -> HttpRequest {
        let mut params = self.action("SendRawEmail");
        params.insert("RawMessage.Data".to_string(), STANDARD.encode(raw));
        self.post(params, now)
    }

    pub fn build_get_send_quota(&self, now: DateTime<Utc>) -> HttpRequest {
        self.get(self.action("GetSendQuota"), now)
    }

    pub fn build_get_send_statistics(&self, now: DateTime<Utc>) -> HttpRequest {
        self.get(self.action("GetSendStatistics"), now)
    }

    /// Response of any send operation: the raw body is the success token.
    pub fn parse_send(&self, response: HttpResponse) -> Result<String, SesError> {
        check_status(response)
    }

    pub fn parse_get_send_quota(&self, response: HttpResponse) -> Result<SendQuota, SesError> {
        let body = check_status(response)?;
        let decoded: GetSendQuotaResponse = quick_xml::de::from_str(&body)?;
        Ok(decoded.get_send_quota_result)
    }

    pub fn parse_get_send_statistics(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<SendDataPoint>, SesError> {
        let body = check_status(response)?;
        let decoded: GetSendStatisticsResponse = quick_xml::de::from_str(&body)?;
        Ok(decoded.get_send_statistics_result.send_data_points.members)
    }

    fn action(&self, action: &str) -> ParameterSet {
        let mut params = ParameterSet::new();
        params.insert("Action".to_string(), action.to_string());
        params.insert(
            "AWSAccessKeyId".to_string(),
            self.config.access_key_id().to_string(),
        );
        params
    }

    fn message_params(&self, message: &EmailMessage) -> ParameterSet {
        let mut params = self.action("SendEmail");
        params.insert("Source".to_string(), message.source.clone());
        add_members(&mut params, "Destination.ToAddresses", &message.to);
        add_members(&mut params, "Destination.CcAddresses", &message.cc);
        add_members(&mut params, "Destination.BccAddresses", &message.bcc);
        add_members(&mut params, "ReplyToAddresses", &message.reply_to);
        if let Some(return_path) = &message.return_path {
            params.insert("ReturnPath".to_string(), return_path.clone());
        }
        params.insert("Message.Subject.Data".to_string(), message.subject.clone());
        params.insert("Message.Body.Text.Data".to_string(), message.text_body.clone());
        if let Some(html) = &message.html_body {
            params.insert("Message.Body.Html.Data".to_string(), html.clone());
        }
        params
    }

    fn post(&self, params: ParameterSet, now: DateTime<Utc>) -> HttpRequest {
        let mut headers = self.signed_headers(now);
        headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
        HttpRequest {
            method: HttpMethod::Post,
            url: self.config.endpoint().to_string(),
            headers,
            body: Some(encode_params(&params)),
        }
    }

    fn get(&self, params: ParameterSet, now: DateTime<Utc>) -> HttpRequest {
        let mut url = self.config.endpoint().clone();
        url.query_pairs_mut().extend_pairs(&params);
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: self.signed_headers(now),
            body: None,
        }
    }

    fn signed_headers(&self, now: DateTime<Utc>) -> Vec<(String, String)> {
        let date = sign::date_header(now);
        let authorization = sign::authorization_header(
            &date,
            self.config.access_key_id(),
            self.config.secret_access_key(),
        );
        vec![
            (sign::DATE_HEADER.to_string(), date),
            (sign::AUTHORIZATION_HEADER.to_string(), authorization),
            ("Connection".to_string(), "close".to_string()),
        ]
    }
}

/// Extract the `MessageId` from a `SendEmail` or `SendRawEmail` response body.
pub fn message_id(body: &str) -> Result<String, SesError> {
    let decoded: SendResponse = quick_xml::de::from_str(body)?;
    Ok(decoded.result.message_id)
}

/// `application/x-www-form-urlencoded` serialization of `params`.
pub fn encode_params(params: &ParameterSet) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

/// Add `prefix.member.1`, `prefix.member.2`, ... for each address.
fn add_members(params: &mut ParameterSet, prefix: &str, addresses: &[String]) {
    for (i, address) in addresses.iter().enumerate() {
        params.insert(format!("{prefix}.member.{}", i + 1), address.clone());
    }
}

/// Anything but 200 is a remote error carrying status and body.
fn check_status(response: HttpResponse) -> Result<String, SesError> {
    if response.status == 200 {
        return Ok(response.body);
    }
    Err(SesError::Remote {
        status: response.status,
        body: response.body,
    })
}
