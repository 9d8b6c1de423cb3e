//! Request inputs and decoded results for the SES query API.
//!
//! # Design
//! Result types deserialize straight from the service's XML through
//! `quick_xml::de`. The `*Response` / `*Result` wrappers mirror the element
//! nesting of the wire format and stay private to the crate; callers only see
//! `SendQuota`, `SendDataPoint` and `EmailMessage`. Unknown elements such as
//! `ResponseMetadata` are ignored.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Sending limits of the account at the time of the call.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SendQuota {
    #[serde(rename = "SentLast24Hours")]
    pub sent_last_24_hours: f64,
    #[serde(rename = "Max24HourSend")]
    pub max_24_hour_send: f64,
    #[serde(rename = "MaxSendRate")]
    pub max_send_rate: f64,
}

/// Counters for one 15-minute sending interval.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendDataPoint {
    pub complaints: u64,
    pub delivery_attempts: u64,
    pub bounces: u64,
    pub rejects: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetSendQuotaResponse {
    pub get_send_quota_result: SendQuota,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetSendStatisticsResponse {
    pub get_send_statistics_result: GetSendStatisticsResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetSendStatisticsResult {
    #[serde(default)]
    pub send_data_points: SendDataPoints,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SendDataPoints {
    #[serde(rename = "member", default)]
    pub members: Vec<SendDataPoint>,
}

/// `SendEmailResponse` or `SendRawEmailResponse`; both carry a `MessageId`.
#[derive(Debug, Deserialize)]
pub(crate) struct SendResponse {
    #[serde(rename = "SendEmailResult", alias = "SendRawEmailResult")]
    pub result: SendResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SendResult {
    pub message_id: String,
}

/// A formatted email for `SendEmail`.
///
/// `EmailMessage::new` takes the single-recipient minimum; the `with_*`
/// methods add more destinations and an HTML part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub source: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Vec<String>,
    pub return_path: Option<String>,
    pub subject: String,
    pub text_body: String,
    pub html_body: Option<String>,
}

impl EmailMessage {
    pub fn new(
        source: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        text_body: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            to: vec![to.into()],
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: Vec::new(),
            return_path: None,
            subject: subject.into(),
            text_body: text_body.into(),
            html_body: None,
        }
    }

    #[must_use]
    pub fn with_to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    #[must_use]
    pub fn with_cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    #[must_use]
    pub fn with_bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    #[must_use]
    pub fn with_reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to.push(address.into());
        self
    }

    #[must_use]
    pub fn with_return_path(mut self, address: impl Into<String>) -> Self {
        self.return_path = Some(address.into());
        self
    }

    #[must_use]
    pub fn with_html_body(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    /// Total number of to, cc and bcc recipients.
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_has_single_recipient() {
        let msg = EmailMessage::new("a@x.com", "b@x.com", "Hi", "Hello");
        assert_eq!(msg.to, vec!["b@x.com"]);
        assert!(msg.cc.is_empty());
        assert!(msg.bcc.is_empty());
        assert!(msg.html_body.is_none());
        assert_eq!(msg.recipient_count(), 1);
    }

    #[test]
    fn builder_methods_accumulate() {
        let msg = EmailMessage::new("a@x.com", "b@x.com", "Hi", "Hello")
            .with_to("c@x.com")
            .with_cc("d@x.com")
            .with_bcc("e@x.com")
            .with_reply_to("f@x.com")
            .with_return_path("bounce@x.com")
            .with_html_body("<p>Hello</p>");
        assert_eq!(msg.to, vec!["b@x.com", "c@x.com"]);
        assert_eq!(msg.recipient_count(), 4);
        assert_eq!(msg.return_path.as_deref(), Some("bounce@x.com"));
        assert_eq!(msg.html_body.as_deref(), Some("<p>Hello</p>"));
    }

    #[test]
    fn quota_deserializes_from_xml() {
        let xml = "<GetSendQuotaResponse><GetSendQuotaResult>\
            <SentLast24Hours>127.0</SentLast24Hours>\
            <Max24HourSend>10000.0</Max24HourSend>\
            <MaxSendRate>5.5</MaxSendRate>\
            </GetSendQuotaResult></GetSendQuotaResponse>";
        let parsed: GetSendQuotaResponse = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(parsed.get_send_quota_result.sent_last_24_hours, 127.0);
        assert_eq!(parsed.get_send_quota_result.max_24_hour_send, 10000.0);
        assert_eq!(parsed.get_send_quota_result.max_send_rate, 5.5);
    }

    #[test]
    fn send_response_reads_raw_result_alias() {
        let xml = "<SendRawEmailResponse><SendRawEmailResult>\
            <MessageId>0000-raw</MessageId>\
            </SendRawEmailResult></SendRawEmailResponse>";
        let parsed: SendResponse = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(parsed.result.message_id, "0000-raw");
    }
}
