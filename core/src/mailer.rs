//! Blocking façade: one call per SES operation.

use chrono::Utc;

use crate::client::SesClient;
use crate::config::Config;
use crate::error::SesError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::{EmailMessage, SendDataPoint, SendQuota};

/// `SesClient` paired with a `Transport`.
///
/// Each method signs with the current time, performs exactly one round trip
/// and returns. Nothing is shared between calls except the immutable config,
/// so a `SesMailer` can be used from several threads when `T` allows it.
#[derive(Debug, Clone)]
pub struct SesMailer<T> {
    client: SesClient,
    transport: T,
}

#[cfg(feature = "ureq")]
impl SesMailer<crate::http::UreqTransport> {
    /// Mailer over a fresh `UreqTransport`.
    pub fn with_ureq(config: Config) -> Self {
        Self::new(config, crate::http::UreqTransport::new())
    }
}

impl<T: Transport> SesMailer<T> {
    pub fn new(config: Config, transport: T) -> Self {
        Self {
            client: SesClient::new(config),
            transport,
        }
    }

    pub fn client(&self) -> &SesClient {
        &self.client
    }

    /// Plain-text email to one recipient. Returns the raw response body.
    pub fn send_email(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, SesError> {
        let request = self.client.build_send_email(from, to, subject, body, Utc::now());
        let response = self.dispatch("SendEmail", request)?;
        self.client.parse_send(response)
    }

    /// Text and HTML email to one recipient. Returns the raw response body.
    pub fn send_email_html(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body_text: &str,
        body_html: &str,
    ) -> Result<String, SesError> {
        let request = self.client.build_send_email_html(
            from,
            to,
            subject,
            body_text,
            body_html,
            Utc::now(),
        );
        let response = self.dispatch("SendEmail", request)?;
        self.client.parse_send(response)
    }

    /// `SendEmail` with any number of to/cc/bcc recipients.
    pub fn send_message(&self, message: &EmailMessage) -> Result<String, SesError> {
        let request = self.client.build_send_message(message, Utc::now())?;
        let response = self.dispatch("SendEmail", request)?;
        self.client.parse_send(response)
    }

    /// Send a complete MIME message as-is.
    pub fn send_raw_email(&self, raw: &[u8]) -> Result<String, SesError> {
        let request = self.client.build_send_raw_email(raw, Utc::now());
        let response = self.dispatch("SendRawEmail", request)?;
        self.client.parse_send(response)
    }

    pub fn get_send_quota(&self) -> Result<SendQuota, SesError> {
        let request = self.client.build_get_send_quota(Utc::now());
        let response = self.dispatch("GetSendQuota", request)?;
        self.client.parse_get_send_quota(response)
    }

    pub fn get_send_statistics(&self) -> Result<Vec<SendDataPoint>, SesError> {
        let request = self.client.build_get_send_statistics(Utc::now());
        let response = self.dispatch("GetSendStatistics", request)?;
        self.client.parse_get_send_statistics(response)
    }

    fn dispatch(&self, action: &str, request: HttpRequest) -> Result<HttpResponse, SesError> {
        tracing::debug!(action, method = request.method.as_str(), url = %request.url, "sending SES request");
        let response = self.transport.execute(request).map_err(SesError::Transport)?;
        tracing::debug!(action, status = response.status, "received SES response");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::BoxError;
    use crate::http::HttpMethod;

    /// Records every request and answers with a canned response.
    struct FakeTransport {
        status: u16,
        body: String,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl FakeTransport {
        fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last(&self) -> HttpRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for FakeTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.clone(),
            })
        }
    }

    struct Unreachable;

    impl Transport for Unreachable {
        fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, BoxError> {
            Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))
        }
    }

    fn config() -> Config {
        Config::new("AKIDEXAMPLE", "secret", "http://localhost:3000").unwrap()
    }

    #[test]
    fn send_email_posts_and_returns_body() {
        let transport = FakeTransport::new(200, "<SendEmailResponse/>");
        let mailer = SesMailer::new(config(), &transport);
        let token = mailer.send_email("a@x.com", "b@x.com", "Hi", "Hello").unwrap();
        assert_eq!(token, "<SendEmailResponse/>");

        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Post);
        assert!(req.body.as_deref().unwrap().contains("Action=SendEmail"));
        assert!(req.header("Date").is_some());
    }

    #[test]
    fn send_raw_email_posts_raw_action() {
        let transport = FakeTransport::new(200, "ok");
        let mailer = SesMailer::new(config(), &transport);
        mailer.send_raw_email(b"Subject: x\r\n\r\nbody").unwrap();
        let body = transport.last().body.unwrap();
        assert!(body.contains("Action=SendRawEmail"));
        assert!(body.contains("RawMessage.Data=U3ViamVjdDogeA0KDQpib2R5"));
    }

    #[test]
    fn get_send_quota_issues_get() {
        let transport = FakeTransport::new(
            200,
            "<GetSendQuotaResponse><GetSendQuotaResult>\
             <SentLast24Hours>3.0</SentLast24Hours><Max24HourSend>200.0</Max24HourSend>\
             <MaxSendRate>1.0</MaxSendRate></GetSendQuotaResult></GetSendQuotaResponse>",
        );
        let mailer = SesMailer::new(config(), &transport);
        let quota = mailer.get_send_quota().unwrap();
        assert_eq!(quota.sent_last_24_hours, 3.0);
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.url.contains("Action=GetSendQuota"));
    }

    #[test]
    fn get_send_statistics_non_xml_is_decode_error() {
        let transport = FakeTransport::new(200, "AccessDenied");
        let mailer = SesMailer::new(config(), &transport);
        let err = mailer.get_send_statistics().unwrap_err();
        assert!(matches!(err, SesError::Decode(_)));
    }

    #[test]
    fn forbidden_is_remote_error() {
        let transport = FakeTransport::new(403, "AccessDenied");
        let mailer = SesMailer::new(config(), &transport);
        let err = mailer.get_send_quota().unwrap_err();
        assert!(matches!(err, SesError::Remote { status: 403, ref body } if body == "AccessDenied"));
    }

    #[test]
    fn transport_failure_is_transport_error() {
        let mailer = SesMailer::new(config(), Unreachable);
        let err = mailer.send_email("a@x.com", "b@x.com", "Hi", "Hello").unwrap_err();
        assert!(matches!(err, SesError::Transport(_)));
    }

    #[test]
    fn send_message_validation_skips_transport() {
        let transport = FakeTransport::new(200, "ok");
        let mailer = SesMailer::new(config(), &transport);
        let mut message = EmailMessage::new("a@x.com", "b@x.com", "Hi", "Hello");
        message.to.clear();
        assert!(matches!(
            mailer.send_message(&message),
            Err(SesError::Validation(_))
        ));
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn boxed_transport_is_accepted() {
        let transport: Box<dyn Transport> = Box::new(Unreachable);
        let mailer = SesMailer::new(config(), transport);
        assert!(mailer.get_send_statistics().is_err());
    }
}
