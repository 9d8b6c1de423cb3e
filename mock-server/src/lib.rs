use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use quick_xml::escape::escape;
use sha2::Sha256;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const ACCESS_KEY_ID: &str = "AKIDEXAMPLE";
pub const SECRET_ACCESS_KEY: &str = "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY";

const XMLNS: &str = "http://ses.amazonaws.com/doc/2010-12-01/";

#[derive(Clone, Debug)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            access_key_id: ACCESS_KEY_ID.to_string(),
            secret_access_key: SECRET_ACCESS_KEY.to_string(),
        }
    }
}

/// A message accepted by `SendEmail` or `SendRawEmail`.
#[derive(Clone, Debug)]
pub struct SentMessage {
    pub message_id: String,
    pub action: String,
    pub source: Option<String>,
    pub destinations: Vec<String>,
    pub raw: Option<Vec<u8>>,
    pub sent_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct AppState {
    credentials: Arc<Credentials>,
    max_24_hour_send: f64,
    max_send_rate: f64,
    sent: Arc<RwLock<Vec<SentMessage>>>,
}

impl AppState {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Arc::new(credentials),
            max_24_hour_send: 200.0,
            max_send_rate: 1.0,
            sent: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.read().await.clone()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Credentials::default())
    }
}

pub fn app() -> Router {
    app_with_state(AppState::default())
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/", get(query_action).post(form_action))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

/// Base64 HMAC-SHA256 of `date` keyed by `secret`.
pub fn signature(date: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(date.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

async fn query_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    handle(state, headers, params).await
}

async fn form_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    handle(state, headers, params).await
}

async fn handle(state: AppState, headers: HeaderMap, params: HashMap<String, String>) -> Response {
    if let Err(rejection) = verify(&state.credentials, &headers) {
        tracing::info!(code = rejection.code, "rejected request");
        return rejection.into_response();
    }

    let action = params.get("Action").map(String::as_str).unwrap_or_default();
    tracing::info!(action, "handling request");
    let result = match action {
        "SendEmail" => send_email(&state, &params).await,
        "SendRawEmail" => send_raw_email(&state, &params).await,
        "GetSendQuota" => Ok(get_send_quota(&state).await),
        "GetSendStatistics" => Ok(get_send_statistics(&state).await),
        "" => Err(ServiceError::bad_request("MissingAction", "Action is required")),
        _ => Err(ServiceError::bad_request(
            "InvalidAction",
            "The action or operation requested is invalid",
        )),
    };
    match result {
        Ok(xml) => xml_response(StatusCode::OK, xml),
        Err(err) => err.into_response(),
    }
}

/// Check the `Date` / `X-Amzn-Authorization` pair the way the service does.
fn verify(credentials: &Credentials, headers: &HeaderMap) -> Result<(), ServiceError> {
    let date = headers
        .get(header::DATE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServiceError::forbidden("MissingAuthenticationToken", "Date header is required"))?;
    let authorization = headers
        .get("x-amzn-authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ServiceError::forbidden("MissingAuthenticationToken", "Request is missing Authentication Token")
        })?;

    let fields = authorization
        .strip_prefix("AWS3-HTTPS ")
        .ok_or_else(|| ServiceError::forbidden("IncompleteSignature", "Unsupported authorization scheme"))?;
    let fields: HashMap<&str, &str> = fields
        .split(", ")
        .filter_map(|field| field.split_once('='))
        .collect();

    if fields.get("AWSAccessKeyId") != Some(&credentials.access_key_id.as_str()) {
        return Err(ServiceError::forbidden(
            "InvalidClientTokenId",
            "The security token included in the request is invalid",
        ));
    }
    if fields.get("Algorithm") != Some(&"HmacSHA256") {
        return Err(ServiceError::forbidden("IncompleteSignature", "Unsupported algorithm"));
    }

    let provided = fields
        .get("Signature")
        .and_then(|sig| STANDARD.decode(sig).ok())
        .unwrap_or_default();
    let mut mac = HmacSha256::new_from_slice(credentials.secret_access_key.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(date.as_bytes());
    mac.verify_slice(&provided).map_err(|_| {
        ServiceError::forbidden(
            "SignatureDoesNotMatch",
            "The request signature we calculated does not match the signature you provided",
        )
    })
}

async fn send_email(state: &AppState, params: &HashMap<String, String>) -> Result<String, ServiceError> {
    let source = required(params, "Source")?;
    let mut destinations: Vec<String> = params
        .iter()
        .filter(|(k, _)| k.starts_with("Destination.") && k.contains(".member."))
        .map(|(_, v)| v.clone())
        .collect();
    destinations.sort();
    if destinations.is_empty() {
        return Err(ServiceError::bad_request(
            "InvalidParameterValue",
            "Missing final '@domain'",
        ));
    }
    required(params, "Message.Subject.Data")?;
    if !params.contains_key("Message.Body.Text.Data") && !params.contains_key("Message.Body.Html.Data") {
        return Err(ServiceError::bad_request(
            "MissingParameter",
            "Message.Body must contain Text or Html",
        ));
    }

    let message_id = record(state, "SendEmail", Some(source.to_string()), destinations, None).await;
    Ok(send_response("SendEmail", &message_id))
}

async fn send_raw_email(state: &AppState, params: &HashMap<String, String>) -> Result<String, ServiceError> {
    let data = required(params, "RawMessage.Data")?;
    let raw = STANDARD.decode(data).map_err(|_| {
        ServiceError::bad_request("InvalidParameterValue", "RawMessage.Data is not valid base64")
    })?;
    let message_id = record(state, "SendRawEmail", None, Vec::new(), Some(raw)).await;
    Ok(send_response("SendRawEmail", &message_id))
}

async fn get_send_quota(state: &AppState) -> String {
    let since = Utc::now() - Duration::hours(24);
    let sent_last_24_hours = state
        .sent
        .read()
        .await
        .iter()
        .filter(|m| m.sent_at >= since)
        .count();
    format!(
        "<GetSendQuotaResponse xmlns=\"{XMLNS}\"><GetSendQuotaResult>\
         <SentLast24Hours>{:.1}</SentLast24Hours>\
         <Max24HourSend>{:.1}</Max24HourSend>\
         <MaxSendRate>{:.1}</MaxSendRate>\
         </GetSendQuotaResult>{}</GetSendQuotaResponse>",
        sent_last_24_hours as f64,
        state.max_24_hour_send,
        state.max_send_rate,
        response_metadata(),
    )
}

async fn get_send_statistics(state: &AppState) -> String {
    let members: String = state
        .sent
        .read()
        .await
        .iter()
        .map(|m| {
            format!(
                "<member><DeliveryAttempts>{}</DeliveryAttempts>\
                 <Timestamp>{}</Timestamp>\
                 <Rejects>0</Rejects><Bounces>0</Bounces><Complaints>0</Complaints></member>",
                m.destinations.len().max(1),
                m.sent_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            )
        })
        .collect();
    format!(
        "<GetSendStatisticsResponse xmlns=\"{XMLNS}\"><GetSendStatisticsResult>\
         <SendDataPoints>{members}</SendDataPoints>\
         </GetSendStatisticsResult>{}</GetSendStatisticsResponse>",
        response_metadata(),
    )
}

async fn record(
    state: &AppState,
    action: &str,
    source: Option<String>,
    destinations: Vec<String>,
    raw: Option<Vec<u8>>,
) -> String {
    let message_id = Uuid::new_v4().to_string();
    state.sent.write().await.push(SentMessage {
        message_id: message_id.clone(),
        action: action.to_string(),
        source,
        destinations,
        raw,
        sent_at: Utc::now(),
    });
    message_id
}

fn required<'a>(params: &'a HashMap<String, String>, name: &str) -> Result<&'a str, ServiceError> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| ServiceError::bad_request("MissingParameter", &format!("{name} is required")))
}

fn send_response(action: &str, message_id: &str) -> String {
    format!(
        "<{action}Response xmlns=\"{XMLNS}\"><{action}Result>\
         <MessageId>{message_id}</MessageId>\
         </{action}Result>{}</{action}Response>",
        response_metadata(),
    )
}

fn response_metadata() -> String {
    format!(
        "<ResponseMetadata><RequestId>{}</RequestId></ResponseMetadata>",
        Uuid::new_v4()
    )
}

fn xml_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/xml")], body).into_response()
}

/// An error in the service's `ErrorResponse` XML shape.
#[derive(Debug)]
struct ServiceError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ServiceError {
    fn forbidden(code: &'static str, message: &str) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code,
            message: message.to_string(),
        }
    }

    fn bad_request(code: &'static str, message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = format!(
            "<ErrorResponse xmlns=\"{XMLNS}\"><Error><Type>Sender</Type>\
             <Code>{}</Code><Message>{}</Message></Error>\
             <RequestId>{}</RequestId></ErrorResponse>",
            self.code,
            escape(&self.message),
            Uuid::new_v4()
        );
        xml_response(self.status, body)
    }
}
