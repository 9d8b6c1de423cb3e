use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_state, signature, AppState, ACCESS_KEY_ID, SECRET_ACCESS_KEY};
use tower::ServiceExt;

const DATE: &str = "Tue, 25 May 2010 21:20:27 +0000";

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_text(response: axum::response::Response) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).unwrap()
}

fn authorization(secret: &str) -> String {
    format!(
        "AWS3-HTTPS AWSAccessKeyId={ACCESS_KEY_ID}, Algorithm=HmacSHA256, Signature={}",
        signature(DATE, secret)
    )
}

fn signed_get(query: &str) -> Request<String> {
    Request::builder()
        .uri(format!("/?{query}"))
        .header(http::header::DATE, DATE)
        .header("X-Amzn-Authorization", authorization(SECRET_ACCESS_KEY))
        .body(String::new())
        .unwrap()
}

fn signed_post(body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(http::header::DATE, DATE)
        .header("X-Amzn-Authorization", authorization(SECRET_ACCESS_KEY))
        .body(body.to_string())
        .unwrap()
}

// --- signing ---

#[tokio::test]
async fn unsigned_request_is_forbidden() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/?Action=GetSendQuota")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(body_text(resp).await.contains("MissingAuthenticationToken"));
}

#[tokio::test]
async fn wrong_secret_is_forbidden() {
    let req = Request::builder()
        .uri("/?Action=GetSendQuota")
        .header(http::header::DATE, DATE)
        .header("X-Amzn-Authorization", authorization("not-the-secret"))
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(body_text(resp).await.contains("SignatureDoesNotMatch"));
}

// --- actions ---

#[tokio::test]
async fn unknown_action_is_bad_request() {
    let resp = app().oneshot(signed_get("Action=DeleteEverything")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("InvalidAction"));
}

#[tokio::test]
async fn quota_starts_at_zero() {
    let resp = app().oneshot(signed_get("Action=GetSendQuota")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("<SentLast24Hours>0.0</SentLast24Hours>"), "{body}");
    assert!(body.contains("<Max24HourSend>200.0</Max24HourSend>"), "{body}");
}

#[tokio::test]
async fn statistics_start_empty() {
    let resp = app().oneshot(signed_get("Action=GetSendStatistics")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("<SendDataPoints></SendDataPoints>"), "{body}");
}

#[tokio::test]
async fn send_email_records_message() {
    let state = AppState::default();
    let resp = app_with_state(state.clone())
        .oneshot(signed_post(
            "Action=SendEmail&Source=a%40x.com&Destination.ToAddresses.member.1=b%40x.com\
             &Message.Subject.Data=Hi&Message.Body.Text.Data=Hello",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("<SendEmailResult><MessageId>"), "{body}");

    let sent = state.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].action, "SendEmail");
    assert_eq!(sent[0].source.as_deref(), Some("a@x.com"));
    assert_eq!(sent[0].destinations, vec!["b@x.com"]);
}

#[tokio::test]
async fn send_email_without_destination_is_rejected() {
    let resp = app()
        .oneshot(signed_post(
            "Action=SendEmail&Source=a%40x.com&Message.Subject.Data=Hi&Message.Body.Text.Data=Hello",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("InvalidParameterValue"));
}

#[tokio::test]
async fn send_email_without_subject_is_rejected() {
    let resp = app()
        .oneshot(signed_post(
            "Action=SendEmail&Source=a%40x.com&Destination.ToAddresses.member.1=b%40x.com",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("MissingParameter"));
}

#[tokio::test]
async fn send_raw_email_decodes_payload() {
    let state = AppState::default();
    let resp = app_with_state(state.clone())
        .oneshot(signed_post(
            "Action=SendRawEmail&RawMessage.Data=U3ViamVjdDogeA0KDQpib2R5",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("<SendRawEmailResult>"));

    let sent = state.sent().await;
    assert_eq!(sent[0].raw.as_deref(), Some(&b"Subject: x\r\n\r\nbody"[..]));
}

#[tokio::test]
async fn send_raw_email_rejects_bad_base64() {
    let resp = app()
        .oneshot(signed_post("Action=SendRawEmail&RawMessage.Data=%21%21%21"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sends_show_up_in_quota_and_statistics() {
    let state = AppState::default();
    for _ in 0..2 {
        let resp = app_with_state(state.clone())
            .oneshot(signed_post(
                "Action=SendEmail&Source=a%40x.com&Destination.ToAddresses.member.1=b%40x.com\
                 &Destination.CcAddresses.member.1=c%40x.com\
                 &Message.Subject.Data=Hi&Message.Body.Text.Data=Hello",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let quota = body_text(
        app_with_state(state.clone())
            .oneshot(signed_get("Action=GetSendQuota"))
            .await
            .unwrap(),
    )
    .await;
    assert!(quota.contains("<SentLast24Hours>2.0</SentLast24Hours>"), "{quota}");

    let stats = body_text(
        app_with_state(state)
            .oneshot(signed_get("Action=GetSendStatistics"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(stats.matches("<member>").count(), 2, "{stats}");
    assert!(stats.contains("<DeliveryAttempts>2</DeliveryAttempts>"), "{stats}");
}
