//! HTTP SMS gateway channel against a local mock gateway.

#![cfg(feature = "http")]

use dispatch_throttle::{
    ConfigError, DispatchChannel, HttpChannelError, HttpSmsChannel, HttpSmsConfig, RecipientKey,
    SmsMessage, SmsReceipt,
};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MESSAGES_PATH: &str = "/2010-04-01/Accounts/AC1/Messages.json";

fn channel(server_uri: &str) -> HttpSmsChannel {
    let config = HttpSmsConfig::new("AC1", "secret", "+15550000")
        .with_base_url(format!("{}/2010-04-01", server_uri));
    HttpSmsChannel::new(config).unwrap()
}

fn key() -> RecipientKey {
    RecipientKey::new("+15550100").unwrap()
}

#[tokio::test]
async fn test_send_posts_form_with_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        // base64("AC1:secret")
        .and(header("authorization", "Basic QUMxOnNlY3JldA=="))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("To=%2B15550100"))
        .and(body_string_contains("From=%2B15550000"))
        .and(body_string_contains("Body=hello+there"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({
                "sid": "SM1",
                "status": "queued",
                "to": "+15550100",
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let receipt = channel(&server.uri())
        .send(&key(), &SmsMessage::text("hello there"))
        .await
        .unwrap();

    assert_eq!(
        receipt,
        SmsReceipt {
            sid: "SM1".to_string(),
            status: "queued".to_string(),
        }
    );
}

#[tokio::test]
async fn test_non_success_status_maps_to_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid To number"))
        .mount(&server)
        .await;

    let err = channel(&server.uri())
        .send(&key(), &SmsMessage::text("hi"))
        .await
        .unwrap_err();

    match err {
        HttpChannelError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "invalid To number");
        }
        other => panic!("expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_receipt_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = channel(&server.uri())
        .send(&key(), &SmsMessage::text("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, HttpChannelError::Transport(_)));
}

#[tokio::test]
async fn test_truncated_rejection_body_uses_placeholder() {
    // A gateway that promises more body than it sends, then hangs up
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let gateway = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let _ = socket.read(&mut buf).await.unwrap();
        socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\npartial")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let err = channel(&format!("http://{}", addr))
        .send(&key(), &SmsMessage::text("hi"))
        .await
        .unwrap_err();
    gateway.await.unwrap();

    match err {
        HttpChannelError::Rejected { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, dispatch_throttle::infrastructure::http::UNREADABLE_BODY);
        }
        other => panic!("expected Rejected, got {:?}", other),
    }
}

// All environment cases live in one test so no other test observes the
// variables mid-change.
#[test]
fn test_from_env() {
    const VARS: [&str; 3] = ["SMS_ACCOUNT_SID", "SMS_AUTH_TOKEN", "SMS_FROM_NUMBER"];

    let set_all = || {
        std::env::set_var("SMS_ACCOUNT_SID", "AC1");
        std::env::set_var("SMS_AUTH_TOKEN", "secret");
        std::env::set_var("SMS_FROM_NUMBER", "+15550000");
    };

    for missing in VARS {
        set_all();
        std::env::remove_var(missing);
        assert_eq!(
            HttpSmsConfig::from_env().unwrap_err(),
            ConfigError::MissingEnv(missing)
        );

        // Blank counts as unset
        std::env::set_var(missing, "  ");
        assert_eq!(
            HttpSmsConfig::from_env().unwrap_err(),
            ConfigError::MissingEnv(missing)
        );
    }

    set_all();
    std::env::set_var("SMS_API_BASE_URL", "http://localhost:9000/2010-04-01/");
    let config = HttpSmsConfig::from_env().unwrap();
    assert_eq!(config.account_sid, "AC1");
    assert_eq!(config.auth_token, "secret");
    assert_eq!(config.from_number, "+15550000");
    assert_eq!(config.base_url, "http://localhost:9000/2010-04-01");

    std::env::remove_var("SMS_API_BASE_URL");
    assert_eq!(
        HttpSmsConfig::from_env().unwrap().base_url,
        dispatch_throttle::infrastructure::http::DEFAULT_API_BASE_URL
    );

    for var in VARS {
        std::env::remove_var(var);
    }
}
