//! End-to-end tests against a mock gateway.

use std::path::{Path, PathBuf};

use chain_rest_client::{
    HandshakeError, OrderContext, RestClient, RestClientError, RestClientProperties, Signer,
};
use chain_rest_types::{BaseResp, ShakeRequest};
use rsa::pkcs1v15::Signature;
use rsa::signature::Verifier;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHAKE_HAND: &str = "/api/contract/shakeHand";
const CHAIN_CALL: &str = "/api/contract/chainCall";
const CHAIN_CALL_FOR_BIZ: &str = "/api/contract/chainCallForBiz";

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn envelope(success: bool, code: &str, data: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(BaseResp::new(success, code, data))
}

async fn mount_handshake(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(SHAKE_HAND))
        .respond_with(envelope(true, "200", token))
        .mount(server)
        .await;
}

async fn connect(server: &MockServer) -> RestClient {
    let mut props = RestClientProperties::new(server.uri(), "access", fixture("access.key"));
    props.back_off_period = 10;
    RestClient::new(props).await.unwrap()
}

#[tokio::test]
async fn test_handshake_signs_challenge() {
    let server = MockServer::start().await;
    mount_handshake(&server, "tok").await;

    let client = connect(&server).await;
    assert_eq!(client.token().await, "tok");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let shake: ShakeRequest = requests[0].body_json().unwrap();
    assert_eq!(shake.access_id, "access");

    let challenge = format!("{}{}", shake.access_id, shake.time);
    let signature = hex::decode(&shake.secret).unwrap();
    let signature = Signature::try_from(signature.as_slice()).unwrap();
    let signer = Signer::from_pem_file(fixture("access.key")).unwrap();
    signer
        .verifying_key()
        .verify(challenge.as_bytes(), &signature)
        .unwrap();
}

#[tokio::test]
async fn test_deposit_returns_hash() {
    let server = MockServer::start().await;
    mount_handshake(&server, "tok").await;

    Mock::given(method("POST"))
        .and(path(CHAIN_CALL_FOR_BIZ))
        .and(body_partial_json(json!({
            "method": "DEPOSIT",
            "token": "tok",
            "accessId": "access",
            "bizid": "b1",
            "orderId": "o1",
            "content": "hello"
        })))
        .respond_with(envelope(true, "200", "0xfeed"))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let order = OrderContext::new("b1", "o1", "alice").with_kms_key("kms-1");
    let resp = client.deposit(&order, "hello", 0).await.unwrap();

    assert!(resp.is_ok());
    assert_eq!(resp.data, "0xfeed");
}

#[tokio::test]
async fn test_multiple_query_transaction_waits_for_execution() {
    let server = MockServer::start().await;
    mount_handshake(&server, "tok").await;

    Mock::given(method("POST"))
        .and(path(CHAIN_CALL))
        .and(body_partial_json(json!({ "method": "QUERYTRANSACTION", "hash": "0xfeed" })))
        .respond_with(envelope(false, "414", "waiting execute"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CHAIN_CALL))
        .respond_with(envelope(true, "200", "{\"blockNumber\":3}"))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let resp = client
        .multiple_query_transaction("b1", "0xfeed")
        .await
        .unwrap();

    assert!(resp.is_ok());
    assert_eq!(resp.data, "{\"blockNumber\":3}");
}

#[tokio::test]
async fn test_expired_session_is_renewed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SHAKE_HAND))
        .respond_with(envelope(true, "200", "tok"))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(CHAIN_CALL))
        .respond_with(envelope(false, "202", "token expired"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CHAIN_CALL))
        .respond_with(envelope(true, "200", "{}"))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let resp = client.query_account("b1", "alice").await.unwrap();
    assert!(resp.is_ok());
}

#[tokio::test]
async fn test_http_error_status_is_not_retried() {
    let server = MockServer::start().await;
    mount_handshake(&server, "tok").await;

    Mock::given(method("POST"))
        .and(path(CHAIN_CALL))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let err = client.query_account("b1", "alice").await.unwrap_err();
    assert!(matches!(
        err,
        RestClientError::NonSuccessStatus {
            call: "chainCall",
            status: 503
        }
    ));
}

#[tokio::test]
async fn test_unreachable_gateway_fails_construction() {
    let props = RestClientProperties::new("http://127.0.0.1:1", "access", fixture("access.key"));
    let result = RestClient::new(props).await;
    assert!(matches!(
        result,
        Err(RestClientError::Handshake(HandshakeError::Transport(_)))
    ));
}

#[tokio::test]
async fn test_from_config_file_resolves_key_next_to_config() {
    let server = MockServer::start().await;
    mount_handshake(&server, "tok").await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(fixture("access.key"), dir.path().join("access.key")).unwrap();
    let config = dir.path().join("rest-client.json");
    std::fs::write(
        &config,
        json!({
            "RestUrl": server.uri(),
            "AccessId": "access",
            "AccessSecret": "access.key",
            "RetryMaxAttempts": 3
        })
        .to_string(),
    )
    .unwrap();

    let client = RestClient::from_config_file(&config).await.unwrap();
    assert_eq!(client.token().await, "tok");
    assert_eq!(client.retry_policy().max_attempts(), 3);
}

#[tokio::test]
async fn test_missing_config_file() {
    let result = RestClient::from_config_file("/nonexistent/rest-client.json").await;
    assert!(matches!(result, Err(RestClientError::Config(_))));
}
