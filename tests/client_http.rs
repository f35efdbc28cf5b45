//! Resilient client behavior against a mock Curve API

use curve_monitor::network::{ApiRequest, BaseApi, CurveApiClient, Endpoint, PathParams, RetryPolicy};
use curve_monitor::MonitorError;
use mockito::{Matcher, Server};
use reqwest::Method;
use serde_json::json;
use std::time::Duration;

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        retry_delay: Duration::from_millis(1),
        backoff_multiplier: 2.0,
        max_delay: Duration::from_millis(10),
    }
}

fn client_for(server: &Server) -> CurveApiClient {
    CurveApiClient::builder()
        .api_base_url(server.url())
        .core_api_url(server.url())
        .retry_policy(fast_retry())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn unwraps_success_envelope() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/getPools/ethereum/main")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true,"data":{"poolData":[{"id":"3pool"}]},"generatedTimeMs":1}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let params = PathParams::chain("ethereum").with_registry("main");
    let payload = client.get(Endpoint::PoolsByRegistry, &params).await.unwrap();

    assert_eq!(payload, json!({"poolData": [{"id": "3pool"}]}));
    mock.assert_async().await;
}

#[tokio::test]
async fn returns_unwrapped_payload_verbatim() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/getAllGauges")
        .with_status(200)
        .with_body(r#"{"gauges":{"0x1":{"name":"g"}}}"#)
        .create_async()
        .await;

    let payload = client_for(&server)
        .get(Endpoint::AllGauges, &PathParams::none())
        .await
        .unwrap();
    assert_eq!(payload, json!({"gauges": {"0x1": {"name": "g"}}}));
}

#[tokio::test]
async fn rate_limit_exhausts_retries() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/getVolumes/ethereum")
        .with_status(429)
        .expect(3)
        .create_async()
        .await;

    let err = client_for(&server)
        .get(Endpoint::Volumes, &PathParams::chain("ethereum"))
        .await
        .unwrap_err();

    match err {
        MonitorError::RetriesExhausted { endpoint, attempts } => {
            assert_eq!(endpoint, "/getVolumes/ethereum");
            assert_eq!(attempts, 3);
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_fails_without_retry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/getSubgraphData/arbitrum")
        .with_status(500)
        .with_body("upstream exploded")
        .expect(1)
        .create_async()
        .await;

    let err = client_for(&server)
        .get(Endpoint::SubgraphData, &PathParams::chain("arbitrum"))
        .await
        .unwrap_err();

    match &err {
        MonitorError::RequestFailed { endpoint, status, .. } => {
            assert_eq!(endpoint, "/getSubgraphData/arbitrum");
            assert_eq!(*status, Some(500));
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }
    assert!(err.to_string().contains("/getSubgraphData/arbitrum"));
    mock.assert_async().await;
}

#[tokio::test]
async fn invalid_json_is_a_request_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/getCrvusdTotalSupply")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let err = client_for(&server)
        .get(Endpoint::CrvusdTotalSupply, &PathParams::none())
        .await
        .unwrap_err();
    assert!(matches!(err, MonitorError::RequestFailed { .. }));
}

#[tokio::test]
async fn core_endpoints_use_core_base() {
    let mut core = Server::new_async().await;
    let mock = core
        .mock("GET", "/crvusd/markets/ethereum")
        .with_status(200)
        .with_body(r#"{"markets":[]}"#)
        .create_async()
        .await;

    let client = CurveApiClient::builder()
        .api_base_url("http://127.0.0.1:9")
        .core_api_url(core.url())
        .retry_policy(fast_retry())
        .build()
        .unwrap();

    let payload = client
        .get(Endpoint::CrvusdAmmMarkets, &PathParams::chain("ethereum"))
        .await
        .unwrap();
    assert_eq!(payload, json!({"markets": []}));
    mock.assert_async().await;
}

#[tokio::test]
async fn sends_json_body_when_present() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/getPools/all/base")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"addresses": ["0xabc"]})))
        .with_status(200)
        .with_body(r#"{"success":true,"data":[]}"#)
        .create_async()
        .await;

    let params = PathParams::chain("base");
    let request = ApiRequest::for_endpoint(Endpoint::AllPoolsOnChain, &params)
        .unwrap()
        .with_method(Method::POST)
        .with_body(json!({"addresses": ["0xabc"]}))
        .with_timeout(Duration::from_secs(2));

    let payload = client_for(&server).request(&request).await.unwrap();
    assert_eq!(payload, json!([]));
    assert_eq!(request.base, BaseApi::Main);
    mock.assert_async().await;
}
