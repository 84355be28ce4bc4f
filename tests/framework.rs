//! Both front ends must answer the same way to a real HTTP client.

use htcpcp::config::{Frontend, ServerConfig};
use reqwest::{Method, StatusCode};
use serde_json::Value;

mod common;

use common::start_with;

fn config(frontend: Frontend) -> ServerConfig {
    ServerConfig {
        frontend,
        ..ServerConfig::default()
    }
}

async fn call(client: &reqwest::Client, method: &str, url: String) -> (StatusCode, Value) {
    let response = client
        .request(Method::from_bytes(method.as_bytes()).unwrap(), url)
        .send()
        .await
        .unwrap();
    let status = response.status();
    let body = response.json().await.unwrap();
    (status, body)
}

async fn brew_cycle(frontend: Frontend) {
    let server = start_with(config(frontend)).await;
    let base = format!("http://{}", server.addr);
    let client = reqwest::Client::new();

    let response = client
        .request(Method::from_bytes(b"BREW").unwrap(), format!("{}/coffee/pot-1", base))
        .header("Accept-Additions", "milk-type=Cream")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-protocol"], "HTCPCP/1.0");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["brew_id"], 1);
    assert_eq!(body["milk_pouring"], true);

    let (status, body) = call(&client, "WHEN", format!("{}/coffee/pot-1/stop-milk", base)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_status"], "brewing");

    let (status, body) = call(&client, "BREW", format!("{}/coffee/kettle-2", base)).await;
    assert_eq!(status.as_u16(), 418);
    assert_eq!(body["pot_id"], "kettle-2");

    let (status, body) = call(&client, "PROPFIND", format!("{}/coffee/pot-1/additions", base)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rfc"], "RFC 2324 §2.1.1");

    let (status, body) = call(&client, "GET", format!("{}/coffee/pot-1/history", base)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_brews"], 1);
    assert_eq!(body["brews"][0]["additions"]["milk-type"], "Cream");

    let (status, body) = call(&client, "GET", format!("{}/coffee/pot-1", base)).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["allowed"], serde_json::json!(["BREW", "POST"]));
}

#[tokio::test]
async fn test_raw_front_end_with_http_client() {
    brew_cycle(Frontend::Raw).await;
}

#[tokio::test]
async fn test_framework_front_end_with_http_client() {
    brew_cycle(Frontend::Framework).await;
}

#[tokio::test]
async fn test_framework_sets_request_id() {
    let server = start_with(config(Frontend::Framework)).await;
    let response = reqwest::get(format!("http://{}/", server.addr)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}
