//! End-to-end tests over real sockets.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use route_dispatch::engine::{Request, Response};
use route_dispatch::Server;

mod common;

#[tokio::test]
async fn test_routes_over_prebound_listener() {
    let server = common::user_server();
    let addr = common::spawn(server.clone()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{addr}/users/42?verbose=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "id": "42", "verbose": true }));

    let res = client
        .post(format!("http://{addr}/users"))
        .json(&serde_json::json!({ "name": "ada" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["name"], "ada");

    server.handle().shutdown();
}

#[tokio::test]
async fn test_unmatched_requests() {
    let server = common::user_server();
    let addr = common::spawn(server.clone()).await;
    let client = reqwest::Client::new();

    let res = client.get(format!("http://{addr}/nope")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(format!("http://{addr}/users/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()["allow"], "GET");

    let res = client
        .post(format!("http://{addr}/users"))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    server.handle().shutdown();
}

#[tokio::test]
async fn test_binds_configured_address() {
    let server = Arc::new(Server::new("127.0.0.1:0"));
    server.set_handler(|_: &mut Request, rs: &mut Response| {
        rs.write_text(StatusCode::OK, "bound");
    });
    let addr = common::spawn(server.clone()).await;
    assert_ne!(addr.port(), 0);

    let text = reqwest::get(format!("http://{addr}/"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(text, "bound");

    server.handle().graceful_shutdown(Some(Duration::from_secs(1)));
}

#[tokio::test]
async fn test_handler_swap_while_serving() {
    let server = Arc::new(Server::with_config(
        route_dispatch::config::ServerConfig::new("").with_listener(common::bound_listener()),
    ));
    let addr = common::spawn(server.clone()).await;
    let url = format!("http://{addr}/");

    // No handler yet: the response is left untouched.
    let res = reqwest::get(&url).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().is_empty());

    server.set_handler(|_: &mut Request, rs: &mut Response| {
        rs.write_text(StatusCode::ACCEPTED, "v2");
    });
    let res = reqwest::get(&url).await.unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    assert_eq!(res.text().await.unwrap(), "v2");

    server.handle().shutdown();
}
