use axum::http::{self, header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, CHUNK_COUNT, HAL_JSON};
use serde_json::Value;
use tower::ServiceExt;

async fn send(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn content_type(response: &axum::response::Response) -> Option<&str> {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
}

fn location(response: &axum::response::Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

// --- root ---

#[tokio::test]
async fn api_root_links_to_orders() {
    let resp = send(&app(), get("/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), Some(HAL_JSON));
    let body = body_json(resp).await;
    assert_eq!(body["_links"]["orders"]["href"], "/orders");
    assert_eq!(body["_links"]["order"]["templated"], true);
}

// --- orders ---

#[tokio::test]
async fn list_orders_empty() {
    let resp = send(&app(), get("/orders")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["_embedded"]["orders"], Value::Array(Vec::new()));
}

#[tokio::test]
async fn create_order_returns_201_hal() {
    let request = json_request("POST", "/orders", r#"{"item":"Widget","quantity":5}"#);
    let resp = send(&app(), request).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(content_type(&resp), Some(HAL_JSON));
    let body = body_json(resp).await;
    assert_eq!(body["item"], "Widget");
    assert_eq!(body["quantity"], 5);
    let id = body["id"].as_str().unwrap();
    assert_eq!(body["_links"]["self"]["href"], format!("/orders/{id}"));
}

#[tokio::test]
async fn create_order_malformed_json_returns_422() {
    let resp = send(&app(), json_request("POST", "/orders", r#"{"quantity":1}"#)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_order_not_found_has_no_content_type() {
    let resp = send(&app(), get("/orders/00000000-0000-0000-0000-000000000000")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(content_type(&resp), None);
}

#[tokio::test]
async fn delete_order_not_found() {
    let request = Request::builder()
        .method("DELETE")
        .uri("/orders/00000000-0000-0000-0000-000000000000")
        .body(String::new())
        .unwrap();
    let resp = send(&app(), request).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_lifecycle() {
    let app = app();

    let resp = send(&app, json_request("POST", "/orders", r#"{"item":"Gadget"}"#)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["quantity"], 1);

    let resp = send(&app, get("/orders")).await;
    let list = body_json(resp).await;
    assert_eq!(list["count"], 1);
    assert_eq!(list["_links"]["item"][0]["href"], format!("/orders/{id}"));
    assert_eq!(list["_embedded"]["orders"][0]["item"], "Gadget");

    let resp = send(&app, json_request("PUT", &format!("/orders/{id}"), r#"{"quantity":4}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["item"], "Gadget");
    assert_eq!(updated["quantity"], 4);

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/orders/{id}"))
        .body(String::new())
        .unwrap();
    let resp = send(&app, delete).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(content_type(&resp), Some(HAL_JSON));
    assert!(body_bytes(resp).await.is_empty());

    let resp = send(&app, get(&format!("/orders/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- fixed routes ---

#[tokio::test]
async fn redirect_routes() {
    let app = app();
    let cases = [
        ("/moved", StatusCode::FOUND, "/orders"),
        ("/see-other", StatusCode::SEE_OTHER, "/"),
        ("/temporary", StatusCode::TEMPORARY_REDIRECT, "/"),
        ("/loop", StatusCode::FOUND, "/loop"),
    ];
    for (uri, status, target) in cases {
        let resp = send(&app, get(uri)).await;
        assert_eq!(resp.status(), status, "{uri}");
        assert_eq!(location(&resp), Some(target), "{uri}");
    }
}

#[tokio::test]
async fn see_other_accepts_post() {
    let resp = send(&app(), json_request("POST", "/see-other", "{}")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn inspect_echoes_accept() {
    let request = Request::builder()
        .uri("/inspect")
        .header(header::ACCEPT, HAL_JSON)
        .body(String::new())
        .unwrap();
    let body = body_json(send(&app(), request).await).await;
    assert_eq!(body["accept"], serde_json::json!([HAL_JSON]));
}

#[tokio::test]
async fn non_hal_routes() {
    let app = app();

    let resp = send(&app, get("/plain")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(content_type(&resp).unwrap().starts_with("text/plain"));

    let resp = send(&app, get("/broken")).await;
    assert_eq!(content_type(&resp), Some(HAL_JSON));
    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<Value>(&bytes).is_err());

    let resp = send(&app, get("/fail")).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type(&resp), None);
}

#[tokio::test]
async fn latin1_route_is_not_utf8() {
    let resp = send(&app(), get("/latin1")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), Some(HAL_JSON));
    let bytes = body_bytes(resp).await;
    assert!(std::str::from_utf8(&bytes).is_err());
}

#[tokio::test]
async fn chunked_route_streams_without_length() {
    let resp = send(&app(), get("/chunked")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(content_type(&resp), Some(HAL_JSON));
    assert!(resp.headers().get(header::CONTENT_LENGTH).is_none());
    let body = body_json(resp).await;
    assert_eq!(body["padding"].as_str().unwrap().len(), CHUNK_COUNT * 16);
}
