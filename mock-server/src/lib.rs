//! In-memory HAL API used to exercise `hal-client` over real HTTP.
//!
//! Serves an order store as `application/hal+json`, plus a handful of fixed
//! routes that produce redirects, redirect loops, and the non-HAL responses
//! a client has to reject. `/slow` and `/chunked` exercise client timeouts
//! and streamed bodies without a `Content-Length`.

use std::{collections::HashMap, convert::Infallible, sync::Arc, time::Duration};

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const HAL_JSON: &str = "application/hal+json";

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_secs(2);

/// Number of 16-byte padding chunks `/chunked` streams.
pub const CHUNK_COUNT: usize = 64;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub item: String,
    pub quantity: u32,
}

impl Order {
    fn to_hal(&self) -> Value {
        json!({
            "id": self.id,
            "item": self.item,
            "quantity": self.quantity,
            "_links": {
                "self": { "href": format!("/orders/{}", self.id) },
                "collection": { "href": "/orders" }
            }
        })
    }
}

#[derive(Deserialize)]
pub struct CreateOrder {
    pub item: String,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct UpdateOrder {
    pub item: Option<String>,
    pub quantity: Option<u32>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Order>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/", get(api_root))
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/moved", any(|| async { redirect(StatusCode::FOUND, "/orders") }))
        .route("/see-other", any(|| async { redirect(StatusCode::SEE_OTHER, "/") }))
        .route(
            "/temporary",
            any(|| async { redirect(StatusCode::TEMPORARY_REDIRECT, "/") }),
        )
        .route("/loop", any(|| async { redirect(StatusCode::FOUND, "/loop") }))
        .route("/inspect", get(inspect))
        .route("/plain", get(|| async { (StatusCode::OK, "plain text") }))
        .route("/broken", get(|| async { hal_raw(StatusCode::OK, "{\"_links\": ") }))
        .route("/latin1", get(|| async { hal_raw(StatusCode::OK, &b"{\"name\":\"caf\xe9\"}"[..]) }))
        .route("/slow", get(slow))
        .route("/chunked", get(chunked))
        .route("/fail", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn hal(status: StatusCode, body: Value) -> Response {
    hal_raw(status, body.to_string())
}

fn hal_raw(status: StatusCode, body: impl Into<Body>) -> Response {
    (status, [(header::CONTENT_TYPE, HAL_JSON)], body.into()).into_response()
}

fn redirect(status: StatusCode, location: &'static str) -> Response {
    (status, [(header::LOCATION, location)]).into_response()
}

async fn api_root() -> Response {
    hal(
        StatusCode::OK,
        json!({
            "name": "orders-api",
            "_links": {
                "self": { "href": "/" },
                "orders": { "href": "/orders" },
                "order": { "href": "/orders/{id}", "templated": true }
            }
        }),
    )
}

async fn list_orders(State(db): State<Db>) -> Response {
    let orders = db.read().await;
    let mut embedded: Vec<&Order> = orders.values().collect();
    embedded.sort_by(|a, b| a.item.cmp(&b.item).then(a.id.cmp(&b.id)));
    let items: Vec<Value> = embedded
        .iter()
        .map(|o| json!({ "href": format!("/orders/{}", o.id) }))
        .collect();

    hal(
        StatusCode::OK,
        json!({
            "count": embedded.len(),
            "_links": {
                "self": { "href": "/orders" },
                "item": items
            },
            "_embedded": {
                "orders": embedded.iter().map(|o| o.to_hal()).collect::<Vec<_>>()
            }
        }),
    )
}

async fn create_order(State(db): State<Db>, Json(input): Json<CreateOrder>) -> Response {
    let order = Order {
        id: Uuid::new_v4(),
        item: input.item,
        quantity: input.quantity,
    };
    debug!(id = %order.id, "order created");
    db.write().await.insert(order.id, order.clone());
    hal(StatusCode::CREATED, order.to_hal())
}

async fn get_order(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Response, StatusCode> {
    let orders = db.read().await;
    orders
        .get(&id)
        .map(|order| hal(StatusCode::OK, order.to_hal()))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_order(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateOrder>,
) -> Result<Response, StatusCode> {
    let mut orders = db.write().await;
    let order = orders.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(item) = input.item {
        order.item = item;
    }
    if let Some(quantity) = input.quantity {
        order.quantity = quantity;
    }
    Ok(hal(StatusCode::OK, order.to_hal()))
}

async fn delete_order(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Response, StatusCode> {
    let mut orders = db.write().await;
    orders.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    debug!(%id, "order deleted");
    Ok((StatusCode::NO_CONTENT, [(header::CONTENT_TYPE, HAL_JSON)]).into_response())
}

async fn slow() -> Response {
    tokio::time::sleep(SLOW_DELAY).await;
    api_root().await
}

/// A HAL document streamed in pieces, so no `Content-Length` is sent.
async fn chunked() -> Response {
    let padding = (0..CHUNK_COUNT).map(|_| Bytes::from_static(b"xxxxxxxxxxxxxxxx"));
    let chunks = std::iter::once(Bytes::from_static(b"{\"padding\":\""))
        .chain(padding)
        .chain(std::iter::once(Bytes::from_static(b"\"}")))
        .map(Ok::<_, Infallible>);
    hal_raw(StatusCode::OK, Body::from_stream(futures::stream::iter(chunks)))
}

/// Echo the negotiation headers the client sent.
async fn inspect(headers: HeaderMap) -> Response {
    let values = |name: header::HeaderName| -> Vec<String> {
        headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    };
    hal(
        StatusCode::OK,
        json!({
            "accept": values(header::ACCEPT),
            "userAgent": values(header::USER_AGENT),
            "_links": { "self": { "href": "/inspect" } }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_renders_self_and_collection_links() {
        let order = Order {
            id: Uuid::nil(),
            item: "Widget".to_string(),
            quantity: 2,
        };
        let hal = order.to_hal();
        assert_eq!(hal["item"], "Widget");
        assert_eq!(hal["quantity"], 2);
        assert_eq!(
            hal["_links"]["self"]["href"],
            "/orders/00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(hal["_links"]["collection"]["href"], "/orders");
    }

    #[test]
    fn create_order_defaults_quantity_to_one() {
        let input: CreateOrder = serde_json::from_str(r#"{"item":"Widget"}"#).unwrap();
        assert_eq!(input.quantity, 1);
    }

    #[test]
    fn create_order_rejects_missing_item() {
        let result: Result<CreateOrder, _> = serde_json::from_str(r#"{"quantity":3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_order_all_fields_optional() {
        let input: UpdateOrder = serde_json::from_str("{}").unwrap();
        assert!(input.item.is_none());
        assert!(input.quantity.is_none());
    }
}
