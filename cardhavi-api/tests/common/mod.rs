//! Shared harness: in-memory store, recording gateway, request helpers

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use http::{HeaderValue, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use cardhavi_api::AppState;
use cardhavi_api::api::build_app;
use cardhavi_api::nowpayments::{
    GatewayError, GatewayInvoice, InvoicePayload, InvoiceSettings, PaymentGateway,
};

pub const IPN_SECRET: &str = "test_ipn_secret";

/// What the fake gateway answers
#[derive(Debug, Clone)]
pub enum Reply {
    Invoice { id: String, url: String },
    NotConfigured,
    Rejected,
}

/// Gateway double that records every payload it receives
pub struct FakeGateway {
    reply: Mutex<Reply>,
    calls: Mutex<Vec<InvoicePayload>>,
}

impl FakeGateway {
    pub fn issuing(id: &str, url: &str) -> Self {
        Self::with_reply(Reply::Invoice {
            id: id.to_string(),
            url: url.to_string(),
        })
    }

    pub fn with_reply(reply: Reply) -> Self {
        Self {
            reply: Mutex::new(reply),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> Vec<InvoicePayload> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_invoice(&self, payload: &InvoicePayload) -> Result<GatewayInvoice, GatewayError> {
        self.calls.lock().unwrap().push(payload.clone());
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Reply::Invoice { id, url } => Ok(GatewayInvoice {
                raw: json!({ "id": id, "invoice_url": url, "order_id": payload.order_id }),
                id,
                invoice_url: url,
            }),
            Reply::NotConfigured => Err(GatewayError::NotConfigured),
            Reply::Rejected => Err(GatewayError::Rejected {
                status: 400,
                body: r#"{"message":"bad request"}"#.into(),
            }),
        }
    }
}

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    pub gateway: Arc<FakeGateway>,
}

/// Single-connection in-memory store (each connection would be its own database)
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    cardhavi_api::db::migrate(&pool).await.unwrap();
    pool
}

pub fn invoice_settings() -> InvoiceSettings {
    InvoiceSettings {
        public_base_url: "https://shop.test".into(),
        public_api_url: "https://api.shop.test".into(),
        pay_currencies: "btc,usdttrc20".into(),
    }
}

pub async fn test_app() -> TestApp {
    test_app_with(FakeGateway::issuing("inv_1", "https://pay/inv_1"), Some(IPN_SECRET)).await
}

pub async fn test_app_with(gateway: FakeGateway, ipn_secret: Option<&str>) -> TestApp {
    let pool = memory_pool().await;
    let gateway = Arc::new(gateway);
    let state = AppState::with_parts(
        pool.clone(),
        gateway.clone(),
        invoice_settings(),
        ipn_secret.map(String::from),
    );
    TestApp {
        app: build_app(state),
        pool,
        gateway,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body)
    }

    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, bytes) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.json(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.json(Method::POST, uri, Some(body)).await
    }

    /// POST a raw webhook body with an optional signature header
    pub async fn webhook(&self, body: &[u8], signature: Option<HeaderValue>) -> (StatusCode, String) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/pay/crypto/webhook")
            .header("content-type", "application/json");
        if let Some(sig) = signature {
            builder = builder.header("x-nowpayments-sig", sig);
        }
        let (status, bytes) = self.send(builder.body(Body::from(body.to_vec())).unwrap()).await;
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    /// POST a body signed with the test secret
    pub async fn signed_webhook(&self, body: &Value) -> (StatusCode, String) {
        let raw = body.to_string().into_bytes();
        let sig = sign(&raw);
        self.webhook(&raw, Some(HeaderValue::from_str(&sig).unwrap())).await
    }

    /// Scenario A order: one line, 2 x 10.00
    pub async fn create_order(&self) -> Value {
        let (status, order) = self
            .post(
                "/api/orders",
                json!({
                    "user": { "id": "u-1", "name": "Ada", "email": "ada@example.com" },
                    "items": [{ "name": "X", "price": 10, "quantity": 2 }],
                    "total": 20,
                    "address": "1 Main St"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{order}");
        order
    }

    pub async fn order(&self, id: &str) -> Value {
        let (status, order) = self.get(&format!("/api/orders/{id}")).await;
        assert_eq!(status, StatusCode::OK, "{order}");
        order
    }

    pub async fn event_count(&self) -> i64 {
        cardhavi_api::db::payment_events::count(&self.pool).await.unwrap()
    }
}

pub fn sign(body: &[u8]) -> String {
    cardhavi_api::nowpayments::sign(body, IPN_SECRET).unwrap()
}
