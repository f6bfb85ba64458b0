//! HTTP client for the marketplace REST API

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use shared::error::ErrorBody;
use shared::models::{
    Card, CardCreate, CardUpdate, DeleteResponse, InvoiceCreate, InvoiceResponse, Order,
    OrderCreate, PaymentEvent, User,
};

use crate::{ClientConfig, ClientError, ClientResult};

/// HTTP client for making network requests to the API
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request::<T, ()>(Method::GET, path, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request::<T, ()>(Method::DELETE, path, None).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized(message)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
                StatusCode::CONFLICT => Err(ClientError::Conflict(message)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(message)),
                _ => Err(ClientError::Internal(message)),
            };
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::InvalidResponse(format!("{e} ({} bytes)", bytes.len())))
    }

    // ========== Catalog ==========

    pub async fn cards(&self) -> ClientResult<Vec<Card>> {
        self.get("/api/cards").await
    }

    pub async fn create_card(&self, card: &CardCreate) -> ClientResult<Card> {
        self.post("/api/cards", card).await
    }

    pub async fn update_card(&self, id: &str, update: &CardUpdate) -> ClientResult<Card> {
        self.put(&format!("/api/cards/{id}"), update).await
    }

    pub async fn delete_card(&self, id: &str) -> ClientResult<()> {
        let resp: DeleteResponse = self.delete(&format!("/api/cards/{id}")).await?;
        if !resp.success {
            return Err(ClientError::InvalidResponse("delete not acknowledged".into()));
        }
        Ok(())
    }

    // ========== Auth ==========

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> ClientResult<User> {
        self.post(
            "/api/auth/signup",
            &json!({ "name": name, "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        self.post(
            "/api/auth/login",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    // ========== Orders ==========

    pub async fn create_order(&self, order: &OrderCreate) -> ClientResult<Order> {
        self.post("/api/orders", order).await
    }

    pub async fn orders(&self) -> ClientResult<Vec<Order>> {
        self.get("/api/orders").await
    }

    pub async fn user_orders(&self, user_id: &str) -> ClientResult<Vec<Order>> {
        self.get(&format!("/api/orders/user/{user_id}")).await
    }

    pub async fn order(&self, id: &str) -> ClientResult<Order> {
        self.get(&format!("/api/orders/{id}")).await
    }

    pub async fn update_order_status(&self, id: &str, status: &str) -> ClientResult<Order> {
        self.patch(&format!("/api/orders/{id}/status"), &json!({ "status": status }))
            .await
    }

    pub async fn payment_events(&self, order_id: &str) -> ClientResult<Vec<PaymentEvent>> {
        self.get(&format!("/api/orders/{order_id}/payment-events")).await
    }

    // ========== Payments ==========

    pub async fn create_invoice(&self, request: &InvoiceCreate) -> ClientResult<InvoiceResponse> {
        self.post("/api/pay/crypto/create-invoice", request).await
    }

    // ========== Health ==========

    pub async fn health(&self) -> ClientResult<Value> {
        self.get("/api/health").await
    }
}
