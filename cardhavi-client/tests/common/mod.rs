//! Runs the real API router on a local listener

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use cardhavi_api::AppState;
use cardhavi_api::nowpayments::{InvoiceSettings, NowPaymentsClient};
use cardhavi_client::ClientConfig;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub struct Server {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Server {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop accepting connections and wait for the server task
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.unwrap();
        }
    }
}

/// Serve the API from a database file inside `dir`, on `addr` if given
pub async fn start_api(dir: &TempDir, addr: Option<SocketAddr>) -> Server {
    let url = format!("sqlite://{}", dir.path().join("api.db").display());
    let pool = cardhavi_api::db::connect(&url).await.unwrap();
    cardhavi_api::db::migrate(&pool).await.unwrap();

    let gateway = NowPaymentsClient::new("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
    let state = AppState::with_parts(
        pool,
        Arc::new(gateway),
        InvoiceSettings {
            public_base_url: "http://localhost:5173".into(),
            public_api_url: "http://localhost:4001".into(),
            pay_currencies: "btc".into(),
        },
        None,
    );
    let app = cardhavi_api::api::build_app(state);

    let listener = TcpListener::bind(addr.unwrap_or_else(|| ([127, 0, 0, 1], 0).into()))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await
            .unwrap();
    });

    Server {
        addr,
        shutdown: Some(tx),
        handle: Some(handle),
    }
}

/// A local address with nothing listening on it
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn config(base_url: &str, dir: &TempDir) -> ClientConfig {
    ClientConfig::new(base_url)
        .with_timeout(5)
        .with_cache_path(dir.path().join("storefront.json"))
}

/// Accepts connections on `addr` and never answers
pub async fn silent_server(addr: SocketAddr) -> JoinHandle<()> {
    let listener = TcpListener::bind(addr).await.unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    })
}
