//! Local storefront cache
//!
//! One JSON file holding the last catalog and per-user order lists the
//! server returned, plus the outbox of orders placed while offline. Entries
//! are replaced wholesale; nothing is merged by id.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::models::{Card, Order, OrderCreate};

use crate::ClientResult;

/// Order waiting to be sent to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOrder {
    /// Client-side id, only meaningful inside the outbox
    pub local_id: String,
    pub order: OrderCreate,
    pub queued_at: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    cards: Option<Vec<Card>>,
    #[serde(default)]
    orders_by_user: HashMap<String, Vec<Order>>,
    #[serde(default)]
    outbox: Vec<PendingOrder>,
}

/// File-backed cache
#[derive(Debug)]
pub struct LocalCache {
    path: PathBuf,
    snapshot: Snapshot,
}

impl LocalCache {
    /// Open the cache file; a missing or unreadable file starts empty
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt cache file");
                Snapshot::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cache file unreadable");
                Snapshot::default()
            }
        };
        Self { path, snapshot }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the snapshot (temp file + rename)
    pub async fn save(&self) -> ClientResult<()> {
        let bytes = serde_json::to_vec_pretty(&self.snapshot)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Last catalog from the server, `None` if never fetched
    pub fn cards(&self) -> Option<&[Card]> {
        self.snapshot.cards.as_deref()
    }

    pub fn set_cards(&mut self, cards: Vec<Card>) {
        self.snapshot.cards = Some(cards);
    }

    pub fn user_orders(&self, user_id: &str) -> Option<&[Order]> {
        self.snapshot.orders_by_user.get(user_id).map(Vec::as_slice)
    }

    pub fn set_user_orders(&mut self, user_id: &str, orders: Vec<Order>) {
        self.snapshot.orders_by_user.insert(user_id.to_string(), orders);
    }

    pub fn outbox(&self) -> &[PendingOrder] {
        &self.snapshot.outbox
    }

    pub fn push_pending(&mut self, order: OrderCreate) -> &PendingOrder {
        let entry = PendingOrder {
            local_id: uuid::Uuid::new_v4().to_string(),
            order,
            queued_at: shared::util::now_millis(),
        };
        self.snapshot.outbox.push(entry);
        &self.snapshot.outbox[self.snapshot.outbox.len() - 1]
    }

    /// Remove an outbox entry; `false` if it was not there
    pub fn remove_pending(&mut self, local_id: &str) -> bool {
        let before = self.snapshot.outbox.len();
        self.snapshot.outbox.retain(|p| p.local_id != local_id);
        self.snapshot.outbox.len() != before
    }
}
