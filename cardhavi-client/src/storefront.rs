//! Storefront data access with explicit source precedence
//!
//! A reachable server always wins and its answer replaces the cached copy.
//! Cached data is served only when the request failed in transport
//! (connect or timeout); any other server error is returned as is.

use shared::models::{Card, Order, OrderCreate};

use crate::cache::LocalCache;
use crate::{ClientConfig, ClientError, ClientResult, HttpClient};

/// Where a value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Server,
    Cache,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub source: Source,
}

/// Result of placing an order
#[derive(Debug, Clone, PartialEq)]
pub enum Placed {
    Created(Order),
    /// Connection refused; kept in the outbox under this local id
    Queued(String),
}

/// Outcome of an outbox replay
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SyncReport {
    pub created: Vec<Order>,
    /// Entries the server refused (dropped from the outbox)
    pub rejected: Vec<String>,
    /// Entries whose request timed out; dropped from the outbox since the server
    /// may have created it. Check the user's orders before placing it again.
    pub unconfirmed: Vec<String>,
    /// Entries still waiting because the server became unreachable
    pub remaining: usize,
}

pub struct Storefront {
    http: HttpClient,
    cache: LocalCache,
}

impl Storefront {
    pub async fn open(config: &ClientConfig) -> ClientResult<Self> {
        let http = config.build_http_client()?;
        let cache = LocalCache::open(&config.cache_path).await;
        Ok(Self { http, cache })
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// Catalog, falling back to the last server snapshot when offline
    pub async fn cards(&mut self) -> ClientResult<Fetched<Vec<Card>>> {
        match self.http.cards().await {
            Ok(cards) => {
                self.cache.set_cards(cards.clone());
                self.persist().await;
                Ok(Fetched {
                    value: cards,
                    source: Source::Server,
                })
            }
            Err(e) if e.is_transport() => match self.cache.cards() {
                Some(cached) => {
                    tracing::info!(error = %e, "Server unreachable, serving cached catalog");
                    Ok(Fetched {
                        value: cached.to_vec(),
                        source: Source::Cache,
                    })
                }
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    /// A user's orders, falling back to the last server snapshot when offline.
    ///
    /// Queued outbox entries are not mixed in.
    pub async fn user_orders(&mut self, user_id: &str) -> ClientResult<Fetched<Vec<Order>>> {
        match self.http.user_orders(user_id).await {
            Ok(orders) => {
                self.cache.set_user_orders(user_id, orders.clone());
                self.persist().await;
                Ok(Fetched {
                    value: orders,
                    source: Source::Server,
                })
            }
            Err(e) if e.is_transport() => match self.cache.user_orders(user_id) {
                Some(cached) => {
                    tracing::info!(user_id, error = %e, "Server unreachable, serving cached orders");
                    Ok(Fetched {
                        value: cached.to_vec(),
                        source: Source::Cache,
                    })
                }
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    /// Create an order, queueing it when the connection is refused.
    ///
    /// A timed-out request is returned as an error and not queued: the server
    /// may already have created the order.
    pub async fn place_order(&mut self, order: OrderCreate) -> ClientResult<Placed> {
        match self.http.create_order(&order).await {
            Ok(created) => Ok(Placed::Created(created)),
            Err(e) if e.is_unsent() => {
                let local_id = self.cache.push_pending(order).local_id.clone();
                self.cache.save().await?;
                tracing::info!(local_id = %local_id, error = %e, "Order queued for later delivery");
                Ok(Placed::Queued(local_id))
            }
            Err(e) => Err(e),
        }
    }

    /// Replay the outbox in queue order.
    ///
    /// Stops at the first transport failure. Entries the server rejects are
    /// dropped so they cannot block the queue; an entry that timed out is
    /// dropped and reported as unconfirmed so it is never sent twice.
    pub async fn sync_pending(&mut self) -> ClientResult<SyncReport> {
        let mut report = SyncReport::default();
        let pending = self.cache.outbox().to_vec();

        for (idx, entry) in pending.iter().enumerate() {
            match self.http.create_order(&entry.order).await {
                Ok(order) => {
                    self.cache.remove_pending(&entry.local_id);
                    report.created.push(order);
                }
                Err(e) if e.is_unsent() => {
                    report.remaining = pending.len() - idx;
                    break;
                }
                Err(e) if e.is_transport() => {
                    tracing::warn!(local_id = %entry.local_id, error = %e, "Queued order timed out, outcome unknown");
                    self.cache.remove_pending(&entry.local_id);
                    report.unconfirmed.push(entry.local_id.clone());
                    report.remaining = pending.len() - idx - 1;
                    break;
                }
                Err(ClientError::Validation(message)) => {
                    tracing::warn!(local_id = %entry.local_id, %message, "Server rejected queued order");
                    self.cache.remove_pending(&entry.local_id);
                    report.rejected.push(entry.local_id.clone());
                }
                Err(e) => {
                    self.cache.save().await?;
                    return Err(e);
                }
            }
        }

        self.cache.save().await?;
        Ok(report)
    }

    async fn persist(&self) {
        if let Err(e) = self.cache.save().await {
            tracing::warn!(path = %self.cache.path().display(), error = %e, "Failed to write cache");
        }
    }
}
