//! Scripted in-memory listing client for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use gs_error::{GsError, Result};
use tokio::sync::Semaphore;

use super::list::{ListPage, ListRequest, ListingClient};

/// A [`ListingClient`] that replays scripted pages per prefix.
///
/// Pages for a prefix are returned in the order they were added. A prefix
/// with nothing (left) scripted returns an empty, final page. When gated,
/// every call waits for a permit from [`release`](Self::release) before
/// returning, which keeps calls observably in flight.
#[derive(Debug, Default)]
pub struct MockListingClient {
    pages: Mutex<HashMap<String, VecDeque<Result<ListPage>>>>,
    requests: Mutex<Vec<ListRequest>>,
    gate: Option<Semaphore>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockListingClient {
    /// Create a client with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next page for `prefix`.
    pub fn with_page(self, prefix: impl Into<String>, page: ListPage) -> Self {
        self.push(prefix.into(), Ok(page));
        self
    }

    /// Script a listing failure for `prefix`.
    pub fn with_error(self, prefix: impl Into<String>, message: impl Into<String>) -> Self {
        self.push(prefix.into(), Err(GsError::listing(message)));
        self
    }

    /// Hold every call until a permit is released.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    /// Let `calls` pending or future calls complete.
    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<ListRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of calls started.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Highest number of calls that were outstanding at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn push(&self, prefix: String, page: Result<ListPage>) {
        self.pages
            .lock()
            .unwrap()
            .entry(prefix)
            .or_default()
            .push_back(page);
    }
}

#[async_trait]
impl ListingClient for MockListingClient {
    async fn list(&self, request: ListRequest) -> Result<ListPage> {
        let prefix = request.prefix.clone();
        self.requests.lock().unwrap().push(request);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| GsError::listing(format!("gate closed: {e}")))?
                .forget();
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.pages
            .lock()
            .unwrap()
            .get_mut(&prefix)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(ListPage::complete(Vec::new())))
    }
}
