use std::{sync::Arc, time::Duration};

use shared::{
    domain::{FilterField, SortField, SortOrder},
    protocol::{BillSummary, Pagination},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, error, info};

use crate::{
    query_state::{ActiveFilter, QueryState},
    BillQueryClient,
};

/// Quiet period before a keystroke-driven search is committed.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Broadcast to consumers whenever the controller's data changes. Rendering
/// is the subscriber's business.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    LoadStarted,
    BillsLoaded {
        bills: Vec<BillSummary>,
        pagination: Pagination,
    },
    /// Emitted at most once per failed request; the query state is left
    /// untouched so the user's next action retries naturally.
    LoadFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Idle,
    Loading,
}

struct ControllerInner {
    query: QueryState,
    loading: bool,
    /// Sequence number of the most recently issued request. A completion
    /// carrying any other sequence number is discarded (last-issued-wins).
    last_issued: u64,
}

struct SearchDebounce {
    /// Bumped on every keystroke, submit, or cancellation; a delayed commit
    /// whose generation is stale is a no-op.
    generation: u64,
    pending: Option<PendingSearch>,
}

struct PendingSearch {
    handle: JoinHandle<()>,
}

/// Owns the query state and translates user events into list requests.
pub struct BillQueryController {
    query_client: Arc<dyn BillQueryClient>,
    inner: Mutex<ControllerInner>,
    debounce: Mutex<SearchDebounce>,
    debounce_delay: Duration,
    events: broadcast::Sender<ControllerEvent>,
}

impl BillQueryController {
    pub fn new(query_client: Arc<dyn BillQueryClient>) -> Arc<Self> {
        Self::new_with_debounce(query_client, SEARCH_DEBOUNCE)
    }

    pub fn new_with_debounce(
        query_client: Arc<dyn BillQueryClient>,
        debounce_delay: Duration,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            query_client,
            inner: Mutex::new(ControllerInner {
                query: QueryState::default(),
                loading: false,
                last_issued: 0,
            }),
            debounce: Mutex::new(SearchDebounce {
                generation: 0,
                pending: None,
            }),
            debounce_delay,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn phase(&self) -> ControllerPhase {
        if self.inner.lock().await.loading {
            ControllerPhase::Loading
        } else {
            ControllerPhase::Idle
        }
    }

    pub async fn snapshot(&self) -> QueryState {
        self.inner.lock().await.query.clone()
    }

    pub async fn active_filters(&self) -> Vec<ActiveFilter> {
        self.inner.lock().await.query.active_filters()
    }

    /// Sets one filter, rewinds to page 1 and reloads. The value is not
    /// validated against the option lists.
    pub async fn set_filter(&self, field: FilterField, value: impl Into<String>) {
        if field == FilterField::Search {
            // A delayed commit left pending here would resurrect stale
            // search text after the explicit change.
            self.cancel_pending_search().await;
        }
        {
            let mut inner = self.inner.lock().await;
            inner.query.set_filter(field, value);
        }
        self.reload().await;
    }

    pub async fn remove_filter(&self, field: FilterField) {
        self.set_filter(field, "").await;
    }

    pub async fn set_sort(&self, sort_by: SortField, order: SortOrder) {
        {
            let mut inner = self.inner.lock().await;
            inner.query.set_sort(sort_by, order);
        }
        self.reload().await;
    }

    /// Jumps to page `n` without touching filters. Callers are expected to
    /// stay inside the window the last response reported; out-of-range pages
    /// are clamped by the server, not here.
    pub async fn go_to_page(&self, n: u32) {
        {
            let mut inner = self.inner.lock().await;
            inner.query.page = n;
        }
        self.reload().await;
    }

    /// Resets every filter, the sort and the page, then reloads.
    pub async fn clear_all(&self) {
        self.cancel_pending_search().await;
        {
            let mut inner = self.inner.lock().await;
            inner.query.clear_all();
        }
        self.reload().await;
    }

    /// Keystroke handler for the search box. (Re)starts the debounce timer;
    /// the trimmed value is committed once the input has been quiet for the
    /// configured delay.
    pub async fn set_search_input(self: &Arc<Self>, raw: &str) {
        let value = raw.trim().to_string();
        let mut debounce = self.debounce.lock().await;
        debounce.generation += 1;
        let generation = debounce.generation;
        if let Some(prev) = debounce.pending.take() {
            prev.handle.abort();
        }
        let controller = Arc::clone(self);
        let delay = self.debounce_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            controller.commit_search(generation, value).await;
        });
        debounce.pending = Some(PendingSearch { handle });
    }

    /// Enter-key handler: commits immediately and cancels any pending
    /// delayed commit.
    pub async fn submit_search(&self, raw: &str) {
        let generation = {
            let mut debounce = self.debounce.lock().await;
            debounce.generation += 1;
            if let Some(prev) = debounce.pending.take() {
                prev.handle.abort();
            }
            debounce.generation
        };
        self.commit_search(generation, raw.trim().to_string()).await;
    }

    async fn cancel_pending_search(&self) {
        let mut debounce = self.debounce.lock().await;
        debounce.generation += 1;
        if let Some(prev) = debounce.pending.take() {
            prev.handle.abort();
        }
    }

    async fn commit_search(&self, generation: u64, value: String) {
        {
            let mut debounce = self.debounce.lock().await;
            if debounce.generation != generation {
                return;
            }
            debounce.pending = None;
        }
        {
            let mut inner = self.inner.lock().await;
            inner.query.set_filter(FilterField::Search, value);
        }
        self.reload().await;
    }

    /// Issues a list request from the current state. On success the reported
    /// pagination is adopted; on failure the state is left untouched and a
    /// single `LoadFailed` is emitted. Responses superseded by a newer
    /// request are dropped regardless of arrival order.
    pub async fn reload(&self) {
        let (seq, query) = {
            let mut inner = self.inner.lock().await;
            inner.last_issued += 1;
            inner.loading = true;
            (inner.last_issued, inner.query.to_query())
        };
        let _ = self.events.send(ControllerEvent::LoadStarted);
        debug!(seq, page = query.page, "issuing bill list request");

        let result = self.query_client.fetch_bills(&query).await;

        let mut inner = self.inner.lock().await;
        if inner.last_issued != seq {
            debug!(
                seq,
                latest = inner.last_issued,
                "discarding superseded bill list response"
            );
            return;
        }
        inner.loading = false;
        match result {
            Ok(page) => {
                inner.query.page = page.pagination.page;
                inner.query.total_pages = page.pagination.pages;
                info!(
                    page = page.pagination.page,
                    pages = page.pagination.pages,
                    total = page.pagination.total,
                    "bill list loaded"
                );
                let _ = self.events.send(ControllerEvent::BillsLoaded {
                    bills: page.bills,
                    pagination: page.pagination,
                });
            }
            Err(err) => {
                error!(%err, "bill list request failed");
                let _ = self.events.send(ControllerEvent::LoadFailed(err.to_string()));
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
