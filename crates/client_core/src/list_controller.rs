//! List State Controller: owns the paginated catalog view and reconciles
//! debounced search input with out-of-order network responses.

use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use shared::{domain::Country, error::CatalogFailure};
use tokio::{sync::watch, task::JoinHandle};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::{
    pagination::{paginate, total_pages, Page, DEFAULT_PAGE_SIZE},
    query::{debounced_queries, QueryIntents, QuerySender, DEFAULT_DEBOUNCE},
    source::CountrySource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListConfig {
    pub page_size: NonZeroUsize,
    pub debounce: Duration,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListViewState {
    Loading,
    Success {
        page: Vec<Country>,
        current_page: usize,
        total_pages: usize,
        total_countries: usize,
    },
    Error {
        message: String,
    },
}

impl From<Page<Country>> for ListViewState {
    fn from(page: Page<Country>) -> Self {
        ListViewState::Success {
            page: page.items,
            current_page: page.current_page,
            total_pages: page.total_pages,
            total_countries: page.total_countries,
        }
    }
}

/// The operation that produced the current source-of-truth collection.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ListRequest {
    All,
    Search(String),
}

impl ListRequest {
    fn is_search(&self) -> bool {
        matches!(self, ListRequest::Search(_))
    }
}

struct ListInner {
    collection: Vec<Country>,
    current_page: usize,
    last_request: ListRequest,
    /// Sequence number of the most recently submitted request.
    request_seq: u64,
    in_flight: Option<JoinHandle<()>>,
}

struct ListShared {
    source: Arc<dyn CountrySource>,
    page_size: NonZeroUsize,
    state: watch::Sender<ListViewState>,
    query: watch::Sender<String>,
    searching: watch::Sender<bool>,
    inner: Mutex<ListInner>,
}

impl ListShared {
    fn lock_inner(&self) -> MutexGuard<'_, ListInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts `request`, superseding whatever was in flight.
    fn submit(self: &Arc<Self>, request: ListRequest) {
        let mut inner = self.lock_inner();
        inner.request_seq += 1;
        let seq = inner.request_seq;
        if let Some(previous) = inner.in_flight.take() {
            previous.abort();
        }
        inner.last_request = request.clone();

        match &request {
            ListRequest::All => {
                self.state.send_replace(ListViewState::Loading);
                self.searching.send_replace(false);
            }
            ListRequest::Search(_) => {
                self.searching.send_replace(true);
            }
        }
        debug!(seq, ?request, "list: request submitted");

        let shared = Arc::clone(self);
        inner.in_flight = Some(tokio::spawn(async move {
            let outcome = match &request {
                ListRequest::All => shared.source.fetch_all().await,
                ListRequest::Search(query) => shared.source.search_by_name(query).await,
            };
            shared.apply(seq, &request, outcome);
        }));
    }

    fn apply(
        &self,
        seq: u64,
        request: &ListRequest,
        outcome: Result<Vec<Country>, CatalogFailure>,
    ) {
        let mut inner = self.lock_inner();
        if inner.request_seq != seq {
            debug!(
                seq,
                latest = inner.request_seq,
                "list: stale response dropped"
            );
            return;
        }
        inner.in_flight = None;
        if request.is_search() {
            self.searching.send_replace(false);
        }

        let countries = match outcome {
            Ok(countries) => countries,
            Err(failure) if failure.is_not_found() && request.is_search() => {
                info!(seq, ?request, "list: search matched nothing");
                Vec::new()
            }
            Err(failure) => {
                warn!(seq, ?request, kind = ?failure.kind, detail = %failure.detail, "list: request failed");
                self.state.send_replace(ListViewState::Error {
                    message: failure.user_message().to_string(),
                });
                return;
            }
        };

        info!(seq, count = countries.len(), "list: results applied");
        inner.collection = countries;
        inner.current_page = 1;
        self.publish_page(&inner);
    }

    fn change_page(&self, target: impl FnOnce(usize) -> Option<usize>) -> bool {
        let mut inner = self.lock_inner();
        if !matches!(*self.state.borrow(), ListViewState::Success { .. }) {
            return false;
        }
        let last_page = total_pages(inner.collection.len(), self.page_size);
        let Some(page) = target(inner.current_page).filter(|page| (1..=last_page).contains(page))
        else {
            return false;
        };
        inner.current_page = page;
        self.publish_page(&inner);
        true
    }

    fn publish_page(&self, inner: &ListInner) {
        let page = paginate(&inner.collection, inner.current_page, self.page_size);
        self.state.send_replace(page.into());
    }
}

/// Controller behind the country list screen.
///
/// Construction publishes `Loading` and starts the unfiltered load. Dropping
/// the controller cancels the pending debounce timer and any in-flight
/// request; nothing is published afterwards.
pub struct ListController {
    shared: Arc<ListShared>,
    queries: QuerySender,
    intake: JoinHandle<()>,
}

impl ListController {
    /// Must be called from within a Tokio runtime.
    pub fn new(source: Arc<dyn CountrySource>, config: ListConfig) -> Self {
        let (state, _) = watch::channel(ListViewState::Loading);
        let (query, _) = watch::channel(String::new());
        let (searching, _) = watch::channel(false);
        let shared = Arc::new(ListShared {
            source,
            page_size: config.page_size,
            state,
            query,
            searching,
            inner: Mutex::new(ListInner {
                collection: Vec::new(),
                current_page: 1,
                last_request: ListRequest::All,
                request_seq: 0,
                in_flight: None,
            }),
        });

        shared.submit(ListRequest::All);

        let (queries, intents) = debounced_queries(config.debounce);
        let intake = tokio::spawn(run_intake(Arc::clone(&shared), intents));

        Self {
            shared,
            queries,
            intake,
        }
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.shared.page_size
    }

    pub fn state(&self) -> ListViewState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListViewState> {
        self.shared.state.subscribe()
    }

    pub fn state_stream(&self) -> WatchStream<ListViewState> {
        WatchStream::new(self.subscribe())
    }

    pub fn query(&self) -> String {
        self.shared.query.borrow().clone()
    }

    pub fn subscribe_query(&self) -> watch::Receiver<String> {
        self.shared.query.subscribe()
    }

    pub fn is_searching(&self) -> bool {
        *self.shared.searching.borrow()
    }

    pub fn subscribe_searching(&self) -> watch::Receiver<bool> {
        self.shared.searching.subscribe()
    }

    /// Records raw search input; the search itself runs after the debounce
    /// interval.
    pub fn on_query_change(&self, text: impl Into<String>) {
        let text = text.into();
        self.shared.query.send_if_modified(|current| {
            if *current == text {
                return false;
            }
            current.clone_from(&text);
            true
        });
        if !self.queries.push(text) {
            warn!("list: query channel closed, input ignored");
        }
    }

    /// Empties the query and returns to the unfiltered listing immediately.
    pub fn clear_query(&self) {
        self.shared.query.send_if_modified(|current| {
            let changed = !current.is_empty();
            current.clear();
            changed
        });
        if !self.queries.clear() {
            warn!("list: query channel closed, clear ignored");
        }
    }

    /// Re-issues the last triggering operation.
    pub fn retry(&self) {
        let request = self.shared.lock_inner().last_request.clone();
        info!(?request, "list: retry requested");
        self.shared.submit(request);
    }

    pub fn next_page(&self) -> bool {
        self.shared.change_page(|current| current.checked_add(1))
    }

    pub fn previous_page(&self) -> bool {
        self.shared.change_page(|current| current.checked_sub(1))
    }

    /// Returns `false`, leaving the state untouched, when `page` is out of
    /// range or no listing is shown.
    pub fn go_to_page(&self, page: usize) -> bool {
        self.shared.change_page(|_| Some(page))
    }
}

impl Drop for ListController {
    fn drop(&mut self) {
        self.intake.abort();
        let mut inner = self.shared.lock_inner();
        inner.request_seq += 1;
        if let Some(task) = inner.in_flight.take() {
            task.abort();
        }
    }
}

async fn run_intake(shared: Arc<ListShared>, mut intents: QueryIntents) {
    while let Some(intent) = intents.next().await {
        let request = if intent.is_blank() {
            ListRequest::All
        } else {
            ListRequest::Search(intent.text.trim().to_string())
        };
        debug!(intent_seq = intent.seq, ?request, "list: query intent received");
        shared.submit(request);
    }
}

#[cfg(test)]
#[path = "tests/list_controller_tests.rs"]
mod tests;
