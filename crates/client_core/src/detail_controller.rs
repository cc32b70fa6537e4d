//! Detail State Controller for a single country.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::domain::Country;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use crate::source::CountrySource;

pub const INVALID_CODE_MESSAGE: &str = "Invalid country code.";

#[derive(Debug, Clone, PartialEq)]
pub enum DetailViewState {
    Loading,
    Success { country: Country },
    Error { message: String },
}

#[derive(Default)]
struct DetailInner {
    load_seq: u64,
    in_flight: Option<JoinHandle<()>>,
}

struct DetailShared {
    source: Arc<dyn CountrySource>,
    code: Option<String>,
    state: watch::Sender<DetailViewState>,
    inner: Mutex<DetailInner>,
}

impl DetailShared {
    fn lock_inner(&self) -> MutexGuard<'_, DetailInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load(self: &Arc<Self>) {
        let mut inner = self.lock_inner();
        inner.load_seq += 1;
        let seq = inner.load_seq;
        if let Some(previous) = inner.in_flight.take() {
            previous.abort();
        }

        let Some(code) = self.code.clone() else {
            warn!("detail: no usable country code, skipping request");
            self.state.send_replace(DetailViewState::Error {
                message: INVALID_CODE_MESSAGE.to_string(),
            });
            return;
        };

        self.state.send_replace(DetailViewState::Loading);
        let shared = Arc::clone(self);
        inner.in_flight = Some(tokio::spawn(async move {
            let outcome = shared.source.fetch_by_code(&code).await;
            let mut inner = shared.lock_inner();
            if inner.load_seq != seq {
                debug!(seq, code = %code, "detail: stale response dropped");
                return;
            }
            inner.in_flight = None;
            let next = match outcome {
                Ok(country) => DetailViewState::Success { country },
                Err(failure) => {
                    warn!(code = %code, kind = ?failure.kind, detail = %failure.detail, "detail: lookup failed");
                    DetailViewState::Error {
                        message: failure.user_message().to_string(),
                    }
                }
            };
            shared.state.send_replace(next);
        }));
    }
}

/// Controller behind the country detail screen. The code is fixed for the
/// controller's lifetime; a blank or absent code never reaches the source.
pub struct DetailController {
    shared: Arc<DetailShared>,
}

impl DetailController {
    /// Starts loading right away. Must be called from within a Tokio runtime.
    pub fn new(source: Arc<dyn CountrySource>, code: Option<String>) -> Self {
        let code = code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty());
        let (state, _) = watch::channel(DetailViewState::Loading);
        let controller = Self {
            shared: Arc::new(DetailShared {
                source,
                code,
                state,
                inner: Mutex::new(DetailInner::default()),
            }),
        };
        controller.load();
        controller
    }

    pub fn code(&self) -> Option<&str> {
        self.shared.code.as_deref()
    }

    pub fn state(&self) -> DetailViewState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailViewState> {
        self.shared.state.subscribe()
    }

    pub fn load(&self) {
        self.shared.load();
    }

    pub fn retry(&self) {
        self.load();
    }
}

impl Drop for DetailController {
    fn drop(&mut self) {
        let mut inner = self.shared.lock_inner();
        inner.load_seq += 1;
        if let Some(task) = inner.in_flight.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/detail_controller_tests.rs"]
mod tests;
