//! Debounced query channel: turns raw keystroke-rate input into search intents.

use std::{
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use futures::Stream;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryIntent {
    pub seq: u64,
    pub text: String,
}

impl QueryIntent {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug)]
enum QueryInput {
    Text(String),
    Clear,
}

/// Input side of the channel. Cloning shares the same debounce timer.
#[derive(Debug, Clone)]
pub struct QuerySender {
    tx: mpsc::UnboundedSender<QueryInput>,
}

impl QuerySender {
    /// Returns `false` once the channel task has stopped.
    pub fn push(&self, text: impl Into<String>) -> bool {
        self.tx.send(QueryInput::Text(text.into())).is_ok()
    }

    /// Drops any pending input and emits an empty intent right away.
    pub fn clear(&self) -> bool {
        self.tx.send(QueryInput::Clear).is_ok()
    }
}

/// Output side of the channel. Dropping it stops the debounce task.
pub struct QueryIntents {
    rx: mpsc::UnboundedReceiver<QueryIntent>,
    task: JoinHandle<()>,
}

impl QueryIntents {
    pub async fn next(&mut self) -> Option<QueryIntent> {
        self.rx.recv().await
    }
}

impl Stream for QueryIntents {
    type Item = QueryIntent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for QueryIntents {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts a debounce task on the current Tokio runtime.
///
/// An intent is emitted once `interval` passes without new input, with its
/// text trimmed. A text equal to the last emitted one is never emitted
/// again; the last emitted text starts out empty, matching an unfiltered
/// listing.
pub fn debounced_queries(interval: Duration) -> (QuerySender, QueryIntents) {
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (intent_tx, intent_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_debouncer(input_rx, intent_tx, interval));
    (
        QuerySender { tx: input_tx },
        QueryIntents {
            rx: intent_rx,
            task,
        },
    )
}

struct Emitter {
    tx: mpsc::UnboundedSender<QueryIntent>,
    last_emitted: String,
    next_seq: u64,
}

impl Emitter {
    /// Returns `false` when nobody listens anymore. Surrounding whitespace
    /// never makes two texts distinct.
    fn emit(&mut self, text: String) -> bool {
        let text = text.trim().to_string();
        if text == self.last_emitted {
            debug!(query = %text, "query: unchanged after debounce, skipped");
            return true;
        }
        self.next_seq += 1;
        let intent = QueryIntent {
            seq: self.next_seq,
            text: text.clone(),
        };
        debug!(seq = intent.seq, query = %intent.text, "query: intent emitted");
        self.last_emitted = text;
        self.tx.send(intent).is_ok()
    }
}

async fn run_debouncer(
    mut inputs: mpsc::UnboundedReceiver<QueryInput>,
    intents: mpsc::UnboundedSender<QueryIntent>,
    interval: Duration,
) {
    let mut emitter = Emitter {
        tx: intents,
        last_emitted: String::new(),
        next_seq: 0,
    };
    let mut pending: Option<(String, Instant)> = None;

    loop {
        let deadline = pending.as_ref().map(|(_, at)| *at);
        tokio::select! {
            biased;
            input = inputs.recv() => match input {
                Some(QueryInput::Text(text)) => {
                    pending = Some((text, Instant::now() + interval));
                }
                Some(QueryInput::Clear) => {
                    pending = None;
                    if !emitter.emit(String::new()) {
                        break;
                    }
                }
                None => break,
            },
            _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some((text, _)) = pending.take() {
                    if !emitter.emit(text) {
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
