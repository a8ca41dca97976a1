//! # Domain Event Outbox
//!
//! Committed transitions are announced as [`CaseTransitioned`] events on an
//! in-process outbox. Delivery (push, SMS, mail) is somebody else's job: a
//! notifier drains the outbox through `GET /v1/events`.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use utoipa::ToSchema;

use docket_core::{ActorRef, CaseId, Timestamp};
use docket_state::{CaseAction, CaseState};

/// A committed status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CaseTransitioned {
    #[schema(value_type = String)]
    pub case_id: CaseId,
    #[schema(value_type = String)]
    pub from: CaseState,
    #[schema(value_type = String)]
    pub to: CaseState,
    #[schema(value_type = String)]
    pub action: CaseAction,
    #[schema(value_type = Object)]
    pub by: ActorRef,
    #[schema(value_type = String)]
    pub at: Timestamp,
    /// Case version after the commit.
    pub version: u64,
}

/// Default number of undelivered events kept before the oldest are dropped.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 10_000;

/// Bounded FIFO of events waiting for the notifier.
///
/// When full, pushing evicts the oldest pending event and counts the loss in
/// `docket_outbox_dropped_total`.
#[derive(Debug, Clone)]
pub struct Outbox {
    inner: Arc<Mutex<OutboxInner>>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct OutboxInner {
    queue: VecDeque<CaseTransitioned>,
    dropped: u64,
}

impl Outbox {
    /// Create an empty outbox with [`DEFAULT_OUTBOX_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_OUTBOX_CAPACITY)
    }

    /// Create an empty outbox holding at most `capacity` events (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(OutboxInner::default())),
            capacity: capacity.max(1),
        }
    }

    /// Enqueue an event, evicting the oldest one if the outbox is full.
    pub fn push(&self, event: CaseTransitioned) {
        let mut inner = self.inner.lock();
        if inner.queue.len() >= self.capacity {
            if let Some(evicted) = inner.queue.pop_front() {
                inner.dropped += 1;
                tracing::warn!(
                    case_id = %evicted.case_id,
                    version = evicted.version,
                    capacity = self.capacity,
                    "outbox full, dropping oldest event"
                );
                metrics::counter!("docket_outbox_dropped_total").increment(1);
            }
        }
        inner.queue.push_back(event);
    }

    /// Remove and return up to `max` events, oldest first.
    pub fn drain(&self, max: usize) -> Vec<CaseTransitioned> {
        let mut inner = self.inner.lock();
        let n = max.min(inner.queue.len());
        inner.queue.drain(..n).collect()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().queue.is_empty()
    }

    /// Maximum number of pending events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events evicted since creation because the outbox was full.
    pub fn dropped(&self) -> u64 {
        self.inner.lock().dropped
    }
}

impl Default for Outbox {
    fn default() -> Self {
        Self::new()
    }
}
