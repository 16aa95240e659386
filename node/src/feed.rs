//! Live report feed.
//!
//! A subscription yields a full snapshot of the matching reports as soon as
//! it is polled, then a fresh snapshot after every committed change. A
//! subscriber that falls behind the change channel skips straight to the
//! latest state instead of replaying every intermediate change.
//!
//! The change channel only carries writes made through this process. A
//! polling subscription also re-reads the store on an interval and yields
//! whenever the snapshot differs, which picks up writes from other processes
//! sharing the same database.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, Stream};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::time::{Instant, Interval, MissedTickBehavior};

use unswachh_store::{ReportFilter, ReportStore, StoreError};
use unswachh_types::Report;

use crate::ReportEvent;

/// Hands out feed subscriptions over one store and its change channel.
#[derive(Clone)]
pub struct ReportFeed {
    store: Arc<dyn ReportStore>,
    events: broadcast::Sender<ReportEvent>,
}

impl ReportFeed {
    pub fn new(store: Arc<dyn ReportStore>, events: broadcast::Sender<ReportEvent>) -> Self {
        Self { store, events }
    }

    pub fn subscribe(&self, filter: ReportFilter) -> FeedSubscription {
        FeedSubscription {
            store: Arc::clone(&self.store),
            filter,
            rx: self.events.subscribe(),
            primed: false,
            poll: None,
            last: None,
        }
    }

    /// Like [`subscribe`](Self::subscribe), but also re-reads the store
    /// every `every` and yields when the matching reports changed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe_polling(&self, filter: ReportFilter, every: Duration) -> FeedSubscription {
        let mut interval = tokio::time::interval_at(Instant::now() + every, every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        FeedSubscription {
            poll: Some(interval),
            ..self.subscribe(filter)
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}

/// One subscriber's view of the feed. Dropping it unsubscribes.
pub struct FeedSubscription {
    store: Arc<dyn ReportStore>,
    filter: ReportFilter,
    rx: broadcast::Receiver<ReportEvent>,
    primed: bool,
    poll: Option<Interval>,
    /// Last snapshot handed out, kept only for polling subscriptions.
    last: Option<Vec<Report>>,
}

enum Wake {
    Event,
    Poll,
}

impl FeedSubscription {
    pub fn filter(&self) -> ReportFilter {
        self.filter
    }

    /// Next snapshot, or `None` once the store side has shut down.
    pub async fn next(&mut self) -> Option<Result<Vec<Report>, StoreError>> {
        if !self.primed {
            self.primed = true;
            let snapshot = self.snapshot();
            self.remember(&snapshot);
            return Some(snapshot);
        }

        loop {
            let wake = match self.poll.as_mut() {
                Some(interval) => tokio::select! {
                    received = self.rx.recv() => event_received(received).map(|()| Wake::Event),
                    _ = interval.tick() => Some(Wake::Poll),
                },
                None => event_received(self.rx.recv().await).map(|()| Wake::Event),
            }?;

            if let Wake::Event = wake {
                self.drain();
            }
            let snapshot = self.snapshot();
            if let (Wake::Poll, Ok(current), Some(last)) = (&wake, &snapshot, &self.last) {
                if current == last {
                    continue;
                }
            }
            self.remember(&snapshot);
            return Some(snapshot);
        }
    }

    /// Everything already queued is covered by the next snapshot.
    fn drain(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    fn remember(&mut self, snapshot: &Result<Vec<Report>, StoreError>) {
        if self.poll.is_some() {
            if let Ok(reports) = snapshot {
                self.last = Some(reports.clone());
            }
        }
    }

    fn snapshot(&self) -> Result<Vec<Report>, StoreError> {
        self.store.list(self.filter)
    }

    /// Stop receiving updates.
    pub fn unsubscribe(self) {}

    /// Adapt into a [`Stream`] of snapshots.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<Report>, StoreError>> + Send {
        stream::unfold(self, |mut sub| async move {
            let item = sub.next().await?;
            Some((item, sub))
        })
    }
}

fn event_received(received: Result<ReportEvent, RecvError>) -> Option<()> {
    match received {
        Ok(event) => {
            tracing::trace!(report = %event.report_id(), "feed change");
            Some(())
        }
        Err(RecvError::Lagged(skipped)) => {
            tracing::debug!(skipped, "feed subscriber lagged; coalescing");
            Some(())
        }
        Err(RecvError::Closed) => None,
    }
}
