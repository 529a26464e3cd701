use std::{
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use dashmap::DashMap;
use futures::Stream;
use tokio::{sync::mpsc, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_COUNTER_INTERVAL: Duration = Duration::from_secs(2);

/// Counts buffered per subscriber before its timer waits for the reader.
pub const COUNTER_BUFFER: usize = 16;

/// Hands out per-subscriber counters, each driven by its own timer task.
#[derive(Clone, Debug)]
pub struct CounterHub {
    interval: Duration,
    subscribers: Arc<DashMap<Uuid, CancellationToken>>,
}

impl Default for CounterHub {
    fn default() -> Self {
        CounterHub::new(DEFAULT_COUNTER_INTERVAL)
    }
}

impl CounterHub {
    pub fn new(interval: Duration) -> Self {
        CounterHub {
            interval,
            subscribers: Arc::new(DashMap::new()),
        }
    }

    /// Starts a counter emitting 0 right away, then one more every interval.
    ///
    /// Must be called within a Tokio runtime.
    pub fn subscribe(&self) -> CounterSubscription {
        let id = Uuid::new_v4();
        let token = CancellationToken::new();
        let (sender, receiver) = mpsc::channel(COUNTER_BUFFER);
        self.subscribers.insert(id, token.clone());

        let interval = self.interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut count = 0;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if sender.send(count).await.is_err() {
                            break;
                        }
                        count += 1;
                    }
                }
            }
            debug!("counter {} stopped at {}", id, count);
        });

        CounterSubscription {
            id,
            hub: self.clone(),
            receiver,
        }
    }

    /// Stops the timer of a subscriber. Returns whether it was still running.
    pub fn cancel(&self, id: &Uuid) -> bool {
        match self.subscribers.remove(id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn active_subscribers(&self) -> usize {
        self.subscribers.len()
    }
}

/// The counter values of one subscriber. Dropping it cancels its timer.
#[derive(Debug)]
pub struct CounterSubscription {
    id: Uuid,
    hub: CounterHub,
    receiver: mpsc::Receiver<i32>,
}

impl CounterSubscription {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Stream for CounterSubscription {
    type Item = i32;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<i32>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for CounterSubscription {
    fn drop(&mut self) {
        self.hub.cancel(&self.id);
    }
}
