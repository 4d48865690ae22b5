use std::sync::{Mutex, PoisonError};

use futures_util::Stream;
use tokio::sync::broadcast::{self, error::RecvError};

const CHANNEL_CAPACITY: usize = 64;

/// Single-producer, multi-consumer value stream.
///
/// Keeps the latest value so a new subscriber starts from the current state,
/// then receives every later publication in order.
#[derive(Debug)]
pub struct Publisher<T> {
    latest: Mutex<T>,
    tx: broadcast::Sender<T>,
}

impl<T: Clone + Send + 'static> Publisher<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            latest: Mutex::new(initial),
            tx,
        }
    }

    pub fn publish(&self, value: T) {
        // The lock spans the send so a concurrent subscribe sees either the
        // old value plus this broadcast, or this value and nothing twice.
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        *latest = value.clone();
        let _ = self.tx.send(value);
    }

    pub fn latest(&self) -> T {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn subscribe(&self) -> Subscription<T> {
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        Subscription {
            pending: Some(latest.clone()),
            rx: self.tx.subscribe(),
        }
    }
}

#[derive(Debug)]
pub struct Subscription<T> {
    pending: Option<T>,
    rx: broadcast::Receiver<T>,
}

impl<T: Clone + Send + 'static> Subscription<T> {
    /// Next value, or `None` once the publisher is gone.
    ///
    /// A subscriber that falls more than the channel capacity behind skips
    /// ahead to the oldest value still buffered.
    pub async fn next(&mut self) -> Option<T> {
        if let Some(value) = self.pending.take() {
            return Some(value);
        }
        loop {
            match self.rx.recv().await {
                Ok(value) => return Some(value),
                Err(RecvError::Lagged(skipped)) => {
                    booru_logging::booru_debug!("subscriber lagged, skipped {} values", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Stops receiving. Dropping the subscription has the same effect.
    pub fn unsubscribe(self) {}

    pub fn into_stream(self) -> impl Stream<Item = T> {
        futures_util::stream::unfold(self, |mut subscription| async move {
            let value = subscription.next().await?;
            Some((value, subscription))
        })
    }
}
