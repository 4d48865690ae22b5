use std::sync::Arc;

use booru_core::{update, Effect, FeedSnapshot, Msg, PagerConfig, PagerState, Query};
use booru_logging::{booru_debug, booru_warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::publish::{Publisher, Subscription};
use crate::source::{PagingSource, PostPagingSource};
use crate::Transport;

/// Incrementally growing post list backed by a [`PagingSource`].
///
/// A driver task owns the pager state and applies commands one at a time, so
/// loads for one pager never overlap. The first page is requested on
/// construction. Dropping the pager stops the driver and any running load.
pub struct Pager {
    cmd_tx: mpsc::UnboundedSender<Msg>,
    snapshots: Arc<Publisher<FeedSnapshot>>,
    shutdown: CancellationToken,
}

impl Pager {
    /// Starts the driver on the current Tokio runtime.
    pub fn new(source: Arc<dyn PagingSource>, config: PagerConfig) -> Self {
        let state = PagerState::new(config);
        let snapshots = Arc::new(Publisher::new(state.view()));
        let shutdown = CancellationToken::new();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        tokio::spawn(drive(
            state,
            source,
            cmd_rx,
            cmd_tx.clone(),
            snapshots.clone(),
            shutdown.clone(),
        ));

        let pager = Self {
            cmd_tx,
            snapshots,
            shutdown,
        };
        pager.send(Msg::LoadMore);
        pager
    }

    /// Pager over the post listing for `query`, filtered by the config's rating floor.
    pub fn for_query(transport: Arc<dyn Transport>, query: Query, config: PagerConfig) -> Self {
        let source = PostPagingSource::new(transport, query, config.rating_floor);
        Self::new(Arc::new(source), config)
    }

    /// Current snapshot followed by later ones. A consumer that falls more
    /// than 64 snapshots behind skips the ones it missed; the newest is always
    /// delivered eventually.
    pub fn stream(&self) -> Subscription<FeedSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshots.latest()
    }

    pub fn refresh(&self) {
        self.send(Msg::Refresh);
    }

    pub fn retry(&self) {
        self.send(Msg::Retry);
    }

    pub fn load_more(&self) {
        self.send(Msg::LoadMore);
    }

    /// Reports that the consumer rendered the item at `index`.
    pub fn item_visible(&self, index: usize) {
        self.send(Msg::ItemVisible(index));
    }

    fn send(&self, msg: Msg) {
        if self.cmd_tx.send(msg).is_err() {
            booru_warn!("pager driver has stopped; command dropped");
        }
    }
}

impl Drop for Pager {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn drive(
    mut state: PagerState,
    source: Arc<dyn PagingSource>,
    mut cmd_rx: mpsc::UnboundedReceiver<Msg>,
    cmd_tx: mpsc::UnboundedSender<Msg>,
    snapshots: Arc<Publisher<FeedSnapshot>>,
    shutdown: CancellationToken,
) {
    let mut in_flight: Option<JoinHandle<()>> = None;

    loop {
        let msg = tokio::select! {
            _ = shutdown.cancelled() => break,
            msg = cmd_rx.recv() => match msg {
                Some(msg) => msg,
                None => break,
            },
        };

        if let Msg::PageLoaded { generation, key, .. } = &msg {
            if *generation != state.generation() {
                booru_debug!("discarding page {:?} from superseded generation {}", key, generation);
            }
        }

        let (next, effects) = update(state, msg);
        state = next;
        if state.consume_dirty() {
            snapshots.publish(state.view());
        }

        for effect in effects {
            match effect {
                Effect::Load {
                    generation,
                    key,
                    page_size,
                } => {
                    if let Some(previous) = in_flight.take() {
                        previous.abort();
                    }
                    booru_debug!("loading page {:?} (generation {})", key, generation);
                    let source = source.clone();
                    let cmd_tx = cmd_tx.clone();
                    in_flight = Some(tokio::spawn(async move {
                        let result = source.load(key, page_size).await.map_err(|err| {
                            booru_warn!("page {:?} failed: {}", key, err);
                            err.to_string()
                        });
                        let _ = cmd_tx.send(Msg::PageLoaded {
                            generation,
                            key,
                            result,
                        });
                    }));
                }
            }
        }
    }

    if let Some(load) = in_flight {
        load.abort();
    }
}
