use std::collections::HashSet;

use crate::view_model::FeedSnapshot;
use crate::{Effect, Page, PageKey, PagerConfig, Post, PostId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Error,
    EndOfStream,
}

/// Progress through the paged listing for one refresh epoch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageState {
    /// Key of the furthest page appended so far.
    pub last_loaded: Option<PageKey>,
    /// Key to request next; `None` before the first load and after the end.
    pub next_key: Option<PageKey>,
    pub status: LoadStatus,
    pub last_error: Option<String>,
    /// Key of the load currently running, or of the one that failed.
    pending_key: Option<PageKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerState {
    config: PagerConfig,
    generation: u64,
    items: Vec<Post>,
    seen: HashSet<PostId>,
    page: PageState,
    dirty: bool,
}

impl PagerState {
    pub fn new(config: PagerConfig) -> Self {
        Self {
            config: PagerConfig {
                page_size: config.page_size.max(1),
                ..config
            },
            generation: 0,
            items: Vec::new(),
            seen: HashSet::new(),
            page: PageState::default(),
            dirty: false,
        }
    }

    pub fn view(&self) -> FeedSnapshot {
        FeedSnapshot {
            generation: self.generation,
            items: self.items.clone(),
            status: self.page.status,
            error: self.page.last_error.clone(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn page_state(&self) -> &PageState {
        &self.page
    }

    pub fn items(&self) -> &[Post] {
        &self.items
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn reset(&mut self) {
        self.generation += 1;
        self.items.clear();
        self.seen.clear();
        self.page = PageState::default();
        self.dirty = true;
    }

    pub(crate) fn near_end(&self, index: usize) -> bool {
        index.saturating_add(self.config.prefetch_distance) >= self.items.len()
    }

    /// Starts the next sequential load if the listing is idle and not exhausted.
    pub(crate) fn request_next(&mut self) -> Option<Effect> {
        if self.page.status != LoadStatus::Idle {
            return None;
        }
        match (self.page.last_loaded, self.page.next_key) {
            (None, _) => Some(self.begin_load(None)),
            (Some(_), Some(next)) => Some(self.begin_load(Some(next))),
            (Some(_), None) => None,
        }
    }

    pub(crate) fn retry_failed(&mut self) -> Option<Effect> {
        if self.page.status != LoadStatus::Error {
            return None;
        }
        let key = self.page.pending_key;
        Some(self.begin_load(key))
    }

    pub(crate) fn begin_load(&mut self, key: Option<PageKey>) -> Effect {
        self.page.status = LoadStatus::Loading;
        self.page.pending_key = key;
        self.dirty = true;
        Effect::Load {
            generation: self.generation,
            key,
            page_size: self.config.page_size,
        }
    }

    /// Applies a finished load. Returns `false` when the result belongs to a
    /// superseded request and was dropped.
    pub(crate) fn apply_loaded(
        &mut self,
        generation: u64,
        key: Option<PageKey>,
        result: Result<Page<Post>, String>,
    ) -> bool {
        if generation != self.generation
            || self.page.status != LoadStatus::Loading
            || key != self.page.pending_key
        {
            return false;
        }

        match result {
            Ok(page) => {
                for post in page.items {
                    if self.seen.insert(post.id) {
                        self.items.push(post);
                    }
                }
                self.page.last_loaded = Some(page.key);
                self.page.next_key = page.next_key;
                self.page.pending_key = None;
                self.page.last_error = None;
                self.page.status = if page.next_key.is_some() {
                    LoadStatus::Idle
                } else {
                    LoadStatus::EndOfStream
                };
            }
            Err(message) => {
                self.page.status = LoadStatus::Error;
                self.page.last_error = Some(message);
            }
        }
        self.dirty = true;
        true
    }
}

impl Default for PagerState {
    fn default() -> Self {
        Self::new(PagerConfig::default())
    }
}
