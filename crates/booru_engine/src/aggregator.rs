use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use booru_core::profile::{favorites_query, uploads_query, FAVORITES, UPLOADS};
use booru_core::{PostId, ProfileEntry, ProfileRequest, ProfileState, Query, FIRST_PAGE};
use booru_logging::{booru_debug, booru_info, booru_warn};
use tokio::task::{JoinHandle, JoinSet};
use url::Url;

use crate::publish::{Publisher, Subscription};
use crate::scrape::parse_profile;
use crate::transport::{avatar_url, profile_url};
use crate::{IdentityProvider, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileSettings {
    /// Posts fetched for each of the Favorites and Uploads sections.
    pub page_size: usize,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

/// Builds a user's profile list from the profile HTML page plus the
/// Favorites and Uploads post queries, all running concurrently.
///
/// Each finished sub-task republishes the whole list so far. The busy stream
/// reads `true` for the duration of a run and turns `false` only after every
/// sub-task has finished, whether it succeeded or not. Dropping a run's
/// future aborts its sub-tasks and also ends the busy phase.
pub struct ProfileAggregator {
    transport: Arc<dyn Transport>,
    identity: Arc<dyn IdentityProvider>,
    request: ProfileRequest,
    settings: ProfileSettings,
    resolved: Mutex<Option<(String, u64)>>,
    running: AtomicBool,
    background_for: Mutex<Option<PostId>>,
    entries: Publisher<Vec<ProfileEntry>>,
    avatar: Publisher<Option<PostId>>,
    background: Publisher<Option<String>>,
    busy: Publisher<bool>,
}

impl ProfileAggregator {
    pub fn new(
        transport: Arc<dyn Transport>,
        identity: Arc<dyn IdentityProvider>,
        request: ProfileRequest,
        settings: ProfileSettings,
    ) -> Arc<Self> {
        let resolved = match (&request.name, request.user_id) {
            (Some(name), Some(id)) => Some((name.clone(), id)),
            _ => None,
        };
        Arc::new(Self {
            transport,
            identity,
            request,
            settings,
            resolved: Mutex::new(resolved),
            running: AtomicBool::new(false),
            background_for: Mutex::new(None),
            entries: Publisher::new(Vec::new()),
            avatar: Publisher::new(None),
            background: Publisher::new(None),
            busy: Publisher::new(false),
        })
    }

    pub fn entries(&self) -> Subscription<Vec<ProfileEntry>> {
        self.entries.subscribe()
    }

    pub fn avatar(&self) -> Subscription<Option<PostId>> {
        self.avatar.subscribe()
    }

    /// Sample image URL of the avatar post, for a backdrop.
    pub fn background(&self) -> Subscription<Option<String>> {
        self.background.subscribe()
    }

    pub fn busy(&self) -> Subscription<bool> {
        self.busy.subscribe()
    }

    pub fn snapshot(&self) -> Vec<ProfileEntry> {
        self.entries.latest()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.latest()
    }

    pub fn face_url(&self, user_id: u64) -> Option<Url> {
        avatar_url(self.transport.base_url(), user_id).ok()
    }

    /// Resolves the account and runs one aggregation. Returns `false` when
    /// the account could not be resolved (for example while signed out).
    pub async fn aggregate(self: &Arc<Self>) -> bool {
        match self.resolve().await {
            Some((name, user_id)) => {
                self.run(&name, user_id).await;
                true
            }
            None => false,
        }
    }

    /// Runs again for the last resolved account.
    pub async fn refresh(self: &Arc<Self>) -> bool {
        self.aggregate().await
    }

    /// Username and numeric id of the profile to show.
    pub async fn resolve(&self) -> Option<(String, u64)> {
        let identity = self.identity.current();
        let name = match &self.request.name {
            Some(name) => name.clone(),
            None if identity.is_signed_in() => identity.name.clone(),
            None => return None,
        };

        let cached = lock(&self.resolved).clone();
        if let Some((cached_name, id)) = cached {
            if cached_name == name {
                return Some((cached_name, id));
            }
        }

        let known_id = match &self.request.name {
            Some(_) => self.request.user_id,
            None => identity.user_id.filter(|id| *id != 0),
        };
        let user_id = match known_id {
            Some(id) => id,
            None => self.lookup_user_id(&name).await?,
        };

        *lock(&self.resolved) = Some((name.clone(), user_id));
        Some((name, user_id))
    }

    /// One busy phase for `name`/`user_id`. Ignored while a run is in progress.
    pub async fn run(self: &Arc<Self>, name: &str, user_id: u64) {
        if self.running.swap(true, Ordering::AcqRel) {
            booru_debug!("profile aggregation for {} already running", name);
            return;
        }
        let _guard = RunGuard { aggregator: self };
        booru_info!("aggregating profile of {} ({})", name, user_id);
        self.busy.publish(true);

        let state = Arc::new(Mutex::new(ProfileState::new(name)));
        let mut tasks = JoinSet::new();

        tasks.spawn(self.clone().scrape(state.clone(), user_id));
        for (section, query) in [
            (FAVORITES, favorites_query(name)),
            (UPLOADS, uploads_query(name)),
        ] {
            tasks.spawn(self.clone().fetch_section(state.clone(), section, query));
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                if err.is_panic() {
                    std::panic::resume_unwind(err.into_panic());
                }
                booru_warn!("profile task cancelled: {}", err);
            }
        }

        booru_info!("profile of {} aggregated", name);
    }

    /// For own-profile requests: aggregates whenever a signed-in identity is
    /// published and nothing has been aggregated yet.
    pub fn watch_identity(self: &Arc<Self>) -> JoinHandle<()> {
        let this = self.clone();
        let mut changes = self.identity.subscribe();
        tokio::spawn(async move {
            loop {
                let signed_in = changes.borrow_and_update().is_signed_in();
                if this.request.is_own() && signed_in && this.entries.latest().is_empty() {
                    this.aggregate().await;
                }
                if changes.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    async fn lookup_user_id(&self, name: &str) -> Option<u64> {
        match self.transport.fetch_user_by_name(name).await {
            Ok(users) => users.first().map(|user| user.id),
            Err(err) => {
                booru_warn!("user lookup for {} failed: {}", name, err);
                None
            }
        }
    }

    async fn scrape(self: Arc<Self>, state: Arc<Mutex<ProfileState>>, user_id: u64) {
        let page = match profile_url(self.transport.base_url(), user_id) {
            Ok(url) => self.transport.fetch_html(url.as_str()).await,
            Err(err) => Err(err),
        };
        let page = match page {
            Ok(page) => page,
            Err(err) => {
                booru_warn!("profile page of user {} unavailable: {}", user_id, err);
                return;
            }
        };

        let scraped = parse_profile(&page.html);
        if let Some(avatar) = scraped.avatar_id {
            self.avatar.publish(Some(avatar));
            self.spawn_background(avatar);
        }
        self.publish_with(&state, |profile| profile.apply_scrape(&scraped));
    }

    async fn fetch_section(
        self: Arc<Self>,
        state: Arc<Mutex<ProfileState>>,
        section: &'static str,
        query: String,
    ) {
        let query = Query::parse(&query);
        let posts = match self
            .transport
            .fetch_posts(&query, FIRST_PAGE, self.settings.page_size)
            .await
        {
            Ok(posts) => posts,
            Err(err) => {
                booru_warn!("{} query `{}` failed: {}", section, query, err);
                Vec::new()
            }
        };
        booru_debug!("{} returned {} posts", section, posts.len());
        self.publish_with(&state, |profile| profile.append_posts(section, posts));
    }

    /// Fetches the avatar post to learn its sample image, once per distinct
    /// avatar. Runs detached from the busy phase.
    fn spawn_background(self: &Arc<Self>, avatar: PostId) {
        {
            let mut fetched = lock(&self.background_for);
            if *fetched == Some(avatar) {
                return;
            }
            *fetched = Some(avatar);
        }
        let this = self.clone();
        tokio::spawn(async move {
            let query = Query::new().with_id(avatar);
            match this.transport.fetch_posts(&query, FIRST_PAGE, 1).await {
                Ok(posts) => {
                    let current = lock(&this.background_for);
                    // A newer avatar may have replaced this one meanwhile.
                    if *current != Some(avatar) {
                        return;
                    }
                    if let Some(post) = posts.into_iter().next() {
                        this.background.publish(Some(post.sample_url));
                    }
                }
                Err(err) => {
                    booru_warn!("avatar post {} unavailable: {}", avatar, err);
                    let mut current = lock(&this.background_for);
                    if *current == Some(avatar) {
                        *current = None;
                    }
                }
            }
        });
    }

    /// Mutates the run state and publishes the resulting snapshot under one lock,
    /// so publications follow mutation order.
    fn publish_with(&self, state: &Mutex<ProfileState>, mutate: impl FnOnce(&mut ProfileState)) {
        let mut profile = lock(state);
        mutate(&mut profile);
        self.entries.publish(profile.snapshot());
    }
}

/// Ends a busy phase when `run` returns or its future is dropped.
struct RunGuard<'a> {
    aggregator: &'a ProfileAggregator,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.aggregator.busy.publish(false);
        self.aggregator.running.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
