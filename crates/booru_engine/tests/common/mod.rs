#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use booru_core::{PageKey, Post, Query, UserSummary};
use booru_engine::{FailureKind, HtmlPage, Subscription, Transport, TransportError};
use tokio::sync::oneshot;
use url::Url;

pub fn post(id: u64) -> Post {
    Post {
        id,
        tags: format!("tag_{id}"),
        author: "alice".to_string(),
        score: 0,
        rating: "s".to_string(),
        width: 1000,
        height: 800,
        preview_url: format!("https://img.example/preview/{id}.jpg"),
        preview_width: 150,
        preview_height: 120,
        sample_url: format!("https://img.example/sample/{id}.jpg"),
        sample_width: 500,
        sample_height: 400,
        file_url: format!("https://img.example/file/{id}.png"),
        jpeg_url: None,
    }
}

pub fn posts(ids: std::ops::Range<u64>) -> Vec<Post> {
    ids.map(post).collect()
}

pub fn network_error() -> TransportError {
    TransportError::new(FailureKind::Network, "connection reset")
}

type PostResponder =
    Box<dyn Fn(&str, PageKey, usize) -> Result<Vec<Post>, TransportError> + Send + Sync>;

/// In-memory board. Post responses come from a closure over the canonical
/// query string; any request can be held back behind a gate until released.
pub struct FakeTransport {
    base: Url,
    posts: PostResponder,
    users: Vec<UserSummary>,
    html: Mutex<Result<String, TransportError>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            base: Url::parse("https://board.example/").unwrap(),
            posts: Box::new(|_, _, _| Ok(Vec::new())),
            users: Vec::new(),
            html: Mutex::new(Ok(String::new())),
            gates: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_posts(
        mut self,
        respond: impl Fn(&str, PageKey, usize) -> Result<Vec<Post>, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.posts = Box::new(respond);
        self
    }

    pub fn with_users(mut self, users: Vec<UserSummary>) -> Self {
        self.users = users;
        self
    }

    pub fn with_html(self, html: Result<String, TransportError>) -> Self {
        self.set_html(html);
        self
    }

    /// Replaces the page served to later HTML requests.
    pub fn set_html(&self, html: Result<String, TransportError>) {
        *self.html.lock().unwrap() = html;
    }

    /// Holds the request labelled `label` (a query string, `html` or
    /// `user`) until the returned sender fires or is dropped.
    pub fn gate(&self, label: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(label.to_string(), rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn pass_gate(&self, label: &str, call: String) {
        self.calls.lock().unwrap().push(call);
        let gate = self.gates.lock().unwrap().remove(label);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    fn base_url(&self) -> &Url {
        &self.base
    }

    async fn fetch_posts(
        &self,
        query: &Query,
        page: PageKey,
        limit: usize,
    ) -> Result<Vec<Post>, TransportError> {
        let query = query.to_query_string();
        self.pass_gate(&query, format!("posts {query} page={page} limit={limit}"))
            .await;
        (self.posts)(&query, page, limit)
    }

    async fn fetch_user_by_name(&self, name: &str) -> Result<Vec<UserSummary>, TransportError> {
        self.pass_gate("user", format!("user {name}")).await;
        Ok(self
            .users
            .iter()
            .filter(|user| user.name == name)
            .cloned()
            .collect())
    }

    async fn fetch_html(&self, url: &str) -> Result<HtmlPage, TransportError> {
        self.pass_gate("html", format!("html {url}")).await;
        let html = self.html.lock().unwrap().clone();
        html.map(|html| HtmlPage {
            url: url.to_string(),
            html,
        })
    }
}

pub fn shared(transport: FakeTransport) -> Arc<FakeTransport> {
    Arc::new(transport)
}

/// Waits for the next value that satisfies `accept`, failing the test after five seconds.
pub async fn next_matching<T: Clone + Send + 'static>(
    subscription: &mut Subscription<T>,
    mut accept: impl FnMut(&T) -> bool,
) -> T {
    within(async {
        loop {
            let value = subscription.next().await.expect("publisher closed");
            if accept(&value) {
                return value;
            }
        }
    })
    .await
}

pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out")
}
