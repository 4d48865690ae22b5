use std::sync::Arc;

use booru_core::{Page, PageKey, Post, Query, Rating, FIRST_PAGE};

use crate::{Transport, TransportError};

/// Fetches one page per key. Failures come back as `Err` so the caller can
/// surface them without tearing down its stream.
#[async_trait::async_trait]
pub trait PagingSource: Send + Sync {
    async fn load(&self, key: Option<PageKey>, page_size: usize) -> Result<Page<Post>, TransportError>;
}

/// Post listing for a query, with a rating floor forced onto every request.
pub struct PostPagingSource {
    transport: Arc<dyn Transport>,
    query: Query,
}

impl PostPagingSource {
    pub fn new(transport: Arc<dyn Transport>, query: Query, rating_floor: Rating) -> Self {
        let query = match rating_floor {
            Rating::None => query,
            floor => query.with_rating(floor),
        };
        Self { transport, query }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }
}

#[async_trait::async_trait]
impl PagingSource for PostPagingSource {
    async fn load(&self, key: Option<PageKey>, page_size: usize) -> Result<Page<Post>, TransportError> {
        let page = key.unwrap_or(FIRST_PAGE);
        let posts = self
            .transport
            .fetch_posts(&self.query, page, page_size)
            .await?;
        Ok(Page::new(Some(page), page_size, posts))
    }
}
