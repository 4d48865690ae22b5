use serde::{Deserialize, Serialize};

use crate::Rating;

/// 1-based page index understood by the post listing.
pub type PageKey = u32;

pub const FIRST_PAGE: PageKey = 1;

/// One batch of items fetched for a single key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub key: PageKey,
    pub items: Vec<T>,
    pub next_key: Option<PageKey>,
}

impl<T> Page<T> {
    /// Builds the page returned for a load of `key` with `page_size`.
    ///
    /// A missing key means the first page. A full page implies more may
    /// follow; anything shorter marks the end of the listing.
    pub fn new(key: Option<PageKey>, page_size: usize, items: Vec<T>) -> Self {
        let key = key.unwrap_or(FIRST_PAGE);
        let next_key = next_key_after(key, page_size, items.len());
        Self {
            key,
            items,
            next_key,
        }
    }
}

pub fn next_key_after(key: PageKey, page_size: usize, returned: usize) -> Option<PageKey> {
    if returned == page_size {
        key.checked_add(1)
    } else {
        None
    }
}

/// Pager tuning. `rating_floor` is applied to every page request and cannot
/// be overridden by the query a caller passes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    pub page_size: usize,
    /// Load the next page once the consumer shows an item this close to the end.
    pub prefetch_distance: usize,
    pub rating_floor: Rating,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            prefetch_distance: 20,
            rating_floor: Rating::Safe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_maps_to_first_page() {
        let page = Page::new(None, 2, vec!['a', 'b']);
        assert_eq!(page.key, FIRST_PAGE);
        assert_eq!(page.next_key, Some(2));
    }

    #[test]
    fn oversized_page_is_treated_as_last() {
        assert_eq!(next_key_after(3, 2, 5), None);
    }

    #[test]
    fn last_representable_key_has_no_successor() {
        assert_eq!(next_key_after(PageKey::MAX, 1, 1), None);
    }
}
