use crate::{Page, PageKey, Post};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Drop everything and start again from the first page.
    Refresh,
    /// Consumer asked for the next page.
    LoadMore,
    /// Consumer displayed the item at this index; may trigger a prefetch.
    ItemVisible(usize),
    /// Re-issue the load that last failed.
    Retry,
    /// A load finished. `generation` identifies the refresh epoch it was issued in.
    PageLoaded {
        generation: u64,
        key: Option<PageKey>,
        result: Result<Page<Post>, String>,
    },
}
