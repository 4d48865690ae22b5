use crate::PageKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch one page. Any load still running from an earlier request is
    /// superseded by this one.
    Load {
        generation: u64,
        key: Option<PageKey>,
        page_size: usize,
    },
}
