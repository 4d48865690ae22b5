use crate::{LoadStatus, Post};

/// Immutable picture of a pager: everything loaded so far plus where loading stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedSnapshot {
    /// Refresh epoch this snapshot belongs to.
    pub generation: u64,
    pub items: Vec<Post>,
    pub status: LoadStatus,
    /// Message of the most recent failed load, shown next to the retry action.
    pub error: Option<String>,
}

impl FeedSnapshot {
    pub fn is_refreshing(&self) -> bool {
        self.status == LoadStatus::Loading && self.items.is_empty()
    }

    pub fn end_reached(&self) -> bool {
        self.status == LoadStatus::EndOfStream
    }

    pub fn retry_message(&self) -> Option<&str> {
        match self.status {
            LoadStatus::Error => self.error.as_deref(),
            _ => None,
        }
    }
}
