//! Plain-text rendering of snapshot lists.
//!
//! Each new snapshot is diffed against what was printed last, so only
//! inserted, removed and changed rows are written.
use booru_core::{apply, diff, DiffItem, DiffOp, FeedSnapshot, LoadStatus, Post, ProfileEntry};

pub struct ListRenderer<T> {
    shown: Vec<T>,
    describe: fn(&T) -> String,
}

impl<T: DiffItem> ListRenderer<T> {
    pub fn new(describe: fn(&T) -> String) -> Self {
        Self {
            shown: Vec::new(),
            describe,
        }
    }

    /// Lines describing how `next` differs from the previously rendered list.
    pub fn update(&mut self, next: &[T]) -> Vec<String> {
        let ops = diff(&self.shown, next);
        let lines = ops
            .iter()
            .map(|op| match op {
                DiffOp::Insert { pos, item } => format!("+{pos:>4} {}", (self.describe)(item)),
                DiffOp::Remove { pos } => format!("-{pos:>4}"),
                DiffOp::Change { pos, item } => format!("~{pos:>4} {}", (self.describe)(item)),
            })
            .collect();
        apply(&mut self.shown, &ops);
        lines
    }
}

pub fn describe_post(post: &Post) -> String {
    format!(
        "#{} {}x{} score {} [{}] {}",
        post.id, post.width, post.height, post.score, post.rating, post.sample_url
    )
}

pub fn describe_entry(entry: &ProfileEntry) -> String {
    match entry {
        ProfileEntry::Title { name, query: None } => format!("== {name} =="),
        ProfileEntry::Title {
            name,
            query: Some(query),
        } => format!("== {name} == ({query})"),
        ProfileEntry::Tag { name, query } => format!("  {name}  -> {query}"),
        ProfileEntry::Image(post) => format!("  {}", describe_post(post)),
    }
}

pub fn status_line(snapshot: &FeedSnapshot) -> Option<String> {
    match snapshot.status {
        LoadStatus::Loading if snapshot.is_refreshing() => Some("loading...".to_string()),
        LoadStatus::Error => Some(format!(
            "load failed: {}",
            snapshot.retry_message().unwrap_or("unknown error")
        )),
        LoadStatus::EndOfStream => Some(format!("end of feed ({} posts)", snapshot.items.len())),
        _ => None,
    }
}
