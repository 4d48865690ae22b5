use serde::{Deserialize, Serialize};

use crate::{DiffItem, Post, PostId};

/// One row of the aggregated profile list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileEntry {
    /// Section header. `query` is the drill-down for the whole section, if any.
    Title { name: String, query: Option<String> },
    /// Clickable facet or statistic.
    Tag { name: String, query: String },
    Image(Post),
}

impl ProfileEntry {
    pub fn title(name: impl Into<String>, query: Option<String>) -> Self {
        ProfileEntry::Title {
            name: name.into(),
            query,
        }
    }

    pub fn tag(name: impl Into<String>, query: impl Into<String>) -> Self {
        ProfileEntry::Tag {
            name: name.into(),
            query: query.into(),
        }
    }

    /// The query a click on this entry opens, if it has one.
    pub fn drill_down(&self) -> Option<String> {
        match self {
            ProfileEntry::Title { query, .. } => query.clone(),
            ProfileEntry::Tag { query, .. } => Some(query.clone()),
            ProfileEntry::Image(post) => Some(format!("id:{}", post.id)),
        }
    }
}

/// Identity used when diffing profile snapshots. Headers and tags carry no
/// id of their own, so their whole value is their identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryIdentity {
    Title(String, Option<String>),
    Tag(String, String),
    Image(PostId),
}

impl DiffItem for ProfileEntry {
    type Identity = EntryIdentity;

    fn identity(&self) -> EntryIdentity {
        match self {
            ProfileEntry::Title { name, query } => EntryIdentity::Title(name.clone(), query.clone()),
            ProfileEntry::Tag { name, query } => EntryIdentity::Tag(name.clone(), query.clone()),
            ProfileEntry::Image(post) => EntryIdentity::Image(post.id),
        }
    }
}

impl DiffItem for Post {
    type Identity = PostId;

    fn identity(&self) -> PostId {
        self.id
    }
}
