//! Section layout and accumulation for the aggregated user profile.
use serde::{Deserialize, Serialize};

use crate::{Post, PostId, ProfileEntry};

pub const COMMON: &str = "Common";
pub const FAVORITES: &str = "Favorites";
pub const UPLOADS: &str = "Uploads";

pub const FAVORITE_FACETS: [&str; 5] = [
    "Favorite Artists",
    "Favorite Copyrights",
    "Favorite Characters",
    "Favorite Styles",
    "Favorite Circles",
];

pub const UPLOADED_FACETS: [&str; 6] = [
    "Uploaded Tags",
    "Uploaded Artists",
    "Uploaded Copyrights",
    "Uploaded Characters",
    "Uploaded Styles",
    "Uploaded Circles",
];

/// Vote tiers shown on the profile page, lowest first.
pub const VOTE_TIERS: usize = 3;

pub fn favorites_query(user: &str) -> String {
    format!("vote:3:{user} order:vote")
}

pub fn uploads_query(user: &str) -> String {
    format!("user:{user}")
}

/// Which profile to aggregate. Missing fields are resolved at run time: no
/// name means the signed-in account, no id means a lookup by name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub user_id: Option<u64>,
}

impl ProfileRequest {
    pub fn own() -> Self {
        Self::default()
    }

    pub fn for_user(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            user_id: None,
        }
    }

    pub fn is_own(&self) -> bool {
        self.name.is_none()
    }
}

/// Fields read from the profile HTML page. Anything the page lacked is zero or empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrapedProfile {
    pub avatar_id: Option<PostId>,
    pub post_count: u32,
    /// Vote counts by tier, tier 1 first.
    pub votes: Vec<u32>,
    /// Facet label with the linked names listed under it, in page order.
    pub facets: Vec<(String, Vec<String>)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: &'static str,
    query: Option<String>,
    entries: Vec<ProfileEntry>,
}

/// Accumulated profile sections for one aggregation run.
///
/// Sections are created up front in their final display order and only ever
/// grow; a snapshot lists each non-empty section as its title followed by its
/// entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileState {
    user: String,
    sections: Vec<Section>,
}

impl ProfileState {
    pub fn new(user: &str) -> Self {
        let section = |name: &'static str, query: Option<String>| Section {
            name,
            query,
            entries: Vec::new(),
        };
        let mut sections = vec![section(COMMON, None)];
        sections.extend(FAVORITE_FACETS.into_iter().map(|name| section(name, None)));
        sections.extend(UPLOADED_FACETS.into_iter().map(|name| section(name, None)));
        sections.push(section(FAVORITES, Some(favorites_query(user))));
        sections.push(section(UPLOADS, Some(uploads_query(user))));
        Self {
            user: user.to_string(),
            sections,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Adds the statistics and facet tags read from the profile page.
    pub fn apply_scrape(&mut self, scraped: &ScrapedProfile) {
        let user = self.user.clone();

        let mut common = Vec::new();
        if scraped.post_count > 0 {
            common.push(ProfileEntry::tag(
                format!("Posts: {}P", scraped.post_count),
                uploads_query(&user),
            ));
        }
        let votes: Vec<(usize, u32)> = scraped
            .votes
            .iter()
            .take(VOTE_TIERS)
            .enumerate()
            .map(|(index, count)| (index + 1, *count))
            .filter(|(_, count)| *count > 0)
            .collect();
        for (tier, count) in &votes {
            common.push(ProfileEntry::tag(
                format!("Vote {tier}: {count}P"),
                format!("vote:{tier}:{user} order:vote"),
            ));
        }
        if votes.len() > 1 {
            let total: u64 = votes.iter().map(|(_, count)| u64::from(*count)).sum();
            common.push(ProfileEntry::tag(
                format!("Vote all: {total}P"),
                format!("vote:1..3:{user} order:vote"),
            ));
        }
        self.extend_section(COMMON, common);

        for (prefix, labels) in [
            (favorites_query(&user), &FAVORITE_FACETS[..]),
            (uploads_query(&user), &UPLOADED_FACETS[..]),
        ] {
            for label in labels {
                let names = scraped
                    .facets
                    .iter()
                    .filter(|(facet, _)| facet == label)
                    .flat_map(|(_, names)| names);
                let tags: Vec<ProfileEntry> = names
                    .map(|name| {
                        ProfileEntry::tag(name.clone(), format!("{prefix} {}", name.replace(' ', "_")))
                    })
                    .collect();
                self.extend_section(label, tags);
            }
        }
    }

    /// Appends fetched posts to the named section.
    pub fn append_posts(&mut self, section: &str, posts: Vec<Post>) {
        self.extend_section(section, posts.into_iter().map(ProfileEntry::Image).collect());
    }

    pub fn section_len(&self, name: &str) -> usize {
        self.sections
            .iter()
            .find(|section| section.name == name)
            .map_or(0, |section| section.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|section| section.entries.is_empty())
    }

    pub fn snapshot(&self) -> Vec<ProfileEntry> {
        self.sections
            .iter()
            .filter(|section| !section.entries.is_empty())
            .flat_map(|section| {
                std::iter::once(ProfileEntry::title(section.name, section.query.clone()))
                    .chain(section.entries.iter().cloned())
            })
            .collect()
    }

    fn extend_section(&mut self, name: &str, entries: Vec<ProfileEntry>) {
        // Section names are fixed at construction; an unknown one is a caller bug.
        let section = self
            .sections
            .iter_mut()
            .find(|section| section.name == name)
            .unwrap_or_else(|| panic!("unknown profile section {name:?}"));
        section.entries.extend(entries);
    }
}
