use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Content rating filter understood by the post search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// No rating restriction.
    #[default]
    None,
    Safe,
    Questionable,
    Explicit,
}

impl Rating {
    fn term_value(self) -> Option<&'static str> {
        match self {
            Rating::None => None,
            Rating::Safe => Some("safe"),
            Rating::Questionable => Some("questionable"),
            Rating::Explicit => Some("explicit"),
        }
    }

    /// Maps the single-letter code used in post records (`s`, `q`, `e`).
    pub fn from_code(code: &str) -> Rating {
        match code {
            "s" | "safe" => Rating::Safe,
            "q" | "questionable" => Rating::Questionable,
            "e" | "explicit" => Rating::Explicit,
            _ => Rating::None,
        }
    }
}

/// Meta terms, declared in canonical serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum MetaKey {
    Id,
    User,
    Vote,
    Date,
    Order,
    Rating,
}

impl MetaKey {
    fn parse(key: &str) -> Option<MetaKey> {
        match key {
            "id" => Some(MetaKey::Id),
            "user" => Some(MetaKey::User),
            "vote" => Some(MetaKey::Vote),
            "date" => Some(MetaKey::Date),
            "order" => Some(MetaKey::Order),
            "rating" => Some(MetaKey::Rating),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            MetaKey::Id => "id",
            MetaKey::User => "user",
            MetaKey::Vote => "vote",
            MetaKey::Date => "date",
            MetaKey::Order => "order",
            MetaKey::Rating => "rating",
        }
    }
}

/// Immutable post filter. Every builder returns a new value.
///
/// Free tags keep their first-insertion order; meta terms (`id:`, `user:`,
/// `vote:`, `date:`, `order:`, `rating:`) hold one value each and always
/// serialize after the free tags in a fixed order, so equal queries produce
/// byte-identical query strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Query {
    tags: Vec<String>,
    meta: BTreeMap<MetaKey, String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw space-separated tag string such as `vote:3:alice order:vote`.
    pub fn parse(raw: &str) -> Self {
        let mut query = Self::new();
        query.merge_terms(raw);
        query
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.meta.is_empty()
    }

    pub fn rating(&self) -> Rating {
        self.meta
            .get(&MetaKey::Rating)
            .map_or(Rating::None, |value| Rating::from_code(value))
    }

    pub fn with_rating(&self, rating: Rating) -> Self {
        let mut next = self.clone();
        match rating.term_value() {
            Some(value) => {
                next.meta.insert(MetaKey::Rating, value.to_string());
            }
            None => {
                next.meta.remove(&MetaKey::Rating);
            }
        }
        next
    }

    pub fn with_id(&self, id: u64) -> Self {
        self.with_meta(MetaKey::Id, id.to_string())
    }

    /// Adds free tags (or meta terms) parsed from `text`.
    pub fn with_tag(&self, text: &str) -> Self {
        let mut next = self.clone();
        next.merge_terms(text);
        next
    }

    pub fn with_popular_by_day(&self, date: NaiveDate) -> Self {
        self.with_popular(date.format("%Y-%m-%d").to_string())
    }

    /// The seven days ending at `date`.
    pub fn with_popular_by_week(&self, date: NaiveDate) -> Self {
        let start = date.checked_sub_days(Days::new(6)).unwrap_or(date);
        self.with_popular(format_range(start, date))
    }

    /// The calendar month containing `date`.
    pub fn with_popular_by_month(&self, date: NaiveDate) -> Self {
        let (first, last) = month_bounds(date);
        self.with_popular(format_range(first, last))
    }

    /// Canonical query string sent to the post search.
    pub fn to_query_string(&self) -> String {
        let meta = self
            .meta
            .iter()
            .map(|(key, value)| format!("{}:{}", key.as_str(), value));
        self.tags
            .iter()
            .cloned()
            .chain(meta)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn with_popular(&self, date_term: String) -> Self {
        self.with_meta(MetaKey::Date, date_term)
            .with_meta(MetaKey::Order, "score".to_string())
    }

    fn with_meta(&self, key: MetaKey, value: String) -> Self {
        let mut next = self.clone();
        next.meta.insert(key, value);
        next
    }

    fn merge_terms(&mut self, raw: &str) {
        for term in raw.split_whitespace() {
            let meta = term
                .split_once(':')
                .filter(|(_, value)| !value.is_empty())
                .and_then(|(key, value)| MetaKey::parse(key).map(|key| (key, value)));
            match meta {
                Some((key, value)) => {
                    self.meta.insert(key, value.to_string());
                }
                None => {
                    if !self.tags.iter().any(|tag| tag == term) {
                        self.tags.push(term.to_string());
                    }
                }
            }
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl From<String> for Query {
    fn from(raw: String) -> Self {
        Query::parse(&raw)
    }
}

impl From<&str> for Query {
    fn from(raw: &str) -> Self {
        Query::parse(raw)
    }
}

impl From<Query> for String {
    fn from(query: Query) -> Self {
        query.to_query_string()
    }
}

fn format_range(start: NaiveDate, end: NaiveDate) -> String {
    format!("{}..{}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
}

fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let last = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next_first| next_first.pred_opt())
        .unwrap_or(date);
    (first, last)
}

/// The home feed tabs, in display order.
pub fn default_tabs(today: NaiveDate) -> Vec<(&'static str, Query)> {
    let base = Query::new();
    vec![
        ("Newest", base.clone()),
        ("Day", base.with_popular_by_day(today)),
        ("Week", base.with_popular_by_week(today)),
        ("Month", base.with_popular_by_month(today)),
    ]
}
