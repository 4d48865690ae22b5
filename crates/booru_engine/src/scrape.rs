//! Extraction of profile statistics from the `user/show` HTML page.
//!
//! Every lookup degrades to zero or empty when the markup does not match, so a
//! redesigned page yields a sparse profile rather than an error.
use booru_core::profile::{FAVORITE_FACETS, UPLOADED_FACETS};
use booru_core::{PostId, ScrapedProfile};
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

pub fn parse_profile(html: &str) -> ScrapedProfile {
    let document = Html::parse_document(html);

    let facets = FAVORITE_FACETS
        .iter()
        .chain(UPLOADED_FACETS.iter())
        .filter_map(|label| {
            let names = facet_names(&document, label);
            (!names.is_empty()).then(|| (label.to_string(), names))
        })
        .collect();

    ScrapedProfile {
        avatar_id: avatar_id(&document),
        post_count: post_count(&document),
        votes: vote_counts(&document),
        facets,
    }
}

/// Post shown as the avatar: the nearest link around `img.avatar` points at it.
fn avatar_id(document: &Html) -> Option<PostId> {
    let selector = Selector::parse("img.avatar").ok()?;
    let image = document.select(&selector).next()?;
    let href = image
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "a")?
        .value()
        .attr("href")?;
    first_number(href).filter(|id| *id != 0)
}

fn post_count(document: &Html) -> u32 {
    cell_after_label(document, "td", "Posts")
        .and_then(|cell| element_text(cell).parse().ok())
        .unwrap_or(0)
}

/// Vote counts in tier order; an unreadable count is zero.
fn vote_counts(document: &Html) -> Vec<u32> {
    let Some(cell) = cell_after_label(document, "th", "Votes") else {
        return Vec::new();
    };
    let Ok(selector) = Selector::parse(".stars a") else {
        return Vec::new();
    };
    cell.select(&selector)
        .map(|link| {
            element_text(link)
                .trim_matches(|c: char| c == '★' || c.is_whitespace())
                .parse()
                .unwrap_or(0)
        })
        .collect()
}

fn facet_names(document: &Html, label: &str) -> Vec<String> {
    let Some(cell) = cell_after_label(document, "th", label) else {
        return Vec::new();
    };
    let Ok(selector) = Selector::parse("a") else {
        return Vec::new();
    };
    cell.select(&selector)
        .map(element_text)
        .filter(|name| !name.is_empty())
        .collect()
}

/// The element following the first `tag` whose text contains `label`.
fn cell_after_label<'a>(document: &'a Html, tag: &str, label: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(tag).ok()?;
    let label = label.to_lowercase();
    let header = document
        .select(&selector)
        .find(|element| element_text(*element).to_lowercase().contains(&label))?;
    next_element(*header)
}

fn next_element(node: NodeRef<'_, Node>) -> Option<ElementRef<'_>> {
    node.next_siblings().find_map(ElementRef::wrap)
}

/// Text content with runs of whitespace collapsed to single spaces.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_number(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
