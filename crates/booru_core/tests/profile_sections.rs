use booru_core::profile::{FAVORITES, UPLOADS};
use booru_core::{Post, ProfileEntry, ProfileRequest, ProfileState, ScrapedProfile};
use pretty_assertions::assert_eq;

fn post(id: u64) -> Post {
    Post {
        id,
        tags: String::new(),
        author: "alice".to_string(),
        score: 0,
        rating: "s".to_string(),
        width: 0,
        height: 0,
        preview_url: format!("https://img.example/preview/{id}.jpg"),
        preview_width: 150,
        preview_height: 100,
        sample_url: format!("https://img.example/sample/{id}.jpg"),
        sample_width: 0,
        sample_height: 0,
        file_url: format!("https://img.example/file/{id}.jpg"),
        jpeg_url: None,
    }
}

#[test]
fn single_vote_tier_has_no_total() {
    let mut state = ProfileState::new("alice");
    state.apply_scrape(&ScrapedProfile {
        avatar_id: None,
        post_count: 42,
        votes: vec![0, 10, 0],
        facets: Vec::new(),
    });
    state.append_posts(FAVORITES, Vec::new());
    state.append_posts(UPLOADS, Vec::new());

    assert_eq!(
        state.snapshot(),
        vec![
            ProfileEntry::title("Common", None),
            ProfileEntry::tag("Posts: 42P", "user:alice"),
            ProfileEntry::tag("Vote 2: 10P", "vote:2:alice order:vote"),
        ]
    );
}

#[test]
fn several_vote_tiers_add_a_total() {
    let mut state = ProfileState::new("alice");
    state.apply_scrape(&ScrapedProfile {
        votes: vec![1, 0, 5, 99],
        ..ScrapedProfile::default()
    });

    assert_eq!(
        state.snapshot(),
        vec![
            ProfileEntry::title("Common", None),
            ProfileEntry::tag("Vote 1: 1P", "vote:1:alice order:vote"),
            ProfileEntry::tag("Vote 3: 5P", "vote:3:alice order:vote"),
            ProfileEntry::tag("Vote all: 6P", "vote:1..3:alice order:vote"),
        ]
    );
}

#[test]
fn vote_total_does_not_wrap_at_the_counter_limit() {
    let mut state = ProfileState::new("alice");
    state.apply_scrape(&ScrapedProfile {
        votes: vec![u32::MAX, 1, 0],
        ..ScrapedProfile::default()
    });

    let total = state
        .snapshot()
        .into_iter()
        .find(|entry| matches!(entry, ProfileEntry::Tag { name, .. } if name.starts_with("Vote all")));
    assert_eq!(
        total,
        Some(ProfileEntry::tag("Vote all: 4294967296P", "vote:1..3:alice order:vote"))
    );
}

#[test]
fn facets_become_tags_under_their_section_in_layout_order() {
    let mut state = ProfileState::new("alice");
    state.append_posts(UPLOADS, vec![post(9)]);
    state.apply_scrape(&ScrapedProfile {
        facets: vec![
            ("Uploaded Artists".to_string(), vec!["some painter".to_string()]),
            (
                "Favorite Characters".to_string(),
                vec!["hatsune miku".to_string(), "rin".to_string()],
            ),
        ],
        ..ScrapedProfile::default()
    });

    assert_eq!(
        state.snapshot(),
        vec![
            ProfileEntry::title("Favorite Characters", None),
            ProfileEntry::tag("hatsune miku", "vote:3:alice order:vote hatsune_miku"),
            ProfileEntry::tag("rin", "vote:3:alice order:vote rin"),
            ProfileEntry::title("Uploaded Artists", None),
            ProfileEntry::tag("some painter", "user:alice some_painter"),
            ProfileEntry::title("Uploads", Some("user:alice".to_string())),
            ProfileEntry::Image(post(9)),
        ]
    );
}

#[test]
fn post_sections_keep_fetch_order() {
    let mut state = ProfileState::new("bob");
    state.append_posts(FAVORITES, vec![post(3), post(1), post(2)]);

    assert_eq!(state.section_len(FAVORITES), 3);
    let snapshot = state.snapshot();
    assert_eq!(
        snapshot[0],
        ProfileEntry::title("Favorites", Some("vote:3:bob order:vote".to_string()))
    );
    let ids: Vec<_> = snapshot[1..]
        .iter()
        .map(|entry| match entry {
            ProfileEntry::Image(post) => post.id,
            other => panic!("unexpected entry {other:?}"),
        })
        .collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[test]
fn empty_state_has_empty_snapshot() {
    let state = ProfileState::new("bob");
    assert!(state.is_empty());
    assert!(state.snapshot().is_empty());
}

#[test]
fn request_without_name_targets_the_signed_in_account() {
    assert!(ProfileRequest::own().is_own());
    assert!(!ProfileRequest::for_user("carol").is_own());
}

#[test]
fn entries_serialize_with_a_kind_tag() {
    let json = serde_json::to_string(&ProfileEntry::tag("rin", "user:alice rin")).unwrap();
    assert_eq!(json, r#"{"kind":"tag","name":"rin","query":"user:alice rin"}"#);
}
