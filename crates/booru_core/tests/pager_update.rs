use booru_core::{
    next_key_after, update, Effect, LoadStatus, Msg, Page, PagerConfig, PagerState, Post,
    Rating,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    booru_logging::initialize_for_tests();
}

fn post(id: u64) -> Post {
    Post {
        id,
        tags: format!("tag_{id}"),
        author: "alice".to_string(),
        score: 0,
        rating: "s".to_string(),
        width: 1000,
        height: 800,
        preview_url: format!("https://img.example/preview/{id}.jpg"),
        preview_width: 150,
        preview_height: 120,
        sample_url: format!("https://img.example/sample/{id}.jpg"),
        sample_width: 500,
        sample_height: 400,
        file_url: format!("https://img.example/file/{id}.png"),
        jpeg_url: None,
    }
}

fn posts(ids: std::ops::Range<u64>) -> Vec<Post> {
    ids.map(post).collect()
}

fn config(page_size: usize) -> PagerConfig {
    PagerConfig {
        page_size,
        prefetch_distance: 2,
        rating_floor: Rating::Safe,
    }
}

fn loaded(state: &PagerState, key: Option<u32>, items: Vec<Post>, page_size: usize) -> Msg {
    Msg::PageLoaded {
        generation: state.generation(),
        key,
        result: Ok(Page::new(key, page_size, items)),
    }
}

#[test]
fn next_key_follows_page_fill() {
    assert_eq!(next_key_after(20, 20, 20), Some(21));
    assert_eq!(next_key_after(20, 20, 5), None);
    assert_eq!(Page::new(None, 20, posts(0..20)).next_key, Some(2));
    assert_eq!(Page::new(Some(20), 20, posts(0..20)).next_key, Some(21));
    assert_eq!(Page::new(Some(20), 20, posts(0..5)).next_key, None);
}

#[test]
fn first_load_requests_the_null_key() {
    init_logging();
    let (state, effects) = update(PagerState::new(config(3)), Msg::LoadMore);
    assert_eq!(
        effects,
        vec![Effect::Load {
            generation: 0,
            key: None,
            page_size: 3,
        }]
    );
    assert_eq!(state.page_state().status, LoadStatus::Loading);
}

#[test]
fn loads_are_sequential_and_in_key_order() {
    init_logging();
    let (state, _) = update(PagerState::new(config(3)), Msg::LoadMore);

    // A second request while loading does nothing.
    let (state, effects) = update(state, Msg::LoadMore);
    assert!(effects.is_empty());

    let msg = loaded(&state, None, posts(1..4), 3);
    let (mut state, _) = update(state, msg);
    assert!(state.consume_dirty());
    let first = state.view();
    assert_eq!(first.items.len(), 3);
    assert_eq!(state.page_state().next_key, Some(2));

    let (state, effects) = update(state, Msg::LoadMore);
    assert_eq!(
        effects,
        vec![Effect::Load {
            generation: 0,
            key: Some(2),
            page_size: 3,
        }]
    );

    let msg = loaded(&state, Some(2), posts(4..6), 3);
    let (state, _) = update(state, msg);
    let second = state.view();

    // Prefix-superset: nothing already shown moves or disappears.
    assert_eq!(&second.items[..first.items.len()], &first.items[..]);
    assert_eq!(second.items.len(), 5);
    assert_eq!(second.status, LoadStatus::EndOfStream);

    let (_state, effects) = update(state, Msg::LoadMore);
    assert!(effects.is_empty());
}

#[test]
fn failed_load_keeps_items_and_retry_reuses_the_key() {
    init_logging();
    let (state, _) = update(PagerState::new(config(2)), Msg::LoadMore);
    let msg = loaded(&state, None, posts(1..3), 2);
    let (state, _) = update(state, msg);
    let (state, _) = update(state, Msg::LoadMore);

    let (state, _) = update(
        state,
        Msg::PageLoaded {
            generation: 0,
            key: Some(2),
            result: Err("http status 503".to_string()),
        },
    );
    let view = state.view();
    assert_eq!(view.status, LoadStatus::Error);
    assert_eq!(view.retry_message(), Some("http status 503"));
    assert_eq!(view.items.len(), 2);

    // Errors block further paging until retried.
    let (state, effects) = update(state, Msg::LoadMore);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::Retry);
    assert_eq!(
        effects,
        vec![Effect::Load {
            generation: 0,
            key: Some(2),
            page_size: 2,
        }]
    );

    // Retry is a no-op unless the last load failed.
    let (_state, effects) = update(state, Msg::Retry);
    assert!(effects.is_empty());
}

#[test]
fn refresh_discards_items_and_stale_results() {
    init_logging();
    let (state, _) = update(PagerState::new(config(2)), Msg::LoadMore);
    let msg = loaded(&state, None, posts(1..3), 2);
    let (state, _) = update(state, msg);
    let (state, _) = update(state, Msg::LoadMore);
    let stale = loaded(&state, Some(2), posts(3..5), 2);

    let (state, effects) = update(state, Msg::Refresh);
    assert_eq!(
        effects,
        vec![Effect::Load {
            generation: 1,
            key: None,
            page_size: 2,
        }]
    );
    let view = state.view();
    assert!(view.items.is_empty());
    assert!(view.is_refreshing());

    // The page-2 load from before the refresh lands late and is dropped.
    let (state, _) = update(state, stale);
    assert!(state.view().items.is_empty());
    assert_eq!(state.page_state().status, LoadStatus::Loading);

    let msg = loaded(&state, None, posts(10..12), 2);
    let (state, _) = update(state, msg);
    let ids: Vec<_> = state.view().items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![10, 11]);
}

#[test]
fn duplicate_posts_across_pages_are_dropped() {
    init_logging();
    let (state, _) = update(PagerState::new(config(3)), Msg::LoadMore);
    let msg = loaded(&state, None, posts(1..4), 3);
    let (state, _) = update(state, msg);
    let (state, _) = update(state, Msg::LoadMore);
    // New uploads shifted the listing by one.
    let msg = loaded(&state, Some(2), posts(3..6), 3);
    let (state, _) = update(state, msg);

    let ids: Vec<_> = state.view().items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(state.page_state().next_key, Some(3));
}

#[test]
fn visible_items_near_the_end_prefetch() {
    init_logging();
    let (state, _) = update(PagerState::new(config(5)), Msg::LoadMore);
    let msg = loaded(&state, None, posts(1..6), 5);
    let (state, _) = update(state, msg);

    let (state, effects) = update(state, Msg::ItemVisible(1));
    assert!(effects.is_empty());

    let (_state, effects) = update(state, Msg::ItemVisible(3));
    assert_eq!(
        effects,
        vec![Effect::Load {
            generation: 0,
            key: Some(2),
            page_size: 5,
        }]
    );
}
