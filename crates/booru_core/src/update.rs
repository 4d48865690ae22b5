use crate::{Effect, Msg, PagerState};

/// Pure update function: applies a message to pager state and returns any effects.
///
/// Loads are strictly sequential: a new page is only requested while the
/// listing is idle, so page N+1 is never issued before page N has landed.
pub fn update(mut state: PagerState, msg: Msg) -> (PagerState, Vec<Effect>) {
    let effects = match msg {
        Msg::Refresh => {
            state.reset();
            vec![state.begin_load(None)]
        }
        Msg::LoadMore => state.request_next().into_iter().collect(),
        Msg::ItemVisible(index) => {
            if state.near_end(index) {
                state.request_next().into_iter().collect()
            } else {
                Vec::new()
            }
        }
        Msg::Retry => state.retry_failed().into_iter().collect(),
        Msg::PageLoaded {
            generation,
            key,
            result,
        } => {
            state.apply_loaded(generation, key, result);
            Vec::new()
        }
    };

    (state, effects)
}
