//! Booru core: pure value types, the pager state machine, the list diff and
//! profile section accumulation. Nothing in here performs IO.
mod diff;
mod effect;
mod entry;
mod msg;
mod paging;
mod post;
pub mod profile;
mod query;
mod state;
mod update;
mod view_model;

pub use diff::{apply, diff, DiffItem, DiffOp};
pub use effect::Effect;
pub use entry::{EntryIdentity, ProfileEntry};
pub use msg::Msg;
pub use paging::{next_key_after, Page, PageKey, PagerConfig, FIRST_PAGE};
pub use post::{Post, PostId, UserSummary};
pub use profile::{ProfileRequest, ProfileState, ScrapedProfile};
pub use query::{default_tabs, Query, Rating};
pub use state::{LoadStatus, PageState, PagerState};
pub use update::update;
pub use view_model::FeedSnapshot;
