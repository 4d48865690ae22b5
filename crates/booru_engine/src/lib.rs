//! Booru engine: HTTP transport, paging sources, the pager driver and the
//! concurrent profile aggregator.
mod aggregator;
mod decode;
mod identity;
mod pager;
mod publish;
mod scrape;
mod source;
mod transport;
mod types;

pub use aggregator::{ProfileAggregator, ProfileSettings};
pub use decode::{decode_json, decode_text, DecodeError};
pub use identity::{Identity, IdentityProvider, SessionIdentity};
pub use pager::Pager;
pub use publish::{Publisher, Subscription};
pub use scrape::parse_profile;
pub use source::{PagingSource, PostPagingSource};
pub use transport::{avatar_url, profile_url, ReqwestTransport, Transport, TransportSettings};
pub use types::{FailureKind, HtmlPage, TransportError};
