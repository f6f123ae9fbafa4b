//! # Service Contract & Transfer Machinery
//!
//! The uniform capability contract every Drum backend implements, the
//! registry that resolves textual references against those backends, and
//! the shared machinery for talking to rate-limited, occasionally
//! unreliable remote APIs.
//!
//! ## Components
//!
//! - **Service trait** ([`service`]): parse/download/upload/remove/preview
//!   over the shared playlist model; unimplemented operations fail with
//!   [`ServiceError::Unsupported`]
//! - **Registry** ([`registry`]): fixed-priority dispatch of raw references
//!   to the first service that claims them
//! - **HTTP abstraction** ([`http`]): a narrow async client trait so
//!   providers can be tested against mocks, plus the reqwest-backed
//!   implementation used in production
//! - **Pagination** ([`paging`]): lazy offset/limit fetch loops with
//!   short-page/total termination and safety caps
//! - **Backoff** ([`backoff`]): bounded retry honoring server-declared
//!   rate-limit delays
//! - **Rate limiting** ([`rate`]): interval token buckets that suspend the
//!   calling sequence

pub mod backoff;
pub mod error;
pub mod http;
pub mod paging;
pub mod rate;
pub mod registry;
pub mod service;

pub use error::{Result, ServiceError};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, ReqwestClient};
pub use backoff::with_backoff;
pub use paging::{paged, paged_stream, Page, PageQuery, MAX_PLAYLIST_TRACKS};
pub use rate::RateLimiter;
pub use registry::ServiceRegistry;
pub use service::{PlaylistStream, Service};
