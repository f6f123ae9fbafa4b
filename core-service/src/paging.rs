//! Offset/limit pagination loops shared by the remote backends.
//!
//! Remote listings are fetched one chunk at a time. Termination has two
//! modes: when the source declares a total, fetching stops once the offset
//! reaches it; when it does not, a short page (fewer items than requested,
//! including an empty one) ends the loop. Two safety caps guard against
//! sources that keep returning items: a hard per-collection maximum and,
//! when a total is declared, one chunk of grace beyond it.

use std::future::Future;

use async_stream::try_stream;
use futures::stream::BoxStream;
use tracing::warn;

use crate::error::Result;

/// Hard cap on the number of items collected from a single listing.
/// Sources that page forever get truncated here with a warning.
pub const MAX_PLAYLIST_TRACKS: usize = 10_000;

/// The window requested from a paged source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: usize,
    pub offset: usize,
}

/// One fetched window plus the total the source declares, if any.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Declared size of the whole collection. `None` for sources that only
    /// signal the end with a short page.
    pub total: Option<usize>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, total: None }
    }

    pub fn with_total(items: Vec<T>, total: usize) -> Self {
        Self {
            items,
            total: Some(total),
        }
    }
}

/// Fetch every page of a collection and collect the items in order.
///
/// `fetch` is invoked sequentially; the next call is only issued after the
/// previous one resolves. `max_items` truncates runaway collections, and a
/// declared total is allowed at most one chunk of overshoot before the
/// listing is cut off.
pub async fn paged<T, F, Fut>(chunk_size: usize, max_items: usize, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(PageQuery) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items: Vec<T> = Vec::new();
    let mut offset = 0;

    loop {
        let page = fetch(PageQuery {
            limit: chunk_size,
            offset,
        })
        .await?;
        let fetched = page.items.len();
        items.extend(page.items);
        offset += fetched;

        if let Some(total) = page.total {
            if items.len() > total.saturating_add(chunk_size) {
                warn!(
                    declared_total = total,
                    fetched = items.len(),
                    "source returned more items than it declared, truncating"
                );
                items.truncate(total);
                break;
            }
            if offset >= total {
                break;
            }
        } else if fetched < chunk_size {
            break;
        }

        if items.len() > max_items {
            warn!(
                max_items,
                fetched = items.len(),
                "listing exceeded the maximum item count, truncating"
            );
            items.truncate(max_items);
            break;
        }
    }

    Ok(items)
}

/// Like [`paged`] but yields items lazily as each page arrives.
///
/// Used for playlist listings where the consumer wants incremental
/// progress without holding the whole collection in memory.
pub fn paged_stream<T, F, Fut>(
    chunk_size: usize,
    max_items: usize,
    mut fetch: F,
) -> BoxStream<'static, Result<T>>
where
    T: Send + 'static,
    F: FnMut(PageQuery) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Page<T>>> + Send,
{
    Box::pin(try_stream! {
        let mut yielded = 0usize;
        let mut offset = 0usize;
        let mut yield_cap = max_items;

        loop {
            let page = fetch(PageQuery { limit: chunk_size, offset }).await?;
            let fetched = page.items.len();
            offset += fetched;

            let mut done = match page.total {
                Some(total) => offset >= total,
                None => fetched < chunk_size,
            };

            if let Some(total) = page.total {
                if yielded + fetched > total.saturating_add(chunk_size) {
                    warn!(
                        declared_total = total,
                        fetched = yielded + fetched,
                        "source returned more items than it declared, truncating"
                    );
                    // Past the grace chunk nothing beyond the declared
                    // total is yielded, matching `paged`.
                    yield_cap = yield_cap.min(total);
                    done = true;
                }
            }

            for item in page.items {
                if yielded >= yield_cap {
                    if yield_cap == max_items {
                        warn!(max_items, "listing exceeded the maximum item count, truncating");
                    }
                    done = true;
                    break;
                }
                yielded += 1;
                yield item;
            }

            if done {
                break;
            }
        }
    })
}
