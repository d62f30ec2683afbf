//! Paging through the listing endpoint.
//!
//! The endpoint's `Count` can't be trusted on any single page. While paging it
//! flips between at least two values (it looks like the number of live
//! records and the highest record id), and near the end of the feed a page
//! can come back empty with more records after it. So we keep the largest
//! `Count` seen so far and keep going, empty pages included, until the offset
//! reaches it.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use highfive_client::{HighFiveClient, HighFiveError, ListingPage, RawRecord};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Source(#[from] HighFiveError),

    #[error("batch size must be positive")]
    ZeroBatchSize,

    #[error("gave up after {pages} pages (offset {offset}, largest count seen {max_count_seen})")]
    PaginationRunaway {
        pages: u32,
        offset: u64,
        max_count_seen: u64,
    },
}

/// One page of listing results per call.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn page(&self, count: u32, offset: u64) -> Result<ListingPage, HighFiveError>;
}

#[async_trait]
impl ListingSource for HighFiveClient {
    async fn page(&self, count: u32, offset: u64) -> Result<ListingPage, HighFiveError> {
        self.fetch_page(count, offset).await
    }
}

/// Fetch every record, in upstream order.
///
/// Any page failure aborts the whole fetch. `max_pages` bounds the number of
/// requests in case the offset never catches up with the count.
pub async fn fetch_all(
    source: &dyn ListingSource,
    batch_size: u32,
    max_pages: u32,
) -> Result<Vec<RawRecord>, FetchError> {
    if batch_size == 0 {
        return Err(FetchError::ZeroBatchSize);
    }

    let mut records = Vec::new();
    let mut offset: u64 = 0;
    let mut max_count_seen: u64 = 0;
    let mut pages: u32 = 0;

    loop {
        if pages >= max_pages {
            return Err(FetchError::PaginationRunaway {
                pages,
                offset,
                max_count_seen,
            });
        }

        let page = source.page(batch_size, offset).await?;
        pages += 1;

        if page.count < max_count_seen {
            debug!(offset, count = page.count, max_count_seen, "Page reported a lower count");
        }
        max_count_seen = max_count_seen.max(page.count);

        if page.results.is_empty() {
            info!(offset, max_count_seen, "Empty page before reaching count, continuing");
        }
        records.extend(page.results);

        offset += u64::from(batch_size);
        if offset >= max_count_seen {
            break;
        }
    }

    info!(
        pages,
        records = records.len(),
        max_count_seen,
        "Fetched all high fives"
    );
    Ok(records)
}
