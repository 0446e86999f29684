//! Cursor-based pagination.
//!
//! A [`Pageable`] walks a collection one page at a time. Each page is
//! requested with the id of the last item of the previous page as cursor, so
//! fetches are strictly sequential: `next` takes `&mut self` and the cursor
//! for page N+1 only exists once page N has arrived.
//!
//! The sequence ends after a page shorter than the requested size or after an
//! empty page. A failed fetch ends it with an error, and so does any item that
//! does not move past the item before it (the first item is compared with the
//! cursor, including a caller-supplied start id). Pages already handed out
//! stay valid.
//!
//! # Example
//!
//! ```no_run
//! # use nemgate_client::{ClientConfig, NamespaceHttp};
//! # use nemgate_common::{NetworkContext, NetworkType, QueryParams};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = NetworkContext::initialized(NetworkType::TestNet);
//! let namespaces = NamespaceHttp::new(&ctx, &ClientConfig::default())?;
//!
//! let mut pages = namespaces.get_root_namespaces_paginated(QueryParams::new().with_page_size(50));
//! while let Some(page) = pages.next().await? {
//!     println!("{} namespaces", page.len());
//! }
//! # Ok(())
//! # }
//! ```

use futures_util::stream::{self, Stream};
use nemgate_common::protocol::DEFAULT_PAGE_SIZE;
use nemgate_common::{NemgateError, QueryParams, Result};
use std::future::Future;
use tracing::debug;

/// Direction in which ids move from one page to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorOrder {
    /// Newest first; every page starts below the previous cursor.
    Descending,
    /// Oldest first; every page starts above the previous cursor.
    Ascending,
}

impl CursorOrder {
    /// Whether `next` lies strictly past `previous` in this order.
    pub fn advances(self, previous: u64, next: u64) -> bool {
        match self {
            CursorOrder::Descending => next < previous,
            CursorOrder::Ascending => next > previous,
        }
    }
}

/// A collection that can be fetched one page at a time.
pub trait PagedResource {
    type Item;

    /// Fetches the page selected by `params`. Implementations route the
    /// request through their failover dispatcher.
    fn fetch_page(&self, params: QueryParams) -> impl Future<Output = Result<Vec<Self::Item>>> + Send;

    /// The id used as cursor once `item` is the last item of a page.
    fn cursor_of(item: &Self::Item) -> Option<u64>;

    fn cursor_order(&self) -> CursorOrder {
        CursorOrder::Descending
    }

    /// Number of items a full page holds when `requested` was asked for.
    /// A page shorter than this is the last one.
    fn served_page_size(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageState {
    Open,
    Finished,
}

/// Lazy sequence of pages over a [`PagedResource`].
///
/// Not restartable: to iterate again from the start, build a new one.
pub struct Pageable<'a, R: PagedResource> {
    resource: &'a R,
    page_size: Option<u32>,
    cursor: Option<u64>,
    pages_fetched: usize,
    state: PageState,
}

impl<'a, R: PagedResource> Pageable<'a, R> {
    /// Starts below `params.id`, or at the newest item when absent. The page
    /// size is passed to the resource as given.
    pub fn new(resource: &'a R, params: QueryParams) -> Self {
        Self {
            resource,
            page_size: params.page_size,
            cursor: params.id,
            pages_fetched: 0,
            state: PageState::Open,
        }
    }

    /// False once the collection has been exhausted or a fetch failed.
    pub fn has_next(&self) -> bool {
        self.state == PageState::Open
    }

    /// Current continuation cursor.
    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Fetches the next page.
    ///
    /// # Returns
    /// - `Ok(Some(page))` - a non-empty page
    /// - `Ok(None)` - the collection is exhausted
    /// - `Err(e)` - the fetch failed or the page did not advance; the sequence is over
    pub async fn next(&mut self) -> Result<Option<Vec<R::Item>>> {
        if !self.has_next() {
            return Ok(None);
        }

        let params = QueryParams {
            id: self.cursor,
            page_size: self.page_size,
        };
        debug!(cursor = ?self.cursor, page_size = ?self.page_size, page = self.pages_fetched, "fetching page");

        match self.fetch(params).await {
            Ok(page) => Ok(page),
            Err(e) => {
                self.state = PageState::Finished;
                Err(e)
            }
        }
    }

    async fn fetch(&mut self, params: QueryParams) -> Result<Option<Vec<R::Item>>> {
        let page = self.resource.fetch_page(params).await?;

        if page.is_empty() {
            debug!(pages = self.pages_fetched, "empty page, collection exhausted");
            self.state = PageState::Finished;
            return Ok(None);
        }

        let order = self.resource.cursor_order();
        let mut previous = self.cursor;
        for item in &page {
            let id = R::cursor_of(item)
                .ok_or_else(|| NemgateError::InvalidResponse("page item carries no id".to_string()))?;
            if let Some(previous) = previous {
                if !order.advances(previous, id) {
                    return Err(NemgateError::NonMonotonicCursor { previous, found: id });
                }
            }
            previous = Some(id);
        }
        let Some(last_id) = previous else {
            return Ok(None);
        };

        let requested = self.resource.served_page_size(params.page_size) as usize;
        if page.len() < requested {
            self.state = PageState::Finished;
        }

        self.cursor = Some(last_id);
        self.pages_fetched += 1;
        debug!(items = page.len(), next_cursor = last_id, has_next = self.has_next(), "page fetched");

        Ok(Some(page))
    }

    /// Turns the remaining pages into a stream.
    ///
    /// The stream ends after the last page, or right after yielding an error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<R::Item>>> + 'a
    where
        R::Item: 'a,
    {
        stream::try_unfold(self, |mut pageable| async move {
            Ok(pageable.next().await?.map(|page| (page, pageable)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory collection served newest first, like NIS root namespaces.
    struct Ledger {
        ids: Vec<u64>,
        requests: Mutex<Vec<QueryParams>>,
        fail_on_request: Option<usize>,
        calls: AtomicUsize,
    }

    impl Ledger {
        fn with_size(size: u64) -> Self {
            Self {
                ids: (1..=size).rev().collect(),
                requests: Mutex::new(Vec::new()),
                fail_on_request: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl PagedResource for Ledger {
        type Item = u64;

        fn fetch_page(&self, params: QueryParams) -> impl Future<Output = Result<Vec<u64>>> + Send {
            self.requests.lock().unwrap().push(params);
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let result = if Some(call) == self.fail_on_request {
                Err(NemgateError::RetriesExhausted {
                    attempts: 3,
                    last: Box::new(NemgateError::Timeout(100)),
                })
            } else {
                let size = params.effective_page_size() as usize;
                Ok(self
                    .ids
                    .iter()
                    .copied()
                    .filter(|id| params.id.map_or(true, |top| *id < top))
                    .take(size)
                    .collect())
            };
            async move { result }
        }

        fn cursor_of(item: &u64) -> Option<u64> {
            Some(*item)
        }
    }

    /// Serves the same page forever.
    struct Stuck;

    impl PagedResource for Stuck {
        type Item = u64;

        fn fetch_page(&self, _params: QueryParams) -> impl Future<Output = Result<Vec<u64>>> + Send {
            async { Ok(vec![10, 9, 8, 7, 6]) }
        }

        fn cursor_of(item: &u64) -> Option<u64> {
            Some(*item)
        }
    }

    /// Serves a fixed list of pages, then empty pages.
    struct Scripted {
        pages: Mutex<VecDeque<Vec<u64>>>,
    }

    impl Scripted {
        fn new(pages: Vec<Vec<u64>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
            }
        }
    }

    impl PagedResource for Scripted {
        type Item = u64;

        fn fetch_page(&self, _params: QueryParams) -> impl Future<Output = Result<Vec<u64>>> + Send {
            let page = self.pages.lock().unwrap().pop_front().unwrap_or_default();
            async move { Ok(page) }
        }

        fn cursor_of(item: &u64) -> Option<u64> {
            Some(*item)
        }
    }

    async fn drain<R: PagedResource>(pageable: &mut Pageable<'_, R>) -> Vec<Vec<R::Item>> {
        let mut pages = Vec::new();
        while let Some(page) = pageable.next().await.unwrap() {
            pages.push(page);
        }
        pages
    }

    #[tokio::test]
    async fn test_pages_cover_collection_in_order() {
        for (size, page_size) in [(53u64, 10u32), (7, 5), (100, 25), (1, 5), (24, 25)] {
            let ledger = Ledger::with_size(size);
            let mut pageable = Pageable::new(&ledger, QueryParams::new().with_page_size(page_size));

            let pages = drain(&mut pageable).await;

            let expected_pages = (size as usize).div_ceil(page_size as usize);
            assert_eq!(pages.len(), expected_pages, "size {} page {}", size, page_size);
            let all: Vec<u64> = pages.concat();
            assert_eq!(all, ledger.ids);
            assert!(!pageable.has_next());
        }
    }

    #[tokio::test]
    async fn test_has_next_false_right_after_short_page() {
        let ledger = Ledger::with_size(12);
        let mut pageable = Pageable::new(&ledger, QueryParams::new().with_page_size(5));

        assert!(pageable.has_next());
        assert_eq!(pageable.next().await.unwrap().unwrap().len(), 5);
        assert!(pageable.has_next());
        assert_eq!(pageable.next().await.unwrap().unwrap().len(), 5);
        assert!(pageable.has_next());
        assert_eq!(pageable.next().await.unwrap().unwrap(), vec![2, 1]);
        assert!(!pageable.has_next());

        // no further request once finished
        assert!(pageable.next().await.unwrap().is_none());
        assert_eq!(ledger.requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_full_last_page_needs_one_empty_probe() {
        let ledger = Ledger::with_size(10);
        let mut pageable = Pageable::new(&ledger, QueryParams::new().with_page_size(5));

        assert_eq!(drain(&mut pageable).await.len(), 2);
        assert!(!pageable.has_next());
        assert_eq!(ledger.requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_page_size_passed_through() {
        let ledger = Ledger::with_size(250);
        let mut pageable = Pageable::new(&ledger, QueryParams::new().with_page_size(500));

        assert_eq!(pageable.next().await.unwrap().unwrap().len(), 250);
        assert!(!pageable.has_next());
        assert_eq!(ledger.requests.lock().unwrap()[0].page_size, Some(500));
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let ledger = Ledger::with_size(0);
        let mut pageable = Pageable::new(&ledger, QueryParams::new());
        assert!(pageable.next().await.unwrap().is_none());
        assert!(!pageable.has_next());
        assert_eq!(pageable.pages_fetched(), 0);
    }

    #[tokio::test]
    async fn test_cursor_follows_last_item() {
        let ledger = Ledger::with_size(30);
        let mut pageable = Pageable::new(&ledger, QueryParams::new().with_page_size(10));

        pageable.next().await.unwrap();
        assert_eq!(pageable.cursor(), Some(21));
        pageable.next().await.unwrap();
        assert_eq!(pageable.cursor(), Some(11));

        let requests = ledger.requests.lock().unwrap().clone();
        assert_eq!(requests[0], QueryParams { id: None, page_size: Some(10) });
        assert_eq!(requests[1], QueryParams { id: Some(21), page_size: Some(10) });
    }

    #[tokio::test]
    async fn test_start_id_and_default_page_size() {
        let ledger = Ledger::with_size(100);
        let mut pageable = Pageable::new(&ledger, QueryParams::new().with_id(61));

        let page = pageable.next().await.unwrap().unwrap();
        assert_eq!(page.len(), DEFAULT_PAGE_SIZE as usize);
        assert_eq!(page[0], 60);

        let requests = ledger.requests.lock().unwrap().clone();
        assert_eq!(requests[0], QueryParams { id: Some(61), page_size: None });
    }

    #[tokio::test]
    async fn test_fetch_error_ends_sequence() {
        let mut ledger = Ledger::with_size(40);
        ledger.fail_on_request = Some(1);
        let mut pageable = Pageable::new(&ledger, QueryParams::new().with_page_size(10));

        let first = pageable.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 10);

        let err = pageable.next().await.unwrap_err();
        assert!(matches!(err, NemgateError::RetriesExhausted { .. }));
        assert!(!pageable.has_next());
        assert!(pageable.next().await.unwrap().is_none());
        // the first page is untouched
        assert_eq!(first[0], 40);
    }

    #[tokio::test]
    async fn test_repeated_page_is_protocol_violation() {
        let mut pageable = Pageable::new(&Stuck, QueryParams::new().with_page_size(5));

        assert_eq!(pageable.next().await.unwrap().unwrap().len(), 5);
        let err = pageable.next().await.unwrap_err();
        assert!(matches!(
            err,
            NemgateError::NonMonotonicCursor { previous: 6, found: 10 }
        ));
        assert!(!pageable.has_next());
    }

    #[tokio::test]
    async fn test_regressing_last_item_is_protocol_violation() {
        let scripted = Scripted::new(vec![
            vec![15, 14, 13, 12, 11],
            vec![10, 9, 8, 7, 12],
            vec![11, 10, 9, 8, 7],
        ]);
        let mut pageable = Pageable::new(&scripted, QueryParams::new().with_page_size(5));

        assert_eq!(pageable.next().await.unwrap().unwrap().len(), 5);
        let err = pageable.next().await.unwrap_err();
        assert!(matches!(
            err,
            NemgateError::NonMonotonicCursor { previous: 7, found: 12 }
        ));
        // the cursor never moves back
        assert_eq!(pageable.cursor(), Some(11));
        assert!(!pageable.has_next());
        assert!(pageable.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_inside_page_is_protocol_violation() {
        let scripted = Scripted::new(vec![vec![9, 8, 8, 7, 6]]);
        let mut pageable = Pageable::new(&scripted, QueryParams::new().with_page_size(5));

        assert!(matches!(
            pageable.next().await,
            Err(NemgateError::NonMonotonicCursor { previous: 8, found: 8 })
        ));
        assert_eq!(pageable.cursor(), None);
    }

    #[tokio::test]
    async fn test_first_page_checked_against_start_id() {
        let scripted = Scripted::new(vec![vec![10, 9, 8, 7, 6]]);
        let mut pageable = Pageable::new(&scripted, QueryParams::new().with_id(5).with_page_size(5));

        assert!(matches!(
            pageable.next().await,
            Err(NemgateError::NonMonotonicCursor { previous: 5, found: 10 })
        ));
        assert_eq!(pageable.cursor(), Some(5));
        assert!(!pageable.has_next());
    }

    #[test]
    fn test_cursor_order() {
        assert!(CursorOrder::Descending.advances(10, 9));
        assert!(!CursorOrder::Descending.advances(10, 10));
        assert!(!CursorOrder::Descending.advances(10, 11));
        assert!(CursorOrder::Ascending.advances(10, 11));
        assert!(!CursorOrder::Ascending.advances(10, 10));
    }

    #[tokio::test]
    async fn test_into_stream() {
        let ledger = Ledger::with_size(23);
        let pageable = Pageable::new(&ledger, QueryParams::new().with_page_size(10));

        let pages: Vec<Vec<u64>> = pageable.into_stream().try_collect().await.unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages.concat(), ledger.ids);
    }

    #[tokio::test]
    async fn test_stream_stops_after_error() {
        let mut ledger = Ledger::with_size(40);
        ledger.fail_on_request = Some(2);
        let pageable = Pageable::new(&ledger, QueryParams::new().with_page_size(10));

        let results: Vec<Result<Vec<u64>>> = {
            use futures_util::StreamExt;
            pageable.into_stream().collect().await
        };
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(results[2].is_err());
    }
}
