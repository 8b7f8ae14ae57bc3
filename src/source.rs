//! The remote directory service, seen from the picker.
//!
//! A [`PageSource`] answers offset/limit paged queries filtered by free text. The
//! query itself is an opaque box: the picker only relies on the page contents and
//! the reported total.

use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::PickItem;

/// What a [`PageSource`] returns for one query
#[derive(Clone, Debug, Default)]
pub struct PageResponse {
    /// Items of the requested page, in server order
    pub items: Vec<Arc<dyn PickItem>>,
    /// Number of items matching the query across all pages
    pub total_count: usize,
}

impl PageResponse {
    /// Creates a response from items and the total count
    pub fn new(items: Vec<Arc<dyn PickItem>>, total_count: usize) -> Self {
        Self { items, total_count }
    }
}

/// One page, as merged into the collection cache.
///
/// This is a [`PageResponse`] stamped by the fetcher with the request that
/// produced it.
#[derive(Clone, Debug)]
pub struct Page {
    /// Items of the page, in server order
    pub items: Vec<Arc<dyn PickItem>>,
    /// 1-based page number
    pub page_number: usize,
    /// Number of items matching the query across all pages
    pub total_count: usize,
    /// Page size the request was issued with
    pub page_size: usize,
    /// Committed filter the page was fetched for
    pub query: String,
}

/// Failure of a page request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network or transport failure
    #[error("transport error: {0}")]
    Transport(String),
    /// The service answered with an error status
    #[error("request rejected with status {status}: {message}")]
    Rejected {
        /// Status code reported by the service
        status: u16,
        /// Message reported by the service
        message: String,
    },
    /// The source is no longer available
    #[error("page source closed")]
    Closed,
}

/// The remote, paged collection.
///
/// Implementations must be safe to call repeatedly with the same arguments
/// (idempotent reads). The returned future must own everything it needs: it is
/// driven on the tokio runtime, outside of the picker's state.
pub trait PageSource: Send + Sync + 'static {
    /// Fetches page `page_number` (1-based) of size `page_size` for `query`
    fn fetch_page(
        &self,
        query: &str,
        page_number: usize,
        page_size: usize,
    ) -> BoxFuture<'static, Result<PageResponse, FetchError>>;
}

impl<F> PageSource for F
where
    F: Fn(&str, usize, usize) -> BoxFuture<'static, Result<PageResponse, FetchError>> + Send + Sync + 'static,
{
    fn fetch_page(
        &self,
        query: &str,
        page_number: usize,
        page_size: usize,
    ) -> BoxFuture<'static, Result<PageResponse, FetchError>> {
        self(query, page_number, page_size)
    }
}
