//! A [`PageSource`] serving pages out of a list held in memory.
//!
//! Filtering is a case-aware substring match of every whitespace-separated term
//! of the query against the item text, optionally ignoring accents. The source
//! answers the same arguments with the same page, which is what the picker
//! expects from a remote service.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::source::{FetchError, PageResponse, PageSource};
use crate::util::{contains_upper, normalize};
use crate::{CaseMatching, PickItem, PicklistOptions};

/// In-memory paged collection
#[derive(Clone, Debug)]
pub struct MemorySource {
    items: Arc<Vec<Arc<dyn PickItem>>>,
    case: CaseMatching,
    normalize: bool,
    latency: Duration,
}

impl MemorySource {
    /// Creates a source over `items`, in that order
    pub fn new(items: Vec<Arc<dyn PickItem>>) -> Self {
        Self {
            items: Arc::new(items),
            case: CaseMatching::default(),
            normalize: false,
            latency: Duration::ZERO,
        }
    }

    /// Creates a source using the matching and latency settings of `options`
    pub fn from_options(options: &PicklistOptions, items: Vec<Arc<dyn PickItem>>) -> Self {
        Self::new(items)
            .case(options.case)
            .normalize(options.normalize)
            .latency(Duration::from_millis(options.latency))
    }

    /// Sets the case sensitivity
    pub fn case(mut self, case: CaseMatching) -> Self {
        self.case = case;
        self
    }

    /// Sets whether accents are ignored
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Sets the delay before each page is returned
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of items, unfiltered
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the source holds no item
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Computes page `page_number` (1-based) of the items matching `query`
    pub fn query(&self, query: &str, page_number: usize, page_size: usize) -> PageResponse {
        let case_sensitive = match self.case {
            CaseMatching::Respect => true,
            CaseMatching::Ignore => false,
            CaseMatching::Smart => contains_upper(query),
        };
        let prepare = |s: &str| {
            let s = if self.normalize { normalize(s) } else { s.to_owned() };
            if case_sensitive { s } else { s.to_lowercase() }
        };
        let terms: Vec<String> = query.split_whitespace().map(&prepare).collect();

        let matching: Vec<&Arc<dyn PickItem>> = self
            .items
            .iter()
            .filter(|item| {
                let text = prepare(&item.text());
                terms.iter().all(|term| text.contains(term.as_str()))
            })
            .collect();

        let page_size = page_size.max(1);
        let offset = page_number.saturating_sub(1).saturating_mul(page_size);
        let items = matching.iter().skip(offset).take(page_size).map(|item| (*item).clone()).collect();
        trace!(
            "memory source: page {page_number} of {query:?}, {} matching items",
            matching.len()
        );
        PageResponse::new(items, matching.len())
    }
}

impl PageSource for MemorySource {
    fn fetch_page(
        &self,
        query: &str,
        page_number: usize,
        page_size: usize,
    ) -> BoxFuture<'static, Result<PageResponse, FetchError>> {
        let response = self.query(query, page_number, page_size);
        let latency = self.latency;
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            Ok(response)
        }
        .boxed()
    }
}
