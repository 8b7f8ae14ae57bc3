//! Single-flight paged fetching with sequence-based stale-drop.
//!
//! The fetcher owns the [`FetchCursor`] and is the only code allowed to mutate it.
//! Requests run as tokio tasks that never touch picker state: they report back
//! through a channel, and [`PageFetcher::resolve`] decides on the event loop
//! whether the outcome is still wanted.

use std::sync::Arc;

use tokio::select;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_util::sync::CancellationToken;

use crate::source::{FetchError, Page, PageResponse, PageSource};

/// Where the next request goes, and which request is current
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchCursor {
    /// 1-based page number the next "load more" asks for
    pub next_page: usize,
    /// Stamp of the most recently issued request (or reset)
    pub sequence: u64,
    /// Whether the current request is still outstanding
    pub in_flight: bool,
}

impl Default for FetchCursor {
    fn default() -> Self {
        Self {
            next_page: 1,
            sequence: 0,
            in_flight: false,
        }
    }
}

/// Completion of a request, as sent back to the event loop
#[derive(Debug)]
pub struct FetchOutcome {
    /// Sequence the request was issued under
    pub sequence: u64,
    /// Filter the request was issued for
    pub query: String,
    /// Requested page
    pub page_number: usize,
    /// What the source answered
    pub result: Result<PageResponse, FetchError>,
}

/// What a [`FetchOutcome`] amounts to once checked against the cursor
#[derive(Debug)]
pub enum Resolution {
    /// A newer request superseded this one; the result must be ignored
    Stale,
    /// The current request succeeded
    Loaded(Page),
    /// The current request failed; the same page will be asked again next time
    Failed(FetchError),
}

/// Issues page requests one at a time
#[derive(derive_more::Debug)]
pub struct PageFetcher {
    #[debug(skip)]
    source: Arc<dyn PageSource>,
    page_size: usize,
    cursor: FetchCursor,
    #[debug(skip)]
    tx: UnboundedSender<FetchOutcome>,
    cancellation_token: CancellationToken,
}

impl PageFetcher {
    /// Creates a fetcher and the receiving end of its completions
    pub fn new(source: Arc<dyn PageSource>, page_size: usize) -> (Self, UnboundedReceiver<FetchOutcome>) {
        let (tx, rx) = unbounded_channel();
        let fetcher = Self {
            source,
            page_size: page_size.max(1),
            cursor: FetchCursor::default(),
            tx,
            cancellation_token: CancellationToken::new(),
        };
        (fetcher, rx)
    }

    /// The current cursor
    pub fn cursor(&self) -> FetchCursor {
        self.cursor
    }

    /// Whether a request is outstanding
    pub fn in_flight(&self) -> bool {
        self.cursor.in_flight
    }

    /// Page size used for every request
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Starts over at page 1 and invalidates whatever is in flight.
    ///
    /// The sequence advances so that a response issued before the reset can never
    /// be mistaken for a current one, even if no new request follows.
    pub fn reset(&mut self) {
        self.cursor = FetchCursor {
            next_page: 1,
            sequence: self.cursor.sequence + 1,
            in_flight: false,
        };
        debug!("fetch cursor reset, sequence {}", self.cursor.sequence);
    }

    /// Resets the cursor and requests page 1 of `query` under the sequence the
    /// reset produced. Returns that sequence.
    pub fn restart(&mut self, query: &str) -> u64 {
        self.reset();
        self.issue(query, 1);
        self.cursor.sequence
    }

    /// Requests `page_number` of `query`.
    ///
    /// Does nothing and returns `None` while another request is in flight, otherwise
    /// returns the sequence the request was issued under. Must be called from
    /// within a tokio runtime.
    pub fn request_page(&mut self, query: &str, page_number: usize) -> Option<u64> {
        if self.cursor.in_flight {
            trace!("request for page {page_number} of {query:?} ignored: a request is in flight");
            return None;
        }
        self.cursor.sequence += 1;
        self.issue(query, page_number);
        Some(self.cursor.sequence)
    }

    fn issue(&mut self, query: &str, page_number: usize) {
        self.cursor.in_flight = true;
        let sequence = self.cursor.sequence;
        debug!("requesting page {page_number} of {query:?} (sequence {sequence})");

        let fetch = self.source.fetch_page(query, page_number, self.page_size);
        let tx = self.tx.clone();
        let token = self.cancellation_token.clone();
        let query = query.to_owned();
        tokio::spawn(async move {
            let result = select! {
                _ = token.cancelled() => return,
                result = fetch => result,
            };
            // the receiver is gone once the session is over
            let _ = tx.send(FetchOutcome {
                sequence,
                query,
                page_number,
                result,
            });
        });
    }

    /// Checks an outcome against the cursor and updates the cursor accordingly
    pub fn resolve(&mut self, outcome: FetchOutcome) -> Resolution {
        if outcome.sequence != self.cursor.sequence {
            trace!(
                "dropping stale page {} of {:?} (sequence {}, current {})",
                outcome.page_number, outcome.query, outcome.sequence, self.cursor.sequence
            );
            return Resolution::Stale;
        }
        self.cursor.in_flight = false;
        match outcome.result {
            Ok(response) => {
                self.cursor.next_page = outcome.page_number + 1;
                debug!(
                    "page {} of {:?} loaded: {} items, {} in total",
                    outcome.page_number,
                    outcome.query,
                    response.items.len(),
                    response.total_count
                );
                Resolution::Loaded(Page {
                    items: response.items,
                    page_number: outcome.page_number,
                    total_count: response.total_count,
                    page_size: self.page_size,
                    query: outcome.query,
                })
            }
            Err(err) => {
                warn!("page {} of {:?} failed: {err}", outcome.page_number, outcome.query);
                Resolution::Failed(err)
            }
        }
    }

    /// Abandons every outstanding request
    pub fn shutdown(&self) {
        self.cancellation_token.cancel();
    }
}

impl Drop for PageFetcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
