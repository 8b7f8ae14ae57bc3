use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::BoxFuture;
use picklist::picker::FetchOutcome;
use picklist::prelude::*;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tokio::sync::oneshot;
use tokio::time::Instant;

type Reply = oneshot::Sender<Result<PageResponse, FetchError>>;

/// A page source whose requests stay pending until the test answers them.
///
/// Every call is logged; answering a call releases the matching future, in
/// whatever order the test chooses.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    pending: Arc<Mutex<Vec<(String, usize, Reply)>>>,
    calls: Arc<Mutex<Vec<(String, usize)>>>,
}

impl ScriptedSource {
    /// Every `(query, page)` requested so far, in order
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of requests for `query`/`page`
    pub fn count(&self, query: &str, page: usize) -> usize {
        self.calls().iter().filter(|(q, p)| q == query && *p == page).count()
    }

    /// Answers the oldest pending request for `query`/`page`
    pub fn reply(&self, query: &str, page: usize, result: Result<PageResponse, FetchError>) {
        let mut pending = self.pending.lock().unwrap();
        let idx = pending
            .iter()
            .position(|(q, p, _)| q == query && *p == page)
            .unwrap_or_else(|| panic!("no pending request for page {page} of {query:?}"));
        let (_, _, tx) = pending.remove(idx);
        tx.send(result).ok();
    }
}

impl PageSource for ScriptedSource {
    fn fetch_page(
        &self,
        query: &str,
        page_number: usize,
        _page_size: usize,
    ) -> BoxFuture<'static, Result<PageResponse, FetchError>> {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().unwrap().push((query.to_owned(), page_number));
        self.pending.lock().unwrap().push((query.to_owned(), page_number, tx));
        async move { rx.await.unwrap_or(Err(FetchError::Closed)) }.boxed()
    }
}

/// Builds items from `(id, text)` pairs
pub fn items(entries: &[(u64, &str)]) -> Vec<Arc<dyn PickItem>> {
    entries
        .iter()
        .map(|(id, text)| Arc::new(Record::new(*id, *text)) as Arc<dyn PickItem>)
        .collect()
}

/// Drives a [`Picker`] by hand, the way the session loop does.
pub struct Harness {
    pub picker: Picker,
    pub source: ScriptedSource,
    pub events: UnboundedReceiver<Event>,
    fetch_rx: UnboundedReceiver<FetchOutcome>,
}

impl Harness {
    /// Creates an activated picker; page 1 of the initial query is pending
    pub fn new(options: PicklistOptions) -> Self {
        let source = ScriptedSource::default();
        let (event_tx, events) = unbounded_channel();
        let (mut picker, fetch_rx) = Picker::from_options(&options, Arc::new(source.clone()), event_tx);
        picker.activate();
        Self {
            picker,
            source,
            events,
            fetch_rx,
        }
    }

    /// Creates a harness with the given page size and default settings otherwise
    pub fn with_page_size(page_size: usize) -> Self {
        Self::new(
            PicklistOptionsBuilder::default()
                .page_size(page_size)
                .build()
                .unwrap(),
        )
    }

    /// Answers a pending request and feeds its outcome to the picker
    pub async fn release(&mut self, query: &str, page: usize, result: Result<PageResponse, FetchError>) {
        self.source.reply(query, page, result);
        let outcome = self.fetch_rx.recv().await.expect("fetch outcome");
        self.picker.handle_outcome(outcome);
    }

    /// Answers a pending request with a page
    pub async fn page(&mut self, query: &str, page: usize, entries: &[(u64, &str)], total: usize) {
        self.release(query, page, Ok(PageResponse::new(items(entries), total)))
            .await;
    }

    /// Runs one command
    pub fn command(&mut self, command: Command) {
        self.picker.handle_command(command, Instant::now());
    }

    /// Records a scroll sample and runs one frame
    pub fn scroll(&mut self, distance: u32) {
        self.command(Command::Scroll(distance));
        self.picker.on_frame();
    }

    /// Ids of the loaded items, in order
    pub fn ids(&self) -> Vec<String> {
        self.picker.cache().iter().map(|item| item.id().to_string()).collect()
    }

    /// Text of the selected value
    pub fn selected_text(&self) -> Option<String> {
        self.picker.selection().text().map(|t| t.into_owned())
    }

    /// Drains the emitted events
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
