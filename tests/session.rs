#[allow(dead_code)]
mod common;

use std::time::Duration;

use picklist::prelude::*;

fn directory() -> Vec<Arc<dyn PickItem>> {
    common::items(&[
        (1, "Ann Lee"),
        (2, "Anna Berg"),
        (3, "Bob Stone"),
        (4, "Annie Hall"),
        (5, "Carl Ng"),
        (6, "Dan Annable"),
    ])
}

fn options(page_size: usize) -> PicklistOptions {
    PicklistOptionsBuilder::default()
        .page_size(page_size)
        .build()
        .unwrap()
}

async fn collect(mut handle: PicklistHandle) -> (Vec<Event>, PicklistOutput) {
    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }
    (events, handle.join().await.unwrap())
}

fn commits(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::QueryCommitted(q) => Some(q.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn keystrokes_inside_the_quiet_period_commit_once() {
    let mut handle = Picklist::spawn(options(10), Arc::new(MemorySource::new(directory())));
    for command in [
        Command::SetQuery(String::from("a")),
        Command::Wait(100),
        Command::SetQuery(String::from("an")),
        Command::Wait(100),
        Command::SetQuery(String::from("ann")),
        Command::Settle,
        Command::Accept,
    ] {
        handle.send(command).unwrap();
    }
    let (events, output) = collect(handle).await;

    assert_eq!(commits(&events), vec!["", "ann"]);
    assert_eq!(output.committed_query, "ann");
    assert_eq!(output.items.len(), 4);
    assert!(!output.is_abort);
}

#[tokio::test(start_paused = true)]
async fn pauses_longer_than_the_quiet_period_commit_each_time() {
    let mut handle = Picklist::spawn(options(10), Arc::new(MemorySource::new(directory())));
    for command in [
        Command::SetQuery(String::from("bob")),
        Command::Wait(400),
        Command::SetQuery(String::from("ann")),
        Command::Settle,
    ] {
        handle.send(command).unwrap();
    }
    handle.close();
    let (events, output) = collect(handle).await;
    assert_eq!(commits(&events), vec!["", "bob", "ann"]);
    assert_eq!(output.committed_query, "ann");
}

#[tokio::test(start_paused = true)]
async fn scrolling_loads_every_page() {
    let source = MemorySource::new(directory()).latency(Duration::from_millis(50));
    let mut handle = Picklist::spawn(options(2), Arc::new(source));
    handle.send(Command::Settle).unwrap();
    for _ in 0..3 {
        handle.send(Command::Scroll(0)).unwrap();
        handle.send(Command::Settle).unwrap();
    }
    handle.close();
    let (_, output) = collect(handle).await;

    let ids: Vec<String> = output.items.iter().map(|item| item.id().to_string()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);
    assert_eq!(output.total_count, Some(6));
}

#[tokio::test(start_paused = true)]
async fn selection_is_kept_across_queries() {
    let mut handle = Picklist::spawn(options(10), Arc::new(MemorySource::new(directory())));
    for command in [
        Command::Settle,
        Command::Select(ItemId::from(2u64)),
        Command::SetQuery(String::from("bob")),
        Command::CommitQuery,
        Command::Settle,
        Command::Accept,
    ] {
        handle.send(command).unwrap();
    }
    let (events, output) = collect(handle).await;

    assert_eq!(output.items.len(), 1);
    assert_eq!(output.selection.id, Some(ItemId::from(2u64)));
    assert_eq!(output.selection.text().as_deref(), Some("Anna Berg"));
    assert!(events.iter().any(|e| matches!(e, Event::SelectionChanged(_))));
}

#[tokio::test]
async fn cancel_aborts_the_session() {
    let source = common::ScriptedSource::default();
    let handle = Picklist::spawn(options(10), Arc::new(source.clone()));
    handle.cancel();
    let output = handle.join().await.unwrap();
    assert!(output.is_abort);
}

#[tokio::test]
async fn send_after_close_fails() {
    let mut handle = Picklist::spawn(options(10), Arc::new(MemorySource::new(directory())));
    handle.close();
    assert!(handle.send(Command::Accept).is_err());
    handle.cancel();
}

#[test]
fn run_with_accepts_a_pick() {
    let output = Picklist::run_with(
        options(10),
        Arc::new(MemorySource::new(directory())),
        [
            Command::SetQuery(String::from("anna")),
            Command::CommitQuery,
            Command::Settle,
            Command::SelectRow(0),
            Command::Accept,
        ],
    )
    .unwrap();
    assert_eq!(output.query, "anna");
    assert_eq!(output.selection.text().as_deref(), Some("Anna Berg"));
    assert_eq!(output.selected().map(|item| item.output().into_owned()), Some(String::from("Anna Berg")));
}

#[test]
fn run_with_abort() {
    let output = Picklist::run_with(
        options(10),
        Arc::new(MemorySource::new(directory())),
        [Command::SelectRow(0), Command::Abort],
    )
    .unwrap();
    assert!(output.is_abort);
}

#[test]
fn run_with_events_reports_loading() {
    let mut states = Vec::new();
    Picklist::run_with_events(
        options(4),
        Arc::new(MemorySource::new(directory())),
        [Command::Settle],
        |event| {
            if let Event::LoadingStateChanged(state) = event {
                states.push(state);
            }
        },
    )
    .unwrap();
    assert_eq!(
        states.last(),
        Some(&LoadingState {
            in_flight: false,
            has_more: true,
            error: None
        })
    );
}
