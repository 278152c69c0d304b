mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;

use common::{Gate, MockSearch, item};
use parlour_booking::{
    backend::ApiError,
    error::AppError,
    services::search_service::{SearchOutcome, SearchSession},
};

fn catalog() -> MockSearch {
    MockSearch {
        games: vec![item("1", "Halo"), item("2", "Halo 3"), item("3", "Doom")],
        ..MockSearch::default()
    }
}

#[tokio::test(start_paused = true)]
async fn blank_term_returns_nothing_without_a_call() {
    let search = Arc::new(catalog());
    let session = SearchSession::new(search.clone(), None);

    assert_eq!(
        session.search("   ").await.unwrap(),
        SearchOutcome::Results(Vec::new())
    );
    assert!(search.calls.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn newer_search_within_quiet_period_supersedes_older() {
    let search = Arc::new(catalog());
    let session = SearchSession::new(search.clone(), Some("t1".into()));

    let (first, second) = tokio::join!(session.search("hal"), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.search("halo 3").await
    });

    assert_eq!(first.unwrap(), SearchOutcome::Superseded);
    assert_eq!(
        second.unwrap(),
        SearchOutcome::Results(vec![item("2", "Halo 3")])
    );
    assert_eq!(*search.calls.lock(), vec!["halo 3".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn searches_spaced_beyond_quiet_period_both_run() {
    let search = Arc::new(catalog());
    let session = SearchSession::new(search.clone(), None)
        .with_quiet_period(Duration::from_millis(50));

    assert_matches!(session.search("doom").await, Ok(SearchOutcome::Results(r)) if r.len() == 1);
    assert_matches!(session.search("halo").await, Ok(SearchOutcome::Results(r)) if r.len() == 2);
    assert_eq!(search.calls.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn response_arriving_after_a_newer_search_is_discarded() {
    let gate = Arc::new(Gate::default());
    let search = Arc::new(MockSearch {
        gate: Some(gate.clone()),
        ..catalog()
    });
    let session = SearchSession::new(search.clone(), None);

    let (first, ()) = tokio::join!(session.search("halo"), async {
        gate.entered.notified().await;
        session.cancel();
        gate.release.notify_one();
    });

    assert_eq!(first.unwrap(), SearchOutcome::Superseded);
    assert_eq!(search.calls.lock().len(), 1, "the call was made, its result dropped");
}

#[tokio::test(start_paused = true)]
async fn failure_carries_term_and_cause() {
    let search = Arc::new(MockSearch {
        fail: true,
        ..catalog()
    });
    let session = SearchSession::new(search, None);

    let err = session.search(" halo ").await.unwrap_err();
    assert_matches!(
        err,
        AppError::SearchFailed { ref term, cause: ApiError::Transport(_) } if term == "halo"
    );
}
