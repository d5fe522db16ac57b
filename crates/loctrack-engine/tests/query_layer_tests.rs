use std::sync::Arc;

use futures::StreamExt;
use loctrack_core::model::Fix;
use loctrack_core::ManualClock;
use loctrack_engine::{IngestionService, LocationQueries, ManualSource, RecordingStatusSink};
use loctrack_store::LocationStore;

#[tokio::test]
async fn test_new_subscriber_sees_current_state_first() {
    let store = LocationStore::open_in_memory().unwrap();
    let queries = LocationQueries::new(store.clone());

    let mut all = queries.all_locations().unwrap();
    let mut latest = queries.latest_location();

    assert_eq!(all.next().await, Some(vec![]));
    assert_eq!(latest.next().await, Some(None));
}

#[tokio::test]
async fn test_queries_follow_ingested_fixes() {
    let source = Arc::new(ManualSource::new());
    let store = LocationStore::open_in_memory().unwrap();
    let clock = Arc::new(ManualClock::new(100));
    let service = IngestionService::builder(source.clone(), Arc::new(store.clone()))
        .status(Arc::new(RecordingStatusSink::new()))
        .clock(clock.clone())
        .build()
        .unwrap();
    let queries = LocationQueries::new(store);
    let mut latest = queries.latest_location();
    latest.next().await;

    service.start(1000).unwrap();
    source.push_fix(Fix::new(1.0, 2.0, 5.0));

    let first = latest
        .wait_for(|s| s.is_some())
        .await
        .flatten()
        .expect("latest sample");
    assert_eq!(first.timestamp, 100);

    clock.set(300);
    source.push_fix(Fix::new(3.0, 4.0, 5.0));
    service.flush().await;

    let timestamps: Vec<i64> = queries
        .all_locations()
        .unwrap()
        .current()
        .iter()
        .map(|s| s.timestamp)
        .collect();
    assert_eq!(timestamps, vec![300, 100]);
}

#[tokio::test]
async fn test_stream_adapter_replays_on_resubscribe() {
    let store = LocationStore::open_in_memory().unwrap();
    let queries = LocationQueries::new(store.clone());
    store
        .insert(&loctrack_core::NewSample {
            latitude: 1.0,
            longitude: 1.0,
            precision: 1.0,
            timestamp: 10,
        })
        .unwrap();

    let first: Vec<_> = queries.all_locations().unwrap().into_stream().take(1).collect().await;
    let again: Vec<_> = queries.all_locations().unwrap().into_stream().take(1).collect().await;

    assert_eq!(first, again);
    assert_eq!(first[0].len(), 1);
}
