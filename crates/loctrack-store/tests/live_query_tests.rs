// Integration tests for live queries: subscribe-time state, re-emission on
// committed writes and resubscription.

use loctrack_core::model::NewSample;
use loctrack_store::LocationStore;
use std::time::Duration;
use tokio::time::timeout;

fn sample(ts: i64) -> NewSample {
    NewSample {
        latitude: 10.0,
        longitude: 20.0,
        precision: 4.0,
        timestamp: ts,
    }
}

#[tokio::test]
async fn test_new_subscriber_receives_current_state_immediately() {
    let store = LocationStore::open_in_memory().unwrap();
    store.insert(&sample(100)).unwrap();
    store.insert(&sample(200)).unwrap();

    let mut all = store.stream_all().unwrap();
    let first = timeout(Duration::from_secs(1), all.next())
        .await
        .expect("current state should be delivered without a write")
        .unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first[0].timestamp, 200);
}

#[tokio::test]
async fn test_stream_re_emits_after_each_write() {
    let store = LocationStore::open_in_memory().unwrap();
    let mut latest = store.stream_latest();
    assert_eq!(latest.next().await, Some(None));

    let writer = store.clone();
    tokio::task::spawn_blocking(move || writer.insert(&sample(100)))
        .await
        .unwrap()
        .unwrap();

    let emitted = timeout(Duration::from_secs(1), latest.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(emitted.map(|s| s.timestamp), Some(100));
}

#[tokio::test]
async fn test_latest_unchanged_by_older_sample_but_all_grows() {
    let store = LocationStore::open_in_memory().unwrap();
    store.insert(&sample(300)).unwrap();

    let mut all = store.stream_all().unwrap();
    let mut latest = store.stream_latest();
    all.next().await;
    latest.next().await;

    store.insert(&sample(50)).unwrap();

    let rows = all.next().await.unwrap();
    assert_eq!(
        rows.iter().map(|s| s.timestamp).collect::<Vec<_>>(),
        vec![300, 50]
    );
    let newest = latest.next().await.unwrap().unwrap();
    assert_eq!(newest.timestamp, 300);
}

#[tokio::test]
async fn test_resubscribe_replays_current_state() {
    let store = LocationStore::open_in_memory().unwrap();
    {
        let mut first = store.stream_all().unwrap();
        first.next().await;
        store.insert(&sample(1)).unwrap();
        first.next().await;
    }

    let mut again = store.stream_all().unwrap();
    assert_eq!(again.next().await.map(|rows| rows.len()), Some(1));
}

#[tokio::test]
async fn test_wait_for_resolves_on_matching_state() {
    let store = LocationStore::open_in_memory().unwrap();
    let mut all = store.stream_all().unwrap();

    let writer = store.clone();
    let handle = tokio::task::spawn_blocking(move || {
        for ts in 1..=3 {
            writer.insert(&sample(ts)).unwrap();
        }
    });

    let rows = timeout(Duration::from_secs(2), all.wait_for(|rows| rows.len() == 3))
        .await
        .unwrap()
        .unwrap();
    handle.await.unwrap();

    assert_eq!(rows[0].timestamp, 3);
}

#[tokio::test]
async fn test_stream_ends_when_store_dropped() {
    let store = LocationStore::open_in_memory().unwrap();
    let mut latest = store.stream_latest();
    latest.next().await;

    drop(store);

    assert_eq!(latest.next().await, None);
}

#[tokio::test]
async fn test_subscribed_view_matches_table_after_each_write() {
    let store = LocationStore::open_in_memory().unwrap();
    store.insert(&sample(500)).unwrap();
    let mut all = store.stream_all().unwrap();
    all.next().await;

    // Out-of-order and tied timestamps land where a fresh read puts them.
    for ts in [100, 900, 500, 300, 900, -20] {
        store.insert(&sample(ts)).unwrap();
        let emitted = all.next().await.unwrap();
        assert_eq!(emitted, store.all().unwrap());
    }

    let order: Vec<(i64, i64)> = all.current().iter().map(|s| (s.timestamp, s.id)).collect();
    assert_eq!(
        order,
        vec![(900, 6), (900, 3), (500, 4), (500, 1), (300, 5), (100, 2), (-20, 7)]
    );
}

#[tokio::test]
async fn test_subscriber_after_unwatched_writes_sees_full_table() {
    let store = LocationStore::open_in_memory().unwrap();
    {
        let mut early = store.stream_all().unwrap();
        early.next().await;
    }
    for ts in 1..=50 {
        store.insert(&sample(ts)).unwrap();
    }

    let mut late = store.stream_all().unwrap();
    let rows = late.next().await.unwrap();

    assert_eq!(rows.len(), 50);
    assert_eq!(rows, store.all().unwrap());
}
