use std::sync::Arc;
use std::time::Duration;

use loctrack_core::model::Fix;
use loctrack_engine::{
    ControlCommand, Controller, IngestionService, ManualSource, RecordingStatusSink, ServiceState,
};
use loctrack_store::LocationStore;
use tokio::sync::mpsc;

fn controller() -> (Controller, Arc<ManualSource>, LocationStore) {
    let source = Arc::new(ManualSource::new());
    let store = LocationStore::open_in_memory().unwrap();
    let service = IngestionService::builder(source.clone(), Arc::new(store.clone()))
        .status(Arc::new(RecordingStatusSink::new()))
        .build()
        .unwrap();
    (Controller::new(service), source, store)
}

#[tokio::test]
async fn test_start_command_uses_default_interval() {
    let (controller, source, _store) = controller();

    controller.apply("START".parse().unwrap()).unwrap();

    assert_eq!(controller.service().state(), ServiceState::Running);
    assert_eq!(
        source.last_request().unwrap().interval,
        Duration::from_millis(10_000)
    );
}

#[tokio::test]
async fn test_dispatch_swallows_failures() {
    let (controller, source, _store) = controller();
    controller.dispatch(ControlCommand::Start { interval_ms: 5000 });

    // Second start fails inside dispatch; the first subscription survives.
    controller.dispatch(ControlCommand::Start { interval_ms: 1000 });

    assert_eq!(controller.service().interval_ms(), Some(5000));
    assert_eq!(source.registrations(), 1);
}

#[tokio::test]
async fn test_apply_reports_failures() {
    let (controller, _source, _store) = controller();
    controller.apply(ControlCommand::start()).unwrap();

    let err = controller.apply(ControlCommand::start()).unwrap_err();
    assert_eq!(err.code(), "ERR_INVALID_STATE");

    controller.apply(ControlCommand::Stop).unwrap();
    controller.apply(ControlCommand::Stop).unwrap();
    assert_eq!(controller.service().state(), ServiceState::Stopped);
}

#[tokio::test]
async fn test_run_drains_channel_then_stops() {
    let (controller, source, store) = controller();
    let service = controller.service().clone();
    let (tx, rx) = mpsc::channel(8);

    let task = tokio::spawn(controller.run(rx));

    tx.send(ControlCommand::Start { interval_ms: 2000 }).await.unwrap();
    while !source.is_registered() {
        tokio::task::yield_now().await;
    }
    source.push_fix(Fix::new(1.0, 2.0, 5.0));

    drop(tx);
    task.await.unwrap();

    assert_eq!(service.state(), ServiceState::Stopped);
    assert!(!source.is_registered());
    assert_eq!(store.count().unwrap(), 1);
}
