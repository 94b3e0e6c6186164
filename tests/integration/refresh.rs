//! Periodic list refresh and the fast refresh signal.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use podboard::actors::{RefreshActor, StatsActor};
use podboard::backend::{Backend, FakeBackend, Operation};
use podboard::dialog::{DialogKind, Focus, Overlay};
use podboard::refresh::fast_refresh_channel;
use podboard::resource::{ResourceKind, ResourceTables};
use podboard::runner::OperationId;
use podboard::tea::{Command, Message};

use crate::fixtures::{row, Harness};

fn live_view_id(cmds: &[Command]) -> OperationId {
    match cmds {
        [Command::StartLiveView { id, .. }] => *id,
        other => panic!("expected StartLiveView, got {:?}", other),
    }
}

#[tokio::test]
async fn test_signals_coalesce_into_one_pending_refresh() {
    let (tx, mut rx) = fast_refresh_channel();
    let senders: Vec<_> = (0..8).map(|_| tx.clone()).collect();

    let accepted = senders.iter().filter(|s| s.notify()).count();
    assert_eq!(accepted, 1);
    assert!(rx.try_take());
    assert!(!rx.try_take());
}

#[tokio::test]
async fn test_fast_signal_triggers_refresh_before_interval() {
    let backend = Arc::new(FakeBackend::demo());
    let dyn_backend: Arc<dyn Backend> = backend.clone();
    let tables = Arc::new(ResourceTables::new());
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
    let (fast_tx, fast_rx) = fast_refresh_channel();

    let handle = RefreshActor::new(dyn_backend, tables.clone(), msg_tx, fast_rx)
        .with_interval(Duration::from_secs(3600))
        .spawn();

    // The first tick fires immediately.
    for _ in 0..ResourceKind::ALL.len() {
        let msg = tokio::time::timeout(Duration::from_secs(2), msg_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(msg, Message::ListRefreshed(_)));
    }
    let first_round = backend.list_calls().len();
    assert_eq!(first_round, ResourceKind::ALL.len());

    assert!(fast_tx.notify());
    let msg = tokio::time::timeout(Duration::from_secs(2), msg_rx.recv())
        .await
        .expect("fast refresh well before the hour-long interval")
        .unwrap();
    assert!(matches!(msg, Message::ListRefreshed(_)));
    handle.shutdown();

    assert!(backend.list_calls().len() > first_round);
    assert_eq!(tables.len(ResourceKind::Containers), 3);
}

#[tokio::test]
async fn test_stats_view_raises_fast_refresh_while_open() {
    let backend: Arc<dyn Backend> = Arc::new(FakeBackend::demo());
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
    let (fast_tx, mut fast_rx) = fast_refresh_channel();

    let handle = StatsActor::new(
        backend,
        ResourceKind::Containers,
        OperationId::new(),
        vec!["3f1c2a9be0d1".into()],
        msg_tx,
        fast_tx,
    )
    .with_interval(Duration::from_millis(10))
    .spawn();

    let msg = tokio::time::timeout(Duration::from_secs(2), msg_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(msg, Message::StatsUpdated { .. }));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(fast_rx.try_take());

    handle.shutdown();
    tokio::time::sleep(Duration::from_millis(30)).await;
    while fast_rx.try_take() {}
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!fast_rx.try_take(), "closed stats view keeps signalling");
}

#[tokio::test]
async fn test_stats_command_lifecycle_through_update() {
    let mut h = Harness::new(FakeBackend::demo());
    h.select(ResourceKind::Containers, "9ad04e7c55b2");

    let cmds = h.run_command("stats").await;
    assert!(matches!(
        &cmds[..],
        [Command::StartLiveView { kind: ResourceKind::Containers, ids, .. }]
            if ids == &vec!["9ad04e7c55b2".to_string()]
    ));
    assert_eq!(h.effects.live_views(), 1);

    h.settle().await;
    match h.overlay() {
        Overlay::Stats(d) => {
            let report = d.report.as_ref().expect("stats sample");
            assert_eq!(report.rows[0][0], "9ad04e7c55b2");
        }
        other => panic!("expected stats dialog, got {:?}", other),
    }
    assert!(h.backend.calls().iter().any(|op| matches!(op, Operation::Stats { .. })));

    let cmds = h.press(crossterm::event::KeyCode::Esc).await;
    assert_eq!(
        cmds,
        vec![Command::StopLiveView {
            kind: ResourceKind::Containers
        }]
    );
    assert_eq!(h.effects.live_views(), 0);
}

#[tokio::test]
async fn test_reopened_stats_view_survives_the_closed_one() {
    let backend = FakeBackend::demo()
        .fail("stats", "container exited")
        .with_delay(Duration::from_millis(150));
    let mut h = Harness::new(backend);
    h.select(ResourceKind::Containers, "9ad04e7c55b2");

    let first = live_view_id(&h.run_command("stats").await);
    h.press(crossterm::event::KeyCode::Esc).await;
    let second = live_view_id(&h.run_command("stats").await);
    assert_ne!(first, second);
    assert_eq!(h.effects.live_views(), 1);

    // Late results for the closed view leave the open one alone.
    let cmds = h
        .send(Message::StatsUpdated {
            kind: ResourceKind::Containers,
            id: first,
            report: Default::default(),
        })
        .await;
    assert!(cmds.is_empty());
    let cmds = h
        .send(Message::StatsFailed {
            kind: ResourceKind::Containers,
            id: first,
            error: "container exited".into(),
        })
        .await;
    assert!(cmds.is_empty());
    assert_eq!(h.focus(), Focus::Dialog(DialogKind::Stats));
    assert!(matches!(h.overlay(), Overlay::Stats(d) if d.id == second && d.report.is_none()));
    assert_eq!(h.effects.live_views(), 1);

    // The cancelled actor stays quiet; the next message is the open view's.
    match h.next_message().await {
        Message::StatsFailed { id, .. } => assert_eq!(id, second),
        other => panic!("expected a stats failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_refresh_reconciles_selection() {
    let backend = FakeBackend::new().with_rows(
        ResourceKind::Networks,
        vec![row("podman", "podman"), row("backend", "backend")],
    );
    let mut h = Harness::new(backend);
    h.select(ResourceKind::Networks, "backend");
    assert_eq!(h.view().selection.as_ref().unwrap().id, "backend");

    h.model
        .tables
        .replace(ResourceKind::Networks, vec![row("podman", "podman")]);
    h.send(Message::ListRefreshed(ResourceKind::Networks)).await;

    assert_eq!(h.view().cursor, 0);
    assert_eq!(h.view().selection.as_ref().unwrap().id, "podman");

    h.model.tables.replace(ResourceKind::Networks, vec![]);
    h.send(Message::ListRefreshed(ResourceKind::Networks)).await;
    assert!(h.view().selection.is_none());
}
