//! Operation runner: progress lifetime, completion ordering and error
//! aggregation.

use std::sync::Arc;
use std::time::Duration;

use podboard::backend::{Backend, FakeBackend, Operation, Outcome, Verb};
use podboard::dialog::{DialogKind, Focus, Overlay};
use podboard::resource::ResourceKind;
use podboard::runner::{OperationId, OperationRunner};
use podboard::tea::dispatch::run_command;
use podboard::tea::{Message, NotificationLevel};
use podboard::Error;
use tokio::sync::mpsc;

use crate::fixtures::{single_pod, Harness};

#[tokio::test]
async fn test_progress_stays_until_completion_then_result_replaces_it() {
    let backend = FakeBackend::demo().with_delay(Duration::from_millis(100));
    let mut h = Harness::new(backend);
    h.select(ResourceKind::Containers, "3f1c2a9be0d1");

    h.run_command("logs").await;
    match h.overlay() {
        Overlay::Progress(p) => assert_eq!(p.title, "container logs in progress"),
        other => panic!("expected progress, got {:?}", other),
    }

    // The result arrives; until it is applied progress is still up.
    let msg = h.next_message().await;
    assert!(h.view().modals.is_displayed(DialogKind::Progress));

    h.send(msg).await;
    assert!(!h.view().modals.is_displayed(DialogKind::Progress));
    match h.overlay() {
        Overlay::Message(m) => assert_eq!(m.title, "podman container logs"),
        other => panic!("expected logs message, got {:?}", other),
    }
}

#[tokio::test]
async fn test_second_operation_on_busy_view_is_dropped() {
    let mut h = Harness::new(single_pod().with_delay(Duration::from_millis(100)));
    h.select(ResourceKind::Pods, "abc123");

    h.run_command("start").await;
    let first = h.view().in_flight.expect("operation in flight");

    // The picker is unreachable under progress; dispatch directly.
    let mut cmds = Vec::new();
    run_command(&mut h.model, ResourceKind::Pods, "stop", &mut cmds);
    assert!(cmds.is_empty());
    assert_eq!(h.view().in_flight, Some(first));
    let note = h.model.notification.clone().expect("notification");
    assert_eq!(note.level, NotificationLevel::Info);

    h.settle().await;
    assert!(h.view().in_flight.is_none());
    assert_eq!(h.backend.calls().len(), 1);
}

#[tokio::test]
async fn test_stale_completion_leaves_current_progress_alone() {
    let mut h = Harness::new(single_pod().with_delay(Duration::from_millis(100)));
    h.select(ResourceKind::Pods, "abc123");
    h.run_command("restart").await;

    let stale = Operation::Target {
        kind: ResourceKind::Pods,
        verb: Verb::Stop,
        id: "abc123".into(),
    };
    h.send(Message::OperationFinished {
        kind: ResourceKind::Pods,
        id: OperationId::new(),
        label: stale.label(),
        result: Ok(Outcome::Done),
    })
    .await;

    assert_eq!(h.focus(), Focus::Dialog(DialogKind::Progress));
    assert!(h.view().in_flight.is_some());

    h.settle().await;
    assert_eq!(h.focus(), Focus::Table);
}

#[tokio::test]
async fn test_runner_aggregates_batch_errors() {
    let backend: Arc<dyn Backend> = Arc::new(
        single_pod().batch_errors("kill", &["container 1: no such process", "container 2: no such process"]),
    );
    let (tx, mut rx) = mpsc::unbounded_channel();
    let runner = OperationRunner::new(backend, tx);
    let id = OperationId::new();

    runner
        .run(
            ResourceKind::Pods,
            id,
            Operation::Target {
                kind: ResourceKind::Pods,
                verb: Verb::Kill,
                id: "abc123".into(),
            },
        )
        .await
        .unwrap();

    match rx.recv().await {
        Some(Message::OperationFinished {
            id: got,
            label,
            result: Err(Error::Aggregate(errors)),
            ..
        }) => {
            assert_eq!(got, id);
            assert_eq!(label.error_title(), "POD (abc123) KILL ERROR");
            assert_eq!(errors.len(), 2);
        }
        other => panic!("expected aggregate failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_runner_reports_unknown_target() {
    let backend: Arc<dyn Backend> = Arc::new(FakeBackend::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let runner = OperationRunner::new(backend, tx);

    runner
        .run(
            ResourceKind::Volumes,
            OperationId::new(),
            Operation::Target {
                kind: ResourceKind::Volumes,
                verb: Verb::Inspect,
                id: "gone".into(),
            },
        )
        .await
        .unwrap();

    match rx.recv().await {
        Some(Message::OperationFinished {
            result: Err(Error::Backend(msg)),
            ..
        }) => assert_eq!(msg, "no such volume: gone"),
        other => panic!("expected backend error, got {:?}", other),
    }
}
