//! Command dispatch end to end: picker, confirmation, backend call, result.

use crossterm::event::KeyCode;

use podboard::backend::{FakeBackend, Operation, Verb, NO_CHOICE};
use podboard::dialog::form::FieldValue;
use podboard::dialog::{DialogKind, Focus, Overlay, TablePurpose};
use podboard::resource::ResourceKind;
use podboard::tea::Command;

use crate::fixtures::{single_pod, Harness};

fn has_run_operation(cmds: &[Command]) -> bool {
    cmds.iter().any(|c| matches!(c, Command::RunOperation { .. }))
}

// ============================================================================
// Selection-required commands
// ============================================================================

#[tokio::test]
async fn test_rm_without_selection_shows_error_and_skips_backend() {
    let mut h = Harness::new(FakeBackend::new());
    h.model.active = ResourceKind::Pods.index();

    let cmds = h.run_command("rm").await;

    assert!(!has_run_operation(&cmds));
    assert_eq!(h.focus(), Focus::Error);
    assert_eq!(h.error_text().as_deref(), Some("there is no pod to remove"));
    assert!(!h.view().modals.is_displayed(DialogKind::Confirm));
    assert!(h.view().confirmation.is_none());
    assert!(h.backend.calls().is_empty());

    h.press(KeyCode::Enter).await;
    assert_eq!(h.focus(), Focus::Table);
}

#[tokio::test]
async fn test_every_selection_command_refuses_empty_table() {
    for kind in ResourceKind::ALL {
        for spec in podboard::catalog::catalog(kind) {
            if !spec.requires_selection {
                continue;
            }
            let mut h = Harness::new(FakeBackend::new());
            h.model.active = kind.index();
            h.run_command(spec.name).await;

            assert_eq!(h.focus(), Focus::Error, "{} {}", kind, spec.name);
            assert!(h.backend.calls().is_empty(), "{} {}", kind, spec.name);
        }
    }
}

// ============================================================================
// Destructive commands go through confirmation
// ============================================================================

#[tokio::test]
async fn test_rm_confirm_accept_removes_and_refreshes() {
    let mut h = Harness::new(single_pod());
    h.select(ResourceKind::Pods, "abc123");

    let cmds = h.run_command("rm").await;
    assert!(!has_run_operation(&cmds));
    match h.overlay() {
        Overlay::Confirm(d) => {
            assert_eq!(d.title, "podman pod rm");
            assert!(d.text.contains("abc123"));
            assert!(!d.accept_focused);
        }
        other => panic!("expected confirm dialog, got {:?}", other),
    }
    assert!(h.backend.calls().is_empty());

    h.press(KeyCode::Right).await;
    let cmds = h.press(KeyCode::Enter).await;
    assert!(has_run_operation(&cmds));
    assert_eq!(h.focus(), Focus::Dialog(DialogKind::Progress));

    let cmds = h.settle().await;
    assert!(cmds.contains(&Command::RefreshNow));
    assert!(h.fast_rx.try_take());
    assert_eq!(h.focus(), Focus::Table);
    assert!(h.view().in_flight.is_none());
    assert_eq!(
        h.backend.calls(),
        vec![Operation::Target {
            kind: ResourceKind::Pods,
            verb: Verb::Remove,
            id: "abc123".into(),
        }]
    );
}

#[tokio::test]
async fn test_rm_failure_titles_error_with_id_and_verb() {
    let mut h = Harness::new(single_pod().fail("remove", "pod has running containers"));
    h.select(ResourceKind::Pods, "abc123");

    h.run_command("rm").await;
    h.press(KeyCode::Tab).await;
    h.press(KeyCode::Enter).await;
    let cmds = h.settle().await;

    assert!(!cmds.contains(&Command::RefreshNow));
    assert_eq!(h.focus(), Focus::Error);
    let error = h.view().modals.error().cloned().unwrap();
    assert_eq!(error.title.as_deref(), Some("POD (abc123) REMOVE ERROR"));
    assert_eq!(error.message, "pod has running containers");
    assert!(!h.view().modals.is_displayed(DialogKind::Progress));
}

#[tokio::test]
async fn test_confirm_cancel_makes_no_backend_call() {
    let mut h = Harness::new(single_pod());
    h.select(ResourceKind::Pods, "abc123");

    h.run_command("kill").await;
    // Cancel is focused on display.
    let cmds = h.press(KeyCode::Enter).await;

    assert!(cmds.is_empty());
    assert_eq!(h.focus(), Focus::Table);
    assert!(h.view().confirmation.is_none());
    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn test_prune_needs_no_selection() {
    let mut h = Harness::new(FakeBackend::new());
    h.model.active = ResourceKind::Volumes.index();

    h.run_command("prune").await;
    match h.overlay() {
        Overlay::Confirm(d) => assert_eq!(d.title, "podman volume prune"),
        other => panic!("expected confirm dialog, got {:?}", other),
    }
    h.press(KeyCode::Left).await;
    h.press(KeyCode::Enter).await;
    h.settle().await;

    assert_eq!(
        h.backend.calls(),
        vec![Operation::Prune {
            kind: ResourceKind::Volumes
        }]
    );
}

// ============================================================================
// Result presentation
// ============================================================================

#[tokio::test]
async fn test_inspect_shows_result_message() {
    let mut h = Harness::new(FakeBackend::demo());
    h.select(ResourceKind::Containers, "9ad04e7c55b2");

    h.run_command("inspect").await;
    h.settle().await;

    match h.overlay() {
        Overlay::Message(d) => {
            assert_eq!(d.title, "podman container inspect");
            assert!(d.text.contains("9ad04e7c55b2"));
        }
        other => panic!("expected message dialog, got {:?}", other),
    }
    h.press(KeyCode::Esc).await;
    assert_eq!(h.focus(), Focus::Table);
}

#[tokio::test]
async fn test_search_then_pull() {
    let mut h = Harness::new(FakeBackend::demo());
    h.model.active = ResourceKind::Images.index();

    h.run_command("search/pull").await;
    assert_eq!(h.focus(), Focus::Dialog(DialogKind::Input));
    h.type_text("alpine").await;
    h.press(KeyCode::Enter).await;
    h.settle().await;

    match h.overlay() {
        Overlay::Table(d) => assert_eq!(d.purpose, TablePurpose::SearchResults),
        other => panic!("expected search results, got {:?}", other),
    }

    h.press(KeyCode::Enter).await;
    let cmds = h.settle().await;
    assert!(cmds.contains(&Command::RefreshNow));
    assert!(h.backend.calls().contains(&Operation::Pull {
        image: "docker.io/library/alpine".into()
    }));
}

#[tokio::test]
async fn test_pod_start_with_partial_failures_shows_aggregate() {
    let backend = single_pod().batch_errors("start", &["container a: exit 1", "container b: exit 2"]);
    let mut h = Harness::new(backend);
    h.select(ResourceKind::Pods, "abc123");

    h.run_command("start").await;
    h.settle().await;

    assert_eq!(h.focus(), Focus::Error);
    let error = h.view().modals.error().cloned().unwrap();
    assert_eq!(error.title.as_deref(), Some("POD (abc123) START ERROR"));
    assert_eq!(error.message, "container a: exit 1\ncontainer b: exit 2");
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_opens_with_placeholder_only_when_lists_fail() {
    let backend = FakeBackend::demo()
        .fail_list(ResourceKind::Images)
        .fail_list(ResourceKind::Pods)
        .fail_list(ResourceKind::Networks)
        .fail_list(ResourceKind::Volumes);
    let mut h = Harness::new(backend);
    h.model.active = ResourceKind::Containers.index();

    let cmds = h.run_command("create").await;
    assert_eq!(
        cmds,
        vec![Command::LoadCreateChoices {
            kind: ResourceKind::Containers
        }]
    );
    h.settle().await;

    let Overlay::Create(dialog) = h.overlay() else {
        panic!("expected create dialog, got {:?}", h.overlay());
    };
    let dropdowns: Vec<_> = dialog
        .form
        .pages
        .iter()
        .flat_map(|p| &p.fields)
        .filter_map(|f| match &f.value {
            FieldValue::Choice { options, .. } if ["image", "pod", "network", "volume"].contains(&f.key) => {
                Some(options)
            }
            _ => None,
        })
        .collect();
    assert_eq!(dropdowns.len(), 4);
    for options in dropdowns {
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].id, NO_CHOICE);
    }
}

#[tokio::test]
async fn test_create_without_image_is_rejected_in_place() {
    let mut h = Harness::new(FakeBackend::demo());
    h.model.active = ResourceKind::Containers.index();

    h.run_command("create").await;
    h.settle().await;
    assert_eq!(h.focus(), Focus::Dialog(DialogKind::Create));

    // First field -> buttons, then move to Create.
    let Overlay::Create(dialog) = h.overlay() else {
        panic!("expected create dialog");
    };
    let fields = dialog.form.pages[0].fields.len();
    for _ in 0..fields {
        h.press(KeyCode::Tab).await;
    }
    h.press(KeyCode::Right).await;
    let cmds = h.press(KeyCode::Enter).await;

    assert!(!has_run_operation(&cmds));
    assert_eq!(h.focus(), Focus::Error);
    assert_eq!(
        h.view().modals.error().and_then(|e| e.title.clone()).as_deref(),
        Some("CONTAINER CREATE ERROR")
    );
    // The form is still there underneath.
    h.press(KeyCode::Enter).await;
    assert_eq!(h.focus(), Focus::Dialog(DialogKind::Create));
}

#[tokio::test]
async fn test_volume_create_reports_new_id() {
    let mut h = Harness::new(FakeBackend::new());
    h.model.active = ResourceKind::Volumes.index();

    h.run_command("create").await;
    h.settle().await;

    // The form opens on the name field.
    h.type_text("scratch").await;
    let Overlay::Create(dialog) = h.overlay() else {
        panic!("expected create dialog");
    };
    let remaining = dialog.form.pages[0].fields.len();
    for _ in 0..remaining {
        h.press(KeyCode::Tab).await;
    }
    h.press(KeyCode::Right).await;
    let cmds = h.press(KeyCode::Enter).await;
    assert!(has_run_operation(&cmds));

    let cmds = h.settle().await;
    assert!(cmds.contains(&Command::RefreshNow));
    match h.overlay() {
        Overlay::Message(d) => {
            assert_eq!(d.title, "podman volume create");
            assert!(d.text.starts_with("volume created: "));
        }
        other => panic!("expected message dialog, got {:?}", other),
    }
}
