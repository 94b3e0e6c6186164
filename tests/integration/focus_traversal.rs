//! Focus routing: which element owns keyboard input, across views,
//! overlays and create forms.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use podboard::backend::{CreateChoices, FakeBackend};
use podboard::dialog::{CreateDialog, DialogKind, Focus, FocusCursor};
use podboard::resource::ResourceKind;
use podboard::tea::{Command, Message};

use crate::fixtures::{single_pod, Harness};

#[tokio::test]
async fn test_error_outranks_open_dialog() {
    let mut h = Harness::new(single_pod().fail("remove", "device busy"));
    h.select(ResourceKind::Pods, "abc123");

    h.run_command("rm").await;
    assert_eq!(h.focus(), Focus::Dialog(DialogKind::Confirm));

    h.press(KeyCode::Tab).await;
    h.press(KeyCode::Enter).await;
    h.settle().await;
    assert_eq!(h.focus(), Focus::Error);

    // Keys go to the error until it is dismissed.
    h.press(KeyCode::Char('q')).await;
    assert_eq!(h.focus(), Focus::Error);
    h.press(KeyCode::Esc).await;
    assert_eq!(h.focus(), Focus::Table);
}

#[tokio::test]
async fn test_progress_swallows_keys_but_allows_page_switch() {
    let mut h = Harness::new(single_pod().with_delay(Duration::from_millis(150)));
    h.select(ResourceKind::Pods, "abc123");

    h.run_command("start").await;
    assert_eq!(h.focus(), Focus::Dialog(DialogKind::Progress));

    let cmds = h.press(KeyCode::Char('q')).await;
    assert!(cmds.is_empty());
    let cmds = h.press(KeyCode::Enter).await;
    assert!(cmds.is_empty());
    assert_eq!(h.focus(), Focus::Dialog(DialogKind::Progress));

    h.press(KeyCode::Char('1')).await;
    assert_eq!(h.model.active_kind(), ResourceKind::Containers);
    assert_eq!(h.focus(), Focus::Table);

    // The pods view finishes on its own while another page is active.
    h.settle().await;
    let pods = h.model.view(ResourceKind::Pods);
    assert!(pods.in_flight.is_none());
    assert_eq!(pods.modals.focused(), Focus::Table);
}

#[tokio::test]
async fn test_views_keep_independent_overlays() {
    let mut h = Harness::new(FakeBackend::demo());
    h.model.active = ResourceKind::Images.index();
    h.press(KeyCode::Enter).await;
    assert_eq!(h.focus(), Focus::Dialog(DialogKind::Commands));

    // The picker swallows page keys; close it, switch, then come back.
    h.press(KeyCode::Esc).await;
    h.press(KeyCode::Char('m')).await;
    h.press(KeyCode::Esc).await;
    h.press(KeyCode::Tab).await;
    assert_eq!(h.model.active_kind(), ResourceKind::Networks);
    assert_eq!(h.focus(), Focus::Table);

    h.press(KeyCode::Enter).await;
    h.press(KeyCode::BackTab).await;
    // BackTab is not a page key inside the picker.
    assert_eq!(h.model.active_kind(), ResourceKind::Networks);
    assert_eq!(
        h.model.view(ResourceKind::Images).modals.focused(),
        Focus::Table
    );
}

#[tokio::test]
async fn test_ctrl_c_quits_from_any_focus() {
    let mut h = Harness::new(single_pod());
    h.select(ResourceKind::Pods, "abc123");
    h.run_command("rm").await;
    assert_eq!(h.focus(), Focus::Dialog(DialogKind::Confirm));

    let cmds = h
        .send(Message::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )))
        .await;
    assert_eq!(cmds, vec![Command::Quit]);
}

#[test]
fn test_advance_visits_each_field_once_per_page() {
    let dialog = CreateDialog::new(
        ResourceKind::Containers,
        CreateChoices::default(),
        "k8s.gcr.io/pause:3.9",
    )
    .unwrap();
    let mut form = dialog.form;

    for page in 0..form.pages.len() {
        form.active = page;
        form.focus = FocusCursor::Categories;
        let fields = form.pages[page].fields.len();

        let mut visited = Vec::new();
        loop {
            form.advance();
            match form.focus {
                FocusCursor::Field(i) => visited.push(i),
                FocusCursor::Button(_) => break,
                FocusCursor::Categories => panic!("skipped the buttons"),
            }
        }
        assert_eq!(visited, (0..fields).collect::<Vec<_>>(), "page {}", page);
    }
}

#[test]
fn test_previous_category_wraps_to_last_page() {
    let dialog = CreateDialog::new(ResourceKind::Pods, CreateChoices::default(), "").unwrap();
    let mut form = dialog.form;
    assert_eq!(form.active, 0);

    form.previous_category();
    assert_eq!(form.active, form.pages.len() - 1);
    assert_eq!(form.focus, FocusCursor::Categories);
}

#[test]
fn test_images_have_no_create_dialog() {
    assert!(CreateDialog::new(ResourceKind::Images, CreateChoices::default(), "").is_none());
}
