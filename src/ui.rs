//! Terminal UI rendering for podboard.
//!
//! Layout: page tabs on top, the active resource table in the middle and a
//! single status line at the bottom. The active view's primary overlay is
//! drawn centered above the table and the error layer above everything.
//!
//! This module renders from RenderState (immutable snapshot) - it never
//! mutates application state.

use ansi_to_tui::IntoText;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame,
};

use crate::backend::TableReport;
use crate::dialog::form::FieldValue;
use crate::dialog::{
    CommandDialog, ConfirmDialog, CreateDialog, DialogKind, ErrorDialog, Focus, FocusCursor,
    InputDialog, MessageDialog, Overlay, ProgressDialog, StatsDialog, TableDialog, TablePurpose,
};
use crate::render::{RenderState, TableView};
use crate::tea::{Notification, NotificationLevel};

// Color tokens (selection uses REVERSED modifier to adapt to terminal theme)
const COLOR_TEXT_DIMMED: Color = Color::Gray;
const COLOR_TEXT_MUTED: Color = Color::DarkGray;
const COLOR_ACCENT: Color = Color::Cyan;
const COLOR_ERROR: Color = Color::Red;

const SELECTED: Style = Style::new().add_modifier(Modifier::REVERSED);

// -----------------------------------------------------------------------------
// Context-sensitive keymap system
// -----------------------------------------------------------------------------

/// A single keybinding entry for display.
struct Keybinding(&'static str, &'static str);

/// A group of related keybindings (separated by │).
struct KeybindingGroup(Vec<Keybinding>);

/// Keybindings for whatever owns keyboard input.
fn keybindings_for_focus(focus: Focus) -> Vec<KeybindingGroup> {
    let close = || KeybindingGroup(vec![Keybinding("Esc", "close")]);
    match focus {
        Focus::Table => vec![
            KeybindingGroup(vec![Keybinding("j/k", "move"), Keybinding("Enter", "commands")]),
            KeybindingGroup(vec![Keybinding("Tab", "page"), Keybinding("1-5", "jump")]),
            KeybindingGroup(vec![Keybinding("q", "quit")]),
        ],
        Focus::Error => vec![KeybindingGroup(vec![Keybinding("Enter", "dismiss")])],
        Focus::Dialog(DialogKind::Commands) => vec![
            KeybindingGroup(vec![Keybinding("j/k", "move"), Keybinding("Enter", "run")]),
            close(),
        ],
        Focus::Dialog(DialogKind::Input) => vec![
            KeybindingGroup(vec![Keybinding("Enter", "submit")]),
            KeybindingGroup(vec![Keybinding("Esc", "cancel")]),
        ],
        Focus::Dialog(DialogKind::Message) => vec![
            KeybindingGroup(vec![Keybinding("j/k", "scroll")]),
            close(),
        ],
        Focus::Dialog(DialogKind::Confirm) => vec![
            KeybindingGroup(vec![Keybinding("Tab", "switch"), Keybinding("Enter", "choose")]),
            KeybindingGroup(vec![Keybinding("Esc", "cancel")]),
        ],
        Focus::Dialog(DialogKind::Create) => vec![
            KeybindingGroup(vec![
                Keybinding("Tab", "next"),
                Keybinding("S-Tab", "back"),
                Keybinding("Space", "toggle"),
                Keybinding("←/→", "choose"),
            ]),
            KeybindingGroup(vec![Keybinding("Esc", "cancel")]),
        ],
        Focus::Dialog(DialogKind::Table) => vec![
            KeybindingGroup(vec![Keybinding("j/k", "move"), Keybinding("Enter", "select")]),
            close(),
        ],
        Focus::Dialog(DialogKind::Stats) => vec![close()],
        Focus::Dialog(DialogKind::Progress) => {
            vec![KeybindingGroup(vec![Keybinding("Tab", "page")])]
        }
    }
}

/// Main render function - entry point for all UI drawing.
/// Takes an immutable RenderState snapshot.
pub fn draw(frame: &mut Frame, state: &RenderState) {
    let area = frame.area();
    if area.height < 3 {
        render_statusbar(frame, state, area);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_tabs(frame, state, chunks[0]);
    render_table(frame, &state.table, chunks[1]);
    render_statusbar(frame, state, chunks[2]);

    render_overlay(frame, &state.overlay, chunks[1]);
    if let Some(ref error) = state.error {
        render_error(frame, error, chunks[1]);
    }

    if let Some(ref notification) = state.notification {
        render_notification(frame, notification, area);
    }
}

fn render_tabs(frame: &mut Frame, state: &RenderState, area: Rect) {
    let titles: Vec<Line> = state
        .tabs
        .iter()
        .enumerate()
        .map(|(i, title)| Line::from(format!("{} {}", i + 1, title)))
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.active)
        .style(Style::default().fg(COLOR_TEXT_MUTED))
        .highlight_style(Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD))
        .divider(Span::styled("│", Style::default().fg(COLOR_TEXT_MUTED)));
    frame.render_widget(tabs, area);
}

fn render_table(frame: &mut Frame, view: &TableView, area: Rect) {
    if view.rows.is_empty() {
        let header = header_row(view.headers.iter().copied());
        let table = Table::new(Vec::<Row>::new(), column_widths(view.headers.len())).header(header);
        frame.render_widget(table, area);
        if area.height > 2 {
            let msg = Paragraph::new(Span::styled(
                "Nothing here yet.",
                Style::default().fg(COLOR_TEXT_DIMMED),
            ));
            frame.render_widget(msg, Rect { y: area.y + 2, height: 1, ..area });
        }
        return;
    }

    let rows = view
        .rows
        .iter()
        .map(|cells| Row::new(cells.iter().map(|c| Cell::from(c.as_str()))));
    let table = Table::new(rows, column_widths(view.headers.len()))
        .header(header_row(view.headers.iter().copied()))
        .row_highlight_style(SELECTED);
    let mut table_state = TableState::default().with_selected(Some(view.cursor));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn header_row<'a>(headers: impl Iterator<Item = &'a str>) -> Row<'a> {
    Row::new(headers.map(Cell::from)).style(
        Style::default()
            .fg(COLOR_TEXT_DIMMED)
            .add_modifier(Modifier::BOLD),
    )
}

fn column_widths(count: usize) -> Vec<Constraint> {
    vec![Constraint::Fill(1); count.max(1)]
}

/// Render keybindings legend for the bottom line.
fn render_statusbar(frame: &mut Frame, state: &RenderState, area: Rect) {
    let key_style = Style::default().fg(COLOR_TEXT_DIMMED);
    let desc_style = Style::default().fg(COLOR_TEXT_MUTED);
    let sep_style = Style::default().fg(COLOR_TEXT_MUTED);

    let mut spans: Vec<Span> = Vec::new();
    for group in keybindings_for_focus(state.focus) {
        if !spans.is_empty() {
            spans.push(Span::styled(" │ ", sep_style));
        }
        for (key_idx, keybinding) in group.0.iter().enumerate() {
            if key_idx > 0 {
                spans.push(Span::styled(" • ", sep_style));
            }
            spans.push(Span::styled(keybinding.0, key_style));
            spans.push(Span::styled(format!(" {}", keybinding.1), desc_style));
        }
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

// -----------------------------------------------------------------------------
// Overlays
// -----------------------------------------------------------------------------

fn render_overlay(frame: &mut Frame, overlay: &Overlay, area: Rect) {
    match overlay {
        Overlay::None => {}
        Overlay::Commands(d) => render_commands(frame, d, area),
        Overlay::Input(d) => render_input(frame, d, area),
        Overlay::Message(d) => render_message(frame, d, area),
        Overlay::Confirm(d) => render_confirm(frame, d, area),
        Overlay::Create(d) => render_create(frame, d, area),
        Overlay::Table(d) => render_table_dialog(frame, d, area),
        Overlay::Stats(d) => render_stats(frame, d, area),
        Overlay::Progress(d) => render_progress(frame, d, area),
    }
}

/// A cleared, bordered box of `width` x `height` centered in `area`.
fn dialog_frame(frame: &mut Frame, area: Rect, width: u16, height: u16, title: &str, color: Color) -> Rect {
    let rect = centered_rect(area, width, height);
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    inner
}

pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Line counts are clamped; `centered_rect` clamps again to the screen.
fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

fn render_commands(frame: &mut Frame, dialog: &CommandDialog, area: Rect) {
    let entries = dialog.entries();
    let height = clamp_u16(entries.len()).saturating_add(2);
    let title = format!("{} commands", dialog.kind.noun());
    let inner = dialog_frame(frame, area, 60, height, &title, COLOR_ACCENT);

    let name_width = entries.iter().map(|c| c.name.len()).max().unwrap_or(0);
    let lines: Vec<Line> = entries
        .iter()
        .enumerate()
        .map(|(i, cmd)| {
            let style = if i == dialog.cursor { SELECTED } else { Style::default() };
            Line::from(vec![
                Span::styled(format!("{:<width$}", cmd.name, width = name_width), style),
                Span::styled(
                    format!("  {}", cmd.description),
                    Style::default().fg(COLOR_TEXT_DIMMED),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_input(frame: &mut Frame, dialog: &InputDialog, area: Rect) {
    let inner = dialog_frame(frame, area, 60, 5, &dialog.title, COLOR_ACCENT);
    let lines = vec![
        Line::from(vec![
            Span::raw(format!("{}: ", dialog.label)),
            Span::styled(dialog.value.clone(), Style::default().fg(Color::White)),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        Line::default(),
        Line::from(vec![
            Span::styled(format!("[ {} ]", dialog.button), SELECTED),
            Span::styled("  Esc cancel", Style::default().fg(COLOR_TEXT_MUTED)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_message(frame: &mut Frame, dialog: &MessageDialog, area: Rect) {
    let width = area.width.saturating_sub(8);
    let height = area.height.saturating_sub(4);
    let inner = dialog_frame(frame, area, width, height, &dialog.title, COLOR_ACCENT);
    let text: Text = dialog
        .text
        .as_str()
        .into_text()
        .unwrap_or_else(|_| Text::raw(dialog.text.clone()));
    let paragraph = Paragraph::new(text).scroll((dialog.scroll, 0));
    frame.render_widget(paragraph, inner);
}

fn render_confirm(frame: &mut Frame, dialog: &ConfirmDialog, area: Rect) {
    let body_lines = clamp_u16(dialog.text.lines().count());
    let inner = dialog_frame(
        frame,
        area,
        60,
        body_lines.saturating_add(5),
        &dialog.title,
        COLOR_ERROR,
    );
    let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(inner);

    frame.render_widget(
        Paragraph::new(dialog.text.as_str()).wrap(Wrap { trim: false }),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(buttons(&["Cancel", "Confirm"], usize::from(dialog.accept_focused), true)),
        chunks[1],
    );
}

fn render_create(frame: &mut Frame, dialog: &CreateDialog, area: Rect) {
    let form = &dialog.form;
    let width = area.width.saturating_sub(8).min(90);
    let height = area.height.saturating_sub(2).min(22);
    let inner = dialog_frame(frame, area, width, height, &form.title, COLOR_ACCENT);

    let rows = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(inner);
    let columns =
        Layout::horizontal([Constraint::Length(24), Constraint::Fill(1)]).split(rows[0]);

    let on_categories = form.focus == FocusCursor::Categories;
    let categories: Vec<Line> = form
        .pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let style = match (i == form.active, on_categories) {
                (true, true) => SELECTED,
                (true, false) => Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD),
                _ => Style::default().fg(COLOR_TEXT_DIMMED),
            };
            Line::from(Span::styled(page.title, style))
        })
        .collect();
    frame.render_widget(Paragraph::new(categories), columns[0]);

    let focused_field = match form.focus {
        FocusCursor::Field(i) => Some(i),
        _ => None,
    };
    let label_width = form.pages[form.active]
        .fields
        .iter()
        .map(|f| f.label.len())
        .max()
        .unwrap_or(0);
    let fields: Vec<Line> = form.pages[form.active]
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let value_style = if focused_field == Some(i) { SELECTED } else { Style::default() };
            let value = match &field.value {
                FieldValue::Text(text) => format!("{}_", text),
                FieldValue::Check(true) => "[x]".to_string(),
                FieldValue::Check(false) => "[ ]".to_string(),
                FieldValue::Choice { options, selected } => {
                    let label = options.get(*selected).map(|c| c.label.as_str()).unwrap_or("");
                    format!("< {} >", label)
                }
            };
            Line::from(vec![
                Span::styled(
                    format!("{:>width$}  ", field.label, width = label_width),
                    Style::default().fg(COLOR_TEXT_DIMMED),
                ),
                Span::styled(value, value_style),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(fields), columns[1]);

    let (cursor, focused) = match form.focus {
        FocusCursor::Button(i) => (i, true),
        _ => (usize::MAX, false),
    };
    frame.render_widget(Paragraph::new(buttons(&form.buttons, cursor, focused)), rows[1]);
}

fn render_table_dialog(frame: &mut Frame, dialog: &TableDialog, area: Rect) {
    let width = area.width.saturating_sub(8);
    let height = area.height.saturating_sub(4);
    let inner = dialog_frame(frame, area, width, height, &dialog.title, COLOR_ACCENT);
    let selectable = dialog.purpose == TablePurpose::SearchResults;
    render_report(frame, &dialog.report, selectable.then_some(dialog.cursor), inner);
}

fn render_stats(frame: &mut Frame, dialog: &StatsDialog, area: Rect) {
    let width = area.width.saturating_sub(8);
    let height = area.height.saturating_sub(6);
    let inner = dialog_frame(frame, area, width, height, &dialog.title, COLOR_ACCENT);
    match &dialog.report {
        Some(report) => render_report(frame, report, None, inner),
        None => frame.render_widget(
            Paragraph::new(Span::styled(
                "collecting stats...",
                Style::default().fg(COLOR_TEXT_DIMMED),
            )),
            inner,
        ),
    }
}

fn render_report(frame: &mut Frame, report: &TableReport, cursor: Option<usize>, area: Rect) {
    let rows = report
        .rows
        .iter()
        .map(|cells| Row::new(cells.iter().map(|c| Cell::from(c.as_str()))));
    let table = Table::new(rows, column_widths(report.headers.len()))
        .header(header_row(report.headers.iter().map(String::as_str)))
        .row_highlight_style(SELECTED);
    let mut state = TableState::default().with_selected(cursor);
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_progress(frame: &mut Frame, dialog: &ProgressDialog, area: Rect) {
    let inner = dialog_frame(frame, area, 50, 3, &dialog.title, COLOR_TEXT_DIMMED);
    frame.render_widget(
        Paragraph::new(Span::styled(
            "please wait...",
            Style::default().fg(COLOR_TEXT_DIMMED),
        )),
        inner,
    );
}

fn render_error(frame: &mut Frame, error: &ErrorDialog, area: Rect) {
    let title = error.title.as_deref().unwrap_or("ERROR");
    let body_lines = clamp_u16(error.message.lines().count().max(1));
    let inner = dialog_frame(frame, area, 70, body_lines.saturating_add(4), title, COLOR_ERROR);
    let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(inner);
    frame.render_widget(
        Paragraph::new(error.message.as_str())
            .style(Style::default().fg(COLOR_ERROR))
            .wrap(Wrap { trim: false }),
        chunks[0],
    );
    frame.render_widget(Paragraph::new(buttons(&["OK"], 0, true)), chunks[1]);
}

/// A button row. The button at `cursor` is highlighted while the row has
/// focus.
fn buttons(labels: &[&str], cursor: usize, focused: bool) -> Line<'static> {
    let mut spans = Vec::with_capacity(labels.len() * 2);
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let style = if focused && i == cursor {
            SELECTED
        } else {
            Style::default().fg(COLOR_TEXT_DIMMED)
        };
        spans.push(Span::styled(format!("[ {} ]", label), style));
    }
    Line::from(spans)
}

/// Render notification as a single line at the bottom of the screen.
/// - Error: Red text with "Error:" prefix and bold styling
/// - Info: Green text without prefix
fn render_notification(frame: &mut Frame, notification: &Notification, area: Rect) {
    let notification_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    frame.render_widget(Clear, notification_area);

    let line = match notification.level {
        NotificationLevel::Error => Line::from(vec![
            Span::styled(
                "Error: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                truncate(&notification.message, area.width as usize),
                Style::default().fg(Color::Red),
            ),
        ]),
        NotificationLevel::Info => Line::from(Span::styled(
            truncate(&notification.message, area.width as usize),
            Style::default().fg(Color::Green),
        )),
    };

    frame.render_widget(Paragraph::new(line), notification_area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 1).collect();
        format!("{}~", truncated)
    }
}
