//! Multi-page forms with a declared field order.
//!
//! Traversal is index arithmetic over `pages[active].fields`, so the visiting
//! order is data rather than per-page wiring.

use crossterm::event::{KeyCode, KeyEvent};

use crate::backend::{Choice, NO_CHOICE};

pub const CANCEL_BUTTON: usize = 0;
pub const SUBMIT_BUTTON: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Check(bool),
    /// Dropdown. `options[0]` is always the empty placeholder.
    Choice { options: Vec<Choice>, selected: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub value: FieldValue,
}

impl Field {
    pub fn text(key: &'static str, label: &'static str) -> Self {
        Self::text_with(key, label, "")
    }

    pub fn text_with(key: &'static str, label: &'static str, initial: &str) -> Self {
        Self {
            key,
            label,
            value: FieldValue::Text(initial.to_string()),
        }
    }

    pub fn check(key: &'static str, label: &'static str, initial: bool) -> Self {
        Self {
            key,
            label,
            value: FieldValue::Check(initial),
        }
    }

    /// A dropdown over `choices`, with the placeholder prepended.
    pub fn choice(key: &'static str, label: &'static str, choices: Vec<Choice>) -> Self {
        let mut options = Vec::with_capacity(choices.len() + 1);
        options.push(Choice {
            id: NO_CHOICE.to_string(),
            label: NO_CHOICE.to_string(),
        });
        options.extend(choices);
        Self {
            key,
            label,
            value: FieldValue::Choice {
                options,
                selected: 0,
            },
        }
    }

    /// A dropdown over fixed values whose ids are their labels.
    pub fn choice_of(key: &'static str, label: &'static str, values: &[&str]) -> Self {
        let choices = values
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| Choice {
                id: v.to_string(),
                label: v.to_string(),
            })
            .collect();
        Self::choice(key, label, choices)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: &'static str,
    pub fields: Vec<Field>,
}

impl Page {
    pub fn new(title: &'static str, fields: Vec<Field>) -> Self {
        Self { title, fields }
    }
}

/// Which element of a form owns keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusCursor {
    /// The page (category) strip.
    Categories,
    /// A field of the active page.
    Field(usize),
    /// One of the form buttons (Cancel, Create).
    Button(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    None,
    Cancel,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub title: String,
    pub pages: Vec<Page>,
    pub active: usize,
    pub focus: FocusCursor,
    pub buttons: [&'static str; 2],
}

impl Form {
    /// A new form on its first page, focused on the first field (or the
    /// category strip when that page has none).
    pub fn new(title: impl Into<String>, pages: Vec<Page>) -> Self {
        let focus = match pages.first() {
            Some(page) if !page.fields.is_empty() => FocusCursor::Field(0),
            _ => FocusCursor::Categories,
        };
        Self {
            title: title.into(),
            pages,
            active: 0,
            focus,
            buttons: ["Cancel", "Create"],
        }
    }

    fn field_count(&self) -> usize {
        self.pages.get(self.active).map_or(0, |p| p.fields.len())
    }

    /// Move focus forward: categories, each field of the active page in
    /// order, the buttons, then back to the categories.
    pub fn advance(&mut self) {
        let fields = self.field_count();
        self.focus = match self.focus {
            FocusCursor::Categories if fields > 0 => FocusCursor::Field(0),
            FocusCursor::Categories => FocusCursor::Button(CANCEL_BUTTON),
            FocusCursor::Field(i) if i + 1 < fields => FocusCursor::Field(i + 1),
            FocusCursor::Field(_) => FocusCursor::Button(CANCEL_BUTTON),
            FocusCursor::Button(CANCEL_BUTTON) => FocusCursor::Button(SUBMIT_BUTTON),
            FocusCursor::Button(_) => FocusCursor::Categories,
        };
    }

    /// The reverse of [`Form::advance`].
    pub fn retreat(&mut self) {
        let fields = self.field_count();
        self.focus = match self.focus {
            FocusCursor::Categories => FocusCursor::Button(SUBMIT_BUTTON),
            FocusCursor::Field(0) => FocusCursor::Categories,
            FocusCursor::Field(i) => FocusCursor::Field(i - 1),
            FocusCursor::Button(SUBMIT_BUTTON) => FocusCursor::Button(CANCEL_BUTTON),
            FocusCursor::Button(_) if fields > 0 => FocusCursor::Field(fields - 1),
            FocusCursor::Button(_) => FocusCursor::Categories,
        };
    }

    pub fn next_category(&mut self) {
        if !self.pages.is_empty() {
            self.active = (self.active + 1) % self.pages.len();
        }
        self.focus = FocusCursor::Categories;
    }

    /// Wraps from the first page to the last.
    pub fn previous_category(&mut self) {
        if !self.pages.is_empty() {
            self.active = self.active.checked_sub(1).unwrap_or(self.pages.len() - 1);
        }
        self.focus = FocusCursor::Categories;
    }

    pub fn focused_field(&self) -> Option<&Field> {
        match self.focus {
            FocusCursor::Field(i) => self.pages.get(self.active)?.fields.get(i),
            _ => None,
        }
    }

    fn focused_field_mut(&mut self) -> Option<&mut Field> {
        match self.focus {
            FocusCursor::Field(i) => self.pages.get_mut(self.active)?.fields.get_mut(i),
            _ => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormEvent {
        match key.code {
            KeyCode::Esc => return FormEvent::Cancel,
            KeyCode::Tab => {
                self.advance();
                return FormEvent::None;
            }
            KeyCode::BackTab => {
                self.retreat();
                return FormEvent::None;
            }
            _ => {}
        }

        match self.focus {
            FocusCursor::Categories => match key.code {
                KeyCode::Down | KeyCode::Char('j') => self.next_category(),
                KeyCode::Up | KeyCode::Char('k') => self.previous_category(),
                KeyCode::Enter | KeyCode::Right => self.advance(),
                _ => {}
            },
            FocusCursor::Button(i) => match key.code {
                KeyCode::Left | KeyCode::Right => {
                    self.focus = FocusCursor::Button(1 - i.min(1));
                }
                KeyCode::Enter if i == SUBMIT_BUTTON => return FormEvent::Submit,
                KeyCode::Enter => return FormEvent::Cancel,
                _ => {}
            },
            FocusCursor::Field(_) => {
                let Some(field) = self.focused_field_mut() else {
                    return FormEvent::None;
                };
                let consumed = edit_field(field, key);
                if !consumed {
                    match key.code {
                        KeyCode::Enter | KeyCode::Down => self.advance(),
                        KeyCode::Up => self.retreat(),
                        _ => {}
                    }
                }
            }
        }
        FormEvent::None
    }

    fn find(&self, key: &str) -> Option<&Field> {
        self.pages
            .iter()
            .flat_map(|p| p.fields.iter())
            .find(|f| f.key == key)
    }

    pub fn field_mut(&mut self, key: &str) -> Option<&mut Field> {
        self.pages
            .iter_mut()
            .flat_map(|p| p.fields.iter_mut())
            .find(|f| f.key == key)
    }

    /// Trimmed value of a text field; empty for unknown keys.
    pub fn text(&self, key: &str) -> String {
        match self.find(key).map(|f| &f.value) {
            Some(FieldValue::Text(s)) => s.trim().to_string(),
            _ => String::new(),
        }
    }

    pub fn checked(&self, key: &str) -> bool {
        matches!(self.find(key).map(|f| &f.value), Some(FieldValue::Check(true)))
    }

    /// Id of the selected dropdown option; empty for the placeholder.
    pub fn choice(&self, key: &str) -> String {
        match self.find(key).map(|f| &f.value) {
            Some(FieldValue::Choice { options, selected }) => options
                .get(*selected)
                .map(|c| c.id.clone())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }
}

/// Apply an editing key to a field. Returns whether the key was consumed.
fn edit_field(field: &mut Field, key: KeyEvent) -> bool {
    match &mut field.value {
        FieldValue::Text(s) => match key.code {
            KeyCode::Char(c) => {
                s.push(c);
                true
            }
            KeyCode::Backspace => {
                s.pop();
                true
            }
            _ => false,
        },
        FieldValue::Check(b) => match key.code {
            KeyCode::Char(' ') => {
                *b = !*b;
                true
            }
            _ => false,
        },
        FieldValue::Choice { options, selected } => {
            let len = options.len().max(1);
            match key.code {
                KeyCode::Right | KeyCode::Char(' ') => {
                    *selected = (*selected + 1) % len;
                    true
                }
                KeyCode::Left => {
                    *selected = selected.checked_sub(1).unwrap_or(len - 1);
                    true
                }
                _ => false,
            }
        }
    }
}
