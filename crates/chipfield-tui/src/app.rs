use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use chipfield_core::{
    ChipfieldConfig, Document, LocalLookup, NodeId, RemovedChip, Suggestion, TagAutocomplete,
    UiSettings, WidgetConfig, scaffold,
};

use crate::dropdown::Dropdown;

pub type Picker = TagAutocomplete<Suggestion, LocalLookup<Suggestion>>;

/// Which part of the field has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    /// Index into the current chip list.
    Chip(usize),
}

/// How the picker ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `get_data()` at the time of submission.
    Submitted(String),
    Cancelled,
}

/// A chip as the UI draws it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipView {
    pub id: String,
    pub label: String,
    pub focused: bool,
}

pub struct App {
    pub doc: Document,
    pub widget: Picker,
    pub dropdown: Dropdown,
    /// Byte-level cursor position in the input value.
    pub cursor: usize,
    pub focus: Focus,
    pub status_message: String,
    pub should_quit: bool,
    pub outcome: Option<Outcome>,
    pub ui: UiSettings,
    removed: Rc<RefCell<Vec<RemovedChip>>>,
}

impl App {
    /// Build the field from the file config and a lookup, pre-accepting the
    /// records whose ids are listed in `presets`.
    pub fn new(config: &ChipfieldConfig, lookup: LocalLookup<Suggestion>, presets: &[String]) -> Result<Self> {
        let removed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&removed);

        let settings = WidgetConfig::<Suggestion>::builder()
            .settings(&config.widget, &config.lookup)
            .suggestion_formats()
            .remove_find_callback(move |chip| sink.borrow_mut().push(chip.clone()))
            .build()
            .context("invalid widget configuration")?;

        let mut doc = Document::new();
        let (_, input) = scaffold(&mut doc, &settings.input_class)?;
        let widget = TagAutocomplete::new(&mut doc, input, settings, lookup)?;

        for id in presets {
            let record = widget
                .autocomplete()
                .records()
                .iter()
                .find(|s| &s.id == id)
                .cloned()
                .ok_or_else(|| anyhow!("unknown preset id: {id}"))?;
            widget.create_item(&mut doc, &record)?;
        }

        Ok(Self {
            doc,
            widget,
            dropdown: Dropdown::new(),
            cursor: 0,
            focus: Focus::Input,
            status_message: String::new(),
            should_quit: false,
            outcome: None,
            ui: config.ui.clone(),
            removed,
        })
    }

    pub fn input(&self) -> NodeId {
        self.widget.input()
    }

    pub fn query(&self) -> &str {
        self.doc.value(self.input()).unwrap_or_default()
    }

    pub fn data(&self) -> String {
        self.widget.get_data(&self.doc).unwrap_or_default()
    }

    pub fn chip_views(&self) -> Vec<ChipView> {
        let chips = self.widget.chips(&self.doc).unwrap_or_default();
        chips
            .into_iter()
            .enumerate()
            .map(|(i, chip)| {
                let (id, label) = self.widget.chip_label(&self.doc, chip).unwrap_or_default();
                ChipView {
                    id: id.unwrap_or_default(),
                    label,
                    focused: self.focus == Focus::Chip(i),
                }
            })
            .collect()
    }

    fn chip_count(&self) -> usize {
        self.widget.chips(&self.doc).map(|c| c.len()).unwrap_or(0)
    }

    // ── Input editing ──────────────────────────────

    fn edit_query(&mut self, edit: impl FnOnce(&mut String, &mut usize)) {
        let mut value = self.query().to_string();
        let mut cursor = self.cursor.min(value.len());
        edit(&mut value, &mut cursor);
        self.cursor = cursor;
        if let Err(e) = self.doc.set_value(self.input(), value) {
            self.status_message = e.to_string();
        }
        self.refresh_suggestions();
    }

    pub fn insert_char(&mut self, c: char) {
        self.focus = Focus::Input;
        self.edit_query(|value, cursor| {
            value.insert(*cursor, c);
            *cursor += c.len_utf8();
        });
    }

    pub fn delete_back(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.edit_query(|value, cursor| {
            let prev = value[..*cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            value.remove(prev);
            *cursor = prev;
        });
    }

    pub fn cursor_left(&mut self) {
        let value = self.query();
        if self.cursor > 0 {
            self.cursor = value[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn cursor_right(&mut self) {
        let value = self.query();
        if self.cursor < value.len() {
            self.cursor = value[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(value.len());
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.query().len();
    }

    /// Re-run the lookup for the current input value.
    pub fn refresh_suggestions(&mut self) {
        let term = self.query().to_string();
        match self.widget.lookup(&term) {
            Ok(items) => self.dropdown.set_items(items),
            Err(e) => {
                self.dropdown.clear();
                self.status_message = format!("Lookup failed: {e}");
            }
        }
    }

    // ── Accept / remove ────────────────────────────

    /// Accept the highlighted suggestion as a chip.
    pub fn accept_selected(&mut self) {
        let Some(record) = self.dropdown.current().map(|r| r.data.clone()) else {
            return;
        };
        match self.widget.accept(&mut self.doc, &record) {
            Ok(_) => {
                self.cursor = 0;
                self.dropdown.clear();
                self.status_message = format!("Added {}", record.name);
            }
            Err(e) => self.status_message = e.to_string(),
        }
    }

    pub fn focus_last_chip(&mut self) {
        let count = self.chip_count();
        if count > 0 {
            self.focus = Focus::Chip(count - 1);
            self.dropdown.clear();
        }
    }

    pub fn chip_left(&mut self) {
        if let Focus::Chip(i) = self.focus {
            self.focus = Focus::Chip(i.saturating_sub(1));
        }
    }

    /// Moving right past the last chip returns to the input.
    pub fn chip_right(&mut self) {
        if let Focus::Chip(i) = self.focus {
            self.focus = if i + 1 < self.chip_count() {
                Focus::Chip(i + 1)
            } else {
                Focus::Input
            };
        }
    }

    /// Click the focused chip's close control.
    pub fn remove_focused_chip(&mut self) {
        let Focus::Chip(index) = self.focus else {
            return;
        };
        let result = self.click_chip(index);
        if let Err(e) = result {
            self.status_message = e.to_string();
        }
        self.drain_removed();

        let count = self.chip_count();
        self.focus = if count == 0 {
            Focus::Input
        } else {
            Focus::Chip(index.min(count - 1))
        };
    }

    fn click_chip(&mut self, index: usize) -> chipfield_core::Result<bool> {
        let chips = self.widget.chips(&self.doc)?;
        let Some(chip) = chips.get(index).copied() else {
            return Ok(false);
        };
        let close = self.widget.close_control(&self.doc, chip)?;
        self.widget.click(&mut self.doc, close)
    }

    pub fn clear_chips(&mut self) {
        match self.widget.clear_data(&mut self.doc) {
            Ok(_) => self.status_message = "Cleared all chips".to_string(),
            Err(e) => self.status_message = e.to_string(),
        }
        self.focus = Focus::Input;
    }

    fn drain_removed(&mut self) {
        for chip in self.removed.borrow_mut().drain(..) {
            debug!(chip = %chip.chip, "removal reported");
            self.status_message = format!("Removed {}", chip.label);
        }
    }

    // ── Finish ─────────────────────────────────────

    pub fn submit(&mut self) {
        self.outcome = Some(Outcome::Submitted(self.data()));
        self.should_quit = true;
    }

    pub fn cancel(&mut self) {
        self.outcome = Some(Outcome::Cancelled);
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Vec<Suggestion> {
        vec![
            Suggestion::new("1", "Alice"),
            Suggestion::new("2", "Bob"),
            Suggestion::new("3", "Carol"),
        ]
    }

    #[test]
    fn test_presets_render_in_order() {
        let app = App::new(
            &ChipfieldConfig::default(),
            LocalLookup::new(people()),
            &["2".to_string(), "1".to_string()],
        )
        .unwrap();
        assert_eq!(app.data(), "2,1");
        let labels: Vec<String> = app.chip_views().into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Bob", "Alice"]);
    }

    #[test]
    fn test_unknown_preset_fails() {
        let res = App::new(
            &ChipfieldConfig::default(),
            LocalLookup::new(people()),
            &["99".to_string()],
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_invalid_found_class_fails() {
        let mut config = ChipfieldConfig::default();
        config.widget.found_class = "li".to_string();
        assert!(App::new(&config, LocalLookup::new(people()), &[]).is_err());
    }

    #[test]
    fn test_typing_updates_value_and_dropdown() {
        let mut app = App::new(&ChipfieldConfig::default(), LocalLookup::new(people()), &[]).unwrap();
        app.insert_char('c');
        app.insert_char('a');
        assert_eq!(app.query(), "ca");
        assert_eq!(app.cursor, 2);
        assert_eq!(
            app.dropdown.current().map(|r| r.data.id.as_str()),
            Some("3")
        );

        app.delete_back();
        assert_eq!(app.query(), "c");
        app.delete_back();
        assert_eq!(app.query(), "");
        assert!(!app.dropdown.active);
    }

    #[test]
    fn test_remove_focused_chip_reports_removal() {
        let mut app = App::new(
            &ChipfieldConfig::default(),
            LocalLookup::new(people()),
            &["1".to_string(), "2".to_string()],
        )
        .unwrap();
        app.focus_last_chip();
        assert_eq!(app.focus, Focus::Chip(1));

        app.remove_focused_chip();
        assert_eq!(app.data(), "1");
        assert_eq!(app.status_message, "Removed Bob");
        assert_eq!(app.focus, Focus::Chip(0));

        app.remove_focused_chip();
        assert_eq!(app.data(), "");
        assert_eq!(app.focus, Focus::Input);
    }
}
