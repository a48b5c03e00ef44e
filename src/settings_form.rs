//! Editable copy of the numeric settings shown on the settings screen
//!
//! Values are edited as digit strings with a text cursor and only reach the
//! store on [`SettingsForm::save`].

use crate::config::{ConfigError, ConfigStore};
use crate::constant::ICON_SIZE_PATH;
use tracing::{debug, info};

/// One numeric field and where it lives in the settings tree
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: &'static str,
    pub path: &'static [&'static str],
    pub default: i64,
    pub value: i64,
}

/// A titled group of fields
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub title: &'static str,
    pub fields: Vec<Field>,
}

const LAYOUT: &[(&str, &[(&str, &[&str], i64)])] = &[
    (
        "Cursor",
        &[
            ("Size", &["cursor", "size"], 5),
            ("Max Size", &["cursor", "max_size"], 100),
        ],
    ),
    (
        "Window",
        &[
            ("Width", &["window", "width"], 800),
            ("Height", &["window", "height"], 600),
        ],
    ),
    ("Palette", &[("Icon Size", &ICON_SIZE_PATH, 24)]),
];

/// Position of a field: (category index, field index)
pub type FieldRef = (usize, usize);

#[derive(Debug)]
pub struct SettingsForm {
    categories: Vec<Category>,
    active: Option<FieldRef>,
    text_cursor: usize,
}

impl SettingsForm {
    /// Fill every field from `config`, falling back to each field's default
    pub fn load(config: &ConfigStore) -> Self {
        let categories = LAYOUT
            .iter()
            .map(|&(title, fields)| Category {
                title,
                fields: fields
                    .iter()
                    .map(|&(label, path, default)| Field {
                        label,
                        path,
                        default,
                        value: config.get_int(path, default),
                    })
                    .collect(),
            })
            .collect();
        Self {
            categories,
            active: None,
            text_cursor: 0,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look a field up by its label
    pub fn find(&self, label: &str) -> Option<FieldRef> {
        self.categories.iter().enumerate().find_map(|(c, category)| {
            category
                .fields
                .iter()
                .position(|f| f.label == label)
                .map(|f| (c, f))
        })
    }

    pub fn field(&self, field: FieldRef) -> Option<&Field> {
        self.categories.get(field.0)?.fields.get(field.1)
    }

    pub fn value(&self, label: &str) -> Option<i64> {
        self.find(label).and_then(|f| self.field(f)).map(|f| f.value)
    }

    /// Start editing a field with the text cursor at the end of its value
    pub fn activate(&mut self, field: FieldRef) -> bool {
        let Some(len) = self.field(field).map(|f| f.value.to_string().len()) else {
            return false;
        };
        self.active = Some(field);
        self.text_cursor = len;
        true
    }

    pub fn deactivate(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<FieldRef> {
        self.active
    }

    pub fn text_cursor(&self) -> usize {
        self.text_cursor
    }

    fn active_text(&self) -> Option<String> {
        self.active
            .and_then(|f| self.field(f))
            .map(|f| f.value.to_string())
    }

    /// Insert `c` at the text cursor. Non-digits are ignored.
    pub fn insert_digit(&mut self, c: char) {
        if !c.is_ascii_digit() {
            return;
        }
        let Some(mut text) = self.active_text() else {
            return;
        };
        let at = self.text_cursor.min(text.len());
        text.insert(at, c);
        if self.commit_text(&text) {
            self.text_cursor = at + 1;
        }
    }

    /// Delete the character before the text cursor
    pub fn backspace(&mut self) {
        let Some(mut text) = self.active_text() else {
            return;
        };
        let at = self.text_cursor.min(text.len());
        if at == 0 {
            return;
        }
        text.remove(at - 1);
        // The cursor moves even when the shorter text is rejected
        self.commit_text(&text);
        self.text_cursor = at - 1;
    }

    pub fn move_left(&mut self) {
        self.text_cursor = self.text_cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if let Some(text) = self.active_text() {
            self.text_cursor = (self.text_cursor + 1).min(text.len());
        }
    }

    /// Store `text` into the active field if it parses; otherwise keep the old value
    fn commit_text(&mut self, text: &str) -> bool {
        let Ok(parsed) = text.parse::<i64>() else {
            debug!("Discarding edit {:?}: not an integer", text);
            return false;
        };
        let Some((c, f)) = self.active else {
            return false;
        };
        self.categories[c].fields[f].value = parsed;
        true
    }

    /// Write every field to `config`
    pub fn save(&mut self, config: &mut ConfigStore) -> Result<(), ConfigError> {
        for field in self.categories.iter().flat_map(|c| &c.fields) {
            config.set(field.value, field.path)?;
        }
        self.active = None;
        info!("Settings saved");
        Ok(())
    }

    /// Throw away edits and reload from `config`
    pub fn cancel(&mut self, config: &ConfigStore) {
        *self = Self::load(config);
    }
}
