/// Dark/light theme preference, persisted in local storage

use crate::error::{AppError, describe_js};

/// Attribute on `<html>` that the stylesheet keys off
pub const THEME_ATTRIBUTE: &str = "data-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Unknown stored values read as the default
    pub fn parse(value: &str) -> Theme {
        match value {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Minimal key-value storage the theme preference lives in
pub trait ThemeStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> Result<(), AppError>;
}

impl ThemeStore for web_sys::Storage {
    fn read(&self, key: &str) -> Option<String> {
        self.get_item(key).ok().flatten()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.set_item(key, value)
            .map_err(|e| AppError::Environment(describe_js(&e)))
    }
}

pub fn load_theme(store: &impl ThemeStore, key: &str) -> Theme {
    store
        .read(key)
        .map(|value| Theme::parse(&value))
        .unwrap_or_default()
}

/// Flip `current`, persist the result, and return it
pub fn toggle_theme(store: &impl ThemeStore, key: &str, current: Theme) -> Result<Theme, AppError> {
    let next = current.toggled();
    store.write(key, next.as_str())?;
    Ok(next)
}

pub fn local_storage() -> Result<web_sys::Storage, AppError> {
    web_sys::window()
        .ok_or_else(|| AppError::Environment("no window".to_string()))?
        .local_storage()
        .map_err(|e| AppError::Environment(describe_js(&e)))?
        .ok_or_else(|| AppError::Environment("localStorage unavailable".to_string()))
}

/// Set the theme attribute on the document element
pub fn apply_theme(theme: Theme) -> Result<(), AppError> {
    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
        .ok_or_else(|| AppError::Environment("no document element".to_string()))?;

    root.set_attribute(THEME_ATTRIBUTE, theme.as_str())
        .map_err(|e| AppError::Environment(describe_js(&e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore {
        values: RefCell<HashMap<String, String>>,
    }

    impl ThemeStore for MemoryStore {
        fn read(&self, key: &str) -> Option<String> {
            self.values.borrow().get(key).cloned()
        }

        fn write(&self, key: &str, value: &str) -> Result<(), AppError> {
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_default_is_dark() {
        let store = MemoryStore::default();
        assert_eq!(load_theme(&store, "theme"), Theme::Dark);
    }

    #[test]
    fn test_unknown_value_reads_as_dark() {
        let store = MemoryStore::default();
        store.write("theme", "sepia").unwrap();

        assert_eq!(load_theme(&store, "theme"), Theme::Dark);
    }

    #[test]
    fn test_double_toggle_restores() {
        let store = MemoryStore::default();
        let start = load_theme(&store, "theme");

        let once = toggle_theme(&store, "theme", start).unwrap();
        assert_eq!(once, Theme::Light);

        let twice = toggle_theme(&store, "theme", once).unwrap();
        assert_eq!(twice, start);
    }

    #[test]
    fn test_toggle_persists_across_reload() {
        let store = MemoryStore::default();
        toggle_theme(&store, "theme", Theme::Dark).unwrap();

        // a reload only keeps what is in storage
        assert_eq!(load_theme(&store, "theme"), Theme::Light);
        assert_eq!(store.read("theme").as_deref(), Some("light"));
    }
}
