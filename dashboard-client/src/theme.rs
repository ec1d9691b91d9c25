//! Light/dark theme persisted across visits.

use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::settings::KeyValueStore;

pub const STORAGE_KEY: &str = "dashboard-theme";
pub const THEME_ATTR: &str = "data-bs-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Icon offered by the toggle: the sun switches back to light.
    fn icon_class(self) -> &'static str {
        match self {
            Theme::Dark => "bi bi-sun",
            Theme::Light => "bi bi-moon-stars",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ThemeManager {
    toggle: Option<NodeId>,
}

impl ThemeManager {
    /// Applies the saved theme, or the host's preference when nothing valid
    /// is saved.
    #[tracing::instrument(skip(doc, store))]
    pub fn mount(doc: &mut Document, store: &mut dyn KeyValueStore, prefers_dark: bool) -> Result<Self> {
        let manager = Self {
            toggle: doc.get_element_by_id("theme-toggle"),
        };
        let fallback = if prefers_dark { Theme::Dark } else { Theme::Light };
        let theme = store
            .get(STORAGE_KEY)
            .as_deref()
            .and_then(Theme::parse)
            .unwrap_or(fallback);
        manager.set(doc, store, theme)?;
        Ok(manager)
    }

    pub fn toggle_button(&self) -> Option<NodeId> {
        self.toggle
    }

    pub fn current(doc: &Document) -> Theme {
        doc.attr(doc.root(), THEME_ATTR)
            .and_then(Theme::parse)
            .unwrap_or(Theme::Light)
    }

    pub fn set(&self, doc: &mut Document, store: &mut dyn KeyValueStore, theme: Theme) -> Result<()> {
        let root = doc.root();
        doc.set_attr(root, THEME_ATTR, theme.as_str());
        if let Some(icon) = self.toggle.and_then(|btn| doc.query(btn, |el| el.is("i"))) {
            doc.set_class_name(icon, theme.icon_class());
        }
        store.set(STORAGE_KEY, theme.as_str())
    }

    pub fn toggle(&self, doc: &mut Document, store: &mut dyn KeyValueStore) -> Result<Theme> {
        let next = Self::current(doc).toggled();
        self.set(doc, store, next)?;
        Ok(next)
    }
}
