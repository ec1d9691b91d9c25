//! Sidebar collapse state persisted across visits.

use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::settings::KeyValueStore;

pub const STORAGE_KEY: &str = "dashboard-sidebar-state";

const COLLAPSED: &str = "collapsed";
const EXPANDED: &str = "expanded";

#[derive(Debug, Clone, Copy)]
pub struct SidebarManager {
    sidebar: NodeId,
    main: NodeId,
    toggle: NodeId,
}

impl SidebarManager {
    /// `None` unless `#sidebar-nav`, `#main-content` and `#sidebar-toggle`
    /// are all present. A saved collapsed state is restored without
    /// transitions.
    #[tracing::instrument(skip(doc, store))]
    pub fn mount(doc: &mut Document, store: &mut dyn KeyValueStore) -> Result<Option<Self>> {
        let (Some(sidebar), Some(main), Some(toggle)) = (
            doc.get_element_by_id("sidebar-nav"),
            doc.get_element_by_id("main-content"),
            doc.get_element_by_id("sidebar-toggle"),
        ) else {
            return Ok(None);
        };
        let manager = Self {
            sidebar,
            main,
            toggle,
        };
        if store.get(STORAGE_KEY).as_deref() == Some(COLLAPSED) {
            manager.collapse(doc, store, false)?;
        }
        Ok(Some(manager))
    }

    pub fn toggle_button(&self) -> NodeId {
        self.toggle
    }

    pub fn is_collapsed(&self, doc: &Document) -> bool {
        doc.has_class(self.sidebar, COLLAPSED)
    }

    pub fn toggle(&self, doc: &mut Document, store: &mut dyn KeyValueStore) -> Result<()> {
        if self.is_collapsed(doc) {
            self.expand(doc, store)
        } else {
            self.collapse(doc, store, true)
        }
    }

    pub fn collapse(&self, doc: &mut Document, store: &mut dyn KeyValueStore, animate: bool) -> Result<()> {
        if !animate {
            doc.set_style(self.sidebar, "transition", "none");
            doc.set_style(self.main, "transition", "none");
        }

        doc.add_class(self.sidebar, COLLAPSED);
        doc.add_class(self.main, EXPANDED);
        self.update_toggle(doc, true);
        let saved = store.set(STORAGE_KEY, COLLAPSED);

        if !animate {
            doc.set_style(self.sidebar, "transition", "");
            doc.set_style(self.main, "transition", "");
        }
        saved
    }

    pub fn expand(&self, doc: &mut Document, store: &mut dyn KeyValueStore) -> Result<()> {
        doc.remove_class(self.sidebar, COLLAPSED);
        doc.remove_class(self.main, EXPANDED);
        self.update_toggle(doc, false);
        store.set(STORAGE_KEY, EXPANDED)
    }

    fn update_toggle(&self, doc: &mut Document, collapsed: bool) {
        if let Some(icon) = doc.query(self.toggle, |el| el.is("i")) {
            doc.set_class_name(
                icon,
                if collapsed {
                    "bi bi-layout-sidebar-inset-reverse"
                } else {
                    "bi bi-layout-sidebar-inset"
                },
            );
        }
        doc.set_attr(
            self.toggle,
            "title",
            if collapsed { "Show sidebar" } else { "Hide sidebar" },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::El;
    use crate::settings::MemoryStore;

    fn page() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let sidebar = doc.append(body, El::new("nav").id("sidebar-nav"));
        let main = doc.append(body, El::new("main").id("main-content"));
        let toggle = doc.append(body, El::new("button").id("sidebar-toggle"));
        let icon = doc.append(toggle, El::new("i"));
        (doc, sidebar, main, icon)
    }

    #[test]
    fn test_missing_elements_skip_mount() {
        let mut doc = Document::new();
        let mut store = MemoryStore::new();
        assert!(SidebarManager::mount(&mut doc, &mut store).unwrap().is_none());
    }

    #[test]
    fn test_restores_collapsed_state() {
        let (mut doc, sidebar, main, icon) = page();
        let mut store = MemoryStore::new().with(STORAGE_KEY, "collapsed");
        let manager = SidebarManager::mount(&mut doc, &mut store).unwrap().unwrap();
        assert!(manager.is_collapsed(&doc));
        assert!(doc.has_class(main, "expanded"));
        assert_eq!(doc.element(sidebar).style("transition"), None);
        assert_eq!(
            doc.element(icon).class_name(),
            "bi bi-layout-sidebar-inset-reverse"
        );
        assert_eq!(doc.attr(manager.toggle_button(), "title"), Some("Show sidebar"));
    }

    #[test]
    fn test_toggle_round_trip_persists() {
        let (mut doc, _, main, _) = page();
        let mut store = MemoryStore::new();
        let manager = SidebarManager::mount(&mut doc, &mut store).unwrap().unwrap();
        assert!(!manager.is_collapsed(&doc));
        assert_eq!(store.get(STORAGE_KEY), None);

        manager.toggle(&mut doc, &mut store).unwrap();
        assert!(manager.is_collapsed(&doc));
        assert_eq!(store.get(STORAGE_KEY).as_deref(), Some("collapsed"));

        manager.toggle(&mut doc, &mut store).unwrap();
        assert!(!doc.has_class(main, "expanded"));
        assert_eq!(store.get(STORAGE_KEY).as_deref(), Some("expanded"));
        assert_eq!(doc.attr(manager.toggle_button(), "title"), Some("Hide sidebar"));
    }
}
