//! Collapsible panels whose expanded/collapsed state survives reloads.
//!
//! Markup: `[data-collapse-panel="<id>"]` with a
//! `[data-collapse-toggle="<id>"]` trigger anywhere on the page.

use tracing::debug;

use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::settings::KeyValueStore;

pub const STORAGE_PREFIX: &str = "dashboard-panel-";

pub fn storage_key(id: &str) -> String {
    format!("{STORAGE_PREFIX}{id}")
}

#[derive(Debug, Clone)]
pub struct Panel {
    id: String,
    panel: NodeId,
    toggle: NodeId,
}

impl Panel {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn toggle_button(&self) -> NodeId {
        self.toggle
    }

    pub fn is_collapsed(&self, doc: &Document) -> bool {
        doc.has_class(self.panel, "collapsed")
    }

    fn apply(&self, doc: &mut Document, collapsed: bool) {
        doc.toggle_class(self.panel, "collapsed", collapsed);
        doc.set_attr(
            self.toggle,
            "aria-expanded",
            if collapsed { "false" } else { "true" },
        );
    }
}

#[derive(Debug, Clone, Default)]
pub struct Panels {
    panels: Vec<Panel>,
}

impl Panels {
    /// Finds panel/toggle pairs and restores their saved state.
    #[tracing::instrument(skip(doc, store))]
    pub fn mount(doc: &mut Document, store: &mut dyn KeyValueStore) -> Result<Self> {
        let root = doc.root();
        let mut panels = Vec::new();
        for panel in doc.query_all(root, |el| el.has_attr("data-collapse-panel")) {
            let id = doc.attr(panel, "data-collapse-panel").unwrap_or_default().to_string();
            let Some(toggle) =
                doc.query(root, |el| el.attr("data-collapse-toggle") == Some(id.as_str()))
            else {
                debug!(%id, "collapsible panel without toggle");
                continue;
            };
            let p = Panel { id, panel, toggle };
            let collapsed = match store.get(&storage_key(&p.id)).as_deref() {
                Some("collapsed") => true,
                Some("expanded") => false,
                _ => p.is_collapsed(doc),
            };
            p.apply(doc, collapsed);
            panels.push(p);
        }
        Ok(Self { panels })
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Flips panel `idx` and saves the new state.
    pub fn toggle(&self, idx: usize, doc: &mut Document, store: &mut dyn KeyValueStore) -> Result<()> {
        let Some(p) = self.panels.get(idx) else {
            return Ok(());
        };
        let collapsed = !p.is_collapsed(doc);
        p.apply(doc, collapsed);
        store.set(
            &storage_key(&p.id),
            if collapsed { "collapsed" } else { "expanded" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::El;
    use crate::settings::MemoryStore;

    fn page() -> (Document, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append(body, El::new("button").attr("data-collapse-toggle", "summary"));
        let panel = doc.append(body, El::new("div").attr("data-collapse-panel", "summary"));
        doc.append(body, El::new("div").attr("data-collapse-panel", "orphan"));
        (doc, panel)
    }

    #[test]
    fn test_restores_saved_state() {
        let (mut doc, panel) = page();
        let mut store = MemoryStore::new().with(&storage_key("summary"), "collapsed");
        let panels = Panels::mount(&mut doc, &mut store).unwrap();
        assert_eq!(panels.panels().len(), 1);
        assert!(doc.has_class(panel, "collapsed"));
        assert_eq!(
            doc.attr(panels.panels()[0].toggle_button(), "aria-expanded"),
            Some("false")
        );
    }

    #[test]
    fn test_toggle_persists() {
        let (mut doc, panel) = page();
        let mut store = MemoryStore::new();
        let panels = Panels::mount(&mut doc, &mut store).unwrap();
        assert!(!doc.has_class(panel, "collapsed"));

        panels.toggle(0, &mut doc, &mut store).unwrap();
        assert!(doc.has_class(panel, "collapsed"));
        assert_eq!(
            store.get("dashboard-panel-summary").as_deref(),
            Some("collapsed")
        );

        panels.toggle(0, &mut doc, &mut store).unwrap();
        assert_eq!(
            store.get("dashboard-panel-summary").as_deref(),
            Some("expanded")
        );
        assert!(panels.toggle(5, &mut doc, &mut store).is_ok());
    }
}
