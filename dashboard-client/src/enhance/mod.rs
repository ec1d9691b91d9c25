//! Declarative list enhancement.
//!
//! Tables marked `table-enhance` gain search, tag filter, sortable headers
//! and a pager; `[data-card-grid]` containers gain a pager and compact mode.
//! Each widget is enhanced at most once; widgets inside an inactive tab pane
//! wait for that pane's tab-shown event.

use tracing::debug;

use crate::dom::{Document, NodeId};

pub mod grid;
pub mod page;
pub mod state;
pub mod table;

pub use grid::{EnhancedGrid, GridControl};
pub use table::{EnhancedTable, TableControl};

const ENHANCED_ATTR: &str = "data-enhanced";

pub(crate) fn is_enhanced(doc: &Document, node: NodeId) -> bool {
    doc.attr(node, ENHANCED_ATTR) == Some("true")
}

pub(crate) fn mark_enhanced(doc: &mut Document, node: NodeId) {
    doc.set_attr(node, ENHANCED_ATTR, "true");
}

pub(crate) fn in_inactive_pane(doc: &Document, node: NodeId) -> bool {
    doc.closest(node, |el| el.has_class("tab-pane"))
        .is_some_and(|pane| !doc.has_class(pane, "active"))
}

fn activate_pane(doc: &mut Document, pane: NodeId) {
    if let Some(parent) = doc.parent(pane) {
        let siblings: Vec<NodeId> = doc
            .children(parent)
            .iter()
            .copied()
            .filter(|&node| node != pane && doc.has_class(node, "tab-pane"))
            .collect();
        for sibling in siblings {
            doc.remove_class(sibling, "active");
            doc.remove_class(sibling, "show");
        }
    }
    doc.add_class(pane, "active");
    doc.add_class(pane, "show");
}

/// A control of one enhanced widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetControl {
    Table(usize, TableControl),
    Grid(usize, GridControl),
}

/// Owns every enhanced widget on the page.
#[derive(Debug, Default)]
pub struct Enhancer {
    tables: Vec<EnhancedTable>,
    grids: Vec<EnhancedGrid>,
}

impl Enhancer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enhances every eligible table and grid in the document. Returns the
    /// controls created by this call.
    #[tracing::instrument(skip_all)]
    pub fn enhance_all(&mut self, doc: &mut Document) -> Vec<(NodeId, WidgetControl)> {
        let root = doc.root();
        self.enhance_within(doc, root)
    }

    /// Enhances eligible widgets beneath `scope`.
    pub fn enhance_within(
        &mut self,
        doc: &mut Document,
        scope: NodeId,
    ) -> Vec<(NodeId, WidgetControl)> {
        let mut created = Vec::new();

        let tables = doc.query_all(scope, |el| el.is("table") && el.has_class("table-enhance"));
        for table in tables {
            if let Some(t) = EnhancedTable::attach(doc, table) {
                let idx = self.tables.len();
                created.extend(
                    t.controls()
                        .into_iter()
                        .map(|(node, c)| (node, WidgetControl::Table(idx, c))),
                );
                self.tables.push(t);
            }
        }

        let grids = doc.query_all(scope, |el| el.has_attr("data-card-grid"));
        for grid in grids {
            if let Some(g) = EnhancedGrid::attach(doc, grid) {
                let idx = self.grids.len();
                created.extend(
                    g.controls()
                        .into_iter()
                        .map(|(node, c)| (node, WidgetControl::Grid(idx, c))),
                );
                self.grids.push(g);
            }
        }

        created
    }

    /// Handles a tab trigger's shown event: the target pane becomes the
    /// active one among its sibling panes, then its widgets are enhanced.
    pub fn on_tab_shown(
        &mut self,
        doc: &mut Document,
        trigger: NodeId,
    ) -> Vec<(NodeId, WidgetControl)> {
        let Some(target) = doc.attr(trigger, "data-bs-target").map(str::to_owned) else {
            return Vec::new();
        };
        let Some(pane) = doc.select_id(&target) else {
            debug!(%target, "tab target not found");
            return Vec::new();
        };
        debug!(%target, "tab shown, enhancing pane");
        activate_pane(doc, pane);
        self.enhance_within(doc, pane)
    }

    pub fn handle(&mut self, doc: &mut Document, control: WidgetControl, input: Option<&str>) {
        match control {
            WidgetControl::Table(idx, c) => {
                if let Some(t) = self.tables.get_mut(idx) {
                    t.handle(doc, c, input);
                }
            }
            WidgetControl::Grid(idx, c) => {
                if let Some(g) = self.grids.get_mut(idx) {
                    g.handle(doc, c);
                }
            }
        }
    }

    pub fn tables(&self) -> &[EnhancedTable] {
        &self.tables
    }

    pub fn grids(&self) -> &[EnhancedGrid] {
        &self.grids
    }

    pub fn table_for(&self, table: NodeId) -> Option<&EnhancedTable> {
        self.tables.iter().find(|t| t.table() == table)
    }
}
