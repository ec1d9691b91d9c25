//! Pager and compact mode for `[data-card-grid]` card collections.

use tracing::debug;

use crate::dom::{Document, El, NodeId};
use crate::enhance::page::{window, PageWindow};
use crate::enhance::{in_inactive_pane, is_enhanced, mark_enhanced};
use crate::utils::positive_int_attr;

pub const DEFAULT_PER_PAGE: usize = 8;
pub const DEFAULT_COMPACT_THRESHOLD: usize = 6;
pub const COMPACT_CLASS: &str = "overview-compact";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridControl {
    Prev,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridOptions {
    pub per_page: usize,
    pub compact_threshold: usize,
}

impl GridOptions {
    pub fn from_markup(doc: &Document, grid: NodeId) -> Self {
        Self {
            per_page: positive_int_attr(doc.attr(grid, "data-per-page"), DEFAULT_PER_PAGE),
            compact_threshold: positive_int_attr(
                doc.attr(grid, "data-compact-threshold"),
                DEFAULT_COMPACT_THRESHOLD,
            ),
        }
    }
}

/// Derived display for one grid render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridView {
    pub window: PageWindow,
    pub total: usize,
    pub compact: bool,
}

/// Pure page/compact computation for a grid of `total` items.
pub fn grid_view(total: usize, options: GridOptions, page: usize) -> GridView {
    GridView {
        window: window(total, options.per_page, page),
        total,
        compact: total > options.compact_threshold,
    }
}

#[derive(Debug, Clone)]
pub struct EnhancedGrid {
    grid: NodeId,
    items: Vec<NodeId>,
    options: GridOptions,
    page: usize,
    view: Option<GridView>,
    pager: NodeId,
    info: NodeId,
    prev: NodeId,
    next: NodeId,
}

impl EnhancedGrid {
    /// Attaches the pager and renders once. `None` when the grid is already
    /// enhanced, sits in an inactive tab pane, or has no items.
    #[tracing::instrument(skip(doc))]
    pub fn attach(doc: &mut Document, grid: NodeId) -> Option<Self> {
        if is_enhanced(doc, grid) || in_inactive_pane(doc, grid) {
            return None;
        }
        let items = doc.query_all(grid, |el| el.has_attr("data-card-item"));
        if items.is_empty() {
            return None;
        }
        let options = GridOptions::from_markup(doc, grid);
        debug!(items = items.len(), ?options, "enhancing card grid");

        let name = doc.attr(grid, "data-card-grid").unwrap_or_default().to_string();
        let host = doc
            .query(doc.root(), |el| el.attr("data-card-grid-pager") == Some(name.as_str()))
            .or_else(|| doc.next_sibling(grid))
            .unwrap_or(grid);

        let pager = doc.append(
            host,
            El::new("div").class(
                "d-flex justify-content-between align-items-center mt-2 flex-wrap gap-2 card-grid-controls",
            ),
        );
        let info = doc.append(pager, El::new("div").class("small text-muted"));
        let group = doc.append(pager, El::new("div").class("btn-group btn-group-sm"));
        let prev = doc.append(
            group,
            El::new("button")
                .attr("type", "button")
                .class("btn btn-outline-secondary")
                .text("Prev"),
        );
        let next = doc.append(
            group,
            El::new("button")
                .attr("type", "button")
                .class("btn btn-outline-secondary")
                .text("Next"),
        );

        mark_enhanced(doc, grid);

        let mut enhanced = Self {
            grid,
            items,
            options,
            page: 1,
            view: None,
            pager,
            info,
            prev,
            next,
        };
        enhanced.render(doc);
        Some(enhanced)
    }

    pub fn controls(&self) -> Vec<(NodeId, GridControl)> {
        vec![(self.prev, GridControl::Prev), (self.next, GridControl::Next)]
    }

    pub fn handle(&mut self, doc: &mut Document, control: GridControl) {
        let page_count = self.view.map_or(1, |v| v.window.page_count);
        match control {
            GridControl::Prev if self.page > 1 => self.page -= 1,
            GridControl::Next if self.page < page_count => self.page += 1,
            _ => return,
        }
        self.render(doc);
    }

    pub fn render(&mut self, doc: &mut Document) {
        let view = grid_view(self.items.len(), self.options, self.page);
        self.page = view.window.page;

        for (idx, &item) in self.items.iter().enumerate() {
            let on_page = idx >= view.window.start && idx < view.window.end;
            doc.set_displayed(item, on_page);
        }
        doc.toggle_class(self.grid, COMPACT_CLASS, view.compact);

        doc.set_text(
            self.info,
            &format!("{} shown of {}", view.window.len(), view.total),
        );
        doc.set_disabled(self.prev, !view.window.has_prev());
        doc.set_disabled(self.next, !view.window.has_next());
        doc.set_style(
            self.pager,
            "display",
            if view.window.page_count > 1 { "flex" } else { "none" },
        );

        self.view = Some(view);
    }

    pub fn grid(&self) -> NodeId {
        self.grid
    }

    pub fn items(&self) -> &[NodeId] {
        &self.items
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn view(&self) -> Option<GridView> {
        self.view
    }

    pub fn pager(&self) -> NodeId {
        self.pager
    }

    pub fn info(&self) -> NodeId {
        self.info
    }

    pub fn prev_button(&self) -> NodeId {
        self.prev
    }

    pub fn next_button(&self) -> NodeId {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(doc: &mut Document, items: usize, attrs: &[(&str, &str)]) -> NodeId {
        let body = doc.body();
        let mut el = El::new("div").class("row");
        for (k, v) in attrs {
            el = el.attr(k, v);
        }
        let grid = doc.append(body, el);
        for i in 0..items {
            let col = doc.append(grid, El::new("div").class("col"));
            doc.append(
                col,
                El::new("div")
                    .class("card")
                    .attr("data-card-item", "")
                    .text(&format!("server-{i}")),
            );
        }
        grid
    }

    fn shown(doc: &Document, g: &EnhancedGrid) -> usize {
        g.items()
            .iter()
            .filter(|&&n| doc.element(n).is_displayed())
            .count()
    }

    #[test]
    fn test_grid_view() {
        let opts = GridOptions {
            per_page: 8,
            compact_threshold: 6,
        };
        let v = grid_view(10, opts, 1);
        assert!(v.compact);
        assert_eq!(v.window.len(), 8);
        assert!(!grid_view(6, opts, 1).compact);
        assert!(grid_view(7, opts, 1).compact);
    }

    #[test]
    fn test_paging_cards() {
        let mut doc = Document::new();
        let grid = build(&mut doc, 10, &[("data-card-grid", "servers")]);
        let mut g = EnhancedGrid::attach(&mut doc, grid).unwrap();

        assert_eq!(shown(&doc, &g), 8);
        assert_eq!(doc.text_content(g.info()), "8 shown of 10");
        assert!(doc.has_class(grid, COMPACT_CLASS));
        assert_eq!(doc.element(g.pager()).style("display"), Some("flex"));
        assert!(doc.element(g.prev_button()).is_disabled());

        g.handle(&mut doc, GridControl::Next);
        assert_eq!(shown(&doc, &g), 2);
        assert_eq!(doc.text_content(g.info()), "2 shown of 10");
        assert!(doc.element(g.next_button()).is_disabled());

        g.handle(&mut doc, GridControl::Next);
        assert_eq!(g.page(), 2);
        g.handle(&mut doc, GridControl::Prev);
        assert_eq!(g.page(), 1);
    }

    #[test]
    fn test_single_page_hides_pager() {
        let mut doc = Document::new();
        let grid = build(
            &mut doc,
            4,
            &[("data-card-grid", "vms"), ("data-compact-threshold", "3")],
        );
        let g = EnhancedGrid::attach(&mut doc, grid).unwrap();
        assert_eq!(doc.element(g.pager()).style("display"), Some("none"));
        assert!(doc.has_class(grid, COMPACT_CLASS));
        assert_eq!(doc.text_content(g.info()), "4 shown of 4");
    }

    #[test]
    fn test_pager_host_lookup() {
        let mut doc = Document::new();
        let grid = build(&mut doc, 2, &[("data-card-grid", "switches")]);
        let body = doc.body();
        let sibling = doc.append(body, El::new("div").id("after"));
        let host = doc.append(body, El::new("div").attr("data-card-grid-pager", "switches"));

        let g = EnhancedGrid::attach(&mut doc, grid).unwrap();
        assert_eq!(doc.parent(g.pager()), Some(host));
        assert!(doc.children(sibling).is_empty());
    }

    #[test]
    fn test_pager_falls_back_to_next_sibling() {
        let mut doc = Document::new();
        let grid = build(&mut doc, 2, &[("data-card-grid", "x")]);
        let body = doc.body();
        let sibling = doc.append(body, El::new("div"));
        let g = EnhancedGrid::attach(&mut doc, grid).unwrap();
        assert_eq!(doc.parent(g.pager()), Some(sibling));
    }

    #[test]
    fn test_empty_grid_is_skipped() {
        let mut doc = Document::new();
        let grid = build(&mut doc, 0, &[("data-card-grid", "none")]);
        assert!(EnhancedGrid::attach(&mut doc, grid).is_none());
        assert_eq!(doc.attr(grid, "data-enhanced"), None);
    }
}
