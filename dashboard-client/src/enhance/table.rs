//! Search, tag filter, sortable headers and pager for `table.table-enhance`.

use tracing::debug;

use crate::dom::{Document, El, NodeId};
use crate::enhance::state::{distinct_tags, render, FilterState, RowData, TagChoice, View};
use crate::enhance::{in_inactive_pane, is_enhanced, mark_enhanced};
use crate::utils::{positive_int_attr, split_tags};

pub const DEFAULT_PER_PAGE: usize = 25;

const BUTTON_CLASS: &str = "btn btn-outline-secondary btn-sm";

/// Which control of a table an interaction landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableControl {
    Search,
    /// Index into the tag button row; 0 is "All".
    Tag(usize),
    SortHeader(usize),
    Prev,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    pub per_page: usize,
    pub tag_filter: bool,
}

impl TableOptions {
    pub fn from_markup(doc: &Document, table: NodeId) -> Self {
        Self {
            per_page: positive_int_attr(doc.attr(table, "data-per-page"), DEFAULT_PER_PAGE),
            tag_filter: doc.attr(table, "data-tag-filter") == Some("true"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnhancedTable {
    table: NodeId,
    rows: Vec<NodeId>,
    data: Vec<RowData>,
    options: TableOptions,
    state: FilterState,
    view: Option<View>,
    search: NodeId,
    tag_buttons: Vec<(NodeId, TagChoice)>,
    headers: Vec<NodeId>,
    info: NodeId,
    page_label: NodeId,
    prev: NodeId,
    next: NodeId,
}

impl EnhancedTable {
    /// Attaches controls and renders once. Returns `None`, leaving the
    /// markup untouched, when the table is already enhanced, sits in an
    /// inactive tab pane, has no body, or has no parent to host controls.
    #[tracing::instrument(skip(doc))]
    pub fn attach(doc: &mut Document, table: NodeId) -> Option<Self> {
        if is_enhanced(doc, table) || in_inactive_pane(doc, table) {
            return None;
        }
        let tbody = doc.query(table, |el| el.is("tbody"))?;
        let parent = doc.parent(table)?;

        let options = TableOptions::from_markup(doc, table);
        let rows = doc.query_all(tbody, |el| el.is("tr"));
        let data: Vec<RowData> = rows.iter().map(|&row| snapshot(doc, row)).collect();
        debug!(rows = rows.len(), ?options, "enhancing table");

        let controls = doc.create(El::new("div").class(
            "table-enhance-controls d-flex align-items-center justify-content-between gap-2 mb-2 flex-wrap",
        ));
        let search = doc.append(
            controls,
            El::new("input")
                .attr("type", "search")
                .attr("placeholder", "Search table...")
                .class("form-control form-control-sm")
                .style("max-width", "240px"),
        );

        let mut tag_buttons = Vec::new();
        let tags = if options.tag_filter {
            distinct_tags(&data)
        } else {
            Vec::new()
        };
        if !tags.is_empty() {
            let group = doc.append(controls, El::new("div").class("d-flex flex-wrap gap-2"));
            let all = doc.append(
                group,
                El::new("button")
                    .attr("type", "button")
                    .class(BUTTON_CLASS)
                    .class("active")
                    .text("All"),
            );
            tag_buttons.push((all, TagChoice::All));
            for tag in tags {
                let btn = doc.append(
                    group,
                    El::new("button")
                        .attr("type", "button")
                        .attr("data-tag", &tag)
                        .class(BUTTON_CLASS)
                        .text(&tag),
                );
                tag_buttons.push((btn, TagChoice::Tag(tag)));
            }
        }

        let info = doc.append(controls, El::new("div").class("small text-muted"));
        doc.insert_before(parent, controls, table);

        let pager = doc.append(
            parent,
            El::new("div").class("d-flex justify-content-between align-items-center mt-2 flex-wrap gap-2"),
        );
        let page_label = doc.append(pager, El::new("div").class("small text-muted"));
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

        let headers = match doc.query(table, |el| el.is("thead")) {
            Some(thead) => doc.query_all(thead, |el| el.is("th")),
            None => Vec::new(),
        };
        for &th in &headers {
            doc.set_style(th, "cursor", "pointer");
        }

        mark_enhanced(doc, table);

        let mut enhanced = Self {
            table,
            rows,
            data,
            options,
            state: FilterState::default(),
            view: None,
            search,
            tag_buttons,
            headers,
            info,
            page_label,
            prev,
            next,
        };
        enhanced.render(doc);
        Some(enhanced)
    }

    /// Every interactive node and what it controls.
    pub fn controls(&self) -> Vec<(NodeId, TableControl)> {
        let mut out = vec![
            (self.search, TableControl::Search),
            (self.prev, TableControl::Prev),
            (self.next, TableControl::Next),
        ];
        out.extend(
            self.tag_buttons
                .iter()
                .enumerate()
                .map(|(i, (node, _))| (*node, TableControl::Tag(i))),
        );
        out.extend(
            self.headers
                .iter()
                .enumerate()
                .map(|(i, node)| (*node, TableControl::SortHeader(i))),
        );
        out
    }

    /// Applies one interaction and re-renders. `input` carries the new
    /// search text for [`TableControl::Search`].
    pub fn handle(&mut self, doc: &mut Document, control: TableControl, input: Option<&str>) {
        match control {
            TableControl::Search => {
                if let Some(term) = input {
                    doc.set_value(self.search, term);
                }
                let term = doc.element(self.search).value().to_string();
                self.state.set_search(&term);
            }
            TableControl::Tag(i) => {
                let Some((node, choice)) = self.tag_buttons.get(i).cloned() else {
                    return;
                };
                for (btn, _) in &self.tag_buttons {
                    doc.toggle_class(*btn, "active", *btn == node);
                }
                self.state.select_tag(choice);
            }
            TableControl::SortHeader(column) => self.state.sort_by(column),
            TableControl::Prev => {
                if !self.state.prev_page() {
                    return;
                }
            }
            TableControl::Next => {
                let page_count = self.view.as_ref().map_or(1, |v| v.window.page_count);
                if !self.state.next_page(page_count) {
                    return;
                }
            }
        }
        self.render(doc);
    }

    /// Full re-render: order, visibility, status text and button states.
    pub fn render(&mut self, doc: &mut Document) {
        let view = render(&mut self.state, &self.data, self.options.per_page);

        if self.state.sort().is_some() {
            for &idx in &view.order {
                let row = self.rows[idx];
                if let Some(parent) = doc.parent(row) {
                    doc.append_child(parent, row);
                }
            }
        }

        for (idx, &row) in self.rows.iter().enumerate() {
            doc.set_displayed(row, view.is_visible(idx));
        }

        doc.set_text(self.info, &format!("{} items", view.filtered));
        doc.set_text(
            self.page_label,
            &format!("Page {} / {}", view.window.page, view.window.page_count),
        );
        doc.set_disabled(self.prev, !view.window.has_prev());
        doc.set_disabled(self.next, !view.window.has_next());

        self.view = Some(view);
    }

    pub fn table(&self) -> NodeId {
        self.table
    }

    pub fn rows(&self) -> &[NodeId] {
        &self.rows
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn view(&self) -> Option<&View> {
        self.view.as_ref()
    }

    pub fn options(&self) -> TableOptions {
        self.options
    }

    pub fn search_input(&self) -> NodeId {
        self.search
    }

    pub fn tag_buttons(&self) -> &[(NodeId, TagChoice)] {
        &self.tag_buttons
    }

    pub fn headers(&self) -> &[NodeId] {
        &self.headers
    }

    pub fn info(&self) -> NodeId {
        self.info
    }

    pub fn page_label(&self) -> NodeId {
        self.page_label
    }

    pub fn prev_button(&self) -> NodeId {
        self.prev
    }

    pub fn next_button(&self) -> NodeId {
        self.next
    }
}

fn snapshot(doc: &Document, row: NodeId) -> RowData {
    RowData {
        text: doc.text_content(row),
        tags: doc.attr(row, "data-tags").map(split_tags).unwrap_or_default(),
        cells: doc
            .children(row)
            .iter()
            .map(|&cell| doc.text_content(cell).trim().to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(doc: &mut Document, rows: &[(&str, &str, &str)], attrs: &[(&str, &str)]) -> NodeId {
        let body = doc.body();
        let wrap = doc.append(body, El::new("div").class("table-responsive"));
        let mut table = El::new("table").class("table table-enhance");
        for (k, v) in attrs {
            table = table.attr(k, v);
        }
        let table = doc.append(wrap, table);
        let thead = doc.append(table, El::new("thead"));
        let head = doc.append(thead, El::new("tr"));
        doc.append(head, El::new("th").text("Name"));
        doc.append(head, El::new("th").text("CPU"));
        let tbody = doc.append(table, El::new("tbody"));
        for (name, cpu, tags) in rows {
            let tr = doc.append(tbody, El::new("tr").attr("data-tags", tags));
            doc.append(tr, El::new("td").text(name));
            doc.append(tr, El::new("td").text(cpu));
        }
        table
    }

    fn shown(doc: &Document, t: &EnhancedTable) -> Vec<String> {
        let tbody = doc.parent(t.rows()[0]).unwrap();
        doc.children(tbody)
            .iter()
            .filter(|&&r| doc.element(r).is_displayed())
            .map(|&r| doc.text_content(doc.children(r)[0]))
            .collect()
    }

    #[test]
    fn test_thirty_rows_paginate() {
        let mut doc = Document::new();
        let names: Vec<String> = (0..30).map(|i| format!("host-{i:02}")).collect();
        let rows: Vec<(&str, &str, &str)> = names.iter().map(|n| (n.as_str(), "1", "")).collect();
        let table = build(&mut doc, &rows, &[]);

        let mut t = EnhancedTable::attach(&mut doc, table).unwrap();
        assert_eq!(shown(&doc, &t).len(), 25);
        assert!(doc.element(t.prev_button()).is_disabled());
        assert!(!doc.element(t.next_button()).is_disabled());
        assert_eq!(doc.text_content(t.info()), "30 items");
        assert_eq!(doc.text_content(t.page_label()), "Page 1 / 2");

        t.handle(&mut doc, TableControl::Next, None);
        assert_eq!(shown(&doc, &t).len(), 5);
        assert!(doc.element(t.next_button()).is_disabled());
        assert_eq!(doc.text_content(t.page_label()), "Page 2 / 2");

        t.handle(&mut doc, TableControl::Next, None);
        assert_eq!(t.state().page(), 2);
    }

    #[test]
    fn test_controls_are_placed_around_table() {
        let mut doc = Document::new();
        let table = build(&mut doc, &[("a", "1", "")], &[]);
        let t = EnhancedTable::attach(&mut doc, table).unwrap();
        let wrap = doc.parent(table).unwrap();
        let kids = doc.children(wrap);
        assert_eq!(kids.len(), 3);
        assert!(doc.has_class(kids[0], "table-enhance-controls"));
        assert_eq!(kids[1], table);
        assert_eq!(doc.attr(t.search_input(), "placeholder"), Some("Search table..."));
        assert_eq!(doc.attr(table, "data-enhanced"), Some("true"));
        assert!(t
            .headers()
            .iter()
            .all(|&th| doc.element(th).style("cursor") == Some("pointer")));
    }

    #[test]
    fn test_second_attach_is_noop() {
        let mut doc = Document::new();
        let table = build(&mut doc, &[("a", "1", "")], &[]);
        assert!(EnhancedTable::attach(&mut doc, table).is_some());
        let wrap = doc.parent(table).unwrap();
        let before = doc.children(wrap).len();
        assert!(EnhancedTable::attach(&mut doc, table).is_none());
        assert_eq!(doc.children(wrap).len(), before);
    }

    #[test]
    fn test_table_without_body_is_skipped() {
        let mut doc = Document::new();
        let body = doc.body();
        let table = doc.append(body, El::new("table").class("table-enhance"));
        assert!(EnhancedTable::attach(&mut doc, table).is_none());
        assert_eq!(doc.attr(table, "data-enhanced"), None);
        assert_eq!(doc.children(body).len(), 1);
    }

    #[test]
    fn test_search_filters_and_resets_page() {
        let mut doc = Document::new();
        let table = build(
            &mut doc,
            &[("web-01", "10", ""), ("db-01", "20", ""), ("web-02", "30", "")],
            &[("data-per-page", "1")],
        );
        let mut t = EnhancedTable::attach(&mut doc, table).unwrap();
        t.handle(&mut doc, TableControl::Next, None);
        assert_eq!(t.state().page(), 2);

        t.handle(&mut doc, TableControl::Search, Some("WEB"));
        assert_eq!(t.state().page(), 1);
        assert_eq!(doc.text_content(t.info()), "2 items");
        assert_eq!(shown(&doc, &t), vec!["web-01"]);
    }

    #[test]
    fn test_tag_buttons_are_exclusive() {
        let mut doc = Document::new();
        let table = build(
            &mut doc,
            &[("a", "1", "prod, web"), ("b", "2", "db"), ("c", "3", "prod")],
            &[("data-tag-filter", "true")],
        );
        let mut t = EnhancedTable::attach(&mut doc, table).unwrap();
        let labels: Vec<String> = t
            .tag_buttons()
            .iter()
            .map(|(n, _)| doc.text_content(*n))
            .collect();
        assert_eq!(labels, vec!["All", "db", "prod", "web"]);

        t.handle(&mut doc, TableControl::Tag(2), None);
        let active: Vec<bool> = t
            .tag_buttons()
            .iter()
            .map(|(n, _)| doc.has_class(*n, "active"))
            .collect();
        assert_eq!(active, vec![false, false, true, false]);
        assert_eq!(shown(&doc, &t), vec!["a", "c"]);

        t.handle(&mut doc, TableControl::Tag(0), None);
        assert_eq!(shown(&doc, &t).len(), 3);
        assert!(doc.has_class(t.tag_buttons()[0].0, "active"));
    }

    #[test]
    fn test_tag_filter_disabled_renders_no_buttons() {
        let mut doc = Document::new();
        let table = build(&mut doc, &[("a", "1", "prod")], &[]);
        let t = EnhancedTable::attach(&mut doc, table).unwrap();
        assert!(t.tag_buttons().is_empty());
    }

    #[test]
    fn test_sort_reorders_body() {
        let mut doc = Document::new();
        let table = build(
            &mut doc,
            &[("a", "10", ""), ("b", "2", ""), ("c", "abc", "")],
            &[],
        );
        let mut t = EnhancedTable::attach(&mut doc, table).unwrap();
        t.handle(&mut doc, TableControl::SortHeader(1), None);
        assert_eq!(shown(&doc, &t), vec!["b", "a", "c"]);
        t.handle(&mut doc, TableControl::SortHeader(1), None);
        assert_eq!(shown(&doc, &t), vec!["c", "a", "b"]);
        t.handle(&mut doc, TableControl::SortHeader(0), None);
        assert_eq!(shown(&doc, &t), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_inactive_pane_is_deferred() {
        let mut doc = Document::new();
        let body = doc.body();
        let pane = doc.append(body, El::new("div").class("tab-pane").id("vms"));
        let table = doc.append(pane, El::new("table").class("table-enhance"));
        let tbody = doc.append(table, El::new("tbody"));
        doc.append(tbody, El::new("tr").text("vm-1"));

        assert!(EnhancedTable::attach(&mut doc, table).is_none());
        doc.add_class(pane, "active");
        assert!(EnhancedTable::attach(&mut doc, table).is_some());
    }
}
