//! Active-link highlighting, mobile menu collapse and `[data-href]` rows.

use crate::dom::{Document, NodeId};

/// Whether a nav link pointing at `href` is the current page. The root link
/// only matches the root path; every other link matches by prefix.
pub fn is_active(href: &str, path: &str) -> bool {
    if href == "/" {
        path == "/"
    } else {
        !href.is_empty() && path.starts_with(href)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Navigation {
    links: Vec<NodeId>,
}

impl Navigation {
    #[tracing::instrument(skip(doc))]
    pub fn mount(doc: &mut Document, path: &str) -> Self {
        let root = doc.root();
        let nav = Self {
            links: doc.query_all(root, |el| el.has_class("nav-link")),
        };
        nav.highlight(doc, path);
        nav
    }

    pub fn links(&self) -> &[NodeId] {
        &self.links
    }

    pub fn highlight(&self, doc: &mut Document, path: &str) {
        for &link in &self.links {
            let active = doc
                .attr(link, "href")
                .is_some_and(|href| is_active(href, path));
            doc.toggle_class(link, "active", active);
        }
    }

    /// Closes the expanded mobile menu after a link is followed.
    pub fn on_link_click(&self, doc: &mut Document) {
        let root = doc.root();
        let Some(menu) = doc.query(root, |el| el.has_class("navbar-collapse")) else {
            return;
        };
        if !doc.has_class(menu, "show") {
            return;
        }
        doc.remove_class(menu, "show");
        if let Some(toggler) = doc.query(root, |el| el.has_class("navbar-toggler")) {
            doc.add_class(toggler, "collapsed");
            doc.set_attr(toggler, "aria-expanded", "false");
        }
    }
}

/// Rows that navigate to their `data-href`.
#[derive(Debug, Clone, Default)]
pub struct ClickableRows {
    rows: Vec<NodeId>,
}

impl ClickableRows {
    pub fn mount(doc: &mut Document) -> Self {
        let root = doc.root();
        let rows = doc.query_all(root, |el| el.has_attr("data-href"));
        for &row in &rows {
            doc.set_style(row, "cursor", "pointer");
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[NodeId] {
        &self.rows
    }

    /// Destination for a click on `target` inside `row`; clicks on buttons
    /// and links keep their own behavior.
    pub fn on_click(&self, doc: &Document, row: NodeId, target: NodeId) -> Option<String> {
        if doc.closest(target, |el| el.is("button") || el.is("a")).is_some() {
            return None;
        }
        doc.attr(row, "data-href").map(str::to_owned)
    }

    pub fn on_key(&self, doc: &Document, row: NodeId, key: &str) -> Option<String> {
        if key != "Enter" {
            return None;
        }
        doc.attr(row, "data-href").map(str::to_owned)
    }
}
