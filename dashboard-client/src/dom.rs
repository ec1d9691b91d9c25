//! Retained document model the page behavior runs against.
//!
//! The embedding host mirrors this tree into whatever it renders with (a
//! browser document through a wasm shim, a server-side renderer, a test
//! harness). Nodes live in an arena owned by the [`Document`]; removing a
//! node only detaches it, so a [`NodeId`] stays valid for the page lifetime.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One element in the document arena.
#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    value: String,
    disabled: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }

    pub fn style(&self, prop: &str) -> Option<&str> {
        self.styles.get(prop).map(String::as_str)
    }

    /// False only when an inline `display: none` is set.
    pub fn is_displayed(&self) -> bool {
        self.style("display") != Some("none")
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Matches a tag name case-insensitively.
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }
}

/// Declarative description of a new element.
///
/// ```ignore
/// let row = doc.append(tbody, El::new("tr").attr("data-tags", "prod, db"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct El {
    tag: String,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    text: String,
}

impl El {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Adds every whitespace separated class in `classes`.
    pub fn class(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            if !self.classes.iter().any(|c| c == class) {
                self.classes.push(class.to_string());
            }
        }
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn style(mut self, prop: &str, value: &str) -> Self {
        self.styles.push((prop.to_string(), value.to_string()));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates `<html><body></body></html>`.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
        };
        doc.root = doc.create(El::new("html"));
        doc.body = doc.append(doc.root, El::new("body"));
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn element(&self, node: NodeId) -> &Element {
        &self.nodes[node.0]
    }

    fn element_mut(&mut self, node: NodeId) -> &mut Element {
        &mut self.nodes[node.0]
    }

    /// Allocates a detached element.
    pub fn create(&mut self, el: El) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element {
            tag: el.tag,
            classes: el.classes,
            attrs: el.attrs.into_iter().collect(),
            styles: el.styles.into_iter().collect(),
            text: el.text,
            ..Default::default()
        });
        id
    }

    /// Creates an element and appends it as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, el: El) -> NodeId {
        let id = self.create(el);
        self.append_child(parent, id);
        id
    }

    /// Moves `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.element_mut(parent).children.push(child);
        self.element_mut(child).parent = Some(parent);
    }

    /// Moves `child` in front of `reference`; appends when `reference` is not
    /// a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        let siblings = &mut self.element_mut(parent).children;
        match siblings.iter().position(|&c| c == reference) {
            Some(pos) => siblings.insert(pos, child),
            None => siblings.push(child),
        }
        self.element_mut(child).parent = Some(parent);
    }

    pub fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.element_mut(node).parent.take() {
            self.element_mut(parent).children.retain(|&c| c != node);
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node).parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.element(node).children
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == node)?;
        siblings.get(pos + 1).copied()
    }

    /// True when `node` is reachable from the root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len() && self.contains(self.root, node)
    }

    /// True when `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    /// Pre-order descendants of `node`, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    pub fn query_all<F>(&self, scope: NodeId, pred: F) -> Vec<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| pred(self.element(n)))
            .collect()
    }

    pub fn query<F>(&self, scope: NodeId, pred: F) -> Option<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        self.descendants(scope)
            .into_iter()
            .find(|&n| pred(self.element(n)))
    }

    /// Nearest inclusive ancestor of `node` matching `pred`.
    pub fn closest<F>(&self, node: NodeId, pred: F) -> Option<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if pred(self.element(n)) {
                return Some(n);
            }
            cur = self.parent(n);
        }
        None
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.query(self.root, |el| el.id() == Some(id))
    }

    /// Resolves the `#id` form used by tab targets and pager hosts.
    pub fn select_id(&self, selector: &str) -> Option<NodeId> {
        selector
            .strip_prefix('#')
            .filter(|id| !id.is_empty())
            .and_then(|id| self.get_element_by_id(id))
    }

    /// Concatenated text of `node` and all of its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = self.element(node).text.clone();
        for n in self.descendants(node) {
            out.push_str(&self.element(n).text);
        }
        out
    }

    /// Replaces the node's content with plain text, detaching its children.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        for child in self.children(node).to_vec() {
            self.detach(child);
        }
        self.element_mut(node).text = text.to_string();
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).has_class(class)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            self.element_mut(node).classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        self.element_mut(node).classes.retain(|c| c != class);
    }

    pub fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    /// Replaces the whole class list.
    pub fn set_class_name(&mut self, node: NodeId, classes: &str) {
        let el = self.element_mut(node);
        el.classes.clear();
        for class in classes.split_whitespace() {
            if !el.classes.iter().any(|c| c == class) {
                el.classes.push(class.to_string());
            }
        }
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).attr(name)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        self.element_mut(node)
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    /// Sets an inline style; an empty value clears it.
    pub fn set_style(&mut self, node: NodeId, prop: &str, value: &str) {
        let styles = &mut self.element_mut(node).styles;
        if value.is_empty() {
            styles.remove(prop);
        } else {
            styles.insert(prop.to_string(), value.to_string());
        }
    }

    pub fn set_displayed(&mut self, node: NodeId, displayed: bool) {
        self.set_style(node, "display", if displayed { "" } else { "none" });
    }

    pub fn set_disabled(&mut self, node: NodeId, disabled: bool) {
        self.element_mut(node).disabled = disabled;
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        self.element_mut(node).value = value.to_string();
    }
}
