use crate::dom::{Document, NodeId};

pub const LOADING_CLASS: &str = "loading";

pub fn show(doc: &mut Document, node: NodeId) {
    doc.add_class(node, LOADING_CLASS);
}

pub fn hide(doc: &mut Document, node: NodeId) {
    doc.remove_class(node, LOADING_CLASS);
}

pub fn is_loading(doc: &Document, node: NodeId) -> bool {
    doc.has_class(node, LOADING_CLASS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::El;

    #[test]
    fn test_show_hide() {
        let mut doc = Document::new();
        let body = doc.body();
        let btn = doc.append(body, El::new("button").class("btn"));
        show(&mut doc, btn);
        show(&mut doc, btn);
        assert_eq!(doc.element(btn).class_name(), "btn loading");
        hide(&mut doc, btn);
        assert!(!is_loading(&doc, btn));
    }
}
