//! Selector generation.
//!
//! Deterministic, pure function of the current tree. Priority order:
//! root/body literals, `data-testid` (more stable across redeploys than
//! markup ids), `#id`, then an ancestor walk emitting positional
//! segments.

use crate::dom::Document;

/// Produce a selector string that should re-identify `node` later.
pub fn generate_selector<D: Document>(doc: &D, node: D::NodeId) -> String {
    if doc.root() == Some(node) {
        return "html".to_string();
    }
    if doc.body() == Some(node) {
        return "body".to_string();
    }
    if let Some(test_id) = non_empty(doc.attribute(node, "data-testid")) {
        return format!("[data-testid=\"{test_id}\"]");
    }
    if let Some(id) = non_empty(doc.attribute(node, "id")) {
        return format!("#{id}");
    }

    let mut path: Vec<String> = Vec::new();
    let mut current = Some(node);
    while let Some(element) = current {
        if doc.root() == Some(element) {
            break;
        }
        if doc.body() == Some(element) {
            path.insert(0, "body".to_string());
            break;
        }
        if let Some(test_id) = non_empty(doc.attribute(element, "data-testid")) {
            path.insert(0, format!("[data-testid=\"{test_id}\"]"));
            break;
        }
        if let Some(id) = non_empty(doc.attribute(element, "id")) {
            path.insert(0, format!("#{id}"));
            break;
        }

        let tag = doc.tag_name(element);
        match doc.parent(element) {
            None => {
                // Detached element: its own tag is the whole path.
                path.insert(0, tag);
                break;
            }
            Some(parent) => {
                let same_tag: Vec<D::NodeId> = doc
                    .children(parent)
                    .into_iter()
                    .filter(|sibling| doc.tag_name(*sibling) == tag)
                    .collect();
                if same_tag.len() == 1 {
                    path.insert(0, tag);
                } else {
                    let index = same_tag
                        .iter()
                        .position(|sibling| *sibling == element)
                        .map_or(1, |i| i + 1);
                    path.insert(0, format!("{tag}:nth-of-type({index})"));
                }
                current = Some(parent);
            }
        }
    }

    if path.is_empty() {
        "body".to_string()
    } else {
        path.join(" > ")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
