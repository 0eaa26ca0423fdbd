//! In-memory page model.
//!
//! Arena-backed [`Document`] implementation used by the unit tests and
//! by embedders that feed the core a serialized DOM snapshot instead of
//! a live page. The selector matcher supports exactly the grammar the
//! generator emits: `html`, `body`, `#id`, `[data-testid="…"]`, `tag`,
//! `tag:nth-of-type(n)` and chains joined with `" > "`.

use std::collections::HashMap;

use crate::dom::{Document, Rect};
use crate::types::Viewport;

/// Handle to an element in a [`PageModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attributes: HashMap<String, String>,
    rect: Rect,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// A static snapshot of a page.
#[derive(Debug, Clone)]
pub struct PageModel {
    elements: Vec<Element>,
    root: Option<ElementId>,
    body: Option<ElementId>,
    viewport: Viewport,
}

impl PageModel {
    /// New page with an `html` root and a `body` child, both sized to
    /// the viewport.
    pub fn new(viewport: Viewport) -> Self {
        let mut model = Self {
            elements: Vec::new(),
            root: None,
            body: None,
            viewport,
        };
        let full = Rect {
            left: 0.0,
            top: 0.0,
            width: f64::from(viewport.width),
            height: f64::from(viewport.height),
        };
        let root = model.push("html", full, None);
        let body = model.push("body", full, Some(root));
        model.elements[root.0].children.push(body);
        model.root = Some(root);
        model.body = Some(body);
        model
    }

    /// Insert an element under `parent`, appended after its siblings.
    pub fn insert(&mut self, parent: ElementId, tag: &str, rect: Rect) -> ElementId {
        let id = self.push(tag, rect, Some(parent));
        self.elements[parent.0].children.push(id);
        id
    }

    /// Insert an element with no parent, unreachable from the root.
    pub fn insert_detached(&mut self, tag: &str, rect: Rect) -> ElementId {
        self.push(tag, rect, None)
    }

    pub fn set_attribute(&mut self, node: ElementId, name: &str, value: &str) {
        self.elements[node.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn set_rect(&mut self, node: ElementId, rect: Rect) {
        self.elements[node.0].rect = rect;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn push(&mut self, tag: &str, rect: Rect, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            tag: tag.to_ascii_lowercase(),
            attributes: HashMap::new(),
            rect,
            parent,
            children: Vec::new(),
        });
        id
    }

    /// Elements reachable from the root, preorder.
    fn document_order(&self) -> Vec<ElementId> {
        let mut order = Vec::new();
        let Some(root) = self.root else {
            return order;
        };
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            order.push(node);
            for child in self.elements[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        order
    }

    fn matches(&self, node: ElementId, part: &SimplePart) -> bool {
        let element = &self.elements[node.0];
        match part {
            SimplePart::Tag(tag) => element.tag == *tag,
            SimplePart::Id(id) => element.attributes.get("id").is_some_and(|v| v == id),
            SimplePart::TestId(value) => element
                .attributes
                .get("data-testid")
                .is_some_and(|v| v == value),
            SimplePart::NthOfType { tag, index } => {
                if element.tag != *tag {
                    return false;
                }
                let position = match element.parent {
                    Some(parent) => self.elements[parent.0]
                        .children
                        .iter()
                        .filter(|sibling| self.elements[sibling.0].tag == *tag)
                        .position(|sibling| *sibling == node)
                        .map(|i| i + 1),
                    None => Some(1),
                };
                position == Some(*index)
            }
        }
    }

    /// Child-combinator chain match ending at `node`.
    fn matches_chain(&self, node: ElementId, parts: &[SimplePart]) -> bool {
        let Some((last, rest)) = parts.split_last() else {
            return false;
        };
        if !self.matches(node, last) {
            return false;
        }
        let mut current = node;
        for part in rest.iter().rev() {
            let Some(parent) = self.elements[current.0].parent else {
                return false;
            };
            if !self.matches(parent, part) {
                return false;
            }
            current = parent;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SimplePart {
    Tag(String),
    Id(String),
    TestId(String),
    NthOfType { tag: String, index: usize },
}

fn is_tag(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
}

fn parse_part(part: &str) -> Option<SimplePart> {
    let part = part.trim();
    if let Some(id) = part.strip_prefix('#') {
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return None;
        }
        return Some(SimplePart::Id(id.to_string()));
    }
    if let Some(rest) = part.strip_prefix("[data-testid=\"") {
        let value = rest.strip_suffix("\"]")?;
        return Some(SimplePart::TestId(value.to_string()));
    }
    if let Some((tag, rest)) = part.split_once(":nth-of-type(") {
        let index: usize = rest.strip_suffix(')')?.parse().ok()?;
        if index == 0 || !is_tag(tag) {
            return None;
        }
        return Some(SimplePart::NthOfType {
            tag: tag.to_string(),
            index,
        });
    }
    if is_tag(part) {
        return Some(SimplePart::Tag(part.to_string()));
    }
    None
}

fn parse_selector(selector: &str) -> Option<Vec<SimplePart>> {
    let parts: Vec<SimplePart> = selector
        .split(" > ")
        .map(parse_part)
        .collect::<Option<Vec<_>>>()?;
    if parts.is_empty() {
        return None;
    }
    Some(parts)
}

impl Document for PageModel {
    type NodeId = ElementId;

    fn root(&self) -> Option<ElementId> {
        self.root
    }

    fn body(&self) -> Option<ElementId> {
        self.body
    }

    fn parent(&self, node: ElementId) -> Option<ElementId> {
        self.elements[node.0].parent
    }

    fn children(&self, node: ElementId) -> Vec<ElementId> {
        self.elements[node.0].children.clone()
    }

    fn tag_name(&self, node: ElementId) -> String {
        self.elements[node.0].tag.clone()
    }

    fn attribute(&self, node: ElementId, name: &str) -> Option<String> {
        self.elements[node.0].attributes.get(name).cloned()
    }

    fn bounding_rect(&self, node: ElementId) -> Rect {
        self.elements[node.0].rect
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        let parts = parse_selector(selector)?;
        self.document_order()
            .into_iter()
            .find(|node| self.matches_chain(*node, &parts))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const RECT: Rect = Rect {
        left: 10.0,
        top: 20.0,
        width: 100.0,
        height: 50.0,
    };

    fn viewport() -> Viewport {
        Viewport {
            width: 1000,
            height: 800,
        }
    }

    #[test]
    fn queries_by_id_and_testid() {
        let mut page = PageModel::new(viewport());
        let body = page.body().unwrap();
        let div = page.insert(body, "div", RECT);
        page.set_attribute(div, "id", "app");
        let span = page.insert(div, "span", RECT);
        page.set_attribute(span, "data-testid", "save-button");

        assert_eq!(page.query_selector("#app"), Some(div));
        assert_eq!(
            page.query_selector("[data-testid=\"save-button\"]"),
            Some(span)
        );
        assert_eq!(page.query_selector("#missing"), None);
    }

    #[test]
    fn queries_child_chains_with_nth_of_type() {
        let mut page = PageModel::new(viewport());
        let body = page.body().unwrap();
        let first = page.insert(body, "div", RECT);
        let second = page.insert(body, "div", RECT);
        let target = page.insert(second, "p", RECT);

        assert_eq!(page.query_selector("body > div:nth-of-type(1)"), Some(first));
        assert_eq!(
            page.query_selector("body > div:nth-of-type(2) > p"),
            Some(target)
        );
        assert_eq!(page.query_selector("body > div:nth-of-type(3)"), None);
    }

    #[test]
    fn returns_first_match_in_document_order() {
        let mut page = PageModel::new(viewport());
        let body = page.body().unwrap();
        let first = page.insert(body, "section", RECT);
        page.insert(body, "section", RECT);

        assert_eq!(page.query_selector("section"), Some(first));
    }

    #[test]
    fn malformed_selectors_fail_silently() {
        let page = PageModel::new(viewport());
        assert_eq!(page.query_selector(""), None);
        assert_eq!(page.query_selector("div["), None);
        assert_eq!(page.query_selector("#"), None);
        assert_eq!(page.query_selector("div:nth-of-type(0)"), None);
        assert_eq!(page.query_selector("div:nth-of-type(x)"), None);
    }

    #[test]
    fn detached_elements_are_not_reachable() {
        let mut page = PageModel::new(viewport());
        page.insert_detached("aside", RECT);
        assert_eq!(page.query_selector("aside"), None);
    }
}
