//! Boundary to the host page.
//!
//! The live page is an external collaborator; the core only needs the
//! read-only view described by [`Document`]. An in-memory
//! implementation lives in [`crate::page`].

use crate::types::Viewport;

/// An element's bounding box in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Read-only view of a rendered page.
///
/// Node handles are opaque and only valid against the document that
/// issued them.
pub trait Document {
    type NodeId: Copy + Eq;

    /// The document's root element (`html`).
    fn root(&self) -> Option<Self::NodeId>;

    /// The document's `body` element.
    fn body(&self) -> Option<Self::NodeId>;

    fn parent(&self, node: Self::NodeId) -> Option<Self::NodeId>;

    /// Child elements in document order.
    fn children(&self, node: Self::NodeId) -> Vec<Self::NodeId>;

    /// Lowercase tag name.
    fn tag_name(&self, node: Self::NodeId) -> String;

    fn attribute(&self, node: Self::NodeId, name: &str) -> Option<String>;

    /// Current bounding box of the node.
    fn bounding_rect(&self, node: Self::NodeId) -> Rect;

    /// Current viewport dimensions.
    fn viewport(&self) -> Viewport;

    /// First element matching `selector` in document order.
    ///
    /// Malformed selector strings must yield `None`, never an error.
    fn query_selector(&self, selector: &str) -> Option<Self::NodeId>;
}
