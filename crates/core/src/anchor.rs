//! Anchor creation and two-tier resolution.

use crate::dom::Document;
use crate::selector::generate_selector;
use crate::types::PinAnchor;

/// How a position was recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The anchor's selector still matched; the pin tracks the element.
    Selector,
    /// Fixed point in the viewport; the degraded guarantee when the
    /// underlying element disappeared.
    Page,
}

/// Transient, derived position. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPosition {
    pub x: f64,
    pub y: f64,
    pub strategy: Strategy,
}

/// Capture a click on `node` as a portable anchor.
///
/// Offsets are measured against the node's current bounding box and are
/// not clamped; page percentages against the current viewport.
pub fn create_anchor<D: Document>(
    doc: &D,
    node: D::NodeId,
    click_x: f64,
    click_y: f64,
    pathname: &str,
) -> PinAnchor {
    let rect = doc.bounding_rect(node);
    let viewport = doc.viewport();
    PinAnchor {
        selector: generate_selector(doc, node),
        offset_x_percent: (click_x - rect.left) / rect.width,
        offset_y_percent: (click_y - rect.top) / rect.height,
        page_x_percent: click_x / f64::from(viewport.width),
        page_y_percent: click_y / f64::from(viewport.height),
        pathname: pathname.to_string(),
        viewport,
    }
}

/// Recompute an anchor's position against the current document.
///
/// Selector strategy when the selector is non-empty and still matches;
/// otherwise the page-position fallback. One of the two always applies
/// when a document is available at all.
pub fn resolve_anchor<D: Document>(doc: &D, anchor: &PinAnchor) -> ResolvedPosition {
    if !anchor.selector.is_empty() {
        if let Some(node) = doc.query_selector(&anchor.selector) {
            let rect = doc.bounding_rect(node);
            return ResolvedPosition {
                x: rect.left + anchor.offset_x_percent * rect.width,
                y: rect.top + anchor.offset_y_percent * rect.height,
                strategy: Strategy::Selector,
            };
        }
    }
    let viewport = doc.viewport();
    ResolvedPosition {
        x: anchor.page_x_percent * f64::from(viewport.width),
        y: anchor.page_y_percent * f64::from(viewport.height),
        strategy: Strategy::Page,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::dom::Rect;
    use crate::page::PageModel;
    use crate::types::Viewport;

    fn page() -> PageModel {
        PageModel::new(Viewport {
            width: 1000,
            height: 800,
        })
    }

    fn app_rect() -> Rect {
        Rect {
            left: 100.0,
            top: 200.0,
            width: 400.0,
            height: 300.0,
        }
    }

    #[test]
    fn captures_offsets_and_page_percentages() {
        let mut page = page();
        let body = page.body().unwrap();
        let div = page.insert(body, "div", app_rect());
        page.set_attribute(div, "id", "app");

        let anchor = create_anchor(&page, div, 200.0, 350.0, "/docs");

        assert_eq!(anchor.selector, "#app");
        assert!((anchor.offset_x_percent - 0.25).abs() < 1e-9);
        assert!((anchor.offset_y_percent - 0.5).abs() < 1e-9);
        assert!((anchor.page_x_percent - 0.2).abs() < 1e-9);
        assert!((anchor.page_y_percent - 0.4375).abs() < 1e-9);
        assert_eq!(anchor.pathname, "/docs");
        assert_eq!(anchor.viewport.width, 1000);
    }

    #[test]
    fn offsets_are_not_clamped() {
        let mut page = page();
        let body = page.body().unwrap();
        let div = page.insert(body, "div", app_rect());

        let anchor = create_anchor(&page, div, 50.0, 600.0, "/");
        assert!(anchor.offset_x_percent < 0.0);
        assert!(anchor.offset_y_percent > 1.0);
    }

    #[test]
    fn resolves_through_the_selector_when_it_matches() {
        let mut page = page();
        let body = page.body().unwrap();
        let div = page.insert(body, "div", app_rect());
        page.set_attribute(div, "id", "app");

        let anchor = create_anchor(&page, div, 200.0, 350.0, "/docs");
        let position = resolve_anchor(&page, &anchor);

        assert_eq!(position.strategy, Strategy::Selector);
        assert!((position.x - 200.0).abs() < 1e-9);
        assert!((position.y - 350.0).abs() < 1e-9);
    }

    #[test]
    fn selector_strategy_tracks_a_moved_element() {
        let mut page = page();
        let body = page.body().unwrap();
        let div = page.insert(body, "div", app_rect());
        page.set_attribute(div, "id", "app");
        let anchor = create_anchor(&page, div, 200.0, 350.0, "/docs");

        page.set_rect(
            div,
            Rect {
                left: 300.0,
                top: 100.0,
                width: 200.0,
                height: 100.0,
            },
        );
        let position = resolve_anchor(&page, &anchor);

        assert_eq!(position.strategy, Strategy::Selector);
        assert!((position.x - 350.0).abs() < 1e-9);
        assert!((position.y - 150.0).abs() < 1e-9);
    }

    #[test]
    fn falls_back_to_page_position_when_selector_misses() {
        let page = page();
        let anchor = PinAnchor {
            selector: "#gone".to_string(),
            offset_x_percent: 9.0,
            offset_y_percent: 9.0,
            page_x_percent: 0.5,
            page_y_percent: 0.5,
            pathname: "/".to_string(),
            viewport: Viewport {
                width: 640,
                height: 480,
            },
        };

        let position = resolve_anchor(&page, &anchor);

        // Offsets are ignored; only page percentages and the *current*
        // viewport matter.
        assert_eq!(position.strategy, Strategy::Page);
        assert!((position.x - 500.0).abs() < 1e-9);
        assert!((position.y - 400.0).abs() < 1e-9);
    }

    #[test]
    fn empty_selector_uses_page_strategy() {
        let page = page();
        let anchor = PinAnchor {
            selector: String::new(),
            offset_x_percent: 0.0,
            offset_y_percent: 0.0,
            page_x_percent: 0.1,
            page_y_percent: 0.2,
            pathname: "/".to_string(),
            viewport: Viewport {
                width: 1000,
                height: 800,
            },
        };

        let position = resolve_anchor(&page, &anchor);
        assert_eq!(position.strategy, Strategy::Page);
        assert!((position.x - 100.0).abs() < 1e-9);
        assert!((position.y - 160.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_selector_falls_back_instead_of_failing() {
        let page = page();
        let anchor = PinAnchor {
            selector: "div[".to_string(),
            offset_x_percent: 0.0,
            offset_y_percent: 0.0,
            page_x_percent: 0.25,
            page_y_percent: 0.25,
            pathname: "/".to_string(),
            viewport: Viewport {
                width: 1000,
                height: 800,
            },
        };

        let position = resolve_anchor(&page, &anchor);
        assert_eq!(position.strategy, Strategy::Page);
    }
}
