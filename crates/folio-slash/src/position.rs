//! Menu anchoring relative to the caret.
//!
//! Pure geometry; the host re-invokes [`anchor_menu`] on every scroll or
//! resize. All coordinates are viewport-relative CSS pixels.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Caret bounding box, as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

const GAP: f64 = 4.0;

/// Place the menu below the caret, flipping above when the space below is
/// insufficient, clamped to the viewport either way.
pub fn anchor_menu(caret: Rect, menu: Size, viewport: Size) -> Point {
    let below = caret.y + caret.height + GAP;
    let y = if below + menu.height <= viewport.height {
        below
    } else {
        caret.y - GAP - menu.height
    };
    Point {
        x: caret.x.min(viewport.width - menu.width).max(0.0),
        y: y.min(viewport.height - menu.height).max(0.0),
    }
}
