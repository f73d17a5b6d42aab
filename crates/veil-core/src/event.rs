#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! The embedder translates its native events (browser, test harness, or
//! otherwise) into this enum and delivers them to the widgets. All events
//! derive `Clone` and `PartialEq` for use in tests and pattern matching.
//!
//! # Design Notes
//!
//! - Coordinates are page pixels, 0-indexed.
//! - Widgets do not subscribe to an event bus; they expose the set of event
//!   classes they currently listen to as [`Binding`] flags, updated in
//!   lockstep with visibility, and ignore events outside that set.

use bitflags::bitflags;

use crate::dom::NodeId;

bitflags! {
    /// Event classes a widget is currently bound to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Binding: u8 {
        /// Pointer movement over the page.
        const POINTER_MOVE = 1 << 0;
        /// Page scroll.
        const SCROLL = 1 << 1;
        /// Viewport resize and gesture end.
        const RESIZE = 1 << 2;
        /// Keyboard input.
        const KEY = 1 << 3;
        /// Pointer clicks.
        const CLICK = 1 << 4;
    }
}

/// Which resize stream produced a [`Event::Resized`].
///
/// Environments that can coalesce resize bursts deliver `Throttled`
/// events; plain environments deliver `Raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeSource {
    Throttled,
    Raw,
}

/// Prefer the throttled resize stream when the environment provides one,
/// to bound recompute frequency; otherwise accept the raw stream.
#[inline]
pub fn wants_resize(source: ResizeSource, throttled_available: bool) -> bool {
    match source {
        ResizeSource::Throttled => true,
        ResizeSource::Raw => !throttled_available,
    }
}

/// Key codes the widgets care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Char(char),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
}

impl KeyEvent {
    /// Create a new key event.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self { code }
    }
}

/// Canonical input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// The pointer moved to page coordinates `(x, y)`.
    PointerMoved { x: i32, y: i32 },
    /// The page scrolled to offset `(x, y)`.
    Scrolled { x: i32, y: i32 },
    /// A click landed on `target` at page coordinates `(x, y)`.
    Clicked { target: NodeId, x: i32, y: i32 },
    /// A keyboard event.
    Key(KeyEvent),
    /// The viewport was resized.
    Resized {
        width: i32,
        height: i32,
        source: ResizeSource,
    },
    /// A pinch-zoom (or similar) gesture completed; treated as a resize
    /// trigger for recentering.
    GestureEnd,
}

impl Event {
    /// The binding class this event belongs to.
    pub fn binding(&self) -> Binding {
        match self {
            Event::PointerMoved { .. } => Binding::POINTER_MOVE,
            Event::Scrolled { .. } => Binding::SCROLL,
            Event::Clicked { .. } => Binding::CLICK,
            Event::Key(_) => Binding::KEY,
            Event::Resized { .. } | Event::GestureEnd => Binding::RESIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn test_event_binding_classes() {
        let mut doc = Document::new();
        let n = doc.create_element("div");
        assert_eq!(
            Event::PointerMoved { x: 1, y: 2 }.binding(),
            Binding::POINTER_MOVE
        );
        assert_eq!(Event::Scrolled { x: 0, y: 40 }.binding(), Binding::SCROLL);
        assert_eq!(
            Event::Clicked { target: n, x: 0, y: 0 }.binding(),
            Binding::CLICK
        );
        assert_eq!(
            Event::Key(KeyEvent::new(KeyCode::Escape)).binding(),
            Binding::KEY
        );
        assert_eq!(
            Event::Resized {
                width: 800,
                height: 600,
                source: ResizeSource::Raw
            }
            .binding(),
            Binding::RESIZE
        );
        assert_eq!(Event::GestureEnd.binding(), Binding::RESIZE);
    }

    #[test]
    fn test_wants_resize_prefers_throttled() {
        assert!(wants_resize(ResizeSource::Throttled, true));
        assert!(wants_resize(ResizeSource::Throttled, false));
        assert!(!wants_resize(ResizeSource::Raw, true));
        assert!(wants_resize(ResizeSource::Raw, false));
    }

    #[test]
    fn edge_binding_flags_are_distinct() {
        let all = [
            Binding::POINTER_MOVE,
            Binding::SCROLL,
            Binding::RESIZE,
            Binding::KEY,
            Binding::CLICK,
        ];
        let mut acc = Binding::empty();
        for flag in all {
            assert!(!acc.intersects(flag));
            acc |= flag;
        }
        assert_eq!(acc, Binding::all());
    }
}
