#![forbid(unsafe_code)]

//! Pointer-following busy indicator.
//!
//! A single floating node that tracks the pointer while visible. Show and
//! hide are idempotent: redundant requests are suppressed by the fade's
//! phase, so overlapping calls produce exactly one `on_start`/`on_show`
//! pair per visible period.

use std::time::Duration;

use veil_core::caps::{self, PixelProbe};
use veil_core::dom::{Display, Document, NodeId};
use veil_core::event::{Binding, Event};
use veil_core::fade::{Fade, FadeCompletion};
use veil_core::geometry::Point;
use veil_core::viewport::{Viewport, ViewportProbe};

use crate::options::{ShowOptions, fire, fire_isolated};

/// Element id of the indicator node.
pub const INDICATOR_ID: &str = "loader-mouse";

/// Class added to the indicator node when the environment renders animated
/// PNG, letting external stylesheets pick the animated asset.
pub const APNG_CLASS: &str = "apng";

/// The pointer-following busy indicator.
///
/// One instance per document; construct it at startup and pass it by
/// reference to callers.
pub struct PointerIndicator {
    node: Option<NodeId>,
    fade: Fade,
    bindings: Binding,
    pointer: Option<Point>,
    apng: bool,
    on_show: Option<crate::options::Hook>,
    on_hide: Option<crate::options::Hook>,
}

struct DebugHooks<'a>(
    &'a Option<crate::options::Hook>,
    &'a Option<crate::options::Hook>,
);

impl std::fmt::Debug for DebugHooks<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("hooks")
            .field("on_show", &self.0.is_some())
            .field("on_hide", &self.1.is_some())
            .finish()
    }
}

impl PointerIndicator {
    /// Create an indicator; `apng` marks whether the environment renders
    /// animated PNG (see [`PointerIndicator::detect`]).
    pub fn new(apng: bool) -> Self {
        Self {
            node: None,
            fade: Fade::new(),
            bindings: Binding::empty(),
            pointer: None,
            apng,
            on_show: None,
            on_hide: None,
        }
    }

    /// Create an indicator, running the animated-PNG capability probe.
    pub fn detect(probe: &dyn PixelProbe) -> Self {
        Self::new(caps::apng_supported(probe))
    }

    /// The indicator node, once created by the first show.
    #[inline]
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Event classes currently bound.
    #[inline]
    pub fn bindings(&self) -> Binding {
        self.bindings
    }

    /// True while shown or animating towards shown.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.fade.is_showing()
    }

    /// Last pointer position seen, if any.
    #[inline]
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// Show or hide the indicator.
    ///
    /// Showing creates the node on first use, fires `on_start`, places the
    /// node at the last known pointer position (viewport center when none),
    /// and starts the show fade; `on_show` fires when it completes. Hiding
    /// starts the hide fade and fires the `on_hide` captured at show time
    /// when it completes. Both directions are no-ops when already at or
    /// heading to the target.
    pub fn set_visible(
        &mut self,
        doc: &mut Document,
        viewport: &Viewport,
        probe: &dyn ViewportProbe,
        visible: bool,
        opts: ShowOptions,
    ) {
        #[cfg(feature = "tracing")]
        tracing::debug!(visible, "pointer indicator request");
        if visible {
            self.show(doc, viewport, probe, opts);
        } else {
            self.hide(doc, opts);
        }
    }

    fn show(
        &mut self,
        doc: &mut Document,
        viewport: &Viewport,
        probe: &dyn ViewportProbe,
        mut opts: ShowOptions,
    ) {
        if self.fade.is_showing() {
            return;
        }
        // A show while the hide fade is in flight first settles that hide
        // (cleanup and captured on_hide run) so callbacks stay paired.
        if self.fade.is_visible() {
            self.tick(doc, Duration::MAX);
        }

        let node = self.ensure_node(doc);
        self.on_show = opts.on_show.take();
        self.on_hide = opts.on_hide.take();
        fire(&mut opts.on_start, None);

        let at = self
            .pointer
            .unwrap_or_else(|| viewport.window_dimensions(probe).center());
        self.place_at(doc, node, at);
        doc.style_mut(node).display = Some(Display::Block);

        self.fade.show(opts.effect_speed);
        self.bindings = Binding::POINTER_MOVE | Binding::SCROLL;
        self.tick(doc, Duration::ZERO);
    }

    fn hide(&mut self, doc: &mut Document, opts: ShowOptions) {
        if !self.fade.is_showing() {
            return;
        }
        // The on_hide captured at show time stays in effect; one supplied
        // to the hide call would be a mismatched handler.
        self.fade.hide(opts.effect_speed);
        self.bindings = Binding::empty();
        self.tick(doc, Duration::ZERO);
    }

    /// Deliver an input event.
    ///
    /// The pointer position is tracked from every pointer event so the
    /// first show can appear at the cursor; repositioning only happens for
    /// bound event classes while visible.
    pub fn handle_event(&mut self, doc: &mut Document, event: &Event) {
        match *event {
            Event::PointerMoved { x, y } | Event::Clicked { x, y, .. } => {
                self.pointer = Some(Point::new(x, y));
                if self.bindings.contains(Binding::POINTER_MOVE)
                    && let Some(node) = self.node
                {
                    self.place_at(doc, node, Point::new(x, y));
                }
            }
            Event::Scrolled { .. } => {
                if self.bindings.contains(Binding::SCROLL)
                    && let (Some(node), Some(at)) = (self.node, self.pointer)
                {
                    self.place_at(doc, node, at);
                }
            }
            _ => {}
        }
    }

    /// Advance the fade and fire due lifecycle callbacks.
    pub fn tick(&mut self, doc: &mut Document, delta: Duration) {
        let completion = self.fade.tick(delta);
        if let Some(node) = self.node {
            doc.style_mut(node).opacity = Some(self.fade.opacity());
        }
        match completion {
            Some(FadeCompletion::Shown) => fire(&mut self.on_show, None),
            Some(FadeCompletion::Hidden) => {
                if let Some(node) = self.node {
                    doc.style_mut(node).display = Some(Display::None);
                }
                // A show interrupted by this hide never reports shown.
                self.on_show = None;
                fire_isolated(&mut self.on_hide, None);
            }
            None => {}
        }
    }

    fn ensure_node(&mut self, doc: &mut Document) -> NodeId {
        if let Some(node) = self.node {
            return node;
        }
        let node = doc.create_element("div");
        doc.set_id(node, INDICATOR_ID);
        if self.apng {
            doc.add_class(node, APNG_CLASS);
        }
        let body = doc.body();
        doc.append_child(body, node);
        self.node = Some(node);
        node
    }

    /// Put the node's centerpoint at `at`. No viewport clamping: the
    /// indicator follows the cursor even along the edges.
    fn place_at(&self, doc: &mut Document, node: NodeId, at: Point) {
        let outer = doc.outer_size(node);
        let style = doc.style_mut(node);
        style.left = Some(at.x - outer.width / 2);
        style.top = Some(at.y - outer.height / 2);
    }
}

impl std::fmt::Debug for PointerIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerIndicator")
            .field("node", &self.node)
            .field("fade", &self.fade)
            .field("bindings", &self.bindings)
            .field("pointer", &self.pointer)
            .field("apng", &self.apng)
            .field("hooks", &DebugHooks(&self.on_show, &self.on_hide))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use veil_core::caps::NoPixelProbe;
    use veil_core::geometry::Size;
    use veil_core::viewport::FixedViewport;

    const SPEED: Duration = Duration::from_millis(200);

    fn log_hook(log: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> impl FnMut(Option<NodeId>) + 'static {
        let log = log.clone();
        move |_| log.borrow_mut().push(tag)
    }

    fn setup() -> (Document, Viewport, FixedViewport, PointerIndicator) {
        (
            Document::new(),
            Viewport::new(),
            FixedViewport::bare(1000, 600),
            PointerIndicator::new(false),
        )
    }

    #[test]
    fn test_first_show_creates_tagged_node() {
        let (mut doc, viewport, probe, _) = setup();
        let mut indicator = PointerIndicator::new(true);
        indicator.set_visible(&mut doc, &viewport, &probe, true, ShowOptions::new());

        let node = indicator.node().expect("node created");
        assert_eq!(doc.id(node), Some(INDICATOR_ID));
        assert_eq!(doc.parent(node), Some(doc.body()));
        assert!(doc.has_class(node, APNG_CLASS));
        assert_eq!(doc.node_by_id(INDICATOR_ID), Some(node));
    }

    #[test]
    fn test_no_apng_class_when_unsupported() {
        let (mut doc, viewport, probe, mut indicator) = setup();
        indicator.set_visible(&mut doc, &viewport, &probe, true, ShowOptions::new());
        let node = indicator.node().unwrap();
        assert!(!doc.has_class(node, APNG_CLASS));
    }

    #[test]
    fn test_detect_fails_open() {
        let indicator = PointerIndicator::detect(&NoPixelProbe);
        assert!(!indicator.apng);
    }

    #[test]
    fn test_show_centers_in_viewport_without_pointer() {
        let (mut doc, viewport, probe, mut indicator) = setup();
        indicator.set_visible(&mut doc, &viewport, &probe, true, ShowOptions::new());
        let node = indicator.node().unwrap();
        // Zero-sized node: centerpoint equals the viewport center.
        assert_eq!(doc.style(node).left, Some(500));
        assert_eq!(doc.style(node).top, Some(300));
    }

    #[test]
    fn test_show_appears_at_last_pointer_position() {
        let (mut doc, viewport, probe, mut indicator) = setup();
        indicator.handle_event(&mut doc, &Event::PointerMoved { x: 120, y: 80 });
        indicator.set_visible(&mut doc, &viewport, &probe, true, ShowOptions::new());
        let node = indicator.node().unwrap();
        assert_eq!(doc.style(node).left, Some(120));
        assert_eq!(doc.style(node).top, Some(80));
    }

    #[test]
    fn test_node_tracks_pointer_while_visible() {
        let (mut doc, viewport, probe, mut indicator) = setup();
        indicator.set_visible(&mut doc, &viewport, &probe, true, ShowOptions::new());
        let node = indicator.node().unwrap();
        doc.set_outer_size(node, Size::new(30, 30));

        indicator.handle_event(&mut doc, &Event::PointerMoved { x: 200, y: 150 });
        assert_eq!(doc.style(node).left, Some(185));
        assert_eq!(doc.style(node).top, Some(135));

        // Scroll repositions at the last pointer position.
        indicator.handle_event(&mut doc, &Event::Scrolled { x: 0, y: 50 });
        assert_eq!(doc.style(node).left, Some(185));
    }

    #[test]
    fn test_hidden_indicator_ignores_movement() {
        let (mut doc, viewport, probe, mut indicator) = setup();
        indicator.set_visible(&mut doc, &viewport, &probe, true, ShowOptions::new());
        indicator.set_visible(&mut doc, &viewport, &probe, false, ShowOptions::new());
        indicator.tick(&mut doc, Duration::from_secs(1));
        let node = indicator.node().unwrap();
        let before = doc.style(node).left;
        indicator.handle_event(&mut doc, &Event::PointerMoved { x: 900, y: 10 });
        assert_eq!(doc.style(node).left, before);
    }

    #[test]
    fn test_show_is_idempotent() {
        let (mut doc, viewport, probe, mut indicator) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        indicator.set_visible(
            &mut doc,
            &viewport,
            &probe,
            true,
            ShowOptions::new()
                .effect_speed(Duration::ZERO)
                .on_start(log_hook(&log, "start"))
                .on_show(log_hook(&log, "show")),
        );
        indicator.set_visible(
            &mut doc,
            &viewport,
            &probe,
            true,
            ShowOptions::new()
                .effect_speed(Duration::ZERO)
                .on_start(log_hook(&log, "start2"))
                .on_show(log_hook(&log, "show2")),
        );
        assert_eq!(*log.borrow(), vec!["start", "show"]);
    }

    #[test]
    fn test_zero_speed_fires_callbacks_immediately() {
        let (mut doc, viewport, probe, mut indicator) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        indicator.set_visible(
            &mut doc,
            &viewport,
            &probe,
            true,
            ShowOptions::new()
                .effect_speed(Duration::ZERO)
                .on_start(log_hook(&log, "start"))
                .on_show(log_hook(&log, "show"))
                .on_hide(log_hook(&log, "hide")),
        );
        indicator.set_visible(
            &mut doc,
            &viewport,
            &probe,
            false,
            ShowOptions::new().effect_speed(Duration::ZERO),
        );
        assert_eq!(*log.borrow(), vec!["start", "show", "hide"]);
        assert_eq!(indicator.bindings(), Binding::empty());
        let node = indicator.node().unwrap();
        assert_eq!(doc.style(node).display, Some(Display::None));
    }

    #[test]
    fn test_on_hide_captured_at_show_time() {
        let (mut doc, viewport, probe, mut indicator) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        indicator.set_visible(
            &mut doc,
            &viewport,
            &probe,
            true,
            ShowOptions::new()
                .effect_speed(Duration::ZERO)
                .on_hide(log_hook(&log, "captured")),
        );
        // The hide call's own on_hide is a mismatched handler; ignored.
        indicator.set_visible(
            &mut doc,
            &viewport,
            &probe,
            false,
            ShowOptions::new()
                .effect_speed(Duration::ZERO)
                .on_hide(log_hook(&log, "stale")),
        );
        assert_eq!(*log.borrow(), vec!["captured"]);
    }

    #[test]
    fn test_panicking_on_hide_does_not_abort_cleanup() {
        let (mut doc, viewport, probe, mut indicator) = setup();
        indicator.set_visible(
            &mut doc,
            &viewport,
            &probe,
            true,
            ShowOptions::new()
                .effect_speed(Duration::ZERO)
                .on_hide(|_| panic!("boom")),
        );
        indicator.set_visible(
            &mut doc,
            &viewport,
            &probe,
            false,
            ShowOptions::new().effect_speed(Duration::ZERO),
        );
        let node = indicator.node().unwrap();
        assert_eq!(doc.style(node).display, Some(Display::None));
        assert_eq!(indicator.bindings(), Binding::empty());
    }

    #[test]
    fn test_hide_mid_show_cancels_on_show() {
        let (mut doc, viewport, probe, mut indicator) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        indicator.set_visible(
            &mut doc,
            &viewport,
            &probe,
            true,
            ShowOptions::new()
                .effect_speed(SPEED)
                .on_show(log_hook(&log, "show"))
                .on_hide(log_hook(&log, "hide")),
        );
        indicator.tick(&mut doc, Duration::from_millis(50));
        indicator.set_visible(&mut doc, &viewport, &probe, false, ShowOptions::new().effect_speed(SPEED));
        indicator.tick(&mut doc, Duration::from_secs(1));
        // on_show never fires; the captured on_hide does.
        assert_eq!(*log.borrow(), vec!["hide"]);
    }

    #[test]
    fn test_show_mid_hide_settles_previous_cycle_first() {
        let (mut doc, viewport, probe, mut indicator) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        indicator.set_visible(
            &mut doc,
            &viewport,
            &probe,
            true,
            ShowOptions::new()
                .effect_speed(Duration::ZERO)
                .on_hide(log_hook(&log, "hide1")),
        );
        indicator.set_visible(&mut doc, &viewport, &probe, false, ShowOptions::new().effect_speed(SPEED));
        // Hide fade in flight; a new show settles it before restarting.
        indicator.set_visible(
            &mut doc,
            &viewport,
            &probe,
            true,
            ShowOptions::new()
                .effect_speed(Duration::ZERO)
                .on_start(log_hook(&log, "start2"))
                .on_show(log_hook(&log, "show2")),
        );
        assert_eq!(*log.borrow(), vec!["hide1", "start2", "show2"]);
        assert!(indicator.is_visible());
    }

    #[test]
    fn edge_hide_when_hidden_is_noop() {
        let (mut doc, viewport, probe, mut indicator) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        indicator.set_visible(
            &mut doc,
            &viewport,
            &probe,
            false,
            ShowOptions::new().on_hide(log_hook(&log, "hide")),
        );
        assert!(log.borrow().is_empty());
        assert!(indicator.node().is_none());
    }

    #[test]
    fn edge_node_reused_across_cycles() {
        let (mut doc, viewport, probe, mut indicator) = setup();
        indicator.set_visible(&mut doc, &viewport, &probe, true, ShowOptions::new().effect_speed(Duration::ZERO));
        let first = indicator.node().unwrap();
        indicator.set_visible(&mut doc, &viewport, &probe, false, ShowOptions::new().effect_speed(Duration::ZERO));
        indicator.set_visible(&mut doc, &viewport, &probe, true, ShowOptions::new().effect_speed(Duration::ZERO));
        assert_eq!(indicator.node(), Some(first));
        let nodes_before = doc.len();
        indicator.set_visible(&mut doc, &viewport, &probe, true, ShowOptions::new());
        assert_eq!(doc.len(), nodes_before);
    }
}
