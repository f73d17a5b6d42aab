#![forbid(unsafe_code)]

//! Full-viewport dimming overlay with an optional hosted modal panel.
//!
//! The controller owns the overlay's visibility state machine
//! (`Hidden → Showing → Visible → Hiding`), the dismissal interactions of
//! modal mode, and the layout-shift compensation that keeps page content
//! still while the native scrollbar is suppressed.
//!
//! # Invariants
//!
//! - At most one overlay is active; a show request for a different panel
//!   first runs the current content's full hide sequence (immediate,
//!   0-duration) before the new show begins.
//! - The hosted panel is returned to its original parent exactly once per
//!   hide cycle, however often the overlay is reused.
//! - Dismissal and resize handlers are bound/unbound in lockstep with
//!   visibility; after a completed hide no bindings remain.
//!
//! # Failure Modes
//!
//! - A panicking `on_hide` callback is isolated; parent restoration, class
//!   removal, and width restoration always run.
//! - Invalid selectors in options are not validated and match nothing.

use std::fmt;
use std::time::Duration;

use veil_core::dom::{Display, Document, NodeId, Selector};
use veil_core::event::{Binding, Event, KeyCode, wants_resize};
use veil_core::fade::{Fade, FadeCompletion};
use veil_core::viewport::{Viewport, ViewportProbe};

use crate::options::{FixedElements, Hook, ShowOptions, fire, fire_isolated};

/// Element id of the overlay node.
pub const OVERLAY_ID: &str = "overlay";

/// Element id of the default (non-modal) loading panel.
pub const PANEL_ID: &str = "loader-overlay";

/// Class of the default panel's message node.
pub const PANEL_TEXT_CLASS: &str = "loader-overlay-text";

/// Body class signalling the scroll-suppressed state to stylesheets.
pub const SCROLL_SUPPRESS_CLASS: &str = "overlay-body";

/// Target opacity of the fully faded-in backdrop.
const BACKDROP_OPACITY: f64 = 0.5;

/// Options for an overlay show request: the shared [`ShowOptions`] plus an
/// optional caller-supplied panel. A hosted panel puts the overlay in modal
/// mode; without one the overlay shows its default loading panel.
#[derive(Debug, Default)]
pub struct OverlayOptions {
    pub show: ShowOptions,
    pub hosted_panel: Option<NodeId>,
}

impl OverlayOptions {
    /// Create default options (non-modal, default panel).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hosted panel, switching the overlay to modal mode.
    pub fn hosted_panel(mut self, panel: NodeId) -> Self {
        self.hosted_panel = Some(panel);
        self
    }
}

impl From<ShowOptions> for OverlayOptions {
    fn from(show: ShowOptions) -> Self {
        Self {
            show,
            hosted_panel: None,
        }
    }
}

/// Transient state attached to the overlay while it is active.
struct ActiveOverlay {
    modal: bool,
    panel: NodeId,
    /// The panel's parent before the overlay adopted it.
    panel_home: Option<NodeId>,
    panel_attached: bool,
    /// Guards the once-per-hide-cycle parent restoration.
    restored: bool,
    hide_selector: Selector,
    effect_speed: Duration,
    /// `(element, prior inline width)` for every frozen element.
    frozen: Vec<(NodeId, Option<i32>)>,
    scrollbar_width: i32,
    on_show: Option<Hook>,
    on_hide: Option<Hook>,
}

impl fmt::Debug for ActiveOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveOverlay")
            .field("modal", &self.modal)
            .field("panel", &self.panel)
            .field("panel_home", &self.panel_home)
            .field("panel_attached", &self.panel_attached)
            .field("restored", &self.restored)
            .field("hide_selector", &self.hide_selector)
            .field("effect_speed", &self.effect_speed)
            .field("frozen", &self.frozen)
            .field("scrollbar_width", &self.scrollbar_width)
            .field("on_show", &self.on_show.is_some())
            .field("on_hide", &self.on_hide.is_some())
            .finish()
    }
}

/// The overlay controller.
///
/// One instance per document; construct it at startup and pass it by
/// reference to callers.
#[derive(Debug)]
pub struct OverlayController {
    overlay: Option<NodeId>,
    default_panel: Option<NodeId>,
    backdrop: Fade,
    panel_fade: Fade,
    bindings: Binding,
    /// Whether the embedder delivers a throttled resize stream; raw resize
    /// events are ignored when it does.
    throttled_resize: bool,
    active: Option<ActiveOverlay>,
}

impl Default for OverlayController {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayController {
    /// Create a controller with no overlay node yet.
    pub fn new() -> Self {
        Self {
            overlay: None,
            default_panel: None,
            backdrop: Fade::new(),
            panel_fade: Fade::new(),
            bindings: Binding::empty(),
            throttled_resize: false,
            active: None,
        }
    }

    /// Declare whether the embedder provides a throttled resize stream.
    pub fn set_throttled_resize_available(&mut self, available: bool) {
        self.throttled_resize = available;
    }

    /// The overlay node, once created by the first show.
    #[inline]
    pub fn node(&self) -> Option<NodeId> {
        self.overlay
    }

    /// The active panel, while the overlay is in use.
    #[inline]
    pub fn panel(&self) -> Option<NodeId> {
        self.active.as_ref().map(|a| a.panel)
    }

    /// Event classes currently bound.
    #[inline]
    pub fn bindings(&self) -> Binding {
        self.bindings
    }

    /// True while shown or animating towards shown.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.backdrop.is_showing()
    }

    /// Show or hide the overlay.
    ///
    /// See the module docs for the exact show/hide sequences. The
    /// `on_hide` of a show call is captured for that show's matching hide;
    /// the one on a hide call is ignored.
    pub fn set_visible(
        &mut self,
        doc: &mut Document,
        viewport: &mut Viewport,
        probe: &dyn ViewportProbe,
        visible: bool,
        opts: OverlayOptions,
    ) {
        #[cfg(feature = "tracing")]
        tracing::debug!(visible, modal = opts.hosted_panel.is_some(), "overlay request");
        if visible {
            self.show(doc, viewport, probe, opts);
        } else {
            self.begin_hide(opts.show.effect_speed);
            self.tick(doc, viewport, probe, Duration::ZERO);
        }
    }

    fn show(
        &mut self,
        doc: &mut Document,
        viewport: &mut Viewport,
        probe: &dyn ViewportProbe,
        mut opts: OverlayOptions,
    ) {
        let (panel, modal) = match opts.hosted_panel {
            Some(panel) => (panel, true),
            None => (self.ensure_default_panel(doc), false),
        };

        if self.backdrop.is_showing() {
            if self.panel() == Some(panel) {
                return;
            }
            // Exclusivity: immediately run the current content's full hide
            // sequence before this panel takes over.
            self.begin_hide(Duration::ZERO);
            self.tick(doc, viewport, probe, Duration::MAX);
        } else if self.backdrop.is_visible() {
            // A hide fade is in flight; settle it so its cleanup and
            // captured on_hide run before the new cycle starts.
            self.tick(doc, viewport, probe, Duration::MAX);
        }

        let overlay = self.ensure_overlay(doc);

        fire(&mut opts.show.on_start, Some(panel));

        self.bindings = Binding::RESIZE;
        if modal {
            self.bindings |= Binding::CLICK | Binding::KEY;
        }

        let frozen = freeze_widths(doc, &opts.show.fixed_elements);

        let body = doc.body();
        doc.add_class(body, SCROLL_SUPPRESS_CLASS);
        let scrollbar_width = viewport.measure_scrollbar_width(probe);
        let root = doc.root();
        doc.style_mut(root).margin_right = Some(scrollbar_width);

        self.active = Some(ActiveOverlay {
            modal,
            panel,
            panel_home: doc.parent(panel),
            panel_attached: false,
            restored: false,
            hide_selector: Selector::parse(&opts.show.hide_selector),
            effect_speed: opts.show.effect_speed,
            frozen,
            scrollbar_width,
            on_show: opts.show.on_show.take(),
            on_hide: opts.show.on_hide.take(),
        });

        doc.style_mut(overlay).display = Some(Display::Block);
        self.backdrop.show(opts.show.effect_speed);
        self.tick(doc, viewport, probe, Duration::ZERO);
    }

    fn begin_hide(&mut self, effect_speed: Duration) {
        if !self.backdrop.is_showing() {
            return;
        }
        if let Some(active) = &self.active
            && active.modal
        {
            self.bindings.remove(Binding::CLICK | Binding::KEY);
        }
        self.bindings.remove(Binding::RESIZE);
        self.panel_fade.hide(effect_speed);
        self.backdrop.hide(effect_speed);
    }

    /// Deliver an input event.
    ///
    /// Dismissal interactions (backdrop click, Escape, `hide_selector`
    /// clicks) run the full hide sequence with the show's effect speed.
    pub fn handle_event(
        &mut self,
        doc: &mut Document,
        viewport: &Viewport,
        probe: &dyn ViewportProbe,
        event: &Event,
    ) {
        if !self.bindings.contains(event.binding()) {
            return;
        }
        match *event {
            Event::Clicked { target, .. } => {
                if self.click_dismisses(doc, target) {
                    self.dismiss(doc, viewport, probe);
                }
            }
            Event::Key(key) if key.code == KeyCode::Escape => {
                if self.active.as_ref().is_some_and(|a| a.modal) {
                    self.dismiss(doc, viewport, probe);
                }
            }
            Event::Resized { source, .. } => {
                if wants_resize(source, self.throttled_resize) {
                    self.recenter(doc, viewport, probe);
                }
            }
            Event::GestureEnd => self.recenter(doc, viewport, probe),
            _ => {}
        }
    }

    fn click_dismisses(&self, doc: &Document, target: NodeId) -> bool {
        let Some(active) = &self.active else {
            return false;
        };
        if !active.modal {
            return false;
        }
        // Designated close controls dismiss from anywhere in the panel.
        if doc.matches(target, &active.hide_selector) && doc.is_within(target, active.panel) {
            return true;
        }
        // Clicks inside the panel must not reach the backdrop handler.
        if doc.is_within(target, active.panel) {
            return false;
        }
        self.overlay
            .is_some_and(|overlay| doc.is_within(target, overlay))
    }

    fn dismiss(&mut self, doc: &mut Document, viewport: &Viewport, probe: &dyn ViewportProbe) {
        #[cfg(feature = "tracing")]
        tracing::debug!("overlay dismissed");
        let effect_speed = self
            .active
            .as_ref()
            .map(|a| a.effect_speed)
            .unwrap_or_default();
        self.begin_hide(effect_speed);
        self.tick(doc, viewport, probe, Duration::ZERO);
    }

    /// Advance the fades, chain the backdrop-then-panel sequence, and fire
    /// due lifecycle callbacks.
    pub fn tick(
        &mut self,
        doc: &mut Document,
        viewport: &Viewport,
        probe: &dyn ViewportProbe,
        delta: Duration,
    ) {
        let mut delta = delta;
        loop {
            let backdrop = self.backdrop.tick(delta);
            let panel = self.panel_fade.tick(delta);
            delta = Duration::ZERO;
            self.sync_styles(doc);

            let mut advanced = false;
            match backdrop {
                Some(FadeCompletion::Shown) => {
                    self.reveal_panel(doc, viewport, probe);
                    advanced = true;
                }
                Some(FadeCompletion::Hidden) => {
                    self.finish_hide(doc);
                    advanced = true;
                }
                None => {}
            }
            match panel {
                Some(FadeCompletion::Shown) => {
                    if let Some(active) = self.active.as_mut() {
                        let panel = active.panel;
                        fire(&mut active.on_show, Some(panel));
                    }
                    advanced = true;
                }
                Some(FadeCompletion::Hidden) => {
                    // Panel gone; cleanup waits for the backdrop fade.
                    if let Some(active) = &self.active {
                        doc.style_mut(active.panel).display = Some(Display::None);
                    }
                    advanced = true;
                }
                None => {}
            }
            if !advanced {
                break;
            }
        }
    }

    /// Backdrop fully faded in: adopt, center, and reveal the panel.
    fn reveal_panel(&mut self, doc: &mut Document, viewport: &Viewport, probe: &dyn ViewportProbe) {
        let Some(overlay) = self.overlay else { return };
        let Some(active) = self.active.as_mut() else {
            return;
        };
        doc.append_child(overlay, active.panel);
        active.panel_attached = true;
        let panel = active.panel;
        let speed = active.effect_speed;
        place_centered(doc, viewport, probe, panel);
        doc.style_mut(panel).display = Some(Display::Block);
        self.panel_fade.show(speed);
    }

    /// Backdrop fully faded out: mirrored cleanup, then the captured
    /// `on_hide` with panics isolated.
    fn finish_hide(&mut self, doc: &mut Document) {
        self.panel_fade.reset();
        self.bindings = Binding::empty();
        let Some(mut active) = self.active.take() else {
            return;
        };

        doc.style_mut(active.panel).display = Some(Display::None);
        if !active.restored {
            match active.panel_home {
                Some(home) => doc.append_child(home, active.panel),
                None => doc.detach(active.panel),
            }
            active.restored = true;
        }

        let root = doc.root();
        doc.style_mut(root).margin_right = None;
        let body = doc.body();
        doc.remove_class(body, SCROLL_SUPPRESS_CLASS);

        for (node, prior) in active.frozen.drain(..) {
            doc.style_mut(node).width = prior;
        }

        if let Some(overlay) = self.overlay {
            doc.style_mut(overlay).display = Some(Display::None);
        }

        let panel = active.panel;
        fire_isolated(&mut active.on_hide, Some(panel));
    }

    fn recenter(&self, doc: &mut Document, viewport: &Viewport, probe: &dyn ViewportProbe) {
        if let Some(active) = &self.active
            && active.panel_attached
        {
            place_centered(doc, viewport, probe, active.panel);
        }
    }

    fn sync_styles(&self, doc: &mut Document) {
        if let Some(overlay) = self.overlay {
            doc.style_mut(overlay).opacity = Some(self.backdrop.opacity() * BACKDROP_OPACITY);
        }
        if let Some(active) = &self.active
            && active.panel_attached
        {
            doc.style_mut(active.panel).opacity = Some(self.panel_fade.opacity());
        }
    }

    fn ensure_overlay(&mut self, doc: &mut Document) -> NodeId {
        if let Some(overlay) = self.overlay {
            return overlay;
        }
        let overlay = doc.create_element("div");
        doc.set_id(overlay, OVERLAY_ID);
        let body = doc.body();
        doc.append_child(body, overlay);
        self.overlay = Some(overlay);
        overlay
    }

    fn ensure_default_panel(&mut self, doc: &mut Document) -> NodeId {
        if let Some(panel) = self.default_panel {
            return panel;
        }
        let panel = doc.create_element("div");
        doc.set_id(panel, PANEL_ID);
        let text = doc.create_element("div");
        doc.add_class(text, PANEL_TEXT_CLASS);
        doc.append_child(panel, text);
        self.default_panel = Some(panel);
        panel
    }
}

/// Center `node` in the viewport, scroll-relative (the panel is positioned
/// against the page, not the viewport).
fn place_centered(
    doc: &mut Document,
    viewport: &Viewport,
    probe: &dyn ViewportProbe,
    node: NodeId,
) {
    let at = viewport.center_node(probe, doc.outer_size(node), true);
    let style = doc.style_mut(node);
    style.left = Some(at.x);
    style.top = Some(at.y);
}

/// Freeze the current outer width of each target as an inline width,
/// recording the prior inline value for restoration.
fn freeze_widths(doc: &mut Document, fixed: &FixedElements) -> Vec<(NodeId, Option<i32>)> {
    let targets = match fixed {
        FixedElements::None => Vec::new(),
        FixedElements::Selector(selector) => doc.select(&Selector::parse(selector)),
        FixedElements::Nodes(nodes) => nodes.clone(),
    };
    targets
        .into_iter()
        .map(|node| {
            let prior = doc.style(node).width;
            let width = doc.outer_size(node).width;
            doc.style_mut(node).width = Some(width);
            (node, prior)
        })
        .collect()
}
