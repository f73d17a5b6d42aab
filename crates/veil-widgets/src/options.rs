#![forbid(unsafe_code)]

//! Show/hide configuration shared by both widgets.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use veil_core::dom::NodeId;

/// Lifecycle callback. The overlay passes its panel handle; the pointer
/// indicator passes `None`.
pub type Hook = Box<dyn FnMut(Option<NodeId>)>;

/// Elements whose width is frozen while the overlay suppresses scrolling,
/// so the vanishing scrollbar cannot reflow them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FixedElements {
    /// Freeze nothing.
    #[default]
    None,
    /// Freeze every element matching a selector.
    Selector(String),
    /// Freeze an explicit element list.
    Nodes(Vec<NodeId>),
}

/// Options for a show or hide request.
///
/// `on_hide` passed to a show call is captured for that show's matching
/// hide; an `on_hide` passed to the hide call itself is ignored.
pub struct ShowOptions {
    /// Selector for elements inside a hosted panel that dismiss it.
    pub hide_selector: String,
    /// Transition duration. Zero collapses a transition to an immediate
    /// state change that still fires its lifecycle callbacks.
    pub effect_speed: Duration,
    /// Elements to width-freeze during overlay display.
    pub fixed_elements: FixedElements,
    /// Invoked when a show request is accepted, before any transition.
    pub on_start: Option<Hook>,
    /// Invoked when the show transition completes.
    pub on_show: Option<Hook>,
    /// Invoked when the matching hide completes; panics are isolated so
    /// cleanup cannot be aborted.
    pub on_hide: Option<Hook>,
}

impl Default for ShowOptions {
    fn default() -> Self {
        Self {
            hide_selector: ".modal-close".to_string(),
            effect_speed: Duration::from_millis(200),
            fixed_elements: FixedElements::None,
            on_start: None,
            on_show: None,
            on_hide: None,
        }
    }
}

impl ShowOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dismissal selector.
    pub fn hide_selector(mut self, selector: impl Into<String>) -> Self {
        self.hide_selector = selector.into();
        self
    }

    /// Set the transition duration.
    pub fn effect_speed(mut self, speed: Duration) -> Self {
        self.effect_speed = speed;
        self
    }

    /// Set the width-freeze targets.
    pub fn fixed_elements(mut self, fixed: FixedElements) -> Self {
        self.fixed_elements = fixed;
        self
    }

    /// Set the show-accepted callback.
    pub fn on_start(mut self, hook: impl FnMut(Option<NodeId>) + 'static) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    /// Set the show-completed callback.
    pub fn on_show(mut self, hook: impl FnMut(Option<NodeId>) + 'static) -> Self {
        self.on_show = Some(Box::new(hook));
        self
    }

    /// Set the hide-completed callback.
    pub fn on_hide(mut self, hook: impl FnMut(Option<NodeId>) + 'static) -> Self {
        self.on_hide = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for ShowOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShowOptions")
            .field("hide_selector", &self.hide_selector)
            .field("effect_speed", &self.effect_speed)
            .field("fixed_elements", &self.fixed_elements)
            .field("on_start", &self.on_start.is_some())
            .field("on_show", &self.on_show.is_some())
            .field("on_hide", &self.on_hide.is_some())
            .finish()
    }
}

/// Invoke and consume a hook.
pub(crate) fn fire(hook: &mut Option<Hook>, panel: Option<NodeId>) {
    if let Some(mut f) = hook.take() {
        f(panel);
    }
}

/// Invoke and consume a hook, discarding a panic so the cleanup that runs
/// after it cannot be aborted. Hide-completion path only.
pub(crate) fn fire_isolated(hook: &mut Option<Hook>, panel: Option<NodeId>) {
    if let Some(mut f) = hook.take() {
        let outcome = catch_unwind(AssertUnwindSafe(move || f(panel)));
        #[cfg(feature = "tracing")]
        if outcome.is_err() {
            tracing::debug!("hide callback panicked; ignored");
        }
        #[cfg(not(feature = "tracing"))]
        drop(outcome);
    }
}
