#![forbid(unsafe_code)]

//! Tick-driven fade transitions.
//!
//! A [`Fade`] is the visibility state machine behind every widget:
//! `Hidden → Showing → Visible → Hiding → Hidden`. Callers request a target
//! with [`Fade::show`] / [`Fade::hide`] and pump [`Fade::tick`] with elapsed
//! time; completions come back as explicit [`FadeCompletion`] values rather
//! than nested callbacks.
//!
//! Interrupting an in-flight transition reverses it, preserving progress
//! (30% through hiding becomes 70% through showing). The interrupted
//! direction's completion is cancelled structurally: `tick` can only ever
//! report the completion of the direction currently in flight, so a stale
//! "shown" can never fire after an interrupting hide.
//!
//! # Invariants
//!
//! - Progress is always in `[0.0, 1.0]`.
//! - A zero-duration transition completes on the next `tick`, even with a
//!   zero delta, so an instant change still produces its completion.

use std::time::Duration;

use web_time::Instant;

/// Phase of a fade lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadePhase {
    /// Fully hidden.
    #[default]
    Hidden,
    /// Animating towards visible.
    Showing,
    /// Fully visible.
    Visible,
    /// Animating towards hidden.
    Hiding,
}

impl FadePhase {
    /// True for every phase except `Hidden`.
    #[inline]
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::Hidden)
    }

    /// True while a transition is in flight.
    #[inline]
    pub fn is_animating(self) -> bool {
        matches!(self, Self::Showing | Self::Hiding)
    }
}

/// Completion signal returned by [`Fade::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeCompletion {
    /// The fade reached `Visible`.
    Shown,
    /// The fade reached `Hidden`.
    Hidden,
}

/// A fade transition with reversible direction.
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    phase: FadePhase,
    /// Progress of the in-flight transition in `[0.0, 1.0]`.
    progress: f64,
    duration: Duration,
}

impl Default for Fade {
    fn default() -> Self {
        Self::new()
    }
}

impl Fade {
    /// A hidden fade.
    pub fn new() -> Self {
        Self {
            phase: FadePhase::Hidden,
            progress: 0.0,
            duration: Duration::ZERO,
        }
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> FadePhase {
        self.phase
    }

    /// Progress of the in-flight transition.
    #[inline]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// True for every phase except `Hidden`.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.phase.is_visible()
    }

    /// True while at or animating towards `Visible`.
    #[inline]
    pub fn is_showing(&self) -> bool {
        matches!(self.phase, FadePhase::Showing | FadePhase::Visible)
    }

    /// Begin (or redirect to) a show transition of the given duration.
    ///
    /// No-op when already visible or showing. Returns whether a transition
    /// was started or redirected.
    pub fn show(&mut self, duration: Duration) -> bool {
        match self.phase {
            FadePhase::Hidden => {
                self.phase = FadePhase::Showing;
                self.progress = 0.0;
                self.duration = duration;
                true
            }
            FadePhase::Hiding => {
                // Reverse in place, preserving momentum.
                self.phase = FadePhase::Showing;
                self.progress = 1.0 - self.progress;
                self.duration = duration;
                true
            }
            FadePhase::Showing | FadePhase::Visible => false,
        }
    }

    /// Begin (or redirect to) a hide transition of the given duration.
    ///
    /// No-op when already hidden or hiding. Returns whether a transition
    /// was started or redirected.
    pub fn hide(&mut self, duration: Duration) -> bool {
        match self.phase {
            FadePhase::Visible => {
                self.phase = FadePhase::Hiding;
                self.progress = 0.0;
                self.duration = duration;
                true
            }
            FadePhase::Showing => {
                self.phase = FadePhase::Hiding;
                self.progress = 1.0 - self.progress;
                self.duration = duration;
                true
            }
            FadePhase::Hiding | FadePhase::Hidden => false,
        }
    }

    /// Snap to `Hidden` without producing a completion.
    pub fn reset(&mut self) {
        self.phase = FadePhase::Hidden;
        self.progress = 0.0;
        self.duration = Duration::ZERO;
    }

    /// Advance the in-flight transition and report its completion.
    ///
    /// Returns `None` while idle or mid-transition.
    pub fn tick(&mut self, delta: Duration) -> Option<FadeCompletion> {
        if !self.phase.is_animating() {
            return None;
        }
        if self.duration.is_zero() {
            self.progress = 1.0;
        } else {
            self.progress += delta.as_secs_f64().max(0.0) / self.duration.as_secs_f64();
        }
        if self.progress < 1.0 {
            return None;
        }
        self.progress = 1.0;
        match self.phase {
            FadePhase::Showing => {
                self.phase = FadePhase::Visible;
                self.progress = 1.0;
                Some(FadeCompletion::Shown)
            }
            FadePhase::Hiding => {
                self.phase = FadePhase::Hidden;
                self.progress = 0.0;
                Some(FadeCompletion::Hidden)
            }
            FadePhase::Visible | FadePhase::Hidden => None,
        }
    }

    /// Current opacity in `[0.0, 1.0]` for renderers.
    pub fn opacity(&self) -> f64 {
        match self.phase {
            FadePhase::Hidden => 0.0,
            FadePhase::Visible => 1.0,
            FadePhase::Showing => self.progress,
            FadePhase::Hiding => 1.0 - self.progress,
        }
    }
}

/// Wall-clock delta source for pumping fades.
///
/// Backed by [`web_time::Instant`] so the same driving code works on native
/// and wasm targets.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    last: Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// Start the clock now.
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Time elapsed since the previous call (or construction).
    pub fn delta(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now.duration_since(self.last);
        self.last = now;
        delta
    }
}
