#![forbid(unsafe_code)]

//! Veil's two visual feedback widgets: a pointer-following busy indicator
//! and a full-page dimming overlay with an optional hosted modal panel.
//!
//! Both widgets share the same driving model: the embedder owns a
//! [`veil_core::dom::Document`], a [`veil_core::viewport::Viewport`], and a
//! [`veil_core::viewport::ViewportProbe`], delivers canonical
//! [`veil_core::event::Event`]s, and pumps `tick` with elapsed time (a
//! [`veil_core::fade::Clock`] works). Widgets mutate only inline styles,
//! classes, and their own nodes; everything they touch is restored on hide.

pub mod indicator;
pub mod options;
pub mod overlay;

pub use indicator::PointerIndicator;
pub use options::{FixedElements, ShowOptions};
pub use overlay::{OverlayController, OverlayOptions};
