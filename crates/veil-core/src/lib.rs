#![forbid(unsafe_code)]

//! Core building blocks for Veil: the retained document model, canonical
//! input events, viewport geometry with scrollbar compensation, capability
//! probing, and the tick-driven fade transition that every widget's
//! visibility state machine is built on.
//!
//! Widgets live in `veil-widgets`; this crate has no widget knowledge and
//! no environment bindings beyond the [`viewport::ViewportProbe`] and
//! [`caps::PixelProbe`] seams.

pub mod caps;
pub mod dom;
pub mod event;
pub mod fade;
pub mod geometry;
pub mod viewport;
