#![forbid(unsafe_code)]

//! Viewport geometry: window dimensions net of scrollbar width, scrollbar
//! measurement, and node centering.
//!
//! The environment is reached through the [`ViewportProbe`] seam so the
//! geometry itself stays deterministic and testable. [`Viewport`] caches the
//! measured scrollbar width; the cache is what keeps
//! [`Viewport::window_dimensions`] stable while the native scrollbar is
//! suppressed.

use crate::geometry::{Point, Size, div_ceil_2};

/// Environment seam for viewport measurements.
///
/// Implementations report the layout viewport and scroll state, and perform
/// the one genuinely environment-bound measurement: probing the native
/// scrollbar's thickness with a temporary off-screen scrollable element.
pub trait ViewportProbe {
    /// Layout viewport size, including any native scrollbar.
    fn inner_size(&self) -> Size;

    /// Viewport size excluding native scrollbars (the root element's
    /// client box).
    fn client_size(&self) -> Size;

    /// Current scroll offset of the page.
    fn scroll_offset(&self) -> Point;

    /// Measure the native scrollbar thickness in pixels, typically by
    /// probing a temporary off-screen scrollable element.
    fn scrollbar_thickness(&self) -> i32;
}

/// A probe with fixed answers.
///
/// Useful for embedders with a static viewport and as the standard probe in
/// tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedViewport {
    pub inner: Size,
    pub client: Size,
    pub scroll: Point,
    pub scrollbar: i32,
}

impl FixedViewport {
    /// A viewport with no native scrollbar and no scroll offset.
    pub const fn bare(width: i32, height: i32) -> Self {
        Self {
            inner: Size::new(width, height),
            client: Size::new(width, height),
            scroll: Point::new(0, 0),
            scrollbar: 0,
        }
    }

    /// A viewport whose native scrollbar of `thickness` px consumes part of
    /// the layout width.
    pub const fn with_scrollbar(width: i32, height: i32, thickness: i32) -> Self {
        Self {
            inner: Size::new(width, height),
            client: Size::new(width - thickness, height),
            scroll: Point::new(0, 0),
            scrollbar: thickness,
        }
    }
}

impl ViewportProbe for FixedViewport {
    fn inner_size(&self) -> Size {
        self.inner
    }

    fn client_size(&self) -> Size {
        self.client
    }

    fn scroll_offset(&self) -> Point {
        self.scroll
    }

    fn scrollbar_thickness(&self) -> i32 {
        self.scrollbar
    }
}

/// Shared viewport geometry with a cached scrollbar-width measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct Viewport {
    scrollbar_width: Option<i32>,
}

impl Viewport {
    /// Create a viewport with no measurement cached yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached scrollbar width, if measured.
    #[inline]
    pub fn scrollbar_width(&self) -> Option<i32> {
        self.scrollbar_width
    }

    /// Drop the cached measurement (e.g. after a zoom or DPI change).
    pub fn invalidate(&mut self) {
        self.scrollbar_width = None;
    }

    /// Layout viewport size with the cached scrollbar correction applied to
    /// the width. Before any measurement the correction is zero.
    pub fn window_dimensions(&self, probe: &dyn ViewportProbe) -> Size {
        let inner = probe.inner_size();
        Size::new(
            inner.width - self.scrollbar_width.unwrap_or(0),
            inner.height,
        )
    }

    /// Measure and cache the scrollbar width.
    ///
    /// If suppressing the native scrollbar changes the reported width (the
    /// layout viewport is wider than the root client box), the off-screen
    /// probe supplies the pixel thickness. If no delta is observed the
    /// scrollbar takes no layout space (overlay scrollbars, touch devices)
    /// and the width is `0`. The result is cached until
    /// [`Viewport::invalidate`].
    pub fn measure_scrollbar_width(&mut self, probe: &dyn ViewportProbe) -> i32 {
        if let Some(width) = self.scrollbar_width {
            return width;
        }
        let width = if probe.inner_size().width != probe.client_size().width {
            probe.scrollbar_thickness()
        } else {
            0
        };
        self.scrollbar_width = Some(width);
        width
    }

    /// Offsets that center a node of `outer` size (content plus margins)
    /// in the viewport.
    ///
    /// With `scroll_relative` the center is shifted by the current scroll
    /// offset (absolute positioning against the page rather than the
    /// viewport). Each axis clamps to `0` instead of going negative when
    /// the node is larger than the viewport.
    pub fn center_node(
        &self,
        probe: &dyn ViewportProbe,
        outer: Size,
        scroll_relative: bool,
    ) -> Point {
        let window = self.window_dimensions(probe);
        let mut center = window.center();
        if scroll_relative {
            let scroll = probe.scroll_offset();
            center = center.offset(scroll.x, scroll.y);
        }
        Point::new(
            (center.x - div_ceil_2(outer.width)).max(0),
            (center.y - div_ceil_2(outer.height)).max(0),
        )
    }
}
