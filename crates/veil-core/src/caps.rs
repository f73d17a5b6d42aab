#![forbid(unsafe_code)]

//! Animated-image capability probing.
//!
//! Whether the environment can render animated PNG decides which asset an
//! external stylesheet should pick for the busy indicator. Detection decodes
//! a 1x1 APNG whose final frame is fully transparent: an APNG-capable
//! decoder reports alpha `0` at the origin, a baseline PNG decoder sees the
//! opaque first frame.
//!
//! Detection fails open: if the environment offers no pixel inspection or
//! the decode fails, the capability is simply reported as unsupported and
//! the widgets behave as if the advanced format were absent.

/// Data URI of the 1x1 capability probe (final frame transparent).
pub const APNG_PROBE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAACGFjVEwAAAABAAAAAcMq2TYAAAANSURBVAiZY2BgYPgPAAEEAQB9ssjfAAAAGmZjVEwAAAAAAAAAAQAAAAEAAAAAAAAAAAD6A+gBAbNU+2sAAAARZmRBVAAAAAEImWNgYGBgAAAABQAB6MzFdgAAAABJRU5ErkJggg==";

/// Environment seam for decoding the probe image.
pub trait PixelProbe {
    /// Decode the image at `data_uri` and report the alpha channel of the
    /// pixel at the origin, or `None` when decoding is unavailable or
    /// fails.
    fn alpha_at_origin(&self, data_uri: &str) -> Option<u8>;
}

/// A probe for environments without pixel inspection. Always reports
/// decoding as unavailable, so capability detection fails open.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPixelProbe;

impl PixelProbe for NoPixelProbe {
    fn alpha_at_origin(&self, _data_uri: &str) -> Option<u8> {
        None
    }
}

/// Detect animated-PNG support via the 1x1 probe asset.
pub fn apng_supported(probe: &dyn PixelProbe) -> bool {
    matches!(probe.alpha_at_origin(APNG_PROBE), Some(0))
}
