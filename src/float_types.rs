//! Scalar type, tolerance and cut margins.

#[cfg(feature = "f64")]
pub use parry3d_f64 as parry3d;

#[cfg(feature = "f32")]
pub use parry3d;

#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Distance below which a point counts as lying on a plane, also used to snap
/// quarter-turn sines and cosines. Resolved once, from [`set_tolerance`] if it
/// ran first, else the build-time `BINGRID_TOLERANCE`, else a per-precision default.
static TOLERANCE: OnceLock<Real> = OnceLock::new();

#[inline]
const fn default_tolerance() -> Real {
    #[cfg(feature = "f32")]
    {
        1e-4
    }
    #[cfg(feature = "f64")]
    {
        1e-6
    }
}

/// Current geometric tolerance.
pub fn tolerance() -> Real {
    *TOLERANCE.get_or_init(|| {
        option_env!("BINGRID_TOLERANCE")
            .and_then(|raw| Real::from_str(raw.trim()).ok())
            .map_or_else(default_tolerance, |value| value.max(Real::EPSILON))
    })
}

/// Pin the tolerance. Only the first call before any geometry work has an effect.
pub fn set_tolerance(value: Real) {
    let _ = TOLERANCE.set(value.max(Real::EPSILON));
}

/// Margin (in model units, millimetres for bin files) by which every cutter
/// reaches past its nominal plane into the neighbouring region.
///
/// Adjacent pieces therefore share a thin slab of volume instead of a face,
/// so concatenation plus welding never leaves hairline gaps.
pub const OVERLAP: Real = 0.01;

/// Distance a cutter is pushed past the geometry on sides that coincide
/// with the outside of the model, keeping cutter faces off model faces.
pub const OUTER_PAD: Real = 1.0;

/// One quarter turn, in radians.
#[cfg(feature = "f32")]
pub const FRAC_PI_2: Real = core::f32::consts::FRAC_PI_2;
#[cfg(feature = "f64")]
pub const FRAC_PI_2: Real = core::f64::consts::FRAC_PI_2;
