//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Clamp a value into the inclusive range `[min, max]`.
///
/// NaN values are passed through unchanged.
pub fn clamp<T>(value: T, min: T, max: T) -> T 
where
    T: Float
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Apply a symmetric dead band to a value, anything with a magnitude below
/// `band` becomes zero.
pub fn dead_band<T>(value: T, band: T) -> T
where
    T: Float
{
    if value.abs() < band {
        T::zero()
    }
    else {
        value
    }
}

/// Convert an angle in degrees to radians.
pub fn deg_to_rad<T>(deg: T) -> T
where
    T: Float
{
    deg.to_radians()
}

/// Convert an angle in radians to degrees.
pub fn rad_to_deg<T>(rad: T) -> T
where
    T: Float
{
    rad.to_degrees()
}
