//! dB helpers for the gain and dynamics stages.

use libm::{expf, logf};

/// Level reported for silence, in dB.
pub const SILENCE_DB: f32 = -200.0;

/// Smallest linear level that maps above [`SILENCE_DB`].
const MIN_LINEAR: f32 = 1e-10;

/// Magnitude below which a sample is treated as zero.
const DENORMAL_LIMIT: f32 = 1e-20;

const LN_10_OVER_20: f32 = core::f32::consts::LN_10 / 20.0;

/// `10^(db / 20)`.
///
/// ```rust
/// use squash_core::db_to_linear;
///
/// assert!((db_to_linear(-6.0206) - 0.5).abs() < 1e-4);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    expf(db * LN_10_OVER_20)
}

/// `20 * log10(linear)`, never below [`SILENCE_DB`].
///
/// ```rust
/// use squash_core::linear_to_db;
///
/// assert!((linear_to_db(2.0) - 6.0206).abs() < 1e-3);
/// assert_eq!(linear_to_db(0.0), squash_core::math::SILENCE_DB);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= MIN_LINEAR {
        SILENCE_DB
    } else {
        logf(linear) / LN_10_OVER_20
    }
}

/// Zero for denormal-range input, `x` otherwise.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < DENORMAL_LIMIT { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_invert() {
        for db in [-96.0, -40.0, -12.0, -1.0, 0.0, 3.0] {
            let back = linear_to_db(db_to_linear(db));
            assert!((back - db).abs() < 0.01, "{db} dB came back as {back}");
        }
    }

    #[test]
    fn negative_and_zero_levels_floor() {
        assert_eq!(linear_to_db(0.0), SILENCE_DB);
        assert_eq!(linear_to_db(-1.0), SILENCE_DB);
    }

    #[test]
    fn tiny_values_flush() {
        assert_eq!(flush_denormal(-1e-25), 0.0);
        assert_eq!(flush_denormal(1e-3), 1e-3);
    }
}
