//! IEEE 754-2008 binary16 conversion.
//!
//! A half-precision value is stored as 1 sign bit, 5 exponent bits (bias 15) and 10
//! mantissa bits. It is exposed as an `f32` at the API boundary; every binary16 value is
//! exactly representable as an `f32`, so decoding is lossless and only encoding rounds.
//!
//! Encoding rounds to nearest with ties to even, saturates to infinity when the magnitude
//! is beyond the largest finite half (65504) after rounding, produces subnormals below
//! 2^-14 and keeps NaN a quiet NaN.
//!
//! # Examples
//!
//! ```rust
//! use binbuf::codec::half::{f16_bits_to_f32, f32_to_f16_bits};
//!
//! assert_eq!(f32_to_f16_bits(1.0), 0x3C00);
//! assert_eq!(f16_bits_to_f32(0x7BFF), 65504.0);
//! assert_eq!(f32_to_f16_bits(1.0e6), 0x7C00);
//! ```

const SIGN_MASK: u16 = 0x8000;
const EXPONENT_MASK: u16 = 0x7C00;
const MANTISSA_MASK: u16 = 0x03FF;
const QUIET_BIT: u16 = 0x0200;

/// Difference between the f32 exponent bias (127) and the binary16 bias (15).
const BIAS_DELTA: u32 = 112;

/// Decodes binary16 bits into the `f32` with the same value.
#[must_use]
pub fn f16_bits_to_f32(bits: u16) -> f32 {
    let sign = u32::from(bits & SIGN_MASK) << 16;
    let exponent = u32::from((bits & EXPONENT_MASK) >> 10);
    let mantissa = u32::from(bits & MANTISSA_MASK);

    match exponent {
        0 => {
            // Subnormal: m / 1024 * 2^-14
            let magnitude = mantissa as f32 / 16_777_216.0;
            if sign != 0 {
                -magnitude
            } else {
                magnitude
            }
        }
        0x1F => f32::from_bits(sign | 0x7F80_0000 | (mantissa << 13)),
        _ => f32::from_bits(sign | ((exponent + BIAS_DELTA) << 23) | (mantissa << 13)),
    }
}

/// Encodes an `f32` as binary16 bits, rounding to nearest even.
#[must_use]
pub fn f32_to_f16_bits(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) as u16) & SIGN_MASK;
    let exponent = ((bits >> 23) & 0xFF) as i32;
    let mantissa = bits & 0x007F_FFFF;

    if exponent == 0xFF {
        if mantissa == 0 {
            return sign | EXPONENT_MASK;
        }
        return sign | EXPONENT_MASK | QUIET_BIT | (mantissa >> 13) as u16;
    }

    let unbiased = exponent - 127;
    if unbiased > 15 {
        return sign | EXPONENT_MASK;
    }

    if unbiased >= -14 {
        let mut half = (((unbiased + 15) as u32) << 10) | (mantissa >> 13);
        let rest = mantissa & 0x1FFF;
        if rest > 0x1000 || (rest == 0x1000 && half & 1 == 1) {
            // A carry out of the mantissa bumps the exponent, up to infinity.
            half += 1;
        }
        return sign | half as u16;
    }

    if unbiased < -25 {
        return sign;
    }

    // Subnormal result: the significand including its implicit bit, scaled to 2^-24 units.
    let significand = mantissa | 0x0080_0000;
    let shift = (-(unbiased + 1)) as u32;
    let mut half = significand >> shift;
    let rest = significand & ((1 << shift) - 1);
    let halfway = 1 << (shift - 1);
    if rest > halfway || (rest == halfway && half & 1 == 1) {
        half += 1;
    }
    sign | half as u16
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn decode_special_values() {
        assert_eq!(f16_bits_to_f32(0x0000), 0.0);
        assert!(f16_bits_to_f32(0x8000).is_sign_negative());
        assert_eq!(f16_bits_to_f32(0x3C00), 1.0);
        assert_eq!(f16_bits_to_f32(0xC000), -2.0);
        assert_eq!(f16_bits_to_f32(0x7BFF), 65504.0);
        assert_eq!(f16_bits_to_f32(0x0001), 2f32.powi(-24));
        assert_eq!(f16_bits_to_f32(0x0400), 2f32.powi(-14));
        assert_eq!(f16_bits_to_f32(0x7C00), f32::INFINITY);
        assert_eq!(f16_bits_to_f32(0xFC00), f32::NEG_INFINITY);
        assert!(f16_bits_to_f32(0x7E00).is_nan());
    }

    #[test]
    fn encode_special_values() {
        assert_eq!(f32_to_f16_bits(0.0), 0x0000);
        assert_eq!(f32_to_f16_bits(-0.0), 0x8000);
        assert_eq!(f32_to_f16_bits(1.0), 0x3C00);
        assert_eq!(f32_to_f16_bits(-2.0), 0xC000);
        assert_eq!(f32_to_f16_bits(65504.0), 0x7BFF);
        assert_eq!(f32_to_f16_bits(2f32.powi(-24)), 0x0001);
        assert_eq!(f32_to_f16_bits(f32::INFINITY), 0x7C00);
        assert_eq!(f32_to_f16_bits(f32::NEG_INFINITY), 0xFC00);

        let nan = f32_to_f16_bits(f32::NAN);
        assert_eq!(nan & EXPONENT_MASK, EXPONENT_MASK);
        assert_ne!(nan & QUIET_BIT, 0);
    }

    #[test]
    fn encode_saturates_to_infinity() {
        assert_eq!(f32_to_f16_bits(65520.0), 0x7C00);
        assert_eq!(f32_to_f16_bits(1.0e9), 0x7C00);
        assert_eq!(f32_to_f16_bits(-1.0e9), 0xFC00);
        assert_eq!(f32_to_f16_bits(f32::MAX), 0x7C00);
    }

    #[test]
    fn encode_rounds_to_nearest_even() {
        let ulp = 2f32.powi(-10);
        assert_eq!(f32_to_f16_bits(1.0 + ulp / 2.0), 0x3C00);
        assert_eq!(f32_to_f16_bits(1.0 + ulp * 1.5), 0x3C02);
        assert_eq!(f32_to_f16_bits(1.0 + ulp * 0.75), 0x3C01);

        // Ties at the subnormal boundary.
        assert_eq!(f32_to_f16_bits(2f32.powi(-25)), 0x0000);
        assert_eq!(f32_to_f16_bits(3.0 * 2f32.powi(-25)), 0x0002);
        assert_eq!(f32_to_f16_bits(2f32.powi(-26)), 0x0000);
        assert_eq!(f32_to_f16_bits(f32::MIN_POSITIVE), 0x0000);
    }

    #[test]
    fn every_half_survives_a_round_trip() {
        for bits in 0..=u16::MAX {
            let value = f16_bits_to_f32(bits);
            if value.is_nan() {
                assert!(f16_bits_to_f32(f32_to_f16_bits(value)).is_nan());
            } else {
                assert_eq!(f32_to_f16_bits(value), bits, "bits {:#06x}", bits);
            }
        }
    }

    proptest! {
        #[test]
        fn normal_range_error_is_bounded(value in 6.104e-5f32..65504.0f32, negative in any::<bool>()) {
            let value = if negative { -value } else { value };
            let decoded = f16_bits_to_f32(f32_to_f16_bits(value));
            let relative = ((decoded - value) / value).abs();
            prop_assert!(relative <= 2f32.powi(-11), "{} -> {}", value, decoded);
        }
    }
}
