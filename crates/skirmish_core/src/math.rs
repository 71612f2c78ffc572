//! Fixed-point numbers for deterministic reward accounting.
//!
//! Rewards carry fractional components (a tenth or half of the move
//! reward), so they use fixed-point rather than floating-point arithmetic
//! to stay bit-identical across platforms and replays.

use fixed::types::I32F32;

/// Fixed-point number type for all reward math.
///
/// Uses 32 bits for the integer part and 32 bits for the fractional part.
pub type Fixed = I32F32;

/// Reward scalar emitted by each engine step.
pub type Reward = Fixed;

/// Create a fixed-point value from a ratio of integers.
#[inline]
#[must_use]
pub fn ratio(numerator: i32, denominator: i32) -> Fixed {
    Fixed::from_num(numerator) / Fixed::from_num(denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_is_exact_for_halves() {
        assert_eq!(ratio(1, 2) * Fixed::from_num(2), Fixed::ONE);
        assert_eq!(ratio(-4, 2), Fixed::from_num(-2));
    }

    #[test]
    fn test_ratio_is_deterministic() {
        assert_eq!(ratio(1, 10), ratio(1, 10));
        assert_eq!(ratio(1, 10).to_bits(), ratio(2, 20).to_bits());
    }
}
