//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// Used for quantities that live on a closed loop, such as along-track
/// positions on a circular track. The return value `r` satisfies
/// `0 <= r < rhs.abs()` up to floating point round-off.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Get the forward (increasing) distance from `from` to `to` on a closed loop
/// of the given length.
///
/// Both positions are first wrapped into `[0, loop_length)`.
pub fn loop_distance<T>(from: T, to: T, loop_length: T) -> T
where
    T: Float,
{
    rem_euclid(rem_euclid(to, loop_length) - rem_euclid(from, loop_length), loop_length)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rem_euclid() {
        assert_eq!(rem_euclid(5.0, 3.0), 2.0);
        assert_eq!(rem_euclid(-1.0, 3.0), 2.0);
        assert_eq!(rem_euclid(3.0, 3.0), 0.0);
        assert_eq!(rem_euclid(0.0, 3.0), 0.0);
    }

    #[test]
    fn test_loop_distance() {
        // Simple forward distance
        assert_eq!(loop_distance(10.0, 30.0, 100.0), 20.0);

        // Distance across the loop seam
        assert_eq!(loop_distance(90.0, 10.0, 100.0), 20.0);

        // Backwards targets wrap the long way round
        assert_eq!(loop_distance(30.0, 10.0, 100.0), 80.0);

        // Unwrapped inputs are wrapped first
        assert_eq!(loop_distance(110.0, 130.0, 100.0), 20.0);
    }
}
