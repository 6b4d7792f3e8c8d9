//! # Spline module
//!
//! Provides the smooth-curve capability used by the trajectory generator: fit
//! a curve through an ordered set of 2D anchor points and evaluate it at
//! arbitrary positions along the first axis.
//!
//! The fit is a natural cubic spline, solved with the standard tridiagonal
//! elimination. The curve interpolates every anchor exactly and is C2
//! continuous between them. Evaluation outside the anchor range extends the
//! polynomial of the nearest end segment.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A fitted natural cubic spline `y = f(x)`.
///
/// Segment `i` covers `[x[i], x[i+1])` and evaluates as
/// `a[i] + b[i]*dx + c[i]*dx^2 + d[i]*dx^3` with `dx = x - x[i]`.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors produced when fitting a spline.
#[derive(Debug, thiserror::Error)]
pub enum SplineError {
    /// At least two anchor points are required to define a curve.
    #[error("Expected at least 2 anchor points, found {0}")]
    TooFewPoints(usize),

    /// Anchor x positions must be strictly increasing for the curve to be a
    /// single-valued function of x.
    #[error("Anchor x positions are not strictly increasing at index {0}")]
    NonMonotonicX(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CubicSpline {
    /// Fit a natural cubic spline through the given anchor points.
    ///
    /// The anchors must have strictly increasing x positions.
    pub fn fit(points: &[Vector2<f64>]) -> Result<Self, SplineError> {
        let n = points.len();

        if n < 2 {
            return Err(SplineError::TooFewPoints(n));
        }

        for i in 1..n {
            if points[i][0] <= points[i - 1][0] {
                return Err(SplineError::NonMonotonicX(i));
            }
        }

        let x: Vec<f64> = points.iter().map(|p| p[0]).collect();
        let a: Vec<f64> = points.iter().map(|p| p[1]).collect();

        // Knot spacings
        let h: Vec<f64> = (0..n - 1).map(|i| x[i + 1] - x[i]).collect();

        // Build and eliminate the tridiagonal system for the second
        // derivative coefficients, natural boundary conditions (zero
        // curvature at both ends).
        let mut alpha = vec![0.0; n];
        for i in 1..n - 1 {
            alpha[i] = 3.0 / h[i] * (a[i + 1] - a[i]) - 3.0 / h[i - 1] * (a[i] - a[i - 1]);
        }

        let mut l = vec![1.0; n];
        let mut mu = vec![0.0; n];
        let mut z = vec![0.0; n];

        for i in 1..n - 1 {
            l[i] = 2.0 * (x[i + 1] - x[i - 1]) - h[i - 1] * mu[i - 1];
            mu[i] = h[i] / l[i];
            z[i] = (alpha[i] - h[i - 1] * z[i - 1]) / l[i];
        }

        // Back substitution
        let mut b = vec![0.0; n];
        let mut c = vec![0.0; n];
        let mut d = vec![0.0; n];

        for j in (0..n - 1).rev() {
            c[j] = z[j] - mu[j] * c[j + 1];
            b[j] = (a[j + 1] - a[j]) / h[j] - h[j] * (c[j + 1] + 2.0 * c[j]) / 3.0;
            d[j] = (c[j + 1] - c[j]) / (3.0 * h[j]);
        }

        Ok(CubicSpline { x, a, b, c, d })
    }

    /// Evaluate the spline at the given x position.
    pub fn y_at(&self, x: f64) -> f64 {
        let i = self.segment_index(x);
        let dx = x - self.x[i];

        self.a[i] + self.b[i] * dx + self.c[i] * dx.powi(2) + self.d[i] * dx.powi(3)
    }

    /// Find the segment containing the given x position.
    ///
    /// Positions outside the knot range map to the nearest end segment.
    fn segment_index(&self, x: f64) -> usize {
        let n_seg = self.x.len() - 1;

        // Number of knots strictly below x, minus one for the segment start
        let above = self.x.partition_point(|&k| k <= x);

        above.saturating_sub(1).min(n_seg - 1)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_interpolates_anchors() {
        let anchors = vec![
            Vector2::new(-1.0, 0.5),
            Vector2::new(0.0, 0.0),
            Vector2::new(30.0, 2.0),
            Vector2::new(60.0, 6.5),
            Vector2::new(90.0, 12.0),
        ];

        let spline = CubicSpline::fit(&anchors).unwrap();

        for anchor in &anchors {
            assert!((spline.y_at(anchor[0]) - anchor[1]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_two_points_is_linear() {
        let spline =
            CubicSpline::fit(&[Vector2::new(0.0, 1.0), Vector2::new(10.0, 3.0)]).unwrap();

        assert!((spline.y_at(5.0) - 2.0).abs() < 1e-12);

        // End-segment extension continues the same line
        assert!((spline.y_at(15.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_anchors() {
        assert!(matches!(
            CubicSpline::fit(&[Vector2::new(0.0, 0.0)]),
            Err(SplineError::TooFewPoints(1))
        ));

        let duplicated = [
            Vector2::new(0.0, 0.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(5.0, 2.0),
        ];
        assert!(matches!(
            CubicSpline::fit(&duplicated),
            Err(SplineError::NonMonotonicX(1))
        ));
    }
}
