//! # Monotone Cubic Spline
//!
//! Piecewise cubic Hermite interpolation with Fritsch-Carlson slopes
//! (PCHIP). Between control points the curve never leaves the range of its
//! two endpoints, and it is monotone wherever the data is. Terrain uses it to
//! remap normalised noise into block heights without overshooting into
//! negative or above-ceiling values.

use crate::error::{ProceduralError, ProceduralResult};

/// A monotone piecewise cubic through a set of control points.
#[derive(Clone, Debug, PartialEq)]
pub struct MonotoneSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    slopes: Vec<f64>,
}

impl MonotoneSpline {
    /// Builds a spline through `points`, given as `(x, y)` pairs.
    ///
    /// # Errors
    ///
    /// Fails if there are fewer than two points, the x values are not
    /// strictly increasing, or any value is not finite.
    pub fn new(points: &[(f64, f64)]) -> ProceduralResult<Self> {
        if points.len() < 2 {
            return Err(ProceduralError::InvalidSpline("need at least two control points"));
        }
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(ProceduralError::InvalidSpline("control points must be finite"));
        }
        if points.windows(2).any(|pair| pair[0].0 >= pair[1].0) {
            return Err(ProceduralError::InvalidSpline("x values must be strictly increasing"));
        }

        let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
        let slopes = pchip_slopes(&xs, &ys);
        Ok(Self { xs, ys, slopes })
    }

    /// The `[min, max]` x range covered by the control points.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Evaluates the spline. Inputs outside the domain are clamped to it.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        let (lo, hi) = self.domain();
        let x = x.clamp(lo, hi);

        let last_segment = self.xs.len() - 2;
        let k = self
            .xs
            .partition_point(|&knot| knot <= x)
            .saturating_sub(1)
            .min(last_segment);

        let h = self.xs[k + 1] - self.xs[k];
        let t = (x - self.xs[k]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * self.ys[k] + h10 * h * self.slopes[k] + h01 * self.ys[k + 1] + h11 * h * self.slopes[k + 1]
    }
}

/// Shape-preserving knot slopes.
fn pchip_slopes(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let delta: Vec<f64> = (0..n - 1).map(|k| (ys[k + 1] - ys[k]) / h[k]).collect();

    if n == 2 {
        return vec![delta[0]; 2];
    }

    let mut slopes = vec![0.0; n];
    for k in 1..n - 1 {
        // Local extrema and flats keep a zero slope
        if delta[k - 1] * delta[k] > 0.0 {
            let w1 = 2.0 * h[k] + h[k - 1];
            let w2 = h[k] + 2.0 * h[k - 1];
            slopes[k] = (w1 + w2) / (w1 / delta[k - 1] + w2 / delta[k]);
        }
    }
    slopes[0] = end_slope(h[0], h[1], delta[0], delta[1]);
    slopes[n - 1] = end_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
    slopes
}

/// One-sided three-point slope, limited so the end segment stays monotone.
fn end_slope(h0: f64, h1: f64, delta0: f64, delta1: f64) -> f64 {
    let slope = ((2.0 * h0 + h1) * delta0 - h0 * delta1) / (h0 + h1);
    if slope * delta0 <= 0.0 {
        0.0
    } else if delta0 * delta1 <= 0.0 && slope.abs() > (3.0 * delta0).abs() {
        3.0 * delta0
    } else {
        slope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TERRAIN: [(f64, f64); 6] = [
        (0.0, 5.0),
        (0.2, 5.0),
        (0.3, 15.0),
        (0.62, 30.0),
        (0.64, 50.0),
        (1.0, 60.0),
    ];

    #[test]
    fn test_passes_through_control_points() {
        let spline = MonotoneSpline::new(&TERRAIN).unwrap();
        for &(x, y) in &TERRAIN {
            assert!((spline.evaluate(x) - y).abs() < 1e-9, "f({x}) != {y}");
        }
    }

    #[test]
    fn test_monotone_non_decreasing() {
        let spline = MonotoneSpline::new(&TERRAIN).unwrap();
        let mut previous = spline.evaluate(0.0);
        for i in 1..=10_000 {
            let value = spline.evaluate(f64::from(i) / 10_000.0);
            assert!(value >= previous - 1e-9, "dropped at {i}: {previous} -> {value}");
            previous = value;
        }
    }

    #[test]
    fn test_no_overshoot_between_knots() {
        let spline = MonotoneSpline::new(&TERRAIN).unwrap();
        for pair in TERRAIN.windows(2) {
            let (lo, hi) = (pair[0].1.min(pair[1].1), pair[0].1.max(pair[1].1));
            for step in 0..=100 {
                let x = pair[0].0 + (pair[1].0 - pair[0].0) * f64::from(step) / 100.0;
                let y = spline.evaluate(x);
                assert!(y >= lo - 1e-9 && y <= hi + 1e-9, "f({x}) = {y} outside [{lo}, {hi}]");
            }
        }
    }

    #[test]
    fn test_flat_segment_stays_flat() {
        let spline = MonotoneSpline::new(&TERRAIN).unwrap();
        for step in 0..=20 {
            let x = 0.2 * f64::from(step) / 20.0;
            assert!((spline.evaluate(x) - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_clamps_outside_domain() {
        let spline = MonotoneSpline::new(&TERRAIN).unwrap();
        assert_eq!(spline.evaluate(-3.0), spline.evaluate(0.0));
        assert_eq!(spline.evaluate(7.0), spline.evaluate(1.0));
    }

    #[test]
    fn test_two_points_are_linear() {
        let spline = MonotoneSpline::new(&[(0.0, 0.0), (2.0, 4.0)]).unwrap();
        assert!((spline.evaluate(0.5) - 1.0).abs() < 1e-12);
        assert!((spline.evaluate(1.5) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_control_points() {
        assert!(MonotoneSpline::new(&[(0.0, 1.0)]).is_err());
        assert!(MonotoneSpline::new(&[(0.0, 1.0), (0.0, 2.0)]).is_err());
        assert!(MonotoneSpline::new(&[(1.0, 1.0), (0.0, 2.0)]).is_err());
        assert!(MonotoneSpline::new(&[(0.0, f64::NAN), (1.0, 2.0)]).is_err());
    }
}
