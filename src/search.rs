//! Bounded search primitives shared by the operating-point solvers.
//!
//! Both run a fixed number of steps so that the cost of a whole sweep has a
//! hard upper bound.

use libm::floor;

use crate::config::AngleScan;

/// Upper end of every current-angle scan, degrees.
pub const MAX_ANGLE_DEG: f64 = 90.;

/// Which end of the feasible interval a [`bisect`] converges to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toward {
    /// Smallest feasible value. A feasible midpoint moves the upper bound down.
    Lower,
    /// Largest feasible value. A feasible midpoint moves the lower bound up.
    Upper,
}

/// Fixed-iteration bisection over a monotone feasibility predicate.
///
/// `probe` returns `Some` for a feasible midpoint. The last feasible probe
/// result is returned, or `None` when no midpoint was feasible. The bounds
/// themselves are never probed.
pub fn bisect<T>(
    mut lower: f64,
    mut upper: f64,
    iterations: u32,
    toward: Toward,
    mut probe: impl FnMut(f64) -> Option<T>,
) -> Option<T> {
    let mut best = None;
    for _ in 0..iterations {
        let mid = 0.5 * (lower + upper);
        let feasible = match probe(mid) {
            Some(candidate) => {
                best = Some(candidate);
                true
            }
            None => false,
        };
        match (toward, feasible) {
            (Toward::Lower, true) | (Toward::Upper, false) => upper = mid,
            (Toward::Lower, false) | (Toward::Upper, true) => lower = mid,
        }
    }
    best
}

/// Angle in `[0°, 90°]` maximising `objective`, scanned as `scan` describes.
///
/// Returns `(angle_deg, value)`. Ties keep the smallest angle, so a flat
/// objective yields 0°.
pub fn maximize_angle(scan: &AngleScan, mut objective: impl FnMut(f64) -> f64) -> (f64, f64) {
    let coarse = grid_max(0., MAX_ANGLE_DEG, scan.coarse_step_deg, None, &mut objective);
    match scan.fine_step_deg {
        Some(step) => {
            let start = (coarse.0 - scan.fine_half_width_deg).max(0.);
            let end = (coarse.0 + scan.fine_half_width_deg).min(MAX_ANGLE_DEG);
            grid_max(start, end, step, Some(coarse), &mut objective)
        }
        None => coarse,
    }
}

fn grid_max(
    start: f64,
    end: f64,
    step: f64,
    seed: Option<(f64, f64)>,
    objective: &mut impl FnMut(f64) -> f64,
) -> (f64, f64) {
    // Index-based so the grid points are exact multiples of the step
    let count = floor((end - start) / step + 1e-9) as u32;
    let mut best = seed.unwrap_or((start, f64::NEG_INFINITY));
    for i in 0..=count {
        let angle = start + i as f64 * step;
        let value = objective(angle);
        if value > best.1 {
            best = (angle, value);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bisect_toward_lower_finds_threshold() {
        let mut probes = 0;
        let found = bisect(0., 90., 20, Toward::Lower, |x| {
            probes += 1;
            (x >= 30.).then_some(x)
        });
        assert_eq!(probes, 20);
        let x = found.unwrap();
        assert!(x >= 30. && x - 30. < 1e-3, "{x}");
    }

    #[test]
    fn bisect_toward_upper_finds_threshold() {
        let found = bisect(0., 13., 15, Toward::Upper, |x| (x <= 7.5).then_some(x));
        let x = found.unwrap();
        assert!(x <= 7.5 && 7.5 - x < 1e-3, "{x}");
    }

    #[test]
    fn bisect_reports_nothing_when_never_feasible() {
        let found: Option<f64> = bisect(0., 90., 20, Toward::Lower, |_| None);
        assert_eq!(found, None);
    }

    #[test]
    fn bisect_never_probes_bounds() {
        bisect(10., 20., 8, Toward::Upper, |x| {
            assert!(x > 10. && x < 20.);
            Some(x)
        });
    }

    #[test]
    fn single_scan_finds_peak() {
        let (angle, value) = maximize_angle(&AngleScan::single(0.5), |deg| -(deg - 37.5) * (deg - 37.5));
        assert_eq!(angle, 37.5);
        assert_eq!(value, 0.);
    }

    #[test]
    fn single_scan_covers_both_ends() {
        let mut seen = Vec::new();
        maximize_angle(&AngleScan::single(0.5), |deg| {
            seen.push(deg);
            0.
        });
        assert_eq!(seen.first(), Some(&0.));
        assert_eq!(seen.last(), Some(&90.));
        assert_eq!(seen.len(), 181);
    }

    #[test]
    fn flat_objective_keeps_zero() {
        let (angle, _) = maximize_angle(&AngleScan::two_pass(5., 1., 4.), |_| 0.);
        assert_eq!(angle, 0.);
    }

    #[test]
    fn two_pass_refines_to_one_degree() {
        let (angle, _) = maximize_angle(&AngleScan::two_pass(5., 1., 4.), |deg| -(deg - 23.2) * (deg - 23.2));
        assert_eq!(angle, 23.);
    }

    #[test]
    fn fine_pass_clamped_at_range_end() {
        let (angle, _) = maximize_angle(&AngleScan::two_pass(5., 1., 4.), |deg| deg);
        assert_eq!(angle, 90.);
    }
}
