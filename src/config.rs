//! Tunable constants of the sweep and its searches.
//!
//! [`SimulationConfig::default`] reproduces the reference behaviour. The
//! early-stop thresholds in particular are a presentation heuristic rather
//! than physics, so they are exposed here instead of being baked in.

/// Grid scan of the current angle over `[0°, 90°]`.
///
/// The first pass walks the whole range in `coarse_step_deg`. When
/// `fine_step_deg` is set, a second pass walks `[best - fine_half_width_deg,
/// best + fine_half_width_deg]` around the coarse winner.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AngleScan {
    pub coarse_step_deg: f64,
    pub fine_step_deg: Option<f64>,
    pub fine_half_width_deg: f64,
}

impl AngleScan {
    /// A single pass at the given resolution.
    pub const fn single(step_deg: f64) -> Self {
        Self {
            coarse_step_deg: step_deg,
            fine_step_deg: None,
            fine_half_width_deg: 0.,
        }
    }

    /// A coarse pass followed by a fine pass around the coarse optimum.
    pub const fn two_pass(coarse_step_deg: f64, fine_step_deg: f64, fine_half_width_deg: f64) -> Self {
        Self {
            coarse_step_deg,
            fine_step_deg: Some(fine_step_deg),
            fine_half_width_deg,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Smallest allowed sweep step, RPM.
    pub min_step_rpm: f64,
    /// The sweep range is divided into at most this many steps.
    pub target_steps: f64,
    /// Early stop only applies strictly above this speed, RPM.
    pub early_stop_min_rpm: f64,
    /// Torque below which the envelope is considered collapsed, Nm.
    pub early_stop_torque_nm: f64,
    /// MTPA angle search at full current.
    pub base_angle_scan: AngleScan,
    /// MTPA angle search at each trial current in the voltage-limited region.
    pub trial_angle_scan: AngleScan,
    /// Bisection steps of the flux-weakening angle search.
    pub flux_weakening_iterations: u32,
    /// Bisection steps of the voltage-limited current search.
    pub current_limit_iterations: u32,
    /// Reported by the estimator when speed is theoretically unbounded, RPM.
    pub unbounded_speed_rpm: f64,
    /// Residual flux below which it counts as fully cancelled, Wb.
    pub residual_flux_epsilon: f64,
    /// Estimated speeds are rounded up to a multiple of this, RPM.
    pub speed_rounding_rpm: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_step_rpm: 10.,
            target_steps: 100.,
            early_stop_min_rpm: 100.,
            early_stop_torque_nm: 0.01,
            base_angle_scan: AngleScan::single(0.5),
            trial_angle_scan: AngleScan::two_pass(5., 1., 4.),
            flux_weakening_iterations: 20,
            current_limit_iterations: 15,
            unbounded_speed_rpm: 20_000.,
            residual_flux_epsilon: 1e-9,
            speed_rounding_rpm: 100.,
        }
    }
}

impl SimulationConfig {
    /// Sweep step for a sweep ending at `sweep_max_rpm`.
    pub fn step_rpm(&self, sweep_max_rpm: f64) -> f64 {
        libm::ceil(sweep_max_rpm / self.target_steps).max(self.min_step_rpm)
    }
}
