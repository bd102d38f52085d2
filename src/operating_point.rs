//! Per-speed operating point: which (id, iq) the drive can actually command.

use crate::{
    config::{AngleScan, SimulationConfig},
    dq::{self, RotatingReferenceFrame},
    params::{ControlStrategy, MotorParameters},
    search::{self, Toward, MAX_ANGLE_DEG},
};

/// Which part of the envelope an operating point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Region {
    /// Base current vector fits under the voltage limit.
    ConstantTorque,
    /// Current angle advanced to keep full current under the voltage limit.
    FluxWeakening,
    /// Current magnitude reduced to stay under the voltage limit.
    VoltageLimited,
    /// No feasible current was found, torque is zero.
    Collapsed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingPoint {
    pub current: RotatingReferenceFrame,
    /// Current angle, rad.
    pub beta: f64,
    /// Terminal voltage magnitude, V.
    pub voltage: f64,
}

impl OperatingPoint {
    /// Zero current and zero voltage, reported when the voltage bound cannot
    /// be met at all.
    pub const fn collapsed(beta: f64) -> Self {
        Self {
            current: RotatingReferenceFrame::ZERO,
            beta,
            voltage: 0.,
        }
    }
}

/// Constant-torque current vector at full current.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasePoint {
    pub current: RotatingReferenceFrame,
    /// Current angle, rad.
    pub beta: f64,
    /// Torque at this point, Nm.
    pub torque: f64,
}

/// Base current vector at `max_current` for the configured control strategy.
pub fn base_point(params: &MotorParameters, config: &SimulationConfig) -> BasePoint {
    let beta = match params.control_strategy {
        ControlStrategy::ZeroD => 0.,
        ControlStrategy::Mtpa => mtpa_angle(params, params.max_current, &config.base_angle_scan),
    };
    let current = RotatingReferenceFrame::from_current_angle(params.max_current, beta);
    BasePoint {
        current,
        beta,
        torque: dq::torque(params, current),
    }
}

/// Torque-maximising current angle (rad) at the given current magnitude.
pub fn mtpa_angle(params: &MotorParameters, magnitude: f64, scan: &AngleScan) -> f64 {
    let (angle_deg, _) = search::maximize_angle(scan, |deg| {
        dq::torque(
            params,
            RotatingReferenceFrame::from_current_angle(magnitude, deg.to_radians()),
        )
    });
    angle_deg.to_radians()
}

/// Solves the operating point for one speed of a sweep.
#[derive(Debug, Clone)]
pub struct OperatingPointSolver<'a> {
    params: &'a MotorParameters,
    config: &'a SimulationConfig,
    voltage_limit: f64,
    base: BasePoint,
}

impl<'a> OperatingPointSolver<'a> {
    pub fn new(params: &'a MotorParameters, config: &'a SimulationConfig) -> Self {
        Self {
            params,
            config,
            voltage_limit: dq::voltage_limit(params),
            base: base_point(params, config),
        }
    }

    pub fn base(&self) -> &BasePoint {
        &self.base
    }

    pub fn voltage_limit(&self) -> f64 {
        self.voltage_limit
    }

    /// Voltage magnitude the base current vector needs at `omega`.
    pub fn base_voltage(&self, omega: f64) -> f64 {
        dq::voltage_magnitude(self.params, self.base.current, omega)
    }

    /// Operating point at electrical speed `omega` (rad/s).
    ///
    /// `min_beta` is the lowest current angle the flux-weakening search may
    /// return, normally the angle found at the previous speed.
    pub fn solve(&self, omega: f64, min_beta: f64) -> (OperatingPoint, Region) {
        let voltage = self.base_voltage(omega);
        if voltage <= self.voltage_limit {
            let point = OperatingPoint {
                current: self.base.current,
                beta: self.base.beta,
                voltage,
            };
            return (point, Region::ConstantTorque);
        }

        if self.params.flux_weakening {
            match self.flux_weakening_point(omega, min_beta) {
                Some(point) => (point, Region::FluxWeakening),
                None => (OperatingPoint::collapsed(min_beta), Region::Collapsed),
            }
        } else {
            match self.current_limited_point(omega) {
                Some(point) => (point, Region::VoltageLimited),
                None => (OperatingPoint::collapsed(0.), Region::Collapsed),
            }
        }
    }

    /// Smallest current angle in `[min_beta, 90°]` that keeps full current
    /// under the voltage limit.
    pub fn flux_weakening_point(&self, omega: f64, min_beta: f64) -> Option<OperatingPoint> {
        search::bisect(
            min_beta,
            MAX_ANGLE_DEG.to_radians(),
            self.config.flux_weakening_iterations,
            Toward::Lower,
            |beta| self.feasible(self.params.max_current, beta, omega),
        )
    }

    /// Largest current magnitude in `[0, max_current]` whose control-law
    /// angle keeps the voltage under the limit.
    pub fn current_limited_point(&self, omega: f64) -> Option<OperatingPoint> {
        search::bisect(
            0.,
            self.params.max_current,
            self.config.current_limit_iterations,
            Toward::Upper,
            |magnitude| {
                let beta = match self.params.control_strategy {
                    ControlStrategy::ZeroD => 0.,
                    ControlStrategy::Mtpa => {
                        mtpa_angle(self.params, magnitude, &self.config.trial_angle_scan)
                    }
                };
                self.feasible(magnitude, beta, omega)
            },
        )
    }

    fn feasible(&self, magnitude: f64, beta: f64, omega: f64) -> Option<OperatingPoint> {
        let current = RotatingReferenceFrame::from_current_angle(magnitude, beta);
        let voltage = dq::voltage_magnitude(self.params, current, omega);
        (voltage <= self.voltage_limit).then_some(OperatingPoint {
            current,
            beta,
            voltage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_motor, MotorType};

    fn mtpa_motor() -> MotorParameters {
        MotorParameters {
            control_strategy: ControlStrategy::Mtpa,
            ..test_motor()
        }
    }

    #[test]
    fn zero_d_base_point() {
        let params = test_motor();
        let base = base_point(&params, &SimulationConfig::default());
        assert_eq!(base.beta, 0.);
        assert_eq!(base.current.d, 0.);
        assert_eq!(base.current.q, 13.);
        assert!((base.torque - 1.5 * 15. * 1.59e-3 * 13.).abs() < 1e-12);
    }

    #[test]
    fn mtpa_advances_angle_for_salient_motor() {
        let config = SimulationConfig::default();
        let mtpa = base_point(&mtpa_motor(), &config);
        let zero_d = base_point(&test_motor(), &config);
        assert!(mtpa.beta > 0.);
        assert!(mtpa.current.d < 0.);
        assert!(mtpa.torque > zero_d.torque);
        assert!((mtpa.torque - dq::torque(&mtpa_motor(), mtpa.current)).abs() < 1e-15);
    }

    #[test]
    fn mtpa_is_zero_d_for_surface_motor() {
        let params = MotorParameters {
            motor_type: MotorType::Spmsm,
            lq: 23.5e-6,
            ..mtpa_motor()
        };
        let base = base_point(&params, &SimulationConfig::default());
        assert_eq!(base.beta, 0.);
    }

    #[test]
    fn zero_current_base_point_degenerates() {
        let params = MotorParameters {
            max_current: 0.,
            ..mtpa_motor()
        };
        let base = base_point(&params, &SimulationConfig::default());
        assert_eq!(base.beta, 0.);
        assert_eq!(base.torque, 0.);
    }

    #[test]
    fn standstill_is_constant_torque() {
        let params = test_motor();
        let config = SimulationConfig::default();
        let solver = OperatingPointSolver::new(&params, &config);
        let (point, region) = solver.solve(0., 0.);
        assert_eq!(region, Region::ConstantTorque);
        assert_eq!(point.current, solver.base().current);
    }

    #[test]
    fn flux_weakening_meets_voltage_limit() {
        let params = MotorParameters {
            flux_weakening: true,
            ..test_motor()
        };
        let config = SimulationConfig::default();
        let solver = OperatingPointSolver::new(&params, &config);
        let omega = dq::electrical_speed(3800., params.pole_pairs);

        let (point, region) = solver.solve(omega, 0.);
        assert_eq!(region, Region::FluxWeakening);
        assert!(point.voltage <= solver.voltage_limit());
        assert!(point.beta > 0.);
        assert!((point.current.magnitude() - params.max_current).abs() < 1e-9);
        // Minimal angle: slightly less weakening must violate the limit
        let tighter = RotatingReferenceFrame::from_current_angle(params.max_current, point.beta - 1e-3);
        assert!(dq::voltage_magnitude(&params, tighter, omega) > solver.voltage_limit());
    }

    #[test]
    fn flux_weakening_collapses_past_characteristic_speed() {
        let params = MotorParameters {
            flux_weakening: true,
            ..test_motor()
        };
        let config = SimulationConfig::default();
        let solver = OperatingPointSolver::new(&params, &config);
        let omega = dq::electrical_speed(6000., params.pole_pairs);

        let (point, region) = solver.solve(omega, 0.2);
        assert_eq!(region, Region::Collapsed);
        assert_eq!(point, OperatingPoint::collapsed(0.2));
    }

    #[test]
    fn current_limited_reduces_magnitude() {
        let params = test_motor();
        let config = SimulationConfig::default();
        let solver = OperatingPointSolver::new(&params, &config);
        let omega = dq::electrical_speed(3600., params.pole_pairs);

        let (point, region) = solver.solve(omega, 0.);
        assert_eq!(region, Region::VoltageLimited);
        assert_eq!(point.beta, 0.);
        assert!(point.current.q > 0. && point.current.q < params.max_current);
        assert!(point.voltage <= solver.voltage_limit());
    }

    #[test]
    fn current_limited_mtpa_rederives_angle() {
        let params = mtpa_motor();
        let config = SimulationConfig::default();
        let solver = OperatingPointSolver::new(&params, &config);
        let omega = dq::electrical_speed(3600., params.pole_pairs);

        let point = solver.current_limited_point(omega).unwrap();
        assert!(point.voltage <= solver.voltage_limit());
        let magnitude = point.current.magnitude();
        assert!(magnitude < params.max_current);
        let expected = mtpa_angle(&params, magnitude, &config.trial_angle_scan);
        assert_eq!(point.beta, expected);
    }

    #[test]
    fn current_limited_collapses_above_back_emf_limit() {
        let params = test_motor();
        let config = SimulationConfig::default();
        let solver = OperatingPointSolver::new(&params, &config);
        // Back-EMF alone exceeds the limit here
        let omega = 1.01 * solver.voltage_limit() / params.flux_linkage;

        let (point, region) = solver.solve(omega, 0.);
        assert_eq!(region, Region::Collapsed);
        assert_eq!(point, OperatingPoint::collapsed(0.));
    }
}
