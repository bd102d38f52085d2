//! Speed sweep producing the torque-speed and power-speed envelope.

use alloc::vec::Vec;

use libm::floor;
use log::{debug, trace};

use crate::{
    config::SimulationConfig,
    dq,
    operating_point::OperatingPointSolver,
    params::MotorParameters,
};

pub use crate::operating_point::Region;

/// One speed step of the envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationPoint {
    pub speed_rpm: f64,
    /// Shaft torque, Nm, never negative.
    pub torque_nm: f64,
    /// Shaft power, kW, never negative.
    pub power_kw: f64,
    /// Terminal voltage over the voltage limit, clamped to `[0, 1]`.
    pub voltage_utilization: f64,
    pub current_angle_deg: f64,
    pub id: f64,
    pub iq: f64,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationResult {
    /// Ascending in speed. May stop short of the sweep maximum when the
    /// envelope collapses.
    pub points: Vec<SimulationPoint>,
    /// Torque of the base current vector, Nm.
    pub max_torque_nm: f64,
    /// Last swept speed at which the base current vector fit under the voltage
    /// limit. Zero when the limit was never reached.
    pub base_speed_rpm: f64,
    pub max_power_kw: f64,
    /// Spacing of `points`, RPM.
    pub step_rpm: f64,
}

impl SimulationResult {
    /// The point at base speed, where the constant-torque region ends.
    pub fn corner_point(&self) -> Option<&SimulationPoint> {
        if self.points.iter().all(|p| p.region == Region::ConstantTorque) {
            return None;
        }
        self.points
            .iter()
            .find(|p| p.speed_rpm == self.base_speed_rpm)
    }
}

/// Sweep with the default [`SimulationConfig`].
pub fn compute_curve(params: &MotorParameters) -> SimulationResult {
    compute_curve_with(params, &SimulationConfig::default())
}

/// Sweep mechanical speed from zero to `params.sweep_max_rpm`.
pub fn compute_curve_with(params: &MotorParameters, config: &SimulationConfig) -> SimulationResult {
    let solver = OperatingPointSolver::new(params, config);
    let voltage_limit = solver.voltage_limit();
    let step_rpm = config.step_rpm(params.sweep_max_rpm);
    let steps = floor(params.sweep_max_rpm / step_rpm) as u32;

    let mut result = SimulationResult {
        points: Vec::with_capacity(steps as usize + 1),
        max_torque_nm: solver.base().torque,
        base_speed_rpm: 0.,
        max_power_kw: 0.,
        step_rpm,
    };
    let mut base_speed_found = false;
    let mut beta = solver.base().beta;

    for step in 0..=steps {
        let speed_rpm = step as f64 * step_rpm;
        let omega = dq::electrical_speed(speed_rpm, params.pole_pairs);

        let (point, region) = solver.solve(omega, beta);
        if region != Region::ConstantTorque && !base_speed_found {
            base_speed_found = true;
            result.base_speed_rpm = (speed_rpm - step_rpm).max(0.);
            debug!("base speed {} rpm, entering {:?}", result.base_speed_rpm, region);
        }
        beta = point.beta;

        let torque_nm = dq::torque(params, point.current).max(0.);
        let power_kw = (torque_nm * dq::mechanical_speed(speed_rpm) / 1000.).max(0.);
        result.max_power_kw = result.max_power_kw.max(power_kw);

        let point = SimulationPoint {
            speed_rpm,
            torque_nm,
            power_kw,
            voltage_utilization: (point.voltage / voltage_limit).min(1.),
            current_angle_deg: point.beta.to_degrees(),
            id: point.current.d,
            iq: point.current.q,
            region,
        };
        trace!("{:?}", point);
        result.points.push(point);

        if speed_rpm > config.early_stop_min_rpm && torque_nm < config.early_stop_torque_nm {
            debug!("torque collapsed at {} rpm, stopping sweep", speed_rpm);
            break;
        }
    }

    result
}
