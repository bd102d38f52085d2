//! Steady-state machine equations in the rotor-aligned dq frame.
//!
//! Current angle convention: β = 0 puts all current on the q axis, β = 90°
//! puts it all on the negative d axis (pure demagnetising current).

use core::f64::consts::{PI, TAU};

use libm::{cos, sin, sqrt};

use crate::{params::MotorParameters, FRAC_1_SQRT_3};

/// A vector in the rotating reference frame, either current (A) or voltage (V).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotatingReferenceFrame {
    pub d: f64,
    pub q: f64,
}

impl RotatingReferenceFrame {
    pub const ZERO: Self = Self { d: 0., q: 0. };

    /// Current vector of the given peak magnitude at current angle `beta` (rad).
    pub fn from_current_angle(magnitude: f64, beta: f64) -> Self {
        Self {
            d: -magnitude * sin(beta),
            q: magnitude * cos(beta),
        }
    }

    pub fn magnitude(&self) -> f64 {
        sqrt(self.d * self.d + self.q * self.q)
    }
}

/// Electromagnetic torque, Nm.
///
/// T = 1.5·p·[ψf·iq + (Ld − Lq)·id·iq]
pub fn torque(params: &MotorParameters, current: RotatingReferenceFrame) -> f64 {
    let magnet = params.flux_linkage * current.q;
    let reluctance = (params.ld - params.lq) * current.d * current.q;
    1.5 * params.pole_pairs as f64 * (magnet + reluctance)
}

/// Terminal voltage vector at electrical speed `omega` (rad/s).
pub fn voltage(
    params: &MotorParameters,
    current: RotatingReferenceFrame,
    omega: f64,
) -> RotatingReferenceFrame {
    RotatingReferenceFrame {
        d: params.rs * current.d - omega * params.lq * current.q,
        q: params.rs * current.q + omega * (params.ld * current.d + params.flux_linkage),
    }
}

/// Magnitude of [`voltage`].
pub fn voltage_magnitude(params: &MotorParameters, current: RotatingReferenceFrame, omega: f64) -> f64 {
    voltage(params, current, omega).magnitude()
}

/// Largest phase voltage magnitude the inverter may command.
pub fn voltage_limit(params: &MotorParameters) -> f64 {
    params.dc_bus_voltage * FRAC_1_SQRT_3 * params.voltage_utilization
}

/// Mechanical RPM to electrical rad/s.
pub fn electrical_speed(rpm: f64, pole_pairs: u32) -> f64 {
    mechanical_speed(rpm) * pole_pairs as f64
}

/// Mechanical RPM to mechanical rad/s.
pub fn mechanical_speed(rpm: f64) -> f64 {
    rpm * TAU / 60.
}

/// Electrical rad/s to mechanical RPM.
pub fn electrical_speed_to_rpm(omega: f64, pole_pairs: u32) -> f64 {
    omega * 60. / (2. * PI * pole_pairs as f64)
}
