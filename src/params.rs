//! Motor and inverter parameters consumed by the simulation.

use crate::error::{ParameterError, ParameterResult};

/// Rotor construction. Informational only, the equations are the same for both.
///
/// A surface-mount machine conventionally has `ld == lq`; keeping it that way
/// is up to whoever fills in the parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotorType {
    /// Interior permanent magnet.
    Ipmsm,
    /// Surface permanent magnet.
    Spmsm,
}

/// Current-angle law used in the constant-torque region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlStrategy {
    /// Maximum torque per ampere.
    Mtpa,
    /// Zero d-axis current.
    ZeroD,
}

/// Everything the simulation needs to know about the machine and its drive.
///
/// All quantities are SI: ohms, henries, webers, volts, amps (peak).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorParameters {
    pub motor_type: MotorType,
    pub control_strategy: ControlStrategy,
    /// Allow negative d-axis current above base speed.
    pub flux_weakening: bool,
    /// Stator phase resistance.
    pub rs: f64,
    /// d-axis inductance.
    pub ld: f64,
    /// q-axis inductance.
    pub lq: f64,
    /// Permanent magnet flux linkage.
    pub flux_linkage: f64,
    pub pole_pairs: u32,
    pub dc_bus_voltage: f64,
    /// Fraction of `dc_bus_voltage / sqrt(3)` the inverter may command.
    /// Not clamped.
    pub voltage_utilization: f64,
    /// Peak phase current limit.
    pub max_current: f64,
    /// Upper end of the speed sweep, mechanical RPM.
    pub sweep_max_rpm: f64,
}

impl MotorParameters {
    /// Check that every field is physically meaningful.
    ///
    /// [`compute_curve`](crate::compute_curve) and
    /// [`estimate_max_speed`](crate::estimate_max_speed) accept anything and
    /// produce garbage (infinite RPM for zero pole pairs, for instance) when
    /// given nonsense, so call this first on untrusted input.
    pub fn validate(&self) -> ParameterResult<()> {
        non_negative("rs", self.rs)?;
        positive("ld", self.ld)?;
        positive("lq", self.lq)?;
        positive("flux_linkage", self.flux_linkage)?;
        if self.pole_pairs == 0 {
            return Err(ParameterError::ZeroPolePairs);
        }
        positive("dc_bus_voltage", self.dc_bus_voltage)?;
        positive("voltage_utilization", self.voltage_utilization)?;
        non_negative("max_current", self.max_current)?;
        non_negative("sweep_max_rpm", self.sweep_max_rpm)?;
        Ok(())
    }
}

fn finite(name: &'static str, value: f64) -> ParameterResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParameterError::NotFinite { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> ParameterResult<()> {
    if finite(name, value)? < 0. {
        return Err(ParameterError::Negative { name, value });
    }
    Ok(())
}

fn positive(name: &'static str, value: f64) -> ParameterResult<()> {
    if finite(name, value)? <= 0. {
        return Err(ParameterError::NotPositive { name, value });
    }
    Ok(())
}
