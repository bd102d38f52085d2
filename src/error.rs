use thiserror::Error;

/// Reasons a [`MotorParameters`](crate::MotorParameters) record is unfit for
/// simulation.
///
/// The simulation itself never returns this; it is produced by
/// [`MotorParameters::validate`](crate::MotorParameters::validate) for callers
/// that guard their input upstream.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ParameterError {
    #[error("{name} is not a finite number: {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("{name} must not be negative: {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} must be greater than zero: {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("motor must have at least one pole pair")]
    ZeroPolePairs,
}

pub type ParameterResult<T> = Result<T, ParameterError>;
