//! Error types shared by the simulations

use thiserror::Error;

/// Failures of the integration step
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PhysicsError {
    #[error("time step must be finite and non-negative, got {0}")]
    InvalidTimeStep(f32),

    #[error("state became non-finite after integration")]
    NonFiniteState,
}

/// Check a time step before it reaches an integrator
pub fn check_time_step(dt: f32) -> Result<f32, PhysicsError> {
    if dt.is_finite() && dt >= 0.0 {
        Ok(dt)
    } else {
        Err(PhysicsError::InvalidTimeStep(dt))
    }
}
