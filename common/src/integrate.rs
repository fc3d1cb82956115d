//! Explicit Euler integration
//!
//! Every simulation advances its bodies with the same update: velocity is accumulated
//! from the acceleration first, then position from the new velocity.

use glam::Vec2;

use crate::error::{check_time_step, PhysicsError};

/// Linear position and velocity of a body
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kinematic {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Kinematic {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    pub fn at_rest(position: Vec2) -> Self {
        Self::new(position, Vec2::ZERO)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// Advance `state` by `dt` seconds under a constant `acceleration`
pub fn euler_step(state: &mut Kinematic, acceleration: Vec2, dt: f32) -> Result<(), PhysicsError> {
    let dt = check_time_step(dt)?;

    state.velocity += acceleration * dt;
    state.position += state.velocity * dt;

    if state.is_finite() {
        Ok(())
    } else {
        Err(PhysicsError::NonFiniteState)
    }
}

/// Scale a velocity by a damping factor (1.0 keeps it unchanged)
pub fn damp(velocity: Vec2, factor: f32) -> Vec2 {
    velocity * factor
}

/// Angle and angular velocity, advanced once per tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngularState {
    pub angle: f32,
    pub velocity: f32,
}

impl AngularState {
    pub fn new(angle: f32) -> Self {
        Self { angle, velocity: 0.0 }
    }

    /// One tick: `vel += acc; vel *= damping; angle += vel`
    ///
    /// The acceleration is already expressed per tick, so no `dt` is involved.
    pub fn step(&mut self, acceleration: f32, damping_factor: f32) -> Result<(), PhysicsError> {
        self.velocity += acceleration;
        self.velocity *= damping_factor;
        self.angle += self.velocity;

        if self.angle.is_finite() && self.velocity.is_finite() {
            Ok(())
        } else {
            Err(PhysicsError::NonFiniteState)
        }
    }
}

/// Fixed-step accumulator driven by variable frame times
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep {
    step: f32,
    accumulator: f32,
    max_ticks: u32,
}

impl FixedStep {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            accumulator: 0.0,
            max_ticks: 64,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Add frame time and return how many fixed ticks are due
    pub fn advance(&mut self, frame_dt: f32) -> Result<u32, PhysicsError> {
        let frame_dt = check_time_step(frame_dt)?;
        check_time_step(self.step)?;
        if self.step == 0.0 {
            return Err(PhysicsError::InvalidTimeStep(self.step));
        }

        self.accumulator += frame_dt;
        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < self.max_ticks {
            self.accumulator -= self.step;
            ticks += 1;
        }
        // Drop the backlog instead of spiralling after a long stall
        if ticks == self.max_ticks {
            self.accumulator = 0.0;
        }
        Ok(ticks)
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn test_euler_velocity_before_position() {
        let mut state = Kinematic::at_rest(Vec2::ZERO);
        euler_step(&mut state, Vec2::new(0.0, 10.0), 0.5).unwrap();

        assert_eq!(state.velocity, Vec2::new(0.0, 5.0));
        // Position uses the updated velocity
        assert_eq!(state.position, Vec2::new(0.0, 2.5));
    }

    #[test]
    fn test_euler_zero_acceleration_is_linear() {
        let mut state = Kinematic::new(Vec2::ZERO, Vec2::new(3.0, -1.0));
        for _ in 0..10 {
            euler_step(&mut state, Vec2::ZERO, 0.1).unwrap();
        }
        assert!((state.position.x - 3.0).abs() < EPSILON);
        assert!((state.position.y + 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_euler_rejects_bad_time_step() {
        let mut state = Kinematic::default();
        assert!(matches!(
            euler_step(&mut state, Vec2::ONE, f32::NAN),
            Err(PhysicsError::InvalidTimeStep(_))
        ));
        assert!(matches!(
            euler_step(&mut state, Vec2::ONE, -0.1),
            Err(PhysicsError::InvalidTimeStep(_))
        ));
        // State is untouched by a rejected step
        assert_eq!(state, Kinematic::default());
    }

    #[test]
    fn test_damp() {
        assert_eq!(damp(Vec2::new(2.0, 4.0), 0.5), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_angular_step_undamped() {
        let mut state = AngularState::new(0.5);
        state.step(-0.1, 1.0).unwrap();
        assert!((state.velocity + 0.1).abs() < EPSILON);
        assert!((state.angle - 0.4).abs() < EPSILON);
    }

    #[test]
    fn test_angular_step_damped() {
        let mut state = AngularState::new(0.0);
        state.velocity = 1.0;
        state.step(0.0, 0.99).unwrap();
        assert!((state.velocity - 0.99).abs() < EPSILON);
    }

    #[test]
    fn test_fixed_step_accumulates() {
        let mut clock = FixedStep::new(0.01);
        assert_eq!(clock.advance(0.005).unwrap(), 0);
        assert_eq!(clock.advance(0.016).unwrap(), 2);
    }

    #[test]
    fn test_fixed_step_caps_backlog() {
        let mut clock = FixedStep::new(0.01);
        assert_eq!(clock.advance(10.0).unwrap(), 64);
        assert_eq!(clock.advance(0.0).unwrap(), 0);
    }
}
