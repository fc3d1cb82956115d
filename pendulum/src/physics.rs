//! Damped simple pendulum
//!
//! The arm hangs from a fixed pivot and swings under a per-tick angular acceleration
//! `-k·sin(θ)`. Velocity is multiplied by `1 + damping_change` each tick, so a negative
//! change bleeds energy away.

use common::{AngularState, FixedStep, PhysicsError};
use glam::Vec2;
use thiserror::Error;

/// Distance of the pivot below the top of the window
pub const PIVOT_Y: f32 = 50.0;
/// Increment applied by each control press
pub const CONTROL_STEP: f32 = 0.0005;
pub const MAX_ACCEL_BOOST: f32 = 1.0;
pub const MIN_DAMPING_CHANGE: f32 = -0.01;
/// Ticks between clears of the drawn trace
pub const TRACE_RESET_TICKS: u64 = 180;

// Absorbs float drift from repeated control steps
const BOUND_TOLERANCE: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PendulumError {
    #[error("Pendulum arm has zero length")]
    ZeroLength,

    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

pub fn pivot_for_width(width: f32) -> Vec2 {
    Vec2::new(width * 0.5, PIVOT_Y)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pendulum {
    pivot: Vec2,
    length: f32,
    state: AngularState,
    bob: Vec2,
}

impl Pendulum {
    /// Hang a bob at `click`
    ///
    /// Clicks above the pivot mirror the angle so the bob still starts under the cursor.
    pub fn from_click(pivot: Vec2, click: Vec2) -> Result<Self, PendulumError> {
        let arm = click - pivot;
        let length = arm.length();
        if length <= f32::EPSILON || !length.is_finite() {
            return Err(PendulumError::ZeroLength);
        }

        let swing = (arm.x / length).clamp(-1.0, 1.0).asin();
        let angle = if arm.y < 0.0 {
            std::f32::consts::PI - swing
        } else {
            swing
        };

        let mut pendulum = Self {
            pivot,
            length,
            state: AngularState::new(angle),
            bob: click,
        };
        pendulum.update_bob();
        Ok(pendulum)
    }

    /// Advance one tick with acceleration coefficient `k` and a damping change
    pub fn tick(&mut self, k: f32, damping_change: f32) -> Result<(), PendulumError> {
        let acceleration = -k * self.state.angle.sin();
        self.state.step(acceleration, 1.0 + damping_change)?;
        self.update_bob();
        Ok(())
    }

    fn update_bob(&mut self) {
        let (sin, cos) = self.state.angle.sin_cos();
        self.bob = self.pivot + self.length * Vec2::new(sin, cos);
    }

    pub fn pivot(&self) -> Vec2 {
        self.pivot
    }

    pub fn bob(&self) -> Vec2 {
        self.bob
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn angle(&self) -> f32 {
        self.state.angle
    }

    pub fn angular_velocity(&self) -> f32 {
        self.state.velocity
    }

    /// Horizontal distance of the bob from the balance line
    pub fn offset(&self) -> f32 {
        self.bob.x - self.pivot.x
    }
}

/// Velocity boost and damping adjusted from the panel
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Controls {
    accel_boost: f32,
    damping_change: f32,
}

impl Controls {
    pub fn accel_boost(&self) -> f32 {
        self.accel_boost
    }

    pub fn damping_change(&self) -> f32 {
        self.damping_change
    }

    pub fn increase_velocity(&mut self) {
        if self.accel_boost + CONTROL_STEP <= MAX_ACCEL_BOOST + BOUND_TOLERANCE {
            self.accel_boost += CONTROL_STEP;
        }
    }

    pub fn decrease_velocity(&mut self) {
        if self.accel_boost - CONTROL_STEP >= -BOUND_TOLERANCE {
            self.accel_boost = (self.accel_boost - CONTROL_STEP).max(0.0);
        }
    }

    pub fn increase_damping(&mut self) {
        if self.damping_change - CONTROL_STEP >= MIN_DAMPING_CHANGE - BOUND_TOLERANCE {
            self.damping_change -= CONTROL_STEP;
        }
    }

    pub fn decrease_damping(&mut self) {
        if self.damping_change + CONTROL_STEP <= BOUND_TOLERANCE {
            self.damping_change = (self.damping_change + CONTROL_STEP).min(0.0);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Recent bob positions for drawing, and every horizontal offset of the session
#[derive(Debug, Clone, Default)]
pub struct Trace {
    points: Vec<Vec2>,
    offsets: Vec<f32>,
    ticks: u64,
}

impl Trace {
    pub fn record(&mut self, pendulum: &Pendulum) {
        self.ticks += 1;
        if self.ticks % TRACE_RESET_TICKS == 0 {
            self.points.clear();
        }
        self.points.push(pendulum.bob());
        self.offsets.push(pendulum.offset());
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.offsets.clear();
        self.ticks = 0;
    }
}

/// The pendulum, its controls and the fixed-rate clock driving it
pub struct PendulumSim {
    pivot: Vec2,
    base_accel: f32,
    pendulum: Option<Pendulum>,
    pub controls: Controls,
    trace: Trace,
    clock: FixedStep,
}

impl PendulumSim {
    pub fn new(pivot: Vec2, base_accel: f32, tick_rate: f32) -> Self {
        Self {
            pivot,
            base_accel,
            pendulum: None,
            controls: Controls::default(),
            trace: Trace::default(),
            clock: FixedStep::new(1.0 / tick_rate),
        }
    }

    /// Release a new bob at `click`, replacing any swinging one
    pub fn release(&mut self, click: Vec2) -> Result<(), PendulumError> {
        let pendulum = Pendulum::from_click(self.pivot, click)?;
        log::debug!(
            "Released pendulum: length {:.1}, angle {:.3} rad",
            pendulum.length(),
            pendulum.angle()
        );
        self.pendulum = Some(pendulum);
        self.trace.clear();
        self.clock.reset();
        Ok(())
    }

    /// Move the pivot; a moved pivot drops the swinging bob
    pub fn set_pivot(&mut self, pivot: Vec2) {
        if pivot == self.pivot {
            return;
        }
        self.pivot = pivot;
        self.pendulum = None;
        self.trace.clear();
    }

    pub fn update(&mut self, frame_dt: f32) -> Result<(), PendulumError> {
        let Some(pendulum) = self.pendulum.as_mut() else {
            return Ok(());
        };
        let ticks = self.clock.advance(frame_dt)?;
        let k = self.base_accel + self.controls.accel_boost();
        for _ in 0..ticks {
            if let Err(e) = pendulum.tick(k, self.controls.damping_change()) {
                self.pendulum = None;
                return Err(e);
            }
            self.trace.record(pendulum);
        }
        Ok(())
    }

    pub fn pivot(&self) -> Vec2 {
        self.pivot
    }

    pub fn pendulum(&self) -> Option<&Pendulum> {
        self.pendulum.as_ref()
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn pivot() -> Vec2 {
        pivot_for_width(950.0)
    }

    #[test]
    fn test_pivot_position() {
        assert_eq!(pivot(), Vec2::new(475.0, 50.0));
    }

    #[test]
    fn test_click_sets_length_and_angle() {
        let p = Pendulum::from_click(pivot(), Vec2::new(575.0, 150.0)).unwrap();
        assert!((p.length() - 100.0 * 2f32.sqrt()).abs() < EPSILON);
        assert!((p.angle() - std::f32::consts::FRAC_PI_4).abs() < EPSILON);
        assert!((p.bob() - Vec2::new(575.0, 150.0)).length() < 0.01);
    }

    #[test]
    fn test_click_straight_below_hangs_at_rest() {
        let mut p = Pendulum::from_click(pivot(), Vec2::new(475.0, 250.0)).unwrap();
        assert_eq!(p.angle(), 0.0);
        p.tick(0.0005, 0.0).unwrap();
        assert_eq!(p.angular_velocity(), 0.0);
        assert!((p.bob() - Vec2::new(475.0, 250.0)).length() < EPSILON);
    }

    #[test]
    fn test_click_above_pivot_keeps_bob_under_cursor() {
        let click = Vec2::new(525.0, 20.0);
        let p = Pendulum::from_click(pivot(), click).unwrap();
        assert!(p.angle() > std::f32::consts::FRAC_PI_2);
        assert!((p.bob() - click).length() < 0.01);
    }

    #[test]
    fn test_click_on_pivot_is_rejected() {
        assert_eq!(
            Pendulum::from_click(pivot(), pivot()),
            Err(PendulumError::ZeroLength)
        );
    }

    #[test]
    fn test_swing_is_antisymmetric_without_damping() {
        let mut right = Pendulum::from_click(pivot(), Vec2::new(600.0, 300.0)).unwrap();
        let mut left = Pendulum::from_click(pivot(), Vec2::new(350.0, 300.0)).unwrap();
        assert!((right.angle() + left.angle()).abs() < EPSILON);

        for _ in 0..500 {
            right.tick(0.0005, 0.0).unwrap();
            left.tick(0.0005, 0.0).unwrap();
            assert!((right.angle() + left.angle()).abs() < EPSILON);
            assert!((right.angular_velocity() + left.angular_velocity()).abs() < EPSILON);
            assert!((right.offset() + left.offset()).abs() < 0.01);
        }
    }

    #[test]
    fn test_first_tick_swings_towards_balance() {
        let mut p = Pendulum::from_click(pivot(), Vec2::new(600.0, 300.0)).unwrap();
        let start = p.angle();
        p.tick(0.0005, 0.0).unwrap();
        assert!(p.angular_velocity() < 0.0);
        assert!(p.angle() < start);
    }

    #[test]
    fn test_damping_shrinks_amplitude() {
        let mut free = Pendulum::from_click(pivot(), Vec2::new(600.0, 300.0)).unwrap();
        let mut damped = free;
        let mut free_peak = 0.0f32;
        let mut damped_peak = 0.0f32;
        for i in 0..2000 {
            free.tick(0.0005, 0.0).unwrap();
            damped.tick(0.0005, -0.01).unwrap();
            if i > 1500 {
                free_peak = free_peak.max(free.angle().abs());
                damped_peak = damped_peak.max(damped.angle().abs());
            }
        }
        assert!(damped_peak < free_peak * 0.5);
    }

    #[test]
    fn test_velocity_boost_bounds() {
        let mut controls = Controls::default();
        controls.decrease_velocity();
        assert_eq!(controls.accel_boost(), 0.0);

        for _ in 0..3000 {
            controls.increase_velocity();
        }
        assert!(controls.accel_boost() <= MAX_ACCEL_BOOST + 1e-3);
        assert!(controls.accel_boost() > MAX_ACCEL_BOOST - 1e-3);
    }

    #[test]
    fn test_damping_bounds() {
        let mut controls = Controls::default();
        controls.decrease_damping();
        assert_eq!(controls.damping_change(), 0.0);

        for _ in 0..100 {
            controls.increase_damping();
        }
        assert!((controls.damping_change() - MIN_DAMPING_CHANGE).abs() < 1e-5);
        assert!(controls.damping_change() >= MIN_DAMPING_CHANGE - 1e-5);

        controls.decrease_damping();
        assert!((controls.damping_change() - (MIN_DAMPING_CHANGE + CONTROL_STEP)).abs() < 1e-5);
    }

    #[test]
    fn test_controls_reset() {
        let mut controls = Controls::default();
        controls.increase_velocity();
        controls.increase_damping();
        controls.reset();
        assert_eq!(controls, Controls::default());
    }

    #[test]
    fn test_trace_clears_every_reset_period() {
        let mut sim = PendulumSim::new(pivot(), 0.0005, 60.0);
        sim.release(Vec2::new(600.0, 300.0)).unwrap();

        for _ in 0..179 {
            sim.update(1.0 / 60.0).unwrap();
        }
        assert_eq!(sim.trace().points().len(), 179);
        sim.update(1.0 / 60.0).unwrap();
        assert_eq!(sim.trace().points().len(), 1);
        assert_eq!(sim.trace().offsets().len(), 180);
    }

    #[test]
    fn test_update_without_bob_is_idle() {
        let mut sim = PendulumSim::new(pivot(), 0.0005, 60.0);
        sim.update(1.0).unwrap();
        assert!(sim.pendulum().is_none());
        assert!(sim.trace().offsets().is_empty());
    }

    #[test]
    fn test_new_release_clears_trace() {
        let mut sim = PendulumSim::new(pivot(), 0.0005, 60.0);
        sim.release(Vec2::new(600.0, 300.0)).unwrap();
        sim.update(0.5).unwrap();
        assert!(!sim.trace().offsets().is_empty());

        sim.release(Vec2::new(400.0, 300.0)).unwrap();
        assert!(sim.trace().offsets().is_empty());
    }

    #[test]
    fn test_rejected_release_keeps_current_bob() {
        let mut sim = PendulumSim::new(pivot(), 0.0005, 60.0);
        sim.release(Vec2::new(600.0, 300.0)).unwrap();
        assert!(sim.release(pivot()).is_err());
        assert!(sim.pendulum().is_some());
    }
}
