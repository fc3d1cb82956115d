//! Free fall kinematics
//!
//! Two parts: a closed-form solver that fills in the unknowns of
//! `h = ½·g·t²`, `v = g·t` from any two known values, and the falling body that
//! animates a drop with a fixed 1/100 s Euler step.

use common::{euler_step, FixedStep, Kinematic, PhysicsError};
use glam::Vec2;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FreeFallError {
    #[error("All values must be numbers: {field} = {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must be positive and finite")]
    InvalidValue { field: &'static str },

    #[error("Not enough values (min 2)")]
    NotEnoughValues,

    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

/// Known quantities of a fall; `None` marks an unknown
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FallParameters {
    pub gravity: Option<f64>,
    pub height: Option<f64>,
    pub time: Option<f64>,
    pub velocity: Option<f64>,
}

impl FallParameters {
    /// Parse the four entry fields; blank or zero fields are unknown
    pub fn parse(gravity: &str, height: &str, time: &str, velocity: &str) -> Result<Self, FreeFallError> {
        Ok(Self {
            gravity: parse_field("gravity", gravity)?,
            height: parse_field("height", height)?,
            time: parse_field("time", time)?,
            velocity: parse_field("velocity", velocity)?,
        })
    }

    pub fn known_count(&self) -> usize {
        [self.gravity, self.height, self.time, self.velocity]
            .iter()
            .filter(|v| v.is_some())
            .count()
    }
}

fn parse_field(field: &'static str, text: &str) -> Result<Option<f64>, FreeFallError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let value: f64 = text.parse().map_err(|_| FreeFallError::InvalidNumber {
        field,
        value: text.to_string(),
    })?;
    if value == 0.0 {
        return Ok(None);
    }
    if !value.is_finite() || value < 0.0 {
        return Err(FreeFallError::InvalidValue { field });
    }
    Ok(Some(value))
}

/// All four quantities of a fall from rest
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallSolution {
    pub gravity: f64,
    pub height: f64,
    pub time: f64,
    pub velocity: f64,
}

/// Solve for the unknowns from the first usable pair of known values
///
/// Pairs are tried in the order g&t, g&h, g&v, h&t, h&v, v&t.
pub fn solve(params: &FallParameters) -> Result<FallSolution, FreeFallError> {
    if params.known_count() < 2 {
        return Err(FreeFallError::NotEnoughValues);
    }

    let FallParameters {
        gravity,
        height,
        time,
        velocity,
    } = *params;

    let (g, t) = match (gravity, height, time, velocity) {
        (Some(g), _, Some(t), _) => (g, t),
        (Some(g), Some(h), _, _) => (g, (2.0 * h / g).sqrt()),
        (Some(g), _, _, Some(v)) => (g, v / g),
        (_, Some(h), Some(t), _) => (2.0 * h / (t * t), t),
        (_, Some(h), _, Some(v)) => {
            let t = 2.0 * h / v;
            (v / t, t)
        }
        (_, _, Some(t), Some(v)) => (v / t, t),
        _ => return Err(FreeFallError::NotEnoughValues),
    };

    Ok(FallSolution {
        gravity: g,
        height: 0.5 * g * t * t,
        time: t,
        velocity: g * t,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallState {
    /// Placed at its start height, waiting for a drop
    Idle,
    Falling,
    /// Fall time elapsed
    Landed,
    /// Removed from view by a reset
    Hidden,
}

/// The block that is dropped, in pixel coordinates (1 px = 1 m, y down)
///
/// `kinematic.position` is the bottom centre of the block.
#[derive(Debug, Clone)]
pub struct FallingBody {
    pub kinematic: Kinematic,
    pub size: f32,
    ground_y: f32,
    gravity: f32,
    fall_time: f32,
    elapsed: f32,
    clock: FixedStep,
    state: FallState,
}

impl FallingBody {
    pub fn new(ground_y: f32, step: f32) -> Self {
        Self {
            kinematic: Kinematic::default(),
            size: 25.0,
            ground_y,
            gravity: 0.0,
            fall_time: 0.0,
            elapsed: 0.0,
            clock: FixedStep::new(step),
            state: FallState::Hidden,
        }
    }

    pub fn state(&self) -> FallState {
        self.state
    }

    pub fn is_falling(&self) -> bool {
        self.state == FallState::Falling
    }

    pub fn ground_y(&self) -> f32 {
        self.ground_y
    }

    /// Seconds since the drop started
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Current height above the ground
    pub fn height(&self) -> f32 {
        self.ground_y - self.kinematic.position.y
    }

    pub fn speed(&self) -> f32 {
        self.kinematic.velocity.length()
    }

    /// Place the block at rest `height` above the ground
    pub fn set_height(&mut self, height: f32, x: f32) {
        self.kinematic = Kinematic::at_rest(Vec2::new(x, self.ground_y - height));
        self.elapsed = 0.0;
        self.clock.reset();
        self.state = FallState::Idle;
    }

    /// Start a drop; ignored while already falling
    pub fn start_drop(&mut self, gravity: f32, fall_time: f32) -> Result<bool, FreeFallError> {
        if self.is_falling() {
            return Ok(false);
        }
        if !(gravity.is_finite() && gravity > 0.0) {
            return Err(FreeFallError::InvalidValue { field: "gravity" });
        }
        if !(fall_time.is_finite() && fall_time >= 0.0) {
            return Err(FreeFallError::InvalidValue { field: "time" });
        }

        self.gravity = gravity;
        self.fall_time = fall_time;
        self.elapsed = 0.0;
        self.kinematic.velocity = Vec2::ZERO;
        self.clock.reset();
        self.state = FallState::Falling;
        log::info!("Drop: g = {} m/s², t = {} s, h = {} m", gravity, fall_time, self.height());
        Ok(true)
    }

    pub fn abort(&mut self) {
        if self.is_falling() {
            log::info!("Drop aborted after {:.2} s", self.elapsed);
            self.state = FallState::Idle;
        }
    }

    pub fn reset(&mut self) {
        self.kinematic = Kinematic::default();
        self.elapsed = 0.0;
        self.state = FallState::Hidden;
    }

    /// Advance the animation by frame time; `true` on the update that lands
    pub fn update(&mut self, frame_dt: f32) -> Result<bool, FreeFallError> {
        if !self.is_falling() {
            return Ok(false);
        }

        let ticks = self.clock.advance(frame_dt)?;
        let step = self.clock.step();
        for _ in 0..ticks {
            if self.elapsed >= self.fall_time {
                break;
            }
            self.elapsed += step;
            euler_step(&mut self.kinematic, Vec2::new(0.0, self.gravity), step)?;
        }

        if self.elapsed >= self.fall_time {
            self.state = FallState::Landed;
            log::info!(
                "Landed after {:.2} s at {:.2} m/s",
                self.elapsed,
                self.speed()
            );
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn params(g: f64, h: f64, t: f64, v: f64) -> FallParameters {
        let known = |x: f64| if x == 0.0 { None } else { Some(x) };
        FallParameters {
            gravity: known(g),
            height: known(h),
            time: known(t),
            velocity: known(v),
        }
    }

    #[test]
    fn test_height_is_half_g_t_squared() {
        let solution = solve(&params(9.8, 0.0, 3.0, 0.0)).unwrap();
        assert!(close(solution.height, 0.5 * 9.8 * 9.0));
        assert!(close(solution.velocity, 9.8 * 3.0));
    }

    #[test]
    fn test_every_pair_reproduces_the_rest() {
        let expected = solve(&params(9.8, 0.0, 4.0, 0.0)).unwrap();
        let FallSolution {
            gravity: g,
            height: h,
            time: t,
            velocity: v,
        } = expected;

        for p in [
            params(g, h, 0.0, 0.0),
            params(g, 0.0, 0.0, v),
            params(0.0, h, t, 0.0),
            params(0.0, h, 0.0, v),
            params(0.0, 0.0, t, v),
        ] {
            let s = solve(&p).unwrap();
            assert!((s.gravity - g).abs() < 1e-9, "{:?}", p);
            assert!((s.height - h).abs() < 1e-9, "{:?}", p);
            assert!((s.time - t).abs() < 1e-9, "{:?}", p);
            assert!((s.velocity - v).abs() < 1e-9, "{:?}", p);
        }
    }

    #[test]
    fn test_gravity_and_time_take_priority() {
        // Inconsistent height is overwritten
        let s = solve(&params(10.0, 1.0, 2.0, 0.0)).unwrap();
        assert!(close(s.height, 20.0));
    }

    #[test]
    fn test_not_enough_values() {
        assert_eq!(
            solve(&params(9.8, 0.0, 0.0, 0.0)),
            Err(FreeFallError::NotEnoughValues)
        );
        assert_eq!(solve(&FallParameters::default()), Err(FreeFallError::NotEnoughValues));
    }

    #[test]
    fn test_parse_blank_and_zero_are_unknown() {
        let p = FallParameters::parse("9.8", "", "0", " 12 ").unwrap();
        assert_eq!(p.gravity, Some(9.8));
        assert_eq!(p.height, None);
        assert_eq!(p.time, None);
        assert_eq!(p.velocity, Some(12.0));
    }

    #[test]
    fn test_parse_rejects_garbage_and_negatives() {
        assert!(matches!(
            FallParameters::parse("abc", "1", "1", "1"),
            Err(FreeFallError::InvalidNumber { field: "gravity", .. })
        ));
        assert_eq!(
            FallParameters::parse("9.8", "-5", "", ""),
            Err(FreeFallError::InvalidValue { field: "height" })
        );
    }

    #[test]
    fn test_drop_follows_closed_form() {
        let mut body = FallingBody::new(675.0, 0.01);
        body.set_height(500.0, 350.0);
        assert!(body.start_drop(9.8, 2.0).unwrap());

        // Plenty of frame time, split into 60 Hz frames
        for _ in 0..200 {
            body.update(1.0 / 60.0).unwrap();
        }

        assert_eq!(body.state(), FallState::Landed);
        let t = body.elapsed();
        assert!((t - 2.0).abs() < 0.011);
        let fallen = 500.0 - body.height();
        let expected = 0.5 * 9.8 * t * t;
        // Euler overshoots by a factor of (1 + 1/N) with N = 200 ticks
        assert!((fallen - expected).abs() / expected < 0.01, "fell {}", fallen);
        assert!((body.speed() - 9.8 * t).abs() < 0.01);
    }

    #[test]
    fn test_landing_reported_once() {
        let mut body = FallingBody::new(675.0, 0.01);
        body.set_height(20.0, 350.0);
        body.start_drop(9.8, 0.05).unwrap();

        let landings = (0..10).filter(|_| body.update(1.0 / 60.0).unwrap()).count();
        assert_eq!(landings, 1);
        assert_eq!(body.state(), FallState::Landed);
    }

    #[test]
    fn test_drop_ignored_while_falling() {
        let mut body = FallingBody::new(675.0, 0.01);
        body.set_height(100.0, 0.0);
        assert!(body.start_drop(9.8, 1.0).unwrap());
        assert!(!body.start_drop(1.0, 5.0).unwrap());
    }

    #[test]
    fn test_zero_fall_time_lands_immediately() {
        let mut body = FallingBody::new(675.0, 0.01);
        body.set_height(100.0, 0.0);
        body.start_drop(9.8, 0.0).unwrap();
        body.update(0.1).unwrap();
        assert_eq!(body.state(), FallState::Landed);
        assert_eq!(body.height(), 100.0);
    }

    #[test]
    fn test_abort_stops_motion() {
        let mut body = FallingBody::new(675.0, 0.01);
        body.set_height(500.0, 0.0);
        body.start_drop(9.8, 10.0).unwrap();
        body.update(0.5).unwrap();
        body.abort();
        let height = body.height();
        body.update(0.5).unwrap();
        assert_eq!(body.state(), FallState::Idle);
        assert_eq!(body.height(), height);
    }

    #[test]
    fn test_drop_rejects_bad_gravity() {
        let mut body = FallingBody::new(675.0, 0.01);
        body.set_height(10.0, 0.0);
        assert_eq!(
            body.start_drop(0.0, 1.0),
            Err(FreeFallError::InvalidValue { field: "gravity" })
        );
        assert_eq!(body.state(), FallState::Idle);
    }
}
