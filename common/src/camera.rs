//! Camera system for the 2D simulations
//!
//! World coordinates are window pixels with y growing downward. The camera keeps an
//! offset (the world point shown at the top-left corner at zoom 1) and a zoom factor that
//! scales about the centre of the viewport.

use std::collections::HashSet;

use glam::{Mat4, Vec2, Vec3};
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Optional per-axis bounds on the camera offset
///
/// Bounds are given as magnitudes and normalized so that `x_min <= 0 <= x_max` and
/// `y_min <= 0 <= y_max`. `None` leaves that side unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraLimits {
    pub x_min: Option<f32>,
    pub x_max: Option<f32>,
    pub y_min: Option<f32>,
    pub y_max: Option<f32>,
}

impl CameraLimits {
    pub fn none() -> Self {
        Self::default()
    }

    /// Build limits from how far the camera may travel left, right, up and down
    pub fn new(left: Option<f32>, right: Option<f32>, up: Option<f32>, down: Option<f32>) -> Self {
        Self {
            x_min: left.map(|v| -v.abs()),
            x_max: right.map(f32::abs),
            y_min: up.map(|v| -v.abs()),
            y_max: down.map(f32::abs),
        }
    }

    /// No horizontal travel at all, vertical travel unbounded
    pub fn locked_x() -> Self {
        Self::new(Some(0.0), Some(0.0), None, None)
    }

    pub fn contains_x(&self, x: f32) -> bool {
        self.x_min.map_or(true, |min| x >= min) && self.x_max.map_or(true, |max| x <= max)
    }

    pub fn contains_y(&self, y: f32) -> bool {
        self.y_min.map_or(true, |min| y >= min) && self.y_max.map_or(true, |max| y <= max)
    }

    pub fn clamp(&self, offset: Vec2) -> Vec2 {
        let clamp_axis = |v: f32, min: Option<f32>, max: Option<f32>| {
            let v = min.map_or(v, |min| v.max(min));
            max.map_or(v, |max| v.min(max))
        };
        Vec2::new(
            clamp_axis(offset.x, self.x_min, self.x_max),
            clamp_axis(offset.y, self.y_min, self.y_max),
        )
    }
}

/// Camera input sampled for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub zoom_in: bool,
    pub zoom_out: bool,
    pub reset: bool,
    pub allow_horizontal: bool,
    pub allow_vertical: bool,
}

impl Default for PanInput {
    fn default() -> Self {
        Self {
            left: false,
            right: false,
            up: false,
            down: false,
            zoom_in: false,
            zoom_out: false,
            reset: false,
            allow_horizontal: true,
            allow_vertical: true,
        }
    }
}

impl PanInput {
    /// Read the bound keys out of the currently held set
    pub fn from_keys(held: &HeldKeys, keys: &CameraKeys) -> Self {
        let optional = |key: Option<KeyCode>| key.map_or(false, |k| held.is_held(k));
        Self {
            left: held.is_held(keys.left),
            right: held.is_held(keys.right),
            up: held.is_held(keys.up),
            down: held.is_held(keys.down),
            zoom_in: optional(keys.zoom_in),
            zoom_out: optional(keys.zoom_out),
            reset: optional(keys.reset),
            ..Self::default()
        }
    }

    pub fn horizontal_only(mut self) -> Self {
        self.allow_vertical = false;
        self
    }

    pub fn vertical_only(mut self) -> Self {
        self.allow_horizontal = false;
        self
    }
}

/// Key binding for camera control
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraKeys {
    pub up: KeyCode,
    pub left: KeyCode,
    pub down: KeyCode,
    pub right: KeyCode,
    pub zoom_in: Option<KeyCode>,
    pub zoom_out: Option<KeyCode>,
    pub reset: Option<KeyCode>,
}

impl Default for CameraKeys {
    fn default() -> Self {
        Self {
            up: KeyCode::KeyW,
            left: KeyCode::KeyA,
            down: KeyCode::KeyS,
            right: KeyCode::KeyD,
            zoom_in: None,
            zoom_out: None,
            reset: Some(KeyCode::Enter),
        }
    }
}

impl CameraKeys {
    /// Replace the four direction keys, given as (up, left, down, right)
    ///
    /// A binding that reuses a key is rejected and the current one kept.
    pub fn with_directions(mut self, directions: [KeyCode; 4]) -> Self {
        let distinct: HashSet<KeyCode> = directions.iter().copied().collect();
        if distinct.len() != 4 {
            log::warn!("Ignoring camera binding with repeated keys: {:?}", directions);
            return self;
        }
        let [up, left, down, right] = directions;
        self.up = up;
        self.left = left;
        self.down = down;
        self.right = right;
        self
    }

    pub fn with_zoom_keys(mut self, zoom_in: Option<KeyCode>, zoom_out: Option<KeyCode>) -> Self {
        self.zoom_in = zoom_in;
        self.zoom_out = zoom_out;
        self
    }

    pub fn with_reset(mut self, reset: Option<KeyCode>) -> Self {
        self.reset = reset;
        self
    }
}

/// Keys currently held down, fed from window keyboard events
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    keys: HashSet<KeyCode>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.keys.insert(key);
            }
            ElementState::Released => {
                self.keys.remove(&key);
            }
        }
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// Forget everything, e.g. when focus moves to a text field
    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

/// 2D viewport camera with pan and zoom
#[derive(Debug, Clone)]
pub struct Camera2D {
    pub offset: Vec2,
    pub zoom: f32,
    pub viewport: Vec2,
    pub limits: CameraLimits,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Camera2D {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            viewport,
            limits: CameraLimits::none(),
            pan_speed: 30.0,
            zoom_speed: 0.0,
            min_zoom: 1.0,
            max_zoom: 1.0,
        }
    }

    pub fn with_limits(mut self, limits: CameraLimits) -> Self {
        self.limits = limits;
        self.offset = limits.clamp(self.offset);
        self
    }

    pub fn with_pan_speed(mut self, pan_speed: f32) -> Self {
        self.pan_speed = pan_speed.abs();
        self
    }

    /// Enable zooming; bounds that are not positive are ignored
    pub fn with_zoom(mut self, zoom_speed: f32, min_zoom: f32, max_zoom: f32) -> Self {
        self.zoom_speed = zoom_speed.abs();
        if min_zoom > 0.0 && max_zoom > 0.0 {
            self.min_zoom = min_zoom.min(max_zoom);
            self.max_zoom = min_zoom.max(max_zoom);
        } else {
            log::warn!("Ignoring zoom bounds [{}, {}]", min_zoom, max_zoom);
        }
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
        self
    }

    /// Per-frame update from held keys
    pub fn step(&mut self, input: &PanInput) {
        if input.reset {
            self.reset();
            return;
        }

        if input.allow_horizontal {
            let direction = input.right as i32 - input.left as i32;
            let x = self.offset.x + self.pan_speed * direction as f32;
            if self.limits.contains_x(x) {
                self.offset.x = x;
            }
        }

        if input.allow_vertical {
            let up = input.up && self.limits.contains_y(self.offset.y - self.pan_speed);
            let down = input.down && self.limits.contains_y(self.offset.y + self.pan_speed);
            if up {
                self.offset.y -= self.pan_speed;
            }
            if down {
                self.offset.y += self.pan_speed;
            }
        }

        let direction = input.zoom_in as i32 - input.zoom_out as i32;
        self.zoom = (self.zoom + self.zoom_speed * direction as f32).clamp(self.min_zoom, self.max_zoom);
    }

    /// Centre the view on a world point, respecting the limits
    pub fn focus(&mut self, target: Vec2) {
        self.offset = self.limits.clamp(target - self.viewport * 0.5);
    }

    pub fn reset(&mut self) {
        self.offset = self.limits.clamp(Vec2::ZERO);
        self.zoom = 1.0_f32.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn update_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    fn centre(&self) -> Vec2 {
        self.viewport * 0.5
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let c = self.centre();
        (world - self.offset - c) * self.zoom + c
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let c = self.centre();
        (screen - c) / self.zoom + c + self.offset
    }

    /// World-to-screen transform as a matrix
    pub fn view_matrix(&self) -> Mat4 {
        let c = self.centre().extend(0.0);
        Mat4::from_translation(c)
            * Mat4::from_scale(Vec3::new(self.zoom, self.zoom, 1.0))
            * Mat4::from_translation(-(self.offset.extend(0.0) + c))
    }

    /// Pixel space to clip space, y flipped so the origin sits at the top-left
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::orthographic_rh(0.0, self.viewport.x, self.viewport.y, 0.0, -1.0, 1.0)
    }

    /// Get the view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Camera uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera2D) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
        }
    }
}
