//! Camera tracking of the falling block

use common::Camera2D;
use glam::Vec2;

use crate::physics::FallingBody;

/// Keep the block centred while it falls; back to the start view on the landing update
pub fn follow_fall(camera: &mut Camera2D, body: &FallingBody, landed: bool) {
    if landed {
        log::debug!("Fall over, resetting camera");
        camera.reset();
    } else if body.is_falling() {
        let centre = body.kinematic.position - Vec2::new(0.0, body.size * 0.5);
        camera.focus(centre);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::CameraLimits;

    #[test]
    fn test_camera_follows_then_resets_on_landing() {
        let mut camera = Camera2D::new(Vec2::new(700.0, 675.0)).with_limits(CameraLimits::locked_x());
        let mut body = FallingBody::new(675.0, 0.01);
        body.set_height(500.0, 350.0);
        body.start_drop(9.8, (2.0 * 500.0 / 9.8_f32).sqrt()).unwrap();

        let mut deepest = 0.0_f32;
        for _ in 0..1000 {
            let landed = body.update(1.0 / 60.0).unwrap();
            follow_fall(&mut camera, &body, landed);
            deepest = deepest.max(camera.offset.y);
            assert_eq!(camera.offset.x, 0.0);
            if landed {
                break;
            }
        }

        assert!(!body.is_falling());
        assert!(deepest > 300.0, "camera never followed, deepest = {}", deepest);
        assert_eq!(camera.offset, Vec2::ZERO);
    }

    #[test]
    fn test_idle_block_leaves_camera_alone() {
        let mut camera = Camera2D::new(Vec2::new(700.0, 675.0));
        camera.offset = Vec2::new(0.0, 40.0);
        let mut body = FallingBody::new(675.0, 0.01);
        body.set_height(100.0, 350.0);

        follow_fall(&mut camera, &body, false);
        assert_eq!(camera.offset, Vec2::new(0.0, 40.0));
    }
}
