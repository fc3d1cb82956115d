//! Static obstacles placed from the menu
//!
//! Each shape has a base outline that is scaled by an integer multiplier and anchored at
//! the requested position. Circles use the multiplier as their radius.

use glam::Vec2;
use thiserror::Error;

use crate::physics::{Collider, Surface};

/// Collision radius around a line obstacle's segment
pub const LINE_RADIUS: f32 = 20.0;

pub const OBSTACLE_SURFACE: Surface = Surface {
    elasticity: 0.5,
    friction: 0.9,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObstacleError {
    #[error("Please fill the \"{0}\" field")]
    MissingField(&'static str),

    #[error("{field} must be a whole number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("No obstacle named {0:?}")]
    NotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleShape {
    Line,
    Square,
    Rectangle,
    IsoscelesTriangle,
    Trapezoid,
    Circle,
}

impl ObstacleShape {
    pub const ALL: [ObstacleShape; 6] = [
        ObstacleShape::Line,
        ObstacleShape::Square,
        ObstacleShape::Rectangle,
        ObstacleShape::IsoscelesTriangle,
        ObstacleShape::Trapezoid,
        ObstacleShape::Circle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ObstacleShape::Line => "Line",
            ObstacleShape::Square => "Square",
            ObstacleShape::Rectangle => "Rectangle",
            ObstacleShape::IsoscelesTriangle => "IsoscelesTriangle",
            ObstacleShape::Trapezoid => "Trapezoid",
            ObstacleShape::Circle => "Circle",
        }
    }

    /// Outline at multiplier 1
    fn base_vertices(&self) -> &'static [(f32, f32)] {
        match self {
            ObstacleShape::Line => &[(0.0, 0.0), (0.0, 10.0)],
            ObstacleShape::Square => &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            ObstacleShape::Rectangle => &[(0.0, 0.0), (20.0, 0.0), (20.0, 10.0), (0.0, 10.0)],
            ObstacleShape::IsoscelesTriangle => &[(5.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            ObstacleShape::Trapezoid => &[(5.0, 0.0), (10.0, 0.0), (15.0, 20.0), (0.0, 20.0)],
            ObstacleShape::Circle => &[],
        }
    }

    pub fn collider(&self, position: Vec2, multiplier: u32) -> Collider {
        let scale = multiplier as f32;
        let mut points = self
            .base_vertices()
            .iter()
            .map(|&(x, y)| position + Vec2::new(x, y) * scale);

        match self {
            ObstacleShape::Circle => Collider::Circle {
                center: position,
                radius: scale,
            },
            ObstacleShape::Line => Collider::Segment {
                a: points.next().unwrap_or(position),
                b: points.next().unwrap_or(position),
                radius: LINE_RADIUS,
            },
            _ => Collider::Polygon(points.collect()),
        }
    }
}

/// Cycles through the shapes, wrapping at both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShapeSelector {
    index: usize,
}

impl ShapeSelector {
    pub fn current(&self) -> ObstacleShape {
        ObstacleShape::ALL[self.index]
    }

    pub fn next(&mut self) -> ObstacleShape {
        self.index = (self.index + 1) % ObstacleShape::ALL.len();
        self.current()
    }

    pub fn previous(&mut self) -> ObstacleShape {
        let len = ObstacleShape::ALL.len();
        self.index = (self.index + len - 1) % len;
        self.current()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub name: String,
    pub shape: ObstacleShape,
    pub collider: Collider,
    pub surface: Surface,
}

/// A validated request to place an obstacle
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleRequest {
    pub name: String,
    pub shape: ObstacleShape,
    pub multiplier: u32,
    pub position: Vec2,
}

impl ObstacleRequest {
    pub fn build(&self) -> Obstacle {
        Obstacle {
            name: self.name.clone(),
            shape: self.shape,
            collider: self.shape.collider(self.position, self.multiplier),
            surface: OBSTACLE_SURFACE,
        }
    }
}

/// Text of the menu entry fields
#[derive(Debug, Clone, Default)]
pub struct ObstacleForm {
    pub name: String,
    pub multiplier: String,
    pub x: String,
    pub y: String,
}

fn required<'a>(field: &'static str, text: &'a str) -> Result<&'a str, ObstacleError> {
    let text = text.trim();
    if text.is_empty() {
        Err(ObstacleError::MissingField(field))
    } else {
        Ok(text)
    }
}

fn whole_number<T: std::str::FromStr>(field: &'static str, text: &str) -> Result<T, ObstacleError> {
    let text = required(field, text)?;
    text.parse().map_err(|_| ObstacleError::InvalidNumber {
        field,
        value: text.to_string(),
    })
}

impl ObstacleForm {
    /// Validate every field for creating `shape`
    pub fn request(&self, shape: ObstacleShape) -> Result<ObstacleRequest, ObstacleError> {
        let name = required("name", &self.name)?.to_string();
        let multiplier: u32 = whole_number("multiplier", &self.multiplier)?;
        if multiplier == 0 {
            return Err(ObstacleError::InvalidNumber {
                field: "multiplier",
                value: self.multiplier.trim().to_string(),
            });
        }
        let x: i32 = whole_number("x", &self.x)?;
        let y: i32 = whole_number("y", &self.y)?;

        Ok(ObstacleRequest {
            name,
            shape,
            multiplier,
            position: Vec2::new(x as f32, y as f32),
        })
    }

    pub fn name_for_removal(&self) -> Result<&str, ObstacleError> {
        required("name", &self.name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObstacleSet {
    obstacles: Vec<Obstacle>,
}

impl ObstacleSet {
    pub fn add(&mut self, obstacle: Obstacle) {
        log::debug!("Adding obstacle {:?}: {:?}", obstacle.name, obstacle.collider);
        self.obstacles.push(obstacle);
    }

    /// Remove every obstacle called `name`, returning how many went
    pub fn remove_named(&mut self, name: &str) -> Result<usize, ObstacleError> {
        let before = self.obstacles.len();
        self.obstacles.retain(|o| o.name != name);
        match before - self.obstacles.len() {
            0 => Err(ObstacleError::NotFound(name.to_string())),
            removed => Ok(removed),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, multiplier: &str, x: &str, y: &str) -> ObstacleForm {
        ObstacleForm {
            name: name.into(),
            multiplier: multiplier.into(),
            x: x.into(),
            y: y.into(),
        }
    }

    #[test]
    fn test_selector_wraps_both_ways() {
        let mut selector = ShapeSelector::default();
        assert_eq!(selector.current(), ObstacleShape::Line);
        assert_eq!(selector.previous(), ObstacleShape::Circle);
        assert_eq!(selector.next(), ObstacleShape::Line);
        for _ in 0..6 {
            selector.next();
        }
        assert_eq!(selector.current(), ObstacleShape::Line);
    }

    #[test]
    fn test_polygon_shapes_scale_from_position() {
        let collider = ObstacleShape::Trapezoid.collider(Vec2::new(100.0, 50.0), 2);
        assert_eq!(
            collider,
            Collider::Polygon(vec![
                Vec2::new(110.0, 50.0),
                Vec2::new(120.0, 50.0),
                Vec2::new(130.0, 90.0),
                Vec2::new(100.0, 90.0),
            ])
        );

        let Collider::Polygon(triangle) = ObstacleShape::IsoscelesTriangle.collider(Vec2::ZERO, 3) else {
            panic!("triangle should be a polygon");
        };
        assert_eq!(triangle, vec![Vec2::new(15.0, 0.0), Vec2::new(30.0, 30.0), Vec2::new(0.0, 30.0)]);
    }

    #[test]
    fn test_line_and_circle_colliders() {
        assert_eq!(
            ObstacleShape::Line.collider(Vec2::new(10.0, 10.0), 5),
            Collider::Segment {
                a: Vec2::new(10.0, 10.0),
                b: Vec2::new(10.0, 60.0),
                radius: 20.0,
            }
        );
        assert_eq!(
            ObstacleShape::Circle.collider(Vec2::new(10.0, 10.0), 40),
            Collider::Circle {
                center: Vec2::new(10.0, 10.0),
                radius: 40.0,
            }
        );
    }

    #[test]
    fn test_form_requires_every_field() {
        let shape = ObstacleShape::Square;
        assert_eq!(
            form("", "2", "1", "1").request(shape),
            Err(ObstacleError::MissingField("name"))
        );
        assert_eq!(
            form("box", " ", "1", "1").request(shape),
            Err(ObstacleError::MissingField("multiplier"))
        );
        assert_eq!(
            form("box", "2", "1", "").request(shape),
            Err(ObstacleError::MissingField("y"))
        );
    }

    #[test]
    fn test_form_rejects_bad_numbers() {
        let shape = ObstacleShape::Square;
        assert!(matches!(
            form("box", "two", "1", "1").request(shape),
            Err(ObstacleError::InvalidNumber { field: "multiplier", .. })
        ));
        assert!(matches!(
            form("box", "0", "1", "1").request(shape),
            Err(ObstacleError::InvalidNumber { field: "multiplier", .. })
        ));
        assert!(matches!(
            form("box", "2", "1.5", "1").request(shape),
            Err(ObstacleError::InvalidNumber { field: "x", .. })
        ));
        assert!(matches!(
            form("box", "-2", "1", "1").request(shape),
            Err(ObstacleError::InvalidNumber { field: "multiplier", .. })
        ));
    }

    #[test]
    fn test_position_may_be_negative_or_zero() {
        let request = form("ledge", "2", "-40", "0")
            .request(ObstacleShape::Square)
            .unwrap();
        assert_eq!(request.position, Vec2::new(-40.0, 0.0));
    }

    #[test]
    fn test_form_builds_request() {
        let request = form(" wall ", "3", "400", "250")
            .request(ObstacleShape::Rectangle)
            .unwrap();
        assert_eq!(request.name, "wall");
        assert_eq!(request.multiplier, 3);
        assert_eq!(request.position, Vec2::new(400.0, 250.0));
        assert_eq!(request.build().surface, OBSTACLE_SURFACE);
    }

    #[test]
    fn test_remove_by_name_removes_all_matches() {
        let mut set = ObstacleSet::default();
        for (name, x) in [("a", "10"), ("b", "20"), ("a", "30")] {
            let request = form(name, "2", x, "10").request(ObstacleShape::Square).unwrap();
            set.add(request.build());
        }

        assert_eq!(set.remove_named("a"), Ok(2));
        assert_eq!(set.len(), 1);
        assert_eq!(set.remove_named("a"), Err(ObstacleError::NotFound("a".into())));
        assert_eq!(set.remove_named("b"), Ok(1));
        assert!(set.is_empty());
    }
}
