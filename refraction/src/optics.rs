//! Reflection and refraction at a flat interface
//!
//! The interface is the horizontal line through the centre of the window and the normal
//! is the vertical line. Light comes from the upper medium (index n1) and enters the
//! lower one (index n2). Angles are in degrees; screen y points down.

use glam::Vec2;
use thiserror::Error;

/// Length of each drawn ray in pixels
pub const RAY_LENGTH: f32 = 400.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OpticsError {
    #[error("Refractive index must be a finite number of at least 1, got {0}")]
    InvalidIndex(f32),

    #[error("{field} is not a number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// A transparent medium
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub name: &'static str,
    pub index: f32,
}

impl Material {
    pub const AIR: Material = Material { name: "Air", index: 1.0 };
    pub const WATER: Material = Material { name: "Water", index: 1.33 };
    pub const GLASS: Material = Material { name: "Glass", index: 1.52 };
    pub const DIAMOND: Material = Material { name: "Diamond", index: 2.42 };

    pub const PRESETS: [Material; 4] = [Self::AIR, Self::WATER, Self::GLASS, Self::DIAMOND];

    pub fn new(name: &'static str, index: f32) -> Result<Self, OpticsError> {
        if !index.is_finite() || index < 1.0 {
            return Err(OpticsError::InvalidIndex(index));
        }
        Ok(Self { name, index })
    }

    /// A preset when `index` matches one, otherwise a custom medium
    pub fn from_index(index: f32) -> Result<Self, OpticsError> {
        let material = Self::new("Custom", index)?;
        Ok(Self::PRESETS
            .into_iter()
            .find(|preset| (preset.index - index).abs() < 1e-6)
            .unwrap_or(material))
    }

    /// Parse a refractive index typed into an entry field
    pub fn parse(field: &'static str, text: &str) -> Result<Self, OpticsError> {
        let text = text.trim();
        let index: f32 = text.parse().map_err(|_| OpticsError::InvalidNumber {
            field,
            value: text.to_string(),
        })?;
        Self::from_index(index)
    }
}

/// Outcome of Snell's law for one incidence angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Refraction {
    /// Refraction angle from the normal, degrees
    Refracted(f32),
    TotalInternal,
}

impl Refraction {
    pub fn angle(&self) -> Option<f32> {
        match self {
            Refraction::Refracted(angle) => Some(*angle),
            Refraction::TotalInternal => None,
        }
    }
}

/// `sin r = n1/n2 · sin i`
pub fn refract(incidence: f32, n1: f32, n2: f32) -> Refraction {
    let sin_r = n1 / n2 * incidence.to_radians().sin();
    if !sin_r.is_finite() || sin_r.abs() > 1.0 {
        return Refraction::TotalInternal;
    }
    Refraction::Refracted(sin_r.asin().to_degrees())
}

/// Incidence angle above which all light is reflected; only exists going into a
/// less dense medium
pub fn critical_angle(n1: f32, n2: f32) -> Option<f32> {
    (n1 > n2).then(|| (n2 / n1).asin().to_degrees())
}

/// Angle of `cursor` around `centre`, degrees in (-180, 180]
pub fn mouse_angle(cursor: Vec2, centre: Vec2) -> f32 {
    let d = cursor - centre;
    d.y.atan2(d.x).to_degrees()
}

/// Incidence angle from the normal for a light source at `angle`
///
/// Only sources in the upper left quadrant cast a ray.
pub fn incidence_from_mouse(angle: f32) -> Option<f32> {
    (-180.0..=-90.0)
        .contains(&angle)
        .then(|| (-90.0 - angle).clamp(0.0, 90.0))
}

/// End points of the three rays, all starting at the centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayGeometry {
    pub incident: Vec2,
    pub reflected: Vec2,
    pub refracted: Option<Vec2>,
    pub incidence: Option<f32>,
    pub refraction: Option<Refraction>,
}

fn polar(centre: Vec2, degrees: f32, length: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    centre + length * Vec2::new(cos, sin)
}

impl RayGeometry {
    /// Rays for a light source at `cursor`
    ///
    /// Outside the upper left quadrant the rays collapse: onto the interface when the
    /// cursor is below it, onto the top of the normal otherwise.
    pub fn trace(cursor: Vec2, viewport: Vec2, n1: f32, n2: f32) -> Self {
        let centre = viewport * 0.5;
        let angle = mouse_angle(cursor, centre);

        let Some(incidence) = incidence_from_mouse(angle) else {
            let (incident, reflected) = if angle > 0.0 {
                (Vec2::new(0.0, centre.y), Vec2::new(viewport.x, centre.y))
            } else {
                (Vec2::new(centre.x, 0.0), Vec2::new(centre.x, 0.0))
            };
            return Self {
                incident,
                reflected,
                refracted: None,
                incidence: None,
                refraction: None,
            };
        };

        let refraction = refract(incidence, n1, n2);
        Self {
            incident: polar(centre, angle, RAY_LENGTH),
            reflected: polar(centre, 180.0 - angle, RAY_LENGTH),
            refracted: refraction
                .angle()
                .map(|r| polar(centre, 90.0 - r, RAY_LENGTH)),
            incidence: Some(incidence),
            refraction: Some(refraction),
        }
    }

    /// Nothing cast yet
    pub fn resting(viewport: Vec2) -> Self {
        let top = Vec2::new(viewport.x * 0.5, 0.0);
        Self {
            incident: top,
            reflected: top,
            refracted: None,
            incidence: None,
            refraction: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;
    const VIEWPORT: Vec2 = Vec2::new(860.0, 646.0);

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < EPSILON, "{} != {}", a, b);
    }

    #[test]
    fn test_mouse_angle_quadrants() {
        let centre = Vec2::new(100.0, 100.0);
        assert_close(mouse_angle(Vec2::new(200.0, 100.0), centre), 0.0);
        assert_close(mouse_angle(Vec2::new(100.0, 0.0), centre), -90.0);
        assert_close(mouse_angle(Vec2::new(0.0, 0.0), centre), -135.0);
        assert_close(mouse_angle(Vec2::new(100.0, 200.0), centre), 90.0);
    }

    #[test]
    fn test_incidence_only_upper_left() {
        assert_eq!(incidence_from_mouse(-90.0), Some(0.0));
        assert_eq!(incidence_from_mouse(-135.0), Some(45.0));
        assert_eq!(incidence_from_mouse(-180.0), Some(90.0));
        assert_eq!(incidence_from_mouse(-45.0), None);
        assert_eq!(incidence_from_mouse(30.0), None);
    }

    #[test]
    fn test_normal_incidence_passes_straight() {
        assert_eq!(refract(0.0, 1.0, 1.52), Refraction::Refracted(0.0));
    }

    #[test]
    fn test_equal_indices_do_not_bend() {
        let r = refract(37.0, 1.33, 1.33).angle().unwrap();
        assert_close(r, 37.0);
    }

    #[test]
    fn test_air_to_glass() {
        let r = refract(30.0, 1.0, 1.52).angle().unwrap();
        assert_close(r, (0.5f32 / 1.52).asin().to_degrees());
        assert!(r < 30.0);
    }

    #[test]
    fn test_path_is_reversible() {
        let r = refract(50.0, 1.0, 1.33).angle().unwrap();
        let back = refract(r, 1.33, 1.0).angle().unwrap();
        assert_close(back, 50.0);
    }

    #[test]
    fn test_total_internal_reflection() {
        assert_eq!(refract(60.0, 1.52, 1.0), Refraction::TotalInternal);
        assert!(refract(30.0, 1.52, 1.0).angle().is_some());
    }

    #[test]
    fn test_critical_angle() {
        let critical = critical_angle(1.52, 1.0).unwrap();
        assert_close(critical, (1.0f32 / 1.52).asin().to_degrees());
        assert!(refract(critical - 0.5, 1.52, 1.0).angle().is_some());
        assert_eq!(refract(critical + 0.5, 1.52, 1.0), Refraction::TotalInternal);
        assert_eq!(critical_angle(1.0, 1.52), None);
        assert_eq!(critical_angle(1.33, 1.33), None);
    }

    #[test]
    fn test_material_validation() {
        assert_eq!(Material::new("Ice", 1.31).unwrap().index, 1.31);
        assert_eq!(Material::new("Bad", 0.5), Err(OpticsError::InvalidIndex(0.5)));
        assert!(Material::new("Bad", f32::NAN).is_err());
        assert!(Material::new("Bad", f32::INFINITY).is_err());
    }

    #[test]
    fn test_parse_material() {
        assert_eq!(Material::parse("N2", "1.52").unwrap(), Material::GLASS);
        assert_eq!(Material::parse("N2", " 1.8 ").unwrap().name, "Custom");
        assert!(matches!(
            Material::parse("N1", "glass"),
            Err(OpticsError::InvalidNumber { field: "N1", .. })
        ));
        assert!(matches!(
            Material::parse("N1", "0.9"),
            Err(OpticsError::InvalidIndex(_))
        ));
    }

    #[test]
    fn test_trace_reflection_mirrors_incident() {
        let centre = VIEWPORT * 0.5;
        let rays = RayGeometry::trace(centre + Vec2::new(-100.0, -100.0), VIEWPORT, 1.0, 1.52);

        assert_close(rays.incidence.unwrap(), 45.0);
        assert_close(rays.incident.x - centre.x, -(rays.reflected.x - centre.x));
        assert_close(rays.incident.y, rays.reflected.y);
        assert_close((rays.incident - centre).length(), RAY_LENGTH);
    }

    #[test]
    fn test_trace_refracted_ray_goes_down_and_right() {
        let centre = VIEWPORT * 0.5;
        let rays = RayGeometry::trace(centre + Vec2::new(-100.0, -100.0), VIEWPORT, 1.0, 1.52);
        let refracted = rays.refracted.unwrap() - centre;

        assert!(refracted.x > 0.0 && refracted.y > 0.0);
        let r = rays.refraction.unwrap().angle().unwrap();
        assert_close(refracted.x.atan2(refracted.y).to_degrees(), r);
    }

    #[test]
    fn test_trace_total_internal_has_no_refracted_ray() {
        let centre = VIEWPORT * 0.5;
        let rays = RayGeometry::trace(centre + Vec2::new(-200.0, -50.0), VIEWPORT, 2.42, 1.0);
        assert_eq!(rays.refraction, Some(Refraction::TotalInternal));
        assert!(rays.refracted.is_none());
    }

    #[test]
    fn test_trace_collapses_outside_quadrant() {
        let centre = VIEWPORT * 0.5;

        let below = RayGeometry::trace(centre + Vec2::new(50.0, 50.0), VIEWPORT, 1.0, 1.52);
        assert_eq!(below.incident, Vec2::new(0.0, centre.y));
        assert_eq!(below.reflected, Vec2::new(VIEWPORT.x, centre.y));
        assert!(below.incidence.is_none());

        let upper_right = RayGeometry::trace(centre + Vec2::new(50.0, -50.0), VIEWPORT, 1.0, 1.52);
        assert_eq!(upper_right, RayGeometry::resting(VIEWPORT));
    }
}
