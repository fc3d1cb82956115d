//! Rigid circles in a walled box
//!
//! Projectiles are dynamic circles falling under gravity. They collide with the four
//! walls of the box, with static obstacles and with each other. Contacts are resolved
//! by pushing the circle out along the contact normal and applying a restitution
//! impulse. Elasticity and friction of the two surfaces are multiplied together.

use common::{euler_step, FixedStep, Kinematic, PhysicsError};
use glam::Vec2;
use rand::Rng;

use crate::obstacles::ObstacleSet;

pub const DENSITY: f32 = 0.1;
pub const PROJECTILE_ELASTICITY: f32 = 0.5;
pub const PROJECTILE_FRICTION: f32 = 0.9;
pub const WALL_RADIUS: f32 = 4.0;

pub const WALLS: Surface = Surface {
    elasticity: 1.0,
    friction: 1.0,
};

// Fraction of the tangential speed removed per contact at friction 1
const FRICTION_SCALE: f32 = 0.05;
// Approach speeds below this settle instead of bouncing, px/s
const REST_SPEED: f32 = 30.0;
const SPIN_DAMPING: f32 = 0.995;

pub type ProjectileId = u64;

/// Elasticity and friction of a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub elasticity: f32,
    pub friction: f32,
}

/// Penetration of a circle into something; `normal` points out towards the circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub normal: Vec2,
    pub depth: f32,
}

/// Static collision geometry in world coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum Collider {
    Circle { center: Vec2, radius: f32 },
    Segment { a: Vec2, b: Vec2, radius: f32 },
    /// Convex polygon, either winding
    Polygon(Vec<Vec2>),
}

fn closest_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

fn contact_from_offset(offset: Vec2, reach: f32, fallback: Vec2) -> Option<Contact> {
    let dist = offset.length();
    if dist >= reach {
        return None;
    }
    let normal = if dist > f32::EPSILON { offset / dist } else { fallback };
    Some(Contact {
        normal,
        depth: reach - dist,
    })
}

impl Collider {
    pub fn contact(&self, center: Vec2, radius: f32) -> Option<Contact> {
        match self {
            Collider::Circle { center: c, radius: r } => {
                contact_from_offset(center - *c, radius + r, Vec2::NEG_Y)
            }
            Collider::Segment { a, b, radius: r } => {
                let closest = closest_on_segment(center, *a, *b);
                let fallback = (*b - *a).perp().normalize_or_zero();
                contact_from_offset(center - closest, radius + r, fallback)
            }
            Collider::Polygon(points) => polygon_contact(points, center, radius),
        }
    }

    /// Axis-aligned extent, used for drawing labels
    pub fn bounding_box(&self) -> (Vec2, Vec2) {
        match self {
            Collider::Circle { center, radius } => (*center - *radius, *center + *radius),
            Collider::Segment { a, b, radius } => (a.min(*b) - *radius, a.max(*b) + *radius),
            Collider::Polygon(points) => points.iter().fold(
                (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
                |(lo, hi), p| (lo.min(*p), hi.max(*p)),
            ),
        }
    }
}

fn polygon_contact(points: &[Vec2], center: Vec2, radius: f32) -> Option<Contact> {
    if points.len() < 3 {
        return None;
    }
    let centroid = points.iter().copied().sum::<Vec2>() / points.len() as f32;

    // Deepest face first: positive separation means the centre is outside that face
    let mut max_separation = f32::MIN;
    let mut face_normal = Vec2::NEG_Y;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        let mut normal = (b - *a).perp().normalize_or_zero();
        if normal.dot((*a + b) * 0.5 - centroid) < 0.0 {
            normal = -normal;
        }
        let separation = (center - *a).dot(normal);
        if separation > max_separation {
            max_separation = separation;
            face_normal = normal;
        }
    }

    if max_separation > radius {
        return None;
    }
    if max_separation <= 0.0 {
        return Some(Contact {
            normal: face_normal,
            depth: radius - max_separation,
        });
    }

    let closest = points
        .iter()
        .enumerate()
        .map(|(i, a)| closest_on_segment(center, *a, points[(i + 1) % points.len()]))
        .min_by(|p, q| {
            center
                .distance_squared(*p)
                .total_cmp(&center.distance_squared(*q))
        })?;
    contact_from_offset(center - closest, radius, face_normal)
}

/// A dynamic circle
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: ProjectileId,
    pub kinematic: Kinematic,
    pub radius: f32,
    pub mass: f32,
    pub angle: f32,
    pub angular_velocity: f32,
    pub color: [f32; 4],
}

impl Projectile {
    pub fn new(id: ProjectileId, position: Vec2, radius: f32, color: [f32; 4]) -> Self {
        Self {
            id,
            kinematic: Kinematic::at_rest(position),
            radius,
            mass: DENSITY * std::f32::consts::PI * radius * radius,
            angle: 0.0,
            angular_velocity: 0.0,
            color,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.kinematic.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.kinematic.velocity
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.position().distance(point) < self.radius
    }

    /// Apply an impulse at the centre: `Δv = J / m`
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.kinematic.velocity += impulse / self.mass;
    }

    fn surface(&self) -> Surface {
        Surface {
            elasticity: PROJECTILE_ELASTICITY,
            friction: PROJECTILE_FRICTION,
        }
    }

    /// Push out of a static contact and bounce off it
    fn resolve_static(&mut self, contact: Contact, other: Surface) {
        let mine = self.surface();
        let elasticity = mine.elasticity * other.elasticity;
        let friction = mine.friction * other.friction;

        self.kinematic.position += contact.normal * contact.depth;

        let velocity = self.kinematic.velocity;
        let normal_speed = velocity.dot(contact.normal);
        if normal_speed >= 0.0 {
            return;
        }
        let bounce = if -normal_speed < REST_SPEED { 0.0 } else { elasticity };
        let normal_part = contact.normal * normal_speed;
        let tangent_part = (velocity - normal_part) * (1.0 - friction * FRICTION_SCALE);
        self.kinematic.velocity = tangent_part - normal_part * bounce;

        // Roll along the surface
        let tangent = contact.normal.perp();
        self.angular_velocity = -tangent_part.dot(tangent) / self.radius;
    }
}

/// The walled box, inner edges at `min` and `max`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Contacts of a circle with the walls it overlaps
    ///
    /// Walls are half planes, so a circle that got past one is still pushed back in.
    pub fn contacts(&self, center: Vec2, radius: f32) -> impl Iterator<Item = Contact> {
        let reach = radius + WALL_RADIUS;
        [
            (Vec2::X, center.x - self.min.x),
            (Vec2::NEG_X, self.max.x - center.x),
            (Vec2::Y, center.y - self.min.y),
            (Vec2::NEG_Y, self.max.y - center.y),
        ]
        .into_iter()
        .filter(move |(_, distance)| *distance < reach)
        .map(move |(normal, distance)| Contact {
            normal,
            depth: reach - distance,
        })
    }
}

fn resolve_pair(a: &mut Projectile, b: &mut Projectile) {
    let offset = a.position() - b.position();
    let Some(contact) = contact_from_offset(offset, a.radius + b.radius, Vec2::NEG_Y) else {
        return;
    };

    let inv_a = 1.0 / a.mass;
    let inv_b = 1.0 / b.mass;
    let inv_sum = inv_a + inv_b;
    let correction = contact.normal * contact.depth / inv_sum;
    a.kinematic.position += correction * inv_a;
    b.kinematic.position -= correction * inv_b;

    let relative = a.velocity() - b.velocity();
    let normal_speed = relative.dot(contact.normal);
    if normal_speed >= 0.0 {
        return;
    }
    let elasticity = PROJECTILE_ELASTICITY * PROJECTILE_ELASTICITY;
    let j = -(1.0 + elasticity) * normal_speed / inv_sum;
    a.kinematic.velocity += contact.normal * j * inv_a;
    b.kinematic.velocity -= contact.normal * j * inv_b;
}

/// Projectiles, obstacles and walls stepped at a fixed rate
pub struct World {
    pub gravity: Vec2,
    pub bounds: Bounds,
    pub obstacles: ObstacleSet,
    projectiles: Vec<Projectile>,
    clock: FixedStep,
    next_id: ProjectileId,
}

impl World {
    pub fn new(gravity: Vec2, bounds: Bounds, step: f32) -> Self {
        Self {
            gravity,
            bounds,
            obstacles: ObstacleSet::default(),
            projectiles: Vec::new(),
            clock: FixedStep::new(step),
            next_id: 0,
        }
    }

    pub fn spawn(&mut self, position: Vec2, radius: f32) -> ProjectileId {
        let mut rng = rand::thread_rng();
        let color = [
            rng.gen_range(0.2..0.9),
            rng.gen_range(0.2..0.9),
            rng.gen_range(0.2..0.9),
            1.0,
        ];
        self.spawn_with_color(position, radius, color)
    }

    pub fn spawn_with_color(&mut self, position: Vec2, radius: f32, color: [f32; 4]) -> ProjectileId {
        let id = self.next_id;
        self.next_id += 1;
        self.projectiles
            .push(Projectile::new(id, position, radius, color));
        log::debug!("Spawned projectile {} at {:?}, radius {}", id, position, radius);
        id
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    pub fn remove(&mut self, id: ProjectileId) -> bool {
        let before = self.projectiles.len();
        self.projectiles.retain(|p| p.id != id);
        self.projectiles.len() != before
    }

    /// Topmost projectile under `point`
    pub fn projectile_at(&self, point: Vec2) -> Option<ProjectileId> {
        self.projectiles
            .iter()
            .rev()
            .find(|p| p.contains(point))
            .map(|p| p.id)
    }

    pub fn apply_impulse(&mut self, id: ProjectileId, impulse: Vec2) -> bool {
        match self.projectiles.iter_mut().find(|p| p.id == id) {
            Some(projectile) => {
                projectile.apply_impulse(impulse);
                true
            }
            None => false,
        }
    }

    /// Run the fixed steps due after `frame_dt` seconds
    pub fn update(&mut self, frame_dt: f32) -> Result<u32, PhysicsError> {
        let ticks = self.clock.advance(frame_dt)?;
        let dt = self.clock.step();
        for _ in 0..ticks {
            self.step(dt)?;
        }
        Ok(ticks)
    }

    pub fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        let mut failed = Vec::new();
        for projectile in &mut self.projectiles {
            if euler_step(&mut projectile.kinematic, self.gravity, dt).is_err() {
                failed.push(projectile.id);
            }
            projectile.angle += projectile.angular_velocity * dt;
            projectile.angular_velocity *= SPIN_DAMPING;
        }
        if !failed.is_empty() {
            self.projectiles.retain(|p| !failed.contains(&p.id));
            return Err(PhysicsError::NonFiniteState);
        }

        for i in 0..self.projectiles.len() {
            let (head, tail) = self.projectiles.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail {
                resolve_pair(a, b);
            }
        }

        for projectile in &mut self.projectiles {
            for obstacle in self.obstacles.iter() {
                if let Some(contact) = obstacle.collider.contact(projectile.position(), projectile.radius) {
                    projectile.resolve_static(contact, obstacle.surface);
                }
            }
            let contacts: Vec<Contact> = self
                .bounds
                .contacts(projectile.position(), projectile.radius)
                .collect();
            for contact in contacts {
                projectile.resolve_static(contact, WALLS);
            }
        }
        Ok(())
    }
}

/// Pull-and-release launcher for the active projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slingshot {
    active: Option<ProjectileId>,
    pulling: bool,
    impulse_scale: f32,
}

impl Slingshot {
    pub fn new(impulse_scale: f32) -> Self {
        Self {
            active: None,
            pulling: false,
            impulse_scale,
        }
    }

    pub fn active(&self) -> Option<ProjectileId> {
        self.active
    }

    pub fn is_pulling(&self) -> bool {
        self.pulling
    }

    /// Select the projectile under `point`, or clear the selection
    pub fn press(&mut self, world: &World, point: Vec2) {
        self.active = world.projectile_at(point);
        self.pulling = self.active.is_some();
    }

    /// Launch toward `cursor`; returns the applied impulse
    pub fn release(&mut self, world: &mut World, cursor: Vec2) -> Option<Vec2> {
        if !self.pulling {
            return None;
        }
        self.pulling = false;
        let id = self.active?;
        let position = world.get(id)?.position();
        let impulse = self.impulse_scale * (cursor - position);
        world.apply_impulse(id, impulse);
        log::info!("Launched projectile {} with impulse {:?}", id, impulse);
        Some(impulse)
    }

    /// Delete the active projectile from the world
    pub fn remove_active(&mut self, world: &mut World) -> bool {
        self.pulling = false;
        match self.active.take() {
            Some(id) => world.remove(id),
            None => false,
        }
    }

    /// Forget a projectile that no longer exists
    pub fn forget_missing(&mut self, world: &World) {
        if let Some(id) = self.active {
            if world.get(id).is_none() {
                self.active = None;
                self.pulling = false;
            }
        }
    }
}
