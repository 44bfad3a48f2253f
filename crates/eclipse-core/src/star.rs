//! Star kinematics: a bouncing target and a rendered position that chases it.

use std::f32::consts::TAU;

use eclipse_platform::Rgba;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// How stars move, picked once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionPolicy {
    Drift,
    /// Push stars out of a disc around the pointer before drifting.
    AvoidPointer { keep_distance: f32 },
}

/// How stars are drawn, picked once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPolicy {
    Disc { segments: u32 },
    Hidden,
}

/// Area in which targets bounce: the viewport grown by a margin on every side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn around_viewport(size: Vec2, margin: f32) -> Self {
        Self {
            min: Vec2::splat(-margin),
            max: size + Vec2::splat(margin),
        }
    }

    /// Divisor that maps a y coordinate onto the background gradient.
    pub fn gradient_extent(&self) -> f32 {
        self.max.y
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    /// Rendered location, smoothed toward `target`.
    pub pos: Vec2,
    pub target: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: Rgba,
}

impl Star {
    pub fn new(pos: Vec2, speed: f32, angle: f32, radius: f32, color: Rgba) -> Self {
        Self {
            pos,
            target: pos,
            vel: Vec2::from_angle(angle) * speed,
            radius,
            color,
        }
    }

    /// Move the target at constant velocity and pull the position toward it.
    ///
    /// The pull factor is `dt` itself, so the amount of smoothing depends on the
    /// frame rate. Targets are not clamped here, see [`Star::correct_heading`].
    pub fn drift(&mut self, dt: f32) {
        self.target += self.vel * dt;
        self.pos += (self.target - self.pos) * dt;
    }

    /// Place the star on the keep-distance circle if it sits strictly inside it.
    pub fn avoid_pointer(&mut self, pointer: Vec2, keep_distance: f32) {
        let offset = pointer - self.pos;
        let dist_sq = offset.length_squared();
        if dist_sq != 0.0 && dist_sq < keep_distance * keep_distance {
            let ratio = keep_distance / dist_sq.sqrt();
            self.pos = pointer - offset * ratio;
        }
    }

    pub fn advance(&mut self, dt: f32, pointer: Option<Vec2>, policy: MotionPolicy) {
        if let (MotionPolicy::AvoidPointer { keep_distance }, Some(pointer)) = (policy, pointer) {
            self.avoid_pointer(pointer, keep_distance);
        }
        self.drift(dt);
    }

    /// Point the velocity back inside `bounds` when the target has left them.
    /// Only the sign changes; a target exactly on an edge is left alone.
    pub fn correct_heading(&mut self, bounds: &Bounds) {
        if self.target.x < bounds.min.x {
            self.vel.x = self.vel.x.abs();
        } else if self.target.x > bounds.max.x {
            self.vel.x = -self.vel.x.abs();
        }

        if self.target.y < bounds.min.y {
            self.vel.y = self.vel.y.abs();
        } else if self.target.y > bounds.max.y {
            self.vel.y = -self.vel.y.abs();
        }
    }

    /// Write the disc outline as a triangle fan: hub, then `segments + 1` rim
    /// points with the first repeated to close it.
    pub fn disc_fan(&self, segments: u32, out: &mut Vec<Vec2>) {
        let segments = segments.max(3);
        out.clear();
        out.push(self.pos);
        for i in 0..=segments {
            let theta = TAU * i as f32 / segments as f32;
            out.push(self.pos + Vec2::from_angle(theta) * self.radius);
        }
    }
}

/// Random source for seeding stars.
pub struct StarRng(pub StdRng);

impl StarRng {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Uniform in `[low, high)`, or `low` for an empty range.
    pub fn uniform(&mut self, low: f32, high: f32) -> f32 {
        if high > low {
            self.0.gen_range(low..high)
        } else {
            low
        }
    }
}

/// Parameters shared by every star at spawn time.
#[derive(Debug, Clone, Copy)]
pub struct SpawnParams {
    pub count: usize,
    pub radius: f32,
    pub color: Rgba,
    pub min_speed: f32,
    pub max_speed: f32,
}

pub fn spawn_stars(params: &SpawnParams, bounds: &Bounds, rng: &mut StarRng) -> Vec<Star> {
    (0..params.count)
        .map(|_| {
            let pos = Vec2::new(
                rng.uniform(bounds.min.x, bounds.max.x),
                rng.uniform(bounds.min.y, bounds.max.y),
            );
            let speed = rng.uniform(params.min_speed, params.max_speed);
            let angle = rng.uniform(0.0, TAU);
            Star::new(pos, speed, angle, params.radius, params.color)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still_star(pos: Vec2, target: Vec2) -> Star {
        Star {
            pos,
            target,
            vel: Vec2::ZERO,
            radius: 2.0,
            color: Rgba::ONE,
        }
    }

    #[test]
    fn drift_moves_target_by_velocity() {
        let mut star = Star::new(Vec2::new(10.0, 10.0), 5.0, 0.0, 1.0, Rgba::ONE);
        star.drift(0.5);
        assert!((star.target - Vec2::new(12.5, 10.0)).length() < 1e-5);
        // pos pulled by dt * (target - pos)
        assert!((star.pos - Vec2::new(11.25, 10.0)).length() < 1e-5);
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let mut star = Star::new(Vec2::new(3.0, 4.0), 9.0, 1.0, 1.0, Rgba::ONE);
        let before = star.clone();
        star.drift(0.0);
        assert_eq!(star, before);
    }

    #[test]
    fn zero_velocity_approaches_target_without_overshoot() {
        let target = Vec2::new(100.0, -40.0);
        for dt in [0.0, 0.016, 0.1, 0.5, 1.0] {
            let mut star = still_star(Vec2::ZERO, target);
            let mut last = star.pos.distance(target);
            for _ in 0..20 {
                star.drift(dt);
                assert_eq!(star.target, target);
                let now = star.pos.distance(target);
                assert!(now <= last + 1e-4, "dt {dt}: {now} > {last}");
                assert!(star.pos.x <= target.x + 1e-4);
                last = now;
            }
        }
    }

    #[test]
    fn pointer_pushes_star_onto_keep_distance_circle() {
        let pointer = Vec2::new(50.0, 50.0);
        let mut star = still_star(Vec2::new(53.0, 54.0), Vec2::new(53.0, 54.0));
        star.avoid_pointer(pointer, 10.0);
        assert!((star.pos.distance(pointer) - 10.0).abs() < 1e-4);
        // still on the same side of the pointer
        assert!((star.pos - pointer).normalize().dot(Vec2::new(0.6, 0.8)) > 0.999);
    }

    #[test]
    fn pointer_ignores_far_and_coincident_stars() {
        let pointer = Vec2::new(50.0, 50.0);
        let mut far = still_star(Vec2::new(80.0, 50.0), Vec2::ZERO);
        far.avoid_pointer(pointer, 10.0);
        assert_eq!(far.pos, Vec2::new(80.0, 50.0));

        let mut on_top = still_star(pointer, Vec2::ZERO);
        on_top.avoid_pointer(pointer, 10.0);
        assert_eq!(on_top.pos, pointer);

        let mut on_edge = still_star(Vec2::new(60.0, 50.0), Vec2::ZERO);
        on_edge.avoid_pointer(pointer, 10.0);
        assert_eq!(on_edge.pos, Vec2::new(60.0, 50.0));
    }

    #[test]
    fn advance_applies_pointer_before_drift() {
        let pointer = Vec2::new(0.0, 0.0);
        let mut star = still_star(Vec2::new(1.0, 0.0), Vec2::new(20.0, 0.0));
        star.advance(0.5, Some(pointer), MotionPolicy::AvoidPointer { keep_distance: 10.0 });
        // pushed to x = 10, then halfway toward the target
        assert!((star.pos.x - 15.0).abs() < 1e-4);

        let mut drifting = still_star(Vec2::new(1.0, 0.0), Vec2::new(20.0, 0.0));
        drifting.advance(0.5, Some(pointer), MotionPolicy::Drift);
        assert!((drifting.pos.x - 10.5).abs() < 1e-4);

        let mut no_pointer = still_star(Vec2::new(1.0, 0.0), Vec2::new(20.0, 0.0));
        no_pointer.advance(0.5, None, MotionPolicy::AvoidPointer { keep_distance: 10.0 });
        assert!((no_pointer.pos.x - 10.5).abs() < 1e-4);
    }

    #[test]
    fn heading_flips_only_outside_bounds() {
        let bounds = Bounds::around_viewport(Vec2::new(100.0, 50.0), 10.0);
        let mut star = still_star(Vec2::ZERO, Vec2::new(-10.0, -10.0));
        star.vel = Vec2::new(-3.0, -4.0);
        star.correct_heading(&bounds);
        assert_eq!(star.vel, Vec2::new(-3.0, -4.0), "edges are inclusive");

        star.target = Vec2::new(-10.5, 60.5);
        star.vel = Vec2::new(-3.0, 4.0);
        star.correct_heading(&bounds);
        assert_eq!(star.vel, Vec2::new(3.0, -4.0));

        star.target = Vec2::new(111.0, -11.0);
        star.correct_heading(&bounds);
        assert_eq!(star.vel, Vec2::new(-3.0, 4.0));

        // already heading back: unchanged
        star.correct_heading(&bounds);
        assert_eq!(star.vel, Vec2::new(-3.0, 4.0));
    }

    #[test]
    fn target_exactly_on_max_edges_keeps_heading() {
        let bounds = Bounds::around_viewport(Vec2::new(100.0, 50.0), 10.0);
        let mut star = still_star(Vec2::ZERO, Vec2::new(110.0, 60.0));
        star.vel = Vec2::new(3.0, 4.0);
        star.correct_heading(&bounds);
        assert_eq!(star.vel, Vec2::new(3.0, 4.0));

        star.target = Vec2::new(110.0, 30.0);
        star.correct_heading(&bounds);
        assert_eq!(star.vel, Vec2::new(3.0, 4.0));

        star.target = Vec2::new(50.0, 60.0);
        star.correct_heading(&bounds);
        assert_eq!(star.vel, Vec2::new(3.0, 4.0));

        // one step past either edge flips that axis only
        star.target = Vec2::new(110.001, 60.0);
        star.correct_heading(&bounds);
        assert_eq!(star.vel, Vec2::new(-3.0, 4.0));
        star.target = Vec2::new(110.0, 60.001);
        star.correct_heading(&bounds);
        assert_eq!(star.vel, Vec2::new(-3.0, -4.0));
    }

    #[test]
    fn disc_fan_closes_the_rim() {
        let star = still_star(Vec2::new(5.0, 5.0), Vec2::ZERO);
        let mut fan = Vec::new();
        star.disc_fan(8, &mut fan);
        assert_eq!(fan.len(), 10);
        assert_eq!(fan[0], star.pos);
        assert!(fan[1].distance(fan[9]) < 1e-4);
        for rim in &fan[1..] {
            assert!((rim.distance(star.pos) - star.radius).abs() < 1e-4);
        }

        star.disc_fan(1, &mut fan);
        assert_eq!(fan.len(), 5);
    }

    #[test]
    fn spawned_stars_start_inside_bounds_with_configured_speed() {
        let bounds = Bounds::around_viewport(Vec2::new(640.0, 480.0), 20.0);
        let params = SpawnParams {
            count: 200,
            radius: 1.5,
            color: Rgba::new(1.0, 1.0, 1.0, 0.5),
            min_speed: 4.0,
            max_speed: 9.0,
        };
        let stars = spawn_stars(&params, &bounds, &mut StarRng::new(7));
        assert_eq!(stars.len(), 200);
        for star in &stars {
            assert_eq!(star.pos, star.target);
            assert!(star.pos.cmpge(bounds.min).all() && star.pos.cmplt(bounds.max).all());
            let speed = star.vel.length();
            assert!((4.0 - 1e-3..9.0 + 1e-3).contains(&speed), "speed {speed}");
            assert_eq!(star.radius, 1.5);
        }
    }

    #[test]
    fn same_seed_same_sky() {
        let bounds = Bounds::around_viewport(Vec2::new(64.0, 48.0), 0.0);
        let params = SpawnParams {
            count: 16,
            radius: 1.0,
            color: Rgba::ONE,
            min_speed: 2.0,
            max_speed: 2.0,
        };
        let a = spawn_stars(&params, &bounds, &mut StarRng::new(99));
        let b = spawn_stars(&params, &bounds, &mut StarRng::new(99));
        assert_eq!(a, b);
        assert!(a.iter().all(|s| (s.vel.length() - 2.0).abs() < 1e-4));
    }
}
