use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

use crate::input::{InputState, KeyCode, NamedKey};

/// Eye of the fixed view used for full-screen quads.
const ORTHO_EYE: Vec3 = Vec3::new(0.0, 0.0, 10.0);
const TURN_SPEED: f32 = 1.5;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// First-person fly camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    speed: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 18.0, -30.0),
            yaw: 0.0,
            pitch: -0.35,
            speed: 3.0,
        }
    }
}

impl Camera {
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.1).min(15.0);
    }

    /// Unit view direction; yaw 0 faces +Z.
    pub fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn ortho_view_matrix() -> Mat4 {
        Mat4::look_at_rh(ORTHO_EYE, Vec3::ZERO, Vec3::Y)
    }

    pub fn turn(&mut self, yaw: f32, pitch: f32) {
        self.yaw = (self.yaw + yaw).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// WASD moves, Q/E sink and rise, arrow keys look around.
    pub fn update(&mut self, input: &InputState, dt: f32) {
        let key = |c| input.is_key_down(KeyCode::Character(c));
        let named = |k| input.is_key_down(KeyCode::Named(k));

        let mut movement = Vec3::ZERO;
        if key('W') {
            movement += self.forward();
        }
        if key('S') {
            movement -= self.forward();
        }
        if key('D') {
            movement += self.right();
        }
        if key('A') {
            movement -= self.right();
        }
        if key('E') {
            movement += Vec3::Y;
        }
        if key('Q') {
            movement -= Vec3::Y;
        }
        self.position += movement.normalize_or_zero() * self.speed * dt;

        let mut yaw = 0.0;
        let mut pitch = 0.0;
        if named(NamedKey::Left) {
            yaw += TURN_SPEED * dt;
        }
        if named(NamedKey::Right) {
            yaw -= TURN_SPEED * dt;
        }
        if named(NamedKey::Up) {
            pitch += TURN_SPEED * dt;
        }
        if named(NamedKey::Down) {
            pitch -= TURN_SPEED * dt;
        }
        if yaw != 0.0 || pitch != 0.0 {
            self.turn(yaw, pitch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_is_clamped() {
        let mut camera = Camera::default();
        camera.set_speed(100.0);
        assert_eq!(camera.speed(), 15.0);
        camera.set_speed(0.0);
        assert_eq!(camera.speed(), 0.1);
    }

    #[test]
    fn moves_forward_at_speed() {
        let mut camera = Camera::default();
        camera.turn(0.0, 0.35);
        let start = camera.position();
        let mut input = InputState::new();
        input.set_key_down(KeyCode::Character('W'));
        camera.update(&input, 1.0);
        let moved = camera.position() - start;
        assert!((moved.length() - 3.0).abs() < 1e-4);
        assert!(moved.z > 2.9);
    }

    #[test]
    fn pitch_never_flips() {
        let mut camera = Camera::default();
        camera.turn(0.0, 10.0);
        assert!(camera.forward().y < 1.0);
        assert!(camera.view_matrix().is_finite());
    }

    #[test]
    fn ortho_view_sees_origin() {
        let origin = Camera::ortho_view_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-5);
    }
}
