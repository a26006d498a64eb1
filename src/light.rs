use std::f32::consts::FRAC_PI_2;
use std::fmt;

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Number of lights in the scene; the WGSL light arrays and shadow bindings are sized from it.
pub const LIGHT_COUNT: usize = 4;

/// Lighting model applied by a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

impl LightKind {
    pub const ALL: [LightKind; 3] = [LightKind::Directional, LightKind::Point, LightKind::Spot];

    /// Resolves radio-button style flags. The first set flag wins in the order
    /// directional, point, spot; `None` when no flag is set.
    pub fn from_flags(directional: bool, point: bool, spot: bool) -> Option<Self> {
        if directional {
            Some(Self::Directional)
        } else if point {
            Some(Self::Point)
        } else if spot {
            Some(Self::Spot)
        } else {
            None
        }
    }

    /// One-hot encoding consumed by the lighting shader (`x` directional, `y` point, `z` spot).
    pub fn one_hot(self) -> [f32; 4] {
        match self {
            Self::Directional => [1.0, 0.0, 0.0, 0.0],
            Self::Point => [0.0, 1.0, 0.0, 0.0],
            Self::Spot => [0.0, 0.0, 1.0, 0.0],
        }
    }

    pub fn uses_direction(self) -> bool {
        matches!(self, Self::Directional | Self::Spot)
    }

    pub fn uses_attenuation(self) -> bool {
        matches!(self, Self::Point | Self::Spot)
    }

    /// Exponent and range are only exposed for spot lights.
    pub fn uses_cone(self) -> bool {
        matches!(self, Self::Spot)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Directional => "directional",
            Self::Point => "point",
            Self::Spot => "spot",
        }
    }
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Projection used when rendering a light's shadow map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectionKind {
    Orthographic,
    Perspective,
}

impl ProjectionKind {
    pub const ALL: [ProjectionKind; 2] = [ProjectionKind::Orthographic, ProjectionKind::Perspective];

    pub fn as_f32(self) -> f32 {
        match self {
            Self::Orthographic => 0.0,
            Self::Perspective => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Orthographic => "ortho",
            Self::Perspective => "perspective",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowSettings {
    pub bias: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub soften: bool,
    pub soften_radius: u32,
    pub projection: ProjectionKind,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            bias: 0.003,
            near_plane: 0.1,
            far_plane: 100.0,
            soften: false,
            soften_radius: 3,
            projection: ProjectionKind::Orthographic,
        }
    }
}

/// A scene light and the matrices it last produced for shadow rendering.
///
/// The plain setters store values as given; clamping lives in [`crate::tuning`].
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    kind: LightKind,
    enabled: bool,
    ambient: Vec4,
    diffuse: Vec4,
    specular: Vec4,
    position: Vec3,
    direction: Vec3,
    specular_power: f32,
    range: f32,
    exponent: f32,
    attenuation: Vec3,
    shadow: ShadowSettings,
    view_matrix: Mat4,
    ortho_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            kind: LightKind::Directional,
            enabled: true,
            ambient: Vec4::new(0.0, 0.0, 0.0, 1.0),
            diffuse: Vec4::ONE,
            specular: Vec4::new(0.0, 0.0, 0.0, 1.0),
            position: Vec3::ONE,
            direction: Vec3::new(0.1, -1.0, 0.1),
            specular_power: 1.0,
            range: 1.0,
            exponent: 1.0,
            attenuation: Vec3::new(1.0, 0.0, 0.0),
            shadow: ShadowSettings::default(),
            view_matrix: Mat4::IDENTITY,
            ortho_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        }
    }
}

impl Light {
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn kind(&self) -> LightKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: LightKind) {
        self.kind = kind;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn ambient(&self) -> Vec4 {
        self.ambient
    }

    pub fn set_ambient(&mut self, colour: Vec4) {
        self.ambient = colour;
    }

    pub fn diffuse(&self) -> Vec4 {
        self.diffuse
    }

    pub fn set_diffuse(&mut self, colour: Vec4) {
        self.diffuse = colour;
    }

    pub fn specular(&self) -> Vec4 {
        self.specular
    }

    pub fn set_specular(&mut self, colour: Vec4) {
        self.specular = colour;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction;
    }

    pub fn specular_power(&self) -> f32 {
        self.specular_power
    }

    pub fn set_specular_power(&mut self, power: f32) {
        self.specular_power = power;
    }

    pub fn range(&self) -> f32 {
        self.range
    }

    pub fn set_range(&mut self, range: f32) {
        self.range = range;
    }

    pub fn exponent(&self) -> f32 {
        self.exponent
    }

    pub fn set_exponent(&mut self, exponent: f32) {
        self.exponent = exponent;
    }

    pub fn attenuation(&self) -> Vec3 {
        self.attenuation
    }

    pub fn set_attenuation(&mut self, attenuation: Vec3) {
        self.attenuation = attenuation;
    }

    pub fn shadow(&self) -> &ShadowSettings {
        &self.shadow
    }

    pub fn shadow_mut(&mut self) -> &mut ShadowSettings {
        &mut self.shadow
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn ortho_matrix(&self) -> Mat4 {
        self.ortho_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// The projection the shadow pass renders with, picked by the light's selector.
    pub fn shadow_projection(&self) -> Mat4 {
        match self.shadow.projection {
            ProjectionKind::Orthographic => self.ortho_matrix,
            ProjectionKind::Perspective => self.projection_matrix,
        }
    }

    /// Point the view matrix looks at.
    pub fn look_at_target(&self) -> Vec3 {
        self.position + self.view_direction()
    }

    /// Builds the view matrix looking from `position` toward `position + direction`.
    pub fn generate_view_matrix(&mut self) {
        let direction = self.view_direction();
        let up = if direction.normalize().cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        self.view_matrix = Mat4::look_at_rh(self.position, self.position + direction, up);
    }

    pub fn generate_ortho_matrix(&mut self, width: f32, height: f32, near: f32, far: f32) {
        let (half_w, half_h) = (width * 0.5, height * 0.5);
        self.ortho_matrix = Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, near, far);
    }

    /// Square 90 degree frustum, matching the square shadow maps.
    pub fn generate_projection_matrix(&mut self, near: f32, far: f32) {
        self.projection_matrix = Mat4::perspective_rh(FRAC_PI_2, 1.0, near, far);
    }

    /// Regenerates the view matrix and the projection picked by the selector
    /// using the light's own near and far planes.
    pub fn refresh_shadow_matrices(&mut self, scene_width: f32, scene_height: f32) {
        self.generate_view_matrix();
        let ShadowSettings {
            near_plane,
            far_plane,
            projection,
            ..
        } = self.shadow;
        match projection {
            ProjectionKind::Orthographic => {
                self.generate_ortho_matrix(scene_width, scene_height, near_plane, far_plane)
            }
            ProjectionKind::Perspective => self.generate_projection_matrix(near_plane, far_plane),
        }
    }

    fn view_direction(&self) -> Vec3 {
        if self.direction.length_squared() > f32::EPSILON {
            self.direction
        } else {
            Vec3::NEG_Y
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec3_near(actual: Vec3, expected: Vec3) {
        assert!(
            (actual - expected).length() < 1e-4,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn flags_resolve_first_match() {
        assert_eq!(
            LightKind::from_flags(true, true, false),
            Some(LightKind::Directional)
        );
        assert_eq!(LightKind::from_flags(false, true, true), Some(LightKind::Point));
        assert_eq!(LightKind::from_flags(false, false, true), Some(LightKind::Spot));
        assert_eq!(LightKind::from_flags(false, false, false), None);
    }

    #[test]
    fn view_matrix_looks_along_direction() {
        let mut light = Light::new(LightKind::Spot);
        light.set_position(Vec3::new(6.0, 14.0, 2.0));
        light.set_direction(Vec3::new(0.1, -1.0, 0.1));
        light.generate_view_matrix();

        let target = light.look_at_target();
        assert_vec3_near(target, Vec3::new(6.1, 13.0, 2.1));

        let eye = light.view_matrix().transform_point3(light.position());
        assert_vec3_near(eye, Vec3::ZERO);
        let in_view = light.view_matrix().transform_point3(target);
        assert!(in_view.x.abs() < 1e-4 && in_view.y.abs() < 1e-4);
        assert!(in_view.z < 0.0);
    }

    #[test]
    fn vertical_direction_uses_alternate_up() {
        let mut light = Light::new(LightKind::Directional);
        light.set_position(Vec3::new(0.0, 10.0, 0.0));
        light.set_direction(Vec3::new(0.0, -1.0, 0.0));
        light.generate_view_matrix();
        assert!(light.view_matrix().is_finite());
        let below = light.view_matrix().transform_point3(Vec3::ZERO);
        assert!(below.z < 0.0);
    }

    #[test]
    fn perspective_maps_planes_to_depth_range() {
        let mut light = Light::new(LightKind::Spot);
        light.generate_projection_matrix(0.5, 50.0);
        let near = light.projection_matrix().project_point3(Vec3::new(0.0, 0.0, -0.5));
        let far = light.projection_matrix().project_point3(Vec3::new(0.0, 0.0, -50.0));
        assert!(near.z.abs() < 1e-4);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn ortho_covers_scene_extent() {
        let mut light = Light::default();
        light.generate_ortho_matrix(100.0, 100.0, 0.1, 100.0);
        let corner = light.ortho_matrix().project_point3(Vec3::new(50.0, 50.0, -0.1));
        assert_vec3_near(corner, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn shadow_projection_follows_selector() {
        let mut light = Light::new(LightKind::Spot);
        light.shadow_mut().projection = ProjectionKind::Perspective;
        light.refresh_shadow_matrices(100.0, 100.0);
        assert_eq!(light.shadow_projection(), light.projection_matrix());

        light.shadow_mut().projection = ProjectionKind::Orthographic;
        light.refresh_shadow_matrices(100.0, 100.0);
        assert_eq!(light.shadow_projection(), light.ortho_matrix());
    }
}
