//! Clamped read-modify-write access to every live-tunable value.
//!
//! The debug panel and the command line never touch a [`Light`] or the
//! [`SceneTunables`] fields directly; everything goes through the setters here
//! so that out-of-range input is clamped at the boundary.

use std::fmt;

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::light::{Light, LightKind, ProjectionKind};

/// Step applied by the near/far correction when the planes cross.
pub const PLANE_STEP: f32 = 0.1;
pub const MAX_FAR_PLANE: f32 = 100.0;
pub const MIN_NEAR_PLANE: f32 = 0.1;

// NaN collapses to the lower bound instead of propagating.
fn clamp_to(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

fn clamp_vec3(value: Vec3, min: f32, max: f32) -> Vec3 {
    Vec3::new(
        clamp_to(value.x, min, max),
        clamp_to(value.y, min, max),
        clamp_to(value.z, min, max),
    )
}

fn clamp_colour(value: Vec4) -> Vec4 {
    Vec4::new(
        clamp_to(value.x, 0.0, 1.0),
        clamp_to(value.y, 0.0, 1.0),
        clamp_to(value.z, 0.0, 1.0),
        clamp_to(value.w, 0.0, 1.0),
    )
}

/// Applies the near/far ordering rule: if `near >= far` pull near back by one
/// step, then if `far <= near` push far forward by one step.
pub fn correct_planes(mut near: f32, mut far: f32) -> (f32, f32) {
    if near >= far {
        near -= PLANE_STEP;
    }
    if far <= near {
        far += PLANE_STEP;
    }
    (near, far)
}

/// Clamps a requested pair of shadow planes and restores `near < far`.
///
/// Near is bounded by `[0.1, far - 0.1]` and far by `[near + 0.1, 100]`
/// before the ordering rule runs.
pub fn clamp_planes(near: f32, far: f32) -> (f32, f32) {
    let far = clamp_to(far, MIN_NEAR_PLANE + PLANE_STEP, MAX_FAR_PLANE);
    let near = clamp_to(near, MIN_NEAR_PLANE, far - PLANE_STEP);
    let far = clamp_to(far, near + PLANE_STEP, MAX_FAR_PLANE);
    correct_planes(near, far)
}

/// How the lit pass colours fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderMode {
    TexturesPerPixel,
    NormalsPerPixel,
    TexturesPerVertex,
    NormalsPerVertex,
}

impl RenderMode {
    pub const ALL: [RenderMode; 4] = [
        RenderMode::TexturesPerPixel,
        RenderMode::NormalsPerPixel,
        RenderMode::TexturesPerVertex,
        RenderMode::NormalsPerVertex,
    ];

    pub fn index(self) -> u32 {
        match self {
            Self::TexturesPerPixel => 0,
            Self::NormalsPerPixel => 1,
            Self::TexturesPerVertex => 2,
            Self::NormalsPerVertex => 3,
        }
    }

    /// Out-of-range indices clamp to the last mode.
    pub fn from_index(index: u32) -> Self {
        Self::ALL[(index as usize).min(Self::ALL.len() - 1)]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TexturesPerPixel => "textures per pixel",
            Self::NormalsPerPixel => "normals per pixel",
            Self::TexturesPerVertex => "textures per vertex",
            Self::NormalsPerVertex => "normals per vertex",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The five scalars shared by the bloom extract and composite passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    pub threshold: f32,
    pub intensity: f32,
    pub saturation: f32,
    pub scene_intensity: f32,
    pub scene_saturation: f32,
}

/// Scene-wide switches and post-processing parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneTunables {
    bloom_enabled: bool,
    bloom: BloomSettings,
    amplitude: f32,
    render_mode: RenderMode,
    shadows_enabled: bool,
    gizmos_enabled: bool,
    grass_enabled: bool,
    wireframe: bool,
}

impl Default for SceneTunables {
    fn default() -> Self {
        Self {
            bloom_enabled: false,
            bloom: BloomSettings {
                threshold: 0.4,
                intensity: 1.25,
                saturation: 1.0,
                scene_intensity: 1.0,
                scene_saturation: 1.0,
            },
            amplitude: 10.0,
            render_mode: RenderMode::TexturesPerPixel,
            shadows_enabled: true,
            gizmos_enabled: false,
            grass_enabled: true,
            wireframe: false,
        }
    }
}

impl SceneTunables {
    pub fn bloom_enabled(&self) -> bool {
        self.bloom_enabled
    }

    pub fn set_bloom_enabled(&mut self, enabled: bool) {
        self.bloom_enabled = enabled;
    }

    pub fn bloom(&self) -> BloomSettings {
        self.bloom
    }

    pub fn set_bloom_threshold(&mut self, value: f32) {
        self.bloom.threshold = clamp_to(value, 0.001, 1.0);
    }

    pub fn set_bloom_intensity(&mut self, value: f32) {
        self.bloom.intensity = clamp_to(value, 0.01, 10.0);
    }

    pub fn set_bloom_saturation(&mut self, value: f32) {
        self.bloom.saturation = clamp_to(value, 0.01, 5.0);
    }

    pub fn set_scene_intensity(&mut self, value: f32) {
        self.bloom.scene_intensity = clamp_to(value, 0.01, 5.0);
    }

    pub fn set_scene_saturation(&mut self, value: f32) {
        self.bloom.scene_saturation = clamp_to(value, 0.01, 5.0);
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn set_amplitude(&mut self, value: f32) {
        self.amplitude = clamp_to(value, 0.1, 50.0);
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.render_mode = mode;
    }

    pub fn set_render_mode_index(&mut self, index: i64) {
        self.render_mode = RenderMode::from_index(index.clamp(0, 3) as u32);
    }

    pub fn shadows_enabled(&self) -> bool {
        self.shadows_enabled
    }

    pub fn set_shadows_enabled(&mut self, enabled: bool) {
        self.shadows_enabled = enabled;
    }

    pub fn gizmos_enabled(&self) -> bool {
        self.gizmos_enabled
    }

    pub fn set_gizmos_enabled(&mut self, enabled: bool) {
        self.gizmos_enabled = enabled;
    }

    pub fn grass_enabled(&self) -> bool {
        self.grass_enabled
    }

    pub fn set_grass_enabled(&mut self, enabled: bool) {
        self.grass_enabled = enabled;
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn set_wireframe(&mut self, enabled: bool) {
        self.wireframe = enabled;
    }
}

/// Clamping view over one light.
pub struct LightTuning<'a> {
    light: &'a mut Light,
}

impl<'a> LightTuning<'a> {
    pub fn new(light: &'a mut Light) -> Self {
        Self { light }
    }

    pub fn light(&self) -> &Light {
        self.light
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.light.set_enabled(enabled);
    }

    /// Applies radio-button flags; first match wins, no flag leaves the kind unchanged.
    pub fn select_kind(&mut self, directional: bool, point: bool, spot: bool) {
        if let Some(kind) = LightKind::from_flags(directional, point, spot) {
            self.light.set_kind(kind);
        }
    }

    pub fn set_ambient(&mut self, colour: Vec4) {
        self.light.set_ambient(clamp_colour(colour));
    }

    pub fn set_diffuse(&mut self, colour: Vec4) {
        self.light.set_diffuse(clamp_colour(colour));
    }

    pub fn set_specular(&mut self, colour: Vec4) {
        self.light.set_specular(clamp_colour(colour));
    }

    pub fn set_specular_power(&mut self, power: f32) {
        self.light.set_specular_power(clamp_to(power, 0.01, 10.0));
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.light.set_position(clamp_vec3(position, -100.0, 100.0));
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.light.set_direction(clamp_vec3(direction, -1.0, 1.0));
    }

    pub fn set_attenuation(&mut self, attenuation: Vec3) {
        self.light.set_attenuation(clamp_vec3(attenuation, 0.0, 1.0));
    }

    pub fn set_exponent(&mut self, exponent: f32) {
        self.light.set_exponent(clamp_to(exponent, 0.1, 10.0));
    }

    pub fn set_range(&mut self, range: f32) {
        self.light.set_range(clamp_to(range, 1.0, 100.0));
    }

    pub fn set_shadow_bias(&mut self, bias: f32) {
        self.light.shadow_mut().bias = clamp_to(bias, 0.0001, 0.05);
    }

    pub fn set_shadow_planes(&mut self, near: f32, far: f32) {
        let (near, far) = clamp_planes(near, far);
        let shadow = self.light.shadow_mut();
        shadow.near_plane = near;
        shadow.far_plane = far;
    }

    pub fn set_near_plane(&mut self, near: f32) {
        let far = self.light.shadow().far_plane;
        self.set_shadow_planes(near, far);
    }

    pub fn set_far_plane(&mut self, far: f32) {
        let near = self.light.shadow().near_plane;
        self.set_shadow_planes(near, far);
    }

    pub fn set_soften(&mut self, soften: bool) {
        self.light.shadow_mut().soften = soften;
    }

    pub fn set_soften_radius(&mut self, radius: i64) {
        self.light.shadow_mut().soften_radius = radius.clamp(1, 25) as u32;
    }

    pub fn set_projection(&mut self, projection: ProjectionKind) {
        self.light.shadow_mut().projection = projection;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_planes_pull_near_back() {
        let (near, far) = correct_planes(5.0, 5.0);
        assert!((near - 4.9).abs() < 1e-5);
        assert_eq!(far, 5.0);
    }

    #[test]
    fn ordered_planes_are_untouched() {
        assert_eq!(correct_planes(1.0, 20.0), (1.0, 20.0));
    }

    #[test]
    fn clamped_planes_stay_ordered() {
        let samples = [-10.0, 0.0, 0.05, 0.1, 0.15, 1.0, 5.0, 50.0, 99.9, 100.0, 150.0];
        for &near in &samples {
            for &far in &samples {
                let (n, f) = clamp_planes(near, far);
                assert!(n < f, "near {n} >= far {f} for input ({near}, {far})");
                assert!(n >= MIN_NEAR_PLANE - 1e-4, "near {n} below minimum");
                assert!(f <= MAX_FAR_PLANE + PLANE_STEP + 1e-4, "far {f} above maximum");
            }
        }
    }

    #[test]
    fn correction_moves_one_value_by_one_step() {
        let (near, far) = correct_planes(3.0, 3.0);
        assert_eq!(far, 3.0);
        assert!((3.0 - near - PLANE_STEP).abs() < 1e-5);

        let (near, far) = correct_planes(3.05, 3.0);
        assert!((near - 2.95).abs() < 1e-5);
        assert_eq!(far, 3.0);
    }

    #[test]
    fn tunables_clamp_post_processing() {
        let mut tunables = SceneTunables::default();
        tunables.set_bloom_threshold(5.0);
        tunables.set_bloom_intensity(-1.0);
        tunables.set_bloom_saturation(f32::NAN);
        tunables.set_amplitude(1000.0);
        tunables.set_render_mode_index(9);
        let bloom = tunables.bloom();
        assert_eq!(bloom.threshold, 1.0);
        assert_eq!(bloom.intensity, 0.01);
        assert_eq!(bloom.saturation, 0.01);
        assert_eq!(tunables.amplitude(), 50.0);
        assert_eq!(tunables.render_mode(), RenderMode::NormalsPerVertex);
    }

    #[test]
    fn light_tuning_clamps_every_field() {
        let mut light = Light::default();
        let mut tuning = LightTuning::new(&mut light);
        tuning.set_diffuse(Vec4::new(2.0, -1.0, 0.5, 1.0));
        tuning.set_position(Vec3::new(500.0, -500.0, 3.0));
        tuning.set_direction(Vec3::new(2.0, -2.0, 0.0));
        tuning.set_attenuation(Vec3::new(-1.0, 0.5, 9.0));
        tuning.set_range(0.0);
        tuning.set_exponent(20.0);
        tuning.set_specular_power(0.0);
        tuning.set_shadow_bias(1.0);
        tuning.set_soften_radius(0);

        assert_eq!(light.diffuse(), Vec4::new(1.0, 0.0, 0.5, 1.0));
        assert_eq!(light.position(), Vec3::new(100.0, -100.0, 3.0));
        assert_eq!(light.direction(), Vec3::new(1.0, -1.0, 0.0));
        assert_eq!(light.attenuation(), Vec3::new(0.0, 0.5, 1.0));
        assert_eq!(light.range(), 1.0);
        assert_eq!(light.exponent(), 10.0);
        assert_eq!(light.specular_power(), 0.01);
        assert_eq!(light.shadow().bias, 0.05);
        assert_eq!(light.shadow().soften_radius, 1);
    }

    #[test]
    fn kind_selection_is_exclusive() {
        let mut light = Light::new(LightKind::Spot);
        let mut tuning = LightTuning::new(&mut light);
        tuning.select_kind(true, true, false);
        assert_eq!(tuning.light().kind(), LightKind::Directional);
        tuning.select_kind(false, false, false);
        assert_eq!(tuning.light().kind(), LightKind::Directional);
    }

    #[test]
    fn far_plane_is_capped() {
        let mut light = Light::default();
        let mut tuning = LightTuning::new(&mut light);
        tuning.set_far_plane(400.0);
        tuning.set_near_plane(300.0);
        let shadow = light.shadow();
        assert_eq!(shadow.far_plane, MAX_FAR_PLANE);
        assert!(shadow.near_plane < shadow.far_plane);
    }
}
